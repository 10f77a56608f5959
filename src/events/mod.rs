use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Domain events emitted by services and consumed by subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Review events
    ReviewSubmitted(Uuid),
    ReviewApproved(Uuid),

    // Analytics events
    ProductViewed {
        product_id: Uuid,
    },

    // Order events
    OrderPlaced {
        order_id: Uuid,
        cart_id: Uuid,
        customer_id: Option<Uuid>,
        total: Decimal,
        currency: String,
    },

    // Cart events
    CartAbandoned(Uuid),

    // Trade-in events
    TradeInRequested(Uuid),
    TradeInAccepted(Uuid),
    TradeInRejected(Uuid),

    // Loyalty events
    LoyaltyPointsEarned {
        account_id: Uuid,
        points: i64,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, surfacing channel failures to the caller.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Fire-and-forget send used inside request paths; a closed channel is
    /// logged, never propagated.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping event: {}", e);
        }
    }
}

/// Subscriber contract. Handlers run sequentially per event; a failing
/// handler is logged and does not stop dispatch.
#[async_trait]
pub trait EventHandler: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle_event(&self, event: &Event) -> Result<(), String>;
}

/// Event processing loop. Runs until the sending side closes.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, handlers: Vec<Arc<dyn EventHandler>>) {
    info!(handlers = handlers.len(), "Starting event processing loop");

    while let Some(event) = rx.recv().await {
        for handler in &handlers {
            if let Err(e) = handler.handle_event(&event).await {
                error!(
                    handler = handler.name(),
                    error = %e,
                    ?event,
                    "Event handler failed"
                );
            }
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        seen: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl EventHandler for CountingHandler {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn handle_event(&self, _event: &Event) -> Result<(), String> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err("boom".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn dispatches_to_all_handlers_despite_failures() {
        let (tx, rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let handlers: Vec<Arc<dyn EventHandler>> = vec![
            Arc::new(CountingHandler {
                seen: first.clone(),
                fail: true,
            }),
            Arc::new(CountingHandler {
                seen: second.clone(),
                fail: false,
            }),
        ];
        let task = tokio::spawn(process_events(rx, handlers));

        sender
            .send(Event::ReviewSubmitted(Uuid::new_v4()))
            .await
            .expect("send");
        sender
            .send(Event::CartAbandoned(Uuid::new_v4()))
            .await
            .expect("send");
        drop(sender);

        task.await.expect("loop exits when channel closes");
        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }
}
