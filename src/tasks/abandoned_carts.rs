use chrono::{Duration as ChronoDuration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::entities::{cart, cart::CartStatus, Cart};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Rows processed per sweep tick.
const SWEEP_BATCH_SIZE: u64 = 100;

/// Background worker that marks stale active carts abandoned. One sweep per
/// tick; errors are logged and the loop continues.
pub fn start_worker(db: Arc<DatabaseConnection>, sender: EventSender, cfg: &AppConfig) {
    let interval = Duration::from_secs(cfg.abandoned_cart_check_interval_secs);
    let threshold_mins = cfg.abandoned_cart_threshold_mins;

    info!(
        interval_secs = interval.as_secs(),
        threshold_mins, "Starting abandoned-cart worker"
    );

    tokio::spawn(async move {
        loop {
            sleep(interval).await;
            match sweep_once(&db, &sender, threshold_mins, SWEEP_BATCH_SIZE).await {
                Ok(0) => {}
                Ok(count) => info!(count, "Marked carts abandoned"),
                Err(e) => error!("abandoned-cart sweep failed: {}", e),
            }
        }
    });
}

/// Mark active carts idle past the threshold as abandoned, oldest first,
/// sequentially. Returns how many carts were transitioned.
pub async fn sweep_once(
    db: &DatabaseConnection,
    sender: &EventSender,
    threshold_mins: i64,
    batch_size: u64,
) -> Result<usize, ServiceError> {
    let cutoff = Utc::now() - ChronoDuration::minutes(threshold_mins);

    let stale = Cart::find()
        .filter(cart::Column::Status.eq(CartStatus::Active))
        .filter(cart::Column::UpdatedAt.lt(cutoff))
        .order_by_asc(cart::Column::UpdatedAt)
        .limit(batch_size)
        .all(db)
        .await?;

    let mut swept = 0;
    for stale_cart in stale {
        let cart_id = stale_cart.id;
        let mut active: cart::ActiveModel = stale_cart.into();
        active.status = Set(CartStatus::Abandoned);
        active.updated_at = Set(Utc::now());
        active.update(db).await?;

        sender.send_or_log(Event::CartAbandoned(cart_id)).await;
        crate::metrics::CARTS_ABANDONED.inc();
        swept += 1;
    }

    Ok(swept)
}
