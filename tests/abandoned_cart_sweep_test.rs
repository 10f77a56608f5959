mod common;

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use tokio::sync::mpsc;
use uuid::Uuid;

use common::TestApp;
use storefront_api::entities::{cart, cart::CartStatus, Cart};
use storefront_api::events::{Event, EventSender};
use storefront_api::services::carts::CreateCartInput;
use storefront_api::tasks::abandoned_carts::sweep_once;

async fn seed_cart(app: &TestApp, status: CartStatus, idle_mins: i64) -> Uuid {
    let created = app
        .state
        .services
        .carts
        .create_cart(CreateCartInput::default())
        .await
        .expect("create cart");

    let stale_time = Utc::now() - Duration::minutes(idle_mins);
    let mut active: cart::ActiveModel = created.clone().into();
    active.status = Set(status);
    active.updated_at = Set(stale_time);
    active.update(&*app.state.db).await.expect("backdate cart");
    created.id
}

#[tokio::test]
async fn sweep_marks_only_stale_active_carts() {
    let app = TestApp::new().await;
    let (tx, mut rx) = mpsc::channel(16);
    let sender = EventSender::new(tx);

    let stale_a = seed_cart(&app, CartStatus::Active, 90).await;
    let stale_b = seed_cart(&app, CartStatus::Active, 120).await;
    let fresh = seed_cart(&app, CartStatus::Active, 10).await;
    let converted = seed_cart(&app, CartStatus::Converted, 300).await;

    let swept = sweep_once(&app.state.db, &sender, 60, 100)
        .await
        .expect("sweep");
    assert_eq!(swept, 2);

    let status_of = |id: Uuid| {
        let db = app.state.db.clone();
        async move {
            Cart::find_by_id(id)
                .one(&*db)
                .await
                .expect("load cart")
                .expect("cart exists")
                .status
        }
    };
    assert_eq!(status_of(stale_a).await, CartStatus::Abandoned);
    assert_eq!(status_of(stale_b).await, CartStatus::Abandoned);
    assert_eq!(status_of(fresh).await, CartStatus::Active);
    assert_eq!(status_of(converted).await, CartStatus::Converted);

    // One event per swept cart, oldest first.
    let mut seen = Vec::new();
    for _ in 0..2 {
        match rx.recv().await {
            Some(Event::CartAbandoned(id)) => seen.push(id),
            other => panic!("unexpected event: {:?}", other),
        }
    }
    assert_eq!(seen, vec![stale_b, stale_a]);

    // Nothing left to sweep.
    let swept = sweep_once(&app.state.db, &sender, 60, 100)
        .await
        .expect("sweep");
    assert_eq!(swept, 0);
}

#[tokio::test]
async fn sweep_respects_the_batch_cap() {
    let app = TestApp::new().await;
    let (tx, _rx) = mpsc::channel(16);
    let sender = EventSender::new(tx);

    seed_cart(&app, CartStatus::Active, 90).await;
    seed_cart(&app, CartStatus::Active, 120).await;
    seed_cart(&app, CartStatus::Active, 150).await;

    let swept = sweep_once(&app.state.db, &sender, 60, 2)
        .await
        .expect("sweep");
    assert_eq!(swept, 2);

    let swept = sweep_once(&app.state.db, &sender, 60, 2)
        .await
        .expect("sweep");
    assert_eq!(swept, 1);
}
