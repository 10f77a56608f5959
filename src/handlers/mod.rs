pub mod analytics;
pub mod banners;
pub mod carts;
pub mod common;
pub mod loyalty;
pub mod trade_in;
pub mod variants;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::payments::PaymentAuthorizer;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub banners: Arc<crate::services::banners::BannerService>,
    pub reviews: Arc<crate::services::reviews::ReviewService>,
    pub analytics: Arc<crate::services::analytics::ProductAnalyticsService>,
    pub loyalty: Arc<crate::services::loyalty::LoyaltyService>,
    pub trade_in: Arc<crate::services::trade_in::TradeInService>,
    pub carts: Arc<crate::services::carts::CartService>,
    pub checkout: Arc<crate::services::checkout::FastCheckoutService>,
    pub catalog: Arc<crate::services::catalog::CatalogService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        payment: Arc<dyn PaymentAuthorizer>,
    ) -> Self {
        let banners = Arc::new(crate::services::banners::BannerService::new(db_pool.clone()));
        let reviews = Arc::new(crate::services::reviews::ReviewService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let analytics = Arc::new(crate::services::analytics::ProductAnalyticsService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let loyalty = Arc::new(crate::services::loyalty::LoyaltyService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let trade_in = Arc::new(crate::services::trade_in::TradeInService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let carts = Arc::new(crate::services::carts::CartService::new(db_pool.clone()));
        let checkout = Arc::new(crate::services::checkout::FastCheckoutService::new(
            db_pool.clone(),
            event_sender,
            payment,
        ));
        let catalog = Arc::new(crate::services::catalog::CatalogService::new(db_pool));

        Self {
            banners,
            reviews,
            analytics,
            loyalty,
            trade_in,
            carts,
            checkout,
            catalog,
        }
    }
}
