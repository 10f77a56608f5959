pub mod analytics;
pub mod banners;
pub mod carts;
pub mod catalog;
pub mod checkout;
pub mod loyalty;
pub mod payments;
pub mod reviews;
pub mod trade_in;
