pub mod banner;
pub mod cart;
pub mod cart_item;
pub mod loyalty_account;
pub mod loyalty_transaction;
pub mod order;
pub mod order_item;
pub mod product_review;
pub mod product_sale;
pub mod product_variant;
pub mod product_view;
pub mod trade_in_device_map;
pub mod trade_in_offer;
pub mod trade_in_request;
pub mod variant_image;

pub use banner::Entity as Banner;
pub use cart::Entity as Cart;
pub use cart_item::Entity as CartItem;
pub use loyalty_account::Entity as LoyaltyAccount;
pub use loyalty_transaction::Entity as LoyaltyTransaction;
pub use order::Entity as Order;
pub use order_item::Entity as OrderItem;
pub use product_review::Entity as ProductReview;
pub use product_sale::Entity as ProductSale;
pub use product_variant::Entity as ProductVariant;
pub use product_view::Entity as ProductView;
pub use trade_in_device_map::Entity as TradeInDeviceMap;
pub use trade_in_offer::Entity as TradeInOffer;
pub use trade_in_request::Entity as TradeInRequest;
pub use variant_image::Entity as VariantImage;
