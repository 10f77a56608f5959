use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.3.0",
        description = r#"
# Storefront Extensions API

Backend for storefront extensions: banner content, moderated product
reviews, product analytics (live viewer and sales windows), loyalty
accounts, device trade-in and one-call fast checkout.

## Authentication

Storefront routes are public. Admin routes require a bearer token carrying
the admin role, or the operator API key:

```
Authorization: Bearer <jwt>
X-API-Key: <admin api key>
```

## Pagination

List endpoints take `page` (default 1) and `per_page` (default 20, max 100).
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Banners", description = "Storefront banner content"),
        (name = "Product Analytics", description = "Reviews, view tracking and windowed stats"),
        (name = "Loyalty", description = "Loyalty accounts and ledger"),
        (name = "Trade-in", description = "Device trade-in and pricing matrix"),
        (name = "Checkout", description = "Carts and fast checkout"),
        (name = "Catalog", description = "Variant image management"),
        (name = "Health", description = "Health and status endpoints")
    ),
    paths(
        // Banners
        crate::handlers::banners::list_active_banners,
        crate::handlers::banners::create_banner,

        // Product analytics
        crate::handlers::analytics::submit_review,
        crate::handlers::analytics::list_product_reviews,
        crate::handlers::analytics::mark_review_helpful,
        crate::handlers::analytics::record_product_view,
        crate::handlers::analytics::product_stats,
        crate::handlers::analytics::popular_products,
        crate::handlers::analytics::approve_review,

        // Loyalty
        crate::handlers::loyalty::get_account,
        crate::handlers::loyalty::adjust_balance,

        // Trade-in
        crate::handlers::trade_in::resolve_device,
        crate::handlers::trade_in::quote,
        crate::handlers::trade_in::create_request,
        crate::handlers::trade_in::list_pricing,
        crate::handlers::trade_in::upsert_pricing,

        // Checkout
        crate::handlers::carts::fast_checkout,

        // Catalog
        crate::handlers::variants::list_variant_images,
    ),
    components(
        schemas(
            crate::errors::ErrorResponse,
            crate::entities::trade_in_offer::DeviceCondition,
            crate::entities::trade_in_request::TradeInStatus,
            crate::services::analytics::ProductStats,
            crate::services::analytics::RatingSummary,
            crate::services::analytics::PopularProduct,
            crate::services::checkout::Address,
            crate::services::checkout::ShippingMethod,
            crate::handlers::analytics::SubmitReviewRequest,
            crate::handlers::analytics::HelpfulResponse,
            crate::handlers::banners::CreateBannerRequest,
            crate::handlers::carts::FastCheckoutRequest,
            crate::handlers::loyalty::AdjustBalanceRequest,
            crate::handlers::trade_in::CreateTradeInRequest,
            crate::handlers::trade_in::UpsertPricingRequest,
            crate::handlers::trade_in::PricingRow,
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_builds() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string(&openapi).expect("serialize");
        assert!(json.contains("Storefront API"));
        assert!(json.contains("/store/carts/{id}/fast-checkout"));
    }
}
