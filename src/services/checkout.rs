use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{cart, cart::CartStatus, cart_item, order, order_item, Cart, CartItem};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::payments::PaymentAuthorizer;

/// Fast checkout: applies shipping details to the cart, authorizes payment
/// and places the order. The three steps share one transaction so a failure
/// at any point leaves the cart untouched.
#[derive(Clone)]
pub struct FastCheckoutService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    payment: Arc<dyn PaymentAuthorizer>,
}

impl FastCheckoutService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        payment: Arc<dyn PaymentAuthorizer>,
    ) -> Self {
        Self {
            db,
            event_sender,
            payment,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn fast_checkout(
        &self,
        cart_id: Uuid,
        input: FastCheckoutInput,
    ) -> Result<order::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let cart = Cart::find_by_id(cart_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart {} not found", cart_id)))?;

        if cart.status != CartStatus::Active {
            return Err(ServiceError::InvalidOperation(
                "Cart is not active".to_string(),
            ));
        }

        let items = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .all(&txn)
            .await?;
        if items.is_empty() {
            return Err(ServiceError::InvalidOperation("Cart is empty".to_string()));
        }

        let address_json = serde_json::to_string(&input.shipping_address)
            .map_err(|e| ServiceError::InternalError(format!("address serialization: {e}")))?;

        // Step 1: apply contact and shipping details to the cart.
        let customer_id = cart.customer_id;
        let currency = cart.currency.clone();
        let subtotal = cart.subtotal;
        let now = Utc::now();
        let mut cart_update: cart::ActiveModel = cart.into();
        cart_update.email = Set(Some(input.email.clone()));
        cart_update.shipping_address = Set(Some(address_json.clone()));
        cart_update.shipping_method = Set(Some(input.shipping_method.as_str().to_string()));
        cart_update.status = Set(CartStatus::Converting);
        cart_update.updated_at = Set(now);
        let cart = cart_update.update(&txn).await?;

        // Step 2: totals and payment authorization.
        let shipping_total = input.shipping_method.rate();
        let total = subtotal + shipping_total;
        let authorization = self
            .payment
            .authorize(total, &currency, input.payment_token.as_deref())
            .await?;

        // Step 3: place the order and retire the cart.
        let order_id = Uuid::new_v4();
        let order_number = format!(
            "ORD-{}",
            order_id.simple().to_string()[..8].to_uppercase()
        );
        let placed = order::ActiveModel {
            id: Set(order_id),
            order_number: Set(order_number),
            cart_id: Set(cart_id),
            customer_id: Set(customer_id),
            email: Set(input.email),
            status: Set("placed".to_string()),
            currency: Set(currency.clone()),
            subtotal: Set(subtotal),
            shipping_total: Set(shipping_total),
            total: Set(total),
            shipping_address: Set(address_json),
            shipping_method: Set(input.shipping_method.as_str().to_string()),
            placed_at: Set(now),
        };
        let placed = placed.insert(&txn).await?;

        for item in &items {
            let line = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(item.product_id),
                sku: Set(item.sku.clone()),
                name: Set(item.name.clone()),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                total_price: Set(item.line_total),
            };
            line.insert(&txn).await?;
        }

        let mut cart_update: cart::ActiveModel = cart.into();
        cart_update.status = Set(CartStatus::Converted);
        cart_update.updated_at = Set(Utc::now());
        cart_update.update(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OrderPlaced {
                order_id,
                cart_id,
                customer_id,
                total,
                currency,
            })
            .await;
        crate::metrics::ORDERS_PLACED.inc();

        info!(
            order_id = %order_id,
            cart_id = %cart_id,
            payment_ref = %authorization.reference,
            "Fast checkout completed"
        );
        Ok(placed)
    }
}

/// Shipping destination captured at checkout
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub region: Option<String>,
    pub postal_code: String,
    pub country: String,
}

/// Flat-rate shipping methods offered at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    Standard,
    Express,
}

impl ShippingMethod {
    pub fn rate(self) -> Decimal {
        match self {
            ShippingMethod::Standard => dec!(5.00),
            ShippingMethod::Express => dec!(15.00),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShippingMethod::Standard => "standard",
            ShippingMethod::Express => "express",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FastCheckoutInput {
    pub email: String,
    pub shipping_address: Address,
    pub shipping_method: ShippingMethod,
    pub payment_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipping_rates() {
        assert_eq!(ShippingMethod::Standard.rate(), dec!(5.00));
        assert_eq!(ShippingMethod::Express.rate(), dec!(15.00));
    }
}
