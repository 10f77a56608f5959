use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entities::{cart, cart::CartStatus, cart_item, Cart, CartItem};
use crate::errors::ServiceError;

/// Cart CRUD backing the fast-checkout flow
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartWithItems {
    pub cart: cart::Model,
    pub items: Vec<cart_item::Model>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, input))]
    pub async fn create_cart(&self, input: CreateCartInput) -> Result<cart::Model, ServiceError> {
        let now = Utc::now();
        let currency = input
            .currency
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "USD".to_string());

        let cart = cart::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(input.customer_id),
            currency: Set(currency),
            status: Set(CartStatus::Active),
            subtotal: Set(Decimal::ZERO),
            email: Set(None),
            shipping_address: Set(None),
            shipping_method: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let cart = cart.insert(&*self.db).await?;
        info!("Created cart: {}", cart.id);
        Ok(cart)
    }

    #[instrument(skip(self))]
    pub async fn get_cart(&self, cart_id: Uuid) -> Result<CartWithItems, ServiceError> {
        let cart = Cart::find_by_id(cart_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart {} not found", cart_id)))?;

        let items = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .order_by_asc(cart_item::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(CartWithItems { cart, items })
    }

    /// Add a line to an active cart. A line for the same product/variant
    /// pair is merged by incrementing its quantity.
    #[instrument(skip(self, input))]
    pub async fn add_item(
        &self,
        cart_id: Uuid,
        input: AddCartItemInput,
    ) -> Result<CartWithItems, ServiceError> {
        if input.quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "quantity must be positive".to_string(),
            ));
        }
        if input.unit_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "unit price cannot be negative".to_string(),
            ));
        }

        let existing = self.get_cart(cart_id).await?;
        if existing.cart.status != CartStatus::Active {
            return Err(ServiceError::InvalidOperation(
                "Cart is not active".to_string(),
            ));
        }

        let matching = existing.items.iter().find(|item| {
            item.product_id == input.product_id && item.variant_id == input.variant_id
        });

        match matching {
            Some(item) => {
                let quantity = item.quantity + input.quantity;
                let line_total = item.unit_price * Decimal::from(quantity);
                let mut active: cart_item::ActiveModel = item.clone().into();
                active.quantity = Set(quantity);
                active.line_total = Set(line_total);
                active.update(&*self.db).await?;
            }
            None => {
                let line_total = input.unit_price * Decimal::from(input.quantity);
                let item = cart_item::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    cart_id: Set(cart_id),
                    product_id: Set(input.product_id),
                    variant_id: Set(input.variant_id),
                    sku: Set(input.sku),
                    name: Set(input.name),
                    quantity: Set(input.quantity),
                    unit_price: Set(input.unit_price),
                    line_total: Set(line_total),
                    created_at: Set(Utc::now()),
                };
                item.insert(&*self.db).await?;
            }
        }

        self.refresh_subtotal(cart_id).await?;
        self.get_cart(cart_id).await
    }

    /// Recompute the cart subtotal from its lines.
    async fn refresh_subtotal(&self, cart_id: Uuid) -> Result<(), ServiceError> {
        let items = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .all(&*self.db)
            .await?;
        let subtotal: Decimal = items.iter().map(|item| item.line_total).sum();

        let cart = Cart::find_by_id(cart_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart {} not found", cart_id)))?;
        let mut active: cart::ActiveModel = cart.into();
        active.subtotal = Set(subtotal);
        active.updated_at = Set(Utc::now());
        active.update(&*self.db).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CreateCartInput {
    pub customer_id: Option<Uuid>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddCartItemInput {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}
