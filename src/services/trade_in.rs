use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entities::{
    trade_in_device_map, trade_in_offer, trade_in_offer::DeviceCondition, trade_in_request,
    trade_in_request::TradeInStatus, TradeInDeviceMap, TradeInOffer, TradeInRequest,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Type Allocation Code length: the leading digits of an IMEI that
/// identify the device model.
pub const TAC_LEN: usize = 8;
const MAX_IMEI_LEN: usize = 20;

/// Trade-in program: device resolution, pricing-matrix quotes and request
/// lifecycle.
#[derive(Clone)]
pub struct TradeInService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl TradeInService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Extract and validate the TAC from a submitted IMEI.
    pub fn tac_from_imei(imei: &str) -> Result<&str, ServiceError> {
        let imei = imei.trim();
        if imei.len() < TAC_LEN || imei.len() > MAX_IMEI_LEN {
            return Err(ServiceError::ValidationError(format!(
                "IMEI must be between {} and {} digits",
                TAC_LEN, MAX_IMEI_LEN
            )));
        }
        if !imei.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ServiceError::ValidationError(
                "IMEI must contain only digits".to_string(),
            ));
        }
        Ok(&imei[..TAC_LEN])
    }

    /// Resolve an IMEI to a known device model via its TAC.
    #[instrument(skip(self))]
    pub async fn resolve_device(
        &self,
        imei: &str,
    ) -> Result<trade_in_device_map::Model, ServiceError> {
        let tac = Self::tac_from_imei(imei)?;

        TradeInDeviceMap::find()
            .filter(trade_in_device_map::Column::Tac.eq(tac))
            .filter(trade_in_device_map::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("No device known for TAC {}", tac)))
    }

    /// Pricing-matrix lookup. When duplicate live rows exist the lowest
    /// priority then newest wins.
    #[instrument(skip(self))]
    pub async fn quote(
        &self,
        model_code: &str,
        condition: DeviceCondition,
    ) -> Result<trade_in_offer::Model, ServiceError> {
        TradeInOffer::find()
            .filter(trade_in_offer::Column::ModelCode.eq(model_code))
            .filter(trade_in_offer::Column::Condition.eq(condition))
            .filter(trade_in_offer::Column::DeletedAt.is_null())
            .order_by_asc(trade_in_offer::Column::Priority)
            .order_by_desc(trade_in_offer::Column::UpdatedAt)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "No trade-in offer for model {} in {:?} condition",
                    model_code, condition
                ))
            })
    }

    /// Create a pending request. The quoted amount is always re-resolved
    /// server-side; a client-supplied figure is never trusted.
    #[instrument(skip(self, input))]
    pub async fn create_request(
        &self,
        input: CreateTradeInRequestInput,
    ) -> Result<trade_in_request::Model, ServiceError> {
        if let Some(ref imei) = input.imei {
            Self::tac_from_imei(imei)?;
        }

        let offer = self.quote(&input.model_code, input.condition).await?;

        let now = Utc::now();
        let request = trade_in_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(input.customer_id),
            imei: Set(input.imei.map(|v| v.trim().to_string())),
            model_code: Set(input.model_code),
            condition: Set(input.condition),
            quoted_amount: Set(offer.offer_amount),
            currency: Set(offer.currency),
            status: Set(TradeInStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let request = request.insert(&*self.db).await?;
        self.event_sender
            .send_or_log(Event::TradeInRequested(request.id))
            .await;
        crate::metrics::TRADE_IN_REQUESTS.inc();

        info!("Trade-in request {} created", request.id);
        Ok(request)
    }

    #[instrument(skip(self))]
    pub async fn get_request(&self, request_id: Uuid) -> Result<trade_in_request::Model, ServiceError> {
        TradeInRequest::find_by_id(request_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Trade-in request {} not found", request_id))
            })
    }

    #[instrument(skip(self))]
    pub async fn list_requests(
        &self,
        status: Option<TradeInStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<trade_in_request::Model>, u64), ServiceError> {
        let mut query = TradeInRequest::find();
        if let Some(status) = status {
            query = query.filter(trade_in_request::Column::Status.eq(status));
        }

        let paginator = query
            .order_by_desc(trade_in_request::Column::CreatedAt)
            .paginate(&*self.db, per_page.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Move a request through its lifecycle; illegal transitions are
    /// rejected before any write.
    #[instrument(skip(self))]
    pub async fn transition_request(
        &self,
        request_id: Uuid,
        next: TradeInStatus,
    ) -> Result<trade_in_request::Model, ServiceError> {
        let request = self.get_request(request_id).await?;

        if !request.status.can_transition_to(next) {
            return Err(ServiceError::InvalidOperation(format!(
                "cannot move trade-in request from {:?} to {:?}",
                request.status, next
            )));
        }

        let mut active: trade_in_request::ActiveModel = request.into();
        active.status = Set(next);
        active.updated_at = Set(Utc::now());
        let request = active.update(&*self.db).await?;

        match next {
            TradeInStatus::Accepted => {
                self.event_sender
                    .send_or_log(Event::TradeInAccepted(request_id))
                    .await;
            }
            TradeInStatus::Rejected => {
                self.event_sender
                    .send_or_log(Event::TradeInRejected(request_id))
                    .await;
            }
            _ => {}
        }

        info!("Trade-in request {} moved to {:?}", request_id, next);
        Ok(request)
    }

    /// Live pricing-matrix rows, optionally narrowed to one model.
    #[instrument(skip(self))]
    pub async fn list_pricing(
        &self,
        model_code: Option<&str>,
    ) -> Result<Vec<trade_in_offer::Model>, ServiceError> {
        let mut query = TradeInOffer::find().filter(trade_in_offer::Column::DeletedAt.is_null());
        if let Some(model_code) = model_code {
            query = query.filter(trade_in_offer::Column::ModelCode.eq(model_code));
        }

        query
            .order_by_asc(trade_in_offer::Column::ModelCode)
            .order_by_asc(trade_in_offer::Column::Priority)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Bulk upsert of matrix rows. Superseded live rows for the same
    /// (model, condition) cell are soft-deleted in the same transaction.
    #[instrument(skip(self, rows))]
    pub async fn upsert_pricing(
        &self,
        rows: Vec<PricingRowInput>,
    ) -> Result<Vec<trade_in_offer::Model>, ServiceError> {
        if rows.is_empty() {
            return Err(ServiceError::ValidationError(
                "pricing update must contain at least one row".to_string(),
            ));
        }
        for row in &rows {
            if row.offer_amount < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "offer amount for {} cannot be negative",
                    row.model_code
                )));
            }
        }

        let txn = self.db.begin().await?;
        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            self.retire_matrix_cell(&txn, &row.model_code, row.condition)
                .await?;

            let now = Utc::now();
            let offer = trade_in_offer::ActiveModel {
                id: Set(Uuid::new_v4()),
                model_code: Set(row.model_code),
                condition: Set(row.condition),
                offer_amount: Set(row.offer_amount),
                currency: Set(row.currency.unwrap_or_else(|| "USD".to_string())),
                priority: Set(row.priority.unwrap_or(0)),
                deleted_at: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            };
            inserted.push(offer.insert(&txn).await?);
        }
        txn.commit().await?;

        info!(rows = inserted.len(), "Pricing matrix updated");
        Ok(inserted)
    }

    async fn retire_matrix_cell(
        &self,
        txn: &DatabaseTransaction,
        model_code: &str,
        condition: DeviceCondition,
    ) -> Result<(), ServiceError> {
        let live = TradeInOffer::find()
            .filter(trade_in_offer::Column::ModelCode.eq(model_code))
            .filter(trade_in_offer::Column::Condition.eq(condition))
            .filter(trade_in_offer::Column::DeletedAt.is_null())
            .all(txn)
            .await?;

        let now = Utc::now();
        for offer in live {
            let mut active: trade_in_offer::ActiveModel = offer.into();
            active.deleted_at = Set(Some(now));
            active.updated_at = Set(now);
            active.update(txn).await?;
        }
        Ok(())
    }

    /// Upsert TAC mappings. TACs are unique, so an existing row (live or
    /// retired) is updated in place and revived.
    #[instrument(skip(self, rows))]
    pub async fn upsert_device_map(
        &self,
        rows: Vec<DeviceMapRowInput>,
    ) -> Result<Vec<trade_in_device_map::Model>, ServiceError> {
        if rows.is_empty() {
            return Err(ServiceError::ValidationError(
                "device map update must contain at least one row".to_string(),
            ));
        }

        let txn = self.db.begin().await?;
        let mut upserted = Vec::with_capacity(rows.len());
        for row in rows {
            let tac = row.tac.trim().to_string();
            if tac.len() != TAC_LEN || !tac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ServiceError::ValidationError(format!(
                    "TAC {:?} must be exactly {} digits",
                    tac, TAC_LEN
                )));
            }

            let existing = TradeInDeviceMap::find()
                .filter(trade_in_device_map::Column::Tac.eq(tac.as_str()))
                .one(&txn)
                .await?;

            let model = match existing {
                Some(found) => {
                    let mut active: trade_in_device_map::ActiveModel = found.into();
                    active.manufacturer = Set(row.manufacturer);
                    active.model_code = Set(row.model_code);
                    active.model_name = Set(row.model_name);
                    active.storage_gb = Set(row.storage_gb);
                    active.deleted_at = Set(None);
                    active.update(&txn).await?
                }
                None => {
                    let device = trade_in_device_map::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tac: Set(tac),
                        manufacturer: Set(row.manufacturer),
                        model_code: Set(row.model_code),
                        model_name: Set(row.model_name),
                        storage_gb: Set(row.storage_gb),
                        deleted_at: Set(None),
                        created_at: Set(Utc::now()),
                    };
                    device.insert(&txn).await?
                }
            };
            upserted.push(model);
        }
        txn.commit().await?;

        info!(rows = upserted.len(), "Device map updated");
        Ok(upserted)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateTradeInRequestInput {
    pub customer_id: Uuid,
    pub imei: Option<String>,
    pub model_code: String,
    pub condition: DeviceCondition,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingRowInput {
    pub model_code: String,
    pub condition: DeviceCondition,
    pub offer_amount: Decimal,
    pub currency: Option<String>,
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceMapRowInput {
    pub tac: String,
    pub manufacturer: String,
    pub model_code: String,
    pub model_name: String,
    pub storage_gb: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tac_extraction_validates_shape() {
        assert_eq!(
            TradeInService::tac_from_imei("354398765012345").expect("valid"),
            "35439876"
        );
        assert_eq!(
            TradeInService::tac_from_imei(" 35439876 ").expect("trimmed"),
            "35439876"
        );
        assert!(TradeInService::tac_from_imei("1234567").is_err());
        assert!(TradeInService::tac_from_imei("35439x76501").is_err());
        assert!(TradeInService::tac_from_imei("123456789012345678901").is_err());
    }
}
