use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Result of a successful authorization
#[derive(Debug, Clone)]
pub struct PaymentAuthorization {
    pub reference: String,
}

/// Seam for the payment step of fast checkout. The production implementation
/// talks to the payment provider; tests swap in deterministic behavior.
#[async_trait]
pub trait PaymentAuthorizer: Send + Sync {
    async fn authorize(
        &self,
        amount: Decimal,
        currency: &str,
        payment_token: Option<&str>,
    ) -> Result<PaymentAuthorization, ServiceError>;
}

/// Token-based authorizer: declines tokens prefixed with "decline",
/// authorizes everything else.
#[derive(Debug, Default, Clone)]
pub struct TokenPaymentAuthorizer;

#[async_trait]
impl PaymentAuthorizer for TokenPaymentAuthorizer {
    async fn authorize(
        &self,
        amount: Decimal,
        currency: &str,
        payment_token: Option<&str>,
    ) -> Result<PaymentAuthorization, ServiceError> {
        if let Some(token) = payment_token {
            if token.starts_with("decline") {
                return Err(ServiceError::PaymentFailed(
                    "Payment was declined".to_string(),
                ));
            }
        }

        let reference = format!("auth_{}", Uuid::new_v4().simple());
        info!(%amount, currency, reference, "Payment authorized");
        Ok(PaymentAuthorization { reference })
    }
}
