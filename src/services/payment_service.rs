//! Verificación de pagos
//!
//! El widget de pago devuelve un estado; solo `APPROVED` confirma la
//! reserva. Si hay `WOMPI_API_URL` configurada y el cliente envía el id de
//! transacción, además se consulta la transacción en la pasarela.

use reqwest::Client;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::Deserialize;
use tracing::{info, warn};

use crate::dto::reservation_dto::PaymentInfo;
use crate::utils::errors::{AppError, AppResult};

pub const APPROVED_STATUS: &str = "APPROVED";

#[derive(Debug, Deserialize)]
struct WompiTransactionResponse {
    data: WompiTransaction,
}

#[derive(Debug, Deserialize)]
struct WompiTransaction {
    status: String,
    reference: String,
    amount_in_cents: i64,
}

/// Valor en centavos, como lo maneja la pasarela
pub fn amount_in_cents(total: Decimal) -> AppResult<i64> {
    (total * Decimal::from(100))
        .round()
        .to_i64()
        .ok_or_else(|| AppError::Internal(format!("Monto inválido: {}", total)))
}

/// Revisar solo el estado reportado por el widget
pub fn check_status(payment: &PaymentInfo) -> AppResult<()> {
    if payment.status != APPROVED_STATUS {
        return Err(AppError::PaymentDeclined(format!(
            "Payment not completed: {}",
            payment.status
        )));
    }
    Ok(())
}

pub struct PaymentService {
    client: Client,
    gateway_url: Option<String>,
}

impl PaymentService {
    pub fn new(client: Client, gateway_url: Option<String>) -> Self {
        Self { client, gateway_url }
    }

    /// Confirmar que el pago corresponde a la referencia y al total cotizado
    pub async fn verify(&self, payment: &PaymentInfo, reference: &str, total: Decimal) -> AppResult<()> {
        check_status(payment)?;

        let (Some(base_url), Some(transaction_id)) = (&self.gateway_url, &payment.transaction_id) else {
            return Ok(());
        };

        let url = format!("{}/transactions/{}", base_url.trim_end_matches('/'), transaction_id);
        info!("💳 Consultando transacción {} en la pasarela", transaction_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Error consultando la pasarela: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ExternalApi(format!("La pasarela respondió {}", status)));
        }

        let transaction = response
            .json::<WompiTransactionResponse>()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Respuesta inválida de la pasarela: {}", e)))?
            .data;

        if transaction.status != APPROVED_STATUS {
            return Err(AppError::PaymentDeclined(format!(
                "Payment not completed: {}",
                transaction.status
            )));
        }

        let expected_cents = amount_in_cents(total)?;
        if transaction.reference != reference || transaction.amount_in_cents != expected_cents {
            warn!(
                "⚠️ Transacción {} no coincide: referencia {} / {} centavos",
                transaction_id, transaction.reference, transaction.amount_in_cents
            );
            return Err(AppError::PaymentDeclined(
                "Transaction does not match the quoted booking".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(status: &str) -> PaymentInfo {
        PaymentInfo {
            method: "Wompi".to_string(),
            status: status.to_string(),
            transaction_id: None,
        }
    }

    #[test]
    fn test_only_approved_passes() {
        assert!(check_status(&payment("APPROVED")).is_ok());
        for status in ["DECLINED", "VOIDED", "ERROR", "approved", ""] {
            let err = check_status(&payment(status)).unwrap_err();
            assert_eq!(err.code(), "PAYMENT_DECLINED");
        }
    }

    #[test]
    fn test_amount_in_cents() {
        assert_eq!(amount_in_cents(Decimal::new(15750, 0)).unwrap(), 1_575_000);
        assert_eq!(amount_in_cents(Decimal::new(1050, 1)).unwrap(), 10_500);
    }

    #[tokio::test]
    async fn test_verify_without_gateway_only_checks_status() {
        let service = PaymentService::new(Client::new(), None);
        let mut info = payment("APPROVED");
        info.transaction_id = Some("123-abc".to_string());
        assert!(service.verify(&info, "PK-ABCDEFGHIJ", Decimal::new(15750, 0)).await.is_ok());
        assert!(service.verify(&payment("DECLINED"), "PK-ABCDEFGHIJ", Decimal::ONE).await.is_err());
    }
}
