// src/models/parcela.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::money::{as_reais, as_reais_opt};
use crate::models::emprestimo::StatusPagamento;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Parcela {
    pub id: Uuid,
    pub emprestimo_id: Uuid,

    // 1, 2, 3... (único por empréstimo)
    pub numero_parcela: i32,

    #[schema(value_type = String, format = Date, example = "2025-02-10")]
    pub data_vencimento: NaiveDate,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64, example = 1080.0)]
    pub valor_parcela: i64,

    pub data_pagamento: Option<DateTime<Utc>>,

    #[serde(serialize_with = "as_reais_opt")]
    #[schema(value_type = Option<f64>)]
    pub valor_pago: Option<i64>,

    pub status: StatusPagamento,

    pub modificado_por: Option<String>,
    pub modificado_em: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Parcela {
    pub fn is_paid(&self) -> bool {
        self.status == StatusPagamento::Pago
    }
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagarParcelaPayload {
    #[validate(custom(function = "crate::common::validation::positive"))]
    #[schema(value_type = f64, example = 1080.0)]
    pub valor_pago: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateParcelaPayload {
    #[validate(range(min = 1, message = "O número da parcela deve ser positivo."))]
    pub numero_parcela: i32,

    #[validate(custom(function = "crate::common::validation::positive"))]
    #[schema(value_type = f64, example = 1000.0)]
    pub valor_parcela: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-06-10")]
    pub data_vencimento: NaiveDate,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParcelaPayload {
    #[validate(custom(function = "crate::common::validation::positive"))]
    #[schema(value_type = Option<f64>)]
    pub valor_parcela: Option<Decimal>,

    #[schema(value_type = Option<String>, format = Date)]
    pub data_vencimento: Option<NaiveDate>,

    pub data_pagamento: Option<DateTime<Utc>>,

    pub status: Option<StatusPagamento>,
}

/// Campos da edição manual já em centavos.
#[derive(Debug, Default, Clone)]
pub struct ParcelaChanges {
    pub valor_parcela: Option<i64>,
    pub data_vencimento: Option<NaiveDate>,
    pub data_pagamento: Option<DateTime<Utc>>,
    pub status: Option<StatusPagamento>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagarParcelaResponse {
    pub success: bool,
    /// true quando esta era a última parcela em aberto
    pub emprestimo_quitado: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecalculoParcelasResponse {
    pub success: bool,
    pub parcelas_atualizadas: usize,
    pub parcelas_criadas: usize,
    pub parcelas_preservadas: usize,
    #[schema(value_type = f64)]
    pub valor_parcela: Decimal,
}
