// src/models/juros.rs

// Empréstimos com juros recorrente: pagamentos de juros e amortizações do principal.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::money::as_reais;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagamentoJuros {
    pub id: Uuid,
    pub emprestimo_id: Uuid,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64, example = 800.0)]
    pub valor_pago: i64,

    #[schema(value_type = String, format = Date, example = "2025-02-10")]
    pub data_pagamento: NaiveDate,

    pub observacao: Option<String>,

    pub modificado_por: Option<String>,
    pub modificado_em: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Snapshot do saldo e do juros no momento da amortização.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Amortizacao {
    pub id: Uuid,
    pub emprestimo_id: Uuid,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64, example = 2000.0)]
    pub valor_amortizado: i64,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64, example = 10000.0)]
    pub saldo_anterior: i64,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64, example = 8000.0)]
    pub saldo_novo: i64,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64, example = 800.0)]
    pub juros_anterior: i64,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64, example = 640.0)]
    pub juros_novo: i64,

    #[schema(value_type = String, format = Date, example = "2025-03-10")]
    pub data_amortizacao: NaiveDate,

    pub observacao: Option<String>,

    pub modificado_por: Option<String>,
    pub modificado_em: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotaisJurosRecorrente {
    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64)]
    pub total_juros_pagos: i64,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64)]
    pub total_amortizado: i64,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64)]
    pub total_pago: i64,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64)]
    pub saldo_devedor: i64,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64)]
    pub valor_emprestado: i64,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64)]
    pub valor_juros_mensal: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AmortizacaoRegistrada {
    pub id: Uuid,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64, example = 8000.0)]
    pub saldo_novo: i64,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64, example = 640.0)]
    pub juros_novo: i64,

    pub emprestimo_quitado: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecalculado {
    pub amortizacoes_reaplicadas: usize,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64)]
    pub saldo_devedor: i64,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64)]
    pub valor_juros_mensal: i64,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrarPagamentoJurosPayload {
    #[validate(custom(function = "crate::common::validation::positive"))]
    #[schema(value_type = f64, example = 800.0)]
    pub valor_pago: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-02-10")]
    pub data_pagamento: NaiveDate,

    pub observacao: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePagamentoJurosPayload {
    #[validate(custom(function = "crate::common::validation::positive"))]
    #[schema(value_type = Option<f64>)]
    pub valor_pago: Option<Decimal>,

    #[schema(value_type = Option<String>, format = Date)]
    pub data_pagamento: Option<NaiveDate>,

    pub observacao: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrarAmortizacaoPayload {
    #[validate(custom(function = "crate::common::validation::positive"))]
    #[schema(value_type = f64, example = 2000.0)]
    pub valor_amortizado: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-03-10")]
    pub data_amortizacao: NaiveDate,

    pub observacao: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAmortizacaoPayload {
    #[validate(custom(function = "crate::common::validation::positive"))]
    #[schema(value_type = Option<f64>)]
    pub valor_amortizado: Option<Decimal>,

    #[schema(value_type = Option<String>, format = Date)]
    pub data_amortizacao: Option<NaiveDate>,

    pub observacao: Option<String>,
}
