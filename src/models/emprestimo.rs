// src/models/emprestimo.rs

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::money::{as_percent, as_reais, as_reais_opt};
use crate::models::cliente::Cliente;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_emprestimo", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TipoEmprestimo {
    Parcelado,       // Parcelas com vencimento
    JurosRecorrente, // Só juros mensais + amortizações
}

impl fmt::Display for TipoEmprestimo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TipoEmprestimo::Parcelado => write!(f, "parcelado"),
            TipoEmprestimo::JurosRecorrente => write!(f, "juros_recorrente"),
        }
    }
}

/// Status compartilhado por empréstimos e parcelas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_pagamento", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StatusPagamento {
    Pendente,
    Pago,
    Atrasado,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Emprestimo {
    pub id: Uuid,
    pub cliente_id: Uuid,
    pub tipo_emprestimo: TipoEmprestimo,

    // Valores em centavos no banco, reais no JSON
    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64, example = 5000.0)]
    pub valor_emprestado: i64,

    #[serde(serialize_with = "as_percent")]
    #[schema(value_type = f64, example = 10.5)]
    pub taxa_juros: i32,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64, example = 4000.0)]
    pub saldo_devedor: i64,

    pub quantidade_parcelas: i32,

    #[serde(serialize_with = "as_reais")]
    #[schema(value_type = f64, example = 1000.0)]
    pub valor_parcela: i64,

    #[serde(serialize_with = "as_reais_opt")]
    #[schema(value_type = Option<f64>, example = 420.0)]
    pub valor_juros_mensal: Option<i64>,

    #[schema(value_type = String, format = Date, example = "2025-01-10")]
    pub data_emprestimo: NaiveDate,
    #[schema(value_type = Option<String>, format = Date, example = "2025-02-10")]
    pub data_vencimento: Option<NaiveDate>,

    pub status: StatusPagamento,
    pub data_pagamento: Option<DateTime<Utc>>,

    // Auditoria
    pub modificado_por: Option<String>,
    pub modificado_em: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Linha da listagem: empréstimo + cliente + total com juros.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmprestimoComCliente {
    #[serde(flatten)]
    pub emprestimo: Emprestimo,

    pub cliente: Option<Cliente>,

    // Reais, sem arredondamento (principal + um período de juros)
    #[schema(value_type = f64, example = 5525.0)]
    pub valor_total: Decimal,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateParceladoPayload {
    pub cliente_id: Uuid,

    #[validate(custom(function = "crate::common::validation::positive"))]
    #[schema(value_type = f64, example = 5000.0)]
    pub valor_emprestado: Decimal,

    /// Taxa mensal em porcentagem (10.5 = 10,5%)
    #[validate(custom(function = "crate::common::validation::non_negative"))]
    #[schema(value_type = f64, example = 8.0)]
    pub taxa_juros: Decimal,

    #[validate(range(min = 1, max = 600, message = "A quantidade de parcelas deve estar entre 1 e 600."))]
    #[schema(example = 5)]
    pub quantidade_parcelas: i32,

    /// Valor base da 1ª parcela. Se ausente, usa valorEmprestado / quantidadeParcelas.
    #[validate(custom(function = "crate::common::validation::positive"))]
    #[schema(value_type = Option<f64>, example = 1000.0)]
    pub valor_parcela: Option<Decimal>,

    #[schema(value_type = String, format = Date, example = "2025-01-10")]
    pub data_emprestimo: NaiveDate,

    /// Vencimento da primeira parcela
    #[schema(value_type = String, format = Date, example = "2025-02-10")]
    pub data_vencimento: NaiveDate,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateJurosRecorrentePayload {
    pub cliente_id: Uuid,

    #[validate(custom(function = "crate::common::validation::positive"))]
    #[schema(value_type = f64, example = 10000.0)]
    pub valor_emprestado: Decimal,

    #[validate(custom(function = "crate::common::validation::non_negative"))]
    #[schema(value_type = f64, example = 8.0)]
    pub taxa_juros: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-01-10")]
    pub data_emprestimo: NaiveDate,

    #[schema(value_type = Option<String>, format = Date, example = "2025-02-10")]
    pub data_vencimento: Option<NaiveDate>,
}

/// Edição manual. `taxaJuros` e `quantidadeParcelas` só são aceitos em empréstimos parcelados.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmprestimoPayload {
    #[validate(custom(function = "crate::common::validation::positive"))]
    #[schema(value_type = Option<f64>)]
    pub valor_emprestado: Option<Decimal>,

    #[validate(custom(function = "crate::common::validation::non_negative"))]
    #[schema(value_type = Option<f64>)]
    pub taxa_juros: Option<Decimal>,

    #[validate(range(min = 1, max = 600, message = "A quantidade de parcelas deve estar entre 1 e 600."))]
    pub quantidade_parcelas: Option<i32>,

    #[schema(value_type = Option<String>, format = Date)]
    pub data_emprestimo: Option<NaiveDate>,

    #[schema(value_type = Option<String>, format = Date)]
    pub data_vencimento: Option<NaiveDate>,
}

/// Campos já convertidos para centavos/centésimos, prontos para o repositório.
#[derive(Debug, Default, Clone)]
pub struct EmprestimoChanges {
    pub valor_emprestado: Option<i64>,
    pub taxa_juros: Option<i32>,
    pub quantidade_parcelas: Option<i32>,
    pub data_emprestimo: Option<NaiveDate>,
    pub data_vencimento: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true, message: None }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self { success: true, message: Some(message.into()) }
    }
}
