// src/models/cliente.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cliente {
    pub id: Uuid,

    #[schema(example = "Maria da Silva")]
    pub nome: String,

    #[schema(example = "(11) 99999-8888")]
    pub telefone: Option<String>,

    #[schema(example = "maria@email.com")]
    pub email: Option<String>,

    // Texto livre do operador
    pub anotacoes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Maria da Silva")]
    pub nome: String,

    #[validate(length(max = 20, message = "Telefone muito longo."))]
    pub telefone: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub anotacoes: Option<String>,
}

/// Campos ausentes não são alterados.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub nome: Option<String>,

    #[validate(length(max = 20, message = "Telefone muito longo."))]
    pub telefone: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub anotacoes: Option<String>,
}
