// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "papel_usuario", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PapelUsuario {
    Admin,
    Operador,
}

// Representa um usuário do sistema vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: Uuid,

    #[schema(example = "financeiro")]
    pub username: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub senha_hash: String,

    #[schema(example = "Bruno")]
    pub nome: String,
    pub email: Option<String>,
    pub papel: PapelUsuario,
    pub ativo: bool,
    pub ultima_atividade: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "Informe o usuário."))]
    #[schema(example = "financeiro")]
    pub username: String,

    #[validate(length(min = 1, message = "Informe a senha."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub usuario: Usuario,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUsuarioPayload {
    #[validate(length(min = 3, message = "Username deve ter no mínimo 3 caracteres."))]
    pub username: String,

    #[validate(length(min = 6, message = "Senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    #[validate(length(min = 1, message = "Nome é obrigatório."))]
    pub nome: String,

    #[validate(email(message = "Email inválido."))]
    pub email: Option<String>,

    pub papel: PapelUsuario,
}

/// Exclusão exige a senha do administrador que está executando.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeleteUsuarioPayload {
    #[validate(length(min = 1, message = "Informe a senha."))]
    pub password: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,          // Subject (ID do usuário)
    pub papel: PapelUsuario,
    pub nome: String,
    pub exp: usize,         // Expiration time (quando o token expira)
    pub iat: usize,         // Issued At (quando o token foi criado)
}
