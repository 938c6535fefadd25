use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ledger::LedgerError;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Regras de negócio do motor financeiro (amortização > saldo, etc.)
    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("{0}")]
    BusinessRule(String),

    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    #[error("Username já está em uso")]
    UsernameAlreadyExists,

    #[error("Conflito: {0}")]
    Conflict(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Usuário inativo")]
    InactiveUser,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Converte violações de restrição do Postgres em erros amigáveis.
    pub fn from_db(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return match db_err.constraint() {
                    Some("usuarios_username_key") => AppError::UsernameAlreadyExists,
                    Some("parcelas_numero_por_emprestimo") => {
                        AppError::Conflict("Já existe uma parcela com esse número neste empréstimo.".into())
                    }
                    _ => AppError::Conflict("Registro duplicado.".into()),
                };
            }
            if db_err.is_foreign_key_violation() {
                return AppError::Conflict("O registro possui vínculos (ex: cliente com empréstimos).".into());
            }
            if db_err.is_check_violation() {
                return AppError::BusinessRule("Saldo devedor não pode ficar negativo.".into());
            }
        }
        AppError::DatabaseError(e)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::Ledger(_) | AppError::BusinessRule(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UsernameAlreadyExists | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InactiveUser | AppError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_message = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (status, body).into_response();
            }
            AppError::InvalidCredentials => "Usuário ou senha incorretos.".to_string(),
            AppError::InvalidToken => "Token de autenticação inválido ou ausente.".to_string(),
            AppError::UsernameAlreadyExists => "Username já está em uso.".to_string(),

            // 500: o `tracing` loga a mensagem detalhada, o cliente recebe uma genérica.
            ref e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                "Ocorreu um erro inesperado.".to_string()
            }
            e => e.to_string(),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn ledger_errors_are_bad_requests() {
        let err = AppError::from(LedgerError::AmortizationExceedsBalance { valor: 10, saldo: 5 });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Valor da amortização excede o saldo devedor.");
    }

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(AppError::NotFound("Empréstimo").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Forbidden("admin".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::UsernameAlreadyExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_names_the_resource() {
        assert_eq!(AppError::NotFound("Parcela").to_string(), "Parcela não encontrado(a)");
    }

    #[test]
    fn validation_errors_render_as_400() {
        #[derive(Validate)]
        struct Payload {
            #[validate(length(min = 1, message = "O nome é obrigatório."))]
            nome: String,
        }

        let errors = Payload { nome: String::new() }.validate().unwrap_err();
        let response = AppError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
