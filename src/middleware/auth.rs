// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState, models::auth::Usuario};

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
}

// Valida o token e deixa o usuário nos "extensions" da requisição
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Cópia do token: a requisição não pode ficar emprestada durante o await
    let token = bearer_token(&request).map(str::to_owned).ok_or(AppError::InvalidToken)?;
    let usuario = app_state.auth_service.validate_token(&token).await?;

    request.extensions_mut().insert(usuario);
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Usuario);

impl AuthenticatedUser {
    /// Nome gravado em `modificadoPor`.
    pub fn audit_name(&self) -> &str {
        &self.0.nome
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Usuario>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request as HttpRequest};

    #[test]
    fn extrai_token_bearer() {
        let request = HttpRequest::builder()
            .header("Authorization", "Bearer abc.def.ghi")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&request), Some("abc.def.ghi"));
    }

    #[test]
    fn ignora_esquema_diferente_de_bearer() {
        let request = HttpRequest::builder()
            .header("Authorization", "Basic dXNlcjpzZW5oYQ==")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&request), None);

        let sem_header = HttpRequest::builder().body(Body::empty()).unwrap();
        assert_eq!(bearer_token(&sem_header), None);
    }

    #[tokio::test]
    async fn sem_usuario_nos_extensions_e_token_invalido() {
        let (mut parts, _) = HttpRequest::builder().body(()).unwrap().into_parts();
        let result = AuthenticatedUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }
}
