// src/handlers/auth.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::{AuthResponse, LoginPayload, Usuario},
        emprestimo::SuccessResponse,
    },
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login bem-sucedido", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas ou usuário inativo")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let resposta = app_state.auth_service
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(resposta))
}

// O token não fica guardado no servidor: basta o cliente descartá-lo.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Sessão encerrada", body = SuccessResponse))
)]
pub async fn logout() -> Json<SuccessResponse> {
    Json(SuccessResponse::ok())
}

// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário autenticado", body = Usuario),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(usuario): AuthenticatedUser) -> Json<Usuario> {
    Json(usuario)
}
