// src/handlers/usuarios.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{ManageUsers, RequireCapability},
    },
    models::{
        auth::{CreateUsuarioPayload, DeleteUsuarioPayload, Usuario},
        emprestimo::SuccessResponse,
    },
};

// GET /api/usuarios
#[utoipa::path(
    get,
    path = "/api/usuarios",
    tag = "Usuarios",
    responses(
        (status = 200, description = "Usuários do sistema", body = Vec<Usuario>),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_usuarios(
    State(app_state): State<AppState>,
    _: RequireCapability<ManageUsers>,
) -> Result<impl IntoResponse, AppError> {
    let usuarios = app_state.auth_service.list_usuarios().await?;
    Ok((StatusCode::OK, Json(usuarios)))
}

// POST /api/usuarios
#[utoipa::path(
    post,
    path = "/api/usuarios",
    tag = "Usuarios",
    request_body = CreateUsuarioPayload,
    responses(
        (status = 201, description = "Usuário criado", body = Usuario),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas administradores"),
        (status = 409, description = "Username já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_usuario(
    State(app_state): State<AppState>,
    _: RequireCapability<ManageUsers>,
    Json(payload): Json<CreateUsuarioPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let usuario = app_state.auth_service.create_usuario(&payload).await?;
    Ok((StatusCode::CREATED, Json(usuario)))
}

// DELETE /api/usuarios/{id}
#[utoipa::path(
    delete,
    path = "/api/usuarios/{id}",
    tag = "Usuarios",
    request_body = DeleteUsuarioPayload,
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário excluído", body = SuccessResponse),
        (status = 400, description = "Tentativa de excluir a si mesmo"),
        (status = 403, description = "Senha do administrador incorreta"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_usuario(
    State(app_state): State<AppState>,
    _: RequireCapability<ManageUsers>,
    AuthenticatedUser(admin): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DeleteUsuarioPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state.auth_service
        .delete_usuario(&admin, id, &payload.password)
        .await?;

    Ok((StatusCode::OK, Json(SuccessResponse::ok())))
}
