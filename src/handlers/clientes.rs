// src/handlers/clientes.rs

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
    models::{
        cliente::{Cliente, CreateClientePayload, UpdateClientePayload},
        emprestimo::{Emprestimo, SuccessResponse},
    },
};

// GET /api/clientes
#[utoipa::path(
    get,
    path = "/api/clientes",
    tag = "Clientes",
    responses((status = 200, description = "Lista de clientes", body = Vec<Cliente>)),
    security(("api_jwt" = []))
)]
pub async fn list_clientes(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let clientes = app_state.cliente_service.list().await?;
    Ok((StatusCode::OK, Json(clientes)))
}

// GET /api/clientes/{id}
#[utoipa::path(
    get,
    path = "/api/clientes/{id}",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente", body = Cliente),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_cliente(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let cliente = app_state.cliente_service.get(id).await?;
    Ok((StatusCode::OK, Json(cliente)))
}

// POST /api/clientes
#[utoipa::path(
    post,
    path = "/api/clientes",
    tag = "Clientes",
    request_body = CreateClientePayload,
    responses(
        (status = 201, description = "Cliente cadastrado", body = Cliente),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_cliente(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateClientePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let cliente = app_state.cliente_service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(cliente)))
}

// PUT /api/clientes/{id}
#[utoipa::path(
    put,
    path = "/api/clientes/{id}",
    tag = "Clientes",
    request_body = UpdateClientePayload,
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente atualizado", body = Cliente),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_cliente(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClientePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let cliente = app_state.cliente_service.update(id, &payload).await?;
    Ok((StatusCode::OK, Json(cliente)))
}

// DELETE /api/clientes/{id}
#[utoipa::path(
    delete,
    path = "/api/clientes/{id}",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente excluído", body = SuccessResponse),
        (status = 404, description = "Cliente não encontrado"),
        (status = 409, description = "Cliente ainda possui empréstimos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_cliente(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.cliente_service.delete(id).await?;
    Ok((StatusCode::OK, Json(SuccessResponse::ok())))
}

// POST /api/clientes/{id}/enviar-anotacoes
#[utoipa::path(
    post,
    path = "/api/clientes/{id}/enviar-anotacoes",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Anotações enviadas por e-mail", body = SuccessResponse),
        (status = 400, description = "Cliente sem e-mail"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn enviar_anotacoes(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let resposta = app_state.cliente_service.enviar_anotacoes(id).await?;
    Ok((StatusCode::OK, Json(resposta)))
}

// GET /api/clientes/{id}/emprestimos
#[utoipa::path(
    get,
    path = "/api/clientes/{id}/emprestimos",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Empréstimos do cliente", body = Vec<Emprestimo>),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_emprestimos_do_cliente(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let emprestimos = app_state.emprestimo_service.list_by_cliente(id).await?;
    Ok((StatusCode::OK, Json(emprestimos)))
}
