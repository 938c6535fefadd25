// src/handlers/parcelas.rs

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
    middleware::auth::AuthenticatedUser,
    models::{
        dashboard::{EstatisticasParcelas, Transacao},
        emprestimo::SuccessResponse,
        parcela::{PagarParcelaPayload, PagarParcelaResponse, Parcela, UpdateParcelaPayload},
    },
};

// POST /api/parcelas/{id}/pagar
#[utoipa::path(
    post,
    path = "/api/parcelas/{id}/pagar",
    tag = "Parcelas",
    request_body = PagarParcelaPayload,
    params(("id" = Uuid, Path, description = "ID da parcela")),
    responses(
        (status = 200, description = "Parcela paga", body = PagarParcelaResponse),
        (status = 404, description = "Parcela não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn pagar_parcela(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PagarParcelaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let resposta = app_state.parcela_service
        .pagar(id, &payload, user.audit_name())
        .await?;

    Ok((StatusCode::OK, Json(resposta)))
}

// PUT /api/parcelas/{id}
#[utoipa::path(
    put,
    path = "/api/parcelas/{id}",
    tag = "Parcelas",
    request_body = UpdateParcelaPayload,
    params(("id" = Uuid, Path, description = "ID da parcela")),
    responses(
        (status = 200, description = "Parcela atualizada", body = Parcela),
        (status = 404, description = "Parcela não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_parcela(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateParcelaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let parcela = app_state.parcela_service
        .update(id, &payload, user.audit_name())
        .await?;

    Ok((StatusCode::OK, Json(parcela)))
}

// DELETE /api/parcelas/{id}
#[utoipa::path(
    delete,
    path = "/api/parcelas/{id}",
    tag = "Parcelas",
    params(("id" = Uuid, Path, description = "ID da parcela")),
    responses(
        (status = 200, description = "Parcela excluída", body = SuccessResponse),
        (status = 404, description = "Parcela não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_parcela(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.parcela_service.delete(id).await?;
    Ok((StatusCode::OK, Json(SuccessResponse::ok())))
}

// GET /api/parcelas/transacoes-recentes
#[utoipa::path(
    get,
    path = "/api/parcelas/transacoes-recentes",
    tag = "Parcelas",
    responses((status = 200, description = "Últimas 20 movimentações (empréstimos e pagamentos)", body = Vec<Transacao>)),
    security(("api_jwt" = []))
)]
pub async fn transacoes_recentes(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let transacoes = app_state.dashboard_service.transacoes_recentes().await?;
    Ok((StatusCode::OK, Json(transacoes)))
}

// GET /api/parcelas/estatisticas
#[utoipa::path(
    get,
    path = "/api/parcelas/estatisticas",
    tag = "Parcelas",
    responses((status = 200, description = "Contagem de parcelas por situação", body = EstatisticasParcelas)),
    security(("api_jwt" = []))
)]
pub async fn estatisticas(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.parcela_service.estatisticas().await?;
    Ok((StatusCode::OK, Json(stats)))
}
