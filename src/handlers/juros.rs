// src/handlers/juros.rs

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
        emprestimo::SuccessResponse,
        juros::{
            Amortizacao, AmortizacaoRegistrada, LedgerRecalculado, PagamentoJuros, RegistrarAmortizacaoPayload,
            RegistrarPagamentoJurosPayload, TotaisJurosRecorrente, UpdateAmortizacaoPayload,
            UpdatePagamentoJurosPayload,
        },
    },
};

// =============================================================================
//  ÁREA 1: PAGAMENTOS DE JUROS
// =============================================================================

// GET /api/emprestimos/{id}/pagamentos-juros
#[utoipa::path(
    get,
    path = "/api/emprestimos/{id}/pagamentos-juros",
    tag = "Juros Recorrente",
    params(("id" = Uuid, Path, description = "ID do empréstimo")),
    responses(
        (status = 200, description = "Pagamentos de juros, mais recentes primeiro", body = Vec<PagamentoJuros>),
        (status = 404, description = "Empréstimo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_pagamentos(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pagamentos = app_state.juros_service.list_pagamentos(id).await?;
    Ok((StatusCode::OK, Json(pagamentos)))
}

// POST /api/emprestimos/{id}/pagamentos-juros
#[utoipa::path(
    post,
    path = "/api/emprestimos/{id}/pagamentos-juros",
    tag = "Juros Recorrente",
    request_body = RegistrarPagamentoJurosPayload,
    params(("id" = Uuid, Path, description = "ID do empréstimo")),
    responses(
        (status = 201, description = "Pagamento registrado (saldo inalterado)", body = PagamentoJuros),
        (status = 400, description = "Empréstimo não é de juros recorrente"),
        (status = 404, description = "Empréstimo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn registrar_pagamento(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RegistrarPagamentoJurosPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let pagamento = app_state.juros_service
        .registrar_pagamento(id, &payload, user.audit_name())
        .await?;

    Ok((StatusCode::CREATED, Json(pagamento)))
}

// PUT /api/pagamentos-juros/{id}
#[utoipa::path(
    put,
    path = "/api/pagamentos-juros/{id}",
    tag = "Juros Recorrente",
    request_body = UpdatePagamentoJurosPayload,
    params(("id" = Uuid, Path, description = "ID do pagamento de juros")),
    responses(
        (status = 200, description = "Pagamento atualizado", body = PagamentoJuros),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_pagamento(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePagamentoJurosPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let pagamento = app_state.juros_service
        .update_pagamento(id, &payload, user.audit_name())
        .await?;

    Ok((StatusCode::OK, Json(pagamento)))
}

// DELETE /api/pagamentos-juros/{id}
#[utoipa::path(
    delete,
    path = "/api/pagamentos-juros/{id}",
    tag = "Juros Recorrente",
    params(("id" = Uuid, Path, description = "ID do pagamento de juros")),
    responses(
        (status = 200, description = "Pagamento excluído", body = SuccessResponse),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_pagamento(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.juros_service.delete_pagamento(id).await?;
    Ok((StatusCode::OK, Json(SuccessResponse::ok())))
}

// =============================================================================
//  ÁREA 2: AMORTIZAÇÕES
// =============================================================================

// GET /api/emprestimos/{id}/amortizacoes
#[utoipa::path(
    get,
    path = "/api/emprestimos/{id}/amortizacoes",
    tag = "Juros Recorrente",
    params(("id" = Uuid, Path, description = "ID do empréstimo")),
    responses(
        (status = 200, description = "Amortizações em ordem cronológica", body = Vec<Amortizacao>),
        (status = 404, description = "Empréstimo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_amortizacoes(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let amortizacoes = app_state.juros_service.list_amortizacoes(id).await?;
    Ok((StatusCode::OK, Json(amortizacoes)))
}

// POST /api/emprestimos/{id}/amortizacoes
#[utoipa::path(
    post,
    path = "/api/emprestimos/{id}/amortizacoes",
    tag = "Juros Recorrente",
    request_body = RegistrarAmortizacaoPayload,
    params(("id" = Uuid, Path, description = "ID do empréstimo")),
    responses(
        (status = 201, description = "Amortização registrada", body = AmortizacaoRegistrada),
        (status = 400, description = "Valor excede o saldo ou empréstimo não é de juros recorrente"),
        (status = 404, description = "Empréstimo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn registrar_amortizacao(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RegistrarAmortizacaoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let resposta = app_state.juros_service
        .registrar_amortizacao(id, &payload, user.audit_name())
        .await?;

    Ok((StatusCode::CREATED, Json(resposta)))
}

// PUT /api/amortizacoes/{id}
#[utoipa::path(
    put,
    path = "/api/amortizacoes/{id}",
    tag = "Juros Recorrente",
    request_body = UpdateAmortizacaoPayload,
    params(("id" = Uuid, Path, description = "ID da amortização")),
    responses(
        (status = 200, description = "Amortização atualizada", body = Amortizacao),
        (status = 400, description = "Novo valor excede o saldo"),
        (status = 404, description = "Amortização não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_amortizacao(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAmortizacaoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let amortizacao = app_state.juros_service
        .update_amortizacao(id, &payload, user.audit_name())
        .await?;

    Ok((StatusCode::OK, Json(amortizacao)))
}

// DELETE /api/amortizacoes/{id}
#[utoipa::path(
    delete,
    path = "/api/amortizacoes/{id}",
    tag = "Juros Recorrente",
    params(("id" = Uuid, Path, description = "ID da amortização")),
    responses(
        (status = 200, description = "Amortização desfeita", body = SuccessResponse),
        (status = 404, description = "Amortização não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_amortizacao(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.juros_service
        .delete_amortizacao(id, user.audit_name())
        .await?;

    Ok((StatusCode::OK, Json(SuccessResponse::ok())))
}

// =============================================================================
//  ÁREA 3: TOTAIS E RECÁLCULO
// =============================================================================

// GET /api/emprestimos/{id}/totais-juros-recorrente
#[utoipa::path(
    get,
    path = "/api/emprestimos/{id}/totais-juros-recorrente",
    tag = "Juros Recorrente",
    params(("id" = Uuid, Path, description = "ID do empréstimo")),
    responses(
        (status = 200, description = "Totais pagos, saldo e juros atual", body = TotaisJurosRecorrente),
        (status = 404, description = "Empréstimo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn totais(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let totais = app_state.juros_service.totais(id).await?;
    Ok((StatusCode::OK, Json(totais)))
}

// POST /api/emprestimos/{id}/recalcular-ledger
#[utoipa::path(
    post,
    path = "/api/emprestimos/{id}/recalcular-ledger",
    tag = "Juros Recorrente",
    params(("id" = Uuid, Path, description = "ID do empréstimo")),
    responses(
        (status = 200, description = "Histórico de amortizações reprocessado", body = LedgerRecalculado),
        (status = 400, description = "Histórico inconsistente com o valor emprestado"),
        (status = 404, description = "Empréstimo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn recalcular_ledger(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let resposta = app_state.juros_service
        .recalcular_ledger(id, user.audit_name())
        .await?;

    Ok((StatusCode::OK, Json(resposta)))
}
