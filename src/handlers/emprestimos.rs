// src/handlers/emprestimos.rs

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
        emprestimo::{
            CreateJurosRecorrentePayload, CreateParceladoPayload, Emprestimo, EmprestimoComCliente,
            SuccessResponse, UpdateEmprestimoPayload,
        },
        parcela::{CreateParcelaPayload, Parcela, RecalculoParcelasResponse},
    },
};

// =============================================================================
//  CONSULTAS
// =============================================================================

// GET /api/emprestimos
#[utoipa::path(
    get,
    path = "/api/emprestimos",
    tag = "Emprestimos",
    responses((status = 200, description = "Empréstimos com cliente e valor total", body = Vec<EmprestimoComCliente>)),
    security(("api_jwt" = []))
)]
pub async fn list_emprestimos(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let emprestimos = app_state.emprestimo_service.list().await?;
    Ok((StatusCode::OK, Json(emprestimos)))
}

// GET /api/emprestimos/{id}
#[utoipa::path(
    get,
    path = "/api/emprestimos/{id}",
    tag = "Emprestimos",
    params(("id" = Uuid, Path, description = "ID do empréstimo")),
    responses(
        (status = 200, description = "Empréstimo", body = Emprestimo),
        (status = 404, description = "Empréstimo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_emprestimo(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let emprestimo = app_state.emprestimo_service.get(id).await?;
    Ok((StatusCode::OK, Json(emprestimo)))
}

// =============================================================================
//  CRIAÇÃO E EDIÇÃO
// =============================================================================

// POST /api/emprestimos
#[utoipa::path(
    post,
    path = "/api/emprestimos",
    tag = "Emprestimos",
    request_body = CreateParceladoPayload,
    responses(
        (status = 201, description = "Empréstimo parcelado criado com as parcelas", body = Emprestimo),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_parcelado(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateParceladoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let emprestimo = app_state.emprestimo_service
        .create_parcelado(&payload, user.audit_name())
        .await?;

    Ok((StatusCode::CREATED, Json(emprestimo)))
}

// POST /api/emprestimos/juros-recorrente
#[utoipa::path(
    post,
    path = "/api/emprestimos/juros-recorrente",
    tag = "Emprestimos",
    request_body = CreateJurosRecorrentePayload,
    responses(
        (status = 201, description = "Empréstimo de juros recorrente criado", body = Emprestimo),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_juros_recorrente(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateJurosRecorrentePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let emprestimo = app_state.emprestimo_service
        .create_juros_recorrente(&payload, user.audit_name())
        .await?;

    Ok((StatusCode::CREATED, Json(emprestimo)))
}

// PUT /api/emprestimos/{id}
#[utoipa::path(
    put,
    path = "/api/emprestimos/{id}",
    tag = "Emprestimos",
    request_body = UpdateEmprestimoPayload,
    params(("id" = Uuid, Path, description = "ID do empréstimo")),
    responses(
        (status = 200, description = "Empréstimo atualizado", body = Emprestimo),
        (status = 400, description = "Campo não editável para este tipo de empréstimo"),
        (status = 404, description = "Empréstimo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_emprestimo(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmprestimoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let emprestimo = app_state.emprestimo_service
        .update(id, &payload, user.audit_name())
        .await?;

    Ok((StatusCode::OK, Json(emprestimo)))
}

// POST /api/emprestimos/{id}/marcar-pago
#[utoipa::path(
    post,
    path = "/api/emprestimos/{id}/marcar-pago",
    tag = "Emprestimos",
    params(("id" = Uuid, Path, description = "ID do empréstimo")),
    responses(
        (status = 200, description = "Empréstimo marcado como pago", body = SuccessResponse),
        (status = 404, description = "Empréstimo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn marcar_como_pago(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.emprestimo_service
        .marcar_como_pago(id, user.audit_name())
        .await?;

    Ok((StatusCode::OK, Json(SuccessResponse::ok())))
}

// =============================================================================
//  PARCELAS DO EMPRÉSTIMO
// =============================================================================

// GET /api/emprestimos/{id}/parcelas
#[utoipa::path(
    get,
    path = "/api/emprestimos/{id}/parcelas",
    tag = "Parcelas",
    params(("id" = Uuid, Path, description = "ID do empréstimo")),
    responses(
        (status = 200, description = "Parcelas ordenadas por número", body = Vec<Parcela>),
        (status = 404, description = "Empréstimo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_parcelas(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let parcelas = app_state.emprestimo_service.list_parcelas(id).await?;
    Ok((StatusCode::OK, Json(parcelas)))
}

// POST /api/emprestimos/{id}/parcelas
#[utoipa::path(
    post,
    path = "/api/emprestimos/{id}/parcelas",
    tag = "Parcelas",
    request_body = CreateParcelaPayload,
    params(("id" = Uuid, Path, description = "ID do empréstimo")),
    responses(
        (status = 201, description = "Parcela criada", body = Parcela),
        (status = 404, description = "Empréstimo não encontrado"),
        (status = 409, description = "Número de parcela já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_parcela(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateParcelaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let parcela = app_state.emprestimo_service
        .create_parcela(id, &payload, user.audit_name())
        .await?;

    Ok((StatusCode::CREATED, Json(parcela)))
}

// POST /api/emprestimos/{id}/recalcular-parcelas
#[utoipa::path(
    post,
    path = "/api/emprestimos/{id}/recalcular-parcelas",
    tag = "Parcelas",
    params(("id" = Uuid, Path, description = "ID do empréstimo")),
    responses(
        (status = 200, description = "Parcelas em aberto recalculadas", body = RecalculoParcelasResponse),
        (status = 400, description = "Empréstimo não é parcelado"),
        (status = 404, description = "Empréstimo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn recalcular_parcelas(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let resposta = app_state.emprestimo_service
        .recalcular_parcelas(id, user.audit_name())
        .await?;

    Ok((StatusCode::OK, Json(resposta)))
}

// POST /api/emprestimos/{id}/lembrete-atraso
#[utoipa::path(
    post,
    path = "/api/emprestimos/{id}/lembrete-atraso",
    tag = "Emprestimos",
    params(("id" = Uuid, Path, description = "ID do empréstimo")),
    responses(
        (status = 200, description = "Lembrete enviado", body = SuccessResponse),
        (status = 400, description = "Cliente sem e-mail"),
        (status = 404, description = "Empréstimo ou cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn enviar_lembrete_atraso(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let resposta = app_state.emprestimo_service.enviar_lembrete_atraso(id).await?;
    Ok((StatusCode::OK, Json(resposta)))
}
