// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    models::dashboard::{DashboardStats, PaymentStats},
};

// GET /api/dashboard/stats
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Total a receber, lucro potencial, atrasados e clientes ativos", body = DashboardStats),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stats(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.dashboard_service.stats().await?;
    Ok((StatusCode::OK, Json(stats)))
}

// GET /api/dashboard/payment-stats
#[utoipa::path(
    get,
    path = "/api/dashboard/payment-stats",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Contagem por status e ranking de pontualidade", body = PaymentStats),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_payment_stats(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.dashboard_service.payment_stats().await?;
    Ok((StatusCode::OK, Json(stats)))
}
