// src/services/dashboard_service.rs

use chrono::Utc;

use crate::{
    common::error::AppError,
    db::{EmprestimoRepository, ParcelaRepository},
    ledger::stats::{dashboard_totals, payment_stats, recent_transactions},
    models::dashboard::{DashboardStats, PaymentStats, Transacao},
    services::emprestimo_service::EmprestimoService,
};

#[derive(Clone)]
pub struct DashboardService {
    emprestimo_repo: EmprestimoRepository,
    parcela_repo: ParcelaRepository,
    emprestimo_service: EmprestimoService,
}

impl DashboardService {
    pub fn new(
        emprestimo_repo: EmprestimoRepository,
        parcela_repo: ParcelaRepository,
        emprestimo_service: EmprestimoService,
    ) -> Self {
        Self { emprestimo_repo, parcela_repo, emprestimo_service }
    }

    pub async fn stats(&self) -> Result<DashboardStats, AppError> {
        let emprestimos = self.emprestimo_repo.list().await?;
        Ok(dashboard_totals(&emprestimos, Utc::now().date_naive())?)
    }

    pub async fn payment_stats(&self) -> Result<PaymentStats, AppError> {
        // `list` já reconcilia os vencidos
        let emprestimos = self.emprestimo_service.list().await?;
        let (status_stats, ranking_clientes) = payment_stats(&emprestimos, Utc::now().date_naive());
        Ok(PaymentStats { status_stats, ranking_clientes })
    }

    pub async fn transacoes_recentes(&self) -> Result<Vec<Transacao>, AppError> {
        let emprestimos = self.emprestimo_service.list().await?;
        let parcelas = self.parcela_repo.list_all().await?;
        Ok(recent_transactions(&emprestimos, &parcelas))
    }
}
