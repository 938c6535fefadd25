// src/services/reconciliation.rs

// Persistência da reclassificação pendente -> atrasado.
// A regra em si está em `ledger::status`; aqui só gravamos o que mudou.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{EmprestimoRepository, ParcelaRepository},
    ledger::status::reclassify,
    models::{emprestimo::Emprestimo, parcela::Parcela},
};

#[derive(Clone)]
pub struct StatusReconciler {
    emprestimo_repo: EmprestimoRepository,
    parcela_repo: ParcelaRepository,
    pool: PgPool,
}

impl StatusReconciler {
    pub fn new(emprestimo_repo: EmprestimoRepository, parcela_repo: ParcelaRepository, pool: PgPool) -> Self {
        Self { emprestimo_repo, parcela_repo, pool }
    }

    /// Atualiza a lista em memória e grava as mudanças. Devolve quantos mudaram.
    pub async fn reconcile_emprestimos(&self, emprestimos: &mut [Emprestimo], hoje: NaiveDate) -> Result<usize, AppError> {
        let mut alterados = 0;
        for emp in emprestimos.iter_mut() {
            if let Some(novo) = reclassify(emp.data_vencimento, emp.status, hoje) {
                // false: foi pago depois da nossa leitura
                if !self.emprestimo_repo.set_status(&self.pool, emp.id, novo).await? {
                    continue;
                }
                tracing::debug!("Empréstimo {} reclassificado: {:?} -> {:?}", emp.id, emp.status, novo);
                emp.status = novo;
                alterados += 1;
            }
        }
        Ok(alterados)
    }

    pub async fn reconcile_parcelas(&self, parcelas: &mut [Parcela], hoje: NaiveDate) -> Result<usize, AppError> {
        let mut alteradas = 0;
        for parcela in parcelas.iter_mut() {
            if let Some(novo) = reclassify(Some(parcela.data_vencimento), parcela.status, hoje) {
                if !self.parcela_repo.set_status(&self.pool, parcela.id, novo).await? {
                    continue;
                }
                parcela.status = novo;
                alteradas += 1;
            }
        }
        Ok(alteradas)
    }

    /// Uma passada completa sobre empréstimos e parcelas.
    pub async fn run_once(&self) -> Result<(usize, usize), AppError> {
        let hoje = Utc::now().date_naive();

        let mut emprestimos = self.emprestimo_repo.list().await?;
        let mut parcelas = self.parcela_repo.list_all().await?;

        let emp = self.reconcile_emprestimos(&mut emprestimos, hoje).await?;
        let parc = self.reconcile_parcelas(&mut parcelas, hoje).await?;
        Ok((emp, parc))
    }

    /// Roda `run_once` a cada `intervalo` até o processo encerrar.
    pub fn spawn(self, intervalo: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(intervalo);
            loop {
                ticker.tick().await;
                match self.run_once().await {
                    Ok((0, 0)) => {}
                    Ok((emp, parc)) => {
                        tracing::info!("🔄 Reconciliação: {} empréstimos e {} parcelas marcados como atrasados", emp, parc)
                    }
                    Err(e) => tracing::error!("Falha na reconciliação de status: {:?}", e),
                }
            }
        })
    }
}
