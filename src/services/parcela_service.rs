// src/services/parcela_service.rs

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, money::reais_to_cents},
    db::{EmprestimoRepository, ParcelaRepository},
    ledger::{
        stats::installment_stats,
        status::{close_out, closed_by_installments, ensure_payable},
        LedgerError,
    },
    models::{
        dashboard::EstatisticasParcelas,
        parcela::{PagarParcelaPayload, PagarParcelaResponse, Parcela, ParcelaChanges, UpdateParcelaPayload},
    },
};

#[derive(Clone)]
pub struct ParcelaService {
    parcela_repo: ParcelaRepository,
    emprestimo_repo: EmprestimoRepository,
    pool: PgPool,
}

impl ParcelaService {
    pub fn new(parcela_repo: ParcelaRepository, emprestimo_repo: EmprestimoRepository, pool: PgPool) -> Self {
        Self { parcela_repo, emprestimo_repo, pool }
    }

    /// Paga a parcela. Se era a última em aberto de um parcelado, o empréstimo também fica pago.
    pub async fn pagar(&self, id: Uuid, payload: &PagarParcelaPayload, usuario: &str) -> Result<PagarParcelaResponse, AppError> {
        let valor_pago = reais_to_cents(payload.valor_pago)?;
        if valor_pago <= 0 {
            return Err(LedgerError::NonPositiveAmount.into());
        }

        let mut tx = self.pool.begin().await?;

        let parcela = self.parcela_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Parcela"))?;
        ensure_payable(&parcela)?;

        // Trava o empréstimo: dois pagamentos simultâneos não podem ambos achar que não são o último.
        let emprestimo = self.emprestimo_repo
            .find_for_update(&mut *tx, parcela.emprestimo_id)
            .await?
            .ok_or(AppError::NotFound("Empréstimo"))?;

        let agora = Utc::now();
        // `None` aqui: outro pagamento chegou antes de pegarmos a trava
        self.parcela_repo
            .pagar(&mut *tx, id, valor_pago, agora, usuario)
            .await?
            .ok_or(LedgerError::InstallmentAlreadyPaid(parcela.numero_parcela))?;

        let em_aberto = self.parcela_repo.count_unpaid(&mut *tx, parcela.emprestimo_id).await?;
        let emprestimo_quitado = closed_by_installments(emprestimo.tipo_emprestimo, em_aberto);

        if let Some((status, data_pagamento)) = close_out(emprestimo.tipo_emprestimo, em_aberto, emprestimo.status, agora) {
            self.emprestimo_repo
                .update_status(&mut *tx, emprestimo.id, status, Some(data_pagamento), usuario)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "💵 Parcela {} do empréstimo {} paga por '{}'{}",
            parcela.numero_parcela,
            parcela.emprestimo_id,
            usuario,
            if emprestimo_quitado { " (empréstimo quitado)" } else { "" }
        );

        Ok(PagarParcelaResponse { success: true, emprestimo_quitado })
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateParcelaPayload, usuario: &str) -> Result<Parcela, AppError> {
        let changes = ParcelaChanges {
            valor_parcela: payload.valor_parcela.map(reais_to_cents).transpose()?,
            data_vencimento: payload.data_vencimento,
            data_pagamento: payload.data_pagamento,
            status: payload.status,
        };

        if matches!(changes.valor_parcela, Some(v) if v <= 0) {
            return Err(LedgerError::NonPositiveAmount.into());
        }

        self.parcela_repo
            .update(&self.pool, id, &changes, usuario)
            .await?
            .ok_or(AppError::NotFound("Parcela"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.parcela_repo.delete(id).await? {
            return Err(AppError::NotFound("Parcela"));
        }
        Ok(())
    }

    pub async fn estatisticas(&self) -> Result<EstatisticasParcelas, AppError> {
        let parcelas = self.parcela_repo.list_all().await?;
        Ok(installment_stats(&parcelas, Utc::now().date_naive()))
    }
}
