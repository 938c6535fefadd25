// src/services/juros_service.rs

// Pagamentos de juros e amortizações dos empréstimos de juros recorrente.
// Toda operação que mexe no saldo trava a linha do empréstimo e roda numa transação.

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{error::AppError, money::reais_to_cents},
    db::{EmprestimoRepository, JurosRepository},
    ledger::{
        recurring::{apply_amortization, edit_amortization, replay, revert_amortization, settlement, totals},
        LedgerError,
    },
    models::{
        emprestimo::{Emprestimo, StatusPagamento, TipoEmprestimo},
        juros::{
            Amortizacao, AmortizacaoRegistrada, LedgerRecalculado, PagamentoJuros, RegistrarAmortizacaoPayload,
            RegistrarPagamentoJurosPayload, TotaisJurosRecorrente, UpdateAmortizacaoPayload,
            UpdatePagamentoJurosPayload,
        },
    },
};

fn exigir_juros_recorrente(emprestimo: &Emprestimo) -> Result<(), AppError> {
    if emprestimo.tipo_emprestimo != TipoEmprestimo::JurosRecorrente {
        return Err(LedgerError::WrongLoanType(TipoEmprestimo::JurosRecorrente).into());
    }
    Ok(())
}

#[derive(Clone)]
pub struct JurosService {
    juros_repo: JurosRepository,
    emprestimo_repo: EmprestimoRepository,
    pool: PgPool,
}

impl JurosService {
    pub fn new(juros_repo: JurosRepository, emprestimo_repo: EmprestimoRepository, pool: PgPool) -> Self {
        Self { juros_repo, emprestimo_repo, pool }
    }

    async fn emprestimo(&self, id: Uuid) -> Result<Emprestimo, AppError> {
        self.emprestimo_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("Empréstimo"))
    }

    /// Trava o empréstimo dono da amortização e relê o registro já sob a trava.
    /// Quem grava em `amortizacoes` segura a trava do empréstimo, então o snapshot relido está atual.
    async fn amortizacao_travada(&self, conn: &mut PgConnection, id: Uuid) -> Result<(Amortizacao, Emprestimo), AppError> {
        let emprestimo_id = self.juros_repo
            .find_amortizacao(&mut *conn, id)
            .await?
            .ok_or(AppError::NotFound("Amortização"))?
            .emprestimo_id;

        let emprestimo = self.emprestimo_repo
            .find_for_update(&mut *conn, emprestimo_id)
            .await?
            .ok_or(AppError::NotFound("Empréstimo"))?;

        let amortizacao = self.juros_repo
            .find_amortizacao(&mut *conn, id)
            .await?
            .ok_or(AppError::NotFound("Amortização"))?;

        Ok((amortizacao, emprestimo))
    }

    // =========================================================================
    //  PAGAMENTOS DE JUROS (não alteram o saldo)
    // =========================================================================

    pub async fn list_pagamentos(&self, emprestimo_id: Uuid) -> Result<Vec<PagamentoJuros>, AppError> {
        self.emprestimo(emprestimo_id).await?;
        self.juros_repo.list_pagamentos(emprestimo_id).await
    }

    pub async fn registrar_pagamento(
        &self,
        emprestimo_id: Uuid,
        payload: &RegistrarPagamentoJurosPayload,
        usuario: &str,
    ) -> Result<PagamentoJuros, AppError> {
        let emprestimo = self.emprestimo(emprestimo_id).await?;
        exigir_juros_recorrente(&emprestimo)?;

        let valor_pago = reais_to_cents(payload.valor_pago)?;
        if valor_pago <= 0 {
            return Err(LedgerError::NonPositiveAmount.into());
        }

        let pagamento = self.juros_repo
            .create_pagamento(emprestimo_id, valor_pago, payload.data_pagamento, payload.observacao.as_deref(), usuario)
            .await?;

        tracing::info!("💵 Pagamento de juros registrado no empréstimo {} por '{}'", emprestimo_id, usuario);
        Ok(pagamento)
    }

    pub async fn update_pagamento(
        &self,
        id: Uuid,
        payload: &UpdatePagamentoJurosPayload,
        usuario: &str,
    ) -> Result<PagamentoJuros, AppError> {
        let valor_pago = payload.valor_pago.map(reais_to_cents).transpose()?;
        if matches!(valor_pago, Some(v) if v <= 0) {
            return Err(LedgerError::NonPositiveAmount.into());
        }

        self.juros_repo
            .update_pagamento(id, valor_pago, payload.data_pagamento, payload.observacao.as_deref(), usuario)
            .await?
            .ok_or(AppError::NotFound("Pagamento de juros"))
    }

    pub async fn delete_pagamento(&self, id: Uuid) -> Result<(), AppError> {
        if !self.juros_repo.delete_pagamento(id).await? {
            return Err(AppError::NotFound("Pagamento de juros"));
        }
        Ok(())
    }

    // =========================================================================
    //  AMORTIZAÇÕES
    // =========================================================================

    pub async fn list_amortizacoes(&self, emprestimo_id: Uuid) -> Result<Vec<Amortizacao>, AppError> {
        self.emprestimo(emprestimo_id).await?;
        self.juros_repo.list_amortizacoes(&self.pool, emprestimo_id).await
    }

    pub async fn registrar_amortizacao(
        &self,
        emprestimo_id: Uuid,
        payload: &RegistrarAmortizacaoPayload,
        usuario: &str,
    ) -> Result<AmortizacaoRegistrada, AppError> {
        let valor = reais_to_cents(payload.valor_amortizado)?;

        let mut tx = self.pool.begin().await?;

        let emprestimo = self.emprestimo_repo
            .find_for_update(&mut *tx, emprestimo_id)
            .await?
            .ok_or(AppError::NotFound("Empréstimo"))?;
        exigir_juros_recorrente(&emprestimo)?;

        let outcome = apply_amortization(emprestimo.saldo_devedor, emprestimo.taxa_juros, valor)?;

        let amortizacao = self.juros_repo
            .create_amortizacao(
                &mut *tx,
                emprestimo_id,
                valor,
                &outcome,
                payload.data_amortizacao,
                payload.observacao.as_deref(),
                usuario,
            )
            .await?;

        let (status, data_pagamento) =
            settlement(outcome.saldo_novo, emprestimo.status, emprestimo.data_pagamento, Utc::now());
        self.emprestimo_repo
            .update_saldo(&mut *tx, emprestimo_id, outcome.saldo_novo, outcome.juros_novo, status, data_pagamento, usuario)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "📉 Amortização no empréstimo {}: saldo {} -> {} (centavos)",
            emprestimo_id,
            outcome.saldo_anterior,
            outcome.saldo_novo
        );

        Ok(AmortizacaoRegistrada {
            id: amortizacao.id,
            saldo_novo: outcome.saldo_novo,
            juros_novo: outcome.juros_novo,
            emprestimo_quitado: outcome.quitado(),
        })
    }

    /// Só o registro editado é recalculado (exato para a amortização mais recente).
    /// Para corrigir o histórico inteiro use `recalcular_ledger`.
    pub async fn update_amortizacao(
        &self,
        id: Uuid,
        payload: &UpdateAmortizacaoPayload,
        usuario: &str,
    ) -> Result<Amortizacao, AppError> {
        let novo_valor = payload.valor_amortizado.map(reais_to_cents).transpose()?;

        let mut tx = self.pool.begin().await?;
        let (atual, emprestimo) = self.amortizacao_travada(&mut *tx, id).await?;

        let valor_mudou = matches!(novo_valor, Some(v) if v != atual.valor_amortizado);

        let (valor, saldo_novo, juros_novo) = match novo_valor {
            Some(valor) if valor_mudou => {
                let (saldo, juros) =
                    edit_amortization(atual.saldo_novo, atual.valor_amortizado, valor, emprestimo.taxa_juros)?;
                (valor, saldo, juros)
            }
            _ => (atual.valor_amortizado, atual.saldo_novo, atual.juros_novo),
        };

        let amortizacao = self.juros_repo
            .update_amortizacao(
                &mut *tx,
                id,
                valor,
                saldo_novo,
                juros_novo,
                payload.data_amortizacao,
                payload.observacao.as_deref(),
                usuario,
            )
            .await?;

        if valor_mudou {
            let (status, data_pagamento) =
                settlement(saldo_novo, emprestimo.status, emprestimo.data_pagamento, Utc::now());
            self.emprestimo_repo
                .update_saldo(&mut *tx, emprestimo.id, saldo_novo, juros_novo, status, data_pagamento, usuario)
                .await?;
        }

        tx.commit().await?;
        Ok(amortizacao)
    }

    /// Devolve o valor ao saldo atual e reabre o empréstimo como `pendente`.
    pub async fn delete_amortizacao(&self, id: Uuid, usuario: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let (amortizacao, emprestimo) = self.amortizacao_travada(&mut *tx, id).await?;

        let (saldo, juros) =
            revert_amortization(emprestimo.saldo_devedor, amortizacao.valor_amortizado, emprestimo.taxa_juros)?;

        self.emprestimo_repo
            .update_saldo(&mut *tx, emprestimo.id, saldo, juros, StatusPagamento::Pendente, None, usuario)
            .await?;
        self.juros_repo.delete_amortizacao(&mut *tx, id).await?;

        tx.commit().await?;

        tracing::info!("↩️ Amortização {} desfeita no empréstimo {} por '{}'", id, emprestimo.id, usuario);
        Ok(())
    }

    /// Reprocessa todas as amortizações a partir do valor emprestado e regrava os snapshots.
    pub async fn recalcular_ledger(&self, emprestimo_id: Uuid, usuario: &str) -> Result<LedgerRecalculado, AppError> {
        let mut tx = self.pool.begin().await?;

        let emprestimo = self.emprestimo_repo
            .find_for_update(&mut *tx, emprestimo_id)
            .await?
            .ok_or(AppError::NotFound("Empréstimo"))?;
        exigir_juros_recorrente(&emprestimo)?;

        let historico: Vec<(Uuid, i64)> = self.juros_repo
            .list_amortizacoes(&mut *tx, emprestimo_id)
            .await?
            .iter()
            .map(|a| (a.id, a.valor_amortizado))
            .collect();

        let resultado = replay(emprestimo.valor_emprestado, emprestimo.taxa_juros, &historico)?;

        for item in &resultado.amortizacoes {
            self.juros_repo.rewrite_snapshot(&mut *tx, item.id, &item.outcome).await?;
        }

        let (status, data_pagamento) =
            settlement(resultado.saldo_devedor, emprestimo.status, emprestimo.data_pagamento, Utc::now());
        self.emprestimo_repo
            .update_saldo(
                &mut *tx,
                emprestimo_id,
                resultado.saldo_devedor,
                resultado.valor_juros_mensal,
                status,
                data_pagamento,
                usuario,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "🧮 Ledger do empréstimo {} recalculado ({} amortizações), saldo {}",
            emprestimo_id,
            resultado.amortizacoes.len(),
            resultado.saldo_devedor
        );

        Ok(LedgerRecalculado {
            amortizacoes_reaplicadas: resultado.amortizacoes.len(),
            saldo_devedor: resultado.saldo_devedor,
            valor_juros_mensal: resultado.valor_juros_mensal,
        })
    }

    /// Somente leitura: o juros mensal é derivado do saldo atual.
    pub async fn totais(&self, emprestimo_id: Uuid) -> Result<TotaisJurosRecorrente, AppError> {
        let emprestimo = self.emprestimo(emprestimo_id).await?;
        exigir_juros_recorrente(&emprestimo)?;

        let total_juros_pagos = self.juros_repo.sum_pagamentos(&self.pool, emprestimo_id).await?;
        let total_amortizado = self.juros_repo.sum_amortizado(&self.pool, emprestimo_id).await?;

        Ok(totals(&emprestimo, total_juros_pagos, total_amortizado)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{emprestimo_repo::NovoEmprestimo, ClienteRepository},
        models::cliente::CreateClientePayload,
    };
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    async fn emprestimo_juros_recorrente(pool: &PgPool) -> Emprestimo {
        let cliente = ClienteRepository::new(pool.clone())
            .create(&CreateClientePayload {
                nome: "Ana Souza".into(),
                telefone: None,
                email: None,
                anotacoes: None,
            })
            .await
            .unwrap();

        EmprestimoRepository::new(pool.clone())
            .create(
                pool,
                &NovoEmprestimo {
                    cliente_id: cliente.id,
                    tipo_emprestimo: TipoEmprestimo::JurosRecorrente,
                    valor_emprestado: 1_000_000,
                    taxa_juros: 800,
                    quantidade_parcelas: 0,
                    valor_parcela: 0,
                    valor_juros_mensal: Some(80_000),
                    data_emprestimo: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
                    data_vencimento: None,
                    modificado_por: "bruno",
                },
            )
            .await
            .unwrap()
    }

    fn edicao(valor: rust_decimal::Decimal) -> UpdateAmortizacaoPayload {
        UpdateAmortizacaoPayload { valor_amortizado: Some(valor), data_amortizacao: None, observacao: None }
    }

    // Duas edições simultâneas da mesma amortização: a segunda parte do snapshot gravado pela primeira.
    #[sqlx::test]
    #[ignore = "precisa de Postgres em DATABASE_URL"]
    async fn edicoes_simultaneas_mantem_saldo_coerente(pool: PgPool) {
        let service = JurosService::new(
            JurosRepository::new(pool.clone()),
            EmprestimoRepository::new(pool.clone()),
            pool.clone(),
        );
        let emprestimo = emprestimo_juros_recorrente(&pool).await;

        let registrada = service
            .registrar_amortizacao(
                emprestimo.id,
                &RegistrarAmortizacaoPayload {
                    valor_amortizado: dec!(2000),
                    data_amortizacao: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
                    observacao: None,
                },
                "bruno",
            )
            .await
            .unwrap();
        assert_eq!(registrada.saldo_novo, 800_000);

        let (a, b) = (edicao(dec!(3000)), edicao(dec!(4000)));
        let (r1, r2) = tokio::join!(
            service.update_amortizacao(registrada.id, &a, "bruno"),
            service.update_amortizacao(registrada.id, &b, "bruno"),
        );
        r1.unwrap();
        r2.unwrap();

        let final_amortizacao = service.list_amortizacoes(emprestimo.id).await.unwrap().remove(0);
        let final_emprestimo = service.emprestimo(emprestimo.id).await.unwrap();

        assert_eq!(final_emprestimo.saldo_devedor, 1_000_000 - final_amortizacao.valor_amortizado);
        assert_eq!(final_amortizacao.saldo_novo, final_emprestimo.saldo_devedor);
    }
}
