// src/services/emprestimo_service.rs

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        money::{cents_to_reais, percent_to_rate, reais_to_cents, round_half_up},
    },
    db::{emprestimo_repo::NovoEmprestimo, ClienteRepository, EmprestimoRepository, ParcelaRepository},
    ledger::{
        recurring::monthly_interest,
        schedule::{OriginationSchedule, RecalculationSchedule},
        stats::total_with_interest,
        LedgerError,
    },
    models::{
        emprestimo::{
            CreateJurosRecorrentePayload, CreateParceladoPayload, Emprestimo, EmprestimoChanges,
            EmprestimoComCliente, StatusPagamento, SuccessResponse, TipoEmprestimo, UpdateEmprestimoPayload,
        },
        parcela::{CreateParcelaPayload, Parcela, RecalculoParcelasResponse},
    },
    services::{
        notifier::{lembrete_atraso_message, Notifier},
        reconciliation::StatusReconciler,
    },
};

#[derive(Clone)]
pub struct EmprestimoService {
    emprestimo_repo: EmprestimoRepository,
    parcela_repo: ParcelaRepository,
    cliente_repo: ClienteRepository,
    reconciler: StatusReconciler,
    notifier: Arc<dyn Notifier>,
    pool: PgPool,
}

impl EmprestimoService {
    pub fn new(
        emprestimo_repo: EmprestimoRepository,
        parcela_repo: ParcelaRepository,
        cliente_repo: ClienteRepository,
        reconciler: StatusReconciler,
        notifier: Arc<dyn Notifier>,
        pool: PgPool,
    ) -> Self {
        Self { emprestimo_repo, parcela_repo, cliente_repo, reconciler, notifier, pool }
    }

    // =========================================================================
    //  CONSULTAS
    // =========================================================================

    /// Lista com cliente e valor total. Empréstimos vencidos são gravados como `atrasado` aqui.
    pub async fn list(&self) -> Result<Vec<EmprestimoComCliente>, AppError> {
        let mut emprestimos = self.emprestimo_repo.list().await?;
        self.reconciler
            .reconcile_emprestimos(&mut emprestimos, Utc::now().date_naive())
            .await?;

        let clientes: HashMap<Uuid, _> = self.cliente_repo
            .list()
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(emprestimos
            .into_iter()
            .map(|emprestimo| EmprestimoComCliente {
                cliente: clientes.get(&emprestimo.cliente_id).cloned(),
                valor_total: total_with_interest(emprestimo.valor_emprestado, emprestimo.taxa_juros),
                emprestimo,
            })
            .collect())
    }

    pub async fn list_by_cliente(&self, cliente_id: Uuid) -> Result<Vec<Emprestimo>, AppError> {
        self.cliente_repo
            .find_by_id(&self.pool, cliente_id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))?;

        let mut emprestimos = self.emprestimo_repo.list_by_cliente(cliente_id).await?;
        self.reconciler
            .reconcile_emprestimos(&mut emprestimos, Utc::now().date_naive())
            .await?;
        Ok(emprestimos)
    }

    pub async fn get(&self, id: Uuid) -> Result<Emprestimo, AppError> {
        self.emprestimo_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("Empréstimo"))
    }

    // =========================================================================
    //  CRIAÇÃO
    // =========================================================================

    /// Cria o empréstimo e todas as parcelas na mesma transação.
    pub async fn create_parcelado(&self, payload: &CreateParceladoPayload, usuario: &str) -> Result<Emprestimo, AppError> {
        let valor_emprestado = reais_to_cents(payload.valor_emprestado)?;
        let taxa_juros = percent_to_rate(payload.taxa_juros)?;
        let base_informada = payload.valor_parcela.map(reais_to_cents).transpose()?;

        let schedule = OriginationSchedule::new(
            valor_emprestado,
            taxa_juros,
            payload.quantidade_parcelas,
            payload.data_vencimento,
        )?
        .with_base_installment(base_informada)?;
        let parcelas = schedule.generate()?;

        let mut tx = self.pool.begin().await?;

        self.cliente_repo
            .find_by_id(&mut *tx, payload.cliente_id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))?;

        let novo = NovoEmprestimo {
            cliente_id: payload.cliente_id,
            tipo_emprestimo: TipoEmprestimo::Parcelado,
            valor_emprestado,
            taxa_juros,
            quantidade_parcelas: payload.quantidade_parcelas,
            valor_parcela: round_half_up(schedule.base_installment())?,
            valor_juros_mensal: None,
            data_emprestimo: payload.data_emprestimo,
            data_vencimento: Some(payload.data_vencimento),
            modificado_por: usuario,
        };
        let emprestimo = self.emprestimo_repo.create(&mut *tx, &novo).await?;

        for parcela in &parcelas {
            self.parcela_repo
                .create(&mut *tx, emprestimo.id, parcela.numero, parcela.vencimento, parcela.valor, usuario)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "✅ Empréstimo parcelado {} criado ({} parcelas) por '{}'",
            emprestimo.id,
            parcelas.len(),
            usuario
        );
        Ok(emprestimo)
    }

    pub async fn create_juros_recorrente(
        &self,
        payload: &CreateJurosRecorrentePayload,
        usuario: &str,
    ) -> Result<Emprestimo, AppError> {
        let valor_emprestado = reais_to_cents(payload.valor_emprestado)?;
        if valor_emprestado <= 0 {
            return Err(LedgerError::NonPositiveAmount.into());
        }
        let taxa_juros = percent_to_rate(payload.taxa_juros)?;

        self.cliente_repo
            .find_by_id(&self.pool, payload.cliente_id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))?;

        let novo = NovoEmprestimo {
            cliente_id: payload.cliente_id,
            tipo_emprestimo: TipoEmprestimo::JurosRecorrente,
            valor_emprestado,
            taxa_juros,
            quantidade_parcelas: 0,
            valor_parcela: 0,
            valor_juros_mensal: Some(monthly_interest(valor_emprestado, taxa_juros)?),
            data_emprestimo: payload.data_emprestimo,
            data_vencimento: payload.data_vencimento,
            modificado_por: usuario,
        };
        let emprestimo = self.emprestimo_repo.create(&self.pool, &novo).await?;

        tracing::info!("✅ Empréstimo de juros recorrente {} criado por '{}'", emprestimo.id, usuario);
        Ok(emprestimo)
    }

    // =========================================================================
    //  EDIÇÃO
    // =========================================================================

    pub async fn update(&self, id: Uuid, payload: &UpdateEmprestimoPayload, usuario: &str) -> Result<Emprestimo, AppError> {
        let atual = self.get(id).await?;

        // No juros recorrente a taxa define o juros de todas as amortizações já gravadas.
        if atual.tipo_emprestimo == TipoEmprestimo::JurosRecorrente
            && (payload.taxa_juros.is_some() || payload.quantidade_parcelas.is_some())
        {
            return Err(LedgerError::WrongLoanType(TipoEmprestimo::Parcelado).into());
        }

        let changes = EmprestimoChanges {
            valor_emprestado: payload.valor_emprestado.map(reais_to_cents).transpose()?,
            taxa_juros: payload.taxa_juros.map(percent_to_rate).transpose()?,
            quantidade_parcelas: payload.quantidade_parcelas,
            data_emprestimo: payload.data_emprestimo,
            data_vencimento: payload.data_vencimento,
        };

        let emprestimo = self.emprestimo_repo
            .update(&self.pool, id, &changes, usuario)
            .await?
            .ok_or(AppError::NotFound("Empréstimo"))?;

        tracing::info!("✏️ Empréstimo {} editado por '{}'", id, usuario);
        Ok(emprestimo)
    }

    pub async fn marcar_como_pago(&self, id: Uuid, usuario: &str) -> Result<(), AppError> {
        let atualizado = self.emprestimo_repo
            .update_status(&self.pool, id, StatusPagamento::Pago, Some(Utc::now()), usuario)
            .await?;

        if !atualizado {
            return Err(AppError::NotFound("Empréstimo"));
        }
        tracing::info!("💰 Empréstimo {} marcado como pago por '{}'", id, usuario);
        Ok(())
    }

    // =========================================================================
    //  PARCELAS DO EMPRÉSTIMO
    // =========================================================================

    pub async fn list_parcelas(&self, emprestimo_id: Uuid) -> Result<Vec<Parcela>, AppError> {
        self.get(emprestimo_id).await?;

        let mut parcelas = self.parcela_repo.list_by_emprestimo(&self.pool, emprestimo_id).await?;
        self.reconciler
            .reconcile_parcelas(&mut parcelas, Utc::now().date_naive())
            .await?;
        Ok(parcelas)
    }

    pub async fn create_parcela(
        &self,
        emprestimo_id: Uuid,
        payload: &CreateParcelaPayload,
        usuario: &str,
    ) -> Result<Parcela, AppError> {
        self.get(emprestimo_id).await?;

        let valor = reais_to_cents(payload.valor_parcela)?;
        if valor <= 0 {
            return Err(LedgerError::NonPositiveAmount.into());
        }

        self.parcela_repo
            .create(&self.pool, emprestimo_id, payload.numero_parcela, payload.data_vencimento, valor, usuario)
            .await
    }

    /// Parcelas pagas ficam intactas; as em aberto recebem o valor da tabela Price.
    pub async fn recalcular_parcelas(&self, emprestimo_id: Uuid, usuario: &str) -> Result<RecalculoParcelasResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        let emprestimo = self.emprestimo_repo
            .find_for_update(&mut *tx, emprestimo_id)
            .await?
            .ok_or(AppError::NotFound("Empréstimo"))?;

        if emprestimo.tipo_emprestimo != TipoEmprestimo::Parcelado {
            return Err(LedgerError::WrongLoanType(TipoEmprestimo::Parcelado).into());
        }

        let existentes = self.parcela_repo.list_by_emprestimo(&mut *tx, emprestimo_id).await?;

        let schedule = RecalculationSchedule::new(
            emprestimo.valor_emprestado,
            emprestimo.taxa_juros,
            emprestimo.quantidade_parcelas.max(1),
        )?;
        let plano = schedule.plan(&existentes, emprestimo.data_vencimento)?;

        for id in &plano.atualizar {
            self.parcela_repo.update_valor(&mut *tx, *id, plano.valor_parcela, usuario).await?;
        }
        for nova in &plano.novas {
            self.parcela_repo
                .create(&mut *tx, emprestimo_id, nova.numero, nova.vencimento, nova.valor, usuario)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "🔁 Parcelas do empréstimo {} recalculadas: {} atualizadas, {} criadas, {} preservadas",
            emprestimo_id,
            plano.atualizar.len(),
            plano.novas.len(),
            plano.preservadas
        );

        Ok(RecalculoParcelasResponse {
            success: true,
            parcelas_atualizadas: plano.atualizar.len(),
            parcelas_criadas: plano.novas.len(),
            parcelas_preservadas: plano.preservadas,
            valor_parcela: cents_to_reais(plano.valor_parcela),
        })
    }

    // =========================================================================
    //  NOTIFICAÇÕES
    // =========================================================================

    pub async fn enviar_lembrete_atraso(&self, emprestimo_id: Uuid) -> Result<SuccessResponse, AppError> {
        let emprestimo = self.get(emprestimo_id).await?;
        let cliente = self.cliente_repo
            .find_by_id(&self.pool, emprestimo.cliente_id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))?;

        let mensagem = lembrete_atraso_message(&cliente, &emprestimo)?;
        let para = mensagem.para.clone();
        self.notifier.enviar(mensagem).await?;

        Ok(SuccessResponse::with_message(format!("Lembrete enviado para {}", para)))
    }
}
