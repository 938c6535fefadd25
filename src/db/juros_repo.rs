// src/db/juros_repo.rs

// Tabelas `pagamentos_juros` e `amortizacoes` (empréstimos de juros recorrente).

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    ledger::recurring::AmortizationOutcome,
    models::juros::{Amortizacao, PagamentoJuros},
};

#[derive(Clone)]
pub struct JurosRepository {
    pool: PgPool,
}

impl JurosRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  PAGAMENTOS DE JUROS
    // =========================================================================

    pub async fn list_pagamentos(&self, emprestimo_id: Uuid) -> Result<Vec<PagamentoJuros>, AppError> {
        let pagamentos = sqlx::query_as::<_, PagamentoJuros>(
            "SELECT * FROM pagamentos_juros WHERE emprestimo_id = $1 ORDER BY data_pagamento DESC, created_at DESC",
        )
        .bind(emprestimo_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(pagamentos)
    }

    pub async fn create_pagamento(
        &self,
        emprestimo_id: Uuid,
        valor_pago: i64,
        data_pagamento: NaiveDate,
        observacao: Option<&str>,
        modificado_por: &str,
    ) -> Result<PagamentoJuros, AppError> {
        sqlx::query_as::<_, PagamentoJuros>(
            r#"
            INSERT INTO pagamentos_juros (
                emprestimo_id, valor_pago, data_pagamento, observacao, modificado_por, modificado_em
            )
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING *
            "#,
        )
        .bind(emprestimo_id)
        .bind(valor_pago)
        .bind(data_pagamento)
        .bind(observacao)
        .bind(modificado_por)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from_db)
    }

    pub async fn update_pagamento(
        &self,
        id: Uuid,
        valor_pago: Option<i64>,
        data_pagamento: Option<NaiveDate>,
        observacao: Option<&str>,
        modificado_por: &str,
    ) -> Result<Option<PagamentoJuros>, AppError> {
        let pagamento = sqlx::query_as::<_, PagamentoJuros>(
            r#"
            UPDATE pagamentos_juros SET
                valor_pago = COALESCE($2, valor_pago),
                data_pagamento = COALESCE($3, data_pagamento),
                observacao = COALESCE($4, observacao),
                modificado_por = $5, modificado_em = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(valor_pago)
        .bind(data_pagamento)
        .bind(observacao)
        .bind(modificado_por)
        .fetch_optional(&self.pool)
        .await?;
        Ok(pagamento)
    }

    pub async fn delete_pagamento(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM pagamentos_juros WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn sum_pagamentos<'e, E>(&self, executor: E, emprestimo_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // SUM de BIGINT devolve NUMERIC no Postgres
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(valor_pago), 0)::BIGINT FROM pagamentos_juros WHERE emprestimo_id = $1",
        )
        .bind(emprestimo_id)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    // =========================================================================
    //  AMORTIZAÇÕES
    // =========================================================================

    /// Ordem cronológica (a mesma usada para reprocessar o saldo).
    pub async fn list_amortizacoes<'e, E>(&self, executor: E, emprestimo_id: Uuid) -> Result<Vec<Amortizacao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let amortizacoes = sqlx::query_as::<_, Amortizacao>(
            "SELECT * FROM amortizacoes WHERE emprestimo_id = $1 ORDER BY data_amortizacao ASC, created_at ASC",
        )
        .bind(emprestimo_id)
        .fetch_all(executor)
        .await?;
        Ok(amortizacoes)
    }

    pub async fn find_amortizacao<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Amortizacao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let amortizacao = sqlx::query_as::<_, Amortizacao>("SELECT * FROM amortizacoes WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(amortizacao)
    }

    pub async fn create_amortizacao<'e, E>(
        &self,
        executor: E,
        emprestimo_id: Uuid,
        valor_amortizado: i64,
        outcome: &AmortizationOutcome,
        data_amortizacao: NaiveDate,
        observacao: Option<&str>,
        modificado_por: &str,
    ) -> Result<Amortizacao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Amortizacao>(
            r#"
            INSERT INTO amortizacoes (
                emprestimo_id, valor_amortizado,
                saldo_anterior, saldo_novo, juros_anterior, juros_novo,
                data_amortizacao, observacao, modificado_por, modificado_em
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            RETURNING *
            "#,
        )
        .bind(emprestimo_id)
        .bind(valor_amortizado)
        .bind(outcome.saldo_anterior)
        .bind(outcome.saldo_novo)
        .bind(outcome.juros_anterior)
        .bind(outcome.juros_novo)
        .bind(data_amortizacao)
        .bind(observacao)
        .bind(modificado_por)
        .fetch_one(executor)
        .await
        .map_err(AppError::from_db)
    }

    pub async fn update_amortizacao<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        valor_amortizado: i64,
        saldo_novo: i64,
        juros_novo: i64,
        data_amortizacao: Option<NaiveDate>,
        observacao: Option<&str>,
        modificado_por: &str,
    ) -> Result<Amortizacao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Amortizacao>(
            r#"
            UPDATE amortizacoes SET
                valor_amortizado = $2, saldo_novo = $3, juros_novo = $4,
                data_amortizacao = COALESCE($5, data_amortizacao),
                observacao = COALESCE($6, observacao),
                modificado_por = $7, modificado_em = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(valor_amortizado)
        .bind(saldo_novo)
        .bind(juros_novo)
        .bind(data_amortizacao)
        .bind(observacao)
        .bind(modificado_por)
        .fetch_one(executor)
        .await
        .map_err(AppError::from_db)
    }

    /// Regrava o snapshot calculado no reprocessamento completo.
    pub async fn rewrite_snapshot<'e, E>(&self, executor: E, id: Uuid, outcome: &AmortizationOutcome) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE amortizacoes SET
                saldo_anterior = $2, saldo_novo = $3, juros_anterior = $4, juros_novo = $5,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(outcome.saldo_anterior)
        .bind(outcome.saldo_novo)
        .bind(outcome.juros_anterior)
        .bind(outcome.juros_novo)
        .execute(executor)
        .await
        .map_err(AppError::from_db)?;
        Ok(())
    }

    pub async fn delete_amortizacao<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM amortizacoes WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn sum_amortizado<'e, E>(&self, executor: E, emprestimo_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(valor_amortizado), 0)::BIGINT FROM amortizacoes WHERE emprestimo_id = $1",
        )
        .bind(emprestimo_id)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }
}
