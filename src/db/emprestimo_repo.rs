// src/db/emprestimo_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::emprestimo::{Emprestimo, EmprestimoChanges, StatusPagamento, TipoEmprestimo},
};

/// Linha nova de `emprestimos`, já em centavos.
#[derive(Debug, Clone)]
pub struct NovoEmprestimo<'a> {
    pub cliente_id: Uuid,
    pub tipo_emprestimo: TipoEmprestimo,
    pub valor_emprestado: i64,
    pub taxa_juros: i32,
    pub quantidade_parcelas: i32,
    pub valor_parcela: i64,
    pub valor_juros_mensal: Option<i64>,
    pub data_emprestimo: NaiveDate,
    pub data_vencimento: Option<NaiveDate>,
    pub modificado_por: &'a str,
}

#[derive(Clone)]
pub struct EmprestimoRepository {
    pool: PgPool,
}

impl EmprestimoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Emprestimo>, AppError> {
        let emprestimos = sqlx::query_as::<_, Emprestimo>("SELECT * FROM emprestimos ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(emprestimos)
    }

    pub async fn list_by_cliente(&self, cliente_id: Uuid) -> Result<Vec<Emprestimo>, AppError> {
        let emprestimos = sqlx::query_as::<_, Emprestimo>(
            "SELECT * FROM emprestimos WHERE cliente_id = $1 ORDER BY created_at DESC",
        )
        .bind(cliente_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(emprestimos)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Emprestimo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let emprestimo = sqlx::query_as::<_, Emprestimo>("SELECT * FROM emprestimos WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(emprestimo)
    }

    /// Trava a linha até o fim da transação (saldo devedor e parcelas).
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Emprestimo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let emprestimo = sqlx::query_as::<_, Emprestimo>("SELECT * FROM emprestimos WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(emprestimo)
    }

    // saldo_devedor começa igual ao valor emprestado
    pub async fn create<'e, E>(&self, executor: E, novo: &NovoEmprestimo<'_>) -> Result<Emprestimo, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Emprestimo>(
            r#"
            INSERT INTO emprestimos (
                cliente_id, tipo_emprestimo, valor_emprestado, taxa_juros, saldo_devedor,
                quantidade_parcelas, valor_parcela, valor_juros_mensal,
                data_emprestimo, data_vencimento, modificado_por, modificado_em
            )
            VALUES ($1, $2, $3, $4, $3, $5, $6, $7, $8, $9, $10, NOW())
            RETURNING *
            "#,
        )
        .bind(novo.cliente_id)
        .bind(novo.tipo_emprestimo)
        .bind(novo.valor_emprestado)
        .bind(novo.taxa_juros)
        .bind(novo.quantidade_parcelas)
        .bind(novo.valor_parcela)
        .bind(novo.valor_juros_mensal)
        .bind(novo.data_emprestimo)
        .bind(novo.data_vencimento)
        .bind(novo.modificado_por)
        .fetch_one(executor)
        .await
        .map_err(AppError::from_db)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &EmprestimoChanges,
        modificado_por: &str,
    ) -> Result<Option<Emprestimo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let emprestimo = sqlx::query_as::<_, Emprestimo>(
            r#"
            UPDATE emprestimos SET
                valor_emprestado = COALESCE($2, valor_emprestado),
                taxa_juros = COALESCE($3, taxa_juros),
                quantidade_parcelas = COALESCE($4, quantidade_parcelas),
                data_emprestimo = COALESCE($5, data_emprestimo),
                data_vencimento = COALESCE($6, data_vencimento),
                modificado_por = $7,
                modificado_em = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.valor_emprestado)
        .bind(changes.taxa_juros)
        .bind(changes.quantidade_parcelas)
        .bind(changes.data_emprestimo)
        .bind(changes.data_vencimento)
        .bind(modificado_por)
        .fetch_optional(executor)
        .await?;
        Ok(emprestimo)
    }

    /// Muda o status manualmente (pago / pendente) com auditoria.
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: StatusPagamento,
        data_pagamento: Option<DateTime<Utc>>,
        modificado_por: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE emprestimos SET
                status = $2, data_pagamento = $3,
                modificado_por = $4, modificado_em = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(data_pagamento)
        .bind(modificado_por)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Grava o novo saldo e o juros mensal derivado dele. `status`/`data_pagamento` acompanham o saldo.
    pub async fn update_saldo<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        saldo_devedor: i64,
        valor_juros_mensal: i64,
        status: StatusPagamento,
        data_pagamento: Option<DateTime<Utc>>,
        modificado_por: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE emprestimos SET
                saldo_devedor = $2, valor_juros_mensal = $3,
                status = $4, data_pagamento = $5,
                modificado_por = $6, modificado_em = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(saldo_devedor)
        .bind(valor_juros_mensal)
        .bind(status)
        .bind(data_pagamento)
        .bind(modificado_por)
        .execute(executor)
        .await
        .map_err(AppError::from_db)?;
        Ok(())
    }

    // Reclassificação automática: não mexe na auditoria do operador.
    // A leitura que decidiu o novo status veio antes e sem trava, então nunca sobrescreve `pago`.
    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: StatusPagamento) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE emprestimos SET status = $2, updated_at = NOW() WHERE id = $1 AND status <> 'pago'")
            .bind(id)
            .bind(status)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::ClienteRepository, models::cliente::CreateClientePayload};

    async fn emprestimo_vencido(pool: &PgPool) -> Emprestimo {
        let cliente = ClienteRepository::new(pool.clone())
            .create(&CreateClientePayload {
                nome: "Maria da Silva".into(),
                telefone: None,
                email: None,
                anotacoes: None,
            })
            .await
            .unwrap();

        let novo = NovoEmprestimo {
            cliente_id: cliente.id,
            tipo_emprestimo: TipoEmprestimo::Parcelado,
            valor_emprestado: 300_000,
            taxa_juros: 0,
            quantidade_parcelas: 3,
            valor_parcela: 100_000,
            valor_juros_mensal: None,
            data_emprestimo: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            data_vencimento: NaiveDate::from_ymd_opt(2024, 4, 10),
            modificado_por: "bruno",
        };
        EmprestimoRepository::new(pool.clone()).create(pool, &novo).await.unwrap()
    }

    // Reconciliação leu `pendente`, o pagamento gravou `pago` e só então chega a escrita atrasada.
    #[sqlx::test]
    #[ignore = "precisa de Postgres em DATABASE_URL"]
    async fn reclassificacao_tardia_nao_desfaz_pagamento(pool: PgPool) {
        let repo = EmprestimoRepository::new(pool.clone());
        let emprestimo = emprestimo_vencido(&pool).await;

        repo.update_status(&pool, emprestimo.id, StatusPagamento::Pago, Some(Utc::now()), "bruno")
            .await
            .unwrap();

        let alterado = repo.set_status(&pool, emprestimo.id, StatusPagamento::Atrasado).await.unwrap();
        assert!(!alterado);

        let atual = repo.find_by_id(&pool, emprestimo.id).await.unwrap().unwrap();
        assert_eq!(atual.status, StatusPagamento::Pago);
        assert!(atual.data_pagamento.is_some());
    }

    #[sqlx::test]
    #[ignore = "precisa de Postgres em DATABASE_URL"]
    async fn reclassificacao_marca_pendente_vencido(pool: PgPool) {
        let repo = EmprestimoRepository::new(pool.clone());
        let emprestimo = emprestimo_vencido(&pool).await;

        assert!(repo.set_status(&pool, emprestimo.id, StatusPagamento::Atrasado).await.unwrap());

        let atual = repo.find_by_id(&pool, emprestimo.id).await.unwrap().unwrap();
        assert_eq!(atual.status, StatusPagamento::Atrasado);
    }
}
