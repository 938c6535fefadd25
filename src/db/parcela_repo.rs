// src/db/parcela_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        emprestimo::StatusPagamento,
        parcela::{Parcela, ParcelaChanges},
    },
};

#[derive(Clone)]
pub struct ParcelaRepository {
    pool: PgPool,
}

impl ParcelaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Parcela>, AppError> {
        let parcelas = sqlx::query_as::<_, Parcela>("SELECT * FROM parcelas ORDER BY data_vencimento ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(parcelas)
    }

    pub async fn list_by_emprestimo<'e, E>(&self, executor: E, emprestimo_id: Uuid) -> Result<Vec<Parcela>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let parcelas = sqlx::query_as::<_, Parcela>(
            "SELECT * FROM parcelas WHERE emprestimo_id = $1 ORDER BY numero_parcela ASC",
        )
        .bind(emprestimo_id)
        .fetch_all(executor)
        .await?;
        Ok(parcelas)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Parcela>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let parcela = sqlx::query_as::<_, Parcela>("SELECT * FROM parcelas WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(parcela)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        emprestimo_id: Uuid,
        numero_parcela: i32,
        data_vencimento: NaiveDate,
        valor_parcela: i64,
        modificado_por: &str,
    ) -> Result<Parcela, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Parcela>(
            r#"
            INSERT INTO parcelas (
                emprestimo_id, numero_parcela, data_vencimento, valor_parcela,
                modificado_por, modificado_em
            )
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING *
            "#,
        )
        .bind(emprestimo_id)
        .bind(numero_parcela)
        .bind(data_vencimento)
        .bind(valor_parcela)
        .bind(modificado_por)
        .fetch_one(executor)
        .await
        .map_err(AppError::from_db)
    }

    /// `None` se a parcela não existe ou já está paga.
    pub async fn pagar<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        valor_pago: i64,
        data_pagamento: DateTime<Utc>,
        modificado_por: &str,
    ) -> Result<Option<Parcela>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let parcela = sqlx::query_as::<_, Parcela>(
            r#"
            UPDATE parcelas SET
                status = 'pago', valor_pago = $2, data_pagamento = $3,
                modificado_por = $4, modificado_em = NOW(), updated_at = NOW()
            WHERE id = $1 AND status <> 'pago'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(valor_pago)
        .bind(data_pagamento)
        .bind(modificado_por)
        .fetch_optional(executor)
        .await?;
        Ok(parcela)
    }

    /// Edição manual: sobrescreve o que vier preenchido.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &ParcelaChanges,
        modificado_por: &str,
    ) -> Result<Option<Parcela>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let parcela = sqlx::query_as::<_, Parcela>(
            r#"
            UPDATE parcelas SET
                valor_parcela = COALESCE($2, valor_parcela),
                data_vencimento = COALESCE($3, data_vencimento),
                data_pagamento = COALESCE($4, data_pagamento),
                status = COALESCE($5, status),
                modificado_por = $6, modificado_em = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.valor_parcela)
        .bind(changes.data_vencimento)
        .bind(changes.data_pagamento)
        .bind(changes.status)
        .bind(modificado_por)
        .fetch_optional(executor)
        .await?;
        Ok(parcela)
    }

    pub async fn update_valor<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        valor_parcela: i64,
        modificado_por: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE parcelas SET
                valor_parcela = $2,
                modificado_por = $3, modificado_em = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(valor_parcela)
        .bind(modificado_por)
        .execute(executor)
        .await?;
        Ok(())
    }

    // Reclassificação automática: a leitura que decidiu veio antes, então nunca sobrescreve `pago`
    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: StatusPagamento) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE parcelas SET status = $2, updated_at = NOW() WHERE id = $1 AND status <> 'pago'")
            .bind(id)
            .bind(status)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_unpaid<'e, E>(&self, executor: E, emprestimo_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM parcelas WHERE emprestimo_id = $1 AND status <> 'pago'",
        )
        .bind(emprestimo_id)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM parcelas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{emprestimo_repo::NovoEmprestimo, ClienteRepository, EmprestimoRepository},
        models::{cliente::CreateClientePayload, emprestimo::TipoEmprestimo},
    };

    async fn parcela_vencida(pool: &PgPool) -> Parcela {
        let cliente = ClienteRepository::new(pool.clone())
            .create(&CreateClientePayload {
                nome: "João Pereira".into(),
                telefone: None,
                email: None,
                anotacoes: None,
            })
            .await
            .unwrap();

        let emprestimo = EmprestimoRepository::new(pool.clone())
            .create(
                pool,
                &NovoEmprestimo {
                    cliente_id: cliente.id,
                    tipo_emprestimo: TipoEmprestimo::Parcelado,
                    valor_emprestado: 100_000,
                    taxa_juros: 0,
                    quantidade_parcelas: 1,
                    valor_parcela: 100_000,
                    valor_juros_mensal: None,
                    data_emprestimo: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                    data_vencimento: NaiveDate::from_ymd_opt(2024, 2, 10),
                    modificado_por: "bruno",
                },
            )
            .await
            .unwrap();

        ParcelaRepository::new(pool.clone())
            .create(pool, emprestimo.id, 1, NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(), 100_000, "bruno")
            .await
            .unwrap()
    }

    #[sqlx::test]
    #[ignore = "precisa de Postgres em DATABASE_URL"]
    async fn segundo_pagamento_nao_sobrescreve_o_primeiro(pool: PgPool) {
        let repo = ParcelaRepository::new(pool.clone());
        let parcela = parcela_vencida(&pool).await;

        let primeiro = repo.pagar(&pool, parcela.id, 100_000, Utc::now(), "bruno").await.unwrap().unwrap();
        let segundo = repo.pagar(&pool, parcela.id, 1, Utc::now(), "outro").await.unwrap();
        assert!(segundo.is_none());

        let atual = repo.find_by_id(&pool, parcela.id).await.unwrap().unwrap();
        assert_eq!(atual.valor_pago, Some(100_000));
        assert_eq!(atual.data_pagamento, primeiro.data_pagamento);
        assert_eq!(atual.modificado_por.as_deref(), Some("bruno"));
    }

    #[sqlx::test]
    #[ignore = "precisa de Postgres em DATABASE_URL"]
    async fn parcela_paga_nao_volta_para_atrasado(pool: PgPool) {
        let repo = ParcelaRepository::new(pool.clone());
        let parcela = parcela_vencida(&pool).await;

        repo.pagar(&pool, parcela.id, 100_000, Utc::now(), "bruno").await.unwrap();
        assert!(!repo.set_status(&pool, parcela.id, StatusPagamento::Atrasado).await.unwrap());

        let atual = repo.find_by_id(&pool, parcela.id).await.unwrap().unwrap();
        assert_eq!(atual.status, StatusPagamento::Pago);
    }
}
