// src/db/cliente_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::cliente::{Cliente, CreateClientePayload, UpdateClientePayload},
};

#[derive(Clone)]
pub struct ClienteRepository {
    pool: PgPool,
}

impl ClienteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Cliente>, AppError> {
        let clientes = sqlx::query_as::<_, Cliente>("SELECT * FROM clientes ORDER BY nome ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(clientes)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Cliente>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let cliente = sqlx::query_as::<_, Cliente>("SELECT * FROM clientes WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(cliente)
    }

    pub async fn create(&self, payload: &CreateClientePayload) -> Result<Cliente, AppError> {
        sqlx::query_as::<_, Cliente>(
            r#"
            INSERT INTO clientes (nome, telefone, email, anotacoes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&payload.nome)
        .bind(&payload.telefone)
        .bind(&payload.email)
        .bind(&payload.anotacoes)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from_db)
    }

    /// Campos `None` mantêm o valor atual.
    pub async fn update(&self, id: Uuid, payload: &UpdateClientePayload) -> Result<Option<Cliente>, AppError> {
        let cliente = sqlx::query_as::<_, Cliente>(
            r#"
            UPDATE clientes SET
                nome = COALESCE($2, nome),
                telefone = COALESCE($3, telefone),
                email = COALESCE($4, email),
                anotacoes = COALESCE($5, anotacoes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.nome)
        .bind(&payload.telefone)
        .bind(&payload.email)
        .bind(&payload.anotacoes)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cliente)
    }

    // FK RESTRICT: cliente com empréstimos não pode ser removido (vira Conflict)
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM clientes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from_db)?;
        Ok(result.rows_affected() > 0)
    }
}
