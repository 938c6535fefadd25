// src/db/usuario_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{PapelUsuario, Usuario},
};

// O repositório de usuários, responsável por todas as interações com a tabela 'usuarios'
#[derive(Clone)]
pub struct UsuarioRepository {
    pool: PgPool,
}

impl UsuarioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Usuario>, AppError> {
        let usuario = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(usuario)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Usuario>, AppError> {
        let usuario = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(usuario)
    }

    pub async fn list(&self) -> Result<Vec<Usuario>, AppError> {
        let usuarios = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(usuarios)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuarios")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    // Username duplicado vira `UsernameAlreadyExists` (constraint usuarios_username_key)
    pub async fn create<'e, E>(
        &self,
        executor: E,
        username: &str,
        senha_hash: &str,
        nome: &str,
        email: Option<&str>,
        papel: PapelUsuario,
    ) -> Result<Usuario, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Usuario>(
            r#"
            INSERT INTO usuarios (username, senha_hash, nome, email, papel)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(senha_hash)
        .bind(nome)
        .bind(email)
        .bind(papel)
        .fetch_one(executor)
        .await
        .map_err(AppError::from_db)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM usuarios WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn touch_last_activity(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE usuarios SET ultima_atividade = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
