// src/services/cliente_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ClienteRepository,
    models::{
        cliente::{Cliente, CreateClientePayload, UpdateClientePayload},
        emprestimo::SuccessResponse,
    },
    services::notifier::{anotacoes_message, Notifier},
};

#[derive(Clone)]
pub struct ClienteService {
    repo: ClienteRepository,
    pool: sqlx::PgPool,
    notifier: Arc<dyn Notifier>,
}

impl ClienteService {
    pub fn new(repo: ClienteRepository, pool: sqlx::PgPool, notifier: Arc<dyn Notifier>) -> Self {
        Self { repo, pool, notifier }
    }

    pub async fn list(&self) -> Result<Vec<Cliente>, AppError> {
        self.repo.list().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Cliente, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))
    }

    pub async fn create(&self, payload: &CreateClientePayload) -> Result<Cliente, AppError> {
        let cliente = self.repo.create(payload).await?;
        tracing::info!("✅ Cliente '{}' cadastrado", cliente.nome);
        Ok(cliente)
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateClientePayload) -> Result<Cliente, AppError> {
        self.repo
            .update(id, payload)
            .await?
            .ok_or(AppError::NotFound("Cliente"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("Cliente"));
        }
        tracing::info!("🗑️ Cliente {} excluído", id);
        Ok(())
    }

    pub async fn enviar_anotacoes(&self, id: Uuid) -> Result<SuccessResponse, AppError> {
        let cliente = self.get(id).await?;
        let mensagem = anotacoes_message(&cliente)?;
        let para = mensagem.para.clone();

        self.notifier.enviar(mensagem).await?;
        Ok(SuccessResponse::with_message(format!("E-mail enviado para {}", para)))
    }
}
