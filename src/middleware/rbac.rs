// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    models::auth::{PapelUsuario, Usuario},
};

/// 1. O Trait que define uma capacidade e quem a possui
pub trait Capability: Send + Sync + 'static {
    fn name() -> &'static str;
    fn allowed() -> &'static [PapelUsuario];
}

/// 2. O Extractor (Guardião). Depende do `auth_guard` ter rodado antes.
pub struct RequireCapability<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireCapability<T>
where
    T: Capability,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let usuario = parts.extensions.get::<Usuario>().ok_or(AppError::InvalidToken)?;

        if !T::allowed().contains(&usuario.papel) {
            tracing::warn!("⛔ '{}' tentou '{}' sem permissão", usuario.username, T::name());
            return Err(AppError::Forbidden(format!(
                "Você precisa da permissão '{}' para realizar esta ação.",
                T::name()
            )));
        }

        Ok(RequireCapability(PhantomData))
    }
}

// ---
// CAPACIDADES
// ---

pub struct ManageUsers;
impl Capability for ManageUsers {
    fn name() -> &'static str { "usuarios:gerenciar" }
    fn allowed() -> &'static [PapelUsuario] { &[PapelUsuario::Admin] }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use chrono::Utc;
    use uuid::Uuid;

    fn parts_com(papel: Option<PapelUsuario>) -> Parts {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        if let Some(papel) = papel {
            parts.extensions.insert(Usuario {
                id: Uuid::new_v4(),
                username: "operador".into(),
                senha_hash: String::new(),
                nome: "Operador".into(),
                email: None,
                papel,
                ativo: true,
                ultima_atividade: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            });
        }
        parts
    }

    #[tokio::test]
    async fn admin_pode_gerenciar_usuarios() {
        let mut parts = parts_com(Some(PapelUsuario::Admin));
        let result = RequireCapability::<ManageUsers>::from_request_parts(&mut parts, &()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn operador_recebe_forbidden() {
        let mut parts = parts_com(Some(PapelUsuario::Operador));
        let result = RequireCapability::<ManageUsers>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn sem_usuario_e_nao_autenticado() {
        let mut parts = parts_com(None);
        let result = RequireCapability::<ManageUsers>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }
}
