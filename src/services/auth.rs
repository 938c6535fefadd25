// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UsuarioRepository,
    models::auth::{AuthResponse, Claims, CreateUsuarioPayload, PapelUsuario, Usuario},
};

const TOKEN_VALIDADE_DIAS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    usuario_repo: UsuarioRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(usuario_repo: UsuarioRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self { usuario_repo, jwt_secret, pool }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, AppError> {
        let usuario = self.usuario_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !self.check_password(password, &usuario.senha_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        if !usuario.ativo {
            return Err(AppError::InactiveUser);
        }

        self.usuario_repo.touch_last_activity(usuario.id).await?;
        tracing::info!("🔑 Login de '{}'", usuario.username);

        let token = self.create_token(&usuario)?;
        Ok(AuthResponse { token, usuario })
    }

    pub async fn validate_token(&self, token: &str) -> Result<Usuario, AppError> {
        let claims = self.decode_token(token)?;

        let usuario = self.usuario_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !usuario.ativo {
            return Err(AppError::InactiveUser);
        }
        Ok(usuario)
    }

    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
    }

    fn create_token(&self, usuario: &Usuario) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(TOKEN_VALIDADE_DIAS);

        let claims = Claims {
            sub: usuario.id,
            papel: usuario.papel,
            nome: usuario.nome.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    // Executa a verificação em um thread separado
    async fn check_password(&self, password: &str, senha_hash: &str) -> Result<bool, AppError> {
        let password = password.to_owned();
        let senha_hash = senha_hash.to_owned();

        let valida = tokio::task::spawn_blocking(move || verify(&password, &senha_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
        Ok(valida)
    }

    async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_owned();

        let senha_hash = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(senha_hash)
    }

    // =========================================================================
    //  GESTÃO DE USUÁRIOS (admin)
    // =========================================================================

    pub async fn list_usuarios(&self) -> Result<Vec<Usuario>, AppError> {
        self.usuario_repo.list().await
    }

    pub async fn create_usuario(&self, payload: &CreateUsuarioPayload) -> Result<Usuario, AppError> {
        let senha_hash = self.hash_password(&payload.password).await?;

        let usuario = self.usuario_repo
            .create(
                &self.pool,
                &payload.username,
                &senha_hash,
                &payload.nome,
                payload.email.as_deref(),
                payload.papel,
            )
            .await?;

        tracing::info!("👤 Usuário '{}' criado ({:?})", usuario.username, usuario.papel);
        Ok(usuario)
    }

    /// Exige a senha do admin que está executando. Ninguém exclui a si mesmo.
    pub async fn delete_usuario(&self, admin: &Usuario, id: Uuid, admin_password: &str) -> Result<(), AppError> {
        if admin.id == id {
            return Err(AppError::BusinessRule("Você não pode excluir o próprio usuário.".into()));
        }

        if !self.check_password(admin_password, &admin.senha_hash).await? {
            return Err(AppError::Forbidden("Senha do administrador incorreta.".into()));
        }

        if !self.usuario_repo.delete(id).await? {
            return Err(AppError::NotFound("Usuário"));
        }

        tracing::info!("🗑️ Usuário {} excluído por '{}'", id, admin.username);
        Ok(())
    }

    /// Cria o primeiro administrador quando a tabela está vazia.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<(), AppError> {
        if self.usuario_repo.count().await? > 0 {
            return Ok(());
        }

        let payload = CreateUsuarioPayload {
            username: username.to_string(),
            password: password.to_string(),
            nome: "Administrador".to_string(),
            email: None,
            papel: PapelUsuario::Admin,
        };
        self.create_usuario(&payload).await?;

        tracing::info!("✅ Administrador inicial '{}' criado", username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    // Pool preguiçoso: nenhum teste aqui toca no banco.
    fn service_with_secret(secret: &str) -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/brunos_loan_test")
            .unwrap();
        AuthService::new(UsuarioRepository::new(pool.clone()), secret.to_string(), pool)
    }

    fn service() -> AuthService {
        service_with_secret("segredo-de-teste")
    }

    fn usuario(papel: PapelUsuario) -> Usuario {
        Usuario {
            id: Uuid::new_v4(),
            username: "bruno".into(),
            senha_hash: String::new(),
            nome: "Bruno".into(),
            email: None,
            papel,
            ativo: true,
            ultima_atividade: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn token_round_trip_keeps_claims() {
        let service = service();
        let usuario = usuario(PapelUsuario::Operador);

        let token = service.create_token(&usuario).unwrap();
        let claims = service.decode_token(&token).unwrap();

        assert_eq!(claims.sub, usuario.id);
        assert_eq!(claims.papel, PapelUsuario::Operador);
        assert_eq!(claims.nome, "Bruno");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let outro = service_with_secret("outro-segredo");
        let token = outro.create_token(&usuario(PapelUsuario::Admin)).unwrap();

        assert!(matches!(service().decode_token(&token), Err(AppError::InvalidToken)));
        assert!(matches!(service().decode_token("lixo"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let service = service();
        let hash = service.hash_password("segredo").await.unwrap();

        assert!(service.check_password("segredo", &hash).await.unwrap());
        assert!(!service.check_password("errado", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn admin_cannot_delete_itself() {
        let service = service();
        let admin = usuario(PapelUsuario::Admin);

        let err = service.delete_usuario(&admin, admin.id, "qualquer").await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }
}
