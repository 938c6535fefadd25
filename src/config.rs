// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{ClienteRepository, EmprestimoRepository, JurosRepository, ParcelaRepository, UsuarioRepository},
    services::{
        auth::AuthService,
        cliente_service::ClienteService,
        dashboard_service::DashboardService,
        emprestimo_service::EmprestimoService,
        juros_service::JurosService,
        notifier::{LogNotifier, Notifier},
        parcela_service::ParcelaService,
        reconciliation::StatusReconciler,
    },
};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub max_connections: u32,
    /// 0 desliga a reconciliação periódica
    pub reconciliacao_intervalo: Duration,
    pub admin: Option<(String, String)>,
}

fn var_or<T: std::str::FromStr>(nome: &str, padrao: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(nome) {
        Ok(valor) => valor.parse().with_context(|| format!("{} inválida: '{}'", nome, valor)),
        Err(_) => Ok(padrao),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let admin = match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
            (Ok(username), Ok(password)) => Some((username, password)),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            max_connections: var_or("DATABASE_MAX_CONNECTIONS", 5)?,
            reconciliacao_intervalo: Duration::from_secs(var_or("RECONCILIACAO_INTERVALO_SEGUNDOS", 0)?),
            admin,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub cliente_service: ClienteService,
    pub emprestimo_service: EmprestimoService,
    pub parcela_service: ParcelaService,
    pub juros_service: JurosService,
    pub dashboard_service: DashboardService,
    pub reconciler: StatusReconciler,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar no banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, config))
    }

    // --- Monta o gráfico de dependências ---
    fn with_pool(db_pool: PgPool, config: &Config) -> Self {
        let usuario_repo = UsuarioRepository::new(db_pool.clone());
        let cliente_repo = ClienteRepository::new(db_pool.clone());
        let emprestimo_repo = EmprestimoRepository::new(db_pool.clone());
        let parcela_repo = ParcelaRepository::new(db_pool.clone());
        let juros_repo = JurosRepository::new(db_pool.clone());

        let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

        let reconciler = StatusReconciler::new(emprestimo_repo.clone(), parcela_repo.clone(), db_pool.clone());

        let auth_service = AuthService::new(usuario_repo, config.jwt_secret.clone(), db_pool.clone());
        let cliente_service = ClienteService::new(cliente_repo.clone(), db_pool.clone(), notifier.clone());
        let emprestimo_service = EmprestimoService::new(
            emprestimo_repo.clone(),
            parcela_repo.clone(),
            cliente_repo,
            reconciler.clone(),
            notifier,
            db_pool.clone(),
        );
        let parcela_service = ParcelaService::new(parcela_repo.clone(), emprestimo_repo.clone(), db_pool.clone());
        let juros_service = JurosService::new(juros_repo, emprestimo_repo.clone(), db_pool.clone());
        let dashboard_service = DashboardService::new(emprestimo_repo, parcela_repo, emprestimo_service.clone());

        Self {
            db_pool,
            auth_service,
            cliente_service,
            emprestimo_service,
            parcela_service,
            juros_service,
            dashboard_service,
            reconciler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variavel_ausente_usa_padrao() {
        let porta: u32 = var_or("BRUNOS_LOAN_VARIAVEL_QUE_NAO_EXISTE", 5).unwrap();
        assert_eq!(porta, 5);
    }
}
