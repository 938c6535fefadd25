//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod ledger;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    if let Some((username, password)) = &config.admin {
        app_state.auth_service.ensure_admin(username, password).await?;
    }

    if !config.reconciliacao_intervalo.is_zero() {
        app_state.reconciler.clone().spawn(config.reconciliacao_intervalo);
        tracing::info!(
            "🔄 Reconciliação de status a cada {}s",
            config.reconciliacao_intervalo.as_secs()
        );
    }

    // Rotas públicas
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout));

    let usuario_routes = Router::new()
        .route("/",
               get(handlers::usuarios::list_usuarios)
               .post(handlers::usuarios::create_usuario)
        )
        .route("/{id}", delete(handlers::usuarios::delete_usuario));

    let cliente_routes = Router::new()
        .route("/",
               get(handlers::clientes::list_clientes)
               .post(handlers::clientes::create_cliente)
        )
        .route("/{id}",
               get(handlers::clientes::get_cliente)
               .put(handlers::clientes::update_cliente)
               .delete(handlers::clientes::delete_cliente)
        )
        .route("/{id}/enviar-anotacoes", post(handlers::clientes::enviar_anotacoes))
        .route("/{id}/emprestimos", get(handlers::clientes::list_emprestimos_do_cliente));

    let emprestimo_routes = Router::new()
        .route("/",
               get(handlers::emprestimos::list_emprestimos)
               .post(handlers::emprestimos::create_parcelado)
        )
        .route("/juros-recorrente", post(handlers::emprestimos::create_juros_recorrente))
        .route("/{id}",
               get(handlers::emprestimos::get_emprestimo)
               .put(handlers::emprestimos::update_emprestimo)
        )
        .route("/{id}/marcar-pago", post(handlers::emprestimos::marcar_como_pago))
        .route("/{id}/parcelas",
               get(handlers::emprestimos::list_parcelas)
               .post(handlers::emprestimos::create_parcela)
        )
        .route("/{id}/recalcular-parcelas", post(handlers::emprestimos::recalcular_parcelas))
        .route("/{id}/lembrete-atraso", post(handlers::emprestimos::enviar_lembrete_atraso))
        // Juros recorrente
        .route("/{id}/pagamentos-juros",
               get(handlers::juros::list_pagamentos)
               .post(handlers::juros::registrar_pagamento)
        )
        .route("/{id}/amortizacoes",
               get(handlers::juros::list_amortizacoes)
               .post(handlers::juros::registrar_amortizacao)
        )
        .route("/{id}/totais-juros-recorrente", get(handlers::juros::totais))
        .route("/{id}/recalcular-ledger", post(handlers::juros::recalcular_ledger));

    let parcela_routes = Router::new()
        .route("/transacoes-recentes", get(handlers::parcelas::transacoes_recentes))
        .route("/estatisticas", get(handlers::parcelas::estatisticas))
        .route("/{id}",
               put(handlers::parcelas::update_parcela)
               .delete(handlers::parcelas::delete_parcela)
        )
        .route("/{id}/pagar", post(handlers::parcelas::pagar_parcela));

    let dashboard_routes = Router::new()
        .route("/stats", get(handlers::dashboard::get_stats))
        .route("/payment-stats", get(handlers::dashboard::get_payment_stats));

    // Tudo aqui exige token válido
    let protected = Router::new()
        .route("/api/auth/me", get(handlers::auth::get_me))
        .nest("/api/usuarios", usuario_routes)
        .nest("/api/clientes", cliente_routes)
        .nest("/api/emprestimos", emprestimo_routes)
        .nest("/api/parcelas", parcela_routes)
        .route("/api/pagamentos-juros/{id}",
               put(handlers::juros::update_pagamento)
               .delete(handlers::juros::delete_pagamento)
        )
        .route("/api/amortizacoes/{id}",
               put(handlers::juros::update_amortizacao)
               .delete(handlers::juros::delete_amortizacao)
        )
        .nest("/api/dashboard", dashboard_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
