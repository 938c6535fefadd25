pub mod auth;
pub mod cliente_service;
pub mod dashboard_service;
pub mod emprestimo_service;
pub mod juros_service;
pub mod notifier;
pub mod parcela_service;
pub mod reconciliation;
