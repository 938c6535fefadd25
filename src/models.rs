pub mod auth;
pub mod cliente;
pub mod dashboard;
pub mod emprestimo;
pub mod juros;
pub mod parcela;
