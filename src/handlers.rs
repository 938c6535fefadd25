pub mod auth;
pub mod clientes;
pub mod dashboard;
pub mod emprestimos;
pub mod juros;
pub mod parcelas;
pub mod usuarios;
