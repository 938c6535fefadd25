pub mod usuario_repo;
pub use usuario_repo::UsuarioRepository;
pub mod cliente_repo;
pub use cliente_repo::ClienteRepository;
pub mod emprestimo_repo;
pub use emprestimo_repo::EmprestimoRepository;
pub mod parcela_repo;
pub use parcela_repo::ParcelaRepository;
pub mod juros_repo;
pub use juros_repo::JurosRepository;
