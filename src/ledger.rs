// src/ledger.rs

//! Motor financeiro dos empréstimos.
//!
//! Tudo aqui é puro: recebe valores (centavos, centésimos de %, datas) e devolve
//! o que deve ser persistido. Nenhuma função toca no banco ou no relógio; quem
//! chama passa o "hoje". Os services em `crate::services` fazem a persistência
//! dentro de uma transação.

pub mod recurring;
pub mod schedule;
pub mod stats;
pub mod status;

use thiserror::Error;

use crate::models::emprestimo::TipoEmprestimo;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("A quantidade de parcelas deve ser no mínimo 1.")]
    InvalidInstallmentCount,

    #[error("O valor deve ser maior que zero.")]
    NonPositiveAmount,

    #[error("O valor emprestado não cobre um centavo por parcela.")]
    PrincipalBelowInstallmentCount,

    #[error("A parcela {0} já está paga.")]
    InstallmentAlreadyPaid(i32),

    #[error("Valor da amortização excede o saldo devedor.")]
    AmortizationExceedsBalance { valor: i64, saldo: i64 },

    #[error("Valor fora do intervalo suportado.")]
    ValueOutOfRange,

    #[error("Data de vencimento fora do calendário suportado.")]
    DateOutOfRange,

    #[error("Data de vencimento não definida no empréstimo.")]
    MissingDueDate,

    #[error("Operação disponível apenas para empréstimos do tipo '{0}'.")]
    WrongLoanType(TipoEmprestimo),
}
