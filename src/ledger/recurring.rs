// src/ledger/recurring.rs

// Empréstimos de juros recorrente: o saldo devedor só cai com amortizações,
// e o juros mensal é sempre derivado do saldo atual.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::common::money::{rate_fraction, round_half_up};
use crate::ledger::LedgerError;
use crate::models::{
    emprestimo::{Emprestimo, StatusPagamento},
    juros::TotaisJurosRecorrente,
};

/// round(saldo * taxa), em centavos.
pub fn monthly_interest(saldo: i64, taxa: i32) -> Result<i64, LedgerError> {
    Decimal::from(saldo)
        .checked_mul(rate_fraction(taxa))
        .ok_or(LedgerError::ValueOutOfRange)
        .and_then(round_half_up)
}

/// Snapshot gravado em `amortizacoes` e aplicado no empréstimo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmortizationOutcome {
    pub saldo_anterior: i64,
    pub saldo_novo: i64,
    pub juros_anterior: i64,
    pub juros_novo: i64,
}

impl AmortizationOutcome {
    pub fn quitado(&self) -> bool {
        self.saldo_novo == 0
    }
}

pub fn apply_amortization(saldo: i64, taxa: i32, valor: i64) -> Result<AmortizationOutcome, LedgerError> {
    if valor <= 0 {
        return Err(LedgerError::NonPositiveAmount);
    }
    if valor > saldo {
        return Err(LedgerError::AmortizationExceedsBalance { valor, saldo });
    }

    let saldo_novo = saldo - valor;
    Ok(AmortizationOutcome {
        saldo_anterior: saldo,
        saldo_novo,
        juros_anterior: monthly_interest(saldo, taxa)?,
        juros_novo: monthly_interest(saldo_novo, taxa)?,
    })
}

/// Novo (saldo_novo, juros_novo) quando o valor de uma amortização é editado.
///
/// A diferença é aplicada sobre o `saldo_novo` gravado naquele registro, sem
/// reprocessar as demais amortizações. Só é exato para a amortização mais
/// recente; para as anteriores use [`replay`].
pub fn edit_amortization(
    saldo_novo_registrado: i64,
    valor_antigo: i64,
    valor_novo: i64,
    taxa: i32,
) -> Result<(i64, i64), LedgerError> {
    if valor_novo <= 0 {
        return Err(LedgerError::NonPositiveAmount);
    }

    let saldo_novo = saldo_novo_registrado - (valor_novo - valor_antigo);
    if saldo_novo < 0 {
        return Err(LedgerError::AmortizationExceedsBalance {
            valor: valor_novo,
            saldo: saldo_novo_registrado + valor_antigo,
        });
    }

    Ok((saldo_novo, monthly_interest(saldo_novo, taxa)?))
}

/// Desfaz uma amortização sobre o saldo atual do empréstimo.
pub fn revert_amortization(saldo_atual: i64, valor: i64, taxa: i32) -> Result<(i64, i64), LedgerError> {
    let saldo = saldo_atual
        .checked_add(valor)
        .ok_or(LedgerError::ValueOutOfRange)?;

    Ok((saldo, monthly_interest(saldo, taxa)?))
}

/// Status e data de pagamento do empréstimo depois que o saldo mudou.
///
/// Saldo zero quita (mantendo a data original se já estava pago). Um empréstimo
/// pago que volta a ter saldo reabre como `pendente`.
pub fn settlement(
    saldo: i64,
    status: StatusPagamento,
    data_pagamento: Option<DateTime<Utc>>,
    agora: DateTime<Utc>,
) -> (StatusPagamento, Option<DateTime<Utc>>) {
    match (saldo, status) {
        (0, StatusPagamento::Pago) => (StatusPagamento::Pago, data_pagamento.or(Some(agora))),
        (0, _) => (StatusPagamento::Pago, Some(agora)),
        (_, StatusPagamento::Pago) => (StatusPagamento::Pendente, None),
        (_, outro) => (outro, data_pagamento),
    }
}

/// Totais do empréstimo a partir do que já está gravado. Não altera nada.
pub fn totals(
    emprestimo: &Emprestimo,
    total_juros_pagos: i64,
    total_amortizado: i64,
) -> Result<TotaisJurosRecorrente, LedgerError> {
    let total_pago = total_juros_pagos
        .checked_add(total_amortizado)
        .ok_or(LedgerError::ValueOutOfRange)?;

    Ok(TotaisJurosRecorrente {
        total_juros_pagos,
        total_amortizado,
        total_pago,
        saldo_devedor: emprestimo.saldo_devedor,
        valor_emprestado: emprestimo.valor_emprestado,
        valor_juros_mensal: monthly_interest(emprestimo.saldo_devedor, emprestimo.taxa_juros)?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayedAmortization {
    pub id: Uuid,
    pub outcome: AmortizationOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerReplay {
    pub amortizacoes: Vec<ReplayedAmortization>,
    pub saldo_devedor: i64,
    pub valor_juros_mensal: i64,
}

/// Reaplica todas as amortizações (já em ordem cronológica) a partir do valor emprestado.
pub fn replay(principal: i64, taxa: i32, amortizacoes: &[(Uuid, i64)]) -> Result<LedgerReplay, LedgerError> {
    let mut saldo = principal;
    let mut reaplicadas = Vec::with_capacity(amortizacoes.len());

    for &(id, valor) in amortizacoes {
        let outcome = apply_amortization(saldo, taxa, valor)?;
        saldo = outcome.saldo_novo;
        reaplicadas.push(ReplayedAmortization { id, outcome });
    }

    Ok(LedgerReplay {
        amortizacoes: reaplicadas,
        saldo_devedor: saldo,
        valor_juros_mensal: monthly_interest(saldo, taxa)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::emprestimo::TipoEmprestimo;
    use chrono::NaiveDate;

    // 10.000,00 a 8%, já com 2.000,00 amortizados
    fn emprestimo_juros_recorrente() -> Emprestimo {
        Emprestimo {
            id: Uuid::new_v4(),
            cliente_id: Uuid::new_v4(),
            tipo_emprestimo: TipoEmprestimo::JurosRecorrente,
            valor_emprestado: 1_000_000,
            taxa_juros: 800,
            saldo_devedor: 800_000,
            quantidade_parcelas: 0,
            valor_parcela: 0,
            valor_juros_mensal: Some(64_000),
            data_emprestimo: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            data_vencimento: None,
            status: StatusPagamento::Pendente,
            data_pagamento: None,
            modificado_por: None,
            modificado_em: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn monthly_interest_is_rounded_half_up() {
        assert_eq!(monthly_interest(1_000_000, 800).unwrap(), 80_000);
        // 333,33 * 10.5% = 34,99965
        assert_eq!(monthly_interest(33_333, 1050).unwrap(), 3_500);
        assert_eq!(monthly_interest(0, 800).unwrap(), 0);
    }

    #[test]
    fn amortization_reduces_balance_and_interest() {
        let outcome = apply_amortization(1_000_000, 800, 200_000).unwrap();

        assert_eq!(outcome.saldo_anterior, 1_000_000);
        assert_eq!(outcome.saldo_novo, 800_000);
        assert_eq!(outcome.juros_anterior, 80_000);
        assert_eq!(outcome.juros_novo, 64_000);
        assert!(!outcome.quitado());
    }

    #[test]
    fn amortizing_the_whole_balance_settles_the_loan() {
        let outcome = apply_amortization(500_000, 800, 500_000).unwrap();
        assert_eq!(outcome.saldo_novo, 0);
        assert_eq!(outcome.juros_novo, 0);
        assert!(outcome.quitado());
    }

    #[test]
    fn amortization_above_balance_is_rejected() {
        assert_eq!(
            apply_amortization(100_000, 800, 100_001).unwrap_err(),
            LedgerError::AmortizationExceedsBalance { valor: 100_001, saldo: 100_000 }
        );
        assert_eq!(apply_amortization(100_000, 800, 0).unwrap_err(), LedgerError::NonPositiveAmount);
    }

    #[test]
    fn reverting_the_latest_amortization_restores_state() {
        let antes = (1_000_000, monthly_interest(1_000_000, 800).unwrap());
        let outcome = apply_amortization(antes.0, 800, 200_000).unwrap();

        let depois = revert_amortization(outcome.saldo_novo, 200_000, 800).unwrap();
        assert_eq!(depois, antes);
    }

    #[test]
    fn editing_applies_the_delta_to_the_stored_snapshot() {
        // 10.000 -> amortiza 2.000 -> 8.000; edita para 3.000 -> 7.000
        let (saldo, juros) = edit_amortization(800_000, 200_000, 300_000, 800).unwrap();
        assert_eq!(saldo, 700_000);
        assert_eq!(juros, 56_000);

        // para 1.000 -> 9.000
        let (saldo, _) = edit_amortization(800_000, 200_000, 100_000, 800).unwrap();
        assert_eq!(saldo, 900_000);

        assert!(matches!(
            edit_amortization(800_000, 200_000, 1_000_001, 800),
            Err(LedgerError::AmortizationExceedsBalance { saldo: 1_000_000, .. })
        ));
    }

    #[test]
    fn settlement_follows_the_balance() {
        let agora = Utc::now();
        let antes = agora - chrono::Duration::days(3);

        assert_eq!(settlement(0, StatusPagamento::Pendente, None, agora), (StatusPagamento::Pago, Some(agora)));
        assert_eq!(
            settlement(0, StatusPagamento::Pago, Some(antes), agora),
            (StatusPagamento::Pago, Some(antes))
        );
        assert_eq!(settlement(10, StatusPagamento::Pago, Some(antes), agora), (StatusPagamento::Pendente, None));
        assert_eq!(settlement(10, StatusPagamento::Atrasado, None, agora), (StatusPagamento::Atrasado, None));
    }

    #[test]
    fn replay_rebuilds_every_snapshot_in_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let resultado = replay(1_000_000, 800, &[(a, 200_000), (b, 300_000)]).unwrap();

        assert_eq!(resultado.saldo_devedor, 500_000);
        assert_eq!(resultado.valor_juros_mensal, 40_000);
        assert_eq!(resultado.amortizacoes[0].id, a);
        assert_eq!(resultado.amortizacoes[0].outcome.saldo_novo, 800_000);
        assert_eq!(resultado.amortizacoes[1].outcome.saldo_anterior, 800_000);
        assert_eq!(resultado.amortizacoes[1].outcome.juros_novo, 40_000);
    }

    #[test]
    fn replay_without_amortizations_resets_to_principal() {
        let resultado = replay(1_000_000, 800, &[]).unwrap();
        assert_eq!(resultado.saldo_devedor, 1_000_000);
        assert_eq!(resultado.valor_juros_mensal, 80_000);
        assert!(resultado.amortizacoes.is_empty());
    }

    #[test]
    fn replay_fails_when_history_exceeds_principal() {
        let err = replay(100_000, 800, &[(Uuid::new_v4(), 60_000), (Uuid::new_v4(), 60_000)]).unwrap_err();
        assert_eq!(err, LedgerError::AmortizationExceedsBalance { valor: 60_000, saldo: 40_000 });
    }

    #[test]
    fn totals_are_derived_from_the_stored_snapshot() {
        let emprestimo = emprestimo_juros_recorrente();

        let totais = totals(&emprestimo, 160_000, 200_000).unwrap();

        assert_eq!(totais.total_pago, 360_000);
        assert_eq!(totais.saldo_devedor, 800_000);
        assert_eq!(totais.valor_emprestado, 1_000_000);
        assert_eq!(totais.valor_juros_mensal, 64_000);
    }

    #[test]
    fn totals_are_idempotent() {
        let emprestimo = emprestimo_juros_recorrente();

        let primeira = totals(&emprestimo, 160_000, 200_000).unwrap();
        let segunda = totals(&emprestimo, 160_000, 200_000).unwrap();

        assert_eq!(primeira, segunda);
        assert_eq!(emprestimo.saldo_devedor, 800_000);
        assert_eq!(emprestimo.valor_juros_mensal, Some(64_000));
    }
}
