// src/ledger/status.rs

use chrono::{DateTime, NaiveDate, Utc};

use crate::ledger::LedgerError;
use crate::models::{
    emprestimo::{StatusPagamento, TipoEmprestimo},
    parcela::Parcela,
};

/// Vencido e não pago vira `atrasado`. `pago` nunca regride.
pub fn resolve_status(
    vencimento: Option<NaiveDate>,
    atual: StatusPagamento,
    hoje: NaiveDate,
) -> StatusPagamento {
    match (atual, vencimento) {
        (StatusPagamento::Pago, _) => StatusPagamento::Pago,
        (_, Some(data)) if data < hoje => StatusPagamento::Atrasado,
        (atual, _) => atual,
    }
}

/// `Some(novo)` quando o status persistido precisa ser atualizado.
pub fn reclassify(
    vencimento: Option<NaiveDate>,
    atual: StatusPagamento,
    hoje: NaiveDate,
) -> Option<StatusPagamento> {
    let novo = resolve_status(vencimento, atual, hoje);
    (novo != atual).then_some(novo)
}

/// Parcela paga não recebe outro pagamento.
pub fn ensure_payable(parcela: &Parcela) -> Result<(), LedgerError> {
    if parcela.is_paid() {
        return Err(LedgerError::InstallmentAlreadyPaid(parcela.numero_parcela));
    }
    Ok(())
}

/// O empréstimo fica quitado pelas parcelas: só parcelados, e sem nenhuma em aberto.
/// No juros recorrente quem quita é o saldo devedor.
pub fn closed_by_installments(tipo: TipoEmprestimo, em_aberto: i64) -> bool {
    tipo == TipoEmprestimo::Parcelado && em_aberto == 0
}

/// Status e data de pagamento a gravar no empréstimo depois de pagar uma parcela.
/// `None` quando nada muda (ainda há parcelas em aberto, ou já estava pago).
pub fn close_out(
    tipo: TipoEmprestimo,
    em_aberto: i64,
    atual: StatusPagamento,
    agora: DateTime<Utc>,
) -> Option<(StatusPagamento, DateTime<Utc>)> {
    (closed_by_installments(tipo, em_aberto) && atual != StatusPagamento::Pago)
        .then_some((StatusPagamento::Pago, agora))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn data(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn overdue_pending_becomes_late() {
        let hoje = data(2025, 3, 11);
        assert_eq!(
            resolve_status(Some(data(2025, 3, 10)), StatusPagamento::Pendente, hoje),
            StatusPagamento::Atrasado
        );
    }

    #[test]
    fn due_today_is_still_pending() {
        let hoje = data(2025, 3, 10);
        assert_eq!(
            resolve_status(Some(hoje), StatusPagamento::Pendente, hoje),
            StatusPagamento::Pendente
        );
    }

    #[test]
    fn paid_never_regresses() {
        let hoje = data(2025, 3, 10);
        assert_eq!(
            resolve_status(Some(data(2020, 1, 1)), StatusPagamento::Pago, hoje),
            StatusPagamento::Pago
        );
    }

    #[test]
    fn without_due_date_status_is_kept() {
        let hoje = data(2025, 3, 10);
        assert_eq!(resolve_status(None, StatusPagamento::Pendente, hoje), StatusPagamento::Pendente);
        assert_eq!(resolve_status(None, StatusPagamento::Atrasado, hoje), StatusPagamento::Atrasado);
    }

    #[test]
    fn reclassify_reports_only_changes() {
        let hoje = data(2025, 3, 10);
        assert_eq!(
            reclassify(Some(data(2025, 1, 1)), StatusPagamento::Pendente, hoje),
            Some(StatusPagamento::Atrasado)
        );
        assert_eq!(reclassify(Some(data(2025, 1, 1)), StatusPagamento::Atrasado, hoje), None);
        assert_eq!(reclassify(Some(data(2025, 9, 1)), StatusPagamento::Pendente, hoje), None);
    }

    fn parcela(status: StatusPagamento) -> Parcela {
        let pago = status == StatusPagamento::Pago;
        Parcela {
            id: Uuid::new_v4(),
            emprestimo_id: Uuid::nil(),
            numero_parcela: 4,
            data_vencimento: data(2025, 4, 10),
            valor_parcela: 50_000,
            data_pagamento: pago.then(Utc::now),
            valor_pago: pago.then_some(50_000),
            status,
            modificado_por: None,
            modificado_em: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn paying_the_last_open_installment_settles_the_loan() {
        let agora = Utc::now();
        assert_eq!(
            close_out(TipoEmprestimo::Parcelado, 0, StatusPagamento::Atrasado, agora),
            Some((StatusPagamento::Pago, agora))
        );
        assert_eq!(close_out(TipoEmprestimo::Parcelado, 1, StatusPagamento::Pendente, agora), None);
    }

    #[test]
    fn already_paid_loan_keeps_its_payment_date() {
        assert_eq!(close_out(TipoEmprestimo::Parcelado, 0, StatusPagamento::Pago, Utc::now()), None);
        assert!(closed_by_installments(TipoEmprestimo::Parcelado, 0));
    }

    #[test]
    fn recurring_interest_loan_is_not_closed_by_installments() {
        assert_eq!(close_out(TipoEmprestimo::JurosRecorrente, 0, StatusPagamento::Pendente, Utc::now()), None);
        assert!(!closed_by_installments(TipoEmprestimo::JurosRecorrente, 0));
    }

    #[test]
    fn paid_installment_cannot_be_paid_again() {
        assert_eq!(
            ensure_payable(&parcela(StatusPagamento::Pago)).unwrap_err(),
            LedgerError::InstallmentAlreadyPaid(4)
        );
        assert!(ensure_payable(&parcela(StatusPagamento::Atrasado)).is_ok());
        assert!(ensure_payable(&parcela(StatusPagamento::Pendente)).is_ok());
    }
}
