// src/ledger/schedule.rs

// Geração de parcelas.
//
// Existem duas estratégias e elas NÃO produzem o mesmo valor:
// - `OriginationSchedule`: base fixa (P / n) crescendo com (1 + r)^(i-1). Usada na criação.
// - `RecalculationSchedule`: prestação constante (Price). Usada só em "recalcular parcelas".

use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, MathematicalOps};
use uuid::Uuid;

use crate::common::money::{rate_fraction, round_half_up};
use crate::ledger::LedgerError;
use crate::models::parcela::Parcela;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledInstallment {
    pub numero: i32,
    pub vencimento: NaiveDate,
    /// centavos
    pub valor: i64,
}

/// `base` + `meses` meses de calendário. 31/01 + 1 mês = 28/02 (ou 29/02).
pub fn add_months(base: NaiveDate, meses: u32) -> Result<NaiveDate, LedgerError> {
    base.checked_add_months(Months::new(meses))
        .ok_or(LedgerError::DateOutOfRange)
}

fn growth_factor(taxa: i32, expoente: u32) -> Result<Decimal, LedgerError> {
    (Decimal::ONE + rate_fraction(taxa))
        .checked_powu(u64::from(expoente))
        .ok_or(LedgerError::ValueOutOfRange)
}

#[derive(Debug, Clone)]
pub struct OriginationSchedule {
    principal: i64,
    taxa: i32,
    quantidade: u32,
    primeiro_vencimento: NaiveDate,
    base_informada: Option<i64>,
}

impl OriginationSchedule {
    pub fn new(
        principal: i64,
        taxa: i32,
        quantidade: i32,
        primeiro_vencimento: NaiveDate,
    ) -> Result<Self, LedgerError> {
        if principal <= 0 {
            return Err(LedgerError::NonPositiveAmount);
        }
        let quantidade = u32::try_from(quantidade)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or(LedgerError::InvalidInstallmentCount)?;

        Ok(Self { principal, taxa, quantidade, primeiro_vencimento, base_informada: None })
    }

    /// Usa o valor de parcela digitado pelo operador como base em vez de P / n.
    pub fn with_base_installment(mut self, base: Option<i64>) -> Result<Self, LedgerError> {
        if matches!(base, Some(v) if v <= 0) {
            return Err(LedgerError::NonPositiveAmount);
        }
        self.base_informada = base;
        Ok(self)
    }

    /// Base sem arredondamento, em centavos.
    pub fn base_installment(&self) -> Decimal {
        match self.base_informada {
            Some(base) => Decimal::from(base),
            None => Decimal::from(self.principal) / Decimal::from(self.quantidade),
        }
    }

    pub fn generate(&self) -> Result<Vec<ScheduledInstallment>, LedgerError> {
        if self.taxa == 0 && self.base_informada.is_none() {
            return self.flat();
        }

        let base = self.base_installment();
        let mut parcelas = Vec::with_capacity(self.quantidade as usize);

        for i in 1..=self.quantidade {
            let fator = growth_factor(self.taxa, i - 1)?;
            let valor = base
                .checked_mul(fator)
                .ok_or(LedgerError::ValueOutOfRange)
                .and_then(round_half_up)?;

            parcelas.push(ScheduledInstallment {
                numero: i as i32,
                vencimento: add_months(self.primeiro_vencimento, i - 1)?,
                valor,
            });
        }

        Ok(parcelas)
    }

    // Sem juros e com base derivada: floor(P / n) e a sobra na última, então a soma fecha em P.
    fn flat(&self) -> Result<Vec<ScheduledInstallment>, LedgerError> {
        let quantidade = i64::from(self.quantidade);
        let base = self.principal / quantidade;
        if base == 0 {
            return Err(LedgerError::PrincipalBelowInstallmentCount);
        }
        let ultima = self.principal - base * (quantidade - 1);

        (1..=self.quantidade)
            .map(|i| {
                Ok(ScheduledInstallment {
                    numero: i as i32,
                    vencimento: add_months(self.primeiro_vencimento, i - 1)?,
                    valor: if i == self.quantidade { ultima } else { base },
                })
            })
            .collect()
    }
}

/// Resultado de `RecalculationSchedule::plan`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecalculationPlan {
    pub valor_parcela: i64,
    /// Parcelas em aberto que recebem o novo valor.
    pub atualizar: Vec<Uuid>,
    pub novas: Vec<ScheduledInstallment>,
    pub preservadas: usize,
}

#[derive(Debug, Clone)]
pub struct RecalculationSchedule {
    principal: i64,
    taxa: i32,
    quantidade: u32,
}

impl RecalculationSchedule {
    pub fn new(principal: i64, taxa: i32, quantidade: i32) -> Result<Self, LedgerError> {
        if principal <= 0 {
            return Err(LedgerError::NonPositiveAmount);
        }
        let quantidade = u32::try_from(quantidade)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or(LedgerError::InvalidInstallmentCount)?;

        Ok(Self { principal, taxa, quantidade })
    }

    /// P * r * (1+r)^n / ((1+r)^n - 1), ou P / n sem juros.
    pub fn installment_value(&self) -> Result<i64, LedgerError> {
        let p = Decimal::from(self.principal);

        if self.taxa == 0 {
            return round_half_up(p / Decimal::from(self.quantidade));
        }

        let r = rate_fraction(self.taxa);
        let fator = growth_factor(self.taxa, self.quantidade)?;
        let denominador = fator - Decimal::ONE;

        p.checked_mul(r)
            .and_then(|v| v.checked_mul(fator))
            .and_then(|v| v.checked_div(denominador))
            .ok_or(LedgerError::ValueOutOfRange)
            .and_then(round_half_up)
    }

    /// Parcelas pagas ficam como estão. As em aberto recebem o novo valor.
    /// Faltando parcelas, cria as seguintes a partir de `primeiro_vencimento` (parcela k vence em +k-1 meses).
    pub fn plan(
        &self,
        existentes: &[Parcela],
        primeiro_vencimento: Option<NaiveDate>,
    ) -> Result<RecalculationPlan, LedgerError> {
        let valor_parcela = self.installment_value()?;

        let (pagas, abertas): (Vec<&Parcela>, Vec<&Parcela>) =
            existentes.iter().partition(|p| p.is_paid());

        let faltando = (self.quantidade as usize).saturating_sub(existentes.len());
        let mut novas = Vec::with_capacity(faltando);

        if faltando > 0 {
            let base = primeiro_vencimento.ok_or(LedgerError::MissingDueDate)?;
            let ultimo_numero = existentes.iter().map(|p| p.numero_parcela).max().unwrap_or(0);

            for numero in (ultimo_numero + 1)..=(ultimo_numero + faltando as i32) {
                let offset = u32::try_from(numero - 1).map_err(|_| LedgerError::ValueOutOfRange)?;
                novas.push(ScheduledInstallment {
                    numero,
                    vencimento: add_months(base, offset)?,
                    valor: valor_parcela,
                });
            }
        }

        Ok(RecalculationPlan {
            valor_parcela,
            atualizar: abertas.iter().map(|p| p.id).collect(),
            novas,
            preservadas: pagas.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::emprestimo::StatusPagamento;
    use chrono::Utc;

    fn data(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn parcela(numero: i32, status: StatusPagamento) -> Parcela {
        let pago = status == StatusPagamento::Pago;
        Parcela {
            id: Uuid::new_v4(),
            emprestimo_id: Uuid::nil(),
            numero_parcela: numero,
            data_vencimento: data(2025, numero as u32, 10),
            valor_parcela: 100_000,
            data_pagamento: pago.then(Utc::now),
            valor_pago: pago.then_some(100_000),
            status,
            modificado_por: None,
            modificado_em: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn generates_contiguous_monthly_installments() {
        let schedule = OriginationSchedule::new(500_000, 800, 5, data(2025, 2, 10)).unwrap();
        let parcelas = schedule.generate().unwrap();

        assert_eq!(parcelas.len(), 5);
        for (i, p) in parcelas.iter().enumerate() {
            assert_eq!(p.numero, i as i32 + 1);
            assert_eq!(p.vencimento, data(2025, 2 + i as u32, 10));
        }
    }

    #[test]
    fn installments_grow_from_flat_base() {
        // base 1000,00 e 8% a.m.
        let parcelas = OriginationSchedule::new(500_000, 800, 3, data(2025, 2, 10))
            .unwrap()
            .with_base_installment(Some(100_000))
            .unwrap()
            .generate()
            .unwrap();

        let valores: Vec<i64> = parcelas.iter().map(|p| p.valor).collect();
        assert_eq!(valores, vec![100_000, 108_000, 116_640]);
    }

    #[test]
    fn single_installment_carries_no_growth() {
        let parcelas = OriginationSchedule::new(500_000, 1000, 1, data(2025, 2, 10))
            .unwrap()
            .generate()
            .unwrap();

        assert_eq!(parcelas.len(), 1);
        assert_eq!(parcelas[0].valor, 500_000);
        assert_eq!(parcelas[0].vencimento, data(2025, 2, 10));
    }

    #[test]
    fn zero_rate_sums_to_principal_with_remainder_on_last() {
        let parcelas = OriginationSchedule::new(100_000, 0, 3, data(2025, 1, 5))
            .unwrap()
            .generate()
            .unwrap();

        let valores: Vec<i64> = parcelas.iter().map(|p| p.valor).collect();
        assert_eq!(valores, vec![33_333, 33_333, 33_334]);
        assert_eq!(valores.iter().sum::<i64>(), 100_000);
    }

    #[test]
    fn zero_rate_with_many_installments_keeps_every_value_positive() {
        // 1.000,00 em 600x: base 166 centavos, a última leva 166 + 400
        let parcelas = OriginationSchedule::new(100_000, 0, 600, data(2025, 1, 5))
            .unwrap()
            .generate()
            .unwrap();

        assert_eq!(parcelas.len(), 600);
        assert!(parcelas[..599].iter().all(|p| p.valor == 166));
        assert_eq!(parcelas[599].valor, 566);
        assert_eq!(parcelas.iter().map(|p| p.valor).sum::<i64>(), 100_000);
    }

    #[test]
    fn zero_rate_below_one_cent_per_installment_is_rejected() {
        assert_eq!(
            OriginationSchedule::new(2, 0, 3, data(2025, 1, 5)).unwrap().generate().unwrap_err(),
            LedgerError::PrincipalBelowInstallmentCount
        );
        // 3 centavos em 3x ainda fecha
        let valores: Vec<i64> = OriginationSchedule::new(3, 0, 3, data(2025, 1, 5))
            .unwrap()
            .generate()
            .unwrap()
            .iter()
            .map(|p| p.valor)
            .collect();
        assert_eq!(valores, vec![1, 1, 1]);
    }

    #[test]
    fn month_end_due_dates_are_clamped() {
        let parcelas = OriginationSchedule::new(300_000, 500, 3, data(2025, 1, 31))
            .unwrap()
            .generate()
            .unwrap();

        let datas: Vec<NaiveDate> = parcelas.iter().map(|p| p.vencimento).collect();
        assert_eq!(datas, vec![data(2025, 1, 31), data(2025, 2, 28), data(2025, 3, 31)]);
    }

    #[test]
    fn rejects_invalid_inputs() {
        let d0 = data(2025, 1, 10);
        assert_eq!(
            OriginationSchedule::new(100_000, 800, 0, d0).unwrap_err(),
            LedgerError::InvalidInstallmentCount
        );
        assert_eq!(
            OriginationSchedule::new(0, 800, 3, d0).unwrap_err(),
            LedgerError::NonPositiveAmount
        );
        assert!(RecalculationSchedule::new(100_000, 800, -1).is_err());
    }

    #[test]
    fn recalculation_uses_price_formula() {
        // 10.000,00 em 12x a 1% a.m. -> 888,49
        let schedule = RecalculationSchedule::new(1_000_000, 100, 12).unwrap();
        assert_eq!(schedule.installment_value().unwrap(), 88_849);

        let sem_juros = RecalculationSchedule::new(1_000_000, 0, 3).unwrap();
        assert_eq!(sem_juros.installment_value().unwrap(), 333_333);
    }

    #[test]
    fn recalculation_preserves_paid_and_appends_missing() {
        let existentes = vec![
            parcela(1, StatusPagamento::Pago),
            parcela(2, StatusPagamento::Pendente),
            parcela(3, StatusPagamento::Atrasado),
        ];
        let schedule = RecalculationSchedule::new(1_000_000, 100, 5).unwrap();

        let plano = schedule.plan(&existentes, Some(data(2025, 1, 10))).unwrap();

        assert_eq!(plano.preservadas, 1);
        assert_eq!(plano.atualizar, vec![existentes[1].id, existentes[2].id]);
        assert_eq!(plano.novas.len(), 2);
        assert_eq!(plano.novas[0].numero, 4);
        assert_eq!(plano.novas[0].vencimento, data(2025, 4, 10));
        assert_eq!(plano.novas[1].vencimento, data(2025, 5, 10));
        assert!(plano.novas.iter().all(|p| p.valor == plano.valor_parcela));
    }

    #[test]
    fn appending_without_due_date_fails() {
        let schedule = RecalculationSchedule::new(1_000_000, 100, 2).unwrap();
        assert_eq!(schedule.plan(&[], None).unwrap_err(), LedgerError::MissingDueDate);

        // nada a criar: a data não é necessária
        let existentes = vec![parcela(1, StatusPagamento::Pendente), parcela(2, StatusPagamento::Pendente)];
        assert!(schedule.plan(&existentes, None).is_ok());
    }
}
