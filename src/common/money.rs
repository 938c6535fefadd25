// src/common/money.rs

// Conversões na fronteira da API.
// Internamente: dinheiro em centavos (i64) e taxas em centésimos de porcentagem (i32).
// Externamente: reais e porcentagem em decimal (ex: 1500.50 e 10.5).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serializer;

use crate::ledger::LedgerError;

/// Arredonda para o inteiro mais próximo, com meio para cima (2.5 -> 3).
pub fn round_half_up(valor: Decimal) -> Result<i64, LedgerError> {
    valor
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(LedgerError::ValueOutOfRange)
}

/// R$ 1.234,565 -> 123457 centavos
pub fn reais_to_cents(reais: Decimal) -> Result<i64, LedgerError> {
    let centavos = reais
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(LedgerError::ValueOutOfRange)?;
    round_half_up(centavos)
}

pub fn cents_to_reais(centavos: i64) -> Decimal {
    Decimal::new(centavos, 2)
}

/// 10.5 (%) -> 1050 centésimos
pub fn percent_to_rate(percentual: Decimal) -> Result<i32, LedgerError> {
    let centesimos = percentual
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(LedgerError::ValueOutOfRange)
        .and_then(round_half_up)?;
    i32::try_from(centesimos).map_err(|_| LedgerError::ValueOutOfRange)
}

/// 1050 -> 0.1050 (fração mensal usada nas fórmulas)
pub fn rate_fraction(taxa_centesimos: i32) -> Decimal {
    Decimal::new(i64::from(taxa_centesimos), 4)
}

/// 1050 -> 10.50 (%)
pub fn rate_to_percent(taxa_centesimos: i32) -> Decimal {
    Decimal::new(i64::from(taxa_centesimos), 2)
}

// --- Serializadores usados nos models (`#[serde(serialize_with = ...)]`) ---

pub fn as_reais<S: Serializer>(centavos: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serde::Serialize::serialize(&cents_to_reais(*centavos), serializer)
}

pub fn as_reais_opt<S: Serializer>(centavos: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
    match centavos {
        Some(c) => serializer.serialize_some(&cents_to_reais(*c)),
        None => serializer.serialize_none(),
    }
}

pub fn as_percent<S: Serializer>(taxa: &i32, serializer: S) -> Result<S::Ok, S::Error> {
    serde::Serialize::serialize(&rate_to_percent(*taxa), serializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn reais_are_rounded_half_up_to_cents() {
        assert_eq!(reais_to_cents(dec!(5000)).unwrap(), 500_000);
        assert_eq!(reais_to_cents(dec!(1906.67)).unwrap(), 190_667);
        assert_eq!(reais_to_cents(dec!(0.005)).unwrap(), 1);
        assert_eq!(reais_to_cents(dec!(0.004)).unwrap(), 0);
        assert_eq!(reais_to_cents(dec!(10.125)).unwrap(), 1013);
    }

    #[test]
    fn percent_input_becomes_hundredths() {
        assert_eq!(percent_to_rate(dec!(10.5)).unwrap(), 1050);
        assert_eq!(percent_to_rate(dec!(8)).unwrap(), 800);
        assert_eq!(percent_to_rate(dec!(0)).unwrap(), 0);
    }

    #[test]
    fn rate_fraction_and_percent_views() {
        assert_eq!(rate_fraction(800), dec!(0.08));
        assert_eq!(rate_fraction(1050), dec!(0.105));
        assert_eq!(rate_to_percent(1050), dec!(10.5));
    }

    #[test]
    fn absurd_values_are_rejected() {
        assert!(reais_to_cents(Decimal::MAX).is_err());
        assert!(percent_to_rate(dec!(100000000)).is_err());
    }

    #[test]
    fn cents_serialize_as_reais() {
        #[derive(serde::Serialize)]
        struct Linha {
            #[serde(serialize_with = "as_reais")]
            valor: i64,
            #[serde(serialize_with = "as_reais_opt")]
            pago: Option<i64>,
            #[serde(serialize_with = "as_percent")]
            taxa: i32,
        }

        let json = serde_json::to_value(Linha { valor: 150_050, pago: None, taxa: 1050 }).unwrap();
        assert_eq!(json["valor"].as_f64(), Some(1500.5));
        assert!(json["pago"].is_null());
        assert_eq!(json["taxa"].as_f64(), Some(10.5));
    }
}
