// src/common/validation.rs

// Validadores customizados para os payloads (`#[validate(custom(function = ...))]`).
// Os valores monetários chegam em reais (Decimal) e só viram centavos no service.

use rust_decimal::Decimal;
use validator::ValidationError;

pub fn positive(valor: &Decimal) -> Result<(), ValidationError> {
    if valor.is_sign_positive() && !valor.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("positive").with_message("O valor deve ser maior que zero.".into()))
    }
}

pub fn non_negative(valor: &Decimal) -> Result<(), ValidationError> {
    if valor.is_sign_negative() && !valor.is_zero() {
        Err(ValidationError::new("non_negative").with_message("O valor não pode ser negativo.".into()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn positive_rejects_zero_and_negatives() {
        assert!(positive(&dec!(0.01)).is_ok());
        assert!(positive(&dec!(0)).is_err());
        assert!(positive(&dec!(-5)).is_err());
    }

    #[test]
    fn non_negative_accepts_zero() {
        assert!(non_negative(&dec!(0)).is_ok());
        assert!(non_negative(&dec!(10.5)).is_ok());
        assert!(non_negative(&dec!(-0.01)).is_err());
    }
}
