use p3_field::Field;

use crate::error::WitnessError;

/// Field operations compiled templates use beyond the ring operators.
///
/// Booleans are field elements: `ONE` for true and `ZERO` for false. Truthiness
/// is "not zero", the same test the compiled `assert` performs.
pub trait FieldOps: Field {
    fn fr_eq(&self, other: &Self) -> Self {
        Self::from_bool(self == other)
    }

    fn fr_neq(&self, other: &Self) -> Self {
        Self::from_bool(self != other)
    }

    fn fr_is_true(&self) -> bool {
        !self.is_zero()
    }

    fn fr_not(&self) -> Self {
        Self::from_bool(self.is_zero())
    }

    fn fr_land(&self, other: &Self) -> Self {
        Self::from_bool(self.fr_is_true() && other.fr_is_true())
    }

    fn fr_lor(&self, other: &Self) -> Self {
        Self::from_bool(self.fr_is_true() || other.fr_is_true())
    }

    /// `None` when dividing by zero.
    fn fr_div(&self, other: &Self) -> Option<Self> {
        other.try_inverse().map(|inv| *self * inv)
    }

    /// Parses a decimal integer (optionally negative) and reduces it modulo the
    /// field order.
    fn fr_from_decimal(text: &str) -> Result<Self, WitnessError> {
        let trimmed = text.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        if digits.is_empty() {
            return Err(WitnessError::InvalidFieldValue(text.to_string()));
        }

        let ten = Self::from_u8(10);
        let mut acc = Self::ZERO;
        for ch in digits.chars() {
            let digit = ch
                .to_digit(10)
                .ok_or_else(|| WitnessError::InvalidFieldValue(text.to_string()))?;
            acc = acc * ten + Self::from_u32(digit);
        }
        Ok(if negative { -acc } else { acc })
    }
}

impl<F: Field> FieldOps for F {}
