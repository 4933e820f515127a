use std::{fs, path::Path};

use p3_field::PrimeField64;

use super::canonical;
use crate::error::WitnessError;

/// The witness as a JSON array of canonical decimal strings.
pub fn to_json<F: PrimeField64>(witness: &[F]) -> Result<String, WitnessError> {
    let values: Vec<String> = witness
        .iter()
        .map(|value| value.as_canonical_u64().to_string())
        .collect();
    Ok(serde_json::to_string_pretty(&values)?)
}

pub fn from_json<F: PrimeField64>(json: &str) -> Result<Vec<F>, WitnessError> {
    let values: Vec<String> = serde_json::from_str(json)?;
    values
        .iter()
        .map(|text| {
            let value = text
                .parse::<u64>()
                .map_err(|_| WitnessError::InvalidFieldValue(text.clone()))?;
            canonical(value)
        })
        .collect()
}

pub fn write_file<F: PrimeField64>(path: impl AsRef<Path>, witness: &[F]) -> Result<(), WitnessError> {
    fs::write(path, to_json(witness)?)?;
    Ok(())
}

pub fn read_file<F: PrimeField64>(path: impl AsRef<Path>) -> Result<Vec<F>, WitnessError> {
    from_json(&fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use p3_field::PrimeCharacteristicRing;
    use p3_goldilocks::Goldilocks;

    use super::*;

    #[test]
    fn test_decimal_strings() {
        let witness = [Goldilocks::ONE, Goldilocks::NEG_ONE];
        let json = to_json(&witness).unwrap();
        let expected = format!("[\n  \"1\",\n  \"{}\"\n]", Goldilocks::ORDER_U64 - 1);
        assert_eq!(json, expected);
        assert_eq!(from_json::<Goldilocks>(&json).unwrap(), witness);
    }

    #[test]
    fn test_rejects_non_canonical() {
        let json = format!("[\"{}\"]", Goldilocks::ORDER_U64);
        assert!(from_json::<Goldilocks>(&json).is_err());
        assert!(from_json::<Goldilocks>(r#"["-1"]"#).is_err());
        assert!(from_json::<Goldilocks>("[1]").is_err());
    }
}
