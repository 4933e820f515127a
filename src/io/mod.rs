//! Reading inputs and writing witnesses in the formats circom tooling uses.

pub mod input;
pub mod json;
pub mod wtns;

use std::path::Path;

use p3_field::PrimeField64;

use crate::error::WitnessError;

/// Decodes a canonical value, rejecting anything at or above the field order.
pub(crate) fn canonical<F: PrimeField64>(value: u64) -> Result<F, WitnessError> {
    if value >= F::ORDER_U64 {
        return Err(WitnessError::InvalidFieldValue(format!(
            "{value} is not below the field order {}",
            F::ORDER_U64
        )));
    }
    Ok(F::from_u64(value))
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Loads a witness file: JSON when the extension is `.json`, `.wtns` otherwise.
pub fn read_witness_file<F: PrimeField64>(path: impl AsRef<Path>) -> Result<Vec<F>, WitnessError> {
    let path = path.as_ref();
    if is_json(path) {
        json::read_file(path)
    } else {
        wtns::read_file(path)
    }
}

/// Writes a witness file, picking the format from the extension as
/// [`read_witness_file`] does.
pub fn write_witness_file<F: PrimeField64>(
    path: impl AsRef<Path>,
    witness: &[F],
) -> Result<(), WitnessError> {
    let path = path.as_ref();
    if is_json(path) {
        json::write_file(path, witness)
    } else {
        wtns::write_file(path, witness)
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs, process};

    use p3_field::PrimeCharacteristicRing;
    use p3_goldilocks::Goldilocks;

    use super::*;

    #[test]
    fn test_witness_file_format_follows_extension() {
        let witness = vec![Goldilocks::ONE, Goldilocks::from_u64(40320)];
        let dir = env::temp_dir();
        let stem = format!("calcwit-io-{}", process::id());
        let json_path = dir.join(format!("{stem}.JSON"));
        let wtns_path = dir.join(format!("{stem}.wtns"));

        write_witness_file(&json_path, &witness).unwrap();
        write_witness_file(&wtns_path, &witness).unwrap();
        assert!(fs::read_to_string(&json_path).unwrap().contains("\"40320\""));
        assert_eq!(&fs::read(&wtns_path).unwrap()[..4], b"wtns");

        assert_eq!(read_witness_file::<Goldilocks>(&json_path).unwrap(), witness);
        assert_eq!(read_witness_file::<Goldilocks>(&wtns_path).unwrap(), witness);
        // a .wtns payload behind a .json name is not parsed as binary
        fs::copy(&wtns_path, &json_path).unwrap();
        assert!(read_witness_file::<Goldilocks>(&json_path).is_err());

        fs::remove_file(json_path).unwrap();
        fs::remove_file(wtns_path).unwrap();
    }
}
