use std::{fs, path::Path};

use p3_field::Field;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{core::FieldOps, engine::Context, error::WitnessError};

fn scalar<F: Field>(name: &str, value: &Value) -> Result<F, WitnessError> {
    match value {
        Value::String(text) => F::fr_from_decimal(text),
        Value::Number(number) => {
            if let Some(v) = number.as_u64() {
                Ok(F::from_u64(v))
            } else if let Some(v) = number.as_i64() {
                Ok(-F::from_u64(v.unsigned_abs()))
            } else {
                Err(WitnessError::InvalidFieldValue(format!("{name}: {number}")))
            }
        }
        Value::Bool(b) => Ok(F::from_bool(*b)),
        other => Err(WitnessError::InvalidFieldValue(format!("{name}: {other}"))),
    }
}

/// Appends `value` to `out`, flattening nested arrays in row-major order.
fn flatten<F: Field>(name: &str, value: &Value, out: &mut Vec<F>) -> Result<(), WitnessError> {
    match value {
        Value::Array(items) => items.iter().try_for_each(|item| flatten(name, item, out)),
        other => {
            out.push(scalar(name, other)?);
            Ok(())
        }
    }
}

/// Parses a circom input object: `{"name": value | [values...], ...}`.
///
/// Values are JSON integers or decimal strings (a leading `-` negates in the
/// field). Arrays of any depth are flattened.
pub fn parse_inputs<F: Field>(json: &str) -> Result<Vec<(String, Vec<F>)>, WitnessError> {
    let object: Map<String, Value> = serde_json::from_str(json)?;
    object
        .iter()
        .map(|(name, value)| {
            let mut values = Vec::new();
            flatten(name, value, &mut values)?;
            Ok((name.clone(), values))
        })
        .collect()
}

/// Binds every input of `json` into `ctx`. Each array must match the declared
/// length of its main input.
pub fn load_inputs<F: Field>(ctx: &mut Context<F>, json: &str) -> Result<(), WitnessError> {
    for (name, values) in parse_inputs::<F>(json)? {
        debug!(input = %name, len = values.len(), "bind input");
        ctx.set_input_array(&name, &values)?;
    }
    Ok(())
}

pub fn load_inputs_file<F: Field>(
    ctx: &mut Context<F>,
    path: impl AsRef<Path>,
) -> Result<(), WitnessError> {
    let json = fs::read_to_string(path)?;
    load_inputs(ctx, &json)
}

#[cfg(test)]
mod tests {
    use p3_field::PrimeCharacteristicRing;
    use p3_goldilocks::Goldilocks;

    use super::*;
    use crate::{
        circuits::{example, multiplier},
        config::ExecConfig,
        engine::run,
    };

    #[test]
    fn test_parse_nested_and_negative() {
        let inputs = parse_inputs::<Goldilocks>(
            r#"{"a": "-1", "b": [[1, "2"], [3, 4]], "c": 7}"#,
        )
        .unwrap();
        let get = |name: &str| {
            inputs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(get("a"), vec![Goldilocks::NEG_ONE]);
        assert_eq!(
            get("b"),
            [1u64, 2, 3, 4].map(Goldilocks::from_u64).to_vec()
        );
        assert_eq!(get("c"), vec![Goldilocks::from_u64(7)]);
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(parse_inputs::<Goldilocks>(r#"{"a": 1.5}"#).is_err());
        assert!(parse_inputs::<Goldilocks>(r#"{"a": "0x10"}"#).is_err());
        assert!(parse_inputs::<Goldilocks>(r#"{"a": null}"#).is_err());
        assert!(parse_inputs::<Goldilocks>("[1, 2]").is_err());
    }

    #[test]
    fn test_load_inputs_and_run() {
        let circuit = example::circuit::<Goldilocks>();
        let mut ctx = Context::new(&circuit, ExecConfig::default()).unwrap();
        load_inputs(&mut ctx, r#"{"sig1": "3", "sig2": 4, "sig2_check": "5"}"#).unwrap();
        assert_eq!(ctx.inputs_remaining(), 0);
        run(&mut ctx).unwrap();
        assert_eq!(ctx.witness().unwrap()[4], Goldilocks::from_u64(7));
    }

    #[test]
    fn test_load_inputs_errors() {
        let circuit = multiplier::circuit::<Goldilocks>();

        let mut ctx = Context::new(&circuit, ExecConfig::default()).unwrap();
        let err = load_inputs(&mut ctx, r#"{"in": [1, 2, 3]}"#).unwrap_err();
        assert!(matches!(err, WitnessError::SizeMismatch { expected: 8, got: 3, .. }));

        let mut ctx = Context::new(&circuit, ExecConfig::default()).unwrap();
        let err = load_inputs(&mut ctx, r#"{"out": 1}"#).unwrap_err();
        assert!(matches!(err, WitnessError::UnknownInput(name) if name == "out"));

        let mut ctx = Context::new(&circuit, ExecConfig::default()).unwrap();
        load_inputs(&mut ctx, r#"{"in": [[1, 2, 3, 4], [5, 6, 7, 8]]}"#).unwrap();
        let err = load_inputs(&mut ctx, r#"{"in": [1, 2, 3, 4, 5, 6, 7, 8]}"#).unwrap_err();
        assert!(matches!(err, WitnessError::DuplicateInput { index: 0, .. }));
    }
}
