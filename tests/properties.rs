use calcwit_rs::{
    ExecConfig, WitnessError,
    circuits::multiplier,
    engine::calculate,
    hash::sha256::witness_digest,
};
use p3_field::{PrimeCharacteristicRing, PrimeField64};
use p3_goldilocks::Goldilocks;
use proptest::prelude::*;

type F = Goldilocks;

fn inputs(values: &[u64]) -> Vec<(&'static str, Vec<F>)> {
    vec![("in", values.iter().map(|&v| F::from_u64(v)).collect())]
}

proptest! {
    #[test]
    fn parallel_matches_sequential(values in prop::collection::vec(1u64..1 << 20, 8)) {
        let circuit = multiplier::circuit::<F>();
        let parallel = calculate(&circuit, ExecConfig::default(), &inputs(&values))
            .unwrap()
            .witness()
            .unwrap();
        let sequential = calculate(&circuit, ExecConfig::sequential(), &inputs(&values))
            .unwrap()
            .witness()
            .unwrap();
        prop_assert_eq!(&parallel, &sequential);

        let product = values.iter().fold(F::ONE, |acc, &v| acc * F::from_u64(v));
        prop_assert_eq!(parallel[1], product);
    }

    #[test]
    fn repeated_runs_are_identical(values in prop::collection::vec(1u64..F::ORDER_U64, 8)) {
        let circuit = multiplier::circuit::<F>();
        let digests: Vec<_> = (0..3)
            .map(|_| {
                let ctx = calculate(&circuit, ExecConfig::default(), &inputs(&values)).unwrap();
                witness_digest(&ctx.witness().unwrap())
            })
            .collect();
        prop_assert!(digests.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn zero_input_fails_in_owning_leaf(position in 0usize..8, parallel in any::<bool>()) {
        let mut values = vec![3u64; 8];
        values[position] = 0;
        let config = ExecConfig { parallel, ..ExecConfig::default() };
        let err = calculate(&multiplier::circuit::<F>(), config, &inputs(&values)).unwrap_err();
        let expected = format!("main.quad[{}].mul[{}]", position / 4, (position % 4) / 2);
        match err {
            WitnessError::AssertionFailed { trace, line, .. } => {
                prop_assert_eq!(trace, expected);
                prop_assert_eq!(line, 7);
            }
            other => prop_assert!(false, "unexpected error {:?}", other),
        }
    }

    #[test]
    fn sibling_ranges_are_disjoint(values in prop::collection::vec(1u64..1000, 8)) {
        let ctx = calculate(&multiplier::circuit::<F>(), ExecConfig::default(), &inputs(&values))
            .unwrap();
        for (id, memory) in ctx.components().iter() {
            prop_assert!(memory.has_run);
            let children: Vec<_> = memory
                .subcomponents
                .iter()
                .map(|child| ctx.component(child.unwrap()).unwrap())
                .collect();
            for child in &children {
                let range = memory.signal_range();
                prop_assert!(range.start <= child.signal_start);
                prop_assert!(child.signal_range().end <= range.end);
                prop_assert_eq!(child.id_father, Some(id));
            }
            for (i, a) in children.iter().enumerate() {
                for b in &children[i + 1..] {
                    let (a, b) = (a.signal_range(), b.signal_range());
                    prop_assert!(a.end <= b.start || b.end <= a.start);
                }
            }
        }
    }
}
