use p3_field::PrimeField64;
use sha2::{Digest, Sha256};

pub fn hash(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Length, then every value as canonical little-endian `u64`.
fn witness_bytes<F: PrimeField64>(witness: &[F]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(8 * (witness.len() + 1));
    bytes.extend_from_slice(&(witness.len() as u64).to_le_bytes());
    for value in witness {
        bytes.extend_from_slice(&value.as_canonical_u64().to_le_bytes());
    }
    bytes
}

/// SHA-256 of the witness.
///
/// Two runs of the same circuit on the same inputs produce the same digest,
/// whatever the thread schedule.
pub fn witness_digest<F: PrimeField64>(witness: &[F]) -> [u8; 32] {
    hash(&witness_bytes(witness))
}

pub fn witness_digest_hex<F: PrimeField64>(witness: &[F]) -> String {
    hex::encode(witness_digest(witness))
}

pub fn verify<F: PrimeField64>(witness: &[F], expected: &[u8; 32]) -> bool {
    witness_digest(witness) == *expected
}
