//! The iden3 binary witness format.
//!
//! ```text
//! "wtns" | version: u32 | n_sections: u32 (= 2)
//! section 1: type u32 = 1 | size u64 | n8 u32 | prime [n8] | len u32
//! section 2: type u32 = 2 | size u64 | len * [n8] values
//! ```
//!
//! All integers are little-endian. Fields here fit in 64 bits, so n8 is 8.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use p3_field::PrimeField64;

use super::canonical;
use crate::error::WitnessError;

const MAGIC: &[u8; 4] = b"wtns";
const VERSION: u32 = 2;
const N_SECTIONS: u32 = 2;
const HEADER_SECTION: u32 = 1;
const WITNESS_SECTION: u32 = 2;
const N8: u32 = 8;
const HEADER_SIZE: u64 = 4 + N8 as u64 + 4;

fn invalid(message: impl Into<String>) -> WitnessError {
    WitnessError::InvalidWitnessFile(message.into())
}

pub fn write<F: PrimeField64, W: Write>(mut writer: W, witness: &[F]) -> Result<(), WitnessError> {
    let len = u32::try_from(witness.len())
        .map_err(|_| invalid(format!("{} values do not fit a u32 length", witness.len())))?;

    writer.write_all(MAGIC)?;
    writer.write_u32::<LittleEndian>(VERSION)?;
    writer.write_u32::<LittleEndian>(N_SECTIONS)?;

    writer.write_u32::<LittleEndian>(HEADER_SECTION)?;
    writer.write_u64::<LittleEndian>(HEADER_SIZE)?;
    writer.write_u32::<LittleEndian>(N8)?;
    writer.write_u64::<LittleEndian>(F::ORDER_U64)?;
    writer.write_u32::<LittleEndian>(len)?;

    writer.write_u32::<LittleEndian>(WITNESS_SECTION)?;
    writer.write_u64::<LittleEndian>(u64::from(len) * u64::from(N8))?;
    for value in witness {
        writer.write_u64::<LittleEndian>(value.as_canonical_u64())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read<F: PrimeField64, R: Read>(mut reader: R) -> Result<Vec<F>, WitnessError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(invalid("bad magic"));
    }
    let version = reader.read_u32::<LittleEndian>()?;
    if version > VERSION {
        return Err(invalid(format!("unsupported version {version}")));
    }
    let sections = reader.read_u32::<LittleEndian>()?;
    if sections != N_SECTIONS {
        return Err(invalid(format!("expected {N_SECTIONS} sections, found {sections}")));
    }

    if reader.read_u32::<LittleEndian>()? != HEADER_SECTION {
        return Err(invalid("first section is not the header"));
    }
    let size = reader.read_u64::<LittleEndian>()?;
    if size != HEADER_SIZE {
        return Err(invalid(format!("header section size {size}")));
    }
    let n8 = reader.read_u32::<LittleEndian>()?;
    if n8 != N8 {
        return Err(invalid(format!("field element size {n8}")));
    }
    let prime = reader.read_u64::<LittleEndian>()?;
    if prime != F::ORDER_U64 {
        return Err(invalid(format!("witness is over prime {prime}")));
    }
    let len = reader.read_u32::<LittleEndian>()?;

    if reader.read_u32::<LittleEndian>()? != WITNESS_SECTION {
        return Err(invalid("second section is not the witness"));
    }
    let size = reader.read_u64::<LittleEndian>()?;
    if size != u64::from(len) * u64::from(N8) {
        return Err(invalid(format!("witness section size {size} for {len} values")));
    }

    (0..len)
        .map(|_| canonical(reader.read_u64::<LittleEndian>()?))
        .collect()
}

pub fn to_bytes<F: PrimeField64>(witness: &[F]) -> Result<Vec<u8>, WitnessError> {
    let mut bytes = Vec::with_capacity(52 + witness.len() * 8);
    write(&mut bytes, witness)?;
    Ok(bytes)
}

pub fn from_bytes<F: PrimeField64>(bytes: &[u8]) -> Result<Vec<F>, WitnessError> {
    read(bytes)
}

pub fn write_file<F: PrimeField64>(path: impl AsRef<Path>, witness: &[F]) -> Result<(), WitnessError> {
    write(BufWriter::new(File::create(path)?), witness)
}

pub fn read_file<F: PrimeField64>(path: impl AsRef<Path>) -> Result<Vec<F>, WitnessError> {
    read(BufReader::new(File::open(path)?))
}

#[cfg(test)]
mod tests {
    use p3_field::PrimeCharacteristicRing;
    use p3_goldilocks::Goldilocks;

    use super::*;

    fn witness() -> Vec<Goldilocks> {
        vec![Goldilocks::ONE, Goldilocks::from_u64(3), Goldilocks::NEG_ONE]
    }

    #[test]
    fn test_layout() {
        let bytes = to_bytes(&witness()).unwrap();
        assert_eq!(&bytes[..4], b"wtns");
        assert_eq!(bytes[4..8], 2u32.to_le_bytes());
        assert_eq!(bytes[8..12], 2u32.to_le_bytes());
        // header section: type, size 16, n8 8, prime, len 3
        assert_eq!(bytes[12..16], 1u32.to_le_bytes());
        assert_eq!(bytes[16..24], 16u64.to_le_bytes());
        assert_eq!(bytes[24..28], 8u32.to_le_bytes());
        assert_eq!(bytes[28..36], Goldilocks::ORDER_U64.to_le_bytes());
        assert_eq!(bytes[36..40], 3u32.to_le_bytes());
        assert_eq!(bytes[40..44], 2u32.to_le_bytes());
        assert_eq!(bytes[44..52], 24u64.to_le_bytes());
        assert_eq!(bytes.len(), 52 + 24);
        assert_eq!(bytes[60..68], 3u64.to_le_bytes());

        assert_eq!(from_bytes::<Goldilocks>(&bytes).unwrap(), witness());
    }

    #[test]
    fn test_rejects_malformed() {
        let good = to_bytes(&witness()).unwrap();

        let mut bad = good.clone();
        bad[0] = b'x';
        assert!(matches!(
            from_bytes::<Goldilocks>(&bad),
            Err(WitnessError::InvalidWitnessFile(_))
        ));

        let mut bad = good.clone();
        bad[4..8].copy_from_slice(&3u32.to_le_bytes());
        assert!(from_bytes::<Goldilocks>(&bad).is_err());

        let mut bad = good.clone();
        bad[28..36].copy_from_slice(&7u64.to_le_bytes());
        assert!(from_bytes::<Goldilocks>(&bad).is_err());

        let mut bad = good.clone();
        bad[68..76].copy_from_slice(&Goldilocks::ORDER_U64.to_le_bytes());
        assert!(matches!(
            from_bytes::<Goldilocks>(&bad),
            Err(WitnessError::InvalidFieldValue(_))
        ));

        assert!(matches!(
            from_bytes::<Goldilocks>(&good[..good.len() - 1]),
            Err(WitnessError::Io(_))
        ));
    }

    #[test]
    fn test_reads_version_one() {
        let mut bytes = to_bytes(&witness()).unwrap();
        bytes[4..8].copy_from_slice(&1u32.to_le_bytes());
        assert_eq!(from_bytes::<Goldilocks>(&bytes).unwrap(), witness());
    }
}
