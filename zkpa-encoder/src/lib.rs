//! Deterministic encoding of a license-plate identifier into bounded BN254
//! scalars.
//!
//! The four plate fields map onto a fixed 8-slot layout:
//!
//! ```text
//! slot 0  region      UTF-8 bytes, big-endian integer
//! slot 1  class code  ASCII digits, fixed width 4
//! slot 2  syllable    UTF-8 bytes, big-endian integer
//! slot 3  serial      ASCII digits, fixed width 8
//! slot 4  length tag  packed byte-lengths of the four fields
//! slot 5  version     encoding format version
//! slot 6  reserved    0
//! slot 7  reserved    0
//! ```
//!
//! The length tag keeps the mapping lossless: zero-padding a numeric field
//! can never alias two distinct identifiers. Every slot value is strictly
//! below the scalar field modulus.
//!
//! Plate text and encoded elements are private inputs. Neither type
//! implements `Serialize`, their `Debug` output is redacted, and buffers
//! are wiped when dropped.

use std::fmt;

use halo2curves_axiom::{
    bn256::Fr,
    ff::Field,
};
use rand::rngs::OsRng;
use thiserror::Error;
use zeroize::Zeroize;

/// Number of encoded slots, matching the circuit's preimage width.
pub const PLATE_ELEMENT_COUNT: usize = 8;

/// Current slot-layout version, stored in slot 5.
pub const ENCODING_VERSION: u64 = 1;

/// Maximum UTF-8 byte length accepted for a text field.
pub const MAX_FIELD_BYTES: usize = 64;

const CLASS_CODE_WIDTH: usize = 4;
const SERIAL_WIDTH: usize = 8;

const SLOT_REGION: usize = 0;
const SLOT_CLASS_CODE: usize = 1;
const SLOT_SYLLABLE: usize = 2;
const SLOT_SERIAL: usize = 3;
const SLOT_LENGTH_TAG: usize = 4;
const SLOT_VERSION: usize = 5;

/// BN254 scalar field modulus, big-endian.
const FR_MODULUS_BE: [u8; 32] = [
    0x30, 0x64, 0x4e, 0x72, 0xe1, 0x31, 0xa0, 0x29, 0xb8, 0x50, 0x45, 0xb6, 0x81, 0x81, 0x58,
    0x5d, 0x28, 0x33, 0xe8, 0x48, 0x79, 0xb9, 0x70, 0x91, 0x43, 0xe1, 0xf5, 0x93, 0xf0, 0x00,
    0x00, 0x01,
];

/// A structured plate identifier as supplied by the recognition service.
///
/// Exactly four fields; any other shape is rejected by [`encode`]. Lives
/// only in caller memory and is wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct PlateIdentifier {
    pub region: String,
    pub class_code: String,
    pub syllable: String,
    pub serial: String,
}

impl fmt::Debug for PlateIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlateIdentifier(<redacted>)")
    }
}

impl Drop for PlateIdentifier {
    fn drop(&mut self) {
        self.region.zeroize();
        self.class_code.zeroize();
        self.syllable.zeroize();
        self.serial.zeroize();
    }
}

/// The 8 bounded elements plus blinding salt. Wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedPlate {
    pub elements: [Fr; PLATE_ELEMENT_COUNT],
    pub salt: Fr,
}

impl fmt::Debug for EncodedPlate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncodedPlate(<redacted>)")
    }
}

impl Drop for EncodedPlate {
    fn drop(&mut self) {
        self.elements = [Fr::ZERO; PLATE_ELEMENT_COUNT];
        self.salt = Fr::ZERO;
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Empty or malformed field. The message names the field, never its
    /// contents.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(&'static str),
    /// A slot's integer value would reach the scalar field modulus.
    #[error("slot {slot} value exceeds the scalar field modulus")]
    OutOfRange { slot: usize },
}

/// Encode a plate identifier under the given salt, or a fresh random salt.
///
/// Pure and deterministic for identical `(identifier, salt)`.
pub fn encode(
    identifier: &PlateIdentifier,
    salt: Option<Fr>,
) -> Result<EncodedPlate, EncodeError> {
    let mut elements = [Fr::ZERO; PLATE_ELEMENT_COUNT];

    elements[SLOT_REGION] = text_slot(&identifier.region, "region", SLOT_REGION)?;
    elements[SLOT_CLASS_CODE] = numeric_slot(
        &identifier.class_code,
        "class code",
        CLASS_CODE_WIDTH,
    )?;
    elements[SLOT_SYLLABLE] = text_slot(&identifier.syllable, "syllable", SLOT_SYLLABLE)?;
    elements[SLOT_SERIAL] = numeric_slot(&identifier.serial, "serial", SERIAL_WIDTH)?;
    elements[SLOT_LENGTH_TAG] = Fr::from(length_tag(identifier));
    elements[SLOT_VERSION] = Fr::from(ENCODING_VERSION);

    let salt = salt.unwrap_or_else(|| Fr::random(OsRng));

    Ok(EncodedPlate { elements, salt })
}

fn text_slot(value: &str, field: &'static str, slot: usize) -> Result<Fr, EncodeError> {
    let bytes = value.as_bytes();
    if bytes.is_empty() {
        return Err(EncodeError::InvalidIdentifier(field));
    }
    if bytes.len() > MAX_FIELD_BYTES {
        return Err(EncodeError::InvalidIdentifier(field));
    }
    if !fits_in_field(bytes) {
        return Err(EncodeError::OutOfRange { slot });
    }
    Ok(fold_be_bytes(bytes))
}

fn numeric_slot(value: &str, field: &'static str, width: usize) -> Result<Fr, EncodeError> {
    if value.is_empty() || value.len() > width {
        return Err(EncodeError::InvalidIdentifier(field));
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EncodeError::InvalidIdentifier(field));
    }
    // Zero-padding to `width` does not change the numeric value; the length
    // tag preserves the original width.
    let parsed: u64 = value
        .parse()
        .map_err(|_| EncodeError::InvalidIdentifier(field))?;
    Ok(Fr::from(parsed))
}

fn length_tag(identifier: &PlateIdentifier) -> u64 {
    let lengths = [
        identifier.region.len() as u64,
        identifier.class_code.len() as u64,
        identifier.syllable.len() as u64,
        identifier.serial.len() as u64,
    ];
    lengths
        .iter()
        .enumerate()
        .fold(0u64, |tag, (idx, len)| tag | (len << (8 * idx)))
}

/// Whether the big-endian integer value of `bytes` is strictly below the
/// scalar field modulus.
fn fits_in_field(bytes: &[u8]) -> bool {
    let significant: &[u8] = match bytes.iter().position(|b| *b != 0) {
        Some(first) => &bytes[first..],
        None => return true,
    };
    match significant.len().cmp(&FR_MODULUS_BE.len()) {
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Equal => significant < &FR_MODULUS_BE[..],
    }
}

fn fold_be_bytes(bytes: &[u8]) -> Fr {
    let mut acc = Fr::ZERO;
    let base = Fr::from(256);
    for byte in bytes.iter() {
        acc = acc * base + Fr::from(*byte as u64);
    }
    acc
}
