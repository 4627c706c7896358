//! Core ledger value types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 20-byte ledger address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address([u8; 20]);

impl Address {
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub const ZERO: Address = Address([0u8; 20]);

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

/// A 32-byte deterministic-deployment salt.
///
/// Distinct salts derive independent accounts for the same commitment.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeploymentSalt([u8; 32]);

impl DeploymentSalt {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<u64> for DeploymentSalt {
    fn from(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl fmt::Display for DeploymentSalt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for DeploymentSalt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeploymentSalt({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_displays_as_hex() {
        let mut bytes = [0u8; 20];
        bytes[19] = 0xab;
        let address = Address::new(bytes);
        assert_eq!(
            address.to_string(),
            "0x00000000000000000000000000000000000000ab"
        );
    }

    #[test]
    fn salt_from_u64_is_right_aligned() {
        let salt = DeploymentSalt::from(0x1234u64);
        assert_eq!(salt.as_bytes()[30], 0x12);
        assert_eq!(salt.as_bytes()[31], 0x34);
        assert!(salt.as_bytes()[..24].iter().all(|b| *b == 0));
    }

    #[test]
    fn distinct_u64_salts_differ() {
        assert_ne!(DeploymentSalt::from(1u64), DeploymentSalt::from(2u64));
    }
}
