//! Counterfactual address derivation.
//!
//! `address = last20(keccak256(0xff ++ deployer ++ salt ++ keccak256(init_code)))`
//!
//! The address is computable before the account exists, and the factory
//! deploys to exactly this address, so a caller can receive funds at an
//! account that has not been created yet.

use sha3::{Digest, Keccak256};
use zkpa_common::Commitment;

use crate::types::{Address, DeploymentSalt};

const DEPLOY_PREFIX: u8 = 0xff;
const INIT_CODE_TAG: &[u8] = b"zkpa-account-v1";

/// Hash of the account init code for a given commitment.
///
/// The commitment is baked into the init code, so accounts for different
/// commitments can never collide at one address.
pub fn init_code_hash(commitment: Commitment) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(INIT_CODE_TAG);
    hasher.update(commitment.to_bytes());
    hasher.finalize().into()
}

/// Predict the account address for `(deployer, commitment, salt)`.
pub fn predict_address(
    deployer: Address,
    commitment: Commitment,
    salt: DeploymentSalt,
) -> Address {
    let mut hasher = Keccak256::new();
    hasher.update([DEPLOY_PREFIX]);
    hasher.update(deployer.as_bytes());
    hasher.update(salt.as_bytes());
    hasher.update(init_code_hash(commitment));
    let digest = hasher.finalize();

    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[12..]);
    Address::new(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo2curves_axiom::bn256::Fr;

    fn commitment(seed: u64) -> Commitment {
        Commitment::from_fr(Fr::from(seed))
    }

    fn deployer() -> Address {
        Address::new([0x11; 20])
    }

    #[test]
    fn prediction_is_deterministic() {
        let salt = DeploymentSalt::from(12345u64);
        let a = predict_address(deployer(), commitment(7), salt);
        let b = predict_address(deployer(), commitment(7), salt);
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_salts_derive_independent_addresses() {
        let a = predict_address(deployer(), commitment(7), DeploymentSalt::from(1u64));
        let b = predict_address(deployer(), commitment(7), DeploymentSalt::from(2u64));
        assert_ne!(a, b);
    }

    #[test]
    fn distinct_commitments_derive_independent_addresses() {
        let salt = DeploymentSalt::from(1u64);
        let a = predict_address(deployer(), commitment(7), salt);
        let b = predict_address(deployer(), commitment(8), salt);
        assert_ne!(a, b);
    }

    #[test]
    fn distinct_deployers_derive_independent_addresses() {
        let salt = DeploymentSalt::from(1u64);
        let a = predict_address(Address::new([0x11; 20]), commitment(7), salt);
        let b = predict_address(Address::new([0x22; 20]), commitment(7), salt);
        assert_ne!(a, b);
    }
}
