//! Deploy-once account factory.
//!
//! Per derived address the state machine is `Undeployed → Deployed`,
//! monotonic and terminal. Creation is optionally gated on a successful
//! ownership-proof verification; the gate and the verifier are explicit
//! per-instance configuration, never ambient state.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use zkpa_common::{Commitment, ProofBundle, VerifierArtifacts};

use crate::{
    address::predict_address,
    error::{FactoryError, LedgerError},
    events::{AccountDeployedEvent, ExecutionRequestedEvent, LedgerEvent},
    types::{Address, DeploymentSalt},
};

/// Explicit factory wiring, injected per instance.
#[derive(Clone)]
pub struct FactoryConfig {
    /// Address the factory deploys from; part of every derived address.
    pub deployer: Address,
    /// Whether account creation demands a valid ownership proof.
    pub require_proof: bool,
    /// Verifier artifacts; required whenever `require_proof` is set.
    pub verifier: Option<Arc<VerifierArtifacts>>,
}

impl FactoryConfig {
    /// Gating off: accounts deploy without proof checks.
    pub fn ungated(deployer: Address) -> Self {
        Self {
            deployer,
            require_proof: false,
            verifier: None,
        }
    }

    /// Gating on, with the verifier wired.
    pub fn gated(deployer: Address, verifier: Arc<VerifierArtifacts>) -> Self {
        Self {
            deployer,
            require_proof: true,
            verifier: Some(verifier),
        }
    }
}

/// A deployed account. Persists the owner and the commitment, never the
/// raw identifier or salt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub address: Address,
    pub owner: Address,
    pub commitment: Commitment,
}

impl Account {
    /// Request an outbound call from this account on the given ledger.
    pub fn execute(
        &self,
        factory: &AccountFactory,
        destination: Address,
        value: u128,
        payload: Vec<u8>,
    ) -> Result<ExecutionRequestedEvent, LedgerError> {
        factory.execute(self, destination, value, payload)
    }
}

#[derive(Default)]
struct FactoryState {
    accounts: HashMap<Address, Account>,
    journal: Vec<LedgerEvent>,
}

pub struct AccountFactory {
    config: FactoryConfig,
    state: Mutex<FactoryState>,
}

impl AccountFactory {
    pub fn new(config: FactoryConfig) -> Self {
        Self {
            config,
            state: Mutex::new(FactoryState::default()),
        }
    }

    pub fn deployer(&self) -> Address {
        self.config.deployer
    }

    /// Predict the address this factory would deploy to.
    pub fn predict_address(&self, commitment: Commitment, salt: DeploymentSalt) -> Address {
        predict_address(self.config.deployer, commitment, salt)
    }

    /// Create the account for `(commitment, salt)` or return the existing
    /// one. Idempotent: a second call with the same key takes the
    /// already-deployed path, including one racing after a concurrent
    /// deploy.
    pub fn create_or_get(
        &self,
        owner: Address,
        commitment: Commitment,
        salt: DeploymentSalt,
        proof: Option<&ProofBundle>,
    ) -> Result<Account, FactoryError> {
        let address = predict_address(self.config.deployer, commitment, salt);

        if let Some(existing) = self.account(address) {
            return Ok(existing);
        }

        // Exhaustive on the gating flag; both arms are total.
        match self.config.require_proof {
            true => {
                let bundle = proof.ok_or(FactoryError::ProofRequired)?;
                let verifier = self
                    .config
                    .verifier
                    .as_deref()
                    .ok_or(FactoryError::VerifierNotConfigured)?;
                // The expected commitment rebuilds the instance vector; a
                // bundle claiming different public inputs cannot pass.
                if !zkpa_verifier::verify_commitment(verifier, &bundle.proof, commitment) {
                    return Err(FactoryError::ProofInvalid { commitment });
                }
            }
            false => {}
        }

        let mut state = self.state.lock().expect("factory state lock");
        // A concurrent deploy may have won while the proof was checked.
        if let Some(existing) = state.accounts.get(&address) {
            return Ok(existing.clone());
        }

        let account = Account {
            address,
            owner,
            commitment,
        };
        state.accounts.insert(address, account.clone());
        state
            .journal
            .push(LedgerEvent::AccountDeployed(AccountDeployedEvent {
                address,
                owner,
                commitment: commitment.to_bytes(),
                deployment_salt: salt,
            }));
        tracing::info!(%address, %commitment, "account deployed");
        Ok(account)
    }

    pub fn account(&self, address: Address) -> Option<Account> {
        self.state
            .lock()
            .expect("factory state lock")
            .accounts
            .get(&address)
            .cloned()
    }

    /// Record an outbound call from a deployed account.
    pub fn execute(
        &self,
        account: &Account,
        destination: Address,
        value: u128,
        payload: Vec<u8>,
    ) -> Result<ExecutionRequestedEvent, LedgerError> {
        let mut state = self.state.lock().expect("factory state lock");
        if !state.accounts.contains_key(&account.address) {
            return Err(LedgerError::UnknownAccount(account.address));
        }
        let event = ExecutionRequestedEvent {
            account: account.address,
            destination,
            value,
            payload,
        };
        state
            .journal
            .push(LedgerEvent::ExecutionRequested(event.clone()));
        Ok(event)
    }

    /// Snapshot of the append-only event journal.
    pub fn journal(&self) -> Vec<LedgerEvent> {
        self.state.lock().expect("factory state lock").journal.clone()
    }

    /// Number of deployment events fired so far.
    pub fn deployment_count(&self) -> usize {
        self.state
            .lock()
            .expect("factory state lock")
            .journal
            .iter()
            .filter(|event| matches!(event, LedgerEvent::AccountDeployed(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo2curves_axiom::bn256::Fr;

    fn commitment(seed: u64) -> Commitment {
        Commitment::from_fr(Fr::from(seed))
    }

    fn owner() -> Address {
        Address::new([0x22; 20])
    }

    fn ungated_factory() -> AccountFactory {
        AccountFactory::new(FactoryConfig::ungated(Address::new([0x11; 20])))
    }

    #[test]
    fn create_or_get_is_idempotent() {
        let factory = ungated_factory();
        let salt = DeploymentSalt::from(12345u64);

        let first = factory
            .create_or_get(owner(), commitment(1), salt, None)
            .unwrap();
        let second = factory
            .create_or_get(owner(), commitment(1), salt, None)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(factory.deployment_count(), 1);
    }

    #[test]
    fn deployed_address_matches_prediction() {
        let factory = ungated_factory();
        let salt = DeploymentSalt::from(7u64);
        let predicted = factory.predict_address(commitment(9), salt);
        let account = factory
            .create_or_get(owner(), commitment(9), salt, None)
            .unwrap();
        assert_eq!(account.address, predicted);
    }

    #[test]
    fn account_persists_owner_and_commitment_only() {
        let factory = ungated_factory();
        let account = factory
            .create_or_get(owner(), commitment(3), DeploymentSalt::from(1u64), None)
            .unwrap();
        assert_eq!(account.owner, owner());
        assert_eq!(account.commitment, commitment(3));
    }

    #[test]
    fn distinct_salts_deploy_distinct_accounts() {
        let factory = ungated_factory();
        let a = factory
            .create_or_get(owner(), commitment(5), DeploymentSalt::from(1u64), None)
            .unwrap();
        let b = factory
            .create_or_get(owner(), commitment(5), DeploymentSalt::from(2u64), None)
            .unwrap();
        assert_ne!(a.address, b.address);
        assert_eq!(factory.deployment_count(), 2);
    }

    #[test]
    fn gated_factory_without_proof_fails() {
        let factory = AccountFactory::new(FactoryConfig {
            deployer: Address::new([0x11; 20]),
            require_proof: true,
            verifier: None,
        });
        let err = factory
            .create_or_get(owner(), commitment(1), DeploymentSalt::from(1u64), None)
            .unwrap_err();
        assert!(matches!(err, FactoryError::ProofRequired));
    }

    #[test]
    fn gated_factory_without_verifier_fails() {
        let factory = AccountFactory::new(FactoryConfig {
            deployer: Address::new([0x11; 20]),
            require_proof: true,
            verifier: None,
        });
        let bundle = ProofBundle::new(
            vec![0u8; 32],
            zkpa_common::VerifierPublicInputs::from_commitment(commitment(1)),
        );
        let err = factory
            .create_or_get(
                owner(),
                commitment(1),
                DeploymentSalt::from(1u64),
                Some(&bundle),
            )
            .unwrap_err();
        assert!(matches!(err, FactoryError::VerifierNotConfigured));
    }

    #[test]
    fn execute_records_one_event_per_call() {
        let factory = ungated_factory();
        let account = factory
            .create_or_get(owner(), commitment(2), DeploymentSalt::from(1u64), None)
            .unwrap();
        let destination = Address::new([0x33; 20]);
        factory
            .execute(&account, destination, 1_000, vec![0x01])
            .unwrap();

        let executions: Vec<_> = factory
            .journal()
            .into_iter()
            .filter(|event| matches!(event, LedgerEvent::ExecutionRequested(_)))
            .collect();
        assert_eq!(executions.len(), 1);
    }

    #[test]
    fn execute_on_unknown_account_fails() {
        let factory = ungated_factory();
        let ghost = Account {
            address: Address::new([0x99; 20]),
            owner: owner(),
            commitment: commitment(1),
        };
        let err = factory
            .execute(&ghost, Address::ZERO, 0, vec![])
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnknownAccount(_)));
    }
}
