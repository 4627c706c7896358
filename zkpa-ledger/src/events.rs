//! Append-only ledger event journal.
//!
//! Every state transition records exactly one event, so tests can assert
//! deploy-once semantics by counting.

use serde::{Deserialize, Serialize};

use crate::types::{Address, DeploymentSalt};

/// Emitted once per account, at deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDeployedEvent {
    pub address: Address,
    pub owner: Address,
    /// Canonical commitment bytes, the only plate-derived value persisted.
    pub commitment: [u8; 32],
    pub deployment_salt: DeploymentSalt,
}

/// Emitted when a deployed account requests an outbound call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequestedEvent {
    pub account: Address,
    pub destination: Address,
    pub value: u128,
    pub payload: Vec<u8>,
}

/// Emitted on a transient plate's first successful ownership proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalRegisteredEvent {
    pub commitment: [u8; 32],
    pub expires_at_unix: u64,
}

/// Emitted on each subsequent successful reverification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalExtendedEvent {
    pub commitment: [u8; 32],
    pub expires_at_unix: u64,
}

/// Union of all ledger events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    AccountDeployed(AccountDeployedEvent),
    ExecutionRequested(ExecutionRequestedEvent),
    RentalRegistered(RentalRegisteredEvent),
    RentalExtended(RentalExtendedEvent),
}
