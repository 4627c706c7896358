//! Error types for the ledger model.

use thiserror::Error;
use zkpa_common::Commitment;

use crate::types::Address;

/// Account-creation failures. The first two are operator wiring faults and
/// stay fatal until the configuration is fixed; they are never retried
/// silently.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Proof gating is on and no proof was supplied.
    #[error("account creation is proof-gated and no proof was supplied")]
    ProofRequired,
    /// Proof gating is on but the factory has no verifier wired.
    #[error("proof gating is enabled but no verifier is configured")]
    VerifierNotConfigured,
    /// The supplied proof did not verify against the commitment.
    #[error("ownership proof rejected for commitment {commitment}")]
    ProofInvalid { commitment: Commitment },
}

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Execution was requested on an address with no deployed account.
    #[error("no account deployed at {0}")]
    UnknownAccount(Address),
}
