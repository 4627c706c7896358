//! Deterministic ledger model for plate-derived accounts.
//!
//! Three cooperating pieces: counterfactual address derivation, the
//! deploy-once account factory (optionally proof-gated), and the rental
//! validity registry for transient plates. State transitions are
//! monotonic: accounts deploy at most once, rental records only extend.

pub mod address;
pub mod error;
pub mod events;
pub mod factory;
pub mod rental;
pub mod types;

pub use address::{init_code_hash, predict_address};
pub use error::{FactoryError, LedgerError};
pub use events::{
    AccountDeployedEvent, ExecutionRequestedEvent, LedgerEvent, RentalExtendedEvent,
    RentalRegisteredEvent,
};
pub use factory::{Account, AccountFactory, FactoryConfig};
pub use rental::{RentalRecord, RentalRegistry, RentalStatus, RENTAL_VALIDITY_SECS};
pub use types::{Address, DeploymentSalt};

use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock seconds since the Unix epoch, for callers without their own
/// clock. Tests pass explicit timestamps instead.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
