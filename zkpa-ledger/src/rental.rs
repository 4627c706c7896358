//! Rental plate validity registry.
//!
//! Transient plates carry a 12-hour trust window. Each successful
//! ownership proof resets the window to `now + 12h`. The reset is
//! absolute, never additive, so closely spaced reverifications cannot
//! stack validity. Expiry is evaluated lazily at read time; there is no
//! background timer, and records are never deleted: a lapsed plate revives
//! on its next successful proof.

use std::{
    collections::HashMap,
    sync::Mutex,
};

use serde::{Deserialize, Serialize};
use zkpa_common::Commitment;

use crate::events::{LedgerEvent, RentalExtendedEvent, RentalRegisteredEvent};

/// Trust window granted by one successful ownership proof.
pub const RENTAL_VALIDITY_SECS: u64 = 12 * 60 * 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalRecord {
    pub commitment: [u8; 32],
    pub expires_at_unix: u64,
}

/// Read-time view of a rental commitment's trust state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RentalStatus {
    Unregistered,
    Valid { expires_at_unix: u64 },
    Expired { expired_at_unix: u64 },
}

#[derive(Default)]
struct RentalState {
    records: HashMap<[u8; 32], RentalRecord>,
    journal: Vec<LedgerEvent>,
}

#[derive(Default)]
pub struct RentalRegistry {
    state: Mutex<RentalState>,
}

impl RentalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful ownership proof for a transient plate.
    ///
    /// First proof registers the record; every later proof extends it.
    /// Both set `expiry = now + RENTAL_VALIDITY_SECS`. The caller is
    /// responsible for verifying the proof before calling this.
    pub fn record_proof(&self, commitment: Commitment, now_unix: u64) -> RentalRecord {
        let key = commitment.to_bytes();
        let expires_at_unix = now_unix + RENTAL_VALIDITY_SECS;
        let record = RentalRecord {
            commitment: key,
            expires_at_unix,
        };

        let mut state = self.state.lock().expect("rental state lock");
        let known = state.records.contains_key(&key);
        state.records.insert(key, record);
        let event = if known {
            LedgerEvent::RentalExtended(RentalExtendedEvent {
                commitment: key,
                expires_at_unix,
            })
        } else {
            LedgerEvent::RentalRegistered(RentalRegisteredEvent {
                commitment: key,
                expires_at_unix,
            })
        };
        state.journal.push(event);
        tracing::info!(%commitment, expires_at_unix, extended = known, "rental validity set");
        record
    }

    /// Whether the commitment is currently trusted. Lazy: no state changes
    /// on read.
    pub fn is_valid(&self, commitment: Commitment, now_unix: u64) -> bool {
        matches!(
            self.status(commitment, now_unix),
            RentalStatus::Valid { .. }
        )
    }

    pub fn status(&self, commitment: Commitment, now_unix: u64) -> RentalStatus {
        let state = self.state.lock().expect("rental state lock");
        match state.records.get(&commitment.to_bytes()) {
            None => RentalStatus::Unregistered,
            Some(record) if now_unix <= record.expires_at_unix => RentalStatus::Valid {
                expires_at_unix: record.expires_at_unix,
            },
            Some(record) => RentalStatus::Expired {
                expired_at_unix: record.expires_at_unix,
            },
        }
    }

    pub fn journal(&self) -> Vec<LedgerEvent> {
        self.state.lock().expect("rental state lock").journal.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo2curves_axiom::bn256::Fr;

    const T0: u64 = 1_700_000_000;
    const HOUR: u64 = 60 * 60;

    fn commitment() -> Commitment {
        Commitment::from_fr(Fr::from(42u64))
    }

    #[test]
    fn unregistered_commitment_is_not_valid() {
        let registry = RentalRegistry::new();
        assert!(!registry.is_valid(commitment(), T0));
        assert_eq!(registry.status(commitment(), T0), RentalStatus::Unregistered);
    }

    #[test]
    fn registration_grants_twelve_hours() {
        let registry = RentalRegistry::new();
        let record = registry.record_proof(commitment(), T0);
        assert_eq!(record.expires_at_unix, T0 + 12 * HOUR);

        assert!(registry.is_valid(commitment(), T0));
        assert!(registry.is_valid(commitment(), T0 + 12 * HOUR));
        assert!(!registry.is_valid(commitment(), T0 + 12 * HOUR + 1));
    }

    #[test]
    fn reverification_resets_absolutely() {
        let registry = RentalRegistry::new();
        registry.record_proof(commitment(), T0);
        // Reverify at t0+6h: validity runs to t0+18h, not t0+24h.
        let record = registry.record_proof(commitment(), T0 + 6 * HOUR);
        assert_eq!(record.expires_at_unix, T0 + 18 * HOUR);

        assert!(registry.is_valid(commitment(), T0 + 17 * HOUR));
        assert!(!registry.is_valid(commitment(), T0 + 19 * HOUR));
    }

    #[test]
    fn lapsed_record_reads_expired_and_revives() {
        let registry = RentalRegistry::new();
        registry.record_proof(commitment(), T0);

        let lapsed_at = T0 + 13 * HOUR;
        assert_eq!(
            registry.status(commitment(), lapsed_at),
            RentalStatus::Expired {
                expired_at_unix: T0 + 12 * HOUR
            }
        );

        // A fresh proof revives the same record.
        registry.record_proof(commitment(), lapsed_at);
        assert!(registry.is_valid(commitment(), lapsed_at + HOUR));
    }

    #[test]
    fn journal_distinguishes_registration_from_extension() {
        let registry = RentalRegistry::new();
        registry.record_proof(commitment(), T0);
        registry.record_proof(commitment(), T0 + HOUR);

        let journal = registry.journal();
        assert_eq!(journal.len(), 2);
        assert!(matches!(journal[0], LedgerEvent::RentalRegistered(_)));
        assert!(matches!(journal[1], LedgerEvent::RentalExtended(_)));
    }

    #[test]
    fn records_are_never_deleted() {
        let registry = RentalRegistry::new();
        registry.record_proof(commitment(), T0);
        // Far past expiry the record still exists, just expired.
        assert!(matches!(
            registry.status(commitment(), T0 + 1_000 * HOUR),
            RentalStatus::Expired { .. }
        ));
    }
}
