//! Optimistic status update
//!
//! The new status is projected onto the local listing before the
//! transaction is sent. If the transaction fails the caller replaces the
//! projection with a fresh read, or restores the snapshot when even the
//! read fails.

use prescriptions_integrity::{Prescription, PrescriptionStatus};
use rx_reminder_shared::RxError;

#[derive(Clone, Debug, PartialEq)]
pub struct StatusUpdate {
    pub id: u64,
    pub status: PrescriptionStatus,
    snapshot: Option<Vec<Prescription>>,
}

impl StatusUpdate {
    pub fn new(id: u64, status: PrescriptionStatus) -> Self {
        Self {
            id,
            status,
            snapshot: None,
        }
    }

    /// Apply the status locally, keeping what was there before
    pub fn project(&mut self, listing: &mut [Prescription]) -> Result<(), RxError> {
        let position = listing
            .iter()
            .position(|p| p.id == self.id)
            .ok_or(RxError::PrescriptionNotFound(self.id))?;
        self.snapshot = Some(listing.to_vec());
        listing[position].status = self.status;
        Ok(())
    }

    /// Undo the projection
    pub fn restore(self, listing: &mut Vec<Prescription>) {
        if let Some(snapshot) = self.snapshot {
            *listing = snapshot;
        }
    }

    pub fn is_projected(&self) -> bool {
        self.snapshot.is_some()
    }
}
