// All service modules
pub mod approval;
pub mod bank_resolver;
pub mod estimator;
pub mod history;
pub mod orchestrator;
pub mod poller;
pub mod session;
pub mod submission;

#[cfg(test)]
pub mod testutil;

// Re-export for convenience
pub use approval::ApprovalStep;
pub use bank_resolver::{BankDestinationResolver, BankGate};
pub use estimator::RateEstimator;
pub use history::{LastKnownOrder, OrderHistoryService};
pub use orchestrator::{Confirmation, SwapOrchestrator, SwapOutcome};
pub use poller::{PollerHandle, SettlementPoller};
pub use session::SessionManager;
pub use submission::SwapSubmitter;

use std::sync::{Arc, Mutex};

use crate::storage::LocalStore;

/// Session-local device store, shared across services. Access stays
/// single-threaded per session; the mutex only satisfies `Send` bounds.
pub type SharedStore = Arc<Mutex<LocalStore>>;

pub fn shared_store(store: LocalStore) -> SharedStore {
    Arc::new(Mutex::new(store))
}
