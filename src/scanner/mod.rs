pub mod annotations;
pub mod known_store;
pub mod parser;
pub mod reconcile;
pub mod session;
pub mod view;

pub use known_store::{KnownSignatureStore, KnownSignatures};
pub use reconcile::{reconcile, ReconcileMode, Reconciliation};
pub use session::ScannerSession;
pub use view::{project, SortConfig, SortDirection, SortKey};
