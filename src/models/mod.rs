pub mod signature;

pub use signature::{DisplayRecord, PersistedEntry, SignatureData, StoreEntry};
