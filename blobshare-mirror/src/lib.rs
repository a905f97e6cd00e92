//! Reconciliation engine that mirrors an object container into a file share.
//!
//! A run has two strictly ordered passes:
//! - Push: every object is fetched and written to the share at the same
//!   path, creating intermediate directories first
//! - Prune: the share tree is walked depth-first and every file whose path
//!   was not seen during the push pass is deleted
//!
//! Transports are supplied through the [`ObjectSource`] and [`ShareTarget`]
//! traits; the engine itself performs no I/O.

pub mod engine;
pub mod error;
pub mod path;
pub mod source;
pub mod target;
pub mod types;

pub use engine::{EngineOptions, MirrorEngine, PushOutcome};
pub use error::{BoxError, MirrorError, MirrorResult};
pub use source::ObjectSource;
pub use target::{DirectoryCreation, ListingPage, ProgressFn, ShareTarget, UploadOptions};
pub use types::*;
