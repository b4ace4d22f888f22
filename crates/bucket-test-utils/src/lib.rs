//! Shared test utilities for the bucketfs workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`recording`]: adapter decorator that records every call
//! - [`failing`]: adapter whose operations fail on demand
//! - [`store`]: seeded in-memory and on-disk stores

pub mod failing;
pub mod recording;
pub mod store;

pub use failing::FailingAdapter;
pub use recording::{Call, RecordingAdapter};
pub use store::{TestStore, seeded_memory};
