//! Chroma demo
//!
//! Walks through the client end to end against a running server:
//!
//! ```text
//! connect (provisions tenant + database)
//!   ↓
//! delete all collections
//!   ↓
//! create collection with an embedding provider
//!   ↓
//! add documents (embedded by the provider)
//!   ↓
//! query by text → documents + distances
//! ```
//!
//! ## Modules
//!
//! - `provider`: picks an embedding provider from the environment
//! - `walkthrough`: the demo itself

pub mod provider;
pub mod walkthrough;

pub use walkthrough::run;
