//! Language support.
//!
//! The registry is the single source of truth for the languages clients can
//! pick from. Translation itself does not validate codes against it: a code
//! missing from the registry is still handed to the providers as-is.

mod registry;

pub use registry::{LanguageConfig, LanguageRegistry};
