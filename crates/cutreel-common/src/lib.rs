//! Cutreel-Common: shared types for the cutreel workspace.
//!
//! This crate provides the pieces every other cutreel crate needs:
//!
//! - **Typed IDs**: resource identifiers and the `(id, language, index)`
//!   key that names one stored movie blob
//! - **Languages**: the fixed set of localizations a movie can carry
//! - **Codepage**: the single-byte text codec used by subtitle payloads

pub mod codepage;
pub mod ids;

pub use codepage::Codepage;
pub use ids::{Language, ResourceId, ResourceKey};
