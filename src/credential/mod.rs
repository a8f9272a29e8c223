//! Credential module: vault entries and enumerations.
//!
//! This module provides:
//! - `Credential`, one vault entry with Save/Load/Delete/Exists (`credential`)
//! - `CredentialSet`, the credentials returned by one enumeration (`set`)

#[allow(clippy::module_inception)]
pub mod credential;
pub mod set;

pub use credential::{Credential, MAX_SECRET_BYTES};
pub use set::CredentialSet;
