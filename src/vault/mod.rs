//! Vault module: the boundary to the platform credential store.
//!
//! This module provides:
//! - The `Vault` trait, the four native operations the rest of the crate uses
//! - `NativeHandle` / `NativeRecord`, scoped ownership of vault allocations (`handle`)
//! - `CredentialType`, `PersistenceType` and FILETIME helpers (`types`)
//! - `MemoryVault`, a process-local vault (`memory`)
//! - `WindowsVault`, the Windows Credential Manager (`win32`, Windows only)

pub mod handle;
pub mod memory;
pub mod types;

#[cfg(windows)]
pub mod win32;

use std::sync::{Arc, OnceLock};

pub use handle::{NativeAllocation, NativeHandle, NativeRecord};
pub use memory::MemoryVault;
pub use types::{filetime_to_utc, utc_to_filetime, CredentialType, PersistenceType};

#[cfg(windows)]
pub use win32::WindowsVault;

/// Everything the vault stores for one credential, borrowed for a write.
#[derive(Debug, Clone, Copy)]
pub struct WriteRequest<'a> {
    pub target: &'a str,
    pub username: Option<&'a str>,
    pub kind: CredentialType,
    pub persistence: PersistenceType,
    /// Encoded secret; its length is recorded as the blob size.
    pub blob: &'a [u8],
    pub comment: Option<&'a str>,
}

/// The native credential store.
///
/// Failures (not found, access denied, bad target) are reported as
/// `false` / `None`: they are expected outcomes, not errors.
pub trait Vault: Send + Sync {
    /// Create or overwrite the record keyed by (target, kind).
    fn write(&self, request: &WriteRequest<'_>) -> bool;

    /// Read the record keyed by (target, kind).
    fn read(&self, target: &str, kind: CredentialType) -> Option<NativeHandle>;

    /// Remove the record keyed by (target, kind).
    fn delete(&self, target: &str, kind: CredentialType) -> bool;

    /// Every record whose target starts with `filter` (all records for
    /// `None`). `None` is returned when nothing matches.
    fn enumerate(&self, filter: Option<&str>) -> Option<NativeHandle>;
}

static PLATFORM_VAULT: OnceLock<Arc<dyn Vault>> = OnceLock::new();

/// The vault for this platform, resolved once per process.
pub fn platform_vault() -> Arc<dyn Vault> {
    Arc::clone(PLATFORM_VAULT.get_or_init(init_platform_vault))
}

#[cfg(windows)]
fn init_platform_vault() -> Arc<dyn Vault> {
    Arc::new(WindowsVault::new())
}

#[cfg(not(windows))]
fn init_platform_vault() -> Arc<dyn Vault> {
    tracing::warn!(
        "no platform credential vault on this OS; using a session-scoped in-memory vault"
    );
    Arc::new(MemoryVault::new())
}
