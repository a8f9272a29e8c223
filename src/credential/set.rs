//! `CredentialSet`: the credentials returned by one vault enumeration.

use std::sync::Arc;

use tracing::{debug, warn};

use super::Credential;
use crate::errors::Result;
use crate::lifecycle::Lifecycle;
use crate::secure::TextFormat;
use crate::vault::{platform_vault, Vault};

const OWNER: &str = "CredentialSet";

/// Credentials enumerated from the vault, optionally restricted to
/// targets that start with a filter.
///
/// Members are fully loaded and independent of the enumeration that
/// produced them. They are kept in vault order.
pub struct CredentialSet {
    vault: Arc<dyn Vault>,
    target_filter: Option<String>,
    text_format: TextFormat,
    credentials: Vec<Credential>,
    lifecycle: Lifecycle,
}

impl CredentialSet {
    /// An unfiltered set on the platform vault. Call `load` to fill it.
    pub fn new() -> Self {
        Self::with_vault(platform_vault(), None)
    }

    /// A set on the platform vault restricted to targets starting with
    /// `filter`. A trailing `*` means the same thing.
    pub fn with_filter(filter: &str) -> Self {
        Self::with_vault(platform_vault(), Some(filter))
    }

    pub fn with_vault(vault: Arc<dyn Vault>, filter: Option<&str>) -> Self {
        Self {
            vault,
            target_filter: filter.map(str::to_string),
            text_format: TextFormat::Unicode,
            credentials: Vec::new(),
            lifecycle: Lifecycle::Live,
        }
    }

    /// Decode member secrets with `text_format` instead of Unicode.
    pub fn with_text_format(mut self, text_format: TextFormat) -> Self {
        self.text_format = text_format;
        self
    }

    pub fn target_filter(&self) -> Option<&str> {
        self.target_filter.as_deref()
    }

    /// Enumerate the vault and replace the contents of this set.
    ///
    /// No match leaves the set empty. A record that cannot be decoded
    /// (unknown type or persistence, malformed name) is skipped with a
    /// warning so the remaining records still load. The vault
    /// allocation is released before this returns.
    pub fn load(&mut self) -> Result<&mut Self> {
        self.lifecycle.ensure_live(OWNER)?;

        let mut loaded = Vec::new();
        if let Some(handle) = self.vault.enumerate(self.target_filter.as_deref()) {
            for record in handle.records() {
                let vault = Arc::clone(&self.vault);
                match Credential::from_record(vault, &record, self.text_format) {
                    Ok(credential) => loaded.push(credential),
                    Err(e) => warn!(kind = record.kind, "skipping vault record: {e}"),
                }
            }
        }
        debug!(
            filter = ?self.target_filter,
            count = loaded.len(),
            "enumerated credentials"
        );

        let previous = std::mem::replace(&mut self.credentials, loaded);
        dispose_all(previous);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Credential> {
        self.credentials.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Credential> {
        self.credentials.iter()
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }

    /// Dispose every member and invalidate the set.
    pub fn dispose(&mut self) {
        if self.lifecycle.dispose() {
            dispose_all(std::mem::take(&mut self.credentials));
        }
    }
}

fn dispose_all(credentials: Vec<Credential>) {
    for mut credential in credentials {
        credential.dispose();
    }
}

impl Default for CredentialSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CredentialSet {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<'a> IntoIterator for &'a CredentialSet {
    type Item = &'a Credential;
    type IntoIter = std::slice::Iter<'a, Credential>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSet")
            .field("target_filter", &self.target_filter)
            .field("len", &self.credentials.len())
            .field("disposed", &self.lifecycle.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CredentialError;
    use crate::vault::MemoryVault;

    fn seeded(targets: &[&str]) -> Arc<MemoryVault> {
        let vault = Arc::new(MemoryVault::new());
        for target in targets {
            let mut credential = Credential::with_vault(vault.clone())
                .with_target(target)
                .with_username("user")
                .with_secret("pw");
            assert!(credential.save().unwrap());
        }
        vault
    }

    #[test]
    fn unfiltered_load_returns_everything() {
        let vault = seeded(&["a", "b", "c"]);
        let mut set = CredentialSet::with_vault(vault.clone(), None);
        assert_eq!(set.load().unwrap().len(), 3);
        assert_eq!(vault.outstanding_allocations(), 0);
    }

    #[test]
    fn filter_matches_prefix() {
        let vault = seeded(&["svc/one", "svc/two", "other"]);
        let mut set = CredentialSet::with_vault(vault, Some("svc/"));
        set.load().unwrap();

        let targets: Vec<_> = set
            .iter()
            .map(|c| c.target().unwrap().unwrap().to_string())
            .collect();
        assert_eq!(targets, ["svc/one", "svc/two"]);
    }

    #[test]
    fn no_match_is_empty() {
        let vault = seeded(&["a"]);
        let mut set = CredentialSet::with_vault(vault, Some("zzz"));
        assert!(set.load().unwrap().is_empty());
    }

    #[test]
    fn reload_replaces_contents() {
        let vault = seeded(&["a", "b"]);
        let mut set = CredentialSet::with_vault(vault.clone(), None);
        set.load().unwrap();
        assert_eq!(set.len(), 2);

        let mut extra = Credential::with_vault(vault.clone()).with_target("c").with_secret("x");
        assert!(extra.save().unwrap());
        assert_eq!(set.load().unwrap().len(), 3);
    }

    #[test]
    fn members_are_fully_loaded() {
        let vault = seeded(&["member"]);
        let mut set = CredentialSet::with_vault(vault, None);
        set.load().unwrap();

        let member = set.get(0).unwrap();
        assert_eq!(member.username().unwrap(), Some("user"));
        assert_eq!(member.secret().unwrap().as_str(), "pw");
        assert!(member.last_write_time_utc().unwrap().is_some());
    }

    #[test]
    fn undecodable_record_is_skipped() {
        let vault = seeded(&["good"]);
        vault.insert_foreign("foreign", 99, 2, &[0x12, 0xdc]);

        let mut set = CredentialSet::with_vault(vault.clone(), None);
        assert_eq!(set.load().unwrap().len(), 1);
        assert_eq!(set.get(0).unwrap().target().unwrap(), Some("good"));
        assert_eq!(vault.outstanding_allocations(), 0);
    }

    #[test]
    fn disposed_set_cannot_load() {
        let vault = seeded(&["a"]);
        let mut set = CredentialSet::with_vault(vault, None);
        set.load().unwrap();
        set.dispose();

        assert!(set.is_empty());
        assert!(matches!(
            set.load().unwrap_err(),
            CredentialError::Disposed("CredentialSet")
        ));
    }
}
