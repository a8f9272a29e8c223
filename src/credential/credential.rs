//! `Credential`: one vault entry and its Save/Load/Delete/Exists operations.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use tracing::debug;
use zeroize::Zeroizing;

use crate::errors::{CredentialError, Result};
use crate::lifecycle::Lifecycle;
use crate::secure::{decode_wide, SecureSecret, TextFormat};
use crate::vault::{
    filetime_to_utc, platform_vault, CredentialType, NativeRecord, PersistenceType, Vault,
    WriteRequest,
};

/// Largest encoded secret `save` accepts, in bytes.
pub const MAX_SECRET_BYTES: usize = 512;

const OWNER: &str = "Credential";

/// A credential stored (or to be stored) in the vault.
///
/// Property accessors fail with `Disposed` once `dispose` has run.
/// Vault outcomes (not found, access denied) come back as `false`.
pub struct Credential {
    vault: Arc<dyn Vault>,
    lifecycle: Lifecycle,
    username: Option<String>,
    secret: SecureSecret,
    target: Option<String>,
    description: Option<String>,
    kind: CredentialType,
    persistence: PersistenceType,
    text_format: TextFormat,
    last_write_time_utc: Option<DateTime<Utc>>,
}

impl Credential {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// An empty generic credential on the platform vault.
    pub fn new() -> Self {
        Self::with_vault(platform_vault())
    }

    /// An empty generic credential on `vault`.
    pub fn with_vault(vault: Arc<dyn Vault>) -> Self {
        Self {
            vault,
            lifecycle: Lifecycle::Live,
            username: None,
            secret: SecureSecret::new(),
            target: None,
            description: None,
            kind: CredentialType::Generic,
            persistence: PersistenceType::Session,
            text_format: TextFormat::Unicode,
            last_write_time_utc: None,
        }
    }

    pub fn with_username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    pub fn with_secret(mut self, secret: &str) -> Self {
        self.secret.assign(secret);
        self
    }

    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }

    pub fn with_type(mut self, kind: CredentialType) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_persistence(mut self, persistence: PersistenceType) -> Self {
        self.persistence = persistence;
        self
    }

    pub fn with_text_format(mut self, text_format: TextFormat) -> Self {
        self.text_format = text_format;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Build a credential from a record in a vault allocation.
    pub(crate) fn from_record(
        vault: Arc<dyn Vault>,
        record: &NativeRecord<'_>,
        text_format: TextFormat,
    ) -> Result<Self> {
        let fields = LoadedFields::decode(record, text_format)?;
        let mut credential = Self::with_vault(vault).with_text_format(text_format);
        credential.apply(fields);
        Ok(credential)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn username(&self) -> Result<Option<&str>> {
        self.lifecycle.ensure_live(OWNER)?;
        Ok(self.username.as_deref())
    }

    pub fn set_username<'a>(&mut self, username: impl Into<Option<&'a str>>) -> Result<()> {
        self.lifecycle.ensure_live(OWNER)?;
        self.username = username.into().map(str::to_string);
        Ok(())
    }

    /// The secret as a short-lived plain-text copy.
    pub fn secret(&self) -> Result<Zeroizing<String>> {
        self.lifecycle.ensure_live(OWNER)?;
        Ok(self.secret.reveal())
    }

    /// Set the secret; `None` stores an empty secret.
    pub fn set_secret<'a>(&mut self, secret: impl Into<Option<&'a str>>) -> Result<()> {
        self.lifecycle.ensure_live(OWNER)?;
        self.secret.assign(secret.into().unwrap_or_default());
        Ok(())
    }

    /// An independent copy of the secret.
    pub fn secure_secret(&self) -> Result<SecureSecret> {
        self.lifecycle.ensure_live(OWNER)?;
        Ok(self.secret.clone())
    }

    /// Replace the secret with a copy of `secret`.
    pub fn set_secure_secret(&mut self, secret: &SecureSecret) -> Result<()> {
        self.lifecycle.ensure_live(OWNER)?;
        secret.with_revealed(|plain| self.secret.assign(plain));
        Ok(())
    }

    pub fn target(&self) -> Result<Option<&str>> {
        self.lifecycle.ensure_live(OWNER)?;
        Ok(self.target.as_deref())
    }

    pub fn set_target<'a>(&mut self, target: impl Into<Option<&'a str>>) -> Result<()> {
        self.lifecycle.ensure_live(OWNER)?;
        self.target = target.into().map(str::to_string);
        Ok(())
    }

    pub fn description(&self) -> Result<Option<&str>> {
        self.lifecycle.ensure_live(OWNER)?;
        Ok(self.description.as_deref())
    }

    pub fn set_description<'a>(&mut self, description: impl Into<Option<&'a str>>) -> Result<()> {
        self.lifecycle.ensure_live(OWNER)?;
        self.description = description.into().map(str::to_string);
        Ok(())
    }

    pub fn credential_type(&self) -> Result<CredentialType> {
        self.lifecycle.ensure_live(OWNER)?;
        Ok(self.kind)
    }

    pub fn set_credential_type(&mut self, kind: CredentialType) -> Result<()> {
        self.lifecycle.ensure_live(OWNER)?;
        self.kind = kind;
        Ok(())
    }

    pub fn persistence(&self) -> Result<PersistenceType> {
        self.lifecycle.ensure_live(OWNER)?;
        Ok(self.persistence)
    }

    pub fn set_persistence(&mut self, persistence: PersistenceType) -> Result<()> {
        self.lifecycle.ensure_live(OWNER)?;
        self.persistence = persistence;
        Ok(())
    }

    pub fn text_format(&self) -> Result<TextFormat> {
        self.lifecycle.ensure_live(OWNER)?;
        Ok(self.text_format)
    }

    pub fn set_text_format(&mut self, text_format: TextFormat) -> Result<()> {
        self.lifecycle.ensure_live(OWNER)?;
        self.text_format = text_format;
        Ok(())
    }

    /// When the vault last wrote this credential; `None` before Save/Load.
    pub fn last_write_time_utc(&self) -> Result<Option<DateTime<Utc>>> {
        self.lifecycle.ensure_live(OWNER)?;
        Ok(self.last_write_time_utc)
    }

    /// `last_write_time_utc` in the local time zone.
    pub fn last_write_time(&self) -> Result<Option<DateTime<Local>>> {
        Ok(self
            .last_write_time_utc()?
            .map(|utc| utc.with_timezone(&Local)))
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }

    // ------------------------------------------------------------------
    // Vault operations
    // ------------------------------------------------------------------

    /// Write this credential to the vault.
    ///
    /// Returns `false` when the vault refuses the write.
    pub fn save(&mut self) -> Result<bool> {
        self.lifecycle.ensure_live(OWNER)?;
        let target = self.require_target("save")?;

        let blob = self
            .secret
            .with_revealed(|plain| self.text_format.encode(plain));
        if blob.len() > MAX_SECRET_BYTES {
            return Err(CredentialError::OutOfRange {
                field: "secret",
                max: MAX_SECRET_BYTES,
            });
        }

        let written = self.vault.write(&WriteRequest {
            target,
            username: self.username.as_deref(),
            kind: self.kind,
            persistence: self.persistence,
            blob: &blob,
            comment: self.description.as_deref(),
        });
        if !written {
            debug!(target_name = target, "vault refused credential write");
            return Ok(false);
        }

        self.last_write_time_utc = Some(Utc::now());
        Ok(true)
    }

    /// Read the record for (target, type) into this credential.
    ///
    /// Returns `false` and leaves every field untouched when the vault
    /// has no such record.
    pub fn load(&mut self) -> Result<bool> {
        self.lifecycle.ensure_live(OWNER)?;
        let target = self.require_target("load")?;

        let Some(handle) = self.vault.read(target, self.kind) else {
            debug!(target_name = target, kind = %self.kind, "no vault record");
            return Ok(false);
        };

        // Decode everything before touching `self`; the handle is
        // released at the end of this block on every path.
        let fields = {
            let record = handle
                .extract_record()
                .ok_or_else(|| CredentialError::Decode {
                    field: "record",
                    reason: "vault returned an empty allocation".into(),
                })?;
            LoadedFields::decode(&record, self.text_format)?
        };
        drop(handle);

        self.apply(fields);
        Ok(true)
    }

    /// Remove the record for (target, type) from the vault.
    ///
    /// Returns the vault's answer: `false` when nothing was deleted.
    pub fn delete(&mut self) -> Result<bool> {
        self.lifecycle.ensure_live(OWNER)?;
        let target = self.require_target("delete")?;
        let deleted = self.vault.delete(target, self.kind);
        debug!(target_name = target, deleted, "vault delete");
        Ok(deleted)
    }

    /// Whether the vault holds a record for (target, type).
    ///
    /// Probes with a temporary credential so this one is not modified.
    pub fn exists(&self) -> Result<bool> {
        self.lifecycle.ensure_live(OWNER)?;
        let target = self.require_target("check existence of")?;

        let mut probe = Credential::with_vault(Arc::clone(&self.vault))
            .with_target(target)
            .with_type(self.kind)
            .with_text_format(self.text_format);
        let found = probe.load();
        probe.dispose();
        found
    }

    /// Wipe the secret and invalidate this instance.
    pub fn dispose(&mut self) {
        if self.lifecycle.dispose() {
            self.secret.dispose();
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn require_target(&self, operation: &str) -> Result<&str> {
        match self.target.as_deref() {
            Some(target) if !target.is_empty() => Ok(target),
            _ => Err(CredentialError::InvalidState(format!(
                "Target must be specified to {operation} a credential."
            ))),
        }
    }

    fn apply(&mut self, fields: LoadedFields) {
        self.username = fields.username;
        self.secret = fields.secret;
        self.target = Some(fields.target);
        self.kind = fields.kind;
        self.persistence = fields.persistence;
        self.description = fields.description;
        self.last_write_time_utc = fields.last_write_time_utc;
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("target", &self.target)
            .field("username", &self.username)
            .field("type", &self.kind)
            .field("persistence", &self.persistence)
            .field("disposed", &self.lifecycle.is_disposed())
            .finish_non_exhaustive()
    }
}

/// Every field `load` overwrites, decoded from one record.
struct LoadedFields {
    username: Option<String>,
    secret: SecureSecret,
    target: String,
    kind: CredentialType,
    persistence: PersistenceType,
    description: Option<String>,
    last_write_time_utc: Option<DateTime<Utc>>,
}

impl LoadedFields {
    fn decode(record: &NativeRecord<'_>, text_format: TextFormat) -> Result<Self> {
        let target = decode_wide("target", record.target)?;
        let username = record
            .username
            .map(|units| decode_wide("username", units))
            .transpose()?;
        let description = record
            .comment
            .map(|units| decode_wide("comment", units))
            .transpose()?;
        let kind = CredentialType::from_raw(record.kind).ok_or_else(|| CredentialError::Decode {
            field: "type",
            reason: format!("unknown credential type {}", record.kind),
        })?;
        let persistence =
            PersistenceType::from_raw(record.persistence).ok_or_else(|| CredentialError::Decode {
                field: "persistence",
                reason: format!("unknown persistence {}", record.persistence),
            })?;
        let plain = text_format.decode(record.blob);

        Ok(Self {
            username,
            secret: SecureSecret::from_plain_text(&plain),
            target,
            kind,
            persistence,
            description,
            last_write_time_utc: filetime_to_utc(record.last_written),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::MemoryVault;

    fn vault() -> Arc<MemoryVault> {
        Arc::new(MemoryVault::new())
    }

    #[test]
    fn new_credential_has_defaults() {
        let credential = Credential::with_vault(vault());
        assert_eq!(credential.credential_type().unwrap(), CredentialType::Generic);
        assert_eq!(credential.persistence().unwrap(), PersistenceType::Session);
        assert_eq!(credential.text_format().unwrap(), TextFormat::Unicode);
        assert!(credential.last_write_time_utc().unwrap().is_none());
        assert!(credential.username().unwrap().is_none());
        assert_eq!(credential.secret().unwrap().as_str(), "");
    }

    #[test]
    fn null_secret_is_stored_as_empty() {
        let mut credential = Credential::with_vault(vault()).with_secret("pw");
        credential.set_secret(None).unwrap();
        assert_eq!(credential.secret().unwrap().as_str(), "");
    }

    #[test]
    fn save_sets_last_write_time() {
        let before = Utc::now();
        let mut credential = Credential::with_vault(vault())
            .with_username("u")
            .with_secret("p")
            .with_target("t");
        assert!(credential.save().unwrap());

        let written = credential.last_write_time_utc().unwrap().unwrap();
        assert!(written >= before);
        assert!(credential.last_write_time().unwrap().is_some());
    }

    #[test]
    fn save_without_target_is_invalid_state() {
        let mut credential = Credential::with_vault(vault()).with_secret("p");
        assert!(matches!(
            credential.save().unwrap_err(),
            CredentialError::InvalidState(_)
        ));
    }

    #[test]
    fn save_checks_encoded_byte_length() {
        let store = vault();
        // 256 UTF-16 units = 512 bytes: allowed.
        let mut at_limit = Credential::with_vault(store.clone())
            .with_target("limit")
            .with_secret(&"a".repeat(256));
        assert!(at_limit.save().unwrap());

        // 257 units = 514 bytes: rejected before reaching the vault.
        let mut over = Credential::with_vault(store.clone())
            .with_target("over")
            .with_secret(&"a".repeat(257));
        assert!(matches!(
            over.save().unwrap_err(),
            CredentialError::OutOfRange { field: "secret", max: 512 }
        ));
        assert_eq!(store.len(), 1);

        // The same 257 characters fit as Ansi (257 bytes).
        let mut ansi = Credential::with_vault(store)
            .with_target("ansi")
            .with_text_format(TextFormat::Ansi)
            .with_secret(&"a".repeat(257));
        assert!(ansi.save().unwrap());
    }

    #[test]
    fn refused_write_returns_false() {
        let store = vault();
        store.deny_writes(true);
        let mut credential = Credential::with_vault(store).with_target("t").with_secret("p");
        assert!(!credential.save().unwrap());
        assert!(credential.last_write_time_utc().unwrap().is_none());
    }

    #[test]
    fn load_missing_leaves_state_untouched() {
        let mut credential = Credential::with_vault(vault())
            .with_target("missing")
            .with_username("keep-me")
            .with_secret("keep-secret");
        assert!(!credential.load().unwrap());
        assert_eq!(credential.username().unwrap(), Some("keep-me"));
        assert_eq!(credential.secret().unwrap().as_str(), "keep-secret");
    }

    #[test]
    fn load_round_trips_all_fields() {
        let store = vault();
        let mut saved = Credential::with_vault(store.clone())
            .with_username("alice")
            .with_secret("s3cr\u{00e9}t")
            .with_target("app/db")
            .with_description("database login")
            .with_persistence(PersistenceType::LocalMachine);
        assert!(saved.save().unwrap());

        let mut loaded = Credential::with_vault(store.clone()).with_target("app/db");
        assert!(loaded.load().unwrap());
        assert_eq!(loaded.username().unwrap(), Some("alice"));
        assert_eq!(loaded.secret().unwrap().as_str(), "s3cr\u{00e9}t");
        assert_eq!(loaded.description().unwrap(), Some("database login"));
        assert_eq!(loaded.persistence().unwrap(), PersistenceType::LocalMachine);
        assert!(loaded.last_write_time_utc().unwrap().is_some());
        assert_eq!(store.outstanding_allocations(), 0);
    }

    #[test]
    fn load_with_empty_target_is_invalid_state() {
        let mut credential = Credential::with_vault(vault()).with_target("");
        assert!(matches!(
            credential.load().unwrap_err(),
            CredentialError::InvalidState(_)
        ));
    }

    #[test]
    fn exists_does_not_modify_self() {
        let store = vault();
        let mut saved = Credential::with_vault(store.clone())
            .with_username("u")
            .with_secret("p")
            .with_target("probe");
        assert!(saved.save().unwrap());

        let checker = Credential::with_vault(store.clone()).with_target("probe");
        assert!(checker.exists().unwrap());
        assert!(checker.username().unwrap().is_none());
        assert_eq!(store.outstanding_allocations(), 0);
    }

    #[test]
    fn disposed_credential_rejects_access() {
        let mut credential = Credential::with_vault(vault()).with_secret("password");
        credential.dispose();

        assert!(credential.is_disposed());
        assert!(matches!(
            credential.set_username("username").unwrap_err(),
            CredentialError::Disposed("Credential")
        ));
        assert!(credential.secret().is_err());
        assert!(credential.save().is_err());
        assert!(credential.exists().is_err());

        // Disposing twice is harmless.
        credential.dispose();
    }
}
