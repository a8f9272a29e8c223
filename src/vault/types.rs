//! Vault record enums and FILETIME conversion.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of credential, as the vault numbers it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum CredentialType {
    None,
    #[default]
    Generic,
    DomainPassword,
    DomainCertificate,
    DomainVisiblePassword,
    GenericCertificate,
    DomainExtended,
    Maximum,
    MaximumEx,
}

impl CredentialType {
    /// The native `CRED_TYPE_*` value.
    pub const fn as_raw(self) -> u32 {
        match self {
            CredentialType::None => 0,
            CredentialType::Generic => 1,
            CredentialType::DomainPassword => 2,
            CredentialType::DomainCertificate => 3,
            CredentialType::DomainVisiblePassword => 4,
            CredentialType::GenericCertificate => 5,
            CredentialType::DomainExtended => 6,
            CredentialType::Maximum => 7,
            CredentialType::MaximumEx => 1007,
        }
    }

    pub const fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => CredentialType::None,
            1 => CredentialType::Generic,
            2 => CredentialType::DomainPassword,
            3 => CredentialType::DomainCertificate,
            4 => CredentialType::DomainVisiblePassword,
            5 => CredentialType::GenericCertificate,
            6 => CredentialType::DomainExtended,
            7 => CredentialType::Maximum,
            1007 => CredentialType::MaximumEx,
            _ => return None,
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            CredentialType::None => "none",
            CredentialType::Generic => "generic",
            CredentialType::DomainPassword => "domain-password",
            CredentialType::DomainCertificate => "domain-certificate",
            CredentialType::DomainVisiblePassword => "domain-visible-password",
            CredentialType::GenericCertificate => "generic-certificate",
            CredentialType::DomainExtended => "domain-extended",
            CredentialType::Maximum => "maximum",
            CredentialType::MaximumEx => "maximum-ex",
        }
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How long the vault keeps a credential.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceType {
    /// Lives until the logon session ends.
    #[default]
    Session,
    /// Survives reboots on this machine.
    LocalMachine,
    /// Roams with the user profile.
    Enterprise,
}

impl PersistenceType {
    /// The native `CRED_PERSIST_*` value.
    pub const fn as_raw(self) -> u32 {
        match self {
            PersistenceType::Session => 1,
            PersistenceType::LocalMachine => 2,
            PersistenceType::Enterprise => 3,
        }
    }

    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(PersistenceType::Session),
            2 => Some(PersistenceType::LocalMachine),
            3 => Some(PersistenceType::Enterprise),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PersistenceType::Session => "session",
            PersistenceType::LocalMachine => "local-machine",
            PersistenceType::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for PersistenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── FILETIME ─────────────────────────────────────────────────────────

/// 100 ns ticks between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_EPOCH: i64 = 116_444_736_000_000_000;
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Convert a FILETIME (100 ns ticks since 1601, UTC) to a timestamp.
///
/// Zero means "never written" and maps to `None`.
pub fn filetime_to_utc(filetime: u64) -> Option<DateTime<Utc>> {
    if filetime == 0 {
        return None;
    }
    let ticks = i64::try_from(filetime).ok()? - FILETIME_UNIX_EPOCH;
    let secs = ticks.div_euclid(TICKS_PER_SECOND);
    let nanos = u32::try_from(ticks.rem_euclid(TICKS_PER_SECOND) * 100).ok()?;
    DateTime::from_timestamp(secs, nanos)
}

/// Convert a timestamp to a FILETIME. Times before 1601 clamp to zero.
pub fn utc_to_filetime(time: DateTime<Utc>) -> u64 {
    let ticks = time
        .timestamp()
        .saturating_mul(TICKS_PER_SECOND)
        .saturating_add(i64::from(time.timestamp_subsec_nanos() / 100))
        .saturating_add(FILETIME_UNIX_EPOCH);
    u64::try_from(ticks).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn credential_type_raw_values_round_trip() {
        for kind in [
            CredentialType::None,
            CredentialType::Generic,
            CredentialType::DomainPassword,
            CredentialType::DomainVisiblePassword,
            CredentialType::MaximumEx,
        ] {
            assert_eq!(CredentialType::from_raw(kind.as_raw()), Some(kind));
        }
        assert_eq!(CredentialType::Generic.as_raw(), 1);
        assert_eq!(CredentialType::from_raw(42), None);
    }

    #[test]
    fn persistence_raw_values() {
        assert_eq!(PersistenceType::Session.as_raw(), 1);
        assert_eq!(PersistenceType::LocalMachine.as_raw(), 2);
        assert_eq!(PersistenceType::Enterprise.as_raw(), 3);
        assert_eq!(PersistenceType::from_raw(0), None);
    }

    #[test]
    fn defaults_match_a_fresh_credential() {
        assert_eq!(CredentialType::default(), CredentialType::Generic);
        assert_eq!(PersistenceType::default(), PersistenceType::Session);
    }

    #[test]
    fn filetime_unix_epoch() {
        let epoch = filetime_to_utc(116_444_736_000_000_000).unwrap();
        assert_eq!(epoch, Utc.timestamp_opt(0, 0).unwrap());
    }

    #[test]
    fn filetime_zero_is_none() {
        assert!(filetime_to_utc(0).is_none());
    }

    #[test]
    fn filetime_round_trip_keeps_100ns_precision() {
        let time = Utc.with_ymd_and_hms(2024, 2, 29, 13, 45, 10).unwrap()
            + chrono::Duration::nanoseconds(123_456_700);
        let back = filetime_to_utc(utc_to_filetime(time)).unwrap();
        assert_eq!(back, time);
    }
}
