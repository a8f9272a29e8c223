//! Process-local vault.
//!
//! `MemoryVault` behaves like the native store as seen through the
//! `Vault` trait: targets are C strings (cut at the first NUL) compared
//! without regard to ASCII case, records are keyed by (target, type),
//! blobs are capped at the native maximum, and every read hands out a
//! separate allocation that must be released. It backs the crate on
//! platforms without a credential vault (session persistence only)
//! and in tests, where its allocation counters prove handles are freed.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::debug;
use zeroize::Zeroizing;

use super::handle::{NativeAllocation, NativeHandle, NativeRecord};
use super::types::{utc_to_filetime, CredentialType};
use super::{Vault, WriteRequest};

/// `CRED_MAX_CREDENTIAL_BLOB_SIZE`.
pub const MAX_BLOB_SIZE: usize = 5 * 512;

#[derive(Clone)]
struct StoredRecord {
    target: String,
    username: Option<String>,
    comment: Option<String>,
    kind: u32,
    persistence: u32,
    blob: Zeroizing<Vec<u8>>,
    last_written: u64,
}

impl StoredRecord {
    fn matches(&self, target: &str, kind: CredentialType) -> bool {
        self.kind == kind.as_raw() && self.target.eq_ignore_ascii_case(target)
    }
}

#[derive(Debug, Default)]
struct AllocationCounters {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

/// An in-process credential vault.
#[derive(Default)]
pub struct MemoryVault {
    records: Mutex<Vec<StoredRecord>>,
    counters: Arc<AllocationCounters>,
    deny_writes: AtomicBool,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, as an access-denied vault would.
    pub fn deny_writes(&self, deny: bool) {
        self.deny_writes.store(deny, Ordering::SeqCst);
    }

    /// Store a record the way another application might have written
    /// it: raw type and persistence values, arbitrary blob bytes.
    /// Replaces any record with the same target and raw type.
    pub fn insert_foreign(&self, target: &str, kind: u32, persistence: u32, blob: &[u8]) {
        let record = StoredRecord {
            target: c_string(target).to_string(),
            username: None,
            comment: None,
            kind,
            persistence,
            blob: Zeroizing::new(blob.to_vec()),
            last_written: utc_to_filetime(Utc::now()),
        };
        let mut records = self.lock();
        records.retain(|existing| {
            existing.kind != kind || !existing.target.eq_ignore_ascii_case(&record.target)
        });
        records.push(record);
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Allocations handed out by `read`/`enumerate` and not yet released.
    pub fn outstanding_allocations(&self) -> usize {
        self.acquired_allocations() - self.released_allocations()
    }

    pub fn acquired_allocations(&self) -> usize {
        self.counters.acquired.load(Ordering::SeqCst)
    }

    pub fn released_allocations(&self) -> usize {
        self.counters.released.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StoredRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn allocate(&self, records: Vec<StoredRecord>) -> NativeHandle {
        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        NativeHandle::new(MemoryAllocation::new(records, Arc::clone(&self.counters)))
    }
}

/// The native layer reads targets as NUL-terminated strings.
fn c_string(target: &str) -> &str {
    target.split('\0').next().unwrap_or_default()
}

impl Vault for MemoryVault {
    fn write(&self, request: &WriteRequest<'_>) -> bool {
        let target = c_string(request.target);
        if target.is_empty() {
            debug!("memory vault: rejecting write with empty target");
            return false;
        }
        if request.blob.len() > MAX_BLOB_SIZE {
            debug!(
                target_name = target,
                size = request.blob.len(),
                "memory vault: blob too large"
            );
            return false;
        }
        if self.deny_writes.load(Ordering::SeqCst) {
            debug!(target_name = target, "memory vault: write denied");
            return false;
        }

        let record = StoredRecord {
            target: target.to_string(),
            username: request.username.map(|u| c_string(u).to_string()),
            comment: request.comment.map(|c| c_string(c).to_string()),
            kind: request.kind.as_raw(),
            persistence: request.persistence.as_raw(),
            blob: Zeroizing::new(request.blob.to_vec()),
            last_written: utc_to_filetime(Utc::now()),
        };

        let mut records = self.lock();
        match records
            .iter_mut()
            .find(|existing| existing.matches(target, request.kind))
        {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        true
    }

    fn read(&self, target: &str, kind: CredentialType) -> Option<NativeHandle> {
        let target = c_string(target);
        let found = self
            .lock()
            .iter()
            .find(|record| record.matches(target, kind))
            .cloned()?;
        Some(self.allocate(vec![found]))
    }

    fn delete(&self, target: &str, kind: CredentialType) -> bool {
        let target = c_string(target);
        if target.is_empty() {
            return false;
        }
        let mut records = self.lock();
        let before = records.len();
        records.retain(|record| !record.matches(target, kind));
        records.len() != before
    }

    fn enumerate(&self, filter: Option<&str>) -> Option<NativeHandle> {
        let prefix = filter
            .map(c_string)
            .map(|f| f.strip_suffix('*').unwrap_or(f).to_ascii_lowercase());

        let matched: Vec<StoredRecord> = self
            .lock()
            .iter()
            .filter(|record| match &prefix {
                Some(prefix) => record.target.to_ascii_lowercase().starts_with(prefix.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        if matched.is_empty() {
            return None;
        }
        Some(self.allocate(matched))
    }
}

// ── Allocation handed to callers ─────────────────────────────────────

struct AllocatedRecord {
    target: Vec<u16>,
    username: Option<Vec<u16>>,
    comment: Option<Vec<u16>>,
    kind: u32,
    persistence: u32,
    blob: Zeroizing<Vec<u8>>,
    last_written: u64,
}

struct MemoryAllocation {
    records: Vec<AllocatedRecord>,
    counters: Arc<AllocationCounters>,
}

impl MemoryAllocation {
    fn new(records: Vec<StoredRecord>, counters: Arc<AllocationCounters>) -> Self {
        let records = records
            .into_iter()
            .map(|record| AllocatedRecord {
                target: record.target.encode_utf16().collect(),
                username: record.username.as_deref().map(|u| u.encode_utf16().collect()),
                comment: record.comment.as_deref().map(|c| c.encode_utf16().collect()),
                kind: record.kind,
                persistence: record.persistence,
                blob: record.blob.clone(),
                last_written: record.last_written,
            })
            .collect();
        Self { records, counters }
    }
}

impl NativeAllocation for MemoryAllocation {
    fn records(&self) -> Vec<NativeRecord<'_>> {
        self.records
            .iter()
            .map(|record| NativeRecord {
                target: &record.target,
                username: record.username.as_deref(),
                comment: record.comment.as_deref(),
                kind: record.kind,
                persistence: record.persistence,
                blob: &record.blob,
                last_written: record.last_written,
            })
            .collect()
    }
}

impl Drop for MemoryAllocation {
    fn drop(&mut self) {
        // Blobs are `Zeroizing` and wipe themselves.
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}
