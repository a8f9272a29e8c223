//! Windows Credential Manager implementation
//!
//! This module contains all unsafe Windows API code for credential storage
//! (CredWriteW / CredReadW / CredDeleteW / CredEnumerateW / CredFree).

use std::ffi::c_void;

use ::windows::core::{PCWSTR, PWSTR};
use ::windows::Win32::Foundation::FILETIME;
use ::windows::Win32::Security::Credentials::{
    CredDeleteW, CredEnumerateW, CredFree, CredReadW, CredWriteW, CREDENTIALW,
    CRED_ENUMERATE_FLAGS, CRED_FLAGS, CRED_PERSIST, CRED_TYPE,
};
use tracing::debug;

use super::handle::{NativeAllocation, NativeHandle, NativeRecord};
use super::types::CredentialType;
use super::{Vault, WriteRequest};

/// Windows Credential Manager vault.
///
/// Credentials are encrypted at rest by the OS (DPAPI) and tied to the
/// user account.
#[derive(Debug, Default)]
pub struct WindowsVault;

impl WindowsVault {
    pub fn new() -> Self {
        WindowsVault
    }
}

/// UTF-16 with a NUL terminator, as the W APIs expect.
fn to_wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

fn filetime_to_u64(time: FILETIME) -> u64 {
    (u64::from(time.dwHighDateTime) << 32) | u64::from(time.dwLowDateTime)
}

impl Vault for WindowsVault {
    fn write(&self, request: &WriteRequest<'_>) -> bool {
        let target = to_wide(request.target);
        let username = request.username.map(to_wide);
        let comment = request.comment.map(to_wide);

        let Ok(blob_size) = u32::try_from(request.blob.len()) else {
            return false;
        };

        // SAFETY: every pointer refers to a buffer owned by this frame
        // that outlives the CredWriteW call; the API copies what it keeps.
        let cred = CREDENTIALW {
            Flags: CRED_FLAGS(0),
            Type: CRED_TYPE(request.kind.as_raw()),
            TargetName: PWSTR(target.as_ptr() as *mut u16),
            Comment: comment
                .as_ref()
                .map_or(PWSTR::null(), |c| PWSTR(c.as_ptr() as *mut u16)),
            LastWritten: FILETIME::default(),
            CredentialBlobSize: blob_size,
            CredentialBlob: if request.blob.is_empty() {
                std::ptr::null_mut()
            } else {
                request.blob.as_ptr() as *mut u8
            },
            Persist: CRED_PERSIST(request.persistence.as_raw()),
            AttributeCount: 0,
            Attributes: std::ptr::null_mut(),
            TargetAlias: PWSTR::null(),
            UserName: username
                .as_ref()
                .map_or(PWSTR::null(), |u| PWSTR(u.as_ptr() as *mut u16)),
        };

        match unsafe { CredWriteW(&cred, 0) } {
            Ok(()) => true,
            Err(e) => {
                debug!(target_name = request.target, "CredWriteW failed: {e}");
                false
            }
        }
    }

    fn read(&self, target: &str, kind: CredentialType) -> Option<NativeHandle> {
        let target_wide = to_wide(target);
        let mut pcred: *mut CREDENTIALW = std::ptr::null_mut();

        // SAFETY: on success pcred points at a CREDENTIALW allocated by
        // the OS, which `CredentialBuffer` frees with CredFree.
        match unsafe {
            CredReadW(
                PCWSTR::from_raw(target_wide.as_ptr()),
                CRED_TYPE(kind.as_raw()),
                0,
                &mut pcred,
            )
        } {
            Ok(()) if !pcred.is_null() => Some(NativeHandle::new(CredentialBuffer {
                base: pcred.cast(),
                records: vec![pcred.cast_const()],
            })),
            Ok(()) => None,
            Err(e) => {
                debug!(target_name = target, "CredReadW failed: {e}");
                None
            }
        }
    }

    fn delete(&self, target: &str, kind: CredentialType) -> bool {
        let target_wide = to_wide(target);
        match unsafe {
            CredDeleteW(
                PCWSTR::from_raw(target_wide.as_ptr()),
                CRED_TYPE(kind.as_raw()),
                0,
            )
        } {
            Ok(()) => true,
            Err(e) => {
                debug!(target_name = target, "CredDeleteW failed: {e}");
                false
            }
        }
    }

    fn enumerate(&self, filter: Option<&str>) -> Option<NativeHandle> {
        // CredEnumerateW only matches prefixes through a trailing '*'.
        let pattern = filter.map(|f| {
            if f.ends_with('*') {
                to_wide(f)
            } else {
                to_wide(&format!("{f}*"))
            }
        });
        let filter_ptr = pattern
            .as_ref()
            .map_or(PCWSTR::null(), |p| PCWSTR::from_raw(p.as_ptr()));

        let mut count: u32 = 0;
        let mut list: *mut *mut CREDENTIALW = std::ptr::null_mut();

        // SAFETY: on success `list` points at `count` credential pointers
        // in a single OS allocation, released by one CredFree.
        let enumerated =
            unsafe { CredEnumerateW(filter_ptr, CRED_ENUMERATE_FLAGS(0), &mut count, &mut list) };
        match enumerated {
            Ok(()) if !list.is_null() => {
                let records = unsafe { std::slice::from_raw_parts(list, count as usize) }
                    .iter()
                    .map(|p| p.cast_const())
                    .collect();
                Some(NativeHandle::new(CredentialBuffer {
                    base: list.cast(),
                    records,
                }))
            }
            Ok(()) => None,
            Err(e) => {
                // ERROR_NOT_FOUND when nothing matches.
                debug!(?filter, "CredEnumerateW returned no records: {e}");
                None
            }
        }
    }
}

/// A Credential Manager allocation, freed with `CredFree` on drop.
struct CredentialBuffer {
    base: *mut c_void,
    records: Vec<*const CREDENTIALW>,
}

/// Length-bounded view of an optional NUL-terminated wide string.
unsafe fn wide_field<'a>(text: PWSTR) -> Option<&'a [u16]> {
    if text.is_null() {
        None
    } else {
        Some(text.as_wide())
    }
}

impl NativeAllocation for CredentialBuffer {
    fn records(&self) -> Vec<NativeRecord<'_>> {
        self.records
            .iter()
            .filter(|p| !p.is_null())
            .map(|&p| {
                // SAFETY: `p` stays valid until `self.base` is freed, and
                // the returned borrows are tied to `&self`.
                let cred = unsafe { &*p };
                let blob = if cred.CredentialBlob.is_null() || cred.CredentialBlobSize == 0 {
                    &[][..]
                } else {
                    unsafe {
                        std::slice::from_raw_parts(
                            cred.CredentialBlob,
                            cred.CredentialBlobSize as usize,
                        )
                    }
                };
                NativeRecord {
                    target: unsafe { wide_field(cred.TargetName) }.unwrap_or_default(),
                    username: unsafe { wide_field(cred.UserName) },
                    comment: unsafe { wide_field(cred.Comment) },
                    kind: cred.Type.0,
                    persistence: cred.Persist.0,
                    blob,
                    last_written: filetime_to_u64(cred.LastWritten),
                }
            })
            .collect()
    }
}

impl Drop for CredentialBuffer {
    fn drop(&mut self) {
        // SAFETY: `base` came from CredReadW/CredEnumerateW and is freed once.
        unsafe { CredFree(self.base) };
    }
}
