//! Ownership of vault-allocated records.
//!
//! A read or enumerate call hands back memory the vault allocated.
//! `NativeHandle` owns that allocation and releases it exactly once,
//! when the handle is dropped. Views into it (`NativeRecord`) borrow
//! the handle, so none of them can outlive the release.

use std::fmt;

/// A read-only view of one vault record.
///
/// Text fields are the vault's native UTF-16; the secret blob is raw
/// bytes in whatever `TextFormat` the writer used.
#[derive(Debug, Clone, Copy)]
pub struct NativeRecord<'a> {
    pub target: &'a [u16],
    pub username: Option<&'a [u16]>,
    pub comment: Option<&'a [u16]>,
    /// Raw `CRED_TYPE_*` value.
    pub kind: u32,
    /// Raw `CRED_PERSIST_*` value.
    pub persistence: u32,
    pub blob: &'a [u8],
    /// FILETIME: 100 ns ticks since 1601-01-01 UTC.
    pub last_written: u64,
}

/// Memory returned by a vault call.
///
/// Implementors free the allocation in `Drop`.
pub trait NativeAllocation {
    /// All records held by this allocation, in vault order.
    fn records(&self) -> Vec<NativeRecord<'_>>;
}

/// Owns one vault allocation until it is dropped.
pub struct NativeHandle {
    allocation: Box<dyn NativeAllocation>,
}

impl NativeHandle {
    pub fn new(allocation: impl NativeAllocation + 'static) -> Self {
        Self {
            allocation: Box::new(allocation),
        }
    }

    /// The first record, which is the only one for a single read.
    pub fn extract_record(&self) -> Option<NativeRecord<'_>> {
        self.allocation.records().into_iter().next()
    }

    /// Every record, for enumeration results.
    pub fn records(&self) -> Vec<NativeRecord<'_>> {
        self.allocation.records()
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeHandle")
            .field("records", &self.allocation.records().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Counted {
        target: Vec<u16>,
        frees: Rc<Cell<usize>>,
    }

    impl NativeAllocation for Counted {
        fn records(&self) -> Vec<NativeRecord<'_>> {
            vec![NativeRecord {
                target: &self.target,
                username: None,
                comment: None,
                kind: 1,
                persistence: 1,
                blob: &[],
                last_written: 0,
            }]
        }
    }

    impl Drop for Counted {
        fn drop(&mut self) {
            self.frees.set(self.frees.get() + 1);
        }
    }

    #[test]
    fn drop_releases_exactly_once() {
        let frees = Rc::new(Cell::new(0));
        let handle = NativeHandle::new(Counted {
            target: "t".encode_utf16().collect(),
            frees: Rc::clone(&frees),
        });

        let record = handle.extract_record().unwrap();
        assert_eq!(record.target, &[u16::from(b't')]);
        assert_eq!(frees.get(), 0);

        drop(handle);
        assert_eq!(frees.get(), 1);
    }

    #[test]
    fn release_runs_when_a_reader_bails_out() {
        fn read_then_fail(handle: NativeHandle) -> Result<(), &'static str> {
            let _record = handle.extract_record().ok_or("empty")?;
            Err("decode failed")
        }

        let frees = Rc::new(Cell::new(0));
        let handle = NativeHandle::new(Counted {
            target: vec![],
            frees: Rc::clone(&frees),
        });

        assert!(read_then_fail(handle).is_err());
        assert_eq!(frees.get(), 1);
    }
}
