//! Dialog flags and the bit words they compose into.

use std::collections::BTreeSet;
use std::fmt::Debug;

/// A named boolean that maps to exactly one native bit.
pub trait PromptFlag: Copy + Ord + Debug {
    fn bit(self) -> u32;
}

/// `CREDUI_FLAGS_*` for the legacy prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LegacyFlag {
    IncorrectPassword,
    DoNotPersist,
    RequestAdministrator,
    ExcludeCertificates,
    RequireCertificate,
    ShowSaveCheckBox,
    AlwaysShowUI,
    RequireSmartCard,
    ValidateUsername,
    CompleteUsername,
    Persist,
    ExpectConfirmation,
    GenericCredentials,
    /// `CREDUI_FLAGS_KEEP_USERNAME`.
    UsernameReadOnly,
}

impl PromptFlag for LegacyFlag {
    fn bit(self) -> u32 {
        match self {
            LegacyFlag::IncorrectPassword => 0x1,
            LegacyFlag::DoNotPersist => 0x2,
            LegacyFlag::RequestAdministrator => 0x4,
            LegacyFlag::ExcludeCertificates => 0x8,
            LegacyFlag::RequireCertificate => 0x10,
            LegacyFlag::ShowSaveCheckBox => 0x40,
            LegacyFlag::AlwaysShowUI => 0x80,
            LegacyFlag::RequireSmartCard => 0x100,
            LegacyFlag::ValidateUsername => 0x400,
            LegacyFlag::CompleteUsername => 0x800,
            LegacyFlag::Persist => 0x1000,
            LegacyFlag::ExpectConfirmation => 0x20000,
            LegacyFlag::GenericCredentials => 0x40000,
            LegacyFlag::UsernameReadOnly => 0x100000,
        }
    }
}

/// `CREDUIWIN_*` for the modern prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WindowsFlag {
    Generic,
    Checkbox,
}

impl PromptFlag for WindowsFlag {
    fn bit(self) -> u32 {
        match self {
            WindowsFlag::Generic => 0x1,
            WindowsFlag::Checkbox => 0x2,
        }
    }
}

/// The flags currently switched on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSet<F> {
    flags: BTreeSet<F>,
}

impl<F: PromptFlag> FlagSet<F> {
    pub fn new() -> Self {
        Self {
            flags: BTreeSet::new(),
        }
    }

    pub fn set(&mut self, flag: F, on: bool) {
        if on {
            self.flags.insert(flag);
        } else {
            self.flags.remove(&flag);
        }
    }

    pub fn contains(&self, flag: F) -> bool {
        self.flags.contains(&flag)
    }

    /// The native flag word.
    pub fn bits(&self) -> u32 {
        self.flags.iter().fold(0, |word, flag| word | flag.bit())
    }
}

impl<F: PromptFlag> Default for FlagSet<F> {
    fn default() -> Self {
        Self::new()
    }
}
