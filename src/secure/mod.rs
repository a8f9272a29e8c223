//! Secret memory and vault text encoding.
//!
//! This module provides:
//! - `SecureSecret`, an owned secret that is wiped on reassignment and drop (`secret`)
//! - `TextFormat`, the Unicode / Ansi codec used for the vault wire format (`codec`)

pub mod codec;
pub mod secret;

pub use codec::{decode_wide, NativeBuffer, TextFormat};
pub use secret::SecureSecret;
