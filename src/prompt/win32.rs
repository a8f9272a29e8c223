//! Native Windows credential dialogs
//!
//! All unsafe CredUI code lives here: `CredUIPromptForCredentialsW` for
//! the legacy prompt and `CredUIPromptForWindowsCredentialsW` (with
//! `CredUnPackAuthenticationBufferW`) for the modern one.

use std::ffi::c_void;

use ::windows::core::{PCWSTR, PWSTR};
use ::windows::Win32::Foundation::{BOOL, ERROR_CANCELLED, HWND, NO_ERROR};
use ::windows::Win32::Graphics::Gdi::HBITMAP;
use ::windows::Win32::Security::Credentials::{
    CredUIPromptForCredentialsW, CredUIPromptForWindowsCredentialsW,
    CredUnPackAuthenticationBufferW, CREDUIWIN_FLAGS, CREDUI_FLAGS, CREDUI_INFOW,
    CRED_PACK_FLAGS,
};
use ::windows::Win32::System::Com::CoTaskMemFree;
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use super::base::{MAX_PASSWORD_LENGTH, MAX_USERNAME_LENGTH};
use super::dialog::{CredentialDialog, DialogKind, DialogRequest, DialogResult, OwnerWindow};
use crate::secure::decode_wide;

/// `CREDUI_MAX_USERNAME_LENGTH` for output buffers (user@domain).
const USERNAME_BUFFER_LENGTH: usize = 2 * MAX_USERNAME_LENGTH + 2;
const PASSWORD_BUFFER_LENGTH: usize = MAX_PASSWORD_LENGTH + 1;
const DOMAIN_BUFFER_LENGTH: usize = MAX_USERNAME_LENGTH + 1;

/// The CredUI dialogs.
#[derive(Debug, Default)]
pub struct NativeDialog;

impl NativeDialog {
    pub fn new() -> Self {
        NativeDialog
    }
}

fn to_wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Copy `text` into a fixed-size, NUL-terminated buffer.
fn wide_buffer(text: &str, len: usize) -> Zeroizing<Vec<u16>> {
    let mut buffer = Zeroizing::new(vec![0u16; len]);
    for (slot, unit) in buffer.iter_mut().zip(text.encode_utf16().take(len - 1)) {
        *slot = unit;
    }
    buffer
}

fn until_nul(buffer: &[u16]) -> &[u16] {
    let end = buffer.iter().position(|&u| u == 0).unwrap_or(buffer.len());
    &buffer[..end]
}

/// Store what the dialog wrote into the request's out-values.
fn commit(request: &mut DialogRequest<'_>, username: &[u16], password: &[u16]) -> DialogResult {
    let (Ok(username), Ok(password)) = (
        decode_wide("username", until_nul(username)),
        decode_wide("password", until_nul(password)),
    ) else {
        debug!("credential dialog returned text that is not valid UTF-16");
        return DialogResult::Cancelled;
    };
    let password = Zeroizing::new(password);
    *request.username = username;
    request.secret.assign(&password);
    DialogResult::Confirmed
}

/// `CREDUI_INFOW` borrowing the caption and message buffers.
fn ui_info(
    owner: OwnerWindow,
    caption: &Option<Vec<u16>>,
    message: &Option<Vec<u16>>,
) -> CREDUI_INFOW {
    CREDUI_INFOW {
        cbSize: std::mem::size_of::<CREDUI_INFOW>() as u32,
        hwndParent: HWND(owner.0 as *mut c_void),
        pszMessageText: message.as_ref().map_or(PCWSTR::null(), |m| PCWSTR::from_raw(m.as_ptr())),
        pszCaptionText: caption.as_ref().map_or(PCWSTR::null(), |c| PCWSTR::from_raw(c.as_ptr())),
        hbmBanner: HBITMAP::default(),
    }
}

/// A CoTaskMem block returned by CredUI, wiped and freed on drop.
struct CoTaskBuffer {
    ptr: *mut c_void,
    size: u32,
}

impl Drop for CoTaskBuffer {
    fn drop(&mut self) {
        if self.ptr.is_null() {
            return;
        }
        // SAFETY: `ptr` points at `size` bytes allocated by CredUI and
        // owned exclusively by this guard.
        unsafe {
            std::slice::from_raw_parts_mut(self.ptr.cast::<u8>(), self.size as usize).zeroize();
            CoTaskMemFree(Some(self.ptr.cast_const()));
        }
    }
}

impl NativeDialog {
    fn prompt_legacy(
        &self,
        mut request: DialogRequest<'_>,
        target: &str,
        flags: u32,
    ) -> DialogResult {
        let caption = request.caption.map(to_wide);
        let message = request.message.map(to_wide);
        let info = ui_info(request.owner, &caption, &message);
        let target = to_wide(target);

        let mut username = wide_buffer(request.username.as_str(), USERNAME_BUFFER_LENGTH);
        let mut password = request
            .secret
            .with_revealed(|plain| wide_buffer(plain, PASSWORD_BUFFER_LENGTH));
        let mut save = BOOL::from(*request.save_checked);

        // SAFETY: every buffer outlives the call and is sized as passed.
        let status = unsafe {
            CredUIPromptForCredentialsW(
                Some(&info as *const CREDUI_INFOW),
                PCWSTR::from_raw(target.as_ptr()),
                None,
                request.auth_error,
                username.as_mut_slice(),
                password.as_mut_slice(),
                Some(&mut save as *mut BOOL),
                CREDUI_FLAGS(flags),
            )
        };

        if status == ERROR_CANCELLED {
            return DialogResult::Cancelled;
        }
        if status != NO_ERROR {
            debug!(code = status.0, "CredUIPromptForCredentialsW failed");
            return DialogResult::Cancelled;
        }

        *request.save_checked = save.as_bool();
        commit(&mut request, &username, &password)
    }

    fn prompt_windows(&self, mut request: DialogRequest<'_>, flags: u32) -> DialogResult {
        let caption = request.caption.map(to_wide);
        let message = request.message.map(to_wide);
        let info = ui_info(request.owner, &caption, &message);

        let mut package: u32 = 0;
        let mut out = CoTaskBuffer {
            ptr: std::ptr::null_mut(),
            size: 0,
        };
        let mut save = BOOL::from(*request.save_checked);

        // SAFETY: on success `out` receives a CoTaskMem buffer that the
        // guard wipes and frees.
        let status = unsafe {
            CredUIPromptForWindowsCredentialsW(
                Some(&info as *const CREDUI_INFOW),
                request.auth_error,
                &mut package,
                None,
                0,
                &mut out.ptr,
                &mut out.size,
                Some(&mut save as *mut BOOL),
                CREDUIWIN_FLAGS(flags),
            )
        };

        if status == ERROR_CANCELLED.0 {
            return DialogResult::Cancelled;
        }
        if status != NO_ERROR.0 {
            debug!(code = status, "CredUIPromptForWindowsCredentialsW failed");
            return DialogResult::Cancelled;
        }

        let mut username = Zeroizing::new(vec![0u16; USERNAME_BUFFER_LENGTH]);
        let mut domain = Zeroizing::new(vec![0u16; DOMAIN_BUFFER_LENGTH]);
        let mut password = Zeroizing::new(vec![0u16; PASSWORD_BUFFER_LENGTH]);
        let mut username_len = USERNAME_BUFFER_LENGTH as u32;
        let mut domain_len = DOMAIN_BUFFER_LENGTH as u32;
        let mut password_len = PASSWORD_BUFFER_LENGTH as u32;

        // SAFETY: each output buffer holds as many units as its length
        // argument says.
        let unpacked = unsafe {
            CredUnPackAuthenticationBufferW(
                CRED_PACK_FLAGS(0),
                out.ptr.cast_const(),
                out.size,
                PWSTR(username.as_mut_ptr()),
                &mut username_len,
                PWSTR(domain.as_mut_ptr()),
                Some(&mut domain_len as *mut u32),
                PWSTR(password.as_mut_ptr()),
                &mut password_len,
            )
        };
        drop(out);

        if let Err(e) = unpacked {
            debug!("CredUnPackAuthenticationBufferW failed: {e}");
            return DialogResult::Cancelled;
        }

        *request.save_checked = save.as_bool();
        commit(&mut request, &username, &password)
    }
}

impl CredentialDialog for NativeDialog {
    fn prompt(&self, request: DialogRequest<'_>) -> DialogResult {
        match request.kind {
            DialogKind::Legacy { target, flags } => self.prompt_legacy(request, target, flags),
            DialogKind::Windows { flags } => self.prompt_windows(request, flags),
        }
    }
}
