//! Audio input device enumeration.
//!
//! cpal is only used to discover devices; actual capture goes through the
//! FFmpeg child in [`super::recorder`]. The name reported here is what gets
//! handed to FFmpeg's platform demuxer as the input device.

use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait};

/// A microphone visible to the system.
#[derive(Debug, Clone)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub is_default: bool,
}

#[cfg(target_os = "linux")]
mod alsa_suppress {
    use std::os::raw::{c_char, c_int};
    use std::sync::Once;

    // ALSA's handler is variadic, but a handler that ignores every argument
    // is ABI-compatible with this simpler signature.
    type SndLibErrorHandlerT =
        unsafe extern "C" fn(*const c_char, c_int, *const c_char, c_int, *const c_char);

    #[link(name = "asound")]
    unsafe extern "C" {
        fn snd_lib_error_set_handler(handler: Option<SndLibErrorHandlerT>) -> c_int;
    }

    unsafe extern "C" fn silent_error_handler(
        _file: *const c_char,
        _line: c_int,
        _function: *const c_char,
        _err: c_int,
        _fmt: *const c_char,
    ) {
    }

    static INIT: Once = Once::new();

    /// Silence ALSA's complaints about unavailable PCM plugins during
    /// enumeration. Purely cosmetic; enumeration works without it.
    pub fn init() {
        INIT.call_once(|| {
            // SAFETY: the handler is a valid no-op function for the
            // lifetime of the process.
            unsafe {
                snd_lib_error_set_handler(Some(silent_error_handler));
            }
        });
    }
}

#[cfg(not(target_os = "linux"))]
mod alsa_suppress {
    pub fn init() {}
}

/// List all audio input devices, flagging the system default.
///
/// # Errors
/// Returns an error if no input devices are found.
pub fn list_input_devices() -> Result<Vec<AudioDeviceInfo>> {
    alsa_suppress::init();

    let host = cpal::default_host();
    let default_name = host
        .default_input_device()
        .and_then(|d| d.description().ok())
        .map(|d| d.to_string());

    let mut devices = Vec::new();
    for device in host.input_devices()? {
        if let Ok(desc) = device.description() {
            let name = desc.to_string();
            devices.push(AudioDeviceInfo {
                is_default: default_name.as_ref() == Some(&name),
                name,
            });
        }
    }

    if devices.is_empty() {
        anyhow::bail!("No audio input devices found");
    }

    Ok(devices)
}
