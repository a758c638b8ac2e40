//! Microphone capture: device enumeration via cpal, recording via a
//! supervised FFmpeg child process.

pub mod devices;
pub mod recorder;

pub use devices::{AudioDeviceInfo, list_input_devices};
pub use recorder::{RecorderConfig, RecorderSession};
