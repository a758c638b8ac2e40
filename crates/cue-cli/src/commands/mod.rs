pub mod config;
pub mod devices;
pub mod listen;
pub mod play;
pub mod transcribe;
