pub mod audio;
pub mod catalog;
pub mod settings;
pub mod text;
pub mod transcribe;
pub mod tts;
pub mod verbose;

pub use audio::{AudioDeviceInfo, RecorderConfig, RecorderSession, list_input_devices};
pub use catalog::{
    CatalogError, Credentials, MatcherConfig, PlaybackDevice, PlaybackOutcome, SpotifyClient,
    TrackMatch, find_best_match, play_best_match,
};
pub use settings::Settings;
pub use text::normalize_utterance;
pub use transcribe::Transcriber;
pub use tts::{Speaker, say_or_log};
pub use verbose::set_verbose;
