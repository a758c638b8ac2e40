//! List capture and playback devices.

use anyhow::Result;
use cue_core::{Settings, SpotifyClient, list_input_devices};

pub fn run(settings: &Settings) -> Result<()> {
    println!("Audio inputs:");
    match list_input_devices() {
        Ok(devices) => {
            for device in devices {
                let marker = if device.is_default { " (default)" } else { "" };
                println!("  {}{marker}", device.name);
            }
        }
        Err(e) => println!("  unavailable: {e:#}"),
    }

    match settings.resolved_credentials() {
        Some(creds) => {
            let mut client = SpotifyClient::new(creds)?;
            println!("\nPlayback devices:");
            let devices = client.devices()?;
            if devices.is_empty() {
                println!("  none — open your player on some device first");
            }
            for device in devices {
                let marker = if device.is_active { " (active)" } else { "" };
                println!("  {}{marker}", device.name);
            }
        }
        None => {
            println!("\nPlayback devices: skipped (Spotify credentials not configured)");
        }
    }

    Ok(())
}
