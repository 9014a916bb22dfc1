//! Hosts that own a real surface and turn platform input into engine events.

#[cfg(feature = "terminal")]
pub mod console_mode;

pub mod windowed_mode;

use crate::{config::Settings, error::HostError};

/// Runs the host the settings ask for until the user quits.
pub fn run(settings: Settings) -> Result<(), HostError> {
    if settings.terminal {
        #[cfg(feature = "terminal")]
        return console_mode::con_main(settings);

        #[cfg(not(feature = "terminal"))]
        tracing::warn!("built without the `terminal` feature, opening a window instead");
    }

    windowed_mode::winit_main(settings)
}
