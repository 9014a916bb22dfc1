use clap::Parser;

use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use bubblewall::{
    config::{Args, Settings},
    modes,
};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();

    let settings = match Settings::from_args(&args) {
        Ok(settings) => settings,
        Err(err) => {
            error!(%err, "invalid settings");
            std::process::exit(1);
        }
    };

    info!(
        width = settings.width,
        height = settings.height,
        style = ?settings.style,
        "starting"
    );

    if let Err(err) = modes::run(settings) {
        error!(%err, "bubblewall stopped");
        std::process::exit(1);
    }
}
