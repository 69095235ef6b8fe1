//! Face tracking virtual joystick application.

use anyhow::{Context, Result};
use clap::Parser;
use face_joystick::{
    app::{FaceJoystickApp, VideoSource},
    config::Config,
    output::OutputMode,
};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera index to use
    #[arg(long, default_value = "0")]
    cam: i32,

    /// Video file to process instead of a camera
    #[arg(short, long)]
    video: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Output sink (cursor, log, none); overrides the configuration file
    #[arg(short, long, value_parser = parse_output_mode)]
    output: Option<OutputMode>,

    /// Run without the display window
    #[arg(long)]
    no_gui: bool,

    /// Rotate frames 90 degrees counter-clockwise
    #[arg(long)]
    rotate: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    print_config: bool,
}

fn parse_output_mode(value: &str) -> std::result::Result<OutputMode, String> {
    value.parse().map_err(|e: face_joystick::Error| e.to_string())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));

    info!("Face Joystick v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path).with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(mode) = args.output {
        config.output.mode = mode;
    }
    if args.no_gui {
        config.display.enabled = false;
    }
    if args.rotate {
        config.display.rotate_camera = true;
    }
    config.validate().context("Invalid configuration")?;

    if args.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let video_source = match args.video {
        Some(path) => VideoSource::File(path),
        None => VideoSource::Camera(args.cam),
    };

    let mut app = FaceJoystickApp::new(config, video_source)?;
    app.run()?;

    Ok(())
}
