//! `strew [preset.toml]`: open the scatter viewer.

use std::path::PathBuf;
use std::process::ExitCode;

use strew::Viewer;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut builder = Viewer::builder();
    if let Some(preset) = std::env::args_os().nth(1) {
        builder = builder.with_preset(PathBuf::from(preset));
    }

    match builder.build().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
