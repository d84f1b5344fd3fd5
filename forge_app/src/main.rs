//! Forge bootstrap application
//!
//! Usage: `forge [CONFIG]` where `CONFIG` is an optional `.toml` or `.ron`
//! file. Opens a window, brings up Vulkan and runs until the window closes
//! or Escape is pressed.

use std::error::Error;
use std::process::ExitCode;
use std::rc::Rc;

use forge_gfx::config::Config;
use forge_gfx::core::ApplicationConfig;
use forge_gfx::foundation::logging;
use forge_gfx::platform::GlfwToolkit;
use forge_gfx::render::vulkan::AshBackend;
use forge_gfx::Application;

fn main() -> ExitCode {
    let config = match std::env::args_os().nth(1) {
        Some(path) => ApplicationConfig::load_from_file(&path)
            .map_err(|e| format!("Failed to load {}: {e}", path.to_string_lossy())),
        None => Ok(ApplicationConfig::default()),
    };

    let level = config.as_ref().map_or("info", |c| c.log_level.as_str());
    logging::init_with_level(level);

    let result = config.map_err(Into::into).and_then(run);
    match result {
        Ok(()) => {
            log::info!("Forge exited cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log_error_chain(e.as_ref());
            ExitCode::FAILURE
        }
    }
}

fn run(config: ApplicationConfig) -> Result<(), Box<dyn Error>> {
    log::info!("Starting Forge");

    let backend = Rc::new(AshBackend::load()?);
    let toolkit = Rc::new(GlfwToolkit::new());
    let mut app = Application::new(config, backend, toolkit)?;
    app.run()?;
    Ok(())
}

fn log_error_chain(error: &dyn Error) {
    log::error!("{error}");
    let mut source = error.source();
    while let Some(cause) = source {
        log::error!("  caused by: {cause}");
        source = cause.source();
    }
}
