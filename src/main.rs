//! Contact Form - terminal front end
//!
//! Main entry point for the interactive contact form.
//!
//! # Overview
//!
//! This binary wires the library's [`FormController`] to a line-oriented terminal UI.
//! It initializes:
//! - Configuration loading ([`ConfigManager`])
//! - Logging infrastructure (daily file rotation + optional console output)
//! - A single-threaded tokio runtime running the form event loop
//! - A stdin reader thread that turns commands into [`FormEvent`](contact_form::FormEvent)s
//!
//! # Execution Flow
//!
//! 1. Load `Contact Form Data/Contact Form.yaml` (defaults if missing, env overrides applied)
//! 2. Initialize logging → `<log_dir>/contact-form.<date>`
//! 3. Build the controller with the in-memory field source, simulated endpoint,
//!    banner board and terminal confirmation prompt
//! 4. Spawn the input thread and run the event loop until `quit` or end of input
//! 5. Log a metrics summary

use anyhow::{Context, Result};
use contact_form::services::{BannerBoard, SimulatedEndpoint};
use contact_form::ui::terminal::{self, HELP};
use contact_form::ui::{MemoryFieldSource, event_channel, run_event_loop};
use contact_form::{APP_NAME, ConfigManager, FormController, VERSION};
use std::sync::Arc;

fn main() -> Result<()> {
    let config_manager = ConfigManager::new("Contact Form Data")?;
    let config = config_manager.load_form_config()?;
    let settings = &config.settings;

    let _log_guard = contact_form::logging::setup_logging_with_console(
        &settings.log_dir,
        "contact-form",
        settings.debug_mode,
        settings.debug_mode,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    tracing::info!(
        "Loaded form configuration from {} ({} fields)",
        config_manager.form_config_path(),
        config.fields.len()
    );

    // The controller is not Send; everything async runs on this thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    let source = Arc::new(MemoryFieldSource::new(config.fields.keys()).with_echo(true));
    let (prompt, prompt_link) = terminal::terminal_prompt();

    let controller = FormController::new(
        &config,
        Arc::clone(&source),
        SimulatedEndpoint::from_settings(&settings.endpoint),
        BannerBoard::from_settings(&settings.notifications).with_echo(true),
        prompt,
    )
    .context("Invalid field rules in form configuration")?;

    let (tx, rx) = event_channel();

    println!("{} v{}", APP_NAME, VERSION);
    println!("{}", HELP);
    println!("{}", terminal::render_form(&source));

    let input = terminal::spawn_input_thread(Arc::clone(&source), tx, prompt_link)
        .context("Failed to spawn input thread")?;

    let submissions = runtime.block_on(run_event_loop(&controller, rx));
    tracing::info!("Event loop finished after {} submit requests", submissions);

    if input.join().is_err() {
        tracing::error!("Input thread panicked");
    }

    controller.metrics().log_summary();
    tracing::info!("Application shutdown complete");

    Ok(())
}
