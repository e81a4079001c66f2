
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Shared spinner styling for long blocking child processes
pub fn get_spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("[{elapsed_precise}] {spinner:.cyan} {msg}")
        .unwrap_or_else(|_e| ProgressStyle::default_spinner())
        .tick_chars("|/-\\ ")
}

/// Starts a ticking spinner; call `finish_with_message` when the work is done
pub fn start_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner()
        .with_style(get_spinner_style())
        .with_message(message);
    spinner.enable_steady_tick(Duration::from_millis(250));
    spinner
}
