//! File-based logging - stdout would corrupt the terminal UI.

use std::fs::{create_dir_all, File};
use std::sync::Mutex;

/// Initialize tracing with a log file under `./logs/`.
pub fn init() -> color_eyre::Result<()> {
    create_dir_all("./logs")?;
    let file = File::create("./logs/youth-chat.log")?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
