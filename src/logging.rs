//! Opt-in file log. The terminal belongs to the UI, so nothing is printed to stdout.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

static ENABLED: AtomicBool = AtomicBool::new(false);

static LOG_FILE: Mutex<Option<std::fs::File>> = Mutex::new(None);

/// Open (truncate) the log file and start logging.
pub fn init_log_file(path: &Path) -> std::io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    if let Ok(mut slot) = LOG_FILE.lock() {
        *slot = Some(file);
        ENABLED.store(true, Ordering::Relaxed);
    }
    Ok(())
}

/// Stop logging and close the file.
#[cfg(test)]
pub fn reset() {
    ENABLED.store(false, Ordering::Relaxed);
    if let Ok(mut slot) = LOG_FILE.lock() {
        *slot = None;
    }
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Append one line; write errors are ignored.
pub fn write_log(message: &str) {
    if let Ok(mut slot) = LOG_FILE.lock() {
        if let Some(ref mut file) = *slot {
            let _ = writeln!(file, "{}", message);
            let _ = file.flush();
        }
    }
}

/// Formats and logs only when a log file is open.
#[macro_export]
macro_rules! vlog {
    ($($arg:tt)*) => {
        if $crate::logging::is_enabled() {
            $crate::logging::write_log(&format!($($arg)*));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_receives_lines() {
        let path = std::env::temp_dir().join(format!("collapsetui-log-{}.log", std::process::id()));
        init_log_file(&path).unwrap();
        assert!(is_enabled());
        crate::vlog!("resolve ({},{})", 3, 4);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("resolve (3,4)"));

        reset();
        assert!(!is_enabled());
        crate::vlog!("after reset");
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("after reset"));
        let _ = std::fs::remove_file(path);
    }
}
