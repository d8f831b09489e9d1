//! Engine warnings with colored terminal output.
//!
//! Layout never fails on unsupported input; it falls back and reports the
//! input here instead. Deduplication keeps a property that appears on every
//! node from flooding the terminal.

use std::collections::HashSet;
use std::sync::Mutex;

/// ANSI color codes for terminal output
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about an unsupported input (prints once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("Style", "unsupported length unit 'pt' in width: 12pt");
/// ```
///
/// # Panics
/// Panics if the global warning set mutex is poisoned.
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap()
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        eprintln!("{YELLOW}[Wallaby {component}] ⚠ {message}{RESET}");
    }
}

/// Clear all recorded warnings (call between documents, and in tests)
///
/// # Panics
/// Panics if the global warning set mutex is poisoned.
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap();
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
