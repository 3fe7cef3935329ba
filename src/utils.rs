use std::{fs, path::Path};

use tracing::warn;

/// Creates the directory that will hold `path`; failures are logged and left
/// to surface when the file itself is opened.
pub fn ensure_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        if parent.as_os_str().is_empty() {
            return;
        }
        if let Err(err) = fs::create_dir_all(parent) {
            warn!(parent = %parent.display(), %err, "failed to create parent directory");
        }
    }
}
