//! Atomic env-file writer.
//!
//! ## Write protocol
//!
//! 1. Render the snapshot as `KEY=value` lines (quoting where needed).
//! 2. Write to `<path>.flagsync.tmp` and flush to durable storage.
//! 3. Restrict permissions to owner read/write (unix only).
//! 4. Rename to the final path — atomic on POSIX, so no reader ever observes
//!    a truncated or half-written file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flagsync_core::Snapshot;

use crate::error::{io_err, SyncError};

/// Render a snapshot in shell-sourceable env format, one `KEY=value` line per
/// entry, in snapshot order.
pub fn render_env(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    for (key, value) in snapshot.iter() {
        out.push_str(key.as_str());
        out.push('=');
        if needs_quoting(value) {
            out.push('"');
            for c in value.chars() {
                if matches!(c, '\\' | '"' | '$' | '`') {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
        } else {
            out.push_str(value);
        }
        out.push('\n');
    }
    out
}

/// Characters safe in an unquoted shell-style assignment value.
fn needs_quoting(value: &str) -> bool {
    !value.chars().all(|c| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':' | '@' | '+' | '%' | ',')
    })
}

/// Atomically replace `path` with the rendered snapshot.
pub fn write_env_file(path: &Path, snapshot: &Snapshot) -> Result<(), SyncError> {
    let content = render_env(snapshot);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
    }

    let tmp = PathBuf::from(format!("{}.flagsync.tmp", path.display()));
    write_durably(&tmp, &content).map_err(|e| io_err(&tmp, e))?;
    restrict_permissions(&tmp);

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote {} with {} key(s)", path.display(), snapshot.len());
    Ok(())
}

fn write_durably(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(err) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::debug!("could not set permissions to 600 for {}: {err}", path.display());
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
