// ── On-disk session storage ──
//
// One TOML file per profile under the data dir. The file carries the
// backend cookie, so it is created owner-only on unix and removed
// outright when the session is cleared. The file only caches what the
// backend owns: one that no longer parses is dropped, not fatal.

use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use vigil_core::{CoreError, SessionSlots, SessionStorage};

use crate::data_dir;

fn storage_err(action: &str, path: &Path, err: impl std::fmt::Display) -> CoreError {
    CoreError::Storage {
        message: format!("failed to {action} {}: {err}", path.display()),
    }
}

/// File-backed [`SessionStorage`].
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/sessions/<profile>.toml`. Characters outside
    /// `[A-Za-z0-9_-]` are written as `%XX` bytes, so distinct profile
    /// names never share a file.
    pub fn for_profile(profile_name: &str) -> Self {
        Self::new(
            data_dir()
                .join("sessions")
                .join(format!("{}.toml", file_stem(profile_name))),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write to a sibling temp file, then rename over the real one.
    fn write(&self, contents: &str) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| storage_err("create", parent, e))?;
        }
        let tmp = self.path.with_extension("toml.tmp");
        let mut file = owner_only()
            .open(&tmp)
            .map_err(|e| storage_err("create", &tmp, e))?;
        file.write_all(contents.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| storage_err("write", &tmp, e))?;
        drop(file);
        fs::rename(&tmp, &self.path).map_err(|e| storage_err("replace", &self.path, e))
    }

    fn discard(&self) -> Result<(), CoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_err("remove", &self.path, e)),
        }
    }
}

fn file_stem(profile_name: &str) -> String {
    let mut stem = String::with_capacity(profile_name.len());
    for byte in profile_name.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(char::from(byte));
        } else {
            let _ = write!(stem, "%{byte:02X}");
        }
    }
    stem
}

#[cfg(unix)]
fn owner_only() -> OpenOptions {
    use std::os::unix::fs::OpenOptionsExt;
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true).mode(0o600);
    options
}

#[cfg(not(unix))]
fn owner_only() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    options
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<SessionSlots, CoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                trace!(path = %self.path.display(), "session file read");
                match toml::from_str(&raw) {
                    Ok(slots) => Ok(slots),
                    Err(e) => {
                        warn!(path = %self.path.display(), error = %e, "unreadable session file, starting logged out");
                        self.discard()?;
                        Ok(SessionSlots::default())
                    }
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(SessionSlots::default()),
            Err(e) => Err(storage_err("read", &self.path, e)),
        }
    }

    fn store(&self, slots: &SessionSlots) -> Result<(), CoreError> {
        if *slots == SessionSlots::default() {
            debug!(path = %self.path.display(), "removing session file");
            return self.discard();
        }
        let contents =
            toml::to_string_pretty(slots).map_err(|e| storage_err("serialize", &self.path, e))?;
        self.write(&contents)
    }
}
