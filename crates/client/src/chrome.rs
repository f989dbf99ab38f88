use crate::error::{ErrorKind, Result};
use std::path::{Path, PathBuf};

/// A Chrome/Chromium executable that can be driven over the DevTools protocol.
#[derive(Debug, Clone)]
pub struct Chrome {
    path: PathBuf,
}
impl Chrome {
    /// Use an explicitly configured executable, falling back to discovery when
    /// none is given.
    pub fn new(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.is_file() => Ok(Self { path: path.to_path_buf() }),
            Some(path) => {
                tracing::warn!(path = %path.display(), "Configured Chrome executable does not exist; searching PATH");
                Self::discover()
            },
            None => Self::discover(),
        }
    }

    pub fn discover() -> Result<Self> {
        // TODO: What are the executable names on Windows? macOS?
        let executables = ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser", "chrome"];
        for exe in executables {
            if let Ok(path) = which::which(exe) {
                tracing::debug!(path = %path.display(), "Discovered Chrome executable");
                return Ok(Self { path });
            }
        }
        // Flatpak installs cannot be handed to the DevTools launcher as a
        // single executable, so they are not considered here.
        tracing::info!("Chrome executable not found in PATH");
        exn::bail!(ErrorKind::ChromeNotFound);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_explicit_path_falls_back_to_discovery() {
        let explicit = Chrome::new(Some(Path::new("/definitely/not/a/chrome/binary")));
        let discovered = Chrome::discover();
        assert_eq!(explicit.is_ok(), discovered.is_ok());
    }
}
