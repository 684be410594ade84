//! Filesystem helpers shared by persistence and configuration
//!
//! - `replace_file`: write a uniquely named sibling, then rename it over the target
//! - `config_base_dir`: platform-appropriate directory for `config.toml`

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};

/// Uniquely named temp file next to `path` (`out/.App.psym.XXXXXX.tmp`)
fn temp_sibling(path: &Path) -> io::Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let prefix = match path.file_name() {
        Some(name) => format!(".{}.", name.to_string_lossy()),
        None => ".".to_string(),
    };
    Builder::new().prefix(&prefix).suffix(".tmp").tempfile_in(dir)
}

/// Replace the contents of `path` with `contents`.
///
/// The data goes to a fresh temporary sibling first, so a failed write never
/// leaves a truncated target behind and no existing file is ever reused as
/// scratch space. The rename replaces the target on every platform; the
/// temporary file is removed when anything fails.
pub fn replace_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut temp = temp_sibling(path)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Get platform-appropriate configuration directory.
///
/// - **Windows**: `%APPDATA%\symweave`
/// - **Unix**: `$XDG_CONFIG_HOME/symweave` or `~/.config/symweave`
/// - **Fallback**: System temp directory + `symweave`
pub fn config_base_dir() -> PathBuf {
    #[cfg(not(windows))]
    {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            if !xdg_config.is_empty() {
                return PathBuf::from(xdg_config).join("symweave");
            }
        }
        if let Some(home) = dirs::home_dir() {
            return home.join(".config").join("symweave");
        }
    }

    #[cfg(windows)]
    {
        if let Some(config) = dirs::config_dir() {
            return config.join("symweave");
        }
    }

    std::env::temp_dir().join("symweave")
}
