//! Last-used wallet record.
//!
//! A one-line text file holding the path of the wallet that was opened most recently.
//! A missing record, a blank line or a path that no longer names a file all read as
//! "nothing remembered".

use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use tracing::{debug, warn};

/// Rewrites both `/` and `\` as the platform separator.
#[must_use]
pub fn normalize_separators(raw: &str) -> PathBuf {
    let normalized: String = raw
        .chars()
        .map(|c| if c == '/' || c == '\\' { MAIN_SEPARATOR } else { c })
        .collect();
    PathBuf::from(normalized)
}

/// Reads the remembered wallet path, if it still points at an existing file.
#[must_use]
pub fn read_last_path(record: &Path) -> Option<PathBuf> {
    let contents = match std::fs::read_to_string(record) {
        Ok(contents) => contents,
        Err(e) => {
            debug!("No last wallet recorded in {}: {}", record.display(), e);
            return None;
        }
    };

    let line = contents.lines().next().map(str::trim).unwrap_or_default();
    if line.is_empty() {
        return None;
    }

    let path = normalize_separators(line);
    if path.is_file() {
        Some(path)
    } else {
        warn!("Ignoring remembered wallet {}: not a file", path.display());
        None
    }
}

/// Records `wallet` as the last wallet opened, creating the record's directory.
pub fn remember_path(record: &Path, wallet: &Path) -> std::io::Result<()> {
    if let Some(dir) = record.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(record, format!("{}\n", wallet.display()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_missing_record_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_last_path(&dir.path().join("nope.txt")), None);
    }

    #[test]
    fn test_blank_and_directory_entries_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let record = dir.path().join("last_path.txt");

        std::fs::write(&record, "   \n").unwrap();
        assert_eq!(read_last_path(&record), None);

        remember_path(&record, dir.path()).unwrap();
        assert_eq!(read_last_path(&record), None);

        remember_path(&record, &dir.path().join("deleted.db")).unwrap();
        assert_eq!(read_last_path(&record), None);
    }

    #[test]
    fn test_remember_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let record = dir.path().join("config").join("last_path.txt");
        let wallet = dir.path().join("Movements.db");
        std::fs::write(&wallet, b"").unwrap();

        remember_path(&record, &wallet).unwrap();
        assert_eq!(read_last_path(&record), Some(wallet));
    }

    #[test]
    fn test_separators_are_normalized() {
        let expected: PathBuf = ["data", "wallets", "home.db"].iter().collect();
        assert_eq!(normalize_separators("data\\wallets/home.db"), expected);
    }
}
