//! Atomic output files.
//!
//! Shared outputs are written to a temporary file in the destination directory
//! and renamed into place once complete, so readers never observe a partial file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

const TEMP_PREFIX: &str = ".dna-corpus-";

/// Directory a file will be created in (`.` for bare file names)
#[must_use]
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Create a temporary file next to `path`, creating the directory if needed.
///
/// # Errors
///
/// Returns an I/O error if the directory or file cannot be created.
pub fn temp_file_beside(path: &Path) -> io::Result<NamedTempFile> {
    let dir = parent_dir(path);
    std::fs::create_dir_all(dir)?;
    tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".tmp")
        .tempfile_in(dir)
}

/// Move a finished temporary file onto `path`.
///
/// # Errors
///
/// Returns an I/O error if the rename fails.
pub fn commit(temp: NamedTempFile, path: &Path) -> io::Result<()> {
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write `path` through `write`, replacing it only if `write` succeeds.
///
/// # Errors
///
/// Returns the closure's error, or an I/O error from creating or renaming the file.
pub fn write_atomically<E, F>(path: &Path, write: F) -> Result<(), E>
where
    E: From<io::Error>,
    F: FnOnce(&mut dyn Write) -> Result<(), E>,
{
    let temp = temp_file_beside(path)?;
    {
        let file: &File = temp.as_file();
        let mut writer = BufWriter::new(file);
        write(&mut writer)?;
        writer.flush()?;
    }
    commit(temp, path)?;
    Ok(())
}
