pub mod daily_kpi_csv_file;

use std::{fs, io, io::Write, path::Path};

pub use daily_kpi_csv_file::DailyKpiCsvFileSink;

/// Replaces `path` with `bytes` via a temporary file in the same directory.
///
/// Missing parent directories are created. On failure the temporary file is
/// removed and any previous contents of `path` are left as they were.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
