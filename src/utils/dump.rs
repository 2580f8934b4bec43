use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use serde::Serialize;

/// Write any serializable report as pretty JSON.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value).map_err(io::Error::other)
}
