// FlagSleuth - core/export.rs
//
// CSV and JSON export of the active flag set.
// Core layer: writes to any Write trait object.

use crate::core::model::FlagSet;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Infer the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => Err(ExportError::UnknownFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Export flags to CSV format.
///
/// Writes: value, source
pub fn export_csv<W: Write>(
    flags: &FlagSet,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e: csv::Error| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["value", "source"]).map_err(csv_err)?;

    let mut count = 0;
    for flag in flags {
        csv_writer
            .write_record([flag.value.as_str(), flag.source.as_str()])
            .map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Export flags to JSON format (array of `{value, source}` objects).
pub fn export_json<W: Write>(
    flags: &FlagSet,
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(&mut writer, flags).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(flags.len())
}

/// Create `path` and write `flags` in the format implied by its extension.
pub fn export_to_file(flags: &FlagSet, path: &Path) -> Result<usize, ExportError> {
    let format = ExportFormat::from_path(path)?;
    let file = std::fs::File::create(path).map_err(|e| ExportError::Io {
        path: PathBuf::from(path),
        source: e,
    })?;
    let writer = std::io::BufWriter::new(file);

    let count = match format {
        ExportFormat::Csv => export_csv(flags, writer, path)?,
        ExportFormat::Json => export_json(flags, writer, path)?,
    };

    tracing::info!(path = %path.display(), count, ?format, "Flags exported");
    Ok(count)
}
