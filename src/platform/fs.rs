// FlagSleuth - platform/fs.rs
//
// Loading analysis result files from disk.
// Large files are memory-mapped; everything else is read into a buffer.

use crate::core::model::AnalysisResult;
use crate::util::constants::{LARGE_RESULT_THRESHOLD, MAX_RESULT_FILE_SIZE};
use crate::util::error::LoadError;
use serde_json::Value;
use std::path::Path;

/// Read and parse an analysis result JSON file.
///
/// The root must be a JSON object. Files above `MAX_RESULT_FILE_SIZE` are
/// rejected before any content is read.
pub fn read_result(path: &Path) -> Result<AnalysisResult, LoadError> {
    read_result_with_limit(path, MAX_RESULT_FILE_SIZE)
}

/// As `read_result`, with an explicit size limit.
pub fn read_result_with_limit(path: &Path, max_size: u64) -> Result<AnalysisResult, LoadError> {
    let io_err = |e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    let size = std::fs::metadata(path).map_err(io_err)?.len();
    if size > max_size {
        return Err(LoadError::TooLarge {
            path: path.to_path_buf(),
            size,
            max_size,
        });
    }

    let value: Value = if size >= LARGE_RESULT_THRESHOLD {
        tracing::debug!(path = %path.display(), size_mb = size / (1024 * 1024), "Memory-mapping large result");
        let file = std::fs::File::open(path).map_err(io_err)?;
        // SAFETY: the map is read-only and dropped before returning. External
        // modification while mapped is an accepted risk for files that are
        // already fully written by the analysis backend.
        let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(io_err)?;
        parse(path, &mmap)?
    } else {
        let bytes = std::fs::read(path).map_err(io_err)?;
        parse(path, &bytes)?
    };

    if !value.is_object() {
        return Err(LoadError::NotAnObject {
            path: path.to_path_buf(),
        });
    }

    tracing::info!(path = %path.display(), size, "Analysis result loaded");
    Ok(AnalysisResult::new(value))
}

fn parse(path: &Path, bytes: &[u8]) -> Result<Value, LoadError> {
    serde_json::from_slice(bytes).map_err(|e| LoadError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}
