//! Recursive vendor-asset copying, shaped like any other step result.
//!
//! Unlike the subprocess steps this one runs in-process, but its outcome is
//! folded into the same `ExecutionResult` form so the renderer needs no
//! special case.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::exec::{ExecutionResult, ProcessStatus};

/// Counts of entries written to the destination tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyStats {
    pub files: u64,
    pub dirs: u64,
}

/// Copy `source` into `dest` recursively.
///
/// Directories are created as needed carrying the source directory's
/// permission bits; regular files are copied byte-for-byte. Symlinks and
/// special files are skipped. Fails on the first entry that cannot be
/// copied, preserving the OS error message and classification.
pub fn copy_tree(source: &Path, dest: &Path) -> Result<CopyStats> {
    if !source.is_dir() {
        return Err(Error::copy_failed(
            source.display().to_string(),
            "source directory does not exist",
            kind_label(io::ErrorKind::NotFound),
        ));
    }

    let mut stats = CopyStats::default();
    copy_dir(source, dest, &mut stats)?;
    Ok(stats)
}

fn copy_dir(source: &Path, dest: &Path, stats: &mut CopyStats) -> Result<()> {
    let metadata = fs::metadata(source).map_err(|e| io_copy_error(source, &e))?;

    fs::create_dir_all(dest).map_err(|e| io_copy_error(dest, &e))?;
    fs::set_permissions(dest, metadata.permissions()).map_err(|e| io_copy_error(dest, &e))?;
    stats.dirs += 1;

    let entries = fs::read_dir(source).map_err(|e| io_copy_error(source, &e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_copy_error(source, &e))?;
        let path = entry.path();
        let target = dest.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| io_copy_error(&path, &e))?;

        if file_type.is_dir() {
            copy_dir(&path, &target, stats)?;
        } else if file_type.is_file() {
            fs::copy(&path, &target).map_err(|e| io_copy_error(&path, &e))?;
            stats.files += 1;
        }
    }

    Ok(())
}

fn io_copy_error(path: &Path, err: &io::Error) -> Error {
    Error::copy_failed(
        path.display().to_string(),
        err.to_string(),
        kind_label(err.kind()),
    )
}

fn kind_label(kind: io::ErrorKind) -> String {
    format!("{:?}", kind)
}

/// Run the copy as a step, folding failures into the execution-result shape.
///
/// Success is exit code 0 with a one-line summary on stdout; failure is exit
/// code 1 with the copy error on stderr. Timing spans the whole traversal.
pub fn run_copy(source: &Path, dest: &Path) -> ExecutionResult {
    let command_line = format!("copy-vendor-assets {} {}", source.display(), dest.display());
    let start = Instant::now();

    match copy_tree(source, dest) {
        Ok(stats) => {
            log_status!(
                "copy",
                "Copied {} files to {}",
                stats.files,
                dest.display()
            );
            ExecutionResult {
                command_line,
                stdout_lines: vec![format!(
                    "copied {} files, {} directories",
                    stats.files, stats.dirs
                )],
                stderr_lines: Vec::new(),
                duration_secs: start.elapsed().as_secs_f64(),
                status: ProcessStatus::Exited { code: 0 },
            }
        }
        Err(err) => ExecutionResult {
            command_line,
            stdout_lines: Vec::new(),
            stderr_lines: vec![err.to_string()],
            duration_secs: start.elapsed().as_secs_f64(),
            status: ProcessStatus::Exited { code: 1 },
        },
    }
}
