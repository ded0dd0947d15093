//! Destinations for harvested records.
//!
//! Records go either to standard output or to a file. A file target is
//! renamed once the harvest completes so that its name records how many
//! records it holds: harvesting 7 records into `gabs.jsonl` leaves behind
//! `gabs.jsonl_gabCount_7`.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};

const COUNT_SUFFIX: &str = "_gabCount_";

/// Where harvested records are written.
#[derive(Debug)]
pub enum OutputTarget {
    /// The process's standard output.
    Stdout(Stdout),

    /// A file that is still being written.
    File {
        /// Path the file was opened at.
        path: PathBuf,
        /// Buffered handle to the open file.
        writer: BufWriter<File>,
    },
}

impl OutputTarget {
    /// Writes to standard output.
    pub fn stdout() -> Self {
        OutputTarget::Stdout(io::stdout())
    }

    /// Creates (or truncates) the file at `path` and writes to it.
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let writer = BufWriter::new(File::create(&path)?);
        Ok(OutputTarget::File { path, writer })
    }

    /// Writes to `path` if given, otherwise to standard output.
    pub fn open(path: Option<&Path>) -> io::Result<Self> {
        match path {
            Some(path) => Self::create(path),
            None => Ok(Self::stdout()),
        }
    }

    /// Closes the target, recording how many records were written.
    ///
    /// A file target is flushed, closed, and renamed to
    /// [`finalized_path`]; the new path is returned. Standard output is
    /// only flushed, and `None` is returned.
    pub fn finalize(self, count: usize) -> io::Result<Option<PathBuf>> {
        match self {
            OutputTarget::Stdout(mut stdout) => {
                stdout.flush()?;
                Ok(None)
            }
            OutputTarget::File { path, writer } => {
                let file = writer.into_inner().map_err(|e| e.into_error())?;
                file.sync_all()?;
                drop(file);
                let finalized = finalized_path(&path, count);
                fs::rename(&path, &finalized)?;
                Ok(Some(finalized))
            }
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(stdout) => stdout.write(buf),
            OutputTarget::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(stdout) => stdout.flush(),
            OutputTarget::File { writer, .. } => writer.flush(),
        }
    }
}

/// The name a file target receives once `count` records have been written.
///
/// # Examples
///
/// ```
/// use garc::output::finalized_path;
/// use std::path::{Path, PathBuf};
/// let path = finalized_path(Path::new("out/gabs.jsonl"), 7);
/// assert_eq!(path, PathBuf::from("out/gabs.jsonl_gabCount_7"));
/// ```
pub fn finalized_path(path: &Path, count: usize) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!("{COUNT_SUFFIX}{count}"));
    PathBuf::from(name)
}
