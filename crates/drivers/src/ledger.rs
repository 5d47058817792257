//! Append-only record of every statement a client executed.
//!
//! Each entry is the statement on its own line followed by the raw result
//! payload, one `-- ` prefixed line per payload line. The file is therefore
//! still a valid SQL script that replays the session.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tpcc_core::QueryResult;

pub struct Ledger {
    path: PathBuf,
    out: BufWriter<File>,
}

impl Ledger {
    /// Open the ledger at `path` for appending, creating it and its parent
    /// directories as needed. Entries of earlier sessions are kept.
    ///
    /// # Errors
    ///
    /// Propagates file-system errors.
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let out = BufWriter::new(file);
        Ok(Self { path, out })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one statement and its result.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn record(&mut self, sql: &str, result: &QueryResult) -> io::Result<()> {
        writeln!(self.out, "{}", sql.trim_end())?;
        writeln!(self.out, "-- {}", result.state())?;
        for line in result.raw().lines() {
            writeln!(self.out, "-- {line}")?;
        }
        self.out.flush()
    }
}
