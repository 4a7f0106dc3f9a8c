//! Command reports, printed as text or as pretty JSON.
//!
//! Every report serializes with `success` and `result_code` so scripts can
//! branch on the JSON alone; its `Display` impl is the text form.

use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

/// Exit code for success.
pub const CODE_OK: u8 = 0;
/// Exit code for any failure other than a missing file.
pub const CODE_ERROR: u8 = 1;
/// Exit code when the requested file does not exist.
pub const CODE_NOT_FOUND: u8 = 2;

/// Prints reports in the format chosen by `--json`.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    json: bool,
}

impl Reporter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Print a successful command's report to stdout.
    pub fn emit<T: Serialize + fmt::Display>(&self, report: &T) -> Result<()> {
        let mut stdout = io::stdout().lock();
        if self.json {
            serde_json::to_writer_pretty(&mut stdout, report)?;
            writeln!(stdout)?;
        } else {
            writeln!(stdout, "{}", report)?;
        }
        Ok(())
    }

    /// Print a failure to stderr. Errors writing it are ignored.
    pub fn fail(&self, error: &anyhow::Error, result_code: u8) {
        let failure = Failure {
            success: false,
            result_code,
            error: format!("{:#}", error),
        };
        let mut stderr = io::stderr().lock();
        if self.json {
            if serde_json::to_writer_pretty(&mut stderr, &failure).is_ok() {
                let _ = writeln!(stderr);
            }
        } else {
            let _ = writeln!(stderr, "{}", failure);
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Failure {
    pub success: bool,
    pub result_code: u8,
    pub error: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)
    }
}

/// `put` report.
#[derive(Debug, Serialize)]
pub struct Stored {
    pub success: bool,
    pub result_code: u8,
    pub source: String,
    pub path: String,
}

impl Stored {
    pub fn new(source: &str, path: &str) -> Self {
        Self {
            success: true,
            result_code: CODE_OK,
            source: source.to_string(),
            path: path.to_string(),
        }
    }
}

impl fmt::Display for Stored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stored {} at {}", self.source, self.path)
    }
}

/// `rm` report.
#[derive(Debug, Serialize)]
pub struct Removed {
    pub success: bool,
    pub result_code: u8,
    pub path: String,
}

impl Removed {
    pub fn new(path: &str) -> Self {
        Self {
            success: true,
            result_code: CODE_OK,
            path: path.to_string(),
        }
    }
}

impl fmt::Display for Removed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Removed {}", self.path)
    }
}

/// `stat` report.
#[derive(Debug, Serialize)]
pub struct FileStat {
    pub success: bool,
    pub result_code: u8,
    pub path: String,
    pub size: u64,
    pub location: String,
}

impl FileStat {
    pub fn new(path: &str, size: u64, location: String) -> Self {
        Self {
            success: true,
            result_code: CODE_OK,
            path: path.to_string(),
            size,
            location,
        }
    }
}

impl fmt::Display for FileStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Path: {}", self.path)?;
        writeln!(f, "Size: {} bytes", self.size)?;
        write!(f, "Location: {}", self.location)
    }
}
