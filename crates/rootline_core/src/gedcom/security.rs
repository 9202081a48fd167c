//! Pre-parse security and resource validation for uploaded GEDCOM files.
//!
//! # Responsibility
//! - Reject oversized, malformed-header, over-limit or suspicious
//!   files before any parsing or persistence happens.
//!
//! # Invariants
//! - Checks run in a fixed order and short-circuit on first failure.
//! - Rejections log file metadata only (size, declared name, failing
//!   check), never file content.
//! - The content blocklist is best-effort pattern matching, not a
//!   complete injection defense.

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::Path;

/// Upper bound on accepted file size.
pub const MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;
/// Upper bound on `INDI` records per file.
pub const MAX_INDIVIDUALS: u32 = 10_000;
/// Upper bound on `FAM` records per file.
pub const MAX_FAMILIES: u32 = 5_000;

/// How many lines after `0 HEAD` may separate it from its
/// `SOUR`/`GEDC` block.
const HEADER_LOOKAHEAD_LINES: usize = 10;

static RECORD_OPEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^0\s+@[^@]+@\s+(INDI|FAM)\s*$").expect("valid record-open regex")
});
static BLOCKLIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(<script|<\?php|file://|http://|ftp://)").expect("valid blocklist regex")
});

/// Raw upload handed to the engine: text plus declared metadata.
///
/// The declared filename is caller-supplied display metadata; it is
/// logged and audited but never dereferenced.
#[derive(Debug, Clone)]
pub struct GedcomSource {
    text: String,
    filename: String,
    byte_len: u64,
}

impl GedcomSource {
    /// Wraps already-read text, e.g. from an upload buffer.
    pub fn from_text(text: impl Into<String>, filename: impl Into<String>) -> Self {
        let text = text.into();
        let byte_len = text.len() as u64;
        Self {
            text,
            filename: filename.into(),
            byte_len,
        }
    }

    /// Reads a file from disk, keeping its on-disk size as the
    /// declared byte length.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let byte_len = fs::metadata(path)?.len();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        // Oversized files are never read into memory; the validator
        // rejects them by the declared byte length.
        let text = if byte_len > MAX_FILE_BYTES {
            String::new()
        } else {
            fs::read_to_string(path)?
        };
        Ok(Self {
            text,
            filename,
            byte_len,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }
}

/// Fatal validation rejection. Nothing is persisted after any of
/// these; the whole run fails with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityViolation {
    OversizedFile { bytes: u64, limit: u64 },
    /// First non-empty line is not `0 HEAD`, or no `SOUR`/`GEDC`
    /// block follows within the lookahead window.
    InvalidHeader,
    TooManyIndividuals { count: u32, limit: u32 },
    TooManyFamilies { count: u32, limit: u32 },
    /// A blocklisted substring was found in the raw text.
    SuspiciousContent { pattern: String },
}

impl SecurityViolation {
    /// Stable name of the failing check, for logging and audit events.
    pub fn check_name(&self) -> &'static str {
        match self {
            Self::OversizedFile { .. } => "file_size",
            Self::InvalidHeader => "gedcom_header",
            Self::TooManyIndividuals { .. } => "individual_count",
            Self::TooManyFamilies { .. } => "family_count",
            Self::SuspiciousContent { .. } => "content_blocklist",
        }
    }
}

impl Display for SecurityViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OversizedFile { bytes, limit } => {
                write!(f, "file is {bytes} bytes, limit is {limit}")
            }
            Self::InvalidHeader => write!(f, "file does not start with a valid GEDCOM header"),
            Self::TooManyIndividuals { count, limit } => {
                write!(f, "file declares {count} individuals, limit is {limit}")
            }
            Self::TooManyFamilies { count, limit } => {
                write!(f, "file declares {count} families, limit is {limit}")
            }
            Self::SuspiciousContent { pattern } => {
                write!(f, "file contains disallowed content pattern `{pattern}`")
            }
        }
    }
}

impl Error for SecurityViolation {}

/// Runs all pre-parse checks in order, short-circuiting on the first
/// failure. Rejections are logged with metadata only.
pub fn validate(source: &GedcomSource) -> Result<(), SecurityViolation> {
    let result = run_checks(source);
    if let Err(violation) = &result {
        warn!(
            "event=security_reject module=gedcom status=error check={} size_bytes={} filename={}",
            violation.check_name(),
            source.byte_len(),
            source.filename()
        );
    }
    result
}

fn run_checks(source: &GedcomSource) -> Result<(), SecurityViolation> {
    if source.byte_len() > MAX_FILE_BYTES {
        return Err(SecurityViolation::OversizedFile {
            bytes: source.byte_len(),
            limit: MAX_FILE_BYTES,
        });
    }

    check_header(source.text())?;
    check_record_counts(source.text())?;
    check_blocklist(source.text())?;

    Ok(())
}

fn check_header(text: &str) -> Result<(), SecurityViolation> {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

    let Some(first) = lines.next() else {
        return Err(SecurityViolation::InvalidHeader);
    };
    if first != "0 HEAD" {
        return Err(SecurityViolation::InvalidHeader);
    }

    let has_header_block = lines
        .take(HEADER_LOOKAHEAD_LINES)
        .any(|line| line.starts_with("1 SOUR") || line.starts_with("1 GEDC"));
    if !has_header_block {
        return Err(SecurityViolation::InvalidHeader);
    }

    Ok(())
}

/// Cheap pre-scan for record counts, without building the document.
fn check_record_counts(text: &str) -> Result<(), SecurityViolation> {
    let mut individuals: u32 = 0;
    let mut families: u32 = 0;
    for caps in RECORD_OPEN_RE.captures_iter(text) {
        match &caps[1] {
            "INDI" => individuals += 1,
            _ => families += 1,
        }
    }

    if individuals > MAX_INDIVIDUALS {
        return Err(SecurityViolation::TooManyIndividuals {
            count: individuals,
            limit: MAX_INDIVIDUALS,
        });
    }
    if families > MAX_FAMILIES {
        return Err(SecurityViolation::TooManyFamilies {
            count: families,
            limit: MAX_FAMILIES,
        });
    }

    Ok(())
}

fn check_blocklist(text: &str) -> Result<(), SecurityViolation> {
    if let Some(found) = BLOCKLIST_RE.find(text) {
        return Err(SecurityViolation::SuspiciousContent {
            pattern: found.as_str().to_ascii_lowercase(),
        });
    }
    Ok(())
}
