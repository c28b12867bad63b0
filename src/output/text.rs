//! Line-oriented text report.
//!
//! For every duplicate set:
//!
//! ```text
//! files with hash 0a1b...:
//! [root/b/b.txt root/a.txt]
//! Deleting dup root/b/b.txt
//! ```
//!
//! Members are listed in retention order (longest path first, the kept file
//! last). A `Deleting dup` line is written for every deletion candidate,
//! dry run or not.

use std::io::{self, Write};
use std::path::Path;

use crate::actions::{DeleteProgressCallback, RetentionPlan};

/// Text report writer.
#[derive(Debug)]
pub struct TextOutput<W: Write> {
    out: W,
    /// First write error seen inside a deletion callback.
    error: Option<io::Error>,
}

impl<W: Write> TextOutput<W> {
    /// Create a text report writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Write the header and member list of one duplicate set.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn write_set(&mut self, plan: &RetentionPlan) -> io::Result<()> {
        self.check()?;
        writeln!(self.out, "files with hash {}:", plan.digest_hex())?;
        writeln!(self.out, "{}", format_member_list(plan.members()))
    }

    /// Write one deletion candidate line.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn write_candidate(&mut self, path: &Path) -> io::Result<()> {
        writeln!(self.out, "Deleting dup {}", path.display())
    }

    /// Flush the writer, surfacing any error swallowed by a callback.
    ///
    /// # Errors
    ///
    /// Returns the first deferred write error, or the flush error.
    pub fn finish(&mut self) -> io::Result<()> {
        self.check()?;
        self.out.flush()
    }

    /// Return the deferred write error, if any.
    fn check(&mut self) -> io::Result<()> {
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Consume the writer and return the inner output.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DeleteProgressCallback for TextOutput<W> {
    fn on_before_delete(&mut self, path: &Path, _index: usize, _total: usize) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.write_candidate(path) {
            self.error = Some(e);
        }
    }
}

/// Bracketed, space-separated member list.
fn format_member_list<P: AsRef<Path>>(paths: &[P]) -> String {
    let joined: Vec<String> = paths
        .iter()
        .map(|p| p.as_ref().display().to_string())
        .collect();
    format!("[{}]", joined.join(" "))
}
