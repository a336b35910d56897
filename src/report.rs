//! Non-fatal build diagnostics.
//!
//! The reporter is the sink for conditions that exclude a file from the
//! build without failing it (unrecognized extensions, absent metadata).
//! It is never consulted for control flow.

/// Sink for informational diagnostics emitted during a build.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    verbose: bool,
}

impl Reporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Report a non-fatal diagnostic.
    pub fn log(&self, message: impl AsRef<str>) {
        eprintln!("{}", message.as_ref());
    }

    /// Report a diagnostic only when verbose output is enabled.
    pub fn verbose(&self, message: impl AsRef<str>) {
        if self.verbose {
            self.log(message);
        }
    }
}
