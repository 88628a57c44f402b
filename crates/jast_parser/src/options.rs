//! Parser configuration.

use serde::Deserialize;

/// Options recognised by every parsing entry point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    /// Skip unprocessable characters and return the lexical errors alongside
    /// the tree instead of failing.
    pub ignore_errors: bool,
    /// Emit a production entry/exit trace through `tracing` at debug level.
    pub debug: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignore_errors(mut self, ignore_errors: bool) -> Self {
        self.ignore_errors = ignore_errors;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
