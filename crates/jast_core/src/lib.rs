//! jast_core: Core utilities shared by every stage of the Java front end.
//!
//! Provides source positions and the generic look-ahead buffer that the
//! parser uses for speculative (backtracking) parsing.

pub mod lookahead;
pub mod text;

// Re-export commonly used types
pub use lookahead::LookAheadBuffer;
pub use text::Position;
