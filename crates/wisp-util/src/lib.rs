//! wisp-util - shared position/span types and the error enum used by every
//! later pipeline stage (lexer, parser, interpreter).

pub mod error;
pub mod span;

pub use error::{TraceFrame, WispError};
pub use span::{Position, Span};
