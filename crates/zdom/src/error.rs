//! Error types for zdom

use std::fmt;
use thiserror::Error;

/// Position in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.offset, self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span representing a range in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub const fn empty() -> Self {
        Self {
            start: Pos::new(0, 0, 0),
            end: Pos::new(0, 0, 0),
        }
    }

    /// True for spans that point at no source text (tree errors)
    pub const fn is_empty(&self) -> bool {
        self.start.line == 0 && self.end.line == 0
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed name, out-of-range position or wrong entity variant
    InvalidArgument,
    /// Missing child, parent or node
    NotFound,
    /// A structural precondition of the tree was violated
    PreconditionFailed,
    /// Malformed source markup
    Parse,
    MaxDepthExceeded { max: u16 },
    MaxSizeExceeded { max: usize },
    Io { message: String },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::NotFound => write!(f, "not found"),
            Self::PreconditionFailed => write!(f, "precondition failed"),
            Self::Parse => write!(f, "parse error"),
            Self::MaxDepthExceeded { max } => {
                write!(f, "max depth exceeded: {max}")
            }
            Self::MaxSizeExceeded { max } => write!(f, "max size exceeded: {max}"),
            Self::Io { message } => write!(f, "io error: {message}"),
        }
    }
}

/// Main error type for zdom
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            message: String::new(),
        }
    }

    pub fn with_message(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Detail text; empty when the kind alone describes the error
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create error at specific position
    pub fn at(kind: ErrorKind, offset: usize, line: u32, col: u32) -> Self {
        let pos = Pos::new(offset, line, col);
        Self::new(kind, Span::new(pos, pos))
    }

    /// Malformed markup at `pos`
    pub fn parse(pos: Pos, message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::Parse, Span::new(pos, pos), message)
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::InvalidArgument, Span::empty(), message)
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::NotFound, Span::empty(), message)
    }

    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::PreconditionFailed, Span::empty(), message)
    }

    pub(crate) fn io(err: &std::io::Error) -> Self {
        Self::new(
            ErrorKind::Io {
                message: err.to_string(),
            },
            Span::empty(),
        )
    }

    /// True when the error came from malformed source text
    pub fn is_parse(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Parse | ErrorKind::MaxDepthExceeded { .. } | ErrorKind::MaxSizeExceeded { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.span.is_empty(), self.message.is_empty()) {
            (true, true) => write!(f, "{}", self.kind),
            (true, false) => write!(f, "{}: {}", self.kind, self.message),
            (false, true) => write!(f, "error at {}: {}", self.span.start, self.kind),
            (false, false) => write!(f, "error at {}: {}", self.span.start, self.message),
        }
    }
}

/// Result type alias for zdom
pub type Result<T> = std::result::Result<T, Error>;
