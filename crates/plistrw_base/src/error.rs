use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use tracing_error::{SpanTrace, SpanTraceStatus};

/* 📖 # Why a custom error type and not use anyhow/eyre/thiserror etc?

- Callers need to match on the failure (a missing file means "first run")
- No dependencies to compile and integrate
- More transparency into error handling logic
 */

/// Error variants that can occur in plist store operations.
#[derive(Debug)]
pub enum ErrorKind {
    /// An argument was outside the accepted domain
    InvalidArgument { message: String },

    /// The plist file does not exist at the resolved path
    FileNotFound { path: PathBuf },

    /// The plist file exists but cannot be written by this process
    FileNotWritable { path: PathBuf },

    /// The destination of a copy already exists
    AlreadyExists { path: PathBuf },

    /// The root of a plist file has a different shape than requested
    UnexpectedRoot {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// File system operation failed
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Plist decoding or encoding failed
    Plist {
        path: PathBuf,
        source: plist::Error,
    },

    /// Configuration could not be parsed
    Config { path: PathBuf, message: String },

    /// Catch-all for other errors with a message
    Message { message: String },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidArgument { message } => write!(f, "Invalid argument: {}", message),
            ErrorKind::FileNotFound { path } => {
                write!(f, "Cannot find plist file: {}", path.display())
            }
            ErrorKind::FileNotWritable { path } => {
                write!(f, "Cannot write to plist file: {}", path.display())
            }
            ErrorKind::AlreadyExists { path } => {
                write!(f, "File already exists: {}", path.display())
            }
            ErrorKind::UnexpectedRoot {
                path,
                expected,
                found,
            } => write!(
                f,
                "Expected {} at root of {}, found {}",
                expected,
                path.display(),
                found
            ),
            ErrorKind::FileError { path, source } => {
                write!(f, "File error at {}: {}", path.display(), source)
            }
            ErrorKind::Plist { path, source } => {
                write!(f, "Plist error in {}: {}", path.display(), source)
            }
            ErrorKind::Config { path, message } => {
                write!(f, "Invalid configuration in {}: {}", path.display(), message)
            }
            ErrorKind::Message { message } => write!(f, "{}", message),
        }
    }
}

/* 📖 # Why separate ErrorKind and PlistError?
- ErrorKind: structural variants callers pattern match on (FileNotFound etc.)
- PlistError: wraps ErrorKind with runtime context, an optional cause and the span trace

Context strings are kept as a list instead of nesting errors for every layer.
*/

/// Error type wrapping an [`ErrorKind`] with context, cause and span trace.
pub struct PlistError {
    kind: ErrorKind,
    context: Vec<String>,
    cause: Option<Box<PlistError>>,
    span_trace: SpanTrace,
}

impl PlistError {
    /// Creates a new error from an ErrorKind, capturing the current span trace.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: vec![],
            cause: None,
            span_trace: SpanTrace::capture(),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message {
            message: message.into(),
        })
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument {
            message: message.into(),
        })
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(ErrorKind::FileNotFound { path: path.into() })
    }

    pub fn file_not_writable(path: impl Into<PathBuf>) -> Self {
        Self::new(ErrorKind::FileNotWritable { path: path.into() })
    }

    pub fn already_exists(path: impl Into<PathBuf>) -> Self {
        Self::new(ErrorKind::AlreadyExists { path: path.into() })
    }

    pub fn file_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::new(ErrorKind::FileError {
            path: path.into(),
            source,
        })
    }

    /// Attaches context to an error.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attaches context using lazy evaluation.
    pub fn with_context<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.context.push(f());
        self
    }

    /// Records the error that led to this one.
    pub fn caused_by(mut self, cause: PlistError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Returns a reference to the underlying ErrorKind.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn get_context(&self) -> &[String] {
        &self.context
    }

    pub fn cause(&self) -> Option<&PlistError> {
        self.cause.as_deref()
    }

    /// Returns the span trace captured when the error was created.
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    pub fn is_file_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::FileNotFound { .. })
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidArgument { .. })
    }

    pub fn is_file_not_writable(&self) -> bool {
        matches!(self.kind, ErrorKind::FileNotWritable { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self.kind, ErrorKind::AlreadyExists { .. })
    }

    /// Returns the innermost error in the chain.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: &str) -> fmt::Result {
        writeln!(f, "{}", self.kind)?;
        let branches = self.context.len() + usize::from(self.cause.is_some());
        for (index, context) in self.context.iter().enumerate() {
            let branch = if index + 1 == branches { "└─" } else { "├─" };
            writeln!(f, "{}{} {}", indent, branch, context)?;
        }
        if let Some(cause) = &self.cause {
            write!(f, "{}└─ cause: ", indent)?;
            cause.fmt_tree(f, &format!("{}   ", indent))?;
        }
        Ok(())
    }
}

impl From<ErrorKind> for PlistError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl StdError for PlistError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::FileError { source, .. } => Some(source),
            ErrorKind::Plist { source, .. } => Some(source),
            _ => self
                .cause
                .as_deref()
                .map(|cause| cause as &(dyn StdError + 'static)),
        }
    }
}

impl fmt::Display for PlistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for context in &self.context {
            write!(f, "{}: ", context)?;
        }
        write!(f, "{}", self.kind)
    }
}

impl fmt::Debug for PlistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, "")?;
        if self.span_trace.status() == SpanTraceStatus::CAPTURED {
            writeln!(f, "Trace: {}", self.span_trace)?;
        }
        Ok(())
    }
}

/* 📖 # Why use Box<PlistError> in the result type?

Boxing the error keeps the result type small, making it cheap to return in the common case.
The span trace and context vector would otherwise be copied around on every `?`.
*/

/// Standard result type for plist store operations.
pub type PlistResult<T> = std::result::Result<T, Box<PlistError>>;

/// Extension trait for attaching context to Results.
pub trait ResultExt<T> {
    /// Attaches context to an error, consuming and re-wrapping it.
    fn context(self, context: impl Into<String>) -> PlistResult<T>;

    /// Attaches context using lazy evaluation.
    /// Context is only evaluated if the result is an error.
    fn with_context<F>(self, f: F) -> PlistResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for PlistResult<T> {
    fn context(self, context: impl Into<String>) -> PlistResult<T> {
        self.map_err(|err| Box::new(err.context(context)))
    }

    fn with_context<F>(self, f: F) -> PlistResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| Box::new(err.with_context(f)))
    }
}

/// Creates a boxed message error from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        Box::new($crate::PlistError::message(format!($($arg)*)))
    };
}

/// Returns early with a boxed message error.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::err!($($arg)*))
    };
}
