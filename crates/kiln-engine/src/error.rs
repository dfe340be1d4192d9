use std::fmt;
use std::io;

use crate::backend::RawId;
use crate::shader::ShaderStage;

/// Errors produced by the engine core and the render backends.
///
/// Runtime glue (window creation, the loop driver) wraps these in
/// `anyhow::Error` with context; library operations return them directly.
#[derive(Debug)]
pub enum EngineError {
    /// Window, context or device creation failed. Fatal.
    Initialization(String),

    /// A shader stage failed to compile. Carries the compiler diagnostic.
    Compile { stage: ShaderStage, log: String },

    /// A program failed to link. Carries the linker diagnostic.
    Link { log: String },

    /// A resource file does not exist.
    NotFound(String),

    /// A resource exists but could not be read or decoded.
    Load { path: String, reason: String },

    /// Malformed input rejected before any native allocation.
    InvalidParameter(String),

    /// The GPU device or surface failed after initialization (out of memory,
    /// lost device).
    Device(String),

    /// A raw id was used after its native object had been released.
    UseAfterRelease(RawId),

    /// An operation was issued in a lifecycle state that does not allow it.
    InvalidState(String),

    Io(io::Error),
}

impl EngineError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub(crate) fn load(path: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Load { path: path.into(), reason: reason.to_string() }
    }

    /// Returns `true` for failures a caller may recover from (missing or
    /// undecodable files).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Load { .. } | Self::Io(_))
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialization(msg) => write!(f, "initialization failed: {msg}"),
            Self::Compile { stage, log } => write!(f, "{stage} shader compilation failed:\n{log}"),
            Self::Link { log } => write!(f, "shader program linking failed:\n{log}"),
            Self::NotFound(path) => write!(f, "resource not found: {path}"),
            Self::Load { path, reason } => write!(f, "failed to load '{path}': {reason}"),
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Self::Device(msg) => write!(f, "gpu device error: {msg}"),
            Self::UseAfterRelease(id) => write!(f, "native object {id} used after release"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            Self::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for EngineError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_display_carries_diagnostic() {
        let err = EngineError::Compile {
            stage: ShaderStage::Fragment,
            log: "expected ';'".to_string(),
        };
        let text = err.to_string();
        assert!(text.starts_with("fragment shader compilation failed"));
        assert!(text.ends_with("expected ';'"));
    }

    #[test]
    fn only_load_failures_are_recoverable() {
        assert!(EngineError::NotFound("a.png".into()).is_recoverable());
        assert!(EngineError::load("a.png", "bad header").is_recoverable());
        assert!(!EngineError::invalid("stride 0").is_recoverable());
        assert!(!EngineError::Link { log: String::new() }.is_recoverable());
    }
}
