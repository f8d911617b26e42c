//! Common result and error types for the Meridian toolchain.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates an unrecoverable precondition violation (a malformed model
/// handed to a layer that requires validated inputs), not a user-facing
/// error. Callers are expected to surface it before the failing layer runs,
/// e.g. by validating an analysis context before constructing path ends.
pub type MeridianResult<T> = Result<T, InternalError>;

/// An internal error indicating a broken invariant in the data handed to
/// Meridian, not a user input problem.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the violated invariant.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("dangling clock id");
        assert_eq!(format!("{err}"), "internal error: dangling clock id");
    }

    #[test]
    fn ok_path() {
        let r: MeridianResult<u32> = Ok(7);
        assert_eq!(r.ok(), Some(7));
    }

    #[test]
    fn from_string() {
        let err: InternalError = "bad waveform".to_string().into();
        assert_eq!(err.message, "bad waveform");
    }
}
