use thiserror::Error;

/// Errors produced by the snapshot core.
///
/// Staleness at action time (the page mutated between snapshot and click) is
/// deliberately *not* an error: the action resolvers return `Ok(false)` so a
/// planner can branch without unwinding. Only structural problems and a
/// missing selector-map key surface as errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Script injection or execution failed, or the page context failed the
    /// trivial-evaluation sanity check. The execution context is crashed or
    /// detached; recover by reloading/renavigating at a higher level.
    #[error("page evaluation failed: {0}")]
    Evaluation(String),

    /// The bridge payload did not resolve to a well-formed tree (e.g. the
    /// root id points at nothing, or at a text node).
    #[error("snapshot structure invalid: {0}")]
    Structural(String),

    /// An action referenced a highlight index that is not in the selector
    /// map. The caller should take a fresh snapshot.
    #[error("no element with highlight index {0} in this snapshot")]
    IndexNotFound(usize),

    /// A bridge operation outside evaluation failed (frame enumeration,
    /// URL query, screenshot capture).
    #[error("bridge operation failed: {0}")]
    Bridge(String),

    /// Screenshot bytes could not be decoded or written.
    #[error("screenshot failed: {0}")]
    Screenshot(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for snapshot operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SnapshotError::IndexNotFound(42);
        assert!(err.to_string().contains("42"));

        let err = SnapshotError::Evaluation("context crashed".to_string());
        assert!(err.to_string().contains("context crashed"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SnapshotError = io.into();
        assert!(matches!(err, SnapshotError::Io(_)));
    }
}
