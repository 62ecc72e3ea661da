//! Front-end error types.
//!
//! Every recoverable compile failure is one of three kinds (lexical,
//! syntactic, semantic) carrying the source position and a single-line,
//! human-readable message. The first error aborts the compilation; no
//! recovery is attempted. Verifier failures are not represented here:
//! those are programmer bugs and panic.

use thiserror::Error;

/// A compile error with its source position.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Malformed input at the character level: bad characters, unterminated
    /// comments, oversized integer literals.
    #[error("{line}:{col}: {message}")]
    Lexical { line: u32, col: u32, message: String },

    /// An expected-token mismatch.
    #[error("{line}:{col}: {message}")]
    Syntax { line: u32, col: u32, message: String },

    /// A well-formed construct that violates the language rules: unknown
    /// names, type mismatches, illegal casts.
    #[error("{line}:{col}: {message}")]
    Semantic { line: u32, col: u32, message: String },
}

impl CompileError {
    pub fn message(&self) -> &str {
        match self {
            CompileError::Lexical { message, .. }
            | CompileError::Syntax { message, .. }
            | CompileError::Semantic { message, .. } => message,
        }
    }

    pub fn position(&self) -> (u32, u32) {
        match self {
            CompileError::Lexical { line, col, .. }
            | CompileError::Syntax { line, col, .. }
            | CompileError::Semantic { line, col, .. } => (*line, *col),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_as_single_lines() {
        let err = CompileError::Syntax {
            line: 3,
            col: 14,
            message: "expected ;".into(),
        };
        let rendered = err.to_string();
        assert_eq!(rendered, "3:14: expected ;");
        assert!(!rendered.contains('\n'));
        assert_eq!(err.position(), (3, 14));
        assert_eq!(err.message(), "expected ;");
    }
}
