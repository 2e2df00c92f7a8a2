//! CLI output: error mapping from kernel errors to the stable CLI surface.

use crate::error::KernelError;

/// Render a kernel error for the terminal, with "did you mean" hints.
pub fn map_error(e: &KernelError) -> String {
    match e {
        KernelError::CommandNotFound { suggestions, .. } if !suggestions.is_empty() => {
            format!("{} ({})\nDid you mean: {}", e, e.code(), suggestions.join(", "))
        }
        KernelError::Command(source) => format!("{:#} ({})", source, e.code()),
        _ => format!("{} ({})", e, e.code()),
    }
}

/// Process exit code: 2 for usage problems, 1 otherwise.
pub fn exit_code(e: &KernelError) -> i32 {
    match e {
        KernelError::CommandNotFound { .. }
        | KernelError::InvalidFlag { .. }
        | KernelError::MissingArgument { .. }
        | KernelError::InvalidBinding { .. } => 2,
        _ => 1,
    }
}
