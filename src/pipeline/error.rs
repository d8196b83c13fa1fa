//! Pipeline error types.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Fatal failure of one pipeline invocation.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A transform could not parse its input.
    #[error("failed to parse `{}`: {message}", path.display())]
    SourceParse { path: PathBuf, message: String },

    /// An include directive references a file that does not exist.
    #[error("`{}` includes missing file `{}`", referrer.display(), missing.display())]
    MissingInclude { referrer: PathBuf, missing: PathBuf },

    #[error("IO error at `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A sink or the end of the pipeline was reached with an open partition.
    #[error("partition `{label}` is still open at {at}")]
    UnrestoredPartition { label: String, at: String },

    /// A restore step does not match the innermost open partition.
    #[error("cannot restore `{restoring}`: innermost open partition is {innermost}")]
    PartitionMismatch { restoring: String, innermost: String },
}

impl PipelineError {
    pub fn source_parse(path: &Path, message: impl Into<String>) -> Self {
        Self::SourceParse {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_include_names_both_paths() {
        let err = PipelineError::MissingInclude {
            referrer: PathBuf::from("docs/index.html"),
            missing: PathBuf::from("docs/missing.html"),
        };
        let msg = err.to_string();
        assert!(msg.contains("docs/index.html"));
        assert!(msg.contains("docs/missing.html"));
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;
        let err = PipelineError::io(
            Path::new("dist/app.css"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("dist/app.css"));
        assert!(err.source().is_some());
    }
}
