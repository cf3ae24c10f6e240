// Licensed under the Apache-2.0 license

use crate::render::ArtifactError;
use crate::validate::ValidationErrors;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The design was rejected before the output tree was touched.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    /// Raised before the previous output is rotated.
    #[error("unknown template(s): {}", .0.join(", "))]
    UnknownTemplates(Vec<String>),
    #[error("failed to rotate previous output {}: {source}", .path.display())]
    Rotate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Every artifact was attempted; these failed.
    #[error("{}", artifact_summary(.0))]
    Artifacts(Vec<ArtifactError>),
}

fn artifact_summary(errors: &[ArtifactError]) -> String {
    let mut msg = format!("{} artifact(s) failed", errors.len());
    for e in errors {
        msg.push_str("\n  ");
        msg.push_str(&e.to_string());
    }
    msg
}
