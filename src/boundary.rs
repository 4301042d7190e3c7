use std::fmt;

/// Warnings raised while releasing that must be reported but never stop the run.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// The target manifest could not be synchronized with the release version
    ManifestNotUpdated { path: String, version: String },
    /// Deleting an existing tag before republishing did not fully succeed
    TagDeletionIncomplete { tag: String },
    /// The remote message generator failed and the local template was used
    MessageFallback { reason: String },
    /// A tag looked like a release tag but is not a valid version
    UnparsableTag { tag: String },
    /// No credential for the remote message generator was found
    NoCredential { env: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::ManifestNotUpdated { path, version } => {
                write!(
                    f,
                    "Manifest '{}' was not updated to {} (missing file, no version field, or already current)",
                    path, version
                )
            }
            BoundaryWarning::TagDeletionIncomplete { tag } => {
                write!(
                    f,
                    "Could not fully delete existing tag '{}', continuing",
                    tag
                )
            }
            BoundaryWarning::MessageFallback { reason } => {
                write!(f, "Message generation failed ({}), using local template", reason)
            }
            BoundaryWarning::UnparsableTag { tag } => {
                write!(f, "Ignoring tag '{}': not a MAJOR.MINOR.PATCH version", tag)
            }
            BoundaryWarning::NoCredential { env } => {
                write!(
                    f,
                    "{} is not set, commit messages will be generated locally",
                    env
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_warning_names_path_and_version() {
        let warning = BoundaryWarning::ManifestNotUpdated {
            path: "Cargo.toml".to_string(),
            version: "1.2.3".to_string(),
        };
        let msg = warning.to_string();
        assert!(msg.contains("Cargo.toml"));
        assert!(msg.contains("1.2.3"));
    }

    #[test]
    fn test_tag_deletion_warning() {
        let warning = BoundaryWarning::TagDeletionIncomplete {
            tag: "v0.9.0".to_string(),
        };
        assert!(warning.to_string().contains("v0.9.0"));
    }

    #[test]
    fn test_credential_warning_names_variable() {
        let warning = BoundaryWarning::NoCredential {
            env: "OPENROUTER_API_KEY".to_string(),
        };
        assert!(warning.to_string().starts_with("OPENROUTER_API_KEY"));
    }
}
