//! IAM policy document template
//!
//! The template is a policy document with `{BUCKET_NAME}` wherever the
//! environment's bucket belongs. It is loaded and checked once per run,
//! before any resource is created, then rendered for each environment.

use provisionary_common::defaults::BUCKET_NAME_PLACEHOLDER;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Problems with the policy template file
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to read policy template {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Policy template {} does not contain {}", .path.display(), BUCKET_NAME_PLACEHOLDER)]
    MissingPlaceholder { path: PathBuf },

    #[error("Policy template {} is not valid JSON once rendered", .path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A loaded policy document template
#[derive(Debug, Clone)]
pub struct PolicyTemplate {
    source: String,
    path: PathBuf,
}

impl PolicyTemplate {
    /// Read a template from disk and check it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref().to_path_buf();
        let source = std::fs::read_to_string(&path).map_err(|source| TemplateError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_source(source, path)
    }

    /// Build a template from a string; `path` is only used in error messages.
    pub fn from_source(
        source: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Result<Self, TemplateError> {
        let template = Self {
            source: source.into(),
            path: path.into(),
        };

        if !template.source.contains(BUCKET_NAME_PLACEHOLDER) {
            return Err(TemplateError::MissingPlaceholder {
                path: template.path,
            });
        }

        // Render with a representative name so placeholder positions are checked too
        serde_json::from_str::<serde_json::Value>(&template.render("provisionary-check")).map_err(
            |source| TemplateError::InvalidJson {
                path: template.path.clone(),
                source,
            },
        )?;

        Ok(template)
    }

    /// Policy document for `bucket_name`
    pub fn render(&self, bucket_name: &str) -> String {
        self.source.replace(BUCKET_NAME_PLACEHOLDER, bucket_name)
    }

    /// Path the template was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }
}
