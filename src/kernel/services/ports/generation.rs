use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::FileMap;

/// Files produced for one prompt. Dependency maps are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedProject {
    pub files: FileMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeMap<String, String>>,
    #[serde(
        default,
        rename = "devDependencies",
        skip_serializing_if = "Option::is_none"
    )]
    pub dev_dependencies: Option<BTreeMap<String, String>>,
}

impl GeneratedProject {
    pub fn new(files: FileMap) -> Self {
        Self {
            files,
            ..Self::default()
        }
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Prompt is required")]
    MissingPrompt,
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,
    #[error("AI credits exhausted. Please add credits to continue.")]
    CreditsExhausted,
    #[error("Failed to parse generated project structure: {0}")]
    MalformedPayload(String),
    #[error("Invalid project structure: missing files object")]
    InvalidStructure,
    #[error("generation service error {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("generation backend is not configured: {0}")]
    NotConfigured(String),
}

impl GenerationError {
    /// Maps an HTTP failure status onto the matching error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            400 => Self::MissingPrompt,
            402 => Self::CreditsExhausted,
            429 => Self::RateLimited,
            _ => Self::Upstream {
                status,
                message: message.into(),
            },
        }
    }
}

pub type GenerationFuture =
    Pin<Box<dyn Future<Output = Result<GeneratedProject, GenerationError>> + Send + 'static>>;

/// Remote project generation: one prompt in, one project (or a structured error) out.
pub trait ProjectGenerator: Send + Sync {
    fn generate(&self, prompt: String) -> GenerationFuture;
}
