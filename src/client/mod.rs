//! Model-serving collaborators.
//!
//! The experiment only needs "submit prompt, receive text, or fail". That
//! capability is the [`TextGenerator`] trait; the pipeline never sees HTTP.
//!
//! - [`OllamaClient`]: blocking client for a local Ollama service
//! - [`SimulatedGenerator`]: seeded offline stand-in for dry runs

use thiserror::Error;

pub mod ollama;
pub mod simulated;

pub use ollama::OllamaClient;
pub use simulated::SimulatedGenerator;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("Model service unavailable at {host}: {reason}")]
    ServiceUnavailable { host: String, reason: String },
    #[error("Model '{model}' not found on the model service (pull it first).")]
    ModelNotFound { model: String },
    #[error("Invalid response from model service: {0}")]
    InvalidResponse(String),
}

/// Something that turns a prompt into generated text.
pub trait TextGenerator {
    /// Short backend label for logs and the report header.
    fn name(&self) -> &str;

    /// Models the backend can serve right now.
    fn available_models(&self) -> Result<Vec<String>, ServiceError>;

    /// Generate a completion of `prompt` with `model`.
    fn generate(&mut self, model: &str, prompt: &str) -> Result<String, ServiceError>;
}

/// True when `model` appears in `listed`, treating an untagged name as `:latest`.
pub fn model_is_listed(model: &str, listed: &[String]) -> bool {
    listed
        .iter()
        .any(|m| m == model || (!model.contains(':') && *m == format!("{model}:latest")))
}

/// Fail with `ModelNotFound` for the first configured model the backend lacks.
pub fn ensure_models_available<G: TextGenerator + ?Sized>(
    generator: &G,
    models: &[String],
) -> Result<(), ServiceError> {
    let listed = generator.available_models()?;
    tracing::debug!(backend = generator.name(), listed = ?listed, "models reported by backend");
    for model in models {
        if !model_is_listed(model, &listed) {
            return Err(ServiceError::ModelNotFound { model: model.clone() });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Listing(Result<Vec<String>, ServiceError>);

    impl TextGenerator for Listing {
        fn name(&self) -> &str {
            "listing"
        }

        fn available_models(&self) -> Result<Vec<String>, ServiceError> {
            self.0.clone()
        }

        fn generate(&mut self, _model: &str, _prompt: &str) -> Result<String, ServiceError> {
            Ok(String::new())
        }
    }

    fn names(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn untagged_names_match_latest() {
        let listed = names(&["llama3:latest", "gemma3:1b"]);
        assert!(model_is_listed("llama3", &listed));
        assert!(model_is_listed("gemma3:1b", &listed));
        assert!(!model_is_listed("gemma3", &listed));
        assert!(!model_is_listed("llama3:8b", &listed));
    }

    #[test]
    fn missing_model_is_reported_by_name() {
        let backend = Listing(Ok(names(&["gemma3:1b"])));
        let err = ensure_models_available(&backend, &names(&["gemma3:1b", "qwen3:0.6b"])).unwrap_err();
        assert_eq!(err, ServiceError::ModelNotFound { model: "qwen3:0.6b".to_string() });
    }

    #[test]
    fn unreachable_backend_propagates() {
        let backend = Listing(Err(ServiceError::ServiceUnavailable {
            host: "h".to_string(),
            reason: "down".to_string(),
        }));
        let err = ensure_models_available(&backend, &names(&["m"])).unwrap_err();
        assert!(matches!(err, ServiceError::ServiceUnavailable { .. }));
    }
}
