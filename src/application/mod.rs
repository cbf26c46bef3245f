pub mod chat;
pub mod dto;
pub mod ports;
pub mod prompt;
pub mod services;

#[cfg(test)]
pub(crate) mod testing {
    //! Puertos de prueba compartidos por los tests de aplicación y HTTP.

    use async_trait::async_trait;
    use std::sync::Mutex;

    use super::ports::{DetectionOutcome, GenerativeTextPort, ObjectDetectionPort};
    use crate::domain::{
        detection::DetectionRecord,
        errors::{DomainError, DomainResult, GenerationError},
    };

    pub struct RecordingGenerator {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl RecordingGenerator {
        pub fn replying(reply: &str) -> Self {
            Self { reply: reply.to_string(), prompts: Mutex::new(Vec::new()) }
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerativeTextPort for RecordingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    pub struct FailingGenerator;

    #[async_trait]
    impl GenerativeTextPort for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Api { status: 429, body: "quota exceeded".into() })
        }
    }

    /// Devuelve siempre las mismas detecciones; rechaza imágenes vacías.
    pub struct FixedDetector {
        pub records: Vec<DetectionRecord>,
    }

    #[async_trait]
    impl ObjectDetectionPort for FixedDetector {
        async fn detect(&self, image: &[u8], confidence_threshold: f32) -> DomainResult<DetectionOutcome> {
            if image.is_empty() {
                return Err(DomainError::InvalidInput("empty image".into()));
            }
            Ok(DetectionOutcome {
                annotated_png: vec![0x89, b'P', b'N', b'G'],
                records: self
                    .records
                    .iter()
                    .filter(|r| r.confidence >= confidence_threshold)
                    .cloned()
                    .collect(),
            })
        }
    }
}
