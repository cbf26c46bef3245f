use async_trait::async_trait;

use crate::domain::{
    detection::DetectionRecord,
    errors::{DomainResult, GenerationError},
    model::ModelId,
};

/// Resultado de una pasada del detector sobre una imagen.
#[derive(Debug, Clone)]
pub struct DetectionOutcome {
    /// Imagen anotada (PNG). Se reenvía tal cual a la interfaz.
    pub annotated_png: Vec<u8>,
    /// Detecciones ya filtradas por el umbral y validadas.
    pub records: Vec<DetectionRecord>,
}

#[async_trait]
pub trait ObjectDetectionPort: Send + Sync {
    async fn detect(&self, image: &[u8], confidence_threshold: f32) -> DomainResult<DetectionOutcome>;
}

#[async_trait]
pub trait GenerativeTextPort: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[async_trait]
pub trait ModelCatalogPort: Send + Sync {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()>;
}
