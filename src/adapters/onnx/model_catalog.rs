use async_trait::async_trait;
use std::path::Path;

use crate::application::ports::ModelCatalogPort;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::model::ModelId;

/// Comprueba los pesos del detector antes de cargarlos al arrancar.
pub struct OnnxModelCatalog;

impl OnnxModelCatalog {
    pub fn new() -> Self { Self }
}

#[async_trait]
impl ModelCatalogPort for OnnxModelCatalog {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()> {
        let path = Path::new(model.onnx_path.trim());
        if model.onnx_path.trim().is_empty() {
            return Err(DomainError::InvalidInput("onnx_path empty".into()));
        }
        if path.extension().and_then(|e| e.to_str()) != Some("onnx") {
            return Err(DomainError::InvalidInput(format!(
                "{} no es un modelo .onnx (exporta yolov8n.pt a ONNX primero)",
                model.onnx_path
            )));
        }
        if !path.is_file() {
            return Err(DomainError::NotFound(format!("model file not found: {}", model.onnx_path)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(path: &str) -> ModelId {
        ModelId { name: "yolov8n".into(), onnx_path: path.into() }
    }

    #[tokio::test]
    async fn rejects_empty_and_non_onnx_paths() {
        let catalog = OnnxModelCatalog::new();
        assert!(matches!(catalog.validate_model(&model("  ")).await, Err(DomainError::InvalidInput(_))));
        assert!(matches!(catalog.validate_model(&model("yolov8n.pt")).await, Err(DomainError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn reports_missing_file() {
        let catalog = OnnxModelCatalog::new();
        let res = catalog.validate_model(&model("/definitely/not/here/yolov8n.onnx")).await;
        assert!(matches!(res, Err(DomainError::NotFound(_))));
    }
}
