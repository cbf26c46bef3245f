use serde::{Deserialize, Serialize};

use super::errors::{DomainError, DomainResult};

/// Rango que expone el control deslizante de la interfaz.
pub const MIN_CONFIDENCE: f32 = 0.1;
pub const MAX_CONFIDENCE: f32 = 1.0;
pub const DEFAULT_CONFIDENCE: f32 = 0.5;
pub const CONFIDENCE_STEP: f32 = 0.05;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelId {
    pub name: String,       // logical name, e.g. "yolov8n"
    pub onnx_path: String,  // filesystem path
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoloParams {
    pub input_size: u32,        // 640 typical
    pub conf_threshold: f32,    // 0..1
    pub iou_threshold: f32,     // 0..1
    pub max_detections: usize,  // e.g. 300
}

impl Default for YoloParams {
    fn default() -> Self {
        Self {
            input_size: 640,
            conf_threshold: DEFAULT_CONFIDENCE,
            iou_threshold: 0.45,
            max_detections: 100,
        }
    }
}

impl YoloParams {
    /// Copia de los parámetros con otro umbral de confianza.
    pub fn with_threshold(&self, conf_threshold: f32) -> Self {
        Self { conf_threshold, ..self.clone() }
    }
}

pub fn validate_threshold(threshold: f32) -> DomainResult<f32> {
    if threshold.is_finite() && (MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(DomainError::InvalidInput(format!(
            "umbral de confianza {} fuera de [{}, {}]",
            threshold, MIN_CONFIDENCE, MAX_CONFIDENCE
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_bounds_are_inclusive() {
        assert!(validate_threshold(0.1).is_ok());
        assert!(validate_threshold(1.0).is_ok());
        assert!(validate_threshold(0.05).is_err());
        assert!(validate_threshold(1.01).is_err());
        assert!(validate_threshold(f32::NAN).is_err());
    }

    #[test]
    fn with_threshold_keeps_other_params() {
        let p = YoloParams::default().with_threshold(0.8);
        assert_eq!(p.conf_threshold, 0.8);
        assert_eq!(p.input_size, 640);
        assert_eq!(p.max_detections, 100);
    }
}
