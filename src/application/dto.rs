use base64::{prelude::BASE64_STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::application::services::ImageAnalysis;
use crate::domain::{
    conversation::ConversationTurn,
    detection::{BoundingBox, DetectionRecord},
    model::{CONFIDENCE_STEP, DEFAULT_CONFIDENCE, MAX_CONFIDENCE, MIN_CONFIDENCE},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectQuery {
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionView {
    pub label: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
    /// Línea lista para mostrar, p. ej. `person (90%)`.
    pub line: String,
}

impl From<&DetectionRecord> for DetectionView {
    fn from(r: &DetectionRecord) -> Self {
        Self {
            label: r.label.clone(),
            confidence: r.confidence,
            bbox: r.bbox,
            line: r.display_line(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    /// PNG anotado en base64.
    pub annotated_image: String,
    pub mime_type: String,
    pub count: usize,
    pub detections: Vec<DetectionView>,
    pub summary: String,
    pub description: String,
}

impl From<ImageAnalysis> for DetectResponse {
    fn from(a: ImageAnalysis) -> Self {
        Self {
            annotated_image: BASE64_STANDARD.encode(&a.annotated_png),
            mime_type: "image/png".into(),
            count: a.records.len(),
            detections: a.records.iter().map(DetectionView::from).collect(),
            summary: a.summary,
            description: a.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub history: Vec<ConversationTurn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub turns: Vec<ConversationTurn>,
    pub image_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceControl {
    pub default: f32,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Default for ConfidenceControl {
    fn default() -> Self {
        Self {
            default: DEFAULT_CONFIDENCE,
            min: MIN_CONFIDENCE,
            max: MAX_CONFIDENCE,
            step: CONFIDENCE_STEP,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfigResponse {
    pub confidence: ConfidenceControl,
    pub detector_model: String,
    pub chat_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}
