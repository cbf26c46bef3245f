use serde::{Deserialize, Serialize};
use tracing::warn;

/// Caja en píxeles, siempre con `x1 <= x2` y `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    /// Ordena las esquinas si llegan invertidas.
    pub fn normalized(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    pub fn width(&self) -> u32 {
        (self.x2 - self.x1) as u32
    }

    pub fn height(&self) -> u32 {
        (self.y2 - self.y1) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub label: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl DetectionRecord {
    pub fn new(label: impl Into<String>, confidence: f32, bbox: [i32; 4]) -> Self {
        let [x1, y1, x2, y2] = bbox;
        Self {
            label: label.into(),
            confidence: round2(confidence.clamp(0.0, 1.0)),
            bbox: BoundingBox::normalized(x1, y1, x2, y2),
        }
    }

    /// Validación en la frontera del detector.
    ///
    /// Valores no finitos descartan la detección; la confianza se acota a
    /// `[0, 1]` y las esquinas invertidas se intercambian.
    pub fn from_raw(label: &str, confidence: f32, bbox: [f32; 4]) -> Option<Self> {
        if !confidence.is_finite() || bbox.iter().any(|v| !v.is_finite()) {
            warn!("⚠️ Discarding '{}' detection with non-finite values", label);
            return None;
        }
        if !(0.0..=1.0).contains(&confidence) {
            warn!("⚠️ Clamping out-of-range confidence {} for '{}'", confidence, label);
        }
        let [x1, y1, x2, y2] = bbox.map(|v| v.round() as i32);
        Some(Self::new(label, confidence, [x1, y1, x2, y2]))
    }

    /// Línea para el listado bajo la imagen anotada, p. ej. `person (90%)`.
    pub fn display_line(&self) -> String {
        format!("{} ({:.0}%)", self.label, self.confidence * 100.0)
    }
}

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}
