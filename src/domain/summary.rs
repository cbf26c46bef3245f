use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::detection::DetectionRecord;

pub const NO_OBJECTS_EN: &str = "No objects detected in the image.";
pub const NO_OBJECTS_AM: &str = "በምስሉ ውስጥ ምንም ነገር አልተገኘም።";

/// Conteo por etiqueta (en orden de primera aparición) y confianza media.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub counts_by_label: IndexMap<String, usize>,
    /// `None` cuando no hubo detecciones.
    pub average_confidence: Option<f64>,
}

impl DetectionSummary {
    pub fn total(&self) -> usize {
        self.counts_by_label.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts_by_label.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    English,
    Amharic,
}

pub fn summarize(records: &[DetectionRecord]) -> DetectionSummary {
    let mut counts_by_label: IndexMap<String, usize> = IndexMap::new();
    let mut confidence_sum = 0.0f64;
    for det in records {
        *counts_by_label.entry(det.label.clone()).or_insert(0) += 1;
        confidence_sum += f64::from(det.confidence);
    }

    let average_confidence = if records.is_empty() {
        None
    } else {
        Some(confidence_sum / records.len() as f64)
    };

    DetectionSummary { counts_by_label, average_confidence }
}

pub fn to_human_summary(summary: &DetectionSummary, locale: Locale) -> String {
    let Some(avg) = summary.average_confidence.filter(|_| !summary.is_empty()) else {
        return match locale {
            Locale::English => NO_OBJECTS_EN.to_string(),
            Locale::Amharic => NO_OBJECTS_AM.to_string(),
        };
    };
    let pct = avg * 100.0;

    match locale {
        Locale::English => {
            let parts: Vec<String> = summary
                .counts_by_label
                .iter()
                .map(|(label, &count)| {
                    if count == 1 {
                        format!("1 {}", label)
                    } else {
                        format!("{} {}s", count, label)
                    }
                })
                .collect();
            format!("I detected: {} (average confidence: {:.0}%)", parts.join(", "), pct)
        }
        Locale::Amharic => {
            let parts: Vec<String> = summary
                .counts_by_label
                .iter()
                .map(|(label, count)| format!("{} {}", count, label))
                .collect();
            format!("የተገኙ ነገሮች: {} (አማካይ እርግጠኝነት: {:.0}%)", parts.join("፣ "), pct)
        }
    }
}
