use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::adapters::onnx::yolo_engine::{OnnxYoloEngine, RawDetection};
use crate::application::ports::{DetectionOutcome, ObjectDetectionPort};
use crate::domain::{
    detection::DetectionRecord,
    errors::{DomainError, DomainResult},
    model::YoloParams,
};

const PALETTE: [[u8; 3]; 6] = [
    [14, 159, 110],
    [59, 130, 246],
    [245, 158, 11],
    [239, 68, 68],
    [139, 92, 246],
    [236, 72, 153],
];
const BOX_THICKNESS: i32 = 3;

/// Adaptador del detector ONNX: decodifica, infiere, valida y anota.
pub struct OnnxDetector {
    engine: Arc<Mutex<OnnxYoloEngine>>,
    params: YoloParams,
}

impl OnnxDetector {
    pub fn new(engine: OnnxYoloEngine, params: YoloParams) -> Self {
        Self { engine: Arc::new(Mutex::new(engine)), params }
    }
}

#[async_trait]
impl ObjectDetectionPort for OnnxDetector {
    async fn detect(&self, data: &[u8], confidence_threshold: f32) -> DomainResult<DetectionOutcome> {
        let engine = self.engine.clone();
        let params = self.params.with_threshold(confidence_threshold);
        let bytes = data.to_vec();

        // La inferencia es CPU/GPU bloqueante: fuera del runtime asíncrono.
        tokio::task::spawn_blocking(move || -> DomainResult<DetectionOutcome> {
            let rgb = image::load_from_memory(&bytes)
                .map_err(|e| DomainError::InvalidInput(format!("imagen no válida: {}", e)))?
                .to_rgb8();

            let t_infer_start = std::time::Instant::now();
            let raw = {
                let mut eng = engine
                    .lock()
                    .map_err(|_| DomainError::OperationFailed("Lock del motor YOLO fallido".into()))?;
                eng.infer(&rgb, &params)
                    .map_err(|e| DomainError::OperationFailed(format!("inferencia fallida: {}", e)))?
            };
            info!(
                "🔍 Inference done in {:.1} ms ({} candidates)",
                t_infer_start.elapsed().as_secs_f32() * 1000.0,
                raw.len()
            );

            let records = to_records(&raw, rgb.width(), rgb.height());
            let annotated_png = annotate(rgb, &records)?;
            Ok(DetectionOutcome { annotated_png, records })
        })
        .await
        .map_err(|e| DomainError::OperationFailed(format!("tarea de detección abortada: {}", e)))?
    }
}

/// Pasa la salida cruda por la validación del dominio y recorta al tamaño de la imagen.
pub fn to_records(raw: &[RawDetection], width: u32, height: u32) -> Vec<DetectionRecord> {
    let max_x = width as f32;
    let max_y = height as f32;
    raw.iter()
        .filter_map(|d| {
            let bbox = [
                d.x1.clamp(0.0, max_x),
                d.y1.clamp(0.0, max_y),
                d.x2.clamp(0.0, max_x),
                d.y2.clamp(0.0, max_y),
            ];
            DetectionRecord::from_raw(d.label, d.score, bbox)
        })
        .collect()
}

pub fn annotate(mut img: RgbImage, records: &[DetectionRecord]) -> DomainResult<Vec<u8>> {
    for det in records {
        let color = Rgb(palette_for(&det.label));
        for inset in 0..BOX_THICKNESS {
            let w = det.bbox.width() as i32 - 2 * inset;
            let h = det.bbox.height() as i32 - 2 * inset;
            if w <= 0 || h <= 0 {
                break;
            }
            let rect = Rect::at(det.bbox.x1 + inset, det.bbox.y1 + inset).of_size(w as u32, h as u32);
            draw_hollow_rect_mut(&mut img, rect, color);
        }
    }
    debug!("Annotated {} box(es)", records.len());

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| DomainError::OperationFailed(format!("codificación PNG fallida: {}", e)))?;
    Ok(buf)
}

fn palette_for(label: &str) -> [u8; 3] {
    let idx = label.bytes().fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
    PALETTE[idx % PALETTE.len()]
}
