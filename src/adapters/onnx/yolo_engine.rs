use anyhow::Result;
use image::{imageops::FilterType, RgbImage};
use ndarray::{s, Array4, ArrayViewD, Axis, IxDyn};
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::Session;
use ort::value::Value;
use std::fs;

use crate::domain::model::YoloParams;

pub const COCO_CLASSES: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket",
    "bottle", "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana",
    "apple", "sandwich", "orange", "broccoli", "carrot", "hot dog", "pizza",
    "donut", "cake", "chair", "couch", "potted plant", "bed", "dining table", "toilet", "tv",
    "laptop", "mouse", "remote", "keyboard", "cell phone", "microwave", "oven", "toaster",
    "sink", "refrigerator", "book", "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

/// Salida cruda del modelo, en píxeles de la imagen original y sin validar.
#[derive(Debug, Clone)]
pub struct RawDetection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub score: f32,
    pub class_id: usize,
    pub label: &'static str,
}

pub struct OnnxYoloEngine {
    session: Session,
}

impl OnnxYoloEngine {
    pub fn load(path: &str) -> Result<Self> {
        let mut builder = Session::builder()?.with_intra_threads(4)?;

        // CUDA es opcional: si está disponible se registra, si no continuamos en CPU.
        let cuda = CUDAExecutionProvider::default().build();
        if let Ok(builder_with_cuda) = builder.clone().with_execution_providers([cuda]) {
            builder = builder_with_cuda;
        }

        let model_bytes = fs::read(path)?;
        let session = builder.commit_from_memory(&model_bytes)?;

        Ok(Self { session })
    }

    /// Salida YOLOv8: `[1, 4 + clases, candidatos]` con cajas `cx, cy, w, h`.
    pub fn infer(&mut self, rgb: &RgbImage, params: &YoloParams) -> Result<Vec<RawDetection>> {
        let imgsz = params.input_size as usize;
        let resized = image::imageops::resize(rgb, imgsz as u32, imgsz as u32, FilterType::Triangle);

        let mut input = Array4::<f32>::zeros((1, 3, imgsz, imgsz));
        for (x, y, pixel) in resized.enumerate_pixels() {
            input[[0, 0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
            input[[0, 1, y as usize, x as usize]] = pixel[1] as f32 / 255.0;
            input[[0, 2, y as usize, x as usize]] = pixel[2] as f32 / 255.0;
        }

        let input_shape = vec![1, 3, imgsz as i64, imgsz as i64];
        let (data, _) = input.into_raw_vec_and_offset();
        let input_tensor = Value::from_array((input_shape, data))?;

        let outputs = self.session.run(ort::inputs![input_tensor])?;
        let (shape_out, data_out) = outputs[0].try_extract_tensor::<f32>()?;

        let dims: Vec<usize> = shape_out.iter().map(|&x| x as usize).collect();
        check_output_dims(&dims)?;
        let array_view = ArrayViewD::from_shape(IxDyn(&dims), data_out)?;
        let view = array_view.index_axis(Axis(0), 0);

        let num_candidates = view.shape()[1];
        let sx = rgb.width() as f32 / imgsz as f32;
        let sy = rgb.height() as f32 / imgsz as f32;

        let mut detections = Vec::new();

        for i in 0..num_candidates {
            let scores = view.slice(s![4.., i]);
            let Some((class_id, &max_score)) = scores
                .indexed_iter()
                .max_by(|(_, a), (_, b)| a.total_cmp(b))
            else {
                continue;
            };

            if max_score >= params.conf_threshold {
                let cx = view[[0, i]];
                let cy = view[[1, i]];
                let w = view[[2, i]];
                let h = view[[3, i]];

                detections.push(RawDetection {
                    x1: (cx - w / 2.0) * sx,
                    y1: (cy - h / 2.0) * sy,
                    x2: (cx + w / 2.0) * sx,
                    y2: (cy + h / 2.0) * sy,
                    score: max_score,
                    class_id,
                    label: COCO_CLASSES.get(class_id).copied().unwrap_or("object"),
                });
            }
        }

        Ok(non_max_suppression(detections, params.iou_threshold, params.max_detections))
    }
}

/// La salida YOLOv8 es `[batch, 4 + clases, candidatos]`; cualquier otra forma
/// se rechaza antes de indexar.
fn check_output_dims(dims: &[usize]) -> Result<()> {
    if dims.len() != 3 || dims[0] == 0 || dims[1] <= 4 {
        anyhow::bail!("forma de salida inesperada {:?}, se esperaba [1, 4+clases, N]", dims);
    }
    Ok(())
}

/// NMS por clase, de mayor a menor puntuación.
pub fn non_max_suppression(mut dets: Vec<RawDetection>, iou_threshold: f32, max_det: usize) -> Vec<RawDetection> {
    dets.sort_unstable_by(|a, b| b.score.total_cmp(&a.score));
    let mut kept: Vec<RawDetection> = Vec::new();

    'outer: for d in dets {
        for k in &kept {
            if k.class_id == d.class_id && iou(k, &d) > iou_threshold {
                continue 'outer;
            }
        }
        kept.push(d);
        if kept.len() >= max_det {
            break;
        }
    }
    kept
}

fn iou(a: &RawDetection, b: &RawDetection) -> f32 {
    let ix = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0);
    let iy = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0.0);
    let inter = ix * iy;
    let area_a = (a.x2 - a.x1).max(0.0) * (a.y2 - a.y1).max(0.0);
    let area_b = (b.x2 - b.x1).max(0.0) * (b.y2 - b.y1).max(0.0);
    let union = area_a + area_b - inter;
    if union <= 0.0 { 0.0 } else { inter / union }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x1: f32, y1: f32, x2: f32, y2: f32, score: f32, class_id: usize) -> RawDetection {
        RawDetection { x1, y1, x2, y2, score, class_id, label: COCO_CLASSES[class_id] }
    }

    #[test]
    fn output_dims_must_be_yolov8_layout() {
        assert!(check_output_dims(&[1, 84, 8400]).is_ok());
        assert!(check_output_dims(&[1, 5, 0]).is_ok());
        assert!(check_output_dims(&[84, 8400]).is_err());
        assert!(check_output_dims(&[1, 4, 8400]).is_err());
        assert!(check_output_dims(&[0, 84, 8400]).is_err());
        assert!(check_output_dims(&[1, 1, 84, 8400]).is_err());
    }

    #[test]
    fn overlapping_boxes_of_same_class_are_suppressed() {
        let dets = vec![
            det(0.0, 0.0, 10.0, 10.0, 0.6, 0),
            det(1.0, 1.0, 10.0, 10.0, 0.9, 0),
            det(50.0, 50.0, 60.0, 60.0, 0.7, 0),
        ];
        let kept = non_max_suppression(dets, 0.45, 100);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].score, 0.9);
        assert_eq!(kept[1].score, 0.7);
    }

    #[test]
    fn different_classes_are_not_suppressed() {
        let dets = vec![det(0.0, 0.0, 10.0, 10.0, 0.9, 0), det(0.0, 0.0, 10.0, 10.0, 0.8, 16)];
        let kept = non_max_suppression(dets, 0.45, 100);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].label, "dog");
    }

    #[test]
    fn max_detections_caps_output() {
        let dets = (0..5).map(|i| det(i as f32 * 20.0, 0.0, i as f32 * 20.0 + 5.0, 5.0, 0.5, 0)).collect();
        assert_eq!(non_max_suppression(dets, 0.45, 3).len(), 3);
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = det(0.0, 0.0, 1.0, 1.0, 0.5, 0);
        let b = det(5.0, 5.0, 6.0, 6.0, 0.5, 0);
        assert_eq!(iou(&a, &b), 0.0);
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
    }
}
