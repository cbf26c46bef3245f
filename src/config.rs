use clap::Parser;
use std::time::Duration;

use crate::adapters::gemini::GeminiConfig;
use crate::domain::{errors::ConfigError, model::{ModelId, YoloParams}};

pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Configuración del servidor. Cada opción acepta flag o variable de entorno
/// (también desde `.env`).
#[derive(Debug, Clone, Parser)]
#[command(name = "vision-chat", version, about = "YOLO object detection + Amharic chat over Gemini")]
pub struct AppConfig {
    /// Clave de la API de Gemini (obligatoria).
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.0-flash")]
    pub gemini_model: String,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = "https://generativelanguage.googleapis.com/v1beta")]
    pub gemini_base_url: String,

    #[arg(long, env = "GEMINI_TIMEOUT_SECS", default_value_t = 60)]
    pub gemini_timeout_secs: u64,

    #[arg(long, env = "GEMINI_TEMPERATURE")]
    pub gemini_temperature: Option<f32>,

    #[arg(long, env = "YOLO_MODEL_PATH", default_value = "models/yolov8n.onnx")]
    pub model_path: String,

    #[arg(long, env = "YOLO_INPUT_SIZE", default_value_t = 640)]
    pub input_size: u32,

    #[arg(long, env = "YOLO_IOU_THRESHOLD", default_value_t = 0.45)]
    pub iou_threshold: f32,

    #[arg(long, env = "YOLO_MAX_DETECTIONS", default_value_t = 100)]
    pub max_detections: usize,

    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8090")]
    pub bind_addr: String,

    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    pub static_dir: String,
}

impl AppConfig {
    pub fn gemini(&self) -> Result<GeminiConfig, ConfigError> {
        let api_key = self
            .google_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingCredential(API_KEY_VAR))?;

        if !(self.gemini_base_url.starts_with("https://") || self.gemini_base_url.starts_with("http://")) {
            return Err(ConfigError::InvalidValue {
                name: "GEMINI_BASE_URL",
                reason: format!("'{}' is not an http(s) URL", self.gemini_base_url),
            });
        }
        if self.gemini_model.trim().is_empty() {
            return Err(ConfigError::InvalidValue { name: "GEMINI_MODEL", reason: "empty".into() });
        }
        if self.gemini_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue { name: "GEMINI_TIMEOUT_SECS", reason: "must be > 0".into() });
        }

        Ok(GeminiConfig {
            api_key: api_key.to_string(),
            model: self.gemini_model.trim().to_string(),
            base_url: self.gemini_base_url.clone(),
            timeout: Duration::from_secs(self.gemini_timeout_secs),
            temperature: self.gemini_temperature,
        })
    }

    pub fn yolo_params(&self) -> Result<YoloParams, ConfigError> {
        if self.input_size == 0 || self.input_size % 32 != 0 {
            return Err(ConfigError::InvalidValue {
                name: "YOLO_INPUT_SIZE",
                reason: format!("{} is not a positive multiple of 32", self.input_size),
            });
        }
        if !(self.iou_threshold > 0.0 && self.iou_threshold <= 1.0) {
            return Err(ConfigError::InvalidValue {
                name: "YOLO_IOU_THRESHOLD",
                reason: format!("{} outside (0, 1]", self.iou_threshold),
            });
        }
        if self.max_detections == 0 {
            return Err(ConfigError::InvalidValue { name: "YOLO_MAX_DETECTIONS", reason: "must be > 0".into() });
        }
        Ok(YoloParams {
            input_size: self.input_size,
            iou_threshold: self.iou_threshold,
            max_detections: self.max_detections,
            ..YoloParams::default()
        })
    }

    pub fn model_id(&self) -> ModelId {
        let name = std::path::Path::new(&self.model_path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("yolo")
            .to_string();
        ModelId { name, onnx_path: self.model_path.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> AppConfig {
        let mut argv = vec!["vision-chat"];
        argv.extend_from_slice(args);
        AppConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn missing_or_blank_key_is_a_config_error() {
        let mut cfg = parse(&[]);
        cfg.google_api_key = None;
        assert!(matches!(cfg.gemini(), Err(ConfigError::MissingCredential(API_KEY_VAR))));
        cfg.google_api_key = Some("   ".into());
        assert!(matches!(cfg.gemini(), Err(ConfigError::MissingCredential(_))));
    }

    #[test]
    fn flags_build_gemini_config() {
        let cfg = parse(&["--google-api-key", "abc", "--gemini-model", "gemini-x", "--gemini-timeout-secs", "7"]);
        let g = cfg.gemini().unwrap();
        assert_eq!(g.api_key, "abc");
        assert_eq!(g.model, "gemini-x");
        assert_eq!(g.timeout, Duration::from_secs(7));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let cfg = parse(&["--google-api-key", "abc", "--gemini-base-url", "ftp://x"]);
        assert!(matches!(cfg.gemini(), Err(ConfigError::InvalidValue { name: "GEMINI_BASE_URL", .. })));
    }

    #[test]
    fn yolo_params_are_validated() {
        let cfg = parse(&["--input-size", "641"]);
        assert!(cfg.yolo_params().is_err());

        let cfg = parse(&["--input-size", "320", "--iou-threshold", "0.5", "--max-detections", "10"]);
        let p = cfg.yolo_params().unwrap();
        assert_eq!(p.input_size, 320);
        assert_eq!(p.max_detections, 10);
    }

    #[test]
    fn model_id_uses_file_stem() {
        let cfg = parse(&["--model-path", "weights/yolov8s.onnx"]);
        assert_eq!(cfg.model_id().name, "yolov8s");
    }
}
