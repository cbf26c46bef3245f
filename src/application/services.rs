use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    application::{
        chat::ChatOrchestrator,
        ports::{DetectionOutcome, GenerativeTextPort, ObjectDetectionPort},
    },
    domain::{
        detection::DetectionRecord,
        errors::{DomainError, DomainResult},
        model::validate_threshold,
        summary::{summarize, to_human_summary, Locale},
    },
};

/// Servicio de detección: valida la petición y delega en el adaptador del modelo.
#[derive(Clone)]
pub struct DetectionService {
    detector: Arc<dyn ObjectDetectionPort>,
}

impl DetectionService {
    pub fn new(detector: Arc<dyn ObjectDetectionPort>) -> Self {
        Self { detector }
    }

    pub async fn detect(&self, image: &[u8], threshold: f32) -> DomainResult<DetectionOutcome> {
        if image.is_empty() {
            return Err(DomainError::InvalidInput("imagen vacía".into()));
        }
        let threshold = validate_threshold(threshold)?;
        self.detector.detect(image, threshold).await
    }
}

/// Resultado de analizar una imagen dentro de una sesión.
#[derive(Debug, Clone)]
pub struct ImageAnalysis {
    pub annotated_png: Vec<u8>,
    pub records: Vec<DetectionRecord>,
    pub summary: String,
    pub description: String,
}

/// Estado de una sesión: su propio chat y la última imagen analizada.
pub struct ChatSession {
    pub chat: ChatOrchestrator,
    pub last_detections: Vec<DetectionRecord>,
    pub image_description: Option<String>,
}

impl ChatSession {
    pub fn new(generator: Arc<dyn GenerativeTextPort>) -> Self {
        Self {
            chat: ChatOrchestrator::new(generator),
            last_detections: Vec::new(),
            image_description: None,
        }
    }

    /// Contexto para el chat: solo si la última imagen tuvo detecciones.
    pub fn detection_context(&self) -> Option<String> {
        if self.last_detections.is_empty() {
            return None;
        }
        Some(to_human_summary(&summarize(&self.last_detections), Locale::English))
    }

    /// Detecta, reemplaza las detecciones anteriores y genera la descripción.
    pub async fn analyze(
        &mut self,
        detection: &DetectionService,
        image: &[u8],
        threshold: f32,
    ) -> DomainResult<ImageAnalysis> {
        let outcome = detection.detect(image, threshold).await?;
        let summary = to_human_summary(&summarize(&outcome.records), Locale::English);
        info!("🎯 {} object(s) detected: {}", outcome.records.len(), summary);

        let description = self.chat.describe_image(&outcome.records).await;
        self.last_detections = outcome.records.clone();
        self.image_description = Some(description.clone());

        Ok(ImageAnalysis {
            annotated_png: outcome.annotated_png,
            records: outcome.records,
            summary,
            description,
        })
    }

    pub async fn send(&mut self, message: &str) -> String {
        let context = self.detection_context();
        self.chat.send(message, context.as_deref()).await
    }
}

pub const DEFAULT_SESSION: &str = "default";
/// Máximo de sesiones vivas; no hay expulsión, pasado el límite se rechaza.
pub const MAX_SESSIONS: usize = 1024;
const MAX_SESSION_ID_LEN: usize = 128;

/// Una sesión aislada por identificador; nada se comparte entre sesiones.
pub struct SessionRegistry {
    generator: Arc<dyn GenerativeTextPort>,
    sessions: RwLock<HashMap<String, Arc<Mutex<ChatSession>>>>,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(generator: Arc<dyn GenerativeTextPort>) -> Self {
        Self::with_capacity(generator, MAX_SESSIONS)
    }

    pub fn with_capacity(generator: Arc<dyn GenerativeTextPort>, max_sessions: usize) -> Self {
        Self { generator, sessions: RwLock::new(HashMap::new()), max_sessions }
    }

    /// Busca una sesión existente sin crearla.
    pub fn get(&self, session_id: &str) -> DomainResult<Option<Arc<Mutex<ChatSession>>>> {
        let id = normalize_session_id(session_id);
        let lock = self.sessions.read()
            .map_err(|_| DomainError::OperationFailed("Lock de sesiones fallido".into()))?;
        Ok(lock.get(id).cloned())
    }

    pub fn get_or_create(&self, session_id: &str) -> DomainResult<Arc<Mutex<ChatSession>>> {
        if let Some(s) = self.get(session_id)? {
            return Ok(s);
        }

        let id = normalize_session_id(session_id);
        let mut lock = self.sessions.write()
            .map_err(|_| DomainError::OperationFailed("Lock de sesiones fallido".into()))?;
        if let Some(s) = lock.get(id) {
            return Ok(s.clone());
        }
        if lock.len() >= self.max_sessions {
            warn!("⚠️ Límite de {} sesiones alcanzado, rechazando '{}'", self.max_sessions, id);
            return Err(DomainError::Unavailable(format!(
                "límite de {} sesiones alcanzado",
                self.max_sessions
            )));
        }

        info!("🆕 Nueva sesión: {}", id);
        let session = Arc::new(Mutex::new(ChatSession::new(self.generator.clone())));
        lock.insert(id.to_string(), session.clone());
        Ok(session)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }
}

fn normalize_session_id(raw: &str) -> &str {
    let id = raw.trim();
    if id.is_empty() || id.len() > MAX_SESSION_ID_LEN {
        DEFAULT_SESSION
    } else {
        id
    }
}
