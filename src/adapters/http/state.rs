use std::sync::Arc;
use crate::application::{
    dto::UiConfigResponse,
    services::{DetectionService, SessionRegistry},
};

/// Estado compartido para los manejadores HTTP de Axum.
/// Siguiendo la Arquitectura Hexagonal, el estado contiene los servicios (Casos de Uso).
#[derive(Clone)]
pub struct HttpState {
    /// Detección de objetos sobre imágenes subidas.
    pub detection: Arc<DetectionService>,
    /// Una sesión de chat aislada por cliente.
    pub sessions: Arc<SessionRegistry>,
    /// Valores por defecto que la página necesita para pintar sus controles.
    pub ui: Arc<UiConfigResponse>,
}
