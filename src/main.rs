mod adapters;
mod application;
mod config;
mod domain;

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

use crate::adapters::{
    gemini::GeminiClient,
    http::{router, state::HttpState},
    onnx::{detector::OnnxDetector, model_catalog::OnnxModelCatalog, yolo_engine::OnnxYoloEngine},
};
use crate::application::{
    dto::{ConfidenceControl, UiConfigResponse},
    ports::ModelCatalogPort,
    services::{DetectionService, SessionRegistry},
};
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Variables de entorno (.env opcional) y logs (RUST_LOG=info por defecto)
    let _ = dotenvy::dotenv();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 2. Configuración. Sin credencial no se sirve nada.
    let cfg = AppConfig::parse();
    let (gemini_cfg, yolo_params) = match (cfg.gemini(), cfg.yolo_params()) {
        (Ok(g), Ok(y)) => (g, y),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("⚠️ {}", e);
            eprintln!("⚠️ Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    tracing::info!("🔧 Inicializando adaptadores de infraestructura...");

    // 3. Adaptadores: detector ONNX y cliente Gemini, construidos una sola vez.
    let model = cfg.model_id();
    OnnxModelCatalog::new().validate_model(&model).await?;
    let engine = OnnxYoloEngine::load(&model.onnx_path)?;
    tracing::info!("🧠 Modelo YOLO '{}' cargado desde {}", model.name, model.onnx_path);

    let detector = Arc::new(OnnxDetector::new(engine, yolo_params));
    let generator = Arc::new(GeminiClient::new(gemini_cfg).context("cliente Gemini")?);
    let chat_model = generator.model().to_string();

    // 4. Servicios (casos de uso) y estado de la API
    let state = HttpState {
        detection: Arc::new(DetectionService::new(detector)),
        sessions: Arc::new(SessionRegistry::new(generator)),
        ui: Arc::new(UiConfigResponse {
            confidence: ConfidenceControl::default(),
            detector_model: model.name.clone(),
            chat_model,
        }),
    };

    // 5. Router de Axum y archivos estáticos
    let app = router(state).fallback_service(ServeDir::new(&cfg.static_dir));

    // 6. Lanzar el servidor
    tracing::info!("🚀 Servidor iniciado en http://{}", cfg.bind_addr);
    tracing::info!("📂 Archivos estáticos servidos desde '{}'", cfg.static_dir);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Servidor detenido");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("No se pudo instalar el manejador de Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Señal de parada recibida");
}
