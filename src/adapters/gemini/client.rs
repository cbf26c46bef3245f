use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::application::ports::GenerativeTextPort;
use crate::domain::errors::GenerationError;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub temperature: Option<f32>,
}

/// Cliente de `generateContent`: un prompt de entrada, un texto de salida.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: Option<f32>,
}

impl GeminiClient {
    /// Falla solo si no se puede construir el cliente HTTP (p. ej. backend TLS).
    pub fn new(cfg: GeminiConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| GenerationError::Transport(format!("no se pudo crear el cliente HTTP: {}", e)))?;

        Ok(Self {
            client,
            api_key: cfg.api_key,
            model: cfg.model,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            temperature: cfg.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, urlencoding::encode(&self.model))
    }

    fn request_body(&self, prompt: &str) -> Value {
        let mut body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        });
        if let Some(t) = self.temperature {
            body["generationConfig"] = json!({ "temperature": t.clamp(0.0, 2.0) });
        }
        body
    }
}

#[async_trait]
impl GenerativeTextPort for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!("📤 Sending {} chars to {}", prompt.chars().count(), self.model);

        // La clave va en cabecera para que nunca aparezca en la URL de los errores.
        let res = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| {
                error!("❌ Gemini request failed: {}", e);
                GenerationError::Transport(e.without_url().to_string())
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            error!("❌ Gemini returned HTTP {}: {}", status, body);
            return Err(GenerationError::Api { status: status.as_u16(), body: api_error_message(&body) });
        }

        let json_resp: Value = res
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(e.without_url().to_string()))?;
        let text = extract_text(&json_resp)?;
        info!("✅ Gemini replied with {} chars", text.chars().count());
        Ok(text)
    }
}

/// Concatena las partes de texto del primer candidato.
pub fn extract_text(resp: &Value) -> Result<String, GenerationError> {
    if let Some(reason) = resp["promptFeedback"]["blockReason"].as_str() {
        return Err(GenerationError::Blocked(reason.to_string()));
    }

    let candidate = &resp["candidates"][0];
    if candidate.is_null() {
        return Err(GenerationError::EmptyResponse);
    }

    let text: String = candidate["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return match candidate["finishReason"].as_str() {
            Some(reason @ ("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT")) => {
                Err(GenerationError::Blocked(reason.to_string()))
            }
            _ => Err(GenerationError::EmptyResponse),
        };
    }
    Ok(text.trim().to_string())
}

/// Mensaje legible del cuerpo de error de la API, o el cuerpo tal cual.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_owned))
        .unwrap_or_else(|| body.chars().take(300).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::{HeaderMap, StatusCode}, routing::post, Json, Router};

    #[test]
    fn extracts_and_joins_parts() {
        let resp = json!({
            "candidates": [{ "content": { "parts": [{ "text": "ሰላም " }, { "text": "ነው" }] } }]
        });
        assert_eq!(extract_text(&resp).unwrap(), "ሰላም ነው");
    }

    #[test]
    fn blocked_prompt_is_reported() {
        let resp = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(matches!(extract_text(&resp), Err(GenerationError::Blocked(r)) if r == "SAFETY"));

        let resp = json!({ "candidates": [{ "finishReason": "SAFETY" }] });
        assert!(matches!(extract_text(&resp), Err(GenerationError::Blocked(_))));
    }

    #[test]
    fn missing_or_blank_text_is_empty_response() {
        assert!(matches!(extract_text(&json!({})), Err(GenerationError::EmptyResponse)));
        let resp = json!({ "candidates": [{ "content": { "parts": [{ "text": "  " }] } }] });
        assert!(matches!(extract_text(&resp), Err(GenerationError::EmptyResponse)));
    }

    #[test]
    fn api_error_message_prefers_structured_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid"}}"#;
        assert_eq!(api_error_message(body), "API key not valid");
        assert_eq!(api_error_message("plain"), "plain");
    }

    #[test]
    fn body_carries_prompt_and_temperature() {
        let client = GeminiClient::new(config("http://localhost".into(), Some(5.0))).unwrap();
        let body = client.request_body("hi");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(body["generationConfig"]["temperature"], 2.0);
    }

    #[test]
    fn new_builds_client_from_config() {
        let client = GeminiClient::new(config("http://localhost/v1beta/".into(), None)).unwrap();
        assert_eq!(client.model(), "gemini-test");
        assert_eq!(client.endpoint(), "http://localhost/v1beta/models/gemini-test:generateContent");
    }

    fn config(base_url: String, temperature: Option<f32>) -> GeminiConfig {
        GeminiConfig {
            api_key: "test-key".into(),
            model: "gemini-test".into(),
            base_url,
            timeout: Duration::from_secs(5),
            temperature,
        }
    }

    async fn fake_gemini() -> String {
        async fn generate(
            Path(model): Path<String>,
            headers: HeaderMap,
            Json(body): Json<Value>,
        ) -> (StatusCode, Json<Value>) {
            if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
                return (StatusCode::FORBIDDEN, Json(json!({ "error": { "message": "bad key" } })));
            }
            let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default();
            if prompt == "fail" {
                return (StatusCode::TOO_MANY_REQUESTS, Json(json!({ "error": { "message": "quota" } })));
            }
            let text = format!("{} says: {}", model, prompt);
            (StatusCode::OK, Json(json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })))
        }

        let app = Router::new().route("/v1beta/models/:call", post(generate));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1beta", addr)
    }

    #[tokio::test]
    async fn generate_round_trips_through_http() {
        let client = GeminiClient::new(config(fake_gemini().await, None)).unwrap();
        let text = client.generate("hello").await.unwrap();
        assert_eq!(text, "gemini-test:generateContent says: hello");
    }

    #[tokio::test]
    async fn http_errors_become_api_errors() {
        let client = GeminiClient::new(config(fake_gemini().await, None)).unwrap();
        let err = client.generate("fail").await.unwrap_err();
        assert!(matches!(err, GenerationError::Api { status: 429, ref body } if body == "quota"));
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        let client = GeminiClient::new(config("http://127.0.0.1:9/v1beta".into(), None)).unwrap();
        assert!(matches!(client.generate("x").await, Err(GenerationError::Transport(_))));
    }
}
