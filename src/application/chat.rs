use std::sync::Arc;
use tracing::{info, warn};

use crate::application::{ports::GenerativeTextPort, prompt::PromptComposer};
use crate::domain::{
    conversation::{ConversationStore, ConversationTurn},
    detection::DetectionRecord,
    errors::GenerationError,
    summary::summarize,
};

/// Prefijo de la respuesta de disculpa cuando falla el servicio generativo.
pub const FALLBACK_PREFIX: &str = "ይቅርታ፣ ስህተት ተፈጥሯል:";

pub fn fallback_reply(err: &GenerationError) -> String {
    format!("{} {}", FALLBACK_PREFIX, err)
}

/// Fachada del chat: compone el prompt, llama al modelo y registra el turno.
///
/// Nunca devuelve error: los fallos del modelo se convierten en contenido del chat
/// para que la interfaz siga funcionando turno a turno.
pub struct ChatOrchestrator {
    generator: Arc<dyn GenerativeTextPort>,
    composer: PromptComposer,
    store: ConversationStore,
}

impl ChatOrchestrator {
    pub fn new(generator: Arc<dyn GenerativeTextPort>) -> Self {
        Self {
            generator,
            composer: PromptComposer::new(),
            store: ConversationStore::new(),
        }
    }

    /// El mensaje vacío no se envía; esa validación es del llamador.
    pub async fn send(&mut self, user_message: &str, detection_context: Option<&str>) -> String {
        self.store.append(ConversationTurn::user(user_message));

        let prompt = self.composer.compose(user_message, detection_context);
        let reply = self.generate_or_fallback(&prompt).await;

        self.store.append(ConversationTurn::assistant(
            reply.clone(),
            detection_context.map(str::to_owned),
        ));
        reply
    }

    /// Descripción breve de la última imagen. No toca el historial.
    pub async fn describe_image(&self, records: &[DetectionRecord]) -> String {
        let summary = summarize(records);
        let prompt = self.composer.compose_image_description_prompt(&summary);
        self.generate_or_fallback(&prompt).await
    }

    pub fn history(&self) -> &[ConversationTurn] {
        self.store.all_turns()
    }

    pub fn clear_history(&mut self) {
        self.store.clear();
        info!("🧹 Chat history cleared");
    }

    async fn generate_or_fallback(&self, prompt: &str) -> String {
        match self.generator.generate(prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("⚠️ Generation returned blank text, replying with fallback");
                fallback_reply(&GenerationError::EmptyResponse)
            }
            Err(e) => {
                warn!("⚠️ Generation failed, replying with fallback: {}", e);
                fallback_reply(&e)
            }
        }
    }
}
