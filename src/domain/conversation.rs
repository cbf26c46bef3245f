use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    /// Resumen de detecciones usado al generar este turno. Solo para auditoría,
    /// no se reenvía en turnos posteriores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_context_used: Option<String>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), detection_context_used: None }
    }

    pub fn assistant(content: impl Into<String>, detection_context_used: Option<String>) -> Self {
        Self { role: Role::Assistant, content: content.into(), detection_context_used }
    }
}

/// Historial ordenado de turnos. Solo se añade o se vacía por completo.
#[derive(Debug, Default)]
pub struct ConversationStore {
    turns: Vec<ConversationTurn>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    pub fn all_turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_insertion_order() {
        let mut store = ConversationStore::new();
        store.append(ConversationTurn::user("ሰላም"));
        store.append(ConversationTurn::assistant("ሰላም ነው", Some("I detected: 1 cat".into())));
        store.append(ConversationTurn::user("ሰላም"));

        let turns = store.all_turns();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].detection_context_used.as_deref(), Some("I detected: 1 cat"));
        // Sin deduplicar.
        assert_eq!(turns[0], turns[2]);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut store = ConversationStore::new();
        store.clear();
        assert!(store.all_turns().is_empty());

        store.append(ConversationTurn::user("hi"));
        store.clear();
        assert!(store.all_turns().is_empty());
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_value(ConversationTurn::user("hi")).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json.get("detection_context_used").is_none());
    }
}
