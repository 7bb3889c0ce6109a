//! # Estado de Sessão
//!
//! O [`SessionState`] guarda o histórico da conversa de um bot durante a
//! vida do processo. Nada é persistido.
//!
//! ## Flag de crise
//!
//! `crisis_mode` é **pegajoso**: uma vez ligado por
//! [`SessionState::enter_crisis_mode()`], não existe método que o desligue.
//! Os campos são privados para garantir isso.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::emotion::Emotion;

/// Um turno processado: entrada, resposta final, emoção e intent casado.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConversationTurn {
    pub user_input: String,
    pub response: String,
    pub emotion: Emotion,
    /// Tag do intent casado, ou `None` quando a resposta veio do fallback.
    pub intent: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(
        user_input: impl Into<String>,
        response: impl Into<String>,
        emotion: Emotion,
        intent: Option<String>,
    ) -> Self {
        Self {
            user_input: user_input.into(),
            response: response.into(),
            emotion,
            intent,
            timestamp: Utc::now(),
        }
    }
}

/// Estado mutável de uma sessão. Protegido por `Mutex` dentro do bot.
#[derive(Clone, Debug, Serialize)]
pub struct SessionState {
    id: Uuid,
    started_at: DateTime<Utc>,
    conversation_history: Vec<ConversationTurn>,
    current_emotion: Option<Emotion>,
    crisis_mode: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            conversation_history: Vec::new(),
            current_emotion: None,
            crisis_mode: false,
        }
    }

    /// Acrescenta um turno e atualiza a emoção corrente.
    pub fn record(&mut self, turn: ConversationTurn) {
        self.current_emotion = Some(turn.emotion);
        self.conversation_history.push(turn);
    }

    pub fn enter_crisis_mode(&mut self) {
        if !self.crisis_mode {
            tracing::warn!(session = %self.id, "Session entered crisis mode");
        }
        self.crisis_mode = true;
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.conversation_history
    }

    pub fn current_emotion(&self) -> Option<Emotion> {
        self.current_emotion
    }

    pub fn crisis_mode(&self) -> bool {
        self.crisis_mode
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
