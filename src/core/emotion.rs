//! # Categorias de Emoção
//!
//! A [`Emotion`] é derivada da polaridade de sentimento da mensagem
//! (ver [`crate::nlu::sentiment`]) e decide duas coisas na resposta:
//!
//! | Emoção | Polaridade | Preâmbulo? |
//! |--------|------------|------------|
//! | `SevereDistress` | `p <= -0.5` | sim |
//! | `MildDistress` | `-0.5 < p < 0` | sim |
//! | `Neutral` | `0 <= p <= 0.5` | não |
//! | `Positive` | `p > 0.5` | não |
//!
//! O mapeamento emoção → respostas de fallback é um `match` exaustivo:
//! adicionar uma variante sem respostas não compila.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    SevereDistress,
    MildDistress,
    Neutral,
    Positive,
}

impl Emotion {
    /// Classifica uma polaridade em `[-1, 1]` em uma das quatro categorias.
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity <= -0.5 {
            Emotion::SevereDistress
        } else if polarity < 0.0 {
            Emotion::MildDistress
        } else if polarity > 0.5 {
            Emotion::Positive
        } else {
            Emotion::Neutral
        }
    }

    /// Frase empática prefixada à resposta (só para as categorias de sofrimento).
    pub fn preamble(self) -> Option<&'static str> {
        match self {
            Emotion::SevereDistress => {
                Some("I can hear that you're going through a really difficult time.")
            }
            Emotion::MildDistress => Some("I understand this is challenging."),
            Emotion::Neutral | Emotion::Positive => None,
        }
    }

    /// Respostas usadas quando nenhum intent do catálogo casa com a mensagem.
    pub fn fallback_responses(self) -> &'static [&'static str] {
        match self {
            Emotion::SevereDistress => &[
                "I hear how difficult this is for you. Would you like to tell me more about what's troubling you?",
                "You're showing great courage in sharing this. Can you help me understand what you're going through?",
                "Thank you for trusting me with something this heavy. What feels hardest right now?",
            ],
            Emotion::MildDistress => &[
                "That sounds challenging. Would you like to explore these feelings together?",
                "I'm here to listen and support you. What would be most helpful right now?",
                "It makes sense to feel this way. What has been weighing on you the most?",
            ],
            Emotion::Neutral => &[
                "I'm here to listen. Would you like to tell me more?",
                "Could you share more about what's on your mind?",
            ],
            Emotion::Positive => &[
                "I'm glad you're sharing this with me. Would you like to tell me more?",
                "Thank you for sharing. What else is on your mind?",
                "That's lovely to hear. What's been helping you feel this way?",
            ],
        }
    }

    /// Aplica o preâmbulo da categoria (se houver) a uma resposta já escolhida.
    pub fn frame(self, response: &str) -> String {
        match self.preamble() {
            Some(preamble) => format!("{} {}", preamble, response),
            None => response.to_string(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Emotion::SevereDistress => "severe_distress",
            Emotion::MildDistress => "mild_distress",
            Emotion::Neutral => "neutral",
            Emotion::Positive => "positive",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
