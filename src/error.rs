//! # Erros do Bot
//!
//! Taxonomia única de erros usada por todos os estágios do pipeline.
//!
//! | Variante | Quando | Recuperável? |
//! |----------|--------|--------------|
//! | [`Load`](BotError::Load) | catálogo/modelo ausente ou corrompido | não (aborta o startup) |
//! | [`InvalidCatalog`](BotError::InvalidCatalog) | intent sem tag/patterns/responses | não |
//! | [`Encoding`](BotError::Encoding) | falha no forward pass do encoder | sim |
//! | [`EmotionDetection`](BotError::EmotionDetection) | analisador de sentimento falhou | sim |
//! | [`Timeout`](BotError::Timeout) | requisição excedeu o limite | sim |
//!
//! Erros recuperáveis viram o texto de desculpas em
//! [`MentalHealthBot::process()`](crate::bot::MentalHealthBot::process);
//! os fatais propagam.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    /// Recurso de inicialização (catálogo ou modelo) indisponível ou malformado.
    #[error("failed to load {resource}: {reason}")]
    Load { resource: String, reason: String },

    /// Catálogo carregado mas viola as invariantes (tag vazia/duplicada, listas vazias).
    #[error("invalid intent catalog: {0}")]
    InvalidCatalog(String),

    #[error("embedding encoder failed: {0}")]
    Encoding(String),

    #[error("emotion detection failed: {0}")]
    EmotionDetection(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl BotError {
    /// `true` para erros por requisição que viram a resposta de desculpas.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BotError::Encoding(_) | BotError::EmotionDetection(_) | BotError::Timeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_kinds() {
        assert!(BotError::Encoding("model gone".into()).is_recoverable());
        assert!(BotError::EmotionDetection("nan".into()).is_recoverable());
        assert!(BotError::Timeout(Duration::from_secs(1)).is_recoverable());
    }

    /// Erros de carga nunca são mascarados pela resposta de desculpas.
    #[test]
    fn test_fatal_kinds() {
        let load = BotError::Load {
            resource: "data/intents.json".into(),
            reason: "not found".into(),
        };
        assert!(!load.is_recoverable());
        assert!(!BotError::InvalidCatalog("empty".into()).is_recoverable());
        assert_eq!(
            load.to_string(),
            "failed to load data/intents.json: not found"
        );
    }
}
