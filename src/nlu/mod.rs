//! # Pipeline NLU — Compreensão da Mensagem
//!
//! O [`NluPipeline`] reúne os componentes que analisam uma mensagem sem
//! tocar no estado da sessão:
//!
//! ```text
//! Mensagem do usuário
//!   ├── 1. NFC normalize (Unicode)
//!   ├── 2. Filtro de segurança (palavras de crise)
//!   └── 3. Em paralelo (rayon::join):
//!       ├── Emoção (polaridade de sentimento)
//!       └── Intent (embedding + cosine similarity)
//! ```
//!
//! ## Sub-módulos
//!
//! | Módulo | Responsabilidade |
//! |--------|-----------------|
//! | [`embedder`] | Trait [`Encoder`] + embeddings MiniLM via candle |
//! | [`intent`] | Embeddings dos patterns e busca do melhor intent |
//! | [`safety`] | Detecção de palavras de crise |
//! | [`sentiment`] | Polaridade por léxico e classificação em [`Emotion`] |

/// Sub-módulo do embedder MiniLM via candle.
pub mod embedder;

/// Sub-módulo do matcher de intenção por similaridade.
pub mod intent;

/// Sub-módulo do filtro de segurança.
pub mod safety;

/// Sub-módulo da análise de sentimento.
pub mod sentiment;

use std::sync::Arc;

use unicode_normalization::UnicodeNormalization;

use crate::core::{Emotion, IntentCatalog};
use crate::error::BotError;

use embedder::Encoder;
use intent::{IntentMatch, IntentMatcher};
use safety::SafetyFilter;
use sentiment::SentimentAnalyzer;

/// Resultado da análise de uma mensagem que não é de crise.
pub struct NluResult<'a> {
    pub emotion: Emotion,
    pub matched: Option<IntentMatch<'a>>,
}

/// Pipeline NLU completo. Imutável (`&self`) após a criação, portanto
/// compartilhável entre requisições concorrentes.
pub struct NluPipeline {
    encoder: Arc<dyn Encoder>,
    matcher: IntentMatcher,
    safety: SafetyFilter,
    analyzer: Box<dyn SentimentAnalyzer>,
}

impl NluPipeline {
    /// Cria o pipeline, embeddando todos os patterns do catálogo.
    ///
    /// # Erros
    ///
    /// Propaga a falha do encoder — no startup isso é fatal.
    pub fn new(
        catalog: IntentCatalog,
        encoder: Arc<dyn Encoder>,
        analyzer: Box<dyn SentimentAnalyzer>,
    ) -> Result<Self, BotError> {
        let matcher = IntentMatcher::new(catalog, encoder.as_ref())?;
        Ok(Self {
            encoder,
            matcher,
            safety: SafetyFilter::new(),
            analyzer,
        })
    }

    pub fn catalog(&self) -> &IntentCatalog {
        self.matcher.catalog()
    }

    /// Normaliza a mensagem para NFC e remove espaços nas pontas.
    pub fn normalize(text: &str) -> String {
        text.nfc().collect::<String>().trim().to_string()
    }

    pub fn is_crisis(&self, text: &str) -> bool {
        self.safety.is_crisis(text)
    }

    /// Emoção da mensagem. Se o analisador falhar, usa `Neutral`.
    pub fn detect_emotion(&self, text: &str) -> Emotion {
        match sentiment::detect_emotion(self.analyzer.as_ref(), text) {
            Ok(emotion) => emotion,
            Err(e) => {
                tracing::warn!(error = %e, "Emotion detection failed, using neutral");
                Emotion::Neutral
            }
        }
    }

    pub fn find_best_intent(&self, text: &str) -> Result<Option<IntentMatch<'_>>, BotError> {
        self.matcher.find_best_intent(self.encoder.as_ref(), text)
    }

    /// Emoção e intent calculados lado a lado (sem dependência entre eles).
    pub fn analyze(&self, text: &str) -> Result<NluResult<'_>, BotError> {
        let (emotion, matched) = rayon::join(
            || self.detect_emotion(text),
            || self.find_best_intent(text),
        );
        Ok(NluResult {
            emotion,
            matched: matched?,
        })
    }
}
