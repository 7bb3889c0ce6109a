//! # Matcher de Intenção por Similaridade
//!
//! O [`IntentMatcher`] encontra o intent do catálogo mais próximo da
//! mensagem do usuário:
//!
//! ```text
//! Mensagem → encode() → vetor
//!   └── para cada intent (ordem do catálogo)
//!       └── para cada pattern pré-embeddado
//!           → cosine_similarity(vetor, pattern)
//!           → guarda o MAIOR score (empates: primeiro vence)
//! Score > 0.3 → Some(intent)   senão → None
//! ```
//!
//! ## Custo
//!
//! Varredura linear: O(total de patterns) comparações por mensagem,
//! sem índice. Suficiente para dezenas de intents com poucos patterns.

use std::collections::HashMap;

use crate::core::{Intent, IntentCatalog};
use crate::error::BotError;

use super::embedder::Encoder;

/// Score mínimo (exclusivo) para aceitar um intent.
pub const MATCH_THRESHOLD: f32 = 0.3;

/// Vetores pré-computados dos patterns, indexados pela tag do intent.
///
/// As chaves são exatamente as tags do catálogo; cada lista tem um vetor
/// por pattern, na ordem do catálogo.
pub struct PatternEmbeddings {
    by_tag: HashMap<String, Vec<Vec<f32>>>,
}

impl PatternEmbeddings {
    /// Embedda os patterns de cada intent em uma chamada de batch.
    pub fn build(catalog: &IntentCatalog, encoder: &dyn Encoder) -> Result<Self, BotError> {
        let mut by_tag = HashMap::with_capacity(catalog.len());
        for intent in catalog.intents() {
            let vectors = encoder.encode_batch(&intent.patterns)?;
            if vectors.len() != intent.patterns.len() {
                return Err(BotError::Encoding(format!(
                    "encoder returned {} vectors for {} patterns of '{}'",
                    vectors.len(),
                    intent.patterns.len(),
                    intent.tag
                )));
            }
            by_tag.insert(intent.tag.clone(), vectors);
        }
        tracing::info!(
            intents = by_tag.len(),
            patterns = catalog.pattern_count(),
            "Pattern embeddings computed"
        );
        Ok(Self { by_tag })
    }

    pub fn get(&self, tag: &str) -> Option<&[Vec<f32>]> {
        self.by_tag.get(tag).map(Vec::as_slice)
    }
}

/// Resultado de um match acima do threshold.
#[derive(Clone, Copy, Debug)]
pub struct IntentMatch<'a> {
    pub intent: &'a Intent,
    pub score: f32,
}

/// Catálogo + embeddings dos patterns. Imutável após a criação.
pub struct IntentMatcher {
    catalog: IntentCatalog,
    embeddings: PatternEmbeddings,
}

impl IntentMatcher {
    /// Embedda todo o catálogo. Falhas aqui são fatais no startup.
    pub fn new(catalog: IntentCatalog, encoder: &dyn Encoder) -> Result<Self, BotError> {
        let embeddings = PatternEmbeddings::build(&catalog, encoder)?;
        Ok(Self {
            catalog,
            embeddings,
        })
    }

    pub fn catalog(&self) -> &IntentCatalog {
        &self.catalog
    }

    /// Melhor intent para `text`, ou `None` se o score máximo for ≤ 0.3.
    ///
    /// # Erros
    ///
    /// - [`BotError::Encoding`] se o encoder falhar
    /// - [`BotError::InvalidCatalog`] se faltarem vetores para alguma tag
    pub fn find_best_intent(
        &self,
        encoder: &dyn Encoder,
        text: &str,
    ) -> Result<Option<IntentMatch<'_>>, BotError> {
        let input = encoder.encode(text)?;

        let mut best_score = -1.0f32;
        let mut best_intent: Option<&Intent> = None;

        for intent in self.catalog.intents() {
            let vectors = self.embeddings.get(&intent.tag).ok_or_else(|| {
                BotError::InvalidCatalog(format!("no pattern embeddings for '{}'", intent.tag))
            })?;
            for vector in vectors {
                let score = cosine_similarity(&input, vector);
                if score > best_score {
                    best_score = score;
                    best_intent = Some(intent);
                }
            }
        }

        match best_intent {
            Some(intent) if best_score > MATCH_THRESHOLD => {
                tracing::debug!(tag = %intent.tag, score = %format!("{:.3}", best_score), "Intent matched");
                Ok(Some(IntentMatch {
                    intent,
                    score: best_score,
                }))
            }
            _ => {
                tracing::debug!(score = %format!("{:.3}", best_score), "No intent above threshold");
                Ok(None)
            }
        }
    }
}

/// Similaridade cosseno entre dois vetores, limitada a `[-1, 1]`.
///
/// ```text
/// cos(θ) = (A · B) / (‖A‖ × ‖B‖)
/// ```
///
/// Tamanhos diferentes, vetores vazios ou norma zero → 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        // Arredondamento de float pode passar de 1.0 por pouco
        (dot / denom).clamp(-1.0, 1.0)
    }
}
