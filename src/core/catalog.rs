//! # Catálogo de Intents
//!
//! O [`IntentCatalog`] é a coleção estática de intents carregada uma única
//! vez no startup a partir de um JSON:
//!
//! ```text
//! {
//!   "intents": [
//!     { "tag": "greeting",
//!       "patterns": ["hello", "hi"],
//!       "responses": ["Hi there!"] }
//!   ]
//! }
//! ```
//!
//! Após o carregamento o catálogo é imutável. Os embeddings dos patterns
//! ficam em [`PatternEmbeddings`](crate::nlu::intent::PatternEmbeddings).

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BotError;

/// Uma intenção: tag única, frases-exemplo e respostas candidatas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub tag: String,
    /// Frases-exemplo, na ordem do arquivo (âncoras de similaridade).
    pub patterns: Vec<String>,
    pub responses: Vec<String>,
}

/// Formato do documento em disco.
#[derive(Deserialize)]
struct CatalogFile {
    intents: Vec<Intent>,
}

/// Catálogo validado de intents, na ordem em que aparecem no arquivo.
///
/// A ordem importa: em empates de similaridade vence o primeiro intent.
#[derive(Clone, Debug)]
pub struct IntentCatalog {
    intents: Vec<Intent>,
}

impl IntentCatalog {
    /// Lê e valida o catálogo em `path`.
    ///
    /// # Erros
    ///
    /// - [`BotError::Load`] se o arquivo não existir ou não for JSON válido
    /// - [`BotError::InvalidCatalog`] se alguma invariante for violada
    pub fn load(path: &Path) -> Result<Self, BotError> {
        let json = std::fs::read_to_string(path).map_err(|e| BotError::Load {
            resource: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let catalog = Self::from_json(&json).map_err(|e| match e {
            BotError::Load { reason, .. } => BotError::Load {
                resource: path.display().to_string(),
                reason,
            },
            other => other,
        })?;
        tracing::info!(
            path = %path.display(),
            intents = catalog.len(),
            patterns = catalog.pattern_count(),
            "Intent catalog loaded"
        );
        Ok(catalog)
    }

    /// Faz o parse de um documento JSON já em memória.
    pub fn from_json(json: &str) -> Result<Self, BotError> {
        let file: CatalogFile = serde_json::from_str(json).map_err(|e| BotError::Load {
            resource: "intent catalog".to_string(),
            reason: e.to_string(),
        })?;
        Self::new(file.intents)
    }

    /// Valida e constrói o catálogo.
    ///
    /// Invariantes: ao menos um intent; tags não vazias e únicas;
    /// cada intent com ≥ 1 pattern e ≥ 1 response.
    pub fn new(intents: Vec<Intent>) -> Result<Self, BotError> {
        if intents.is_empty() {
            return Err(BotError::InvalidCatalog("catalog has no intents".into()));
        }

        let mut seen = HashSet::new();
        for (i, intent) in intents.iter().enumerate() {
            if intent.tag.trim().is_empty() {
                return Err(BotError::InvalidCatalog(format!(
                    "intent #{} has an empty tag",
                    i
                )));
            }
            if !seen.insert(intent.tag.as_str()) {
                return Err(BotError::InvalidCatalog(format!(
                    "duplicate tag '{}'",
                    intent.tag
                )));
            }
            if intent.patterns.is_empty() {
                return Err(BotError::InvalidCatalog(format!(
                    "intent '{}' has no patterns",
                    intent.tag
                )));
            }
            if intent.responses.is_empty() {
                return Err(BotError::InvalidCatalog(format!(
                    "intent '{}' has no responses",
                    intent.tag
                )));
            }
        }

        Ok(Self { intents })
    }

    pub fn intents(&self) -> &[Intent] {
        &self.intents
    }

    pub fn get(&self, tag: &str) -> Option<&Intent> {
        self.intents.iter().find(|i| i.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    /// Total de patterns somando todos os intents.
    pub fn pattern_count(&self) -> usize {
        self.intents.iter().map(|i| i.patterns.len()).sum()
    }
}
