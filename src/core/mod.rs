//! # Módulo Core — Tipos Fundamentais do Domínio
//!
//! Tipos que não dependem do modelo de embeddings:
//!
//! - [`Intent`] / [`IntentCatalog`] — catálogo estático de intenções
//! - [`Emotion`] — categoria emocional, preâmbulos e respostas de fallback
//! - [`ConversationTurn`] / [`SessionState`] — histórico da conversa
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use crate::core::{Emotion, IntentCatalog};
//!
//! let catalog = IntentCatalog::from_json(json)?;
//! let emotion = Emotion::from_polarity(-0.7); // SevereDistress
//! ```

/// Sub-módulo com [`Intent`] e [`IntentCatalog`].
pub mod catalog;

/// Sub-módulo com a enumeração [`Emotion`].
pub mod emotion;

/// Sub-módulo com [`ConversationTurn`] e [`SessionState`].
pub mod session;

pub use catalog::{Intent, IntentCatalog};
pub use emotion::Emotion;
pub use session::{ConversationTurn, SessionState};
