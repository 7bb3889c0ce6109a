//! # Estado da Aplicação Web
//!
//! O bot é carregado **antes** do servidor subir (falha de carga aborta o
//! processo), então o estado já nasce pronto.
//!
//! ```text
//! main()
//!   ├── spawn_blocking: catálogo + modelo + embeddings
//!   └── AppState { bot, request_timeout } → Router
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::bot::MentalHealthBot;

/// Estado compartilhado da aplicação Axum.
#[derive(Clone)]
pub struct AppState {
    /// Bot compartilhado; a sessão tem seu próprio `Mutex` interno.
    pub bot: Arc<MentalHealthBot>,
    /// Tempo máximo de processamento de uma mensagem.
    pub request_timeout: Duration,
}
