#![allow(dead_code)]
//! # Empathic Chat
//!
//! **Ponto de entrada principal** do serviço de chat de apoio emocional.
//!
//! Recebe uma mensagem livre e devolve uma resposta roteirizada, escolhida
//! por similaridade semântica contra um catálogo fixo de intents, com
//! detecção de crise e um tom emocional ajustado ao sentimento da mensagem.
//!
//! ## Fluxo de Inicialização
//!
//! ```text
//! main()
//!   ├── Configura tracing/logging
//!   ├── Lê flags/env (clap)
//!   ├── spawn_blocking:
//!   │   ├── Carrega catálogo (data/intents.json)
//!   │   ├── Carrega MiniLM via HuggingFace Hub
//!   │   └── Embedda todos os patterns → NluPipeline → MentalHealthBot
//!   └── Subcomando:
//!       ├── serve (padrão) → axum em HOST:PORT
//!       └── chat           → conversa no terminal
//! ```
//!
//! Qualquer falha de carga aborta o processo com o diagnóstico completo.
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! # Servidor em 0.0.0.0:5001
//! cargo run
//!
//! # Porta e origem do frontend customizadas, logs detalhados
//! RUST_LOG=debug PORT=8080 CORS_ORIGIN=https://app.example.org cargo run
//!
//! # Conversa no terminal
//! cargo run -- chat
//! ```

/// Módulo `bot` — compositor de respostas e estado da sessão.
mod bot;

/// Módulo `chat` — conversa interativa no terminal.
mod chat;

/// Módulo `config` — flags e variáveis de ambiente.
mod config;

/// Módulo `core` — catálogo, emoções e sessão.
mod core;

/// Módulo `error` — taxonomia de erros do bot.
mod error;

/// Módulo `nlu` — encoder, matcher de intents, segurança e sentimento.
mod nlu;

/// Módulo `web` — servidor axum e handlers JSON.
mod web;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::bot::MentalHealthBot;
use crate::config::{Cli, Command, Config};
use crate::core::IntentCatalog;
use crate::nlu::embedder::{Embedder, Encoder};
use crate::nlu::sentiment::LexiconAnalyzer;
use crate::nlu::NluPipeline;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controla o nível; padrão "info"
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    tracing::info!("Empathic Chat — Starting...");

    // Download do modelo e forward passes são bloqueantes
    let load_config = config.clone();
    let bot = tokio::task::spawn_blocking(move || load_bot(&load_config))
        .await
        .context("Bot initialization task failed")??;
    let bot = Arc::new(bot);
    tracing::info!("✅ Bot ready!");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(bot, &config).await,
        Command::Chat => tokio::task::spawn_blocking(move || chat::run(&bot))
            .await
            .context("Chat task failed")?,
    }
}

/// Carrega catálogo e modelo e embedda os patterns.
///
/// # Erros
///
/// Catálogo ausente/inválido ou modelo indisponível — ambos fatais.
fn load_bot(config: &Config) -> Result<MentalHealthBot> {
    let catalog = IntentCatalog::load(&config.intents_path)
        .context("Failed to load intent catalog")?;

    let embedder = Embedder::load(&config.model_id).map_err(|e| error::BotError::Load {
        resource: config.model_id.clone(),
        reason: format!("{:#}", e),
    })?;

    Ok(build_bot(catalog, Arc::new(embedder))?)
}

/// Embedda os patterns e monta o bot. Falha do encoder aqui é erro de carga.
fn build_bot(
    catalog: IntentCatalog,
    encoder: Arc<dyn Encoder>,
) -> Result<MentalHealthBot, error::BotError> {
    let nlu = NluPipeline::new(catalog, encoder, Box::new(LexiconAnalyzer::new())).map_err(
        |e| error::BotError::Load {
            resource: "pattern embeddings".to_string(),
            reason: e.to_string(),
        },
    )?;

    Ok(MentalHealthBot::new(Arc::new(nlu)))
}

async fn serve(bot: Arc<MentalHealthBot>, config: &Config) -> Result<()> {
    let state = AppState {
        bot,
        request_timeout: config.request_timeout(),
    };
    let app = web::create_router(state, &config.cors_origin)?;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(cors_origin = %config.cors_origin, "🚀 Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
