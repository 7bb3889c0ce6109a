//! # Configuração
//!
//! Cada opção aceita flag de linha de comando **ou** variável de ambiente,
//! nessa ordem de prioridade, com um default:
//!
//! | Flag | Env | Default |
//! |------|-----|---------|
//! | `--host` | `HOST` | `0.0.0.0` |
//! | `--port` | `PORT` | `5001` |
//! | `--cors-origin` | `CORS_ORIGIN` | `http://localhost:5173` |
//! | `--intents` | `INTENTS_PATH` | `data/intents.json` |
//! | `--model` | `EMBEDDING_MODEL` | `sentence-transformers/all-MiniLM-L6-v2` |
//! | `--request-timeout-secs` | `REQUEST_TIMEOUT_SECS` | `30` |

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::nlu::embedder::DEFAULT_MODEL_ID;

#[derive(Debug, Parser)]
#[command(name = "empathic-chat", version, about = "Empathic intent-matching chat service")]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Sobe o servidor HTTP (padrão).
    Serve,
    /// Conversa no terminal, sem servidor.
    Chat,
}

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Endereço de bind do servidor.
    #[arg(long, env = "HOST", default_value = "0.0.0.0", global = true)]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 5001, global = true)]
    pub port: u16,

    /// Única origem do frontend autorizada via CORS.
    #[arg(long, env = "CORS_ORIGIN", default_value = "http://localhost:5173", global = true)]
    pub cors_origin: String,

    /// Arquivo JSON com o catálogo de intents.
    #[arg(long = "intents", env = "INTENTS_PATH", default_value = "data/intents.json", global = true)]
    pub intents_path: PathBuf,

    /// Repositório do HuggingFace Hub com o modelo de embeddings.
    #[arg(long = "model", env = "EMBEDDING_MODEL", default_value = DEFAULT_MODEL_ID, global = true)]
    pub model_id: String,

    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
