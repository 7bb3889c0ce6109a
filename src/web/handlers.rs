//! # Handlers HTTP
//!
//! | Handler | Método | Retorno |
//! |---------|--------|---------|
//! | `chat` | POST | `{ "response" }` ou `{ "error" }` |
//! | `chat_options` | OPTIONS | `{}` |
//! | `status` | GET | `{ "ready", "intents" }` |
//! | `session` | GET | snapshot da sessão |
//!
//! ## Mapeamento de erros do `/api/chat`
//!
//! | Situação | Status |
//! |----------|--------|
//! | mensagem vazia, nula ou ausente | 400 |
//! | corpo que não é um `ChatRequest` | status da rejeição, corpo JSON |
//! | erro fatal do bot ou worker em pânico | 500 |
//! | excedeu `request_timeout` | 503 |

use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::state::AppState;
use crate::bot::TurnTicket;
use crate::core::SessionState;
use crate::error::BotError;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub ready: bool,
    pub intents: usize,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// POST `/api/chat` — processa uma mensagem.
///
/// ## Fluxo
///
/// ```text
/// 1. Valida o corpo e o campo "message" (não vazio)
/// 2. spawn_blocking(bot.process_with)  — encoder é CPU-bound
/// 3. tokio::time::timeout(request_timeout)
/// 4. Serializa { "response": ... }
/// ```
///
/// No timeout o worker continua rodando, mas o [`TurnTicket`] abandonado
/// impede que ele grave um turno cuja resposta nunca foi entregue. Se o
/// worker já gravou, a resposta é aguardada e entregue normalmente.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Rejected chat body");
            return error_response(rejection.status(), "Invalid request body");
        }
    };
    let message = req.message.unwrap_or_default().trim().to_string();
    if message.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No message provided");
    }

    let t0 = Instant::now();
    let bot = state.bot.clone();
    let ticket = TurnTicket::new(state.request_timeout);
    let worker_ticket = ticket.clone();
    let mut worker = tokio::task::spawn_blocking(move || bot.process_with(&message, &worker_ticket));

    let outcome = tokio::time::timeout(state.request_timeout, &mut worker).await;
    let joined = match outcome {
        Ok(joined) => joined,
        Err(_) if ticket.try_abandon() => {
            let e = BotError::Timeout(state.request_timeout);
            tracing::warn!(error = %e, "Chat request timed out");
            return error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable",
            );
        }
        // Turno já gravado: só falta a resposta
        Err(_) => worker.await,
    };

    match joined {
        Ok(Ok(response)) => {
            tracing::debug!(elapsed_ms = t0.elapsed().as_millis() as u64, "Chat message processed");
            Json(ChatResponse { response }).into_response()
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Error processing message");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
        Err(e) => {
            tracing::error!(error = %e, "Chat worker panicked");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// OPTIONS `/api/chat` sem cabeçalhos de preflight. O preflight CORS de
/// verdade é respondido pelo `CorsLayer` antes de chegar aqui.
pub async fn chat_options() -> Json<serde_json::Value> {
    Json(serde_json::json!({}))
}

/// GET `/api/status` — o bot sempre está pronto quando o servidor responde.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        ready: true,
        intents: state.bot.nlu().catalog().len(),
    })
}

/// GET `/api/session` — histórico, emoção corrente e flag de crise.
pub async fn session(State(state): State<AppState>) -> Json<SessionState> {
    Json(state.bot.session_snapshot())
}
