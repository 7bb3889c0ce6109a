//! # Módulo Web — API JSON do Chat
//!
//! Camada fina sobre o [`MentalHealthBot`](crate::bot::MentalHealthBot),
//! construída com **Axum** + **tower-http** (CORS).
//!
//! ## Rotas
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Frontend (única origem permitida via CORS)               │
//! ├──────────────────────────────────────────────────────────┤
//! │ Axum Router, prefixo /api                                │
//! │  ├── POST    /api/chat     → { "response": "..." }       │
//! │  ├── OPTIONS /api/chat     → {}                          │
//! │  ├── GET     /api/status   → { "ready", "intents" }      │
//! │  └── GET     /api/session  → histórico da sessão         │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! CORS: métodos GET/POST/OPTIONS e header `Content-Type`. Só requisições
//! com header `Origin` passam pelo `CorsLayer`; um `OPTIONS` sem `Origin`
//! chega ao handler e recebe `{}`.

pub mod handlers;
pub mod state;

use std::convert::Infallible;

use anyhow::{Context, Result};
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceExt;
use tower_http::cors::{AllowOrigin, CorsLayer};

use state::AppState;

/// Cria o router com todas as rotas sob `/api` e o CORS restrito a `cors_origin`.
///
/// # Erros
///
/// Retorna erro se `cors_origin` não for um valor de header válido.
pub fn create_router(state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = HeaderValue::from_str(cors_origin)
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;

    // list() só ecoa o header quando a origem da requisição casa
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let api = Router::new()
        .route("/chat", post(handlers::chat).options(handlers::chat_options))
        .route("/status", get(handlers::status))
        .route("/session", get(handlers::session));

    let app = Router::new().nest("/api", api).with_state(state);
    let cross_origin = app.clone().layer(cors);

    Ok(app.layer(middleware::from_fn_with_state(cross_origin, route_by_origin)))
}

/// Desvia para o router com CORS quando a requisição traz `Origin`.
async fn route_by_origin(
    State(cross_origin): State<Router>,
    request: Request,
    next: Next,
) -> Response {
    if request.headers().contains_key(header::ORIGIN) {
        cross_origin
            .oneshot(request)
            .await
            .unwrap_or_else(|never: Infallible| match never {})
    } else {
        next.run(request).await
    }
}
