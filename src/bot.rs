//! # Bot — O Compositor de Respostas
//!
//! O [`MentalHealthBot`] é o ponto de entrada do núcleo: recebe o texto do
//! usuário e devolve a resposta final, registrando o turno na sessão.
//!
//! ## Máquina de Estados (uma requisição)
//!
//! ```text
//! START
//!   └── CRISIS_CHECK ── crise? ──► crisis_mode = true → CRISIS_RESPONSE → END
//!         │ não
//!         ▼
//!   EMOTION_AND_MATCH  (rayon::join: emoção ∥ intent)
//!         ▼
//!   COMPOSE   intent casado → resposta aleatória do intent
//!             senão         → resposta aleatória do fallback da emoção
//!             distress      → preâmbulo + " " + resposta
//!         ▼
//!   RECORD    histórico += ConversationTurn; current_emotion = emoção
//!         ▼
//!        END
//! ```
//!
//! ## Erros
//!
//! [`respond()`](MentalHealthBot::respond) propaga qualquer [`BotError`].
//! [`process()`](MentalHealthBot::process) converte os recuperáveis em
//! [`APOLOGY`] e devolve os fatais como `Err`.
//!
//! ## Concorrência
//!
//! O pipeline NLU é imutável e roda fora de qualquer lock. Só o passo
//! RECORD (e a flag de crise) adquire o `Mutex` da sessão, então turnos
//! concorrentes nunca se intercalam no histórico.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::core::{ConversationTurn, Emotion, SessionState};
use crate::error::BotError;
use crate::nlu::safety::CRISIS_RESPONSE;
use crate::nlu::NluPipeline;

/// Resposta fixa quando um estágio falha de forma recuperável.
pub const APOLOGY: &str =
    "I apologize, but I'm having trouble understanding. Could you rephrase that?";

/// Resultado detalhado de um turno.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Reply {
    pub text: String,
    /// `None` em respostas de crise (emoção não é calculada).
    pub emotion: Option<Emotion>,
    pub intent: Option<String>,
    pub crisis: bool,
}

/// Decide quem fecha um turno com timeout: o worker (gravando o turno) ou
/// o chamador (desistindo da resposta). Só o primeiro consegue.
#[derive(Clone, Debug)]
pub struct TurnTicket {
    settled: Arc<AtomicBool>,
    timeout: Duration,
}

impl TurnTicket {
    pub fn new(timeout: Duration) -> Self {
        Self {
            settled: Arc::new(AtomicBool::new(false)),
            timeout,
        }
    }

    fn settle(&self) -> bool {
        self.settled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Chamado pelo worker antes do RECORD.
    fn try_commit(&self) -> bool {
        self.settle()
    }

    /// Chamado por quem desistiu de esperar. `false` se o turno já foi
    /// gravado: nesse caso a resposta precisa ser entregue.
    pub fn try_abandon(&self) -> bool {
        self.settle()
    }
}

/// Bot com uma sessão. Compartilhado via `Arc` entre handlers.
pub struct MentalHealthBot {
    nlu: Arc<NluPipeline>,
    session: Mutex<SessionState>,
}

impl MentalHealthBot {
    pub fn new(nlu: Arc<NluPipeline>) -> Self {
        let session = SessionState::new();
        tracing::info!(session = %session.id(), "Bot session started");
        Self {
            nlu,
            session: Mutex::new(session),
        }
    }

    pub fn nlu(&self) -> &NluPipeline {
        &self.nlu
    }

    /// Processa uma mensagem e devolve só o texto da resposta.
    ///
    /// Erros recuperáveis (encoder, sentimento, timeout) viram [`APOLOGY`]
    /// e o turno não é registrado.
    ///
    /// # Erros
    ///
    /// Só erros fatais (catálogo inconsistente) são propagados.
    pub fn process(&self, message: &str) -> Result<String, BotError> {
        self.finish(self.respond(message))
    }

    /// Como [`process()`](Self::process), mas o turno só é gravado se o
    /// chamador ainda não abandonou o `ticket`.
    pub fn process_with(&self, message: &str, ticket: &TurnTicket) -> Result<String, BotError> {
        self.finish(self.respond_with(message, Some(ticket)))
    }

    fn finish(&self, result: Result<Reply, BotError>) -> Result<String, BotError> {
        match result {
            Ok(reply) => {
                tracing::debug!(
                    crisis = reply.crisis,
                    emotion = ?reply.emotion,
                    intent = ?reply.intent,
                    "Reply composed"
                );
                Ok(reply.text)
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!(error = %e, "Failed to process message, apologizing");
                Ok(APOLOGY.to_string())
            }
            Err(e) => {
                tracing::error!(error = %e, "Fatal error while processing message");
                Err(e)
            }
        }
    }

    /// Executa a máquina de estados completa para uma mensagem.
    pub fn respond(&self, message: &str) -> Result<Reply, BotError> {
        self.respond_with(message, None)
    }

    /// # Erros
    ///
    /// [`BotError::Timeout`] se o `ticket` foi abandonado antes do RECORD;
    /// nada é gravado nesse caso.
    pub fn respond_with(
        &self,
        message: &str,
        ticket: Option<&TurnTicket>,
    ) -> Result<Reply, BotError> {
        let text = NluPipeline::normalize(message);

        // ─── CRISIS_CHECK ─────────────────────────────────────────
        if self.nlu.is_crisis(&text) {
            self.session.lock().enter_crisis_mode();
            return Ok(Reply {
                text: CRISIS_RESPONSE.to_string(),
                emotion: None,
                intent: None,
                crisis: true,
            });
        }

        // ─── EMOTION_AND_MATCH ────────────────────────────────────
        let analysis = self.nlu.analyze(&text)?;
        let emotion = analysis.emotion;

        // ─── COMPOSE ──────────────────────────────────────────────
        let mut rng = rand::thread_rng();
        let (base, intent) = match analysis.matched {
            Some(found) => {
                tracing::debug!(tag = %found.intent.tag, score = found.score, "Composing from intent");
                let response = found.intent.responses.choose(&mut rng).ok_or_else(|| {
                    BotError::InvalidCatalog(format!(
                        "intent '{}' has no responses",
                        found.intent.tag
                    ))
                })?;
                (response.as_str(), Some(found.intent.tag.clone()))
            }
            None => {
                let response = emotion
                    .fallback_responses()
                    .choose(&mut rng)
                    .copied()
                    .unwrap_or(APOLOGY);
                (response, None)
            }
        };
        let response = emotion.frame(base);

        // ─── RECORD ───────────────────────────────────────────────
        let turn = ConversationTurn::new(text, response.clone(), emotion, intent.clone());
        {
            let mut session = self.session.lock();
            if let Some(ticket) = ticket {
                if !ticket.try_commit() {
                    return Err(BotError::Timeout(ticket.timeout));
                }
            }
            session.record(turn);
            tracing::info!(
                session = %session.id(),
                turn = session.history().len(),
                emotion = %emotion,
                intent = intent.as_deref().unwrap_or("-"),
                "Turn recorded"
            );
        }

        Ok(Reply {
            text: response,
            emotion: Some(emotion),
            intent,
            crisis: false,
        })
    }

    /// Cópia do estado atual da sessão (para inspeção/serialização).
    pub fn session_snapshot(&self) -> SessionState {
        self.session.lock().clone()
    }

    pub fn crisis_mode(&self) -> bool {
        self.session.lock().crisis_mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlu::embedder::Encoder;
    use crate::nlu::sentiment::{LexiconAnalyzer, SentimentAnalyzer};
    use crate::testing::{catalog, BagOfWordsEncoder, BrokenAnalyzer, FlakyEncoder};

    fn bot_with(encoder: Arc<dyn Encoder>, analyzer: Box<dyn SentimentAnalyzer>) -> MentalHealthBot {
        let nlu = NluPipeline::new(catalog(), encoder, analyzer).unwrap();
        MentalHealthBot::new(Arc::new(nlu))
    }

    fn bot() -> MentalHealthBot {
        bot_with(Arc::new(BagOfWordsEncoder), Box::new(LexiconAnalyzer::new()))
    }

    #[test]
    fn test_crisis_returns_hotline_and_sets_flag() {
        let bot = bot();
        let reply = bot.respond("I want to kill myself").unwrap();
        assert_eq!(reply.text, CRISIS_RESPONSE);
        assert!(reply.crisis);
        assert!(bot.crisis_mode());
        // Turnos de crise não entram no histórico
        assert!(bot.session_snapshot().history().is_empty());
    }

    /// A flag continua ligada nos turnos seguintes.
    #[test]
    fn test_crisis_mode_sticky_across_turns() {
        let bot = bot();
        bot.process("I don't want to DIE").unwrap();
        bot.process("hello").unwrap();
        bot.process("I'm feeling great today!").unwrap();
        assert!(bot.crisis_mode());
        assert_eq!(bot.session_snapshot().history().len(), 2);
    }

    #[test]
    fn test_greeting_scenario() {
        let bot = bot();
        let reply = bot.respond("hello").unwrap();
        assert_eq!(reply.text, "Hi there!");
        assert_eq!(reply.intent.as_deref(), Some("greeting"));
        assert_eq!(reply.emotion, Some(Emotion::Neutral));
        assert!(!bot.crisis_mode());
    }

    /// Resposta do intent casado vem do conjunto dele, com preâmbulo se houver distress.
    #[test]
    fn test_matched_response_from_intent_set() {
        let bot = bot();
        let reply = bot.respond("I can't sleep").unwrap();
        assert_eq!(reply.intent.as_deref(), Some("sleep"));
        let catalog = catalog();
        let responses = &catalog.get("sleep").unwrap().responses;
        let emotion = reply.emotion.unwrap();
        assert!(responses.iter().any(|r| emotion.frame(r) == reply.text));
    }

    #[test]
    fn test_positive_fallback_without_preamble() {
        let bot = bot();
        let reply = bot.respond("I'm feeling great today!").unwrap();
        assert_eq!(reply.intent, None);
        assert_eq!(reply.emotion, Some(Emotion::Positive));
        assert!(Emotion::Positive
            .fallback_responses()
            .contains(&reply.text.as_str()));
    }

    #[test]
    fn test_distress_fallback_gets_preamble() {
        let bot = bot();
        let reply = bot.respond("everything feels terrible").unwrap();
        assert_eq!(reply.emotion, Some(Emotion::SevereDistress));
        let preamble = Emotion::SevereDistress.preamble().unwrap();
        let rest = reply
            .text
            .strip_prefix(preamble)
            .and_then(|r| r.strip_prefix(' '))
            .unwrap();
        assert!(Emotion::SevereDistress.fallback_responses().contains(&rest));

        let reply = bot.respond("I'm not good").unwrap();
        assert_eq!(reply.emotion, Some(Emotion::MildDistress));
        assert!(reply.text.starts_with("I understand this is challenging. "));
    }

    #[test]
    fn test_history_has_one_entry_per_call_in_order() {
        let bot = bot();
        let inputs = ["hello", "I can't sleep", "purple elephants", "hi"];
        for input in inputs {
            bot.process(input).unwrap();
        }
        let session = bot.session_snapshot();
        let recorded: Vec<_> = session
            .history()
            .iter()
            .map(|t| t.user_input.as_str())
            .collect();
        assert_eq!(recorded, inputs);
        assert_eq!(session.history()[0].intent.as_deref(), Some("greeting"));
        assert_eq!(session.history()[2].intent, None);
        assert_eq!(session.current_emotion(), Some(Emotion::Neutral));
    }

    /// Encoder que falha depois do startup → desculpas, sem registrar turno.
    #[test]
    fn test_encoder_failure_becomes_apology() {
        let bot = bot_with(Arc::new(FlakyEncoder::new(3)), Box::new(LexiconAnalyzer::new()));
        assert_eq!(bot.process("hello").unwrap(), APOLOGY);
        assert!(bot.session_snapshot().history().is_empty());
        assert!(matches!(bot.respond("hello"), Err(BotError::Encoding(_))));
    }

    #[test]
    fn test_analyzer_failure_uses_neutral() {
        let bot = bot_with(Arc::new(BagOfWordsEncoder), Box::new(BrokenAnalyzer));
        let reply = bot.respond("everything seems hopeless").unwrap();
        assert_eq!(reply.emotion, Some(Emotion::Neutral));
        assert!(Emotion::Neutral
            .fallback_responses()
            .contains(&reply.text.as_str()));
    }

    /// Ticket abandonado antes do RECORD: erro de timeout e nada gravado.
    #[test]
    fn test_abandoned_turn_is_not_recorded() {
        let bot = bot();
        let ticket = TurnTicket::new(Duration::from_millis(10));
        assert!(ticket.try_abandon());

        let err = bot.respond_with("hello", Some(&ticket)).unwrap_err();
        assert!(matches!(err, BotError::Timeout(_)));
        assert!(err.is_recoverable());
        assert_eq!(bot.process_with("hello", &ticket).unwrap(), APOLOGY);
        assert!(bot.session_snapshot().history().is_empty());
    }

    /// Turno já gravado não pode mais ser abandonado.
    #[test]
    fn test_committed_turn_cannot_be_abandoned() {
        let bot = bot();
        let ticket = TurnTicket::new(Duration::from_secs(1));
        assert_eq!(bot.process_with("hello", &ticket).unwrap(), "Hi there!");
        assert!(!ticket.try_abandon());
        assert_eq!(bot.session_snapshot().history().len(), 1);
    }

    #[test]
    fn test_concurrent_turns_all_recorded() {
        let bot = Arc::new(bot());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let bot = bot.clone();
                std::thread::spawn(move || {
                    let msg = if i % 2 == 0 { "hello" } else { "hi" };
                    bot.process(msg).unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), "Hi there!");
        }
        assert_eq!(bot.session_snapshot().history().len(), 8);
    }
}
