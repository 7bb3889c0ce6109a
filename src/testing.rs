//! Dublês de teste: encoder determinístico sem modelo, analisadores e
//! catálogo pequeno.

use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::IntentCatalog;
use crate::error::BotError;
use crate::nlu::embedder::Encoder;
use crate::nlu::sentiment::SentimentAnalyzer;

const DIMS: usize = 4096;

/// Vocabulário global: cada palavra nova ganha a próxima dimensão, então
/// palavras diferentes nunca colidem.
static VOCAB: LazyLock<Mutex<HashMap<String, usize>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Bag-of-words normalizado. Textos sem palavras em comum têm similaridade 0.
pub struct BagOfWordsEncoder;

impl BagOfWordsEncoder {
    fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; DIMS];
        let mut vocab = VOCAB.lock();
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
        {
            let next = vocab.len();
            let index = *vocab.entry(word.to_string()).or_insert(next);
            vector[index % DIMS] += 1.0;
        }
        vector
    }
}

impl Encoder for BagOfWordsEncoder {
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BotError> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

/// Encoder cujo modelo "sumiu".
pub struct FailingEncoder;

impl Encoder for FailingEncoder {
    fn encode_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, BotError> {
        Err(BotError::Encoding("model unavailable".into()))
    }
}

/// Funciona no startup e falha depois de `ok_calls` chamadas.
pub struct FlakyEncoder {
    remaining: Mutex<usize>,
}

impl FlakyEncoder {
    pub fn new(ok_calls: usize) -> Self {
        Self {
            remaining: Mutex::new(ok_calls),
        }
    }
}

impl Encoder for FlakyEncoder {
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BotError> {
        let mut remaining = self.remaining.lock();
        if *remaining == 0 {
            return Err(BotError::Encoding("model unloaded".into()));
        }
        *remaining -= 1;
        BagOfWordsEncoder.encode_batch(texts)
    }
}

/// Encoder lento, para exercitar o timeout da camada HTTP.
pub struct SlowEncoder {
    pub delay: Duration,
}

impl Encoder for SlowEncoder {
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BotError> {
        std::thread::sleep(self.delay);
        BagOfWordsEncoder.encode_batch(texts)
    }
}

pub struct BrokenAnalyzer;

impl SentimentAnalyzer for BrokenAnalyzer {
    fn polarity(&self, _text: &str) -> Result<f64, BotError> {
        Err(BotError::EmotionDetection("analyzer crashed".into()))
    }
}

pub fn catalog() -> IntentCatalog {
    IntentCatalog::from_json(
        r#"{"intents": [
            {"tag": "greeting",
             "patterns": ["hello", "hi"],
             "responses": ["Hi there!"]},
            {"tag": "sleep",
             "patterns": ["I can't sleep", "insomnia keeps me awake"],
             "responses": ["Sleep troubles are exhausting.", "How long has sleep been hard?"]},
            {"tag": "anxiety",
             "patterns": ["I feel anxious", "my heart is racing"],
             "responses": ["Let's take a slow breath together."]}
        ]}"#,
    )
    .expect("test catalog is valid")
}
