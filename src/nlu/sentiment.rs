//! # Análise de Sentimento (Polaridade)
//!
//! O [`LexiconAnalyzer`] calcula a polaridade de um texto em `[-1, 1]`
//! usando um léxico de palavras com polaridade conhecida e duas regras:
//!
//! ```text
//! "I am not very happy"
//!        │    │    └── léxico: happy = +0.8
//!        │    └─────── intensificador: × 1.3  → +1.0 (clamp)
//!        └──────────── negação: × -0.5        → -0.5
//! polaridade = média das palavras pontuadas = -0.5
//! ```
//!
//! Modificadores valem só para a próxima palavra pontuada e são
//! descartados em pontuação (`.`, `,`, `!`, `?`, `;`). Sem palavras
//! pontuadas a polaridade é 0.0.
//!
//! [`detect_emotion()`] converte a polaridade em [`Emotion`].

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::Emotion;
use crate::error::BotError;

/// Calcula a polaridade de sentimento de um texto.
pub trait SentimentAnalyzer: Send + Sync {
    /// Polaridade em `[-1, 1]`: negativo = triste/angustiado, positivo = bem.
    fn polarity(&self, text: &str) -> Result<f64, BotError>;
}

/// Tokens: palavras (com contração opcional) ou pontuação que quebra frase.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z]+(?:'[a-z]+)?|[.,;!?]").expect("valid token regex"));

/// Léxico de polaridade (valores na escala do pattern/TextBlob).
const LEXICON: &[(&str, f64)] = &[
    // positivos
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("better", 0.5),
    ("calm", 0.3),
    ("cheerful", 0.8),
    ("confident", 0.5),
    ("excellent", 1.0),
    ("excited", 0.4),
    ("fantastic", 0.4),
    ("fine", 0.4167),
    ("fun", 0.3),
    ("glad", 0.5),
    ("good", 0.7),
    ("grateful", 0.6),
    ("great", 0.8),
    ("happy", 0.8),
    ("hopeful", 0.5),
    ("joy", 0.8),
    ("love", 0.5),
    ("lovely", 0.5),
    ("nice", 0.6),
    ("okay", 0.5),
    ("peaceful", 0.6),
    ("perfect", 1.0),
    ("proud", 0.8),
    ("relaxed", 0.4),
    ("thankful", 0.5),
    ("wonderful", 1.0),
    // negativos
    ("afraid", -0.6),
    ("alone", -0.3),
    ("angry", -0.5),
    ("anxious", -0.25),
    ("ashamed", -0.6),
    ("awful", -1.0),
    ("bad", -0.7),
    ("broken", -0.4),
    ("depressed", -0.6),
    ("desperate", -0.7),
    ("disappointed", -0.75),
    ("empty", -0.1),
    ("exhausted", -0.4),
    ("frustrated", -0.4),
    ("guilty", -0.5),
    ("hate", -0.8),
    ("helpless", -0.5),
    ("hopeless", -0.6),
    ("horrible", -1.0),
    ("hurt", -0.5),
    ("lonely", -0.5),
    ("lost", -0.4),
    ("miserable", -1.0),
    ("nervous", -0.3),
    ("overwhelmed", -0.4),
    ("pain", -0.6),
    ("panic", -0.5),
    ("sad", -0.5),
    ("scared", -0.5),
    ("stressed", -0.4),
    ("terrible", -1.0),
    ("tired", -0.4),
    ("unhappy", -0.6),
    ("upset", -0.5),
    ("worried", -0.5),
    ("worse", -0.4),
    ("worst", -1.0),
    ("worthless", -0.8),
];

/// Intensificadores e seus multiplicadores.
const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("so", 1.3),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("super", 1.3),
    ("totally", 1.3),
    ("quite", 1.1),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "don't", "dont", "doesn't", "didn't", "isn't", "wasn't", "aren't",
    "can't", "cannot", "won't", "nothing",
];

/// Multiplicador aplicado à palavra após uma negação.
const NEGATION_FACTOR: f64 = -0.5;

/// Analisador de sentimento por léxico + regras (sem modelo).
pub struct LexiconAnalyzer {
    lexicon: HashMap<&'static str, f64>,
    intensifiers: HashMap<&'static str, f64>,
}

impl LexiconAnalyzer {
    pub fn new() -> Self {
        Self {
            lexicon: LEXICON.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }

    fn score(&self, text: &str) -> f64 {
        let lower = text.to_lowercase().replace('’', "'");

        let mut scores = Vec::new();
        let mut intensity = 1.0f64;
        let mut negated = false;

        for token in TOKEN_RE.find_iter(&lower).map(|m| m.as_str()) {
            if matches!(token, "." | "," | ";" | "!" | "?") {
                intensity = 1.0;
                negated = false;
            } else if NEGATIONS.contains(&token) {
                negated = true;
            } else if let Some(factor) = self.intensifiers.get(token) {
                intensity *= factor;
            } else if let Some(&polarity) = self.lexicon.get(token) {
                let mut score = (polarity * intensity).clamp(-1.0, 1.0);
                if negated {
                    score *= NEGATION_FACTOR;
                }
                scores.push(score);
                intensity = 1.0;
                negated = false;
            }
        }

        if scores.is_empty() {
            return 0.0;
        }
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentAnalyzer for LexiconAnalyzer {
    fn polarity(&self, text: &str) -> Result<f64, BotError> {
        Ok(self.score(text))
    }
}

/// Classifica `text` em uma [`Emotion`].
///
/// # Erros
///
/// [`BotError::EmotionDetection`] se o analisador falhar ou devolver
/// uma polaridade fora de `[-1, 1]` (ou NaN).
pub fn detect_emotion(analyzer: &dyn SentimentAnalyzer, text: &str) -> Result<Emotion, BotError> {
    let polarity = analyzer.polarity(text)?;
    if !polarity.is_finite() || !(-1.0..=1.0).contains(&polarity) {
        return Err(BotError::EmotionDetection(format!(
            "polarity {} outside [-1, 1]",
            polarity
        )));
    }
    Ok(Emotion::from_polarity(polarity))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    impl SentimentAnalyzer for Fixed {
        fn polarity(&self, _text: &str) -> Result<f64, BotError> {
            Ok(self.0)
        }
    }

    fn polarity(text: &str) -> f64 {
        LexiconAnalyzer::new().polarity(text).unwrap()
    }

    #[test]
    fn test_neutral_without_lexicon_words() {
        assert_eq!(polarity("hello"), 0.0);
        assert_eq!(polarity(""), 0.0);
    }

    #[test]
    fn test_positive_and_negative_words() {
        assert!((polarity("I'm feeling great today!") - 0.8).abs() < 1e-9);
        assert!((polarity("I feel sad") + 0.5).abs() < 1e-9);
        assert!((polarity("this is terrible") + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_intensifier_and_clamp() {
        assert!((polarity("I am very sad") + 0.65).abs() < 1e-9);
        assert_eq!(polarity("extremely awesome"), 1.0);
    }

    /// Negação inverte e atenua a próxima palavra pontuada.
    #[test]
    fn test_negation() {
        assert!((polarity("I'm not good") + 0.35).abs() < 1e-9);
        assert!((polarity("I don't feel happy") + 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_punctuation_resets_modifiers() {
        assert!((polarity("not really. happy") - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_mean_of_scored_words() {
        // (0.8 + -0.5) / 2
        assert!((polarity("happy but sad") - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_detect_emotion_categories() {
        let analyzer = LexiconAnalyzer::new();
        let emotion = |text: &str| detect_emotion(&analyzer, text).unwrap();
        assert_eq!(emotion("I'm feeling great today!"), Emotion::Positive);
        assert_eq!(emotion("hello"), Emotion::Neutral);
        assert_eq!(emotion("I'm a bit anxious"), Emotion::MildDistress);
        assert_eq!(emotion("I feel so sad and hopeless"), Emotion::SevereDistress);
    }

    #[test]
    fn test_detect_emotion_rejects_bad_polarity() {
        assert!(matches!(
            detect_emotion(&Fixed(f64::NAN), "x"),
            Err(BotError::EmotionDetection(_))
        ));
        assert!(detect_emotion(&Fixed(1.5), "x").is_err());
        assert_eq!(detect_emotion(&Fixed(-0.5), "x").unwrap(), Emotion::SevereDistress);
    }
}
