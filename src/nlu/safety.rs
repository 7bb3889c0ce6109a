//! # Filtro de Segurança
//!
//! Verifica, **antes** de qualquer matching semântico, se a mensagem
//! contém palavras de crise. Qualquer ocorrência (substring,
//! case-insensitive) dispara a resposta fixa de crise.
//!
//! Não há stemming nem tratamento de negação: "I don't want to die" é
//! sinalizado como as afirmações diretas. Também casa dentro de outras
//! palavras ("studied" contém "die"). Falsos positivos são aceitos.

/// Palavras e frases que disparam a resposta de crise.
pub const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "kill",
    "die",
    "end my life",
    "harmful",
    "hurt myself",
];

/// Resposta fixa para mensagens de crise (telefones de apoio + convite).
pub const CRISIS_RESPONSE: &str = "I'm very concerned about what you're sharing. Your life matters and help is available:

1. National Crisis Hotline (24/7): 988
2. Crisis Text Line: Text HOME to 741741
3. Emergency Services: 911

Would you like to talk about what's bringing up these thoughts? I'm here to listen without judgment.";

#[derive(Clone, Debug)]
pub struct SafetyFilter {
    keywords: Vec<String>,
}

impl SafetyFilter {
    pub fn new() -> Self {
        Self::with_keywords(CRISIS_KEYWORDS.iter().copied())
    }

    /// Filtro com uma lista própria de palavras (guardadas em minúsculas).
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Primeira palavra de crise contida em `text`, se houver.
    pub fn matched_keyword(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.keywords
            .iter()
            .find(|k| lower.contains(k.as_str()))
            .map(String::as_str)
    }

    pub fn is_crisis(&self, text: &str) -> bool {
        match self.matched_keyword(text) {
            Some(keyword) => {
                tracing::warn!(keyword, "Crisis keyword detected");
                true
            }
            None => false,
        }
    }
}

impl Default for SafetyFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crisis_detection() {
        let filter = SafetyFilter::new();
        assert!(filter.is_crisis("I want to kill myself"));
        assert!(filter.is_crisis("sometimes I think about suicide"));
        assert!(filter.is_crisis("I just want to end my life"));
        assert!(filter.is_crisis("I keep wanting to hurt myself"));
        assert!(!filter.is_crisis("I had a rough day at work"));
        assert!(!filter.is_crisis("hello"));
    }

    #[test]
    fn test_case_insensitive() {
        let filter = SafetyFilter::new();
        assert!(filter.is_crisis("SUICIDE"));
        assert!(filter.is_crisis("End My Life"));
    }

    /// Negação e substrings também disparam.
    #[test]
    fn test_no_negation_handling() {
        let filter = SafetyFilter::new();
        assert!(filter.is_crisis("I don't want to die"));
        assert_eq!(filter.matched_keyword("I studied all night"), Some("die"));
    }

    #[test]
    fn test_custom_keywords() {
        let filter = SafetyFilter::with_keywords(["Overdose", ""]);
        assert!(filter.is_crisis("thinking about an overdose"));
        assert!(!filter.is_crisis("anything else"));
    }
}
