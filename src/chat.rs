//! # Chat no Terminal
//!
//! Modo interativo (`empathic-chat chat`): lê mensagens do stdin e imprime
//! as respostas do bot, sem servidor HTTP. Termina com `exit` ou EOF.

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::bot::MentalHealthBot;

const BOT_NAME: &str = "Mental Health Bot";

const GREETING: &str = "Hi, I'm here to support you. How are you feeling today?";

const FAREWELL: &str =
    "Take care! Remember, it's okay to reach out for help when you need it.";

/// Mostrado quando o bot devolve um erro fatal no meio da conversa.
const PROCESSING_ERROR: &str =
    "I apologize, but I'm having trouble processing that. Could you try rephrasing?";

/// Conversa usando stdin/stdout.
pub fn run(bot: &MentalHealthBot) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_with(bot, stdin.lock(), stdout.lock())
}

/// Loop de conversa sobre qualquer leitor/escritor.
pub fn run_with<R: BufRead, W: Write>(bot: &MentalHealthBot, input: R, mut output: W) -> Result<()> {
    writeln!(output, "\n{}: {}", BOT_NAME, GREETING)?;
    writeln!(output, "(Type 'exit' to end our conversation)")?;

    let mut lines = input.lines();
    loop {
        write!(output, "\nYou: ")?;
        output.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let message = line.trim();

        if message.eq_ignore_ascii_case("exit") {
            break;
        }
        if message.is_empty() {
            continue;
        }

        let response = match bot.process(message) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Chat turn failed");
                PROCESSING_ERROR.to_string()
            }
        };
        writeln!(output, "\n{}: {}", BOT_NAME, response)?;
    }

    writeln!(output, "\n{}: {}", BOT_NAME, FAREWELL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use super::*;
    use crate::nlu::sentiment::LexiconAnalyzer;
    use crate::nlu::NluPipeline;
    use crate::testing::{catalog, BagOfWordsEncoder};

    fn bot() -> MentalHealthBot {
        let nlu = NluPipeline::new(
            catalog(),
            Arc::new(BagOfWordsEncoder),
            Box::new(LexiconAnalyzer::new()),
        )
        .unwrap();
        MentalHealthBot::new(Arc::new(nlu))
    }

    fn converse(bot: &MentalHealthBot, script: &str) -> String {
        let mut output = Vec::new();
        run_with(bot, Cursor::new(script), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_conversation_until_exit() {
        let bot = bot();
        let transcript = converse(&bot, "hello\n\nEXIT\nhi\n");
        assert!(transcript.contains(GREETING));
        assert!(transcript.contains("Mental Health Bot: Hi there!"));
        assert!(transcript.ends_with(&format!("{}: {}\n", BOT_NAME, FAREWELL)));
        // "hi" veio depois do exit e linhas vazias são ignoradas
        assert_eq!(bot.session_snapshot().history().len(), 1);
    }

    #[test]
    fn test_eof_ends_conversation() {
        let bot = bot();
        let transcript = converse(&bot, "hi");
        assert!(transcript.contains("Hi there!"));
        assert!(transcript.contains(FAREWELL));
    }
}
