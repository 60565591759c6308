//! Qualitative page narrative from a hosted text-completion model.
//!
//! The [`Narrator`] never fails: a missing credential, a page with too
//! little text, or any error from the model is replaced by a short
//! human-readable message so the rest of the report is unaffected.

use crate::types::NarrativeResult;
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// Shown when no API key is configured.
pub const MISSING_KEY_MESSAGE: &str = "⚠️ Clé API manquante.";

/// Shown when the page text is too short to analyze.
pub const INSUFFICIENT_CONTENT_MESSAGE: &str = "Contenu insuffisant.";

/// Pages with fewer characters than this are not sent to the model.
pub const MIN_TEXT_CHARS: usize = 50;

/// Only this many leading characters of page text are sent.
pub const MAX_EXCERPT_CHARS: usize = 3000;

/// A hosted model that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete the prompt.
    async fn generate(&self, prompt: &str) -> NarrativeResult<String>;
    /// Identifier of the model in use, for logs and fallback messages.
    fn model(&self) -> &str;
}

/// Produces the narrative section of a report.
#[derive(Clone, Default)]
pub struct Narrator {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl Narrator {
    /// Narrator backed by a configured model.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    /// Narrator without a credential; always answers [`MISSING_KEY_MESSAGE`].
    pub fn disabled() -> Self {
        Self { generator: None }
    }

    /// Whether a model is configured.
    pub fn is_enabled(&self) -> bool {
        self.generator.is_some()
    }

    /// Model identifier, when configured.
    pub fn model(&self) -> Option<&str> {
        self.generator.as_deref().map(|g| g.model())
    }

    /// Produce an HTML narrative for the page text, or a placeholder message.
    pub async fn narrate(&self, text: &str) -> String {
        let Some(generator) = &self.generator else {
            return MISSING_KEY_MESSAGE.to_string();
        };
        if text.chars().count() < MIN_TEXT_CHARS {
            return INSUFFICIENT_CONTENT_MESSAGE.to_string();
        }

        let prompt = build_prompt(excerpt(text));
        debug!(model = generator.model(), "requesting narrative");

        match generator.generate(&prompt).await {
            Ok(raw) => clean_response(&raw),
            Err(e) => {
                warn!(model = generator.model(), error = %e, "narrative generation failed");
                unavailable_message(generator.model())
            }
        }
    }
}

/// Fallback shown when the model call fails.
pub fn unavailable_message(model: &str) -> String {
    format!("L'IA est indisponible ({model}).")
}

/// First [`MAX_EXCERPT_CHARS`] characters of the text.
pub fn excerpt(text: &str) -> &str {
    match text.char_indices().nth(MAX_EXCERPT_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Strip code fences and turn leftover `**bold**` markers into `<strong>`.
pub fn clean_response(raw: &str) -> String {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    let bold = BOLD.get_or_init(|| {
        Regex::new(r"\*\*(.*?)\*\*").unwrap_or_else(|e| panic!("invalid bold pattern: {e}"))
    });

    let unfenced = raw.replace("```html", "").replace("```", "");
    bold.replace_all(&unfenced, r#"<strong class="text-white">$1</strong>"#)
        .into_owned()
}

const SECTION_TITLE_CLASS: &str = "text-orange-400 font-bold uppercase text-xs tracking-widest mb-2";
const PARAGRAPH_CLASS: &str = "text-gray-300 text-sm leading-relaxed";
const LIST_CLASS: &str = "list-disc pl-5 space-y-1 text-gray-300 text-sm";

/// Persona and strict HTML layout sent with every excerpt.
pub fn build_prompt(excerpt: &str) -> String {
    let paragraph_section = |title: &str, placeholder: &str| {
        format!(
            "<div class=\"mb-6\">\n\
             \x20   <h3 class=\"{SECTION_TITLE_CLASS}\">{title}</h3>\n\
             \x20   <p class=\"{PARAGRAPH_CLASS}\">[{placeholder}]</p>\n\
             </div>"
        )
    };
    let list_section = |title: &str, item: &str, wrapper: &str| {
        let items = (1..=3)
            .map(|i| format!("        <li>[{item} {i}]</li>"))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "<div{wrapper}>\n\
             \x20   <h3 class=\"{SECTION_TITLE_CLASS}\">{title}</h3>\n\
             \x20   <ul class=\"{LIST_CLASS}\">\n{items}\n    </ul>\n\
             </div>"
        )
    };

    let layout = [
        paragraph_section("Analyse UX", "Ton résumé ici"),
        paragraph_section("Proposition de valeur", "Ton analyse ici"),
        paragraph_section("Tonalité", "Ton analyse ici"),
        list_section("Points forts", "Point", " class=\"mb-6\""),
        list_section("Recommandations prioritaires", "Reco", ""),
    ]
    .join("\n\n");

    format!(
        "Tu es un expert UX et copywriter digital.\n\
         Analyse ce texte brut issu d'une page web :\n\
         \"{excerpt}...\"\n\n\
         CONSIGNES STRICTES :\n\
         1. Ton écriture doit être naturelle, humaine et directe.\n\
         2. Pas d'emojis. UTILISE <STRONG> POUR LE GRAS, PAS D'ÉTOILES (**).\n\
         3. Respecte EXACTEMENT ce format HTML (Titres en ORANGE) :\n\n\
         FORMAT DE RÉPONSE ATTENDU :\n\n\
         {layout}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NarrativeError;
    use std::sync::Mutex;

    struct FixedGenerator {
        reply: Result<String, u16>,
        prompts: Mutex<Vec<String>>,
    }

    impl FixedGenerator {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, prompt: &str) -> NarrativeResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(NarrativeError::Api {
                    status: *status,
                    message: "boom".into(),
                }),
            }
        }

        fn model(&self) -> &str {
            "models/test-flash"
        }
    }

    fn long_text() -> String {
        "Une phrase assez longue pour passer le seuil. ".repeat(5)
    }

    #[tokio::test]
    async fn test_disabled_returns_missing_key() {
        let narrator = Narrator::disabled();
        assert!(!narrator.is_enabled());
        assert_eq!(narrator.narrate(&long_text()).await, MISSING_KEY_MESSAGE);
    }

    #[tokio::test]
    async fn test_short_text_is_not_sent() {
        let generator = FixedGenerator::replying("never");
        let narrator = Narrator::new(generator.clone());
        assert_eq!(narrator.narrate("trop court").await, INSUFFICIENT_CONTENT_MESSAGE);
        assert_eq!(narrator.narrate("").await, INSUFFICIENT_CONTENT_MESSAGE);
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_is_cleaned() {
        let generator = FixedGenerator::replying("```html\n<p>**Clair** et net</p>\n```");
        let narrator = Narrator::new(generator.clone());
        let out = narrator.narrate(&long_text()).await;
        assert_eq!(out, "\n<p><strong class=\"text-white\">Clair</strong> et net</p>\n");
        assert_eq!(generator.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_names_model() {
        let narrator = Narrator::new(FixedGenerator::failing(503));
        let out = narrator.narrate(&long_text()).await;
        assert_eq!(out, "L'IA est indisponible (models/test-flash).");
    }

    #[tokio::test]
    async fn test_prompt_carries_truncated_excerpt() {
        let generator = FixedGenerator::replying("<p>ok</p>");
        let narrator = Narrator::new(generator.clone());
        let text = format!("{}{}", "a".repeat(MAX_EXCERPT_CHARS), "ZZZ");
        narrator.narrate(&text).await;
        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains(&"a".repeat(MAX_EXCERPT_CHARS)));
        assert!(!prompts[0].contains("ZZZ"));
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let text = "é".repeat(MAX_EXCERPT_CHARS + 10);
        assert_eq!(excerpt(&text).chars().count(), MAX_EXCERPT_CHARS);
        assert_eq!(excerpt("court"), "court");
    }

    #[test]
    fn test_clean_response_handles_multiple_bold_runs() {
        let out = clean_response("**a** puis **b**, fin **");
        assert_eq!(
            out,
            "<strong class=\"text-white\">a</strong> puis <strong class=\"text-white\">b</strong>, fin **"
        );
    }

    #[test]
    fn test_prompt_layout() {
        let prompt = build_prompt("Bonjour");
        assert!(prompt.contains("\"Bonjour...\""));
        for title in [
            "Analyse UX",
            "Proposition de valeur",
            "Tonalité",
            "Points forts",
            "Recommandations prioritaires",
        ] {
            assert!(prompt.contains(&format!(">{title}</h3>")), "missing {title}");
        }
        assert_eq!(prompt.matches("<li>").count(), 6);
        assert!(prompt.contains("UTILISE <STRONG> POUR LE GRAS"));
    }
}
