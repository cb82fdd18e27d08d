use tracing::{debug, info, warn};

use crate::content;
use crate::gemini::SharedGenerator;
use crate::prompts::answer_prompt;
use crate::storage::JsonStore;
use crate::types::AnswerCache;

pub const AI_UNAVAILABLE: &str =
    "AI features are currently unavailable. Please set your GEMINI_API_KEY in the .env file.";
pub const EMPTY_ANSWER: &str = "Sorry, AI could not generate an answer.";
pub const GENERATION_FAILED: &str = "Sorry, the answer could not be generated.";

/// Resolves student questions: prewritten table, then the answer cache, then
/// the model. The cache is keyed by question text alone, so identical
/// questions from different subjects share an answer.
pub struct AnswerResolver {
    cache: JsonStore<AnswerCache>,
    generator: Option<SharedGenerator>,
}

impl AnswerResolver {
    pub fn new(cache: JsonStore<AnswerCache>, generator: Option<SharedGenerator>) -> Self {
        Self { cache, generator }
    }

    /// Always yields text; failure messages are valid answers.
    pub fn resolve(&mut self, subject: &str, question: &str) -> String {
        let Some(generator) = self.generator.clone() else {
            return AI_UNAVAILABLE.to_string();
        };

        if let Some(answer) = content::static_answer(subject, question) {
            return answer.to_string();
        }

        if let Some(answer) = self.cache.data().get(question) {
            debug!(question, "answer cache hit");
            return answer.clone();
        }

        let answer = match generator.generate(&answer_prompt(subject, question)) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(question, error = %e, "AI generation failed");
                return GENERATION_FAILED.to_string();
            }
        };
        debug!(question, answer = %answer, "AI output");

        if answer.is_empty() {
            return EMPTY_ANSWER.to_string();
        }

        self.cache
            .data_mut()
            .insert(question.to_string(), answer.clone());
        if let Err(e) = self.cache.save() {
            warn!(error = %e, "failed to persist answer cache");
        } else {
            info!(entries = self.cache.data().len(), "answer cache updated");
        }
        answer
    }

    pub fn cache(&self) -> &AnswerCache {
        self.cache.data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::testing::ScriptedGenerator;
    use crate::storage::ANSWER_CACHE_FILE;
    use std::fs;

    fn resolver_with(
        dir: &tempfile::TempDir,
        generator: Option<SharedGenerator>,
    ) -> AnswerResolver {
        let cache = JsonStore::load(dir.path().join(ANSWER_CACHE_FILE)).unwrap();
        AnswerResolver::new(cache, generator)
    }

    #[test]
    fn unconfigured_client_is_always_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = resolver_with(&dir, None);
        assert_eq!(resolver.resolve("Math", "What is 2+2?"), AI_UNAVAILABLE);
        assert_eq!(resolver.resolve("Math", "What is a prime?"), AI_UNAVAILABLE);
        assert!(resolver.cache().is_empty());
    }

    #[test]
    fn static_answer_skips_model_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        let model = ScriptedGenerator::replying("should not be used");
        let mut resolver = resolver_with(&dir, Some(model.clone()));

        assert_eq!(resolver.resolve("Math", "What is 2+2?"), "2+2 = 4");
        assert_eq!(model.call_count(), 0);
        assert!(resolver.cache().is_empty());
        assert!(!dir.path().join(ANSWER_CACHE_FILE).exists());
    }

    #[test]
    fn cached_answer_skips_model() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(ANSWER_CACHE_FILE),
            r#"{"What is a capacitor?": "It stores charge."}"#,
        )
        .unwrap();
        let model = ScriptedGenerator::replying("fresh answer");
        let mut resolver = resolver_with(&dir, Some(model.clone()));

        assert_eq!(
            resolver.resolve("Electronics", "What is a capacitor?"),
            "It stores charge."
        );
        assert_eq!(model.call_count(), 0);
    }

    #[test]
    fn generated_answer_is_trimmed_and_cached() {
        let dir = tempfile::tempdir().unwrap();
        let model = ScriptedGenerator::replying("  Photosynthesis makes sugar.\n");
        let mut resolver = resolver_with(&dir, Some(model.clone()));

        let answer = resolver.resolve("Science", "What is photosynthesis?");
        assert_eq!(answer, "Photosynthesis makes sugar.");
        assert_eq!(model.call_count(), 1);
        assert!(
            model.prompts.lock().unwrap()[0]
                .ends_with("student in Science: What is photosynthesis?")
        );

        // second call is served from the cache
        assert_eq!(resolver.resolve("Science", "What is photosynthesis?"), answer);
        assert_eq!(model.call_count(), 1);

        let reloaded: JsonStore<AnswerCache> =
            JsonStore::load(dir.path().join(ANSWER_CACHE_FILE)).unwrap();
        assert_eq!(
            reloaded.data().get("What is photosynthesis?").map(String::as_str),
            Some("Photosynthesis makes sugar.")
        );
    }

    #[test]
    fn cache_is_shared_across_subjects() {
        let dir = tempfile::tempdir().unwrap();
        let model = ScriptedGenerator::replying("A unit of measure.");
        let mut resolver = resolver_with(&dir, Some(model.clone()));

        resolver.resolve("Math", "What is a unit?");
        assert_eq!(resolver.resolve("English", "What is a unit?"), "A unit of measure.");
        assert_eq!(model.call_count(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let model = ScriptedGenerator::failing("connection reset");
        let mut resolver = resolver_with(&dir, Some(model.clone()));
        assert_eq!(resolver.resolve("Math", "What is pi?"), GENERATION_FAILED);
        assert!(resolver.cache().is_empty());

        let blank = ScriptedGenerator::replying("   ");
        let mut resolver = resolver_with(&dir, Some(blank));
        assert_eq!(resolver.resolve("Math", "What is pi?"), EMPTY_ANSWER);
        assert!(resolver.cache().is_empty());
    }
}
