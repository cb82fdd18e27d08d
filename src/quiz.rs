use serde_json::Value;
use tracing::{info, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::gemini::{SharedGenerator, extract_json_array};
use crate::prompts::quiz_prompt;
use crate::types::{Mcq, QuizScore};

pub const DEFAULT_QUESTION_COUNT: usize = 5;
pub const DEFAULT_DIFFICULTY: &str = "medium";
pub const OPTIONS_PER_QUESTION: usize = 4;

const PLACEHOLDER_OPTIONS: [&str; OPTIONS_PER_QUESTION] =
    ["Option A", "Option B", "Option C", "Option D"];

#[derive(Clone)]
pub struct QuizGenerator {
    generator: Option<SharedGenerator>,
}

impl QuizGenerator {
    pub fn new(generator: Option<SharedGenerator>) -> Self {
        Self { generator }
    }

    /// At most `count` questions. Falls back to placeholders whenever the
    /// model is missing, fails, or produces nothing usable.
    pub fn generate(&self, subject: &str, count: usize, difficulty: &str) -> Vec<Mcq> {
        if count == 0 {
            return Vec::new();
        }
        let Some(generator) = &self.generator else {
            return placeholder_questions(subject, count);
        };

        match ai_questions(generator, subject, count, difficulty) {
            Ok(mut mcqs) => {
                mcqs.truncate(count);
                info!(subject, count = mcqs.len(), "AI quiz generated");
                mcqs
            }
            Err(e) => {
                warn!(subject, error = %e, "AI MCQ generation failed, using placeholders");
                placeholder_questions(subject, count)
            }
        }
    }
}

fn ai_questions(
    generator: &SharedGenerator,
    subject: &str,
    count: usize,
    difficulty: &str,
) -> ServiceResult<Vec<Mcq>> {
    let text = generator.generate(&quiz_prompt(subject, count, difficulty))?;
    let json = extract_json_array(text.trim())
        .ok_or_else(|| ServiceError::ApiError("No JSON array found in AI output".to_string()))?;
    let items: Vec<Value> = serde_json::from_str(json)?;

    let validated: Vec<Mcq> = items.iter().filter_map(validate_mcq).collect();
    if validated.is_empty() {
        return Err(ServiceError::ApiError(
            "All MCQs failed validation".to_string(),
        ));
    }
    Ok(validated)
}

/// Accept an item only when it has a question, exactly four string options
/// and an answer that is one of them. Nothing is repaired.
pub fn validate_mcq(item: &Value) -> Option<Mcq> {
    let obj = item.as_object()?;
    let question = obj.get("question")?.as_str()?;
    let options = obj
        .get("options")?
        .as_array()?
        .iter()
        .map(|o| o.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()?;
    if options.len() != OPTIONS_PER_QUESTION {
        return None;
    }
    let answer = obj.get("answer")?.as_str()?;
    if !options.iter().any(|o| o == answer) {
        return None;
    }
    Some(Mcq {
        question: question.to_string(),
        options,
        answer: answer.to_string(),
    })
}

pub fn placeholder_questions(subject: &str, count: usize) -> Vec<Mcq> {
    (0..count)
        .map(|i| Mcq {
            question: format!("Sample {} question {}?", subject, i + 1),
            options: PLACEHOLDER_OPTIONS.iter().map(|o| o.to_string()).collect(),
            answer: PLACEHOLDER_OPTIONS[0].to_string(),
        })
        .collect()
}

/// Compare selections position by position; a missing selection is wrong.
pub fn grade(mcqs: &[Mcq], selections: &[Option<String>]) -> QuizScore {
    let score = mcqs
        .iter()
        .enumerate()
        .filter(|(i, q)| {
            selections
                .get(*i)
                .and_then(Option::as_deref)
                .is_some_and(|picked| picked == q.answer)
        })
        .count();
    QuizScore {
        score,
        total: mcqs.len(),
    }
}
