pub const ANSWER_PROMPT: &str = "Answer this question in simple terms for a student in {subject}: {question}";

pub const QUIZ_PROMPT: &str = r#"
You are an expert exam question setter.

Generate {count} {difficulty} difficulty multiple-choice questions
for a Level 3 quiz on the subject: {subject}.

STRICT RULES:
- EXACTLY 4 options per question
- Answer MUST be one of the options
- No explanations
- No markdown, no backticks
- Output ONLY valid JSON

JSON format:
[
  {
    "question": "Question text",
    "options": ["Option A", "Option B", "Option C", "Option D"],
    "answer": "Option A"
  }
]
"#;

pub const STUDY_PLAN_PROMPT: &str = r#"
Create a detailed {weeks}-week study schedule for {exam_type} exam preparation.
Subjects to cover: {subjects}
Study hours per day: {hours_per_day}

Provide a week-by-week breakdown with:
- Topics to cover each week
- Daily time allocation for each subject
- Revision periods
- Mock test schedules

Format as JSON array with weekly plans:
[
  {
    "week": 1,
    "focus": "Foundation Building",
    "daily_schedule": {
      "Monday": {"subject": "Subject 1", "topics": ["Topic A", "Topic B"], "hours": 4},
      "Tuesday": {"subject": "Subject 2", "topics": ["Topic C"], "hours": 4}
    }
  }
]
"#;

/// Substitute `{name}` placeholders in one pass over the template, so
/// substituted values are never scanned again. Unknown placeholders and
/// other braces are left as-is.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let value = tail.find('}').and_then(|close| {
            let name = &tail[1..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn answer_prompt(subject: &str, question: &str) -> String {
    render(
        ANSWER_PROMPT,
        &[("subject", subject), ("question", question)],
    )
}

pub fn quiz_prompt(subject: &str, count: usize, difficulty: &str) -> String {
    let count = count.to_string();
    render(
        QUIZ_PROMPT,
        &[
            ("count", count.as_str()),
            ("difficulty", difficulty),
            ("subject", subject),
        ],
    )
}

pub fn study_plan_prompt(
    exam_type: &str,
    subjects: &[String],
    weeks: u32,
    hours_per_day: u32,
) -> String {
    let weeks = weeks.to_string();
    let subjects = subjects.join(", ");
    let hours_per_day = hours_per_day.to_string();
    render(
        STUDY_PLAN_PROMPT,
        &[
            ("weeks", weeks.as_str()),
            ("exam_type", exam_type),
            ("subjects", subjects.as_str()),
            ("hours_per_day", hours_per_day.as_str()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_prompt_embeds_subject_and_question() {
        assert_eq!(
            answer_prompt("Science", "Why is the sky blue?"),
            "Answer this question in simple terms for a student in Science: Why is the sky blue?"
        );
    }

    #[test]
    fn braces_in_values_are_not_expanded() {
        assert_eq!(
            answer_prompt("{question}", "What is {subject}?"),
            "Answer this question in simple terms for a student in {question}: What is {subject}?"
        );

        let subjects = vec!["{hours_per_day}".to_string()];
        let prompt = study_plan_prompt("{weeks}", &subjects, 8, 3);
        assert!(prompt.contains("8-week study schedule for {weeks} exam"));
        assert!(prompt.contains("Subjects to cover: {hours_per_day}\n"));
        assert!(prompt.contains("Study hours per day: 3"));
    }

    #[test]
    fn unknown_placeholders_are_kept() {
        assert_eq!(render("{a} {b} {", &[("a", "1")]), "1 {b} {");
    }

    #[test]
    fn quiz_prompt_keeps_json_braces() {
        let prompt = quiz_prompt("Math", 3, "hard");
        assert!(prompt.contains("Generate 3 hard difficulty"));
        assert!(prompt.contains("on the subject: Math."));
        assert!(prompt.contains("\"answer\": \"Option A\""));
    }

    #[test]
    fn plan_prompt_lists_subjects() {
        let subjects = vec!["Physics".to_string(), "Chemistry".to_string()];
        let prompt = study_plan_prompt("JEE", &subjects, 10, 6);
        assert!(prompt.contains("10-week study schedule for JEE"));
        assert!(prompt.contains("Subjects to cover: Physics, Chemistry"));
        assert!(prompt.contains("Study hours per day: 6"));
    }
}
