//! Built-in reference data: subjects, prewritten answers and exam presets.

use crate::types::ExamPreset;

pub const CUSTOM_PRESET: &str = "Custom";

pub const SUBJECTS: &[&str] = &["Math", "Science", "English", "Electronics"];

const STATIC_ANSWERS: &[(&str, &[(&str, &str)])] = &[
    (
        "Math",
        &[
            ("What is 2+2?", "2+2 = 4"),
            ("What is 10-3?", "10-3 = 7"),
            (
                "What is correlation?",
                "Correlation measures the relationship between two variables.",
            ),
        ],
    ),
    (
        "Science",
        &[
            ("What is H2O?", "H2O is water"),
            ("Which planet is nearest to the sun?", "Mercury"),
            (
                "What is Ohm's law?",
                "Ohm's law states that V = IR, where V is voltage, I is current, and R is resistance.",
            ),
        ],
    ),
    (
        "English",
        &[("Synonym of happy?", "Joyful"), ("Antonym of fast?", "Slow")],
    ),
    (
        "Electronics",
        &[
            ("What does LED stand for?", "Light Emitting Diode"),
            ("What is the unit of electric current?", "Ampere"),
        ],
    ),
];

pub const EXAM_PRESETS: &[ExamPreset] = &[
    ExamPreset {
        code: "GATE",
        name: "GATE (Graduate Aptitude Test in Engineering)",
        subjects: &[
            "Engineering Mathematics",
            "General Aptitude",
            "Technical Subject",
            "Data Structures",
            "Algorithms",
        ],
        duration_weeks: 24,
        description: "Comprehensive preparation for GATE exam",
    },
    ExamPreset {
        code: "JEE",
        name: "JEE (Joint Entrance Examination)",
        subjects: &["Physics", "Chemistry", "Mathematics"],
        duration_weeks: 52,
        description: "Complete JEE Main and Advanced preparation",
    },
    ExamPreset {
        code: "NEET",
        name: "NEET (National Eligibility cum Entrance Test)",
        subjects: &[
            "Physics",
            "Chemistry",
            "Biology (Botany)",
            "Biology (Zoology)",
        ],
        duration_weeks: 48,
        description: "Medical entrance exam preparation",
    },
    ExamPreset {
        code: "CAT",
        name: "CAT (Common Admission Test)",
        subjects: &[
            "Quantitative Ability",
            "Verbal Ability",
            "Data Interpretation",
            "Logical Reasoning",
        ],
        duration_weeks: 32,
        description: "MBA entrance exam preparation",
    },
    ExamPreset {
        code: "UPSC",
        name: "UPSC Civil Services",
        subjects: &[
            "History",
            "Geography",
            "Polity",
            "Economy",
            "Science & Technology",
            "Current Affairs",
        ],
        duration_weeks: 52,
        description: "Civil Services examination preparation",
    },
    ExamPreset {
        code: CUSTOM_PRESET,
        name: "Custom Exam Preparation",
        subjects: &[],
        duration_weeks: 12,
        description: "Create your own study schedule",
    },
];

/// Prewritten question/answer pairs for `subject`, in table order. Unknown
/// subjects have none.
pub fn questions_for(subject: &str) -> &'static [(&'static str, &'static str)] {
    STATIC_ANSWERS
        .iter()
        .find(|(s, _)| *s == subject)
        .map(|(_, qa)| *qa)
        .unwrap_or(&[])
}

pub fn static_answer(subject: &str, question: &str) -> Option<&'static str> {
    questions_for(subject)
        .iter()
        .find(|(q, _)| *q == question)
        .map(|(_, a)| *a)
}

pub fn preset(code: &str) -> Option<&'static ExamPreset> {
    EXAM_PRESETS.iter().find(|p| p.code == code)
}
