use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    #[default]
    Active,
    Paused,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub id: u64,
    pub name: String,
    pub exam_type: String,
    pub subjects: Vec<String>,
    pub weeks: u32,
    pub hours_per_day: u32,
    pub created_date: NaiveDate,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub status: ScheduleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_plan: Option<Vec<WeekPlan>>,
}

/// One week of an AI-generated plan. The model output is never validated, so
/// every field may be missing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
    #[serde(default)]
    pub daily_schedule: BTreeMap<String, DaySchedule>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
}

impl WeekPlan {
    /// Lenient conversion from arbitrary model output. Missing or mistyped
    /// fields become `None`/empty; non-object values yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let daily_schedule = obj
            .get("daily_schedule")
            .and_then(Value::as_object)
            .map(|days| {
                days.iter()
                    .filter_map(|(day, v)| DaySchedule::from_value(v).map(|d| (day.clone(), d)))
                    .collect()
            })
            .unwrap_or_default();
        Some(Self {
            week: obj
                .get("week")
                .and_then(Value::as_u64)
                .and_then(|w| u32::try_from(w).ok()),
            focus: obj.get("focus").and_then(Value::as_str).map(str::to_string),
            daily_schedule,
        })
    }
}

impl DaySchedule {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let topics = match obj.get("topics") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(Value::String(single)) => vec![single.clone()],
            _ => Vec::new(),
        };
        Some(Self {
            subject: obj.get("subject").and_then(Value::as_str).map(str::to_string),
            topics,
            hours: obj.get("hours").and_then(Value::as_f64),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mcq {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ExamPreset {
    pub code: &'static str,
    pub name: &'static str,
    pub subjects: &'static [&'static str],
    pub duration_weeks: u32,
    pub description: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub current_week: i64,
    pub progress: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScheduleView {
    #[serde(flatten)]
    pub schedule: ScheduleRecord,
    #[serde(flatten)]
    pub progress: Progress,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizScore {
    pub score: usize,
    pub total: usize,
}

/// On-disk form of the schedules collection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ScheduleFileRepr")]
pub struct ScheduleFile {
    pub next_id: u64,
    pub schedules: Vec<ScheduleRecord>,
}

// Older files hold a bare array of records.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScheduleFileRepr {
    Current {
        next_id: u64,
        schedules: Vec<ScheduleRecord>,
    },
    Legacy(Vec<ScheduleRecord>),
}

impl From<ScheduleFileRepr> for ScheduleFile {
    fn from(repr: ScheduleFileRepr) -> Self {
        match repr {
            ScheduleFileRepr::Current {
                next_id,
                schedules,
            } => {
                let floor = schedules.iter().map(|s| s.id).max().unwrap_or(0) + 1;
                Self {
                    next_id: next_id.max(floor),
                    schedules,
                }
            }
            ScheduleFileRepr::Legacy(schedules) => {
                let next_id = schedules.iter().map(|s| s.id).max().unwrap_or(0) + 1;
                Self { next_id, schedules }
            }
        }
    }
}

pub type AnswerCache = BTreeMap<String, String>;
