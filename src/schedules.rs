use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::info;

use crate::content::{self, CUSTOM_PRESET};
use crate::error::{ServiceError, ServiceResult};
use crate::planner::PlanGenerator;
use crate::storage::JsonStore;
use crate::types::{Progress, ScheduleFile, ScheduleRecord, ScheduleStatus, ScheduleView};

pub const DEFAULT_SCHEDULE_NAME: &str = "Custom Study Plan";
pub const DEFAULT_WEEKS: u32 = 12;
pub const DEFAULT_HOURS_PER_DAY: u32 = 4;

fn default_weeks() -> u32 {
    DEFAULT_WEEKS
}

fn default_hours_per_day() -> u32 {
    DEFAULT_HOURS_PER_DAY
}

/// Creation request as submitted by a client.
#[derive(Clone, Debug, Deserialize)]
pub struct NewSchedule {
    pub exam_type: String,
    #[serde(default)]
    pub custom_name: Option<String>,
    #[serde(default = "default_weeks")]
    pub weeks: u32,
    #[serde(default = "default_hours_per_day")]
    pub hours_per_day: u32,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

pub struct ScheduleManager {
    store: JsonStore<ScheduleFile>,
    planner: PlanGenerator,
}

impl ScheduleManager {
    pub fn new(store: JsonStore<ScheduleFile>, planner: PlanGenerator) -> Self {
        Self { store, planner }
    }

    pub fn create(&mut self, request: NewSchedule) -> ServiceResult<ScheduleRecord> {
        self.create_on(request, Local::now().date_naive())
    }

    /// Same as [`create`](Self::create) with an explicit "today".
    pub fn create_on(
        &mut self,
        request: NewSchedule,
        today: NaiveDate,
    ) -> ServiceResult<ScheduleRecord> {
        if request.weeks == 0 {
            return Err(ServiceError::InvalidInput(
                "weeks must be greater than zero".to_string(),
            ));
        }
        if request.hours_per_day == 0 {
            return Err(ServiceError::InvalidInput(
                "hours_per_day must be greater than zero".to_string(),
            ));
        }

        let preset = content::preset(&request.exam_type).filter(|p| p.code != CUSTOM_PRESET);
        let (name, subjects) = match preset {
            Some(preset) => {
                let subjects = if request.subjects.is_empty() {
                    preset.subjects.iter().map(|s| s.to_string()).collect()
                } else {
                    request.subjects
                };
                (preset.name.to_string(), subjects)
            }
            None => {
                let name = request
                    .custom_name
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| DEFAULT_SCHEDULE_NAME.to_string());
                (name, request.subjects)
            }
        };

        let ai_plan = self.planner.generate(
            &request.exam_type,
            &subjects,
            request.weeks,
            request.hours_per_day,
        );

        let data = self.store.data_mut();
        let previous_next_id = data.next_id;
        let record = ScheduleRecord {
            id: data.next_id.max(1),
            name,
            exam_type: request.exam_type,
            subjects,
            weeks: request.weeks,
            hours_per_day: request.hours_per_day,
            created_date: today,
            start_date: request.start_date.unwrap_or(today),
            status: ScheduleStatus::Active,
            ai_plan,
        };
        data.next_id = record.id + 1;
        data.schedules.push(record.clone());
        if let Err(e) = self.store.save() {
            let data = self.store.data_mut();
            data.schedules.pop();
            data.next_id = previous_next_id;
            return Err(e.into());
        }

        info!(id = record.id, name = %record.name, "schedule created");
        Ok(record)
    }

    pub fn get(&self, id: u64) -> ServiceResult<&ScheduleRecord> {
        self.store
            .data()
            .schedules
            .iter()
            .find(|s| s.id == id)
            .ok_or(ServiceError::ScheduleNotFound(id))
    }

    /// Record plus progress as of `as_of`.
    pub fn view(&self, id: u64, as_of: NaiveDate) -> ServiceResult<ScheduleView> {
        let schedule = self.get(id)?.clone();
        let progress = compute_progress(&schedule, as_of);
        Ok(ScheduleView { schedule, progress })
    }

    pub fn list(&self) -> &[ScheduleRecord] {
        &self.store.data().schedules
    }

    pub fn delete(&mut self, id: u64) -> ServiceResult<()> {
        let schedules = &mut self.store.data_mut().schedules;
        let index = schedules
            .iter()
            .position(|s| s.id == id)
            .ok_or(ServiceError::ScheduleNotFound(id))?;
        let removed = schedules.remove(index);
        if let Err(e) = self.store.save() {
            self.store.data_mut().schedules.insert(index, removed);
            return Err(e.into());
        }
        info!(id, "schedule deleted");
        Ok(())
    }
}

/// Week and percentage reached on `as_of`. Dates before the start are not
/// clamped and give a week below one.
pub fn compute_progress(record: &ScheduleRecord, as_of: NaiveDate) -> Progress {
    let weeks = i64::from(record.weeks.max(1));
    let days_elapsed = (as_of - record.start_date).num_days();
    let current_week = (days_elapsed.div_euclid(7) + 1).min(weeks);
    let percent = (current_week as f64 / weeks as f64 * 100.0).min(100.0);
    Progress {
        current_week,
        progress: (percent * 10.0).round() / 10.0,
    }
}
