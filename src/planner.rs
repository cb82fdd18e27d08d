use serde_json::Value;
use tracing::{info, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::gemini::{SharedGenerator, extract_json_array};
use crate::prompts::study_plan_prompt;
use crate::types::WeekPlan;

/// Asks the model for a week-by-week plan. `None` means "no plan"; callers
/// carry on without one.
#[derive(Clone)]
pub struct PlanGenerator {
    generator: Option<SharedGenerator>,
}

impl PlanGenerator {
    pub fn new(generator: Option<SharedGenerator>) -> Self {
        Self { generator }
    }

    pub fn generate(
        &self,
        exam_type: &str,
        subjects: &[String],
        weeks: u32,
        hours_per_day: u32,
    ) -> Option<Vec<WeekPlan>> {
        let generator = self.generator.as_ref()?;
        match request_plan(generator, exam_type, subjects, weeks, hours_per_day) {
            Ok(plan) => {
                info!(exam_type, weeks = plan.len(), "AI study plan generated");
                Some(plan)
            }
            Err(e) => {
                warn!(exam_type, error = %e, "AI study plan generation failed");
                None
            }
        }
    }
}

fn request_plan(
    generator: &SharedGenerator,
    exam_type: &str,
    subjects: &[String],
    weeks: u32,
    hours_per_day: u32,
) -> ServiceResult<Vec<WeekPlan>> {
    let prompt = study_plan_prompt(exam_type, subjects, weeks, hours_per_day);
    let text = generator.generate(&prompt)?;
    let json = extract_json_array(text.trim())
        .ok_or_else(|| ServiceError::ApiError("No JSON array found in AI output".to_string()))?;
    let items: Vec<Value> = serde_json::from_str(json)?;
    let plan: Vec<WeekPlan> = items.iter().filter_map(WeekPlan::from_value).collect();
    if plan.is_empty() {
        return Err(ServiceError::ApiError(
            "AI output contained no weekly plans".to_string(),
        ));
    }
    Ok(plan)
}
