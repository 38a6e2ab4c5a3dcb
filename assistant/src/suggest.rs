//! Coverage suggestions: who could plausibly take an open slot. All input
//! data comes through catalog metrics so every read lands in the source
//! band; the engine itself only scores and never writes.

use std::collections::BTreeMap;
use std::sync::Arc;

use rota_core::time::render_duration;
use rota_core::{TimeWindow, Weekday};

use crate::catalog::ParamValue;
use crate::error::AssistantError;
use crate::outcome::SourceRead;
use crate::query::{row_i64, row_str, QueryExecutor, ScopeParams};
use crate::resolve::work_types::ResolvedWorkType;
use crate::store::directory::EmployeeRecord;
use crate::text;

pub const DEFAULT_LIMIT: usize = 5;

// Scoring weights, kept in one block so a retune touches one place.
// Values mirror the scheduler's feasibility heuristics; tuning is still
// open with product.
const HOME_STORE_BONUS: i32 = 30;
const CROSS_STORE_BONUS: i32 = 15;
const ROLE_MATCH_BONUS: i32 = 25;
const ROLE_BASELINE_BONUS: i32 = 10;
const FREE_DAY_BONUS: i32 = 20;
const LIGHT_DAY_BONUS: i32 = 10;
const LIGHT_DAY_MAX_MINUTES: i64 = 240;
const SHORTFALL_MAJOR_BONUS: i32 = 15;
const SHORTFALL_MAJOR_MINUTES: i64 = 240;
const SHORTFALL_MINOR_BONUS: i32 = 8;
const FULL_WINDOW_BONUS: i32 = 10;
const PARTIAL_WINDOW_BONUS: i32 = 5;

#[derive(Debug, Clone)]
pub struct SuggestionRequest {
    pub day: Weekday,
    pub window: Option<TimeWindow>,
    pub work_type: Option<ResolvedWorkType>,
    pub limit: usize,
}

/// One scored candidate with the reasons each rule contributed.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub employee_id: String,
    pub employee_name: String,
    pub home_store_id: String,
    pub score: i32,
    pub reasons: Vec<String>,
    pub minutes_on_day: i64,
    pub minutes_in_week: i64,
    pub weekly_target: i64,
}

pub struct SuggestionEngine {
    executor: Arc<QueryExecutor>,
}

impl SuggestionEngine {
    pub fn new(executor: Arc<QueryExecutor>) -> Self {
        SuggestionEngine { executor }
    }

    /// Scores every employee with availability on the day. Hard rules
    /// (cross-store without the borrow flag, missing required role, zero
    /// window overlap) exclude a candidate outright rather than ranking
    /// them low.
    pub async fn suggest(
        &self,
        request: &SuggestionRequest,
        employees: &[EmployeeRecord],
        scope: &ScopeParams,
        primary_store_id: &str,
    ) -> Result<(Vec<Candidate>, Vec<SourceRead>), AssistantError> {
        let mut day_param = BTreeMap::new();
        day_param.insert("day".to_string(), ParamValue::Day(request.day));

        let availability = self
            .executor
            .run_metric("availability_on_day", day_param.clone(), scope)
            .await?;
        let hours = self
            .executor
            .run_metric("hours_for_week", BTreeMap::new(), scope)
            .await?;
        let on_day = self
            .executor
            .run_metric("minutes_on_day", day_param, scope)
            .await?;
        let sources = vec![
            availability.source.clone(),
            hours.source.clone(),
            on_day.source.clone(),
        ];

        let mut windows_by_employee: BTreeMap<String, Vec<TimeWindow>> = BTreeMap::new();
        for row in &availability.rows {
            let Some(id) = row_str(row, "employee_id") else { continue };
            let (Some(start), Some(end)) =
                (row_i64(row, "start_minute"), row_i64(row, "end_minute"))
            else {
                continue;
            };
            let Ok(window) = TimeWindow::new(start as i32, end as i32) else { continue };
            windows_by_employee.entry(id.to_string()).or_default().push(window);
        }

        let mut week_minutes: BTreeMap<String, i64> = BTreeMap::new();
        let mut week_targets: BTreeMap<String, i64> = BTreeMap::new();
        for row in &hours.rows {
            let Some(id) = row_str(row, "employee_id") else { continue };
            if let Some(minutes) = row_i64(row, "scheduled_minutes") {
                week_minutes.insert(id.to_string(), minutes);
            }
            if let Some(target) = row_i64(row, "target_minutes") {
                week_targets.insert(id.to_string(), target);
            }
        }

        let mut day_minutes: BTreeMap<String, i64> = BTreeMap::new();
        for row in &on_day.rows {
            let Some(id) = row_str(row, "employee_id") else { continue };
            if let Some(minutes) = row_i64(row, "minutes") {
                day_minutes.insert(id.to_string(), minutes);
            }
        }

        let mut candidates = Vec::new();
        for employee in employees {
            let Some(windows) = windows_by_employee.get(&employee.id) else { continue };

            let mut score = 0;
            let mut reasons = Vec::new();

            if employee.home_store_id == primary_store_id {
                score += HOME_STORE_BONUS;
                reasons.push("home store".to_string());
            } else if employee.can_work_across_stores {
                score += CROSS_STORE_BONUS;
                reasons.push("can cover from another store".to_string());
            } else {
                continue;
            }

            match &request.work_type {
                Some(required) => {
                    if !holds_role(employee, required) {
                        continue;
                    }
                    score += ROLE_MATCH_BONUS;
                    reasons.push(format!("qualified as {}", required.filter_text()));
                }
                None => {
                    score += ROLE_BASELINE_BONUS;
                    reasons.push("no role restriction".to_string());
                }
            }

            let minutes_on_day = day_minutes.get(&employee.id).copied().unwrap_or(0);
            if minutes_on_day == 0 {
                score += FREE_DAY_BONUS;
                reasons.push("nothing scheduled that day".to_string());
            } else if minutes_on_day < LIGHT_DAY_MAX_MINUTES {
                score += LIGHT_DAY_BONUS;
                reasons.push(format!(
                    "only {} scheduled that day",
                    render_duration(minutes_on_day as i32)
                ));
            }

            let minutes_in_week = week_minutes.get(&employee.id).copied().unwrap_or(0);
            let weekly_target = week_targets
                .get(&employee.id)
                .copied()
                .unwrap_or(i64::from(employee.weekly_minutes_target));
            let shortfall = weekly_target - minutes_in_week;
            if shortfall > SHORTFALL_MAJOR_MINUTES {
                score += SHORTFALL_MAJOR_BONUS;
                reasons.push(format!(
                    "{} under weekly target",
                    render_duration(shortfall as i32)
                ));
            } else if shortfall > 0 {
                score += SHORTFALL_MINOR_BONUS;
                reasons.push(format!(
                    "{} under weekly target",
                    render_duration(shortfall as i32)
                ));
            }

            if let Some(window) = request.window {
                if windows.iter().any(|available| available.contains(&window)) {
                    score += FULL_WINDOW_BONUS;
                    reasons.push("available for the whole window".to_string());
                } else if windows
                    .iter()
                    .any(|available| available.overlap_minutes(&window) > 0)
                {
                    score += PARTIAL_WINDOW_BONUS;
                    reasons.push("partial availability in the window".to_string());
                } else {
                    continue;
                }
            }

            candidates.push(Candidate {
                employee_id: employee.id.clone(),
                employee_name: employee.name.clone(),
                home_store_id: employee.home_store_id.clone(),
                score,
                reasons,
                minutes_on_day,
                minutes_in_week,
                weekly_target,
            });
        }

        candidates.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.employee_name.cmp(&b.employee_name))
        });
        let limit = if request.limit == 0 { DEFAULT_LIMIT } else { request.limit };
        candidates.truncate(limit);

        tracing::info!(
            day = request.day.as_str(),
            candidates = candidates.len(),
            "suggestions computed"
        );
        Ok((candidates, sources))
    }
}

/// Same-store qualifications share work-type ids; borrowed employees match
/// by role name since ids are store-local.
fn holds_role(employee: &EmployeeRecord, required: &ResolvedWorkType) -> bool {
    if let Some(id) = &required.id {
        if employee.has_role_id(id) {
            return true;
        }
    }
    employee.has_role_named(&text::normalize(required.filter_text()))
}
