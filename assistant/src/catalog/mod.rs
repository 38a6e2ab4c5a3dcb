//! The metric catalog: every read the assistant can run, declared up front
//! as a named template over one of three reporting views. Anything outside
//! this catalog goes through the stricter ad-hoc path instead. The catalog
//! is compiled at startup; a malformed definition refuses to boot rather
//! than failing on a manager's question later.

pub mod template;

use std::collections::BTreeMap;

pub use template::{
    CompiledTemplate, ParamSpec, ParamType, ParamValue, RenderedQuery, TemplateError,
};

use crate::error::AssistantError;

pub const VIEW_AVAILABILITY: &str = "availability_by_day";
pub const VIEW_HOURS: &str = "employee_hours_by_week";
pub const VIEW_ASSIGNMENTS: &str = "day_assignments";

/// The only relations any assistant query may touch.
pub const WHITELISTED_VIEWS: [&str; 3] = [VIEW_AVAILABILITY, VIEW_HOURS, VIEW_ASSIGNMENTS];

/// Parameters the executor injects from the resolved scope. Templates use
/// them freely; callers never supply them.
pub const AUTO_PARAMS: [&str; 2] = ["store_ids", "iso_week"];

const DAY_ORDER_SQL: &str = "CASE day WHEN 'MON' THEN 1 WHEN 'TUE' THEN 2 WHEN 'WED' THEN 3 \
     WHEN 'THU' THEN 4 WHEN 'FRI' THEN 5 WHEN 'SAT' THEN 6 ELSE 7 END";

#[derive(Debug, Clone)]
pub struct MetricDefinition {
    pub name: &'static str,
    pub view: &'static str,
    pub params: Vec<ParamSpec>,
    pub template: CompiledTemplate,
}

impl MetricDefinition {
    /// Whether the metric is keyed to a week at all; availability is a
    /// recurring weekly pattern and is not.
    pub fn week_scoped(&self) -> bool {
        self.template.placeholders().contains(&"iso_week")
    }
}

#[derive(Debug, Clone)]
pub struct MetricCatalog {
    metrics: BTreeMap<&'static str, MetricDefinition>,
}

impl MetricCatalog {
    /// Compiles every definition. Any error here is a deployment defect and
    /// aborts startup.
    pub fn load() -> Result<Self, AssistantError> {
        let mut metrics = BTreeMap::new();
        for (name, view, params, sql) in definitions() {
            let allowed: Vec<&str> = params
                .iter()
                .map(|spec| spec.name)
                .chain(AUTO_PARAMS)
                .collect();
            let compiled = template::compile(&sql, &allowed).map_err(|error| {
                AssistantError::Template { name: name.to_string(), reason: error.to_string() }
            })?;
            let placeholders = compiled.placeholders();
            for spec in &params {
                if !placeholders.contains(&spec.name) {
                    return Err(AssistantError::Template {
                        name: name.to_string(),
                        reason: format!("declares unused parameter '{}'", spec.name),
                    });
                }
            }
            if !WHITELISTED_VIEWS.contains(&view) {
                return Err(AssistantError::Template {
                    name: name.to_string(),
                    reason: format!("targets non-whitelisted view '{view}'"),
                });
            }
            metrics.insert(name, MetricDefinition { name, view, params, template: compiled });
        }
        Ok(MetricCatalog { metrics })
    }

    pub fn get(&self, name: &str) -> Option<&MetricDefinition> {
        self.metrics.get(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.metrics.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

type Definition = (&'static str, &'static str, Vec<ParamSpec>, String);

fn definitions() -> Vec<Definition> {
    vec![
        (
            "hours_for_employee",
            VIEW_HOURS,
            vec![ParamSpec::required("employee_id", ParamType::Text)],
            "SELECT employee_id, employee_name, store_id, scheduled_minutes, target_minutes \
             FROM employee_hours_by_week \
             WHERE store_id = ANY({store_ids}) AND iso_week = {iso_week} \
             AND employee_id = {employee_id} \
             ORDER BY employee_name"
                .to_string(),
        ),
        (
            "hours_for_week",
            VIEW_HOURS,
            vec![],
            "SELECT employee_id, employee_name, store_id, scheduled_minutes, target_minutes \
             FROM employee_hours_by_week \
             WHERE store_id = ANY({store_ids}) AND iso_week = {iso_week} \
             ORDER BY employee_name"
                .to_string(),
        ),
        (
            "hours_top_n",
            VIEW_HOURS,
            vec![ParamSpec::required("limit", ParamType::Int)],
            "SELECT employee_id, employee_name, store_id, scheduled_minutes, target_minutes \
             FROM employee_hours_by_week \
             WHERE store_id = ANY({store_ids}) AND iso_week = {iso_week} \
             ORDER BY scheduled_minutes DESC, employee_name \
             LIMIT {limit}"
                .to_string(),
        ),
        (
            "hours_under_target",
            VIEW_HOURS,
            vec![],
            "SELECT employee_id, employee_name, store_id, scheduled_minutes, target_minutes, \
             target_minutes - scheduled_minutes AS shortfall_minutes \
             FROM employee_hours_by_week \
             WHERE store_id = ANY({store_ids}) AND iso_week = {iso_week} \
             AND scheduled_minutes < target_minutes \
             ORDER BY shortfall_minutes DESC, employee_name"
                .to_string(),
        ),
        (
            "hours_over_target",
            VIEW_HOURS,
            vec![],
            "SELECT employee_id, employee_name, store_id, scheduled_minutes, target_minutes, \
             scheduled_minutes - target_minutes AS surplus_minutes \
             FROM employee_hours_by_week \
             WHERE store_id = ANY({store_ids}) AND iso_week = {iso_week} \
             AND scheduled_minutes > target_minutes \
             ORDER BY surplus_minutes DESC, employee_name"
                .to_string(),
        ),
        (
            "availability_on_day",
            VIEW_AVAILABILITY,
            vec![
                ParamSpec::required("day", ParamType::Day),
                ParamSpec::optional("window_start", ParamType::Int),
                ParamSpec::optional("window_end", ParamType::Int),
            ],
            "SELECT employee_id, employee_name, store_id, day, start_minute, end_minute \
             FROM availability_by_day \
             WHERE store_id = ANY({store_ids}) AND day = {day} AND is_off = false\
             [[ AND end_minute > {window_start} AND start_minute < {window_end}]] \
             ORDER BY employee_name, start_minute"
                .to_string(),
        ),
        (
            "availability_for_employee",
            VIEW_AVAILABILITY,
            vec![ParamSpec::required("employee_id", ParamType::Text)],
            format!(
                "SELECT employee_id, employee_name, store_id, day, start_minute, end_minute, is_off \
                 FROM availability_by_day \
                 WHERE store_id = ANY({{store_ids}}) AND employee_id = {{employee_id}} \
                 ORDER BY {DAY_ORDER_SQL}, start_minute"
            ),
        ),
        (
            "schedule_for_employee",
            VIEW_ASSIGNMENTS,
            vec![ParamSpec::required("employee_id", ParamType::Text)],
            format!(
                "SELECT employee_id, employee_name, store_id, iso_week, day, start_minute, \
                 end_minute, duration_minutes, work_type \
                 FROM day_assignments \
                 WHERE store_id = ANY({{store_ids}}) AND iso_week = {{iso_week}} \
                 AND employee_id = {{employee_id}} \
                 ORDER BY {DAY_ORDER_SQL}, start_minute"
            ),
        ),
        (
            "who_works_on_day",
            VIEW_ASSIGNMENTS,
            vec![
                ParamSpec::required("day", ParamType::Day),
                ParamSpec::optional("work_type", ParamType::Text),
            ],
            "SELECT employee_id, employee_name, store_id, iso_week, day, start_minute, \
             end_minute, duration_minutes, work_type \
             FROM day_assignments \
             WHERE store_id = ANY({store_ids}) AND iso_week = {iso_week} AND day = {day} \
             AND employee_id IS NOT NULL\
             [[ AND work_type ILIKE '%' || {work_type} || '%']] \
             ORDER BY start_minute, employee_name"
                .to_string(),
        ),
        (
            "coverage_gaps",
            VIEW_ASSIGNMENTS,
            vec![ParamSpec::optional("day", ParamType::Day)],
            format!(
                "SELECT store_id, iso_week, day, start_minute, end_minute, duration_minutes, \
                 work_type \
                 FROM day_assignments \
                 WHERE store_id = ANY({{store_ids}}) AND iso_week = {{iso_week}} \
                 AND employee_id IS NULL\
                 [[ AND day = {{day}}]] \
                 ORDER BY {DAY_ORDER_SQL}, start_minute"
            ),
        ),
        (
            "minutes_on_day",
            VIEW_ASSIGNMENTS,
            vec![ParamSpec::required("day", ParamType::Day)],
            "SELECT employee_id, employee_name, sum(duration_minutes)::bigint AS minutes \
             FROM day_assignments \
             WHERE store_id = ANY({store_ids}) AND iso_week = {iso_week} AND day = {day} \
             AND employee_id IS NOT NULL \
             GROUP BY employee_id, employee_name \
             ORDER BY employee_name"
                .to_string(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_core::Weekday;

    #[test]
    fn catalog_loads_with_every_metric() {
        let catalog = MetricCatalog::load().expect("catalog compiles");
        assert_eq!(catalog.len(), 11);
        for name in [
            "hours_for_employee",
            "hours_for_week",
            "hours_top_n",
            "hours_under_target",
            "hours_over_target",
            "availability_on_day",
            "availability_for_employee",
            "schedule_for_employee",
            "who_works_on_day",
            "coverage_gaps",
            "minutes_on_day",
        ] {
            assert!(catalog.get(name).is_some(), "missing metric {name}");
        }
        assert!(catalog.get("drop_everything").is_none());
    }

    #[test]
    fn availability_window_block_is_conditional() {
        let catalog = MetricCatalog::load().expect("catalog compiles");
        let metric = catalog.get("availability_on_day").expect("metric exists");

        let mut values = BTreeMap::new();
        values.insert(
            "store_ids".to_string(),
            ParamValue::TextArray(vec!["st-1".to_string()]),
        );
        values.insert("day".to_string(), ParamValue::Day(Weekday::Fri));

        let bare = metric.template.render(&values).expect("renders");
        assert!(!bare.sql.contains("end_minute >"));
        assert_eq!(bare.binds.len(), 2);

        values.insert("window_start".to_string(), ParamValue::Int(480));
        values.insert("window_end".to_string(), ParamValue::Int(720));
        let windowed = metric.template.render(&values).expect("renders");
        assert!(windowed.sql.contains("end_minute > $3::bigint"));
        assert!(windowed.sql.contains("start_minute < $4::bigint"));
    }

    #[test]
    fn availability_is_not_week_scoped_but_hours_are() {
        let catalog = MetricCatalog::load().expect("catalog compiles");
        assert!(!catalog.get("availability_on_day").expect("exists").week_scoped());
        assert!(catalog.get("hours_for_week").expect("exists").week_scoped());
    }

    #[test]
    fn top_n_renders_a_bound_limit() {
        let catalog = MetricCatalog::load().expect("catalog compiles");
        let metric = catalog.get("hours_top_n").expect("metric exists");

        let mut values = BTreeMap::new();
        values.insert(
            "store_ids".to_string(),
            ParamValue::TextArray(vec!["st-1".to_string()]),
        );
        values.insert("iso_week".to_string(), ParamValue::Text("2025-W10".to_string()));
        values.insert("limit".to_string(), ParamValue::Int(3));

        let rendered = metric.template.render(&values).expect("renders");
        assert!(rendered.sql.ends_with("LIMIT $3::bigint"));
        assert_eq!(rendered.binds.len(), 3);
    }
}
