//! Best-effort validation of model output into typed records.
//!
//! Extraction is fallible by nature, so nothing in here returns an error:
//! unusable output yields `None`. Ratings are clamped into range, missing
//! optional fields take their defaults, and a record is only rejected when
//! its discriminating field is absent or blank.

use super::record::{
    BurnoutRisk, ExtractedRecord, FocusRecord, MAX_RATING, MIN_RATING, PainPointRecord,
    PulseRecord, RoleRecord, WorkflowRecord,
};
use crate::agent::AgentCode;
use serde_json::{Deserializer, Map, Value};

/// Parses `raw` model output into a record for `code`.
pub fn validate(code: AgentCode, raw: &str) -> Option<ExtractedRecord> {
    let object = parse_object(raw)?;
    let fields = Fields(&object);

    let record = match code {
        AgentCode::Pulse => ExtractedRecord::Pulse(pulse(&fields)?),
        AgentCode::RoleMapper => ExtractedRecord::RoleMapper(role(&fields)?),
        AgentCode::WorkflowMapper => ExtractedRecord::WorkflowMapper(workflow(&fields)?),
        AgentCode::PainScanner => ExtractedRecord::PainScanner(pain_point(&fields)?),
        AgentCode::FocusTracker => ExtractedRecord::FocusTracker(focus(&fields)?),
    };
    Some(record)
}

/// Clamps a raw numeric rating into `MIN_RATING..=MAX_RATING`.
///
/// Fractions are rounded to the nearest integer. Non-finite input yields
/// `None`.
pub fn clamp_rating(value: f64) -> Option<u8> {
    if !value.is_finite() {
        return None;
    }
    let clamped = value.round().clamp(f64::from(MIN_RATING), f64::from(MAX_RATING));
    Some(clamped as u8)
}

/// Finds the first JSON object in `raw`, tolerating code fences and prose.
///
/// `llm_toolkit::extract_json` handles the common shapes. When its candidate
/// is not an object, every `{` is tried in turn as the start of a complete
/// JSON value, so stray braces in prose do not hide the record.
fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    if let Ok(candidate) = llm_toolkit::extract_json(raw) {
        match serde_json::from_str::<Value>(&candidate) {
            Ok(Value::Object(map)) => return Some(map),
            Ok(_) => {}
            Err(err) => tracing::debug!("Extracted candidate is not JSON: {}", err),
        }
    }
    let object = raw
        .match_indices('{')
        .find_map(|(start, _)| leading_object(&raw[start..]));
    if object.is_none() {
        tracing::debug!("Discarding extraction output without a JSON object");
    }
    object
}

/// Parses the JSON object at the start of `text`, ignoring what follows it.
fn leading_object(text: &str) -> Option<Map<String, Value>> {
    match Deserializer::from_str(text).into_iter::<Value>().next()? {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn pulse(fields: &Fields<'_>) -> Option<PulseRecord> {
    Some(PulseRecord {
        rating: fields.rating(&["rating", "morale_rating", "morale"])?,
        burnout_risk: fields.burnout("burnout_risk"),
        stressors: fields.list(&["stressors", "concerns"]),
        summary: fields.text(&["summary"]),
    })
}

fn role(fields: &Fields<'_>) -> Option<RoleRecord> {
    Some(RoleRecord {
        role_summary: fields.text(&["role_summary"])?,
        primary_duties: fields.list(&["primary_duties", "duties"]),
        customer_facing: fields.flag("customer_facing"),
    })
}

fn workflow(fields: &Fields<'_>) -> Option<WorkflowRecord> {
    Some(WorkflowRecord {
        workflow_name: fields.text(&["workflow_name", "name"])?,
        steps: fields.list(&["steps"]),
        tools: fields.list(&["tools"]),
        frequency: fields.text(&["frequency"]),
    })
}

fn pain_point(fields: &Fields<'_>) -> Option<PainPointRecord> {
    Some(PainPointRecord {
        pain_description: fields.text(&["pain_description", "description"])?,
        workflow_name: fields.text(&["workflow_name", "workflow"]),
        tool_name: fields.text(&["tool_name", "tool"]),
        rating: fields
            .rating(&["rating", "severity_rating"])
            .unwrap_or(DEFAULT_PAIN_RATING),
    })
}

fn focus(fields: &Fields<'_>) -> Option<FocusRecord> {
    Some(FocusRecord {
        current_focus_label: fields.text(&["current_focus_label", "focus_label"])?,
        tags: fields.list(&["tags"]),
        summary: fields.text(&["summary"]),
    })
}

/// Neutral rating used when a pain point arrives without one.
const DEFAULT_PAIN_RATING: u8 = 3;

/// Lenient accessors over a parsed JSON object.
struct Fields<'a>(&'a Map<String, Value>);

impl Fields<'_> {
    fn first(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find(|value| !value.is_null())
    }

    fn text(&self, keys: &[&str]) -> Option<String> {
        let value = self.first(keys)?;
        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    fn rating(&self, keys: &[&str]) -> Option<u8> {
        match self.first(keys)? {
            Value::Number(n) => n.as_f64().and_then(clamp_rating),
            Value::String(s) => s.trim().parse::<f64>().ok().and_then(clamp_rating),
            _ => None,
        }
    }

    fn list(&self, keys: &[&str]) -> Vec<String> {
        let Some(value) = self.first(keys) else {
            return Vec::new();
        };
        let items: Vec<String> = match value {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
            Value::String(s) => s
                .split([',', ';', '\n'])
                .map(|part| part.trim().to_string())
                .collect(),
            _ => Vec::new(),
        };
        items.into_iter().filter(|item| !item.is_empty()).collect()
    }

    fn flag(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "y"),
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            _ => false,
        }
    }

    fn burnout(&self, key: &str) -> BurnoutRisk {
        let Some(Value::String(label)) = self.0.get(key) else {
            return BurnoutRisk::default();
        };
        match label.trim().to_lowercase().as_str() {
            "high" | "severe" => BurnoutRisk::High,
            "medium" | "moderate" | "med" => BurnoutRisk::Medium,
            _ => BurnoutRisk::Low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping_law() {
        for raw in [-40.0, -1.0, 0.0, 0.4, 1.0, 2.6, 5.0, 5.5, 9.0, 1e9] {
            let rating = clamp_rating(raw).unwrap();
            assert!((MIN_RATING..=MAX_RATING).contains(&rating), "{raw} -> {rating}");
        }
        assert_eq!(clamp_rating(2.6), Some(3));
        assert_eq!(clamp_rating(f64::NAN), None);
    }

    #[test]
    fn test_out_of_range_rating_is_clamped_not_rejected() {
        let raw = r#"{"rating": 11, "burnout_risk": "low"}"#;
        let Some(ExtractedRecord::Pulse(pulse)) = validate(AgentCode::Pulse, raw) else {
            panic!("expected a pulse record");
        };
        assert_eq!(pulse.rating, 5);

        let raw = r#"{"rating": -3}"#;
        let Some(ExtractedRecord::Pulse(pulse)) = validate(AgentCode::Pulse, raw) else {
            panic!("expected a pulse record");
        };
        assert_eq!(pulse.rating, 1);
    }

    #[test]
    fn test_fenced_json_inside_prose() {
        let raw = "Sure! Here is the summary:\n```json\n{\"role_summary\": \"Runs payroll\", \"primary_duties\": [\"payroll\", \" audits \"]}\n```\nLet me know.";
        let Some(ExtractedRecord::RoleMapper(role)) = validate(AgentCode::RoleMapper, raw) else {
            panic!("expected a role record");
        };
        assert_eq!(role.role_summary, "Runs payroll");
        assert_eq!(role.primary_duties, vec!["payroll", "audits"]);
        assert!(!role.customer_facing);
    }

    #[test]
    fn test_bare_object_with_surrounding_text() {
        let raw = "Result: {\"current_focus_label\": \"Hiring\", \"tags\": \"recruiting, interviews\"} done";
        let Some(ExtractedRecord::FocusTracker(focus)) = validate(AgentCode::FocusTracker, raw) else {
            panic!("expected a focus record");
        };
        assert_eq!(focus.current_focus_label, "Hiring");
        assert_eq!(focus.tags, vec!["recruiting", "interviews"]);
    }

    #[test]
    fn test_braces_in_prose_before_the_object() {
        let raw = "Summary of {Dana}'s check-in: {\"rating\": 2, \"burnout_risk\": \"high\"} thanks";
        let Some(ExtractedRecord::Pulse(pulse)) = validate(AgentCode::Pulse, raw) else {
            panic!("expected a pulse record");
        };
        assert_eq!(pulse.rating, 2);
        assert_eq!(pulse.burnout_risk, BurnoutRisk::High);
    }

    #[test]
    fn test_first_of_two_fenced_blocks_wins() {
        let raw = "First pass:\n```json\n{\"rating\": 2}\n```\nRevised:\n```json\n{\"rating\": 3}\n```";
        let Some(ExtractedRecord::Pulse(pulse)) = validate(AgentCode::Pulse, raw) else {
            panic!("expected a pulse record");
        };
        assert!(matches!(pulse.rating, 2 | 3), "got {}", pulse.rating);
    }

    #[test]
    fn test_unparseable_output_is_none() {
        assert!(validate(AgentCode::Pulse, "I could not determine a rating.").is_none());
        assert!(validate(AgentCode::Pulse, "{rating: four}").is_none());
        assert!(validate(AgentCode::Pulse, "[1, 2, 3]").is_none());
        assert!(validate(AgentCode::Pulse, "").is_none());
    }

    #[test]
    fn test_missing_required_field_is_none() {
        assert!(validate(AgentCode::RoleMapper, r#"{"primary_duties": ["a"]}"#).is_none());
        assert!(validate(AgentCode::RoleMapper, r#"{"role_summary": "   "}"#).is_none());
        assert!(validate(AgentCode::WorkflowMapper, r#"{"steps": ["x"]}"#).is_none());
        assert!(validate(AgentCode::Pulse, r#"{"burnout_risk": "high"}"#).is_none());
    }

    #[test]
    fn test_missing_optional_fields_take_defaults() {
        let Some(ExtractedRecord::Pulse(pulse)) = validate(AgentCode::Pulse, r#"{"rating": "4"}"#) else {
            panic!("expected a pulse record");
        };
        assert_eq!(pulse.rating, 4);
        assert_eq!(pulse.burnout_risk, BurnoutRisk::Low);
        assert!(pulse.stressors.is_empty());

        let Some(ExtractedRecord::WorkflowMapper(workflow)) =
            validate(AgentCode::WorkflowMapper, r#"{"workflow_name": "Month-end close"}"#)
        else {
            panic!("expected a workflow record");
        };
        assert!(workflow.steps.is_empty());
        assert!(workflow.tools.is_empty());
    }

    #[test]
    fn test_pain_point_rating_defaults_to_neutral() {
        let raw = r#"{"pain_description": "Slow approvals", "tool": "Jira"}"#;
        let Some(ExtractedRecord::PainScanner(pain)) = validate(AgentCode::PainScanner, raw) else {
            panic!("expected a pain record");
        };
        assert_eq!(pain.rating, 3);
        assert_eq!(pain.tool_name.as_deref(), Some("Jira"));
        assert!(pain.workflow_name.is_none());
    }

    #[test]
    fn test_burnout_labels_are_lenient() {
        let raw = r#"{"rating": 2, "burnout_risk": "Moderate"}"#;
        let Some(ExtractedRecord::Pulse(pulse)) = validate(AgentCode::Pulse, raw) else {
            panic!("expected a pulse record");
        };
        assert_eq!(pulse.burnout_risk, BurnoutRisk::Medium);

        let raw = r#"{"rating": 2, "burnout_risk": "unclear"}"#;
        let Some(ExtractedRecord::Pulse(pulse)) = validate(AgentCode::Pulse, raw) else {
            panic!("expected a pulse record");
        };
        assert_eq!(pulse.burnout_risk, BurnoutRisk::Low);
    }

    #[test]
    fn test_customer_facing_flag_forms() {
        let raw = r#"{"role_summary": "Account manager", "customer_facing": "yes"}"#;
        let Some(ExtractedRecord::RoleMapper(role)) = validate(AgentCode::RoleMapper, raw) else {
            panic!("expected a role record");
        };
        assert!(role.customer_facing);
    }
}
