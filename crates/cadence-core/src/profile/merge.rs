//! Profile merge rules.
//!
//! `merge` is a pure function: it takes the current profile and one record
//! and returns the next profile. Persistence and version checks belong to
//! the caller.

use super::gaps::compute_gaps;
use super::model::{
    CurrentFocus, MAX_PAIN_POINTS, MoraleSnapshot, MoraleTrend, PainPointEntry, PainTrend,
    Profile, RoleSection, WorkflowEntry,
};
use crate::extraction::{
    BurnoutRisk, ExtractedRecord, FocusRecord, PainPointRecord, PulseRecord, RoleRecord,
    WorkflowRecord,
};
use chrono::{DateTime, Utc};

/// Applies `record` to `profile`, then regenerates the gap list.
///
/// The stored `version` is left untouched; it only changes on save.
pub fn merge(profile: &Profile, record: &ExtractedRecord, now: DateTime<Utc>) -> Profile {
    let mut next = profile.clone();

    match record {
        ExtractedRecord::Pulse(pulse) => apply_pulse(&mut next, pulse, now),
        ExtractedRecord::RoleMapper(role) => apply_role(&mut next, role, now),
        ExtractedRecord::WorkflowMapper(workflow) => apply_workflow(&mut next, workflow, now),
        ExtractedRecord::PainScanner(pain) => apply_pain_point(&mut next, pain, now),
        ExtractedRecord::FocusTracker(focus) => apply_focus(&mut next, focus, now),
    }

    next.updated_at = Some(now);
    next.open_profile_gaps = compute_gaps(&next);
    next
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RatingBucket {
    Low,
    Middle,
    High,
}

fn bucket(rating: u8) -> RatingBucket {
    match rating {
        0..=2 => RatingBucket::Low,
        3 => RatingBucket::Middle,
        _ => RatingBucket::High,
    }
}

/// Morale label for a Pulse rating. High burnout overrides the rating.
pub fn morale_trend(rating: u8, burnout_risk: BurnoutRisk) -> MoraleTrend {
    if burnout_risk == BurnoutRisk::High {
        return MoraleTrend::AtRisk;
    }
    match bucket(rating) {
        RatingBucket::Low => MoraleTrend::Declining,
        RatingBucket::Middle => MoraleTrend::Stable,
        RatingBucket::High => MoraleTrend::Positive,
    }
}

/// Trend label for a pain point rating, on the same buckets as morale.
pub fn pain_trend(rating: u8) -> PainTrend {
    match bucket(rating) {
        RatingBucket::Low => PainTrend::Worsening,
        RatingBucket::Middle => PainTrend::Stable,
        RatingBucket::High => PainTrend::Improving,
    }
}

/// Case- and whitespace-insensitive key.
pub(crate) fn normalize_key(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn apply_pulse(profile: &mut Profile, pulse: &PulseRecord, now: DateTime<Utc>) {
    profile.morale = Some(MoraleSnapshot {
        rating: pulse.rating,
        burnout_risk: pulse.burnout_risk,
        trend: morale_trend(pulse.rating, pulse.burnout_risk),
        updated_at: now,
    });
}

fn apply_role(profile: &mut Profile, role: &RoleRecord, now: DateTime<Utc>) {
    profile.role = Some(RoleSection {
        role_summary: role.role_summary.clone(),
        primary_duties: role.primary_duties.clone(),
        customer_facing: role.customer_facing,
        updated_at: now,
    });
}

fn apply_workflow(profile: &mut Profile, workflow: &WorkflowRecord, now: DateTime<Utc>) {
    let entry = WorkflowEntry {
        name: workflow.workflow_name.clone(),
        steps: workflow.steps.clone(),
        tools: workflow.tools.clone(),
        frequency: workflow.frequency.clone(),
        updated_at: now,
    };

    let key = normalize_key(&workflow.workflow_name);
    match profile
        .main_workflows
        .iter_mut()
        .find(|existing| normalize_key(&existing.name) == key)
    {
        Some(existing) => *existing = entry,
        None => profile.main_workflows.push(entry),
    }

    for tool in &workflow.tools {
        let tool_key = normalize_key(tool);
        if tool_key.is_empty() {
            continue;
        }
        if !profile.tools.iter().any(|known| normalize_key(known) == tool_key) {
            profile.tools.push(tool.trim().to_string());
        }
    }
}

/// Upsert key for a pain point: the (workflow, tool) pair. When neither
/// reference is present the description stands in, so unrelated free-floating
/// pain points do not collapse into one entry.
fn pain_key(
    workflow: Option<&str>,
    tool: Option<&str>,
    description: &str,
) -> (Option<String>, Option<String>, Option<String>) {
    let workflow = workflow.map(normalize_key).filter(|k| !k.is_empty());
    let tool = tool.map(normalize_key).filter(|k| !k.is_empty());
    let description = (workflow.is_none() && tool.is_none()).then(|| normalize_key(description));
    (workflow, tool, description)
}

fn apply_pain_point(profile: &mut Profile, pain: &PainPointRecord, now: DateTime<Utc>) {
    let key = pain_key(
        pain.workflow_name.as_deref(),
        pain.tool_name.as_deref(),
        &pain.pain_description,
    );
    let entry = PainPointEntry {
        description: pain.pain_description.clone(),
        workflow_name: pain.workflow_name.clone(),
        tool_name: pain.tool_name.clone(),
        rating: pain.rating,
        trend: pain_trend(pain.rating),
        updated_at: now,
    };

    // A same-key update supersedes the old entry and becomes the newest.
    if let Some(position) = profile.pain_points.iter().position(|existing| {
        pain_key(
            existing.workflow_name.as_deref(),
            existing.tool_name.as_deref(),
            &existing.description,
        ) == key
    }) {
        profile.pain_points.remove(position);
        profile.pain_points.push(entry);
        return;
    }

    profile.pain_points.push(entry);
    if profile.pain_points.len() > MAX_PAIN_POINTS {
        let overflow = profile.pain_points.len() - MAX_PAIN_POINTS;
        profile.pain_points.drain(..overflow);
    }
}

fn apply_focus(profile: &mut Profile, focus: &FocusRecord, now: DateTime<Utc>) {
    profile.current_focus = Some(CurrentFocus {
        label: focus.current_focus_label.clone(),
        tags: focus.tags.clone(),
        summary: focus.summary.clone(),
        updated_at: now,
    });
}
