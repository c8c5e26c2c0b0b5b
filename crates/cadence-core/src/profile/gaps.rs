//! Gap derivation.
//!
//! Gaps are always regenerated from the profile content, never patched.

use super::model::{GapField, GapPriority, Profile, ProfileGap};

/// Evaluates the missing facts in fixed priority order.
pub fn compute_gaps(profile: &Profile) -> Vec<ProfileGap> {
    let has_role = profile
        .role
        .as_ref()
        .is_some_and(|role| !role.role_summary.trim().is_empty());

    let checks = [
        (!has_role, GapField::RoleSummary, GapPriority::High),
        (profile.main_workflows.is_empty(), GapField::MainWorkflows, GapPriority::High),
        (profile.current_focus.is_none(), GapField::CurrentFocus, GapPriority::Medium),
        (profile.pain_points.is_empty(), GapField::PainPoints, GapPriority::Low),
    ];

    checks
        .into_iter()
        .filter(|(missing, _, _)| *missing)
        .map(|(_, field, priority)| ProfileGap { field, priority })
        .collect()
}
