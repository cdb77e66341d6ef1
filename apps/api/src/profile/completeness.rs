use serde::{Deserialize, Serialize};

use crate::profile::models::ComprehensiveTalentProfile;

/// Coverage of the profile checklist. A coarse presence metric, not a quality score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletenessReport {
    /// Percentage of signals present, rounded to two decimals.
    pub score: f64,
    pub filled: usize,
    pub total: usize,
    /// Signals that are absent, in checklist order.
    pub missing: Vec<String>,
}

pub fn compute_completeness_report(profile: &ComprehensiveTalentProfile) -> CompletenessReport {
    let signals: [(&str, bool); 8] = [
        ("full_name", !profile.full_name.is_empty()),
        ("email", !profile.contact_info.email.value.is_empty()),
        ("bio", !profile.bio.is_empty()),
        (
            "current_role",
            !profile.professional_info.current_role.value.is_empty(),
        ),
        (
            "experience_years",
            profile.professional_info.experience_years.value != 0,
        ),
        (
            "technical_skills",
            !profile.skills_profile.technical_skills.value.is_empty(),
        ),
        (
            "highest_degree",
            !profile.education_profile.highest_degree.value.is_empty(),
        ),
        ("work_experience", !profile.work_experience.is_empty()),
    ];

    let total = signals.len();
    let filled = signals.iter().filter(|(_, present)| *present).count();
    let missing = signals
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| name.to_string())
        .collect();
    let score = (filled as f64 / total as f64 * 100.0 * 100.0).round() / 100.0;

    CompletenessReport {
        score,
        filled,
        total,
        missing,
    }
}
