use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which input a profile datum came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Form,
    Resume,
    Combined,
}

impl DataSource {
    /// Tag for a datum the given origins contributed to; `None` when neither did.
    pub fn from_contributors(form: bool, resume: bool) -> Option<DataSource> {
        match (form, resume) {
            (true, true) => Some(DataSource::Combined),
            (true, false) => Some(DataSource::Form),
            (false, true) => Some(DataSource::Resume),
            (false, false) => None,
        }
    }
}

/// Whether a value counts as supplied.
pub trait Presence {
    fn is_present(&self) -> bool;
}

impl Presence for String {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Presence for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Presence for i64 {
    fn is_present(&self) -> bool {
        *self != 0
    }
}

/// A value tagged with the input that supplied it.
///
/// `source` is only set when the value is present, so a tag always names an origin
/// that actually contributed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sourced<T> {
    pub value: T,
    #[serde(default)]
    pub source: Option<DataSource>,
}

impl<T: Presence> Sourced<T> {
    pub fn supplied_by(value: T, source: DataSource) -> Self {
        let source = value.is_present().then_some(source);
        Self { value, source }
    }

    /// The form value when present, otherwise the resume value.
    pub fn form_or_resume(form: T, resume: T) -> Self {
        if form.is_present() {
            Self::supplied_by(form, DataSource::Form)
        } else {
            Self::supplied_by(resume, DataSource::Resume)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field groups
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Sourced<String>,
    pub phone: Sourced<String>,
    pub location: Sourced<String>,
    pub linkedin: Sourced<String>,
    pub github: Sourced<String>,
    pub portfolio: Sourced<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalInfo {
    pub current_role: Sourced<String>,
    pub current_company: Sourced<String>,
    pub experience_years: Sourced<i64>,
    pub industry: Sourced<String>,
    pub career_level: Sourced<String>,
    pub salary_expectation: Sourced<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillsProfile {
    pub technical_skills: Sourced<Vec<String>>,
    pub programming_languages: Sourced<Vec<String>>,
    pub frameworks: Sourced<Vec<String>>,
    pub soft_skills: Sourced<Vec<String>>,
    pub certifications: Sourced<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationProfile {
    pub highest_degree: Sourced<String>,
    pub field_of_study: Sourced<String>,
    pub institution: Sourced<String>,
    pub graduation_year: Sourced<String>,
    pub gpa: Sourced<String>,
    pub relevant_coursework: Sourced<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub achievements: Vec<String>,
    pub source: DataSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectExperience {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub url: String,
    pub source: DataSource,
}

/// Job search preferences; form-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPreferences {
    pub preferred_roles: Vec<String>,
    pub preferred_industries: Vec<String>,
    pub preferred_locations: Vec<String>,
    pub remote_preference: String,
    pub job_type_preference: Vec<String>,
    pub salary_range: String,
    pub availability: String,
}

/// Learning and development preferences; form-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningProfile {
    pub learning_goals: Vec<String>,
    pub preferred_learning_modes: Vec<String>,
    pub skill_gaps: Vec<String>,
    pub course_interests: Vec<String>,
    pub time_commitment: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Profile
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveTalentProfile {
    pub user_id: i64,
    pub full_name: String,
    pub username: String,
    pub bio: String,
    pub contact_info: ContactInfo,
    pub professional_info: ProfessionalInfo,
    pub skills_profile: SkillsProfile,
    pub education_profile: EducationProfile,
    pub work_experience: Vec<WorkExperience>,
    pub project_experience: Vec<ProjectExperience>,
    pub job_preferences: JobPreferences,
    pub learning_profile: LearningProfile,
    /// 0 to 100, two decimals.
    pub profile_completeness: f64,
    pub last_updated: DateTime<Utc>,
    pub resume_file_path: String,
    pub resume_confidence_score: f64,
    /// `"group.field"` to source, for every tagged field. Built by `source_map`.
    pub data_sources: BTreeMap<String, DataSource>,
    pub extraction_errors: Vec<String>,
}

impl ComprehensiveTalentProfile {
    /// Flattens the `Sourced` tags of every field group into one map.
    pub fn source_map(&self) -> BTreeMap<String, DataSource> {
        fn add<T>(map: &mut BTreeMap<String, DataSource>, key: &str, field: &Sourced<T>) {
            if let Some(source) = field.source {
                map.insert(key.to_string(), source);
            }
        }

        let mut map = BTreeMap::new();
        let c = &self.contact_info;
        add(&mut map, "contact_info.email", &c.email);
        add(&mut map, "contact_info.phone", &c.phone);
        add(&mut map, "contact_info.location", &c.location);
        add(&mut map, "contact_info.linkedin", &c.linkedin);
        add(&mut map, "contact_info.github", &c.github);
        add(&mut map, "contact_info.portfolio", &c.portfolio);

        let p = &self.professional_info;
        add(&mut map, "professional_info.current_role", &p.current_role);
        add(&mut map, "professional_info.current_company", &p.current_company);
        add(&mut map, "professional_info.experience_years", &p.experience_years);
        add(&mut map, "professional_info.industry", &p.industry);
        add(&mut map, "professional_info.career_level", &p.career_level);
        add(&mut map, "professional_info.salary_expectation", &p.salary_expectation);

        let s = &self.skills_profile;
        add(&mut map, "skills_profile.technical_skills", &s.technical_skills);
        add(&mut map, "skills_profile.programming_languages", &s.programming_languages);
        add(&mut map, "skills_profile.frameworks", &s.frameworks);
        add(&mut map, "skills_profile.soft_skills", &s.soft_skills);
        add(&mut map, "skills_profile.certifications", &s.certifications);

        let e = &self.education_profile;
        add(&mut map, "education_profile.highest_degree", &e.highest_degree);
        add(&mut map, "education_profile.field_of_study", &e.field_of_study);
        add(&mut map, "education_profile.institution", &e.institution);
        add(&mut map, "education_profile.graduation_year", &e.graduation_year);
        add(&mut map, "education_profile.gpa", &e.gpa);
        add(&mut map, "education_profile.relevant_coursework", &e.relevant_coursework);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supplied_by_only_tags_present_values() {
        let tagged = Sourced::supplied_by("x".to_string(), DataSource::Resume);
        assert_eq!(tagged.source, Some(DataSource::Resume));
        let empty = Sourced::supplied_by(String::new(), DataSource::Resume);
        assert_eq!(empty.source, None);
        let zero = Sourced::supplied_by(0i64, DataSource::Form);
        assert_eq!(zero.source, None);
    }

    #[test]
    fn test_form_or_resume() {
        let form = Sourced::form_or_resume("a@x.com".to_string(), "b@y.com".to_string());
        assert_eq!(form.value, "a@x.com");
        assert_eq!(form.source, Some(DataSource::Form));

        let resume = Sourced::form_or_resume(String::new(), "b@y.com".to_string());
        assert_eq!(resume.value, "b@y.com");
        assert_eq!(resume.source, Some(DataSource::Resume));

        let neither: Sourced<String> = Sourced::form_or_resume(String::new(), String::new());
        assert_eq!(neither.source, None);
    }

    #[test]
    fn test_data_source_serializes_lowercase() {
        let json = serde_json::to_value(DataSource::Combined).unwrap();
        assert_eq!(json, "combined");
        assert_eq!(
            DataSource::from_contributors(true, false),
            Some(DataSource::Form)
        );
        assert_eq!(DataSource::from_contributors(false, false), None);
    }
}
