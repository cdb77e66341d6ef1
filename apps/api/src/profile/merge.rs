//! Profile fusion: one form submission plus one parsed resume in, one profile out.
//!
//! Form data wins on direct conflict, resume data fills the gaps, and skills are the
//! union of both. Every lookup defaults, so merging never fails.

use std::collections::BTreeSet;

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::profile::completeness::compute_completeness_report;
use crate::profile::fields::{entries, integer, messages, number, object, string_list, text};
use crate::profile::models::{
    ComprehensiveTalentProfile, ContactInfo, DataSource, EducationProfile, JobPreferences,
    LearningProfile, ProfessionalInfo, ProjectExperience, SkillsProfile, Sourced, WorkExperience,
};

const LANGUAGE_KEYWORDS: &[&str] = &["python", "java", "javascript", "c++", "c#", "go", "rust"];
const FRAMEWORK_KEYWORDS: &[&str] = &[
    "react", "angular", "vue", "django", "flask", "fastapi", "spring",
];

pub fn merge_profiles(form: &Value, resume: &Value) -> ComprehensiveTalentProfile {
    let (job_preferences, learning_profile) = merge_preferences(form);

    let mut profile = ComprehensiveTalentProfile {
        user_id: integer(form, "user_id"),
        full_name: text(form, "full_name"),
        username: text(form, "username"),
        bio: text(form, "bio"),
        contact_info: merge_contact_info(form, resume),
        professional_info: merge_professional_info(form, resume),
        skills_profile: merge_skills(form, resume),
        education_profile: merge_education(form, resume),
        work_experience: extract_work_experience(resume),
        project_experience: extract_project_experience(resume),
        job_preferences,
        learning_profile,
        profile_completeness: 0.0,
        last_updated: Utc::now(),
        resume_file_path: String::new(),
        resume_confidence_score: number(resume, "confidence_score"),
        data_sources: Default::default(),
        extraction_errors: messages(resume, "errors"),
    };

    let report = compute_completeness_report(&profile);
    profile.profile_completeness = report.score;
    profile.data_sources = profile.source_map();
    debug!(
        user_id = profile.user_id,
        completeness = report.score,
        missing = ?report.missing,
        "Merged talent profile"
    );
    profile
}

// ────────────────────────────────────────────────────────────────────────────
// Merge sub-routines
// ────────────────────────────────────────────────────────────────────────────

fn merge_contact_info(form: &Value, resume: &Value) -> ContactInfo {
    let personal = object(resume, "personal_info");
    let resume_only = |key: &str| Sourced::supplied_by(text(personal, key), DataSource::Resume);

    ContactInfo {
        email: Sourced::form_or_resume(text(form, "email"), text(personal, "email")),
        phone: Sourced::form_or_resume(text(form, "phone"), text(personal, "phone")),
        location: Sourced::form_or_resume(text(form, "location"), text(personal, "location")),
        linkedin: resume_only("linkedin"),
        github: resume_only("github"),
        portfolio: resume_only("portfolio"),
    }
}

fn merge_professional_info(form: &Value, resume: &Value) -> ProfessionalInfo {
    // The first experience entry is taken to be the most recent.
    let latest = entries(resume, "experience").first().copied();
    let from_latest = |key: &str| latest.map(|e| text(e, key)).unwrap_or_default();
    let form_only = |key: &str| Sourced::supplied_by(text(form, key), DataSource::Form);

    ProfessionalInfo {
        current_role: Sourced::form_or_resume(text(form, "current_role"), from_latest("title")),
        current_company: Sourced::supplied_by(from_latest("company"), DataSource::Resume),
        experience_years: Sourced::supplied_by(
            integer(form, "experience_years"),
            DataSource::Form,
        ),
        industry: form_only("industry"),
        career_level: form_only("career_level"),
        salary_expectation: form_only("salary_expectation"),
    }
}

/// Skills are deduplicated case-sensitively, so "Python" and "python" both survive.
fn merge_skills(form: &Value, resume: &Value) -> SkillsProfile {
    let form_skills: BTreeSet<String> = string_list(form, "skills").into_iter().collect();
    let resume_skills: BTreeSet<String> = string_list(resume, "skills").into_iter().collect();
    let all: Vec<String> = form_skills.union(&resume_skills).cloned().collect();

    let tagged = |items: Vec<String>| {
        let source = DataSource::from_contributors(
            items.iter().any(|s| form_skills.contains(s)),
            items.iter().any(|s| resume_skills.contains(s)),
        );
        Sourced {
            value: items,
            source,
        }
    };
    let matching = |keywords: &[&str]| -> Vec<String> {
        all.iter()
            .filter(|skill| {
                let lower = skill.to_lowercase();
                keywords.iter().any(|k| lower.contains(k))
            })
            .cloned()
            .collect()
    };

    SkillsProfile {
        programming_languages: tagged(matching(LANGUAGE_KEYWORDS)),
        frameworks: tagged(matching(FRAMEWORK_KEYWORDS)),
        technical_skills: tagged(all.clone()),
        soft_skills: Sourced::supplied_by(string_list(resume, "soft_skills"), DataSource::Resume),
        certifications: Sourced::supplied_by(
            string_list(resume, "certifications"),
            DataSource::Resume,
        ),
    }
}

fn merge_education(form: &Value, resume: &Value) -> EducationProfile {
    let first = entries(resume, "education").first().copied();
    let from_first = |key: &str| first.map(|e| text(e, key)).unwrap_or_default();
    let resume_only = |key: &str| Sourced::supplied_by(from_first(key), DataSource::Resume);

    EducationProfile {
        highest_degree: Sourced::form_or_resume(
            text(form, "education_level"),
            from_first("degree"),
        ),
        field_of_study: resume_only("field"),
        institution: resume_only("institution"),
        graduation_year: resume_only("year"),
        gpa: resume_only("gpa"),
        relevant_coursework: Sourced::supplied_by(
            first
                .map(|e| string_list(e, "coursework"))
                .unwrap_or_default(),
            DataSource::Resume,
        ),
    }
}

fn extract_work_experience(resume: &Value) -> Vec<WorkExperience> {
    entries(resume, "experience")
        .into_iter()
        .map(|exp| WorkExperience {
            title: text(exp, "title"),
            company: text(exp, "company"),
            location: text(exp, "location"),
            start_date: text(exp, "start_date"),
            end_date: text(exp, "end_date"),
            description: text(exp, "description"),
            technologies: string_list(exp, "technologies"),
            achievements: messages(exp, "achievements"),
            source: DataSource::Resume,
        })
        .collect()
}

fn extract_project_experience(resume: &Value) -> Vec<ProjectExperience> {
    entries(resume, "projects")
        .into_iter()
        .map(|proj| ProjectExperience {
            name: text(proj, "name"),
            description: text(proj, "description"),
            technologies: string_list(proj, "technologies"),
            url: text(proj, "url"),
            source: DataSource::Resume,
        })
        .collect()
}

fn merge_preferences(form: &Value) -> (JobPreferences, LearningProfile) {
    let job = JobPreferences {
        preferred_roles: string_list(form, "preferred_roles"),
        preferred_industries: string_list(form, "preferred_industries"),
        preferred_locations: string_list(form, "preferred_locations"),
        remote_preference: text(form, "remote_preference"),
        job_type_preference: string_list(form, "job_type_preference"),
        salary_range: text(form, "salary_range"),
        availability: text(form, "availability"),
    };
    let learning = LearningProfile {
        learning_goals: string_list(form, "learning_goals"),
        preferred_learning_modes: string_list(form, "preferred_learning_modes"),
        skill_gaps: string_list(form, "skill_gaps"),
        course_interests: string_list(form, "course_interests"),
        time_commitment: text(form, "time_commitment"),
    };
    (job, learning)
}
