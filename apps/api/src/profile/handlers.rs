use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::profile::completeness::{compute_completeness_report, CompletenessReport};
use crate::profile::merge::merge_profiles;
use crate::profile::models::ComprehensiveTalentProfile;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    #[serde(default)]
    pub form_data: Value,
    #[serde(default)]
    pub resume_data: Value,
    #[serde(default)]
    pub resume_file_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MergeResponse {
    pub profile: ComprehensiveTalentProfile,
    pub completeness: CompletenessReport,
}

/// POST /api/v1/profiles/merge
pub async fn handle_merge(
    State(_state): State<AppState>,
    Json(req): Json<MergeRequest>,
) -> Result<Json<MergeResponse>, AppError> {
    Ok(Json(merge_request(req)?))
}

fn merge_request(req: MergeRequest) -> Result<MergeResponse, AppError> {
    ensure_object("form_data", &req.form_data)?;
    ensure_object("resume_data", &req.resume_data)?;

    let mut profile = merge_profiles(&req.form_data, &req.resume_data);
    if let Some(path) = req.resume_file_path {
        profile.resume_file_path = path;
    }
    let completeness = compute_completeness_report(&profile);
    Ok(MergeResponse {
        profile,
        completeness,
    })
}

/// Absent (`null`) payloads merge as empty; anything else must be an object.
fn ensure_object(name: &str, value: &Value) -> Result<(), AppError> {
    match value {
        Value::Object(_) | Value::Null => Ok(()),
        _ => Err(AppError::Validation(format!("'{name}' must be a JSON object"))),
    }
}
