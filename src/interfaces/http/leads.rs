use super::AppState;
use super::error::ApiError;
use super::extract::{AppJson, check};
use crate::application::leads::SubscribeLead;
use crate::error::LaunchpadError;
use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SubscribeBody {
    #[serde(default)]
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub utms: Option<String>,
    #[serde(default, alias = "firstName")]
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    /// Honeypot.
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub template: bool,
}

/// Returns the honeypot value when it is a non-blank string.
fn trap_value(body: &Value) -> Option<&str> {
    body.get("website")
        .and_then(Value::as_str)
        .filter(|v| !v.trim().is_empty())
}

/// Always answers `{ "success": true }` once the body is acceptable, whether
/// the lead was new, already known, or caught by the honeypot.
pub async fn subscribe(
    State(state): State<AppState>,
    AppJson(raw): AppJson<Value>,
) -> Result<Json<Value>, ApiError> {
    // A filled honeypot wins over every other field, typed or not.
    if let Some(trap) = trap_value(&raw) {
        state
            .leads
            .subscribe(SubscribeLead {
                honeypot: Some(trap.to_string()),
                ..Default::default()
            })
            .await?;
        return Ok(Json(json!({ "success": true })));
    }

    let body: SubscribeBody = serde_json::from_value(raw)
        .map_err(|e| LaunchpadError::ValidationError(e.to_string()))?;
    check(&body)?;

    state
        .leads
        .subscribe(SubscribeLead {
            email: body.email,
            utms: body.utms,
            first_name: body.first_name,
            honeypot: body.website,
            wants_template: body.template,
        })
        .await?;

    Ok(Json(json!({ "success": true })))
}
