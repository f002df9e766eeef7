//! Cloudflare API v4 response envelopes

use serde::Deserialize;

/// Common wrapper around every API v4 response
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    pub message: Option<String>,
    pub result_info: Option<ResultInfo>,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiMessage {
    pub code: Option<i64>,
    pub message: String,
}

/// Paging metadata of list responses; only the page count is trusted
#[derive(Debug, Deserialize)]
pub(crate) struct ResultInfo {
    #[serde(default)]
    pub total_pages: u32,
}

/// Result of a delete call
#[derive(Debug, Deserialize)]
pub(crate) struct DeletedRecord {
    pub id: String,
}

/// Failure envelope; every field optional so any JSON body parses
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ApiMessage>,
}

/// Best human-readable message in an error response body
///
/// Preference: top-level `message`, then the joined `errors[].message`, then
/// the raw body.
pub(crate) fn error_message(body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

    if let Some(message) = parsed.message.filter(|m| !m.is_empty()) {
        return message;
    }

    if let Some(joined) = join_messages(&parsed.errors) {
        return joined;
    }

    let raw = body.trim();
    if raw.is_empty() {
        "empty response body".to_string()
    } else {
        raw.to_string()
    }
}

pub(crate) fn join_messages(errors: &[ApiMessage]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    Some(
        errors
            .iter()
            .map(|e| match e.code {
                Some(code) => format!("{} (code {})", e.message, code),
                None => e.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; "),
    )
}
