use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel the backend places in `raw` when upstream generation failed but the
/// endpoint still returned structured data echoing the inputs.
pub const API_ERROR_SENTINEL: &str = "API_ERROR";

/// Fallback banner text for a sentinel response that carries no error message.
pub const MENTION_ERROR_FALLBACK: &str = "API Error: Service temporarily unavailable";

/// Fixed banner text for failures below the HTTP/JSON layer.
pub const CONNECTIVITY_ERROR: &str =
    "Could not reach the backend service. Check the connection and try again.";

/// Combined validation notice; the form is validated as a whole, not per field.
pub const VALIDATION_NOTICE: &str = "Please enter both a prompt and a brand name.";

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub base_url: String,
    pub user_agent: String,
    pub export_csv: Option<std::path::PathBuf>,
    pub initial_brand: Option<String>,
}

/// Payload of `POST {base_url}/api/check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckRequest {
    pub prompt: String,
    pub brand: String,
}

/// Tolerant decode of the backend response body. Every field is optional on the
/// wire; absent fields default so that classification only looks at values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckResponse {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub mentioned: bool,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One completed submission, as appended to the session result log.
///
/// `prompt` and `brand` are the values echoed by the backend, not the local
/// draft, so the log reflects exactly what the server processed. `position` is
/// 1-based; zero or negative means "not found / not applicable" and is kept
/// verbatim. `error` is set iff the attempt classified as a mention error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub prompt: String,
    pub brand: String,
    pub mentioned: bool,
    pub position: i64,
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Classification of one resolved submission. Produced exactly once per call by
/// the client; every consumer matches on it rather than re-deriving.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The call itself failed (network, non-HTTP error, non-JSON body).
    /// No record is appended and the draft survives for a manual retry.
    TransportFailure { message: String },
    /// The body carried a non-empty `error` field. An error-only response is
    /// not a data point, so nothing is appended.
    BackendError { message: String },
    /// Upstream generation failed but the echoed prompt/brand/position are
    /// still meaningful; the record is appended with `error` set.
    MentionError { record: ResultRecord, message: String },
    Success { record: ResultRecord },
}

/// Pre-flight submit rejection; never reaches the network.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("{VALIDATION_NOTICE}")]
    EmptyFields,
    /// A submission is already in flight; the attempt is dropped, not queued.
    #[error("a submission is already in flight")]
    InFlight,
}

/// Commands emitted by the UI layer.
#[derive(Debug, Clone)]
pub enum UiCommand {
    Submit(CheckRequest),
    Quit,
}

/// Events emitted back to the UI layer.
#[derive(Debug, Clone)]
pub enum AppEvent {
    Resolved(Outcome),
}
