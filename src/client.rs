use crate::model::{
    CheckRequest, CheckResponse, Outcome, ResultRecord, RunConfig, API_ERROR_SENTINEL,
    CONNECTIVITY_ERROR, MENTION_ERROR_FALLBACK,
};
use anyhow::{Context, Result};

/// Thin wrapper around a shared reqwest client, pointed at one backend.
#[derive(Clone)]
pub struct MentionClient {
    http: reqwest::Client,
    check_url: String,
}

impl MentionClient {
    pub fn new(cfg: &RunConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            http,
            check_url: format!("{}/api/check", cfg.base_url.trim_end_matches('/')),
        })
    }

    /// Issue one check and classify the result. Infallible by design: every
    /// failure mode folds into an `Outcome` variant so the caller has a single
    /// resolution point. No timeout is applied; an unresolved call blocks the
    /// in-flight state until the transport gives up on its own.
    pub async fn check(&self, req: &CheckRequest) -> Outcome {
        let resp = match self.http.post(&self.check_url).json(req).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(error = %e, "check request failed to send");
                return Outcome::TransportFailure {
                    message: CONNECTIVITY_ERROR.to_string(),
                };
            }
        };

        // Status codes are not inspected: the backend surfaces failures through
        // body fields, and a non-JSON body (proxy page, truncation) is treated
        // the same as an unreachable server.
        match resp.json::<CheckResponse>().await {
            Ok(body) => classify(body),
            Err(e) => {
                tracing::debug!(error = %e, "check response was not valid JSON");
                Outcome::TransportFailure {
                    message: CONNECTIVITY_ERROR.to_string(),
                }
            }
        }
    }
}

/// Fold a parsed response into the one classification consumers match on.
///
/// A non-empty `error` field is authoritative and wins over the `raw` sentinel;
/// the sentinel path only applies when `error` is absent or empty.
pub fn classify(body: CheckResponse) -> Outcome {
    if let Some(msg) = body.error.as_deref().filter(|m| !m.is_empty()) {
        return Outcome::BackendError {
            message: msg.to_string(),
        };
    }

    let is_mention_error = body.raw.as_deref() == Some(API_ERROR_SENTINEL);
    let message = if is_mention_error {
        Some(
            body.error
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or(MENTION_ERROR_FALLBACK)
                .to_string(),
        )
    } else {
        None
    };

    let record = ResultRecord {
        prompt: body.prompt,
        brand: body.brand,
        mentioned: body.mentioned,
        position: body.position,
        raw: body.raw,
        error: message.clone(),
    };

    match message {
        Some(message) => Outcome::MentionError { record, message },
        None => Outcome::Success { record },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(v: serde_json::Value) -> CheckResponse {
        serde_json::from_value(v).expect("test body should deserialize")
    }

    #[test]
    fn test_success_echoes_body_fields() {
        let out = classify(body(serde_json::json!({
            "prompt": "Best CRM?",
            "brand": "Acme",
            "mentioned": true,
            "position": 3
        })));
        match out {
            Outcome::Success { record } => {
                assert_eq!(record.prompt, "Best CRM?");
                assert_eq!(record.brand, "Acme");
                assert!(record.mentioned);
                assert_eq!(record.position, 3);
                assert!(record.error.is_none());
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn test_backend_error_is_not_a_data_point() {
        let out = classify(body(serde_json::json!({ "error": "rate limited" })));
        match out {
            Outcome::BackendError { message } => assert_eq!(message, "rate limited"),
            other => panic!("expected backend error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_field_wins_over_sentinel() {
        let out = classify(body(serde_json::json!({
            "prompt": "p",
            "brand": "b",
            "raw": "API_ERROR",
            "error": "quota exceeded"
        })));
        assert!(matches!(out, Outcome::BackendError { ref message } if message == "quota exceeded"));
    }

    #[test]
    fn test_sentinel_without_error_uses_fallback_and_keeps_record() {
        let out = classify(body(serde_json::json!({
            "prompt": "p",
            "brand": "b",
            "mentioned": false,
            "position": 0,
            "raw": "API_ERROR"
        })));
        match out {
            Outcome::MentionError { record, message } => {
                assert_eq!(message, MENTION_ERROR_FALLBACK);
                assert_eq!(record.error.as_deref(), Some(MENTION_ERROR_FALLBACK));
                assert_eq!(record.position, 0);
                assert!(!record.mentioned);
            }
            other => panic!("expected mention error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_error_string_is_treated_as_absent() {
        let out = classify(body(serde_json::json!({
            "prompt": "p",
            "brand": "b",
            "raw": "API_ERROR",
            "error": ""
        })));
        assert!(matches!(out, Outcome::MentionError { ref message, .. }
            if message == MENTION_ERROR_FALLBACK));
    }

    #[test]
    fn test_missing_fields_decode_to_defaults() {
        let out = classify(body(serde_json::json!({})));
        match out {
            Outcome::Success { record } => {
                assert_eq!(record.prompt, "");
                assert_eq!(record.brand, "");
                assert!(!record.mentioned);
                assert_eq!(record.position, 0);
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn test_non_sentinel_raw_is_success() {
        let out = classify(body(serde_json::json!({
            "prompt": "p",
            "brand": "b",
            "mentioned": true,
            "position": 1,
            "raw": "full model output"
        })));
        assert!(matches!(out, Outcome::Success { .. }));
    }
}
