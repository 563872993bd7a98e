use super::tts_repository::{TtsBackendError, TtsRepository};
use crate::domain::tts::{BackendResponse, RemoteAudioRef};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Gradio-style TTS backend implementation of the TTS repository.
///
/// The backend exposes a predict endpoint taking `{"data": [language, text]}`
/// and a file endpoint serving rendered audio by name. Rejections (typically
/// "input too large") are reported in-band through an `error` key, so the
/// response body is classified regardless of HTTP status.
pub struct GradioTtsRepository {
    client: reqwest::Client,
    predict_url: String,
    file_url_prefix: String,
}

impl GradioTtsRepository {
    pub fn new(client: reqwest::Client, predict_url: String, file_url_prefix: String) -> Self {
        Self {
            client,
            predict_url,
            file_url_prefix,
        }
    }

    /// Classify a backend payload strictly: `data` means accepted, `error`
    /// means rejected, anything else is a protocol violation. An absent key
    /// is never implicit success.
    fn classify(payload: Value) -> Result<BackendResponse, TtsBackendError> {
        if let Some(data) = payload.get("data") {
            let name = data
                .get(0)
                .and_then(|entry| entry.get("name"))
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    TtsBackendError::Protocol(format!(
                        "success payload without data[0].name: {data}"
                    ))
                })?;
            return Ok(BackendResponse::Accepted {
                remote_ref: RemoteAudioRef(name.to_string()),
            });
        }

        if let Some(error) = payload.get("error") {
            return Ok(BackendResponse::Rejected {
                reason: error.to_string(),
            });
        }

        Err(TtsBackendError::Protocol(format!(
            "payload has neither 'data' nor 'error' key: {payload}"
        )))
    }
}

#[async_trait]
impl TtsRepository for GradioTtsRepository {
    async fn submit_chunk(
        &self,
        text: &str,
        language: &str,
    ) -> Result<BackendResponse, TtsBackendError> {
        tracing::debug!(
            language = language,
            text_length = text.len(),
            "Submitting chunk to TTS backend"
        );

        let payload: Value = self
            .client
            .post(&self.predict_url)
            .json(&json!({ "data": [language, text] }))
            .send()
            .await?
            .json()
            .await?;

        let response = Self::classify(payload)?;

        match &response {
            BackendResponse::Accepted { remote_ref } => {
                tracing::debug!(remote_ref = %remote_ref, "Chunk accepted by backend");
            }
            BackendResponse::Rejected { reason } => {
                tracing::debug!(
                    reason = %reason,
                    text_length = text.len(),
                    "Chunk rejected by backend"
                );
            }
        }

        Ok(response)
    }

    async fn fetch_audio(&self, remote_ref: &str) -> Result<Vec<u8>, TtsBackendError> {
        let url = format!("{}{}", self.file_url_prefix, remote_ref);

        let bytes = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        tracing::debug!(
            remote_ref = remote_ref,
            audio_size = bytes.len(),
            "Segment downloaded"
        );

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_success_payload_extracts_remote_ref() {
        let payload = json!({ "data": [{ "name": "abc123.wav" }] });
        let response = GradioTtsRepository::classify(payload).unwrap();
        assert_eq!(
            response,
            BackendResponse::Accepted {
                remote_ref: RemoteAudioRef("abc123.wav".to_string())
            }
        );
    }

    #[test]
    fn classify_error_payload_is_rejection() {
        let payload = json!({ "error": "input too long" });
        let response = GradioTtsRepository::classify(payload).unwrap();
        assert!(matches!(response, BackendResponse::Rejected { .. }));
    }

    #[test]
    fn classify_unknown_shape_is_protocol_violation() {
        let payload = json!({ "status": "ok" });
        let err = GradioTtsRepository::classify(payload).unwrap_err();
        assert!(matches!(err, TtsBackendError::Protocol(_)));
    }

    #[test]
    fn classify_success_without_name_is_protocol_violation() {
        let payload = json!({ "data": [] });
        let err = GradioTtsRepository::classify(payload).unwrap_err();
        assert!(matches!(err, TtsBackendError::Protocol(_)));
    }

    #[test]
    fn classify_never_treats_both_keys_as_error() {
        // 'data' wins when both are present, matching the original contract
        let payload = json!({ "data": [{ "name": "x.wav" }], "error": "ignored" });
        let response = GradioTtsRepository::classify(payload).unwrap();
        assert!(matches!(response, BackendResponse::Accepted { .. }));
    }
}
