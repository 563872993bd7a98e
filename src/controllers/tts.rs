use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    domain::tts::{SpliceService, SpliceServiceApi},
    error::{AppError, AppResult},
};

/// Request for POST /split
///
/// The wire shape matches the backend's own convention:
/// `{ "data": [language, text] }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SpliceRequest {
    pub data: Vec<String>,
}

pub struct TtsController {
    splice_service: Arc<SpliceService>,
    output_path: PathBuf,
}

impl TtsController {
    pub fn new(splice_service: Arc<SpliceService>, output_path: PathBuf) -> Self {
        Self {
            splice_service,
            output_path,
        }
    }

    /// POST /split - Convert text to speech through the chunking pipeline
    pub async fn split(
        State(controller): State<Arc<TtsController>>,
        Json(request): Json<SpliceRequest>,
    ) -> AppResult<Json<String>> {
        let [language, text] = request.data.as_slice() else {
            return Err(AppError::BadRequest(
                "data must be [language, text]".to_string(),
            ));
        };

        if text.trim().is_empty() {
            return Err(AppError::BadRequest("Text cannot be empty".to_string()));
        }

        let output_path = controller
            .splice_service
            .synthesize(text, language)
            .await
            .map_err(AppError::from)?;

        Ok(Json(output_path.display().to_string()))
    }

    /// GET /output.wav - Serve the most recently assembled output file
    pub async fn get_output(
        State(controller): State<Arc<TtsController>>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let bytes = tokio::fs::read(&controller.output_path)
            .await
            .map_err(|_| AppError::NotFound("no output has been produced yet".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            "audio/wav".parse().expect("static header value"),
        );

        Ok((StatusCode::OK, headers, Body::from(bytes)))
    }
}
