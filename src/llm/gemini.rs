// ABOUTME: Google Gemini generateContent client producing structured meal analyses
// ABOUTME: Sends the description and optional inline JPEG, asks for JSON, and validates the reply
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Gemini meal analyzer
//!
//! Set `GEMINI_API_KEY` to enable the remote path. The model is asked for a
//! JSON document shaped like [`MealAnalysis`]; a missing `meal_id` is filled
//! with a UUID and the score is clamped into the 1-10 scale.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use fha_core::constants::analysis::{DEFAULT_GEMINI_MODEL, MEAL_SCORE_BOUNDS};
use fha_core::errors::RemoteAnalysisError;
use fha_core::models::{HealthAspect, MealAnalysis, MealAnalysisRequest, NutrientInfo};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// Base URL for the Gemini API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// MIME type attached to inline images
const IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Longest error body kept in an error message
const MAX_ERROR_BODY_CHARS: usize = 300;

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

/// Analysis as the model writes it, before defaults and clamping
#[derive(Debug, Deserialize)]
struct RawMealAnalysis {
    #[serde(default)]
    meal_id: Option<String>,
    overall_score: f64,
    overall_assessment: String,
    #[serde(default)]
    key_nutrients: Vec<NutrientInfo>,
    #[serde(default)]
    positive_aspects: Vec<HealthAspect>,
    #[serde(default)]
    areas_for_improvement: Vec<HealthAspect>,
    #[serde(default)]
    nutritional_highlights: String,
    #[serde(default)]
    encouragement: String,
    #[serde(default = "default_processing_level")]
    processing_level: String,
    #[serde(default)]
    estimated_calories: Option<f64>,
}

fn default_processing_level() -> String {
    "moderate".to_owned()
}

impl RawMealAnalysis {
    fn into_analysis(self) -> MealAnalysis {
        let (min_score, max_score) = MEAL_SCORE_BOUNDS;
        let score = if self.overall_score.is_finite() {
            self.overall_score
                .round()
                .clamp(f64::from(min_score), f64::from(max_score)) as u8
        } else {
            min_score
        };
        MealAnalysis {
            meal_id: self
                .meal_id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            overall_score: score,
            overall_assessment: self.overall_assessment,
            key_nutrients: self.key_nutrients,
            positive_aspects: self.positive_aspects,
            areas_for_improvement: self.areas_for_improvement,
            nutritional_highlights: self.nutritional_highlights,
            encouragement: self.encouragement,
            processing_level: self.processing_level,
            estimated_calories: self
                .estimated_calories
                .filter(|kcal| kcal.is_finite() && *kcal >= 0.0)
                .map(|kcal| kcal.round() as u32),
        }
    }
}

// ============================================================================
// Analyzer Implementation
// ============================================================================

/// Meal analyzer backed by the Gemini `generateContent` endpoint
#[derive(Clone)]
pub struct GeminiMealAnalyzer {
    api_key: String,
    client: Client,
    model: String,
    base_url: String,
}

impl GeminiMealAnalyzer {
    /// Analyzer using the default model
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            model: DEFAULT_GEMINI_MODEL.to_owned(),
            base_url: API_BASE_URL.to_owned(),
        }
    }

    /// Use another model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point at another endpoint, e.g. a local mock server
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Model in use
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    fn build_request(request: &MealAnalysisRequest) -> GeminiRequest {
        let mut parts = vec![ContentPart::Text {
            text: analysis_instructions(request),
        }];
        if let Some(data) = request
            .image_base64
            .as_deref()
            .and_then(strip_data_url_prefix)
        {
            parts.push(ContentPart::InlineData {
                inline_data: InlineData {
                    mime_type: IMAGE_MIME_TYPE.to_owned(),
                    data: data.to_owned(),
                },
            });
        }
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_owned()),
                parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.4,
            },
        }
    }

    fn map_api_error(status: u16, response_text: &str) -> RemoteAnalysisError {
        let message = serde_json::from_str::<GeminiResponse>(response_text)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(
                || response_text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
                |e| e.message,
            );
        RemoteAnalysisError::Api { status, message }
    }
}

/// Text part sent with every request
fn analysis_instructions(request: &MealAnalysisRequest) -> String {
    format!(
        "Analyze this {meal_type}: \"{description}\". \
         Reply with one JSON object with the fields meal_id, overall_score (1-10), \
         overall_assessment, key_nutrients [{{name, amount, daily_value_percentage, health_impact}}], \
         positive_aspects and areas_for_improvement [{{aspect, impact, explanation, severity}}], \
         nutritional_highlights, encouragement, processing_level \
         (minimal | moderate | highly_processed | whole_foods) and estimated_calories. \
         Keep the tone supportive and never moralize about food.",
        meal_type = request.meal_type,
        description = request.description.trim(),
    )
}

/// Payload of a base64 image, without any `data:...;base64,` prefix; `None` when empty
fn strip_data_url_prefix(image: &str) -> Option<&str> {
    let image = image.trim();
    let payload = if image.starts_with("data:") {
        image.split_once(',').map_or("", |(_, data)| data)
    } else {
        image
    };
    (!payload.is_empty() && payload != "null").then_some(payload)
}

/// Drop a surrounding markdown code fence, with or without a language tag
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.split_once('\n').map_or(body, |(tag, rest)| {
        if tag.trim().chars().all(char::is_alphanumeric) {
            rest
        } else {
            body
        }
    });
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Turn a raw `generateContent` body into a validated analysis
fn parse_analysis(response_text: &str) -> Result<MealAnalysis, RemoteAnalysisError> {
    let response: GeminiResponse = serde_json::from_str(response_text)
        .map_err(|e| RemoteAnalysisError::MalformedResponse(format!("envelope: {e}")))?;
    if let Some(error) = response.error {
        return Err(RemoteAnalysisError::MalformedResponse(error.message));
    }

    let text = response
        .candidates
        .as_ref()
        .and_then(|c| c.first())
        .and_then(|c| c.content.as_ref())
        .and_then(|c| {
            c.parts.iter().find_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::InlineData { .. } => None,
            })
        })
        .ok_or_else(|| RemoteAnalysisError::MalformedResponse("no text candidate".to_owned()))?;

    serde_json::from_str::<RawMealAnalysis>(strip_code_fence(text))
        .map(RawMealAnalysis::into_analysis)
        .map_err(|e| RemoteAnalysisError::MalformedResponse(format!("analysis: {e}")))
}

#[async_trait]
impl super::MealAnalyzer for GeminiMealAnalyzer {
    fn name(&self) -> &'static str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(model = %self.model, meal_type = %request.meal_type))]
    async fn analyze(
        &self,
        request: &MealAnalysisRequest,
    ) -> Result<MealAnalysis, RemoteAnalysisError> {
        let body = Self::build_request(request);
        debug!("Sending meal analysis request to Gemini");

        let response = self
            .client
            .post(self.build_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| RemoteAnalysisError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| RemoteAnalysisError::Transport(e.without_url().to_string()))?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(Self::map_api_error(status.as_u16(), &response_text));
        }

        let analysis = parse_analysis(&response_text)?;
        debug!(score = analysis.overall_score, "Received Gemini meal analysis");
        Ok(analysis)
    }
}

impl Debug for GeminiMealAnalyzer {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiMealAnalyzer")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fha_core::models::MealType;
    use serde_json::json;

    fn envelope(text: &str) -> String {
        json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]})
            .to_string()
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_strip_data_url_prefix() {
        assert_eq!(strip_data_url_prefix("data:image/jpeg;base64,QUJD"), Some("QUJD"));
        assert_eq!(strip_data_url_prefix("QUJD"), Some("QUJD"));
        assert_eq!(strip_data_url_prefix("null"), None);
        assert_eq!(strip_data_url_prefix("  "), None);
    }

    #[test]
    fn test_parse_fills_id_and_clamps_score() {
        let inner = r#"```json
{"overall_score": 14.2, "overall_assessment": "Balanced plate",
 "nutritional_highlights": "Protein and fiber", "encouragement": "Lovely choice",
 "processing_level": "whole_foods", "estimated_calories": 512.4}
```"#;
        let analysis = parse_analysis(&envelope(inner)).unwrap();
        assert_eq!(analysis.overall_score, 10);
        assert!(Uuid::parse_str(&analysis.meal_id).is_ok());
        assert_eq!(analysis.estimated_calories, Some(512));
        assert_eq!(analysis.processing_level, "whole_foods");
    }

    #[test]
    fn test_parse_rejects_non_json_text() {
        let err = parse_analysis(&envelope("What a wonderful breakfast!")).unwrap_err();
        assert!(matches!(err, RemoteAnalysisError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_rejects_empty_candidates() {
        let err = parse_analysis(r#"{"candidates": []}"#).unwrap_err();
        assert!(matches!(err, RemoteAnalysisError::MalformedResponse(_)));
    }

    #[test]
    fn test_map_api_error_prefers_structured_message() {
        let err = GeminiMealAnalyzer::map_api_error(
            429,
            r#"{"error": {"message": "Resource exhausted"}}"#,
        );
        assert_eq!(
            err,
            RemoteAnalysisError::Api {
                status: 429,
                message: "Resource exhausted".to_owned()
            }
        );
        assert!(err.indicates_outage());
    }

    #[test]
    fn test_request_carries_inline_image() {
        let request = MealAnalysisRequest::new(MealType::Dinner, "salmon and rice")
            .with_image("data:image/jpeg;base64,QUJD");
        let body = serde_json::to_value(GeminiMealAnalyzer::build_request(&request)).unwrap();
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["data"], "QUJD");
        assert_eq!(
            body["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            IMAGE_MIME_TYPE
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let analyzer = GeminiMealAnalyzer::new("secret-key").with_base_url("http://localhost:9/");
        let rendered = format!("{analyzer:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(analyzer.build_url().starts_with("http://localhost:9/models/"));
    }
}
