//! Generative rewrite boundary: the outline schema a language model must
//! return, strict validation of what actually comes back, and (behind the
//! `rewrite` feature) the client that makes the single blocking request.
//!
//! The wire schema is fixed:
//!
//! ```json
//! {
//!   "slides": [ {"title": "…", "content": ["…", "…"]} ],
//!   "theme_rgb": [0, 51, 102]
//! }
//! ```
//!
//! Models like to wrap JSON in fenced code blocks; [`parse_outline`]
//! strips the fence before parsing and rejects anything that does not
//! match the schema.
use crate::common::color::RGBColor;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// One slide of a rewritten outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineSlide {
    /// Slide title
    pub title: String,
    /// Bullet points, one string each
    pub content: Vec<String>,
}

/// A restructured outline returned by the rewrite endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Slides in presentation order
    pub slides: Vec<OutlineSlide>,
    /// Optional single theme color as an RGB triple (0-255 each)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_rgb: Option<[u8; 3]>,
}

impl Outline {
    /// The theme color, if the outline carries one.
    pub fn theme_color(&self) -> Option<RGBColor> {
        self.theme_rgb.map(RGBColor::from)
    }
}

/// Strip a Markdown code fence (``` or ```json) wrapping a payload.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (e.g. "json") up to the first newline.
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest.strip_prefix("json").unwrap_or(rest),
    };
    let rest = rest.trim();
    match rest.strip_suffix("```") {
        Some(inner) => inner.trim(),
        None => rest,
    }
}

/// Parse and validate a raw rewrite response into an [`Outline`].
///
/// Malformed JSON, a missing `slides` key, a non-array `content`, or an
/// outline with no slides at all are all rejected as
/// [`Error::SchemaViolation`]; no partial result is produced.
pub fn parse_outline(raw: &str) -> Result<Outline> {
    let payload = strip_code_fence(raw);

    let outline: Outline = serde_json::from_str(payload)
        .map_err(|e| Error::SchemaViolation(format!("outline does not match schema: {}", e)))?;

    if outline.slides.is_empty() {
        return Err(Error::SchemaViolation(
            "outline contains no slides".to_string(),
        ));
    }

    Ok(outline)
}

#[cfg(feature = "rewrite")]
pub use client::RewriteClient;

#[cfg(feature = "rewrite")]
mod client {
    use super::{Outline, parse_outline};
    use crate::error::{Error, Result};
    use crate::extract::{DEFAULT_PROMPT_BUDGET, truncate_chars};
    use serde::Deserialize;
    use std::time::Duration;
    use tracing::debug;

    /// Default endpoint: the Gemini generateContent REST surface.
    pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

    /// Default model id.
    pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Client for the generative rewrite endpoint.
    ///
    /// One request per invocation, no retry; transport and authentication
    /// failures surface as [`Error::Rewrite`] with the underlying message.
    /// The request timeout is bounded (30 s by default).
    pub struct RewriteClient {
        http: reqwest::Client,
        endpoint: String,
        model: String,
        api_key: String,
    }

    impl RewriteClient {
        /// Create a client with the default endpoint, model and timeout.
        pub fn new(api_key: impl Into<String>) -> Result<Self> {
            Self::with_timeout(api_key, DEFAULT_TIMEOUT)
        }

        /// Create a client with an explicit request timeout.
        pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
            let http = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| Error::Rewrite(e.to_string()))?;
            Ok(Self {
                http,
                endpoint: DEFAULT_ENDPOINT.to_string(),
                model: DEFAULT_MODEL.to_string(),
                api_key: api_key.into(),
            })
        }

        /// Override the endpoint base URL.
        pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
            self.endpoint = endpoint.into();
            self
        }

        /// Override the model id.
        pub fn with_model(mut self, model: impl Into<String>) -> Self {
            self.model = model.into();
            self
        }

        /// Send the extracted text to the model and return the validated
        /// outline.
        pub async fn rewrite(&self, source_text: &str) -> Result<Outline> {
            let prompt = build_prompt(source_text);
            let url = format!(
                "{}/v1beta/models/{}:generateContent",
                self.endpoint.trim_end_matches('/'),
                self.model
            );

            let body = serde_json::json!({
                "contents": [{"parts": [{"text": prompt}]}]
            });

            debug!(model = %self.model, "sending rewrite request");
            let response = self
                .http
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| Error::Rewrite(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let detail = response.text().await.unwrap_or_default();
                return Err(Error::Rewrite(format!(
                    "endpoint returned {}: {}",
                    status, detail
                )));
            }

            let parsed: GenerateContentResponse = response
                .json()
                .await
                .map_err(|e| Error::Rewrite(format!("unreadable response body: {}", e)))?;

            let text = parsed.text();
            if text.is_empty() {
                return Err(Error::Rewrite(
                    "response contained no candidate text".to_string(),
                ));
            }

            parse_outline(&text)
        }
    }

    /// The fixed instruction the extracted content is embedded in.
    pub(crate) fn build_prompt(source_text: &str) -> String {
        let source = truncate_chars(source_text, DEFAULT_PROMPT_BUDGET);
        format!(
            concat!(
                "You are a presentation architect. Redesign the following deck ",
                "content into a concise 3-5 slide outline.\n\nSource content:\n{}\n\n",
                "Respond with a single JSON object and nothing else, no Markdown, ",
                "matching exactly:\n",
                "{{\"slides\": [{{\"title\": \"...\", \"content\": [\"...\", \"...\"]}}]}}",
            ),
            source
        )
    }

    /// The slice of the generateContent response we read.
    #[derive(Debug, Deserialize)]
    struct GenerateContentResponse {
        #[serde(default)]
        candidates: Vec<Candidate>,
    }

    #[derive(Debug, Deserialize)]
    struct Candidate {
        #[serde(default)]
        content: CandidateContent,
    }

    #[derive(Debug, Deserialize, Default)]
    struct CandidateContent {
        #[serde(default)]
        parts: Vec<CandidatePart>,
    }

    #[derive(Debug, Deserialize)]
    struct CandidatePart {
        #[serde(default)]
        text: Option<String>,
    }

    impl GenerateContentResponse {
        /// Concatenated text of the first candidate's parts.
        fn text(&self) -> String {
            let mut out = String::new();
            if let Some(candidate) = self.candidates.first() {
                for part in &candidate.content.parts {
                    if let Some(t) = &part.text {
                        out.push_str(t);
                    }
                }
            }
            out
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_prompt_truncates_source() {
            let long = "x".repeat(DEFAULT_PROMPT_BUDGET * 2);
            let prompt = build_prompt(&long);
            // Instruction plus at most the budgeted source.
            assert!(prompt.len() < DEFAULT_PROMPT_BUDGET + 600);
        }

        #[test]
        fn test_response_text_extraction() {
            let json = r#"{"candidates":[{"content":{"parts":[{"text":"{\"slides\""},{"text":":[]}"}]}}]}"#;
            let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
            assert_eq!(parsed.text(), r#"{"slides":[]}"#);
        }

        #[test]
        fn test_empty_candidates() {
            let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
            assert_eq!(parsed.text(), "");
        }
    }
}
