//! Image generation: pluggable, trait-based source of per-day travel photos.
//!
//! Production: `GeminiImageGenerator` wrapped in `WithPlaceholder`, so a failed call
//! yields a stock placeholder URL instead of an error. Without an image API key the
//! service runs on `PlaceholderImages` alone.
//!
//! `AppState` holds an `Arc<dyn ImageGenerator>`, chosen at startup from config.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

const GEMINI_IMAGE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-image:generateContent";
const ASPECT_RATIO: &str = "16:9";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("No image data in response")]
    NoImageData,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Produces one image reference (data URI or URL) for a prompt context.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, context: &str) -> Result<String, ImageError>;
}

/// Stock photo URL with a fresh seed, 1200×675 to match the 16:9 generated images.
pub fn placeholder_url() -> String {
    format!("https://picsum.photos/seed/{}/1200/675", Uuid::new_v4().simple())
}

/// Wraps a day's context into the full photo prompt.
pub fn refined_prompt(context: &str) -> String {
    format!(
        "A realistic, high-quality travel photograph of: {context}. \
         Focus on authentic architecture, actual landmarks, realistic hotel interiors, \
         or genuine local cuisine as described. Professional 4k photography, natural lighting, \
         clear details, no people, no text, high aesthetic quality, realistic textures and colors."
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Placeholder backends
// ────────────────────────────────────────────────────────────────────────────

/// Never calls out; every image is a placeholder.
pub struct PlaceholderImages;

#[async_trait]
impl ImageGenerator for PlaceholderImages {
    async fn generate(&self, _context: &str) -> Result<String, ImageError> {
        Ok(placeholder_url())
    }
}

/// Falls back to a placeholder whenever the inner generator fails.
pub struct WithPlaceholder<G> {
    inner: G,
}

impl<G> WithPlaceholder<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<G: ImageGenerator> ImageGenerator for WithPlaceholder<G> {
    async fn generate(&self, context: &str) -> Result<String, ImageError> {
        match self.inner.generate(context).await {
            Ok(image) => Ok(image),
            Err(e) => {
                warn!("Image generation failed, using placeholder: {e}");
                Ok(placeholder_url())
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
    image_config: ImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

impl GenerateContentResponse {
    /// The first inline image of the first candidate, as a data URI.
    fn first_image(&self) -> Option<String> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| p.inline_data.as_ref())
            .map(|d| format!("data:{};base64,{}", d.mime_type, d.data))
    }
}

/// Calls the Gemini image model. Returns the image inline as a base64 data URI.
pub struct GeminiImageGenerator {
    client: Client,
    api_key: String,
}

impl GeminiImageGenerator {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageGenerator {
    async fn generate(&self, context: &str) -> Result<String, ImageError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: refined_prompt(context),
                }],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE"],
                image_config: ImageConfig {
                    aspect_ratio: ASPECT_RATIO,
                },
            },
        };

        let response = self
            .client
            .post(GEMINI_IMAGE_URL)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ImageError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        let image = body.first_image().ok_or(ImageError::NoImageData)?;
        debug!("Generated image ({} bytes of data URI)", image.len());
        Ok(image)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
