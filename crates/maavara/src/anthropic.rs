use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::prelude::*;

pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Returned when the service answers with no generated content.
pub const FALLBACK_TEXT: &str = "Could not generate explanation.";

/// Deployment-wide system instruction sent with every completion request.
pub const SYSTEM_PROMPT: &str = "\
You are a warm, patient Torah tutor helping a frum Yid with his weekly Maavara Sedra (Shnayim Mikra V'Echad Targum).

Guidelines:
- Explain in simple, clear English
- Use frum terminology: Hashem (not God), Moshe Rabbeinu, Bnei Yisroel, klal Yisroel, etc.
- For Rashi questions: start by identifying WHAT BOTHERED RASHI — what question is he answering?
- Then explain Rashi's answer simply
- Use relatable analogies when helpful
- Refer to the student's parasha context when relevant
- Keep explanations concise and conversational
- Never be condescending
- When quoting Hebrew, keep it brief and relevant";

/// Completion-service configuration, built once at startup.
///
/// The credential is optional so the process can start without it; the
/// first outbound call then fails with a typed error instead of a panic.
#[derive(Debug, Clone)]
pub struct Anthropic {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl Anthropic {
    pub fn new(api_key: Option<String>, model: String) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Generic(f!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: ANTHROPIC_API_BASE.to_string(),
            api_key,
            model,
        })
    }

    /// Send one completion request and return displayable text.
    ///
    /// Exactly one attempt is made. Transport failures and unparseable
    /// bodies are errors; a parsed non-success response is shaped into
    /// readable text so the caller always has something to show.
    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, Error> {
        let api_key = self.api_key.as_deref().ok_or(Error::MissingCredential)?;

        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            system,
            messages: vec![Message {
                role: "user",
                content: user,
            }],
        };

        let response = self
            .http
            .post(f!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(f!("completion request failed: {e}")))?;

        let ok = response.status().is_success();
        let payload: MessagesResponse = response
            .json()
            .await
            .map_err(|e| Error::Network(f!("malformed completion response: {e}")))?;

        Ok(shape_completion(ok, &payload))
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// Turn a parsed completion-service response into displayable text.
///
/// Service-level errors become readable text rather than an HTTP error,
/// so the study client always has a string it can show. A well-formed
/// response without content yields [`FALLBACK_TEXT`].
pub fn shape_completion(ok: bool, response: &MessagesResponse) -> String {
    if !ok {
        let detail = response
            .error
            .as_ref()
            .map(|e| e.message.as_str())
            .filter(|message| !message.is_empty())
            .unwrap_or("no detail provided");
        return f!("The explanation service reported an error: {detail}");
    }

    response
        .content
        .first()
        .map(|block| block.text.as_str())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_TEXT.to_string())
}
