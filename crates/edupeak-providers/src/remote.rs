use async_trait::async_trait;
use edupeak_core::error::ProviderError;
use edupeak_core::responder::{ResponseRequest, Responder};
use reqwest::Client;

/// Sent ahead of every Gemini request as a user turn.
pub const PERSONA_INSTRUCTION: &str = "System Instruction: You are Cortex-AI, a personal learning \
     assistant for Edupeak students. You are helpful, encouraging, and knowledgeable about school \
     subjects and financial literacy. Keep your responses concise and engaging. Use emojis occasionally.";

/// The model turn acknowledging [`PERSONA_INSTRUCTION`].
pub const PERSONA_ACK: &str =
    "Understood! I am Cortex-AI, ready to help Edupeak students learn and grow. 🚀";

/// Wire dialect of the remote text-generation service.
#[derive(Debug, Clone)]
pub enum RemoteApi {
    /// The portal's own chat route: `{"message"}` in, `{"response"}` or
    /// `{"error"}` out.
    ChatProxy { endpoint: String },
    /// Google Generative Language `generateContent`.
    Gemini {
        base_url: String,
        api_key: String,
        model: String,
    },
}

/// Forwards only the latest user message; one request, one reply.
pub struct RemoteResponder {
    client: Client,
    api: RemoteApi,
}

impl RemoteResponder {
    pub fn new(api: RemoteApi) -> Self {
        Self {
            client: Client::new(),
            api,
        }
    }

    pub fn chat_proxy(endpoint: impl Into<String>) -> Self {
        Self::new(RemoteApi::ChatProxy {
            endpoint: endpoint.into(),
        })
    }

    pub fn gemini(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self::new(RemoteApi::Gemini {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    async fn send_chat_proxy(&self, endpoint: &str, text: &str) -> Result<String, ProviderError> {
        let resp = self
            .client
            .post(endpoint)
            .json(&serde_json::json!({ "message": text }))
            .send()
            .await
            .map_err(http_error)?;

        let status = resp.status();
        let body = resp.text().await.map_err(http_error)?;
        let json: Option<serde_json::Value> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let message = json
                .as_ref()
                .and_then(|j| j["error"].as_str())
                .map(str::to_string)
                .unwrap_or(body);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let json = json.ok_or_else(|| ProviderError::MalformedResponse("body is not JSON".into()))?;
        json["response"]
            .as_str()
            .filter(|r| !r.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| ProviderError::MalformedResponse("missing 'response' field".into()))
    }

    async fn send_gemini(
        &self,
        base_url: &str,
        api_key: &str,
        model: &str,
        text: &str,
    ) -> Result<String, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            model
        );
        let body = serde_json::json!({
            "contents": [
                { "role": "user", "parts": [{ "text": PERSONA_INSTRUCTION }] },
                { "role": "model", "parts": [{ "text": PERSONA_ACK }] },
                { "role": "user", "parts": [{ "text": text }] },
            ]
        });

        let resp = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(http_error)?;

        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&raw)
                .ok()
                .and_then(|j| j["error"]["message"].as_str().map(str::to_string))
                .unwrap_or(raw);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.without_url().to_string()))?;
        parse_gemini_response(&json)
    }
}

/// Transport failure with the request URL stripped, so endpoint paths and
/// credentials never reach the logs.
fn http_error(e: reqwest::Error) -> ProviderError {
    ProviderError::Http(e.without_url().to_string())
}

fn parse_gemini_response(json: &serde_json::Value) -> Result<String, ProviderError> {
    let parts = json["candidates"]
        .as_array()
        .and_then(|c| c.first())
        .and_then(|c| c["content"]["parts"].as_array())
        .ok_or_else(|| ProviderError::MalformedResponse("no candidates in response".into()))?;

    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.trim().is_empty() {
        return Err(ProviderError::MalformedResponse("candidate has no text".into()));
    }
    Ok(text)
}

/// Text actually sent: the message, plus a note when an image is attached
/// (only the name travels, never the image).
fn outgoing_text(request: &ResponseRequest) -> String {
    let text = request.text.trim();
    match &request.image {
        Some(image) if text.is_empty() => format!("[Attached image: {}]", image.file_name),
        Some(image) => format!("{text}\n\n[Attached image: {}]", image.file_name),
        None => text.to_string(),
    }
}

#[async_trait]
impl Responder for RemoteResponder {
    async fn respond(&self, request: &ResponseRequest) -> Result<String, ProviderError> {
        let text = outgoing_text(request);
        match &self.api {
            RemoteApi::ChatProxy { endpoint } => self.send_chat_proxy(endpoint, &text).await,
            RemoteApi::Gemini {
                base_url,
                api_key,
                model,
            } => self.send_gemini(base_url, api_key, model, &text).await,
        }
    }

    fn name(&self) -> &str {
        match self.api {
            RemoteApi::ChatProxy { .. } => "chat-proxy",
            RemoteApi::Gemini { .. } => "gemini",
        }
    }
}
