// Wire types: the relay's own JSON contract and the chat-completions request body.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::profiles::ModelProfile;

/// Body of `POST /analyze-drawing`.
///
/// Both fields are optional at the serde level so that `{}` reaches validation and
/// gets a 400 instead of a parse failure. A `modelName` that is not a string is
/// treated as absent, so profile resolution still applies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub model_name: Option<String>,
}

fn string_or_absent<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(name) => Some(name),
        _ => None,
    })
}

impl AnalyzeRequest {
    pub fn new(image_data: impl Into<String>, model_name: Option<String>) -> Self {
        Self {
            image_data: Some(image_data.into()),
            model_name,
        }
    }
}

/// Successful relay answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeReply {
    pub guess: String,
    pub success: bool,
    /// Display name of the profile that produced the guess
    pub model: String,
}

/// Error answer, for every failure status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// OpenAI-compatible chat-completions request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatCompletionRequest {
    /// One user turn: the profile's prompt, then the image.
    pub fn for_profile(profile: &ModelProfile, image_data: impl Into<String>) -> Self {
        Self {
            model: profile.model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: profile.prompt().to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_data.into(),
                        },
                    },
                ],
            }],
            temperature: profile.temperature,
            max_tokens: profile.max_tokens,
        }
    }
}
