//! # Model Profiles
//!
//! A model profile bundles everything the relay needs to ask one vision model for a
//! guess: the upstream model id, sampling parameters, the prompt, and the display
//! metadata a client shows in its model picker.
//!
//! The table is fixed at compile time and never mutated. Lookup by identifier is an
//! explicit `Option`; falling back to the default is a separate step in [`resolve`].

use serde::Serialize;

/// Identifier of the profile used when nothing else resolves.
pub const DEFAULT_PROFILE: &str = "qwen-vl-plus-latest";

/// Prompt used for a profile that does not carry its own.
pub const FALLBACK_PROMPT: &str =
    "Guess what this drawing shows. Answer briefly with just the object or scene.";

/// Relative strengths of a profile, rated 1 (low) to 5 (high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelComparison {
    pub speed: u8,
    pub accuracy: u8,
    pub cost: u8,
    pub features: &'static [&'static str],
}

/// One selectable inference backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelProfile {
    /// Key clients send as `modelName`
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    /// Model id sent upstream
    pub model: &'static str,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip)]
    pub prompt: Option<&'static str>,
    pub comparison: ModelComparison,
}

impl ModelProfile {
    /// The prompt to send, falling back to [`FALLBACK_PROMPT`].
    pub fn prompt(&self) -> &'static str {
        self.prompt.unwrap_or(FALLBACK_PROMPT)
    }
}

// The first entry is the default.
static PROFILES: [ModelProfile; 4] = [
    ModelProfile {
        name: "qwen-vl-plus-latest",
        display_name: "Qwen-VL Plus (Latest)",
        description: "Balanced speed and accuracy, good for most drawings",
        model: "qwen-vl-plus-latest",
        temperature: 0.7,
        max_tokens: 100,
        prompt: Some(
            "What does this drawing show? Answer with a short phrase naming only the object \
             or scene you think it is, without explanation. If it is unclear, make a bold \
             guess from the outline and shapes.",
        ),
        comparison: ModelComparison {
            speed: 4,
            accuracy: 4,
            cost: 3,
            features: &["Fast response", "High accuracy", "Multilingual"],
        },
    },
    ModelProfile {
        name: "qwen-vl-max-latest",
        display_name: "Qwen-VL Max (Latest)",
        description: "Strongest recognition, suited to complex drawings",
        model: "qwen-vl-max-latest",
        temperature: 0.5,
        max_tokens: 150,
        prompt: Some(
            "Look carefully at this drawing. Consider its outline, shapes and details, then \
             guess what it shows. Answer in a few concise words.",
        ),
        comparison: ModelComparison {
            speed: 3,
            accuracy: 5,
            cost: 5,
            features: &["Highest accuracy", "Complex images", "Detailed analysis"],
        },
    },
    ModelProfile {
        name: "qwen-vl-plus",
        display_name: "Qwen-VL Plus (Standard)",
        description: "Standard release, good value",
        model: "qwen-vl-plus",
        temperature: 0.6,
        max_tokens: 80,
        prompt: Some("This is a simple sketch. Guess what it shows and answer briefly."),
        comparison: ModelComparison {
            speed: 5,
            accuracy: 3,
            cost: 2,
            features: &["Very fast", "Basic recognition", "Low cost"],
        },
    },
    ModelProfile {
        name: "qwen-vl-max",
        display_name: "Qwen-VL Max (Standard)",
        description: "Advanced release with higher accuracy",
        model: "qwen-vl-max",
        temperature: 0.4,
        max_tokens: 120,
        prompt: Some("Analyze this drawing and guess what it is. Give the single most likely answer."),
        comparison: ModelComparison {
            speed: 3,
            accuracy: 4,
            cost: 4,
            features: &["High accuracy", "Stable", "Production ready"],
        },
    },
];

/// All profiles, default first.
pub fn all() -> &'static [ModelProfile] {
    &PROFILES
}

/// The built-in default profile.
pub fn default_profile() -> &'static ModelProfile {
    &PROFILES[0]
}

/// Exact lookup by identifier.
pub fn lookup(name: &str) -> Option<&'static ModelProfile> {
    PROFILES.iter().find(|profile| profile.name == name)
}

/// Resolves the profile for a request. Never fails.
///
/// A non-blank requested identifier is looked up as is; only a request that
/// names no profile uses the configured default. Anything that does not match
/// a profile falls back to [`DEFAULT_PROFILE`].
pub fn resolve(requested: Option<&str>, configured_default: Option<&str>) -> &'static ModelProfile {
    requested
        .and_then(non_blank)
        .or_else(|| configured_default.and_then(non_blank))
        .and_then(lookup)
        .unwrap_or_else(default_profile)
}

fn non_blank(name: &str) -> Option<&str> {
    let name = name.trim();
    (!name.is_empty()).then_some(name)
}

/// Model list as served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ModelCatalogue {
    pub default: &'static str,
    pub models: &'static [ModelProfile],
}

/// The catalogue, with `default` reflecting the configured default when it resolves.
pub fn catalogue(configured_default: Option<&str>) -> ModelCatalogue {
    ModelCatalogue {
        default: resolve(None, configured_default).name,
        models: all(),
    }
}
