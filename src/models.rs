//! Data models and structures
//!
//! Defines the scan request, the two-shaped analysis result handed back to
//! callers, the dietary/tone selectors, and process configuration.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DietaryPreference {
    #[default]
    None,
    Vegan,
    Vegetarian,
    Halal,
    Kosher,
    GlutenFree,
}

impl DietaryPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            DietaryPreference::None => "none",
            DietaryPreference::Vegan => "vegan",
            DietaryPreference::Vegetarian => "vegetarian",
            DietaryPreference::Halal => "halal",
            DietaryPreference::Kosher => "kosher",
            DietaryPreference::GlutenFree => "gluten_free",
        }
    }

    /// Human-readable name used inside prompts and diet warnings.
    pub fn label(&self) -> &'static str {
        match self {
            DietaryPreference::None => "no specific",
            DietaryPreference::Vegan => "vegan",
            DietaryPreference::Vegetarian => "vegetarian",
            DietaryPreference::Halal => "halal",
            DietaryPreference::Kosher => "kosher",
            DietaryPreference::GlutenFree => "gluten-free",
        }
    }
}

impl From<&str> for DietaryPreference {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "vegan" => DietaryPreference::Vegan,
            "vegetarian" => DietaryPreference::Vegetarian,
            "halal" => DietaryPreference::Halal,
            "kosher" => DietaryPreference::Kosher,
            "gluten_free" | "glutenfree" => DietaryPreference::GlutenFree,
            "none" | "" => DietaryPreference::None,
            other => {
                tracing::warn!("Unknown dietary preference '{}', using none", other);
                DietaryPreference::None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ToneMode {
    #[default]
    Standard,
    Roast,
}

/// One scan: an encoded image plus the caller's presentation preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Bare base64 or a `data:<mime>;base64,` URI.
    pub image: String,
    pub language: String,
    pub dietary_preference: DietaryPreference,
    pub tone: ToneMode,
}

impl AnalysisRequest {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            language: "en".to_string(),
            dietary_preference: DietaryPreference::None,
            tone: ToneMode::Standard,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into();
        if !language.trim().is_empty() {
            self.language = language.trim().to_string();
        }
        self
    }

    pub fn with_dietary_preference(mut self, preference: DietaryPreference) -> Self {
        self.dietary_preference = preference;
        self
    }

    pub fn with_tone(mut self, tone: ToneMode) -> Self {
        self.tone = tone;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarbonFootprint {
    Low,
    #[default]
    Medium,
    High,
}

impl CarbonFootprint {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Some(CarbonFootprint::Low),
            "medium" => Some(CarbonFootprint::Medium),
            "high" => Some(CarbonFootprint::High),
            _ => None,
        }
    }
}

/// Nutrition estimate for an image recognized as consumable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodAnalysis {
    pub food_name: String,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    pub health_score: u8,
    pub brief_tip: String,
    pub confidence: u8,
    pub is_safe: bool,
    pub warning: Option<String>,
    pub carbon_footprint: CarbonFootprint,
    pub sustainability_tip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_action_tip: Option<String>,
}

/// Outcome of a scan. Every failure is folded into `NonFood` with a reason,
/// so callers only branch on [`AnalysisResult::is_food`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisResult {
    NonFood { reason: String },
    Food(FoodAnalysis),
}

impl AnalysisResult {
    pub fn non_food(reason: impl Into<String>) -> Self {
        AnalysisResult::NonFood {
            reason: reason.into(),
        }
    }

    pub fn is_food(&self) -> bool {
        matches!(self, AnalysisResult::Food(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            AnalysisResult::NonFood { reason } => Some(reason),
            AnalysisResult::Food(_) => None,
        }
    }

    pub fn food(&self) -> Option<&FoodAnalysis> {
        match self {
            AnalysisResult::Food(food) => Some(food),
            AnalysisResult::NonFood { .. } => None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaggedFood<'a> {
    is_food: bool,
    #[serde(flatten)]
    body: &'a FoodAnalysis,
}

impl Serialize for AnalysisResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            AnalysisResult::NonFood { reason } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("isFood", &false)?;
                map.serialize_entry("reason", reason)?;
                map.end()
            }
            AnalysisResult::Food(food) => TaggedFood {
                is_food: true,
                body: food,
            }
            .serialize(serializer),
        }
    }
}

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Key variables read in rotation-priority order.
const API_KEY_VARS: [&str; 3] = [
    "GEMINI_API_KEY",
    "GEMINI_API_KEY_FALLBACK_1",
    "GEMINI_API_KEY_FALLBACK_2",
];

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_keys: Vec<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub stub_delay: Duration,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; missing keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut api_keys: Vec<String> = API_KEY_VARS.iter().filter_map(|var| lookup(var)).collect();
        if let Some(extra) = lookup("GEMINI_API_KEYS") {
            api_keys.extend(extra.split(',').map(str::to_string));
        }
        let api_keys = api_keys
            .into_iter()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .collect();

        let timeout_secs: u64 = parse_or(&lookup, "GEMINI_TIMEOUT_SECS", 30)?;
        let stub_delay_ms: u64 = parse_or(&lookup, "STUB_DELAY_MS", 2000)?;

        Ok(Self {
            api_keys,
            model: lookup("GEMINI_MODEL")
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: lookup("GEMINI_BASE_URL")
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            stub_delay: Duration::from_millis(stub_delay_ms),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> crate::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|_| {
            crate::Error::Config(format!("{} must be a non-negative integer, got '{}'", key, raw))
        }),
        _ => Ok(default),
    }
}
