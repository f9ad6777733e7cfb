use chrono::{DateTime, Utc};
use eframe::egui::Color32;
use serde::{Deserialize, Deserializer, Serialize};

/// Virality tier assigned by the external scorer.
///
/// The backend column is free text; anything the scorer emits that we do not
/// recognize decodes to [`Tier::Noise`] so a schema drift upstream never
/// breaks the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Critical,
    Viral,
    PreViral,
    Monitor,
    Noise,
}

impl<'de> Deserialize<'de> for Tier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Tier::from_str_lossy(&raw))
    }
}

impl Default for Tier {
    fn default() -> Self {
        Tier::Noise
    }
}

impl Tier {
    /// Parse the backend column value; unrecognized labels become NOISE.
    pub fn from_str_lossy(raw: &str) -> Tier {
        match raw {
            "CRITICAL" => Tier::Critical,
            "VIRAL" => Tier::Viral,
            "PRE_VIRAL" => Tier::PreViral,
            "MONITOR" => Tier::Monitor,
            _ => Tier::Noise,
        }
    }

    /// All tiers in descending severity, used for the filter bar.
    pub const ALL: [Tier; 5] = [
        Tier::Critical,
        Tier::Viral,
        Tier::PreViral,
        Tier::Monitor,
        Tier::Noise,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Critical => "CRITICAL",
            Tier::Viral => "VIRAL",
            Tier::PreViral => "PRE-VIRAL",
            Tier::Monitor => "MONITOR",
            Tier::Noise => "NOISE",
        }
    }

    /// Single-character marker used in the ticker line.
    pub fn glyph(&self) -> &'static str {
        match self {
            Tier::Critical => "🔴",
            Tier::Viral => "🟠",
            Tier::PreViral => "🟡",
            Tier::Monitor => "🔵",
            Tier::Noise => "⚪",
        }
    }

    pub fn color(&self) -> Color32 {
        match self {
            Tier::Critical => Color32::from_rgb(0xe5, 0x3e, 0x3e),
            Tier::Viral => Color32::from_rgb(0xed, 0x89, 0x36),
            Tier::PreViral => Color32::from_rgb(0xec, 0xc9, 0x4b),
            Tier::Monitor => Color32::from_rgb(0x42, 0x99, 0xe1),
            Tier::Noise => Color32::GRAY,
        }
    }
}

/// One scored row from the `predictions` table.
///
/// Rows are owned entirely by the external scorer; this program never writes
/// them. Every field besides `id` carries a serde default so a partial row
/// still decodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: i64,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub clip_url: Option<String>,
    #[serde(default)]
    pub ai_score: f32,
    #[serde(default)]
    pub platform_score: f32,
    #[serde(default)]
    pub final_score: f32,
    #[serde(default)]
    pub tier: Tier,
    #[serde(default)]
    pub cross_platform: bool,
    #[serde(default)]
    pub scored_at: Option<DateTime<Utc>>,
}

/// Map a raw score onto [0, 1] for bar widths.
///
/// Scores are documented as [0, 100] but the scorer has shipped values
/// outside that range before; the bar width is clamped regardless.
pub fn score_fraction(score: f32) -> f32 {
    (score.clamp(0.0, 100.0)) / 100.0
}
