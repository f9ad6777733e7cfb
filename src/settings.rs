use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Supabase project URL, e.g. `https://abc.supabase.co`. Overridden by
    /// the `SUPABASE_URL` environment variable when set.
    #[serde(default)]
    pub supabase_url: Option<String>,
    /// Public (anon) API key. Overridden by `SUPABASE_ANON_KEY` when set.
    #[serde(default)]
    pub supabase_anon_key: Option<String>,
    /// When enabled the application initialises the logger at debug level.
    /// Defaults to `false` when the field is missing in the settings file.
    #[serde(default)]
    pub debug_logging: bool,
    /// Last known window size. If absent, a default size is used.
    #[serde(default)]
    pub window_size: Option<(i32, i32)>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_anon_key: None,
            debug_logging: false,
            window_size: Some((1100, 760)),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        let mut settings: Settings = if content.is_empty() {
            Self::default()
        } else {
            serde_json::from_str(&content)?
        };
        settings.apply_env_overrides();
        Ok(settings)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("SUPABASE_URL") {
            if !url.is_empty() {
                self.supabase_url = Some(url);
            }
        }
        if let Ok(key) = std::env::var("SUPABASE_ANON_KEY") {
            if !key.is_empty() {
                self.supabase_anon_key = Some(key);
            }
        }
    }

    /// Backend endpoint and key, or an error when either is missing.
    ///
    /// This is the only fatal condition in the program; everything after
    /// startup degrades to an empty list instead of failing.
    pub fn backend(&self) -> anyhow::Result<(String, String)> {
        let url = self
            .supabase_url
            .clone()
            .ok_or_else(|| anyhow::anyhow!("supabase_url missing (set SUPABASE_URL or settings.json)"))?;
        let key = self
            .supabase_anon_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("supabase_anon_key missing (set SUPABASE_ANON_KEY or settings.json)"))?;
        Ok((url.trim_end_matches('/').to_string(), key))
    }
}
