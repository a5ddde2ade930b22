use crate::conversation::DEFAULT_REPLY_DELAY;
use crate::profile::StudentProfile;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Overrides the directory holding config.json and the log file
pub const HOME_ENV: &str = "SKILLMORPHIX_HOME";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Preferences {
    pub notifications: bool,
    pub dark_mode: bool,
    pub offline_mode: bool,
    pub voice_assistant: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            notifications: true,
            dark_mode: false,
            offline_mode: false,
            voice_assistant: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    Notifications,
    DarkMode,
    OfflineMode,
    VoiceAssistant,
}

impl Preference {
    pub fn all() -> Vec<Preference> {
        vec![
            Preference::Notifications,
            Preference::DarkMode,
            Preference::OfflineMode,
            Preference::VoiceAssistant,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Preference::Notifications => "Notifications",
            Preference::DarkMode => "Dark Mode",
            Preference::OfflineMode => "Offline Mode",
            Preference::VoiceAssistant => "Voice Assistant",
        }
    }

    /// Notice shown after the preference is switched to `enabled`: (title, body)
    pub fn toggle_notice(&self, enabled: bool) -> (&'static str, &'static str) {
        match (self, enabled) {
            (Preference::Notifications, true) => (
                "Notifications Enabled",
                "You'll receive updates about your learning progress",
            ),
            (Preference::Notifications, false) => (
                "Notifications Disabled",
                "You won't receive notifications from the app",
            ),
            (Preference::DarkMode, true) => ("Dark Mode Enabled", "Your theme preference has been saved"),
            (Preference::DarkMode, false) => ("Light Mode Enabled", "Your theme preference has been saved"),
            (Preference::OfflineMode, true) => (
                "Offline Mode Enabled",
                "Content will be downloaded for offline access",
            ),
            (Preference::OfflineMode, false) => (
                "Offline Mode Disabled",
                "Only online content will be available",
            ),
            (Preference::VoiceAssistant, true) => (
                "Voice Assistant Enabled",
                "Your voice assistant preference has been saved",
            ),
            (Preference::VoiceAssistant, false) => (
                "Voice Assistant Disabled",
                "Your voice assistant preference has been saved",
            ),
        }
    }
}

impl Preferences {
    pub fn get(&self, pref: Preference) -> bool {
        match pref {
            Preference::Notifications => self.notifications,
            Preference::DarkMode => self.dark_mode,
            Preference::OfflineMode => self.offline_mode,
            Preference::VoiceAssistant => self.voice_assistant,
        }
    }

    /// Flip a preference and return its new value
    pub fn toggle(&mut self, pref: Preference) -> bool {
        let slot = match pref {
            Preference::Notifications => &mut self.notifications,
            Preference::DarkMode => &mut self.dark_mode,
            Preference::OfflineMode => &mut self.offline_mode,
            Preference::VoiceAssistant => &mut self.voice_assistant,
        };
        *slot = !*slot;
        *slot
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub profile: Option<StudentProfile>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
}

fn default_reply_delay_ms() -> u64 {
    DEFAULT_REPLY_DELAY.as_millis() as u64
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            profile: None,
            preferences: Preferences::default(),
            reply_delay_ms: default_reply_delay_ms(),
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Missing file means first run and yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        tracing::info!(path = %path.display(), has_profile = config.profile.is_some(), "config loaded");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        tracing::info!(path = %path.display(), "config saved");
        Ok(())
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn sign_out(&mut self) {
        self.profile = None;
    }

    /// Directory holding config.json and the log file
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(home) = std::env::var_os(HOME_ENV) {
            return Ok(PathBuf::from(home));
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("skillmorphix"))
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Grade, Language};

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert!(config.preferences.notifications);
        assert_eq!(config.reply_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn test_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new();
        config.profile = Some(
            StudentProfile::new("Priya", Grade::new(9).unwrap(), Language::Hindi).unwrap(),
        );
        config.preferences.toggle(Preference::DarkMode);
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_sign_out_clears_profile_only() {
        let mut config = Config::new();
        config.profile = Some(
            StudentProfile::new("Lee", Grade::new(3).unwrap(), Language::Chinese).unwrap(),
        );
        config.preferences.toggle(Preference::OfflineMode);
        config.sign_out();
        assert!(config.profile.is_none());
        assert!(config.preferences.offline_mode);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "preferences": { "dark_mode": true } }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.profile.is_none());
        assert!(config.preferences.dark_mode);
        assert!(config.preferences.notifications);
        assert_eq!(config.reply_delay_ms, 1000);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_toggle_reports_new_value() {
        let mut prefs = Preferences::default();
        assert!(!prefs.toggle(Preference::Notifications));
        assert!(!prefs.get(Preference::Notifications));
        assert_eq!(
            Preference::Notifications.toggle_notice(false).0,
            "Notifications Disabled"
        );
        assert_eq!(Preference::DarkMode.toggle_notice(false).0, "Light Mode Enabled");
    }
}
