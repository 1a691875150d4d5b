//! Application settings singleton.

use crate::model::center::CenterId;
use serde::{Deserialize, Serialize};

/// Language applied when settings are first created.
pub const DEFAULT_LANGUAGE: &str = "en";

/// UI color scheme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

/// The single settings row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub theme: Theme,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_center: Option<CenterId>,
    pub language: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            default_center: None,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Partial settings update. `default_center: Some(None)` clears the default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub default_center: Option<Option<CenterId>>,
    pub language: Option<String>,
}

impl SettingsPatch {
    pub fn theme(theme: Theme) -> Self {
        Self {
            theme: Some(theme),
            ..Self::default()
        }
    }

    pub fn language(language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
            ..Self::default()
        }
    }

    /// Merges the specified fields into `settings`.
    pub fn apply_to(&self, settings: &mut AppSettings) {
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(default_center) = self.default_center {
            settings.default_center = default_center;
        }
        if let Some(language) = &self.language {
            settings.language.clone_from(language);
        }
    }
}
