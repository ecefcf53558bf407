//! Dashboard colour theme preference.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned for an unrecognised theme name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid theme: {0} (expected light, dark or system)")]
pub struct ThemeParseError(pub String);

/// Colour theme chosen with the theme toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the operating system preference.
    #[default]
    System,
}

impl Theme {
    /// The theme the toggle switches to. `System` resolves to dark.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light | Self::System => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Name used in the `data-theme` attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = ThemeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(ThemeParseError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::System.toggled(), Theme::Dark);
    }

    #[test]
    fn test_parse() {
        assert_eq!("dark".parse::<Theme>(), Ok(Theme::Dark));
        assert!("sepia".parse::<Theme>().is_err());
    }
}
