use image::Rgba;

use crate::color::background_or_default;
use crate::driver::{DEFAULT_FPS, MAX_FPS, MIN_FPS};
use crate::sizing::{DisplayScale, MIN_SCALE};

/// Start-up settings for a [`Viewer`](crate::Viewer).
///
/// Every field has a default, so a settings file only needs to mention what
/// it changes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ViewerSettings {
    /// Target playback rate in frames per second
    pub fps: u32,
    /// Display scale ratio
    pub scale: f64,
    /// Frame width override applied after the initial image loads
    pub frame_width: Option<u32>,
    /// Surface background color (named or hex)
    pub background: Option<String>,
    /// Sprite strip to load on start-up
    pub image: Option<String>,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            scale: MIN_SCALE,
            frame_width: None,
            background: None,
            image: None,
        }
    }
}

/// Error returned when a settings document cannot be parsed.
#[cfg(feature = "toml")]
#[derive(Debug, thiserror::Error)]
#[error("invalid viewer settings: {0}")]
pub struct SettingsError(#[from] toml::de::Error);

impl ViewerSettings {
    /// Parse a TOML settings document.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(s)?)
    }

    /// Copy of these settings with fps and scale pulled into the ranges the
    /// controls allow.
    pub fn clamped(&self) -> Self {
        Self {
            fps: self.fps.clamp(MIN_FPS, MAX_FPS),
            scale: DisplayScale::clamped(self.scale).ratio(),
            ..self.clone()
        }
    }

    /// The configured background, or gray when unset or unparseable.
    pub fn background_color(&self) -> Rgba<u8> {
        background_or_default(self.background.as_deref())
    }

    /// The configured display scale.
    pub fn display_scale(&self) -> DisplayScale {
        DisplayScale::new(self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::DEFAULT_BACKGROUND;

    #[test]
    fn defaults() {
        let settings = ViewerSettings::default();
        assert_eq!(settings.fps, 6);
        assert_eq!(settings.scale, 1.0);
        assert_eq!(settings.background_color(), DEFAULT_BACKGROUND);
        assert!(settings.image.is_none());
    }

    #[test]
    fn clamped_pulls_values_into_range() {
        let settings = ViewerSettings {
            fps: 240,
            scale: 0.25,
            ..Default::default()
        };
        let clamped = settings.clamped();
        assert_eq!(clamped.fps, 60);
        assert_eq!(clamped.scale, 1.0);

        let settings = ViewerSettings {
            fps: 0,
            scale: 90.0,
            ..Default::default()
        };
        let clamped = settings.clamped();
        assert_eq!(clamped.fps, 1);
        assert_eq!(clamped.scale, 25.0);
    }

    #[test]
    fn custom_background() {
        let settings = ViewerSettings {
            background: Some("#1a1a2e".into()),
            ..Default::default()
        };
        assert_eq!(settings.background_color(), Rgba([26, 26, 46, 255]));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn parse_partial_toml() {
        let settings = ViewerSettings::from_toml_str(
            r#"
            fps = 12
            image = "sprites/walk.png"
            "#,
        )
        .unwrap();
        assert_eq!(settings.fps, 12);
        assert_eq!(settings.scale, 1.0);
        assert_eq!(settings.image.as_deref(), Some("sprites/walk.png"));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn parse_invalid_toml() {
        assert!(ViewerSettings::from_toml_str("fps = \"fast\"").is_err());
    }
}
