use serde::Deserialize;
use std::path::Path;

/// Engine tuning parameters.
///
/// Defaults match the behavior the engine was calibrated against: a 30px
/// drag threshold so ordinary clicks never engage the drag machinery, a
/// frame-rate-scale (16ms) debounce on cell re-resolution, and a 50px/10px
/// edge margin/step for auto-scroll.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Minimum pointer travel (px) before a press becomes a drag selection.
    pub drag_threshold_px: f32,
    /// Minimum elapsed time (ms) between two cell re-resolutions during a drag.
    pub cell_update_debounce_ms: u64,
    /// Distance (px) from a body edge at which auto-scroll engages.
    pub scroll_margin_px: f32,
    /// Scroll offset nudge (px) applied per pointer-move event while in the margin.
    pub scroll_step_px: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: 30.0,
            cell_update_debounce_ms: 16,
            scroll_margin_px: 50.0,
            scroll_step_px: 10.0,
        }
    }
}

/// Errors that can occur during config loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("validation error: {0}")]
    Validation(String),
}

// ── Serde intermediate struct (unknown keys tolerated, all fields optional) ──

#[derive(Deserialize)]
#[serde(default)]
struct RawEngineConfig {
    drag_threshold_px: f32,
    cell_update_debounce_ms: u64,
    scroll_margin_px: f32,
    scroll_step_px: f32,
}

impl Default for RawEngineConfig {
    fn default() -> Self {
        let d = EngineConfig::default();
        Self {
            drag_threshold_px: d.drag_threshold_px,
            cell_update_debounce_ms: d.cell_update_debounce_ms,
            scroll_margin_px: d.scroll_margin_px,
            scroll_step_px: d.scroll_step_px,
        }
    }
}

impl EngineConfig {
    /// Parse a config from a TOML string, filling missing keys with defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: RawEngineConfig =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let config = Self {
            drag_threshold_px: raw.drag_threshold_px,
            cell_update_debounce_ms: raw.cell_update_debounce_ms,
            scroll_margin_px: raw.scroll_margin_px,
            scroll_step_px: raw.scroll_step_px,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.drag_threshold_px < 0.0 {
            return Err(ConfigError::Validation(format!(
                "drag_threshold_px must be >= 0, got {}",
                self.drag_threshold_px
            )));
        }
        if self.scroll_margin_px < 0.0 {
            return Err(ConfigError::Validation(format!(
                "scroll_margin_px must be >= 0, got {}",
                self.scroll_margin_px
            )));
        }
        if self.scroll_step_px <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "scroll_step_px must be > 0, got {}",
                self.scroll_step_px
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // ── Defaults ────────────────────────────────────────────────────

    #[test]
    fn default_values() {
        let c = EngineConfig::default();
        assert_eq!(c.drag_threshold_px, 30.0);
        assert_eq!(c.cell_update_debounce_ms, 16);
        assert_eq!(c.scroll_margin_px, 50.0);
        assert_eq!(c.scroll_step_px, 10.0);
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let c = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(c, EngineConfig::default());
    }

    // ── Parsing ─────────────────────────────────────────────────────

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let c = EngineConfig::from_toml_str("drag_threshold_px = 12.5").unwrap();
        assert_eq!(c.drag_threshold_px, 12.5);
        assert_eq!(c.cell_update_debounce_ms, 16);
    }

    #[test]
    fn full_toml_parses() {
        let input = r#"
            drag_threshold_px = 5.0
            cell_update_debounce_ms = 32
            scroll_margin_px = 80.0
            scroll_step_px = 25.0
        "#;
        let c = EngineConfig::from_toml_str(input).unwrap();
        assert_eq!(c.drag_threshold_px, 5.0);
        assert_eq!(c.cell_update_debounce_ms, 32);
        assert_eq!(c.scroll_margin_px, 80.0);
        assert_eq!(c.scroll_step_px, 25.0);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let c = EngineConfig::from_toml_str("future_option = true").unwrap();
        assert_eq!(c, EngineConfig::default());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = EngineConfig::from_toml_str("drag_threshold_px = = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    // ── Validation ──────────────────────────────────────────────────

    #[test]
    fn negative_threshold_rejected() {
        let err = EngineConfig::from_toml_str("drag_threshold_px = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn zero_scroll_step_rejected() {
        let err = EngineConfig::from_toml_str("scroll_step_px = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    // ── File loading ────────────────────────────────────────────────

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let c = EngineConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(c, EngineConfig::default());
    }

    #[test]
    fn load_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gridgrab.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "scroll_step_px = 4.0").unwrap();
        let c = EngineConfig::load(&path).unwrap();
        assert_eq!(c.scroll_step_px, 4.0);
    }
}
