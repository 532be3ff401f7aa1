use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::foundation::core::Margin;
use crate::foundation::error::{MotionError, MotionResult};

/// Global tuning and timing defaults.
///
/// Every field has a default, so a JSON document only needs the keys it overrides. Per-element
/// attributes take precedence over these values.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionConfig {
    /// Default tween duration in seconds.
    pub duration: f64,
    /// Default engine ease name.
    pub ease: String,
    /// Timing function used by the CSS tier.
    pub css_ease: String,
    /// Default travel distance of directional fades, in pixels.
    pub distance: f64,
    /// Default stagger between segments or children, in seconds.
    pub stagger: f64,
    /// Default start delay in seconds.
    pub delay: f64,
    /// Default scroll-trigger start (`"<element edge> <viewport edge>"`).
    pub scroll_start: String,
    /// Root margin of the CSS-tier visibility watcher.
    pub observer_margin: String,
    /// Minimum visible fraction before a CSS-tier element counts as entered.
    pub observer_threshold: f64,
    /// Play entrances once instead of reversing on exit.
    pub once: bool,
    /// Default parallax speed factor.
    pub parallax_speed: f64,
    /// Parallax is skipped below this viewport width unless the element opts in.
    pub parallax_min_width: f64,
    /// Safety-net timeout in milliseconds.
    pub fallback_timeout_ms: u64,
    /// Base URL the engine scripts are fetched from.
    pub engine_base_url: String,
    /// Engine core script file name.
    pub engine_core_file: String,
    /// Scroll-trigger extension script file name.
    pub engine_extension_file: String,
    /// Quiet period before inserted content is scanned, in milliseconds.
    pub mutation_debounce_ms: u64,
    /// Maximum top-edge difference, in pixels, for two words to share a line.
    pub line_tolerance_px: f64,
    /// Engine-tier elements dispatched per animation frame during startup.
    pub dispatch_batch_size: usize,
    /// Attribute namespace; `"hm"` reads `data-hm-*` ahead of `data-*`.
    pub attribute_namespace: String,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            duration: 0.8,
            ease: "power3.out".to_owned(),
            css_ease: "cubic-bezier(0.33, 1, 0.68, 1)".to_owned(),
            distance: 40.0,
            stagger: 0.08,
            delay: 0.0,
            scroll_start: "top 88%".to_owned(),
            observer_margin: "0px 0px 8% 0px".to_owned(),
            observer_threshold: 0.1,
            once: true,
            parallax_speed: 0.2,
            parallax_min_width: 768.0,
            fallback_timeout_ms: 4000,
            engine_base_url: "https://cdnjs.cloudflare.com/ajax/libs/gsap/3.12.5".to_owned(),
            engine_core_file: "gsap.min.js".to_owned(),
            engine_extension_file: "ScrollTrigger.min.js".to_owned(),
            mutation_debounce_ms: 200,
            line_tolerance_px: 4.0,
            dispatch_batch_size: 8,
            attribute_namespace: "hm".to_owned(),
        }
    }
}

impl MotionConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> MotionResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| MotionError::validation(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> MotionResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            MotionError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check value ranges that the rest of the engine relies on.
    pub fn validate(&self) -> MotionResult<()> {
        for (name, v) in [
            ("duration", self.duration),
            ("distance", self.distance),
            ("stagger", self.stagger),
            ("delay", self.delay),
            ("parallax_min_width", self.parallax_min_width),
            ("line_tolerance_px", self.line_tolerance_px),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(MotionError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.observer_threshold) {
            return Err(MotionError::validation(
                "observer_threshold must be within [0, 1]",
            ));
        }
        if self.fallback_timeout_ms == 0 {
            return Err(MotionError::validation("fallback_timeout_ms must be > 0"));
        }
        if self.dispatch_batch_size == 0 {
            return Err(MotionError::validation("dispatch_batch_size must be > 0"));
        }
        if self.attribute_namespace.is_empty()
            || !self
                .attribute_namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(MotionError::validation(
                "attribute_namespace must be non-empty and alphanumeric",
            ));
        }
        self.margin()?;
        Ok(())
    }

    /// Parsed [`Self::observer_margin`].
    pub fn margin(&self) -> MotionResult<Margin> {
        Margin::parse(&self.observer_margin)
    }

    /// Safety-net timeout.
    pub fn fallback_timeout(&self) -> Duration {
        Duration::from_millis(self.fallback_timeout_ms)
    }

    /// Mutation debounce window.
    pub fn mutation_debounce(&self) -> Duration {
        Duration::from_millis(self.mutation_debounce_ms)
    }

    /// Full URL of the engine core script.
    pub fn engine_core_url(&self) -> String {
        format!(
            "{}/{}",
            self.engine_base_url.trim_end_matches('/'),
            self.engine_core_file
        )
    }

    /// Full URL of the scroll-trigger extension script.
    pub fn engine_extension_url(&self) -> String {
        format!(
            "{}/{}",
            self.engine_base_url.trim_end_matches('/'),
            self.engine_extension_file
        )
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
