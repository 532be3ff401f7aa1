//! Declarative directives read off annotated elements.

pub(crate) mod attr;

use crate::config::MotionConfig;
use crate::dom::{Document, NodeId};
use crate::foundation::error::{MotionError, MotionResult};

pub use attr::{AttrResolver, AttrValue, TUNING_OPTIONS, coerce};

/// Attribute option naming the effect kind.
pub const EFFECT_OPTION: &str = "animate";
/// Attribute option naming the interactive behaviour.
pub const BUTTON_OPTION: &str = "btn";
/// Foreign interaction-binding attribute that may fight over the same properties.
pub const FOREIGN_BINDING_ATTR: &str = "data-w-id";

/// Backing technology that realizes a directive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Keyframe classes toggled by a visibility watcher; no engine needed.
    Css,
    /// Tweens and scroll triggers driven by the external engine.
    Engine,
}

/// Closed set of supported effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectKind {
    /// Fade while moving up.
    FadeUp,
    /// Fade while moving down.
    FadeDown,
    /// Fade while moving in from the left.
    FadeLeft,
    /// Fade while moving in from the right.
    FadeRight,
    /// Plain fade.
    FadeIn,
    /// Fade while scaling up.
    ScaleIn,
    /// Clip-path wipe from the bottom.
    RevealUp,
    /// Text split into rendered lines.
    SplitLines,
    /// Text split into words.
    SplitWords,
    /// Text split into characters.
    SplitChars,
    /// Image clip wipe with a scale settle.
    ImgReveal,
    /// Children fade up one after another.
    StaggerChildren,
    /// Numeric text counts up from zero.
    Counter,
    /// Stroke drawing of vector shapes.
    DrawLine,
    /// Scroll-scrubbed vertical drift.
    Parallax,
    /// Hero headline lines slide in on load.
    HeroText,
    /// Hero image fades and settles on load.
    HeroImage,
}

impl EffectKind {
    /// Every effect kind, CSS tier first.
    pub const ALL: [Self; 17] = [
        Self::FadeUp,
        Self::FadeDown,
        Self::FadeLeft,
        Self::FadeRight,
        Self::FadeIn,
        Self::ScaleIn,
        Self::RevealUp,
        Self::SplitLines,
        Self::SplitWords,
        Self::SplitChars,
        Self::ImgReveal,
        Self::StaggerChildren,
        Self::Counter,
        Self::DrawLine,
        Self::Parallax,
        Self::HeroText,
        Self::HeroImage,
    ];

    /// Attribute spelling.
    pub fn name(self) -> &'static str {
        match self {
            Self::FadeUp => "fade-up",
            Self::FadeDown => "fade-down",
            Self::FadeLeft => "fade-left",
            Self::FadeRight => "fade-right",
            Self::FadeIn => "fade-in",
            Self::ScaleIn => "scale-in",
            Self::RevealUp => "reveal-up",
            Self::SplitLines => "split-lines",
            Self::SplitWords => "split-words",
            Self::SplitChars => "split-chars",
            Self::ImgReveal => "img-reveal",
            Self::StaggerChildren => "stagger-children",
            Self::Counter => "counter",
            Self::DrawLine => "draw-line",
            Self::Parallax => "parallax",
            Self::HeroText => "hero-text",
            Self::HeroImage => "hero-image",
        }
    }

    /// Parse the attribute spelling.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == s.trim())
    }

    /// Tier is a pure function of the kind.
    pub fn tier(self) -> Tier {
        match self {
            Self::FadeUp
            | Self::FadeDown
            | Self::FadeLeft
            | Self::FadeRight
            | Self::FadeIn
            | Self::ScaleIn
            | Self::RevealUp => Tier::Css,
            Self::SplitLines
            | Self::SplitWords
            | Self::SplitChars
            | Self::ImgReveal
            | Self::StaggerChildren
            | Self::Counter
            | Self::DrawLine
            | Self::Parallax
            | Self::HeroText
            | Self::HeroImage => Tier::Engine,
        }
    }

    /// `false` for effects without a visibility transition, which are never pre-hidden.
    pub fn hides_content(self) -> bool {
        !matches!(self, Self::Parallax | Self::Counter)
    }
}

/// Interactive button behaviours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ButtonKind {
    /// Background layer sweeps in on hover.
    Fill,
    /// Button follows the pointer.
    Magnetic,
    /// Label slides out while a copy slides in.
    TextSlide,
}

impl ButtonKind {
    /// Attribute spelling.
    pub fn name(self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::Magnetic => "magnetic",
            Self::TextSlide => "text-slide",
        }
    }

    /// Parse the attribute spelling.
    pub fn parse(s: &str) -> Option<Self> {
        [Self::Fill, Self::Magnetic, Self::TextSlide]
            .into_iter()
            .find(|k| k.name() == s.trim())
    }
}

/// Edge an image wipe starts from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealDirection {
    /// Wipe from the left edge.
    #[default]
    Left,
    /// Wipe from the right edge.
    Right,
    /// Wipe from the top edge.
    Top,
    /// Wipe from the bottom edge.
    Bottom,
}

impl RevealDirection {
    /// Parse; unknown spellings map to [`RevealDirection::Bottom`].
    pub fn parse(s: &str) -> Self {
        match s {
            "left" => Self::Left,
            "right" => Self::Right,
            "top" => Self::Top,
            _ => Self::Bottom,
        }
    }
}

/// Per-element overrides. `None` tuning values defer to the effect table, then to the config.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DirectiveOptions {
    /// Tween duration in seconds.
    pub duration: Option<f64>,
    /// Start delay in seconds.
    pub delay: Option<f64>,
    /// Travel distance in pixels.
    pub distance: Option<f64>,
    /// Stagger between segments in seconds.
    pub stagger: Option<f64>,
    /// Engine ease name.
    pub ease: Option<String>,
    /// Play once instead of reversing on exit.
    pub once: bool,
    /// Custom child selector for staggered children.
    pub selector: Option<String>,
    /// Wipe direction for image reveals.
    pub direction: RevealDirection,
    /// Scroll-trigger start.
    pub scroll_start: String,
    /// Parallax speed factor.
    pub parallax_speed: f64,
    /// Run parallax on narrow viewports too.
    pub parallax_mobile: bool,
}

/// An effect declared on one element.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Directive {
    /// Declared effect.
    pub kind: EffectKind,
    /// Per-element options.
    pub options: DirectiveOptions,
}

impl Directive {
    /// Read the effect directive of `el`. `Ok(None)` when the element declares no effect.
    pub fn read(
        doc: &Document,
        el: NodeId,
        res: &AttrResolver,
        cfg: &MotionConfig,
    ) -> MotionResult<Option<Self>> {
        let Some(raw) = res.raw(doc, el, EFFECT_OPTION) else {
            return Ok(None);
        };
        let kind = EffectKind::parse(raw)
            .ok_or_else(|| MotionError::parse(format!("unknown effect kind '{raw}'")))?;
        let options = DirectiveOptions {
            duration: res.number_opt(doc, el, "duration"),
            delay: res.number_opt(doc, el, "delay"),
            distance: res.number_opt(doc, el, "distance"),
            stagger: res.number_opt(doc, el, "stagger"),
            ease: res.text(doc, el, "ease"),
            once: res.flag(doc, el, "once", cfg.once),
            selector: res.text(doc, el, "stagger-selector"),
            direction: res
                .text(doc, el, "reveal-direction")
                .map_or(RevealDirection::Left, |d| RevealDirection::parse(&d)),
            scroll_start: res
                .text(doc, el, "scroll-start")
                .unwrap_or_else(|| cfg.scroll_start.clone()),
            parallax_speed: res.number(doc, el, "parallax-speed", cfg.parallax_speed),
            parallax_mobile: res.has(doc, el, "parallax-mobile"),
        };
        Ok(Some(Self { kind, options }))
    }

    /// Tier of the declared kind.
    pub fn tier(&self) -> Tier {
        self.kind.tier()
    }
}

/// An interactive behaviour declared on one element.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ButtonDirective {
    /// Declared behaviour.
    pub kind: ButtonKind,
    /// Fill layer colour; `None` uses a faint `currentColor`.
    pub fill_color: Option<String>,
    /// Pointer-follow factor for magnetic buttons.
    pub magnetic_strength: f64,
}

impl ButtonDirective {
    /// Read the button directive of `el`. `Ok(None)` when the element declares none.
    pub fn read(doc: &Document, el: NodeId, res: &AttrResolver) -> MotionResult<Option<Self>> {
        let Some(raw) = res.raw(doc, el, BUTTON_OPTION) else {
            return Ok(None);
        };
        let kind = ButtonKind::parse(raw)
            .ok_or_else(|| MotionError::parse(format!("unknown button behaviour '{raw}'")))?;
        Ok(Some(Self {
            kind,
            fill_color: res.text(doc, el, "fill-color"),
            magnetic_strength: res.number(doc, el, "magnetic-strength", 0.3),
        }))
    }
}

/// `true` when the element opted in to motion under a reduced-motion preference.
pub fn is_essential(doc: &Document, el: NodeId, res: &AttrResolver) -> bool {
    res.raw(doc, el, "motion") == Some("essential")
}

/// `true` when the element also carries a foreign interaction binding.
pub fn has_foreign_binding(doc: &Document, el: NodeId) -> bool {
    doc.attr(el, FOREIGN_BINDING_ATTR)
        .is_some_and(|v| !v.is_empty())
}

/// Kind declared on `el`, ignoring unknown spellings.
pub fn effect_kind(doc: &Document, el: NodeId, res: &AttrResolver) -> Option<EffectKind> {
    res.raw(doc, el, EFFECT_OPTION).and_then(EffectKind::parse)
}

/// Every element under the document root carrying an effect or button attribute, in document
/// order.
pub fn annotated(doc: &Document, res: &AttrResolver) -> Vec<NodeId> {
    doc.descendants(doc.root())
        .into_iter()
        .filter(|n| res.has(doc, *n, EFFECT_OPTION) || res.has(doc, *n, BUTTON_OPTION))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/directive/directive.rs"]
mod tests;
