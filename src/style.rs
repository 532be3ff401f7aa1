//! State classes, injected style sheets and the computed visual state they produce.
//!
//! The orchestrator never writes keyframes into elements. It toggles classes on the root and on
//! annotated elements, and the two injected sheets decide what that looks like. [`computed_visual`]
//! resolves the same cascade for a headless host.

use crate::config::MotionConfig;
use crate::directive::{AttrResolver, Directive, EFFECT_OPTION, EffectKind, Tier};
use crate::dom::{Document, NodeId};
use crate::engine::css_number;
use crate::foundation::error::MotionResult;

/// Root class while annotated content is pre-hidden.
pub const LOADING: &str = "hm-loading";
/// Root class once initialization finished.
pub const READY: &str = "hm-ready";
/// Root class forcing every annotated element visible.
pub const FALLBACK: &str = "hm-fallback";
/// CSS-tier element waiting below the fold.
pub const ARMED: &str = "hm-armed";
/// CSS-tier element whose entrance keyframes are playing.
pub const ENTERED: &str = "hm-in";
/// CSS-tier element that was already on screen at admission.
pub const VISIBLE: &str = "hm-visible";

/// Id of the pre-hide and fallback sheet.
pub const SAFETY_STYLE_ID: &str = "hm-safety-css";
/// Id of the CSS-tier keyframe sheet.
pub const CSS_TIER_STYLE_ID: &str = "hm-css-animations";

/// Effect attribute names accepted by `res`, namespaced first.
fn effect_attrs(res: &AttrResolver) -> [String; 2] {
    [res.namespaced(EFFECT_OPTION), format!("data-{EFFECT_OPTION}")]
}

fn selectors(res: &AttrResolver, f: impl Fn(&str) -> String) -> String {
    effect_attrs(res)
        .iter()
        .map(|a| f(a))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pre-hide and fallback rules.
pub fn safety_css(res: &AttrResolver) -> String {
    let hide = selectors(res, |a| {
        format!(
            ".{LOADING} [{a}]:not([{a}='{}']):not([{a}='{}'])",
            EffectKind::Parallax.name(),
            EffectKind::Counter.name()
        )
    });
    let reveal = selectors(res, |a| format!(".{FALLBACK} [{a}], .{FALLBACK} [{a}] *"));
    format!(
        "{hide} {{\n  opacity: 0; }}\n{reveal} {{\n  opacity: 1 !important;\n  transform: none !important;\n  clip-path: none !important; }}\n"
    )
}

/// Start transform of a CSS-tier keyframe, using `dist` as the travel distance.
fn from_transform(kind: EffectKind, dist: &str) -> Option<String> {
    match kind {
        EffectKind::FadeUp => Some(format!("translateY({dist})")),
        EffectKind::FadeDown => Some(format!("translateY(calc({dist} * -1))")),
        EffectKind::FadeLeft => Some(format!("translateX(calc({dist} * -1))")),
        EffectKind::FadeRight => Some(format!("translateX({dist})")),
        EffectKind::ScaleIn => Some("scale(0.9)".to_owned()),
        _ => None,
    }
}

const REVEAL_CLIP_FROM: &str = "inset(100% 0% 0% 0%)";

/// Keyframes, armed and entered rules for every CSS-tier kind.
pub fn css_tier_css(cfg: &MotionConfig, res: &AttrResolver) -> String {
    let dist = format!("var(--hm-dist, {}px)", css_number(cfg.distance));
    let dur = format!("var(--hm-dur, {}s)", css_number(cfg.duration));
    let del = "var(--hm-del, 0s)";
    let mut out = String::new();
    for kind in EffectKind::ALL.into_iter().filter(|k| k.tier() == Tier::Css) {
        let name = kind.name();
        let (from, to) = if kind == EffectKind::RevealUp {
            (
                format!("clip-path: {REVEAL_CLIP_FROM};"),
                "clip-path: inset(0% 0% 0% 0%);".to_owned(),
            )
        } else {
            match from_transform(kind, &dist) {
                Some(t) => (
                    format!("opacity: 0; transform: {t};"),
                    "opacity: 1; transform: none;".to_owned(),
                ),
                None => ("opacity: 0;".to_owned(), "opacity: 1;".to_owned()),
            }
        };
        out.push_str(&format!(
            "@keyframes hm-{name} {{\n  from {{ {from} }}\n  to {{ {to} }} }}\n"
        ));
        let armed = selectors(res, |a| format!(".{ARMED}[{a}='{name}']"));
        out.push_str(&format!("{armed} {{ {from} }}\n"));
        let entered = selectors(res, |a| format!(".{ENTERED}[{a}='{name}']"));
        let timing = if kind == EffectKind::RevealUp {
            "var(--hm-dur, 1s) cubic-bezier(0.76, 0, 0.24, 1)".to_owned()
        } else {
            format!("{dur} var(--hm-ease, {})", cfg.css_ease)
        };
        out.push_str(&format!(
            "{entered} {{\n  animation: hm-{name} {timing} {del} both; }}\n"
        ));
    }
    let unessential = selectors(res, |a| format!("[{a}]:not([data-motion='essential'])"));
    out.push_str(&format!(
        "@media (prefers-reduced-motion: reduce) {{\n  {unessential} {{\n    animation-duration: 0.01ms !important;\n    transition-duration: 0.01ms !important; }} }}\n"
    ));
    out
}

/// Copy per-element tuning into the custom properties the CSS tier reads.
pub fn apply_css_overrides(doc: &mut Document, el: NodeId, directive: &Directive) {
    let o = &directive.options;
    if let Some(d) = o.duration {
        doc.set_style(el, "--hm-dur", format!("{}s", css_number(d)));
    }
    if let Some(d) = o.delay {
        doc.set_style(el, "--hm-del", format!("{}s", css_number(d)));
    }
    if let Some(d) = o.distance {
        doc.set_style(el, "--hm-dist", format!("{}px", css_number(d)));
    }
}

/// Append a `<style id=...>` to `head` unless one with that id exists.
pub fn inject(doc: &mut Document, id: &str, css: &str) -> MotionResult<NodeId> {
    let head = doc.head();
    if let Some(existing) = doc
        .element_children(head)
        .into_iter()
        .find(|n| doc.tag(*n) == Some("style") && doc.attr(*n, "id") == Some(id))
    {
        return Ok(existing);
    }
    let style = doc.create_element("style");
    doc.set_attr(style, "id", id);
    let text = doc.create_text(css);
    doc.append_child(style, text)?;
    doc.append_child(head, style)?;
    Ok(style)
}

/// Remove and free both injected sheets.
pub fn remove_injected(doc: &mut Document) {
    let head = doc.head();
    let injected: Vec<NodeId> = doc
        .element_children(head)
        .into_iter()
        .filter(|n| {
            doc.tag(*n) == Some("style")
                && matches!(doc.attr(*n, "id"), Some(SAFETY_STYLE_ID | CSS_TIER_STYLE_ID))
        })
        .collect();
    for n in injected {
        doc.dispose(n);
    }
}

/// Resolved visual state of one element.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Visual {
    /// Effective opacity.
    pub opacity: f64,
    /// Effective transform; `None` is the identity.
    pub transform: Option<String>,
    /// Effective clip-path; `None` clips nothing.
    pub clip_path: Option<String>,
    /// Keyframe animation currently attached.
    pub animation: Option<String>,
}

impl Visual {
    /// Full opacity with no transform or clip.
    pub fn is_fully_visible(&self) -> bool {
        self.opacity >= 1.0 && self.transform.is_none() && self.clip_path.is_none()
    }
}

fn none_is_absent(v: Option<&str>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty() && s.trim() != "none")
        .map(str::to_owned)
}

/// `inset(...)` with every offset zero clips nothing.
fn is_empty_inset(clip: &str) -> bool {
    let Some(inner) = clip
        .trim()
        .strip_prefix("inset(")
        .and_then(|r| r.strip_suffix(')'))
    else {
        return false;
    };
    inner.split_whitespace().all(|tok| {
        tok.trim_end_matches('%')
            .trim_end_matches("px")
            .parse::<f64>()
            .is_ok_and(|v| v == 0.0)
    })
}

/// Resolve the cascade the injected sheets and inline styles produce for `el`.
///
/// Keyframe animations are reported at their end state.
pub fn computed_visual(doc: &Document, el: NodeId, cfg: &MotionConfig) -> Visual {
    let res = &AttrResolver::new(cfg.attribute_namespace.as_str());
    let root = doc.root();
    let mut v = Visual {
        opacity: 1.0,
        transform: None,
        clip_path: None,
        animation: None,
    };
    let raw_kind = res.raw(doc, el, EFFECT_OPTION);
    let kind = raw_kind.and_then(EffectKind::parse);

    if doc.has_class(root, LOADING) && raw_kind.is_some() && kind.is_none_or(|k| k.hides_content())
    {
        v.opacity = 0.0;
    }

    if let Some(k) = kind.filter(|k| k.tier() == Tier::Css) {
        if doc.has_class(el, ARMED) {
            if k == EffectKind::RevealUp {
                v.clip_path = Some(REVEAL_CLIP_FROM.to_owned());
            } else {
                v.opacity = 0.0;
                let dist = doc.style(el, "--hm-dist").map_or_else(
                    || {
                        let d = res.number(doc, el, "distance", cfg.distance);
                        format!("{}px", css_number(d))
                    },
                    str::to_owned,
                );
                v.transform = from_transform(k, &dist);
            }
        } else if doc.has_class(el, ENTERED) {
            // Running keyframes win over the pre-hide rule.
            v.opacity = 1.0;
            v.animation = Some(format!("hm-{}", k.name()));
        }
    }

    if let Some(o) = doc.style(el, "opacity").and_then(|o| o.trim().parse::<f64>().ok()) {
        v.opacity = o;
    }
    if let Some(t) = doc.style(el, "transform") {
        v.transform = none_is_absent(Some(t));
    }
    if let Some(c) = doc.style(el, "clip-path") {
        v.clip_path = none_is_absent(Some(c)).filter(|c| !is_empty_inset(c));
    }

    if doc.has_class(root, FALLBACK) && within_annotated(doc, el, res) {
        v.opacity = 1.0;
        v.transform = None;
        v.clip_path = None;
    }
    v
}

fn within_annotated(doc: &Document, el: NodeId, res: &AttrResolver) -> bool {
    let mut cur = Some(el);
    while let Some(n) = cur {
        if res.has(doc, n, EFFECT_OPTION) {
            return true;
        }
        cur = doc.parent(n);
    }
    false
}

#[cfg(test)]
#[path = "../tests/unit/style/style.rs"]
mod tests;
