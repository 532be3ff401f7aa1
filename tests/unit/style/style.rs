use super::*;

fn annotated(doc: &mut Document, kind: &str) -> NodeId {
    let el = doc.create_element("div");
    doc.set_attr(el, "data-animate", kind);
    doc.append_child(doc.body(), el).unwrap();
    el
}

#[test]
fn safety_css_spares_parallax_and_counter() {
    let css = safety_css(&AttrResolver::new("hm"));
    assert!(css.contains(".hm-loading [data-hm-animate]:not([data-hm-animate='parallax'])"));
    assert!(css.contains(":not([data-animate='counter'])"));
    assert!(css.contains("clip-path: none !important;"));
}

#[test]
fn css_tier_sheet_covers_every_css_kind() {
    let cfg = MotionConfig::default();
    let css = css_tier_css(&cfg, &AttrResolver::new("hm"));
    for kind in EffectKind::ALL {
        let has = css.contains(&format!("@keyframes hm-{} ", kind.name()));
        assert_eq!(has, kind.tier() == Tier::Css, "{}", kind.name());
    }
    assert!(css.contains("var(--hm-dist, 40px)"));
    assert!(css.contains("cubic-bezier(0.33, 1, 0.68, 1)"));
}

#[test]
fn inject_is_idempotent_and_removable() {
    let mut doc = Document::new();
    let a = inject(&mut doc, SAFETY_STYLE_ID, "x{}").unwrap();
    let b = inject(&mut doc, SAFETY_STYLE_ID, "y{}").unwrap();
    assert_eq!(a, b);
    inject(&mut doc, CSS_TIER_STYLE_ID, "z{}").unwrap();
    assert_eq!(doc.element_children(doc.head()).len(), 2);
    remove_injected(&mut doc);
    assert!(doc.element_children(doc.head()).is_empty());
    assert!(!doc.contains(a));
}

#[test]
fn loading_hides_everything_but_motion_only_kinds() {
    let cfg = MotionConfig::default();
    let mut doc = Document::new();
    let fade = annotated(&mut doc, "fade-up");
    let counter = annotated(&mut doc, "counter");
    let bogus = annotated(&mut doc, "wobble");
    let root = doc.root();
    doc.add_class(root, LOADING);
    assert_eq!(computed_visual(&doc, fade, &cfg).opacity, 0.0);
    assert_eq!(computed_visual(&doc, counter, &cfg).opacity, 1.0);
    assert_eq!(computed_visual(&doc, bogus, &cfg).opacity, 0.0);
    doc.remove_class(root, LOADING);
    assert!(computed_visual(&doc, fade, &cfg).is_fully_visible());
}

#[test]
fn armed_elements_sit_at_their_keyframe_start() {
    let cfg = MotionConfig::default();
    let mut doc = Document::new();
    let up = annotated(&mut doc, "fade-up");
    let reveal = annotated(&mut doc, "reveal-up");
    doc.add_class(up, ARMED);
    doc.add_class(reveal, ARMED);
    doc.set_style(up, "--hm-dist", "60px");

    let v = computed_visual(&doc, up, &cfg);
    assert_eq!(v.opacity, 0.0);
    assert_eq!(v.transform.as_deref(), Some("translateY(60px)"));
    let v = computed_visual(&doc, reveal, &cfg);
    assert_eq!(v.opacity, 1.0);
    assert_eq!(v.clip_path.as_deref(), Some("inset(100% 0% 0% 0%)"));

    doc.remove_class(up, ARMED);
    doc.add_class(up, ENTERED);
    let v = computed_visual(&doc, up, &cfg);
    assert!(v.is_fully_visible());
    assert_eq!(v.animation.as_deref(), Some("hm-fade-up"));
}

#[test]
fn fallback_beats_inline_styles_inside_annotated_subtrees() {
    let cfg = MotionConfig::default();
    let mut doc = Document::new();
    let el = annotated(&mut doc, "split-words");
    let word = doc.create_element("span");
    doc.append_child(el, word).unwrap();
    let outside = doc.create_element("p");
    doc.append_child(doc.body(), outside).unwrap();
    for n in [el, word, outside] {
        doc.set_style(n, "opacity", "0");
        doc.set_style(n, "transform", "translate(0px, 20px)");
    }
    doc.add_class(doc.root(), FALLBACK);
    assert!(computed_visual(&doc, el, &cfg).is_fully_visible());
    assert!(computed_visual(&doc, word, &cfg).is_fully_visible());
    assert!(!computed_visual(&doc, outside, &cfg).is_fully_visible());
}

#[test]
fn zero_insets_clip_nothing() {
    let cfg = MotionConfig::default();
    let mut doc = Document::new();
    let el = annotated(&mut doc, "img-reveal");
    doc.set_style(el, "clip-path", "inset(0 0% 0 0)");
    assert_eq!(computed_visual(&doc, el, &cfg).clip_path, None);
    doc.set_style(el, "clip-path", "inset(0 100% 0 0)");
    assert!(computed_visual(&doc, el, &cfg).clip_path.is_some());
}
