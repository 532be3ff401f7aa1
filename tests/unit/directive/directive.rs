use super::*;

fn setup(attrs: &[(&str, &str)]) -> (Document, NodeId) {
    let mut doc = Document::new();
    let e = doc.create_element("div");
    for (k, v) in attrs {
        doc.set_attr(e, k, *v);
    }
    doc.append_child(doc.body(), e).unwrap();
    (doc, e)
}

#[test]
fn tier_is_derived_from_kind() {
    let css: Vec<_> = EffectKind::ALL
        .into_iter()
        .filter(|k| k.tier() == Tier::Css)
        .map(EffectKind::name)
        .collect();
    assert_eq!(
        css,
        vec![
            "fade-up",
            "fade-down",
            "fade-left",
            "fade-right",
            "fade-in",
            "scale-in",
            "reveal-up"
        ]
    );
    for k in EffectKind::ALL {
        assert_eq!(EffectKind::parse(k.name()), Some(k));
    }
}

#[test]
fn parallax_and_counter_are_never_prehidden() {
    assert!(!EffectKind::Parallax.hides_content());
    assert!(!EffectKind::Counter.hides_content());
    assert!(EffectKind::SplitWords.hides_content());
}

#[test]
fn read_applies_config_fallbacks() {
    let (doc, e) = setup(&[("data-animate", "fade-up")]);
    let res = AttrResolver::new("hm");
    let cfg = MotionConfig::default();
    let d = Directive::read(&doc, e, &res, &cfg).unwrap().unwrap();
    assert_eq!(d.kind, EffectKind::FadeUp);
    assert_eq!(d.tier(), Tier::Css);
    assert!(d.options.once);
    assert_eq!(d.options.duration, None);
    assert_eq!(d.options.scroll_start, "top 88%");
}

#[test]
fn read_takes_per_element_overrides() {
    let (doc, e) = setup(&[
        ("data-hm-animate", "img-reveal"),
        ("data-hm-duration", "1.2"),
        ("data-hm-ease", "power1.in"),
        ("data-once", "false"),
        ("data-reveal-direction", "top"),
    ]);
    let res = AttrResolver::new("hm");
    let d = Directive::read(&doc, e, &res, &MotionConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(d.kind, EffectKind::ImgReveal);
    assert_eq!(d.options.duration, Some(1.2));
    assert_eq!(d.options.ease.as_deref(), Some("power1.in"));
    assert!(!d.options.once);
    assert_eq!(d.options.direction, RevealDirection::Top);
}

#[test]
fn unknown_kinds_are_parse_errors() {
    let (doc, e) = setup(&[("data-animate", "wobble")]);
    let res = AttrResolver::new("hm");
    let err = Directive::read(&doc, e, &res, &MotionConfig::default()).unwrap_err();
    assert!(err.to_string().contains("wobble"));
}

#[test]
fn buttons_and_flags() {
    let (doc, e) = setup(&[
        ("data-btn", "magnetic"),
        ("data-magnetic-strength", "0.5"),
        ("data-motion", "essential"),
        ("data-w-id", "abc"),
    ]);
    let res = AttrResolver::new("hm");
    let b = ButtonDirective::read(&doc, e, &res).unwrap().unwrap();
    assert_eq!(b.kind, ButtonKind::Magnetic);
    assert_eq!(b.magnetic_strength, 0.5);
    assert!(is_essential(&doc, e, &res));
    assert!(has_foreign_binding(&doc, e));
}

#[test]
fn annotated_lists_effects_and_buttons_in_document_order() {
    let mut doc = Document::new();
    let a = doc.create_element("h1");
    doc.set_attr(a, "data-animate", "hero-text");
    let b = doc.create_element("a");
    doc.set_attr(b, "data-btn", "fill");
    let c = doc.create_element("p");
    doc.append_child(doc.body(), a).unwrap();
    doc.append_child(doc.body(), c).unwrap();
    doc.append_child(c, b).unwrap();
    let res = AttrResolver::new("hm");
    assert_eq!(annotated(&doc, &res), vec![a, b]);
}
