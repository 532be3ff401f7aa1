use super::*;

fn el(attrs: &[(&str, &str)]) -> (Document, NodeId) {
    let mut doc = Document::new();
    let e = doc.create_element("div");
    for (k, v) in attrs {
        doc.set_attr(e, k, *v);
    }
    doc.append_child(doc.body(), e).unwrap();
    (doc, e)
}

#[test]
fn coercion_rules() {
    assert_eq!(coerce("true"), AttrValue::Bool(true));
    assert_eq!(coerce("false"), AttrValue::Bool(false));
    assert_eq!(coerce("0.5"), AttrValue::Number(0.5));
    assert_eq!(coerce("-12"), AttrValue::Number(-12.0));
    assert_eq!(coerce("power2.out"), AttrValue::Text("power2.out".to_owned()));
    assert_eq!(coerce("12px"), AttrValue::Text("12px".to_owned()));
    assert_eq!(coerce("NaN"), AttrValue::Text("NaN".to_owned()));
    assert_eq!(coerce(""), AttrValue::Text(String::new()));
}

#[test]
fn absent_attribute_returns_fallback_uncoerced() {
    let (doc, e) = el(&[]);
    let r = AttrResolver::new("hm");
    let fb = AttrValue::Text("true".to_owned());
    assert_eq!(r.resolve(&doc, e, "once", fb.clone()), fb);
}

#[test]
fn namespaced_form_wins_over_bare() {
    let (doc, e) = el(&[("data-once", "true"), ("data-hm-once", "false")]);
    let r = AttrResolver::new("hm");
    assert!(!r.flag(&doc, e, "once", true));
}

#[test]
fn bare_form_is_accepted_for_non_tuning_options() {
    let (doc, e) = el(&[("data-stagger-selector", ".card")]);
    let r = AttrResolver::new("hm");
    assert_eq!(r.text(&doc, e, "stagger-selector").as_deref(), Some(".card"));
}

#[test]
fn tuning_options_ignore_bare_form() {
    let (doc, e) = el(&[("data-duration", "3"), ("data-delay", "1")]);
    let r = AttrResolver::new("hm");
    assert_eq!(r.number(&doc, e, "duration", 0.8), 0.8);
    assert_eq!(r.number_opt(&doc, e, "delay"), None);

    let (doc, e) = el(&[("data-hm-duration", "3")]);
    assert_eq!(r.number(&doc, e, "duration", 0.8), 3.0);
}

#[test]
fn malformed_numbers_fall_back() {
    let (doc, e) = el(&[("data-hm-distance", "40px")]);
    let r = AttrResolver::new("hm");
    assert_eq!(r.number(&doc, e, "distance", 40.0), 40.0);
}
