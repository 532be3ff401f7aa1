use super::*;

const PAGE: &str = r#"{
  "viewport": { "width": 1024, "height": 768 },
  "media": { "reduced_motion": true },
  "head": [ { "tag": "title", "children": ["Demo"] } ],
  "body": [
    { "tag": "section", "attrs": { "class": "hero dark", "id": "top" },
      "frame": { "x": 0, "y": 0, "width": 1024, "height": 600 },
      "children": [
        { "tag": "h1", "attrs": { "data-animate": "hero-text" },
          "frame": { "x": 40, "y": 100, "width": 400, "height": 120 },
          "children": ["Hello ", { "tag": "em", "children": ["world"] }] }
      ] }
  ]
}"#;

#[test]
fn fixture_builds_the_tree() {
    let def = PageDef::from_reader(PAGE.as_bytes()).unwrap();
    let page = def.build().unwrap();
    assert!(page.prefs().reduced_motion);
    assert_eq!(page.viewport().width, 1024.0);

    let doc = page.doc();
    let section = doc.element_children(doc.body())[0];
    assert_eq!(doc.tag(section), Some("section"));
    assert!(doc.has_class(section, "hero"));
    assert!(doc.has_class(section, "dark"));
    assert_eq!(doc.attr(section, "id"), Some("top"));
    assert_eq!(doc.attr(section, "class"), None);

    let h1 = doc.element_children(section)[0];
    assert_eq!(doc.attr(h1, "data-animate"), Some("hero-text"));
    assert_eq!(doc.text_content(h1), "Hello world");
    assert_eq!(doc.frame(h1), Some(Rect::new(40.0, 100.0, 440.0, 220.0)));
    assert_eq!(doc.text_content(doc.head()), "Demo");
}

#[test]
fn invalid_fixtures_are_rejected() {
    let zero = r#"{ "viewport": { "width": 0, "height": 10 } }"#;
    assert!(PageDef::from_reader(zero.as_bytes()).is_err());

    let unknown = r#"{ "bogus": 1 }"#;
    assert!(PageDef::from_reader(unknown.as_bytes()).is_err());

    let neg = r#"{ "body": [ { "tag": "div", "frame": { "x": 0, "y": 0, "width": -1, "height": 1 } } ] }"#;
    assert!(PageDef::from_reader(neg.as_bytes()).is_err());
}

#[test]
fn empty_fixture_uses_defaults() {
    let def = PageDef::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(def.viewport, Viewport::default());
    assert_eq!(def.layout, LayoutDef::default());
    assert!(def.build().is_ok());
}
