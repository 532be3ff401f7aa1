use super::*;

fn doc_with_item() -> (Document, NodeId) {
    let mut doc = Document::new();
    let li = doc.create_element("li");
    doc.set_attr(li, "id", "first");
    doc.set_attr(li, "data-kind", "card");
    doc.add_class(li, "item");
    doc.append_child(doc.body(), li).unwrap();
    (doc, li)
}

#[test]
fn compound_parts_must_all_match() {
    let (doc, li) = doc_with_item();
    assert!(Selector::parse("li.item").unwrap().matches(&doc, li));
    assert!(Selector::parse("#first").unwrap().matches(&doc, li));
    assert!(Selector::parse("[data-kind=card]").unwrap().matches(&doc, li));
    assert!(Selector::parse("[data-kind='card']").unwrap().matches(&doc, li));
    assert!(Selector::parse("*[data-kind]").unwrap().matches(&doc, li));
    assert!(!Selector::parse("li.other").unwrap().matches(&doc, li));
    assert!(!Selector::parse("[data-kind=list]").unwrap().matches(&doc, li));
}

#[test]
fn comma_lists_match_any_alternative() {
    let (doc, li) = doc_with_item();
    let sel = Selector::parse("p, .item").unwrap();
    assert!(sel.matches(&doc, li));
    assert!(!sel.matches(&doc, doc.body()));
}

#[test]
fn text_nodes_never_match() {
    let (mut doc, li) = doc_with_item();
    let t = doc.create_text("x");
    doc.append_child(li, t).unwrap();
    assert!(!Selector::parse("*").unwrap().matches(&doc, t));
}

#[test]
fn rejects_combinators_and_garbage() {
    assert!(Selector::parse("ul li").is_err());
    assert!(Selector::parse("li >").is_err());
    assert!(Selector::parse("[open").is_err());
    assert!(Selector::parse("a,,b").is_err());
    assert!(Selector::parse(".").is_err());
}
