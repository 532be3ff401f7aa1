use super::*;

#[test]
fn mark_is_check_then_set() {
    let mut doc = Document::new();
    let a = doc.create_element("div");
    let mut reg = ElementRegistry::default();
    assert!(!reg.has_processed(a));
    assert!(reg.mark_processed(a));
    assert!(!reg.mark_processed(a));
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.state(a), Some(ElementState::Registered));
}

#[test]
fn states_only_move_for_registered_elements() {
    let mut doc = Document::new();
    let a = doc.create_element("div");
    let b = doc.create_element("div");
    let mut reg = ElementRegistry::default();
    reg.mark_processed(a);
    reg.set_state(a, ElementState::AwaitingEngine);
    reg.set_state(b, ElementState::Done);
    assert_eq!(reg.in_state(ElementState::AwaitingEngine), vec![a]);
    assert_eq!(reg.state(b), None);
}

#[test]
fn disposed_nodes_do_not_alias_new_ones() {
    let mut doc = Document::new();
    let a = doc.create_element("div");
    let mut reg = ElementRegistry::default();
    reg.mark_processed(a);
    doc.dispose(a);
    let b = doc.create_element("div");
    assert_eq!(a.index(), b.index());
    assert!(!reg.has_processed(b));
    reg.prune(&doc);
    assert!(reg.is_empty());
}

#[test]
fn reset_clears_everything() {
    let mut doc = Document::new();
    let mut reg = ElementRegistry::default();
    for _ in 0..3 {
        let n = doc.create_element("p");
        reg.mark_processed(n);
    }
    reg.reset();
    assert!(reg.is_empty());
}
