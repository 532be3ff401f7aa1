use super::*;
use futures::StreamExt as _;

#[test]
fn scroll_and_resize_publish_viewports() {
    let page = Page::new(Document::new(), Viewport::new(1000.0, 800.0));
    let (id, mut rx) = page.subscribe_viewport();
    page.scroll_to(400.0);
    page.scroll_to(-5.0);
    page.resize(375.0, 667.0);
    let seen: Vec<Viewport> = futures::executor::block_on(async {
        let mut v = Vec::new();
        for _ in 0..3 {
            v.extend(rx.next().await);
        }
        v
    });
    assert_eq!(seen[0].scroll_y, 400.0);
    assert_eq!(seen[1].scroll_y, 0.0);
    assert_eq!((seen[2].width, seen[2].height), (375.0, 667.0));
    assert_eq!(page.viewport().width, 375.0);

    page.unsubscribe(id);
    assert_eq!(page.subscription_count(), 0);
    assert_eq!(futures::executor::block_on(rx.next()), None);
}

#[test]
fn reduced_motion_events_update_prefs() {
    let page = Page::new(Document::new(), Viewport::default());
    let (_, mut rx) = page.subscribe_events();
    assert!(!page.prefs().reduced_motion);
    page.set_reduced_motion(true);
    assert!(page.prefs().reduced_motion);
    let root = page.doc().root();
    let got = futures::executor::block_on(rx.next());
    assert_eq!(got, Some((root, Event::ReducedMotionChange(true))));
    assert_eq!(Event::ReducedMotionChange(true).kind(), EventKind::ReducedMotionChange);
}

#[test]
fn rect_uses_the_layout() {
    let mut doc = Document::new();
    let div = doc.create_element("div");
    doc.set_frame(div, Some(Rect::new(0.0, 50.0, 100.0, 90.0)));
    doc.append_child(doc.body(), div).unwrap();
    let page = Page::new(doc, Viewport::default());
    assert_eq!(page.rect(div), Rect::new(0.0, 50.0, 100.0, 90.0));
}
