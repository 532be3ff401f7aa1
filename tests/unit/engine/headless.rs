use super::*;
use crate::effects::counter::CounterFormat;
use crate::engine::{Position, Timing, Tween};

fn fixture() -> (Document, NodeId) {
    let mut doc = Document::new();
    let el = doc.create_element("div");
    doc.append_child(doc.body(), el).unwrap();
    (doc, el)
}

fn from(targets: Vec<NodeId>, props: VisualProps) -> Tween {
    Tween {
        targets,
        kind: TweenKind::From(props),
        timing: Timing::new(0.8, "power3.out"),
        position: Position::Append,
    }
}

#[test]
fn extension_cannot_register_before_core() {
    let mut engine = HeadlessEngine::new();
    assert!(engine.register_extension().is_err());
    engine.install_core();
    engine.install_extension();
    engine.register_extension().unwrap();
    assert!(engine.is_registered());
    assert_eq!(engine.calls(), &[EngineCall::Register]);
}

#[test]
fn from_tween_renders_start_state_then_settles_to_prior_values() {
    let (mut doc, el) = fixture();
    let mut engine = HeadlessEngine::preloaded();
    let props = VisualProps {
        opacity: Some(0.0),
        y: Some(Length::Px(40.0)),
        ..VisualProps::default()
    };
    let h = engine.animate(&mut doc, AnimationSpec::tween(from(vec![el], props)));
    assert_eq!(doc.style(el, "opacity"), Some("0"));
    assert_eq!(doc.style(el, "transform"), Some("translate(0px, 40px)"));

    assert_eq!(engine.settle(&mut doc, |_, _| true), 1);
    assert_eq!(doc.style(el, "opacity"), Some("1"));
    assert_eq!(doc.style(el, "transform"), None);
    assert!(engine.animation(h).is_some());
    assert_eq!(engine.settle(&mut doc, |_, _| true), 0);
}

#[test]
fn triggered_animations_wait_for_their_trigger() {
    let (mut doc, el) = fixture();
    let mut engine = HeadlessEngine::preloaded();
    let spec = AnimationSpec::tween(from(vec![el], VisualProps::hidden()))
        .with_trigger(ScrollTrigger::new(el, "top 88%", true));
    let h = engine.animate(&mut doc, spec);
    assert_eq!(engine.active_triggers(), vec![h]);
    assert_eq!(engine.settle(&mut doc, |_, _| false), 0);
    assert_eq!(doc.style(el, "opacity"), Some("0"));
    assert_eq!(engine.settle(&mut doc, |_, t| t.trigger == el), 1);
    assert_eq!(doc.style(el, "opacity"), Some("1"));
}

#[test]
fn timeline_steps_chain_from_instant_state() {
    let (mut doc, el) = fixture();
    let mut engine = HeadlessEngine::preloaded();
    engine.set(
        &mut doc,
        &[el],
        &VisualProps {
            clip_path: Some("inset(0 100% 0 0)".to_owned()),
            scale: Some(1.15),
            ..VisualProps::default()
        },
    );
    assert_eq!(doc.style(el, "transform"), Some("scale(1.15)"));
    let wipe = Tween {
        targets: vec![el],
        kind: TweenKind::To(VisualProps {
            clip_path: Some("inset(0 0% 0 0)".to_owned()),
            ..VisualProps::default()
        }),
        timing: Timing::new(1.0, "power4.inOut"),
        position: Position::Append,
    };
    let scale = Tween {
        targets: vec![el],
        kind: TweenKind::To(VisualProps {
            scale: Some(1.0),
            ..VisualProps::default()
        }),
        timing: Timing::new(1.2, "power2.out"),
        position: Position::WithPrevious(0.3),
    };
    engine.animate(&mut doc, AnimationSpec::timeline(vec![wipe, scale]));
    engine.settle(&mut doc, |_, _| true);
    assert_eq!(doc.style(el, "clip-path"), Some("inset(0 0% 0 0)"));
    assert_eq!(doc.style(el, "transform"), None);
}

#[test]
fn counter_tween_writes_final_text() {
    let (mut doc, el) = fixture();
    doc.set_text_content(el, "$0 total").unwrap();
    let mut engine = HeadlessEngine::preloaded();
    let format = CounterFormat::parse("$1,234.50 total").unwrap();
    engine.animate(
        &mut doc,
        AnimationSpec::tween(Tween {
            targets: vec![el],
            kind: TweenKind::Count(format),
            timing: Timing::new(2.0, "power2.out"),
            position: Position::Append,
        }),
    );
    assert_eq!(doc.text_content(el), "$0 total");
    engine.settle(&mut doc, |_, _| true);
    assert_eq!(doc.text_content(el), "$1,234.50 total");
}

#[test]
fn kill_all_drops_every_handle() {
    let (mut doc, el) = fixture();
    let mut engine = HeadlessEngine::preloaded();
    let a = engine.animate(&mut doc, AnimationSpec::tween(from(vec![el], VisualProps::hidden())));
    engine.animate(
        &mut doc,
        AnimationSpec::tween(from(vec![el], VisualProps::hidden()))
            .with_trigger(ScrollTrigger::new(el, "top 88%", false)),
    );
    assert_eq!(engine.animations_of(el).len(), 2);
    engine.kill(a);
    engine.kill(a);
    assert_eq!(engine.live_count(), 1);
    engine.kill_all();
    assert_eq!(engine.live_count(), 0);
    assert!(engine.active_triggers().is_empty());
    assert_eq!(
        engine
            .calls()
            .iter()
            .filter(|c| matches!(c, EngineCall::Kill(_)))
            .count(),
        1
    );
}

#[test]
fn refresh_is_recorded() {
    let (doc, _) = fixture();
    let mut engine = HeadlessEngine::preloaded();
    engine.refresh(&doc);
    engine.refresh(&doc);
    assert_eq!(engine.refresh_count(), 2);
}
