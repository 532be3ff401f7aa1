//! Interactive button behaviours.

use crate::context::{EffectCx, ListenerAction};
use crate::directive::{ButtonDirective, ButtonKind};
use crate::dom::{EventKind, NodeId, Selector};
use crate::engine::{AnimationSpec, Length, Position, Timing, Tween, TweenKind, VisualProps};
use crate::foundation::error::MotionResult;
use crate::page::Event;

/// Class of the injected background layer.
pub const FILL_CLASS: &str = "hm-btn-fill";
/// Class of the sliding label copy.
pub const CLONE_CLASS: &str = "hm-btn-clone";

/// Nodes one installed button animates.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ButtonBinding {
    Fill { layer: NodeId },
    Magnetic { el: NodeId, strength: f64 },
    TextSlide { label: NodeId, clone: NodeId },
}

fn to(targets: Vec<NodeId>, props: VisualProps, timing: Timing) -> AnimationSpec {
    AnimationSpec::tween(Tween {
        targets,
        kind: TweenKind::To(props),
        timing,
        position: Position::Append,
    })
}

fn listen(cx: &mut EffectCx<'_>, el: NodeId, kinds: &[EventKind], binding: &ButtonBinding) {
    for kind in kinds {
        let id = cx.doc.add_listener(el, *kind);
        cx.ctx
            .resources
            .listeners
            .insert(id, ListenerAction::Button(binding.clone()));
    }
}

/// Build the behaviour's structure and register its listeners. Returns `false` when skipped.
pub(crate) fn install(
    cx: &mut EffectCx<'_>,
    el: NodeId,
    button: &ButtonDirective,
) -> MotionResult<bool> {
    match button.kind {
        ButtonKind::Fill => install_fill(cx, el, button.fill_color.as_deref()),
        ButtonKind::Magnetic => {
            if cx.ctx.touch {
                tracing::debug!(?el, "magnetic button skipped on touch device");
                return Ok(false);
            }
            let binding = ButtonBinding::Magnetic {
                el,
                strength: button.magnetic_strength,
            };
            listen(
                cx,
                el,
                &[EventKind::PointerMove, EventKind::PointerLeave],
                &binding,
            );
            Ok(true)
        }
        ButtonKind::TextSlide => install_text_slide(cx, el),
    }
}

fn install_fill(cx: &mut EffectCx<'_>, el: NodeId, color: Option<&str>) -> MotionResult<bool> {
    cx.doc.set_style(el, "position", "relative");
    cx.doc.set_style(el, "overflow", "hidden");

    let layer = cx.doc.create_element("span");
    cx.doc.add_class(layer, FILL_CLASS);
    for (prop, value) in [
        ("position", "absolute"),
        ("inset", "0"),
        ("transform-origin", "left"),
        ("pointer-events", "none"),
        ("z-index", "0"),
    ] {
        cx.doc.set_style(layer, prop, value);
    }
    match color {
        Some(c) => cx.doc.set_style(layer, "background", c),
        None => {
            cx.doc.set_style(layer, "background", "currentColor");
            cx.doc.set_style(layer, "opacity", "0.08");
        }
    }

    for child in cx.doc.element_children(el) {
        cx.doc.set_style(child, "position", "relative");
        cx.doc.set_style(child, "z-index", "1");
    }
    match cx.doc.children(el).first().copied() {
        Some(first) => cx.doc.insert_before(el, layer, Some(first))?,
        None => cx.doc.append_child(el, layer)?,
    }
    cx.set(
        &[layer],
        &VisualProps {
            scale_x: Some(0.0),
            ..VisualProps::default()
        },
    );

    let binding = ButtonBinding::Fill { layer };
    listen(
        cx,
        el,
        &[EventKind::PointerEnter, EventKind::PointerLeave],
        &binding,
    );
    Ok(true)
}

fn install_text_slide(cx: &mut EffectCx<'_>, el: NodeId) -> MotionResult<bool> {
    let label = match cx.doc.query(el, &Selector::tags(&["span"])) {
        Some(span) => span,
        None => {
            let text = cx.doc.text_content(el);
            if text.trim().is_empty() {
                return Ok(false);
            }
            let span = cx.doc.create_element("span");
            let node = cx.doc.create_text(text);
            cx.doc.append_child(span, node)?;
            for old in cx.doc.replace_children(el, &[span])? {
                cx.doc.dispose(old);
            }
            span
        }
    };

    cx.doc.set_style(el, "overflow", "hidden");
    cx.doc.set_style(el, "position", "relative");
    cx.doc.set_style(label, "display", "inline-block");
    cx.doc.set_style(label, "position", "relative");
    cx.doc.set_style(label, "transition", "none");

    let clone = cx.doc.deep_clone(label)?;
    cx.doc.add_class(clone, CLONE_CLASS);
    for (prop, value) in [
        ("position", "absolute"),
        ("left", "0"),
        ("top", "0"),
        ("width", "100%"),
    ] {
        cx.doc.set_style(clone, prop, value);
    }
    cx.doc.append_child(el, clone)?;
    cx.set(
        &[clone],
        &VisualProps {
            y: Some(Length::Percent(100.0)),
            ..VisualProps::default()
        },
    );

    let binding = ButtonBinding::TextSlide { label, clone };
    listen(
        cx,
        el,
        &[EventKind::PointerEnter, EventKind::PointerLeave],
        &binding,
    );
    Ok(true)
}

/// React to one event delivered to an installed button.
pub(crate) fn handle(cx: &mut EffectCx<'_>, binding: &ButtonBinding, event: Event) {
    match (binding, event) {
        (ButtonBinding::Fill { layer }, Event::PointerEnter) => {
            cx.doc.set_style(*layer, "transform-origin", "left");
            let spec = to(
                vec![*layer],
                VisualProps {
                    scale_x: Some(1.0),
                    ..VisualProps::default()
                },
                Timing::new(0.4, "power2.out"),
            );
            cx.play_interaction(*layer, spec);
        }
        (ButtonBinding::Fill { layer }, Event::PointerLeave) => {
            cx.doc.set_style(*layer, "transform-origin", "right");
            let spec = to(
                vec![*layer],
                VisualProps {
                    scale_x: Some(0.0),
                    ..VisualProps::default()
                },
                Timing::new(0.3, "power2.in"),
            );
            cx.play_interaction(*layer, spec);
        }
        (ButtonBinding::Magnetic { el, strength }, Event::PointerMove(pointer)) => {
            let rect = cx.viewport.to_client(cx.layout.rect(cx.doc, *el));
            let center = rect.center();
            let spec = to(
                vec![*el],
                VisualProps {
                    x: Some(Length::Px((pointer.x - center.x) * strength)),
                    y: Some(Length::Px((pointer.y - center.y) * strength)),
                    ..VisualProps::default()
                },
                Timing::new(0.2, "power2.out"),
            );
            cx.play_interaction(*el, spec);
        }
        (ButtonBinding::Magnetic { el, .. }, Event::PointerLeave) => {
            let spec = to(
                vec![*el],
                VisualProps {
                    x: Some(Length::Px(0.0)),
                    y: Some(Length::Px(0.0)),
                    ..VisualProps::default()
                },
                Timing::new(0.4, "elastic.out(1, 0.5)"),
            );
            cx.play_interaction(*el, spec);
        }
        (ButtonBinding::TextSlide { label, clone }, Event::PointerEnter) => {
            slide(cx, *label, *clone, -100.0, 0.0);
        }
        (ButtonBinding::TextSlide { label, clone }, Event::PointerLeave) => {
            slide(cx, *label, *clone, 0.0, 100.0);
        }
        _ => {}
    }
}

fn slide(cx: &mut EffectCx<'_>, label: NodeId, clone: NodeId, label_y: f64, clone_y: f64) {
    for (node, y) in [(label, label_y), (clone, clone_y)] {
        let spec = to(
            vec![node],
            VisualProps {
                y: Some(Length::Percent(y)),
                ..VisualProps::default()
            },
            Timing::new(0.35, "power2.inOut"),
        );
        cx.play_interaction(node, spec);
    }
}
