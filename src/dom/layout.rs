use std::collections::HashMap;

use crate::dom::{Document, NodeId};
use crate::foundation::core::Rect;

/// Geometry provider for the document.
///
/// Implementations answer "where is this node right now" in page coordinates. Results are only
/// valid until the next document mutation.
pub trait Layout {
    /// Page-space border box of `node`. Unrendered nodes report [`Rect::ZERO`].
    fn rect(&self, doc: &Document, node: NodeId) -> Rect;

    /// Measure several nodes against the same document state.
    fn rects(&self, doc: &Document, nodes: &[NodeId]) -> Vec<Rect> {
        nodes.iter().map(|n| self.rect(doc, *n)).collect()
    }
}

/// Deterministic inline flow over block frames.
///
/// Block elements report their declared frame. Inline content is flowed inside the nearest framed
/// ancestor with a fixed glyph advance and line height: whitespace runs collapse to one advance
/// (zero at line start), non-whitespace runs wrap as a unit, and `<br>` forces a new line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowLayout {
    /// Horizontal advance of every glyph.
    pub glyph_advance: f64,
    /// Height of one line box.
    pub line_height: f64,
}

impl Default for FlowLayout {
    fn default() -> Self {
        Self {
            glyph_advance: 8.0,
            line_height: 20.0,
        }
    }
}

enum Atom {
    Char { node: NodeId, ch: char },
    Break,
}

impl FlowLayout {
    fn container(doc: &Document, node: NodeId) -> Option<(NodeId, Rect)> {
        let mut cur = doc.parent(node);
        while let Some(n) = cur {
            if let Some(f) = doc.frame(n) {
                return Some((n, f));
            }
            cur = doc.parent(n);
        }
        None
    }

    fn atoms(doc: &Document, container: NodeId) -> Vec<Atom> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = doc.children(container).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            if let Some(t) = doc.text(n) {
                out.extend(t.chars().map(|ch| Atom::Char { node: n, ch }));
                continue;
            }
            if doc.frame(n).is_some() {
                continue;
            }
            if doc.tag(n) == Some("br") {
                out.push(Atom::Break);
                continue;
            }
            stack.extend(doc.children(n).iter().rev().copied());
        }
        out
    }

    /// Boxes of every text node flowed inside `container`.
    fn flow(&self, doc: &Document, container: NodeId, frame: Rect) -> HashMap<NodeId, Rect> {
        let atoms = Self::atoms(doc, container);
        let adv = self.glyph_advance;
        let mut boxes: HashMap<NodeId, Rect> = HashMap::new();
        let mut place = |node: NodeId, x: f64, w: f64, line: usize| {
            let y = frame.y0 + line as f64 * self.line_height;
            let r = Rect::new(frame.x0 + x, y, frame.x0 + x + w, y + self.line_height);
            boxes
                .entry(node)
                .and_modify(|acc| *acc = acc.union(r))
                .or_insert(r);
        };

        let (mut x, mut line) = (0.0_f64, 0_usize);
        let mut i = 0;
        while i < atoms.len() {
            match &atoms[i] {
                Atom::Break => {
                    line += 1;
                    x = 0.0;
                    i += 1;
                }
                Atom::Char { ch, .. } if ch.is_whitespace() => {
                    let mut first = true;
                    while let Some(Atom::Char { node, ch }) = atoms.get(i) {
                        if !ch.is_whitespace() {
                            break;
                        }
                        let w = if first && x > 0.0 { adv } else { 0.0 };
                        place(*node, x, w, line);
                        x += w;
                        first = false;
                        i += 1;
                    }
                }
                Atom::Char { .. } => {
                    let start = i;
                    while let Some(Atom::Char { ch, .. }) = atoms.get(i) {
                        if ch.is_whitespace() {
                            break;
                        }
                        i += 1;
                    }
                    let w = (i - start) as f64 * adv;
                    if x > 0.0 && x + w > frame.width() {
                        line += 1;
                        x = 0.0;
                    }
                    for a in &atoms[start..i] {
                        if let Atom::Char { node, .. } = a {
                            place(*node, x, adv, line);
                            x += adv;
                        }
                    }
                }
            }
        }
        boxes
    }

    fn rect_in(doc: &Document, node: NodeId, boxes: &HashMap<NodeId, Rect>) -> Rect {
        if let Some(r) = boxes.get(&node) {
            return *r;
        }
        doc.descendants(node)
            .iter()
            .filter_map(|d| boxes.get(d))
            .copied()
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO)
    }
}

impl Layout for FlowLayout {
    fn rect(&self, doc: &Document, node: NodeId) -> Rect {
        if let Some(f) = doc.frame(node) {
            return f;
        }
        let Some((container, frame)) = Self::container(doc, node) else {
            return Rect::ZERO;
        };
        let boxes = self.flow(doc, container, frame);
        Self::rect_in(doc, node, &boxes)
    }

    fn rects(&self, doc: &Document, nodes: &[NodeId]) -> Vec<Rect> {
        let mut flows: HashMap<NodeId, HashMap<NodeId, Rect>> = HashMap::new();
        nodes
            .iter()
            .map(|n| {
                if let Some(f) = doc.frame(*n) {
                    return f;
                }
                let Some((container, frame)) = Self::container(doc, *n) else {
                    return Rect::ZERO;
                };
                let boxes = flows
                    .entry(container)
                    .or_insert_with(|| self.flow(doc, container, frame));
                Self::rect_in(doc, *n, boxes)
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dom/layout.rs"]
mod tests;
