//! Text splitting into line, word and character segments.
//!
//! Splitting only ever rearranges existing text into wrapper elements: the concatenated text of
//! the element is identical before and after, and inline formatting is kept around every piece it
//! covered.

use std::collections::HashMap;

use unicode_segmentation::UnicodeSegmentation as _;

use crate::dom::{Document, Layout, NodeId};
use crate::foundation::error::MotionResult;

/// Class of word segments.
pub const WORD_CLASS: &str = "hm-word";
/// Class of character segments.
pub const CHAR_CLASS: &str = "hm-char";
/// Class of the inner wrapper of line segments.
pub const LINE_CLASS: &str = "hm-line";
/// Class of temporary word wrappers used for measuring.
pub const MEASURE_CLASS: &str = "hm-measure";

/// Inline formatting tags whose presence in a split target is reported.
pub const INLINE_MARKUP_TAGS: [&str; 10] =
    ["a", "strong", "em", "span", "b", "i", "u", "mark", "sup", "sub"];

/// Granularity of a split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Rendered lines.
    Lines,
    /// Whitespace-separated words.
    Words,
    /// Grapheme clusters.
    Chars,
}

/// One animatable unit.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Segment {
    /// Granularity.
    pub kind: SegmentKind,
    /// Position in stagger order.
    pub index: usize,
    /// Wrapper element.
    pub node: NodeId,
    /// Text inside the wrapper.
    pub text: String,
}

/// Result of splitting one element.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct Split {
    /// Segments in document order.
    pub segments: Vec<Segment>,
    /// The element contained inline formatting.
    pub inline_markup: bool,
}

impl Split {
    /// Segment wrapper nodes in order.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.segments.iter().map(|s| s.node).collect()
    }
}

/// Split the text of `el` into `kind` segments.
///
/// The accessible label of `el` is set to its original text. Line discovery measures words with
/// `layout`; words whose top edges differ by less than `tolerance` share a line.
pub fn segment(
    doc: &mut Document,
    layout: &dyn Layout,
    el: NodeId,
    kind: SegmentKind,
    tolerance: f64,
) -> MotionResult<Split> {
    let original = doc.text_content(el);
    doc.set_attr(el, "aria-label", original.as_str());
    let inline_markup = doc
        .descendants(el)
        .into_iter()
        .any(|n| doc.tag(n).is_some_and(|t| INLINE_MARKUP_TAGS.contains(&t)));

    let (nodes, class) = match kind {
        SegmentKind::Words => {
            wrap_text_runs(doc, el, Wrap::Word)?;
            (by_class(doc, el, WORD_CLASS), WORD_CLASS)
        }
        SegmentKind::Chars => {
            wrap_text_runs(doc, el, Wrap::Chars)?;
            (by_class(doc, el, CHAR_CLASS), CHAR_CLASS)
        }
        SegmentKind::Lines => {
            let has_br = doc
                .descendants(el)
                .into_iter()
                .any(|n| doc.tag(n) == Some("br"));
            if has_br {
                split_on_breaks(doc, el)?;
            } else {
                discover_lines(doc, layout, el, tolerance)?;
            }
            (by_class(doc, el, LINE_CLASS), LINE_CLASS)
        }
    };
    tracing::debug!(?kind, count = nodes.len(), class, "split text");
    let segments = nodes
        .into_iter()
        .enumerate()
        .map(|(index, node)| Segment {
            kind,
            index,
            node,
            text: doc.text_content(node),
        })
        .collect();
    Ok(Split {
        segments,
        inline_markup,
    })
}

fn by_class(doc: &Document, el: NodeId, class: &str) -> Vec<NodeId> {
    doc.descendants(el)
        .into_iter()
        .filter(|n| doc.has_class(*n, class))
        .collect()
}

/// Whitespace and non-whitespace runs of `s`, in order.
fn runs(s: &str) -> Vec<(bool, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut cur: Option<bool> = None;
    for (i, c) in s.char_indices() {
        let ws = c.is_whitespace();
        match cur {
            Some(prev) if prev == ws => {}
            Some(prev) => {
                out.push((prev, &s[start..i]));
                start = i;
                cur = Some(ws);
            }
            None => cur = Some(ws),
        }
    }
    if let Some(prev) = cur {
        out.push((prev, &s[start..]));
    }
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Wrap {
    Word,
    Chars,
    Measure,
}

fn wrapper(doc: &mut Document, class: &str, display: &str, text: &str) -> MotionResult<NodeId> {
    let span = doc.create_element("span");
    doc.add_class(span, class);
    doc.set_style(span, "display", display);
    let t = doc.create_text(text);
    doc.append_child(span, t)?;
    Ok(span)
}

/// Replace every text node under `el` with wrapped non-whitespace runs; whitespace stays as plain
/// text between them.
fn wrap_text_runs(doc: &mut Document, el: NodeId, wrap: Wrap) -> MotionResult<()> {
    for t in doc.text_nodes(el) {
        let Some(text) = doc.text(t).map(str::to_owned) else {
            continue;
        };
        let mut nodes = Vec::new();
        for (ws, run) in runs(&text) {
            if ws {
                nodes.push(doc.create_text(run));
                continue;
            }
            let node = match wrap {
                Wrap::Word => wrapper(doc, WORD_CLASS, "inline-block", run)?,
                Wrap::Measure => wrapper(doc, MEASURE_CLASS, "inline", run)?,
                Wrap::Chars => {
                    let word = doc.create_element("span");
                    doc.set_style(word, "display", "inline-block");
                    doc.set_style(word, "white-space", "nowrap");
                    for g in run.graphemes(true) {
                        let c = wrapper(doc, CHAR_CLASS, "inline-block", g)?;
                        doc.append_child(word, c)?;
                    }
                    word
                }
            };
            nodes.push(node);
        }
        doc.replace_with(t, &nodes)?;
        doc.dispose(t);
    }
    Ok(())
}

/// Outer clipping block holding an inner `hm-line` wrapper around `content`.
fn line_wrapper(doc: &mut Document, content: &[NodeId]) -> MotionResult<NodeId> {
    let outer = doc.create_element("span");
    doc.set_style(outer, "display", "block");
    doc.set_style(outer, "overflow", "hidden");
    let inner = doc.create_element("span");
    doc.set_style(inner, "display", "inline-block");
    doc.add_class(inner, LINE_CLASS);
    for c in content {
        doc.append_child(inner, *c)?;
    }
    doc.append_child(outer, inner)?;
    Ok(outer)
}

/// One line per run of children between direct `<br>` children. Empty runs are dropped and
/// whitespace-only runs stay as plain text.
fn split_on_breaks(doc: &mut Document, el: NodeId) -> MotionResult<()> {
    let children = doc.children(el).to_vec();
    let mut groups: Vec<Vec<NodeId>> = vec![Vec::new()];
    let mut breaks = Vec::new();
    for c in children {
        if doc.tag(c) == Some("br") {
            breaks.push(c);
            groups.push(Vec::new());
        } else if let Some(g) = groups.last_mut() {
            g.push(c);
        }
    }
    let mut rebuilt = Vec::new();
    for group in groups {
        if group.is_empty() {
            continue;
        }
        let blank = group
            .iter()
            .all(|n| doc.text(*n).is_some_and(|t| t.trim().is_empty()));
        if blank {
            rebuilt.extend(group);
            continue;
        }
        for n in &group {
            doc.remove(*n);
        }
        rebuilt.push(line_wrapper(doc, &group)?);
    }
    for b in breaks {
        doc.dispose(b);
    }
    let leftover = doc.replace_children(el, &rebuilt)?;
    for n in leftover {
        if !rebuilt.contains(&n) {
            doc.dispose(n);
        }
    }
    Ok(())
}

/// Leaves of `el` in document order: text nodes and childless elements.
fn leaves(doc: &Document, el: NodeId) -> Vec<NodeId> {
    doc.descendants(el)
        .into_iter()
        .filter(|n| doc.text(*n).is_some() || doc.children(*n).is_empty())
        .collect()
}

/// Measure words, group them into lines by top edge and rebuild one wrapper per line.
fn discover_lines(
    doc: &mut Document,
    layout: &dyn Layout,
    el: NodeId,
    tolerance: f64,
) -> MotionResult<()> {
    wrap_text_runs(doc, el, Wrap::Measure)?;
    let words = by_class(doc, el, MEASURE_CLASS);
    if words.is_empty() {
        return Ok(());
    }
    let rects = layout.rects(doc, &words);
    let top_of: HashMap<NodeId, f64> = words
        .iter()
        .copied()
        .zip(rects.iter().map(|r| r.y0))
        .collect();

    // Walk leaves so a word glued to the previous one (no whitespace between, e.g. across a
    // formatting boundary) always joins its line.
    let mut line_of: HashMap<NodeId, usize> = HashMap::new();
    let (mut line, mut ref_top): (usize, Option<f64>) = (0, None);
    let mut glued = false;
    for leaf in leaves(doc, el) {
        let word = doc
            .parent(leaf)
            .filter(|p| doc.has_class(*p, MEASURE_CLASS) && doc.text(leaf).is_some());
        match word {
            Some(w) => {
                let top = top_of.get(&w).copied().unwrap_or(0.0);
                match ref_top {
                    None => ref_top = Some(top),
                    Some(r) if glued || (top - r).abs() < tolerance => {}
                    Some(_) => {
                        line += 1;
                        ref_top = Some(top);
                    }
                }
                glued = true;
            }
            None => {
                if doc.text(leaf).is_some_and(|t| t.chars().any(char::is_whitespace)) {
                    glued = false;
                }
            }
        }
        line_of.insert(leaf, line);
    }

    let mut outers = Vec::with_capacity(line + 1);
    for l in 0..=line {
        let mut content = Vec::new();
        for c in doc.children(el).to_vec() {
            if let Some(copy) = copy_for_line(doc, c, &line_of, l)? {
                content.push(copy);
            }
        }
        if !content.is_empty() {
            outers.push(line_wrapper(doc, &content)?);
        }
    }
    let old = doc.replace_children(el, &outers)?;
    for n in old {
        doc.dispose(n);
    }
    Ok(())
}

/// Copy of `node` restricted to the leaves on `line`, with measuring wrappers unwrapped.
fn copy_for_line(
    doc: &mut Document,
    node: NodeId,
    line_of: &HashMap<NodeId, usize>,
    line: usize,
) -> MotionResult<Option<NodeId>> {
    if let Some(t) = doc.text(node).map(str::to_owned) {
        let keep = line_of.get(&node) == Some(&line);
        return Ok(keep.then(|| doc.create_text(t)));
    }
    let children = doc.children(node).to_vec();
    if children.is_empty() {
        if line_of.get(&node) != Some(&line) {
            return Ok(None);
        }
        return doc.shallow_clone(node).map(Some);
    }
    let mut kept = Vec::new();
    for c in children {
        if let Some(copy) = copy_for_line(doc, c, line_of, line)? {
            kept.push(copy);
        }
    }
    if kept.is_empty() {
        return Ok(None);
    }
    if doc.has_class(node, MEASURE_CLASS)
        && let [only] = kept[..]
    {
        return Ok(Some(only));
    }
    let shell = doc.shallow_clone(node)?;
    for k in kept {
        doc.append_child(shell, k)?;
    }
    Ok(Some(shell))
}

#[cfg(test)]
#[path = "../tests/unit/segment/segment.rs"]
mod tests;
