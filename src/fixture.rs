//! JSON page fixtures.
//!
//! A fixture describes a viewport, media preferences and a node tree:
//!
//! ```json
//! {
//!   "viewport": { "width": 1280, "height": 800 },
//!   "body": [
//!     { "tag": "h2", "attrs": { "data-animate": "fade-up" },
//!       "frame": { "x": 0, "y": 1200, "width": 600, "height": 80 },
//!       "children": ["Hello"] }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::dom::{Document, FlowLayout, NodeId};
use crate::foundation::core::{Rect, Viewport};
use crate::foundation::error::{MotionError, MotionResult};
use crate::page::{MediaPrefs, Page};

/// Page-space box of a block element.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameDef {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl FrameDef {
    /// As a rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// An element in a fixture.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementDef {
    /// Tag name.
    pub tag: String,
    /// Attributes; `class` is split into the class list.
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// Inline style.
    #[serde(default)]
    pub style: BTreeMap<String, String>,
    /// Block frame.
    #[serde(default)]
    pub frame: Option<FrameDef>,
    /// Child nodes.
    #[serde(default)]
    pub children: Vec<NodeDef>,
}

/// A text or element node in a fixture.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum NodeDef {
    /// Text node.
    Text(String),
    /// Element node.
    Element(ElementDef),
}

/// Glyph metrics for the flow layout.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutDef {
    /// Advance of every glyph.
    pub glyph_advance: f64,
    /// Height of one line.
    pub line_height: f64,
}

impl Default for LayoutDef {
    fn default() -> Self {
        let flow = FlowLayout::default();
        Self {
            glyph_advance: flow.glyph_advance,
            line_height: flow.line_height,
        }
    }
}

/// A whole page.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageDef {
    /// Initial viewport.
    #[serde(default)]
    pub viewport: Viewport,
    /// Media preferences.
    #[serde(default)]
    pub media: MediaPrefs,
    /// Flow metrics.
    #[serde(default)]
    pub layout: LayoutDef,
    /// Children of `head`.
    #[serde(default)]
    pub head: Vec<NodeDef>,
    /// Children of `body`.
    #[serde(default)]
    pub body: Vec<NodeDef>,
}

impl PageDef {
    /// Parse a fixture from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> MotionResult<Self> {
        let def: Self = serde_json::from_reader(r)
            .map_err(|e| MotionError::validation(format!("parse page JSON: {e}")))?;
        def.validate()?;
        Ok(def)
    }

    /// Parse a fixture from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> MotionResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            MotionError::validation(format!("open page JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Reject fixtures no layout could make sense of.
    pub fn validate(&self) -> MotionResult<()> {
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(MotionError::validation("viewport width/height must be > 0"));
        }
        if !(self.layout.glyph_advance > 0.0 && self.layout.line_height > 0.0) {
            return Err(MotionError::validation(
                "layout glyph_advance/line_height must be > 0",
            ));
        }
        let mut stack: Vec<&NodeDef> = self.head.iter().chain(&self.body).collect();
        while let Some(n) = stack.pop() {
            if let NodeDef::Element(e) = n {
                if e.tag.trim().is_empty() {
                    return Err(MotionError::validation("element tag must be non-empty"));
                }
                if let Some(f) = e.frame
                    && (f.width < 0.0 || f.height < 0.0)
                {
                    return Err(MotionError::validation(format!(
                        "<{}> frame has negative size",
                        e.tag
                    )));
                }
                stack.extend(&e.children);
            }
        }
        Ok(())
    }

    /// Build a live page.
    pub fn build(&self) -> MotionResult<Page> {
        let mut doc = Document::new();
        let head = doc.head();
        let body = doc.body();
        for n in &self.head {
            build_node(&mut doc, head, n)?;
        }
        for n in &self.body {
            build_node(&mut doc, body, n)?;
        }
        let layout = FlowLayout {
            glyph_advance: self.layout.glyph_advance,
            line_height: self.layout.line_height,
        };
        Ok(Page::with_layout(doc, self.viewport, Box::new(layout)).with_prefs(self.media))
    }
}

/// Build `def` under `parent`, returning the new node.
pub fn build_node(doc: &mut Document, parent: NodeId, def: &NodeDef) -> MotionResult<NodeId> {
    let id = match def {
        NodeDef::Text(t) => doc.create_text(t.as_str()),
        NodeDef::Element(e) => {
            let el = doc.create_element(&e.tag);
            for (k, v) in &e.attrs {
                if k == "class" {
                    doc.set_classes(el, v.split_whitespace().map(str::to_owned).collect());
                } else {
                    doc.set_attr(el, k, v.as_str());
                }
            }
            for (k, v) in &e.style {
                doc.set_style(el, k, v.as_str());
            }
            doc.set_frame(el, e.frame.map(|f| f.rect()));
            for c in &e.children {
                build_node(doc, el, c)?;
            }
            el
        }
    };
    doc.append_child(parent, id)?;
    Ok(id)
}

impl Page {
    /// Build a page from a parsed fixture.
    pub fn from_def(def: &PageDef) -> MotionResult<Self> {
        def.build()
    }

    /// Load and build a page fixture from disk.
    pub fn from_path(path: impl AsRef<Path>) -> MotionResult<Self> {
        PageDef::from_path(path)?.build()
    }
}

#[cfg(test)]
#[path = "../tests/unit/fixture/fixture.rs"]
mod tests;
