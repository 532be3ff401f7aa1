use crate::dom::{Document, NodeId};

/// Options that are only ever read through the namespaced attribute form.
pub const TUNING_OPTIONS: [&str; 5] = ["duration", "delay", "distance", "stagger", "ease"];

/// Coerced attribute value.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Literal `"true"` or `"false"`.
    Bool(bool),
    /// Finite numeric text.
    Number(f64),
    /// Anything else, verbatim.
    Text(String),
}

impl AttrValue {
    /// Numeric payload.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean payload.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Textual payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Coerce raw attribute text.
pub fn coerce(raw: &str) -> AttrValue {
    match raw {
        "true" => return AttrValue::Bool(true),
        "false" => return AttrValue::Bool(false),
        _ => {}
    }
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && !raw.trim().is_empty() => AttrValue::Number(n),
        _ => AttrValue::Text(raw.to_owned()),
    }
}

/// Reads declarative options off an element.
///
/// `data-<ns>-<name>` wins over `data-<name>`. Tuning options ([`TUNING_OPTIONS`]) are read only
/// through the namespaced form so unrelated scripts using `data-duration` and friends never leak
/// into animations.
#[derive(Clone, Debug)]
pub struct AttrResolver {
    namespace: String,
}

impl AttrResolver {
    /// Resolver for the given namespace (e.g. `"hm"`).
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Namespaced attribute name for `option`.
    pub fn namespaced(&self, option: &str) -> String {
        format!("data-{}-{option}", self.namespace)
    }

    /// Raw attribute text following the precedence rules.
    pub fn raw<'d>(&self, doc: &'d Document, el: NodeId, option: &str) -> Option<&'d str> {
        if let Some(v) = doc.attr(el, &self.namespaced(option)) {
            return Some(v);
        }
        if TUNING_OPTIONS.contains(&option) {
            return None;
        }
        doc.attr(el, &format!("data-{option}"))
    }

    /// `true` when either accepted form of `option` is present.
    pub fn has(&self, doc: &Document, el: NodeId, option: &str) -> bool {
        self.raw(doc, el, option).is_some()
    }

    /// Coerced value of `option`, or `fallback` untouched when absent.
    pub fn resolve(
        &self,
        doc: &Document,
        el: NodeId,
        option: &str,
        fallback: AttrValue,
    ) -> AttrValue {
        self.raw(doc, el, option).map_or(fallback, coerce)
    }

    /// Numeric option; absent or non-numeric values yield `fallback`.
    pub fn number(&self, doc: &Document, el: NodeId, option: &str, fallback: f64) -> f64 {
        self.raw(doc, el, option)
            .and_then(|r| coerce(r).as_f64())
            .unwrap_or(fallback)
    }

    /// Optional numeric option; non-numeric values count as absent.
    pub fn number_opt(&self, doc: &Document, el: NodeId, option: &str) -> Option<f64> {
        self.raw(doc, el, option).and_then(|r| coerce(r).as_f64())
    }

    /// Boolean option; absent or non-boolean values yield `fallback`.
    pub fn flag(&self, doc: &Document, el: NodeId, option: &str, fallback: bool) -> bool {
        self.raw(doc, el, option)
            .and_then(|r| coerce(r).as_bool())
            .unwrap_or(fallback)
    }

    /// Option text verbatim.
    pub fn text(&self, doc: &Document, el: NodeId, option: &str) -> Option<String> {
        self.raw(doc, el, option).map(str::to_owned)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/directive/attr.rs"]
mod tests;
