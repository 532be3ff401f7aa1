use crate::dom::{Document, NodeId};
use crate::foundation::error::{MotionError, MotionResult};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Part {
    Tag(String),
    Class(String),
    Id(String),
    Attr { name: String, value: Option<String> },
}

/// A comma-separated list of compound selectors (`tag`, `.class`, `#id`, `[attr]`,
/// `[attr=value]`). Combinators are not supported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Vec<Part>>,
}

impl Selector {
    /// Parse a selector list.
    pub fn parse(src: &str) -> MotionResult<Self> {
        let mut alternatives = Vec::new();
        for raw in src.split(',') {
            let raw = raw.trim();
            if raw.is_empty() {
                return Err(MotionError::validation(format!("empty selector in '{src}'")));
            }
            alternatives.push(parse_compound(raw)?);
        }
        Ok(Self { alternatives })
    }

    /// Selector matching any element with one of the given tag names.
    pub fn tags(tags: &[&str]) -> Self {
        Self {
            alternatives: tags
                .iter()
                .map(|t| vec![Part::Tag(t.to_ascii_lowercase())])
                .collect(),
        }
    }

    /// Selector matching any element carrying one of the given attributes.
    pub fn any_attr(names: &[&str]) -> Self {
        Self {
            alternatives: names
                .iter()
                .map(|n| {
                    vec![Part::Attr {
                        name: (*n).to_owned(),
                        value: None,
                    }]
                })
                .collect(),
        }
    }

    /// `true` when `node` is an element matching any alternative.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(tag) = doc.tag(node) else {
            return false;
        };
        self.alternatives.iter().any(|parts| {
            parts.iter().all(|p| match p {
                Part::Tag(t) => t == "*" || t == tag,
                Part::Class(c) => doc.has_class(node, c),
                Part::Id(id) => doc.attr(node, "id") == Some(id.as_str()),
                Part::Attr { name, value } => match (doc.attr(node, name), value) {
                    (Some(_), None) => true,
                    (Some(v), Some(want)) => v == want,
                    (None, _) => false,
                },
            })
        })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(src: &str) -> MotionResult<Vec<Part>> {
    let bad = |why: &str| MotionError::validation(format!("invalid selector '{src}': {why}"));
    let chars: Vec<char> = src.chars().collect();
    let mut parts = Vec::new();
    let mut i = 0;

    let ident = |i: &mut usize| -> String {
        let start = *i;
        while *i < chars.len() && is_ident_char(chars[*i]) {
            *i += 1;
        }
        chars[start..*i].iter().collect()
    };

    if i < chars.len() && (chars[i] == '*' || is_ident_char(chars[i])) {
        if chars[i] == '*' {
            i += 1;
            parts.push(Part::Tag("*".to_owned()));
        } else {
            parts.push(Part::Tag(ident(&mut i).to_ascii_lowercase()));
        }
    }

    while i < chars.len() {
        match chars[i] {
            '.' => {
                i += 1;
                let name = ident(&mut i);
                if name.is_empty() {
                    return Err(bad("missing class name"));
                }
                parts.push(Part::Class(name));
            }
            '#' => {
                i += 1;
                let name = ident(&mut i);
                if name.is_empty() {
                    return Err(bad("missing id"));
                }
                parts.push(Part::Id(name));
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|c| *c == ']')
                    .map(|p| p + i)
                    .ok_or_else(|| bad("unclosed attribute selector"))?;
                let inner: String = chars[i + 1..close].iter().collect();
                let (name, value) = match inner.split_once('=') {
                    Some((n, v)) => {
                        let v = v.trim().trim_matches(|c| c == '"' || c == '\'');
                        (n.trim().to_owned(), Some(v.to_owned()))
                    }
                    None => (inner.trim().to_owned(), None),
                };
                if name.is_empty() || !name.chars().all(is_ident_char) {
                    return Err(bad("invalid attribute name"));
                }
                parts.push(Part::Attr { name, value });
                i = close + 1;
            }
            c => return Err(bad(&format!("unsupported character '{c}'"))),
        }
    }

    if parts.is_empty() {
        return Err(bad("empty compound"));
    }
    Ok(parts)
}

#[cfg(test)]
#[path = "../../tests/unit/dom/select.rs"]
mod tests;
