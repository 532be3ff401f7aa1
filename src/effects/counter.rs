use std::sync::OnceLock;

use regex::Regex;

fn counter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([^0-9]*?)([0-9,]+\.?[0-9]*)(.*?)$").unwrap_or_else(|e| {
            unreachable!("counter pattern is a valid literal: {e}");
        })
    })
}

/// How a counter renders intermediate values so the final frame reproduces the source text.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CounterFormat {
    /// Text before the number.
    pub prefix: String,
    /// Text after the number.
    pub suffix: String,
    /// Final value.
    pub target: f64,
    /// Fraction digits shown on every frame.
    pub decimals: usize,
    /// en-US thousands grouping, enabled when the source used commas.
    pub grouping: bool,
}

impl CounterFormat {
    /// Parse `prefix number suffix` out of trimmed element text.
    ///
    /// Returns `None` when no number is found.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = counter_re().captures(text.trim())?;
        let prefix = caps.get(1)?.as_str();
        let num = caps.get(2)?.as_str();
        let suffix = caps.get(3)?.as_str();
        let target = num.replace(',', "").parse::<f64>().ok()?;
        let decimals = num.split_once('.').map_or(0, |(_, frac)| frac.len());
        Some(Self {
            prefix: prefix.to_owned(),
            suffix: suffix.to_owned(),
            target,
            decimals,
            grouping: num.contains(','),
        })
    }

    /// Text shown before the count starts.
    pub fn initial_text(&self) -> String {
        format!("{}0{}", self.prefix, self.suffix)
    }

    /// Text for an intermediate value.
    pub fn render(&self, value: f64) -> String {
        let digits = if self.decimals > 0 {
            format!("{:.*}", self.decimals, value)
        } else {
            format!("{:.0}", value.round())
        };
        let digits = if self.grouping {
            group_thousands(&digits)
        } else {
            digits
        };
        format!("{}{}{}", self.prefix, digits, self.suffix)
    }
}

fn group_thousands(digits: &str) -> String {
    let (sign, rest) = match digits.strip_prefix('-') {
        Some(r) => ("-", r),
        None => ("", digits),
    };
    let (int, frac) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };
    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    match frac {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/counter.rs"]
mod tests;
