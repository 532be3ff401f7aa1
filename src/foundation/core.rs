use crate::foundation::error::{MotionError, MotionResult};

pub use kurbo::{Point, Rect, Size};

/// Visible window onto the page, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width of the visible area.
    pub width: f64,
    /// Height of the visible area.
    pub height: f64,
    /// Horizontal scroll offset.
    #[serde(default)]
    pub scroll_x: f64,
    /// Vertical scroll offset.
    #[serde(default)]
    pub scroll_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

impl Viewport {
    /// Viewport of the given size scrolled to the top of the page.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    /// Visible region in page coordinates.
    pub fn page_rect(&self) -> Rect {
        Rect::new(
            self.scroll_x,
            self.scroll_y,
            self.scroll_x + self.width,
            self.scroll_y + self.height,
        )
    }

    /// Convert a page-space rect into viewport (client) coordinates.
    pub fn to_client(&self, r: Rect) -> Rect {
        r - kurbo::Vec2::new(self.scroll_x, self.scroll_y)
    }

    /// `true` when `r` (page space) overlaps the visible region with non-zero area.
    pub fn shows(&self, r: Rect) -> bool {
        let i = self.page_rect().intersect(r);
        i.width() > 0.0 && i.height() > 0.0
    }
}

/// One edge of a [`Margin`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarginValue {
    /// Absolute pixels.
    Px(f64),
    /// Percentage of the root box along the edge's axis.
    Percent(f64),
}

impl MarginValue {
    fn resolve(self, axis_len: f64) -> f64 {
        match self {
            Self::Px(v) => v,
            Self::Percent(p) => axis_len * p / 100.0,
        }
    }

    fn parse(token: &str) -> MotionResult<Self> {
        let bad = || MotionError::validation(format!("invalid margin value '{token}'"));
        if let Some(p) = token.strip_suffix('%') {
            return p.parse::<f64>().map(Self::Percent).map_err(|_| bad());
        }
        let px = token.strip_suffix("px").unwrap_or(token);
        px.parse::<f64>().map(Self::Px).map_err(|_| bad())
    }
}

/// Root margin in CSS shorthand order (top, right, bottom, left).
///
/// Positive values grow the root box, so targets count as entered before they geometrically reach
/// the viewport edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margin {
    /// Top edge.
    pub top: MarginValue,
    /// Right edge.
    pub right: MarginValue,
    /// Bottom edge.
    pub bottom: MarginValue,
    /// Left edge.
    pub left: MarginValue,
}

impl Margin {
    /// Zero margin.
    pub const ZERO: Self = Self {
        top: MarginValue::Px(0.0),
        right: MarginValue::Px(0.0),
        bottom: MarginValue::Px(0.0),
        left: MarginValue::Px(0.0),
    };

    /// Parse a 1 to 4 value CSS margin shorthand such as `"0px 0px 8% 0px"`.
    pub fn parse(s: &str) -> MotionResult<Self> {
        let vals = s
            .split_whitespace()
            .map(MarginValue::parse)
            .collect::<MotionResult<Vec<_>>>()?;
        let (top, right, bottom, left) = match vals.as_slice() {
            [a] => (*a, *a, *a, *a),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            _ => {
                return Err(MotionError::validation(format!(
                    "margin '{s}' must have 1 to 4 values"
                )));
            }
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }

    /// Grow `root` outward by this margin.
    pub fn expand(&self, root: Rect) -> Rect {
        let (w, h) = (root.width(), root.height());
        Rect::new(
            root.x0 - self.left.resolve(w),
            root.y0 - self.top.resolve(h),
            root.x1 + self.right.resolve(w),
            root.y1 + self.bottom.resolve(h),
        )
    }
}

/// Fraction of `target` covered by `root`, in `[0, 1]`.
///
/// Zero-area targets count as fully covered when they touch the root, matching how intersection
/// watchers treat empty boxes.
pub fn intersection_ratio(target: Rect, root: Rect) -> f64 {
    let area = target.area();
    if area <= 0.0 {
        let touches = target.x0 <= root.x1
            && target.x1 >= root.x0
            && target.y0 <= root.y1
            && target.y1 >= root.y0;
        return if touches { 1.0 } else { 0.0 };
    }
    let i = target.intersect(root);
    if i.width() <= 0.0 || i.height() <= 0.0 {
        return 0.0;
    }
    (i.area() / area).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
