use kurbo::{BezPath, Circle, Line, ParamCurveArclen as _, Point, Rect, Shape as _};

use crate::dom::{Document, NodeId};

/// Vector shapes a line drawing animates.
pub const SHAPE_TAGS: [&str; 6] = ["path", "line", "circle", "rect", "polyline", "polygon"];

const ACCURACY: f64 = 1e-3;

fn num(doc: &Document, el: NodeId, name: &str) -> f64 {
    doc.attr(el, name)
        .and_then(|v| v.trim().trim_end_matches("px").parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn points(doc: &Document, el: NodeId) -> Vec<Point> {
    let nums: Vec<f64> = doc
        .attr(el, "points")
        .unwrap_or_default()
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    nums.chunks_exact(2).map(|p| Point::new(p[0], p[1])).collect()
}

fn polyline_length(pts: &[Point], closed: bool) -> f64 {
    let open: f64 = pts.windows(2).map(|w| w[0].distance(w[1])).sum();
    match (closed, pts.first(), pts.last()) {
        (true, Some(first), Some(last)) if pts.len() > 2 => open + last.distance(*first),
        _ => open,
    }
}

/// Total stroke length of a shape element; zero for unknown tags or unparseable geometry.
pub fn stroke_length(doc: &Document, el: NodeId) -> f64 {
    match doc.tag(el) {
        Some("path") => doc
            .attr(el, "d")
            .and_then(|d| BezPath::from_svg(d).ok())
            .map_or(0.0, |p| p.segments().map(|s| s.arclen(ACCURACY)).sum()),
        Some("line") => Line::new(
            (num(doc, el, "x1"), num(doc, el, "y1")),
            (num(doc, el, "x2"), num(doc, el, "y2")),
        )
        .arclen(ACCURACY),
        Some("circle") => {
            let r = num(doc, el, "r");
            if r <= 0.0 {
                return 0.0;
            }
            Circle::new((num(doc, el, "cx"), num(doc, el, "cy")), r).perimeter(ACCURACY)
        }
        Some("rect") => {
            let (w, h) = (num(doc, el, "width"), num(doc, el, "height"));
            if w <= 0.0 || h <= 0.0 {
                return 0.0;
            }
            let (x, y) = (num(doc, el, "x"), num(doc, el, "y"));
            Rect::new(x, y, x + w, y + h).perimeter(ACCURACY)
        }
        Some("polyline") => polyline_length(&points(doc, el), false),
        Some("polygon") => polyline_length(&points(doc, el), true),
        _ => 0.0,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/draw.rs"]
mod tests;
