//! Geometry of the sentiment chart: scales, marker sizes and label placement.

use crate::palette::ColorAssigner;
use crate::LegendEntry;
use stocks_core::{PostLink, RenderError, SentimentPoint};
use tracing::debug;

pub const WIDTH: f64 = 860.0;
pub const HEIGHT: f64 = 600.0;
pub const LEGEND_WIDTH: f64 = 220.0;

pub const MIN_RADIUS: f64 = 5.0;
pub const MAX_RADIUS: f64 = 20.0;

pub const LABEL_FONT_SIZE: f64 = 12.0;
const LABEL_CHAR_WIDTH: f64 = 7.0;
const LABEL_HEIGHT: f64 = 14.0;
const LABEL_GAP: f64 = 4.0;

pub const SENTIMENT_TICKS: [f64; 5] = [-1.0, -0.5, 0.0, 0.5, 1.0];
pub const PRESENCE_TICKS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Axis-aligned rectangle in SVG pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn overlap_area(&self, other: &Rect) -> f64 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if w > 0.0 && h > 0.0 {
            w * h
        } else {
            0.0
        }
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Moves `other` the minimum distance needed to sit inside `self`.
    /// A rectangle larger than `self` is pinned to the top-left corner.
    fn clamp_inside(&self, other: Rect) -> Rect {
        let x = other.x.min(self.right() - other.width).max(self.x);
        let y = other.y.min(self.bottom() - other.height).max(self.y);
        Rect { x, y, ..other }
    }
}

/// The drawing area inside the axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub bounds: Rect,
}

impl Default for PlotArea {
    fn default() -> Self {
        let left = 70.0;
        let top = 50.0;
        let bottom = 60.0;
        let right = 30.0;
        Self {
            bounds: Rect {
                x: left,
                y: top,
                width: WIDTH - LEGEND_WIDTH - left - right,
                height: HEIGHT - top - bottom,
            },
        }
    }
}

impl PlotArea {
    /// Sentiment in [-1, 1] to an x pixel.
    pub fn x(&self, sentiment: f64) -> f64 {
        self.bounds.x + (sentiment + 1.0) / 2.0 * self.bounds.width
    }

    /// Presence in [0, 1] to a y pixel; higher presence is drawn higher.
    pub fn y(&self, presence: f64) -> f64 {
        self.bounds.bottom() - presence * self.bounds.height
    }

    pub fn sentiment_at(&self, x: f64) -> f64 {
        (x - self.bounds.x) / self.bounds.width * 2.0 - 1.0
    }

    pub fn presence_at(&self, y: f64) -> f64 {
        (self.bounds.bottom() - y) / self.bounds.height
    }
}

/// Marker radius in pixels; grows linearly with presence.
pub fn marker_radius(presence: f64) -> f64 {
    (MIN_RADIUS + (MAX_RADIUS - MIN_RADIUS) * presence).clamp(MIN_RADIUS, MAX_RADIUS)
}

pub fn label_size(text: &str) -> (f64, f64) {
    let chars = text.chars().count().max(1) as f64;
    (chars * LABEL_CHAR_WIDTH, LABEL_HEIGHT)
}

/// Number of label characters that fit in `width` pixels.
pub fn chars_within(width: f64) -> usize {
    (width / LABEL_CHAR_WIDTH).floor().max(1.0) as usize
}

/// Cuts `text` to at most `max_chars` characters, ending in an ellipsis when cut.
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerLayout {
    /// Position of the record in the caller's input.
    pub index: usize,
    pub symbol: String,
    pub color: String,
    pub sentiment: f64,
    pub presence: f64,
    pub summary: Option<String>,
    pub links: Vec<PostLink>,
    /// Text drawn next to the marker; the symbol, shortened to fit the plot area.
    pub label_text: String,
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub label: Rect,
}

impl MarkerLayout {
    fn bounding_box(&self) -> Rect {
        Rect {
            x: self.cx - self.radius,
            y: self.cy - self.radius,
            width: self.radius * 2.0,
            height: self.radius * 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub area: PlotArea,
    pub markers: Vec<MarkerLayout>,
    pub legend: Vec<LegendEntry>,
}

/// Lays out one marker per point, in input order.
pub fn layout_chart(points: &[SentimentPoint]) -> Result<ChartLayout, RenderError> {
    let area = PlotArea::default();
    let mut colors = ColorAssigner::new();

    let mut markers = Vec::with_capacity(points.len());
    for (index, point) in points.iter().enumerate() {
        if !point.sentiment.is_finite() || !point.presence.is_finite() {
            return Err(RenderError::NonFiniteCoordinate { index });
        }
        let radius = marker_radius(point.presence);
        let cx = area.x(point.sentiment);
        let cy = area.y(point.presence);
        markers.push(MarkerLayout {
            index,
            symbol: point.symbol.clone(),
            color: colors.color(&point.symbol),
            sentiment: point.sentiment,
            presence: point.presence,
            summary: point.summary.clone(),
            links: point.links.clone(),
            label_text: truncate_label(&point.symbol, chars_within(area.bounds.width)),
            cx,
            cy,
            radius,
            label: Rect {
                x: cx,
                y: cy,
                width: 0.0,
                height: 0.0,
            },
        });
    }

    place_labels(&area, &mut markers);

    let legend = colors
        .entries()
        .into_iter()
        .map(|(symbol, color)| LegendEntry { symbol, color })
        .collect();

    debug!("Laid out {} markers", markers.len());
    Ok(ChartLayout {
        area,
        markers,
        legend,
    })
}

/// Candidate label rectangles around a marker, in preference order:
/// right, upper right, top, upper left, left, lower left, bottom, lower right.
fn candidates(marker: &MarkerLayout, width: f64, height: f64) -> [Rect; 8] {
    let d = marker.radius + LABEL_GAP;
    let (cx, cy) = (marker.cx, marker.cy);
    let diag = d * std::f64::consts::FRAC_1_SQRT_2;
    let rect = |x: f64, y: f64| Rect {
        x,
        y,
        width,
        height,
    };
    [
        rect(cx + d, cy - height / 2.0),
        rect(cx + diag, cy - diag - height),
        rect(cx - width / 2.0, cy - d - height),
        rect(cx - diag - width, cy - diag - height),
        rect(cx - d - width, cy - height / 2.0),
        rect(cx - diag - width, cy + diag),
        rect(cx - width / 2.0, cy + d),
        rect(cx + diag, cy + diag),
    ]
}

/// Greedy placement: each label, in input order, takes the candidate with
/// the least overlap against labels already placed and all markers.
fn place_labels(area: &PlotArea, markers: &mut [MarkerLayout]) {
    let marker_boxes: Vec<Rect> = markers.iter().map(MarkerLayout::bounding_box).collect();
    let mut placed: Vec<Rect> = Vec::with_capacity(markers.len());

    for (i, marker) in markers.iter_mut().enumerate() {
        let (width, height) = label_size(&marker.label_text);
        let mut best: Option<(f64, Rect)> = None;

        for candidate in candidates(marker, width, height) {
            let mut cost: f64 = placed.iter().map(|r| r.overlap_area(&candidate)).sum();
            cost += marker_boxes
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, r)| r.overlap_area(&candidate))
                .sum::<f64>();
            if !area.bounds.contains(&candidate) {
                let inside = area.bounds.overlap_area(&candidate);
                cost += (candidate.width * candidate.height - inside) * 10.0 + 1.0;
            }

            if best.map_or(true, |(best_cost, _)| cost < best_cost) {
                best = Some((cost, candidate));
            }
        }

        if let Some((_, rect)) = best {
            let rect = area.bounds.clamp_inside(rect);
            marker.label = rect;
            placed.push(rect);
        }
    }
}
