pub mod layout;
pub mod palette;
pub mod svg;


use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use stocks_core::{RenderError, SentimentPoint};
use tracing::info;

pub const SVG_MIME_TYPE: &str = "image/svg+xml";

/// One legend row: a plotted symbol and its marker color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LegendEntry {
    pub symbol: String,
    /// CSS color of the symbol's markers.
    pub color: String,
}

/// A rendered chart ready to embed.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub document: String,
    pub mime_type: &'static str,
    pub markers: usize,
    pub legend: Vec<LegendEntry>,
}

/// Turns validated sentiment points into a chart document.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, points: &[SentimentPoint]) -> Result<RenderedChart, RenderError>;
}

/// Scatter chart of sentiment (x) against presence (y) as a standalone SVG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgChartRenderer;

impl SvgChartRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, points: &[SentimentPoint]) -> Result<RenderedChart, RenderError> {
        let chart_layout = layout::layout_chart(points)?;
        let document = svg::write_document(&chart_layout)?;

        info!(
            "Rendered chart with {} markers and {} legend entries",
            chart_layout.markers.len(),
            chart_layout.legend.len()
        );
        Ok(RenderedChart {
            document,
            mime_type: SVG_MIME_TYPE,
            markers: chart_layout.markers.len(),
            legend: chart_layout.legend,
        })
    }
}
