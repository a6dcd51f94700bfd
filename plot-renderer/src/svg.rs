//! SVG serialization of a [`ChartLayout`].

use crate::layout::{
    chars_within, truncate_label, ChartLayout, PlotArea, HEIGHT, LABEL_FONT_SIZE, LEGEND_WIDTH,
    PRESENCE_TICKS, SENTIMENT_TICKS, WIDTH,
};
use crate::LegendEntry;
use std::fmt::Write;
use stocks_core::{PostLink, RenderError};

const LEGEND_ROW_HEIGHT: f64 = 20.0;
const LEGEND_INDENT: f64 = 18.0;

const STYLE: &str = "\
.grid line{stroke:#e0e0e0;stroke-width:1}\
.zero{stroke:#6c757d;stroke-width:1.5;stroke-dasharray:4 3}\
.axis{stroke:#333;stroke-width:1}\
.tick{font-size:11px;fill:#555}\
.axis-title{font-size:13px;fill:#333}\
.marker{stroke:#fff;stroke-width:1.5;fill-opacity:0.8;cursor:pointer}\
.marker:hover{fill-opacity:1;stroke:#222;stroke-width:2.5}\
.label{fill:#222}\
.legend text{font-size:12px;fill:#333}\
.legend a text{font-size:11px;fill:#0b66c3}\
.legend a:hover text{text-decoration:underline}";

/// Escapes text for element content and attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            c => out.push(c),
        }
    }
    out
}

/// XML 1.0 forbids most C0 controls even when escaped.
pub fn is_xml_safe(text: &str) -> bool {
    text.chars().all(|c| {
        !matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}')
    })
}

fn fmt_err(_: std::fmt::Error) -> RenderError {
    RenderError::Serialization {
        reason: "failed to write SVG document".to_string(),
    }
}

/// One line of the legend: a symbol swatch or one of its source posts.
enum LegendRow<'a> {
    Symbol(&'a LegendEntry),
    Link(&'a PostLink),
}

/// Legend rows in legend order, each symbol followed by its distinct links.
fn legend_rows(layout: &ChartLayout) -> Vec<LegendRow<'_>> {
    let mut rows = Vec::new();
    for entry in &layout.legend {
        rows.push(LegendRow::Symbol(entry));
        let mut seen: Vec<&str> = Vec::new();
        let links = layout
            .markers
            .iter()
            .filter(|m| m.symbol == entry.symbol)
            .flat_map(|m| m.links.iter());
        for link in links {
            if !seen.contains(&link.url.as_str()) {
                seen.push(&link.url);
                rows.push(LegendRow::Link(link));
            }
        }
    }
    rows
}

pub fn write_document(layout: &ChartLayout) -> Result<String, RenderError> {
    for marker in &layout.markers {
        let summary_ok = marker.summary.as_deref().map_or(true, is_xml_safe);
        let links_ok = marker
            .links
            .iter()
            .all(|l| is_xml_safe(&l.url) && is_xml_safe(&l.title));
        if !is_xml_safe(&marker.symbol) || !summary_ok || !links_ok {
            return Err(RenderError::InvalidLabel {
                index: marker.index,
            });
        }
    }

    let rows = legend_rows(layout);
    let legend_bottom =
        layout.area.bounds.y + rows.len() as f64 * LEGEND_ROW_HEIGHT + LEGEND_ROW_HEIGHT;
    let height = HEIGHT.max(legend_bottom);

    let mut svg = String::new();
    write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="Helvetica, Arial, sans-serif" role="img">"#,
        w = WIDTH,
        h = height
    )
    .map_err(fmt_err)?;
    svg.push_str("<title>r/Stocks sentiment</title>");
    write!(svg, "<style>{}</style>", STYLE).map_err(fmt_err)?;
    write!(
        svg,
        r##"<rect width="{}" height="{}" fill="#ffffff"/>"##,
        WIDTH, height
    )
    .map_err(fmt_err)?;

    write_axes(&mut svg, &layout.area).map_err(fmt_err)?;
    write_markers(&mut svg, layout).map_err(fmt_err)?;
    write_legend(&mut svg, layout.area.bounds.y, &rows).map_err(fmt_err)?;

    svg.push_str("</svg>");
    Ok(svg)
}

fn write_axes(svg: &mut String, area: &PlotArea) -> std::fmt::Result {
    let b = area.bounds;

    svg.push_str(r#"<g class="grid">"#);
    for s in SENTIMENT_TICKS {
        let x = area.x(s);
        write!(svg, r#"<line x1="{x:.2}" y1="{:.2}" x2="{x:.2}" y2="{:.2}"/>"#, b.y, b.bottom())?;
    }
    for p in PRESENCE_TICKS {
        let y = area.y(p);
        write!(svg, r#"<line x1="{:.2}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}"/>"#, b.x, b.right())?;
    }
    svg.push_str("</g>");

    let zero = area.x(0.0);
    write!(
        svg,
        r#"<line class="zero" x1="{zero:.2}" y1="{:.2}" x2="{zero:.2}" y2="{:.2}"/>"#,
        b.y,
        b.bottom()
    )?;
    write!(
        svg,
        r#"<rect class="axis" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none"/>"#,
        b.x, b.y, b.width, b.height
    )?;

    for s in SENTIMENT_TICKS {
        write!(
            svg,
            r#"<text class="tick" x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
            area.x(s),
            b.bottom() + 18.0,
            s
        )?;
    }
    for p in PRESENCE_TICKS {
        write!(
            svg,
            r#"<text class="tick" x="{:.2}" y="{:.2}" text-anchor="end">{}</text>"#,
            b.x - 8.0,
            area.y(p) + 4.0,
            p
        )?;
    }

    write!(
        svg,
        r#"<text class="axis-title" x="{:.2}" y="{:.2}" text-anchor="middle">Sentiment (negative to positive)</text>"#,
        b.x + b.width / 2.0,
        b.bottom() + 42.0
    )?;
    let (tx, ty) = (b.x - 48.0, b.y + b.height / 2.0);
    write!(
        svg,
        r#"<text class="axis-title" x="{tx:.2}" y="{ty:.2}" text-anchor="middle" transform="rotate(-90 {tx:.2} {ty:.2})">Presence (share of posts)</text>"#
    )?;
    Ok(())
}

fn write_markers(svg: &mut String, layout: &ChartLayout) -> std::fmt::Result {
    svg.push_str(r#"<g class="markers">"#);
    for marker in &layout.markers {
        let symbol = escape_xml(&marker.symbol);
        write!(
            svg,
            r#"<circle class="marker" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" data-index="{}" data-symbol="{}" data-sentiment="{}" data-presence="{}">"#,
            marker.cx,
            marker.cy,
            marker.radius,
            marker.color,
            marker.index,
            symbol,
            marker.sentiment,
            marker.presence
        )?;
        write!(
            svg,
            "<title>{}&#10;Sentiment: {:.2}&#10;Presence: {:.2}",
            symbol, marker.sentiment, marker.presence
        )?;
        if let Some(summary) = &marker.summary {
            write!(svg, "&#10;{}", escape_xml(summary))?;
        }
        svg.push_str("</title></circle>");
    }
    svg.push_str("</g>");

    svg.push_str(r#"<g class="labels">"#);
    for marker in &layout.markers {
        let label = marker.label;
        write!(
            svg,
            r#"<text class="label" x="{:.2}" y="{:.2}" font-size="{}">{}</text>"#,
            label.x,
            label.bottom() - 3.0,
            LABEL_FONT_SIZE,
            escape_xml(&marker.label_text)
        )?;
    }
    svg.push_str("</g>");
    Ok(())
}

fn write_legend(svg: &mut String, top: f64, rows: &[LegendRow<'_>]) -> std::fmt::Result {
    let x = WIDTH - LEGEND_WIDTH + 10.0;
    let text_chars = chars_within(LEGEND_WIDTH - 10.0 - LEGEND_INDENT * 2.0);

    svg.push_str(r#"<g class="legend">"#);
    for (row, item) in rows.iter().enumerate() {
        let y = top + row as f64 * LEGEND_ROW_HEIGHT;
        match item {
            LegendRow::Symbol(entry) => write!(
                svg,
                r#"<rect x="{x:.2}" y="{y:.2}" width="12" height="12" rx="2" fill="{}"/><text x="{:.2}" y="{:.2}">{}</text>"#,
                entry.color,
                x + LEGEND_INDENT,
                y + 10.0,
                escape_xml(&truncate_label(&entry.symbol, text_chars))
            )?,
            LegendRow::Link(link) => write!(
                svg,
                r#"<a href="{}" target="_blank"><text x="{:.2}" y="{:.2}">{}</text><title>{}&#10;{}</title></a>"#,
                escape_xml(&link.url),
                x + LEGEND_INDENT * 2.0,
                y + 10.0,
                escape_xml(&truncate_label(&link.title, text_chars)),
                escape_xml(&link.title),
                escape_xml(&link.url)
            )?,
        }
    }
    svg.push_str("</g>");
    Ok(())
}
