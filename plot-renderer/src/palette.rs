//! Marker colors, assigned per distinct symbol in order of first appearance.

use std::collections::HashMap;

/// Base palette used for the first symbols of a chart.
pub const BASE_PALETTE: [&str; 12] = [
    "#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF", "#FF9F40",
    "#C9CBCF", "#2E7D32", "#8E24AA", "#D81B60", "#00897B", "#5D4037",
];

// Step in tenths of a degree, close to the golden angle (137.5°) and coprime
// with 3600 so every tenth-degree hue is visited once before any repeats.
const HUE_STEP_TENTHS: usize = 1373;
const HUE_SLOTS: usize = 3600;
const LIGHTNESS_LEVELS: [u8; 5] = [50, 40, 60, 30, 70];

/// Color of the `n`-th distinct symbol of a chart.
///
/// Colors are unique for the first `12 + 5 * 3600` symbols; after that the
/// generated hues wrap around.
pub fn color_for(n: usize) -> String {
    if let Some(color) = BASE_PALETTE.get(n) {
        return (*color).to_string();
    }

    let k = n - BASE_PALETTE.len();
    let tenths = (k * HUE_STEP_TENTHS) % HUE_SLOTS;
    let lightness = LIGHTNESS_LEVELS[(k / HUE_SLOTS) % LIGHTNESS_LEVELS.len()];
    format!(
        "hsl({}.{}, 65%, {}%)",
        tenths / 10,
        tenths % 10,
        lightness
    )
}

/// Maps symbols to colors; the same symbol always gets the same color.
#[derive(Debug, Default)]
pub struct ColorAssigner {
    assigned: HashMap<String, String>,
    order: Vec<String>,
}

impl ColorAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(&mut self, symbol: &str) -> String {
        if let Some(color) = self.assigned.get(symbol) {
            return color.clone();
        }
        let color = color_for(self.order.len());
        self.assigned.insert(symbol.to_string(), color.clone());
        self.order.push(symbol.to_string());
        color
    }

    /// Symbols with their colors, in first-appearance order.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.order
            .iter()
            .filter_map(|symbol| {
                self.assigned
                    .get(symbol)
                    .map(|color| (symbol.clone(), color.clone()))
            })
            .collect()
    }
}
