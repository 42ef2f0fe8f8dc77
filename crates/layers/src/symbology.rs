use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerStyle {
    pub visible: bool,
    pub opacity: f32,
}

impl LayerStyle {
    pub const fn new(visible: bool, opacity: f32) -> Self {
        Self { visible, opacity }
    }
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            visible: true,
            opacity: 1.0,
        }
    }
}

/// Appearance of a surface shape. Colors are linear RGBA.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeStyle {
    pub interior_color: [f32; 4],
    pub border_color: [f32; 4],
    /// Border width in pixels.
    pub border_width: f32,
    pub draw_interior: bool,
    pub draw_border: bool,
    pub anti_alias: bool,
}

impl ShapeStyle {
    pub const DEFAULT_INTERIOR_COLOR: [f32; 4] = [1.0, 1.0, 0.0, 0.4];
    pub const DEFAULT_BORDER_COLOR: [f32; 4] = [1.0, 1.0, 0.0, 0.7];

    /// Interior color with the layer opacity folded into alpha.
    pub fn effective_interior(&self, layer: &LayerStyle) -> [f32; 4] {
        let [r, g, b, a] = self.interior_color;
        [r, g, b, a * layer.opacity]
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            interior_color: Self::DEFAULT_INTERIOR_COLOR,
            border_color: Self::DEFAULT_BORDER_COLOR,
            border_width: 1.0,
            draw_interior: true,
            draw_border: true,
            anti_alias: true,
        }
    }
}
