use serde::{Deserialize, Serialize};

use super::{HashCalculator, round3};

/// RGBA tint of an icon layer, every channel normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub red: f64,
    /// Green channel
    pub green: f64,
    /// Blue channel
    pub blue: f64,
    /// Alpha channel
    pub alpha: f64,
}

impl Default for Color {
    fn default() -> Self {
        Self {
            red: 1.0,
            green: 1.0,
            blue: 1.0,
            alpha: 1.0,
        }
    }
}

impl Color {
    /// Build a normalized color from raw dump values.
    ///
    /// Each channel above 1 is taken to be on the 0-255 scale and divided by
    /// 255, channels up to 1 are kept. A missing alpha is fully opaque.
    ///
    /// ```rust
    /// use factorio_export::entity::Color;
    ///
    /// let color = Color::normalized(255.0, 128.0, 0.0, Some(255.0));
    /// assert_eq!((color.red, color.green, color.blue, color.alpha), (1.0, 0.502, 0.0, 1.0));
    /// ```
    #[must_use]
    pub fn normalized(red: f64, green: f64, blue: f64, alpha: Option<f64>) -> Self {
        Self {
            red: normalize_channel(red),
            green: normalize_channel(green),
            blue: normalize_channel(blue),
            alpha: alpha.map_or(1.0, normalize_channel),
        }
    }
}

fn normalize_channel(value: f64) -> f64 {
    if value > 1.0 { round3(value / 255.0) } else { round3(value) }
}

/// One image layer of an icon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Game path of the image, e.g. `__base__/graphics/icons/coal.png`
    pub file_name: String,
    /// Horizontal offset in pixels
    pub offset_x: i32,
    /// Vertical offset in pixels
    pub offset_y: i32,
    /// Scale factor applied to the image
    pub scale: f64,
    /// Size of the source image in pixels
    pub size: u32,
    /// Tint applied to the image
    pub tint: Color,
}

impl Default for Layer {
    fn default() -> Self {
        Self {
            file_name: String::new(),
            offset_x: 0,
            offset_y: 0,
            scale: 1.0,
            size: 0,
            tint: Color::default(),
        }
    }
}

/// An icon composed of one or more layers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Icon {
    /// Size of the icon as declared in the game data
    pub size: u32,
    /// Size the icon gets rendered with
    pub rendered_size: u32,
    /// Layers from bottom to top
    pub layers: Vec<Layer>,
}

impl Icon {
    /// The content hash over the sizes and the full layer list.
    #[must_use]
    pub fn content_hash(&self) -> String {
        self.layers.iter().fold(
            HashCalculator::new("icon")
                .integer(u64::from(self.size))
                .integer(u64::from(self.rendered_size))
                .integer(self.layers.len() as u64),
            |calculator, layer| {
                calculator
                    .text(&layer.file_name)
                    .signed(i64::from(layer.offset_x))
                    .signed(i64::from(layer.offset_y))
                    .number(layer.scale)
                    .integer(u64::from(layer.size))
                    .number(layer.tint.red)
                    .number(layer.tint.green)
                    .number(layer.tint.blue)
                    .number(layer.tint.alpha)
            },
        ).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(file_name: &str) -> Layer {
        Layer {
            file_name: file_name.to_string(),
            size: 32,
            ..Layer::default()
        }
    }

    #[test]
    fn test_normalize_byte_scale() {
        let color = Color::normalized(255.0, 128.0, 0.0, Some(255.0));
        assert_eq!(color.red, 1.0);
        assert_eq!(color.green, 0.502);
        assert_eq!(color.blue, 0.0);
        assert_eq!(color.alpha, 1.0);
    }

    #[test]
    fn test_normalize_unit_scale_untouched() {
        let color = Color::normalized(0.5, 0.25, 1.0, None);
        assert_eq!(color.red, 0.5);
        assert_eq!(color.green, 0.25);
        assert_eq!(color.blue, 1.0);
        assert_eq!(color.alpha, 1.0);
    }

    #[test]
    fn test_normalize_mixed_scale_per_channel() {
        let color = Color::normalized(1.0, 128.0, 0.0, Some(255.0));
        assert_eq!(color.red, 1.0);
        assert_eq!(color.green, 0.502);
        assert_eq!(color.blue, 0.0);
        assert_eq!(color.alpha, 1.0);

        let color = Color::normalized(0.5, 51.0, 1.0, Some(0.8));
        assert_eq!(color.red, 0.5);
        assert_eq!(color.green, 0.2);
        assert_eq!(color.alpha, 0.8);
    }

    #[test]
    fn test_missing_alpha_in_byte_scale_is_opaque() {
        let color = Color::normalized(255.0, 0.0, 0.0, None);
        assert_eq!(color.alpha, 1.0);
    }

    #[test]
    fn test_layer_order_matters() {
        let a = Icon {
            size: 32,
            rendered_size: 32,
            layers: vec![layer("a.png"), layer("b.png")],
        };
        let b = Icon {
            size: 32,
            rendered_size: 32,
            layers: vec![layer("b.png"), layer("a.png")],
        };
        assert_ne!(a.content_hash(), b.content_hash());
        assert_eq!(a.content_hash(), a.clone().content_hash());
    }
}
