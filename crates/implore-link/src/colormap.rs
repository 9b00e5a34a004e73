//! Colors and perceptual colormaps
//!
//! Every linked view renders an entity with the same color, so the
//! interpolators live here rather than in any one view. Sequential maps:
//! viridis (default), plasma, inferno, magma.

use serde::{Deserialize, Serialize};

/// An RGBA color, channels in 0.0..=1.0
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Opaque color from RGB
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Neutral gray used for entities without data
    pub fn no_data() -> Self {
        Self::rgb(0.5, 0.5, 0.5)
    }

    /// Parse "#RRGGBB" (the leading '#' is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Format as "#RRGGBB"
    pub fn to_hex(&self) -> String {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02X}{:02X}{:02X}", byte(self.r), byte(self.g), byte(self.b))
    }

    /// Linear interpolation, `t` clamped to 0..=1
    pub fn lerp(a: &Color, b: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
            a: a.a + (b.a - a.a) * t,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::no_data()
    }
}

/// Piecewise-linear colormap over evenly spaced stops
#[derive(Clone, Debug, PartialEq)]
pub struct Colormap {
    pub name: String,
    colors: Vec<Color>,
    reversed: bool,
}

impl Colormap {
    pub fn from_colors(name: impl Into<String>, colors: Vec<Color>) -> Self {
        Self {
            name: name.into(),
            colors,
            reversed: false,
        }
    }

    /// Built-in colormap by (case-insensitive) name
    pub fn named(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "viridis" => Some(viridis()),
            "plasma" => Some(plasma()),
            "inferno" => Some(inferno()),
            "magma" => Some(magma()),
            _ => None,
        }
    }

    pub fn reversed(mut self) -> Self {
        self.reversed = !self.reversed;
        self
    }

    /// Sample at `t`; values outside 0..=1 clamp to the end colors
    pub fn sample(&self, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let t = if self.reversed { 1.0 - t } else { t };

        match self.colors.len() {
            0 => Color::default(),
            1 => self.colors[0],
            n => {
                let scaled = t * (n - 1) as f64;
                let i = (scaled.floor() as usize).min(n - 2);
                Color::lerp(&self.colors[i], &self.colors[i + 1], (scaled - i as f64) as f32)
            }
        }
    }
}

impl Default for Colormap {
    fn default() -> Self {
        viridis()
    }
}

/// Names accepted by [`Colormap::named`]
pub fn builtin_colormap_names() -> Vec<&'static str> {
    vec!["viridis", "plasma", "inferno", "magma"]
}

/// Perceptually uniform, colorblind-safe default
pub fn viridis() -> Colormap {
    Colormap::from_colors(
        "viridis",
        vec![
            Color::rgb(0.267, 0.005, 0.329),
            Color::rgb(0.282, 0.141, 0.458),
            Color::rgb(0.254, 0.265, 0.530),
            Color::rgb(0.207, 0.372, 0.553),
            Color::rgb(0.164, 0.471, 0.558),
            Color::rgb(0.128, 0.567, 0.551),
            Color::rgb(0.135, 0.659, 0.518),
            Color::rgb(0.267, 0.749, 0.441),
            Color::rgb(0.478, 0.821, 0.318),
            Color::rgb(0.741, 0.873, 0.150),
            Color::rgb(0.993, 0.906, 0.144),
        ],
    )
}

pub fn plasma() -> Colormap {
    Colormap::from_colors(
        "plasma",
        vec![
            Color::rgb(0.050, 0.030, 0.528),
            Color::rgb(0.294, 0.012, 0.615),
            Color::rgb(0.494, 0.012, 0.658),
            Color::rgb(0.665, 0.138, 0.614),
            Color::rgb(0.798, 0.280, 0.470),
            Color::rgb(0.898, 0.396, 0.304),
            Color::rgb(0.973, 0.558, 0.154),
            Color::rgb(0.992, 0.748, 0.159),
            Color::rgb(0.940, 0.975, 0.131),
        ],
    )
}

pub fn inferno() -> Colormap {
    Colormap::from_colors(
        "inferno",
        vec![
            Color::rgb(0.001, 0.000, 0.014),
            Color::rgb(0.133, 0.047, 0.263),
            Color::rgb(0.341, 0.063, 0.429),
            Color::rgb(0.550, 0.161, 0.506),
            Color::rgb(0.735, 0.216, 0.330),
            Color::rgb(0.878, 0.392, 0.102),
            Color::rgb(0.978, 0.557, 0.035),
            Color::rgb(0.992, 0.772, 0.247),
            Color::rgb(0.988, 0.998, 0.645),
        ],
    )
}

pub fn magma() -> Colormap {
    Colormap::from_colors(
        "magma",
        vec![
            Color::rgb(0.001, 0.000, 0.014),
            Color::rgb(0.116, 0.042, 0.232),
            Color::rgb(0.271, 0.051, 0.404),
            Color::rgb(0.461, 0.098, 0.495),
            Color::rgb(0.665, 0.176, 0.515),
            Color::rgb(0.844, 0.295, 0.461),
            Color::rgb(0.962, 0.507, 0.454),
            Color::rgb(0.992, 0.738, 0.600),
            Color::rgb(0.987, 0.991, 0.750),
        ],
    )
}
