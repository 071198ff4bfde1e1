use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (210.0 + (i as f32 / n as f32) * 360.0) % 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// AQI categories (US EPA breakpoints)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub const ALL: [AqiCategory; 6] = [
        AqiCategory::Good,
        AqiCategory::Moderate,
        AqiCategory::UnhealthyForSensitive,
        AqiCategory::Unhealthy,
        AqiCategory::VeryUnhealthy,
        AqiCategory::Hazardous,
    ];

    /// Category of an index value.  Values are rounded to the nearest integer
    /// first, as AQI is reported in whole numbers.
    pub fn from_aqi(aqi: f64) -> Option<Self> {
        if !aqi.is_finite() {
            return None;
        }
        let aqi = aqi.round();
        Some(match aqi {
            a if a <= 50.0 => AqiCategory::Good,
            a if a <= 100.0 => AqiCategory::Moderate,
            a if a <= 150.0 => AqiCategory::UnhealthyForSensitive,
            a if a <= 200.0 => AqiCategory::Unhealthy,
            a if a <= 300.0 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitive => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    pub fn range(self) -> &'static str {
        match self {
            AqiCategory::Good => "0–50",
            AqiCategory::Moderate => "51–100",
            AqiCategory::UnhealthyForSensitive => "101–150",
            AqiCategory::Unhealthy => "151–200",
            AqiCategory::VeryUnhealthy => "201–300",
            AqiCategory::Hazardous => "301+",
        }
    }

    /// Official EPA reporting colour.
    pub fn color(self) -> Color32 {
        match self {
            AqiCategory::Good => Color32::from_rgb(0, 228, 0),
            AqiCategory::Moderate => Color32::from_rgb(255, 255, 0),
            AqiCategory::UnhealthyForSensitive => Color32::from_rgb(255, 126, 0),
            AqiCategory::Unhealthy => Color32::from_rgb(255, 0, 0),
            AqiCategory::VeryUnhealthy => Color32::from_rgb(143, 63, 151),
            AqiCategory::Hazardous => Color32::from_rgb(126, 0, 35),
        }
    }

    /// Text colour readable on top of [`Self::color`].
    pub fn text_color(self) -> Color32 {
        match self {
            AqiCategory::Good | AqiCategory::Moderate | AqiCategory::UnhealthyForSensitive => {
                Color32::BLACK
            }
            _ => Color32::WHITE,
        }
    }
}
