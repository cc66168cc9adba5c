// Light/dark theme: draw palettes plus the persisted preference.
// The preference file holds a single "theme-mode" key; when it is missing
// or unreadable, startup falls back to the OS window theme, then light.

use std::path::Path;

use serde::{Deserialize, Serialize};

pub const PREFS_FILE: &str = "citymap-prefs.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn from_name(name: &str) -> Option<Theme> {
        match name {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> &'static Palette {
        match self {
            Theme::Dark => &DARK,
            Theme::Light => &LIGHT,
        }
    }
}

pub type Color = [f32; 4];

const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Color {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a]
}

/// Per-mode draw styling. Line widths live with the scene assembly; only
/// colors differ between modes.
pub struct Palette {
    /// Surface clear color (the page background plus the frame tint).
    pub background: wgpu::Color,
    pub backdrop_grid: Color,

    pub river_glow: Color,
    pub river_body: Color,
    pub river_highlight: Color,

    pub road_casing: Color,
    pub road_center: Color,
    pub dot_halo: Color,
    pub dot_core: Color,

    building_outline: Color,
    building_fill: Color,
    park_glow: Color,
    park_fill: Color,
    park_stripe: Color,
}

fn scaled(base: Color, alpha: f32) -> Color {
    [base[0], base[1], base[2], base[3] * alpha]
}

impl Palette {
    /// Buildings and parks carry a per-instance opacity rolled at
    /// generation time; these fold it into the palette alpha.
    pub fn building_outline(&self, opacity: f32) -> Color {
        scaled(self.building_outline, opacity)
    }

    pub fn building_fill(&self, opacity: f32) -> Color {
        scaled(self.building_fill, opacity)
    }

    pub fn park_glow(&self, opacity: f32) -> Color {
        scaled(self.park_glow, opacity)
    }

    pub fn park_fill(&self, opacity: f32) -> Color {
        scaled(self.park_fill, opacity)
    }

    pub fn park_stripe(&self, opacity: f32) -> Color {
        scaled(self.park_stripe, opacity)
    }
}

static DARK: Palette = Palette {
    background: wgpu::Color {
        r: 0.016,
        g: 0.024,
        b: 0.045,
        a: 1.0,
    },
    backdrop_grid: rgba(255, 255, 255, 0.04),
    river_glow: rgba(150, 200, 255, 0.10),
    river_body: rgba(150, 200, 255, 0.22),
    river_highlight: rgba(255, 255, 255, 0.08),
    road_casing: rgba(101, 245, 255, 0.08),
    road_center: rgba(101, 245, 255, 0.24),
    dot_halo: rgba(255, 255, 255, 0.12),
    dot_core: rgba(101, 245, 255, 0.65),
    building_outline: rgba(101, 245, 255, 0.32),
    building_fill: rgba(160, 210, 255, 1.0),
    park_glow: rgba(100, 220, 150, 0.35),
    park_fill: rgba(100, 220, 150, 1.0),
    park_stripe: rgba(255, 255, 255, 0.28),
};

static LIGHT: Palette = Palette {
    background: wgpu::Color {
        r: 0.93,
        g: 0.95,
        b: 0.97,
        a: 1.0,
    },
    backdrop_grid: rgba(100, 140, 190, 0.08),
    river_glow: rgba(80, 130, 200, 0.25),
    river_body: rgba(60, 110, 180, 0.5),
    river_highlight: rgba(40, 80, 140, 0.3),
    road_casing: rgba(100, 160, 220, 0.2),
    road_center: rgba(60, 130, 200, 0.6),
    dot_halo: rgba(100, 160, 220, 0.2),
    dot_core: rgba(80, 140, 200, 0.7),
    building_outline: rgba(100, 160, 220, 0.4),
    building_fill: rgba(80, 140, 200, 1.2),
    park_glow: rgba(100, 180, 120, 0.4),
    park_fill: rgba(80, 160, 100, 1.2),
    park_stripe: rgba(60, 140, 80, 0.4),
};

#[derive(Debug, Serialize, Deserialize)]
struct Prefs {
    #[serde(rename = "theme-mode")]
    theme_mode: String,
}

/// Read the persisted theme; `None` when the file is missing, unreadable,
/// or holds an unknown value.
pub fn load_theme(path: &Path) -> Option<Theme> {
    let content = std::fs::read_to_string(path).ok()?;
    let prefs: Prefs = serde_json::from_str(&content).ok()?;
    Theme::from_name(&prefs.theme_mode)
}

/// Startup resolution order: saved preference, then the OS window theme,
/// then light.
pub fn startup_theme(saved: Option<Theme>, system: Option<winit::window::Theme>) -> Theme {
    if let Some(theme) = saved {
        return theme;
    }
    match system {
        Some(winit::window::Theme::Dark) => Theme::Dark,
        _ => Theme::Light,
    }
}

/// Persist the theme. Failure is logged, never fatal.
pub fn save_theme(path: &Path, theme: Theme) {
    let prefs = Prefs {
        theme_mode: theme.name().to_string(),
    };
    match serde_json::to_string_pretty(&prefs) {
        Ok(json) => {
            if let Err(err) = std::fs::write(path, json) {
                log::warn!("failed to write {}: {err}", path.display());
            }
        }
        Err(err) => log::warn!("failed to serialize prefs: {err}"),
    }
}
