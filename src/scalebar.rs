use log::debug;

use crate::render::TreeRenderer;

/// Pixel length the bar is fitted towards before snapping.
pub const TARGET_PIXELS: f64 = 100.0;

/// Used whenever the renderer's view state cannot be read.
pub const FALLBACK: ScaleBarState = ScaleBarState {
    value: 0.1,
    pixel_length: 100.0,
};

/// Derived scale indicator: a "nice" branch-length distance and the pixel
/// length it spans at the current zoom. Recomputed on every zoom or pan,
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBarState {
    pub value: f64,
    pub pixel_length: f64,
}

/// Compute the bar from the renderer-reported unit-to-pixel ratio and the
/// base-2 zoom exponent.
pub fn compute(branch_scale: f64, zoom: f64) -> ScaleBarState {
    let current_scale = branch_scale * 2f64.powf(zoom);
    if !current_scale.is_finite() || current_scale <= 0.0 {
        return FALLBACK;
    }

    let actual_distance = TARGET_PIXELS / current_scale;
    let value = nice_distance(actual_distance);
    ScaleBarState {
        value,
        pixel_length: value * current_scale,
    }
}

/// Read the view state off the renderer; any failure falls back to the
/// fixed defaults rather than propagating.
pub fn from_renderer(renderer: &dyn TreeRenderer) -> ScaleBarState {
    match (renderer.branch_scale(), renderer.zoom()) {
        (Ok(branch_scale), Ok(zoom)) => compute(branch_scale, zoom),
        (scale, zoom) => {
            debug!(
                "scale bar falling back to defaults (branch_scale: {:?}, zoom: {:?})",
                scale.err(),
                zoom.err()
            );
            FALLBACK
        }
    }
}

/// Snap a raw distance to 1, 2, 5 or 10 times its power-of-ten magnitude.
pub fn nice_distance(actual_distance: f64) -> f64 {
    let magnitude = 10f64.powf(actual_distance.log10().floor());
    let normalized = actual_distance / magnitude;
    if normalized <= 1.0 {
        magnitude
    } else if normalized <= 2.0 {
        2.0 * magnitude
    } else if normalized <= 5.0 {
        5.0 * magnitude
    } else {
        10.0 * magnitude
    }
}

/// Presentational formatting: millionths below 0.001, thousandths below 1,
/// otherwise three decimal digits.
pub fn format_value(value: f64) -> String {
    if value < 0.001 {
        format!("{:.0}µ", value * 1e6)
    } else if value < 1.0 {
        format!("{:.0}m", value * 1e3)
    } else {
        format!("{value:.3}")
    }
}
