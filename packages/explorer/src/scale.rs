//! Bubble radius scale.
//!
//! A clamped square-root scale from `[0, max]` onto `[0, 40]` pixels, so
//! bubble *area* is proportional to the value. The upper bound of the
//! domain is rounded outward to a "nice" number for three ticks.

use serde::Serialize;

/// Largest bubble radius in pixels.
pub const MAX_BUBBLE_RADIUS: f64 = 40.0;

/// Tick count the domain is niced for.
const NICE_TICKS: f64 = 3.0;

/// Square-root scale for bubble radii.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BubbleScale {
    domain_max: f64,
}

impl BubbleScale {
    /// Builds the scale for the largest value on the map. A missing or
    /// sub-unit maximum is raised to 1.
    #[must_use]
    pub fn new(statistic_max: Option<f64>) -> Self {
        let max = statistic_max.unwrap_or(0.0).max(1.0);
        Self {
            domain_max: nice_max(max, NICE_TICKS),
        }
    }

    /// Upper bound of the niced domain.
    #[must_use]
    pub const fn domain_max(&self) -> f64 {
        self.domain_max
    }

    /// Radius for a value. Negative and NaN values get no bubble; values
    /// above the domain are clamped to [`MAX_BUBBLE_RADIUS`].
    #[must_use]
    pub fn radius(&self, value: f64) -> f64 {
        let t = signed_sqrt(value) / self.domain_max.sqrt();
        if t.is_nan() {
            return 0.0;
        }
        t.clamp(0.0, 1.0) * MAX_BUBBLE_RADIUS
    }
}

fn signed_sqrt(value: f64) -> f64 {
    if value < 0.0 {
        -(-value).sqrt()
    } else {
        value.sqrt()
    }
}

/// Step between ticks for `count` ticks over `[start, stop]`: 1, 2 or 5
/// times a power of ten. Negative results encode the reciprocal of a
/// fractional step.
fn tick_increment(start: f64, stop: f64, count: f64) -> f64 {
    let e10 = 50f64.sqrt();
    let e5 = 10f64.sqrt();
    let e2 = 2f64.sqrt();

    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= e10 {
        10.0
    } else if error >= e5 {
        5.0
    } else if error >= e2 {
        2.0
    } else {
        1.0
    };

    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power)) / factor
    }
}

/// Extends `[0, max]` outward until both ends are multiples of the tick
/// step, returning the new upper bound.
#[allow(clippy::float_cmp)]
fn nice_max(max: f64, count: f64) -> f64 {
    let mut start = 0.0_f64;
    let mut stop = max;
    let mut previous_step = None;

    for _ in 0..10 {
        let step = tick_increment(start, stop, count);
        if previous_step == Some(step) {
            break;
        }
        if step > 0.0 {
            start = (start / step).floor() * step;
            stop = (stop / step).ceil() * step;
        } else if step < 0.0 {
            start = (start * step).ceil() / step;
            stop = (stop * step).floor() / step;
        } else {
            break;
        }
        previous_step = Some(step);
    }
    stop
}
