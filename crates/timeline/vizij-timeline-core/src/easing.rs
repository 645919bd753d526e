//! Easing curves applied to a property advance's time fraction.
//!
//! - `Linear` (identity; the default)
//! - `CubicBezier` timing with the usual presets (ease, ease-in, ease-out, ease-in-out)
//! - `Custom` for caller-supplied curves

use std::fmt;
use std::sync::Arc;

/// Caller-supplied easing curve: time fraction -> progress fraction.
pub type EasingFn = Arc<dyn Fn(f32) -> f32 + Send + Sync>;

#[derive(Clone, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Control points (x1, y1, x2, y2); endpoints fixed at (0,0) and (1,1).
    CubicBezier([f32; 4]),
    Custom(EasingFn),
}

impl Easing {
    pub fn ease() -> Self {
        Easing::CubicBezier([0.25, 0.1, 0.25, 1.0])
    }

    pub fn ease_in() -> Self {
        Easing::CubicBezier([0.42, 0.0, 1.0, 1.0])
    }

    pub fn ease_out() -> Self {
        Easing::CubicBezier([0.0, 0.0, 0.58, 1.0])
    }

    pub fn ease_in_out() -> Self {
        Easing::CubicBezier([0.42, 0.0, 0.58, 1.0])
    }

    pub fn custom(f: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        Easing::Custom(Arc::new(f))
    }

    /// Map a time fraction in [0,1] to a progress fraction.
    /// Bezier and custom curves may overshoot [0,1].
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::CubicBezier([x1, y1, x2, y2]) => bezier_ease(t, *x1, *y1, *x2, *y2),
            Easing::Custom(f) => f(t),
        }
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => f.write_str("Linear"),
            Easing::CubicBezier(ctrl) => f.debug_tuple("CubicBezier").field(ctrl).finish(),
            Easing::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Invert the x curve by bisection, then evaluate y at the found parameter.
fn bezier_ease(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if x1 == 0.0 && y1 == 0.0 && x2 == 1.0 && y2 == 1.0 {
        return t;
    }
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = t;
    for _ in 0..24 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}
