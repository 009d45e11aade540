// ---------------------------------------------------------------------------
// Extents and "nice" domains
// ---------------------------------------------------------------------------

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = 1.4142135623730951; // sqrt(2)

/// Default number of ticks a niced domain is rounded for.
pub const DEFAULT_TICK_COUNT: usize = 10;

/// Minimum and maximum of `values`, ignoring `NaN`.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Tick spacing for roughly `count` ticks across `[start, stop]`.
///
/// Positive results are the step itself (1, 2 or 5 × 10ⁿ with n ≥ 0).
/// Negative results encode a fractional step as its negated inverse, so
/// `-10.0` means a step of `0.1`. This keeps the rounding exact.
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    if power < 0.0 {
        -10f64.powf(-power) / factor
    } else {
        factor * 10f64.powf(power)
    }
}

/// Round `domain` outward to tick boundaries. Orientation is preserved.
///
/// Degenerate and non-finite domains come back unchanged.
pub fn nice(domain: (f64, f64), count: usize) -> (f64, f64) {
    let (d0, d1) = domain;
    if !d0.is_finite() || !d1.is_finite() || d0 == d1 {
        return domain;
    }
    let reversed = d1 < d0;
    let (mut start, mut stop) = if reversed { (d1, d0) } else { (d0, d1) };

    let mut prestep = None;
    for _ in 0..10 {
        let step = tick_increment(start, stop, count);
        if prestep == Some(step) {
            return if reversed { (stop, start) } else { (start, stop) };
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
        prestep = Some(step);
    }
    domain
}

// ---------------------------------------------------------------------------
// Linear scale
// ---------------------------------------------------------------------------

/// Maps a data domain linearly onto a pixel range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Data value → pixel. A degenerate domain maps to the middle of the range.
    pub fn apply(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let t = if d1 == d0 { 0.5 } else { (v - d0) / (d1 - d0) };
        r0 + t * (r1 - r0)
    }

    /// Pixel → data value.
    pub fn invert(&self, px: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let t = if r1 == r0 { 0.5 } else { (px - r0) / (r1 - r0) };
        d0 + t * (d1 - d0)
    }
}

// ---------------------------------------------------------------------------
// Zoom transform
// ---------------------------------------------------------------------------

/// Pan/zoom state in pixel space: `screen = base * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform { k: 1.0, x: 0.0, y: 0.0 };

    #[inline]
    pub fn apply_x(&self, px: f64) -> f64 {
        px * self.k + self.x
    }
    #[inline]
    pub fn apply_y(&self, py: f64) -> f64 {
        py * self.k + self.y
    }
    #[inline]
    pub fn invert_x(&self, px: f64) -> f64 {
        (px - self.x) / self.k
    }
    #[inline]
    pub fn invert_y(&self, py: f64) -> f64 {
        (py - self.y) / self.k
    }

    /// Copy of `scale` whose domain is what is visible through this transform.
    pub fn rescale_x(&self, scale: &LinearScale) -> LinearScale {
        let (r0, r1) = scale.range;
        LinearScale::new(
            (scale.invert(self.invert_x(r0)), scale.invert(self.invert_x(r1))),
            scale.range,
        )
    }

    pub fn rescale_y(&self, scale: &LinearScale) -> LinearScale {
        let (r0, r1) = scale.range;
        LinearScale::new(
            (scale.invert(self.invert_y(r0)), scale.invert(self.invert_y(r1))),
            scale.range,
        )
    }

    /// Multiply the zoom level by `factor`, keeping the point under `anchor`
    /// fixed. The resulting `k` is clamped to `extent`.
    pub fn scale_by(&mut self, factor: f64, anchor: [f64; 2], extent: (f64, f64)) {
        let k1 = (self.k * factor).clamp(extent.0, extent.1);
        let base_x = self.invert_x(anchor[0]);
        let base_y = self.invert_y(anchor[1]);
        self.k = k1;
        self.x = anchor[0] - base_x * k1;
        self.y = anchor[1] - base_y * k1;
    }

    /// Shift by a pixel delta.
    pub fn translate_by(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Zoom factor for a vertical wheel delta in points (positive zooms in).
pub fn wheel_zoom_factor(scroll_y: f64) -> f64 {
    2f64.powf(scroll_y * 0.002)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn extent_ignores_nan() {
        assert_eq!(extent([3.0, f64::NAN, -1.0, 7.5]), Some((-1.0, 7.5)));
        assert_eq!(extent([f64::NAN]), None);
        assert_eq!(extent(Vec::new()), None);
    }

    #[test]
    fn tick_increment_picks_1_2_5_steps() {
        assert_eq!(tick_increment(0.0, 96.3, 10), 10.0);
        assert_eq!(tick_increment(0.0, 20.0, 10), 2.0);
        assert_eq!(tick_increment(0.0, 1000.0, 10), 100.0);
        assert_eq!(tick_increment(0.123, 0.456, 10), -20.0);
    }

    #[test]
    fn nice_rounds_outward() {
        assert_eq!(nice((0.0, 96.3), 10), (0.0, 100.0));
        assert_eq!(nice((12.3, 87.6), 10), (10.0, 90.0));
        assert_eq!(nice((0.123, 0.456), 10), (0.1, 0.5));
        assert_eq!(nice((1234.0, 5678.0), 10), (1000.0, 6000.0));
    }

    #[test]
    fn nice_keeps_orientation_and_degenerate_domains() {
        assert_eq!(nice((96.3, 0.0), 10), (100.0, 0.0));
        assert_eq!(nice((5.0, 5.0), 10), (5.0, 5.0));
        assert!(nice((f64::NAN, 1.0), 10).0.is_nan());
    }

    #[test]
    fn linear_scale_maps_and_inverts() {
        let s = LinearScale::new((1990.0, 2020.0), (0.0, 300.0));
        assert!(approx(s.apply(2005.0), 150.0));
        assert!(approx(s.invert(150.0), 2005.0));

        let flipped = LinearScale::new((0.0, 100.0), (400.0, 0.0));
        assert!(approx(flipped.apply(25.0), 300.0));

        let flat = LinearScale::new((7.0, 7.0), (0.0, 100.0));
        assert!(approx(flat.apply(7.0), 50.0));
    }

    #[test]
    fn rescale_matches_transformed_pixels() {
        let base = LinearScale::new((1990.0, 2020.0), (0.0, 600.0));
        let mut t = ZoomTransform::IDENTITY;
        t.scale_by(2.0, [150.0, 0.0], (1.0, 8.0));
        t.translate_by(-40.0, 0.0);

        let rescaled = t.rescale_x(&base);
        for year in [1990.0, 1999.0, 2011.5, 2020.0] {
            assert!(approx(rescaled.apply(year), t.apply_x(base.apply(year))));
        }
    }

    #[test]
    fn scale_by_keeps_anchor_fixed_and_clamps() {
        let mut t = ZoomTransform::IDENTITY;
        let anchor = [200.0, 120.0];
        let before = [t.invert_x(anchor[0]), t.invert_y(anchor[1])];
        t.scale_by(3.0, anchor, (1.0, 8.0));
        assert!(approx(t.k, 3.0));
        assert!(approx(t.invert_x(anchor[0]), before[0]));
        assert!(approx(t.invert_y(anchor[1]), before[1]));

        t.scale_by(100.0, anchor, (1.0, 8.0));
        assert!(approx(t.k, 8.0));
        t.scale_by(0.0001, anchor, (1.0, 8.0));
        assert!(approx(t.k, 1.0));
    }

    #[test]
    fn wheel_up_zooms_in() {
        assert!(wheel_zoom_factor(120.0) > 1.0);
        assert!(wheel_zoom_factor(-120.0) < 1.0);
        assert_eq!(wheel_zoom_factor(0.0), 1.0);
    }
}
