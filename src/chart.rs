use crate::data::model::{EmissionsDataset, Observation};
use crate::scale::{self, LinearScale, ZoomTransform};

/// Fallback domain when there is nothing numeric to measure.
const EMPTY_DOMAIN: (f64, f64) = (0.0, 1.0);

// ---------------------------------------------------------------------------
// Axis domains
// ---------------------------------------------------------------------------

/// Unzoomed x (year) and y (emissions) domains.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartDomains {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl Default for ChartDomains {
    fn default() -> Self {
        Self {
            x: EMPTY_DOMAIN,
            y: EMPTY_DOMAIN,
        }
    }
}

impl ChartDomains {
    /// Domains shown before any country is selected: every year, and
    /// emissions from zero up to the niced maximum.
    pub fn initial(dataset: &EmissionsDataset, tick_count: usize) -> Self {
        let x = dataset.year_extent().unwrap_or(EMPTY_DOMAIN);
        let y = dataset
            .emissions_max()
            .map(|max| scale::nice((0.0, max), tick_count))
            .unwrap_or(EMPTY_DOMAIN);
        Self { x, y }
    }

    /// Domains for a filtered view: min/max year, niced min/max emissions.
    /// Views with nothing numeric fall back to [`ChartDomains::initial`].
    pub fn for_view(dataset: &EmissionsDataset, indices: &[usize], tick_count: usize) -> Self {
        let rows = || indices.iter().filter_map(move |&i| dataset.get(i));
        let x = scale::extent(rows().filter_map(|o| o.year.map(f64::from)));
        let y = scale::extent(rows().map(|o| o.greenhouse_gas_emissions));
        match (x, y) {
            (Some(x), Some(y)) => Self {
                x,
                y: scale::nice(y, tick_count),
            },
            _ => Self::initial(dataset, tick_count),
        }
    }
}

// ---------------------------------------------------------------------------
// Chart view: domains + zoom + plot-area size
// ---------------------------------------------------------------------------

/// Everything needed to place a point on screen.
#[derive(Clone, Debug)]
pub struct ChartView {
    pub domains: ChartDomains,
    pub transform: ZoomTransform,
    /// Plot area size in points (width, height).
    pub size: [f64; 2],
    /// Allowed range for the zoom level `k`.
    pub scale_extent: (f64, f64),
}

impl Default for ChartView {
    fn default() -> Self {
        Self {
            domains: ChartDomains::default(),
            transform: ZoomTransform::IDENTITY,
            size: [640.0, 430.0],
            scale_extent: (1.0, 8.0),
        }
    }
}

impl ChartView {
    pub fn new(scale_extent: (f64, f64)) -> Self {
        Self {
            scale_extent,
            ..Self::default()
        }
    }

    /// Replace the domains and drop any zoom.
    pub fn set_domains(&mut self, domains: ChartDomains) {
        self.domains = domains;
        self.transform = ZoomTransform::IDENTITY;
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.size = [width, height];
        }
    }

    pub fn base_x(&self) -> LinearScale {
        LinearScale::new(self.domains.x, (0.0, self.size[0]))
    }

    /// Screen y grows downward, so the range is flipped.
    pub fn base_y(&self) -> LinearScale {
        LinearScale::new(self.domains.y, (self.size[1], 0.0))
    }

    pub fn visible_x(&self) -> LinearScale {
        self.transform.rescale_x(&self.base_x())
    }

    pub fn visible_y(&self) -> LinearScale {
        self.transform.rescale_y(&self.base_y())
    }

    /// Visible data rectangle as `([x_min, y_min], [x_max, y_max])`.
    /// Zero-width spans are widened so the plot can still be drawn.
    pub fn visible_bounds(&self) -> ([f64; 2], [f64; 2]) {
        let (x0, x1) = ordered(self.visible_x().domain);
        let (y0, y1) = ordered(self.visible_y().domain);
        let (x0, x1) = widen_degenerate(x0, x1);
        let (y0, y1) = widen_degenerate(y0, y1);
        ([x0, y0], [x1, y1])
    }

    /// Plot-area pixel position of a data point, through the rescaled axes.
    /// A degenerate axis keeps its point centred at any zoom.
    pub fn point_px(&self, point: [f64; 2]) -> [f64; 2] {
        [self.visible_x().apply(point[0]), self.visible_y().apply(point[1])]
    }

    pub fn zoom_at(&mut self, factor: f64, anchor_px: [f64; 2]) {
        self.transform.scale_by(factor, anchor_px, self.scale_extent);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.transform.translate_by(dx, dy);
    }

    pub fn reset_zoom(&mut self) {
        self.transform = ZoomTransform::IDENTITY;
    }
}

fn ordered((a, b): (f64, f64)) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

fn widen_degenerate(lo: f64, hi: f64) -> (f64, f64) {
    if hi > lo {
        return (lo, hi);
    }
    let pad = (lo.abs() * 0.001).max(1.0);
    (lo - pad, hi + pad)
}

// ---------------------------------------------------------------------------
// Hover / tooltip
// ---------------------------------------------------------------------------

/// Nearest point within `radius` of `pointer`, returning its key.
pub fn hit_test<K: Copy>(
    points_px: impl IntoIterator<Item = (K, [f64; 2])>,
    pointer: [f64; 2],
    radius: f64,
) -> Option<K> {
    let r2 = radius * radius;
    points_px
        .into_iter()
        .map(|(key, [x, y])| {
            let (dx, dy) = (x - pointer[0], y - pointer[1]);
            (key, dx * dx + dy * dy)
        })
        .filter(|&(_, d2)| d2 <= r2)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key)
}

pub fn tooltip_text(obs: &Observation) -> String {
    let year = obs
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "NaN".to_string());
    format!(
        "Year: {year}\nGreenhouse Gas Emissions: {}",
        format_number(obs.greenhouse_gas_emissions)
    )
}

/// Shortest decimal form, switching to `1.5e+21` / `1e-7` notation outside
/// `[1e-6, 1e21)` in magnitude.
pub fn format_number(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if v == 0.0 {
        return "0".to_string();
    }
    let magnitude = v.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return v.to_string();
    }
    let s = format!("{v:e}");
    match s.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::country_view;

    fn dataset() -> EmissionsDataset {
        EmissionsDataset::from_observations(vec![
            Observation::new("Brazil", Some(1990), 1180.0),
            Observation::new("Brazil", Some(1991), 0.0),
            Observation::new("Brazil", Some(2005), 1443.7),
            Observation::new("Chile", Some(1985), 35.2),
            Observation::new("Chile", Some(2019), 112.9),
            Observation::new("Brazil", Some(2012), 1012.4),
        ])
    }

    #[test]
    fn initial_domains_span_all_years_and_zero_to_nice_max() {
        let d = ChartDomains::initial(&dataset(), 10);
        assert_eq!(d.x, (1985.0, 2019.0));
        assert_eq!(d.y, (0.0, 1600.0));
    }

    #[test]
    fn view_domains_use_year_extent_and_niced_emissions() {
        let ds = dataset();
        let view = country_view(&ds, "Brazil");
        let d = ChartDomains::for_view(&ds, &view, 10);
        assert_eq!(d.x, (1990.0, 2012.0));
        assert_eq!(d.y, (1000.0, 1450.0));
    }

    #[test]
    fn empty_view_falls_back_to_initial() {
        let ds = dataset();
        assert_eq!(
            ChartDomains::for_view(&ds, &[], 10),
            ChartDomains::initial(&ds, 10)
        );
    }

    #[test]
    fn zoom_moves_points_with_the_transform_only() {
        let ds = dataset();
        let view = country_view(&ds, "Chile");
        let mut chart = ChartView::new((1.0, 8.0));
        chart.set_size(600.0, 400.0);
        chart.set_domains(ChartDomains::for_view(&ds, &view, 10));

        let p = ds.get(view[1]).and_then(|o| o.point()).unwrap();
        assert_eq!(chart.point_px(p)[0], 600.0);

        chart.zoom_at(2.5, [300.0, 200.0]);
        chart.pan_by(12.0, -7.0);
        let zoomed = chart.point_px(p);
        // The rescaled axes place the point exactly where the transform does.
        assert!((zoomed[0] - (600.0 * 2.5 + chart.transform.x)).abs() < 1e-9);

        assert_eq!(ds.get(view[1]).unwrap().greenhouse_gas_emissions, 112.9);
        chart.reset_zoom();
        assert!(chart.transform.is_identity());
    }

    #[test]
    fn new_domains_reset_zoom() {
        let mut chart = ChartView::default();
        chart.zoom_at(4.0, [10.0, 10.0]);
        chart.set_domains(ChartDomains::default());
        assert!(chart.transform.is_identity());
    }

    #[test]
    fn visible_bounds_widen_single_point_views() {
        let ds = EmissionsDataset::from_observations(vec![Observation::new(
            "Nauru",
            Some(2000),
            3.0,
        )]);
        let mut chart = ChartView::default();
        chart.set_domains(ChartDomains::for_view(&ds, &[0], 10));
        let (min, max) = chart.visible_bounds();
        assert!(min[0] < 2000.0 && max[0] > 2000.0);
        assert!(min[1] < 3.0 && max[1] > 3.0);
    }

    #[test]
    fn hit_test_picks_nearest_within_radius() {
        let pts = vec![(0usize, [10.0, 10.0]), (1, [14.0, 10.0]), (2, [100.0, 100.0])];
        assert_eq!(hit_test(pts.clone(), [13.0, 10.0], 5.0), Some(1));
        assert_eq!(hit_test(pts, [50.0, 50.0], 5.0), None);
    }

    #[test]
    fn single_point_hit_position_follows_the_drawn_marker() {
        let ds = EmissionsDataset::from_observations(vec![Observation::new(
            "Nauru",
            Some(2000),
            3.0,
        )]);
        let mut chart = ChartView::new((1.0, 8.0));
        chart.set_size(600.0, 400.0);
        chart.set_domains(ChartDomains::for_view(&ds, &[0], 10));
        let p = [2000.0, 3.0];

        chart.zoom_at(2.0, [0.0, 0.0]);
        chart.pan_by(35.0, -20.0);

        // The marker is drawn at the centre of the padded bounds.
        let (min, max) = chart.visible_bounds();
        let drawn = [
            (p[0] - min[0]) / (max[0] - min[0]) * 600.0,
            (max[1] - p[1]) / (max[1] - min[1]) * 400.0,
        ];
        let hit = chart.point_px(p);
        assert!((hit[0] - drawn[0]).abs() < 1e-9);
        assert!((hit[1] - drawn[1]).abs() < 1e-9);
        assert_eq!(hit_test([(0usize, hit)], [300.0, 200.0], 5.0), Some(0));
    }

    #[test]
    fn numbers_switch_to_exponent_form_at_the_extremes() {
        assert_eq!(format_number(112.9), "112.9");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e22), "-2.5e+22");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn tooltip_shows_year_and_value() {
        let obs = Observation::new("Chile", Some(2019), 112.9);
        assert_eq!(
            tooltip_text(&obs),
            "Year: 2019\nGreenhouse Gas Emissions: 112.9"
        );
    }
}
