use std::path::PathBuf;

use eframe::egui::Color32;

use crate::chart::{ChartDomains, ChartView};
use crate::color;
use crate::config::ViewerConfig;
use crate::data::filter::country_view;
use crate::data::loader::{self, BackgroundLoader};
use crate::data::model::EmissionsDataset;

/// Label of the leading dropdown entry that selects nothing.
pub const PLACEHOLDER: &str = "Select a country";

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a load finishes).
    pub dataset: Option<EmissionsDataset>,

    /// Selected country; `None` while the placeholder is selected.
    pub selected_country: Option<String>,

    /// Indices of observations shown for the selection (cached).
    pub visible_indices: Vec<usize>,

    /// Axis domains, zoom and plot size.
    pub chart: ChartView,

    /// Observation under the pointer.
    pub hovered: Option<usize>,

    /// Marker styling.
    pub marker_radius: f32,
    pub point_color: Color32,

    pub tick_count: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// In-flight background load, if any.
    pub loader: Option<BackgroundLoader>,

    /// File the current dataset came from.
    pub source_path: Option<PathBuf>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

impl AppState {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            dataset: None,
            selected_country: None,
            visible_indices: Vec::new(),
            chart: ChartView::new(config.scale_extent()),
            hovered: None,
            marker_radius: config.marker_radius,
            point_color: color::parse_hex(&config.point_color).unwrap_or(color::STEEL_BLUE),
            tick_count: config.tick_count,
            status_message: None,
            loader: None,
            source_path: None,
        }
    }

    /// Ingest a newly loaded dataset and show the unselected chart.
    pub fn set_dataset(&mut self, dataset: EmissionsDataset) {
        self.selected_country = None;
        self.visible_indices.clear();
        self.hovered = None;
        self.chart
            .set_domains(ChartDomains::initial(&dataset, self.tick_count));
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Dropdown entries: the placeholder, then each country once in
    /// first-seen order.
    pub fn dropdown_entries(&self) -> Vec<&str> {
        let countries = self
            .dataset
            .as_ref()
            .map(|ds| ds.countries())
            .unwrap_or_default();
        std::iter::once(PLACEHOLDER)
            .chain(countries.iter().map(String::as_str))
            .collect()
    }

    /// Change the selection, refilter and recompute the axes.
    /// Selecting the placeholder clears the points and keeps the axes.
    pub fn select_country(&mut self, country: Option<String>) {
        if self.selected_country == country {
            return;
        }
        self.selected_country = country;
        self.hovered = None;
        let Some(ds) = &self.dataset else {
            return;
        };
        match &self.selected_country {
            Some(country) => {
                self.visible_indices = country_view(ds, country);
                self.chart.set_domains(ChartDomains::for_view(
                    ds,
                    &self.visible_indices,
                    self.tick_count,
                ));
                log::info!(
                    "Selected {country}: {} points, x {:?}, y {:?}",
                    self.visible_indices.len(),
                    self.chart.domains.x,
                    self.chart.domains.y
                );
            }
            None => {
                self.visible_indices.clear();
                self.chart.reset_zoom();
            }
        }
    }

    /// Kick off loading `path` on a worker thread. `wake` runs when done.
    pub fn start_loading(&mut self, path: PathBuf, wake: impl FnOnce() + Send + 'static) {
        if let Err(e) = loader::check_extension(&path) {
            self.fail_load(&path, e);
            return;
        }
        match BackgroundLoader::spawn(path.clone(), wake) {
            Ok(handle) => {
                self.status_message = Some(format!("Loading {}…", path.display()));
                self.loader = Some(handle);
            }
            Err(e) => self.fail_load(&path, e),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_some()
    }

    /// Apply a finished background load, if there is one.
    pub fn poll_loader(&mut self) {
        let Some(result) = self.loader.as_ref().and_then(|l| l.poll()) else {
            return;
        };
        let Some(handle) = self.loader.take() else {
            return;
        };
        let path = handle.path().to_path_buf();
        match result {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} observations for {} countries from {}",
                    dataset.len(),
                    dataset.countries().len(),
                    path.display()
                );
                self.set_dataset(dataset);
                self.source_path = Some(path);
            }
            Err(e) => self.fail_load(&path, e),
        }
    }

    fn fail_load(&mut self, path: &std::path::Path, e: anyhow::Error) {
        log::error!("Failed to load {}: {e:#}", path.display());
        self.status_message = Some(format!("Error: {e:#}"));
    }

    pub fn zoom_at(&mut self, factor: f64, anchor_px: [f64; 2]) {
        self.chart.zoom_at(factor, anchor_px);
        log::debug!("Zoom transform {:?}", self.chart.transform);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.chart.pan_by(dx, dy);
    }

    pub fn reset_zoom(&mut self) {
        self.chart.reset_zoom();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Observation;
    use std::time::{Duration, Instant};

    fn dataset() -> EmissionsDataset {
        EmissionsDataset::from_observations(vec![
            Observation::new("India", Some(1990), 1000.0),
            Observation::new("Kenya", Some(1990), 20.0),
            Observation::new("India", Some(1991), 0.0),
            Observation::new("India", Some(1992), 1100.0),
            Observation::new("Kenya", Some(2000), 31.0),
        ])
    }

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state
    }

    #[test]
    fn dropdown_lists_placeholder_then_countries() {
        let state = loaded();
        assert_eq!(state.dropdown_entries(), vec![PLACEHOLDER, "India", "Kenya"]);
        assert_eq!(AppState::default().dropdown_entries(), vec![PLACEHOLDER]);
    }

    #[test]
    fn selecting_a_country_filters_and_rescales() {
        let mut state = loaded();
        assert_eq!(state.chart.domains.x, (1990.0, 2000.0));
        assert_eq!(state.chart.domains.y, (0.0, 1100.0));

        state.select_country(Some("India".into()));
        assert_eq!(state.visible_indices, vec![0, 3]);
        assert_eq!(state.chart.domains.x, (1990.0, 1992.0));
        assert_eq!(state.chart.domains.y, (1000.0, 1100.0));

        state.select_country(Some("Kenya".into()));
        assert_eq!(state.visible_indices, vec![1, 4]);
        assert_eq!(state.chart.domains.y, (20.0, 31.0));
    }

    #[test]
    fn selection_change_resets_zoom_but_not_data() {
        let mut state = loaded();
        state.select_country(Some("India".into()));
        state.zoom_at(2.0, [100.0, 100.0]);
        state.pan_by(5.0, 5.0);
        assert!(!state.chart.transform.is_identity());

        state.select_country(Some("Kenya".into()));
        assert!(state.chart.transform.is_identity());
        assert_eq!(state.dataset.as_ref().map(|d| d.len()), Some(5));
    }

    #[test]
    fn placeholder_clears_points() {
        let mut state = loaded();
        state.select_country(Some("Kenya".into()));
        state.select_country(None);
        assert!(state.visible_indices.is_empty());
        assert_eq!(state.selected_country, None);
    }

    #[test]
    fn config_drives_styling_and_zoom_limits() {
        let config = ViewerConfig {
            marker_radius: 3.0,
            zoom_scale_extent: [1.0, 2.0],
            ..ViewerConfig::default()
        };
        let mut state = AppState::from_config(&config);
        assert_eq!(state.marker_radius, 3.0);
        assert_eq!(state.point_color, color::STEEL_BLUE);
        state.zoom_at(10.0, [0.0, 0.0]);
        assert_eq!(state.chart.transform.k, 2.0);
    }

    #[test]
    fn unsupported_file_sets_error_without_spawning() {
        let mut state = AppState::default();
        state.start_loading(PathBuf::from("emissions.xlsx"), || {});
        assert!(!state.is_loading());
        assert!(state
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Error")));
    }

    #[test]
    fn failed_background_load_is_reported() {
        let mut state = AppState::default();
        state.start_loading(PathBuf::from("/nonexistent/emissions.csv"), || {});
        assert!(state.is_loading());

        let deadline = Instant::now() + Duration::from_secs(10);
        while state.is_loading() {
            assert!(Instant::now() < deadline, "loader timed out");
            std::thread::sleep(Duration::from_millis(5));
            state.poll_loader();
        }
        assert!(state.dataset.is_none());
        assert!(state
            .status_message
            .as_deref()
            .is_some_and(|m| m.contains("emissions.csv")));
    }
}
