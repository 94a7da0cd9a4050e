use std::path::Path;

use crate::data::aggregate::{Dashboard, DashboardSettings};
use crate::data::filter::{apply, FilterSpec};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// `filters`, `visible_indices` and `dashboard` always describe the same filter
/// state: they are recomputed together and swapped in as a unit.
pub struct AppState {
    /// Passenger table, loaded once at startup.
    pub dataset: Dataset,

    /// Current filter selections.
    pub filters: FilterSpec,

    /// Indices of records passing `filters`.
    pub visible_indices: Vec<usize>,

    /// Aggregates derived from `visible_indices`.
    pub dashboard: Dashboard,

    pub settings: DashboardSettings,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dataset: Dataset, filters: FilterSpec, settings: DashboardSettings) -> Self {
        let mut state = Self {
            dataset,
            filters,
            visible_indices: Vec::new(),
            dashboard: Dashboard::default(),
            settings,
            status_message: None,
        };
        state.refilter();
        state
    }

    /// Replace the filter state. No-op when nothing changed.
    pub fn set_filters(&mut self, spec: FilterSpec) {
        if spec != self.filters {
            self.filters = spec;
            self.refilter();
        }
    }

    /// Back to every value selected and full ranges.
    pub fn reset_filters(&mut self) {
        self.set_filters(FilterSpec::unrestricted(&self.dataset));
        self.status_message = None;
    }

    /// Recompute the view and every aggregate from `filters`.
    fn refilter(&mut self) {
        let view = apply(&self.dataset, &self.filters);
        let dashboard = Dashboard::compute(&view, &self.settings);
        log::debug!(
            "{} of {} passengers match {:?}",
            view.len(),
            self.dataset.len(),
            self.filters
        );
        self.visible_indices = view.into_indices();
        self.dashboard = dashboard;
    }

    pub fn load_preset(&mut self, path: &Path) {
        match FilterSpec::load_json(path) {
            Ok(spec) => {
                log::info!("Loaded filter preset {}", path.display());
                self.set_filters(spec);
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("Failed to load filter preset: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn save_preset(&mut self, path: &Path) {
        match self.filters.save_json(path) {
            Ok(()) => {
                log::info!("Saved filter preset {}", path.display());
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to save filter preset: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::four_passengers;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn state() -> AppState {
        let ds = four_passengers();
        let spec = FilterSpec::unrestricted(&ds);
        AppState::new(ds, spec, DashboardSettings::default())
    }

    #[test]
    fn new_state_shows_everything() {
        let state = state();
        assert_eq!(state.visible_indices, vec![0, 1, 2, 3]);
        assert_eq!(state.dashboard.summary.total, 4);
        assert_eq!(state.dashboard.summary.survived, 2);
    }

    #[test]
    fn set_filters_replaces_view_and_dashboard_together() {
        let mut state = state();
        let mut spec = state.filters.clone();
        spec.sexes = BTreeSet::from(["male".to_string()]);

        state.set_filters(spec);

        assert_eq!(state.visible_indices, vec![1, 3]);
        assert_eq!(state.dashboard.summary.total, 2);
        assert_eq!(state.dashboard.summary.rate, 0.0);
    }

    #[test]
    fn reset_restores_unrestricted_view() {
        let mut state = state();
        let mut spec = state.filters.clone();
        spec.classes.clear();
        state.set_filters(spec);
        assert!(state.dashboard.is_empty());

        state.reset_filters();
        assert_eq!(state.visible_indices.len(), 4);
    }

    #[test]
    fn preset_round_trip_through_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("women.json");
        let mut state = state();
        let mut spec = state.filters.clone();
        spec.sexes = BTreeSet::from(["female".to_string()]);
        state.set_filters(spec);
        state.save_preset(&path);

        let mut other = self::state();
        other.load_preset(&path);

        assert_eq!(other.filters, state.filters);
        assert_eq!(other.visible_indices, state.visible_indices);
        assert!(other.status_message.is_none());
    }

    #[test]
    fn bad_preset_keeps_filters_and_reports() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let mut state = state();

        state.load_preset(&path);

        assert_eq!(state.visible_indices.len(), 4);
        assert!(state.status_message.as_deref().unwrap().starts_with("Error"));
    }
}
