use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::FilterError;
use super::model::{Dataset, PassengerClass, Port, Record};

// ---------------------------------------------------------------------------
// RangeFilter – inclusive numeric bounds
// ---------------------------------------------------------------------------

/// Inclusive `[min, max]` range. Always `min <= max` with finite bounds when
/// built through [`RangeFilter::new`] or [`RangeFilter::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    pub min: f64,
    pub max: f64,
}

impl RangeFilter {
    /// Validated constructor. `field` names the range in the error.
    pub fn new(field: &'static str, min: f64, max: f64) -> Result<Self, FilterError> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(FilterError::InvalidRange { field, min, max });
        }
        Ok(Self { min, max })
    }

    /// Boundary constructor for UI input: orders the two ends and clamps them
    /// into `bounds`. Non-finite ends snap to the nearest bound.
    pub fn clamped(a: f64, b: f64, bounds: (f64, f64)) -> Self {
        let (lo, hi) = bounds;
        let fix = |v: f64, fallback: f64| if v.is_finite() { v.clamp(lo, hi) } else { fallback };
        let a = fix(a, lo);
        let b = fix(b, hi);
        if a > b {
            log::warn!("swapping inverted range [{a}, {b}]");
            Self { min: b, max: a }
        } else {
            Self { min: a, max: b }
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

// ---------------------------------------------------------------------------
// FilterSpec – the complete selection state
// ---------------------------------------------------------------------------

/// What an empty categorical selection means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmptySelection {
    /// Nothing selected, nothing passes.
    #[default]
    MatchNone,
    /// Nothing selected is the same as no restriction.
    MatchAll,
}

/// Every user-selected criterion at a point in time. Built fresh from UI state
/// on each interaction and replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub sexes: BTreeSet<String>,
    pub classes: BTreeSet<PassengerClass>,
    pub embarked_ports: BTreeSet<Port>,
    pub age_range: RangeFilter,
    pub include_missing_age: bool,
    pub fare_range: RangeFilter,
    #[serde(default)]
    pub empty_selection: EmptySelection,
}

impl FilterSpec {
    /// The default state: every observed value selected, ranges at the observed
    /// bounds, missing ages included.
    pub fn unrestricted(dataset: &Dataset) -> Self {
        let (age_min, age_max) = dataset.age_bounds.unwrap_or((0.0, 0.0));
        let (fare_min, fare_max) = dataset.fare_bounds.unwrap_or((0.0, 0.0));
        FilterSpec {
            sexes: dataset.sexes.clone(),
            classes: dataset.classes.clone(),
            embarked_ports: dataset.ports.clone(),
            age_range: RangeFilter { min: age_min, max: age_max },
            include_missing_age: true,
            fare_range: RangeFilter { min: fare_min, max: fare_max },
            empty_selection: EmptySelection::default(),
        }
    }

    /// Read a preset written by [`FilterSpec::save_json`]. Ranges are re-validated.
    pub fn load_json(path: &Path) -> Result<Self, FilterError> {
        let text = std::fs::read_to_string(path).map_err(|source| FilterError::PresetIo {
            path: path.to_path_buf(),
            source,
        })?;
        let spec: FilterSpec = serde_json::from_str(&text)?;
        RangeFilter::new("age", spec.age_range.min, spec.age_range.max)?;
        RangeFilter::new("fare", spec.fare_range.min, spec.fare_range.max)?;
        Ok(spec)
    }

    pub fn save_json(&self, path: &Path) -> Result<(), FilterError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|source| FilterError::PresetIo {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// FilteredView – the records that pass
// ---------------------------------------------------------------------------

/// The subsequence of a [`Dataset`] passing a [`FilterSpec`], in file order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = &self.dataset.records;
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

// ---------------------------------------------------------------------------
// FilterEngine
// ---------------------------------------------------------------------------

/// Resolved behaviour of one categorical filter for a given dataset.
enum Gate<'s, T> {
    Open,
    Closed,
    Members(&'s BTreeSet<T>),
}

impl<'s, T: Ord> Gate<'s, T> {
    /// A selection covering the whole observed domain is unrestricted, so
    /// records with a missing value still pass. This includes an empty
    /// selection over a column with no observed values. Any other empty
    /// selection defers to the [`EmptySelection`] policy.
    fn resolve(selected: &'s BTreeSet<T>, domain: &BTreeSet<T>, empty: EmptySelection) -> Self {
        if domain.is_subset(selected) {
            Gate::Open
        } else if selected.is_empty() {
            match empty {
                EmptySelection::MatchNone => Gate::Closed,
                EmptySelection::MatchAll => Gate::Open,
            }
        } else {
            Gate::Members(selected)
        }
    }

    fn admits(&self, value: Option<&T>) -> bool {
        match self {
            Gate::Open => true,
            Gate::Closed => false,
            Gate::Members(set) => value.is_some_and(|v| set.contains(v)),
        }
    }
}

/// Return the records of `dataset` that pass every filter in `spec`.
///
/// A record passes when all of these hold:
/// * fare lies in `fare_range`
/// * its class, port and sex pass their categorical gates
/// * its age lies in `age_range`, or it has no age and `include_missing_age`
pub fn apply<'a>(dataset: &'a Dataset, spec: &FilterSpec) -> FilteredView<'a> {
    let empty = spec.empty_selection;
    let sexes = Gate::resolve(&spec.sexes, &dataset.sexes, empty);
    let classes = Gate::resolve(&spec.classes, &dataset.classes, empty);
    let ports = Gate::resolve(&spec.embarked_ports, &dataset.ports, empty);

    let indices = dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            spec.fare_range.contains(rec.fare)
                && classes.admits(Some(&rec.passenger_class))
                && ports.admits(rec.embarked.as_ref())
                && match rec.age {
                    Some(age) => spec.age_range.contains(age),
                    None => spec.include_missing_age,
                }
                && sexes.admits(Some(&rec.sex))
        })
        .map(|(i, _)| i)
        .collect();

    FilteredView { dataset, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{four_passengers, record};
    use tempfile::TempDir;

    fn scenario_spec() -> FilterSpec {
        FilterSpec {
            sexes: BTreeSet::from(["female".to_string()]),
            classes: BTreeSet::from([PassengerClass::First]),
            embarked_ports: BTreeSet::from([Port::C]),
            age_range: RangeFilter::new("age", 0.0, 100.0).unwrap(),
            include_missing_age: true,
            fare_range: RangeFilter::new("fare", 0.0, 100.0).unwrap(),
            empty_selection: EmptySelection::MatchNone,
        }
    }

    #[test]
    fn unrestricted_spec_returns_everything_in_order() {
        let mut records = four_passengers().records;
        records.push(record(true, "female", None, 3.0, PassengerClass::Second, None));
        let ds = Dataset::from_records(records);

        let view = apply(&ds, &FilterSpec::unrestricted(&ds));

        assert_eq!(view.indices(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn scenario_keeps_first_class_women_from_cherbourg() {
        let ds = four_passengers();
        let view = apply(&ds, &scenario_spec());

        assert_eq!(view.indices(), &[0, 2]);
        assert!(view.records().all(|r| r.sex == "female"));
    }

    #[test]
    fn missing_age_policy() {
        let ds = four_passengers();
        let mut spec = scenario_spec();
        spec.include_missing_age = false;

        assert_eq!(apply(&ds, &spec).indices(), &[0]);
    }

    #[test]
    fn age_range_is_inclusive_at_both_ends() {
        let ds = four_passengers();
        let mut spec = FilterSpec::unrestricted(&ds);
        spec.age_range = RangeFilter::new("age", 28.0, 35.0).unwrap();
        spec.include_missing_age = false;

        assert_eq!(apply(&ds, &spec).indices(), &[1, 3]);
    }

    #[test]
    fn fare_range_is_inclusive() {
        let ds = four_passengers();
        let mut spec = FilterSpec::unrestricted(&ds);
        spec.fare_range = RangeFilter::new("fare", 8.0, 10.0).unwrap();

        assert_eq!(apply(&ds, &spec).indices(), &[0, 1]);
    }

    #[test]
    fn empty_selection_matches_nothing_by_default() {
        let ds = four_passengers();
        let mut spec = FilterSpec::unrestricted(&ds);
        spec.classes.clear();

        assert!(apply(&ds, &spec).is_empty());
    }

    #[test]
    fn empty_selection_can_mean_all() {
        let ds = four_passengers();
        let mut spec = FilterSpec::unrestricted(&ds);
        spec.embarked_ports.clear();
        spec.empty_selection = EmptySelection::MatchAll;

        assert_eq!(apply(&ds, &spec).len(), 4);
    }

    #[test]
    fn missing_port_passes_only_an_unrestricted_port_filter() {
        let mut records = four_passengers().records;
        records[1].embarked = None;
        let ds = Dataset::from_records(records);

        let mut spec = FilterSpec::unrestricted(&ds);
        assert_eq!(apply(&ds, &spec).len(), 4);

        spec.embarked_ports = BTreeSet::from([Port::C]);
        assert_eq!(apply(&ds, &spec).indices(), &[0, 2]);
    }

    #[test]
    fn column_without_observed_values_does_not_restrict() {
        let mut records = four_passengers().records;
        for rec in &mut records {
            rec.embarked = None;
        }
        let ds = Dataset::from_records(records);
        assert!(ds.ports.is_empty());

        let spec = FilterSpec::unrestricted(&ds);
        assert_eq!(apply(&ds, &spec).indices(), &[0, 1, 2, 3]);

        let mut narrowed = spec.clone();
        narrowed.sexes = BTreeSet::from(["male".to_string()]);
        assert_eq!(apply(&ds, &narrowed).indices(), &[1, 3]);
    }

    #[test]
    fn apply_is_idempotent() {
        let ds = four_passengers();
        let spec = scenario_spec();

        let first = apply(&ds, &spec);
        let second = apply(&ds, &spec);

        assert_eq!(first.indices(), second.indices());
    }

    #[test]
    fn invalid_range_is_rejected() {
        let err = RangeFilter::new("age", 50.0, 10.0).unwrap_err();
        assert!(matches!(err, FilterError::InvalidRange { field: "age", .. }));
        assert!(RangeFilter::new("fare", f64::NAN, 10.0).is_err());
    }

    #[test]
    fn clamped_orders_and_bounds_input() {
        let r = RangeFilter::clamped(90.0, -5.0, (0.0, 80.0));
        assert_eq!(r, RangeFilter { min: 0.0, max: 80.0 });

        let r = RangeFilter::clamped(f64::NAN, 30.0, (0.0, 80.0));
        assert_eq!(r, RangeFilter { min: 0.0, max: 30.0 });
    }

    #[test]
    fn preset_round_trip_reproduces_view() {
        let ds = four_passengers();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preset.json");
        let spec = scenario_spec();

        spec.save_json(&path).unwrap();
        let loaded = FilterSpec::load_json(&path).unwrap();

        assert_eq!(loaded, spec);
        assert_eq!(apply(&ds, &loaded).indices(), apply(&ds, &spec).indices());
    }

    #[test]
    fn preset_with_inverted_range_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preset.json");
        let mut spec = scenario_spec();
        spec.fare_range = RangeFilter { min: 9.0, max: 1.0 };
        spec.save_json(&path).unwrap();

        let err = FilterSpec::load_json(&path).unwrap_err();
        assert!(matches!(err, FilterError::InvalidRange { field: "fare", .. }));
    }
}
