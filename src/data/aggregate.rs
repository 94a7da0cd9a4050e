use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::filter::FilteredView;
use super::model::{Category, CategoryValue, PassengerClass, Port};

// ---------------------------------------------------------------------------
// Survival tallies
// ---------------------------------------------------------------------------

/// Running count of survivors within a group.
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    survived: usize,
    total: usize,
}

impl Tally {
    fn add(&mut self, survived: bool) {
        self.total += 1;
        if survived {
            self.survived += 1;
        }
    }

    /// Survival percentage, 0 for an empty tally.
    fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.survived as f64 / self.total as f64 * 100.0
        }
    }
}

/// Round to one decimal place, ties to even (pandas `.round(1)`).
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

// ---------------------------------------------------------------------------
// Headline metrics
// ---------------------------------------------------------------------------

/// Survival percentage over the whole view; 0 when the view is empty.
pub fn overall_survival_rate(view: &FilteredView<'_>) -> f64 {
    let mut tally = Tally::default();
    view.records().for_each(|r| tally.add(r.survived));
    tally.rate()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SurvivalSummary {
    pub total: usize,
    pub survived: usize,
    pub died: usize,
    /// Unrounded percentage.
    pub rate: f64,
}

pub fn survival_summary(view: &FilteredView<'_>) -> SurvivalSummary {
    let survived = view.records().filter(|r| r.survived).count();
    SurvivalSummary {
        total: view.len(),
        survived,
        died: view.len() - survived,
        rate: overall_survival_rate(view),
    }
}

// ---------------------------------------------------------------------------
// GroupRateTable – rate per observed category value
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRate {
    pub key: CategoryValue,
    pub rate: f64,
    pub count: usize,
}

/// Rates keyed by observed value, ascending by key. Never holds zero-count rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GroupRateTable {
    pub category: Option<Category>,
    pub entries: Vec<GroupRate>,
}

impl GroupRateTable {
    pub fn get(&self, key: &CategoryValue) -> Option<f64> {
        self.entries.iter().find(|e| &e.key == key).map(|e| e.rate)
    }
}

/// Survival rate (rounded to 0.1) for each value of `category` present in the
/// view. Records with a missing value are dropped.
pub fn rate_by_category(view: &FilteredView<'_>, category: Category) -> GroupRateTable {
    let mut groups: BTreeMap<CategoryValue, Tally> = BTreeMap::new();
    for rec in view.records() {
        if let Some(key) = rec.category(category) {
            groups.entry(key).or_default().add(rec.survived);
        }
    }

    GroupRateTable {
        category: Some(category),
        entries: groups
            .into_iter()
            .map(|(key, tally)| GroupRate {
                key,
                rate: round1(tally.rate()),
                count: tally.total,
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// PivotTable – two categorical axes
// ---------------------------------------------------------------------------

/// Dense grid of rates; `cells[r][c]` is `None` when no record has that
/// combination of row and column values.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PivotTable {
    pub row_category: Option<Category>,
    pub col_category: Option<Category>,
    pub rows: Vec<CategoryValue>,
    pub columns: Vec<CategoryValue>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl PivotTable {
    pub fn get(&self, row: &CategoryValue, col: &CategoryValue) -> Option<f64> {
        let r = self.rows.iter().position(|v| v == row)?;
        let c = self.columns.iter().position(|v| v == col)?;
        self.cells[r][c]
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn pivot_rate(view: &FilteredView<'_>, row_key: Category, col_key: Category) -> PivotTable {
    let mut groups: BTreeMap<(CategoryValue, CategoryValue), Tally> = BTreeMap::new();
    for rec in view.records() {
        if let (Some(r), Some(c)) = (rec.category(row_key), rec.category(col_key)) {
            groups.entry((r, c)).or_default().add(rec.survived);
        }
    }

    let rows: Vec<CategoryValue> = groups
        .keys()
        .map(|(r, _)| r.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let columns: Vec<CategoryValue> = groups
        .keys()
        .map(|(_, c)| c.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let cells = rows
        .iter()
        .map(|r| {
            columns
                .iter()
                .map(|c| {
                    groups
                        .get(&(r.clone(), c.clone()))
                        .map(|t| round1(t.rate()))
                })
                .collect()
        })
        .collect();

    PivotTable {
        row_category: Some(row_key),
        col_category: Some(col_key),
        rows,
        columns,
        cells,
    }
}

// ---------------------------------------------------------------------------
// RankedGroups – top / bottom groups by rate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RankDirection {
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedGroup {
    pub key: Vec<CategoryValue>,
    pub rate: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RankedGroups {
    pub keys: Vec<Category>,
    pub rows: Vec<RankedGroup>,
}

/// Group by the full `group_keys` tuple and return at most `n` groups ordered
/// by rounded rate. Groups with equal rates stay in ascending key order.
/// Records missing any key are dropped.
pub fn grouped_rank(
    view: &FilteredView<'_>,
    group_keys: &[Category],
    n: usize,
    direction: RankDirection,
) -> RankedGroups {
    let mut groups: BTreeMap<Vec<CategoryValue>, Tally> = BTreeMap::new();
    for rec in view.records() {
        let key: Option<Vec<CategoryValue>> =
            group_keys.iter().map(|&k| rec.category(k)).collect();
        if let Some(key) = key {
            groups.entry(key).or_default().add(rec.survived);
        }
    }

    let mut rows: Vec<RankedGroup> = groups
        .into_iter()
        .map(|(key, tally)| RankedGroup {
            key,
            rate: round1(tally.rate()),
            count: tally.total,
        })
        .collect();

    // sort_by is stable: ties keep key order.
    match direction {
        RankDirection::Top => rows.sort_by(|a, b| b.rate.total_cmp(&a.rate)),
        RankDirection::Bottom => rows.sort_by(|a, b| a.rate.total_cmp(&b.rate)),
    }
    rows.truncate(n);

    RankedGroups {
        keys: group_keys.to_vec(),
        rows,
    }
}

// ---------------------------------------------------------------------------
// Chart extraction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeBin {
    pub start: f64,
    pub end: f64,
    pub survived: usize,
    pub died: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AgeHistogram {
    pub bins: Vec<AgeBin>,
}

impl AgeHistogram {
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn bin_width(&self) -> f64 {
        self.bins.first().map_or(0.0, |b| b.end - b.start)
    }
}

/// `bin_count` equal-width bins spanning the ages present in the view, split by
/// outcome. The last bin is closed on the right. A single distinct age gives
/// bins of width 1 starting at that age.
pub fn age_histogram_buckets(view: &FilteredView<'_>, bin_count: usize) -> AgeHistogram {
    let ages: Vec<(f64, bool)> = view
        .records()
        .filter_map(|r| r.age.map(|a| (a, r.survived)))
        .collect();
    if ages.is_empty() || bin_count == 0 {
        return AgeHistogram::default();
    }

    let lo = ages.iter().map(|(a, _)| *a).fold(f64::INFINITY, f64::min);
    let hi = ages.iter().map(|(a, _)| *a).fold(f64::NEG_INFINITY, f64::max);
    let width = if hi > lo { (hi - lo) / bin_count as f64 } else { 1.0 };

    let mut bins: Vec<AgeBin> = (0..bin_count)
        .map(|i| AgeBin {
            start: lo + i as f64 * width,
            end: lo + (i + 1) as f64 * width,
            survived: 0,
            died: 0,
        })
        .collect();

    for (age, survived) in ages {
        let idx = (((age - lo) / width) as usize).min(bin_count - 1);
        if survived {
            bins[idx].survived += 1;
        } else {
            bins[idx].died += 1;
        }
    }

    AgeHistogram { bins }
}

/// One point of the fare-versus-age scatter plot, with hover details.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub age: f64,
    pub fare: f64,
    pub survived: bool,
    pub passenger_class: PassengerClass,
    pub sex: String,
    pub embarked: Option<Port>,
}

/// Records with a known age, as scatter points in view order.
pub fn scatter_pairs(view: &FilteredView<'_>) -> Vec<ScatterPoint> {
    view.records()
        .filter_map(|r| {
            r.age.map(|age| ScatterPoint {
                age,
                fare: r.fare,
                survived: r.survived,
                passenger_class: r.passenger_class,
                sex: r.sex.clone(),
                embarked: r.embarked,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Dashboard – everything the presentation layer shows
// ---------------------------------------------------------------------------

/// Knobs for [`Dashboard::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    pub histogram_bins: usize,
    pub rank_size: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            histogram_bins: 30,
            rank_size: 5,
        }
    }
}

/// Columns the top / bottom tables group by.
pub const RANK_KEYS: [Category; 3] = [Category::Sex, Category::Pclass, Category::Embarked];

/// All derived views for one filter state, computed independently from the
/// same [`FilteredView`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Dashboard {
    pub summary: SurvivalSummary,
    pub rate_by_sex: GroupRateTable,
    pub port_by_class: PivotTable,
    pub top_groups: RankedGroups,
    pub bottom_groups: RankedGroups,
    pub age_histogram: AgeHistogram,
    pub scatter: Vec<ScatterPoint>,
}

impl Dashboard {
    pub fn compute(view: &FilteredView<'_>, settings: &DashboardSettings) -> Self {
        Dashboard {
            summary: survival_summary(view),
            rate_by_sex: rate_by_category(view, Category::Sex),
            port_by_class: pivot_rate(view, Category::Embarked, Category::Pclass),
            top_groups: grouped_rank(view, &RANK_KEYS, settings.rank_size, RankDirection::Top),
            bottom_groups: grouped_rank(
                view,
                &RANK_KEYS,
                settings.rank_size,
                RankDirection::Bottom,
            ),
            age_histogram: age_histogram_buckets(view, settings.histogram_bins),
            scatter: scatter_pairs(view),
        }
    }

    /// Whether the filter produced no rows at all.
    pub fn is_empty(&self) -> bool {
        self.summary.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilterSpec};
    use crate::data::model::fixtures::{four_passengers, record};
    use crate::data::model::Dataset;
    use std::collections::BTreeSet;

    fn female() -> CategoryValue {
        CategoryValue::Sex("female".to_string())
    }

    fn male() -> CategoryValue {
        CategoryValue::Sex("male".to_string())
    }

    fn full_view(ds: &Dataset) -> FilteredView<'_> {
        apply(ds, &FilterSpec::unrestricted(ds))
    }

    #[test]
    fn scenario_rates() {
        let ds = four_passengers();
        let mut spec = FilterSpec::unrestricted(&ds);
        spec.sexes = BTreeSet::from(["female".to_string()]);
        spec.classes = BTreeSet::from([PassengerClass::First]);
        spec.embarked_ports = BTreeSet::from([Port::C]);
        let view = apply(&ds, &spec);

        assert_eq!(overall_survival_rate(&view), 100.0);
        let by_sex = rate_by_category(&view, Category::Sex);
        assert_eq!(by_sex.entries.len(), 1);
        assert_eq!(by_sex.get(&female()), Some(100.0));
    }

    #[test]
    fn empty_view_degrades_to_zero() {
        let ds = four_passengers();
        let mut spec = FilterSpec::unrestricted(&ds);
        spec.sexes.clear();
        let view = apply(&ds, &spec);

        assert_eq!(overall_survival_rate(&view), 0.0);
        assert!(rate_by_category(&view, Category::Sex).entries.is_empty());
        assert!(pivot_rate(&view, Category::Embarked, Category::Pclass).is_empty());
        assert!(grouped_rank(&view, &RANK_KEYS, 5, RankDirection::Top).rows.is_empty());
        assert!(age_histogram_buckets(&view, 30).is_empty());
        assert!(scatter_pairs(&view).is_empty());

        let dash = Dashboard::compute(&view, &DashboardSettings::default());
        assert!(dash.is_empty());
        assert_eq!(dash.summary.rate, 0.0);
    }

    #[test]
    fn rate_by_category_only_lists_observed_values() {
        let ds = four_passengers();
        let mut spec = FilterSpec::unrestricted(&ds);
        spec.sexes = BTreeSet::from(["male".to_string()]);
        let view = apply(&ds, &spec);

        let by_sex = rate_by_category(&view, Category::Sex);
        assert_eq!(by_sex.entries.len(), 1);
        assert_eq!(by_sex.get(&male()), Some(0.0));
        assert_eq!(by_sex.get(&female()), None);
        assert!(by_sex.entries.iter().all(|e| e.count > 0));
    }

    #[test]
    fn rates_round_to_one_decimal() {
        use PassengerClass::*;
        let ds = Dataset::from_records(vec![
            record(true, "female", Some(1.0), 1.0, First, Some(Port::S)),
            record(false, "female", Some(2.0), 1.0, First, Some(Port::S)),
            record(false, "female", Some(3.0), 1.0, First, Some(Port::S)),
        ]);
        let view = full_view(&ds);

        assert_eq!(rate_by_category(&view, Category::Sex).get(&female()), Some(33.3));
        assert!((overall_survival_rate(&view) - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn exact_halves_round_to_even() {
        assert_eq!(round1(5.0 / 16.0 * 100.0), 31.2);
        assert_eq!(round1(3.0 / 16.0 * 100.0), 18.8);
        assert_eq!(round1(12.5), 12.5);
    }

    #[test]
    fn group_rate_uses_even_rounding() {
        use PassengerClass::*;
        let records = (0..16)
            .map(|i| record(i < 5, "male", Some(30.0), 5.0, Third, Some(Port::S)))
            .collect();
        let ds = Dataset::from_records(records);
        let view = full_view(&ds);

        assert_eq!(rate_by_category(&view, Category::Sex).get(&male()), Some(31.2));
        let top = grouped_rank(&view, &RANK_KEYS, 1, RankDirection::Top);
        assert_eq!(top.rows[0].rate, 31.2);
    }

    #[test]
    fn pivot_leaves_absent_combinations_empty() {
        let ds = four_passengers();
        let pivot = pivot_rate(&full_view(&ds), Category::Embarked, Category::Pclass);

        let c = CategoryValue::Port(Port::C);
        let q = CategoryValue::Port(Port::Q);
        let first = CategoryValue::Class(PassengerClass::First);
        let third = CategoryValue::Class(PassengerClass::Third);

        assert_eq!(pivot.rows.len(), 3);
        assert_eq!(pivot.columns, vec![first.clone(), third.clone()]);
        assert_eq!(pivot.get(&c, &first), Some(100.0));
        assert_eq!(pivot.get(&q, &third), Some(0.0));
        assert_eq!(pivot.get(&c, &third), None);
    }

    #[test]
    fn pivot_drops_records_with_missing_port() {
        let mut records = four_passengers().records;
        records[0].embarked = None;
        records[2].embarked = None;
        let ds = Dataset::from_records(records);

        let pivot = pivot_rate(&full_view(&ds), Category::Embarked, Category::Pclass);
        assert_eq!(
            pivot.columns,
            vec![CategoryValue::Class(PassengerClass::Third)]
        );
    }

    #[test]
    fn grouped_rank_returns_fewer_rows_than_requested() {
        use PassengerClass::*;
        let ds = Dataset::from_records(vec![
            record(true, "female", Some(20.0), 5.0, First, Some(Port::C)),
            record(false, "male", Some(30.0), 5.0, Third, Some(Port::S)),
            record(true, "male", Some(40.0), 5.0, Third, Some(Port::S)),
            record(false, "female", Some(50.0), 5.0, Second, Some(Port::Q)),
        ]);
        let view = full_view(&ds);

        let top = grouped_rank(&view, &RANK_KEYS, 5, RankDirection::Top);
        let rates: Vec<f64> = top.rows.iter().map(|g| g.rate).collect();
        assert_eq!(rates, vec![100.0, 50.0, 0.0]);
        assert_eq!(
            top.rows[0].key,
            vec![female(), CategoryValue::Class(First), CategoryValue::Port(Port::C)]
        );

        let bottom = grouped_rank(&view, &RANK_KEYS, 5, RankDirection::Bottom);
        let rates: Vec<f64> = bottom.rows.iter().map(|g| g.rate).collect();
        assert_eq!(rates, vec![0.0, 50.0, 100.0]);
    }

    #[test]
    fn grouped_rank_ties_keep_key_order() {
        use PassengerClass::*;
        let ds = Dataset::from_records(vec![
            record(true, "male", Some(20.0), 5.0, Third, Some(Port::S)),
            record(true, "female", Some(30.0), 5.0, Second, Some(Port::Q)),
            record(true, "female", Some(40.0), 5.0, First, Some(Port::C)),
        ]);
        let view = full_view(&ds);

        for direction in [RankDirection::Top, RankDirection::Bottom] {
            let ranked = grouped_rank(&view, &RANK_KEYS, 2, direction);
            assert_eq!(ranked.rows.len(), 2);
            assert_eq!(ranked.rows[0].key[1], CategoryValue::Class(First));
            assert_eq!(ranked.rows[1].key[1], CategoryValue::Class(Second));
        }
    }

    #[test]
    fn histogram_excludes_missing_ages_and_closes_last_bin() {
        let ds = four_passengers();
        let hist = age_histogram_buckets(&full_view(&ds), 2);

        assert_eq!(hist.bins.len(), 2);
        assert_eq!(hist.bins[0].start, 22.0);
        assert_eq!(hist.bins[1].end, 35.0);
        assert!((hist.bin_width() - 6.5).abs() < 1e-12);
        // 22 and 28 in bin 0; 35 lands on the closed right edge of bin 1.
        assert_eq!((hist.bins[0].survived, hist.bins[0].died), (1, 1));
        assert_eq!((hist.bins[1].survived, hist.bins[1].died), (0, 1));
    }

    #[test]
    fn histogram_of_single_age_uses_unit_bins() {
        use PassengerClass::*;
        let ds = Dataset::from_records(vec![
            record(true, "female", Some(30.0), 5.0, First, None),
            record(false, "male", Some(30.0), 5.0, First, None),
        ]);
        let hist = age_histogram_buckets(&full_view(&ds), 3);

        assert_eq!(hist.bin_width(), 1.0);
        assert_eq!((hist.bins[0].survived, hist.bins[0].died), (1, 1));
    }

    #[test]
    fn scatter_skips_missing_ages() {
        let ds = four_passengers();
        let points = scatter_pairs(&full_view(&ds));

        let ages: Vec<f64> = points.iter().map(|p| p.age).collect();
        assert_eq!(ages, vec![22.0, 35.0, 28.0]);
        assert_eq!(points[1].fare, 8.0);
    }

    #[test]
    fn dashboard_serializes_to_json() {
        let ds = four_passengers();
        let dash = Dashboard::compute(&full_view(&ds), &DashboardSettings::default());
        let json = serde_json::to_value(&dash).unwrap();

        assert_eq!(json["summary"]["total"], 4);
        assert_eq!(json["rate_by_sex"]["entries"][0]["key"], "female");
        assert_eq!(json["top_groups"]["rows"][0]["key"][1], 1);
    }
}
