use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PassengerClass / Port – typed categorical fields
// ---------------------------------------------------------------------------

/// Ticket class. Serialized as the numeric `Pclass` code (1, 2, 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PassengerClass {
    First,
    Second,
    Third,
}

impl PassengerClass {
    pub fn code(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        }
    }
}

impl From<PassengerClass> for u8 {
    fn from(class: PassengerClass) -> Self {
        class.code()
    }
}

impl TryFrom<u8> for PassengerClass {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            3 => Ok(Self::Third),
            other => Err(format!("passenger class must be 1, 2 or 3, got {other}")),
        }
    }
}

impl fmt::Display for PassengerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Port of embarkation: Cherbourg, Queenstown, Southampton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Port {
    C,
    Q,
    S,
}

impl Port {
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim() {
            "C" => Some(Self::C),
            "Q" => Some(Self::Q),
            "S" => Some(Self::S),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::C => "C",
            Self::Q => "Q",
            Self::S => "S",
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Category / CategoryValue – grouping keys for aggregation
// ---------------------------------------------------------------------------

/// A categorical column that records can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Sex,
    Pclass,
    Embarked,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Self::Sex => "Sex",
            Self::Pclass => "Pclass",
            Self::Embarked => "Embarked",
        }
    }
}

/// One observed value of a [`Category`]. Ordering is by variant first, then
/// by value, so keys of the same category sort naturally.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum CategoryValue {
    Sex(String),
    Class(PassengerClass),
    Port(Port),
}

impl fmt::Display for CategoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryValue::Sex(s) => write!(f, "{s}"),
            CategoryValue::Class(c) => write!(f, "{c}"),
            CategoryValue::Port(p) => write!(f, "{p}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one passenger row
// ---------------------------------------------------------------------------

/// A single passenger. Validated at load time: `fare >= 0`, `age >= 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub survived: bool,
    pub passenger_class: PassengerClass,
    pub sex: String,
    pub age: Option<f64>,
    pub fare: f64,
    pub embarked: Option<Port>,
}

impl Record {
    /// Value of the given categorical column, `None` when missing.
    pub fn category(&self, category: Category) -> Option<CategoryValue> {
        match category {
            Category::Sex => Some(CategoryValue::Sex(self.sex.clone())),
            Category::Pclass => Some(CategoryValue::Class(self.passenger_class)),
            Category::Embarked => self.embarked.map(CategoryValue::Port),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed domains and bounds.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All records in file order.
    pub records: Vec<Record>,
    /// Observed sexes (non-empty strings only).
    pub sexes: BTreeSet<String>,
    pub classes: BTreeSet<PassengerClass>,
    /// Observed ports, missing values excluded.
    pub ports: BTreeSet<Port>,
    /// `(min, max)` over present ages.
    pub age_bounds: Option<(f64, f64)>,
    pub fare_bounds: Option<(f64, f64)>,
}

impl Dataset {
    /// Build domain indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut sexes = BTreeSet::new();
        let mut classes = BTreeSet::new();
        let mut ports = BTreeSet::new();

        for rec in &records {
            if !rec.sex.is_empty() {
                sexes.insert(rec.sex.clone());
            }
            classes.insert(rec.passenger_class);
            if let Some(port) = rec.embarked {
                ports.insert(port);
            }
        }

        let age_bounds = bounds(records.iter().filter_map(|r| r.age));
        let fare_bounds = bounds(records.iter().map(|r| r.fare));

        Dataset {
            records,
            sexes,
            classes,
            ports,
            age_bounds,
            fare_bounds,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn domains_and_bounds_skip_missing_values() {
        let mut ds = four_passengers();
        ds.records[1].embarked = None;
        let ds = Dataset::from_records(ds.records);

        assert_eq!(ds.len(), 4);
        assert_eq!(
            ds.sexes.iter().cloned().collect::<Vec<_>>(),
            vec!["female".to_string(), "male".to_string()]
        );
        assert_eq!(ds.ports, BTreeSet::from([Port::C, Port::Q]));
        assert_eq!(ds.age_bounds, Some((22.0, 35.0)));
        assert_eq!(ds.fare_bounds, Some((7.0, 12.0)));
    }

    #[test]
    fn empty_dataset_has_no_bounds() {
        let ds = Dataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.age_bounds, None);
        assert_eq!(ds.fare_bounds, None);
    }

    #[test]
    fn passenger_class_serializes_as_code() {
        let json = serde_json::to_string(&PassengerClass::Second).unwrap();
        assert_eq!(json, "2");
        let back: PassengerClass = serde_json::from_str("3").unwrap();
        assert_eq!(back, PassengerClass::Third);
        assert!(serde_json::from_str::<PassengerClass>("4").is_err());
    }

    #[test]
    fn missing_port_has_no_category_value() {
        let rec = record(true, "female", None, 1.0, PassengerClass::First, None);
        assert_eq!(rec.category(Category::Embarked), None);
        assert_eq!(
            rec.category(Category::Pclass),
            Some(CategoryValue::Class(PassengerClass::First))
        );
    }
}
