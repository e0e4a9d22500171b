//! Ordered metric tables and replicate sets.
//!
//! A [`RawMetricTable`] holds one replicate of a sweep:
//! metric -> algorithm -> one value per sweep point absorbed so far. Labels
//! keep the order in which the executable first reported them, and that
//! order survives serialization.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::parse::{parse_point, PointOutput};

/// Insertion-ordered map keyed by a label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for LabeledMap<V> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<V> LabeledMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.position(label).is_some()
    }

    pub fn get(&self, label: &str) -> Option<&V> {
        self.position(label).map(|i| &self.entries[i].1)
    }

    /// Insert or replace. A replaced entry keeps its original position.
    pub fn insert(&mut self, label: impl Into<String>, value: V) -> Option<V> {
        let label = label.into();
        match self.position(&label) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((label, value));
                None
            }
        }
    }

    /// Labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> + '_ {
        self.entries.iter().map(|(label, value)| (label.as_str(), value))
    }

    /// Same label set, ignoring order.
    pub fn same_labels<W>(&self, other: &LabeledMap<W>) -> bool {
        self.len() == other.len() && self.labels().all(|label| other.contains(label))
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.entries.iter().position(|(l, _)| l == label)
    }
}

impl<V: Default> LabeledMap<V> {
    /// Entry for `label`, appending a default value at the end if absent.
    pub fn get_or_create(&mut self, label: &str) -> &mut V {
        let i = match self.position(label) {
            Some(i) => i,
            None => {
                self.entries.push((label.to_owned(), V::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[i].1
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for LabeledMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = LabeledMap::new();
        for (label, value) in iter {
            map.insert(label, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for LabeledMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for LabeledMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LabeledMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for LabeledMapVisitor<V> {
            type Value = LabeledMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from labels to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = LabeledMap::new();
                while let Some((label, value)) = access.next_entry::<String, V>()? {
                    if map.contains(&label) {
                        return Err(de::Error::custom(format_args!("duplicate label `{label}`")));
                    }
                    map.entries.push((label, value));
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(LabeledMapVisitor(PhantomData))
    }
}

/// Values of one algorithm for one metric, one per sweep point.
///
/// Infinite values are legitimate: the executable reports `inf` when an
/// algorithm's measured time rounds to zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series(Vec<f64>);

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.0.push(value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn has_infinite(&self) -> bool {
        self.0.iter().any(|v| v.is_infinite())
    }
}

impl From<Vec<f64>> for Series {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

// JSON has no literal for infinity, so non-finite values travel as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum SeriesValue {
    Number(f64),
    Token(String),
}

fn non_finite_token(value: f64) -> &'static str {
    if value.is_nan() {
        "nan"
    } else if value > 0.0 {
        "inf"
    } else {
        "-inf"
    }
}

impl Serialize for Series {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for &value in &self.0 {
            if value.is_finite() {
                seq.serialize_element(&value)?;
            } else {
                seq.serialize_element(non_finite_token(value))?;
            }
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Series {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<SeriesValue>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|value| match value {
                SeriesValue::Number(v) => Ok(v),
                SeriesValue::Token(token) => token
                    .parse::<f64>()
                    .map_err(|_| <D::Error as de::Error>::custom(format_args!("`{token}` is not a number"))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Series)
    }
}

/// metric -> algorithm -> values.
pub type MetricColumns = LabeledMap<LabeledMap<Series>>;

/// All metrics reported by one replicate of a sweep.
///
/// Every series has exactly [`points`](Self::points) values; there are no
/// gaps and no defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MetricColumns", into = "MetricColumns")]
pub struct RawMetricTable {
    metrics: MetricColumns,
    points: usize,
}

impl RawMetricTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sweep points absorbed so far.
    pub fn points(&self) -> usize {
        self.points
    }

    pub fn metric(&self, name: &str) -> Option<&LabeledMap<Series>> {
        self.metrics.get(name)
    }

    pub fn metrics(&self) -> impl Iterator<Item = &str> + '_ {
        self.metrics.labels()
    }

    /// Algorithm labels in first-reported order.
    pub fn algorithms(&self) -> impl Iterator<Item = &str> + '_ {
        self.metrics
            .values()
            .next()
            .into_iter()
            .flat_map(|column| column.labels())
    }

    /// Whether any algorithm reported an infinite `metric` value at any point.
    pub fn is_saturated(&self, metric: &str) -> bool {
        self.metric(metric)
            .is_some_and(|column| column.values().any(Series::has_infinite))
    }

    /// Parse one invocation's output and append it as sweep point `position`.
    ///
    /// The output is fully validated against the points already held before
    /// anything is appended: on error the table is left untouched.
    pub fn absorb(&mut self, position: usize, raw: &str) -> Result<(), ParseError> {
        if position != self.points {
            return Err(ParseError::OutOfOrder {
                expected: self.points,
                position,
            });
        }
        let point = parse_point(raw)?;
        self.check_shape(position, &point)?;

        for (index, metric) in point.metrics.iter().enumerate() {
            let column = self.metrics.get_or_create(metric);
            for row in &point.rows {
                column.get_or_create(&row.algorithm).push(row.values[index]);
            }
        }
        self.points += 1;
        Ok(())
    }

    fn check_shape(&self, position: usize, point: &PointOutput) -> Result<(), ParseError> {
        if self.points == 0 {
            return Ok(());
        }
        if !self.metrics.labels().eq(point.metrics.iter().map(String::as_str)) {
            return Err(ParseError::MetricMismatch {
                position,
                expected: self.metrics.labels().map(str::to_owned).collect(),
                found: point.metrics.clone(),
            });
        }
        if let Some(algorithm) = self.algorithms().find(|a| !point.reports(a)) {
            return Err(ParseError::MissingAlgorithm {
                position,
                algorithm: algorithm.to_owned(),
            });
        }
        if let Some(row) = point
            .rows
            .iter()
            .find(|row| !self.algorithms().any(|a| a == row.algorithm))
        {
            return Err(ParseError::UnexpectedAlgorithm {
                position,
                algorithm: row.algorithm.clone(),
            });
        }
        Ok(())
    }
}

impl TryFrom<MetricColumns> for RawMetricTable {
    type Error = String;

    fn try_from(metrics: MetricColumns) -> Result<Self, Self::Error> {
        let points = uniform_length(&metrics)?;
        Ok(Self { metrics, points })
    }
}

/// Length shared by every series, or a description of the first one that
/// differs.
fn uniform_length(metrics: &MetricColumns) -> Result<usize, String> {
    let mut lengths = metrics.iter().flat_map(|(metric, column)| {
        column
            .iter()
            .map(move |(algorithm, series)| (metric, algorithm, series.len()))
    });
    let points = match lengths.next() {
        Some((_, _, len)) => len,
        None => 0,
    };
    match lengths.find(|&(_, _, len)| len != points) {
        Some((metric, algorithm, len)) => Err(format!(
            "`{metric}`/`{algorithm}` has {len} values, expected {points}"
        )),
        None => Ok(points),
    }
}

impl From<RawMetricTable> for MetricColumns {
    fn from(table: RawMetricTable) -> Self {
        table.metrics
    }
}

/// One table per replicate, in run order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplicateSet {
    replicates: Vec<RawMetricTable>,
}

impl ReplicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, table: RawMetricTable) {
        self.replicates.push(table);
    }

    pub fn len(&self) -> usize {
        self.replicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replicates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RawMetricTable> {
        self.replicates.iter()
    }

    pub fn replicates(&self) -> &[RawMetricTable] {
        &self.replicates
    }
}

impl From<Vec<RawMetricTable>> for ReplicateSet {
    fn from(replicates: Vec<RawMetricTable>) -> Self {
        Self { replicates }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POINT_0: &str = "\nMethod\tUpdates/ms\tSpace\tRecall\n\
                           ALS\t5.0\t100\t1.0\n\
                           LS\t3.0\t120\t0.9\n\n";
    const POINT_1: &str = "\nMethod\tUpdates/ms\tSpace\tRecall\n\
                           ALS\t6.0\t100\t1.0\n\
                           LS\tinf\t120\t0.9\n\n";

    fn two_point_table() -> RawMetricTable {
        let mut table = RawMetricTable::new();
        table.absorb(0, POINT_0).unwrap();
        table.absorb(1, POINT_1).unwrap();
        table
    }

    #[test]
    fn test_get_or_create_appends_in_order() {
        let mut map: LabeledMap<Vec<u32>> = LabeledMap::new();
        map.get_or_create("b").push(1);
        map.get_or_create("a").push(2);
        map.get_or_create("b").push(3);

        assert_eq!(map.labels().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(map.get("b"), Some(&vec![1, 3]));
        assert_eq!(map.get("a"), Some(&vec![2]));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut map = LabeledMap::new();
        map.insert("x", 1);
        map.insert("y", 2);
        assert_eq!(map.insert("x", 3), Some(1));
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![("x", &3), ("y", &2)]);
    }

    #[test]
    fn test_absorb_accumulates_points() {
        let table = two_point_table();
        assert_eq!(table.points(), 2);
        assert_eq!(table.metrics().collect::<Vec<_>>(), vec!["Updates/ms", "Space", "Recall"]);
        assert_eq!(table.algorithms().collect::<Vec<_>>(), vec!["ALS", "LS"]);

        let speeds = table.metric("Updates/ms").unwrap();
        assert_eq!(speeds.get("ALS").unwrap().values(), &[5.0, 6.0]);
        assert_eq!(speeds.get("LS").unwrap().values()[0], 3.0);
        assert!(speeds.get("LS").unwrap().values()[1].is_infinite());
        assert!(table.is_saturated("Updates/ms"));
        assert!(!table.is_saturated("Space"));
    }

    #[test]
    fn test_absorb_rejects_out_of_order_position() {
        let mut table = RawMetricTable::new();
        let err = table.absorb(1, POINT_0).unwrap_err();
        assert_eq!(err, ParseError::OutOfOrder { expected: 0, position: 1 });
        assert_eq!(table.points(), 0);
    }

    #[test]
    fn test_absorb_rejects_missing_algorithm_without_partial_append() {
        let mut table = RawMetricTable::new();
        table.absorb(0, POINT_0).unwrap();
        let before = table.clone();

        let only_als = "\nMethod Updates/ms Space Recall\nALS 7.0 100 1.0\n\n";
        let err = table.absorb(1, only_als).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingAlgorithm {
                position: 1,
                algorithm: "LS".to_string()
            }
        );
        assert_eq!(table, before);
    }

    #[test]
    fn test_absorb_rejects_new_algorithm() {
        let mut table = RawMetricTable::new();
        table.absorb(0, POINT_0).unwrap();

        let extra = "\nMethod Updates/ms Space Recall\nALS 1 1 1\nLS 1 1 1\nCM 1 1 1\n\n";
        let err = table.absorb(1, extra).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedAlgorithm { algorithm, .. } if algorithm == "CM"));
        assert_eq!(table.points(), 1);
    }

    #[test]
    fn test_absorb_rejects_changed_metrics() {
        let mut table = RawMetricTable::new();
        table.absorb(0, POINT_0).unwrap();

        let other = "\nMethod Updates/ms Space Precis\nALS 1 1 1\nLS 1 1 1\n\n";
        let err = table.absorb(1, other).unwrap_err();
        assert!(matches!(err, ParseError::MetricMismatch { position: 1, .. }));
    }

    #[test]
    fn test_replicate_set_json_roundtrip_keeps_infinity_and_order() {
        let set = ReplicateSet::from(vec![two_point_table(), two_point_table()]);
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains("\"inf\""));
        assert!(json.find("\"ALS\"").unwrap() < json.find("\"LS\"").unwrap());

        let back: ReplicateSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
        assert_eq!(back.replicates()[0].points(), 2);
    }

    #[test]
    fn test_deserialize_rejects_ragged_series() {
        let json = r#"[{"Updates/ms": {"ALS": [1.0, 2.0], "LS": [1.0]}}]"#;
        assert!(serde_json::from_str::<ReplicateSet>(json).is_err());
    }

    #[test]
    fn test_deserialize_takes_points_from_series_length() {
        let json = r#"{"Updates/ms": {"ALS": [1.0, 2.0, "inf"]}, "Space": {"ALS": [4.0, 4.0, 4.0]}}"#;
        let table: RawMetricTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.points(), 3);
        assert!(table.is_saturated("Updates/ms"));

        let empty: RawMetricTable = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.points(), 0);
    }

    #[test]
    fn test_deserialize_rejects_ragged_metrics() {
        let json = r#"{"Updates/ms": {"ALS": [1.0, 2.0]}, "Space": {"ALS": [4.0]}}"#;
        let err = serde_json::from_str::<RawMetricTable>(json).unwrap_err();
        assert!(err.to_string().contains("`Space`/`ALS` has 1 values, expected 2"));
    }

    #[test]
    fn test_deserialize_rejects_duplicate_labels() {
        let json = r#"{"ALS": [1.0], "ALS": [2.0]}"#;
        assert!(serde_json::from_str::<LabeledMap<Series>>(json).is_err());
    }
}
