//! Parser for the benchmark executable's tabular stdout.
//!
//! The executable prints, for one configuration:
//!
//! ```text
//! <banner>
//! Method  Updates/ms  Space  Recall  5th  95th  ...
//! ALS     18543.21    2048   1.00    ...
//! LS      inf         2048   0.99    ...
//! <footer>
//! ```
//!
//! The banner and footer are discarded. The three columns after the label
//! are the metrics; anything to their right is ignored. `inf` is a valid
//! reading, not an error.

use crate::constants::{METRIC_COLUMNS, THROUGHPUT_METRIC};
use crate::error::ParseError;

/// One algorithm's metric values for a single configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRow {
    pub algorithm: String,
    /// Aligned with [`PointOutput::metrics`].
    pub values: Vec<f64>,
}

/// Parsed output of a single invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PointOutput {
    pub metrics: Vec<String>,
    pub rows: Vec<PointRow>,
}

impl PointOutput {
    pub fn reports(&self, algorithm: &str) -> bool {
        self.rows.iter().any(|row| row.algorithm == algorithm)
    }

    pub fn value(&self, metric: &str, algorithm: &str) -> Option<f64> {
        let index = self.metrics.iter().position(|m| m == metric)?;
        self.rows
            .iter()
            .find(|row| row.algorithm == algorithm)
            .map(|row| row.values[index])
    }
}

/// Parse one invocation's raw stdout.
///
/// Pure: the result depends only on `raw`.
pub fn parse_point(raw: &str) -> Result<PointOutput, ParseError> {
    let lines: Vec<&str> = raw.lines().collect();
    if lines.len() < 4 {
        return Err(ParseError::Truncated { lines: lines.len() });
    }
    let body = &lines[1..lines.len() - 1];
    let metrics = parse_header(body[0])?;

    let mut rows: Vec<PointRow> = Vec::with_capacity(body.len() - 1);
    for (offset, line) in body[1..].iter().enumerate() {
        // banner is line 1, header line 2
        let line_number = offset + 3;
        let row = parse_row(line, line_number, &metrics)?;
        if rows.iter().any(|r| r.algorithm == row.algorithm) {
            return Err(ParseError::DuplicateAlgorithm {
                line: line_number,
                algorithm: row.algorithm,
            });
        }
        rows.push(row);
    }

    Ok(PointOutput { metrics, rows })
}

/// Metric names from the header line.
///
/// The label column may carry a title (`Method`) or be blank; either way the
/// first metric must be the throughput column.
fn parse_header(line: &str) -> Result<Vec<String>, ParseError> {
    let mut tokens = line.split_whitespace().peekable();
    if tokens.peek().is_some_and(|first| *first != THROUGHPUT_METRIC) {
        tokens.next();
    }
    let metrics: Vec<String> = tokens.take(METRIC_COLUMNS).map(str::to_owned).collect();

    let Some(first) = metrics.first() else {
        return Err(ParseError::EmptyHeader);
    };
    if first != THROUGHPUT_METRIC {
        return Err(ParseError::UnexpectedLeadingMetric {
            found: first.clone(),
            expected: THROUGHPUT_METRIC,
        });
    }
    for (i, metric) in metrics.iter().enumerate() {
        if metrics[..i].contains(metric) {
            return Err(ParseError::DuplicateMetric {
                metric: metric.clone(),
            });
        }
    }
    Ok(metrics)
}

fn parse_row(line: &str, line_number: usize, metrics: &[String]) -> Result<PointRow, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let expected = metrics.len() + 1;
    if tokens.len() < expected {
        return Err(ParseError::ShortRow {
            line: line_number,
            expected,
            found: tokens.len(),
        });
    }

    let values = metrics
        .iter()
        .zip(&tokens[1..])
        .map(|(metric, token)| {
            token.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                line: line_number,
                column: metric.clone(),
                token: (*token).to_owned(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PointRow {
        algorithm: tokens[0].to_owned(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RawMetricTable;

    fn join(lines: &[&str]) -> String {
        lines.join("\n")
    }

    #[test]
    fn test_parse_untitled_label_column() {
        let raw = join(&["banner", "  Updates/ms X Y", "ALS 5.0 1.0 1.0", "LS 3.0 1.0 1.0", "footer"]);
        let point = parse_point(&raw).unwrap();

        assert_eq!(point.metrics, vec!["Updates/ms", "X", "Y"]);
        assert_eq!(point.value("Updates/ms", "ALS"), Some(5.0));
        assert_eq!(point.value("Updates/ms", "LS"), Some(3.0));
    }

    #[test]
    fn test_absorb_position_zero() {
        let raw = join(&["banner", "  Updates/ms X Y", "ALS 5.0 1.0 1.0", "LS 3.0 1.0 1.0", "footer"]);
        let mut table = RawMetricTable::new();
        table.absorb(0, &raw).unwrap();

        let speeds = table.metric("Updates/ms").unwrap();
        assert_eq!(speeds.labels().collect::<Vec<_>>(), vec!["ALS", "LS"]);
        assert_eq!(speeds.get("ALS").unwrap().values(), &[5.0]);
        assert_eq!(speeds.get("LS").unwrap().values(), &[3.0]);
    }

    #[test]
    fn test_parse_executable_layout_ignores_trailing_columns() {
        let raw = "\nMethod\tUpdates/ms\tSpace\tRecall\t5th\t95th\tPrecis\t5th\t95th\n\
                   ALS\t18543.21\t2048\t1.00\t1.00\t1.00\t0.98\t0.95\t1.00\n\
                   CMH\t9001.50\t4096\t1.00\t1.00\t1.00\t0.50\t0.40\t0.60\n\n";
        let point = parse_point(raw).unwrap();

        assert_eq!(point.metrics, vec!["Updates/ms", "Space", "Recall"]);
        assert_eq!(point.rows.len(), 2);
        assert_eq!(point.rows[1].values, vec![9001.5, 4096.0, 1.0]);
    }

    #[test]
    fn test_inf_is_a_reading() {
        // The executable ends its output with a blank footer line.
        let raw = "\nMethod Updates/ms Space Recall\nLS inf 10 1\nALS 12 10 1\n\n";
        let point = parse_point(raw).unwrap();
        let value = point.value("Updates/ms", "LS").unwrap();
        assert_eq!(value, f64::INFINITY);
        assert_eq!(point.value("Updates/ms", "ALS"), Some(12.0));
    }

    #[test]
    fn test_single_trailing_newline_drops_footer_row() {
        // Without the blank footer the only data row is taken as the footer.
        let raw = "\nMethod Updates/ms Space Recall\nLS inf 10 1\n";
        assert_eq!(parse_point(raw).unwrap_err(), ParseError::Truncated { lines: 3 });
    }

    #[test]
    fn test_parse_is_pure() {
        let raw = join(&["b", "Method Updates/ms Space Recall", "ALS 1.5 2 3", "LS 4 5 6", "f"]);
        assert_eq!(parse_point(&raw).unwrap(), parse_point(&raw).unwrap());
    }

    #[test]
    fn test_non_numeric_token_fails() {
        let raw = join(&["b", "Method Updates/ms Space Recall", "ALS 1.5 2 3", "LS fast 5 6", "f"]);
        assert_eq!(
            parse_point(&raw).unwrap_err(),
            ParseError::InvalidNumber {
                line: 4,
                column: "Updates/ms".to_string(),
                token: "fast".to_string(),
            }
        );
    }

    #[test]
    fn test_malformed_row_leaves_table_untouched() {
        let good = join(&["b", "Method Updates/ms Space Recall", "ALS 1 2 3", "LS 4 5 6", "f"]);
        let bad = join(&["b", "Method Updates/ms Space Recall", "ALS 1 2 3", "LS 4 x 6", "f"]);
        let mut table = RawMetricTable::new();
        table.absorb(0, &good).unwrap();

        assert!(table.absorb(1, &bad).is_err());
        assert_eq!(table.points(), 1);
        let speeds = table.metric("Updates/ms").unwrap();
        assert!(speeds.values().all(|series| series.len() == 1));
    }

    #[test]
    fn test_short_row_fails() {
        let raw = join(&["b", "Method Updates/ms Space Recall", "ALS 1 2", "f"]);
        assert_eq!(
            parse_point(&raw).unwrap_err(),
            ParseError::ShortRow {
                line: 3,
                expected: 4,
                found: 3
            }
        );
    }

    #[test]
    fn test_blank_row_fails() {
        let raw = join(&["b", "Method Updates/ms Space Recall", "ALS 1 2 3", "", "LS 1 2 3", "f"]);
        assert!(matches!(parse_point(&raw), Err(ParseError::ShortRow { line: 4, found: 0, .. })));
    }

    #[test]
    fn test_header_must_lead_with_throughput() {
        let raw = join(&["b", "Method Space Updates/ms Recall", "ALS 1 2 3", "f"]);
        assert!(matches!(
            parse_point(&raw),
            Err(ParseError::UnexpectedLeadingMetric { found, .. }) if found == "Space"
        ));

        let raw = join(&["b", "Method", "ALS 1 2 3", "f"]);
        assert_eq!(parse_point(&raw).unwrap_err(), ParseError::EmptyHeader);
    }

    #[test]
    fn test_duplicate_algorithm_fails() {
        let raw = join(&["b", "Method Updates/ms Space Recall", "ALS 1 2 3", "ALS 1 2 3", "f"]);
        assert!(matches!(parse_point(&raw), Err(ParseError::DuplicateAlgorithm { line: 4, .. })));
    }

    #[test]
    fn test_truncated_output_fails() {
        assert_eq!(
            parse_point("banner\nMethod Updates/ms\nfooter").unwrap_err(),
            ParseError::Truncated { lines: 3 }
        );
        assert_eq!(parse_point("").unwrap_err(), ParseError::Truncated { lines: 0 });
    }
}
