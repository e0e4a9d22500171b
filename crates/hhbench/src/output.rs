//! Export of averaged series for the plotting layer.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::experiment::{Provenance, SweepOutcome};

/// Name an algorithm is plotted under.
pub fn display_name(algorithm: &str) -> &str {
    match algorithm {
        "ALS" => "IM-SUM",
        "LS" => "DIM-SUM",
        "CCFC" => "AGT",
        other => other,
    }
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value == f64::INFINITY {
        "inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        value.to_string()
    }
}

/// Write one row per sweep position: the x value, then each algorithm's mean.
pub fn write_series_csv(outcome: &SweepOutcome, path: &Path) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_series(outcome, &mut writer)?;
    writer.flush()
}

fn write_series(outcome: &SweepOutcome, writer: &mut impl Write) -> io::Result<()> {
    let series = &outcome.aggregation.series;

    write!(writer, "{}", outcome.family.axis_label())?;
    for algorithm in series.labels() {
        write!(writer, ",{}", display_name(algorithm))?;
    }
    writeln!(writer)?;

    for (position, x) in outcome.x_values.iter().enumerate() {
        write!(writer, "{}", format_value(*x))?;
        for values in series.values() {
            let value = values.values().get(position).copied().unwrap_or(f64::NAN);
            write!(writer, ",{}", format_value(value))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Render a markdown report with one table per outcome.
pub fn to_markdown(outcomes: &[SweepOutcome]) -> String {
    let mut md = String::new();

    md.push_str("# Heavy-hitter throughput (Updates/ms)\n\n");
    for outcome in outcomes {
        let aggregation = &outcome.aggregation;
        md.push_str(&format!("## {} sweep: {}\n\n", outcome.family, outcome.dataset));
        let source = match outcome.provenance {
            Provenance::Cached => "cached",
            Provenance::Computed => "computed",
        };
        md.push_str(&format!(
            "Source: {} (`{}`). Replicates averaged: {}, excluded: {}.\n\n",
            source,
            outcome.key.file_name(),
            aggregation.contributing,
            aggregation.excluded
        ));

        md.push_str(&format!("| {} | ", outcome.family.axis_label()));
        for algorithm in aggregation.series.labels() {
            md.push_str(&format!("{} | ", display_name(algorithm)));
        }
        md.push('\n');
        md.push('|');
        md.push_str(&"-|".repeat(aggregation.series.len() + 1));
        md.push('\n');

        for (position, x) in outcome.x_values.iter().enumerate() {
            md.push_str(&format!("| {} | ", format_value(*x)));
            for values in aggregation.series.values() {
                match values.values().get(position) {
                    Some(v) if v.is_finite() => md.push_str(&format!("{:.2} | ", v)),
                    Some(v) => md.push_str(&format!("{} | ", format_value(*v))),
                    None => md.push_str("- | "),
                }
            }
            md.push('\n');
        }
        md.push('\n');
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheKey;
    use hhbench_core::{Aggregation, LabeledMap, Series, SweepFamily};

    fn outcome() -> SweepOutcome {
        let series: LabeledMap<Series> = [
            ("ALS", Series::from(vec![10.0, 12.5])),
            ("CMH", Series::from(vec![f64::INFINITY, 3.0])),
        ]
        .into_iter()
        .collect();
        SweepOutcome {
            family: SweepFamily::Decay,
            dataset: "CAIDA".to_string(),
            key: CacheKey::new("CAIDA", 8, SweepFamily::Decay).with_secondary("phindex15"),
            x_values: vec![0.0625, 0.125],
            aggregation: Aggregation {
                series,
                contributing: 7,
                excluded: 1,
            },
            provenance: Provenance::Computed,
        }
    }

    #[test]
    fn test_display_names() {
        assert_eq!(display_name("ALS"), "IM-SUM");
        assert_eq!(display_name("LS"), "DIM-SUM");
        assert_eq!(display_name("CCFC"), "AGT");
        assert_eq!(display_name("SSH"), "SSH");
    }

    #[test]
    fn test_csv_layout() {
        let mut buffer = Vec::new();
        write_series(&outcome(), &mut buffer).unwrap();
        let csv = String::from_utf8(buffer).unwrap();

        assert_eq!(csv, "gamma,IM-SUM,CMH\n0.0625,10,inf\n0.125,12.5,3\n");
    }

    #[test]
    fn test_csv_file_written() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("decay.csv");
        write_series_csv(&outcome(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("gamma,IM-SUM,CMH\n"));
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn test_markdown_report() {
        let md = to_markdown(&[outcome()]);

        assert!(md.contains("## decay sweep: CAIDA"));
        assert!(md.contains("Replicates averaged: 7, excluded: 1."));
        assert!(md.contains("| gamma | IM-SUM | CMH | \n|-|-|-|\n"));
        assert!(md.contains("| 0.0625 | 10.00 | inf | "));
    }
}
