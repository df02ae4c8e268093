//! Plain-text rendering of session state for the terminal.

use std::collections::HashMap;
use std::fmt::Write;
use std::path::PathBuf;
use zipscope::compute::histogram::Bucket;
use zipscope::highlight::Highlight;
use zipscope::selection::{CheckState, PrefixTree};
use zipscope::{QueryShape, ResultSummary, ResultView};

const BAR_WIDTH: usize = 40;

pub fn summary(summary: &ResultSummary, view: &ResultView) -> String {
    let origin = format!("({:.4}, {:.4})", summary.origin.lat(), summary.origin.lon());
    match view.result().shape() {
        QueryShape::Radius { radius_km, .. } => match &summary.located {
            Some(code) => format!(
                "{} ZIPs within {} km of {} {}",
                summary.hits, radius_km, code, origin
            ),
            None => format!("{} ZIPs within {} km of {}", summary.hits, radius_km, origin),
        },
        QueryShape::Polygon { .. } => {
            format!("{} ZIPs in the drawn area, centred on {}", summary.hits, origin)
        }
    }
}

fn mark(state: Option<CheckState>) -> &'static str {
    match state {
        Some(CheckState::Checked) => "[x]",
        Some(CheckState::Mixed) => "[-]",
        Some(CheckState::Unchecked) | None => "[ ]",
    }
}

/// The checkbox tree, leaves annotated with their distance.
pub fn tree(view: &ResultView) -> String {
    let distances: HashMap<&str, f64> = view
        .result()
        .hits()
        .iter()
        .map(|hit| (hit.record.code.as_str(), hit.distance_km))
        .collect();

    let mut out = String::new();
    for control in view.tree().controls() {
        let indent = "  ".repeat(control.depth);
        let state = view.selection().state_of(&control.prefix);
        if control.is_leaf {
            let distance = distances.get(control.prefix.as_str()).copied().unwrap_or(0.0);
            let _ = writeln!(
                out,
                "{}{} {} ({:.2} km)",
                indent,
                mark(state),
                control.prefix,
                distance
            );
        } else {
            let _ = writeln!(
                out,
                "{}{} {} ({})",
                indent,
                mark(state),
                PrefixTree::label(&control.prefix),
                view.tree().codes_under(&control.prefix).len()
            );
        }
    }
    out
}

pub fn histogram(buckets: &[Bucket]) -> String {
    let max = buckets.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    let mut out = String::new();
    for bucket in buckets {
        let bar = "#".repeat(bucket.count * BAR_WIDTH / max);
        let _ = writeln!(out, "{:>12} | {} {}", bucket.label(), bar, bucket.count);
    }
    out
}

pub fn highlight(highlight: &Highlight) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ZIPs matched", highlight.matches.len());
    for point in &highlight.matches {
        let _ = writeln!(
            out,
            "  {} x{} weight {:.2}",
            point.record.code, point.occurrences, point.weight
        );
    }
    if !highlight.unknown.is_empty() {
        let unknown: Vec<&str> = highlight.unknown.iter().map(|c| c.as_str()).collect();
        let _ = writeln!(out, "not in table: {}", unknown.join(","));
    }
    let (sw, ne) = highlight.bounds;
    let _ = writeln!(
        out,
        "bounds: ({:.4}, {:.4}) - ({:.4}, {:.4})",
        sw.lat(),
        sw.lon(),
        ne.lat(),
        ne.lon()
    );
    out
}

pub fn written(paths: &[PathBuf]) -> String {
    let mut out = String::new();
    for path in paths {
        let _ = writeln!(out, "wrote {}", path.display());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use zipscope::storage::CsvText;
    use zipscope::{Command, Outcome, Session};

    fn searched() -> (Session, ResultSummary) {
        let mut session = Session::builder()
            .table(CsvText(
                "plz,lat,lon\n08001,48.0,11.0\n08002,48.01,11.0\n".to_string(),
            ))
            .build()
            .unwrap();
        let Outcome::Results(summary) = session
            .handle(Command::SearchCode("08001".into()))
            .unwrap()
        else {
            panic!("expected results");
        };
        (session, summary)
    }

    #[test]
    fn test_tree_marks_mixed_groups() {
        let (mut session, _) = searched();
        session.set_code("08002", false).unwrap();
        let text = tree(session.view().unwrap());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "[-] 0XXX (2)");
        assert_eq!(lines[3], "      [-] 0800 (2)");
        assert_eq!(lines[4], "        [x] 08001 (0.00 km)");
        assert!(lines[5].starts_with("        [ ] 08002 (1.11 km)"));
    }

    #[test]
    fn test_summary_names_located_code() {
        let (session, summary) = searched();
        let line = super::summary(&summary, session.view().unwrap());
        assert_eq!(line, "2 ZIPs within 10 km of 08001 (48.0000, 11.0000)");
    }

    #[test]
    fn test_histogram_bars_scale_to_largest_bucket() {
        let buckets = vec![
            Bucket {
                lower_km: 0.0,
                upper_km: 5.0,
                count: 4,
            },
            Bucket {
                lower_km: 5.0,
                upper_km: 10.0,
                count: 2,
            },
        ];
        let text = histogram(&buckets);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], format!("{:>12} | {} 4", "0-5 km", "#".repeat(40)));
        assert_eq!(lines[1], format!("{:>12} | {} 2", "5-10 km", "#".repeat(20)));
    }
}
