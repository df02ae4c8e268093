use std::io::Write;
use tempfile::{NamedTempFile, tempdir};
use zipscope::export::{ExportFormat, ExportMode};
use zipscope::prelude::*;
use zipscope::storage::parse_code_text;

const SAMPLE: &str = "plz,lat,lon\n08001,48.0,11.0\n08002,48.01,11.0\n50667,50.93,6.96\n";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn table_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn codes(session: &Session) -> Vec<String> {
    session
        .last_result()
        .map(|result| result.codes().map(|c| c.as_str().to_string()).collect())
        .unwrap_or_default()
}

#[test]
fn test_radius_scenario_from_file() {
    init_logging();
    let file = table_file(SAMPLE);
    let mut session = Session::builder().table_path(file.path()).build().unwrap();

    session.handle(Command::SetRadius(5.0)).unwrap();
    session.handle(Command::SearchCode("08001".into())).unwrap();
    assert_eq!(codes(&session), vec!["08001", "08002"]);

    let Outcome::Exported(bundle) = session
        .handle(Command::Export(ExportMode::Selected))
        .unwrap()
    else {
        panic!("expected an export");
    };
    assert_eq!(
        bundle.artifact(ExportFormat::Csv).unwrap().content,
        "zip,lat,lon\n08001,48.0,11.0\n08002,48.01,11.0"
    );

    session.handle(Command::SetRadius(1.0)).unwrap();
    session.handle(Command::SearchCode("08001".into())).unwrap();
    assert_eq!(codes(&session), vec!["08001"]);
}

#[test]
fn test_lookup_miss_changes_nothing() {
    init_logging();
    let mut session = Session::builder()
        .table(CsvText(SAMPLE.to_string()))
        .build()
        .unwrap();
    session.handle(Command::SearchCode("08001".into())).unwrap();
    let markers_before: Vec<MarkerClass> = session
        .marker_classes()
        .into_iter()
        .map(|(_, class)| class)
        .collect();

    let err = session
        .handle(Command::SearchCode("12345".into()))
        .unwrap_err();
    assert_eq!(err.to_string(), "ZIP not found: 12345");

    let markers_after: Vec<MarkerClass> = session
        .marker_classes()
        .into_iter()
        .map(|(_, class)| class)
        .collect();
    assert_eq!(markers_before, markers_after);
    assert_eq!(codes(&session), vec!["08001", "08002"]);
}

#[test]
fn test_polygon_selection_and_filtered_export() {
    init_logging();
    let mut session = Session::builder()
        .table(CsvText(SAMPLE.to_string()))
        .build()
        .unwrap();

    let polygon = Polygon::from_geojson(
        r#"{"type":"Feature","properties":{},"geometry":{"type":"Polygon",
            "coordinates":[[[5.0,47.0],[12.0,47.0],[12.0,52.0],[5.0,52.0],[5.0,47.0]]]}}"#,
    )
    .unwrap();
    session.handle(Command::DrawPolygon(polygon)).unwrap();
    assert_eq!(codes(&session), vec!["08001", "08002", "50667"]);

    session
        .handle(Command::SetPrefix {
            prefix: "08".into(),
            included: false,
        })
        .unwrap();
    session
        .handle(Command::SetCode {
            code: "08002".into(),
            included: true,
        })
        .unwrap();

    let selection = session.view().unwrap().selection();
    assert_eq!(selection.state_of("0"), Some(CheckState::Mixed));
    assert_eq!(selection.state_of("08001"), Some(CheckState::Unchecked));

    let filtered = ExportMode::Filtered {
        prefixes: vec!["0".into()],
    };
    let Outcome::Exported(bundle) = session.handle(Command::Export(filtered)).unwrap() else {
        panic!("expected an export");
    };
    assert_eq!(bundle.artifact(ExportFormat::Txt).unwrap().content, "08002");

    let dir = tempdir().unwrap();
    let written = bundle.write_to_dir(dir.path()).unwrap();
    assert!(written.iter().all(|path| path.exists()));
    assert!(dir.path().join("zip_export_filtered.xlsx.json").exists());
}

#[test]
fn test_selection_properties() {
    init_logging();
    let mut session = Session::builder()
        .table(CsvText(SAMPLE.to_string()))
        .radius_km(1000.0)
        .build()
        .unwrap();
    session.handle(Command::SearchCode("50667".into())).unwrap();

    session.handle(Command::SelectAll).unwrap();
    let once: Vec<String> = included(&session);
    session.handle(Command::SelectAll).unwrap();
    assert_eq!(included(&session), once);

    session
        .handle(Command::SetPrefix {
            prefix: "0".into(),
            included: false,
        })
        .unwrap();
    let view = session.view().unwrap();
    for control in view.tree().controls() {
        if control.prefix.starts_with('0') {
            assert_eq!(
                view.selection().state_of(&control.prefix),
                Some(CheckState::Unchecked),
                "{} should be unchecked",
                control.prefix
            );
        }
    }
    assert_eq!(included(&session), vec!["50667"]);

    let flattened: Vec<&str> = view
        .tree()
        .records()
        .iter()
        .map(|record| record.code.as_str())
        .collect();
    assert_eq!(flattened, vec!["08001", "08002", "50667"]);
}

fn included(session: &Session) -> Vec<String> {
    session
        .view()
        .unwrap()
        .selection()
        .included_codes()
        .into_iter()
        .map(|code| code.as_str().to_string())
        .collect()
}

#[test]
fn test_highlight_and_unmatched_from_code_list() {
    init_logging();
    let mut session = Session::builder()
        .table(CsvText(SAMPLE.to_string()))
        .build()
        .unwrap();
    let width = session.config().code_width;
    let list = parse_code_text("8001, 8001,  99999,", width);

    let Outcome::Highlighted(highlight) = session.handle(Command::Highlight(list.clone())).unwrap()
    else {
        panic!("expected a highlight");
    };
    assert_eq!(highlight.matches.len(), 1);
    assert_eq!(highlight.matches[0].occurrences, 2);
    assert_eq!(highlight.unknown.len(), 1);

    let Outcome::Exported(bundle) = session
        .handle(Command::Export(ExportMode::Unmatched { codes: list }))
        .unwrap()
    else {
        panic!("expected an export");
    };
    assert_eq!(
        bundle.artifact(ExportFormat::Csv).unwrap().content,
        "plz,lat,lon\n08002,48.01,11.0\n50667,50.93,6.96"
    );
}

#[test]
fn test_config_from_toml_file() {
    init_logging();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "default_radius_km = 2.0").unwrap();
    writeln!(file, "histogram_edges_km = [0.0, 1.0, 2.0]").unwrap();

    let config = Config::from_toml_file(file.path()).unwrap();
    let mut session = Session::builder()
        .config(config)
        .table(CsvText(SAMPLE.to_string()))
        .build()
        .unwrap();
    assert_eq!(session.radius_km(), 2.0);

    session.handle(Command::SearchCode("08001".into())).unwrap();
    let counts: Vec<usize> = session
        .histogram()
        .unwrap()
        .iter()
        .map(|bucket| bucket.count)
        .collect();
    assert_eq!(counts, vec![1, 1]);
}
