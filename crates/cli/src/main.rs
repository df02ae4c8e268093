mod args;
mod report;

use anyhow::{Context, bail};
use args::{Args, Mode, QueryArgs};
use clap::Parser;
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};
use zipscope::export::ExportMode;
use zipscope::storage::{parse_code_column, parse_code_text};
use zipscope::{Command, Config, Outcome, Point, Polygon, ResultView, Session, ZipCode};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zipscope=info,zipscope_cli=info,warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut session = open_session(&args)?;
    run(&mut session, &args)
}

fn open_session(args: &Args) -> anyhow::Result<Session> {
    let config = match &args.config {
        Some(path) => Config::from_toml_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => Config::default(),
    };

    let Some(table) = &args.table else {
        bail!("No reference table given, pass --table <CSV>");
    };
    info!("Loading reference table from {}", table.display());

    Session::builder()
        .config(config)
        .table_path(table)
        .build()
        .with_context(|| format!("Failed to load {}", table.display()))
}

fn run(session: &mut Session, args: &Args) -> anyhow::Result<()> {
    match &args.command {
        Mode::Search { code, query } => {
            run_query(session, args, query, Command::SearchCode(code.clone()))
        }
        Mode::Nearest { lat, lon, query } => run_query(
            session,
            args,
            query,
            Command::Geocoded(Point::from_lat_lon(*lat, *lon)),
        ),
        Mode::Polygon { geojson, query } => {
            let text = std::fs::read_to_string(geojson)
                .with_context(|| format!("Failed to read {}", geojson.display()))?;
            let polygon = Polygon::from_geojson(&text)?;
            run_query(session, args, query, Command::DrawPolygon(polygon))
        }
        Mode::Highlight { list } => {
            let codes = read_code_list(list, session.config().code_width)?;
            let outcome = session.handle(Command::Highlight(codes))?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else if let Outcome::Highlighted(highlight) = &outcome {
                print!("{}", report::highlight(highlight));
            }
            Ok(())
        }
        Mode::Unmatched { list } => {
            let codes = read_code_list(list, session.config().code_width)?;
            export(session, args, &ExportMode::Unmatched { codes })
        }
    }
}

fn run_query(
    session: &mut Session,
    args: &Args,
    query: &QueryArgs,
    command: Command,
) -> anyhow::Result<()> {
    if let Some(radius) = query.radius {
        session.handle(Command::SetRadius(radius))?;
    }

    let Outcome::Results(summary) = session.handle(command)? else {
        bail!("Reference table is not loaded");
    };
    apply_selection(session, query)?;

    let Some(view) = session.view() else {
        bail!("Query produced no result view");
    };
    if args.json {
        let document = serde_json::json!({
            "summary": summary,
            "result": view.result(),
            "included": view.selection().included_codes(),
            "histogram": session.histogram(),
            "heat": session.result_heat(),
            "routes": route_urls(view),
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        println!("{}", report::summary(&summary, view));
        print!("{}", report::tree(view));
        if let Some(buckets) = session.histogram() {
            print!("{}", report::histogram(&buckets));
        }
    }

    if args.out.is_some() {
        let mode = if query.filter_prefix.is_empty() {
            ExportMode::Selected
        } else {
            ExportMode::Filtered {
                prefixes: query.filter_prefix.clone(),
            }
        };
        export(session, args, &mode)?;
    }
    Ok(())
}

/// Directions link for every hit, keyed by code.
fn route_urls(view: &ResultView) -> Vec<serde_json::Value> {
    let result = view.result();
    result
        .hits()
        .iter()
        .map(|hit| serde_json::json!({ "zip": hit.record.code, "url": result.route_url(hit) }))
        .collect()
}

/// Apply the selection flags in order: code exclusions, prefix exclusions,
/// then prefix inclusions. Unknown codes and prefixes are reported and skipped.
fn apply_selection(session: &mut Session, query: &QueryArgs) -> anyhow::Result<()> {
    let commands = query
        .exclude
        .iter()
        .map(|code| Command::SetCode {
            code: code.clone(),
            included: false,
        })
        .chain(query.exclude_prefix.iter().map(|prefix| Command::SetPrefix {
            prefix: prefix.clone(),
            included: false,
        }))
        .chain(query.include_prefix.iter().map(|prefix| Command::SetPrefix {
            prefix: prefix.clone(),
            included: true,
        }));

    for command in commands {
        match session.handle(command) {
            Ok(_) => {}
            Err(e) if e.is_user_facing() => warn!("{}", e),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn export(session: &Session, args: &Args, mode: &ExportMode) -> anyhow::Result<()> {
    let Outcome::Exported(bundle) = session.export(mode)? else {
        bail!("Reference table is not loaded");
    };
    info!("Exporting {} records", bundle.record_count);

    match &args.out {
        Some(dir) => {
            let written = bundle.write_to_dir(dir)?;
            print!("{}", report::written(&written));
        }
        None if args.json => println!("{}", serde_json::to_string_pretty(&bundle)?),
        None => {
            if let Some(csv) = bundle.artifact(zipscope::export::ExportFormat::Csv) {
                println!("{}", csv.content);
            }
        }
    }
    Ok(())
}

/// Read a code list: CSV files by their `plz` column, anything else as
/// comma-separated text.
fn read_code_list(path: &Path, code_width: usize) -> anyhow::Result<Vec<ZipCode>> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let codes = if is_csv {
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        parse_code_column(file, code_width)?
    } else {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        parse_code_text(&text, code_width)
    };
    info!("Read {} codes from {}", codes.len(), path.display());
    Ok(codes)
}
