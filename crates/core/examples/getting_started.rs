use zipscope::export::{ExportFormat, ExportMode};
use zipscope::selection::PrefixTree;
use zipscope::storage::{CsvText, parse_code_text};
use zipscope::{Command, Outcome, Point, Polygon, Session};

const TABLE: &str = "plz,lat,lon
01067,51.0551,13.7412
01069,51.0368,13.7479
08001,48.0,11.0
08002,48.01,11.0
08004,48.03,11.02
50667,50.9375,6.9603
50668,50.9497,6.9590
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug to see detailed logs)
    env_logger::init();

    println!("=== zipscope - Getting Started ===\n");

    let mut session = Session::builder()
        .table(CsvText(TABLE.to_string()))
        .radius_km(5.0)
        .build()?;
    println!("Loaded {} ZIPs\n", session.table().map_or(0, |t| t.len()));

    // === RADIUS SEARCH ===
    println!("1. Radius search");
    println!("----------------");
    session.handle(Command::SearchCode("08001".into()))?;
    if let Some(result) = session.last_result() {
        for hit in result.by_distance() {
            println!("   {} {:.2} km", hit.record.code, hit.distance_km);
        }
    }
    println!();

    // === MAP CLICK ===
    println!("2. Map click snaps to the nearest ZIP");
    println!("-------------------------------------");
    if let Outcome::Results(summary) =
        session.handle(Command::MapClick(Point::from_lat_lon(50.94, 6.95)))?
    {
        println!(
            "   located {:?}, {} ZIPs in range\n",
            summary.located.map(|c| c.to_string()),
            summary.hits
        );
    }

    // === POLYGON + SELECTION ===
    println!("3. Polygon search with prefix selection");
    println!("---------------------------------------");
    let saxony = Polygon::from_ring(&[[10.0, 47.5], [14.5, 47.5], [14.5, 51.5], [10.0, 51.5]]);
    session.handle(Command::DrawPolygon(saxony))?;
    session.handle(Command::SetPrefix {
        prefix: "080".into(),
        included: false,
    })?;
    session.handle(Command::SetCode {
        code: "08002".into(),
        included: true,
    })?;

    if let Some(view) = session.view() {
        for control in view.tree().controls() {
            let state = view.selection().state_of(&control.prefix);
            println!(
                "   {}{} {:?}",
                "  ".repeat(control.depth),
                PrefixTree::label(&control.prefix),
                state
            );
        }
    }
    println!();

    // === EXPORT ===
    println!("4. Export");
    println!("---------");
    if let Outcome::Exported(bundle) = session.handle(Command::Export(ExportMode::Selected))? {
        if let Some(csv) = bundle.artifact(ExportFormat::Csv) {
            println!("   {}:\n{}\n", csv.file_name, csv.content);
        }
    }

    // === HIGHLIGHT ===
    println!("5. Highlight a code list");
    println!("------------------------");
    let list = parse_code_text("1067, 1067, 50667, 99999", session.config().code_width);
    if let Outcome::Highlighted(highlight) = session.handle(Command::Highlight(list))? {
        for point in &highlight.matches {
            println!("   {} weight {:.1}", point.record.code, point.weight);
        }
        println!("   unknown: {:?}", highlight.unknown);
    }

    Ok(())
}
