use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Postal-code radius and polygon lookups", long_about = None)]
pub struct Args {
    /// Reference table (CSV with code, latitude and longitude columns).
    #[arg(short, long, global = true)]
    pub table: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory to write export artifacts into.
    #[arg(short, long, global = true)]
    pub out: Option<PathBuf>,

    /// Print outcomes as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Radius search around a postal code.
    Search {
        code: String,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Radius search around the code nearest to a coordinate.
    Nearest {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Codes inside a GeoJSON polygon (Feature or Geometry).
    Polygon {
        geojson: PathBuf,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Match a code list (text or CSV with a plz column) against the table.
    Highlight { list: PathBuf },
    /// Export table rows missing from a code list.
    Unmatched { list: PathBuf },
}

/// Radius and selection flags shared by the query subcommands.
#[derive(ClapArgs, Debug, Default, Clone)]
pub struct QueryArgs {
    /// Search radius in kilometres. Defaults to the configured radius.
    #[arg(short, long)]
    pub radius: Option<f64>,

    /// Codes to exclude from the selection.
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Prefix groups to exclude from the selection.
    #[arg(long, value_delimiter = ',')]
    pub exclude_prefix: Vec<String>,

    /// Prefix groups to include again after exclusions.
    #[arg(long, value_delimiter = ',')]
    pub include_prefix: Vec<String>,

    /// Export table rows under these prefixes instead of the result.
    #[arg(long, value_delimiter = ',')]
    pub filter_prefix: Vec<String>,
}
