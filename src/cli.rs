//! Command-line arguments
//!
//! Column options take either a header name or a zero-based column index;
//! a negative index leaves an optional field unselected. Text made only of
//! digits is always read as an index, so a header such as `2024` has to be
//! selected by its position.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use cdr_mapper_lib::columns::{CdrMapping, ColumnRef, TowerMapping};
use cdr_mapper_lib::config::DEFAULT_DATABASE_FILE;
use cdr_mapper_lib::db::NewCase;

#[derive(Parser, Debug)]
#[command(name = "cdr-mapper")]
#[command(about = "Plot call detail records at their serving tower sectors as a KML map")]
#[command(version)]
#[command(after_help = "Column options accept a header name or a zero-based index. \
Text made only of digits is read as an index, so a header named 2024 must be given by position. \
A negative index leaves an optional CDR field unselected.")]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, default_value = DEFAULT_DATABASE_FILE, env = "CDR_MAPPER_DATABASE")]
    pub database: PathBuf,

    /// Delete the database before running
    #[arg(long, global = true)]
    pub reset: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a case and print its id
    NewCase(CaseArgs),

    /// List the header row of a CSV file with column indices
    Headers { file: PathBuf },

    /// Import a tower/sector CSV into a case
    ImportTowers {
        #[arg(long)]
        case: i64,
        #[arg(long)]
        file: PathBuf,
        #[command(flatten)]
        columns: TowerColumnArgs,
    },

    /// Import a CDR CSV into a case
    ImportCdrs {
        #[arg(long)]
        case: i64,
        #[arg(long)]
        file: PathBuf,
        #[command(flatten)]
        columns: CdrColumnArgs,
    },

    /// Write the case map to <output-dir>/<case number>.kml
    Report {
        #[arg(long)]
        case: i64,
        #[arg(long, default_value = ".", env = "CDR_MAPPER_OUTPUT_DIR")]
        output_dir: PathBuf,
    },

    /// Print row counts
    Stats,

    /// Create a case, import both files and write the map in one go
    Run {
        #[command(flatten)]
        case: CaseArgs,
        #[arg(long)]
        towers: PathBuf,
        #[arg(long)]
        cdrs: PathBuf,
        #[command(flatten)]
        tower_columns: TowerColumnArgs,
        #[command(flatten)]
        cdr_columns: CdrColumnArgs,
        #[arg(long, default_value = ".", env = "CDR_MAPPER_OUTPUT_DIR")]
        output_dir: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct CaseArgs {
    #[arg(long)]
    pub case_number: String,
    #[arg(long)]
    pub agency: String,
    #[arg(long)]
    pub agent: String,
    #[arg(long)]
    pub analyst: String,
    #[arg(long)]
    pub target_number: String,
}

impl CaseArgs {
    pub fn into_case(self) -> NewCase {
        NewCase {
            case_number: self.case_number,
            agency: self.agency,
            agent: self.agent,
            analyst: self.analyst,
            target_number: self.target_number,
        }
    }
}

#[derive(Args, Debug)]
pub struct TowerColumnArgs {
    #[arg(long)]
    pub tower_cell_site: String,
    #[arg(long)]
    pub tower_latitude: String,
    #[arg(long)]
    pub tower_longitude: String,
    #[arg(long)]
    pub tower_sector: String,
    #[arg(long)]
    pub tower_azimuth: String,
}

impl TowerColumnArgs {
    pub fn mapping(&self) -> TowerMapping {
        TowerMapping {
            cell_site: ColumnRef::parse(&self.tower_cell_site),
            latitude: ColumnRef::parse(&self.tower_latitude),
            longitude: ColumnRef::parse(&self.tower_longitude),
            sector: ColumnRef::parse(&self.tower_sector),
            azimuth: ColumnRef::parse(&self.tower_azimuth),
        }
    }
}

#[derive(Args, Debug)]
pub struct CdrColumnArgs {
    #[arg(long)]
    pub cdr_called_number: String,
    #[arg(long)]
    pub cdr_cell_site: String,
    #[arg(long)]
    pub cdr_sector: String,

    #[arg(long, allow_hyphen_values = true)]
    pub cdr_calling_number: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub cdr_dialed_digits: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub cdr_direction: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub cdr_start_date: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub cdr_end_date: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub cdr_duration: Option<String>,

    /// Extra column for the map popup (repeatable)
    #[arg(long = "cdr-extra")]
    pub cdr_extra: Vec<String>,
}

impl CdrColumnArgs {
    pub fn mapping(&self) -> CdrMapping {
        let optional = |arg: &Option<String>| arg.as_deref().and_then(ColumnRef::parse);

        CdrMapping {
            called_number: ColumnRef::parse(&self.cdr_called_number),
            cell_site: ColumnRef::parse(&self.cdr_cell_site),
            sector: ColumnRef::parse(&self.cdr_sector),
            calling_number: optional(&self.cdr_calling_number),
            dialed_digits: optional(&self.cdr_dialed_digits),
            direction: optional(&self.cdr_direction),
            start_date: optional(&self.cdr_start_date),
            end_date: optional(&self.cdr_end_date),
            duration: optional(&self.cdr_duration),
            extra: self.cdr_extra.iter().filter_map(|s| ColumnRef::parse(s)).collect(),
        }
    }
}
