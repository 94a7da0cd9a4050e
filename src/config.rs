use std::path::PathBuf;

use clap::Parser;

use crate::data::aggregate::DashboardSettings;

// ---------------------------------------------------------------------------
// Command-line configuration
// ---------------------------------------------------------------------------

/// Interactive survival dashboard for the Titanic passenger list
#[derive(Parser, Debug, Clone)]
#[command(name = "titanic-explorer", version, about)]
pub struct Settings {
    /// Passenger table (.csv, .json or .parquet)
    #[arg(long, env = "TITANIC_DATA", default_value = "titanic.csv")]
    pub data: PathBuf,

    /// Filter preset (JSON) to start from instead of the unfiltered view
    #[arg(long)]
    pub filters: Option<PathBuf>,

    /// Print the dashboard as JSON and exit without opening a window
    #[arg(long)]
    pub summary: bool,

    /// Number of bins in the age histogram
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u16).range(1..=200))]
    pub bins: u16,

    /// Rows in the top / bottom survival tables
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u16).range(1..=50))]
    pub rank_size: u16,
}

impl Settings {
    pub fn dashboard(&self) -> DashboardSettings {
        DashboardSettings {
            histogram_bins: self.bins as usize,
            rank_size: self.rank_size as usize,
        }
    }
}
