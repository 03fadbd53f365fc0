use clap::{Args, Parser, Subcommand};
use distmap_common::ViewState;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "distmap")]
#[command(about = "Client distribution map: filter by zone, pick clients, export PDF/Excel reports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Cleaned dataset (CSV/XLSX), overrides config and DISTMAP_DATA
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,
}

/// Zone filter, pharmacy narrowing and row selection
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Zone codes (repeat or comma-separate, e.g. SU01,SU02)
    #[arg(short, long = "zone", value_delimiter = ',')]
    pub zones: Vec<String>,

    /// Only these pharmacies (Botica), repeatable
    #[arg(short = 'b', long = "botica")]
    pub pharmacies: Vec<String>,

    /// Display indices to select (comma-separated, 1-based)
    #[arg(short, long, value_delimiter = ',')]
    pub select: Vec<usize>,

    /// Select every row in the view
    #[arg(long, conflicts_with = "select")]
    pub all: bool,
}

impl ViewArgs {
    pub fn to_state(&self) -> ViewState {
        let mut state = ViewState::with_zones(self.zones.iter().map(|z| z.trim().to_string()));
        state.pharmacies = self.pharmacies.iter().cloned().collect();
        state.selected = self.select.iter().copied().collect();
        state
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List zones with their client counts
    Zones,

    /// Show the selection table for the chosen zones
    Table {
        #[command(flatten)]
        view: ViewArgs,

        /// Print JSON instead of a text table
        #[arg(long)]
        json: bool,
    },

    /// Write the map as an HTML page and/or PNG image
    Map {
        #[command(flatten)]
        view: ViewArgs,

        /// Interactive HTML output
        #[arg(long)]
        html: Option<PathBuf>,

        /// Static PNG output
        #[arg(long)]
        png: Option<PathBuf>,
    },

    /// Export the selected rows with a map snapshot
    Export {
        #[command(flatten)]
        view: ViewArgs,

        /// Output format (pdf/excel/both)
        #[arg(short, long, default_value = "pdf")]
        format: ExportFormat,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report title
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Interactive dashboard
    Dashboard {
        /// Directory for maps and reports
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a Google MyMaps CSV export into the cleaned dataset
    Convert {
        /// MyMaps export
        #[arg(required = true)]
        input: PathBuf,

        /// Cleaned dataset (default: configured data path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Backup folder (default: data_originales/ next to the output)
        #[arg(long)]
        backup_dir: Option<PathBuf>,
    },

    /// Show or edit settings
    Config {
        /// Set the dataset path
        #[arg(long)]
        set_data_path: Option<PathBuf>,

        /// Set the initial map zoom (1-18)
        #[arg(long)]
        set_zoom: Option<u8>,

        /// Show settings
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Pdf,
    Excel,
    Both,
}

impl ExportFormat {
    pub fn includes_pdf(&self) -> bool {
        matches!(self, ExportFormat::Pdf | ExportFormat::Both)
    }

    pub fn includes_excel(&self) -> bool {
        matches!(self, ExportFormat::Excel | ExportFormat::Both)
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Formato desconocido: {}. Use pdf, excel o both", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Pdf => write!(f, "pdf"),
            ExportFormat::Excel => write!(f, "excel"),
            ExportFormat::Both => write!(f, "both"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table_args() {
        let cli = Cli::try_parse_from([
            "distmap", "table", "--zone", "SU01,SU02", "-s", "1,3", "--botica", "Botica Salud",
        ])
        .unwrap();

        match cli.command {
            Commands::Table { view, json } => {
                assert!(!json);
                let state = view.to_state();
                assert_eq!(state.zones.len(), 2);
                assert!(state.selected.contains(&3));
                assert!(state.pharmacies.contains("Botica Salud"));
            }
            _ => panic!("expected table command"),
        }
    }

    #[test]
    fn test_global_data_flag() {
        let cli = Cli::try_parse_from(["distmap", "zones", "--data", "otro.csv"]).unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("otro.csv")));
    }

    #[test]
    fn test_all_conflicts_with_select() {
        let result = Cli::try_parse_from(["distmap", "export", "-z", "SU01", "--all", "-s", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_export_format() {
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert!("docx".parse::<ExportFormat>().is_err());
        assert!(ExportFormat::Both.includes_pdf() && ExportFormat::Both.includes_excel());
    }
}
