use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "notaspese")]
#[command(about = "Estrae il totale da uno scontrino riconosciuto via OCR", long_about = None)]
pub struct Cli {
    /// Recognized receipt text; stdin when omitted or "-"
    pub input: Option<PathBuf>,

    /// Receipt photo to run through OCR first (needs the `tesseract` feature)
    #[arg(long, conflicts_with = "input")]
    pub image: Option<PathBuf>,

    /// TOML file overriding the built-in keyword tables
    #[arg(short, long)]
    pub patterns: Option<PathBuf>,

    /// Print the full analysis as JSON
    #[arg(long)]
    pub json: bool,

    /// Debug logging (RUST_LOG still wins when set)
    #[arg(short, long)]
    pub verbose: bool,
}
