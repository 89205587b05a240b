use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "formsplit",
    version,
    about = "Split scanned page sequences into forms by OCR boundary detection"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List input pages in document order and record their hashes
    Inventory(InventoryArgs),
    /// Classify every page, segment into forms and copy into the output tree
    Split(SplitArgs),
    /// Classify a single page and report the closest template distance
    Classify(ClassifyArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[arg(long, default_value = "input")]
    pub input_dir: PathBuf,

    #[arg(long = "extension", default_values_t = default_extensions())]
    pub extensions: Vec<String>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    #[arg(long, default_value = "input")]
    pub input_dir: PathBuf,

    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// JSON template file; the built-in boundary templates are used when omitted
    #[arg(long)]
    pub templates: Option<PathBuf>,

    /// Worker count for the classification phase (defaults to available CPUs)
    #[arg(long)]
    pub workers: Option<usize>,

    #[arg(long, default_value = "eng")]
    pub ocr_lang: String,

    #[arg(long = "extension", default_values_t = default_extensions())]
    pub extensions: Vec<String>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ClassifyArgs {
    pub page: PathBuf,

    #[arg(long)]
    pub templates: Option<PathBuf>,

    #[arg(long, default_value = "eng")]
    pub ocr_lang: String,
}

fn default_extensions() -> Vec<String> {
    vec!["png".to_string()]
}
