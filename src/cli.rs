use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "wellrecord",
    version,
    about = "Extract well header and stimulation records from regulatory PDFs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Inventory(InventoryArgs),
    Extract(ExtractArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[arg(long, default_value = "pdfs")]
    pub pdf_root: PathBuf,

    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long, default_value = "pdfs")]
    pub pdf_root: PathBuf,

    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,

    #[arg(long)]
    pub out_header: Option<PathBuf>,

    #[arg(long)]
    pub out_stim: Option<PathBuf>,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub skip_db: bool,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub prefer_ocr: bool,

    #[arg(long, default_value_t = 300)]
    pub dpi: u32,

    #[arg(long, default_value = "eng")]
    pub ocr_lang: String,

    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}
