use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::ExtractArgs;
use crate::commands::inventory;
use crate::model::{ExtractCounts, ExtractPaths, ExtractRunManifest};
use crate::util::{ensure_directory, now_utc_string, utc_compact_string, write_json_pretty};

use super::page_text::{ProviderChain, collect_tool_versions};
use super::parser::WellDocumentParser;
use super::persist::{
    HEADER_CSV_COLUMNS, STIMULATION_CSV_COLUMNS, configure_connection, create_csv, ensure_schema,
    upsert_document,
};

pub(crate) const DEFAULT_DB_FILENAME: &str = "well_records.sqlite";
pub(crate) const RUN_MANIFEST_FILENAME: &str = "extract_run.json";

pub fn run(args: ExtractArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let out_dir = args.out_dir.clone();
    let manifest_dir = out_dir.join("manifests");
    ensure_directory(&manifest_dir)?;

    let header_csv_path = args
        .out_header
        .clone()
        .unwrap_or_else(|| out_dir.join("well_header.csv"));
    let stimulation_csv_path = args
        .out_stim
        .clone()
        .unwrap_or_else(|| out_dir.join("well_stimulation.csv"));
    let db_path: Option<PathBuf> = if args.skip_db {
        None
    } else {
        Some(
            args.db_path
                .clone()
                .unwrap_or_else(|| out_dir.join(DEFAULT_DB_FILENAME)),
        )
    };
    let manifest_path = args
        .manifest_path
        .clone()
        .unwrap_or_else(|| manifest_dir.join(RUN_MANIFEST_FILENAME));

    info!(pdf_root = %args.pdf_root.display(), run_id = %run_id, "starting extract");

    let inventory = inventory::build_manifest(&args.pdf_root)?;
    write_json_pretty(&inventory::default_manifest_path(&out_dir), &inventory)?;

    let parser = WellDocumentParser::new()?;
    let providers = ProviderChain::for_preference(args.prefer_ocr, args.dpi, &args.ocr_lang);
    let available = providers.available_names();
    let mut warnings = Vec::<String>::new();
    if available.is_empty() {
        warn!("no page text provider is available; install pdftotext or pdftoppm + tesseract");
        warnings.push("no page text provider available".to_string());
    } else {
        info!(providers = ?available, "page text providers ready");
    }

    let mut connection = match &db_path {
        Some(path) => {
            let connection = Connection::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            configure_connection(&connection)?;
            ensure_schema(&connection)?;
            Some(connection)
        }
        None => None,
    };

    let mut header_writer = create_csv(&header_csv_path, &HEADER_CSV_COLUMNS)?;
    let mut stimulation_writer = create_csv(&stimulation_csv_path, &STIMULATION_CSV_COLUMNS)?;

    let mut counts = ExtractCounts {
        pdf_count: inventory.pdf_count,
        ..ExtractCounts::default()
    };
    let selected = inventory
        .pdfs
        .iter()
        .take(args.limit.unwrap_or(usize::MAX));

    for entry in selected {
        let pdf_path = args.pdf_root.join(&entry.relative_path);
        info!(document = %entry.document_id, "processing document");

        let text = providers.extract(&pdf_path);
        warnings.extend(text.warnings.iter().cloned());
        if !text.has_text() {
            warn!(document = %entry.document_id, "no text extracted");
            counts.documents_without_text += 1;
            continue;
        }
        if text.provider == Some("ocr") {
            counts.ocr_documents += 1;
        }

        let document = parser.parse(&entry.document_id, &text.pages);
        counts.documents_parsed += 1;
        if document.header.has_fields() {
            counts.headers_with_fields += 1;
        }
        if document.stimulation.has_fields() {
            counts.stimulations_with_fields += 1;
        }

        header_writer.write(&document.header)?;
        stimulation_writer.write(&document.stimulation)?;

        if let Some(connection) = connection.as_mut() {
            upsert_document(connection, &document)?;
            counts.rows_upserted += 1;
        }
    }

    header_writer.finish()?;
    stimulation_writer.finish()?;

    let manifest = ExtractRunManifest {
        manifest_version: 1,
        run_id: run_id.clone(),
        status: "completed".to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_extract_command(&args),
        tool_versions: collect_tool_versions(),
        paths: ExtractPaths {
            pdf_root: args.pdf_root.display().to_string(),
            header_csv_path: header_csv_path.display().to_string(),
            stimulation_csv_path: stimulation_csv_path.display().to_string(),
            db_path: db_path.as_ref().map(|path| path.display().to_string()),
        },
        counts: counts.clone(),
        warnings,
    };
    write_json_pretty(&manifest_path, &manifest)?;

    info!(
        run_id = %run_id,
        documents_parsed = counts.documents_parsed,
        documents_without_text = counts.documents_without_text,
        header_csv = %header_csv_path.display(),
        stimulation_csv = %stimulation_csv_path.display(),
        "extract completed"
    );

    Ok(())
}

fn render_extract_command(args: &ExtractArgs) -> String {
    let mut command = vec![
        "wellrecord".to_string(),
        "extract".to_string(),
        "--pdf-root".to_string(),
        args.pdf_root.display().to_string(),
        "--out-dir".to_string(),
        args.out_dir.display().to_string(),
    ];

    if let Some(path) = &args.out_header {
        command.push("--out-header".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.out_stim {
        command.push("--out-stim".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.db_path {
        command.push("--db-path".to_string());
        command.push(path.display().to_string());
    }
    if args.skip_db {
        command.push("--skip-db".to_string());
    }
    if let Some(path) = &args.manifest_path {
        command.push("--manifest-path".to_string());
        command.push(path.display().to_string());
    }
    if args.prefer_ocr {
        command.push("--prefer-ocr".to_string());
    }
    command.push("--dpi".to_string());
    command.push(args.dpi.to_string());
    command.push("--ocr-lang".to_string());
    command.push(args.ocr_lang.clone());
    if let Some(limit) = args.limit {
        command.push("--limit".to_string());
        command.push(limit.to_string());
    }

    command.join(" ")
}
