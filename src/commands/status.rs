use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::commands::extract::{DEFAULT_DB_FILENAME, RUN_MANIFEST_FILENAME, count_rows};
use crate::commands::inventory;
use crate::model::{ExtractRunManifest, PdfInventoryManifest};
use crate::util::read_json;

pub fn run(args: StatusArgs) -> Result<()> {
    let run_manifest_path = args.out_dir.join("manifests").join(RUN_MANIFEST_FILENAME);
    let inventory_path = inventory::default_manifest_path(&args.out_dir);
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| args.out_dir.join(DEFAULT_DB_FILENAME));

    info!(out_dir = %args.out_dir.display(), "status requested");

    if run_manifest_path.exists() {
        let manifest: ExtractRunManifest = read_json(&run_manifest_path)?;

        info!(
            run_id = %manifest.run_id,
            status = %manifest.status,
            started_at = %manifest.started_at,
            updated_at = %manifest.updated_at,
            command = %manifest.command,
            pdf_count = manifest.counts.pdf_count,
            documents_parsed = manifest.counts.documents_parsed,
            documents_without_text = manifest.counts.documents_without_text,
            ocr_documents = manifest.counts.ocr_documents,
            headers_with_fields = manifest.counts.headers_with_fields,
            stimulations_with_fields = manifest.counts.stimulations_with_fields,
            rows_upserted = manifest.counts.rows_upserted,
            warnings = manifest.warnings.len(),
            pdftotext = %manifest.tool_versions.pdftotext.as_deref().unwrap_or_default(),
            tesseract = %manifest.tool_versions.tesseract.as_deref().unwrap_or_default(),
            "loaded extract run manifest"
        );
    } else {
        warn!(path = %run_manifest_path.display(), "extract run manifest missing");
    }

    if inventory_path.exists() {
        let inventory: PdfInventoryManifest = read_json(&inventory_path)?;

        info!(
            generated_at = %inventory.generated_at,
            pdf_count = inventory.pdf_count,
            "loaded inventory manifest"
        );
    } else {
        warn!(path = %inventory_path.display(), "inventory manifest missing");
    }

    if db_path.exists() {
        let conn = Connection::open_with_flags(&db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("failed to open {}", db_path.display()))?;
        let headers = count_rows(&conn, "SELECT COUNT(*) FROM well_header").with_context(|| {
            format!("failed to count well_header rows in {}", db_path.display())
        })?;
        let stimulations = count_rows(&conn, "SELECT COUNT(*) FROM well_stimulation")
            .with_context(|| {
                format!("failed to count well_stimulation rows in {}", db_path.display())
            })?;
        let located = count_rows(
            &conn,
            "SELECT COUNT(*) FROM well_header WHERE latitude IS NOT NULL AND longitude IS NOT NULL",
        )
        .with_context(|| format!("failed to count located wells in {}", db_path.display()))?;

        info!(
            path = %db_path.display(),
            headers = headers,
            stimulations = stimulations,
            located_wells = located,
            "database status"
        );
    } else {
        warn!(path = %db_path.display(), "database file missing");
    }

    Ok(())
}
