use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::InventoryArgs;
use crate::model::{PdfEntry, PdfInventoryManifest};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.pdf_root)?;

    if args.dry_run {
        info!(
            pdf_count = manifest.pdf_count,
            source = %manifest.source_directory,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| default_manifest_path(&args.out_dir));

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote inventory manifest");
    info!(pdf_count = manifest.pdf_count, "inventory completed");

    Ok(())
}

pub fn default_manifest_path(out_dir: &Path) -> PathBuf {
    out_dir.join("manifests").join("pdf_inventory.json")
}

/// Hashes every PDF below `pdf_root`. A document's identifier is its path
/// relative to the root, so two files with the same name in different
/// folders stay distinct.
pub fn build_manifest(pdf_root: &Path) -> Result<PdfInventoryManifest> {
    let mut pdf_paths = Vec::new();
    discover_pdfs(pdf_root, &mut pdf_paths)?;
    pdf_paths.sort();

    if pdf_paths.is_empty() {
        warn!(path = %pdf_root.display(), "no PDFs found");
    }

    let mut pdfs = Vec::with_capacity(pdf_paths.len());
    for path in pdf_paths {
        let relative_path = relative_document_path(pdf_root, &path)
            .with_context(|| format!("invalid UTF-8 path: {}", path.display()))?;
        let (sha256, size_bytes) = sha256_file(&path)?;

        pdfs.push(PdfEntry {
            document_id: relative_path.clone(),
            relative_path,
            size_bytes,
            sha256,
        });
    }

    Ok(PdfInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: pdf_root.display().to_string(),
        pdf_count: pdfs.len(),
        pdfs,
    })
}

fn discover_pdfs(dir: &Path, pdfs: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?;

        if file_type.is_dir() {
            discover_pdfs(&path, pdfs)?;
            continue;
        }
        if !file_type.is_file() {
            continue;
        }

        if is_pdf(&path) {
            pdfs.push(path);
        }
    }

    Ok(())
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

fn relative_document_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect::<Option<Vec<&str>>>()?;
    Some(parts.join("/"))
}
