use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{debug, warn};

use crate::model::ToolVersions;

/// A source of per-page text for a PDF.
pub(crate) trait PageTextProvider {
    fn name(&self) -> &'static str;

    /// Whether the external tools this provider needs can be run.
    fn is_available(&self) -> bool;

    fn extract_pages(&self, pdf_path: &Path) -> Result<Vec<String>>;
}

/// Native text layer through `pdftotext`.
#[derive(Debug, Default)]
pub(crate) struct TextLayerProvider;

impl PageTextProvider for TextLayerProvider {
    fn name(&self) -> &'static str {
        "text_layer"
    }

    fn is_available(&self) -> bool {
        command_available("pdftotext", "-v")
    }

    fn extract_pages(&self, pdf_path: &Path) -> Result<Vec<String>> {
        let output = Command::new("pdftotext")
            .arg("-enc")
            .arg("UTF-8")
            .arg(pdf_path)
            .arg("-")
            .output()
            .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "pdftotext returned non-zero exit status for {}: {}",
                pdf_path.display(),
                stderr.trim()
            );
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        let mut pages: Vec<String> = raw
            .split('\u{000C}')
            .map(|chunk| chunk.replace('\u{0000}', ""))
            .collect();

        while let Some(last_page) = pages.last() {
            if last_page.trim().is_empty() {
                pages.pop();
                continue;
            }
            break;
        }

        Ok(pages)
    }
}

/// Rendered page images read back with `tesseract`.
#[derive(Debug)]
pub(crate) struct OcrProvider {
    dpi: u32,
    lang: String,
}

impl OcrProvider {
    pub(crate) fn new(dpi: u32, lang: impl Into<String>) -> Self {
        Self {
            dpi,
            lang: lang.into(),
        }
    }

    fn render_pages(&self, pdf_path: &Path, scratch_dir: &Path) -> Result<Vec<PathBuf>> {
        let prefix = scratch_dir.join("page");
        let output = Command::new("pdftoppm")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(pdf_path)
            .arg(&prefix)
            .output()
            .with_context(|| format!("failed to execute pdftoppm for {}", pdf_path.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "pdftoppm returned non-zero exit status for {}: {}",
                pdf_path.display(),
                stderr.trim()
            );
        }

        let mut images = Vec::new();
        let entries = fs::read_dir(scratch_dir)
            .with_context(|| format!("failed to read {}", scratch_dir.display()))?;
        for entry in entries {
            let path = entry
                .with_context(|| format!("failed to read entry in {}", scratch_dir.display()))?
                .path();
            let is_png = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("png"))
                .unwrap_or(false);
            if is_png {
                images.push(path);
            }
        }

        // pdftoppm zero-pads page numbers to a common width, so a plain sort
        // keeps reading order.
        images.sort();

        if images.is_empty() {
            bail!("pdftoppm produced no page images for {}", pdf_path.display());
        }

        Ok(images)
    }

    fn recognize(&self, image_path: &Path) -> Result<String> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .output()
            .with_context(|| format!("failed to execute tesseract for {}", image_path.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "tesseract returned non-zero exit status for {}: {}",
                image_path.display(),
                stderr.trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .replace('\u{0000}', "")
            .trim()
            .to_string())
    }
}

impl PageTextProvider for OcrProvider {
    fn name(&self) -> &'static str {
        "ocr"
    }

    fn is_available(&self) -> bool {
        command_available("pdftoppm", "-v") && command_available("tesseract", "--version")
    }

    fn extract_pages(&self, pdf_path: &Path) -> Result<Vec<String>> {
        let scratch_dir = scratch_dir_for(pdf_path);
        fs::create_dir_all(&scratch_dir)
            .with_context(|| format!("failed to create directory: {}", scratch_dir.display()))?;

        let result = self
            .render_pages(pdf_path, &scratch_dir)
            .and_then(|images| {
                images
                    .iter()
                    .map(|image| self.recognize(image))
                    .collect::<Result<Vec<String>>>()
            });

        remove_scratch_dir(&scratch_dir);
        result
    }
}

/// Returns whether the directory was removed; a failure is logged, not raised.
pub(crate) fn remove_scratch_dir(scratch_dir: &Path) -> bool {
    match fs::remove_dir_all(scratch_dir) {
        Ok(()) => true,
        Err(error) => {
            warn!(
                path = %scratch_dir.display(),
                error = %error,
                "failed to remove OCR scratch directory"
            );
            false
        }
    }
}

fn scratch_dir_for(pdf_path: &Path) -> PathBuf {
    let pdf_stem = pdf_path
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or("pdf");
    let safe_stem = pdf_stem
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() {
                character
            } else {
                '_'
            }
        })
        .collect::<String>();

    let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    std::env::temp_dir().join(format!(
        "wellrecord_ocr_{}_{}_{}",
        safe_stem,
        std::process::id(),
        stamp
    ))
}

/// Page text for one document along with where it came from.
#[derive(Debug, Default)]
pub(crate) struct DocumentText {
    pub(crate) pages: Vec<String>,
    pub(crate) provider: Option<&'static str>,
    pub(crate) warnings: Vec<String>,
}

impl DocumentText {
    pub(crate) fn has_text(&self) -> bool {
        self.pages.iter().any(|page| !page.trim().is_empty())
    }
}

/// Providers in preference order. Unavailable providers are skipped and a
/// provider that fails or yields only blank pages hands over to the next.
/// Availability is probed once, when the chain is built.
pub(crate) struct ProviderChain {
    providers: Vec<Box<dyn PageTextProvider>>,
}

impl ProviderChain {
    pub(crate) fn new(providers: Vec<Box<dyn PageTextProvider>>) -> Self {
        let providers = providers
            .into_iter()
            .filter(|provider| {
                let available = provider.is_available();
                if !available {
                    debug!(provider = provider.name(), "page text provider unavailable");
                }
                available
            })
            .collect();
        Self { providers }
    }

    pub(crate) fn for_preference(prefer_ocr: bool, dpi: u32, ocr_lang: &str) -> Self {
        let text_layer: Box<dyn PageTextProvider> = Box::new(TextLayerProvider);
        let ocr: Box<dyn PageTextProvider> = Box::new(OcrProvider::new(dpi, ocr_lang));

        if prefer_ocr {
            Self::new(vec![ocr, text_layer])
        } else {
            Self::new(vec![text_layer, ocr])
        }
    }

    pub(crate) fn available_names(&self) -> Vec<&'static str> {
        self.providers
            .iter()
            .map(|provider| provider.name())
            .collect()
    }

    pub(crate) fn extract(&self, pdf_path: &Path) -> DocumentText {
        let mut document = DocumentText::default();

        for provider in &self.providers {
            match provider.extract_pages(pdf_path) {
                Ok(pages) => {
                    if pages.iter().any(|page| !page.trim().is_empty()) {
                        document.pages = pages;
                        document.provider = Some(provider.name());
                        return document;
                    }
                    debug!(
                        provider = provider.name(),
                        path = %pdf_path.display(),
                        "provider returned no text"
                    );
                }
                Err(error) => {
                    warn!(
                        provider = provider.name(),
                        path = %pdf_path.display(),
                        error = %error,
                        "page text provider failed"
                    );
                    document.warnings.push(format!(
                        "{} failed for {}: {}",
                        provider.name(),
                        pdf_path.display(),
                        error
                    ));
                }
            }
        }

        document
    }
}

fn command_available(program: &str, version_flag: &str) -> bool {
    Command::new(program).arg(version_flag).output().is_ok()
}

pub(crate) fn collect_tool_versions() -> ToolVersions {
    ToolVersions {
        pdftotext: command_version_optional("pdftotext", &["-v"]),
        pdftoppm: command_version_optional("pdftoppm", &["-v"]),
        tesseract: command_version_optional("tesseract", &["--version"]),
    }
}

fn command_version_optional(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let source = if stdout.trim().is_empty() {
        stderr.trim()
    } else {
        stdout.trim()
    };

    source
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
}
