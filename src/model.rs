use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfEntry {
    pub document_id: String,
    pub relative_path: String,
    pub size_bytes: u64,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub pdf_count: usize,
    pub pdfs: Vec<PdfEntry>,
}

/// Identifying and locating details of one well document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderRecord {
    document_id: String,
    pub operator: Option<String>,
    pub well_name: Option<String>,
    pub api_number: Option<String>,
    pub enseco_job: Option<String>,
    pub job_type: Option<String>,
    pub county_state: Option<String>,
    pub surface_hole_location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub datum: Option<String>,
}

impl HeaderRecord {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            operator: None,
            well_name: None,
            api_number: None,
            enseco_job: None,
            job_type: None,
            county_state: None,
            surface_hole_location: None,
            latitude: None,
            longitude: None,
            datum: None,
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn has_fields(&self) -> bool {
        self.operator.is_some()
            || self.well_name.is_some()
            || self.api_number.is_some()
            || self.enseco_job.is_some()
            || self.job_type.is_some()
            || self.county_state.is_some()
            || self.surface_hole_location.is_some()
            || self.latitude.is_some()
            || self.longitude.is_some()
            || self.datum.is_some()
    }
}

/// The stimulation treatment reported in a well document. Numeric fields
/// hold comma-free digit strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StimulationRecord {
    document_id: String,
    pub date_stimulated: Option<String>,
    pub stimulated_formation: Option<String>,
    pub type_treatment: Option<String>,
    pub acid_pct: Option<String>,
    pub lbs_proppant: Option<String>,
    pub top_ft: Option<String>,
    pub bottom_ft: Option<String>,
    pub stimulation_stages: Option<String>,
    pub volume: Option<String>,
    pub volume_units: Option<String>,
    pub max_pressure_psi: Option<String>,
    pub max_treatment_rate_bbls_per_min: Option<String>,
    pub details: Option<String>,
}

impl StimulationRecord {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            date_stimulated: None,
            stimulated_formation: None,
            type_treatment: None,
            acid_pct: None,
            lbs_proppant: None,
            top_ft: None,
            bottom_ft: None,
            stimulation_stages: None,
            volume: None,
            volume_units: None,
            max_pressure_psi: None,
            max_treatment_rate_bbls_per_min: None,
            details: None,
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn has_fields(&self) -> bool {
        [
            &self.date_stimulated,
            &self.stimulated_formation,
            &self.type_treatment,
            &self.acid_pct,
            &self.lbs_proppant,
            &self.top_ft,
            &self.bottom_ft,
            &self.stimulation_stages,
            &self.volume,
            &self.volume_units,
            &self.max_pressure_psi,
            &self.max_treatment_rate_bbls_per_min,
            &self.details,
        ]
        .iter()
        .any(|field| field.is_some())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolVersions {
    pub pdftotext: Option<String>,
    pub pdftoppm: Option<String>,
    pub tesseract: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractPaths {
    pub pdf_root: String,
    pub header_csv_path: String,
    pub stimulation_csv_path: String,
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractCounts {
    pub pdf_count: usize,
    pub documents_parsed: usize,
    pub documents_without_text: usize,
    pub ocr_documents: usize,
    pub headers_with_fields: usize,
    pub stimulations_with_fields: usize,
    pub rows_upserted: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub tool_versions: ToolVersions,
    pub paths: ExtractPaths,
    pub counts: ExtractCounts,
    pub warnings: Vec<String>,
}
