use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, params};
use serde::Serialize;

use crate::util::{ensure_directory, now_utc_string};

use super::parser::ParsedDocument;

pub(crate) const HEADER_CSV_COLUMNS: [&str; 11] = [
    "document_id",
    "operator",
    "well_name",
    "api_number",
    "enseco_job",
    "job_type",
    "county_state",
    "surface_hole_location",
    "latitude",
    "longitude",
    "datum",
];

pub(crate) const STIMULATION_CSV_COLUMNS: [&str; 14] = [
    "document_id",
    "date_stimulated",
    "stimulated_formation",
    "type_treatment",
    "acid_pct",
    "lbs_proppant",
    "top_ft",
    "bottom_ft",
    "stimulation_stages",
    "volume",
    "volume_units",
    "max_pressure_psi",
    "max_treatment_rate_bbls_per_min",
    "details",
];

/// CSV output for one record type. The header row is written up front so
/// an empty run still produces a well-formed file.
pub(crate) struct RecordWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> RecordWriter<W> {
    pub(crate) fn new(inner: W, columns: &[&str]) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer
            .write_record(columns)
            .context("failed to write csv header row")?;
        Ok(Self { writer })
    }

    pub(crate) fn write<T: Serialize>(&mut self, record: &T) -> Result<()> {
        self.writer
            .serialize(record)
            .context("failed to write csv record")
    }

    pub(crate) fn finish(mut self) -> Result<W> {
        self.writer.flush().context("failed to flush csv output")?;
        self.writer
            .into_inner()
            .map_err(|error| anyhow!("failed to finalize csv output: {}", error.error()))
    }
}

pub(crate) fn create_csv(path: &Path, columns: &[&str]) -> Result<RecordWriter<File>> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }
    let file = File::create(path)
        .with_context(|| format!("failed to create csv file: {}", path.display()))?;
    RecordWriter::new(file, columns)
}

pub(crate) fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "foreign_keys", "ON")
        .context("failed to enable foreign keys")?;
    Ok(())
}

pub(crate) fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS well_header (
              document_id TEXT PRIMARY KEY,
              operator TEXT,
              well_name TEXT,
              api_number TEXT,
              enseco_job TEXT,
              job_type TEXT,
              county_state TEXT,
              surface_hole_location TEXT,
              latitude REAL,
              longitude REAL,
              datum TEXT,
              updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS well_stimulation (
              document_id TEXT PRIMARY KEY,
              date_stimulated TEXT,
              stimulated_formation TEXT,
              type_treatment TEXT,
              acid_pct TEXT,
              lbs_proppant TEXT,
              top_ft TEXT,
              bottom_ft TEXT,
              stimulation_stages TEXT,
              volume TEXT,
              volume_units TEXT,
              max_pressure_psi TEXT,
              max_treatment_rate_bbls_per_min TEXT,
              details TEXT,
              updated_at TEXT NOT NULL,
              FOREIGN KEY(document_id) REFERENCES well_header(document_id)
                ON DELETE CASCADE ON UPDATE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_well_header_api ON well_header(api_number);
            ",
        )
        .context("failed to create well record schema")?;
    Ok(())
}

/// Writes both records of a document in one transaction, replacing any
/// earlier rows for the same document.
pub(crate) fn upsert_document(connection: &mut Connection, document: &ParsedDocument) -> Result<()> {
    let header = &document.header;
    let stimulation = &document.stimulation;
    let updated_at = now_utc_string();

    let tx = connection
        .transaction()
        .context("failed to start upsert transaction")?;

    tx.execute(
        "
        INSERT INTO well_header (
          document_id, operator, well_name, api_number, enseco_job, job_type,
          county_state, surface_hole_location, latitude, longitude, datum, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ON CONFLICT(document_id) DO UPDATE SET
          operator = excluded.operator,
          well_name = excluded.well_name,
          api_number = excluded.api_number,
          enseco_job = excluded.enseco_job,
          job_type = excluded.job_type,
          county_state = excluded.county_state,
          surface_hole_location = excluded.surface_hole_location,
          latitude = excluded.latitude,
          longitude = excluded.longitude,
          datum = excluded.datum,
          updated_at = excluded.updated_at
        ",
        params![
            header.document_id(),
            header.operator,
            header.well_name,
            header.api_number,
            header.enseco_job,
            header.job_type,
            header.county_state,
            header.surface_hole_location,
            header.latitude,
            header.longitude,
            header.datum,
            updated_at,
        ],
    )
    .with_context(|| format!("failed to upsert well_header for {}", header.document_id()))?;

    tx.execute(
        "
        INSERT INTO well_stimulation (
          document_id, date_stimulated, stimulated_formation, type_treatment, acid_pct,
          lbs_proppant, top_ft, bottom_ft, stimulation_stages, volume, volume_units,
          max_pressure_psi, max_treatment_rate_bbls_per_min, details, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        ON CONFLICT(document_id) DO UPDATE SET
          date_stimulated = excluded.date_stimulated,
          stimulated_formation = excluded.stimulated_formation,
          type_treatment = excluded.type_treatment,
          acid_pct = excluded.acid_pct,
          lbs_proppant = excluded.lbs_proppant,
          top_ft = excluded.top_ft,
          bottom_ft = excluded.bottom_ft,
          stimulation_stages = excluded.stimulation_stages,
          volume = excluded.volume,
          volume_units = excluded.volume_units,
          max_pressure_psi = excluded.max_pressure_psi,
          max_treatment_rate_bbls_per_min = excluded.max_treatment_rate_bbls_per_min,
          details = excluded.details,
          updated_at = excluded.updated_at
        ",
        params![
            stimulation.document_id(),
            stimulation.date_stimulated,
            stimulation.stimulated_formation,
            stimulation.type_treatment,
            stimulation.acid_pct,
            stimulation.lbs_proppant,
            stimulation.top_ft,
            stimulation.bottom_ft,
            stimulation.stimulation_stages,
            stimulation.volume,
            stimulation.volume_units,
            stimulation.max_pressure_psi,
            stimulation.max_treatment_rate_bbls_per_min,
            stimulation.details,
            updated_at,
        ],
    )
    .with_context(|| {
        format!(
            "failed to upsert well_stimulation for {}",
            stimulation.document_id()
        )
    })?;

    tx.commit().context("failed to commit upsert transaction")?;
    Ok(())
}

pub(crate) fn count_rows(connection: &Connection, sql: &str) -> Result<i64> {
    let count = connection.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}
