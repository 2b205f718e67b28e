use std::collections::HashMap;

use anyhow::Result;
use regex::Regex;
use tracing::debug;

use crate::model::{HeaderRecord, StimulationRecord};

use super::cleaners::{CleanerPatterns, FieldValue};
use super::normalize::normalize;
use super::locators::Strategy;
use super::plans::{
    Candidate, FieldPlan, HeaderField, RowPattern, StimulationField, header_plans, label_guard,
    stimulation_plans,
};
use super::tabular::{TabularRow, TabularRowExtractor};

/// Number of leading pages that carry the well header.
const HEADER_PAGE_COUNT: usize = 2;

const ROW_PATTERNS: [RowPattern; 3] = [
    RowPattern::DepthInterval,
    RowPattern::VolumeBlock,
    RowPattern::VolumeWithUnits,
];

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedDocument {
    pub(crate) header: HeaderRecord,
    pub(crate) stimulation: StimulationRecord,
}

/// Field extraction over the page text of one well document. Every pattern
/// is compiled in [`WellDocumentParser::new`]; parsing itself holds no
/// state, so one parser can serve any number of threads.
#[derive(Debug)]
pub(crate) struct WellDocumentParser {
    cleaners: CleanerPatterns,
    tabular: TabularRowExtractor,
    row_patterns: Vec<(RowPattern, Regex)>,
    label_guard: Regex,
    header_plans: Vec<FieldPlan<HeaderField>>,
    stimulation_plans: Vec<FieldPlan<StimulationField>>,
}

/// Text of one page range with everything the candidates look at.
struct SectionText {
    normalized: String,
    tabular: Option<TabularRow>,
    rows: HashMap<RowPattern, Vec<String>>,
}

impl WellDocumentParser {
    pub(crate) fn new() -> Result<Self> {
        let row_patterns = ROW_PATTERNS
            .iter()
            .map(|pattern| Ok((*pattern, pattern.compile()?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            cleaners: CleanerPatterns::new()?,
            tabular: TabularRowExtractor::new()?,
            row_patterns,
            label_guard: label_guard()?,
            header_plans: header_plans()?,
            stimulation_plans: stimulation_plans()?,
        })
    }

    pub(crate) fn parse(&self, document_id: &str, pages: &[String]) -> ParsedDocument {
        let header_section = self.section(&header_text(pages));
        let stimulation_section = self.section(&stimulation_text(pages));

        let mut header = HeaderRecord::new(document_id);
        for plan in &self.header_plans {
            if let Some(value) = self.resolve(plan, &header_section) {
                header.assign(plan.field, value);
            }
        }

        let mut stimulation = StimulationRecord::new(document_id);
        for plan in &self.stimulation_plans {
            if let Some(value) = self.resolve(plan, &stimulation_section) {
                stimulation.assign(plan.field, value);
            }
        }

        ParsedDocument {
            header,
            stimulation,
        }
    }

    fn section(&self, raw: &str) -> SectionText {
        let normalized = normalize(raw);
        let tabular = self.tabular.extract(raw, &self.cleaners);
        let rows = self
            .row_patterns
            .iter()
            .filter_map(|(pattern, regex)| {
                let captures = regex.captures(&normalized)?;
                let groups = captures
                    .iter()
                    .skip(1)
                    .map(|group| {
                        group
                            .map(|m| m.as_str().trim().to_string())
                            .unwrap_or_default()
                    })
                    .collect::<Vec<String>>();
                Some((*pattern, groups))
            })
            .collect();

        SectionText {
            normalized,
            tabular,
            rows,
        }
    }

    fn resolve<F: std::fmt::Debug>(
        &self,
        plan: &FieldPlan<F>,
        section: &SectionText,
    ) -> Option<FieldValue> {
        for candidate in &plan.candidates {
            for raw in self.candidate_values(candidate, section) {
                if let Some(value) = self.cleaners.apply(plan.cleaner, &raw) {
                    debug!(field = ?plan.field, source = candidate.describe(), "field resolved");
                    return Some(value);
                }
            }
        }

        None
    }

    fn candidate_values(&self, candidate: &Candidate, section: &SectionText) -> Vec<String> {
        match candidate {
            Candidate::Tabular(column) => section
                .tabular
                .as_ref()
                .and_then(|row| row.column(*column))
                .map(ToOwned::to_owned)
                .into_iter()
                .collect(),
            Candidate::RowGroup { pattern, group } => section
                .rows
                .get(pattern)
                .and_then(|groups| groups.get(*group))
                .cloned()
                .into_iter()
                .collect(),
            Candidate::Locator(locator) => {
                let mut values = locator.values(&section.normalized);
                // Line-based captures run into neighbouring labels on
                // multi-label lines.
                if matches!(locator.strategy(), Strategy::Inline | Strategy::NextLine) {
                    values.retain(|value| !self.label_guard.is_match(value));
                }
                values
            }
            Candidate::Pattern(regex) => regex
                .captures(&section.normalized)
                .and_then(|captures| captures.get(1))
                .map(|m| m.as_str().trim().to_string())
                .into_iter()
                .collect(),
        }
    }
}

fn header_text(pages: &[String]) -> String {
    pages
        .iter()
        .take(HEADER_PAGE_COUNT)
        .map(String::as_str)
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Pages after the header pages, or the whole document when there are no
/// later pages with text.
fn stimulation_text(pages: &[String]) -> String {
    let later = pages
        .iter()
        .skip(HEADER_PAGE_COUNT)
        .map(String::as_str)
        .collect::<Vec<&str>>()
        .join("\n");
    if later.trim().is_empty() {
        pages.join("\n")
    } else {
        later
    }
}

fn fill<T>(slot: &mut Option<T>, value: T) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

impl HeaderRecord {
    fn assign(&mut self, field: HeaderField, value: FieldValue) {
        match (field, value) {
            (HeaderField::Latitude, FieldValue::Degrees(degrees)) => {
                fill(&mut self.latitude, degrees)
            }
            (HeaderField::Longitude, FieldValue::Degrees(degrees)) => {
                fill(&mut self.longitude, degrees)
            }
            (field, FieldValue::Text(text)) => {
                let slot = match field {
                    HeaderField::Operator => &mut self.operator,
                    HeaderField::WellName => &mut self.well_name,
                    HeaderField::ApiNumber => &mut self.api_number,
                    HeaderField::EnsecoJob => &mut self.enseco_job,
                    HeaderField::JobType => &mut self.job_type,
                    HeaderField::CountyState => &mut self.county_state,
                    HeaderField::SurfaceHoleLocation => &mut self.surface_hole_location,
                    HeaderField::Datum => &mut self.datum,
                    HeaderField::Latitude | HeaderField::Longitude => {
                        debug!(?field, "text value ignored for coordinate field");
                        return;
                    }
                };
                fill(slot, text);
            }
            (field, FieldValue::Degrees(_)) => {
                debug!(?field, "coordinate value ignored for text field");
            }
        }
    }
}

impl StimulationRecord {
    fn assign(&mut self, field: StimulationField, value: FieldValue) {
        let FieldValue::Text(text) = value else {
            debug!(?field, "coordinate value ignored for stimulation field");
            return;
        };

        let slot = match field {
            StimulationField::DateStimulated => &mut self.date_stimulated,
            StimulationField::StimulatedFormation => &mut self.stimulated_formation,
            StimulationField::TypeTreatment => &mut self.type_treatment,
            StimulationField::AcidPct => &mut self.acid_pct,
            StimulationField::LbsProppant => &mut self.lbs_proppant,
            StimulationField::TopFt => &mut self.top_ft,
            StimulationField::BottomFt => &mut self.bottom_ft,
            StimulationField::StimulationStages => &mut self.stimulation_stages,
            StimulationField::Volume => &mut self.volume,
            StimulationField::VolumeUnits => &mut self.volume_units,
            StimulationField::MaxPressurePsi => &mut self.max_pressure_psi,
            StimulationField::MaxTreatmentRate => &mut self.max_treatment_rate_bbls_per_min,
            StimulationField::Details => &mut self.details,
        };
        fill(slot, text);
    }
}
