use anyhow::{Context, Result};
use regex::Regex;

use super::cleaners::Cleaner;
use super::locators::{LabelLocator, Strategy};
use super::tabular::TabularColumn;

const LATITUDE_LIMIT: f64 = 90.0;
const LONGITUDE_LIMIT: f64 = 180.0;

const OPERATOR: &str = r"\b(?:Well\s+)?Operator";
const WELL_NAME: &str = r"\bWell\s*(?:or\s*Facility\s*)?Name";
const JOB_TYPE: &str = r"\bJob\s*Type";
const COUNTY_STATE: &str = r"\bCounty\s*,\s*State";
const LATITUDE: &str = r"\bLatitude";
const LONGITUDE: &str = r"\bLongitude";
const DATUM: &str = r"\bDatum";

const DATE_STIMULATED: &str = r"Date\s*Stimulated";
const FORMATION: &str = r"Stimulated\s*Formation";
const TYPE_TREATMENT: &str = r"Type\s*Treatment";
const ACID_PCT: &str = r"Acid\s*%";
const LBS_PROPPANT: &str = r"Lbs\s*Proppant";
const TOP_FT: &str = r"Top\s*\(Ft\)";
const BOTTOM_FT: &str = r"Bottom\s*\(Ft\)";
const STAGES: &str = r"Stimulation\s*Stages";
const VOLUME: &str = r"\bVolume\b";
const VOLUME_UNITS: &str = r"Volume\s*Units";
const MAX_PRESSURE: &str = r"Maximum\s*Treatment\s*Pressure\s*\(PSI\)";
const MAX_RATE: &str = r"Maximum\s*Treatment\s*Rate\s*\(BBLS/?Min\)";
const DETAILS: &str = r"\bDetails\b";

/// Labels of every extracted field. A located value that begins with one of
/// these belongs to a neighbouring field.
const FIELD_LABELS: [&str; 25] = [
    OPERATOR,
    WELL_NAME,
    r"\bAPI\b",
    r"\bEnseco\s*Job",
    JOB_TYPE,
    COUNTY_STATE,
    r"Well\s*Surface\s*Hole\s*Location",
    LATITUDE,
    LONGITUDE,
    DATUM,
    DATE_STIMULATED,
    FORMATION,
    TYPE_TREATMENT,
    ACID_PCT,
    LBS_PROPPANT,
    TOP_FT,
    BOTTOM_FT,
    STAGES,
    VOLUME,
    VOLUME_UNITS,
    MAX_PRESSURE,
    MAX_RATE,
    DETAILS,
    r"Responsible\s+Party",
    r"\bWell\s*File\s*No",
];

/// Matches text that starts with a field label.
pub(crate) fn label_guard() -> Result<Regex> {
    let source = format!(r"(?i)^(?:{})", FIELD_LABELS.join("|"));
    Regex::new(&source).context("failed to compile field label guard")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderField {
    Operator,
    WellName,
    ApiNumber,
    EnsecoJob,
    JobType,
    CountyState,
    SurfaceHoleLocation,
    Latitude,
    Longitude,
    Datum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StimulationField {
    DateStimulated,
    StimulatedFormation,
    TypeTreatment,
    AcidPct,
    LbsProppant,
    TopFt,
    BottomFt,
    StimulationStages,
    Volume,
    VolumeUnits,
    MaxPressurePsi,
    MaxTreatmentRate,
    Details,
}

/// Multi-capture patterns whose groups feed several fields from one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum RowPattern {
    /// `Top (Ft) Bottom (Ft) Stimulation Stages` followed by three numbers.
    DepthInterval,
    /// `Volume` / value / `Volume Units` / unit, one per line.
    VolumeBlock,
    /// `Volume Units` followed by `<value> <unit>` on the next line.
    VolumeWithUnits,
}

impl RowPattern {
    pub(crate) fn compile(self) -> Result<Regex> {
        let source = match self {
            Self::DepthInterval => {
                r"(?i)Top\s*\(Ft\)\s*Bottom\s*\(Ft\)\s*Stimulation\s*Stages\s*\n\s*([0-9,]+)\s+([0-9,]+)\s+([0-9,]+)"
            }
            Self::VolumeBlock => {
                r"(?im)\bVolume\s*\n\s*([0-9][0-9,.]*)\s*$\s*^Volume\s*Units\s*\n\s*([A-Za-z/]+)\s*$"
            }
            Self::VolumeWithUnits => {
                r"(?i)Volume\s*Units\s*\n\s*([0-9][0-9,.]*)[ \t]*([A-Za-z][A-Za-z/]*)"
            }
        };
        Regex::new(source).with_context(|| format!("failed to compile {self:?} row pattern"))
    }
}

/// One way of producing a raw value for a field.
#[derive(Debug)]
pub(crate) enum Candidate {
    Tabular(TabularColumn),
    RowGroup { pattern: RowPattern, group: usize },
    Locator(LabelLocator),
    Pattern(Regex),
}

impl Candidate {
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::Tabular(_) => "tabular",
            Self::RowGroup { .. } => "row_pattern",
            Self::Locator(locator) => match locator.strategy() {
                Strategy::Inline => "inline",
                Strategy::NextLine => "next_line",
                Strategy::SameOrNextNumeric => "same_or_next_numeric",
                Strategy::Block => "block",
            },
            Self::Pattern(_) => "pattern",
        }
    }
}

/// Ordered candidates for one field; the first candidate whose cleaned
/// value is non-empty wins.
#[derive(Debug)]
pub(crate) struct FieldPlan<F> {
    pub(crate) field: F,
    pub(crate) cleaner: Cleaner,
    pub(crate) candidates: Vec<Candidate>,
}

impl<F> FieldPlan<F> {
    fn new(field: F, cleaner: Cleaner, candidates: Vec<Candidate>) -> Self {
        Self {
            field,
            cleaner,
            candidates,
        }
    }
}

fn inline(label: &str) -> Result<Candidate> {
    Ok(Candidate::Locator(LabelLocator::new(Strategy::Inline, label)?))
}

fn next_line(label: &str) -> Result<Candidate> {
    Ok(Candidate::Locator(LabelLocator::new(Strategy::NextLine, label)?))
}

fn same_or_next_numeric(label: &str) -> Result<Candidate> {
    Ok(Candidate::Locator(LabelLocator::new(
        Strategy::SameOrNextNumeric,
        label,
    )?))
}

fn block(label: &str) -> Result<Candidate> {
    Ok(Candidate::Locator(LabelLocator::new(Strategy::Block, label)?))
}

fn pattern(source: &str) -> Result<Candidate> {
    let regex =
        Regex::new(source).with_context(|| format!("failed to compile field pattern {source}"))?;
    Ok(Candidate::Pattern(regex))
}

fn row_group(pattern: RowPattern, group: usize) -> Candidate {
    Candidate::RowGroup { pattern, group }
}

pub(crate) fn header_plans() -> Result<Vec<FieldPlan<HeaderField>>> {
    use HeaderField::*;

    Ok(vec![
        FieldPlan::new(
            Operator,
            Cleaner::Text,
            vec![
                pattern(
                    r"(?i)(?:\bWell\s+Operator|\bOperator|Responsible\s+Party)[ \t]*[:\-][ \t]*([^\n]+)",
                )?,
                next_line(OPERATOR)?,
            ],
        ),
        FieldPlan::new(
            WellName,
            Cleaner::Text,
            vec![
                pattern(r"(?i)\bWell\s*(?:or\s*Facility\s*)?Name[ \t]*[:\-][ \t]*([^\n]+)")?,
                next_line(WELL_NAME)?,
            ],
        ),
        FieldPlan::new(
            ApiNumber,
            Cleaner::ApiNumber,
            vec![
                pattern(
                    r"(?i)\bAPI\s*(?:#|No\.?)?\s*[:\-]?\s*(\d{2}\s*-\s*\d{3}\s*-\s*\d{5}|[0-9]{5,})",
                )?,
                pattern(r"(?i)\bWell\s*File\s*No\.?\s*[:\-]?\s*([0-9]{5,})")?,
            ],
        ),
        FieldPlan::new(
            EnsecoJob,
            Cleaner::Text,
            vec![pattern(
                r"(?i)\bEnseco\s*Job\s*#?\s*[:#]?\s*([A-Z]?\d[\w\-]*)",
            )?],
        ),
        FieldPlan::new(
            JobType,
            Cleaner::Text,
            vec![
                pattern(r"(?i)\bJob\s*Type[ \t]*[:\-][ \t]*([^\n]+)")?,
                next_line(JOB_TYPE)?,
            ],
        ),
        FieldPlan::new(
            CountyState,
            Cleaner::Text,
            vec![
                pattern(r"(?i)\bCounty\s*,\s*State[ \t]*[:\-][ \t]*([^\n]+)")?,
                next_line(COUNTY_STATE)?,
            ],
        ),
        FieldPlan::new(
            SurfaceHoleLocation,
            Cleaner::Text,
            vec![pattern(
                r"(?i)Well\s*Surface\s*Hole\s*Location\s*\(SHL\)[ \t]*[:\-][ \t]*([^\n]+)",
            )?],
        ),
        FieldPlan::new(
            Latitude,
            Cleaner::Coordinate {
                limit: LATITUDE_LIMIT,
            },
            vec![
                pattern(r"(?i)\bLatitude[ \t]*(?::|-[ \t])?[ \t]*([^\n]+)")?,
                next_line(LATITUDE)?,
            ],
        ),
        FieldPlan::new(
            Longitude,
            Cleaner::Coordinate {
                limit: LONGITUDE_LIMIT,
            },
            vec![
                pattern(r"(?i)\bLongitude[ \t]*(?::|-[ \t])?[ \t]*([^\n]+)")?,
                next_line(LONGITUDE)?,
            ],
        ),
        FieldPlan::new(
            Datum,
            Cleaner::Text,
            vec![
                pattern(r"(?i)\bDatum[ \t]*[:\-][ \t]*([^\n]+)")?,
                next_line(DATUM)?,
            ],
        ),
    ])
}

pub(crate) fn stimulation_plans() -> Result<Vec<FieldPlan<StimulationField>>> {
    use StimulationField::*;

    Ok(vec![
        FieldPlan::new(
            DateStimulated,
            Cleaner::Date,
            vec![
                Candidate::Tabular(TabularColumn::DateStimulated),
                inline(DATE_STIMULATED)?,
                next_line(DATE_STIMULATED)?,
                pattern(r"(?i)Date\s*Stimulated\s*\n\s*([0-9]{1,2}/[0-9]{1,2}/[0-9]{4})")?,
            ],
        ),
        FieldPlan::new(
            StimulatedFormation,
            Cleaner::Text,
            vec![
                Candidate::Tabular(TabularColumn::StimulatedFormation),
                inline(FORMATION)?,
                next_line(FORMATION)?,
                pattern(r"(?i)Stimulated\s*Formation\s*\n\s*([^\n]+)")?,
            ],
        ),
        FieldPlan::new(
            TypeTreatment,
            Cleaner::Text,
            vec![
                inline(TYPE_TREATMENT)?,
                next_line(TYPE_TREATMENT)?,
                pattern(r"(?i)Type\s*Treatment\s*\n\s*([^\n]+)")?,
            ],
        ),
        FieldPlan::new(
            AcidPct,
            Cleaner::Numeric,
            vec![
                inline(ACID_PCT)?,
                next_line(ACID_PCT)?,
                pattern(r"(?i)Acid\s*%[\s\S]*?\n\s*([0-9.]+)")?,
            ],
        ),
        FieldPlan::new(
            LbsProppant,
            Cleaner::Numeric,
            vec![
                inline(LBS_PROPPANT)?,
                next_line(LBS_PROPPANT)?,
                pattern(r"(?i)Lbs\s*Proppant\s*\n\s*([0-9,]+)")?,
            ],
        ),
        FieldPlan::new(
            TopFt,
            Cleaner::Numeric,
            vec![
                Candidate::Tabular(TabularColumn::TopFt),
                row_group(RowPattern::DepthInterval, 0),
                inline(TOP_FT)?,
                next_line(TOP_FT)?,
            ],
        ),
        FieldPlan::new(
            BottomFt,
            Cleaner::Numeric,
            vec![
                Candidate::Tabular(TabularColumn::BottomFt),
                row_group(RowPattern::DepthInterval, 1),
                inline(BOTTOM_FT)?,
                next_line(BOTTOM_FT)?,
            ],
        ),
        FieldPlan::new(
            StimulationStages,
            Cleaner::Numeric,
            vec![
                Candidate::Tabular(TabularColumn::StimulationStages),
                row_group(RowPattern::DepthInterval, 2),
                inline(STAGES)?,
                next_line(STAGES)?,
            ],
        ),
        FieldPlan::new(
            Volume,
            Cleaner::Numeric,
            vec![
                Candidate::Tabular(TabularColumn::Volume),
                inline(VOLUME)?,
                next_line(VOLUME)?,
                row_group(RowPattern::VolumeBlock, 0),
                row_group(RowPattern::VolumeWithUnits, 0),
            ],
        ),
        FieldPlan::new(
            VolumeUnits,
            Cleaner::Unit,
            vec![
                Candidate::Tabular(TabularColumn::VolumeUnits),
                inline(VOLUME_UNITS)?,
                next_line(VOLUME_UNITS)?,
                row_group(RowPattern::VolumeBlock, 1),
                row_group(RowPattern::VolumeWithUnits, 1),
            ],
        ),
        FieldPlan::new(
            MaxPressurePsi,
            Cleaner::Numeric,
            vec![
                inline(MAX_PRESSURE)?,
                next_line(MAX_PRESSURE)?,
                same_or_next_numeric(MAX_PRESSURE)?,
                pattern(r"(?i)Maximum\s*Treatment\s*Pressure\s*\(PSI\)\s*\n\s*([0-9,]+)")?,
            ],
        ),
        FieldPlan::new(
            MaxTreatmentRate,
            Cleaner::Numeric,
            vec![
                inline(MAX_RATE)?,
                next_line(MAX_RATE)?,
                same_or_next_numeric(MAX_RATE)?,
                pattern(
                    r"(?i)Maximum\s*Treatment\s*Rate\s*\(BBLS/?Min\)\s*\n\s*([0-9]+(?:\.[0-9]+)?)",
                )?,
            ],
        ),
        FieldPlan::new(
            Details,
            Cleaner::Details,
            vec![block(DETAILS)?, next_line(DETAILS)?],
        ),
    ])
}
