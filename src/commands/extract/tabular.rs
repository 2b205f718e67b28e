use anyhow::{Context, Result};
use regex::Regex;

use super::cleaners::CleanerPatterns;
use super::locators::first_nonblank_line;
use super::normalize::normalize_punctuation;

pub(crate) const STIMULATION_COLUMNS: usize = 7;

/// Columns of the stimulation summary table, in header order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TabularColumn {
    DateStimulated,
    StimulatedFormation,
    TopFt,
    BottomFt,
    StimulationStages,
    Volume,
    VolumeUnits,
}

impl TabularColumn {
    fn index(self) -> usize {
        match self {
            Self::DateStimulated => 0,
            Self::StimulatedFormation => 1,
            Self::TopFt => 2,
            Self::BottomFt => 3,
            Self::StimulationStages => 4,
            Self::Volume => 5,
            Self::VolumeUnits => 6,
        }
    }
}

/// One data row read from under the stimulation table header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TabularRow {
    columns: Vec<String>,
}

impl TabularRow {
    pub(crate) fn column(&self, column: TabularColumn) -> Option<&str> {
        self.columns
            .get(column.index())
            .map(String::as_str)
            .filter(|cell| !cell.is_empty())
    }
}

#[derive(Debug)]
pub(crate) struct TabularRowExtractor {
    header: Regex,
    primary_split: Regex,
    secondary_split: Regex,
}

impl TabularRowExtractor {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            header: Regex::new(
                r"(?i)Date\s*Stimulated\s+Stimulated\s*Formation\s+Top\s*\(Ft\)\s+Bottom\s*\(Ft\)\s+Stimulation\s*Stages\s+Volume\s+Volume\s*Units",
            )
            .context("failed to compile stimulation table header regex")?,
            primary_split: Regex::new(r"\s{2,}")
                .context("failed to compile primary column split regex")?,
            secondary_split: Regex::new(r"\s*\|\s*|\s{3,}")
                .context("failed to compile secondary column split regex")?,
        })
    }

    /// Finds the header in raw page text and splits the first non-blank line
    /// after it into columns. Whitespace runs are significant here, so only
    /// punctuation is canonicalized before matching.
    pub(crate) fn extract(&self, raw_text: &str, cleaners: &CleanerPatterns) -> Option<TabularRow> {
        let text = normalize_punctuation(raw_text);
        let header = self.header.find(&text)?;
        let data_line = first_nonblank_line(&text[header.end()..])?;

        let mut columns = split_columns(&data_line, &self.primary_split);
        if columns.len() < STIMULATION_COLUMNS {
            columns = split_columns(&data_line, &self.secondary_split);
        }
        if columns.len() < STIMULATION_COLUMNS {
            return None;
        }

        let date_index = TabularColumn::DateStimulated.index();
        if !cleaners.is_date_shaped(&columns[date_index])
            && let Some(token) = cleaners.extract_date_token(&columns[date_index])
        {
            columns[date_index] = token;
        }

        Some(TabularRow { columns })
    }
}

/// Splits a data line into trimmed cells. Empty cells at the edges come from
/// leading or trailing delimiters and are dropped; empty interior cells are
/// blank fields and keep their position.
pub(crate) fn split_columns(line: &str, separator: &Regex) -> Vec<String> {
    let cells = separator
        .split(line.trim())
        .map(str::trim)
        .collect::<Vec<&str>>();
    let first = cells.iter().position(|cell| !cell.is_empty());
    let last = cells.iter().rposition(|cell| !cell.is_empty());

    match (first, last) {
        (Some(first), Some(last)) => cells[first..=last]
            .iter()
            .map(|cell| (*cell).to_owned())
            .collect(),
        _ => Vec::new(),
    }
}
