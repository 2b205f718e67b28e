use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use regex::Regex;
use rusqlite::Connection;

use super::cleaners::{CleanerPatterns, clean_numeric, clean_unit_token};
use super::locators::{LabelLocator, Strategy};
use super::normalize::normalize;
use super::page_text::{PageTextProvider, ProviderChain, remove_scratch_dir};
use super::parser::WellDocumentParser;
use super::persist::{
    HEADER_CSV_COLUMNS, RecordWriter, STIMULATION_CSV_COLUMNS, count_rows, ensure_schema,
    upsert_document,
};
use super::tabular::{TabularColumn, TabularRowExtractor, split_columns};
use crate::model::{HeaderRecord, StimulationRecord};

fn pages(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn parser() -> WellDocumentParser {
    WellDocumentParser::new().expect("patterns should compile")
}

fn cleaners() -> CleanerPatterns {
    CleanerPatterns::new().expect("cleaner patterns should compile")
}

fn locate(strategy: Strategy, label: &str, text: &str) -> Option<String> {
    LabelLocator::new(strategy, label)
        .expect("locator should compile")
        .values(&normalize(text))
        .into_iter()
        .next()
}

const STIMULATION_TABLE: &str = "Date Stimulated  Stimulated Formation  Top (Ft)  Bottom (Ft)  Stimulation Stages  Volume  Volume Units\n\
5/1/2020  Wolfcamp A  9000  9500  4  12,000  Barrels\n";

#[test]
fn normalize_is_idempotent() {
    let samples = [
        "",
        "plain text with no special punctuation",
        "  Latitude:\t\t48º 3’ 36” N  ",
        "Top (Ft)  Bottom (Ft)\r\n9000\u{00A0}\u{00A0}9500 — 4",
        "\n\n  leading blank lines\n\n\ntrailing  \n",
        "Operator： Acme · Co\n\t\n–",
    ];

    for sample in samples {
        let once = normalize(sample);
        assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
    }
}

#[test]
fn normalize_canonicalizes_punctuation_and_spacing() {
    assert_eq!(normalize("32º 15’ 30” N"), "32° 15' 30\" N");
    assert_eq!(normalize("A  \t B"), "A B");
    assert_eq!(normalize("9000 – 9500"), "9000 - 9500");
    assert_eq!(normalize("Job Type：  Frac  \r\nNext"), "Job Type: Frac\nNext");
    assert_eq!(normalize(""), "");
}

#[test]
fn dms_to_decimal_handles_plain_and_dms_forms() {
    let cleaners = cleaners();

    let west = cleaners.dms_to_decimal("103.73 W").expect("plain west");
    assert!((west + 103.73).abs() < 1e-9);

    let north = cleaners
        .dms_to_decimal("32° 15' 30\" N")
        .expect("dms north");
    assert!((north - 32.2583).abs() < 1e-3);

    assert_eq!(cleaners.dms_to_decimal("45.0"), Some(45.0));
    assert_eq!(cleaners.dms_to_decimal("S 32.5"), Some(-32.5));
    assert_eq!(cleaners.dms_to_decimal("not a coordinate"), None);
    assert_eq!(cleaners.dms_to_decimal(""), None);
}

#[test]
fn dms_to_decimal_prefers_leading_hemisphere() {
    let value = cleaners()
        .dms_to_decimal("N 32° 15' 30\" W")
        .expect("conflicting hemispheres still parse");
    assert!(value > 0.0);

    let value = cleaners()
        .dms_to_decimal("W 103.5 N")
        .expect("plain form with two letters");
    assert_eq!(value, -103.5);
}

#[test]
fn normalize_api_formats_ten_digit_runs() {
    let cleaners = cleaners();
    assert_eq!(
        cleaners.normalize_api("3305306057").as_deref(),
        Some("33-053-06057")
    );
    assert_eq!(
        cleaners.normalize_api("33-053-06057").as_deref(),
        Some("33-053-06057")
    );
    assert_eq!(
        cleaners.normalize_api("33 053 06057").as_deref(),
        Some("33-053-06057")
    );
    assert_eq!(cleaners.normalize_api("abc").as_deref(), Some("abc"));
    assert_eq!(cleaners.normalize_api("  "), None);
}

#[test]
fn clean_numeric_keeps_digits_and_dots() {
    assert_eq!(clean_numeric("9,679").as_deref(), Some("9679"));
    assert_eq!(clean_numeric("45.5 bpm").as_deref(), Some("45.5"));
    assert_eq!(clean_numeric("1.2.3").as_deref(), Some("1.2.3"));
    assert_eq!(clean_numeric("N/A"), None);
    assert_eq!(clean_numeric(""), None);
}

#[test]
fn clean_unit_token_keeps_letters_and_slash() {
    assert_eq!(clean_unit_token(" Barrels ").as_deref(), Some("Barrels"));
    assert_eq!(clean_unit_token("bbl/min.").as_deref(), Some("bbl/min"));
    assert_eq!(clean_unit_token("12,000"), None);
}

#[test]
fn inline_locator_reads_rest_of_label_line() {
    assert_eq!(
        locate(
            Strategy::Inline,
            r"Maximum\s*Treatment\s*Pressure\s*\(PSI\)",
            "Maximum Treatment Pressure (PSI): 9,679\nnext"
        )
        .as_deref(),
        Some("9,679")
    );
    assert_eq!(
        locate(Strategy::Inline, r"Stimulation\s*Stages", "Stimulation Stages\n4"),
        None
    );
}

#[test]
fn next_line_locator_skips_blank_lines() {
    assert_eq!(
        locate(
            Strategy::NextLine,
            r"Volume\s*Units",
            "Volume Units\n\n   Barrels\nLbs Proppant"
        )
        .as_deref(),
        Some("Barrels")
    );
    assert_eq!(
        locate(Strategy::NextLine, r"Volume\s*Units", "Volume Units Barrels"),
        None
    );
}

#[test]
fn same_or_next_numeric_tries_each_label_occurrence() {
    let text = "Max Pressure (PSI)\nsee attached\nremarks\nMax Pressure (PSI) 8,000 at stage 3";
    assert_eq!(
        locate(Strategy::SameOrNextNumeric, r"Max\s*Pressure", text).as_deref(),
        Some("8,000")
    );

    let text = "Maximum Treatment Pressure (PSI) Maximum Treatment Rate (BBLS/Min)\n9,679 45.5";
    assert_eq!(
        locate(
            Strategy::SameOrNextNumeric,
            r"Maximum\s*Treatment\s*Pressure\s*\(PSI\)",
            text
        )
        .as_deref(),
        Some("9,679")
    );
}

#[test]
fn block_locator_stops_at_blank_line_or_rule() {
    assert_eq!(
        locate(
            Strategy::Block,
            r"\bDetails\b",
            "Details:\nPumped 40 stages\nflowback scheduled\n\nCertification"
        )
        .as_deref(),
        Some("Pumped 40 stages\nflowback scheduled")
    );
    assert_eq!(
        locate(Strategy::Block, r"\bDetails\b", "Details\nSand screen-out\n-----\nSigned").as_deref(),
        Some("Sand screen-out")
    );
    assert_eq!(locate(Strategy::Block, r"\bDetails\b", "No notes here"), None);
}

#[test]
fn tabular_row_splits_on_two_space_runs() {
    let row = TabularRowExtractor::new()
        .expect("tabular patterns compile")
        .extract(STIMULATION_TABLE, &cleaners())
        .expect("row should parse");

    assert_eq!(row.column(TabularColumn::DateStimulated), Some("5/1/2020"));
    assert_eq!(row.column(TabularColumn::StimulatedFormation), Some("Wolfcamp A"));
    assert_eq!(row.column(TabularColumn::TopFt), Some("9000"));
    assert_eq!(row.column(TabularColumn::Volume), Some("12,000"));
    assert_eq!(row.column(TabularColumn::VolumeUnits), Some("Barrels"));
}

#[test]
fn tabular_row_falls_back_to_pipe_delimiters() {
    let text = "Date Stimulated Stimulated Formation Top (Ft) Bottom (Ft) Stimulation Stages Volume Volume Units\n\
| 5/1/2020 | Wolfcamp A | 9000 | 9500 | 4 | 12000 | BBL |\n";
    let row = TabularRowExtractor::new()
        .expect("tabular patterns compile")
        .extract(text, &cleaners())
        .expect("pipe row should parse");

    assert_eq!(row.column(TabularColumn::StimulatedFormation), Some("Wolfcamp A"));
    assert_eq!(row.column(TabularColumn::StimulationStages), Some("4"));
    assert_eq!(row.column(TabularColumn::VolumeUnits), Some("BBL"));
}

#[test]
fn tabular_row_rejects_single_space_rows() {
    let text = "Date Stimulated Stimulated Formation Top (Ft) Bottom (Ft) Stimulation Stages Volume Volume Units\n\
5/1/2020 Wolfcamp 9000 9500 4 12000 BBL\n";
    let row = TabularRowExtractor::new()
        .expect("tabular patterns compile")
        .extract(text, &cleaners());
    assert!(row.is_none());
}

#[test]
fn tabular_row_rescans_date_column() {
    let text = "Date Stimulated  Stimulated Formation  Top (Ft)  Bottom (Ft)  Stimulation Stages  Volume  Volume Units\n\
on 5/1/2020  Wolfcamp  9000  9500  4  12000  BBL\n";
    let row = TabularRowExtractor::new()
        .expect("tabular patterns compile")
        .extract(text, &cleaners())
        .expect("row should parse");
    assert_eq!(row.column(TabularColumn::DateStimulated), Some("5/1/2020"));
}

#[test]
fn column_split_thresholds_are_pinned() {
    let primary = Regex::new(r"\s{2,}").expect("regex");
    let secondary = Regex::new(r"\s*\|\s*|\s{3,}").expect("regex");

    assert_eq!(split_columns("a  b c", &primary), vec!["a", "b c"]);
    assert_eq!(split_columns("a b c", &primary), vec!["a b c"]);
    assert_eq!(split_columns("a   b  c", &secondary), vec!["a", "b  c"]);
    assert_eq!(split_columns("a|b | c", &secondary), vec!["a", "b", "c"]);
    assert_eq!(split_columns("| a | b |", &secondary), vec!["a", "b"]);
    assert_eq!(split_columns("a | | c", &secondary), vec!["a", "", "c"]);
}

#[test]
fn tabular_row_keeps_blank_pipe_cells_in_place() {
    let text = "Date Stimulated Stimulated Formation Top (Ft) Bottom (Ft) Stimulation Stages Volume Volume Units\n\
5/1/2020 | | 9000 | 9500 | 4 | 12000 | BBL\n";
    let row = TabularRowExtractor::new()
        .expect("tabular patterns compile")
        .extract(text, &cleaners())
        .expect("pipe row with a blank cell should parse");

    assert_eq!(row.column(TabularColumn::DateStimulated), Some("5/1/2020"));
    assert_eq!(row.column(TabularColumn::StimulatedFormation), None);
    assert_eq!(row.column(TabularColumn::TopFt), Some("9000"));
    assert_eq!(row.column(TabularColumn::VolumeUnits), Some("BBL"));
}

#[test]
fn tabular_row_wins_over_labeled_line() {
    let mut text = STIMULATION_TABLE.to_string();
    text.push_str("\nTop (Ft): 1234\nBottom (Ft): 5678\n");

    let document = parser().parse("W-1.pdf", &pages(&["", "", &text]));
    assert_eq!(document.stimulation.top_ft.as_deref(), Some("9000"));
    assert_eq!(document.stimulation.bottom_ft.as_deref(), Some("9500"));
    assert_eq!(document.stimulation.stimulation_stages.as_deref(), Some("4"));
    assert_eq!(document.stimulation.volume.as_deref(), Some("12000"));
    assert_eq!(document.stimulation.volume_units.as_deref(), Some("Barrels"));
    assert_eq!(
        document.stimulation.date_stimulated.as_deref(),
        Some("5/1/2020")
    );
    assert_eq!(
        document.stimulation.stimulated_formation.as_deref(),
        Some("Wolfcamp A")
    );
}

#[test]
fn parse_end_to_end_two_page_document() {
    let input = pages(&[
        "Well Operator: Acme Oil\nWell Name: Smith #1\nAPI: 33-053-06057\n",
        "Date Stimulated\n5/1/2020\nStimulated Formation\nWolfcamp\nTop (Ft) Bottom (Ft) Stimulation Stages\n9000 9500 4\nMaximum Treatment Pressure (PSI)\n9,679\n",
    ]);

    let document = parser().parse("smith-1.pdf", &input);

    let header = &document.header;
    assert_eq!(header.document_id(), "smith-1.pdf");
    assert_eq!(header.operator.as_deref(), Some("Acme Oil"));
    assert_eq!(header.well_name.as_deref(), Some("Smith #1"));
    assert_eq!(header.api_number.as_deref(), Some("33-053-06057"));

    let stimulation = &document.stimulation;
    assert_eq!(stimulation.document_id(), "smith-1.pdf");
    assert_eq!(stimulation.date_stimulated.as_deref(), Some("5/1/2020"));
    assert_eq!(stimulation.stimulated_formation.as_deref(), Some("Wolfcamp"));
    assert_eq!(stimulation.top_ft.as_deref(), Some("9000"));
    assert_eq!(stimulation.bottom_ft.as_deref(), Some("9500"));
    assert_eq!(stimulation.stimulation_stages.as_deref(), Some("4"));
    assert_eq!(stimulation.max_pressure_psi.as_deref(), Some("9679"));
}

#[test]
fn parse_blank_pages_yields_identifier_only() {
    let parser = parser();

    let document = parser.parse("empty.pdf", &pages(&["", ""]));
    assert_eq!(document.header, HeaderRecord::new("empty.pdf"));
    assert_eq!(document.stimulation, StimulationRecord::new("empty.pdf"));

    let document = parser.parse("none.pdf", &[]);
    assert_eq!(document.header, HeaderRecord::new("none.pdf"));
    assert_eq!(document.stimulation, StimulationRecord::new("none.pdf"));
}

#[test]
fn parse_header_coordinates_and_datum() {
    let input = pages(&[
        "Latitude: 48° 3' 36\" N\nLongitude: 103º 22’ 12” W\nDatum: NAD83\nCounty, State: McKenzie County, ND\nEnseco Job#: S21-0042",
    ]);
    let header = parser().parse("coords.pdf", &input).header;

    let latitude = header.latitude.expect("latitude");
    let longitude = header.longitude.expect("longitude");
    assert!((latitude - 48.06).abs() < 1e-6);
    assert!((longitude + 103.37).abs() < 1e-6);
    assert_eq!(header.datum.as_deref(), Some("NAD83"));
    assert_eq!(header.county_state.as_deref(), Some("McKenzie County, ND"));
    assert_eq!(header.enseco_job.as_deref(), Some("S21-0042"));
}

#[test]
fn parse_rejects_out_of_range_coordinates() {
    let header = parser()
        .parse("bad.pdf", &pages(&["Latitude: 123.5\nLongitude: -181"]))
        .header;
    assert_eq!(header.latitude, None);
    assert_eq!(header.longitude, None);
}

#[test]
fn parse_restricts_sections_by_page() {
    let input = pages(&[
        "Top (Ft) Bottom (Ft) Stimulation Stages\n1 2 3",
        "",
        "Well Operator: Late Filing Co\nTop (Ft) Bottom (Ft) Stimulation Stages\n9000 9500 4",
    ]);
    let document = parser().parse("pages.pdf", &input);

    assert_eq!(document.header.operator, None);
    assert_eq!(document.stimulation.top_ft.as_deref(), Some("9000"));
    assert_eq!(document.stimulation.stimulation_stages.as_deref(), Some("4"));
}

#[test]
fn parse_volume_from_line_blocks() {
    let document = parser().parse(
        "volume.pdf",
        &pages(&["Volume\n12,000\nVolume Units\nBarrels"]),
    );
    assert_eq!(document.stimulation.volume.as_deref(), Some("12000"));
    assert_eq!(document.stimulation.volume_units.as_deref(), Some("Barrels"));

    let document = parser().parse("units.pdf", &pages(&["Volume Units\n5000 BBL"]));
    assert_eq!(document.stimulation.volume.as_deref(), Some("5000"));
    assert_eq!(document.stimulation.volume_units.as_deref(), Some("BBL"));
}

#[test]
fn parse_pressure_and_rate_from_shared_label_line() {
    let document = parser().parse(
        "rate.pdf",
        &pages(&["Maximum Treatment Pressure (PSI) Maximum Treatment Rate (BBLS/Min)\n9,679 45.5"]),
    );
    assert_eq!(document.stimulation.max_pressure_psi.as_deref(), Some("9679"));
    assert_eq!(
        document.stimulation.max_treatment_rate_bbls_per_min.as_deref(),
        Some("45.5")
    );
}

#[test]
fn parse_numeric_fields_keep_first_number_only() {
    let document = parser().parse(
        "units.pdf",
        &pages(&[
            "Top (Ft): 9000 ft (2743 m)\nLbs Proppant: 3,450,000 lbs 20/40 sand\nVolume: 5,000 bbls; 2 tanks",
        ]),
    );
    let stimulation = document.stimulation;
    assert_eq!(stimulation.top_ft.as_deref(), Some("9000"));
    assert_eq!(stimulation.lbs_proppant.as_deref(), Some("3450000"));
    assert_eq!(stimulation.volume.as_deref(), Some("5000"));
}

#[test]
fn first_number_drops_units_and_later_numbers() {
    let cleaners = cleaners();
    assert_eq!(cleaners.first_number("9,679 45.5").as_deref(), Some("9679"));
    assert_eq!(cleaners.first_number("45.5 bpm").as_deref(), Some("45.5"));
    assert_eq!(cleaners.first_number("approx. 12,000 bbl").as_deref(), Some("12000"));
    assert_eq!(cleaners.first_number("Maximum Treatment Rate (BBLS/Min)"), None);
}

#[test]
fn parse_single_space_table_does_not_leak_labels() {
    let document = parser().parse(
        "flat.pdf",
        &pages(&[
            "Date Stimulated Stimulated Formation Top (Ft) Bottom (Ft) Stimulation Stages Volume Volume Units\n5/1/2020 Wolfcamp 9000 9500 4 12000 BBL",
        ]),
    );
    let stimulation = document.stimulation;
    assert_eq!(stimulation.date_stimulated, None);
    assert_eq!(stimulation.stimulated_formation, None);
    assert_eq!(stimulation.top_ft, None);
    assert_eq!(stimulation.bottom_ft, None);
    assert_eq!(stimulation.stimulation_stages, None);
    assert_eq!(stimulation.volume, None);
    assert_eq!(stimulation.volume_units.as_deref(), Some("BBL"));
}

#[test]
fn parse_volume_skips_units_label_occurrence() {
    let document = parser().parse("volume.pdf", &pages(&["Volume Units: Barrels\nVolume: 5000"]));
    assert_eq!(document.stimulation.volume.as_deref(), Some("5000"));
    assert_eq!(document.stimulation.volume_units.as_deref(), Some("Barrels"));
}

#[test]
fn parse_signed_coordinates_keep_their_sign() {
    let parser = parser();

    let header = parser
        .parse("signed.pdf", &pages(&["Latitude -32.5\nLongitude -103.73"]))
        .header;
    assert_eq!(header.latitude, Some(-32.5));
    assert_eq!(header.longitude, Some(-103.73));

    let header = parser
        .parse("dashed.pdf", &pages(&["Longitude - 103.73 W"]))
        .header;
    assert_eq!(header.longitude, Some(-103.73));
}

#[test]
fn parse_empty_header_value_does_not_take_next_line_label() {
    let parser = parser();

    let header = parser
        .parse("blank.pdf", &pages(&["Operator:\nWell Name: Smith #1"]))
        .header;
    assert_eq!(header.operator, None);
    assert_eq!(header.well_name.as_deref(), Some("Smith #1"));

    let header = parser
        .parse("stacked.pdf", &pages(&["Operator:\n\nAcme Oil\nDatum:\nNAD83"]))
        .header;
    assert_eq!(header.operator.as_deref(), Some("Acme Oil"));
    assert_eq!(header.datum.as_deref(), Some("NAD83"));
}

#[test]
fn parse_details_block_and_treatment() {
    let document = parser().parse(
        "details.pdf",
        &pages(&[
            "Type Treatment\nSand Frac\nAcid %\n15\nLbs Proppant\n3,450,000\nDetails\nPumped 40 stages\nflowback scheduled\n\nCertification",
        ]),
    );
    let stimulation = document.stimulation;
    assert_eq!(stimulation.type_treatment.as_deref(), Some("Sand Frac"));
    assert_eq!(stimulation.acid_pct.as_deref(), Some("15"));
    assert_eq!(stimulation.lbs_proppant.as_deref(), Some("3450000"));
    assert_eq!(
        stimulation.details.as_deref(),
        Some("Pumped 40 stages\nflowback scheduled")
    );
}

#[test]
fn parser_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<WellDocumentParser>();

    let parser = parser();
    let input = pages(&["Well Operator: Acme Oil", "Stimulated Formation\nBakken"]);
    let expected = parser.parse("shared.pdf", &input);

    let shared = &parser;
    let input = &input;
    std::thread::scope(|scope| {
        let handles = (0..4)
            .map(|_| scope.spawn(move || shared.parse("shared.pdf", input)))
            .collect::<Vec<_>>();
        for handle in handles {
            assert_eq!(handle.join().expect("worker panicked"), expected);
        }
    });
}

struct StubProvider {
    name: &'static str,
    available: bool,
    result: Result<Vec<String>, String>,
}

impl PageTextProvider for StubProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn extract_pages(&self, _pdf_path: &Path) -> Result<Vec<String>> {
        self.result.clone().map_err(|message| anyhow!(message))
    }
}

fn stub(name: &'static str, available: bool, result: Result<Vec<String>, String>) -> Box<dyn PageTextProvider> {
    Box::new(StubProvider {
        name,
        available,
        result,
    })
}

#[test]
fn provider_chain_falls_back_past_unavailable_failing_and_blank() {
    let chain = ProviderChain::new(vec![
        stub("missing", false, Ok(pages(&["never used"]))),
        stub("broken", true, Err("renderer crashed".to_string())),
        stub("blank", true, Ok(pages(&["", "  \n"]))),
        stub("good", true, Ok(pages(&["Well Operator: Acme"]))),
    ]);

    assert_eq!(chain.available_names(), vec!["broken", "blank", "good"]);

    let text = chain.extract(Path::new("well.pdf"));
    assert_eq!(text.provider, Some("good"));
    assert!(text.has_text());
    assert_eq!(text.warnings.len(), 1);
    assert!(text.warnings[0].contains("renderer crashed"));
}

struct CountingProvider {
    probes: Arc<AtomicUsize>,
}

impl PageTextProvider for CountingProvider {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn is_available(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn extract_pages(&self, _pdf_path: &Path) -> Result<Vec<String>> {
        Ok(pages(&["Well Operator: Acme"]))
    }
}

#[test]
fn provider_chain_probes_availability_once() {
    let probes = Arc::new(AtomicUsize::new(0));
    let provider: Box<dyn PageTextProvider> = Box::new(CountingProvider {
        probes: Arc::clone(&probes),
    });
    let chain = ProviderChain::new(vec![provider]);

    assert_eq!(chain.available_names(), vec!["counting"]);
    for name in ["a.pdf", "b.pdf", "c.pdf"] {
        assert_eq!(chain.extract(Path::new(name)).provider, Some("counting"));
    }
    assert_eq!(probes.load(Ordering::SeqCst), 1);
}

#[test]
fn remove_scratch_dir_reports_failed_cleanup() {
    let scratch = std::env::temp_dir().join(format!(
        "wellrecord_scratch_test_{}",
        std::process::id()
    ));
    std::fs::create_dir_all(scratch.join("pages")).expect("create scratch dir");

    assert!(remove_scratch_dir(&scratch));
    assert!(!scratch.exists());
    assert!(!remove_scratch_dir(&scratch));
}

#[test]
fn provider_chain_reports_no_text_when_every_provider_is_blank() {
    let chain = ProviderChain::new(vec![stub("blank", true, Ok(pages(&[""])))]);
    let text = chain.extract(Path::new("blank.pdf"));
    assert_eq!(text.provider, None);
    assert!(!text.has_text());
}

#[test]
fn csv_columns_follow_record_fields() {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .serialize(HeaderRecord::new("a.pdf"))
        .expect("serialize header");
    let output = String::from_utf8(writer.into_inner().expect("flush")).expect("utf8");
    assert_eq!(output.lines().next(), Some(HEADER_CSV_COLUMNS.join(",").as_str()));

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .serialize(StimulationRecord::new("a.pdf"))
        .expect("serialize stimulation");
    let output = String::from_utf8(writer.into_inner().expect("flush")).expect("utf8");
    assert_eq!(
        output.lines().next(),
        Some(STIMULATION_CSV_COLUMNS.join(",").as_str())
    );
}

#[test]
fn record_writer_emits_header_and_empty_cells() -> Result<()> {
    let mut writer = RecordWriter::new(Vec::new(), &HEADER_CSV_COLUMNS)?;
    let mut record = HeaderRecord::new("a.pdf");
    record.operator = Some("Acme, Inc.".to_string());
    writer.write(&record)?;

    let output = String::from_utf8(writer.finish()?)?;
    let lines = output.lines().collect::<Vec<&str>>();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], HEADER_CSV_COLUMNS.join(","));
    assert_eq!(lines[1], "a.pdf,\"Acme, Inc.\",,,,,,,,,");
    Ok(())
}

#[test]
fn upsert_document_replaces_existing_rows() -> Result<()> {
    let mut connection = Connection::open_in_memory()?;
    ensure_schema(&connection)?;
    let parser = parser();

    let first = parser.parse(
        "W-1.pdf",
        &pages(&["Well Operator: Acme Oil\nLatitude: 48.5\nLongitude: 103.25 W"]),
    );
    upsert_document(&mut connection, &first)?;

    let second = parser.parse("W-1.pdf", &pages(&["Well Operator: Acme Oil LLC"]));
    upsert_document(&mut connection, &second)?;

    assert_eq!(count_rows(&connection, "SELECT COUNT(*) FROM well_header")?, 1);
    assert_eq!(
        count_rows(&connection, "SELECT COUNT(*) FROM well_stimulation")?,
        1
    );

    let (operator, latitude): (String, Option<f64>) = connection.query_row(
        "SELECT operator, latitude FROM well_header WHERE document_id = ?1",
        ["W-1.pdf"],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    assert_eq!(operator, "Acme Oil LLC");
    assert_eq!(latitude, None);
    Ok(())
}
