//! CSV export for protection-need models.
//!
//! Writes one semicolon-delimited, BOM-prefixed CSV file per layer into a
//! target directory, using the fixed filenames `1_informationen.csv` through
//! `6_gebaeude.csv`. Each row is the flat [`Record`] projection of one node;
//! the header row is the union of all columns seen across the layer's rows,
//! in first-seen order. Hidden nodes can be skipped, in which case their
//! display identifiers are also withheld (leaving gaps in the numbering).

use std::{
    fs::File,
    io::{self, Write},
    path::Path,
};

use thiserror::Error;
use tracing::instrument;

use crate::domain::{
    Application, Building, Dimension, Information, Infrastructure, Layer, Model, NodeView,
    Process, Room, Secondary,
};

/// A single export row: (column, value) pairs in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.push((column.into(), value.into()));
    }

    /// The value stored for `column`, if the row has that column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates the row's column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

/// Errors that can occur while writing the export files.
#[derive(Debug, Error)]
pub enum ExportError {
    /// An export file could not be created or written.
    #[error("failed to write export file: {0}")]
    Io(#[from] io::Error),
    /// A row could not be encoded as CSV.
    #[error("failed to encode CSV record: {0}")]
    Csv(#[from] csv::Error),
}

/// The flat projection of one node.
///
/// Protection-need column pairs are emitted only for dimensions whose
/// effective need is present, so rows within a layer may have different
/// column sets.
fn record<L: Layer>(view: &NodeView<'_, L>) -> Record {
    let mut record = Record::default();
    record.push(
        "ID",
        view.id().map_or_else(String::new, |id| id.to_string()),
    );
    record.push("Ebene", view.level().to_string());
    record.push("Name", view.name());
    record.push("Beschreibung", view.description().unwrap_or_default());
    record.push("Anmerkung", view.remark().unwrap_or_default());

    for dimension in Dimension::ALL {
        if let Some(need) = view.effective_need(dimension) {
            record.push(
                format!("{} Schutzbedarf", dimension.label()),
                need.category().label(),
            );
            record.push(
                format!("{} Anmerkungen", dimension.label()),
                need.joined_remarks(),
            );
        }
    }
    record
}

fn records_primary<L: Layer>(model: &Model, skip_hidden: bool) -> Vec<Record> {
    model
        .nodes::<L>()
        .map(|id| model.view(id))
        .filter(|view| !(skip_hidden && view.hidden()))
        .map(|view| record(&view))
        .collect()
}

fn records_secondary<L: Secondary>(model: &Model, skip_hidden: bool) -> Vec<Record> {
    model
        .nodes::<L>()
        .map(|id| model.view(id))
        .filter(|view| !(skip_hidden && view.hidden()))
        .map(|view| {
            let mut record = record(&view);
            let dependents = view
                .dependent_closure()
                .into_iter()
                .map(|dependent| model.view(dependent).id_and_name())
                .collect::<Vec<_>>()
                .join("; ");
            record.push(L::DEPENDENT_COLUMN, dependents);
            record
        })
        .collect()
}

/// Union of all column names, in first-seen order.
fn header(records: &[Record]) -> Vec<&str> {
    let mut header = Vec::new();
    for record in records {
        for column in record.columns() {
            if !header.contains(&column) {
                header.push(column);
            }
        }
    }
    header
}

fn layer_path<L: Layer>(dir: &Path) -> std::path::PathBuf {
    dir.join(format!("{}_{}.csv", L::POSITION, L::FILE_STEM))
}

fn write_layer(records: &[Record], path: &Path) -> Result<(), ExportError> {
    let mut file = File::create(path)?;
    // Excel only detects UTF-8 when the file starts with a BOM.
    file.write_all("\u{feff}".as_bytes())?;

    let header = header(records);
    if header.is_empty() {
        return Ok(());
    }

    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(file);
    writer.write_record(&header)?;
    for record in records {
        writer.write_record(header.iter().map(|column| record.get(column).unwrap_or_default()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Assigns display identifiers and writes one CSV file per layer into `dir`.
///
/// Identifier assignment honors `skip_hidden` (hidden nodes keep no
/// identifier and are omitted from the files), and identifiers survive
/// repeated exports unchanged. The directory must already exist.
///
/// # Errors
///
/// Returns an error if a file cannot be created or a row cannot be encoded.
#[instrument(skip(model), err)]
pub fn write_csvs(model: &mut Model, dir: &Path, skip_hidden: bool) -> Result<(), ExportError> {
    model.assign_ids(skip_hidden);

    write_layer(
        &records_primary::<Information>(model, skip_hidden),
        &layer_path::<Information>(dir),
    )?;
    write_layer(
        &records_secondary::<Process>(model, skip_hidden),
        &layer_path::<Process>(dir),
    )?;
    write_layer(
        &records_secondary::<Application>(model, skip_hidden),
        &layer_path::<Application>(dir),
    )?;
    write_layer(
        &records_secondary::<Infrastructure>(model, skip_hidden),
        &layer_path::<Infrastructure>(dir),
    )?;
    write_layer(
        &records_secondary::<Room>(model, skip_hidden),
        &layer_path::<Room>(dir),
    )?;
    write_layer(
        &records_secondary::<Building>(model, skip_hidden),
        &layer_path::<Building>(dir),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{header, record, records_secondary, write_csvs};
    use crate::domain::{
        Dimension, Information, Model, NodeBuilder, Process, ProtectionCategory, ProtectionNeed,
    };

    fn sample_model() -> Model {
        let mut model = Model::new();
        let info = model.add::<Information>(
            NodeBuilder::new("Kundendaten")
                .description("Stammdaten aller Kunden")
                .need(
                    Dimension::Confidentiality,
                    ProtectionNeed::with_remarks(
                        ProtectionCategory::VeryHigh,
                        ["personenbezogen"],
                    ),
                ),
        );
        let process = model.add::<Process>(NodeBuilder::new("Vertrieb"));
        model.add_dependent(process, info);
        model
    }

    #[test]
    fn record_omits_absent_dimensions() {
        let mut model = Model::new();
        let node = model.add::<Information>(NodeBuilder::new("Adressen").need(
            Dimension::Integrity,
            ProtectionNeed::new(ProtectionCategory::Normal),
        ));

        let record = record(&model.view(node));
        assert_eq!(record.get("Name"), Some("Adressen"));
        assert_eq!(record.get("Integrität Schutzbedarf"), Some("Normal"));
        assert_eq!(record.get("Integrität Anmerkungen"), Some(""));
        assert_eq!(record.get("Vertraulichkeit Schutzbedarf"), None);
        assert_eq!(record.get("Verfügbarkeit Schutzbedarf"), None);
    }

    #[test]
    fn record_base_columns_come_first() {
        let mut model = Model::new();
        let node = model.add::<Information>(NodeBuilder::new("Adressen"));

        let record = record(&model.view(node));
        let columns: Vec<_> = record.columns().collect();
        assert_eq!(
            columns,
            ["ID", "Ebene", "Name", "Beschreibung", "Anmerkung"]
        );
    }

    #[test]
    fn secondary_records_append_dependent_column() {
        let mut model = sample_model();
        model.assign_ids(false);

        let records = records_secondary::<Process>(&model, false);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Information"), Some("1: Kundendaten"));
    }

    #[test]
    fn header_is_first_seen_union() {
        let mut model = Model::new();
        let plain = model.add::<Information>(NodeBuilder::new("plain"));
        let classified = model.add::<Information>(NodeBuilder::new("classified").need(
            Dimension::Availability,
            ProtectionNeed::new(ProtectionCategory::High),
        ));

        let records = [record(&model.view(plain)), record(&model.view(classified))];
        let header = header(&records);
        assert_eq!(
            header,
            [
                "ID",
                "Ebene",
                "Name",
                "Beschreibung",
                "Anmerkung",
                "Verfügbarkeit Schutzbedarf",
                "Verfügbarkeit Anmerkungen"
            ]
        );
    }

    #[test]
    fn write_csvs_produces_bom_prefixed_semicolon_files() {
        let mut model = sample_model();
        let dir = tempfile::tempdir().unwrap();

        write_csvs(&mut model, dir.path(), false).unwrap();

        let bytes = fs::read(dir.path().join("1_informationen.csv")).unwrap();
        assert_eq!(&bytes[..3], [0xEF, 0xBB, 0xBF]);

        let content = String::from_utf8(bytes).unwrap();
        let mut lines = content.trim_start_matches('\u{feff}').lines();
        assert_eq!(
            lines.next().unwrap(),
            "ID;Ebene;Name;Beschreibung;Anmerkung;\
             Vertraulichkeit Schutzbedarf;Vertraulichkeit Anmerkungen"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1;0;Kundendaten;Stammdaten aller Kunden;;Sehr hoch;personenbezogen"
        );
    }

    #[test]
    fn write_csvs_links_dependents_by_id_and_name() {
        let mut model = sample_model();
        let dir = tempfile::tempdir().unwrap();

        write_csvs(&mut model, dir.path(), false).unwrap();

        let content = fs::read_to_string(dir.path().join("2_prozesse.csv")).unwrap();
        assert!(content.contains("Information"));
        assert!(content.contains("1: Kundendaten"));
    }

    #[test]
    fn write_csvs_skips_hidden_rows_and_ids() {
        let mut model = Model::new();
        model.add::<Information>(NodeBuilder::new("sichtbar"));
        model.add::<Information>(NodeBuilder::new("geheim").hidden());
        model.add::<Information>(NodeBuilder::new("auch sichtbar"));
        let dir = tempfile::tempdir().unwrap();

        write_csvs(&mut model, dir.path(), true).unwrap();

        let content = fs::read_to_string(dir.path().join("1_informationen.csv")).unwrap();
        assert!(!content.contains("geheim"));
        // Positional ids: the hidden row leaves a gap.
        assert!(content.contains("3;0;auch sichtbar"));
    }

    #[test]
    fn write_csvs_creates_all_six_files() {
        let mut model = Model::new();
        let dir = tempfile::tempdir().unwrap();

        write_csvs(&mut model, dir.path(), false).unwrap();

        for name in [
            "1_informationen.csv",
            "2_prozesse.csv",
            "3_anwendungen.csv",
            "4_infrastrukturen.csv",
            "5_raeume.csv",
            "6_gebaeude.csv",
        ] {
            assert!(dir.path().join(name).exists(), "missing {name}");
        }
    }
}
