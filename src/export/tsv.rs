use std::io::{self, Write};
use std::ops::RangeInclusive;

use anyhow::{anyhow, Result};

use super::ChunkMetadata;
use crate::features::{FeatureStore, Label, RleWeights, SimpleWeights, WeightSlot, GAP_LABEL};
use crate::poa::{Strand, MAX_RUN_LENGTH};

/// Column layout of a weight schema in the tabular form.
pub trait TabularWeights {
    /// Label column names, written when labels are requested.
    fn label_columns() -> &'static [&'static str];

    /// Weight column names in output order.
    fn weight_columns() -> Vec<String>;

    /// Write the label fields of one row, each preceded by a tab.
    fn write_label<W: Write>(writer: &mut W, label: Option<Label>) -> io::Result<()>;

    /// Write the weight fields of one row divided by `scale`, each preceded by
    /// a tab.
    fn write_weights<W: Write>(&self, writer: &mut W, scale: f64) -> io::Result<()>;
}

fn label_base(label: Option<Label>) -> char {
    label.map_or(GAP_LABEL, |label| label.base) as char
}

impl TabularWeights for SimpleWeights {
    fn label_columns() -> &'static [&'static str] {
        &["label"]
    }

    fn weight_columns() -> Vec<String> {
        WeightSlot::all()
            .flat_map(|slot| {
                let name = match slot {
                    WeightSlot::Base(symbol) => (symbol.to_ascii() as char).to_string(),
                    WeightSlot::Gap => "gap".to_string(),
                };
                Strand::BOTH.map(|strand| format!("{name}_{}", strand.suffix()))
            })
            .collect()
    }

    fn write_label<W: Write>(writer: &mut W, label: Option<Label>) -> io::Result<()> {
        write!(writer, "\t{}", label_base(label))
    }

    fn write_weights<W: Write>(&self, writer: &mut W, scale: f64) -> io::Result<()> {
        for value in self.normalized(scale) {
            write!(writer, "\t{value:7.4}")?;
        }
        Ok(())
    }
}

impl TabularWeights for RleWeights {
    fn label_columns() -> &'static [&'static str] {
        &["label", "labelRunLength"]
    }

    fn weight_columns() -> Vec<String> {
        let mut columns = Vec::new();
        for symbol in crate::poa::Symbol::BASES {
            for run_length in 1..=MAX_RUN_LENGTH {
                for strand in Strand::BOTH {
                    columns.push(format!(
                        "{}{run_length}_{}",
                        symbol.to_ascii() as char,
                        strand.suffix()
                    ));
                }
            }
        }
        columns.extend(Strand::BOTH.map(|strand| format!("gap_{}", strand.suffix())));
        columns
    }

    fn write_label<W: Write>(writer: &mut W, label: Option<Label>) -> io::Result<()> {
        let run_length = label.map_or(0, |label| label.run_length);
        write!(writer, "\t{}\t{run_length}", label_base(label))
    }

    fn write_weights<W: Write>(&self, writer: &mut W, scale: f64) -> io::Result<()> {
        for value in self.as_slice() {
            write!(writer, "\t{:7.4}", value / scale)?;
        }
        Ok(())
    }
}

/// Write the tabular form of `store` restricted to `range`.
///
/// Weights are divided by `weight_scale` and printed with four decimals in a
/// seven character field. A `None` range writes the header only.
pub fn write_tsv<W: Write, F: TabularWeights>(
    writer: &mut W,
    metadata: &ChunkMetadata,
    store: &FeatureStore<F>,
    range: Option<RangeInclusive<usize>>,
    output_labels: bool,
    weight_scale: f64,
) -> Result<()> {
    writeln!(writer, "##contig:{}", metadata.contig)?;
    writeln!(writer, "##contigStartPos:{}", metadata.start)?;
    writeln!(writer, "##contigEndPos:{}", metadata.end)?;

    write!(writer, "#refPos\tinsPos")?;
    if output_labels {
        for column in F::label_columns() {
            write!(writer, "\t{column}")?;
        }
    }
    for column in F::weight_columns() {
        write!(writer, "\t{column}")?;
    }
    writeln!(writer)?;

    if let Some(range) = range {
        for record in store.records(range) {
            write!(writer, "{}\t{}", record.ref_position, record.insert_position)?;
            if output_labels {
                F::write_label(writer, record.label)?;
            }
            record.weights.write_weights(writer, weight_scale)?;
            writeln!(writer)?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Render the tabular form into a string (useful for tests and snapshots).
pub fn render_tsv<F: TabularWeights>(
    metadata: &ChunkMetadata,
    store: &FeatureStore<F>,
    range: Option<RangeInclusive<usize>>,
    output_labels: bool,
    weight_scale: f64,
) -> Result<String> {
    let mut buffer = Vec::new();
    write_tsv(&mut buffer, metadata, store, range, output_labels, weight_scale)?;
    String::from_utf8(buffer).map_err(|_| anyhow!("rendered TSV is not valid UTF-8"))
}
