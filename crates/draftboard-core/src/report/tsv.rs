// Tab-separated report tables.

use std::io::Write;

use anyhow::{Context, Result};

/// A rendered report: one header row plus data rows, all as text cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TsvTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Number of columns; taken from the widest of the header and the rows.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    /// Header and data rows, in output order.
    pub fn lines(&self) -> impl Iterator<Item = &Vec<String>> {
        std::iter::once(&self.headers).chain(self.rows.iter())
    }

    pub fn write_to<W: Write>(&self, out: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_writer(out);
        for line in self.lines() {
            writer.write_record(line).context("failed to write TSV record")?;
        }
        writer.flush().context("failed to flush TSV output")?;
        Ok(())
    }

    pub fn to_tsv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        String::from_utf8(buf).context("TSV output is not valid UTF-8")
    }
}

// ---------------------------------------------------------------------------
// Cell formatting
// ---------------------------------------------------------------------------

/// Two decimals, used for z-scores and most rate stats.
pub fn fixed2(value: f64) -> String {
    format!("{value:.2}")
}

/// Three decimals, used for AVG and WHIP.
pub fn fixed3(value: f64) -> String {
    format!("{value:.3}")
}

pub fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Horizontal append
// ---------------------------------------------------------------------------

/// Place tables side by side with one empty column between them. Shorter
/// tables are padded with empty cells so every column stays aligned.
pub fn append_horizontally(tables: &[TsvTable]) -> TsvTable {
    let height = tables.iter().map(|t| t.rows.len() + 1).max().unwrap_or(0);
    let widths: Vec<usize> = tables.iter().map(TsvTable::width).collect();

    let mut lines: Vec<Vec<String>> = vec![Vec::new(); height];
    for (index, (table, width)) in tables.iter().zip(&widths).enumerate() {
        let mut source = table.lines();
        for line in lines.iter_mut() {
            if index > 0 {
                line.push(String::new());
            }
            let cells = source.next().map(Vec::as_slice).unwrap_or(&[]);
            line.extend(cells.iter().cloned());
            line.resize(line.len() + (width - cells.len()), String::new());
        }
    }

    let mut lines = lines.into_iter();
    TsvTable {
        headers: lines.next().unwrap_or_default(),
        rows: lines.collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
