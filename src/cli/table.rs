//! Table formatting for CLI list commands
//!
//! Every record list goes through [`TableFormatter`] so that TSV, CSV,
//! Markdown and id output look the same across record types.

use chrono::{DateTime, Utc};
use console::style;

use crate::cli::helpers::{escape_csv, format_money, truncate_str};
use crate::cli::OutputFormat;
use crate::core::identity::EntityId;
use crate::core::shortid::ShortIdIndex;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Reference to another record (cyan, shown as alias when known)
    Id(String),
    /// Plain text, truncated to the column
    Text(String),
    /// Record kind such as a grip style or work type
    Type(String),
    /// Ball status with color coding (active=green, in_shop=yellow, retired/sold=dim)
    Status(String),
    /// Yes/no flag
    Flag(bool),
    /// Dollar amount, "-" when absent
    Money(Option<f64>),
    /// Float value with precision
    Float(Option<f64>, usize),
    Number(i64),
    /// DateTime displayed as date only
    Date(DateTime<Utc>),
    Empty,
}

impl CellValue {
    /// Text for an optional string, "-" when absent
    pub fn opt_text(value: Option<&str>) -> Self {
        value.map_or(CellValue::Empty, |v| CellValue::Text(v.to_string()))
    }

    /// Reference cell showing `PREFIX@N` when the target was listed before
    pub fn reference(id: Option<&EntityId>, short_ids: &ShortIdIndex) -> Self {
        id.map_or(CellValue::Empty, |id| CellValue::Id(short_ids.display(id)))
    }

    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => {
                format!("{:<width$}", style(truncate_str(id, width)).cyan(), width = width)
            }
            CellValue::Text(s) => {
                format!("{:<width$}", truncate_str(s, width.saturating_sub(2)), width = width)
            }
            CellValue::Type(s) => format!("{:<width$}", style(s).magenta(), width = width),
            CellValue::Status(s) => {
                let styled = match s.as_str() {
                    "active" => style(s.as_str()).green(),
                    "in_shop" => style(s.as_str()).yellow(),
                    "retired" | "sold" => style(s.as_str()).dim(),
                    _ => style(s.as_str()).cyan(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Flag(true) => format!("{:<width$}", style("yes").green(), width = width),
            CellValue::Flag(false) => format!("{:<width$}", style("no").dim(), width = width),
            _ => format!("{:<width$}", self.raw(), width = width),
        }
    }

    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Money(v) => v.map(|v| format!("{:.2}", v)).unwrap_or_default(),
            other => escape_csv(&other.raw()),
        }
    }

    /// Format for Markdown tables; pipes are escaped
    pub fn format_md(&self) -> String {
        self.raw().replace('|', "\\|")
    }

    /// Plain text without color
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(s) | CellValue::Text(s) | CellValue::Type(s) | CellValue::Status(s) => {
                s.clone()
            }
            CellValue::Flag(b) => if *b { "yes" } else { "no" }.to_string(),
            CellValue::Money(v) => format_money(*v),
            CellValue::Float(v, precision) => v.map_or_else(
                || "-".to_string(),
                |v| format!("{:.prec$}", v, prec = precision),
            ),
            CellValue::Number(n) => n.to_string(),
            CellValue::Date(dt) => dt.format("%Y-%m-%d").to_string(),
            CellValue::Empty => "-".to_string(),
        }
    }

    pub fn display_width(&self) -> usize {
        self.raw().chars().count()
    }
}

/// Column definition with header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub short_id: String,
    pub full_id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: &EntityId, short_ids: &ShortIdIndex) -> Self {
        Self {
            short_id: short_ids.short_id(id).unwrap_or_default(),
            full_id: id.to_string(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    entity_prefix: &'static str,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str, entity_prefix: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            entity_prefix,
        }
    }

    /// Output rows in the requested format; `Auto` means TSV
    pub fn output(&self, rows: Vec<TableRow>, format: OutputFormat) {
        match format {
            OutputFormat::Csv => self.output_csv(&rows),
            OutputFormat::Md => self.output_md(&rows),
            OutputFormat::Id => {
                for row in &rows {
                    println!("{}", row.full_id);
                }
            }
            _ => self.output_tsv(&rows),
        }
    }

    /// Column widths sized to content, capped at each column's maximum
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        let short_width = rows.iter().map(|r| r.short_id.len()).max().unwrap_or(0).max(5);
        let mut widths = vec![short_width];

        for col in self.columns {
            let content = rows
                .iter()
                .filter_map(|r| r.get(col.key))
                .map(CellValue::display_width)
                .max()
                .unwrap_or(0);
            widths.push(col.header.len().max(content + 2).min(col.width));
        }
        widths
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        let widths = self.calculate_widths(rows);

        let mut header = vec![format!("{:<w$}", style("SHORT").bold().dim(), w = widths[0])];
        for (col, w) in self.columns.iter().zip(&widths[1..]) {
            header.push(format!("{:<w$}", style(col.header).bold(), w = *w));
        }
        println!("{}", header.join(" "));
        println!("{}", "-".repeat(widths.iter().sum::<usize>() + widths.len() - 1));

        for row in rows {
            let mut parts = vec![format!("{:<w$}", style(&row.short_id).cyan(), w = widths[0])];
            for (col, w) in self.columns.iter().zip(&widths[1..]) {
                let cell = row.get(col.key).unwrap_or(&CellValue::Empty);
                parts.push(cell.format_tsv(*w));
            }
            println!("{}", parts.join(" "));
        }

        println!();
        println!(
            "{} {}(s) found. Use {} to reference by short ID.",
            style(rows.len()).cyan(),
            self.entity_name,
            style(format!("{}@N", self.entity_prefix)).cyan()
        );
    }

    fn output_csv(&self, rows: &[TableRow]) {
        let mut headers = vec!["short_id", "id"];
        headers.extend(self.columns.iter().map(|c| c.key));
        println!("{}", headers.join(","));

        for row in rows {
            let mut values = vec![escape_csv(&row.short_id), escape_csv(&row.full_id)];
            for col in self.columns {
                values.push(row.get(col.key).map(CellValue::format_csv).unwrap_or_default());
            }
            println!("{}", values.join(","));
        }
    }

    fn output_md(&self, rows: &[TableRow]) {
        let mut headers = vec!["Short", "ID"];
        headers.extend(self.columns.iter().map(|c| c.header));
        println!("| {} |", headers.join(" | "));
        println!("|{}|", vec!["---"; headers.len()].join("|"));

        for row in rows {
            let mut values = vec![row.short_id.clone(), row.full_id.clone()];
            for col in self.columns {
                values.push(row.get(col.key).map_or_else(|| "-".to_string(), CellValue::format_md));
            }
            println!("| {} |", values.join(" | "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;

    #[test]
    fn test_cell_value_raw() {
        assert_eq!(CellValue::Text("hello".into()).raw(), "hello");
        assert_eq!(CellValue::Money(Some(12.5)).raw(), "$12.50");
        assert_eq!(CellValue::Money(None).raw(), "-");
        assert_eq!(CellValue::Float(Some(4.25), 1).raw(), "4.2");
        assert_eq!(CellValue::Flag(true).raw(), "yes");
        assert_eq!(CellValue::opt_text(None).raw(), "-");
    }

    #[test]
    fn test_cell_value_csv() {
        assert_eq!(CellValue::Money(Some(80.0)).format_csv(), "80.00");
        assert_eq!(CellValue::Empty.format_csv(), "");
        assert_eq!(CellValue::Text("a,b".into()).format_csv(), "\"a,b\"");
    }

    #[test]
    fn test_cell_value_md_escapes_pipes() {
        assert_eq!(CellValue::Text("a|b".into()).format_md(), "a\\|b");
    }

    #[test]
    fn test_table_row_uses_short_id() {
        let id = EntityId::new(EntityPrefix::Cust);
        let mut short_ids = ShortIdIndex::new();
        short_ids.rebuild(EntityPrefix::Cust, [&id]);

        let row = TableRow::new(&id, &short_ids).cell("name", CellValue::Text("Pat".into()));
        assert_eq!(row.short_id, "CUST@1");
        assert_eq!(row.get("name").map(CellValue::raw).as_deref(), Some("Pat"));
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn test_reference_cell() {
        let listed = EntityId::new(EntityPrefix::Ball);
        let unlisted = EntityId::new(EntityPrefix::Ball);
        let mut short_ids = ShortIdIndex::new();
        short_ids.rebuild(EntityPrefix::Ball, [&listed]);

        assert_eq!(CellValue::reference(Some(&listed), &short_ids).raw(), "BALL@1");
        assert_eq!(CellValue::reference(Some(&unlisted), &short_ids).raw(), unlisted.to_string());
        assert_eq!(CellValue::reference(None, &short_ids).raw(), "-");
    }
}
