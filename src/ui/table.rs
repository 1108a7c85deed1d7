use tabled::{settings::Style, Table, Tabled};

use crate::storage::DbStats;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Table")]
    pub table: String,
    #[tabled(rename = "Rows")]
    pub rows: usize,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, rows: usize) {
        self.rows.push(TableRow {
            table: label.to_string(),
            rows,
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

/// Row counts of every cached table, one line each
pub fn stats_table(stats: &DbStats) -> String {
    let mut builder = TableBuilder::new();
    for (label, count) in stats.rows() {
        builder.add_row(label, count);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_builder() {
        assert!(TableBuilder::new().build().is_empty());
    }

    #[test]
    fn test_stats_table() {
        let stats = DbStats {
            feeds: 3,
            categories: 2,
            entries: 40,
            feeds_categories: 4,
            entries_tags: 7,
        };
        let table = stats_table(&stats);
        assert!(table.contains("Table"));
        assert!(table.contains("Feed categories"));
        assert!(table.contains("40"));
    }
}
