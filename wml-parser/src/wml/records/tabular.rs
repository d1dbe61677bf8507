//! Tabular projection of records and CSV export.

use super::node::RecordNode;
use std::io;

/// A fixed column set and one row per selected record. Missing attributes are
/// empty cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RecordTable {
    /// Selects every `tag` node in `records` (at any depth) and projects `columns`.
    pub fn project<'a, I>(records: I, tag: &str, columns: &[String]) -> Self
    where
        I: IntoIterator<Item = &'a RecordNode>,
    {
        let rows = records
            .into_iter()
            .flat_map(|record| record.find_all(tag))
            .map(|node| {
                columns
                    .iter()
                    .map(|column| node.get(column).map(ToString::to_string).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self {
            columns: columns.to_vec(),
            rows,
        }
    }

    /// Writes the table as RFC 4180 CSV: a header row, CRLF line endings, and fields
    /// quoted only when they hold a comma, a quote or a line break.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(writer);
        csv.write_record(&self.columns)?;
        for row in &self.rows {
            csv.write_record(row)?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String, csv::Error> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wml::records::extract_records;
    use crate::wml::testing::UNIT_TYPES;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn projects_columns_and_leaves_gaps_empty() {
        let records = extract_records(UNIT_TYPES);
        let table = RecordTable::project(&records, "unit_type", &columns(&["id", "movement", "level"]));
        assert_eq!(
            table.rows,
            vec![
                vec!["Elvish Fighter".to_string(), "5".to_string(), "1".to_string()],
                vec!["Orcish Grunt".to_string(), String::new(), "1".to_string()],
            ]
        );
    }

    #[test]
    fn csv_quotes_only_what_needs_it() {
        let records = extract_records(UNIT_TYPES);
        let table = RecordTable::project(&records, "unit_type", &columns(&["id", "description"]));
        let csv = table.to_csv_string().unwrap();
        assert_eq!(
            csv,
            "id,description\r\nElvish Fighter,\r\nOrcish Grunt,\"Big, \"\"green\"\", and\nstrong\"\r\n"
        );
    }
}
