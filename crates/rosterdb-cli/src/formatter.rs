//! Output formatters for search results.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use serde::Serialize;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Window and total of a paged search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub total: u64,
    pub offset: u32,
    pub limit: u32,
}

/// Rows ready for output, columns in projection order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
    pub page: Option<PageInfo>,
}

impl ResultSet {
    /// Build from serializable records; each record must serialize to an object.
    pub fn from_records<'c, T: Serialize>(
        columns: impl IntoIterator<Item = &'c str>,
        records: &[T],
    ) -> Result<Self, serde_json::Error> {
        let rows = records
            .iter()
            .map(|record| match serde_json::to_value(record)? {
                serde_json::Value::Object(map) => Ok(map),
                other => {
                    let mut map = serde_json::Map::new();
                    map.insert("value".to_string(), other);
                    Ok(map)
                }
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()?;

        Ok(Self {
            columns: columns.into_iter().map(String::from).collect(),
            rows,
            page: None,
        })
    }

    /// Attach page information.
    pub fn with_page(mut self, page: PageInfo) -> Self {
        self.page = Some(page);
        self
    }

    fn cells<'a>(
        &'a self,
        row: &'a serde_json::Map<String, serde_json::Value>,
    ) -> impl Iterator<Item = &'a serde_json::Value> + 'a {
        self.columns
            .iter()
            .map(move |c| row.get(c).unwrap_or(&serde_json::Value::Null))
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format a search result.
    fn format_result(&self, result: &ResultSet) -> String;

    /// Format query metrics.
    fn format_metrics(&self, metrics: &rosterdb_core::MetricsSnapshot) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_result(&self, result: &ResultSet) -> String {
        if result.rows.is_empty() && result.page.is_none() {
            return "No results".to_string();
        }

        let mut table = Table::new();
        table.set_header(result.columns.iter().map(Cell::new).collect::<Vec<_>>());

        for row in &result.rows {
            let cells: Vec<Cell> = result.cells(row).map(|v| Cell::new(format_value(v))).collect();
            table.add_row(cells);
        }

        match &result.page {
            Some(page) => format!(
                "{}\n{} row(s), offset {}, limit {}, total {}",
                table,
                result.rows.len(),
                page.offset,
                page.limit,
                page.total
            ),
            None => format!("{}\n{} row(s)", table, result.rows.len()),
        }
    }

    fn format_metrics(&self, metrics: &rosterdb_core::MetricsSnapshot) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Metric", "Value"]);
        table.add_row(vec![
            "content_queries".to_string(),
            metrics.content_queries.to_string(),
        ]);
        table.add_row(vec![
            "count_queries".to_string(),
            metrics.count_queries.to_string(),
        ]);
        table.add_row(vec![
            "counts_skipped".to_string(),
            metrics.counts_skipped.to_string(),
        ]);
        table.to_string()
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_result(&self, result: &ResultSet) -> String {
        let rows: Vec<serde_json::Value> = result
            .rows
            .iter()
            .map(|row| {
                let object: serde_json::Map<_, _> = result
                    .columns
                    .iter()
                    .cloned()
                    .zip(result.cells(row).cloned())
                    .collect();
                serde_json::Value::Object(object)
            })
            .collect();

        let output = match &result.page {
            Some(page) => serde_json::json!({
                "content": rows,
                "total": page.total,
                "offset": page.offset,
                "limit": page.limit,
            }),
            None => serde_json::Value::Array(rows),
        };

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_metrics(&self, metrics: &rosterdb_core::MetricsSnapshot) -> String {
        serde_json::json!({
            "contentQueries": metrics.content_queries,
            "countQueries": metrics.count_queries,
            "countsSkipped": metrics.counts_skipped,
        })
        .to_string()
    }
}

/// CSV formatter.
pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format_result(&self, result: &ResultSet) -> String {
        let mut output = result.columns.join(",");
        output.push('\n');

        for row in &result.rows {
            let cells: Vec<String> = result.cells(row).map(format_value_csv).collect();
            output.push_str(&cells.join(","));
            output.push('\n');
        }

        output
    }

    fn format_metrics(&self, metrics: &rosterdb_core::MetricsSnapshot) -> String {
        format!(
            "content_queries,count_queries,counts_skipped\n{},{},{}\n",
            metrics.content_queries, metrics.count_queries, metrics.counts_skipped
        )
    }
}

/// Format a JSON value as a display string.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Format a JSON value for CSV output.
fn format_value_csv(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => format!("\"{}\"", escape_csv(s)),
        other => format_value(other),
    }
}

/// Escape a string for CSV.
fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosterdb_core::MemberTeamDto;

    fn sample() -> ResultSet {
        let rows = vec![
            MemberTeamDto {
                member_id: 4,
                username: Some("member4".into()),
                age: 14,
                team_id: Some(2),
                team_name: Some("teamB".into()),
            },
            MemberTeamDto {
                member_id: 5,
                username: None,
                age: 30,
                team_id: None,
                team_name: None,
            },
        ];
        ResultSet::from_records(
            ["memberId", "username", "age", "teamId", "teamName"],
            &rows,
        )
        .unwrap()
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("hello"), "hello");
        assert_eq!(escape_csv("say \"hi\""), "say \"\"hi\"\"");
    }

    #[test]
    fn test_csv_output() {
        let csv = CsvFormatter.format_result(&sample());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "memberId,username,age,teamId,teamName");
        assert_eq!(lines[1], "4,\"member4\",14,2,\"teamB\"");
        assert_eq!(lines[2], "5,,30,,");
    }

    #[test]
    fn test_json_page_output() {
        let result = sample().with_page(PageInfo {
            total: 9,
            offset: 0,
            limit: 2,
        });
        let json: serde_json::Value =
            serde_json::from_str(&JsonFormatter.format_result(&result)).unwrap();
        assert_eq!(json["total"], 9);
        assert_eq!(json["content"][0]["teamName"], "teamB");
        assert!(json["content"][1]["teamName"].is_null());
    }

    #[test]
    fn test_table_output() {
        let table = TableFormatter.format_result(&sample());
        assert!(table.contains("member4"));
        assert!(table.contains("NULL"));
        assert!(table.ends_with("2 row(s)"));

        let empty = ResultSet::from_records(["username"], &Vec::<MemberTeamDto>::new()).unwrap();
        assert_eq!(TableFormatter.format_result(&empty), "No results");
    }
}
