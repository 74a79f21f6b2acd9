use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type Row = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub region: String,
    pub age_range: String,
    pub gender: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub session_id: String,
    pub date: NaiveDate,
    pub region: String,
    pub play_time: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenreRecord {
    pub region: String,
    #[serde(rename = "genre_1")]
    pub genre: String,
    #[serde(rename = "session_counts")]
    pub session_count: f64,
}

/// Free-form table of the most viewed content, kept in file column order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PopularityTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl PopularityTable {
    /// Rebuilds a table from rows sent back by the browser. Column order follows
    /// the first row that carries each key.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub users: Vec<UserRecord>,
    pub sessions: Vec<SessionRecord>,
    pub genres: Vec<GenreRecord>,
    pub most_popular: PopularityTable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub region: String,
    pub distinct_sessions: u64,
    pub total_play_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionCount {
    pub region: String,
    pub users: u64,
}

/// Two-key grouping result. `values[r][c]` belongs to `rows[r]` and `columns[c]`;
/// combinations never seen are zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CrossTab {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CrossTab {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.rows.iter().position(|key| key == row)?;
        let c = self.columns.iter().position(|key| key == column)?;
        Some(self.values[r][c])
    }

    pub fn column_values(&self, index: usize) -> Vec<f64> {
        self.values.iter().map(|row| row[index]).collect()
    }
}

/// Numeric columns of the region summary that the dashboard dropdown may pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryField {
    #[default]
    DistinctSessions,
    TotalPlayTime,
}

impl SummaryField {
    pub const ALL: [SummaryField; 2] = [SummaryField::DistinctSessions, SummaryField::TotalPlayTime];

    /// Column name used on the wire and in chart titles.
    pub fn column(self) -> &'static str {
        match self {
            SummaryField::DistinctSessions => "session_id",
            SummaryField::TotalPlayTime => "play_time",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.column() == value)
    }

    pub fn value_of(self, summary: &RegionSummary) -> f64 {
        match self {
            SummaryField::DistinctSessions => summary.distinct_sessions as f64,
            SummaryField::TotalPlayTime => summary.total_play_time,
        }
    }
}
