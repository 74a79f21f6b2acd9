use crate::config::DatasetPaths;
use crate::errors::LoadError;
use crate::models::{Datasets, GenreRecord, PopularityTable, Row, SessionRecord, UserRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{de::DeserializeOwned, Deserialize};
use std::path::Path;
use tokio::fs;
use tracing::info;

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

#[derive(Debug, Deserialize)]
struct RawSession {
    session_id: String,
    date: String,
    region: String,
    play_time: f64,
}

pub async fn load_datasets(paths: &DatasetPaths) -> Result<Datasets, LoadError> {
    let users: Vec<UserRecord> = parse_records(&paths.user_info, &read(&paths.user_info).await?)?;
    info!("loaded {} users from {}", users.len(), paths.user_info.display());

    let sessions = parse_sessions(&paths.web_usage, &read(&paths.web_usage).await?)?;
    info!("loaded {} sessions from {}", sessions.len(), paths.web_usage.display());

    let genres: Vec<GenreRecord> = parse_records(&paths.genres, &read(&paths.genres).await?)?;
    info!("loaded {} genre rows from {}", genres.len(), paths.genres.display());

    let most_popular = parse_table(&paths.most_popular, &read(&paths.most_popular).await?)?;
    info!(
        "loaded {} popular titles ({} columns) from {}",
        most_popular.rows.len(),
        most_popular.columns.len(),
        paths.most_popular.display()
    );

    Ok(Datasets {
        users,
        sessions,
        genres,
        most_popular,
    })
}

async fn read(path: &Path) -> Result<Vec<u8>, LoadError> {
    fs::read(path).await.map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn csv_error(path: &Path) -> impl Fn(csv::Error) -> LoadError + '_ {
    move |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

pub fn parse_records<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<Vec<T>, LoadError> {
    let mut reader = csv::Reader::from_reader(bytes);
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(csv_error(path))
}

pub fn parse_sessions(path: &Path, bytes: &[u8]) -> Result<Vec<SessionRecord>, LoadError> {
    let raw: Vec<RawSession> = parse_records(path, bytes)?;
    raw.into_iter()
        .enumerate()
        .map(|(index, session)| {
            let date = parse_day(&session.date).ok_or_else(|| LoadError::InvalidDate {
                path: path.to_path_buf(),
                // header is line 1
                row: index + 2,
                value: session.date.clone(),
            })?;
            Ok(SessionRecord {
                session_id: session.session_id,
                date,
                region: session.region,
                play_time: session.play_time,
            })
        })
        .collect()
}

pub fn parse_table(path: &Path, bytes: &[u8]) -> Result<PopularityTable, LoadError> {
    let mut reader = csv::Reader::from_reader(bytes);
    let columns: Vec<String> = reader
        .headers()
        .map_err(csv_error(path))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error(path))?;
        let row: Row = columns
            .iter()
            .zip(record.iter())
            .map(|(column, cell)| (column.clone(), cell_value(cell)))
            .collect();
        rows.push(row);
    }

    Ok(PopularityTable { columns, rows })
}

fn cell_value(cell: &str) -> serde_json::Value {
    let trimmed = cell.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return int.into();
    }
    if let Ok(float) = trimmed.parse::<f64>() {
        if let Some(number) = serde_json::Number::from_f64(float) {
            return serde_json::Value::Number(number);
        }
    }
    serde_json::Value::String(cell.to_string())
}

/// Truncates any supported date or timestamp to its calendar day.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, format) {
            return Some(timestamp.date());
        }
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|timestamp| timestamp.naive_local().date())
}

pub fn session_date_range(sessions: &[SessionRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let min = sessions.iter().map(|session| session.date).min()?;
    let max = sessions.iter().map(|session| session.date).max()?;
    Some((min, max))
}
