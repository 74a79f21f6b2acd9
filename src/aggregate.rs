use crate::models::{CrossTab, GenreRecord, RegionCount, RegionSummary, SessionRecord, UserRecord};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Assigns dense indices to keys in the order they are first seen.
#[derive(Default)]
struct KeyIndex {
    keys: Vec<String>,
    positions: HashMap<String, usize>,
}

impl KeyIndex {
    fn position(&mut self, key: &str) -> usize {
        if let Some(&position) = self.positions.get(key) {
            return position;
        }
        let position = self.keys.len();
        self.keys.push(key.to_string());
        self.positions.insert(key.to_string(), position);
        position
    }
}

fn cross_tab<'a, I>(entries: I) -> CrossTab
where
    I: IntoIterator<Item = (&'a str, &'a str, f64)>,
{
    let mut rows = KeyIndex::default();
    let mut columns = KeyIndex::default();
    let mut cells: HashMap<(usize, usize), f64> = HashMap::new();

    for (row, column, weight) in entries {
        let r = rows.position(row);
        let c = columns.position(column);
        *cells.entry((r, c)).or_insert(0.0) += weight;
    }

    let mut values = vec![vec![0.0; columns.keys.len()]; rows.keys.len()];
    for ((r, c), value) in cells {
        values[r][c] = value;
    }

    CrossTab {
        rows: rows.keys,
        columns: columns.keys,
        values,
    }
}

/// Distinct sessions and total play time per region. Play time is summed over
/// every row, so a session id that repeats contributes its duration each time
/// but is counted once.
pub fn region_session_summary(sessions: &[SessionRecord]) -> Vec<RegionSummary> {
    let mut regions = KeyIndex::default();
    let mut session_ids: Vec<HashSet<&str>> = Vec::new();
    let mut play_time: Vec<f64> = Vec::new();

    for session in sessions {
        let index = regions.position(&session.region);
        if index == session_ids.len() {
            session_ids.push(HashSet::new());
            play_time.push(0.0);
        }
        session_ids[index].insert(&session.session_id);
        play_time[index] += session.play_time;
    }

    regions
        .keys
        .into_iter()
        .zip(session_ids.iter().zip(play_time))
        .map(|(region, (ids, total))| RegionSummary {
            region,
            distinct_sessions: ids.len() as u64,
            total_play_time: total,
        })
        .collect()
}

pub fn region_user_counts(users: &[UserRecord]) -> Vec<RegionCount> {
    let mut regions = KeyIndex::default();
    let mut counts: Vec<u64> = Vec::new();
    for user in users {
        let index = regions.position(&user.region);
        if index == counts.len() {
            counts.push(0);
        }
        counts[index] += 1;
    }

    regions
        .keys
        .into_iter()
        .zip(counts)
        .map(|(region, users)| RegionCount { region, users })
        .collect()
}

pub fn region_age_counts(users: &[UserRecord]) -> CrossTab {
    cross_tab(
        users
            .iter()
            .map(|user| (user.region.as_str(), user.age_range.as_str(), 1.0)),
    )
}

pub fn region_gender_counts(users: &[UserRecord]) -> CrossTab {
    cross_tab(
        users
            .iter()
            .map(|user| (user.region.as_str(), user.gender.as_str(), 1.0)),
    )
}

pub fn region_genre_counts(genres: &[GenreRecord]) -> CrossTab {
    cross_tab(
        genres
            .iter()
            .map(|row| (row.region.as_str(), row.genre.as_str(), row.session_count)),
    )
}

/// Session rows per day and region. Days are ascending so the series plots in order.
pub fn daily_region_counts(sessions: &[SessionRecord]) -> CrossTab {
    let mut by_day: BTreeMap<NaiveDate, Vec<&SessionRecord>> = BTreeMap::new();
    for session in sessions {
        by_day.entry(session.date).or_default().push(session);
    }

    // Region columns keep their first appearance in the file, not in date order.
    let mut regions = KeyIndex::default();
    for session in sessions {
        regions.position(&session.region);
    }

    let mut rows = Vec::with_capacity(by_day.len());
    let mut values = Vec::with_capacity(by_day.len());
    for (date, day_sessions) in by_day {
        let mut counts = vec![0.0; regions.keys.len()];
        for session in day_sessions {
            counts[regions.position(&session.region)] += 1.0;
        }
        rows.push(date.format("%Y-%m-%d").to_string());
        values.push(counts);
    }

    CrossTab {
        rows,
        columns: regions.keys,
        values,
    }
}
