use crate::aggregate::{
    daily_region_counts, region_age_counts, region_gender_counts, region_genre_counts,
    region_session_summary, region_user_counts,
};
use crate::figures::{
    age_figure, daily_sessions_figure, gender_figure, genre_figure, region_share_figure,
    summary_figure, Figure,
};
use crate::loader::session_date_range;
use crate::models::{Datasets, RegionSummary, SummaryField};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Figures {
    pub region_share: Figure,
    pub age: Figure,
    pub gender: Figure,
    pub genre: Figure,
    pub daily_sessions: Figure,
    pub summary: Figure,
}

/// Everything the UI reads, computed once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub title: String,
    pub datasets: Datasets,
    pub region_summary: Vec<RegionSummary>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub figures: Figures,
}

impl Dashboard {
    pub fn build(title: impl Into<String>, datasets: Datasets) -> Self {
        let region_summary = region_session_summary(&datasets.sessions);
        let figures = Figures {
            region_share: region_share_figure(&region_user_counts(&datasets.users)),
            age: age_figure(&region_age_counts(&datasets.users)),
            gender: gender_figure(&region_gender_counts(&datasets.users)),
            genre: genre_figure(&region_genre_counts(&datasets.genres)),
            daily_sessions: daily_sessions_figure(&daily_region_counts(&datasets.sessions)),
            summary: summary_figure(&region_summary, SummaryField::default()),
        };

        Self {
            title: title.into(),
            date_range: session_date_range(&datasets.sessions),
            region_summary,
            figures,
            datasets,
        }
    }

    pub fn summary_figure(&self, field: SummaryField) -> Figure {
        summary_figure(&self.region_summary, field)
    }

    pub fn date_range_label(&self) -> String {
        match self.date_range {
            Some((min, max)) => format!("{min} to {max}"),
            None => "no sessions".to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::{GenreRecord, PopularityTable, Row, SessionRecord, UserRecord};
    use serde_json::json;

    pub fn datasets() -> Datasets {
        let users = [
            ("1", "UK", "18-24", "F"),
            ("2", "UK", "25-34", "M"),
            ("3", "Wales", "18-24", "F"),
        ]
        .into_iter()
        .map(|(id, region, age, gender)| UserRecord {
            user_id: id.into(),
            region: region.into(),
            age_range: age.into(),
            gender: gender.into(),
        })
        .collect();

        let sessions = [
            ("s1", (2020, 1, 2), "UK", 10.0),
            ("s2", (2020, 1, 1), "UK", 5.0),
            ("s1", (2020, 1, 2), "UK", 10.0),
            ("s3", (2020, 1, 1), "Wales", 4.0),
        ]
        .into_iter()
        .map(|(id, (y, m, d), region, play_time)| SessionRecord {
            session_id: id.into(),
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            region: region.into(),
            play_time,
        })
        .collect();

        let genres = vec![
            GenreRecord { region: "UK".into(), genre: "Drama".into(), session_count: 3.0 },
            GenreRecord { region: "Wales".into(), genre: "News".into(), session_count: 2.0 },
        ];

        let rows: Vec<Row> = [
            json!({"title": "EastEnders", "rank": 1}),
            json!({"title": "Doctor Who", "rank": 2}),
        ]
        .into_iter()
        .filter_map(|value| value.as_object().cloned())
        .collect();

        Datasets {
            users,
            sessions,
            genres,
            most_popular: PopularityTable {
                columns: vec!["title".into(), "rank".into()],
                rows,
            },
        }
    }

    pub fn dashboard() -> Dashboard {
        Dashboard::build("Test Dashboard", datasets())
    }
}
