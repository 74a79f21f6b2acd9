use std::{env, path::PathBuf};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_TITLE: &str = "Regional Viewing Analysis";

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetPaths {
    pub user_info: PathBuf,
    pub web_usage: PathBuf,
    pub genres: PathBuf,
    pub most_popular: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub port: u16,
    pub title: String,
    pub paths: DatasetPaths,
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_dir = lookup("DASHBOARD_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let path = |key: &str, file_name: &str| {
            lookup(key)
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join(file_name))
        };

        let paths = DatasetPaths {
            user_info: path("DASHBOARD_USER_INFO", "cleaned_user_info.csv"),
            web_usage: path("DASHBOARD_WEB_USAGE", "cleaned_web_usage.csv"),
            genres: path("DASHBOARD_GENRES", "genre_analysis.csv"),
            most_popular: path("DASHBOARD_MOST_POPULAR", "iplayer_most_popular.csv"),
        };

        let title = lookup("DASHBOARD_TITLE")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        Self { port, title, paths }
    }
}
