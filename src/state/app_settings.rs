use bracket_engine::store::default_data_dir;
use chrono::{Datelike, Local};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    /// Saved brackets live in `<data_dir>/brackets`, exports in `<data_dir>/exports`.
    pub data_dir: PathBuf,
    /// Year stamped on brackets created with `n`.
    pub default_year: u16,
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let log_level = var("PBTUI_LOG").and_then(|v| v.parse::<LevelFilter>().ok());
        let data_dir = var("PBTUI_DATA_DIR").map(PathBuf::from).unwrap_or_else(default_data_dir);
        let default_year = var("PBTUI_YEAR")
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or_else(|| Local::now().year() as u16);

        Self { full_screen: false, log_level, data_dir, default_year }
    }
}
