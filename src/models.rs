use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of exercise metrics. `date` is the natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyHealthRecord {
    pub date: NaiveDate,
    pub steps: u32,
    pub active_minutes: u32,
    pub distance: f64,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub steps: u32,
    pub active: u32,
    pub distance: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendSummary {
    pub days_logged: usize,
    pub average_score: f64,
    pub best: DailyHealthRecord,
    pub worst: DailyHealthRecord,
    pub latest: DailyHealthRecord,
    pub change_from_previous: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastEntry {
    pub dt_txt: String,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherCondition {
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseVideo {
    pub title: &'static str,
    pub url: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub text: String,
    pub video: Option<ExerciseVideo>,
}
