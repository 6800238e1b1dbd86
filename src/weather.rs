use anyhow::Context;
use chrono::{Duration, Local, NaiveDate};

use crate::config::Config;
use crate::models::{ExerciseVideo, Forecast, ForecastEntry, Suggestion};

pub const NO_FORECAST_MESSAGE: &str = "天気情報を取得できませんでした。";

const OUTDOOR_ACTIVITY: &str = "外でウォーキングやランニングをしましょう！";
const INDOOR_STRETCH: &str = "室内でストレッチやヨガをしましょう。";
const INDOOR_CARDIO: &str = "室内で踏み台昇降などの有酸素運動をしましょう。";

const CLEAR_MARKERS: &[&str] = &["晴", "曇", "雲", "clear", "cloud"];
const RAIN_MARKERS: &[&str] = &["雨", "rain"];

const RUNNING_VIDEO: ExerciseVideo = ExerciseVideo {
    title: "初心者向けランニングフォーム",
    url: "https://www.youtube.com/results?search_query=%E3%83%A9%E3%83%B3%E3%83%8B%E3%83%B3%E3%82%B0+%E5%88%9D%E5%BF%83%E8%80%85",
};
const YOGA_VIDEO: ExerciseVideo = ExerciseVideo {
    title: "自宅でできるヨガとストレッチ",
    url: "https://www.youtube.com/results?search_query=%E3%83%A8%E3%82%AC+%E3%82%B9%E3%83%88%E3%83%AC%E3%83%83%E3%83%81",
};
const CARDIO_VIDEO: ExerciseVideo = ExerciseVideo {
    title: "室内でできる有酸素運動",
    url: "https://www.youtube.com/results?search_query=%E5%AE%A4%E5%86%85+%E6%9C%89%E9%85%B8%E7%B4%A0%E9%81%8B%E5%8B%95",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherKind {
    ClearOrCloudy,
    Rain,
    Other,
}

impl WeatherKind {
    /// Clear/cloudy markers win over rain when a description carries both.
    pub fn classify(description: &str) -> Self {
        let lowered = description.to_lowercase();
        if CLEAR_MARKERS.iter().any(|m| lowered.contains(m)) {
            WeatherKind::ClearOrCloudy
        } else if RAIN_MARKERS.iter().any(|m| lowered.contains(m)) {
            WeatherKind::Rain
        } else {
            WeatherKind::Other
        }
    }

    pub fn activity(self) -> &'static str {
        match self {
            WeatherKind::ClearOrCloudy => OUTDOOR_ACTIVITY,
            WeatherKind::Rain => INDOOR_STRETCH,
            WeatherKind::Other => INDOOR_CARDIO,
        }
    }
}

pub fn tomorrow() -> NaiveDate {
    (Local::now() + Duration::days(1)).date_naive()
}

fn is_on(entry: &ForecastEntry, date: NaiveDate) -> bool {
    entry
        .dt_txt
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        == Some(date)
}

/// Picks the video by scanning the suggestion text itself.
pub fn video_for(text: &str) -> ExerciseVideo {
    if text.contains("ウォーキング") || text.contains("ランニング") {
        RUNNING_VIDEO
    } else if text.contains("ヨガ") || text.contains("ストレッチ") {
        YOGA_VIDEO
    } else {
        CARDIO_VIDEO
    }
}

/// Description of the first forecast entry dated `date`.
pub fn description_on(forecast: &Forecast, date: NaiveDate) -> Option<&str> {
    forecast
        .list
        .iter()
        .find(|entry| is_on(entry, date))
        .and_then(|entry| entry.weather.first())
        .map(|condition| condition.description.as_str())
}

fn suggestion_for(description: &str) -> Suggestion {
    let activity = WeatherKind::classify(description).activity();
    let text = format!("明日の天気は「{description}」です。\n{activity}");
    let video = Some(video_for(&text));
    Suggestion { text, video }
}

fn unavailable() -> Suggestion {
    Suggestion {
        text: NO_FORECAST_MESSAGE.to_string(),
        video: None,
    }
}

pub fn suggest(forecast: &Forecast, date: NaiveDate) -> Suggestion {
    description_on(forecast, date).map_or_else(unavailable, suggestion_for)
}

pub struct WeatherClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl WeatherClient {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            http: config.http_client()?,
            endpoint: format!("{}/forecast", config.weather_base_url.trim_end_matches('/')),
            api_key: config.weather_key()?.to_string(),
        })
    }

    pub async fn fetch_forecast(&self, city: &str) -> anyhow::Result<Forecast> {
        tracing::debug!(endpoint = %self.endpoint, city, "requesting forecast");
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", "ja"),
            ])
            .send()
            .await
            .with_context(|| format!("forecast request for {city} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("forecast service returned {status}: {body}");
        }

        response
            .json()
            .await
            .context("forecast service returned malformed JSON")
    }

    pub async fn fetch_suggestion(&self, city: &str) -> anyhow::Result<Suggestion> {
        let forecast = self.fetch_forecast(city).await?;
        let date = tomorrow();
        if description_on(&forecast, date).is_none() {
            tracing::warn!(city, %date, entries = forecast.list.len(), "no forecast entry for tomorrow");
        }
        Ok(suggest(&forecast, date))
    }
}
