use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// One completed tracking session.
///
/// `date` is the local calendar date of `end_time` captured when the record
/// was created. It is stored rather than recomputed so that bucketing does not
/// move if the device timezone changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeColor {
    #[default]
    Pink,
    Blue,
    Green,
}

// Unknown names fall back to the default so one bad field cannot void the
// rest of a stored settings payload.
impl<'de> Deserialize<'de> for ThemeColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(ThemeColor::parse(&value).unwrap_or_else(|| {
            warn!(theme = %value, "unknown theme color, using default");
            ThemeColor::default()
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub ring: &'static str,
    pub chart: &'static str,
}

impl ThemeColor {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pink" => Some(ThemeColor::Pink),
            "blue" => Some(ThemeColor::Blue),
            "green" => Some(ThemeColor::Green),
            _ => None,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            ThemeColor::Pink => Palette {
                primary: "oklch(0.75 0.15 340)",
                secondary: "oklch(0.78 0.12 180)",
                accent: "oklch(0.92 0.05 340)",
                ring: "oklch(0.75 0.15 340)",
                chart: "oklch(0.75 0.15 340)",
            },
            ThemeColor::Blue => Palette {
                primary: "oklch(0.65 0.2 250)",
                secondary: "oklch(0.75 0.15 200)",
                accent: "oklch(0.92 0.05 250)",
                ring: "oklch(0.65 0.2 250)",
                chart: "oklch(0.65 0.2 250)",
            },
            ThemeColor::Green => Palette {
                primary: "oklch(0.7 0.15 150)",
                secondary: "oklch(0.75 0.12 180)",
                accent: "oklch(0.92 0.05 150)",
                ring: "oklch(0.7 0.15 150)",
                chart: "oklch(0.7 0.15 150)",
            },
        }
    }
}

/// Per-device preferences. Missing fields in a stored payload take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub theme_color: ThemeColor,
    pub reminder_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    pub vibration_enabled: bool,
    pub sound_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: None,
            avatar: None,
            theme_color: ThemeColor::Pink,
            reminder_enabled: false,
            reminder_time: None,
            vibration_enabled: true,
            sound_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodMode {
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_count: u64,
    pub total_duration: u64,
    pub average_duration: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    pub total_count: u64,
    pub total_duration: u64,
    pub avg_duration: u64,
    pub dates_with_records: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub total_count: u64,
    pub avg_count: f64,
    pub total_duration: u64,
    pub avg_duration: u64,
    pub longest_duration: u64,
    pub shortest_duration: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub today: Summary,
    pub week: Summary,
    pub month: Summary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOverview {
    pub date: String,
    pub count: u64,
    pub total_duration: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub tracking: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub elapsed_seconds: u64,
    pub elapsed_label: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct StopRequest {
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}
