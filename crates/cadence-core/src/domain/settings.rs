use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;

/// How often auto-allocated posts go out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostFrequency {
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "every-other-day")]
    EveryOtherDay,
    /// Monday, Wednesday and Friday.
    #[serde(rename = "3x-week")]
    ThreeTimesWeekly,
    /// Weekdays only.
    #[serde(rename = "5x-week")]
    FiveTimesWeekly,
}

impl PostFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostFrequency::Daily => "daily",
            PostFrequency::EveryOtherDay => "every-other-day",
            PostFrequency::ThreeTimesWeekly => "3x-week",
            PostFrequency::FiveTimesWeekly => "5x-week",
        }
    }
}

impl fmt::Display for PostFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostFrequency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(PostFrequency::Daily),
            "every-other-day" => Ok(PostFrequency::EveryOtherDay),
            "3x-week" => Ok(PostFrequency::ThreeTimesWeekly),
            "5x-week" => Ok(PostFrequency::FiveTimesWeekly),
            other => Err(DomainError::Validation(format!(
                "unknown post frequency '{other}'"
            ))),
        }
    }
}

/// Local time of day posts go out at, written `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferredTime(NaiveTime);

impl PreferredTime {
    pub fn new(time: NaiveTime) -> Self {
        Self(time)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl FromStr for PreferredTime {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(Self)
            .map_err(|_| DomainError::Validation(format!("preferred time '{s}' is not HH:MM")))
    }
}

impl fmt::Display for PreferredTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for PreferredTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PreferredTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Posting settings - a single row per installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub post_frequency: PostFrequency,
    pub preferred_time: PreferredTime,
    pub timezone: Tz,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            post_frequency: PostFrequency::Daily,
            preferred_time: PreferredTime(NaiveTime::MIN + chrono::Duration::hours(14)),
            timezone: chrono_tz::America::New_York,
        }
    }
}

impl Settings {
    /// Apply a partial update. Every field is validated before anything changes.
    pub fn apply(&self, patch: &SettingsPatch) -> Result<Settings, DomainError> {
        let post_frequency = match &patch.post_frequency {
            Some(raw) => raw.parse()?,
            None => self.post_frequency,
        };
        let preferred_time = match &patch.preferred_time {
            Some(raw) => raw.parse()?,
            None => self.preferred_time,
        };
        let timezone = match &patch.timezone {
            Some(raw) => parse_timezone(raw)?,
            None => self.timezone,
        };

        Ok(Settings {
            post_frequency,
            preferred_time,
            timezone,
        })
    }
}

pub fn parse_timezone(raw: &str) -> Result<Tz, DomainError> {
    raw.trim()
        .parse::<Tz>()
        .map_err(|_| DomainError::Validation(format!("unknown timezone '{raw}'")))
}

/// Partial settings update as submitted by a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub post_frequency: Option<String>,
    pub preferred_time: Option<String>,
    pub timezone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.post_frequency, PostFrequency::Daily);
        assert_eq!(settings.preferred_time.to_string(), "14:00");
        assert_eq!(settings.timezone.name(), "America/New_York");
    }

    #[test]
    fn test_partial_update_keeps_untouched_fields() {
        let patch = SettingsPatch {
            post_frequency: Some("3x-week".into()),
            ..Default::default()
        };
        let updated = Settings::default().apply(&patch).unwrap();
        assert_eq!(updated.post_frequency, PostFrequency::ThreeTimesWeekly);
        assert_eq!(updated.preferred_time.to_string(), "14:00");
    }

    #[test]
    fn test_invalid_patch_is_rejected_whole() {
        let patch = SettingsPatch {
            post_frequency: Some("weekly".into()),
            preferred_time: Some("09:30".into()),
            timezone: None,
        };
        assert!(matches!(
            Settings::default().apply(&patch),
            Err(DomainError::Validation(_))
        ));

        let patch = SettingsPatch {
            timezone: Some("Mars/Olympus".into()),
            ..Default::default()
        };
        assert!(Settings::default().apply(&patch).is_err());

        let patch = SettingsPatch {
            preferred_time: Some("25:00".into()),
            ..Default::default()
        };
        assert!(Settings::default().apply(&patch).is_err());
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["post_frequency"], "daily");
        assert_eq!(json["preferred_time"], "14:00");
        assert_eq!(json["timezone"], "America/New_York");

        let freq: PostFrequency = serde_json::from_str("\"5x-week\"").unwrap();
        assert_eq!(freq, PostFrequency::FiveTimesWeekly);
    }
}
