//! Server-supplied X-ray analysis record and its display helpers.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder rendered for an absent patient name.
pub const NOT_PROVIDED: &str = "Not provided";

/// Label the analysis service uses for a scan with no findings.
pub const NORMAL_LABEL: &str = "Normal";

/// One X-ray analysis as returned by `GET /api/analysis/{reference}`.
///
/// Optional fields are `None` when the key is missing, `null`, or an empty
/// string, so rendering only ever checks for presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: String,
    pub reference_number: String,
    pub image_url: String,
    pub analysis_result: String,
    /// Model confidence in [0, 1].
    pub confidence_score: f64,
    /// ISO 8601 timestamp.
    pub created_at: String,
    pub doctor_name: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub pneumonia_type: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub severity: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub recommended_action: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub patient_name: Option<String>,
}

/// Diagnosis classification used for colouring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding<'a> {
    Normal,
    Abnormal(&'a str),
}

impl AnalysisResult {
    pub fn finding(&self) -> Finding<'_> {
        if self.analysis_result == NORMAL_LABEL {
            Finding::Normal
        } else {
            Finding::Abnormal(&self.analysis_result)
        }
    }

    pub fn is_normal(&self) -> bool {
        self.finding() == Finding::Normal
    }

    /// Confidence as a percentage with one decimal place, e.g. `97.0%`.
    /// Ties round away from zero (`0.5625` is `56.3%`).
    pub fn confidence_percent(&self) -> String {
        let tenths = (self.confidence_score * 100.0 * 10.0).round() / 10.0;
        format!("{tenths:.1}%")
    }

    /// `Confidence: 97.0%`
    pub fn confidence_label(&self) -> String {
        format!("Confidence: {}", self.confidence_percent())
    }

    pub fn patient_name_or_placeholder(&self) -> &str {
        self.patient_name.as_deref().unwrap_or(NOT_PROVIDED)
    }

    /// Analysis date in the local time zone.
    pub fn display_date(&self) -> String {
        self.display_date_in(&Local)
    }

    /// Analysis date as `YYYY-MM-DD` in `tz`. Falls back to the raw string
    /// when the timestamp is not ISO 8601.
    pub fn display_date_in<Tz: TimeZone>(&self, tz: &Tz) -> String {
        let raw = self.created_at.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return dt.with_timezone(tz).date_naive().to_string();
        }
        // Timestamps without an offset are taken as UTC.
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return tz.from_utc_datetime(&naive).date_naive().to_string();
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return date.to_string();
        }
        raw.to_string()
    }
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
