//! Core domain types for the GreenTrack client.
//!
//! This module defines the types exchanged with the backend:
//! - Impact metrics and entries
//! - Aggregate statistics
//! - Account and authentication payloads
//! - AI suggestion payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Metric Types
// ============================================================================

/// Kind of environmental metric an entry measures
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Carbon,
    Water,
    Energy,
    Digital,
}

impl MetricType {
    /// All metric kinds, in display order
    pub const ALL: [MetricType; 4] = [
        MetricType::Carbon,
        MetricType::Water,
        MetricType::Energy,
        MetricType::Digital,
    ];

    /// Wire name of this metric (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Carbon => "carbon",
            MetricType::Water => "water",
            MetricType::Energy => "energy",
            MetricType::Digital => "digital",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "carbon" => Ok(MetricType::Carbon),
            "water" => Ok(MetricType::Water),
            "energy" => Ok(MetricType::Energy),
            "digital" => Ok(MetricType::Digital),
            other => Err(crate::Error::Validation(format!(
                "Unknown metric type: {} (expected carbon, water, energy or digital)",
                other
            ))),
        }
    }
}

/// Entry listing filter. `All` is the unfiltered sentinel and produces the
/// same request as no filter at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MetricFilter {
    #[default]
    All,
    Only(MetricType),
}

impl FromStr for MetricFilter {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(MetricFilter::All)
        } else {
            Ok(MetricFilter::Only(s.parse()?))
        }
    }
}

// ============================================================================
// Impact Entries
// ============================================================================

/// One recorded measurement, as returned by the backend
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ImpactEntry {
    pub id: i64,
    pub metric_type: MetricType,
    pub value: f64,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating (or replacing) an entry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewEntry {
    pub metric_type: MetricType,
    pub value: f64,
    pub description: String,
}

// ============================================================================
// Statistics
// ============================================================================

/// Per-metric aggregate line of the stats response
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MetricBreakdown {
    pub metric_type: MetricType,
    #[serde(default)]
    pub total_value: f64,
    #[serde(default)]
    pub avg_value: f64,
    #[serde(default)]
    pub count: u64,
}

/// Server-computed aggregate over the user's entries.
///
/// Deployed backend versions disagree on which fields they include, so
/// every field tolerates being absent. The client never computes these
/// itself; after any entry mutation it refetches.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct StatsSummary {
    #[serde(default)]
    pub total_entries: u64,
    #[serde(default)]
    pub recent_entries: u64,
    #[serde(default)]
    pub recent_activity: u64,
    #[serde(default)]
    pub total_carbon: f64,
    #[serde(default)]
    pub total_water: f64,
    #[serde(default)]
    pub total_energy: f64,
    #[serde(default)]
    pub metric_breakdown: Vec<MetricBreakdown>,
}

impl StatsSummary {
    /// Total recorded value for one metric.
    ///
    /// Prefers the per-metric breakdown; falls back to the flat totals that
    /// older backends return.
    pub fn total_for(&self, metric: MetricType) -> f64 {
        if let Some(line) = self
            .metric_breakdown
            .iter()
            .find(|line| line.metric_type == metric)
        {
            return line.total_value;
        }
        match metric {
            MetricType::Carbon => self.total_carbon,
            MetricType::Water => self.total_water,
            MetricType::Energy => self.total_energy,
            MetricType::Digital => 0.0,
        }
    }
}

// ============================================================================
// Account Types
// ============================================================================

/// Account information from the profile endpoint.
///
/// Only `username` and `email` are guaranteed; the rest depends on which
/// backend build is serving.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

/// Login payload. The backend also accepts an email address in `username`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Registration payload
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Response to login and registration.
///
/// Login always carries `access`; registration may return only the created
/// user, depending on the backend build.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Password change payload
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Password reset request payload
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Password reset confirmation payload, using the uid and token from the
/// reset email
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PasswordResetConfirmRequest {
    pub uid: String,
    pub token: String,
    pub new_password: String,
}

/// Plain acknowledgement from message-only endpoints
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// AI Suggestions
// ============================================================================

/// One generated suggestion
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub effort: String,
}

/// Response from the suggestions endpoint
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    #[serde(default)]
    pub data_points_analyzed: u64,
}
