use chrono::{DateTime, Utc};

use crate::foundation::core::Point;
use crate::geometry::polyline::decode_path;

/// Read-only activity record in the fitness-API shape.
///
/// Health-data sources are mapped into the same shape by the host before they reach the editor.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Activity {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Meters.
    #[serde(default)]
    pub distance: f64,
    /// Seconds.
    #[serde(default)]
    pub moving_time: u64,
    #[serde(default)]
    pub elapsed_time: u64,
    /// Meters.
    #[serde(default)]
    pub total_elevation_gain: f64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    /// Meters per second.
    #[serde(default)]
    pub average_speed: f64,
    #[serde(default)]
    pub map: ActivityMap,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ActivityMap {
    #[serde(default)]
    pub summary_polyline: Option<String>,
}

/// Broad sport family, used to pick pace vs. speed and which stats make sense.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SportFamily {
    Foot,
    Cycle,
    Water,
    Snow,
    /// Duration-only activities (yoga, strength, ...).
    Other,
}

impl Activity {
    /// Empty record of the given sport type; every metric is zero and there is no route.
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            distance: 0.0,
            moving_time: 0,
            elapsed_time: 0,
            total_elevation_gain: 0.0,
            kind: kind.into(),
            start_date: None,
            average_speed: 0.0,
            map: ActivityMap::default(),
        }
    }

    pub fn sport_family(&self) -> SportFamily {
        let kind = self.kind.trim().to_ascii_lowercase();
        match kind.as_str() {
            "run" | "trailrun" | "virtualrun" | "walk" | "hike" | "wheelchair" | "running"
            | "walking" | "hiking" | "trail_running" => SportFamily::Foot,
            "ride" | "virtualride" | "gravelride" | "mountainbikeride" | "ebikeride"
            | "emountainbikeride" | "velomobile" | "handcycle" | "cycling" | "biking" => {
                SportFamily::Cycle
            }
            "swim" | "rowing" | "kayaking" | "canoeing" | "standuppaddling" | "swimming" => {
                SportFamily::Water
            }
            "nordicski" | "backcountryski" | "inlineskate" | "rollerski" | "skiing" => {
                SportFamily::Snow
            }
            _ => SportFamily::Other,
        }
    }

    /// Distance-based activities get the full stat set; everything else shows time only.
    pub fn supports_full_stats(&self) -> bool {
        self.sport_family() != SportFamily::Other
    }

    /// Moving time, falling back to elapsed time when the source omits it.
    pub fn duration_secs(&self) -> u64 {
        if self.moving_time > 0 {
            self.moving_time
        } else {
            self.elapsed_time
        }
    }

    /// Decoded route in plane coordinates; empty when the activity has no path.
    pub fn path_points(&self) -> Vec<Point> {
        self.map
            .summary_polyline
            .as_deref()
            .map(decode_path)
            .unwrap_or_default()
    }

    /// Any decoded point counts; a single point renders as a dot.
    pub fn has_route(&self) -> bool {
        !self.path_points().is_empty()
    }

    /// Short header date such as `Oct 18, 2026`.
    pub fn display_date(&self) -> Option<String> {
        self.start_date
            .map(|d| d.format("%b %-d, %Y").to_string())
    }
}

fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Num(u64),
        Str(String),
    }

    Ok(match <RawId as serde::Deserialize>::deserialize(deserializer)? {
        RawId::Num(n) => n.to_string(),
        RawId::Str(s) => s,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/activity/model.rs"]
mod tests;
