use crate::activity::model::{Activity, SportFamily};

/// One metric the stats block can show.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum StatField {
    Distance,
    Time,
    Pace,
    Elev,
}

impl StatField {
    /// Display order inside every stats layout.
    pub const ALL: [StatField; 4] = [
        StatField::Distance,
        StatField::Time,
        StatField::Pace,
        StatField::Elev,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatField::Distance => "distance",
            StatField::Time => "time",
            StatField::Pace => "pace",
            StatField::Elev => "elev",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "distance" => Some(StatField::Distance),
            "time" => Some(StatField::Time),
            "pace" => Some(StatField::Pace),
            "elev" => Some(StatField::Elev),
            _ => None,
        }
    }
}

/// Per-field visibility toggles for the stats block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StatsVisibility {
    pub distance: bool,
    pub time: bool,
    pub pace: bool,
    pub elev: bool,
}

impl Default for StatsVisibility {
    fn default() -> Self {
        Self {
            distance: true,
            time: true,
            pace: true,
            elev: false,
        }
    }
}

impl StatsVisibility {
    pub fn get(&self, field: StatField) -> bool {
        match field {
            StatField::Distance => self.distance,
            StatField::Time => self.time,
            StatField::Pace => self.pace,
            StatField::Elev => self.elev,
        }
    }

    pub fn set(&mut self, field: StatField, on: bool) {
        match field {
            StatField::Distance => self.distance = on,
            StatField::Time => self.time = on,
            StatField::Pace => self.pace = on,
            StatField::Elev => self.elev = on,
        }
    }

    /// What the block actually shows for `activity`, regardless of stored toggles.
    ///
    /// Full-stats activities always show distance; time-only activities show exactly `time`.
    pub fn effective(&self, activity: &Activity) -> StatsVisibility {
        if activity.supports_full_stats() {
            StatsVisibility {
                distance: true,
                ..*self
            }
        } else {
            StatsVisibility {
                distance: false,
                time: true,
                pace: false,
                elev: false,
            }
        }
    }

    pub fn fields(&self) -> Vec<StatField> {
        StatField::ALL
            .into_iter()
            .filter(|f| self.get(*f))
            .collect()
    }

    pub fn count(&self) -> usize {
        StatField::ALL.iter().filter(|f| self.get(**f)).count()
    }
}

/// A metric rendered into label/value/unit strings.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct FormattedStat {
    pub field: StatField,
    pub label: String,
    pub value: String,
    pub unit: String,
}

impl FormattedStat {
    /// `value` and `unit` joined the way compact layouts print them.
    pub fn inline_text(&self) -> String {
        if self.unit.is_empty() {
            self.value.clone()
        } else if self.unit.starts_with('/') {
            format!("{}{}", self.value, self.unit)
        } else {
            format!("{} {}", self.value, self.unit)
        }
    }
}

pub fn format_stat(field: StatField, activity: &Activity) -> FormattedStat {
    let family = activity.sport_family();
    let (label, value, unit) = match field {
        StatField::Distance => ("Distance", format!("{:.2}", activity.distance.max(0.0) / 1000.0), "km"),
        StatField::Time => ("Time", format_duration(activity.duration_secs()), ""),
        StatField::Pace => match family {
            SportFamily::Cycle => ("Speed", format!("{:.1}", speed_kmh(activity)), "km/h"),
            SportFamily::Water => ("Pace", format_pace(activity, 100.0), "/100m"),
            _ => ("Pace", format_pace(activity, 1000.0), "/km"),
        },
        StatField::Elev => (
            "Elevation",
            format!("{:.0}", activity.total_elevation_gain.max(0.0)),
            "m",
        ),
    };
    FormattedStat {
        field,
        label: label.to_string(),
        value,
        unit: unit.to_string(),
    }
}

/// Format every field that is visible after applying the activity's stat policy.
pub fn visible_stats(visibility: &StatsVisibility, activity: &Activity) -> Vec<FormattedStat> {
    visibility
        .effective(activity)
        .fields()
        .into_iter()
        .map(|f| format_stat(f, activity))
        .collect()
}

/// `25:13` below an hour, `1:02:03` above.
pub fn format_duration(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

fn format_pace(activity: &Activity, per_meters: f64) -> String {
    let secs = activity.duration_secs() as f64;
    if activity.distance <= 0.0 || secs <= 0.0 {
        return "--:--".to_string();
    }
    let pace = (secs / (activity.distance / per_meters)).round() as u64;
    format!("{}:{:02}", pace / 60, pace % 60)
}

fn speed_kmh(activity: &Activity) -> f64 {
    if activity.average_speed > 0.0 {
        return activity.average_speed * 3.6;
    }
    let secs = activity.duration_secs() as f64;
    if secs <= 0.0 {
        return 0.0;
    }
    activity.distance.max(0.0) / secs * 3.6
}

#[cfg(test)]
#[path = "../../tests/unit/activity/stats.rs"]
mod tests;
