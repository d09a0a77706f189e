use chrono::{DateTime, FixedOffset, TimeZone};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::TrailError;

/// Opaque workout identifier; the only key shared by list entries and markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct WorkoutId(Uuid);

impl WorkoutId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WorkoutId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for WorkoutId {
    type Err = TrailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| TrailError::UnresolvedIdentity(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Running,
    Cycling,
}

impl ActivityKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴‍♀️",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = TrailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" => Ok(Self::Running),
            "cycling" => Ok(Self::Cycling),
            _ => Err(TrailError::UnknownActivity(s.to_string())),
        }
    }
}

/// Variant-specific inputs plus the metric derived from them at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Activity {
    Running { cadence: f64, pace: f64 },
    Cycling { elevation_gain: f64, speed: f64 },
}

/// A value shown next to a workout, with the icon and unit it is displayed with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measure {
    pub icon: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workout {
    id: WorkoutId,
    coords: Coords,
    /// km
    distance: f64,
    /// min
    duration: f64,
    /// Creation time in the user's local offset.
    date: DateTime<FixedOffset>,
    description: String,
    #[serde(flatten)]
    activity: Activity,
}

impl Workout {
    /// Inputs are taken as given; the controller validates them first.
    /// `date` should carry the user's local offset: the description uses its calendar day.
    pub fn running<Tz: TimeZone>(
        id: WorkoutId,
        coords: Coords,
        distance: f64,
        duration: f64,
        cadence: f64,
        date: DateTime<Tz>,
    ) -> Self {
        let pace = duration / distance;
        Self::build(
            id,
            coords,
            distance,
            duration,
            date.fixed_offset(),
            Activity::Running { cadence, pace },
        )
    }

    pub fn cycling<Tz: TimeZone>(
        id: WorkoutId,
        coords: Coords,
        distance: f64,
        duration: f64,
        elevation_gain: f64,
        date: DateTime<Tz>,
    ) -> Self {
        let speed = distance / (duration / 60.0);
        Self::build(
            id,
            coords,
            distance,
            duration,
            date.fixed_offset(),
            Activity::Cycling {
                elevation_gain,
                speed,
            },
        )
    }

    fn build(
        id: WorkoutId,
        coords: Coords,
        distance: f64,
        duration: f64,
        date: DateTime<FixedOffset>,
        activity: Activity,
    ) -> Self {
        let kind = match activity {
            Activity::Running { .. } => ActivityKind::Running,
            Activity::Cycling { .. } => ActivityKind::Cycling,
        };
        Self {
            id,
            coords,
            distance,
            duration,
            description: describe(kind, &date),
            date,
            activity,
        }
    }

    pub const fn id(&self) -> WorkoutId {
        self.id
    }

    pub const fn coords(&self) -> Coords {
        self.coords
    }

    pub const fn distance(&self) -> f64 {
        self.distance
    }

    pub const fn duration(&self) -> f64 {
        self.duration
    }

    pub const fn date(&self) -> DateTime<FixedOffset> {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn activity(&self) -> &Activity {
        &self.activity
    }

    pub fn kind(&self) -> ActivityKind {
        match self.activity {
            Activity::Running { .. } => ActivityKind::Running,
            Activity::Cycling { .. } => ActivityKind::Cycling,
        }
    }

    /// Pace for runs, speed for rides.
    pub fn metric(&self) -> Measure {
        match self.activity {
            Activity::Running { pace, .. } => Measure {
                icon: "⚡️",
                value: pace,
                unit: "min/km",
            },
            Activity::Cycling { speed, .. } => Measure {
                icon: "⚡️",
                value: speed,
                unit: "km/h",
            },
        }
    }

    /// Cadence for runs, elevation gain for rides.
    pub fn secondary(&self) -> Measure {
        match self.activity {
            Activity::Running { cadence, .. } => Measure {
                icon: "🦶🏼",
                value: cadence,
                unit: "spm",
            },
            Activity::Cycling { elevation_gain, .. } => Measure {
                icon: "🗻",
                value: elevation_gain,
                unit: "m",
            },
        }
    }
}

/// "Running on April 14"
fn describe(kind: ActivityKind, date: &DateTime<FixedOffset>) -> String {
    format!("{} on {}", kind.label(), date.format("%B %-d"))
}

/// Raw form fields, exactly as the user typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub kind: String,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}
