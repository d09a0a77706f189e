use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;

use crate::adapters::{ListView, MapAdapter, MapHandle, MarkerHandle, PopupOptions};
use crate::types::{ActivityKind, Measure, Workout, WorkoutId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detail {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEntry {
    pub id: WorkoutId,
    pub kind: ActivityKind,
    pub title: String,
    pub details: Vec<Detail>,
}

impl fmt::Display for ListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.title)?;
        for d in &self.details {
            write!(f, "  {} {} {}", d.icon, d.value, d.unit)?;
        }
        Ok(())
    }
}

pub fn popup_content(workout: &Workout) -> String {
    format!("{} {}", workout.kind().icon(), workout.description())
}

pub fn popup_options(kind: ActivityKind) -> PopupOptions {
    PopupOptions {
        max_width: 250,
        min_width: 100,
        auto_close: false,
        close_on_click: false,
        class_name: format!("{kind}-popup"),
    }
}

fn detail(m: Measure, value: String) -> Detail {
    Detail {
        icon: m.icon,
        value,
        unit: m.unit,
    }
}

pub fn list_entry(workout: &Workout) -> ListEntry {
    let kind = workout.kind();
    let metric = workout.metric();
    let secondary = workout.secondary();

    ListEntry {
        id: workout.id(),
        kind,
        title: workout.description().to_string(),
        details: vec![
            Detail {
                icon: kind.icon(),
                value: workout.distance().to_string(),
                unit: "km",
            },
            Detail {
                icon: "⏱",
                value: workout.duration().to_string(),
                unit: "min",
            },
            detail(metric, format!("{:.1}", metric.value)),
            detail(secondary, secondary.value.to_string()),
        ],
    }
}

pub fn render_marker<M: MapAdapter + ?Sized>(
    map: &mut M,
    handle: MapHandle,
    workout: &Workout,
) -> Result<MarkerHandle> {
    let marker = map
        .add_marker(handle, workout.coords())
        .with_context(|| format!("adding marker for workout {}", workout.id()))?;
    map.bind_popup(
        marker,
        &popup_content(workout),
        &popup_options(workout.kind()),
    )
    .context("binding workout popup")?;
    map.open_popup(marker).context("opening workout popup")?;
    Ok(marker)
}

/// Best effort: a failure on one side is logged and does not stop the other.
pub fn render_workout<M, L>(map: &mut M, handle: MapHandle, list: &mut L, workout: &Workout)
where
    M: MapAdapter + ?Sized,
    L: ListView + ?Sized,
{
    if let Err(e) = render_marker(map, handle, workout) {
        tracing::warn!(id = %workout.id(), err = %format!("{e:#}"), "marker render failed");
    }

    if let Err(e) = list.append(list_entry(workout)) {
        tracing::warn!(id = %workout.id(), err = %format!("{e:#}"), "list render failed");
    }
}
