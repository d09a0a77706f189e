use chrono::Local;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::adapters::{Geolocator, MapAdapter, MapHandle, Ui, ViewOptions};
use crate::dlog;
use crate::error::{TrailError, TrailResult};
use crate::render;
use crate::types::{ActivityKind, Coords, FormInput, Workout, WorkoutId};
use crate::validation::{check, parse_field};

pub const DEFAULT_ZOOM: u8 = 13;

const LOCATION_ALERT: &str = "We can't get your location 😩";
const INVALID_INPUT_ALERT: &str = "The value must be a positive number!";

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    LocationResolved(Coords),
    LocationFailed(String),
    MapClicked(Coords),
    ActivityTypeChanged(String),
    FormSubmitted(FormInput),
    /// A list entry was clicked; carries the entry's id as text.
    WorkoutSelected(String),
}

/// Sending half of the controller's event channel.
#[derive(Debug, Clone)]
pub struct EventSink(Sender<Event>);

impl EventSink {
    /// Returns false once the controller is gone.
    pub fn send(&self, event: Event) -> bool {
        self.0.send(event).is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionState {
    AwaitingLocation,
    /// No map for the rest of the session.
    Unavailable,
    MapReady,
    FormOpen { pending: Coords },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    pub zoom: u8,
    pub pan_duration_secs: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            pan_duration_secs: 1.0,
        }
    }
}

pub struct Controller<M, U> {
    config: ControllerConfig,
    map: M,
    ui: U,
    state: SessionState,
    map_handle: Option<MapHandle>,
    location_requested: bool,
    workouts: Vec<Workout>,
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl<M: MapAdapter, U: Ui> Controller<M, U> {
    pub fn new(map: M, ui: U, config: ControllerConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            config,
            map,
            ui,
            state: SessionState::AwaitingLocation,
            map_handle: None,
            location_requested: false,
            workouts: Vec::new(),
            tx,
            rx,
        }
    }

    pub fn sink(&self) -> EventSink {
        EventSink(self.tx.clone())
    }

    /// Issue the single location request for this session.
    pub fn start<G: Geolocator + ?Sized>(&mut self, locator: &mut G) {
        if self.location_requested {
            tracing::warn!(state = ?self.state, "session already started");
            return;
        }
        self.location_requested = true;
        tracing::info!("requesting current position");
        locator.request(self.sink());
    }

    /// Handle every event queued so far. Returns how many were handled.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut handled = 0usize;
        while let Ok(event) = self.rx.try_recv() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    pub fn handle(&mut self, event: Event) {
        dlog!("event={event:?} state={:?}", self.state);

        let outcome = match event {
            Event::LocationResolved(coords) => self.load_map(coords),
            Event::LocationFailed(reason) => self.location_failed(reason),
            Event::MapClicked(coords) => {
                self.show_form(coords);
                Ok(())
            }
            Event::ActivityTypeChanged(kind) => self.toggle_metric_field(&kind),
            Event::FormSubmitted(input) => self.new_workout(&input),
            Event::WorkoutSelected(id) => self.move_to_workout(&id),
        };

        if let Err(e) = outcome {
            self.report(&e);
        }
    }

    pub const fn state(&self) -> SessionState {
        self.state
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub const fn map(&self) -> &M {
        &self.map
    }

    pub const fn ui(&self) -> &U {
        &self.ui
    }

    pub fn find(&self, raw_id: &str) -> TrailResult<&Workout> {
        let id: WorkoutId = raw_id.parse()?;
        self.workouts
            .iter()
            .find(|w| w.id() == id)
            .ok_or_else(|| TrailError::UnresolvedIdentity(raw_id.to_string()))
    }

    fn report(&mut self, err: &TrailError) {
        match err {
            TrailError::LocationUnavailable(_) => {
                tracing::error!(err = %err, "no map for this session");
                self.ui.alert(LOCATION_ALERT);
            }
            TrailError::InvalidInput(_) | TrailError::UnknownActivity(_) => {
                tracing::warn!(err = %err, "workout rejected");
                self.ui.alert(INVALID_INPUT_ALERT);
            }
            TrailError::UnresolvedIdentity(_) => {
                tracing::debug!(err = %err, "ignoring list click");
            }
        }
    }

    fn load_map(&mut self, coords: Coords) -> TrailResult<()> {
        if self.state != SessionState::AwaitingLocation {
            tracing::warn!(state = ?self.state, "late location result ignored");
            return Ok(());
        }

        let handle = match self.map.create_map(coords, self.config.zoom) {
            Ok(h) => h,
            Err(e) => {
                self.state = SessionState::Unavailable;
                return Err(TrailError::LocationUnavailable(format!(
                    "map could not be created: {e:#}"
                )));
            }
        };
        self.map.on_click(handle, self.sink());
        self.map_handle = Some(handle);
        self.state = SessionState::MapReady;

        tracing::info!(center = %coords, zoom = self.config.zoom, "map ready");
        Ok(())
    }

    fn location_failed(&mut self, reason: String) -> TrailResult<()> {
        if self.state != SessionState::AwaitingLocation {
            tracing::warn!(state = ?self.state, "late location failure ignored");
            return Ok(());
        }
        self.state = SessionState::Unavailable;
        Err(TrailError::LocationUnavailable(reason))
    }

    fn show_form(&mut self, coords: Coords) {
        match self.state {
            SessionState::MapReady | SessionState::FormOpen { .. } => {
                self.state = SessionState::FormOpen { pending: coords };
                self.ui.show();
                dlog!("form open at {coords}");
            }
            SessionState::AwaitingLocation | SessionState::Unavailable => {
                tracing::warn!(state = ?self.state, "map click without a map ignored");
            }
        }
    }

    fn toggle_metric_field(&mut self, raw_kind: &str) -> TrailResult<()> {
        match raw_kind.parse::<ActivityKind>() {
            Ok(kind) => self.ui.show_metric_field(kind),
            Err(e) => tracing::warn!(err = %e, "activity selector ignored"),
        }
        Ok(())
    }

    fn new_workout(&mut self, input: &FormInput) -> TrailResult<()> {
        let SessionState::FormOpen { pending } = self.state else {
            tracing::warn!(state = ?self.state, "form submitted without a map click");
            return Ok(());
        };
        let Some(handle) = self.map_handle else {
            tracing::warn!("form submitted without a map");
            return Ok(());
        };

        let kind: ActivityKind = input.kind.parse()?;
        let extra = match kind {
            ActivityKind::Running => &input.cadence,
            ActivityKind::Cycling => &input.elevation,
        };
        let v = check(
            kind,
            parse_field(&input.distance),
            parse_field(&input.duration),
            parse_field(extra),
        )?;

        let id = WorkoutId::new();
        let date = Local::now();
        let workout = match kind {
            ActivityKind::Running => {
                Workout::running(id, pending, v.distance, v.duration, v.extra, date)
            }
            ActivityKind::Cycling => {
                Workout::cycling(id, pending, v.distance, v.duration, v.extra, date)
            }
        };

        tracing::info!(
            id = %workout.id(),
            kind = %kind,
            at = %pending,
            distance_km = v.distance,
            duration_min = v.duration,
            metric = workout.metric().value,
            "workout logged"
        );

        self.workouts.push(workout);
        if let Some(w) = self.workouts.last() {
            render::render_workout(&mut self.map, handle, &mut self.ui, w);
        }

        self.ui.clear_and_hide();
        self.state = SessionState::MapReady;
        Ok(())
    }

    fn move_to_workout(&mut self, raw_id: &str) -> TrailResult<()> {
        let Some(handle) = self.map_handle else {
            dlog!("list click before map ready id={raw_id}");
            return Ok(());
        };
        let coords = self.find(raw_id)?.coords();

        let options = ViewOptions {
            animate: true,
            pan_duration_secs: self.config.pan_duration_secs,
        };
        if let Err(e) = self
            .map
            .set_view(handle, coords, self.config.zoom, options)
        {
            tracing::warn!(id = raw_id, err = %format!("{e:#}"), "pan failed");
        }
        Ok(())
    }
}
