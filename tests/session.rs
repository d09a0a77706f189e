//! End-to-end controller behaviour against recording fakes of the page.

use anyhow::{Result, bail};
use trailmark::adapters::{
    FormView, Geolocator, ListView, MapAdapter, MapHandle, MarkerHandle, Notifier, PopupOptions,
    ViewOptions,
};
use trailmark::render::ListEntry;
use trailmark::types::{ActivityKind, FormInput};
use trailmark::{Controller, ControllerConfig, Coords, Event, EventSink, SessionState};

#[derive(Default)]
struct RecordingMap {
    created: Vec<(Coords, u8)>,
    views: Vec<(Coords, u8, ViewOptions)>,
    markers: Vec<Coords>,
    popups: Vec<(String, PopupOptions)>,
    opened: usize,
    clicks: Option<EventSink>,
    fail_markers: bool,
}

impl RecordingMap {
    fn click(&self, coords: Coords) {
        assert!(
            self.clicks.as_ref().expect("click handler").send(Event::MapClicked(coords))
        );
    }
}

impl MapAdapter for RecordingMap {
    fn create_map(&mut self, center: Coords, zoom: u8) -> Result<MapHandle> {
        self.created.push((center, zoom));
        Ok(MapHandle(7))
    }

    fn set_view(
        &mut self,
        map: MapHandle,
        coords: Coords,
        zoom: u8,
        options: ViewOptions,
    ) -> Result<()> {
        assert_eq!(map, MapHandle(7));
        self.views.push((coords, zoom, options));
        Ok(())
    }

    fn on_click(&mut self, _map: MapHandle, sink: EventSink) {
        self.clicks = Some(sink);
    }

    fn add_marker(&mut self, _map: MapHandle, coords: Coords) -> Result<MarkerHandle> {
        if self.fail_markers {
            bail!("tile layer gone");
        }
        self.markers.push(coords);
        Ok(MarkerHandle(u32::try_from(self.markers.len()).unwrap()))
    }

    fn bind_popup(
        &mut self,
        _marker: MarkerHandle,
        content: &str,
        options: &PopupOptions,
    ) -> Result<()> {
        self.popups.push((content.to_string(), options.clone()));
        Ok(())
    }

    fn open_popup(&mut self, _marker: MarkerHandle) -> Result<()> {
        self.opened += 1;
        Ok(())
    }
}

#[derive(Default)]
struct RecordingUi {
    visible: bool,
    shown: usize,
    cleared: usize,
    metric_field: Option<ActivityKind>,
    entries: Vec<ListEntry>,
    alerts: Vec<String>,
}

impl FormView for RecordingUi {
    fn show(&mut self) {
        self.visible = true;
        self.shown += 1;
    }

    fn clear_and_hide(&mut self) {
        self.visible = false;
        self.cleared += 1;
    }

    fn show_metric_field(&mut self, kind: ActivityKind) {
        self.metric_field = Some(kind);
    }
}

impl ListView for RecordingUi {
    fn append(&mut self, entry: ListEntry) -> Result<()> {
        self.entries.push(entry);
        Ok(())
    }
}

impl Notifier for RecordingUi {
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

struct Locator(Option<Coords>);

impl Geolocator for Locator {
    fn request(&mut self, sink: EventSink) {
        match self.0 {
            Some(c) => sink.send(Event::LocationResolved(c)),
            None => sink.send(Event::LocationFailed("denied".into())),
        };
    }
}

/// Never answers.
struct Hung;

impl Geolocator for Hung {
    fn request(&mut self, _sink: EventSink) {}
}

const HOME: Coords = Coords::new(38.7223, -9.1393);
const PARK: Coords = Coords::new(38.7369, -9.1427);

fn ready_session() -> Controller<RecordingMap, RecordingUi> {
    let mut c = Controller::new(
        RecordingMap::default(),
        RecordingUi::default(),
        ControllerConfig::default(),
    );
    c.start(&mut Locator(Some(HOME)));
    assert_eq!(c.dispatch_pending(), 1);
    assert_eq!(c.state(), SessionState::MapReady);
    c
}

fn form(kind: &str, distance: &str, duration: &str, extra: &str) -> FormInput {
    let mut input = FormInput {
        kind: kind.into(),
        distance: distance.into(),
        duration: duration.into(),
        ..FormInput::default()
    };
    if kind == "cycling" {
        input.elevation = extra.into();
    } else {
        input.cadence = extra.into();
    }
    input
}

fn click_and_submit(c: &mut Controller<RecordingMap, RecordingUi>, at: Coords, input: FormInput) {
    c.map().click(at);
    c.dispatch_pending();
    c.handle(Event::FormSubmitted(input));
}

#[test]
fn location_centers_map_at_default_zoom() {
    let c = ready_session();
    assert_eq!(c.map().created, vec![(HOME, 13)]);
    assert!(c.map().clicks.is_some());
    assert!(c.workouts().is_empty());
}

#[test]
fn denied_location_is_terminal() {
    let mut c = Controller::new(
        RecordingMap::default(),
        RecordingUi::default(),
        ControllerConfig::default(),
    );
    c.start(&mut Locator(None));
    c.dispatch_pending();

    assert_eq!(c.state(), SessionState::Unavailable);
    assert_eq!(c.ui().alerts, vec!["We can't get your location 😩"]);
    assert!(c.map().created.is_empty());

    // A late fix does not revive the session.
    c.handle(Event::LocationResolved(HOME));
    c.handle(Event::MapClicked(PARK));
    assert_eq!(c.state(), SessionState::Unavailable);
    assert!(c.map().created.is_empty());
    assert_eq!(c.ui().shown, 0);
}

#[test]
fn hung_location_keeps_waiting() {
    let mut c = Controller::new(
        RecordingMap::default(),
        RecordingUi::default(),
        ControllerConfig::default(),
    );
    c.start(&mut Hung);
    assert_eq!(c.dispatch_pending(), 0);
    assert_eq!(c.state(), SessionState::AwaitingLocation);

    c.handle(Event::WorkoutSelected("anything".into()));
    assert!(c.map().views.is_empty());
}

#[test]
fn location_is_requested_once() {
    let mut c = ready_session();
    c.start(&mut Locator(Some(PARK)));
    assert_eq!(c.dispatch_pending(), 0);
    assert_eq!(c.map().created.len(), 1);
}

#[test]
fn map_click_opens_form_with_pending_coords() {
    let mut c = ready_session();
    c.map().click(PARK);
    c.dispatch_pending();

    assert_eq!(c.state(), SessionState::FormOpen { pending: PARK });
    assert!(c.ui().visible);

    // A second click moves the pending point.
    c.map().click(HOME);
    c.dispatch_pending();
    assert_eq!(c.state(), SessionState::FormOpen { pending: HOME });
}

#[test]
fn running_workout_end_to_end() {
    let mut c = ready_session();
    click_and_submit(&mut c, PARK, form("running", "5", "30", "150"));

    assert_eq!(c.workouts().len(), 1);
    let w = &c.workouts()[0];
    assert_eq!(w.kind(), ActivityKind::Running);
    assert_eq!(w.coords(), PARK);
    assert!((w.metric().value - 6.0).abs() < 1e-12);
    assert_eq!(c.state(), SessionState::MapReady);
    assert!(!c.ui().visible);
    assert_eq!(c.ui().cleared, 1);

    // Marker and list entry share the workout's id.
    let id = w.id();
    assert_eq!(c.map().markers, vec![PARK]);
    assert_eq!(c.map().opened, 1);
    assert_eq!(c.ui().entries.len(), 1);
    assert_eq!(c.ui().entries[0].id, id);
    let (content, opts) = &c.map().popups[0];
    assert!(content.ends_with(w.description()));
    assert_eq!(opts.class_name, "running-popup");

    c.handle(Event::WorkoutSelected(id.to_string()));
    assert_eq!(c.map().views.len(), 1);
    let (coords, zoom, opts) = c.map().views[0];
    assert_eq!(coords, PARK);
    assert_eq!(zoom, 13);
    assert!(opts.animate);
    assert_eq!(opts.pan_duration_secs, 1.0);
}

#[test]
fn cycling_with_downhill_elevation() {
    let mut c = ready_session();
    click_and_submit(&mut c, PARK, form("cycling", "10", "30", "-20"));

    assert_eq!(c.workouts().len(), 1);
    assert!((c.workouts()[0].metric().value - 20.0).abs() < 1e-12);
    assert_eq!(c.workouts()[0].secondary().value, -20.0);
    assert!(c.ui().alerts.is_empty());
}

#[test]
fn negative_cycling_distance_is_rejected() {
    let mut c = ready_session();
    click_and_submit(&mut c, PARK, form("cycling", "-10", "30", "5"));

    assert!(c.workouts().is_empty());
    assert_eq!(c.ui().alerts, vec!["The value must be a positive number!"]);
    assert_eq!(c.state(), SessionState::FormOpen { pending: PARK });
    assert!(c.ui().visible);
    assert!(c.map().markers.is_empty());
}

#[test]
fn non_numeric_distance_keeps_form_open_for_correction() {
    let mut c = ready_session();
    click_and_submit(&mut c, PARK, form("running", "abc", "30", "150"));

    assert!(c.workouts().is_empty());
    assert!(c.ui().entries.is_empty());
    assert_eq!(c.state(), SessionState::FormOpen { pending: PARK });

    // Fixing the field on the same form succeeds at the clicked point.
    c.handle(Event::FormSubmitted(form("running", "5", "30", "150")));
    assert_eq!(c.workouts().len(), 1);
    assert_eq!(c.workouts()[0].coords(), PARK);
}

#[test]
fn blank_cadence_counts_as_zero() {
    let mut c = ready_session();
    click_and_submit(&mut c, PARK, form("running", "5", "30", ""));
    assert!(c.workouts().is_empty());
    assert_eq!(c.ui().alerts.len(), 1);
}

#[test]
fn unknown_activity_type_is_rejected() {
    let mut c = ready_session();
    click_and_submit(&mut c, PARK, form("swimming", "1", "30", "10"));
    assert!(c.workouts().is_empty());
    assert_eq!(c.ui().alerts, vec!["The value must be a positive number!"]);
    assert_eq!(c.state(), SessionState::FormOpen { pending: PARK });
}

#[test]
fn submit_without_click_is_ignored() {
    let mut c = ready_session();
    c.handle(Event::FormSubmitted(form("running", "5", "30", "150")));
    assert!(c.workouts().is_empty());
    assert!(c.ui().alerts.is_empty());
}

#[test]
fn unknown_list_id_is_ignored() {
    let mut c = ready_session();
    click_and_submit(&mut c, PARK, form("running", "5", "30", "150"));

    c.handle(Event::WorkoutSelected(
        "00000000-0000-4000-8000-000000000000".into(),
    ));
    c.handle(Event::WorkoutSelected("not-an-id".into()));
    c.handle(Event::WorkoutSelected(String::new()));

    assert!(c.map().views.is_empty());
    assert!(c.ui().alerts.is_empty());
    assert_eq!(c.state(), SessionState::MapReady);
}

#[test]
fn collection_keeps_insertion_order() {
    let mut c = ready_session();
    click_and_submit(&mut c, PARK, form("running", "5", "30", "150"));
    click_and_submit(&mut c, HOME, form("cycling", "20", "60", "300"));
    click_and_submit(&mut c, PARK, form("running", "10", "55", "170"));

    let kinds: Vec<_> = c.workouts().iter().map(|w| w.kind()).collect();
    assert_eq!(
        kinds,
        vec![ActivityKind::Running, ActivityKind::Cycling, ActivityKind::Running]
    );
    let listed: Vec<_> = c.ui().entries.iter().map(|e| e.id).collect();
    let stored: Vec<_> = c.workouts().iter().map(|w| w.id()).collect();
    assert_eq!(listed, stored);

    c.handle(Event::WorkoutSelected(stored[1].to_string()));
    assert_eq!(c.map().views[0].0, HOME);
}

#[test]
fn activity_selector_toggles_metric_field() {
    let mut c = ready_session();
    c.handle(Event::ActivityTypeChanged("cycling".into()));
    assert_eq!(c.ui().metric_field, Some(ActivityKind::Cycling));
    c.handle(Event::ActivityTypeChanged("running".into()));
    assert_eq!(c.ui().metric_field, Some(ActivityKind::Running));
    assert_eq!(c.state(), SessionState::MapReady);
}

#[test]
fn marker_failure_does_not_undo_the_workout() {
    let mut c = Controller::new(
        RecordingMap {
            fail_markers: true,
            ..RecordingMap::default()
        },
        RecordingUi::default(),
        ControllerConfig::default(),
    );
    c.start(&mut Locator(Some(HOME)));
    c.dispatch_pending();
    click_and_submit(&mut c, PARK, form("running", "5", "30", "150"));

    assert_eq!(c.workouts().len(), 1);
    assert_eq!(c.ui().entries.len(), 1);
    assert!(c.map().popups.is_empty());
    assert_eq!(c.state(), SessionState::MapReady);
}

#[test]
fn configured_zoom_is_used_for_pans() {
    let mut c = Controller::new(
        RecordingMap::default(),
        RecordingUi::default(),
        ControllerConfig {
            zoom: 16,
            pan_duration_secs: 0.5,
        },
    );
    c.start(&mut Locator(Some(HOME)));
    c.dispatch_pending();
    click_and_submit(&mut c, PARK, form("running", "5", "30", "150"));
    let id = c.workouts()[0].id().to_string();
    c.handle(Event::WorkoutSelected(id));

    assert_eq!(c.map().created[0].1, 16);
    let (_, zoom, opts) = c.map().views[0];
    assert_eq!(zoom, 16);
    assert_eq!(opts.pan_duration_secs, 0.5);
}
