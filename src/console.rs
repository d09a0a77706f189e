use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{BufRead, Write};

use crate::adapters::{
    FormView, Geolocator, ListView, MapAdapter, MapHandle, MarkerHandle, Notifier, PopupOptions,
    ViewOptions,
};
use crate::controller::{Controller, Event, EventSink};
use crate::render::ListEntry;
use crate::types::{ActivityKind, Coords, FormInput};

static COORDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^,\s]+)\s*(?:,|\s)\s*([^,\s]+)\s*$")
        .expect("valid coords regex")
});

pub const HELP: &str = "\
commands:
  click <lat>,<lng>                               pick a point on the map
  type running|cycling                            switch the metric field
  submit <type> <km> <min> <cadence|elevation>    submit the workout form
  select <n|id>                                   jump to a listed workout
  list                                            show logged workouts
  help                                            this text
  quit                                            end the session";

/// Answers the one location request with a fixed position, or a denial.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator {
    fix: Option<Coords>,
}

impl FixedLocator {
    pub const fn at(coords: Coords) -> Self {
        Self { fix: Some(coords) }
    }

    pub const fn denied() -> Self {
        Self { fix: None }
    }
}

impl Geolocator for FixedLocator {
    fn request(&mut self, sink: EventSink) {
        let event = self.fix.map_or_else(
            || Event::LocationFailed("location permission denied".to_string()),
            Event::LocationResolved,
        );
        sink.send(event);
    }
}

/// Map that prints each drawing call and forwards `click` to the registered handler.
pub struct TerminalMap<W: Write> {
    out: W,
    next_handle: u32,
    clicks: Option<EventSink>,
}

impl<W: Write> TerminalMap<W> {
    pub const fn new(out: W) -> Self {
        Self {
            out,
            next_handle: 0,
            clicks: None,
        }
    }

    /// Returns false while no click handler is registered.
    pub fn click(&self, coords: Coords) -> bool {
        self.clicks
            .as_ref()
            .is_some_and(|sink| sink.send(Event::MapClicked(coords)))
    }

    pub const fn output(&self) -> &W {
        &self.out
    }

    fn next(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl<W: Write> MapAdapter for TerminalMap<W> {
    fn create_map(&mut self, center: Coords, zoom: u8) -> Result<MapHandle> {
        let handle = MapHandle(self.next());
        writeln!(self.out, "map: centered on {center} at zoom {zoom}")?;
        Ok(handle)
    }

    fn set_view(
        &mut self,
        _map: MapHandle,
        coords: Coords,
        zoom: u8,
        options: ViewOptions,
    ) -> Result<()> {
        writeln!(
            self.out,
            "map: pan to {coords} at zoom {zoom} (animate={}, {}s)",
            options.animate, options.pan_duration_secs
        )?;
        Ok(())
    }

    fn on_click(&mut self, map: MapHandle, sink: EventSink) {
        crate::dlog!("click handler registered on map {}", map.0);
        self.clicks = Some(sink);
    }

    fn add_marker(&mut self, _map: MapHandle, coords: Coords) -> Result<MarkerHandle> {
        let marker = MarkerHandle(self.next());
        writeln!(self.out, "map: marker #{} at {coords}", marker.0)?;
        Ok(marker)
    }

    fn bind_popup(
        &mut self,
        marker: MarkerHandle,
        content: &str,
        options: &PopupOptions,
    ) -> Result<()> {
        tracing::trace!(marker = marker.0, class = %options.class_name, "popup bound");
        writeln!(self.out, "map: popup on #{}: {content}", marker.0)?;
        Ok(())
    }

    fn open_popup(&mut self, marker: MarkerHandle) -> Result<()> {
        crate::dlog!("popup #{} opened", marker.0);
        Ok(())
    }
}

/// Form, workout list and alerts rendered as text lines. List entries go to
/// `out`; alerts go to `err`, and so does the form prompt in JSON mode so that
/// `out` stays one JSON document per line.
pub struct TerminalUi<W: Write, E: Write> {
    out: W,
    err: E,
    json: bool,
    form_visible: bool,
    metric_field: ActivityKind,
    entries: Vec<ListEntry>,
}

impl<W: Write, E: Write> TerminalUi<W, E> {
    pub const fn new(out: W, err: E, json: bool) -> Self {
        Self {
            out,
            err,
            json,
            form_visible: false,
            metric_field: ActivityKind::Running,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    pub const fn form_visible(&self) -> bool {
        self.form_visible
    }

    pub const fn metric_field(&self) -> ActivityKind {
        self.metric_field
    }

    pub const fn json(&self) -> bool {
        self.json
    }

    pub const fn output(&self) -> &W {
        &self.out
    }

    pub const fn errors(&self) -> &E {
        &self.err
    }

    fn note(&mut self, text: &str) {
        let res = if self.json {
            writeln!(self.err, "{text}")
        } else {
            writeln!(self.out, "{text}")
        };
        if let Err(e) = res {
            tracing::warn!(err = %e, "terminal write failed");
        }
    }
}

impl<W: Write, E: Write> FormView for TerminalUi<W, E> {
    fn show(&mut self) {
        self.form_visible = true;
        let field = match self.metric_field {
            ActivityKind::Running => "cadence",
            ActivityKind::Cycling => "elevation",
        };
        self.note(&format!("form: distance (km), duration (min), {field}"));
    }

    fn clear_and_hide(&mut self) {
        self.form_visible = false;
    }

    fn show_metric_field(&mut self, kind: ActivityKind) {
        self.metric_field = kind;
    }
}

impl<W: Write, E: Write> ListView for TerminalUi<W, E> {
    fn append(&mut self, entry: ListEntry) -> Result<()> {
        if self.json {
            let json = serde_json::to_string(&entry).context("serializing list entry")?;
            writeln!(self.out, "{json}")?;
        } else {
            writeln!(self.out, "{}. {entry}", self.entries.len() + 1)?;
        }
        self.entries.push(entry);
        Ok(())
    }
}

impl<W: Write, E: Write> Notifier for TerminalUi<W, E> {
    fn alert(&mut self, message: &str) {
        if let Err(e) = writeln!(self.err, "! {message}") {
            tracing::warn!(err = %e, "terminal write failed");
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Click(Coords),
    Type(String),
    Submit(FormInput),
    Select(String),
    List,
    Help,
    Quit,
}

pub fn parse_coords(s: &str) -> Result<Coords> {
    let Some(caps) = COORDS_RE.captures(s) else {
        bail!("expected <lat>,<lng>, got {s:?}");
    };
    let lat: f64 = caps[1]
        .parse()
        .with_context(|| format!("latitude {:?}", &caps[1]))?;
    let lng: f64 = caps[2]
        .parse()
        .with_context(|| format!("longitude {:?}", &caps[2]))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        bail!("coordinates out of range: {lat},{lng}");
    }
    Ok(Coords::new(lat, lng))
}

/// Parses one input line. Blank lines and `#` comments yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let cmd = match verb.to_ascii_lowercase().as_str() {
        "click" => Command::Click(parse_coords(rest)?),
        "type" => Command::Type(rest.to_string()),
        "submit" => {
            // Missing fields stay blank, just like an empty form input.
            let mut fields = rest.split_whitespace().map(str::to_string);
            let kind = fields.next().unwrap_or_default();
            let distance = fields.next().unwrap_or_default();
            let duration = fields.next().unwrap_or_default();
            let extra = fields.next().unwrap_or_default();
            let (cadence, elevation) = match kind.parse::<ActivityKind>() {
                Ok(ActivityKind::Cycling) => (String::new(), extra),
                _ => (extra, String::new()),
            };
            Command::Submit(FormInput {
                kind,
                distance,
                duration,
                cadence,
                elevation,
            })
        }
        "select" => {
            if rest.is_empty() {
                bail!("select needs a list number or workout id");
            }
            Command::Select(rest.to_string())
        }
        "list" => Command::List,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command {other:?}; try `help`"),
    };
    Ok(Some(cmd))
}

pub type TerminalController<M, W, E> = Controller<TerminalMap<M>, TerminalUi<W, E>>;

/// Feeds commands from `input` into the controller until EOF or `quit`.
/// Listings and help go to `out`; bad command lines are reported on `err` and skipped.
pub fn run_session<R, M, W, E, O, X>(
    controller: &mut TerminalController<M, W, E>,
    input: R,
    out: &mut O,
    err: &mut X,
) -> Result<()>
where
    R: BufRead,
    M: Write,
    W: Write,
    E: Write,
    O: Write,
    X: Write,
{
    let sink = controller.sink();
    controller.dispatch_pending();

    for (n, line) in input.lines().enumerate() {
        let line = line.with_context(|| format!("reading command line {}", n + 1))?;
        let cmd = match parse_command(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(line = n + 1, "bad command");
                writeln!(err, "? {e:#}")?;
                continue;
            }
        };

        match cmd {
            Command::Click(coords) => {
                if !controller.map().click(coords) {
                    writeln!(err, "? there is no map to click on")?;
                }
            }
            Command::Type(kind) => {
                sink.send(Event::ActivityTypeChanged(kind));
            }
            Command::Submit(input) => {
                sink.send(Event::ActivityTypeChanged(input.kind.clone()));
                sink.send(Event::FormSubmitted(input));
            }
            Command::Select(which) => {
                let id = resolve_list_position(controller.ui().entries(), &which);
                sink.send(Event::WorkoutSelected(id));
            }
            Command::List => print_workouts(controller, out)?,
            Command::Help => writeln!(err, "{HELP}")?,
            Command::Quit => break,
        }

        controller.dispatch_pending();
    }

    controller.dispatch_pending();
    Ok(())
}

/// `select 2` means the second entry in the list; anything else is taken as an id.
fn resolve_list_position(entries: &[ListEntry], which: &str) -> String {
    which
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| entries.get(i))
        .map_or_else(|| which.to_string(), |e| e.id.to_string())
}

fn print_workouts<M: Write, W: Write, E: Write, O: Write>(
    controller: &TerminalController<M, W, E>,
    out: &mut O,
) -> Result<()> {
    if controller.ui().json() {
        for w in controller.workouts() {
            let json = serde_json::to_string(w).context("serializing workout")?;
            writeln!(out, "{json}")?;
        }
        return Ok(());
    }
    if controller.workouts().is_empty() {
        writeln!(out, "no workouts yet")?;
        return Ok(());
    }
    for (i, w) in controller.workouts().iter().enumerate() {
        let metric = w.metric();
        writeln!(
            out,
            "{}\t{}\t{}\t{} km\t{} min\t{:.1} {}",
            i + 1,
            w.id(),
            w.description(),
            w.distance(),
            w.duration(),
            metric.value,
            metric.unit
        )?;
    }
    Ok(())
}
