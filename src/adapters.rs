use anyhow::Result;

use crate::controller::EventSink;
use crate::render::ListEntry;
use crate::types::{ActivityKind, Coords};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOptions {
    pub animate: bool,
    pub pan_duration_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupOptions {
    pub max_width: u32,
    pub min_width: u32,
    pub auto_close: bool,
    pub close_on_click: bool,
    pub class_name: String,
}

/// One-shot position lookup. The result comes back as a single
/// `Event::LocationResolved` or `Event::LocationFailed` on `sink`.
pub trait Geolocator {
    fn request(&mut self, sink: EventSink);
}

pub trait MapAdapter {
    fn create_map(&mut self, center: Coords, zoom: u8) -> Result<MapHandle>;

    fn set_view(
        &mut self,
        map: MapHandle,
        coords: Coords,
        zoom: u8,
        options: ViewOptions,
    ) -> Result<()>;

    /// Deliver one `Event::MapClicked` on `sink` per user click.
    fn on_click(&mut self, map: MapHandle, sink: EventSink);

    fn add_marker(&mut self, map: MapHandle, coords: Coords) -> Result<MarkerHandle>;

    fn bind_popup(
        &mut self,
        marker: MarkerHandle,
        content: &str,
        options: &PopupOptions,
    ) -> Result<()>;

    fn open_popup(&mut self, marker: MarkerHandle) -> Result<()>;
}

pub trait FormView {
    /// Reveal the form with focus on the distance field.
    fn show(&mut self);

    fn clear_and_hide(&mut self);

    /// Show cadence for runs, elevation for rides.
    fn show_metric_field(&mut self, kind: ActivityKind);
}

pub trait ListView {
    fn append(&mut self, entry: ListEntry) -> Result<()>;
}

pub trait Notifier {
    fn alert(&mut self, message: &str);
}

/// Everything on the page that is not the map.
pub trait Ui: FormView + ListView + Notifier {}

impl<T: FormView + ListView + Notifier> Ui for T {}
