pub mod adapters;
pub mod cli;
pub mod console;
pub mod controller;
pub mod error;
pub mod render;
pub mod types;
pub mod utils;
pub mod validation;

pub use controller::{Controller, ControllerConfig, Event, EventSink, SessionState};
pub use error::{TrailError, TrailResult};
pub use types::{ActivityKind, Coords, Workout, WorkoutId};
