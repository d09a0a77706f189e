/// None of these escape event dispatch: the controller turns each one into
/// an alert or a log line and keeps going.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrailError {
    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown activity type: {0:?}")]
    UnknownActivity(String),

    #[error("No workout with id {0:?}")]
    UnresolvedIdentity(String),
}

pub type TrailResult<T> = Result<T, TrailError>;

impl TrailError {
    /// Whether the user should see this failure as an alert.
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::LocationUnavailable(_) | Self::InvalidInput(_) | Self::UnknownActivity(_)
        )
    }
}
