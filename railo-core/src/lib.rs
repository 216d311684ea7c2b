pub mod auth;
pub mod landmarks;
pub mod maps;

pub use auth::{check_access, sign_out, AccessDecision, AuthSession, LogoutOutcome, StaticTokenAuth};
pub use landmarks::{LandmarkCategory, LandmarkFinder, StationLocation};
pub use maps::{
    Bounds, LatLng, MapError, MapHandle, MapProvider, MarkerHandle, OverlayContent, OverlayHandle,
    OverlayManager, Place,
};

/// Failure of the remote side of an auth call (token refresh, logout)
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Auth service call failed: {0}")]
    AuthService(String),
}
