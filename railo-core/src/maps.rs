use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::landmarks::LandmarkCategory;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

/// A point of interest returned by a places search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    /// Full category path, e.g. `Travel > Sights > Palace`
    pub category_path: String,
    pub url: Option<String>,
    pub position: LatLng,
}

impl Place {
    /// Most specific category segment
    pub fn category(&self) -> &str {
        self.category_path
            .rsplit(" > ")
            .next()
            .unwrap_or(&self.category_path)
    }
}

/// Info card drawn over the map for a place
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverlayContent {
    pub title: String,
    pub address: String,
    pub phone: Option<String>,
    pub category: String,
    pub link: Option<String>,
}

impl From<&Place> for OverlayContent {
    fn from(place: &Place) -> Self {
        Self {
            title: place.name.clone(),
            address: place.address.clone(),
            phone: place.phone.clone(),
            category: place.category().to_string(),
            link: place.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapHandle(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayHandle(pub Uuid);

/// Narrow view of a map/places vendor. Implementations own every vendor
/// object; callers only ever hold the opaque handles.
#[async_trait]
pub trait MapProvider: Send + Sync {
    fn create_map(&self, center: LatLng, level: u8) -> Result<MapHandle, MapError>;

    fn set_center(&self, map: MapHandle, center: LatLng, level: u8) -> Result<(), MapError>;

    /// Area currently visible on the map
    fn bounds(&self, map: MapHandle) -> Result<Bounds, MapError>;

    fn add_marker(&self, map: MapHandle, position: LatLng) -> Result<MarkerHandle, MapError>;

    fn remove_marker(&self, marker: MarkerHandle) -> Result<(), MapError>;

    fn create_overlay(
        &self,
        map: MapHandle,
        position: LatLng,
        content: &OverlayContent,
    ) -> Result<OverlayHandle, MapError>;

    fn remove_overlay(&self, overlay: OverlayHandle) -> Result<(), MapError>;

    async fn keyword_search(&self, keyword: &str) -> Result<Vec<Place>, MapError>;

    async fn category_search(&self, category: LandmarkCategory, bounds: Bounds) -> Result<Vec<Place>, MapError>;
}

/// Overlays opened by one map view. Whoever owns the view owns this; nothing
/// else can reach or close its overlays.
#[derive(Debug, Default)]
pub struct OverlayManager {
    overlays: Vec<OverlayHandle>,
}

impl OverlayManager {
    pub fn new() -> Self {
        Self { overlays: Vec::new() }
    }

    pub fn track(&mut self, overlay: OverlayHandle) {
        self.overlays.push(overlay);
    }

    /// Most recently opened overlay still on screen
    pub fn current(&self) -> Option<OverlayHandle> {
        self.overlays.last().copied()
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Close the most recent overlay only.
    pub fn close_current(&mut self, provider: &dyn MapProvider) -> Result<bool, MapError> {
        match self.overlays.last() {
            Some(overlay) => {
                provider.remove_overlay(*overlay)?;
                self.overlays.pop();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove every tracked overlay from the map. Returns how many were closed.
    /// Overlays the provider failed to remove stay tracked and the first
    /// failure is returned.
    pub fn close_all(&mut self, provider: &dyn MapProvider) -> Result<usize, MapError> {
        let before = self.overlays.len();
        let mut first_err = None;
        self.overlays.retain(|overlay| match provider.remove_overlay(*overlay) {
            Ok(()) => false,
            Err(e) => {
                first_err.get_or_insert(e);
                true
            }
        });

        match first_err {
            Some(e) => {
                tracing::warn!(left = self.overlays.len(), "Some overlays could not be closed: {}", e);
                Err(e)
            }
            None => Ok(before),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("Map provider unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown map handle")]
    UnknownHandle,

    #[error("Places search failed: {0}")]
    SearchFailed(String),
}
