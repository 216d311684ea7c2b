use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::maps::{LatLng, MapError, MapHandle, MapProvider, MarkerHandle, OverlayContent, OverlayManager, Place};

/// Seoul City Hall
pub const DEFAULT_CENTER: LatLng = LatLng { lat: 37.5665, lng: 126.978 };
pub const DEFAULT_LEVEL: u8 = 7;
pub const STATION_LEVEL: u8 = 5;
pub const PLACE_LEVEL: u8 = 3;

/// Places category codes understood by the places search
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum LandmarkCategory {
    #[default]
    #[serde(rename = "AT4")]
    Attraction,
    #[serde(rename = "CT1")]
    Culture,
    #[serde(rename = "FD6")]
    Restaurant,
    #[serde(rename = "CS2")]
    ConvenienceStore,
    #[serde(rename = "CE7")]
    Cafe,
    #[serde(rename = "AD5")]
    Lodging,
}

impl LandmarkCategory {
    pub const ALL: [LandmarkCategory; 6] = [
        LandmarkCategory::Attraction,
        LandmarkCategory::Culture,
        LandmarkCategory::Restaurant,
        LandmarkCategory::ConvenienceStore,
        LandmarkCategory::Cafe,
        LandmarkCategory::Lodging,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            LandmarkCategory::Attraction => "AT4",
            LandmarkCategory::Culture => "CT1",
            LandmarkCategory::Restaurant => "FD6",
            LandmarkCategory::ConvenienceStore => "CS2",
            LandmarkCategory::Cafe => "CE7",
            LandmarkCategory::Lodging => "AD5",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LandmarkCategory::Attraction => "Tourist attractions",
            LandmarkCategory::Culture => "Culture",
            LandmarkCategory::Restaurant => "Restaurants",
            LandmarkCategory::ConvenienceStore => "Convenience stores",
            LandmarkCategory::Cafe => "Cafes",
            LandmarkCategory::Lodging => "Lodging",
        }
    }
}

impl fmt::Display for LandmarkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for LandmarkCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown landmark category: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationLocation {
    pub name: String,
    pub position: LatLng,
}

/// Station-centred places browser over one map view. Owns the markers and
/// overlays it puts on that map.
pub struct LandmarkFinder<P: MapProvider> {
    provider: Arc<P>,
    map: MapHandle,
    overlays: OverlayManager,
    markers: Vec<MarkerHandle>,
    results: Vec<Place>,
}

impl<P: MapProvider> LandmarkFinder<P> {
    pub fn new(provider: Arc<P>) -> Result<Self, MapError> {
        let map = provider.create_map(DEFAULT_CENTER, DEFAULT_LEVEL)?;
        Ok(Self {
            provider,
            map,
            overlays: OverlayManager::new(),
            markers: Vec::new(),
            results: Vec::new(),
        })
    }

    pub fn map(&self) -> MapHandle {
        self.map
    }

    pub fn results(&self) -> &[Place] {
        &self.results
    }

    pub fn overlays(&self) -> &OverlayManager {
        &self.overlays
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// First hit for `KTX {name}`, else first hit for the bare name.
    pub async fn find_station_coordinates(&self, station: &str) -> Result<Option<StationLocation>, MapError> {
        let station = station.trim();
        if station.is_empty() {
            return Ok(None);
        }

        for keyword in [format!("KTX {}", station), station.to_string()] {
            if let Some(place) = self.provider.keyword_search(&keyword).await?.into_iter().next() {
                tracing::debug!(station, keyword = %keyword, "Station located");
                return Ok(Some(StationLocation {
                    name: place.name,
                    position: place.position,
                }));
            }
        }

        tracing::warn!(station, "Station not found by places search");
        Ok(None)
    }

    /// Centre on the station and list places of `category` in view. Earlier
    /// markers and overlays are cleared first. Returns the station found, or
    /// `None` when the name could not be located.
    pub async fn search_near_station(
        &mut self,
        station: &str,
        category: LandmarkCategory,
    ) -> Result<Option<StationLocation>, MapError> {
        self.overlays.close_all(self.provider.as_ref())?;
        self.clear_markers()?;
        self.results.clear();

        let location = match self.find_station_coordinates(station).await? {
            Some(location) => location,
            None => return Ok(None),
        };

        self.provider.set_center(self.map, location.position, STATION_LEVEL)?;
        let bounds = self.provider.bounds(self.map)?;
        let places = self.provider.category_search(category, bounds).await?;

        for place in &places {
            let marker = self.provider.add_marker(self.map, place.position)?;
            self.markers.push(marker);
        }

        tracing::info!(
            station = %location.name,
            category = %category,
            count = places.len(),
            "Landmarks loaded"
        );
        self.results = places;
        Ok(Some(location))
    }

    /// Zoom to a place and open its info card, closing any other card.
    pub fn show_place(&mut self, place: &Place) -> Result<(), MapError> {
        self.overlays.close_all(self.provider.as_ref())?;
        self.provider.set_center(self.map, place.position, PLACE_LEVEL)?;

        let content = OverlayContent::from(place);
        let overlay = self.provider.create_overlay(self.map, place.position, &content)?;
        self.overlays.track(overlay);
        Ok(())
    }

    /// Open the info card for the n-th search result
    pub fn show_result(&mut self, index: usize) -> Result<bool, MapError> {
        match self.results.get(index).cloned() {
            Some(place) => {
                self.show_place(&place)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn close_overlays(&mut self) -> Result<usize, MapError> {
        self.overlays.close_all(self.provider.as_ref())
    }

    /// Markers the provider failed to remove stay tracked for the next pass.
    fn clear_markers(&mut self) -> Result<(), MapError> {
        let provider = self.provider.as_ref();
        let mut first_err = None;
        self.markers.retain(|marker| match provider.remove_marker(*marker) {
            Ok(()) => false,
            Err(e) => {
                first_err.get_or_insert(e);
                true
            }
        });

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maps::fake::{place, Call, FakeMap};

    fn provider() -> Arc<FakeMap> {
        Arc::new(FakeMap {
            keyword_hits: vec![
                ("KTX Busan".to_string(), place("s1", "Busan Station", 35.115, 129.041)),
                ("Gangneung".to_string(), place("s2", "Gangneung Station", 37.764, 128.899)),
            ],
            category_hits: vec![
                place("p1", "Yongdusan Park", 35.100, 129.032),
                place("p2", "Gamcheon Village", 35.097, 129.010),
            ],
            ..Default::default()
        })
    }

    #[test]
    fn test_category_codes_round_trip() {
        for category in LandmarkCategory::ALL {
            assert_eq!(category.code().parse::<LandmarkCategory>().unwrap(), category);
        }
        assert_eq!(LandmarkCategory::Cafe.to_string(), "CE7");
        assert!("XX9".parse::<LandmarkCategory>().is_err());
    }

    #[tokio::test]
    async fn test_station_lookup_prefers_ktx_name() {
        let map = provider();
        let finder = LandmarkFinder::new(map.clone()).unwrap();

        let busan = finder.find_station_coordinates("Busan").await.unwrap().unwrap();
        assert_eq!(busan.name, "Busan Station");
        assert!(map.calls().contains(&Call::KeywordSearch("KTX Busan".to_string())));
        assert!(!map.calls().contains(&Call::KeywordSearch("Busan".to_string())));
    }

    #[tokio::test]
    async fn test_station_lookup_falls_back_to_bare_name() {
        let map = provider();
        let finder = LandmarkFinder::new(map.clone()).unwrap();

        let station = finder.find_station_coordinates("Gangneung").await.unwrap().unwrap();
        assert_eq!(station.name, "Gangneung Station");

        let searches: Vec<_> = map
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::KeywordSearch(_)))
            .collect();
        assert_eq!(
            searches,
            vec![
                Call::KeywordSearch("KTX Gangneung".to_string()),
                Call::KeywordSearch("Gangneung".to_string()),
            ]
        );

        assert!(finder.find_station_coordinates("Nowhere").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_near_station_places_markers() {
        let map = provider();
        let mut finder = LandmarkFinder::new(map.clone()).unwrap();
        assert_eq!(map.calls()[0], Call::CreateMap(DEFAULT_CENTER, DEFAULT_LEVEL));

        let station = finder
            .search_near_station("Busan", LandmarkCategory::Attraction)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(station.position, LatLng::new(35.115, 129.041));
        assert_eq!(finder.results().len(), 2);
        assert_eq!(finder.marker_count(), 2);
        assert!(map.calls().contains(&Call::SetCenter(station.position, STATION_LEVEL)));
        assert!(map.calls().contains(&Call::CategorySearch(LandmarkCategory::Attraction)));
    }

    #[tokio::test]
    async fn test_new_search_clears_previous_markers_and_overlays() {
        let map = provider();
        let mut finder = LandmarkFinder::new(map.clone()).unwrap();

        finder.search_near_station("Busan", LandmarkCategory::Cafe).await.unwrap();
        assert!(finder.show_result(0).unwrap());
        assert_eq!(finder.overlays().len(), 1);

        let found = finder.search_near_station("Nowhere", LandmarkCategory::Cafe).await.unwrap();
        assert!(found.is_none());
        assert!(finder.overlays().is_empty());
        assert_eq!(finder.marker_count(), 0);
        assert!(finder.results().is_empty());

        let removed_markers = map
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::RemoveMarker(_)))
            .count();
        assert_eq!(removed_markers, 2);
    }

    #[tokio::test]
    async fn test_failed_marker_removal_stays_tracked() {
        let map = provider();
        let mut finder = LandmarkFinder::new(map.clone()).unwrap();
        finder.search_near_station("Busan", LandmarkCategory::Restaurant).await.unwrap();
        assert_eq!(finder.marker_count(), 2);

        map.fail_next_removals(1);
        let err = finder
            .search_near_station("Busan", LandmarkCategory::Cafe)
            .await
            .unwrap_err();
        assert_eq!(err, MapError::UnknownHandle);
        assert_eq!(finder.marker_count(), 1);

        // Next search clears the leftover before placing new markers
        finder.search_near_station("Busan", LandmarkCategory::Cafe).await.unwrap();
        assert_eq!(finder.marker_count(), 2);
        let removed = map
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::RemoveMarker(_)))
            .count();
        assert_eq!(removed, 2);
    }

    #[tokio::test]
    async fn test_show_place_keeps_single_overlay_open() {
        let map = provider();
        let mut finder = LandmarkFinder::new(map.clone()).unwrap();
        finder.search_near_station("Busan", LandmarkCategory::Attraction).await.unwrap();

        assert!(finder.show_result(0).unwrap());
        assert!(finder.show_result(1).unwrap());
        assert!(!finder.show_result(5).unwrap());

        assert_eq!(finder.overlays().len(), 1);
        assert!(map.calls().contains(&Call::CreateOverlay("Gamcheon Village".to_string())));
        assert!(map
            .calls()
            .contains(&Call::SetCenter(LatLng::new(35.097, 129.010), PLACE_LEVEL)));

        assert_eq!(finder.close_overlays().unwrap(), 1);
    }
}
