// Member domain model
use serde::Deserialize;

/// Label shown instead of a distance for the viewer's own entry
pub const SELF_LABEL: &str = "(you)";

/// Distances from this many meters up are shown in whole kilometers
const WHOLE_KM_THRESHOLD: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Member {
    pub nickname: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub is_self: bool,
    /// Meters from the viewer
    #[serde(default)]
    pub distance: Option<f64>,
}

impl Member {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lon)
    }

    /// Distance column text: `(you)` for the viewer, otherwise the formatted
    /// distance, or nothing when the distance is unknown.
    pub fn distance_label(&self) -> String {
        if self.is_self {
            return SELF_LABEL.to_string();
        }
        self.distance.map(format_distance).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lon: f64,
}

impl LatLng {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Smallest box containing a set of positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    /// `None` when there are no positions to cover.
    pub fn covering(positions: impl IntoIterator<Item = LatLng>) -> Option<Self> {
        positions.into_iter().fold(None, |bounds, p| {
            Some(match bounds {
                None => Bounds {
                    south_west: p,
                    north_east: p,
                },
                Some(b) => Bounds {
                    south_west: LatLng::new(b.south_west.lat.min(p.lat), b.south_west.lon.min(p.lon)),
                    north_east: LatLng::new(b.north_east.lat.max(p.lat), b.north_east.lon.max(p.lon)),
                },
            })
        })
    }
}

/// Format meters as kilometers: one decimal below 10 km, whole kilometers above.
pub fn format_distance(meters: f64) -> String {
    if meters >= WHOLE_KM_THRESHOLD {
        format!("{} km", (meters / 1000.0).round())
    } else {
        format!("{:.1} km", (meters / 100.0).round() / 10.0)
    }
}
