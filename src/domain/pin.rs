// Marker icons, served by the chart image API
const CHART_API: &str = "http://chart.apis.google.com/chart?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinIcon {
    /// Chart API parameters selecting the image
    pub chart: &'static str,
    pub size: (u32, u32),
    pub origin: (u32, u32),
    pub anchor: (u32, u32),
}

impl PinIcon {
    pub fn url(&self) -> String {
        format!("{}{}", CHART_API, self.chart)
    }

    /// Icon for a member in the given visual state.
    pub fn for_member(is_self: bool, highlighted: bool) -> &'static PinIcon {
        match (is_self, highlighted) {
            (true, false) => &SELF_PIN,
            (true, true) => &HIGHLIGHTED_SELF_PIN,
            (false, false) => &UNHIGHLIGHTED_PIN,
            (false, true) => &HIGHLIGHTED_PIN,
        }
    }
}

pub const SELF_PIN: PinIcon = PinIcon {
    chart: "chst=d_map_pin_letter&chld=|f77|0",
    size: (40, 37),
    origin: (0, 0),
    anchor: (9, 35),
};

pub const HIGHLIGHTED_SELF_PIN: PinIcon = PinIcon {
    chart: "chst=d_map_pin_letter&chld=|ff0|0",
    size: (40, 37),
    origin: (0, 0),
    anchor: (9, 35),
};

pub const UNHIGHLIGHTED_PIN: PinIcon = PinIcon {
    chart: "chst=d_map_spin&chld=0.4|0|faa|0|",
    size: (17, 28),
    origin: (0, 0),
    anchor: (8, 28),
};

pub const HIGHLIGHTED_PIN: PinIcon = PinIcon {
    chart: "chst=d_map_spin&chld=0.4|0|ff0|0|",
    size: (17, 28),
    origin: (0, 0),
    anchor: (8, 28),
};
