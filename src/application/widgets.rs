// Widget traits the member view renders into
use crate::domain::member::{Bounds, LatLng};
use crate::domain::pin::PinIcon;
use std::sync::Weak;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowId(pub usize);

/// What a rendered member can be asked to do by the widget showing it.
pub trait MemberActions: Send + Sync {
    fn highlight(&self);
    fn unhighlight(&self);
    fn select(&self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: LatLng,
    pub title: String,
    pub icon: &'static PinIcon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub class: &'static str,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub label: String,
    /// Empty for the header option
    pub value: String,
}

pub trait MapWidget: Send + Sync {
    /// Add a marker. Mouse-over and mouse-out on it call `highlight` and
    /// `unhighlight` on `actions` while it is still alive.
    fn add_marker(&self, marker: MarkerSpec, actions: Weak<dyn MemberActions>) -> MarkerId;

    fn set_icon(&self, marker: MarkerId, icon: &'static PinIcon);

    fn fit_bounds(&self, bounds: Bounds);

    fn pan_to(&self, position: LatLng);
}

/// Member table plus the dropdown that mirrors it.
pub trait MemberList: Send + Sync {
    /// Append a table row. Hovering its cells highlights, clicking selects.
    fn append_row(&self, cells: Vec<Cell>, actions: Weak<dyn MemberActions>) -> RowId;

    /// Append a row that belongs to no member.
    fn append_placeholder(&self, text: &str, col_span: u32);

    /// Append a dropdown option; choosing it selects `actions` if present.
    fn append_option(&self, option: OptionSpec, actions: Option<Weak<dyn MemberActions>>);

    fn set_row_background(&self, row: RowId, color: &str);

    /// Return the dropdown to its empty value.
    fn reset_selection(&self);
}
