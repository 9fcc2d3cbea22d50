// Member view - Renders members onto a map and a list and keeps them in sync
use crate::application::widgets::{
    Cell, MapWidget, MarkerId, MarkerSpec, MemberActions, MemberList, OptionSpec, RowId,
};
use crate::domain::member::{Bounds, Member};
use crate::domain::pin::PinIcon;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use tokio::task::AbortHandle;
use tokio::time::{Duration, Instant};

pub const HIGHLIGHT_BACKGROUND: &str = "#ff8";
pub const NORMAL_BACKGROUND: &str = "#fff";
pub const EMPTY_LIST_TEXT: &str = "No one here.  You could be first!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlashStep {
    Highlight,
    Unhighlight,
    ResetSelection,
}

/// Steps after the initial highlight, as offsets from the start of `select`.
/// The pin flashes twice, then the dropdown goes back to empty.
const FLASH_SEQUENCE: [(u64, FlashStep); 4] = [
    (600, FlashStep::Unhighlight),
    (1000, FlashStep::Highlight),
    (1400, FlashStep::Unhighlight),
    (1800, FlashStep::ResetSelection),
];

struct ViewShared {
    map: Arc<dyn MapWidget>,
    list: Arc<dyn MemberList>,
    flash: Mutex<Option<FlashHandle>>,
}

/// A member as rendered by one `MemberView`, shared with the widgets through
/// `MemberActions`.
pub struct RenderedMember {
    member: Member,
    marker: OnceLock<MarkerId>,
    row: OnceLock<RowId>,
    highlighted: AtomicBool,
    shared: Arc<ViewShared>,
    this: Weak<RenderedMember>,
}

impl RenderedMember {
    pub fn member(&self) -> &Member {
        &self.member
    }

    pub fn marker(&self) -> Option<MarkerId> {
        self.marker.get().copied()
    }

    pub fn row(&self) -> Option<RowId> {
        self.row.get().copied()
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted.load(Ordering::SeqCst)
    }

    fn actions(&self) -> Weak<dyn MemberActions> {
        self.this.clone()
    }

    fn set_highlighted(&self, highlighted: bool) {
        self.highlighted.store(highlighted, Ordering::SeqCst);
        if let Some(row) = self.row() {
            let color = if highlighted { HIGHLIGHT_BACKGROUND } else { NORMAL_BACKGROUND };
            self.shared.list.set_row_background(row, color);
        }
        if let Some(marker) = self.marker() {
            self.shared
                .map
                .set_icon(marker, PinIcon::for_member(self.member.is_self, highlighted));
        }
    }

    /// The lock is never held while widgets are called, so widget callbacks
    /// may select again.
    fn take_flash(&self) -> Option<FlashHandle> {
        self.shared.flash.lock().unwrap_or_else(|e| e.into_inner()).take()
    }

    /// Pan to this member and flash it. Cancels a flash already running in
    /// the same view.
    fn start_flash(&self) -> Option<FlashHandle> {
        let Some(this) = self.this.upgrade() else {
            return None;
        };
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::warn!("Cannot select {} outside a runtime: {}", self.member.nickname, e);
                return None;
            }
        };

        if let Some(previous) = self.take_flash() {
            previous.cancel();
        }

        self.shared.map.pan_to(self.member.position());
        self.set_highlighted(true);

        let started = Instant::now();
        let task = runtime.spawn(async move {
            for (offset_ms, step) in FLASH_SEQUENCE {
                tokio::time::sleep_until(started + Duration::from_millis(offset_ms)).await;
                match step {
                    FlashStep::Highlight => this.set_highlighted(true),
                    FlashStep::Unhighlight => this.set_highlighted(false),
                    FlashStep::ResetSelection => this.shared.list.reset_selection(),
                }
            }
        });

        let handle = FlashHandle {
            task: task.abort_handle(),
            target: self.this.clone(),
        };
        // a select issued from a widget callback may have stored its own flash meanwhile
        let replaced = self
            .shared
            .flash
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(handle.clone());
        if let Some(replaced) = replaced {
            replaced.cancel();
        }
        Some(handle)
    }
}

impl MemberActions for RenderedMember {
    fn highlight(&self) {
        self.set_highlighted(true);
    }

    fn unhighlight(&self) {
        self.set_highlighted(false);
    }

    fn select(&self) {
        self.start_flash();
    }
}

/// A running flash sequence started by `select`.
#[derive(Clone)]
pub struct FlashHandle {
    task: AbortHandle,
    target: Weak<RenderedMember>,
}

impl FlashHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the sequence. A member left highlighted goes back to normal.
    pub fn cancel(&self) {
        if self.task.is_finished() {
            return;
        }
        self.task.abort();
        if let Some(target) = self.target.upgrade() {
            target.set_highlighted(false);
        }
    }
}

/// Members rendered onto one map and one list.
///
/// Build a new view to render a new member list; markers and rows belong to
/// the view that created them.
pub struct MemberView {
    members: Vec<Arc<RenderedMember>>,
    shared: Arc<ViewShared>,
    list_rendered: AtomicBool,
}

impl MemberView {
    pub fn new(map: Arc<dyn MapWidget>, list: Arc<dyn MemberList>, members: Vec<Member>) -> Self {
        let shared = Arc::new(ViewShared {
            map,
            list,
            flash: Mutex::new(None),
        });
        let members = members
            .into_iter()
            .map(|member| {
                Arc::new_cyclic(|this| RenderedMember {
                    member,
                    marker: OnceLock::new(),
                    row: OnceLock::new(),
                    highlighted: AtomicBool::new(false),
                    shared: shared.clone(),
                    this: this.clone(),
                })
            })
            .collect();

        Self {
            members,
            shared,
            list_rendered: AtomicBool::new(false),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member(&self, index: usize) -> Option<&Arc<RenderedMember>> {
        self.members.get(index)
    }

    /// Place one marker per member, in input order.
    pub fn render_markers(&self) -> Vec<MarkerId> {
        self.members
            .iter()
            .map(|rendered| {
                let member = &rendered.member;
                if let Some(marker) = rendered.marker() {
                    tracing::debug!("Marker for {} was already rendered", member.nickname);
                    return marker;
                }
                let marker = self.shared.map.add_marker(
                    MarkerSpec {
                        position: member.position(),
                        title: member.nickname.clone(),
                        icon: PinIcon::for_member(member.is_self, false),
                    },
                    rendered.actions(),
                );
                let _ = rendered.marker.set(marker);
                marker
            })
            .collect()
    }

    /// Fit the map to all members. Without members the map is left alone.
    pub fn fit_bounds(&self) {
        match Bounds::covering(self.members.iter().map(|m| m.member.position())) {
            Some(bounds) => self.shared.map.fit_bounds(bounds),
            None => tracing::debug!("No members to fit the map to"),
        }
    }

    /// Fill the member table and dropdown. Later calls return the rows
    /// already rendered.
    pub fn render_list(&self, show_distance: bool) -> Vec<RowId> {
        if self.list_rendered.swap(true, Ordering::SeqCst) {
            tracing::debug!("Member list was already rendered");
            return self.members.iter().filter_map(|m| m.row()).collect();
        }
        let list = &self.shared.list;
        let count = self.members.len();
        list.append_option(
            OptionSpec {
                label: format!("{} member{}", count, if count == 1 { "" } else { "s" }),
                value: String::new(),
            },
            None,
        );

        if self.members.is_empty() {
            list.append_placeholder(EMPTY_LIST_TEXT, if show_distance { 2 } else { 1 });
            return Vec::new();
        }

        let mut rows = Vec::with_capacity(count);
        for (index, rendered) in self.members.iter().enumerate() {
            let member = &rendered.member;
            let mut cells = vec![Cell {
                class: "nickname",
                text: member.nickname.clone(),
            }];

            let distance = if show_distance { member.distance_label() } else { String::new() };
            if show_distance {
                cells.push(Cell {
                    class: "distance",
                    text: distance.clone(),
                });
            }

            let row = list.append_row(cells, rendered.actions());
            let _ = rendered.row.set(row);
            rows.push(row);

            let label = if distance.is_empty() {
                member.nickname.clone()
            } else {
                format!("{} {}", member.nickname, distance)
            };
            list.append_option(
                OptionSpec {
                    label,
                    value: index.to_string(),
                },
                Some(rendered.actions()),
            );
        }
        rows
    }

    /// Pan to member `index` and flash it.
    pub fn select(&self, index: usize) -> Option<FlashHandle> {
        self.members.get(index)?.start_flash()
    }

    pub fn highlight(&self, index: usize) {
        if let Some(rendered) = self.members.get(index) {
            rendered.highlight();
        }
    }

    pub fn unhighlight(&self, index: usize) {
        if let Some(rendered) = self.members.get(index) {
            rendered.unhighlight();
        }
    }
}
