//! Leptos DragDrop Utilities
//!
//! Mouse-event drag-and-drop for Leptos. A movement threshold separates a
//! click from a drag. Draggables and containers are addressed by string id.

use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// Where the dragged element would land
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropTarget {
    /// Over a container as a whole (e.g. a list column's body)
    Container(String),
    /// Over the gap before display index `index` inside a container
    Zone(String, usize),
}

impl DropTarget {
    pub fn container(&self) -> &str {
        match self {
            DropTarget::Container(id) | DropTarget::Zone(id, _) => id,
        }
    }
}

/// DnD state signals
#[derive(Clone, Copy)]
pub struct DndSignals {
    pub dragging_id_read: ReadSignal<Option<String>>,
    pub dragging_id_write: WriteSignal<Option<String>>,
    pub drop_target_read: ReadSignal<Option<DropTarget>>,
    pub drop_target_write: WriteSignal<Option<DropTarget>>,
    pub drag_just_ended_read: ReadSignal<bool>,
    pub drag_just_ended_write: WriteSignal<bool>,
    /// Pending id (mousedown but not yet dragging)
    pub pending_id_read: ReadSignal<Option<String>>,
    pub pending_id_write: WriteSignal<Option<String>>,
    /// Start position for movement detection
    pub start_x_read: ReadSignal<i32>,
    pub start_x_write: WriteSignal<i32>,
    pub start_y_read: ReadSignal<i32>,
    pub start_y_write: WriteSignal<i32>,
}

/// Movement threshold in pixels to start dragging
const DRAG_THRESHOLD_PX: i32 = 5;

pub fn create_dnd_signals() -> DndSignals {
    let (dragging_id_read, dragging_id_write) = signal(None::<String>);
    let (drop_target_read, drop_target_write) = signal(None::<DropTarget>);
    let (drag_just_ended_read, drag_just_ended_write) = signal(false);
    let (pending_id_read, pending_id_write) = signal(None::<String>);
    let (start_x_read, start_x_write) = signal(0i32);
    let (start_y_read, start_y_write) = signal(0i32);
    DndSignals {
        dragging_id_read,
        dragging_id_write,
        drop_target_read,
        drop_target_write,
        drag_just_ended_read,
        drag_just_ended_write,
        pending_id_read,
        pending_id_write,
        start_x_read,
        start_x_write,
        start_y_read,
        start_y_write,
    }
}

impl DndSignals {
    /// True while `id` is the element being dragged
    pub fn is_dragging(&self, id: &str) -> bool {
        self.dragging_id_read.with(|dragging| dragging.as_deref() == Some(id))
    }

    pub fn is_active(&self) -> bool {
        self.dragging_id_read.with(Option::is_some)
    }

    /// True while `target` is the current drop target
    pub fn is_target(&self, target: &DropTarget) -> bool {
        self.drop_target_read.with(|current| current.as_ref() == Some(target))
    }
}

/// End drag operation
pub fn end_drag(dnd: &DndSignals) {
    dnd.dragging_id_write.set(None);
    dnd.drop_target_write.set(None);
    dnd.pending_id_write.set(None);
    dnd.drag_just_ended_write.set(true);

    // Swallow the click that follows the mouseup
    if let Some(win) = web_sys::window() {
        let clear = dnd.drag_just_ended_write;
        let cb = wasm_bindgen::closure::Closure::<dyn FnMut()>::new(move || {
            clear.set(false);
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), 100);
        cb.forget();
    }
}

/// Mousedown handler for a draggable element; records a pending drag
pub fn make_on_mousedown(dnd: DndSignals, id: String) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 {
            return;
        }
        if let Some(target) = ev.target() {
            if target.dyn_ref::<web_sys::HtmlInputElement>().is_some()
                || target.dyn_ref::<web_sys::HtmlButtonElement>().is_some()
                || target.dyn_ref::<web_sys::HtmlTextAreaElement>().is_some()
            {
                return;
            }
        }
        // Containers nest draggables; the innermost one wins
        ev.stop_propagation();
        dnd.pending_id_write.set(Some(id.clone()));
        dnd.start_x_write.set(ev.client_x());
        dnd.start_y_write.set(ev.client_y());
    }
}

/// Document mousemove: promote a pending drag once past the threshold
pub fn bind_global_mousemove(dnd: DndSignals) {
    use wasm_bindgen::closure::Closure;

    let on_mousemove = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        let Some(pending) = dnd.pending_id_read.get_untracked() else {
            return;
        };
        if dnd.dragging_id_read.get_untracked().is_some() {
            return;
        }
        let dx = (ev.client_x() - dnd.start_x_read.get_untracked()).abs();
        let dy = (ev.client_y() - dnd.start_y_read.get_untracked()).abs();
        if dx > DRAG_THRESHOLD_PX || dy > DRAG_THRESHOLD_PX {
            dnd.dragging_id_write.set(Some(pending));
        }
    });

    if let Some(doc) = web_sys::window().and_then(|win| win.document()) {
        let _ = doc.add_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
    }
    on_mousemove.forget();
}

/// Mouseenter handler for a whole container
pub fn make_on_container_mouseenter(
    dnd: DndSignals,
    container_id: String,
) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |_ev: web_sys::MouseEvent| {
        let Some(dragging) = dnd.dragging_id_read.get_untracked() else {
            return;
        };
        // Never a target of itself
        if dragging != container_id {
            dnd.drop_target_write.set(Some(DropTarget::Container(container_id.clone())));
        }
    }
}

/// Mouseenter handler for a gap between elements
pub fn make_on_zone_mouseenter(
    dnd: DndSignals,
    container_id: String,
    index: usize,
) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |ev: web_sys::MouseEvent| {
        if dnd.dragging_id_read.get_untracked().is_some() {
            // Zones sit inside containers; keep the container from overriding
            ev.stop_propagation();
            dnd.drop_target_write.set(Some(DropTarget::Zone(container_id.clone(), index)));
        }
    }
}

pub fn make_on_mouseleave(dnd: DndSignals) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| {
        if dnd.dragging_id_read.get_untracked().is_some() {
            dnd.drop_target_write.set(None);
        }
    }
}

/// Bind the document mouseup that completes a drop, plus the mousemove
/// that starts drags
pub fn bind_global_mouseup<F>(dnd: DndSignals, on_drop: F)
where
    F: Fn(String, DropTarget) + 'static,
{
    use wasm_bindgen::closure::Closure;

    let on_mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
        let dragging_id = dnd.dragging_id_read.get_untracked();
        let drop_target = dnd.drop_target_read.get_untracked();
        dnd.pending_id_write.set(None);
        end_drag(&dnd);

        // A plain click never reaches on_drop
        if let (Some(dragged), Some(target)) = (dragging_id, drop_target) {
            on_drop(dragged, target);
        }
    });

    if let Some(doc) = web_sys::window().and_then(|win| win.document()) {
        let _ = doc.add_event_listener_with_callback("mouseup", on_mouseup.as_ref().unchecked_ref());
    }
    on_mouseup.forget();

    bind_global_mousemove(dnd);
}

/// Display index a dragged element should take when dropped on gap `zone`
/// of the container it already belongs to, given its current index
pub fn zone_to_index(from_index: usize, zone: usize) -> usize {
    if zone > from_index {
        zone - 1
    } else {
        zone
    }
}
