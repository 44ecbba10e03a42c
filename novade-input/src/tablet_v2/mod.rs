//! `zwp_tablet_v2` multiplexing.
//!
//! The [`TabletManager`] keeps one tablet and one tool object per bound
//! client, fans tool state out to whichever client the tool is in proximity
//! of, batches per-turn updates into a single `frame` and runs the implicit
//! grab that keeps a tool attached to the surface it went down on.
//!
//! Tool notifications (`notify_*`) run through the tool's active grab. State
//! changes mark the receiving binding dirty; [`TabletManager::flush_frames`]
//! has to be called once at the end of each dispatch turn.

pub mod grab;
pub mod tablet;
pub mod tool;

pub use grab::{DefaultToolGrab, ImplicitGrab, TabletToolGrab};
pub use tablet::TabletV2;
pub use tool::{ToolButtons, ToolClientBinding, ToolGrabHandle, ToolState, TOOL_BUTTON_CAPACITY};

use std::collections::BTreeMap;
use std::mem;

use tracing::{debug, info, trace};

use crate::error::InputError;
use crate::protocol::{
    ButtonState, ClientId, ClientSink, ObjectId, ObjectIdAllocator, OutboundMessage,
    SerialSource, SurfaceHandle, TabletToolMessage,
};
use crate::translator::{DeviceId, DeviceInfo, ToolId, ToolInfo};
use grab::ToolGrabSlot;

/// A tool as exposed through `zwp_tablet_tool_v2`, with its active grab.
pub struct TabletToolV2 {
    state: ToolState,
    grab: ToolGrabSlot,
}

impl TabletToolV2 {
    pub fn state(&self) -> &ToolState {
        &self.state
    }
}

/// The `zwp_tablet_manager_v2` side of the seat.
///
/// Tracks which clients bound a tablet seat, every tablet and tool announced
/// to them and the grab each tool runs.
#[derive(Default)]
pub struct TabletManager {
    /// `zwp_tablet_seat_v2` object of every bound client.
    seat_bindings: BTreeMap<ClientId, ObjectId>,
    tablets: BTreeMap<DeviceId, TabletV2>,
    tools: BTreeMap<ToolId, TabletToolV2>,
    ids: ObjectIdAllocator,
}

impl TabletManager {
    /// Creates a manager with no clients, tablets or tools.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tablet(&self, device: DeviceId) -> Option<&TabletV2> {
        self.tablets.get(&device)
    }

    /// Protocol state of `tool`, if it is known.
    pub fn tool(&self, tool: ToolId) -> Option<&ToolState> {
        self.tools.get(&tool).map(|t| &t.state)
    }

    pub fn tools(&self) -> impl Iterator<Item = &ToolState> {
        self.tools.values().map(|t| &t.state)
    }

    /// The tablet seat object `client` bound.
    pub fn seat_binding(&self, client: ClientId) -> Option<ObjectId> {
        self.seat_bindings.get(&client).copied()
    }

    /// Binds `client`'s tablet seat object and announces every existing tablet
    /// and tool to it.
    pub fn bind_tablet_seat(
        &mut self,
        sink: &mut dyn ClientSink,
        client: ClientId,
        object: ObjectId,
    ) -> Result<(), InputError> {
        if self.seat_bindings.contains_key(&client) {
            return Err(InputError::AlreadyBound(client));
        }
        info!("TabletManager: {:?} bound the tablet seat as {:?}.", client, object);
        self.seat_bindings.insert(client, object);
        for tablet in self.tablets.values_mut() {
            tablet.announce(sink, &mut self.ids, client, object);
        }
        for tool in self.tools.values_mut() {
            tool.state.announce(sink, &mut self.ids, client, object);
        }
        Ok(())
    }

    /// Announces a new tablet to every bound client.
    pub fn add_tablet(&mut self, sink: &mut dyn ClientSink, device: DeviceId, info: DeviceInfo) {
        if self.tablets.contains_key(&device) {
            debug!("TabletManager: Tablet {:?} already known.", device);
            return;
        }
        info!("TabletManager: Adding tablet '{}' ({:?}).", info.name, device);
        let mut tablet = TabletV2::new(device, info);
        for (&client, &seat_object) in &self.seat_bindings {
            tablet.announce(sink, &mut self.ids, client, seat_object);
        }
        self.tablets.insert(device, tablet);
    }

    /// Takes every tool out of proximity that is focused through `device`, then
    /// sends `removed` for the tablet.
    pub fn remove_tablet(&mut self, sink: &mut dyn ClientSink, serials: &mut dyn SerialSource, device: DeviceId) {
        if !self.tablets.contains_key(&device) {
            debug!("TabletManager: Removal of unknown tablet {:?} ignored.", device);
            return;
        }
        let TabletManager { tools, tablets, .. } = self;
        for tool in tools.values_mut() {
            if let ToolGrabSlot::Implicit(grab) = &mut tool.grab {
                if grab.focused.map(|(tablet, _)| tablet) == Some(device) {
                    grab.focused = None;
                }
            }
            if tool.state.focused_tablet == Some(device) {
                ToolGrabHandle::new(&mut tool.state, tablets, sink, serials).send_proximity_out();
            }
        }
        if let Some(mut tablet) = self.tablets.remove(&device) {
            info!("TabletManager: Removing tablet '{}' ({:?}).", tablet.info.name, device);
            tablet.send_removed(sink);
        }
    }

    /// Announces a new tool to every bound client.
    pub fn add_tool(&mut self, sink: &mut dyn ClientSink, tool: ToolId, info: ToolInfo) {
        if self.tools.contains_key(&tool) {
            debug!("TabletManager: Tool {:?} already known.", tool);
            return;
        }
        info!("TabletManager: Adding {:?} tool {:?}.", info.tool_type, tool);
        let mut state = ToolState::new(tool, info);
        for (&client, &seat_object) in &self.seat_bindings {
            state.announce(sink, &mut self.ids, client, seat_object);
        }
        self.tools.insert(tool, TabletToolV2 { state, grab: ToolGrabSlot::default() });
    }

    /// Takes the tool out of proximity, ends its grab and sends `removed` to
    /// every binding.
    pub fn remove_tool(&mut self, sink: &mut dyn ClientSink, serials: &mut dyn SerialSource, tool: ToolId) {
        let TabletManager { tools, tablets, .. } = self;
        let Some(entry) = tools.get_mut(&tool) else {
            debug!("TabletManager: Removal of unknown tool {:?} ignored.", tool);
            return;
        };
        ToolGrabHandle::new(&mut entry.state, tablets, sink, serials).send_proximity_out();
        Self::finish_grab(entry, tablets, sink, serials);
        if let Some(mut entry) = tools.remove(&tool) {
            info!("TabletManager: Removing tool {:?}.", tool);
            for (client, binding) in mem::take(&mut entry.state.bindings) {
                sink.send(client, OutboundMessage::TabletTool {
                    object: binding.object,
                    message: TabletToolMessage::Removed,
                });
            }
        }
    }

    /// Timestamp carried by the next frames of `tool`.
    pub fn set_event_time(&mut self, tool: ToolId, time: u32) {
        if let Some(entry) = self.tools.get_mut(&tool) {
            entry.state.last_event_time = time;
        }
    }

    /// Runs `f` with a handle on `tool`, bypassing its grab.
    pub fn with_tool_handle<R>(
        &mut self,
        sink: &mut dyn ClientSink,
        serials: &mut dyn SerialSource,
        tool: ToolId,
        f: impl FnOnce(&mut ToolGrabHandle<'_>) -> R,
    ) -> Option<R> {
        let TabletManager { tools, tablets, .. } = self;
        let entry = tools.get_mut(&tool)?;
        let mut handle = ToolGrabHandle::new(&mut entry.state, tablets, sink, serials);
        Some(f(&mut handle))
    }

    fn with_grab(
        &mut self,
        sink: &mut dyn ClientSink,
        serials: &mut dyn SerialSource,
        tool: ToolId,
        f: impl FnOnce(&mut dyn TabletToolGrab, &mut ToolGrabHandle<'_>),
    ) {
        let TabletManager { tools, tablets, .. } = self;
        let Some(entry) = tools.get_mut(&tool) else {
            debug!("TabletManager: Event for unknown tool {:?} dropped.", tool);
            return;
        };
        let mut grab = mem::take(&mut entry.grab);
        let end_requested = {
            let mut handle = ToolGrabHandle::new(&mut entry.state, tablets, sink, serials);
            f(grab.as_dyn(), &mut handle);
            handle.end_requested
        };
        entry.grab = grab;
        if end_requested {
            Self::finish_grab(entry, tablets, sink, serials);
        }
    }

    /// Restores the default grab and lets the outgoing one clean up.
    fn finish_grab(
        entry: &mut TabletToolV2,
        tablets: &BTreeMap<DeviceId, TabletV2>,
        sink: &mut dyn ClientSink,
        serials: &mut dyn SerialSource,
    ) {
        let mut old = mem::take(&mut entry.grab);
        if old.is_default() {
            return;
        }
        trace!("TabletManager: Ending grab of tool {:?}.", entry.state.id);
        let mut handle = ToolGrabHandle::new(&mut entry.state, tablets, sink, serials);
        old.as_dyn().cancel(&mut handle);
    }

    /// Starts an implicit grab if `was_idle` tool got pressed on a surface
    /// while no other grab is active.
    fn maybe_start_implicit_grab(&mut self, tool: ToolId, was_idle: bool) {
        let Some(entry) = self.tools.get_mut(&tool) else {
            return;
        };
        if !was_idle || !entry.grab.is_default() || entry.state.is_idle() {
            return;
        }
        if let Some(surface) = entry.state.focus {
            trace!("TabletManager: Implicit grab of tool {:?} on {:?}.", tool, surface.id);
            entry.grab = ToolGrabSlot::Implicit(ImplicitGrab::new(entry.state.focused_tablet, surface));
        }
    }

    fn is_idle(&self, tool: ToolId) -> bool {
        self.tools.get(&tool).map_or(true, |t| t.state.is_idle())
    }

    // Grab-routed notifications

    /// Tool proximity over `surface`, through `tablet`.
    pub fn notify_proximity_in(
        &mut self,
        sink: &mut dyn ClientSink,
        serials: &mut dyn SerialSource,
        tool: ToolId,
        tablet: DeviceId,
        surface: SurfaceHandle,
    ) {
        self.with_grab(sink, serials, tool, |grab, handle| grab.proximity_in(handle, tablet, surface));
    }

    pub fn notify_proximity_out(&mut self, sink: &mut dyn ClientSink, serials: &mut dyn SerialSource, tool: ToolId) {
        self.with_grab(sink, serials, tool, |grab, handle| grab.proximity_out(handle));
    }

    pub fn notify_down(&mut self, sink: &mut dyn ClientSink, serials: &mut dyn SerialSource, tool: ToolId) {
        let was_idle = self.is_idle(tool);
        self.with_grab(sink, serials, tool, |grab, handle| grab.down(handle));
        self.maybe_start_implicit_grab(tool, was_idle);
    }

    pub fn notify_up(&mut self, sink: &mut dyn ClientSink, serials: &mut dyn SerialSource, tool: ToolId) {
        self.with_grab(sink, serials, tool, |grab, handle| grab.up(handle));
    }

    /// `x`/`y` are surface-local.
    pub fn notify_motion(&mut self, sink: &mut dyn ClientSink, serials: &mut dyn SerialSource, tool: ToolId, x: f64, y: f64) {
        self.with_grab(sink, serials, tool, |grab, handle| grab.motion(handle, x, y));
    }

    pub fn notify_pressure(&mut self, sink: &mut dyn ClientSink, serials: &mut dyn SerialSource, tool: ToolId, pressure: f64) {
        self.with_grab(sink, serials, tool, |grab, handle| grab.pressure(handle, pressure));
    }

    pub fn notify_distance(&mut self, sink: &mut dyn ClientSink, serials: &mut dyn SerialSource, tool: ToolId, distance: f64) {
        self.with_grab(sink, serials, tool, |grab, handle| grab.distance(handle, distance));
    }

    pub fn notify_tilt(&mut self, sink: &mut dyn ClientSink, serials: &mut dyn SerialSource, tool: ToolId, x: f64, y: f64) {
        self.with_grab(sink, serials, tool, |grab, handle| grab.tilt(handle, x, y));
    }

    pub fn notify_rotation(&mut self, sink: &mut dyn ClientSink, serials: &mut dyn SerialSource, tool: ToolId, degrees: f64) {
        self.with_grab(sink, serials, tool, |grab, handle| grab.rotation(handle, degrees));
    }

    pub fn notify_slider(&mut self, sink: &mut dyn ClientSink, serials: &mut dyn SerialSource, tool: ToolId, position: f64) {
        self.with_grab(sink, serials, tool, |grab, handle| grab.slider(handle, position));
    }

    pub fn notify_wheel(
        &mut self,
        sink: &mut dyn ClientSink,
        serials: &mut dyn SerialSource,
        tool: ToolId,
        degrees: f64,
        clicks: i32,
    ) {
        self.with_grab(sink, serials, tool, |grab, handle| grab.wheel(handle, degrees, clicks));
    }

    pub fn notify_button(
        &mut self,
        sink: &mut dyn ClientSink,
        serials: &mut dyn SerialSource,
        tool: ToolId,
        button: u32,
        state: ButtonState,
    ) {
        let was_idle = self.is_idle(tool);
        self.with_grab(sink, serials, tool, |grab, handle| grab.button(handle, button, state));
        if state == ButtonState::Pressed {
            self.maybe_start_implicit_grab(tool, was_idle);
        }
    }

    // Grab chain

    /// Installs `grab` on `tool`, ending whatever grab was active (an implicit
    /// grab reconciles its focus first).
    pub fn start_tool_grab(
        &mut self,
        sink: &mut dyn ClientSink,
        serials: &mut dyn SerialSource,
        tool: ToolId,
        grab: Box<dyn TabletToolGrab>,
    ) -> Result<(), InputError> {
        if !self.tools.contains_key(&tool) {
            return Err(InputError::UnknownTool(format!("{:?}", tool)));
        }
        self.end_tool_grab(sink, serials, tool);
        if let Some(entry) = self.tools.get_mut(&tool) {
            debug!("TabletManager: Starting grab on tool {:?}.", tool);
            entry.grab = ToolGrabSlot::Custom(grab);
        }
        Ok(())
    }

    /// Ends whatever grab `tool` runs. An implicit grab reconciles its focus.
    pub fn end_tool_grab(&mut self, sink: &mut dyn ClientSink, serials: &mut dyn SerialSource, tool: ToolId) {
        let TabletManager { tools, tablets, .. } = self;
        if let Some(entry) = tools.get_mut(&tool) {
            Self::finish_grab(entry, tablets, sink, serials);
        }
    }

    /// Whether an explicitly started grab is active on `tool`.
    pub fn has_tool_grab(&self, tool: ToolId) -> bool {
        self.tools.get(&tool).map_or(false, |t| matches!(t.grab, ToolGrabSlot::Custom(_)))
    }

    pub fn has_implicit_grab(&self, tool: ToolId) -> bool {
        self.tools.get(&tool).map_or(false, |t| t.grab.is_implicit())
    }

    // Frames

    /// Sends one `frame` to every binding that changed since the last flush.
    pub fn flush_frames(&mut self, sink: &mut dyn ClientSink) {
        for tool in self.tools.values_mut() {
            tool.state.flush_frames(sink);
        }
    }

    pub fn has_pending_frames(&self) -> bool {
        self.tools.values().any(|t| t.state.has_pending_frame())
    }

    // Client and surface lifecycle

    /// Forgets every object of `client`. Nothing is sent to it.
    pub fn client_disconnected(&mut self, sink: &mut dyn ClientSink, serials: &mut dyn SerialSource, client: ClientId) {
        if self.seat_bindings.remove(&client).is_some() {
            info!("TabletManager: Dropping tablet objects of {:?}.", client);
        }
        for tablet in self.tablets.values_mut() {
            tablet.bindings.remove(&client);
        }
        let TabletManager { tools, tablets, .. } = self;
        for entry in tools.values_mut() {
            entry.state.bindings.remove(&client);
            if entry.state.current_client == Some(client) {
                entry.state.current_client = None;
                entry.state.focus = None;
                entry.state.focused_tablet = None;
            }
            let mut end = false;
            if let ToolGrabSlot::Implicit(grab) = &mut entry.grab {
                if grab.focused.map(|(_, surface)| surface.client) == Some(client) {
                    grab.focused = None;
                }
                end = grab.original.client == client;
            }
            if end {
                Self::finish_grab(entry, tablets, sink, serials);
            }
        }
    }

    /// Takes tools out of proximity of a destroyed surface.
    pub fn surface_destroyed(&mut self, sink: &mut dyn ClientSink, serials: &mut dyn SerialSource, surface: SurfaceHandle) {
        let TabletManager { tools, tablets, .. } = self;
        for entry in tools.values_mut() {
            if entry.state.focus == Some(surface) {
                ToolGrabHandle::new(&mut entry.state, tablets, sink, serials).send_proximity_out();
            }
            let mut end = false;
            if let ToolGrabSlot::Implicit(grab) = &mut entry.grab {
                if grab.focused() == Some(surface) {
                    grab.focused = None;
                }
                end = grab.original == surface;
            }
            if end {
                Self::finish_grab(entry, tablets, sink, serials);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{NativeToolId, ToolCapabilities};
    use crate::protocol::{Fixed, RecordingSink, SerialCounter, SurfaceId, TabletMessage, TabletSeatMessage, ToolType};
    use pretty_assertions::assert_eq;

    const A: ClientId = ClientId::new(1);
    const B: ClientId = ClientId::new(2);
    const TABLET: DeviceId = DeviceId(1);
    const PEN: ToolId = ToolId(1);

    fn surface(id: u64, client: ClientId) -> SurfaceHandle {
        SurfaceHandle::new(SurfaceId::new(id), client)
    }

    fn pen_info() -> ToolInfo {
        ToolInfo {
            native: NativeToolId(7),
            tool_type: ToolType::Pen,
            hardware_serial: 0x1_0000_0002,
            hardware_id_wacom: 0,
            capabilities: ToolCapabilities::PRESSURE | ToolCapabilities::TILT,
            unique: true,
        }
    }

    fn tablet_info() -> DeviceInfo {
        DeviceInfo { name: "Wacom Intuos".into(), vendor: 0x056a, product: 0x0374, path: None }
    }

    struct Fixture {
        manager: TabletManager,
        sink: RecordingSink,
        serials: SerialCounter,
    }

    impl Fixture {
        /// Clients A and B bound, one tablet and one pen announced.
        fn new() -> Self {
            let mut fixture = Fixture {
                manager: TabletManager::new(),
                sink: RecordingSink::new(),
                serials: SerialCounter::default(),
            };
            for (client, object) in [(A, 10), (B, 20)] {
                fixture.manager.bind_tablet_seat(&mut fixture.sink, client, ObjectId::new(object)).unwrap();
            }
            fixture.manager.add_tablet(&mut fixture.sink, TABLET, tablet_info());
            fixture.manager.add_tool(&mut fixture.sink, PEN, pen_info());
            fixture.sink.clear();
            fixture
        }

        fn tool_messages(&mut self) -> Vec<(ClientId, TabletToolMessage)> {
            self.sink
                .take()
                .into_iter()
                .filter_map(|(client, m)| m.as_tablet_tool().cloned().map(|m| (client, m)))
                .collect()
        }

        fn proximity_in(&mut self, surface: SurfaceHandle) {
            self.manager.notify_proximity_in(&mut self.sink, &mut self.serials, PEN, TABLET, surface);
        }

        fn down(&mut self) {
            self.manager.notify_down(&mut self.sink, &mut self.serials, PEN);
        }

        fn up(&mut self) {
            self.manager.notify_up(&mut self.sink, &mut self.serials, PEN);
        }

        fn motion(&mut self, x: f64, y: f64) {
            self.manager.notify_motion(&mut self.sink, &mut self.serials, PEN, x, y);
        }

        fn flush(&mut self) {
            self.manager.flush_frames(&mut self.sink);
        }
    }

    fn motion(x: f64, y: f64) -> TabletToolMessage {
        TabletToolMessage::Motion { x: Fixed::from_f64(x), y: Fixed::from_f64(y) }
    }

    #[test]
    fn test_late_binding_client_gets_backfilled() {
        let mut manager = TabletManager::new();
        let mut sink = RecordingSink::new();
        manager.add_tablet(&mut sink, TABLET, tablet_info());
        manager.add_tool(&mut sink, PEN, pen_info());
        assert!(sink.is_empty());

        manager.bind_tablet_seat(&mut sink, A, ObjectId::new(10)).unwrap();
        let messages = sink.take();
        assert!(matches!(
            messages[0].1,
            OutboundMessage::TabletSeat { message: TabletSeatMessage::TabletAdded { .. }, .. }
        ));
        assert!(matches!(
            messages[1].1,
            OutboundMessage::Tablet { message: TabletMessage::Name(ref name), .. } if name == "Wacom Intuos"
        ));
        let tool_description: Vec<TabletToolMessage> =
            messages.iter().filter_map(|(_, m)| m.as_tablet_tool().cloned()).collect();
        assert_eq!(
            tool_description,
            vec![
                TabletToolMessage::Type(ToolType::Pen),
                TabletToolMessage::HardwareSerial { hi: 1, lo: 2 },
                TabletToolMessage::Capability(crate::protocol::ToolCapability::Tilt),
                TabletToolMessage::Capability(crate::protocol::ToolCapability::Pressure),
                TabletToolMessage::Done,
            ]
        );
        assert!(manager.tool(PEN).unwrap().binding(A).is_some());
        assert!(matches!(
            manager.bind_tablet_seat(&mut sink, A, ObjectId::new(11)),
            Err(InputError::AlreadyBound(client)) if client == A
        ));
    }

    #[test]
    fn test_updates_in_one_turn_share_a_frame() {
        let mut f = Fixture::new();
        f.proximity_in(surface(1, A));
        f.manager.set_event_time(PEN, 42);
        f.motion(1.0, 1.0);
        f.manager.notify_pressure(&mut f.sink, &mut f.serials, PEN, 0.5);
        f.manager.notify_tilt(&mut f.sink, &mut f.serials, PEN, 10.0, -5.0);
        assert!(f.manager.has_pending_frames());
        f.flush();
        f.flush();

        let messages = f.tool_messages();
        let frames: Vec<_> = messages.iter().filter(|(_, m)| matches!(m, TabletToolMessage::Frame { .. })).collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(messages.last().unwrap(), &(A, TabletToolMessage::Frame { time: 42 }));
        assert!(messages.contains(&(A, TabletToolMessage::Pressure(32767))));
        assert!(messages.iter().all(|(client, _)| *client == A));
        assert!(!f.manager.has_pending_frames());
    }

    #[test]
    fn test_proximity_out_fires_pending_frame_first() {
        let mut f = Fixture::new();
        f.proximity_in(surface(1, A));
        f.motion(2.0, 3.0);
        f.manager.notify_proximity_out(&mut f.sink, &mut f.serials, PEN);
        f.flush();

        let messages: Vec<_> = f.tool_messages().into_iter().map(|(_, m)| m).collect();
        assert_eq!(
            messages[1..],
            [
                motion(2.0, 3.0),
                TabletToolMessage::Frame { time: 0 },
                TabletToolMessage::ProximityOut,
                TabletToolMessage::Frame { time: 0 },
            ]
        );
        assert_eq!(f.manager.tool(PEN).unwrap().focused_surface(), None);
    }

    #[test]
    fn test_moving_between_surfaces_replays_held_state() {
        let mut f = Fixture::new();
        f.proximity_in(surface(1, A));
        f.manager.notify_button(&mut f.sink, &mut f.serials, PEN, 331, ButtonState::Pressed);
        // Drop the implicit grab so the tool follows proximity again.
        f.manager.end_tool_grab(&mut f.sink, &mut f.serials, PEN);
        f.flush();
        f.sink.clear();

        f.proximity_in(surface(2, B));
        let messages = f.tool_messages();
        let to_a: Vec<_> = messages.iter().filter(|(c, _)| *c == A).map(|(_, m)| m.clone()).collect();
        assert!(matches!(to_a[0], TabletToolMessage::Button { button: 331, state: ButtonState::Released, .. }));
        assert_eq!(to_a[1..], [TabletToolMessage::ProximityOut, TabletToolMessage::Frame { time: 0 }]);

        let to_b: Vec<_> = messages.iter().filter(|(c, _)| *c == B).map(|(_, m)| m.clone()).collect();
        assert!(matches!(to_b[0], TabletToolMessage::ProximityIn { .. }));
        assert!(matches!(to_b[1], TabletToolMessage::Button { button: 331, state: ButtonState::Pressed, .. }));
        assert_eq!(to_b.len(), 2);
        assert!(f.manager.has_pending_frames());
    }

    #[test]
    fn test_implicit_grab_pins_proximity_until_release() {
        let mut f = Fixture::new();
        f.proximity_in(surface(1, A));
        f.down();
        assert!(f.manager.has_implicit_grab(PEN));
        f.flush();
        f.sink.clear();

        // Tool wanders onto B while down: nothing reaches B yet.
        f.proximity_in(surface(2, B));
        f.motion(5.0, 5.0);
        f.flush();
        assert!(f.tool_messages().is_empty());

        f.up();
        f.flush();
        let messages = f.tool_messages();
        assert_eq!(
            messages[..4],
            [
                (A, TabletToolMessage::Up),
                (A, TabletToolMessage::Frame { time: 0 }),
                (A, TabletToolMessage::ProximityOut),
                (A, TabletToolMessage::Frame { time: 0 }),
            ]
        );
        assert!(matches!(messages[4], (B, TabletToolMessage::ProximityIn { .. })));
        assert_eq!(messages[5], (B, TabletToolMessage::Frame { time: 0 }));
        assert!(!f.manager.has_implicit_grab(PEN));
        assert_eq!(f.manager.tool(PEN).unwrap().focused_surface(), Some(surface(2, B)));
    }

    #[test]
    fn test_implicit_grab_without_wandering_keeps_focus() {
        let mut f = Fixture::new();
        f.proximity_in(surface(1, A));
        f.down();
        f.motion(1.0, 1.0);
        f.up();
        f.flush();

        let messages: Vec<_> = f.tool_messages().into_iter().map(|(_, m)| m).collect();
        assert!(matches!(messages[1], TabletToolMessage::Down { .. }));
        assert_eq!(messages[2..], [motion(1.0, 1.0), TabletToolMessage::Up, TabletToolMessage::Frame { time: 0 }]);
        assert_eq!(f.manager.tool(PEN).unwrap().focused_surface(), Some(surface(1, A)));
    }

    #[test]
    fn test_down_and_up_are_idempotent() {
        let mut f = Fixture::new();
        f.proximity_in(surface(1, A));
        f.down();
        f.down();
        let serial = f.manager.tool(PEN).unwrap().down_serial();
        assert_ne!(serial, 0);
        f.up();
        f.up();
        assert_eq!(f.manager.tool(PEN).unwrap().down_serial(), 0);

        let downs = f.tool_messages().into_iter().filter(|(_, m)| matches!(m, TabletToolMessage::Down { .. } | TabletToolMessage::Up)).count();
        assert_eq!(downs, 2);
    }

    struct Swallow;

    impl TabletToolGrab for Swallow {
        fn proximity_in(&mut self, _: &mut ToolGrabHandle<'_>, _: DeviceId, _: SurfaceHandle) {}
        fn proximity_out(&mut self, _: &mut ToolGrabHandle<'_>) {}
        fn down(&mut self, _: &mut ToolGrabHandle<'_>) {}
        fn up(&mut self, _: &mut ToolGrabHandle<'_>) {}
        fn motion(&mut self, _: &mut ToolGrabHandle<'_>, _: f64, _: f64) {}
        fn pressure(&mut self, _: &mut ToolGrabHandle<'_>, _: f64) {}
        fn distance(&mut self, _: &mut ToolGrabHandle<'_>, _: f64) {}
        fn tilt(&mut self, _: &mut ToolGrabHandle<'_>, _: f64, _: f64) {}
        fn rotation(&mut self, _: &mut ToolGrabHandle<'_>, _: f64) {}
        fn slider(&mut self, _: &mut ToolGrabHandle<'_>, _: f64) {}
        fn wheel(&mut self, _: &mut ToolGrabHandle<'_>, _: f64, _: i32) {}
        fn button(&mut self, _: &mut ToolGrabHandle<'_>, _: u32, _: ButtonState) {}
    }

    #[test]
    fn test_explicit_grab_replaces_implicit_and_swallows_events() {
        let mut f = Fixture::new();
        f.proximity_in(surface(1, A));
        f.down();
        f.proximity_in(surface(2, B));
        f.flush();
        f.sink.clear();

        f.manager.start_tool_grab(&mut f.sink, &mut f.serials, PEN, Box::new(Swallow)).unwrap();
        assert!(f.manager.has_tool_grab(PEN));
        assert!(!f.manager.has_implicit_grab(PEN));
        // The implicit grab reconciled towards B on its way out.
        assert_eq!(f.manager.tool(PEN).unwrap().current_client(), Some(B));
        f.flush();
        f.sink.clear();

        f.motion(3.0, 3.0);
        f.up();
        f.flush();
        assert!(f.tool_messages().is_empty());

        f.manager.end_tool_grab(&mut f.sink, &mut f.serials, PEN);
        assert!(!f.manager.has_tool_grab(PEN));
        assert!(matches!(
            f.manager.start_tool_grab(&mut f.sink, &mut f.serials, ToolId(99), Box::new(Swallow)),
            Err(InputError::UnknownTool(_))
        ));
    }

    #[test]
    fn test_disconnect_drops_bindings_and_focus_silently() {
        let mut f = Fixture::new();
        f.proximity_in(surface(1, A));
        f.motion(1.0, 1.0);
        f.manager.client_disconnected(&mut f.sink, &mut f.serials, A);
        f.sink.clear();
        f.flush();

        assert!(f.sink.is_empty());
        let tool = f.manager.tool(PEN).unwrap();
        assert_eq!(tool.current_client(), None);
        assert_eq!(tool.focused_surface(), None);
        assert!(tool.binding(A).is_none());
        assert_eq!(f.manager.tablet(TABLET).unwrap().binding(A), None);
        assert_eq!(f.manager.seat_binding(A), None);

        // The pen can still reach B.
        f.proximity_in(surface(2, B));
        assert!(f.tool_messages().iter().any(|(c, m)| *c == B && matches!(m, TabletToolMessage::ProximityIn { .. })));
    }

    #[test]
    fn test_disconnect_of_grab_origin_hands_tool_to_surface_below() {
        let mut f = Fixture::new();
        f.proximity_in(surface(1, A));
        f.down();
        f.proximity_in(surface(2, B));
        assert!(f.manager.has_implicit_grab(PEN));
        f.flush();
        f.sink.clear();

        f.manager.client_disconnected(&mut f.sink, &mut f.serials, A);
        f.flush();

        let messages = f.tool_messages();
        assert!(messages.iter().all(|(c, _)| *c == B));
        let to_b: Vec<_> = messages.into_iter().map(|(_, m)| m).collect();
        assert!(matches!(to_b[0], TabletToolMessage::ProximityIn { .. }));
        assert!(matches!(to_b[1], TabletToolMessage::Down { .. }));
        assert_eq!(to_b[2..], [TabletToolMessage::Frame { time: 0 }]);

        assert!(!f.manager.has_implicit_grab(PEN));
        let tool = f.manager.tool(PEN).unwrap();
        assert_eq!(tool.focused_surface(), Some(surface(2, B)));
        assert_eq!(tool.current_client(), Some(B));
        assert!(tool.is_down());
    }

    #[test]
    fn test_destroyed_surface_takes_tool_out_of_proximity() {
        let mut f = Fixture::new();
        f.proximity_in(surface(1, A));
        f.down();
        f.sink.clear();

        f.manager.surface_destroyed(&mut f.sink, &mut f.serials, surface(1, A));
        let messages: Vec<_> = f.tool_messages().into_iter().map(|(_, m)| m).collect();
        assert_eq!(messages[0], TabletToolMessage::Up);
        assert!(messages.contains(&TabletToolMessage::ProximityOut));
        assert!(!f.manager.has_implicit_grab(PEN));
        assert!(f.manager.tool(PEN).unwrap().is_down());
    }

    #[test]
    fn test_removing_tablet_and_tool_sends_removed() {
        let mut f = Fixture::new();
        f.proximity_in(surface(1, A));
        f.flush();
        f.sink.clear();

        f.manager.remove_tablet(&mut f.sink, &mut f.serials, TABLET);
        f.manager.remove_tool(&mut f.sink, &mut f.serials, PEN);
        let messages = f.sink.take();
        assert!(matches!(messages[0].1, OutboundMessage::TabletTool { message: TabletToolMessage::ProximityOut, .. }));
        let removed_tablets = messages
            .iter()
            .filter(|(_, m)| matches!(m, OutboundMessage::Tablet { message: TabletMessage::Removed, .. }))
            .count();
        let removed_tools = messages
            .iter()
            .filter(|(_, m)| matches!(m, OutboundMessage::TabletTool { message: TabletToolMessage::Removed, .. }))
            .count();
        assert_eq!((removed_tablets, removed_tools), (2, 2));
        assert!(f.manager.tool(PEN).is_none());
        assert!(f.manager.tablet(TABLET).is_none());
    }
}
