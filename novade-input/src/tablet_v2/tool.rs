//! Per-tool protocol state and the direct `zwp_tablet_tool_v2` send operations.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::tablet::TabletV2;
use crate::protocol::{
    ButtonState, ClientId, ClientSink, Fixed, ObjectId, ObjectIdAllocator, OutboundMessage,
    SerialSource, SurfaceHandle, TabletSeatMessage, TabletToolMessage,
};
use crate::translator::{DeviceId, ToolId, ToolInfo};

/// Maximum number of simultaneously pressed tool buttons.
pub const TOOL_BUTTON_CAPACITY: usize = 16;

/// Pressed tool buttons, each with the serial of the press sent for it.
///
/// Same layout discipline as [`BoundedSet`](crate::util::BoundedSet): live
/// slots first, removal moves the last live slot into the hole.
#[derive(Debug, Clone, Default)]
pub struct ToolButtons {
    buttons: [u32; TOOL_BUTTON_CAPACITY],
    serials: [u32; TOOL_BUTTON_CAPACITY],
    len: usize,
}

impl ToolButtons {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, button: u32) -> bool {
        self.position(button).is_some()
    }

    fn position(&self, button: u32) -> Option<usize> {
        self.buttons[..self.len].iter().position(|&b| b == button)
    }

    /// Slot of `button`, inserting it if needed. `None` when the set is full.
    fn press(&mut self, button: u32) -> Option<usize> {
        if let Some(index) = self.position(button) {
            return Some(index);
        }
        if self.len == TOOL_BUTTON_CAPACITY {
            warn!("ToolButtons: capacity {} exhausted, not tracking button {}", TOOL_BUTTON_CAPACITY, button);
            return None;
        }
        let index = self.len;
        self.buttons[index] = button;
        self.serials[index] = 0;
        self.len += 1;
        Some(index)
    }

    /// Removes `button` and returns the serial its press was sent with.
    fn release(&mut self, button: u32) -> Option<u32> {
        let index = self.position(button)?;
        let serial = self.serials[index];
        self.len -= 1;
        self.buttons[index] = self.buttons[self.len];
        self.serials[index] = self.serials[self.len];
        self.buttons[self.len] = 0;
        self.serials[self.len] = 0;
        Some(serial)
    }

    /// `(button, serial)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.buttons[..self.len].iter().copied().zip(self.serials[..self.len].iter().copied())
    }
}

/// One client's `zwp_tablet_tool_v2` object for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolClientBinding {
    /// The `zwp_tablet_tool_v2` object ID.
    pub object: ObjectId,
    /// A frame is owed to this object at the end of the dispatch turn.
    pub frame_pending: bool,
}

/// Protocol state of one tool, shared by all of its client bindings.
///
/// At most one client sees the tool in proximity at a time. Down state and
/// held buttons outlive proximity so they can be replayed to the next client.
#[derive(Debug, Clone)]
pub struct ToolState {
    /// Tool identity from the translator.
    pub(crate) id: ToolId,
    /// Type, serials and capabilities sent in the description.
    pub(crate) info: ToolInfo,
    /// Tool object of every client the tool was announced to.
    pub(crate) bindings: BTreeMap<ClientId, ToolClientBinding>,
    /// Surface the tool is in proximity of.
    pub(crate) focus: Option<SurfaceHandle>,
    /// Tablet the current proximity-in went through.
    pub(crate) focused_tablet: Option<DeviceId>,
    /// Owner of `focus`. Cleared together with it.
    pub(crate) current_client: Option<ClientId>,
    /// Serial of the last `proximity_in`.
    pub(crate) proximity_serial: u32,
    /// Serial of the last `down`. Zero while up.
    pub(crate) down_serial: u32,
    /// Tip contact, tracked even out of proximity.
    pub(crate) is_down: bool,
    /// Held buttons with the serial of the press each client last saw.
    pub(crate) buttons: ToolButtons,
    /// Timestamp for the next `frame`, in milliseconds.
    pub(crate) last_event_time: u32,
}

impl ToolState {
    /// Creates an idle tool out of proximity with no bindings.
    pub fn new(id: ToolId, info: ToolInfo) -> Self {
        Self {
            id,
            info,
            bindings: BTreeMap::new(),
            focus: None,
            focused_tablet: None,
            current_client: None,
            proximity_serial: 0,
            down_serial: 0,
            is_down: false,
            buttons: ToolButtons::default(),
            last_event_time: 0,
        }
    }

    pub fn id(&self) -> ToolId {
        self.id
    }

    pub fn info(&self) -> &ToolInfo {
        &self.info
    }

    pub fn focused_surface(&self) -> Option<SurfaceHandle> {
        self.focus
    }

    pub fn focused_tablet(&self) -> Option<DeviceId> {
        self.focused_tablet
    }

    /// Client the tool is in proximity of.
    pub fn current_client(&self) -> Option<ClientId> {
        self.current_client
    }

    pub fn is_down(&self) -> bool {
        self.is_down
    }

    pub fn down_serial(&self) -> u32 {
        self.down_serial
    }

    pub fn proximity_serial(&self) -> u32 {
        self.proximity_serial
    }

    pub fn buttons(&self) -> &ToolButtons {
        &self.buttons
    }

    pub fn binding(&self, client: ClientId) -> Option<&ToolClientBinding> {
        self.bindings.get(&client)
    }

    /// Neither down nor holding a button.
    pub fn is_idle(&self) -> bool {
        !self.is_down && self.buttons.is_empty()
    }

    pub fn has_pending_frame(&self) -> bool {
        self.bindings.values().any(|b| b.frame_pending)
    }

    /// Creates the tool object for `client` and describes the tool.
    pub(crate) fn announce(
        &mut self,
        sink: &mut dyn ClientSink,
        ids: &mut ObjectIdAllocator,
        client: ClientId,
        seat_object: ObjectId,
    ) {
        let object = ids.allocate();
        sink.send(client, OutboundMessage::TabletSeat {
            object: seat_object,
            message: TabletSeatMessage::ToolAdded { id: object },
        });
        let info = &self.info;
        let mut send = |message| sink.send(client, OutboundMessage::TabletTool { object, message });
        send(TabletToolMessage::Type(info.tool_type));
        if info.hardware_serial != 0 {
            send(TabletToolMessage::HardwareSerial {
                hi: (info.hardware_serial >> 32) as u32,
                lo: info.hardware_serial as u32,
            });
        }
        if info.hardware_id_wacom != 0 {
            send(TabletToolMessage::HardwareIdWacom {
                hi: (info.hardware_id_wacom >> 32) as u32,
                lo: info.hardware_id_wacom as u32,
            });
        }
        for capability in info.capabilities.announcements() {
            send(TabletToolMessage::Capability(capability));
        }
        send(TabletToolMessage::Done);
        self.bindings.insert(client, ToolClientBinding { object, frame_pending: false });
    }

    /// Sends the frame owed to `client` right away, if any.
    pub(crate) fn send_frame_now(&mut self, sink: &mut dyn ClientSink, client: ClientId) {
        let time = self.last_event_time;
        if let Some(binding) = self.bindings.get_mut(&client) {
            if binding.frame_pending {
                binding.frame_pending = false;
                sink.send(client, OutboundMessage::TabletTool {
                    object: binding.object,
                    message: TabletToolMessage::Frame { time },
                });
            }
        }
    }

    pub(crate) fn flush_frames(&mut self, sink: &mut dyn ClientSink) {
        let time = self.last_event_time;
        for (client, binding) in &mut self.bindings {
            if binding.frame_pending {
                binding.frame_pending = false;
                sink.send(*client, OutboundMessage::TabletTool {
                    object: binding.object,
                    message: TabletToolMessage::Frame { time },
                });
            }
        }
    }
}

/// Access to one tool's protocol state while a grab handler or a direct send
/// operation runs.
pub struct ToolGrabHandle<'a> {
    pub(crate) tool: &'a mut ToolState,
    pub(crate) tablets: &'a BTreeMap<DeviceId, TabletV2>,
    pub(crate) sink: &'a mut dyn ClientSink,
    pub(crate) serials: &'a mut dyn SerialSource,
    pub(crate) end_requested: bool,
}

impl<'a> ToolGrabHandle<'a> {
    pub(crate) fn new(
        tool: &'a mut ToolState,
        tablets: &'a BTreeMap<DeviceId, TabletV2>,
        sink: &'a mut dyn ClientSink,
        serials: &'a mut dyn SerialSource,
    ) -> Self {
        Self { tool, tablets, sink, serials, end_requested: false }
    }

    pub fn state(&self) -> &ToolState {
        self.tool
    }

    /// Ends the running grab once the current handler returns.
    pub fn end_grab(&mut self) {
        self.end_requested = true;
    }

    fn current(&self) -> Option<(ClientId, ObjectId)> {
        let client = self.tool.current_client?;
        self.tool.bindings.get(&client).map(|b| (client, b.object))
    }

    fn send_to(&mut self, client: ClientId, object: ObjectId, message: TabletToolMessage) {
        self.sink.send(client, OutboundMessage::TabletTool { object, message });
    }

    fn queue_frame(&mut self, client: ClientId) {
        if let Some(binding) = self.tool.bindings.get_mut(&client) {
            binding.frame_pending = true;
        }
    }

    /// Sends `message` to the client in proximity and owes it a frame.
    fn send_current(&mut self, message: TabletToolMessage) {
        if let Some((client, object)) = self.current() {
            self.send_to(client, object, message);
            self.queue_frame(client);
        }
    }

    /// Moves the tool into proximity of `surface` through `tablet`.
    ///
    /// Returns the proximity serial, or 0 when nothing was sent: the surface
    /// is already focused, or its client has no tablet or tool object.
    pub fn send_proximity_in(&mut self, tablet: DeviceId, surface: SurfaceHandle) -> u32 {
        if self.tool.focus == Some(surface) {
            return 0;
        }
        let client = surface.client;
        let Some(tablet_object) = self.tablets.get(&tablet).and_then(|t| t.binding(client)) else {
            debug!("TabletTool {:?}: {:?} has no tablet object for {:?}, dropping proximity-in.", self.tool.id, client, tablet);
            return 0;
        };
        let Some(tool_object) = self.tool.bindings.get(&client).map(|b| b.object) else {
            debug!("TabletTool {:?}: {:?} has no tool object, dropping proximity-in.", self.tool.id, client);
            return 0;
        };

        self.send_proximity_out();

        let serial = self.serials.next_serial_for(client);
        self.tool.current_client = Some(client);
        self.tool.focus = Some(surface);
        self.tool.focused_tablet = Some(tablet);
        self.tool.proximity_serial = serial;
        self.send_to(client, tool_object, TabletToolMessage::ProximityIn {
            serial,
            tablet: tablet_object,
            surface: surface.id,
        });

        // The new client learns what is already held.
        let held: Vec<u32> = self.tool.buttons.iter().map(|(button, _)| button).collect();
        for button in held {
            let press_serial = self.serials.next_serial_for(client);
            if let Some(index) = self.tool.buttons.position(button) {
                self.tool.buttons.serials[index] = press_serial;
            }
            self.send_to(client, tool_object, TabletToolMessage::Button {
                serial: press_serial,
                button,
                state: ButtonState::Pressed,
            });
        }
        if self.tool.is_down {
            self.emit_down();
        }

        self.queue_frame(client);
        serial
    }

    /// Takes the tool out of proximity of its focused surface. Held buttons and
    /// the down state are released towards the client but kept internally.
    pub fn send_proximity_out(&mut self) {
        let Some(client) = self.tool.current_client else {
            return;
        };
        if let Some(object) = self.tool.bindings.get(&client).map(|b| b.object) {
            let released: Vec<(u32, u32)> = self.tool.buttons.iter().collect();
            for (button, serial) in released {
                self.send_to(client, object, TabletToolMessage::Button {
                    serial,
                    button,
                    state: ButtonState::Released,
                });
            }
            if self.tool.is_down {
                self.send_to(client, object, TabletToolMessage::Up);
            }
            self.tool.send_frame_now(&mut *self.sink, client);
            self.send_to(client, object, TabletToolMessage::ProximityOut);
            let time = self.tool.last_event_time;
            self.send_to(client, object, TabletToolMessage::Frame { time });
        }
        self.tool.current_client = None;
        self.tool.focus = None;
        self.tool.focused_tablet = None;
    }

    fn emit_down(&mut self) {
        if let Some((client, object)) = self.current() {
            let serial = self.serials.next_serial_for(client);
            self.tool.down_serial = serial;
            self.send_to(client, object, TabletToolMessage::Down { serial });
            self.queue_frame(client);
        }
    }

    pub fn send_down(&mut self) {
        if self.tool.is_down {
            return;
        }
        self.tool.is_down = true;
        self.emit_down();
    }

    pub fn send_up(&mut self) {
        if !self.tool.is_down {
            return;
        }
        self.tool.is_down = false;
        self.tool.down_serial = 0;
        self.send_current(TabletToolMessage::Up);
    }

    pub fn send_motion(&mut self, x: f64, y: f64) {
        self.send_current(TabletToolMessage::Motion { x: Fixed::from_f64(x), y: Fixed::from_f64(y) });
    }

    /// `pressure` in `0.0..=1.0`.
    pub fn send_pressure(&mut self, pressure: f64) {
        self.send_current(TabletToolMessage::Pressure((pressure * 65535.0) as u32));
    }

    /// `distance` in `0.0..=1.0`.
    pub fn send_distance(&mut self, distance: f64) {
        self.send_current(TabletToolMessage::Distance((distance * 65535.0) as u32));
    }

    pub fn send_tilt(&mut self, x: f64, y: f64) {
        self.send_current(TabletToolMessage::Tilt { x: Fixed::from_f64(x), y: Fixed::from_f64(y) });
    }

    pub fn send_rotation(&mut self, degrees: f64) {
        self.send_current(TabletToolMessage::Rotation(Fixed::from_f64(degrees)));
    }

    /// `position` in `-1.0..=1.0`.
    pub fn send_slider(&mut self, position: f64) {
        self.send_current(TabletToolMessage::Slider((position * 65535.0) as i32));
    }

    pub fn send_wheel(&mut self, degrees: f64, clicks: i32) {
        self.send_current(TabletToolMessage::Wheel { degrees: Fixed::from_f64(degrees), clicks });
    }

    pub fn send_button(&mut self, button: u32, state: ButtonState) {
        let slot = match state {
            ButtonState::Pressed => self.tool.buttons.press(button),
            ButtonState::Released => {
                self.tool.buttons.release(button);
                None
            }
        };
        if let Some((client, object)) = self.current() {
            let serial = self.serials.next_serial_for(client);
            if let Some(index) = slot {
                self.tool.buttons.serials[index] = serial;
            }
            self.send_to(client, object, TabletToolMessage::Button { serial, button, state });
            self.queue_frame(client);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buttons_keep_serials_through_swap_remove() {
        let mut buttons = ToolButtons::default();
        for (button, serial) in [(331, 10), (332, 11), (333, 12)] {
            let index = buttons.press(button).unwrap();
            buttons.serials[index] = serial;
        }
        assert_eq!(buttons.press(332), Some(1));
        assert_eq!(buttons.release(331), Some(10));
        assert_eq!(buttons.iter().collect::<Vec<_>>(), vec![(333, 12), (332, 11)]);
        assert_eq!(buttons.release(331), None);
    }

    #[test]
    fn test_buttons_refuse_past_capacity() {
        let mut buttons = ToolButtons::default();
        for button in 1..=TOOL_BUTTON_CAPACITY as u32 {
            assert!(buttons.press(button).is_some());
        }
        assert_eq!(buttons.press(999), None);
        assert_eq!(buttons.len(), TOOL_BUTTON_CAPACITY);
    }
}
