//! The seat: pointer focus, serials, grab-serial validation and the grab chain.
//!
//! Operations come in two flavours. The `pointer_*` send operations act
//! directly on the focused client. The `pointer_notify_*` operations are what
//! input handling calls; they go through the active [`PointerGrab`], which for
//! the default grab ends up in the send operations again.

pub mod client;
pub mod grab;
pub mod pointer;

pub use client::{CursorImage, PointerResource, SeatClient, SerialHistory};
pub use grab::{DefaultPointerGrab, PointerGrab};
pub use pointer::{AxisEvent, PointerInnerHandle, PointerState, POINTER_BUTTON_CAPACITY};

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::config::SeatConfig;
use crate::error::InputError;
use crate::protocol::{
    ButtonState, ClientId, ClientSink, Fixed, ObjectId, OutboundMessage, PointerMessage,
    SerialCounter, SerialSource, SurfaceHandle, SurfaceId,
};
use crate::util::Signal;
use grab::ActiveGrab;

/// Published on every actual pointer focus change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerFocusChange {
    /// Surface that lost focus.
    pub old: Option<SurfaceHandle>,
    /// Surface that gained focus. `None` when focus was cleared.
    pub new: Option<SurfaceHandle>,
    /// Surface-local entry position. NaN when focus was cleared.
    pub sx: f64,
    /// See `sx`.
    pub sy: f64,
}

/// Listeners a compositor can hook onto the seat.
#[derive(Debug, Default)]
pub struct SeatSignals {
    /// Emitted after every pointer focus change.
    pub pointer_focus_change: Signal<PointerFocusChange>,
    /// Emitted when a custom pointer grab is installed.
    pub pointer_grab_begin: Signal<()>,
    /// Emitted when the default pointer grab is back.
    pub pointer_grab_end: Signal<()>,
}

/// Everything the seat owns except the active grab.
#[derive(Debug)]
pub struct SeatState {
    pub(crate) name: String,
    pub(crate) clients: BTreeMap<ClientId, SeatClient>,
    pub(crate) pointer: PointerState,
    pub(crate) serials: SerialCounter,
    pub(crate) signals: SeatSignals,
}

impl SeatState {
    fn next_serial_for(&mut self, client: ClientId) -> u32 {
        let serial = self.serials.next_serial();
        if let Some(seat_client) = self.clients.get_mut(&client) {
            seat_client.serials.record(serial);
        }
        serial
    }
}

/// A `wl_seat` with its pointer.
///
/// Owns the per-client resources, the serial counter and the active
/// pointer grab. Starts with the default grab and no focus.
pub struct Seat {
    state: SeatState,
    grab: ActiveGrab,
}

impl Seat {
    /// Creates an empty seat called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        info!("Seat '{}': created.", name);
        Self {
            state: SeatState {
                name,
                clients: BTreeMap::new(),
                pointer: PointerState::default(),
                serials: SerialCounter::default(),
                signals: SeatSignals::default(),
            },
            grab: ActiveGrab::default(),
        }
    }

    /// Creates a seat from the `[seat]` config section.
    pub fn from_config(config: &SeatConfig) -> Self {
        Self::new(config.name.clone())
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Pointer focus, location and pressed buttons.
    pub fn pointer(&self) -> &PointerState {
        &self.state.pointer
    }

    pub fn signals_mut(&mut self) -> &mut SeatSignals {
        &mut self.state.signals
    }

    pub fn client(&self, client: ClientId) -> Option<&SeatClient> {
        self.state.clients.get(&client)
    }

    // Client bookkeeping

    /// Registers a client that bound `wl_seat`. Binding again is harmless.
    pub fn bind_client(&mut self, client: ClientId) {
        self.state.clients.entry(client).or_insert_with(|| {
            debug!("Seat '{}': client {:?} bound.", self.state.name, client);
            SeatClient::new(client)
        });
    }

    pub fn is_bound(&self, client: ClientId) -> bool {
        self.state.clients.contains_key(&client)
    }

    /// Creates a `wl_pointer` for `client`. If the client already has pointer
    /// focus the new object gets an `enter` right away.
    pub fn get_pointer(
        &mut self,
        sink: &mut dyn ClientSink,
        client: ClientId,
        object: ObjectId,
        version: u32,
    ) -> Result<(), InputError> {
        let entered = self.state.pointer.focus.filter(|focus| focus.client == client);
        let SeatState { clients, serials, pointer, .. } = &mut self.state;
        let seat_client = clients.get_mut(&client).ok_or(InputError::UnknownClient(client))?;
        if seat_client.pointers.iter().any(|p| p.object == object) {
            return Err(InputError::AlreadyBound(client));
        }

        let mut resource = PointerResource::new(object, version);
        if let Some(focus) = entered {
            let serial = serials.next_serial();
            seat_client.serials.record(serial);
            sink.send(client, OutboundMessage::Pointer {
                object,
                message: PointerMessage::Enter {
                    serial,
                    surface: focus.id,
                    sx: Fixed::from_f64(pointer.sx),
                    sy: Fixed::from_f64(pointer.sy),
                },
            });
            if version >= crate::protocol::pointer_version::FRAME {
                sink.send(client, OutboundMessage::Pointer { object, message: PointerMessage::Frame });
            }
            resource.last_enter_serial = serial;
        }
        seat_client.pointers.push(resource);
        debug!("Seat '{}': client {:?} created wl_pointer {:?} (v{}).", self.state.name, client, object, version);
        Ok(())
    }

    /// Handles `wl_pointer.release` for one of `client`'s objects.
    pub fn release_pointer(&mut self, client: ClientId, object: ObjectId) -> Result<(), InputError> {
        let seat_client = self.state.clients.get_mut(&client).ok_or(InputError::UnknownClient(client))?;
        let before = seat_client.pointers.len();
        seat_client.pointers.retain(|p| p.object != object);
        if seat_client.pointers.len() == before {
            return Err(InputError::UnknownObject { client, object: object.raw() });
        }
        Ok(())
    }

    /// Forgets a disconnected client. Its objects are gone, so no leave is sent.
    pub fn client_disconnected(&mut self, client: ClientId) {
        if self.state.clients.remove(&client).is_none() {
            return;
        }
        info!("Seat '{}': client {:?} disconnected.", self.state.name, client);
        if let Some(old) = self.state.pointer.focus.filter(|focus| focus.client == client) {
            let pointer = &mut self.state.pointer;
            pointer.focus = None;
            pointer.sx = f64::NAN;
            pointer.sy = f64::NAN;
            self.state.signals.pointer_focus_change.emit(&PointerFocusChange {
                old: Some(old),
                new: None,
                sx: f64::NAN,
                sy: f64::NAN,
            });
        }
    }

    /// Clears pointer focus if it is on `surface`.
    pub fn surface_destroyed(&mut self, sink: &mut dyn ClientSink, surface: SurfaceId) {
        if self.state.pointer.focus.map(|f| f.id) == Some(surface) {
            debug!("Seat '{}': focused surface {:?} destroyed.", self.state.name, surface);
            self.state.pointer_clear_focus(sink);
        }
    }

    /// Handles `wl_pointer.set_cursor`. Accepted only from the focused client
    /// with the serial of the last `enter` on that object.
    pub fn set_cursor(
        &mut self,
        client: ClientId,
        object: ObjectId,
        serial: u32,
        cursor: CursorImage,
    ) -> Result<bool, InputError> {
        let focused = self.state.pointer.focused_client() == Some(client);
        let seat_client = self.state.clients.get_mut(&client).ok_or(InputError::UnknownClient(client))?;
        let resource = seat_client
            .pointer_mut(object)
            .ok_or(InputError::UnknownObject { client, object: object.raw() })?;
        if !focused || resource.last_enter_serial != serial {
            warn!(
                "Seat '{}': rejected set_cursor from {:?} (serial {}, expected {}, focused: {}).",
                self.state.name, client, serial, resource.last_enter_serial, focused
            );
            return Ok(false);
        }
        resource.cursor = Some(cursor);
        Ok(true)
    }

    /// Whether `serial` is one of the recent serials issued to `client`.
    pub fn validate_event_serial(&self, client: ClientId, serial: u32) -> bool {
        self.state.clients.get(&client).map_or(false, |c| c.serials.contains(serial))
    }

    /// Issues a serial and records it as sent to `client`.
    pub fn next_serial_for(&mut self, client: ClientId) -> u32 {
        self.state.next_serial_for(client)
    }

    // Direct send operations

    /// Moves focus to `surface` without consulting the grab.
    pub fn pointer_enter(&mut self, sink: &mut dyn ClientSink, surface: SurfaceHandle, sx: f64, sy: f64) {
        self.state.pointer_enter(sink, surface, sx, sy);
    }

    pub fn pointer_clear_focus(&mut self, sink: &mut dyn ClientSink) {
        self.state.pointer_clear_focus(sink);
    }

    pub fn pointer_send_motion(&mut self, sink: &mut dyn ClientSink, time: u32, sx: f64, sy: f64) {
        self.state.pointer_send_motion(sink, time, sx, sy);
    }

    pub fn pointer_send_button(&mut self, sink: &mut dyn ClientSink, time: u32, button: u32, state: ButtonState) -> u32 {
        self.state.pointer_send_button(sink, time, button, state)
    }

    pub fn pointer_send_axis(&mut self, sink: &mut dyn ClientSink, event: AxisEvent) {
        self.state.pointer_send_axis(sink, event);
    }

    pub fn pointer_send_frame(&mut self, sink: &mut dyn ClientSink) {
        self.state.pointer_send_frame(sink);
    }

    // Notifications, routed through the active grab

    fn with_grab<R>(
        &mut self,
        sink: &mut dyn ClientSink,
        f: impl FnOnce(&mut dyn PointerGrab, &mut PointerInnerHandle<'_>) -> R,
    ) -> R {
        let mut grab = std::mem::take(&mut self.grab);
        let (result, unset) = {
            let mut handle = PointerInnerHandle::new(&mut self.state, sink);
            let result = f(grab.as_dyn(), &mut handle);
            (result, handle.unset_requested)
        };
        self.grab = grab;
        if unset {
            self.end_pointer_grab();
        }
        result
    }

    pub fn pointer_notify_enter(&mut self, sink: &mut dyn ClientSink, surface: SurfaceHandle, sx: f64, sy: f64) {
        self.with_grab(sink, |grab, handle| grab.enter(handle, surface, sx, sy));
    }

    pub fn pointer_notify_clear_focus(&mut self, sink: &mut dyn ClientSink) {
        self.with_grab(sink, |grab, handle| grab.clear_focus(handle));
    }

    pub fn pointer_notify_motion(&mut self, sink: &mut dyn ClientSink, time: u32, sx: f64, sy: f64) {
        self.with_grab(sink, |grab, handle| grab.motion(handle, time, sx, sy));
    }

    /// Tracks the pressed-button set and the grab serial, then routes the
    /// button through the active grab. Returns the serial sent, or 0.
    pub fn pointer_notify_button(
        &mut self,
        sink: &mut dyn ClientSink,
        time: u32,
        button: u32,
        state: ButtonState,
    ) -> u32 {
        let pointer = &mut self.state.pointer;
        match state {
            ButtonState::Pressed => {
                if pointer.buttons.is_empty() {
                    pointer.grab_button = button;
                    pointer.grab_time = time;
                }
                pointer.buttons.add(button);
            }
            ButtonState::Released => {
                pointer.buttons.remove(button);
            }
        }

        let serial = self.with_grab(sink, |grab, handle| grab.button(handle, time, button, state));

        let pointer = &mut self.state.pointer;
        if serial != 0 && pointer.buttons.len() == 1 && state == ButtonState::Pressed {
            pointer.grab_serial = serial;
        }
        serial
    }

    pub fn pointer_notify_axis(&mut self, sink: &mut dyn ClientSink, event: AxisEvent) {
        self.with_grab(sink, |grab, handle| grab.axis(handle, event));
    }

    pub fn pointer_notify_frame(&mut self, sink: &mut dyn ClientSink) {
        self.with_grab(sink, |grab, handle| grab.frame(handle));
    }

    // Grab chain

    /// Installs a custom grab, ending any custom grab that was active.
    pub fn start_pointer_grab(&mut self, grab: Box<dyn PointerGrab>) {
        self.end_pointer_grab();
        self.grab = ActiveGrab::Custom(grab);
        debug!("Seat '{}': pointer grab started.", self.state.name);
        self.state.signals.pointer_grab_begin.emit(&());
    }

    /// Restores the default grab. The outgoing grab's `cancel` runs last.
    pub fn end_pointer_grab(&mut self) {
        if !self.grab.is_custom() {
            return;
        }
        let mut old = std::mem::take(&mut self.grab);
        debug!("Seat '{}': pointer grab ended.", self.state.name);
        self.state.signals.pointer_grab_end.emit(&());
        old.as_dyn().cancel();
    }

    pub fn has_pointer_grab(&self) -> bool {
        self.grab.is_custom()
    }

    /// Checks a client's claim to start an interactive grab (move, resize, drag).
    pub fn validate_pointer_grab_serial(&self, origin: Option<SurfaceId>, serial: u32) -> bool {
        let pointer = &self.state.pointer;
        if pointer.buttons.len() != 1 || pointer.grab_serial != serial {
            return false;
        }
        match origin {
            Some(origin) => pointer.focus.map(|f| f.id) == Some(origin),
            None => true,
        }
    }
}

impl SerialSource for Seat {
    fn next_serial_for(&mut self, client: ClientId) -> u32 {
        self.state.next_serial_for(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Axis, AxisRelativeDirection, AxisSource, RecordingSink};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    const A: ClientId = ClientId::new(1);
    const B: ClientId = ClientId::new(2);

    fn surface(id: u64, client: ClientId) -> SurfaceHandle {
        SurfaceHandle::new(SurfaceId::new(id), client)
    }

    fn seat_with_pointers(version: u32) -> (Seat, RecordingSink) {
        let mut sink = RecordingSink::new();
        let mut seat = Seat::new("seat0");
        for (client, object) in [(A, 10), (B, 20)] {
            seat.bind_client(client);
            seat.get_pointer(&mut sink, client, ObjectId::new(object), version).unwrap();
        }
        (seat, sink)
    }

    fn pointer_messages(sink: &mut RecordingSink) -> Vec<(ClientId, PointerMessage)> {
        sink.take()
            .into_iter()
            .filter_map(|(client, m)| m.as_pointer().cloned().map(|m| (client, m)))
            .collect()
    }

    fn scroll(value: f64, value120: i32, source: AxisSource) -> AxisEvent {
        AxisEvent {
            time: 5,
            axis: Axis::VerticalScroll,
            value,
            value120,
            source,
            relative_direction: AxisRelativeDirection::Identical,
        }
    }

    #[test]
    fn test_enter_leave_sequence_and_noop_reenter() {
        let (mut seat, mut sink) = seat_with_pointers(5);
        seat.pointer_notify_enter(&mut sink, surface(1, A), 1.0, 2.0);
        seat.pointer_notify_enter(&mut sink, surface(1, A), 3.0, 4.0);
        seat.pointer_notify_enter(&mut sink, surface(2, B), 0.5, 0.5);

        let messages = pointer_messages(&mut sink);
        assert_eq!(
            messages,
            vec![
                (A, PointerMessage::Enter { serial: 1, surface: SurfaceId::new(1), sx: Fixed::from_f64(1.0), sy: Fixed::from_f64(2.0) }),
                (A, PointerMessage::Frame),
                (A, PointerMessage::Leave { serial: 2, surface: SurfaceId::new(1) }),
                (A, PointerMessage::Frame),
                (B, PointerMessage::Enter { serial: 3, surface: SurfaceId::new(2), sx: Fixed::from_f64(0.5), sy: Fixed::from_f64(0.5) }),
                (B, PointerMessage::Frame),
            ]
        );
        assert!(seat.validate_event_serial(A, 2));
        assert!(!seat.validate_event_serial(A, 3));
    }

    #[test]
    fn test_old_clients_get_no_frame() {
        let (mut seat, mut sink) = seat_with_pointers(4);
        seat.pointer_enter(&mut sink, surface(1, A), 0.0, 0.0);
        seat.pointer_clear_focus(&mut sink);
        let messages = pointer_messages(&mut sink);
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|(_, m)| *m != PointerMessage::Frame));
        assert!(seat.pointer().location().0.is_nan());
    }

    #[test]
    fn test_motion_is_deduplicated_on_the_wire() {
        let (mut seat, mut sink) = seat_with_pointers(5);
        seat.pointer_enter(&mut sink, surface(1, A), 10.0, 10.0);
        sink.clear();

        seat.pointer_notify_motion(&mut sink, 1, 10.001, 10.0);
        seat.pointer_notify_motion(&mut sink, 2, 11.0, 10.0);
        seat.pointer_notify_motion(&mut sink, 3, 11.0009, 10.0002);

        let motions: Vec<_> = pointer_messages(&mut sink)
            .into_iter()
            .filter(|(_, m)| matches!(m, PointerMessage::Motion { .. }))
            .collect();
        assert_eq!(motions.len(), 1);
        assert_eq!(seat.pointer().location(), (11.0009, 10.0002));
    }

    #[test]
    fn test_grab_serial_validation() {
        let (mut seat, mut sink) = seat_with_pointers(5);
        seat.pointer_enter(&mut sink, surface(1, A), 0.0, 0.0);

        let serial = seat.pointer_notify_button(&mut sink, 100, 272, ButtonState::Pressed);
        assert_ne!(serial, 0);
        assert_eq!(seat.pointer().grab_button(), 272);
        assert_eq!(seat.pointer().grab_time(), 100);
        assert!(seat.validate_pointer_grab_serial(None, serial));
        assert!(seat.validate_pointer_grab_serial(Some(SurfaceId::new(1)), serial));
        assert!(!seat.validate_pointer_grab_serial(Some(SurfaceId::new(2)), serial));
        assert!(!seat.validate_pointer_grab_serial(None, serial + 1));

        let second = seat.pointer_notify_button(&mut sink, 101, 273, ButtonState::Pressed);
        assert_eq!(seat.pointer().grab_serial(), serial);
        assert!(!seat.validate_pointer_grab_serial(None, serial));
        assert!(!seat.validate_pointer_grab_serial(None, second));

        seat.pointer_notify_button(&mut sink, 102, 273, ButtonState::Released);
        assert!(seat.validate_pointer_grab_serial(None, serial));
    }

    #[test]
    fn test_unfocused_button_produces_no_serial() {
        let (mut seat, mut sink) = seat_with_pointers(5);
        assert_eq!(seat.pointer_notify_button(&mut sink, 1, 272, ButtonState::Pressed), 0);
        assert_eq!(seat.pointer().button_count(), 1);
        assert_eq!(seat.pointer().grab_serial(), 0);
    }

    #[test]
    fn test_axis_source_once_per_frame_and_stop_on_zero() {
        let (mut seat, mut sink) = seat_with_pointers(8);
        seat.pointer_enter(&mut sink, surface(1, A), 0.0, 0.0);
        sink.clear();

        seat.pointer_notify_axis(&mut sink, scroll(15.0, 120, AxisSource::Wheel));
        seat.pointer_notify_axis(&mut sink, AxisEvent { axis: Axis::HorizontalScroll, ..scroll(0.0, 0, AxisSource::Wheel) });
        seat.pointer_notify_frame(&mut sink);
        seat.pointer_notify_axis(&mut sink, scroll(1.5, 0, AxisSource::Finger));

        let messages: Vec<_> = pointer_messages(&mut sink).into_iter().map(|(_, m)| m).collect();
        assert_eq!(
            messages,
            vec![
                PointerMessage::AxisSource(AxisSource::Wheel),
                PointerMessage::AxisValue120 { axis: Axis::VerticalScroll, value120: 120 },
                PointerMessage::Axis { time: 5, axis: Axis::VerticalScroll, value: Fixed::from_f64(15.0) },
                PointerMessage::AxisStop { time: 5, axis: Axis::HorizontalScroll },
                PointerMessage::Frame,
                PointerMessage::AxisSource(AxisSource::Finger),
                PointerMessage::Axis { time: 5, axis: Axis::VerticalScroll, value: Fixed::from_f64(1.5) },
            ]
        );
    }

    #[test]
    fn test_version_five_gets_discrete_steps() {
        let (mut seat, mut sink) = seat_with_pointers(5);
        seat.pointer_enter(&mut sink, surface(1, A), 0.0, 0.0);
        sink.clear();
        seat.pointer_send_axis(&mut sink, scroll(30.0, 240, AxisSource::Wheel));
        let messages: Vec<_> = pointer_messages(&mut sink).into_iter().map(|(_, m)| m).collect();
        assert!(messages.contains(&PointerMessage::AxisDiscrete { axis: Axis::VerticalScroll, discrete: 2 }));
        assert!(!messages.iter().any(|m| matches!(m, PointerMessage::AxisValue120 { .. })));
    }

    struct SwallowingGrab {
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl PointerGrab for SwallowingGrab {
        fn enter(&mut self, _: &mut PointerInnerHandle<'_>, _: SurfaceHandle, _: f64, _: f64) {
            self.log.borrow_mut().push("enter");
        }
        fn clear_focus(&mut self, _: &mut PointerInnerHandle<'_>) {}
        fn motion(&mut self, _: &mut PointerInnerHandle<'_>, _: u32, _: f64, _: f64) {
            self.log.borrow_mut().push("motion");
        }
        fn button(&mut self, handle: &mut PointerInnerHandle<'_>, _: u32, _: u32, state: ButtonState) -> u32 {
            if state == ButtonState::Released {
                handle.unset_grab();
            }
            0
        }
        fn axis(&mut self, _: &mut PointerInnerHandle<'_>, _: AxisEvent) {}
        fn frame(&mut self, _: &mut PointerInnerHandle<'_>) {}
        fn cancel(&mut self) {
            self.log.borrow_mut().push("cancel");
        }
    }

    #[test]
    fn test_custom_grab_intercepts_and_ends_itself() {
        let (mut seat, mut sink) = seat_with_pointers(5);
        seat.pointer_enter(&mut sink, surface(1, A), 0.0, 0.0);
        sink.clear();

        let log = Rc::new(RefCell::new(Vec::new()));
        let ends = Rc::new(RefCell::new(0));
        {
            let ends = ends.clone();
            seat.signals_mut().pointer_grab_end.subscribe(move |_| *ends.borrow_mut() += 1);
        }
        seat.start_pointer_grab(Box::new(SwallowingGrab { log: log.clone() }));
        assert!(seat.has_pointer_grab());

        seat.pointer_notify_motion(&mut sink, 1, 5.0, 5.0);
        seat.pointer_notify_enter(&mut sink, surface(2, B), 0.0, 0.0);
        assert!(sink.is_empty());

        seat.pointer_notify_button(&mut sink, 2, 272, ButtonState::Pressed);
        seat.pointer_notify_button(&mut sink, 3, 272, ButtonState::Released);
        assert!(!seat.has_pointer_grab());
        assert_eq!(*log.borrow(), vec!["motion", "enter", "cancel"]);
        assert_eq!(*ends.borrow(), 1);

        seat.pointer_notify_motion(&mut sink, 4, 6.0, 6.0);
        assert_eq!(pointer_messages(&mut sink).len(), 1);
    }

    #[test]
    fn test_replacing_a_custom_grab_cancels_it() {
        let mut seat = Seat::new("seat0");
        let log = Rc::new(RefCell::new(Vec::new()));
        seat.start_pointer_grab(Box::new(SwallowingGrab { log: log.clone() }));
        seat.start_pointer_grab(Box::new(SwallowingGrab { log: log.clone() }));
        assert_eq!(*log.borrow(), vec!["cancel"]);
        seat.end_pointer_grab();
        seat.end_pointer_grab();
        assert_eq!(*log.borrow(), vec!["cancel", "cancel"]);
    }

    #[test]
    fn test_new_pointer_of_focused_client_gets_enter() {
        let (mut seat, mut sink) = seat_with_pointers(5);
        seat.pointer_enter(&mut sink, surface(1, A), 4.0, 4.0);
        sink.clear();
        seat.get_pointer(&mut sink, A, ObjectId::new(11), 3).unwrap();
        let messages = sink.take();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].1.object(), ObjectId::new(11));
        assert!(matches!(messages[0].1.as_pointer(), Some(PointerMessage::Enter { .. })));
    }

    #[test]
    fn test_set_cursor_requires_last_enter_serial() {
        let (mut seat, mut sink) = seat_with_pointers(5);
        seat.pointer_enter(&mut sink, surface(1, A), 0.0, 0.0);
        let cursor = CursorImage { surface: Some(SurfaceId::new(9)), hotspot_x: 5, hotspot_y: 10 };
        let enter_serial = seat.client(A).unwrap().pointers()[0].last_enter_serial;

        assert_eq!(seat.set_cursor(A, ObjectId::new(10), enter_serial + 7, cursor).unwrap(), false);
        assert_eq!(seat.set_cursor(B, ObjectId::new(20), 0, cursor).unwrap(), false);
        assert_eq!(seat.set_cursor(A, ObjectId::new(10), enter_serial, cursor).unwrap(), true);
        assert_eq!(seat.client(A).unwrap().pointers()[0].cursor, Some(cursor));
        assert!(matches!(
            seat.set_cursor(A, ObjectId::new(99), enter_serial, cursor),
            Err(InputError::UnknownObject { .. })
        ));
    }

    #[test]
    fn test_disconnect_and_surface_destruction_clear_focus() {
        let (mut seat, mut sink) = seat_with_pointers(5);
        seat.pointer_enter(&mut sink, surface(1, A), 0.0, 0.0);
        seat.client_disconnected(A);
        assert_eq!(seat.pointer().focused_surface(), None);
        assert!(!seat.is_bound(A));

        seat.pointer_enter(&mut sink, surface(2, B), 0.0, 0.0);
        sink.clear();
        seat.surface_destroyed(&mut sink, SurfaceId::new(2));
        assert_eq!(seat.pointer().focused_surface(), None);
        assert!(matches!(pointer_messages(&mut sink)[0].1, PointerMessage::Leave { .. }));
    }
}
