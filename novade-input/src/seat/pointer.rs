//! Pointer focus state and the direct `wl_pointer` send operations.

use tracing::{debug, trace};

use super::client::SeatClient;
use super::{PointerFocusChange, SeatState};
use crate::protocol::{
    pointer_version, Axis, AxisRelativeDirection, AxisSource, ButtonState, ClientId, ClientSink,
    Fixed, ObjectId, OutboundMessage, PointerMessage, SerialCounter, SurfaceHandle,
};
use crate::util::BoundedSet;

/// Maximum number of simultaneously pressed pointer buttons.
pub const POINTER_BUTTON_CAPACITY: usize = 16;

/// One axis (scroll) event as handed to the seat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisEvent {
    /// Event time in milliseconds.
    pub time: u32,
    /// Scrolled axis.
    pub axis: Axis,
    /// Continuous value; zero means the scroll sequence stopped.
    pub value: f64,
    /// High-resolution discrete steps, 120 per detent. Zero for non-wheel sources.
    pub value120: i32,
    /// Where the scroll came from. Fixed for one pointer frame.
    pub source: AxisSource,
    /// Whether the value follows or opposes the physical motion.
    pub relative_direction: AxisRelativeDirection,
}

/// Seat-wide pointer state.
///
/// Focus and the surface-local location are shared by every `wl_pointer` of
/// the focused client. The grab fields describe the button press that started
/// the current implicit grab.
#[derive(Debug, Clone)]
pub struct PointerState {
    pub(crate) focus: Option<SurfaceHandle>,
    pub(crate) sx: f64,
    pub(crate) sy: f64,
    pub(crate) buttons: BoundedSet<POINTER_BUTTON_CAPACITY>,
    pub(crate) grab_button: u32,
    pub(crate) grab_time: u32,
    pub(crate) grab_serial: u32,
    pub(crate) sent_axis_source: bool,
    pub(crate) cached_axis_source: Option<AxisSource>,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            focus: None,
            sx: f64::NAN,
            sy: f64::NAN,
            buttons: BoundedSet::new(),
            grab_button: 0,
            grab_time: 0,
            grab_serial: 0,
            sent_axis_source: false,
            cached_axis_source: None,
        }
    }
}

impl PointerState {
    pub fn focused_surface(&self) -> Option<SurfaceHandle> {
        self.focus
    }

    pub fn focused_client(&self) -> Option<ClientId> {
        self.focus.map(|s| s.client)
    }

    /// Last surface-local position. NaN while unfocused.
    pub fn location(&self) -> (f64, f64) {
        (self.sx, self.sy)
    }

    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    pub fn pressed_buttons(&self) -> &[u32] {
        self.buttons.as_slice()
    }

    pub fn grab_button(&self) -> u32 {
        self.grab_button
    }

    pub fn grab_time(&self) -> u32 {
        self.grab_time
    }

    /// Serial sent with the last first-button press. Only meaningful while
    /// exactly one button is held.
    pub fn grab_serial(&self) -> u32 {
        self.grab_serial
    }
}

/// Both coordinates land on the same wire value. A NaN baseline never matches.
fn same_on_wire(a: f64, b: f64) -> bool {
    !a.is_nan() && !b.is_nan() && Fixed::from_f64(a) == Fixed::from_f64(b)
}

fn mint(counter: &mut SerialCounter, client: &mut SeatClient) -> u32 {
    let serial = counter.next_serial();
    client.serials.record(serial);
    serial
}

fn send(sink: &mut dyn ClientSink, client: ClientId, object: ObjectId, message: PointerMessage) {
    sink.send(client, OutboundMessage::Pointer { object, message });
}

impl SeatState {
    pub(crate) fn pointer_enter(&mut self, sink: &mut dyn ClientSink, surface: SurfaceHandle, sx: f64, sy: f64) {
        self.set_pointer_focus(sink, Some(surface), sx, sy);
    }

    pub(crate) fn pointer_clear_focus(&mut self, sink: &mut dyn ClientSink) {
        self.set_pointer_focus(sink, None, f64::NAN, f64::NAN);
    }

    fn set_pointer_focus(&mut self, sink: &mut dyn ClientSink, new: Option<SurfaceHandle>, sx: f64, sy: f64) {
        let old = self.pointer.focus;
        if old == new {
            return;
        }

        let SeatState { clients, serials, .. } = self;

        if let Some(old_surface) = old {
            if let Some(client) = clients.get_mut(&old_surface.client) {
                let serial = mint(serials, client);
                for pointer in &client.pointers {
                    send(sink, old_surface.client, pointer.object, PointerMessage::Leave {
                        serial,
                        surface: old_surface.id,
                    });
                    if pointer.version >= pointer_version::FRAME {
                        send(sink, old_surface.client, pointer.object, PointerMessage::Frame);
                    }
                }
            }
        }

        if let Some(new_surface) = new {
            if let Some(client) = clients.get_mut(&new_surface.client) {
                let serial = mint(serials, client);
                for pointer in &mut client.pointers {
                    send(sink, new_surface.client, pointer.object, PointerMessage::Enter {
                        serial,
                        surface: new_surface.id,
                        sx: Fixed::from_f64(sx),
                        sy: Fixed::from_f64(sy),
                    });
                    if pointer.version >= pointer_version::FRAME {
                        send(sink, new_surface.client, pointer.object, PointerMessage::Frame);
                    }
                    pointer.last_enter_serial = serial;
                }
            }
        }

        self.pointer.focus = new;
        // Warp: the entry position is the new motion baseline.
        self.pointer.sx = sx;
        self.pointer.sy = sy;
        debug!("Seat '{}': pointer focus {:?} -> {:?}", self.name, old, new);
        self.signals.pointer_focus_change.emit(&PointerFocusChange { old, new, sx, sy });
    }

    pub(crate) fn pointer_send_motion(&mut self, sink: &mut dyn ClientSink, time: u32, sx: f64, sy: f64) {
        let Some(focus) = self.pointer.focus else {
            return;
        };
        let duplicate = same_on_wire(self.pointer.sx, sx) && same_on_wire(self.pointer.sy, sy);
        self.pointer.sx = sx;
        self.pointer.sy = sy;
        if duplicate {
            trace!("Seat '{}': motion to ({}, {}) rounds to the last sent position, skipped.", self.name, sx, sy);
            return;
        }

        if let Some(client) = self.clients.get(&focus.client) {
            for pointer in &client.pointers {
                send(sink, focus.client, pointer.object, PointerMessage::Motion {
                    time,
                    sx: Fixed::from_f64(sx),
                    sy: Fixed::from_f64(sy),
                });
            }
        }
    }

    /// Returns the serial sent with the event, or 0 when nobody is focused.
    pub(crate) fn pointer_send_button(
        &mut self,
        sink: &mut dyn ClientSink,
        time: u32,
        button: u32,
        state: ButtonState,
    ) -> u32 {
        let Some(focus) = self.pointer.focus else {
            return 0;
        };
        let SeatState { clients, serials, .. } = self;
        let Some(client) = clients.get_mut(&focus.client) else {
            return 0;
        };
        let serial = mint(serials, client);
        for pointer in &client.pointers {
            send(sink, focus.client, pointer.object, PointerMessage::Button { serial, time, button, state });
        }
        serial
    }

    pub(crate) fn pointer_send_axis(&mut self, sink: &mut dyn ClientSink, event: AxisEvent) {
        let Some(focus) = self.pointer.focus else {
            return;
        };
        let Some(client) = self.clients.get(&focus.client) else {
            return;
        };

        let send_source = if self.pointer.sent_axis_source {
            debug_assert_eq!(
                self.pointer.cached_axis_source,
                Some(event.source),
                "axis source changed within one pointer frame"
            );
            false
        } else {
            self.pointer.sent_axis_source = true;
            self.pointer.cached_axis_source = Some(event.source);
            true
        };

        for pointer in &client.pointers {
            let version = pointer.version;
            if send_source && version >= pointer_version::AXIS_SOURCE {
                send(sink, focus.client, pointer.object, PointerMessage::AxisSource(event.source));
            }
            if event.value != 0.0 {
                if version >= pointer_version::AXIS_RELATIVE_DIRECTION {
                    send(sink, focus.client, pointer.object, PointerMessage::AxisRelativeDirection {
                        axis: event.axis,
                        direction: event.relative_direction,
                    });
                }
                if event.value120 != 0 {
                    if version >= pointer_version::AXIS_VALUE120 {
                        send(sink, focus.client, pointer.object, PointerMessage::AxisValue120 {
                            axis: event.axis,
                            value120: event.value120,
                        });
                    } else if version >= pointer_version::AXIS_DISCRETE {
                        send(sink, focus.client, pointer.object, PointerMessage::AxisDiscrete {
                            axis: event.axis,
                            discrete: event.value120 / 120,
                        });
                    }
                }
                send(sink, focus.client, pointer.object, PointerMessage::Axis {
                    time: event.time,
                    axis: event.axis,
                    value: Fixed::from_f64(event.value),
                });
            } else if version >= pointer_version::AXIS_STOP {
                send(sink, focus.client, pointer.object, PointerMessage::AxisStop {
                    time: event.time,
                    axis: event.axis,
                });
            }
        }
    }

    pub(crate) fn pointer_send_frame(&mut self, sink: &mut dyn ClientSink) {
        let Some(focus) = self.pointer.focus else {
            return;
        };
        let Some(client) = self.clients.get(&focus.client) else {
            return;
        };
        self.pointer.sent_axis_source = false;
        for pointer in &client.pointers {
            if pointer.version >= pointer_version::FRAME {
                send(sink, focus.client, pointer.object, PointerMessage::Frame);
            }
        }
    }
}

/// What a pointer grab gets to work with while one of its handlers runs.
pub struct PointerInnerHandle<'a> {
    pub(crate) seat: &'a mut SeatState,
    pub(crate) sink: &'a mut dyn ClientSink,
    pub(crate) unset_requested: bool,
}

impl<'a> PointerInnerHandle<'a> {
    pub(crate) fn new(seat: &'a mut SeatState, sink: &'a mut dyn ClientSink) -> Self {
        Self { seat, sink, unset_requested: false }
    }

    pub fn state(&self) -> &PointerState {
        &self.seat.pointer
    }

    pub fn enter(&mut self, surface: SurfaceHandle, sx: f64, sy: f64) {
        self.seat.pointer_enter(&mut *self.sink, surface, sx, sy);
    }

    pub fn clear_focus(&mut self) {
        self.seat.pointer_clear_focus(&mut *self.sink);
    }

    pub fn motion(&mut self, time: u32, sx: f64, sy: f64) {
        self.seat.pointer_send_motion(&mut *self.sink, time, sx, sy);
    }

    pub fn button(&mut self, time: u32, button: u32, state: ButtonState) -> u32 {
        self.seat.pointer_send_button(&mut *self.sink, time, button, state)
    }

    pub fn axis(&mut self, event: AxisEvent) {
        self.seat.pointer_send_axis(&mut *self.sink, event);
    }

    pub fn frame(&mut self) {
        self.seat.pointer_send_frame(&mut *self.sink);
    }

    /// Ends the running grab once the current handler returns.
    pub fn unset_grab(&mut self) {
        self.unset_requested = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_baseline_never_matches() {
        assert!(!same_on_wire(f64::NAN, 0.0));
        assert!(!same_on_wire(0.0, f64::NAN));
        assert!(same_on_wire(10.0, 10.001));
        assert!(!same_on_wire(10.0, 10.01));
    }
}
