//! Glue between the translator, the seat and the tablet multiplexer.
//!
//! One backend event is processed to completion, client fan-out included,
//! before the next one. Tablet frames are the only deferred work: call
//! [`InputPipeline::flush_frames`] at the end of a dispatch turn, or let
//! [`schedule_frame_flush`] do it from a `calloop` idle.

use calloop::{Idle, LoopHandle};
use tracing::{debug, trace};

use crate::backend::{BackendEvent, ProximityState, TipState, ToolAxes};
use crate::config::InputConfig;
use crate::error::InputError;
use crate::protocol::{ClientId, ClientSink, ObjectId, SurfaceHandle};
use crate::seat::{AxisEvent, Seat};
use crate::tablet_v2::TabletManager;
use crate::translator::{
    CoordinateTransform, DeviceId, DeviceKind, InputNotification, InputTranslator,
    TabletToolAxisEvent, ToolId,
};

/// Surface picking, answered by the compositor.
pub trait SurfaceLocator {
    /// Width and height of the layout that normalized positions map onto.
    fn layout_size(&self) -> (f64, f64);

    /// The surface at layout position `(x, y)` and that position in
    /// surface-local coordinates.
    fn surface_at(&self, x: f64, y: f64) -> Option<(SurfaceHandle, f64, f64)>;
}

/// Owns the translator, the seat and the tablet manager of one seat.
pub struct InputPipeline {
    translator: InputTranslator,
    seat: Seat,
    tablets: TabletManager,
    pointer_position: (f64, f64),
}

impl InputPipeline {
    /// Creates a pipeline with the default tablet mapping.
    pub fn new(config: &InputConfig) -> Self {
        Self::from_translator(config, InputTranslator::new(config))
    }

    pub fn with_transform(config: &InputConfig, transform: impl CoordinateTransform + 'static) -> Self {
        Self::from_translator(config, InputTranslator::with_transform(config, transform))
    }

    fn from_translator(config: &InputConfig, translator: InputTranslator) -> Self {
        Self {
            translator,
            seat: Seat::from_config(&config.seat),
            tablets: TabletManager::new(),
            pointer_position: (0.0, 0.0),
        }
    }

    pub fn translator(&self) -> &InputTranslator {
        &self.translator
    }

    pub fn translator_mut(&mut self) -> &mut InputTranslator {
        &mut self.translator
    }

    pub fn seat(&self) -> &Seat {
        &self.seat
    }

    pub fn seat_mut(&mut self) -> &mut Seat {
        &mut self.seat
    }

    pub fn tablets(&self) -> &TabletManager {
        &self.tablets
    }

    pub fn tablets_mut(&mut self) -> &mut TabletManager {
        &mut self.tablets
    }

    pub fn bind_tablet_seat(
        &mut self,
        sink: &mut dyn ClientSink,
        client: ClientId,
        object: ObjectId,
    ) -> Result<(), InputError> {
        self.tablets.bind_tablet_seat(sink, client, object)
    }

    /// Pointer position in layout coordinates.
    pub fn pointer_position(&self) -> (f64, f64) {
        self.pointer_position
    }

    /// Translates `event` and routes everything it produced.
    ///
    /// A failed hotplug-add is returned after its rollback has been routed.
    pub fn handle_backend_event(
        &mut self,
        event: BackendEvent,
        locator: &dyn SurfaceLocator,
        sink: &mut dyn ClientSink,
    ) -> Result<(), InputError> {
        let result = self.translator.handle_event(event);
        let notifications: Vec<InputNotification> = self.translator.drain_notifications().collect();
        for notification in notifications {
            self.route(notification, locator, sink);
        }
        result
    }

    #[cfg(feature = "backend_libinput")]
    pub fn handle_libinput_event(
        &mut self,
        event: &input::Event,
        locator: &dyn SurfaceLocator,
        sink: &mut dyn ClientSink,
    ) -> Result<(), InputError> {
        let mut result = Ok(());
        for event in crate::backend::libinput::translate_event(event) {
            if let Err(e) = self.handle_backend_event(event, locator, sink) {
                result = Err(e);
            }
        }
        result
    }

    pub fn flush_frames(&mut self, sink: &mut dyn ClientSink) {
        self.tablets.flush_frames(sink);
    }

    pub fn has_pending_frames(&self) -> bool {
        self.tablets.has_pending_frames()
    }

    /// Forgets `client` in the seat and the tablet manager.
    pub fn client_disconnected(&mut self, sink: &mut dyn ClientSink, client: ClientId) {
        self.seat.client_disconnected(client);
        self.tablets.client_disconnected(sink, &mut self.seat, client);
    }

    pub fn surface_destroyed(&mut self, sink: &mut dyn ClientSink, surface: SurfaceHandle) {
        self.seat.surface_destroyed(sink, surface.id);
        self.tablets.surface_destroyed(sink, &mut self.seat, surface);
    }

    fn route(&mut self, notification: InputNotification, locator: &dyn SurfaceLocator, sink: &mut dyn ClientSink) {
        match notification {
            InputNotification::DeviceAdded(lifecycle) => {
                if lifecycle.kind == DeviceKind::TabletTool {
                    self.tablets.add_tablet(sink, lifecycle.device, lifecycle.info);
                }
            }
            InputNotification::DeviceRemoved(lifecycle) => {
                if lifecycle.kind == DeviceKind::TabletTool {
                    self.tablets.remove_tablet(sink, &mut self.seat, lifecycle.device);
                }
            }
            InputNotification::ToolAdded(lifecycle) => {
                self.tablets.add_tool(sink, lifecycle.tool, lifecycle.info);
            }
            InputNotification::ToolDestroyed(lifecycle) => {
                self.tablets.remove_tool(sink, &mut self.seat, lifecycle.tool);
            }
            InputNotification::PointerMotion(event) => {
                let (width, height) = locator.layout_size();
                let (x, y) = self.pointer_position;
                self.pointer_position = ((x + event.dx).clamp(0.0, width), (y + event.dy).clamp(0.0, height));
                self.pointer_moved(event.time_msec, locator, sink);
            }
            InputNotification::PointerMotionAbsolute(event) => {
                let (width, height) = locator.layout_size();
                self.pointer_position = (event.x * width, event.y * height);
                self.pointer_moved(event.time_msec, locator, sink);
            }
            InputNotification::PointerButton(event) => {
                self.seat.pointer_notify_button(sink, event.time_msec, event.button, event.state);
            }
            InputNotification::PointerAxis(event) => {
                self.seat.pointer_notify_axis(sink, AxisEvent {
                    time: event.time_msec,
                    axis: event.axis,
                    value: event.delta,
                    value120: event.value120,
                    source: event.source,
                    relative_direction: event.relative_direction,
                });
            }
            InputNotification::PointerFrame { .. } => {
                self.seat.pointer_notify_frame(sink);
            }
            InputNotification::TabletToolProximity(event) => {
                self.tablets.set_event_time(event.tool, event.time_msec);
                match event.state {
                    ProximityState::In => self.tool_entered(event.tool, event.device, event.x, event.y, locator, sink),
                    ProximityState::Out => self.tablets.notify_proximity_out(sink, &mut self.seat, event.tool),
                }
            }
            InputNotification::TabletToolAxis(event) => {
                self.tablets.set_event_time(event.tool, event.time_msec);
                self.tool_axes(&event, locator, sink);
            }
            InputNotification::TabletToolTip(event) => {
                self.tablets.set_event_time(event.tool, event.time_msec);
                match event.state {
                    TipState::Down => self.tablets.notify_down(sink, &mut self.seat, event.tool),
                    TipState::Up => self.tablets.notify_up(sink, &mut self.seat, event.tool),
                }
            }
            InputNotification::TabletToolButton(event) => {
                self.tablets.set_event_time(event.tool, event.time_msec);
                self.tablets.notify_button(sink, &mut self.seat, event.tool, event.button, event.state);
            }
            other => {
                trace!("InputPipeline: {:?} is not routed to clients.", other);
            }
        }
    }

    fn pointer_moved(&mut self, time: u32, locator: &dyn SurfaceLocator, sink: &mut dyn ClientSink) {
        let (x, y) = self.pointer_position;
        match locator.surface_at(x, y) {
            Some((surface, sx, sy)) => {
                self.seat.pointer_notify_enter(sink, surface, sx, sy);
                self.seat.pointer_notify_motion(sink, time, sx, sy);
            }
            None => self.seat.pointer_notify_clear_focus(sink),
        }
    }

    /// Moves a tool to normalized position `(x, y)`: proximity follows the
    /// surface under it, motion is surface-local.
    fn tool_moved(
        &mut self,
        tool: ToolId,
        tablet: DeviceId,
        x: f64,
        y: f64,
        locator: &dyn SurfaceLocator,
        sink: &mut dyn ClientSink,
    ) {
        let (width, height) = locator.layout_size();
        match locator.surface_at(x * width, y * height) {
            Some((surface, sx, sy)) => {
                self.tablets.notify_proximity_in(sink, &mut self.seat, tool, tablet, surface);
                self.tablets.notify_motion(sink, &mut self.seat, tool, sx, sy);
            }
            None => {
                debug!("InputPipeline: No surface under tool {:?}.", tool);
                self.tablets.notify_proximity_out(sink, &mut self.seat, tool);
            }
        }
    }

    /// Proximity-in. Its position already went out with the axis event the
    /// translator puts in front of it, so only proximity follows here.
    fn tool_entered(
        &mut self,
        tool: ToolId,
        tablet: DeviceId,
        x: f64,
        y: f64,
        locator: &dyn SurfaceLocator,
        sink: &mut dyn ClientSink,
    ) {
        let (width, height) = locator.layout_size();
        match locator.surface_at(x * width, y * height) {
            Some((surface, _, _)) => self.tablets.notify_proximity_in(sink, &mut self.seat, tool, tablet, surface),
            None => debug!("InputPipeline: Tool {:?} entered proximity outside any surface.", tool),
        }
    }

    fn tool_axes(&mut self, event: &TabletToolAxisEvent, locator: &dyn SurfaceLocator, sink: &mut dyn ClientSink) {
        let axes = event.updated_axes;
        let tool = event.tool;
        if axes.intersects(ToolAxes::X | ToolAxes::Y) {
            self.tool_moved(tool, event.device, event.x, event.y, locator, sink);
        }
        if axes.contains(ToolAxes::PRESSURE) {
            self.tablets.notify_pressure(sink, &mut self.seat, tool, event.pressure);
        }
        if axes.contains(ToolAxes::DISTANCE) {
            self.tablets.notify_distance(sink, &mut self.seat, tool, event.distance);
        }
        if axes.intersects(ToolAxes::TILT_X | ToolAxes::TILT_Y) {
            self.tablets.notify_tilt(sink, &mut self.seat, tool, event.tilt_x, event.tilt_y);
        }
        if axes.contains(ToolAxes::ROTATION) {
            self.tablets.notify_rotation(sink, &mut self.seat, tool, event.rotation);
        }
        if axes.contains(ToolAxes::SLIDER) {
            self.tablets.notify_slider(sink, &mut self.seat, tool, event.slider);
        }
        if axes.contains(ToolAxes::WHEEL) {
            self.tablets.notify_wheel(sink, &mut self.seat, tool, event.wheel_delta, event.wheel_discrete);
        }
    }
}

/// Loop state that can flush pending tablet frames.
pub trait FlushFrames {
    fn flush_frames(&mut self);
}

/// Flushes pending tablet frames once the current loop iteration has drained
/// its event sources.
pub fn schedule_frame_flush<'l, D: FlushFrames + 'l>(handle: &LoopHandle<'l, D>) -> Idle<'l> {
    handle.insert_idle(|data| {
        trace!("InputPipeline: Flushing tablet frames from idle.");
        data.flush_frames();
    })
}
