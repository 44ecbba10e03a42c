//! Conversion of libinput events (`input` crate) into [`BackendEvent`]s.
//!
//! libinput already normalizes absolute axes, so positions are requested in a
//! unit range and devices are described with `0.0..=1.0` ranges.

use input::event::keyboard::{KeyState as LiKeyState, KeyboardEvent, KeyboardEventTrait};
use input::event::pointer::{
    Axis as LiAxis, AxisSource as LiAxisSource, ButtonState as LiButtonState, PointerEvent,
    PointerEventTrait,
};
use input::event::switch::{Switch, SwitchEvent, SwitchEventTrait, SwitchState};
use input::event::tablet_pad::{TabletPadEvent, TabletPadEventTrait};
use input::event::tablet_tool::{
    ProximityState as LiProximityState, TabletTool, TabletToolEvent, TabletToolEventTrait,
    TabletToolType, TipState as LiTipState,
};
use input::event::touch::{TouchEvent, TouchEventPosition, TouchEventSlot, TouchEventTrait};
use input::event::{DeviceEvent, EventTrait};
use input::{AsRaw, Device, DeviceCapability, Event};
use tracing::trace;

use super::*;
use crate::protocol::{Axis, AxisRelativeDirection, AxisSource, ButtonState, ToolType};

/// Stable handle for a libinput device for as long as libinput keeps it alive.
pub fn native_device_id(device: &Device) -> NativeDeviceId {
    NativeDeviceId(device.as_raw() as usize as u64)
}

fn native_tool_id(tool: &TabletTool) -> NativeToolId {
    NativeToolId(tool.as_raw() as usize as u64)
}

pub fn describe_device(device: &Device) -> DeviceDescriptor {
    let mut capabilities = DeviceCapabilities::empty();
    for (capability, flag) in [
        (DeviceCapability::Keyboard, DeviceCapabilities::KEYBOARD),
        (DeviceCapability::Pointer, DeviceCapabilities::POINTER),
        (DeviceCapability::Touch, DeviceCapabilities::TOUCH),
        (DeviceCapability::TabletTool, DeviceCapabilities::TABLET_TOOL),
        (DeviceCapability::TabletPad, DeviceCapabilities::TABLET_PAD),
        (DeviceCapability::Switch, DeviceCapabilities::SWITCH),
    ] {
        if device.has_capability(capability) {
            capabilities |= flag;
        }
    }

    DeviceDescriptor::new(device.name(), capabilities)
        .with_usb_id(device.id_vendor(), device.id_product())
        .with_path(format!("/dev/input/{}", device.sysname()))
        .with_abs_ranges(AbsRange::new(0.0, 1.0), AbsRange::new(0.0, 1.0))
}

fn button_state(state: LiButtonState) -> ButtonState {
    match state {
        LiButtonState::Pressed => ButtonState::Pressed,
        LiButtonState::Released => ButtonState::Released,
    }
}

fn describe_tool(tool: &TabletTool) -> NativeToolDescriptor {
    let mut capabilities = ToolCapabilities::empty();
    capabilities.set(ToolCapabilities::PRESSURE, tool.has_pressure());
    capabilities.set(ToolCapabilities::DISTANCE, tool.has_distance());
    capabilities.set(ToolCapabilities::TILT, tool.has_tilt());
    capabilities.set(ToolCapabilities::ROTATION, tool.has_rotation());
    capabilities.set(ToolCapabilities::SLIDER, tool.has_slider());
    capabilities.set(ToolCapabilities::WHEEL, tool.has_wheel());

    let tool_type = match tool.tool_type() {
        Some(TabletToolType::Eraser) => ToolType::Eraser,
        Some(TabletToolType::Brush) => ToolType::Brush,
        Some(TabletToolType::Pencil) => ToolType::Pencil,
        Some(TabletToolType::Airbrush) => ToolType::Airbrush,
        Some(TabletToolType::Mouse) => ToolType::Mouse,
        Some(TabletToolType::Lens) => ToolType::Lens,
        Some(TabletToolType::Totem) => ToolType::Totem,
        _ => ToolType::Pen,
    };

    NativeToolDescriptor {
        id: native_tool_id(tool),
        tool_type,
        hardware_serial: tool.serial(),
        hardware_id_wacom: tool.tool_id(),
        capabilities,
        unique: tool.is_unique(),
    }
}

fn tool_axes<E: TabletToolEventTrait>(event: &E) -> RawToolAxes {
    let mut axes = RawToolAxes::default();
    if event.x_has_changed() {
        axes.changed |= ToolAxes::X;
    }
    if event.y_has_changed() {
        axes.changed |= ToolAxes::Y;
    }
    if event.pressure_has_changed() {
        axes.changed |= ToolAxes::PRESSURE;
    }
    if event.distance_has_changed() {
        axes.changed |= ToolAxes::DISTANCE;
    }
    if event.tilt_x_has_changed() {
        axes.changed |= ToolAxes::TILT_X;
    }
    if event.tilt_y_has_changed() {
        axes.changed |= ToolAxes::TILT_Y;
    }
    if event.rotation_has_changed() {
        axes.changed |= ToolAxes::ROTATION;
    }
    if event.slider_has_changed() {
        axes.changed |= ToolAxes::SLIDER;
    }
    if event.wheel_has_changed() {
        axes.changed |= ToolAxes::WHEEL;
    }

    axes.x = event.x_transformed(1);
    axes.y = event.y_transformed(1);
    axes.dx = event.dx();
    axes.dy = event.dy();
    axes.pressure = event.pressure();
    axes.distance = event.distance();
    axes.tilt_x = event.tilt_x();
    axes.tilt_y = event.tilt_y();
    axes.rotation = event.rotation();
    axes.slider = event.slider_position();
    axes.wheel_delta = event.wheel_delta();
    axes.wheel_discrete = event.wheel_delta_discrete() as i32;
    axes
}

fn tool_event<E: TabletToolEventTrait>(event: &E, kind: RawToolEventKind) -> RawTabletToolEvent {
    RawTabletToolEvent {
        time_usec: event.time_usec(),
        tool: describe_tool(&event.tool()),
        axes: tool_axes(event),
        kind,
    }
}

#[allow(deprecated)]
fn pointer_events(device: NativeDeviceId, event: &PointerEvent) -> Vec<BackendEvent> {
    let raw = match event {
        PointerEvent::Motion(e) => vec![RawPointerEvent::Motion {
            time_usec: e.time_usec(),
            dx: e.dx(),
            dy: e.dy(),
            dx_unaccel: e.dx_unaccelerated(),
            dy_unaccel: e.dy_unaccelerated(),
        }],
        PointerEvent::MotionAbsolute(e) => vec![RawPointerEvent::MotionAbsolute {
            time_usec: e.time_usec(),
            x: e.absolute_x_transformed(1),
            y: e.absolute_y_transformed(1),
        }],
        PointerEvent::Button(e) => vec![RawPointerEvent::Button {
            time_usec: e.time_usec(),
            button: e.button(),
            state: button_state(e.button_state()),
        }],
        PointerEvent::Axis(e) => {
            let source = match e.axis_source() {
                LiAxisSource::Wheel => AxisSource::Wheel,
                LiAxisSource::Finger => AxisSource::Finger,
                LiAxisSource::Continuous => AxisSource::Continuous,
                LiAxisSource::WheelTilt => AxisSource::WheelTilt,
            };
            let mut axes: Vec<RawPointerEvent> = [
                (LiAxis::Vertical, Axis::VerticalScroll),
                (LiAxis::Horizontal, Axis::HorizontalScroll),
            ]
            .into_iter()
            .filter(|(li_axis, _)| e.has_axis(*li_axis))
            .map(|(li_axis, axis)| RawPointerEvent::Axis {
                time_usec: e.time_usec(),
                source,
                axis,
                delta: e.axis_value(li_axis),
                value120: e
                    .axis_value_discrete(li_axis)
                    .map(|steps| (steps * 120.0) as i32)
                    .unwrap_or(0),
                relative_direction: AxisRelativeDirection::Identical,
            })
            .collect();
            if !axes.is_empty() {
                axes.push(RawPointerEvent::Frame { time_usec: e.time_usec() });
            }
            axes
        }
        _ => Vec::new(),
    };
    raw.into_iter().map(|event| BackendEvent::Pointer { device, event }).collect()
}

/// Converts one libinput event. Events the pipeline does not model (gestures,
/// newer scroll variants) yield nothing.
pub fn translate_event(event: &Event) -> Vec<BackendEvent> {
    let device = native_device_id(&event.device());
    let converted = match event {
        Event::Device(DeviceEvent::Added(_)) => vec![BackendEvent::DeviceAdded {
            device,
            descriptor: describe_device(&event.device()),
        }],
        Event::Device(DeviceEvent::Removed(_)) => vec![BackendEvent::DeviceRemoved { device }],
        Event::Keyboard(KeyboardEvent::Key(e)) => vec![BackendEvent::Keyboard {
            device,
            event: RawKeyboardEvent {
                time_usec: e.time_usec(),
                key: e.key(),
                state: match e.key_state() {
                    LiKeyState::Pressed => KeyState::Pressed,
                    LiKeyState::Released => KeyState::Released,
                },
            },
        }],
        Event::Pointer(e) => pointer_events(device, e),
        Event::Touch(e) => {
            let raw = match e {
                TouchEvent::Down(e) => Some(RawTouchEvent::Down {
                    time_usec: e.time_usec(),
                    slot: e.seat_slot() as i32,
                    x: e.x_transformed(1),
                    y: e.y_transformed(1),
                }),
                TouchEvent::Up(e) => Some(RawTouchEvent::Up {
                    time_usec: e.time_usec(),
                    slot: e.seat_slot() as i32,
                }),
                TouchEvent::Motion(e) => Some(RawTouchEvent::Motion {
                    time_usec: e.time_usec(),
                    slot: e.seat_slot() as i32,
                    x: e.x_transformed(1),
                    y: e.y_transformed(1),
                }),
                TouchEvent::Cancel(e) => Some(RawTouchEvent::Cancel { time_usec: e.time_usec() }),
                TouchEvent::Frame(e) => Some(RawTouchEvent::Frame { time_usec: e.time_usec() }),
                _ => None,
            };
            raw.map(|event| BackendEvent::Touch { device, event }).into_iter().collect()
        }
        Event::Tablet(e) => {
            let raw = match e {
                TabletToolEvent::Axis(e) => Some(tool_event(e, RawToolEventKind::Axis)),
                TabletToolEvent::Proximity(e) => {
                    let state = match e.proximity_state() {
                        LiProximityState::In => ProximityState::In,
                        LiProximityState::Out => ProximityState::Out,
                    };
                    Some(tool_event(e, RawToolEventKind::Proximity(state)))
                }
                TabletToolEvent::Tip(e) => {
                    let state = match e.tip_state() {
                        LiTipState::Down => TipState::Down,
                        LiTipState::Up => TipState::Up,
                    };
                    Some(tool_event(e, RawToolEventKind::Tip(state)))
                }
                TabletToolEvent::Button(e) => Some(tool_event(
                    e,
                    RawToolEventKind::Button {
                        button: e.button(),
                        state: button_state(e.button_state()),
                    },
                )),
                _ => None,
            };
            raw.map(|event| BackendEvent::TabletTool { device, event }).into_iter().collect()
        }
        Event::TabletPad(e) => {
            let raw = match e {
                TabletPadEvent::Button(e) => Some(RawTabletPadEvent::Button {
                    time_usec: e.time_usec(),
                    button: e.button_number(),
                    state: button_state(e.button_state()),
                }),
                TabletPadEvent::Ring(e) => Some(RawTabletPadEvent::Ring {
                    time_usec: e.time_usec(),
                    ring: e.number(),
                    position: e.position(),
                }),
                TabletPadEvent::Strip(e) => Some(RawTabletPadEvent::Strip {
                    time_usec: e.time_usec(),
                    strip: e.number(),
                    position: e.position(),
                }),
                _ => None,
            };
            raw.map(|event| BackendEvent::TabletPad { device, event }).into_iter().collect()
        }
        Event::Switch(SwitchEvent::Toggle(e)) => {
            let switch = match e.switch() {
                Some(Switch::Lid) => Some(SwitchKind::Lid),
                Some(Switch::TabletMode) => Some(SwitchKind::TabletMode),
                _ => None,
            };
            switch
                .map(|switch| BackendEvent::Switch {
                    device,
                    event: RawSwitchEvent {
                        time_usec: e.time_usec(),
                        switch,
                        on: e.switch_state() == SwitchState::On,
                    },
                })
                .into_iter()
                .collect()
        }
        _ => Vec::new(),
    };
    trace!("libinput: converted event into {} backend events", converted.len());
    converted
}
