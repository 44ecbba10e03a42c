//! Hardware event translation.
//!
//! The [`InputTranslator`] turns native device handles into capability-typed
//! abstract devices, owns their hotplug lifecycle, and owns the tablet tool
//! identities shared between tablets. Everything it produces is queued as an
//! [`InputNotification`] for the pipeline to drain, and lifecycle changes are
//! additionally published on [`TranslatorSignals`].

pub mod device;
pub mod events;
pub mod tool;
pub mod transform;

pub use device::{AbstractInputDevice, DeviceId, DeviceInfo, DeviceKind};
pub use events::*;
pub use tool::{HardwareToolIdentity, ToolArena, ToolId, ToolInfo};
pub use transform::{AbsoluteAxis, CoordinateTransform, RangeTransform};

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use tracing::{debug, error, info, trace, warn};

use crate::backend::{
    BackendEvent, DeviceDescriptor, NativeDeviceId, ProximityState, RawKeyboardEvent,
    RawPointerEvent, RawSwitchEvent, RawTabletPadEvent, RawTabletToolEvent, RawToolAxes,
    RawToolEventKind, RawTouchEvent,
};
use crate::config::InputConfig;
use crate::error::InputError;
use crate::util::Signal;

/// Lifecycle signals for listeners outside the pipeline.
#[derive(Debug, Default)]
pub struct TranslatorSignals {
    /// Emitted for every abstract device created.
    pub device_added: Signal<DeviceLifecycle>,
    /// Emitted for every abstract device destroyed, rollbacks included.
    pub device_removed: Signal<DeviceLifecycle>,
    /// Emitted when a tool identity is created.
    pub tool_added: Signal<ToolLifecycle>,
    /// Emitted when a tool identity is destroyed.
    pub tool_destroyed: Signal<ToolLifecycle>,
}

/// Turns backend events into [`InputNotification`]s.
///
/// Owns the abstract devices and the tool arena. Notifications queue up until
/// [`drain_notifications`](Self::drain_notifications) is called.
pub struct InputTranslator {
    devices: BTreeMap<DeviceId, AbstractInputDevice>,
    by_native: HashMap<NativeDeviceId, Vec<DeviceId>>,
    tools: ToolArena,
    next_device_id: u64,
    max_devices: usize,
    transform: Box<dyn CoordinateTransform>,
    notifications: VecDeque<InputNotification>,
    signals: TranslatorSignals,
}

impl InputTranslator {
    /// Creates a translator that maps tablets onto the whole layout.
    pub fn new(config: &InputConfig) -> Self {
        Self::with_transform(config, RangeTransform::new(config.tablet.map_to_region))
    }

    /// Creates a translator with a custom absolute-axis transform.
    pub fn with_transform(config: &InputConfig, transform: impl CoordinateTransform + 'static) -> Self {
        info!(
            "InputTranslator: Initializing (max abstract devices: {}).",
            config.devices.max_abstract_devices
        );
        Self {
            devices: BTreeMap::new(),
            by_native: HashMap::new(),
            tools: ToolArena::new(),
            next_device_id: 0,
            max_devices: config.devices.max_abstract_devices,
            transform: Box::new(transform),
            notifications: VecDeque::new(),
            signals: TranslatorSignals::default(),
        }
    }

    pub fn signals_mut(&mut self) -> &mut TranslatorSignals {
        &mut self.signals
    }

    pub fn drain_notifications(&mut self) -> impl Iterator<Item = InputNotification> + '_ {
        self.notifications.drain(..)
    }

    pub fn pending_notifications(&self) -> usize {
        self.notifications.len()
    }

    pub fn device(&self, id: DeviceId) -> Option<&AbstractInputDevice> {
        self.devices.get(&id)
    }

    pub fn devices(&self) -> impl Iterator<Item = &AbstractInputDevice> {
        self.devices.values()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Abstract devices derived from one physical device, in creation order.
    pub fn devices_for(&self, native: NativeDeviceId) -> &[DeviceId] {
        self.by_native.get(&native).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tools(&self) -> &ToolArena {
        &self.tools
    }

    pub fn tool_ref_count(&self, tool: ToolId) -> Option<usize> {
        self.tools.ref_count(tool)
    }

    /// Feeds one backend event through the translator.
    ///
    /// Only a failed hotplug-add is reported as an error. Events for unknown
    /// devices and repeated adds are logged and dropped.
    pub fn handle_event(&mut self, event: BackendEvent) -> Result<(), InputError> {
        match event {
            BackendEvent::DeviceAdded { device, descriptor } => match self.add_device(device, &descriptor) {
                Ok(_) => Ok(()),
                Err(InputError::DuplicateDevice(native)) => {
                    warn!("InputTranslator: Ignoring repeated hotplug-add for {:?} ('{}').", native, descriptor.name);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            BackendEvent::DeviceRemoved { device } => {
                if self.remove_device(device) == 0 {
                    debug!("InputTranslator: Hotplug-remove for untracked {:?}, ignoring.", device);
                }
                Ok(())
            }
            BackendEvent::Keyboard { device, event } => {
                self.handle_keyboard(device, event);
                Ok(())
            }
            BackendEvent::Pointer { device, event } => {
                self.handle_pointer(device, event);
                Ok(())
            }
            BackendEvent::Touch { device, event } => {
                self.handle_touch(device, event);
                Ok(())
            }
            BackendEvent::TabletTool { device, event } => {
                self.handle_tablet_tool(device, event);
                Ok(())
            }
            BackendEvent::TabletPad { device, event } => {
                self.handle_tablet_pad(device, event);
                Ok(())
            }
            BackendEvent::Switch { device, event } => {
                self.handle_switch(device, event);
                Ok(())
            }
        }
    }

    /// Creates one abstract device per capability of `native`.
    ///
    /// If any allocation fails, the siblings created so far are destroyed again
    /// and the error is returned; the translator stays usable.
    pub fn add_device(
        &mut self,
        native: NativeDeviceId,
        descriptor: &DeviceDescriptor,
    ) -> Result<Vec<DeviceId>, InputError> {
        if self.by_native.contains_key(&native) {
            return Err(InputError::DuplicateDevice(native));
        }

        info!(
            "InputTranslator: New device '{}' ({:?}) with capabilities {:?}",
            descriptor.name, native, descriptor.capabilities
        );
        let info = DeviceInfo {
            name: descriptor.name.clone(),
            vendor: descriptor.vendor,
            product: descriptor.product,
            path: descriptor.path.clone(),
        };

        let mut created = Vec::new();
        for kind in DeviceKind::from_capabilities(descriptor.capabilities) {
            if self.devices.len() >= self.max_devices {
                error!(
                    "InputTranslator: Could not allocate {} device for '{}', limit of {} reached. Rolling back.",
                    kind.as_str(),
                    descriptor.name,
                    self.max_devices
                );
                let allocated = self.devices.len();
                for id in created {
                    self.destroy_device(id);
                }
                return Err(InputError::DeviceAllocationFailed {
                    device_name: descriptor.name.clone(),
                    capability: kind.as_str(),
                    allocated,
                    limit: self.max_devices,
                });
            }

            self.next_device_id += 1;
            let id = DeviceId(self.next_device_id);
            self.devices.insert(
                id,
                AbstractInputDevice {
                    id,
                    kind,
                    native,
                    info: info.clone(),
                    abs_x: descriptor.abs_x,
                    abs_y: descriptor.abs_y,
                    tools: BTreeSet::new(),
                },
            );
            debug!("InputTranslator: Created {} device {:?} for '{}'", kind.as_str(), id, descriptor.name);
            self.publish_device_added(DeviceLifecycle { device: id, kind, info: info.clone() });
            created.push(id);
        }

        if created.is_empty() {
            warn!("InputTranslator: Device '{}' exposes no supported capability.", descriptor.name);
        }
        self.by_native.insert(native, created.clone());
        Ok(created)
    }

    /// Destroys every abstract device derived from `native`. Returns how many were removed.
    pub fn remove_device(&mut self, native: NativeDeviceId) -> usize {
        let Some(ids) = self.by_native.remove(&native) else {
            return 0;
        };
        info!("InputTranslator: Removing {} abstract devices of {:?}", ids.len(), native);
        let count = ids.len();
        for id in ids {
            self.destroy_device(id);
        }
        count
    }

    fn destroy_device(&mut self, id: DeviceId) {
        let Some(device) = self.devices.remove(&id) else {
            return;
        };
        for tool in &device.tools {
            if let Some(identity) = self.tools.release_reference(*tool, id) {
                self.publish_tool_destroyed(identity);
            }
        }
        debug!("InputTranslator: Destroyed {} device {:?}", device.kind.as_str(), id);
        self.publish_device_removed(DeviceLifecycle { device: id, kind: device.kind, info: device.info });
    }

    fn resolve(&self, native: NativeDeviceId, kind: DeviceKind) -> Option<DeviceId> {
        let found = self
            .by_native
            .get(&native)
            .and_then(|ids| ids.iter().copied().find(|id| self.devices.get(id).map(|d| d.kind) == Some(kind)));
        if found.is_none() {
            debug!("InputTranslator: No {} device for {:?}, dropping event.", kind.as_str(), native);
        }
        found
    }

    fn normalize(&self, device: DeviceId, x: f64, y: f64) -> (f64, f64) {
        match self.devices.get(&device) {
            Some(d) => (
                self.transform.normalize(d, AbsoluteAxis::X, x),
                self.transform.normalize(d, AbsoluteAxis::Y, y),
            ),
            None => (x, y),
        }
    }

    fn push(&mut self, notification: InputNotification) {
        trace!("InputTranslator: queued {:?}", notification);
        self.notifications.push_back(notification);
    }

    fn publish_device_added(&mut self, lifecycle: DeviceLifecycle) {
        self.signals.device_added.emit(&lifecycle);
        self.push(InputNotification::DeviceAdded(lifecycle));
    }

    fn publish_device_removed(&mut self, lifecycle: DeviceLifecycle) {
        self.signals.device_removed.emit(&lifecycle);
        self.push(InputNotification::DeviceRemoved(lifecycle));
    }

    fn publish_tool_destroyed(&mut self, identity: HardwareToolIdentity) {
        let lifecycle = ToolLifecycle { tool: identity.id(), info: identity.info().clone() };
        self.signals.tool_destroyed.emit(&lifecycle);
        self.push(InputNotification::ToolDestroyed(lifecycle));
    }

    fn handle_keyboard(&mut self, native: NativeDeviceId, event: RawKeyboardEvent) {
        let Some(device) = self.resolve(native, DeviceKind::Keyboard) else {
            return;
        };
        self.push(InputNotification::KeyboardKey(KeyboardKeyEvent {
            device,
            time_msec: time_msec(event.time_usec),
            key: event.key,
            state: event.state,
        }));
    }

    fn handle_pointer(&mut self, native: NativeDeviceId, event: RawPointerEvent) {
        let Some(device) = self.resolve(native, DeviceKind::Pointer) else {
            return;
        };
        // Axis events wait for the frame their hardware event closes with.
        let closes_frame = !matches!(event, RawPointerEvent::Axis { .. });
        let notification = match event {
            RawPointerEvent::Motion { time_usec, dx, dy, dx_unaccel, dy_unaccel } => {
                InputNotification::PointerMotion(PointerMotionEvent {
                    device,
                    time_msec: time_msec(time_usec),
                    dx,
                    dy,
                    dx_unaccel,
                    dy_unaccel,
                })
            }
            RawPointerEvent::MotionAbsolute { time_usec, x, y } => {
                let (x, y) = self.normalize(device, x, y);
                InputNotification::PointerMotionAbsolute(PointerMotionAbsoluteEvent {
                    device,
                    time_msec: time_msec(time_usec),
                    x,
                    y,
                })
            }
            RawPointerEvent::Button { time_usec, button, state } => {
                InputNotification::PointerButton(PointerButtonEvent {
                    device,
                    time_msec: time_msec(time_usec),
                    button,
                    state,
                })
            }
            RawPointerEvent::Axis { time_usec, source, axis, delta, value120, relative_direction } => {
                InputNotification::PointerAxis(PointerAxisEvent {
                    device,
                    time_msec: time_msec(time_usec),
                    source,
                    axis,
                    delta,
                    value120,
                    relative_direction,
                })
            }
            RawPointerEvent::Frame { .. } => {
                self.push(InputNotification::PointerFrame { device });
                return;
            }
        };
        self.push(notification);
        if closes_frame {
            self.push(InputNotification::PointerFrame { device });
        }
    }

    fn handle_touch(&mut self, native: NativeDeviceId, event: RawTouchEvent) {
        let Some(device) = self.resolve(native, DeviceKind::Touch) else {
            return;
        };
        let (time_usec, kind) = match event {
            RawTouchEvent::Down { time_usec, slot, x, y } => {
                let (x, y) = self.normalize(device, x, y);
                (time_usec, TouchEventKind::Down { slot, x, y })
            }
            RawTouchEvent::Up { time_usec, slot } => (time_usec, TouchEventKind::Up { slot }),
            RawTouchEvent::Motion { time_usec, slot, x, y } => {
                let (x, y) = self.normalize(device, x, y);
                (time_usec, TouchEventKind::Motion { slot, x, y })
            }
            RawTouchEvent::Cancel { time_usec } => (time_usec, TouchEventKind::Cancel),
            RawTouchEvent::Frame { time_usec } => (time_usec, TouchEventKind::Frame),
        };
        self.push(InputNotification::Touch(TouchEvent { device, time_msec: time_msec(time_usec), kind }));
    }

    fn handle_tablet_pad(&mut self, native: NativeDeviceId, event: RawTabletPadEvent) {
        let Some(device) = self.resolve(native, DeviceKind::TabletPad) else {
            return;
        };
        let (time_usec, kind) = match event {
            RawTabletPadEvent::Button { time_usec, button, state } => {
                (time_usec, TabletPadEventKind::Button { button, state })
            }
            RawTabletPadEvent::Ring { time_usec, ring, position } => {
                (time_usec, TabletPadEventKind::Ring { ring, position })
            }
            RawTabletPadEvent::Strip { time_usec, strip, position } => {
                (time_usec, TabletPadEventKind::Strip { strip, position })
            }
        };
        self.push(InputNotification::TabletPad(TabletPadEvent { device, time_msec: time_msec(time_usec), kind }));
    }

    fn handle_switch(&mut self, native: NativeDeviceId, event: RawSwitchEvent) {
        let Some(device) = self.resolve(native, DeviceKind::Switch) else {
            return;
        };
        self.push(InputNotification::Switch(SwitchToggleEvent {
            device,
            time_msec: time_msec(event.time_usec),
            switch: event.switch,
            on: event.on,
        }));
    }

    /// Resolves the tool of a tool event, creating it lazily and registering
    /// the tablet as an owner.
    fn tool_for_event(&mut self, device: DeviceId, event: &RawTabletToolEvent) -> ToolId {
        let (tool, created) = self.tools.get_or_create(&event.tool);
        if created {
            let lifecycle = ToolLifecycle { tool, info: ToolInfo::from(&event.tool) };
            self.signals.tool_added.emit(&lifecycle);
            self.push(InputNotification::ToolAdded(lifecycle));
        }
        if self.tools.ensure_tool_reference(tool, device) {
            if let Some(tablet) = self.devices.get_mut(&device) {
                tablet.tools.insert(tool);
            }
        }
        tool
    }

    fn axis_event(&self, device: DeviceId, tool: ToolId, time_msec: u32, axes: &RawToolAxes) -> TabletToolAxisEvent {
        let (x, y) = self.normalize(device, axes.x, axes.y);
        TabletToolAxisEvent {
            device,
            tool,
            time_msec,
            updated_axes: axes.changed,
            x,
            y,
            dx: axes.dx,
            dy: axes.dy,
            pressure: axes.pressure,
            distance: axes.distance,
            tilt_x: axes.tilt_x,
            tilt_y: axes.tilt_y,
            rotation: axes.rotation,
            slider: axes.slider,
            wheel_delta: axes.wheel_delta,
            wheel_discrete: axes.wheel_discrete,
        }
    }

    fn handle_tablet_tool(&mut self, native: NativeDeviceId, event: RawTabletToolEvent) {
        let Some(device) = self.resolve(native, DeviceKind::TabletTool) else {
            return;
        };
        if event.kind == RawToolEventKind::Proximity(ProximityState::Out)
            && !event.tool.unique
            && self.tools.lookup_native(event.tool.id).is_none()
        {
            debug!("InputTranslator: Proximity-out of unseen generic tool {:?} dropped.", event.tool.id);
            return;
        }
        let tool = self.tool_for_event(device, &event);
        let time_msec = time_msec(event.time_usec);
        let axis = self.axis_event(device, tool, time_msec, &event.axes);
        let leading_axis = !event.axes.changed.is_empty();

        match event.kind {
            RawToolEventKind::Axis => self.push(InputNotification::TabletToolAxis(axis)),
            RawToolEventKind::Proximity(ProximityState::In) => {
                if leading_axis {
                    self.push(InputNotification::TabletToolAxis(axis));
                }
                self.push(InputNotification::TabletToolProximity(TabletToolProximityEvent {
                    device,
                    tool,
                    time_msec,
                    state: ProximityState::In,
                    x: axis.x,
                    y: axis.y,
                }));
            }
            RawToolEventKind::Proximity(ProximityState::Out) => {
                self.push(InputNotification::TabletToolProximity(TabletToolProximityEvent {
                    device,
                    tool,
                    time_msec,
                    state: ProximityState::Out,
                    x: axis.x,
                    y: axis.y,
                }));
                if !event.tool.unique {
                    self.destroy_generic_tool(tool);
                }
            }
            RawToolEventKind::Tip(state) => {
                if leading_axis {
                    self.push(InputNotification::TabletToolAxis(axis));
                }
                self.push(InputNotification::TabletToolTip(TabletToolTipEvent {
                    device,
                    tool,
                    time_msec,
                    state,
                    x: axis.x,
                    y: axis.y,
                }));
            }
            RawToolEventKind::Button { button, state } => {
                if leading_axis {
                    self.push(InputNotification::TabletToolAxis(axis));
                }
                self.push(InputNotification::TabletToolButton(TabletToolButtonEvent {
                    device,
                    tool,
                    time_msec,
                    button,
                    state,
                }));
            }
        }
    }

    /// A tool the hardware cannot re-identify is gone once it leaves proximity.
    fn destroy_generic_tool(&mut self, tool: ToolId) {
        let owners: Vec<DeviceId> = match self.tools.get(tool) {
            Some(identity) => identity.owners().collect(),
            None => return,
        };
        debug_assert_eq!(owners.len(), 1, "generic tool {:?} shared by several tablets", tool);
        for owner in &owners {
            if let Some(tablet) = self.devices.get_mut(owner) {
                tablet.tools.remove(&tool);
            }
        }
        if let Some(identity) = self.tools.destroy(tool) {
            debug!("InputTranslator: Generic tool {:?} left proximity, destroyed.", tool);
            self.publish_tool_destroyed(identity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        AbsRange, DeviceCapabilities, KeyState, NativeToolDescriptor, NativeToolId, TipState,
        ToolAxes, ToolCapabilities,
    };
    use crate::protocol::ToolType;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    const TABLET: NativeDeviceId = NativeDeviceId(10);

    fn translator(max: usize) -> InputTranslator {
        let mut config = InputConfig::default();
        config.devices.max_abstract_devices = max;
        InputTranslator::new(&config)
    }

    fn tablet_descriptor() -> DeviceDescriptor {
        DeviceDescriptor::new("Wacom Intuos", DeviceCapabilities::TABLET_TOOL | DeviceCapabilities::TABLET_PAD)
            .with_abs_ranges(AbsRange::new(0.0, 1000.0), AbsRange::new(0.0, 500.0))
    }

    fn tool_event(native_tool: u64, unique: bool, kind: RawToolEventKind, axes: RawToolAxes) -> BackendEvent {
        BackendEvent::TabletTool {
            device: TABLET,
            event: RawTabletToolEvent {
                time_usec: 5_000,
                tool: NativeToolDescriptor {
                    id: NativeToolId(native_tool),
                    tool_type: ToolType::Pen,
                    hardware_serial: 42,
                    hardware_id_wacom: 7,
                    capabilities: ToolCapabilities::PRESSURE,
                    unique,
                },
                axes,
                kind,
            },
        }
    }

    #[test]
    fn test_hotplug_creates_one_device_per_capability() {
        let mut t = translator(16);
        let ids = t.add_device(TABLET, &tablet_descriptor()).unwrap();
        assert_eq!(ids.len(), 2);
        let kinds: Vec<_> = ids.iter().map(|id| t.device(*id).unwrap().kind()).collect();
        assert_eq!(kinds, vec![DeviceKind::TabletTool, DeviceKind::TabletPad]);

        let added = t
            .drain_notifications()
            .filter(|n| matches!(n, InputNotification::DeviceAdded(_)))
            .count();
        assert_eq!(added, 2);

        assert_eq!(t.remove_device(TABLET), 2);
        assert_eq!(t.device_count(), 0);
        let removed = t
            .drain_notifications()
            .filter(|n| matches!(n, InputNotification::DeviceRemoved(_)))
            .count();
        assert_eq!(removed, 2);
    }

    #[test]
    fn test_repeated_add_is_ignored() {
        let mut t = translator(16);
        let add = BackendEvent::DeviceAdded { device: TABLET, descriptor: tablet_descriptor() };
        t.handle_event(add.clone()).unwrap();
        t.handle_event(add).unwrap();
        assert_eq!(t.device_count(), 2);
    }

    #[test]
    fn test_allocation_failure_rolls_back_siblings() {
        let mut t = translator(1);
        let err = t.add_device(TABLET, &tablet_descriptor()).unwrap_err();
        assert!(matches!(err, InputError::DeviceAllocationFailed { capability: "tablet-pad", .. }));
        assert_eq!(t.device_count(), 0);
        assert!(t.devices_for(TABLET).is_empty());

        let lifecycle: Vec<_> = t
            .drain_notifications()
            .map(|n| match n {
                InputNotification::DeviceAdded(d) => ("added", d.kind),
                InputNotification::DeviceRemoved(d) => ("removed", d.kind),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(lifecycle, vec![("added", DeviceKind::TabletTool), ("removed", DeviceKind::TabletTool)]);

        // Still usable afterwards.
        let keyboard = DeviceDescriptor::new("kbd", DeviceCapabilities::KEYBOARD);
        assert_eq!(t.add_device(NativeDeviceId(2), &keyboard).unwrap().len(), 1);
    }

    #[test]
    fn test_events_for_unknown_devices_are_dropped() {
        let mut t = translator(16);
        t.handle_event(BackendEvent::Keyboard {
            device: NativeDeviceId(99),
            event: RawKeyboardEvent { time_usec: 1, key: 30, state: KeyState::Pressed },
        })
        .unwrap();
        assert_eq!(t.pending_notifications(), 0);
    }

    #[test]
    fn test_tool_axes_are_normalized_and_masked() {
        let mut t = translator(16);
        t.add_device(TABLET, &tablet_descriptor()).unwrap();
        t.drain_notifications().for_each(drop);

        let axes = RawToolAxes {
            changed: ToolAxes::X | ToolAxes::Y | ToolAxes::PRESSURE,
            x: 250.0,
            y: 250.0,
            dx: -3.0,
            pressure: 0.5,
            ..Default::default()
        };
        t.handle_event(tool_event(1, true, RawToolEventKind::Tip(TipState::Down), axes)).unwrap();

        let notifications: Vec<_> = t.drain_notifications().collect();
        assert!(matches!(notifications[0], InputNotification::ToolAdded(_)));
        match &notifications[1] {
            InputNotification::TabletToolAxis(axis) => {
                assert_eq!(axis.updated_axes, ToolAxes::X | ToolAxes::Y | ToolAxes::PRESSURE);
                assert_eq!((axis.x, axis.y), (0.25, 0.5));
                assert_eq!(axis.dx, -3.0);
                assert_eq!(axis.time_msec, 5);
            }
            other => panic!("expected axis, got {:?}", other),
        }
        assert!(matches!(
            notifications[2],
            InputNotification::TabletToolTip(TabletToolTipEvent { state: TipState::Down, .. })
        ));
    }

    #[test]
    fn test_generic_tool_is_destroyed_on_proximity_out() {
        let mut t = translator(16);
        t.add_device(TABLET, &tablet_descriptor()).unwrap();
        let destroyed = Rc::new(Cell::new(0));
        {
            let destroyed = destroyed.clone();
            t.signals_mut().tool_destroyed.subscribe(move |_| destroyed.set(destroyed.get() + 1));
        }

        t.handle_event(tool_event(3, false, RawToolEventKind::Proximity(ProximityState::In), RawToolAxes::default()))
            .unwrap();
        assert_eq!(t.tools().len(), 1);
        t.handle_event(tool_event(3, false, RawToolEventKind::Proximity(ProximityState::Out), RawToolAxes::default()))
            .unwrap();
        assert!(t.tools().is_empty());
        assert_eq!(destroyed.get(), 1);

        let tablet = t.devices_for(TABLET)[0];
        assert_eq!(t.device(tablet).unwrap().referenced_tools().count(), 0);
    }

    #[test]
    fn test_repeated_proximity_out_of_generic_tool_is_dropped() {
        let mut t = translator(16);
        t.add_device(TABLET, &tablet_descriptor()).unwrap();
        let out = || tool_event(3, false, RawToolEventKind::Proximity(ProximityState::Out), RawToolAxes::default());

        t.handle_event(tool_event(3, false, RawToolEventKind::Proximity(ProximityState::In), RawToolAxes::default()))
            .unwrap();
        t.handle_event(out()).unwrap();
        t.drain_notifications().for_each(drop);

        t.handle_event(out()).unwrap();
        assert_eq!(t.pending_notifications(), 0);
        assert!(t.tools().is_empty());
    }
}
