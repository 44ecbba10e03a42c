use std::collections::BTreeSet;

use crate::backend::{AbsRange, DeviceCapabilities, NativeDeviceId};
use super::tool::ToolId;
use super::transform::AbsoluteAxis;

/// Identifies an abstract device for its whole lifetime. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub(crate) u64);

impl DeviceId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// The single capability an abstract device stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceKind {
    Keyboard,
    Pointer,
    Touch,
    TabletTool,
    TabletPad,
    Switch,
}

impl DeviceKind {
    /// Creation order for the abstract devices of one physical device.
    pub const ALL: [DeviceKind; 6] = [
        DeviceKind::Keyboard,
        DeviceKind::Pointer,
        DeviceKind::Touch,
        DeviceKind::TabletTool,
        DeviceKind::TabletPad,
        DeviceKind::Switch,
    ];

    pub fn capability(self) -> DeviceCapabilities {
        match self {
            DeviceKind::Keyboard => DeviceCapabilities::KEYBOARD,
            DeviceKind::Pointer => DeviceCapabilities::POINTER,
            DeviceKind::Touch => DeviceCapabilities::TOUCH,
            DeviceKind::TabletTool => DeviceCapabilities::TABLET_TOOL,
            DeviceKind::TabletPad => DeviceCapabilities::TABLET_PAD,
            DeviceKind::Switch => DeviceCapabilities::SWITCH,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceKind::Keyboard => "keyboard",
            DeviceKind::Pointer => "pointer",
            DeviceKind::Touch => "touch",
            DeviceKind::TabletTool => "tablet-tool",
            DeviceKind::TabletPad => "tablet-pad",
            DeviceKind::Switch => "switch",
        }
    }

    /// Kinds present in `capabilities`, in creation order.
    pub fn from_capabilities(capabilities: DeviceCapabilities) -> impl Iterator<Item = DeviceKind> {
        DeviceKind::ALL.into_iter().filter(move |kind| capabilities.contains(kind.capability()))
    }
}

/// Identification copied from the physical device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Human-readable device name.
    pub name: String,
    /// USB vendor ID, or zero if unknown.
    pub vendor: u32,
    /// USB product ID, or zero if unknown.
    pub product: u32,
    /// Device node path, if the backend has one.
    pub path: Option<String>,
}

/// One capability of a physical device.
///
/// A physical device with several capabilities shows up as several abstract
/// devices that share its [`NativeDeviceId`].
#[derive(Debug)]
pub struct AbstractInputDevice {
    pub(crate) id: DeviceId,
    pub(crate) kind: DeviceKind,
    pub(crate) native: NativeDeviceId,
    pub(crate) info: DeviceInfo,
    pub(crate) abs_x: Option<AbsRange>,
    pub(crate) abs_y: Option<AbsRange>,
    /// Tools this tablet holds a reference on. Empty for every other kind.
    pub(crate) tools: BTreeSet<ToolId>,
}

impl AbstractInputDevice {
    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn native(&self) -> NativeDeviceId {
        self.native
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Device-unit range of an absolute axis, used for normalization.
    pub fn abs_range(&self, axis: AbsoluteAxis) -> Option<AbsRange> {
        match axis {
            AbsoluteAxis::X => self.abs_x,
            AbsoluteAxis::Y => self.abs_y,
        }
    }

    pub fn referenced_tools(&self) -> impl Iterator<Item = ToolId> + '_ {
        self.tools.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kinds_follow_creation_order() {
        let caps = DeviceCapabilities::SWITCH | DeviceCapabilities::KEYBOARD | DeviceCapabilities::TABLET_TOOL;
        let kinds: Vec<_> = DeviceKind::from_capabilities(caps).collect();
        assert_eq!(kinds, vec![DeviceKind::Keyboard, DeviceKind::TabletTool, DeviceKind::Switch]);
    }
}
