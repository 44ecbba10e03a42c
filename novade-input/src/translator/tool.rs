//! Hardware tool identities shared between tablets.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, trace};

use crate::backend::{NativeToolDescriptor, NativeToolId, ToolCapabilities};
use crate::protocol::ToolType;
use super::device::DeviceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToolId(pub(crate) u64);

impl ToolId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Immutable description of a physical tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInfo {
    /// Backend handle the identity was created for.
    pub native: NativeToolId,
    /// Physical tool type.
    pub tool_type: ToolType,
    /// Hardware serial. Zero for tools that cannot report one.
    pub hardware_serial: u64,
    /// Wacom tool ID. Zero on other vendors.
    pub hardware_id_wacom: u64,
    /// Axes and buttons beyond x/y.
    pub capabilities: ToolCapabilities,
    /// Whether the hardware can tell this tool apart from others of its type.
    pub unique: bool,
}

impl From<&NativeToolDescriptor> for ToolInfo {
    fn from(desc: &NativeToolDescriptor) -> Self {
        Self {
            native: desc.id,
            tool_type: desc.tool_type,
            hardware_serial: desc.hardware_serial,
            hardware_id_wacom: desc.hardware_id_wacom,
            capabilities: desc.capabilities,
            unique: desc.unique,
        }
    }
}

/// A tool as the hardware identifies it, with the tablets referencing it.
#[derive(Debug, Clone)]
pub struct HardwareToolIdentity {
    id: ToolId,
    info: ToolInfo,
    owners: BTreeSet<DeviceId>,
}

impl HardwareToolIdentity {
    pub fn id(&self) -> ToolId {
        self.id
    }

    pub fn info(&self) -> &ToolInfo {
        &self.info
    }

    /// Number of distinct tablets holding this tool.
    pub fn ref_count(&self) -> usize {
        self.owners.len()
    }

    pub fn owners(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.owners.iter().copied()
    }
}

/// Arena of live tool identities, keyed by native handle.
#[derive(Debug, Default)]
pub struct ToolArena {
    tools: BTreeMap<ToolId, HardwareToolIdentity>,
    by_native: HashMap<NativeToolId, ToolId>,
    next_id: u64,
}

impl ToolArena {
    /// Creates an empty arena. Identity numbering starts at 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identity for `desc.id`, creating it on first sight.
    /// The flag is `true` when the identity was just created.
    pub fn get_or_create(&mut self, desc: &NativeToolDescriptor) -> (ToolId, bool) {
        if let Some(&id) = self.by_native.get(&desc.id) {
            return (id, false);
        }
        self.next_id += 1;
        let id = ToolId(self.next_id);
        self.tools.insert(
            id,
            HardwareToolIdentity { id, info: ToolInfo::from(desc), owners: BTreeSet::new() },
        );
        self.by_native.insert(desc.id, id);
        debug!("ToolArena: Created tool {:?} for native {:?} (unique: {})", id, desc.id, desc.unique);
        (id, true)
    }

    /// Registers `tablet` as an owner of `tool`. Idempotent; returns whether the
    /// reference count changed.
    pub fn ensure_tool_reference(&mut self, tool: ToolId, tablet: DeviceId) -> bool {
        match self.tools.get_mut(&tool) {
            Some(identity) => {
                let added = identity.owners.insert(tablet);
                if added {
                    trace!("ToolArena: {:?} referenced by {:?} (count {})", tool, tablet, identity.owners.len());
                }
                added
            }
            None => false,
        }
    }

    /// Drops the reference `tablet` holds on `tool`. Returns the identity when
    /// this was the last reference and the tool got destroyed.
    pub fn release_reference(&mut self, tool: ToolId, tablet: DeviceId) -> Option<HardwareToolIdentity> {
        let identity = self.tools.get_mut(&tool)?;
        if !identity.owners.remove(&tablet) {
            return None;
        }
        if identity.owners.is_empty() {
            self.destroy(tool)
        } else {
            None
        }
    }

    /// Destroys `tool` regardless of its owners.
    pub fn destroy(&mut self, tool: ToolId) -> Option<HardwareToolIdentity> {
        let mut identity = self.tools.remove(&tool)?;
        self.by_native.remove(&identity.info.native);
        identity.owners.clear();
        debug!("ToolArena: Destroyed tool {:?}", tool);
        Some(identity)
    }

    pub fn get(&self, tool: ToolId) -> Option<&HardwareToolIdentity> {
        self.tools.get(&tool)
    }

    /// Identity created for `native`, if it still exists.
    pub fn lookup_native(&self, native: NativeToolId) -> Option<ToolId> {
        self.by_native.get(&native).copied()
    }

    pub fn ref_count(&self, tool: ToolId) -> Option<usize> {
        self.tools.get(&tool).map(HardwareToolIdentity::ref_count)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HardwareToolIdentity> {
        self.tools.values()
    }
}
