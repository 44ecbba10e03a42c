//! Per-client seat state: bound `wl_pointer` objects and issued serials.

use std::collections::VecDeque;

use crate::protocol::{ClientId, ObjectId, SurfaceId};

/// How many recently issued serials are remembered per client.
pub const SERIAL_HISTORY_LEN: usize = 128;

/// Cursor image a client asked for through `wl_pointer.set_cursor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorImage {
    /// `None` hides the cursor.
    pub surface: Option<SurfaceId>,
    /// Hotspot x offset from the top-left of the cursor surface.
    pub hotspot_x: i32,
    /// Hotspot y offset from the top-left of the cursor surface.
    pub hotspot_y: i32,
}

/// A server-side `wl_pointer` resource.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerResource {
    /// Object ID of this `wl_pointer`, unique per client.
    pub object: ObjectId,
    /// Bound interface version. Gates `frame` and the axis extras.
    pub version: u32,
    /// Serial of the last `enter` sent on this object, checked by `set_cursor`.
    pub last_enter_serial: u32,
    /// Last cursor image the client set, if any.
    pub cursor: Option<CursorImage>,
}

impl PointerResource {
    /// Creates a resource that has not seen an `enter` yet.
    pub fn new(object: ObjectId, version: u32) -> Self {
        Self { object, version, last_enter_serial: 0, cursor: None }
    }
}

/// Ring of the most recent serials handed to one client.
#[derive(Debug, Clone, Default)]
pub struct SerialHistory {
    serials: VecDeque<u32>,
}

impl SerialHistory {
    /// Remembers `serial`, dropping the oldest one when full.
    pub fn record(&mut self, serial: u32) {
        if self.serials.len() == SERIAL_HISTORY_LEN {
            self.serials.pop_front();
        }
        self.serials.push_back(serial);
    }

    pub fn contains(&self, serial: u32) -> bool {
        serial != 0 && self.serials.contains(&serial)
    }

    pub fn len(&self) -> usize {
        self.serials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.serials.is_empty()
    }
}

/// A client that bound the seat.
#[derive(Debug, Clone)]
pub struct SeatClient {
    pub(crate) client: ClientId,
    pub(crate) pointers: Vec<PointerResource>,
    pub(crate) serials: SerialHistory,
}

impl SeatClient {
    /// Creates the record of a freshly bound client with no pointers.
    pub fn new(client: ClientId) -> Self {
        Self { client, pointers: Vec::new(), serials: SerialHistory::default() }
    }

    pub fn client(&self) -> ClientId {
        self.client
    }

    pub fn pointers(&self) -> &[PointerResource] {
        &self.pointers
    }

    pub fn pointer_mut(&mut self, object: ObjectId) -> Option<&mut PointerResource> {
        self.pointers.iter_mut().find(|p| p.object == object)
    }
}
