use std::collections::BTreeMap;

use crate::protocol::{ClientId, ClientSink, ObjectId, ObjectIdAllocator, OutboundMessage, TabletMessage, TabletSeatMessage};
use crate::translator::{DeviceId, DeviceInfo};

/// A tablet as exposed through `zwp_tablet_v2`.
#[derive(Debug, Clone)]
pub struct TabletV2 {
    /// Tablet-tool device the tablet was created for.
    pub(crate) device: DeviceId,
    /// Name and USB IDs sent in the description.
    pub(crate) info: DeviceInfo,
    /// The `zwp_tablet_v2` object each client got for this tablet.
    pub(crate) bindings: BTreeMap<ClientId, ObjectId>,
}

impl TabletV2 {
    /// Creates a tablet that no client has been told about yet.
    pub fn new(device: DeviceId, info: DeviceInfo) -> Self {
        Self { device, info, bindings: BTreeMap::new() }
    }

    pub fn device(&self) -> DeviceId {
        self.device
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// The tablet object `client` got, if it bound the tablet seat.
    pub fn binding(&self, client: ClientId) -> Option<ObjectId> {
        self.bindings.get(&client).copied()
    }

    /// Creates the tablet object for `client` and describes it.
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
            message: TabletSeatMessage::TabletAdded { id: object },
        });
        let mut send = |message| sink.send(client, OutboundMessage::Tablet { object, message });
        send(TabletMessage::Name(self.info.name.clone()));
        send(TabletMessage::Id { vendor: self.info.vendor, product: self.info.product });
        if let Some(path) = &self.info.path {
            send(TabletMessage::Path(path.clone()));
        }
        send(TabletMessage::Done);
        self.bindings.insert(client, object);
    }

    pub(crate) fn send_removed(&mut self, sink: &mut dyn ClientSink) {
        for (client, object) in std::mem::take(&mut self.bindings) {
            sink.send(client, OutboundMessage::Tablet { object, message: TabletMessage::Removed });
        }
    }
}
