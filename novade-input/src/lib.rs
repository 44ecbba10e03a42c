//! # NovaDE Input
//!
//! This crate is the input-event pipeline of the NovaDE compositor.
//! It covers:
//! - Hardware event translation: native device handles become capability-typed
//!   abstract devices, with hotplug lifecycle and shared tablet tool identities.
//! - The seat pointer: focus, serials, grab-serial validation and the grab chain.
//! - The tablet tool protocol multiplexer: per-client tablet/tool bindings,
//!   frame batching and implicit grabs.
//!
//! Window management, rendering and the actual Wayland transport are external
//! collaborators. Outbound protocol traffic is handed to a [`protocol::ClientSink`],
//! and surface picking is asked of a [`pipeline::SurfaceLocator`].

pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod protocol;
pub mod seat;
pub mod tablet_v2;
pub mod translator;
pub mod util;

pub use config::InputConfig;
pub use error::InputError;
pub use pipeline::{InputPipeline, SurfaceLocator};
pub use protocol::{ClientId, ClientSink, ObjectId, RecordingSink, SurfaceHandle, SurfaceId};
pub use seat::Seat;
pub use tablet_v2::TabletManager;
pub use translator::InputTranslator;
