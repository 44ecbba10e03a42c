use thiserror::Error;

use crate::backend::NativeDeviceId;
use crate::config::ConfigError;
use crate::protocol::ClientId;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Native device {0:?} is already tracked")]
    DuplicateDevice(NativeDeviceId),

    #[error("Failed to allocate abstract device '{capability}' for '{device_name}' ({allocated} devices live, limit {limit})")]
    DeviceAllocationFailed {
        device_name: String,
        capability: &'static str,
        allocated: usize,
        limit: usize,
    },

    #[error("Unknown tablet tool: {0}")]
    UnknownTool(String),

    #[error("Unknown client: {0:?}")]
    UnknownClient(ClientId),

    #[error("Unknown protocol object {object} for client {client:?}")]
    UnknownObject { client: ClientId, object: u32 },

    #[error("Client {0:?} already bound this global")]
    AlreadyBound(ClientId),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging initialization failed: {0}")]
    LoggingInit(String),
}
