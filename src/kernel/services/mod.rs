//! Services layer (ports + adapters).
//!
//! - `ports`: pure contracts/types used across the app (kernel-facing).
//! - `adapters`: network/filesystem/runtime implementations (IO/async).

pub mod adapters;
pub mod bus;
pub mod host;
pub mod ports;

pub use bus::{kernel_bus, KernelBusReceiver, KernelBusSender, KernelMessage};
pub use host::{KernelServiceContext, KernelServiceHost};
