mod delivery_port;
mod image_source_port;
mod registry_store_port;

pub use delivery_port::DeliveryPort;
pub use image_source_port::ImageSourcePort;
pub use registry_store_port::{RegistryEntries, RegistryStorePort};
