//! Domain error types.

mod delivery_error;
mod fetch_error;
mod registry_error;
mod store_error;

pub use delivery_error::DeliveryError;
pub use fetch_error::FetchError;
pub use registry_error::RegistryError;
pub use store_error::StoreError;
