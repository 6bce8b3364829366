//! Traits at the transport and persistence seams.

mod auth_api;
mod key_value;

pub use auth_api::AuthApi;
pub use key_value::KeyValueStore;
