//! Low-level HTTP plumbing for the REST API.

pub(crate) mod client;
pub(crate) mod endpoints;

pub(crate) use client::{ApiClient, map_transport};
