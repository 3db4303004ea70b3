//! Server connectivity: the WiFi/endpoint session and the JSON wire types
//! exchanged with the MediBox backend.

pub mod api;
pub mod session;
