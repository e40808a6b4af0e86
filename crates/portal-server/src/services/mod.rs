//! Application services shared by the admin and portal handlers.

pub mod activity;
pub mod client_data;

pub use activity::ActivityLogger;
pub use client_data::{ClientDataCache, ClientDataService, ClientOverview, ClientPayload, DataKind};
