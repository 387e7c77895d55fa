pub mod client;
pub mod models;

pub use client::{INTERFACE_STATUS_PATH, RestClient, select_challenge};
pub use models::RestInterface;
