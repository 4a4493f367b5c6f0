//! Client core: network gateway, controllers and the events that connect them.

pub mod conversation;
pub mod events;
pub mod gateway;
pub mod intake;
pub mod logging;
pub mod models;
pub mod registry;
