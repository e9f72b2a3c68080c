pub mod action;
pub mod config;
pub mod fire;
pub mod overrides;
pub mod preview;
pub mod status;
