pub mod config;
pub mod devices;
pub mod recording;
pub mod resolutions;
pub mod save;
pub mod sources;
