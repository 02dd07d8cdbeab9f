pub mod mediainfo;
pub mod metadata;
pub mod probe;
pub mod symphonia_probe;
