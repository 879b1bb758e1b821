//! Scene description loaded at startup

pub mod config;

pub use config::{CameraConfig, SceneConfig, ShaderPaths, WindowConfig};
