//! Panoramic storybook core: page sequencing and the panorama camera.
//!
//! The desktop viewer in `main.rs` drives these modules; everything here is
//! free of windowing and GPU types so it can be tested on its own.

pub mod assets;
pub mod audio;
pub mod camera;
pub mod config;
pub mod frame;
pub mod host;
pub mod i18n;
pub mod input;
pub mod loader;
pub mod marquee;
pub mod page;
pub mod pages;

pub use camera::{GestureEvent, Motion, OrbitCamera, Orientation};
pub use host::PageHost;
pub use pages::{Direction, Page, PageError, PageKind, PageSequence};
