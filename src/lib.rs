//! Builds linked OpenGL shader programs from vertex and fragment source.
//!
//! Every GL object here is owned by a wrapper that deletes it on drop, and a
//! context must be current on the calling thread before any of them is made.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
extern crate gl;

pub mod debug;
pub mod render_gl;
pub mod resources;
