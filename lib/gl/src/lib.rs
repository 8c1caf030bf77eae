//! OpenGL 4.5 core bindings generated at build time.
//!
//! `Gl` is a reference-counted function table: cloning it is cheap, and every
//! clone refers to the context it was loaded for. It is not `Send`, so GL
//! objects built on it stay on the thread that owns the context.

mod bindings {
    include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
}

use std::ops::Deref;
use std::rc::Rc;

pub use bindings::*;
pub use bindings::Gl as InnerGl;

#[derive(Clone)]
pub struct Gl {
    inner: Rc<bindings::Gl>,
}

impl Gl {
    pub fn load_with<F>(loadfn: F) -> Gl
    where
        F: FnMut(&'static str) -> *const types::GLvoid,
    {
        Gl {
            inner: Rc::new(bindings::Gl::load_with(loadfn)),
        }
    }
}

impl Deref for Gl {
    type Target = bindings::Gl;

    fn deref(&self) -> &bindings::Gl {
        &self.inner
    }
}
