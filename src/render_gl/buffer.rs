use gl;
use gl::types::{GLint, GLsizeiptr, GLuint, GLvoid};
use std;

/// A vertex buffer object bound to `GL_ARRAY_BUFFER`.
pub struct ArrayBuffer {
    gl: gl::Gl,
    vbo: GLuint,
}

impl ArrayBuffer {
    pub fn new(gl: &gl::Gl) -> ArrayBuffer {
        let mut vbo: GLuint = 0;
        unsafe {
            gl.GenBuffers(1, &mut vbo);
        }

        ArrayBuffer { gl: gl.clone(), vbo }
    }

    pub fn bind(&self) {
        unsafe {
            self.gl.BindBuffer(gl::ARRAY_BUFFER, self.vbo);
        }
    }

    pub fn unbind(&self) {
        unsafe {
            self.gl.BindBuffer(gl::ARRAY_BUFFER, 0);
        }
    }

    /// Uploads `data` into the currently bound buffer.
    pub fn static_draw_data(&self, data: &[f32]) {
        unsafe {
            self.gl.BufferData(
                gl::ARRAY_BUFFER,
                (data.len() * std::mem::size_of::<f32>()) as GLsizeiptr,
                data.as_ptr() as *const GLvoid,
                gl::STATIC_DRAW,
            );
        }
    }
}

impl Drop for ArrayBuffer {
    fn drop(&mut self) {
        unsafe {
            self.gl.DeleteBuffers(1, &self.vbo);
        }
    }
}

pub struct VertexArray {
    gl: gl::Gl,
    vao: GLuint,
}

impl VertexArray {
    pub fn new(gl: &gl::Gl) -> VertexArray {
        let mut vao: GLuint = 0;
        unsafe {
            gl.GenVertexArrays(1, &mut vao);
        }

        VertexArray { gl: gl.clone(), vao }
    }

    pub fn bind(&self) {
        unsafe {
            self.gl.BindVertexArray(self.vao);
        }
    }

    pub fn unbind(&self) {
        unsafe {
            self.gl.BindVertexArray(0);
        }
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        unsafe {
            self.gl.DeleteVertexArrays(1, &self.vao);
        }
    }
}

/// Describes `components` floats at `offset` floats into each `stride`-float
/// vertex and enables the attribute. Needs a bound vertex array and buffer.
pub fn vertex_attrib_pointer(
    gl: &gl::Gl,
    stride: usize,
    location: GLuint,
    offset: usize,
    components: GLint,
) {
    unsafe {
        gl.EnableVertexAttribArray(location);
        gl.VertexAttribPointer(
            location,
            components,
            gl::FLOAT,
            gl::FALSE,
            (stride * std::mem::size_of::<f32>()) as gl::types::GLint,
            (offset * std::mem::size_of::<f32>()) as *const GLvoid,
        );
    }
}
