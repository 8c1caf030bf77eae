use gl;
use gl::types::{GLchar, GLenum, GLfloat, GLint, GLsizei, GLuint};
use std;
use std::ffi::{CStr, CString};

/// An active uniform as reported by the driver after linking.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveUniform {
    pub name: String,
    pub location: GLint,
    pub typ: GLenum,
}

/// The GL entry points needed to build and drive a shader program.
///
/// Compile and link report failure with the driver's info log. Every method
/// assumes the context that owns the objects is current on this thread.
pub trait ShaderBackend: Clone {
    fn create_shader(&self, kind: GLenum) -> GLuint;
    fn compile_shader(&self, id: GLuint, source: &CStr) -> Result<(), String>;
    fn delete_shader(&self, id: GLuint);

    fn create_program(&self) -> GLuint;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn detach_shader(&self, program: GLuint, shader: GLuint);
    fn link_program(&self, program: GLuint) -> Result<(), String>;
    fn delete_program(&self, program: GLuint);
    fn use_program(&self, program: GLuint);

    fn active_uniforms(&self, program: GLuint) -> Vec<ActiveUniform>;
    fn uniform_1i(&self, location: GLint, value: GLint);
    fn uniform_1f(&self, location: GLint, value: GLfloat);
}

impl ShaderBackend for gl::Gl {
    fn create_shader(&self, kind: GLenum) -> GLuint {
        unsafe { self.CreateShader(kind) }
    }

    fn compile_shader(&self, id: GLuint, source: &CStr) -> Result<(), String> {
        unsafe {
            self.ShaderSource(id, 1, &source.as_ptr(), std::ptr::null());
            self.CompileShader(id);
        }

        let mut success: GLint = gl::FALSE as GLint;
        unsafe {
            self.GetShaderiv(id, gl::COMPILE_STATUS, &mut success);
        }

        if success == 0 {
            let mut len: GLint = 0;
            unsafe {
                self.GetShaderiv(id, gl::INFO_LOG_LENGTH, &mut len);
            }

            let mut log = whitespace_buffer(len);

            unsafe {
                self.GetShaderInfoLog(
                    id,
                    log.len() as GLsizei,
                    std::ptr::null_mut(),
                    log.as_mut_ptr() as *mut GLchar,
                );
            }

            return Err(info_log_to_string(log));
        }

        Ok(())
    }

    fn delete_shader(&self, id: GLuint) {
        unsafe { self.DeleteShader(id) }
    }

    fn create_program(&self) -> GLuint {
        unsafe { self.CreateProgram() }
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { self.AttachShader(program, shader) }
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { self.DetachShader(program, shader) }
    }

    fn link_program(&self, program: GLuint) -> Result<(), String> {
        unsafe {
            self.LinkProgram(program);
        }

        let mut success: GLint = gl::FALSE as GLint;
        unsafe {
            self.GetProgramiv(program, gl::LINK_STATUS, &mut success);
        }

        if success == 0 {
            let mut len: GLint = 0;
            unsafe {
                self.GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
            }

            let mut log = whitespace_buffer(len);

            unsafe {
                self.GetProgramInfoLog(
                    program,
                    log.len() as GLsizei,
                    std::ptr::null_mut(),
                    log.as_mut_ptr() as *mut GLchar,
                );
            }

            return Err(info_log_to_string(log));
        }

        Ok(())
    }

    fn delete_program(&self, program: GLuint) {
        unsafe { self.DeleteProgram(program) }
    }

    fn use_program(&self, program: GLuint) {
        unsafe { self.UseProgram(program) }
    }

    fn active_uniforms(&self, program: GLuint) -> Vec<ActiveUniform> {
        let mut total: GLint = 0;
        let mut max_name_len: GLint = 0;
        unsafe {
            self.GetProgramiv(program, gl::ACTIVE_UNIFORMS, &mut total);
            self.GetProgramiv(program, gl::ACTIVE_UNIFORM_MAX_LENGTH, &mut max_name_len);
        }

        let mut uniforms = Vec::with_capacity(total.max(0) as usize);

        for index in 0..total.max(0) as GLuint {
            let mut name = whitespace_buffer(max_name_len);
            let mut name_len: GLsizei = 0;
            let mut size: GLint = 0;
            let mut typ: GLenum = gl::ZERO;

            unsafe {
                self.GetActiveUniform(
                    program,
                    index,
                    name.len() as GLsizei,
                    &mut name_len,
                    &mut size,
                    &mut typ,
                    name.as_mut_ptr() as *mut GLchar,
                );
            }

            name.truncate(name_len.max(0) as usize);
            let name = match CString::new(name) {
                Ok(name) => name,
                Err(_) => continue,
            };

            let location = unsafe { self.GetUniformLocation(program, name.as_ptr()) };
            // members of uniform blocks have no location of their own
            if location < 0 {
                continue;
            }

            uniforms.push(ActiveUniform {
                name: name.to_string_lossy().into_owned(),
                location,
                typ,
            });
        }

        uniforms
    }

    fn uniform_1i(&self, location: GLint, value: GLint) {
        unsafe { self.Uniform1i(location, value) }
    }

    fn uniform_1f(&self, location: GLint, value: GLfloat) {
        unsafe { self.Uniform1f(location, value) }
    }
}

/// A buffer the driver can write `len` bytes into, never empty.
fn whitespace_buffer(len: GLint) -> Vec<u8> {
    vec![b' '; len.max(1) as usize]
}

/// Cuts a driver-written log at its terminating nul and drops trailing whitespace.
fn info_log_to_string(buffer: Vec<u8>) -> String {
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    String::from_utf8_lossy(&buffer[..end]).trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_is_never_empty() {
        assert_eq!(whitespace_buffer(0).len(), 1);
        assert_eq!(whitespace_buffer(-4).len(), 1);
        assert_eq!(whitespace_buffer(12).len(), 12);
    }

    #[test]
    fn log_stops_at_nul() {
        let mut buffer = b"0:1(10): error: `x' undeclared\n".to_vec();
        buffer.push(0);
        buffer.extend_from_slice(b"   ");
        assert_eq!(info_log_to_string(buffer), "0:1(10): error: `x' undeclared");
    }

    #[test]
    fn untouched_buffer_is_empty_log() {
        assert_eq!(info_log_to_string(whitespace_buffer(8)), "");
    }

    #[test]
    fn log_without_nul_is_kept_whole() {
        assert_eq!(info_log_to_string(b"link error".to_vec()), "link error");
    }
}
