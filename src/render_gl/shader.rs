use gl;
use gl::types::{GLenum, GLint, GLuint};
use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::fmt;
use std::path::Path;

use render_gl::backend::ShaderBackend;
use resources::{self, Resources};

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Failed to load shader source {}", name)]
    SourceRead { name: String, #[cause] inner: resources::Error },
    #[fail(display = "Can not determine shader stage for resource {}", name)]
    CanNotDetermineShaderStage { name: String },
    #[fail(display = "Source for {} shader contains a nul byte", stage)]
    InvalidSource { stage: ShaderStage },
    #[fail(display = "Failed to compile {} shader: {}", stage, log)]
    StageCompileFailed { stage: ShaderStage, log: String },
    #[fail(display = "Failed to link program: {}", log)]
    LinkFailed { log: String },
    #[fail(display = "No active uniform named {}", name)]
    UniformNotFound { name: String },
    #[fail(display = "Uniform {} does not take a {} value", name, expected)]
    UniformTypeMismatch { name: String, expected: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn from_resource_name(name: &str) -> Option<ShaderStage> {
        const POSSIBLE_EXT: [(&str, ShaderStage); 4] = [
            (".vert", ShaderStage::Vertex),
            (".vs", ShaderStage::Vertex),
            (".frag", ShaderStage::Fragment),
            (".fs", ShaderStage::Fragment),
        ];

        POSSIBLE_EXT
            .iter()
            .find(|&&(file_extension, _)| name.ends_with(file_extension))
            .map(|&(_, stage)| stage)
    }

    pub fn gl_kind(&self) -> GLenum {
        match *self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Source text for one stage, checked to be passable to the driver.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    stage: ShaderStage,
    text: CString,
}

impl ShaderSource {
    pub fn new(stage: ShaderStage, text: &str) -> Result<ShaderSource, Error> {
        let text = CString::new(text).map_err(|_| Error::InvalidSource { stage })?;
        Ok(ShaderSource { stage, text })
    }

    pub fn vertex(text: &str) -> Result<ShaderSource, Error> {
        ShaderSource::new(ShaderStage::Vertex, text)
    }

    pub fn fragment(text: &str) -> Result<ShaderSource, Error> {
        ShaderSource::new(ShaderStage::Fragment, text)
    }

    /// Reads a resource, taking the stage from its extension.
    pub fn from_res(res: &Resources, name: &str) -> Result<ShaderSource, Error> {
        let stage = ShaderStage::from_resource_name(name)
            .ok_or_else(|| Error::CanNotDetermineShaderStage { name: name.into() })?;

        let text = res
            .load_cstring(name)
            .map_err(|e| Error::SourceRead { name: name.into(), inner: e })?;

        Ok(ShaderSource { stage, text })
    }

    pub fn from_file(stage: ShaderStage, path: &Path) -> Result<ShaderSource, Error> {
        let text = resources::read_to_cstring(path).map_err(|e| Error::SourceRead {
            name: path.display().to_string(),
            inner: e,
        })?;

        Ok(ShaderSource { stage, text })
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn as_c_str(&self) -> &CStr {
        &self.text
    }
}

/// One compiled stage. The stage object is deleted when this is dropped.
pub struct Shader<B: ShaderBackend = gl::Gl> {
    backend: B,
    id: GLuint,
    stage: ShaderStage,
}

impl<B: ShaderBackend> Shader<B> {
    pub fn from_source(backend: &B, source: &ShaderSource) -> Result<Shader<B>, Error> {
        let stage = source.stage();
        let id = backend.create_shader(stage.gl_kind());
        if id == 0 {
            return Err(Error::StageCompileFailed {
                stage,
                log: "glCreateShader did not return a shader object".into(),
            });
        }

        let shader = Shader { backend: backend.clone(), id, stage };

        backend
            .compile_shader(shader.id, source.as_c_str())
            .map_err(|log| Error::StageCompileFailed { stage, log })?;

        debug!("compiled {} shader {}", stage, shader.id);
        Ok(shader)
    }

    pub fn from_res(backend: &B, res: &Resources, name: &str) -> Result<Shader<B>, Error> {
        let source = ShaderSource::from_res(res, name)?;
        Shader::from_source(backend, &source)
    }

    pub fn id(&self) -> GLuint {
        self.id
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl<B: ShaderBackend> Drop for Shader<B> {
    fn drop(&mut self) {
        self.backend.delete_shader(self.id);
    }
}

/// A location that exists in a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLocation(GLint);

impl UniformLocation {
    pub fn raw(&self) -> GLint {
        self.0
    }
}

struct Uniform {
    location: GLint,
    typ: GLenum,
}

/// A linked program. The program object is deleted when this is dropped.
pub struct Program<B: ShaderBackend = gl::Gl> {
    backend: B,
    id: GLuint,

    uniforms: HashMap<String, Uniform>,
}

impl<B: ShaderBackend> Program<B> {
    /// Compiles both stages and links them into a program.
    ///
    /// Stage objects never outlive this call, whether it succeeds or not.
    /// On failure the error carries the driver's log verbatim.
    pub fn from_sources(backend: &B, vertex: &str, fragment: &str) -> Result<Program<B>, Error> {
        let vertex = ShaderSource::vertex(vertex)?;
        let fragment = ShaderSource::fragment(fragment)?;

        Program::from_shader_sources(backend, &[vertex, fragment])
    }

    pub fn from_shader_sources(backend: &B, sources: &[ShaderSource]) -> Result<Program<B>, Error> {
        let shaders = sources
            .iter()
            .map(|source| Shader::from_source(backend, source))
            .collect::<Result<Vec<Shader<B>>, Error>>()?;

        Program::from_shaders(backend, &shaders[..])
    }

    /// Builds `<name>.vert` and `<name>.frag` from the resources.
    pub fn from_res(backend: &B, res: &Resources, name: &str) -> Result<Program<B>, Error> {
        const POSSIBLE_EXT: [&str; 2] = [".vert", ".frag"];

        let shaders = POSSIBLE_EXT
            .iter()
            .map(|file_extension| {
                Shader::from_res(backend, res, &format!("{}{}", name, file_extension))
            })
            .collect::<Result<Vec<Shader<B>>, Error>>()?;

        Program::from_shaders(backend, &shaders[..])
    }

    pub fn from_files(
        backend: &B,
        vertex_path: &Path,
        fragment_path: &Path,
    ) -> Result<Program<B>, Error> {
        let vertex = ShaderSource::from_file(ShaderStage::Vertex, vertex_path)?;
        let fragment = ShaderSource::from_file(ShaderStage::Fragment, fragment_path)?;

        Program::from_shader_sources(backend, &[vertex, fragment])
    }

    pub fn from_shaders(backend: &B, shaders: &[Shader<B>]) -> Result<Program<B>, Error> {
        let id = backend.create_program();
        if id == 0 {
            return Err(Error::LinkFailed {
                log: "glCreateProgram did not return a program object".into(),
            });
        }

        let mut program = Program {
            backend: backend.clone(),
            id,
            uniforms: HashMap::new(),
        };

        for shader in shaders {
            backend.attach_shader(program.id, shader.id());
        }

        let linked = backend.link_program(program.id);

        for shader in shaders {
            backend.detach_shader(program.id, shader.id());
        }

        linked.map_err(|log| Error::LinkFailed { log })?;

        for active in backend.active_uniforms(program.id) {
            let uniform = Uniform { location: active.location, typ: active.typ };
            // arrays report their first element, but the bare name is just as valid
            if active.name.ends_with("[0]") {
                let base = active.name[..active.name.len() - 3].to_owned();
                program.uniforms.insert(base, Uniform { location: active.location, typ: active.typ });
            }
            program.uniforms.insert(active.name, uniform);
        }

        debug!("linked program {} with {} uniforms", program.id, program.uniforms.len());
        Ok(program)
    }

    pub fn id(&self) -> GLuint {
        self.id
    }

    pub fn set_used(&self) {
        self.backend.use_program(self.id);
    }

    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.get(name).map(|uniform| UniformLocation(uniform.location))
    }

    pub fn set_bool(&self, name: &str, value: bool) -> Result<(), Error> {
        let location = self.checked_location(name, "bool", accepts_bool)?;
        self.set_used();
        self.backend.uniform_1i(location, value as GLint);
        Ok(())
    }

    pub fn set_int(&self, name: &str, value: GLint) -> Result<(), Error> {
        let location = self.checked_location(name, "int", accepts_int)?;
        self.set_used();
        self.backend.uniform_1i(location, value);
        Ok(())
    }

    pub fn set_float(&self, name: &str, value: f32) -> Result<(), Error> {
        let location = self.checked_location(name, "float", accepts_float)?;
        self.set_used();
        self.backend.uniform_1f(location, value);
        Ok(())
    }

    fn checked_location(
        &self,
        name: &str,
        expected: &'static str,
        accepts: fn(GLenum) -> bool,
    ) -> Result<GLint, Error> {
        let uniform = self
            .uniforms
            .get(name)
            .ok_or_else(|| Error::UniformNotFound { name: name.into() })?;

        if !accepts(uniform.typ) {
            return Err(Error::UniformTypeMismatch { name: name.into(), expected });
        }

        Ok(uniform.location)
    }
}

impl<B: ShaderBackend> Drop for Program<B> {
    fn drop(&mut self) {
        self.backend.delete_program(self.id);
    }
}

fn accepts_bool(typ: GLenum) -> bool {
    typ == gl::BOOL || typ == gl::INT
}

fn accepts_int(typ: GLenum) -> bool {
    typ == gl::INT || typ == gl::BOOL || is_sampler(typ)
}

// samplers can only be set with glUniform1i
fn is_sampler(typ: GLenum) -> bool {
    match typ {
        gl::SAMPLER_1D
        | gl::SAMPLER_2D
        | gl::SAMPLER_3D
        | gl::SAMPLER_CUBE
        | gl::SAMPLER_1D_SHADOW
        | gl::SAMPLER_2D_SHADOW
        | gl::SAMPLER_1D_ARRAY
        | gl::SAMPLER_2D_ARRAY
        | gl::SAMPLER_1D_ARRAY_SHADOW
        | gl::SAMPLER_2D_ARRAY_SHADOW
        | gl::SAMPLER_2D_MULTISAMPLE
        | gl::SAMPLER_2D_MULTISAMPLE_ARRAY
        | gl::SAMPLER_CUBE_SHADOW
        | gl::SAMPLER_BUFFER
        | gl::SAMPLER_2D_RECT
        | gl::SAMPLER_2D_RECT_SHADOW
        | gl::SAMPLER_CUBE_MAP_ARRAY
        | gl::SAMPLER_CUBE_MAP_ARRAY_SHADOW
        | gl::INT_SAMPLER_1D
        | gl::INT_SAMPLER_2D
        | gl::INT_SAMPLER_3D
        | gl::INT_SAMPLER_CUBE
        | gl::INT_SAMPLER_1D_ARRAY
        | gl::INT_SAMPLER_2D_ARRAY
        | gl::INT_SAMPLER_2D_MULTISAMPLE
        | gl::INT_SAMPLER_2D_MULTISAMPLE_ARRAY
        | gl::INT_SAMPLER_BUFFER
        | gl::INT_SAMPLER_2D_RECT
        | gl::INT_SAMPLER_CUBE_MAP_ARRAY
        | gl::UNSIGNED_INT_SAMPLER_1D
        | gl::UNSIGNED_INT_SAMPLER_2D
        | gl::UNSIGNED_INT_SAMPLER_3D
        | gl::UNSIGNED_INT_SAMPLER_CUBE
        | gl::UNSIGNED_INT_SAMPLER_1D_ARRAY
        | gl::UNSIGNED_INT_SAMPLER_2D_ARRAY
        | gl::UNSIGNED_INT_SAMPLER_2D_MULTISAMPLE
        | gl::UNSIGNED_INT_SAMPLER_2D_MULTISAMPLE_ARRAY
        | gl::UNSIGNED_INT_SAMPLER_BUFFER
        | gl::UNSIGNED_INT_SAMPLER_2D_RECT
        | gl::UNSIGNED_INT_SAMPLER_CUBE_MAP_ARRAY => true,
        _ => false,
    }
}

fn accepts_float(typ: GLenum) -> bool {
    typ == gl::FLOAT || typ == gl::BOOL
}
