pub mod backend;
pub use self::backend::{ActiveUniform, ShaderBackend};

mod shader;
pub use self::shader::{Error, Program, Shader, ShaderSource, ShaderStage, UniformLocation};

pub mod buffer;
pub use self::buffer::{ArrayBuffer, VertexArray};
