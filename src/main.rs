extern crate env_logger;
extern crate failure;
extern crate gl;
#[macro_use]
extern crate log;
extern crate sdl2;
extern crate shader_lessons;

use failure::err_msg;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use std::path::PathBuf;
use std::time::Instant;

use shader_lessons::debug::failure_to_string;
use shader_lessons::render_gl::{self, buffer, ArrayBuffer, VertexArray};
use shader_lessons::resources::Resources;

// Positions followed by colours, one vertex per row.
const TRIANGLE: [f32; 18] = [
    -0.5, -0.5, 0.0, 1.0, 0.0, 0.0,
    0.5, -0.5, 0.0, 0.0, 1.0, 0.0,
    0.0, 0.5, 0.0, 0.0, 0.0, 1.0,
];

#[derive(Debug, Clone)]
struct LessonConfig {
    title: String,
    width: u32,
    height: u32,
    gl_version: (u8, u8),
    clear_color: [f32; 4],
    assets_dir: PathBuf,
    program: String,
}

impl Default for LessonConfig {
    fn default() -> Self {
        LessonConfig {
            title: "LearnOpenGL".into(),
            width: 800,
            height: 600,
            gl_version: (3, 3),
            clear_color: [0.2, 0.3, 0.3, 1.0],
            assets_dir: PathBuf::from("assets"),
            program: "shaders/triangle".into(),
        }
    }
}

fn init_logging() {
    let mut builder = env_logger::Builder::new();
    match std::env::var("RUST_LOG") {
        Ok(filter) => {
            builder.parse_filters(&filter);
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Info);
        }
    }
    builder.init();
}

fn main() {
    init_logging();

    if let Err(e) = run(LessonConfig::default()) {
        error!("{}", failure_to_string(&e));
        std::process::exit(1);
    }
}

fn run(config: LessonConfig) -> Result<(), failure::Error> {
    let res = Resources::from_relative_exe_path(&config.assets_dir)?;

    let sdl = sdl2::init().map_err(err_msg)?;
    let video_subsystem = sdl.video().map_err(err_msg)?;

    let gl_attr = video_subsystem.gl_attr();
    gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
    gl_attr.set_context_version(config.gl_version.0, config.gl_version.1);

    let window = video_subsystem
        .window(&config.title, config.width, config.height)
        .opengl()
        .resizable()
        .build()?;

    let _gl_context = window.gl_create_context().map_err(err_msg)?;
    let gl = gl::Gl::load_with(|s| {
        video_subsystem.gl_get_proc_address(s) as *const std::os::raw::c_void
    });

    let program = render_gl::Program::from_res(&gl, &res, &config.program)?;
    info!("built program {} from {}", program.id(), config.program);

    let has_time = program.uniform_location("uTime").is_some();
    if !has_time {
        warn!("program {} has no uTime uniform, it will not animate", config.program);
    }

    let (_vbo, vao) = setup_vertices(&gl, &TRIANGLE);

    set_viewport(&gl, config.width as i32, config.height as i32);
    let [r, g, b, a] = config.clear_color;
    unsafe {
        gl.ClearColor(r, g, b, a);
    }

    let started = Instant::now();
    let mut event_pump = sdl.event_pump().map_err(err_msg)?;
    'main: loop {
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => break 'main,
                Event::KeyDown { keycode: Some(key), .. } if key == Keycode::Escape => break 'main,
                Event::Window { win_event: WindowEvent::Resized(w, h), .. } => {
                    set_viewport(&gl, w, h);
                }
                _ => {}
            }
        }

        unsafe {
            gl.Clear(gl::COLOR_BUFFER_BIT);
        }

        program.set_used();
        if has_time {
            let elapsed = started.elapsed();
            let seconds = elapsed.as_secs() as f32 + elapsed.subsec_nanos() as f32 * 1e-9;
            program.set_float("uTime", seconds)?;
        }

        vao.bind();
        unsafe {
            gl.DrawArrays(gl::TRIANGLES, 0, 3);
        }

        window.gl_swap_window();
    }

    Ok(())
}

/// Uploads interleaved position/colour vertices and describes them to a new VAO.
fn setup_vertices(gl: &gl::Gl, vertices: &[f32]) -> (ArrayBuffer, VertexArray) {
    let vbo = ArrayBuffer::new(gl);
    vbo.bind();
    vbo.static_draw_data(vertices);
    vbo.unbind();

    let vao = VertexArray::new(gl);
    vao.bind();
    vbo.bind();
    buffer::vertex_attrib_pointer(gl, 6, 0, 0, 3);
    buffer::vertex_attrib_pointer(gl, 6, 1, 3, 3);
    vbo.unbind();
    vao.unbind();

    (vbo, vao)
}

fn set_viewport(gl: &gl::Gl, width: i32, height: i32) {
    unsafe {
        gl.Viewport(0, 0, width, height);
    }
}
