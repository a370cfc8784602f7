use glam::Mat4;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader, WebGlUniformLocation, WebGlVertexArrayObject};

use crate::camera::StereoParams;
use crate::render::{Frame, Renderer, Sprite, StereoRenderer};

const VERT: &str = r#"#version 300 es
layout(location = 0) in vec3 a_pos;
layout(location = 1) in vec4 a_color;
layout(location = 2) in float a_radius;
layout(location = 3) in float a_shape;
uniform mat4 u_view_proj;
uniform float u_point_scale;
out vec4 v_color;
out float v_shape;
void main() {
    vec4 clip = u_view_proj * vec4(a_pos, 1.0);
    gl_Position = clip;
    gl_PointSize = clamp(a_radius * 2.0 * u_point_scale / max(clip.w, 1e-3), 1.0, 256.0);
    v_color = a_color;
    v_shape = a_shape;
}
"#;

const FRAG: &str = r#"#version 300 es
precision mediump float;
in vec4 v_color;
in float v_shape;
uniform float u_parity;
out vec4 o_color;
void main() {
    if (u_parity >= 0.0 && mod(floor(gl_FragCoord.y), 2.0) != u_parity) discard;
    vec2 p = gl_PointCoord * 2.0 - 1.0;
    float r = length(p);
    if (r > 1.0) discard;
    vec3 rgb = v_color.rgb;
    float a = v_color.a;
    int shape = int(v_shape + 0.5);
    if (shape == 0) {
        rgb *= 1.0 - 0.35 * r * r;
    } else if (shape == 1) {
        if (r < 0.8) discard;
    } else if (shape == 2) {
        if (r < 0.92) discard;
    } else {
        a *= 1.0 - r;
    }
    o_color = vec4(rgb, a);
}
"#;

const FLOATS_PER_SPRITE: usize = 9;

fn compile(gl: &GL, kind: u32, src: &str) -> Result<WebGlShader, JsValue> {
    let shader = gl.create_shader(kind).ok_or("unable to create shader")?;
    gl.shader_source(&shader, src);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let info = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(JsValue::from_str(&format!("shader compile failed: {info}")))
    }
}

fn link(gl: &GL, vert: &str, frag: &str) -> Result<WebGlProgram, JsValue> {
    let vs = compile(gl, GL::VERTEX_SHADER, vert)?;
    let fs = compile(gl, GL::FRAGMENT_SHADER, frag)?;
    let program = gl.create_program().ok_or("unable to create program")?;
    gl.attach_shader(&program, &vs);
    gl.attach_shader(&program, &fs);
    gl.link_program(&program);
    gl.delete_shader(Some(&vs));
    gl.delete_shader(Some(&fs));
    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let info = gl.get_program_info_log(&program).unwrap_or_default();
        Err(JsValue::from_str(&format!("program link failed: {info}")))
    }
}

/// One program + vertex buffer drawing sprites as GL points.
struct SpritePass {
    program: WebGlProgram,
    vao: WebGlVertexArrayObject,
    buffer: WebGlBuffer,
    u_view_proj: Option<WebGlUniformLocation>,
    u_point_scale: Option<WebGlUniformLocation>,
    u_parity: Option<WebGlUniformLocation>,
    scratch: Vec<f32>,
    count: i32,
}

impl SpritePass {
    fn new(gl: &GL) -> Result<Self, JsValue> {
        let program = link(gl, VERT, FRAG)?;
        let vao = gl.create_vertex_array().ok_or("unable to create vertex array")?;
        let buffer = gl.create_buffer().ok_or("unable to create buffer")?;
        gl.bind_vertex_array(Some(&vao));
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        let stride = (FLOATS_PER_SPRITE * 4) as i32;
        for (location, size, offset) in [(0u32, 3, 0), (1, 4, 3), (2, 1, 7), (3, 1, 8)] {
            gl.enable_vertex_attrib_array(location);
            gl.vertex_attrib_pointer_with_i32(location, size, GL::FLOAT, false, stride, offset * 4);
        }
        gl.bind_vertex_array(None);

        Ok(Self {
            u_view_proj: gl.get_uniform_location(&program, "u_view_proj"),
            u_point_scale: gl.get_uniform_location(&program, "u_point_scale"),
            u_parity: gl.get_uniform_location(&program, "u_parity"),
            program,
            vao,
            buffer,
            scratch: Vec::new(),
            count: 0,
        })
    }

    fn upload(&mut self, gl: &GL, sprites: &[Sprite]) {
        self.scratch.clear();
        for s in sprites {
            self.scratch.extend_from_slice(&[
                s.position.x,
                s.position.y,
                s.position.z,
                s.color[0],
                s.color[1],
                s.color[2],
                s.color[3],
                s.radius,
                s.shape as u8 as f32,
            ]);
        }
        self.count = sprites.len() as i32;
        let data = js_sys::Float32Array::from(self.scratch.as_slice());
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.buffer));
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &data, GL::DYNAMIC_DRAW);
    }

    /// `parity` < 0 draws every row; 0 or 1 keeps only even or odd rows.
    fn draw(&self, gl: &GL, view_proj: Mat4, point_scale: f32, parity: f32) {
        gl.use_program(Some(&self.program));
        gl.uniform_matrix4fv_with_f32_array(self.u_view_proj.as_ref(), false, &view_proj.to_cols_array());
        gl.uniform1f(self.u_point_scale.as_ref(), point_scale);
        gl.uniform1f(self.u_parity.as_ref(), parity);
        gl.bind_vertex_array(Some(&self.vao));
        gl.draw_arrays(GL::POINTS, 0, self.count);
        gl.bind_vertex_array(None);
    }
}

/// Canvas sizing shared by both renderers.
struct Surface {
    canvas: HtmlCanvasElement,
    gl: GL,
    css_size: (u32, u32),
    pixel_ratio: f32,
}

impl Surface {
    fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let gl: GL = canvas
            .get_context("webgl2")?
            .ok_or("WebGL2 not supported")?
            .dyn_into()?;
        Ok(Self {
            canvas: canvas.clone(),
            gl,
            css_size: (canvas.client_width().max(1) as u32, canvas.client_height().max(1) as u32),
            pixel_ratio: 1.0,
        })
    }

    fn apply_size(&self) {
        let w = (self.css_size.0 as f32 * self.pixel_ratio).max(1.0) as u32;
        let h = (self.css_size.1 as f32 * self.pixel_ratio).max(1.0) as u32;
        self.canvas.set_width(w);
        self.canvas.set_height(h);
    }

    fn begin(&self, clear: [f32; 4]) -> f32 {
        let gl = &self.gl;
        let (w, h) = (self.canvas.width() as i32, self.canvas.height() as i32);
        gl.viewport(0, 0, w, h);
        gl.clear_color(clear[0], clear[1], clear[2], clear[3]);
        gl.clear(GL::COLOR_BUFFER_BIT);
        gl.disable(GL::DEPTH_TEST);
        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);
        h as f32 * 0.5
    }
}

pub struct GlRenderer {
    surface: Surface,
    pass: SpritePass,
}

impl GlRenderer {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let surface = Surface::new(canvas)?;
        let pass = SpritePass::new(&surface.gl)?;
        Ok(Self { surface, pass })
    }
}

impl Renderer for GlRenderer {
    fn render(&mut self, frame: &Frame<'_>) {
        let half_height = self.surface.begin(frame.clear_color);
        let proj = frame.camera.projection();
        self.pass.upload(&self.surface.gl, frame.sprites);
        self.pass.draw(
            &self.surface.gl,
            frame.camera.view_proj(),
            proj.y_axis.y * half_height,
            -1.0,
        );
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.surface.css_size = (width, height);
        self.surface.apply_size();
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.surface.pixel_ratio = ratio;
        self.surface.apply_size();
    }

    fn pixel_ratio(&self) -> f32 {
        self.surface.pixel_ratio
    }
}

/// Left eye on even rows, right eye on odd rows of the same canvas.
pub struct ParallaxBarrierRenderer {
    surface: Surface,
    pass: SpritePass,
    params: StereoParams,
}

impl ParallaxBarrierRenderer {
    pub fn new(canvas: &HtmlCanvasElement, params: StereoParams) -> Result<Self, JsValue> {
        let surface = Surface::new(canvas)?;
        let pass = SpritePass::new(&surface.gl)?;
        Ok(Self { surface, pass, params })
    }
}

impl Renderer for ParallaxBarrierRenderer {
    fn render(&mut self, frame: &Frame<'_>) {
        let half_height = self.surface.begin(frame.clear_color);
        let point_scale = frame.camera.projection().y_axis.y * half_height;
        let [left, right] = self.params.eye_view_projs(frame.camera);
        self.pass.upload(&self.surface.gl, frame.sprites);
        self.pass.draw(&self.surface.gl, left, point_scale, 0.0);
        self.pass.draw(&self.surface.gl, right, point_scale, 1.0);
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.surface.css_size = (width, height);
        self.surface.apply_size();
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.surface.pixel_ratio = ratio;
        self.surface.apply_size();
    }

    fn pixel_ratio(&self) -> f32 {
        self.surface.pixel_ratio
    }
}

impl StereoRenderer for ParallaxBarrierRenderer {
    fn set_stereo(&mut self, params: StereoParams) {
        self.params = params;
    }

    fn stereo(&self) -> StereoParams {
        self.params
    }
}
