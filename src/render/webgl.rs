//! WebGL 1 rectangle renderer.
//!
//! One shared unit quad is instanced over the interleaved cell buffer; a
//! single `tweenProgress` uniform drives the whole transition, so a frame
//! costs one uniform write and one instanced draw call.

use wasm_bindgen::JsCast;
use web_sys::{
    AngleInstancedArrays, HtmlCanvasElement, OesVertexArrayObject, WebGlBuffer, WebGlProgram,
    WebGlRenderingContext as Gl, WebGlShader, WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::error::{Result, TreemapError};
use crate::types::NumCellsTier;

use super::cell_buffer::PersistentBuffer;
use super::{
    max_cells_for, NUM_FLOATS_PER_CELL_INSTANCE, NUM_INSTANCES_PER_CELL, RECTANGLE_INDICES,
    RECTANGLE_REFERENCE_POSITIONS,
};

const VERTEX_SHADER_SOURCE: &str = include_str!("shaders/rectangle.vert");
const FRAGMENT_SHADER_SOURCE: &str = include_str!("shaders/rectangle.frag");

const BYTES_PER_FLOAT: i32 = 4;
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const INSTANCE_STRIDE: i32 = NUM_FLOATS_PER_CELL_INSTANCE as i32 * BYTES_PER_FLOAT;

/// Per-instance attributes in buffer order: (name, float count).
const INSTANCE_ATTRIBUTES: [(&str, i32); 7] = [
    ("initialTopLeft", 2),
    ("finalTopLeft", 2),
    ("initialBottomRight", 2),
    ("finalBottomRight", 2),
    ("initialColor", 4),
    ("finalColor", 4),
    ("halfStrokeWidth", 1),
];

pub struct WebGlCellRenderer {
    gl: Gl,
    program: WebGlProgram,
    instanced: AngleInstancedArrays,
    vao_ext: OesVertexArrayObject,
    vao: WebGlVertexArrayObject,
    instance_buffer: WebGlBuffer,
    instance_capacity_bytes: i32,
    canvas_size_location: WebGlUniformLocation,
    tween_progress_location: WebGlUniformLocation,
}

impl WebGlCellRenderer {
    pub fn new(canvas: &HtmlCanvasElement, tier: NumCellsTier) -> Result<Self> {
        let gl = canvas
            .get_context("webgl")
            .map_err(|_| TreemapError::Resource("webgl context request failed".to_owned()))?
            .ok_or_else(|| TreemapError::Resource("webgl unsupported".to_owned()))?
            .dyn_into::<Gl>()
            .map_err(|_| TreemapError::Resource("webgl context has wrong type".to_owned()))?;

        let instanced = gl
            .get_extension("ANGLE_instanced_arrays")
            .map_err(|_| TreemapError::Resource("extension query failed".to_owned()))?
            .ok_or_else(|| {
                TreemapError::Resource("ANGLE_instanced_arrays unavailable".to_owned())
            })?
            .unchecked_into::<AngleInstancedArrays>();
        let vao_ext = gl
            .get_extension("OES_vertex_array_object")
            .map_err(|_| TreemapError::Resource("extension query failed".to_owned()))?
            .ok_or_else(|| {
                TreemapError::Resource("OES_vertex_array_object unavailable".to_owned())
            })?
            .unchecked_into::<OesVertexArrayObject>();

        let program = link_program(&gl, VERTEX_SHADER_SOURCE, FRAGMENT_SHADER_SOURCE)?;
        gl.use_program(Some(&program));

        let canvas_size_location = uniform_location(&gl, &program, "canvasSize")?;
        let tween_progress_location = uniform_location(&gl, &program, "tweenProgress")?;

        let vao = vao_ext
            .create_vertex_array_oes()
            .ok_or_else(|| TreemapError::Render("vertex array creation failed".to_owned()))?;
        vao_ext.bind_vertex_array_oes(Some(&vao));

        // Shared unit-quad geometry, one buffer for all instances.
        let reference_buffer = create_buffer(&gl)?;
        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&reference_buffer));
        gl.buffer_data_with_array_buffer_view(
            Gl::ARRAY_BUFFER,
            &js_sys::Float32Array::from(RECTANGLE_REFERENCE_POSITIONS.as_slice()),
            Gl::STATIC_DRAW,
        );
        let reference_location = attribute_location(&gl, &program, "referencePosition")?;
        gl.enable_vertex_attrib_array(reference_location);
        gl.vertex_attrib_pointer_with_i32(reference_location, 2, Gl::FLOAT, false, 0, 0);

        let index_buffer = create_buffer(&gl)?;
        gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, Some(&index_buffer));
        gl.buffer_data_with_array_buffer_view(
            Gl::ELEMENT_ARRAY_BUFFER,
            &js_sys::Uint16Array::from(RECTANGLE_INDICES.as_slice()),
            Gl::STATIC_DRAW,
        );

        let instance_buffer = create_buffer(&gl)?;
        let instance_capacity_bytes = tier_capacity_bytes(tier);
        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&instance_buffer));
        gl.buffer_data_with_i32(Gl::ARRAY_BUFFER, instance_capacity_bytes, Gl::DYNAMIC_DRAW);
        configure_instance_attributes(&gl, &program, &instanced)?;

        vao_ext.bind_vertex_array_oes(None);

        gl.enable(Gl::BLEND);
        gl.blend_func(Gl::SRC_ALPHA, Gl::ONE_MINUS_SRC_ALPHA);

        Ok(Self {
            gl,
            program,
            instanced,
            vao_ext,
            vao,
            instance_buffer,
            instance_capacity_bytes,
            canvas_size_location,
            tween_progress_location,
        })
    }

    /// Upload written instance data, reallocating the GPU buffer when the
    /// CPU side has upgraded to a larger tier.
    pub fn upload(&mut self, buffer: &PersistentBuffer) -> Result<()> {
        let gl = &self.gl;
        self.vao_ext.bind_vertex_array_oes(Some(&self.vao));
        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&self.instance_buffer));

        let required = tier_capacity_bytes(buffer.tier());
        if required > self.instance_capacity_bytes {
            gl.buffer_data_with_i32(Gl::ARRAY_BUFFER, required, Gl::DYNAMIC_DRAW);
            self.instance_capacity_bytes = required;
            configure_instance_attributes(gl, &self.program, &self.instanced)?;
        }

        gl.buffer_sub_data_with_i32_and_array_buffer_view(
            Gl::ARRAY_BUFFER,
            0,
            &js_sys::Float32Array::from(buffer.as_slice()),
        );
        self.vao_ext.bind_vertex_array_oes(None);
        Ok(())
    }

    /// Draw one frame at the given tween progress.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn draw(&self, instance_count: usize, tween_progress: f32, width: f64, height: f64) {
        let gl = &self.gl;
        gl.use_program(Some(&self.program));
        gl.viewport(0, 0, width as i32, height as i32);
        gl.uniform2f(
            Some(&self.canvas_size_location),
            width as f32,
            height as f32,
        );
        gl.uniform1f(Some(&self.tween_progress_location), tween_progress);

        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(Gl::COLOR_BUFFER_BIT);

        self.vao_ext.bind_vertex_array_oes(Some(&self.vao));
        self.instanced.draw_elements_instanced_angle_with_i32(
            Gl::TRIANGLES,
            RECTANGLE_INDICES.len() as i32,
            Gl::UNSIGNED_SHORT,
            0,
            instance_count as i32,
        );
        self.vao_ext.bind_vertex_array_oes(None);
    }

    pub fn clear(&self) {
        self.gl.clear_color(0.0, 0.0, 0.0, 0.0);
        self.gl.clear(Gl::COLOR_BUFFER_BIT);
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn tier_capacity_bytes(tier: NumCellsTier) -> i32 {
    (max_cells_for(tier) * NUM_INSTANCES_PER_CELL * NUM_FLOATS_PER_CELL_INSTANCE) as i32
        * BYTES_PER_FLOAT
}

fn create_buffer(gl: &Gl) -> Result<WebGlBuffer> {
    gl.create_buffer()
        .ok_or_else(|| TreemapError::Render("buffer creation failed".to_owned()))
}

fn uniform_location(gl: &Gl, program: &WebGlProgram, name: &str) -> Result<WebGlUniformLocation> {
    gl.get_uniform_location(program, name)
        .ok_or_else(|| TreemapError::Render(format!("missing uniform: {name}")))
}

fn attribute_location(gl: &Gl, program: &WebGlProgram, name: &str) -> Result<u32> {
    let location = gl.get_attrib_location(program, name);
    u32::try_from(location)
        .map_err(|_| TreemapError::Render(format!("missing attribute: {name}")))
}

fn configure_instance_attributes(
    gl: &Gl,
    program: &WebGlProgram,
    instanced: &AngleInstancedArrays,
) -> Result<()> {
    let mut offset = 0;
    for (name, size) in INSTANCE_ATTRIBUTES {
        let location = attribute_location(gl, program, name)?;
        gl.enable_vertex_attrib_array(location);
        gl.vertex_attrib_pointer_with_i32(
            location,
            size,
            Gl::FLOAT,
            false,
            INSTANCE_STRIDE,
            offset,
        );
        instanced.vertex_attrib_divisor_angle(location, 1);
        offset += size * BYTES_PER_FLOAT;
    }
    Ok(())
}

fn compile_shader(gl: &Gl, kind: u32, source: &str) -> Result<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| TreemapError::Render("shader creation failed".to_owned()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        Err(TreemapError::Render(format!("shader compile failed: {log}")))
    }
}

fn link_program(gl: &Gl, vertex_source: &str, fragment_source: &str) -> Result<WebGlProgram> {
    let vertex = compile_shader(gl, Gl::VERTEX_SHADER, vertex_source)?;
    let fragment = compile_shader(gl, Gl::FRAGMENT_SHADER, fragment_source)?;
    let program = gl
        .create_program()
        .ok_or_else(|| TreemapError::Render("program creation failed".to_owned()))?;
    gl.attach_shader(&program, &vertex);
    gl.attach_shader(&program, &fragment);
    gl.link_program(&program);
    if gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        Err(TreemapError::Render(format!("program link failed: {log}")))
    }
}
