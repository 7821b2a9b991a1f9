use glam::Mat4;

/// Converts OpenGL clip-space depth ([-1, 1]) into wgpu's ([0, 1]).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
]);

pub(crate) const SAMPLE_COUNT: u32 = 4;

pub(crate) const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.4,
    a: 1.0,
};

/// Parses a backend selection as accepted on the command line.
pub fn parse_backends(name: &str) -> Option<wgpu::Backends> {
    let backends = match name.to_ascii_lowercase().as_str() {
        "primary" => wgpu::Backends::PRIMARY,
        "gl" | "opengl" => wgpu::Backends::GL,
        "vulkan" => wgpu::Backends::VULKAN,
        "metal" => wgpu::Backends::METAL,
        "dx12" => wgpu::Backends::DX12,
        "all" => wgpu::Backends::all(),
        _ => return None,
    };
    Some(backends)
}

pub(crate) const SHADER: &str = r#"
struct Transform {
    mvp: mat4x4<f32>,
}

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec3<f32>,
}

@group(0) @binding(0)
var<uniform> transform: Transform;

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = transform.mvp * vec4<f32>(input.position, 1.0);
    out.color = input.color;
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(input.color, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use glam::Vec4;

    use super::*;

    #[test]
    fn depth_range_is_remapped() {
        let near = OPENGL_TO_WGPU * Vec4::new(0.0, 0.0, -1.0, 1.0);
        let far = OPENGL_TO_WGPU * Vec4::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(near.z / near.w, 0.0);
        assert_eq!(far.z / far.w, 1.0);
        let point = OPENGL_TO_WGPU * Vec4::new(0.3, -0.7, 0.0, 2.0);
        assert_eq!(point.x, 0.3);
        assert_eq!(point.y, -0.7);
        assert_eq!(point.w, 2.0);
    }

    #[test]
    fn backend_names() {
        assert_eq!(parse_backends("GL"), Some(wgpu::Backends::GL));
        assert_eq!(parse_backends("primary"), Some(wgpu::Backends::PRIMARY));
        assert_eq!(parse_backends("software"), None);
    }
}
