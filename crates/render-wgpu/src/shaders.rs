/// WGSL shader for registered meshes, drawn instanced.
///
/// `shading.x` blends between flat color (0) and diffuse lighting (1).
pub const MESH_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    light_position: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
    @location(7) color: vec4<f32>,
    @location(8) shading: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) lit: f32,
};

@vertex
fn vs_mesh(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_normal = normalize(world_normal);
    out.color = instance.color;
    out.lit = instance.shading.x;
    return out;
}

@fragment
fn fs_mesh(in: VertexOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.3, 1.0, 0.5));
    let ambient = 0.3;
    let diffuse = max(dot(normalize(in.world_normal), light_dir), 0.0);
    let lighting = mix(1.0, ambient + diffuse * 0.7, in.lit);
    return vec4<f32>(in.color.rgb * lighting, in.color.a);
}
"#;

/// WGSL shader for meshes with a diffuse and a roughness map, lit by a point
/// light. Shares the instance layout of [`MESH_SHADER`].
pub const TEXTURED_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    light_position: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var diffuse_map: texture_2d<f32>;
@group(1) @binding(1)
var roughness_map: texture_2d<f32>;
@group(1) @binding(2)
var map_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coord: vec2<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
    @location(7) color: vec4<f32>,
    @location(8) shading: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) tex_coord: vec2<f32>,
    @location(3) color: vec4<f32>,
};

@vertex
fn vs_textured(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.tex_coord = vertex.tex_coord;
    out.color = instance.color;
    return out;
}

@fragment
fn fs_textured(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(diffuse_map, map_sampler, in.tex_coord) * in.color;
    let roughness = textureSample(roughness_map, map_sampler, in.tex_coord).r;
    let n = normalize(in.world_normal);
    let l = normalize(uniforms.light_position.xyz - in.world_pos);
    let diffuse = max(dot(n, l), 0.0);
    let shine = (1.0 - roughness) * pow(diffuse, 16.0) * 0.4;
    let lighting = 0.25 + diffuse * 0.75;
    return vec4<f32>(albedo.rgb * lighting + vec3<f32>(shine), albedo.a);
}
"#;

/// WGSL shader for the water surface. Positions, offsets and normals arrive
/// in world space.
pub const WATER_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    light_position: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct SurfaceVertex {
    @location(0) position: vec4<f32>,
    @location(1) color: vec4<f32>,
    @location(2) normal: vec4<f32>,
    @location(3) wave_offset: vec4<f32>,
};

struct SurfaceOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_water(vertex: SurfaceVertex) -> SurfaceOutput {
    var out: SurfaceOutput;
    out.clip_position = uniforms.view_proj * (vertex.position + vertex.wave_offset);
    out.normal = vertex.normal.xyz;
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_water(in: SurfaceOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.3, 1.0, 0.5));
    let diffuse = abs(dot(normalize(in.normal), light_dir));
    let lighting = 0.35 + diffuse * 0.65;
    return vec4<f32>(in.color.rgb * lighting, in.color.a);
}
"#;
