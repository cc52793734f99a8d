//! CLI command implementations.

use std::path::Path;

use frustum_gpu::DeviceContext;
use frustum_math::format::format_rows;
use frustum_math::ProjectionBuffer;
use frustum_mesh::generators::unit_cube;
use frustum_mesh::obj::load_obj;
use frustum_mesh::Mesh;
use frustum_render::{
    Camera, CameraMotion, FrameLoop, HeadlessRenderer, JsonFrameExporter, Object3D, Projection,
    Renderer, RendererConfig,
};
use frustum_telemetry::TracingSink;
use frustum_types::{FrustumError, FrustumResult};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Render frames without a window.
pub fn render(
    mesh_path: Option<&str>,
    config_path: Option<&str>,
    frames: Option<u32>,
    output_path: Option<&str>,
    motions: &[CameraMotion],
) -> CommandResult {
    let mut config = load_config(config_path)?;
    if let Some(frames) = frames {
        config.frames = frames;
    }
    let mesh = load_mesh(mesh_path)?;

    println!("Frustum Render");
    println!("──────────────");
    println!("Mesh:     {} ({} verts, {} tris)", mesh_path.unwrap_or("unit cube"), mesh.vertex_count(), mesh.triangle_count());
    println!("Output:   {}x{}", config.width, config.height);
    println!("Frames:   {}", config.frames);
    println!();

    let renderer: Box<dyn Renderer> = match output_path {
        Some(path) => Box::new(JsonFrameExporter::new(path)),
        None => Box::new(HeadlessRenderer::new()),
    };

    let ctx = DeviceContext::cpu();
    let frame_count = config.frames;
    let mut frame_loop = FrameLoop::new(&ctx, config, &mesh, renderer)?;
    frame_loop.add_sink(Box::new(TracingSink::new()));

    let mut drawn = 0usize;
    let mut culled = 0u64;
    for _ in 0..frame_count {
        let frame = frame_loop.step(motions)?;
        drawn += frame.drawn();
        culled += u64::from(frame.culled);
    }
    frame_loop.finish()?;
    tracing::info!(frames = frame_count, drawn, culled, "render finished");

    let pool = ctx.pool_stats();
    let backend = ctx.backend_stats();
    println!("Triangles drawn:   {drawn}");
    println!("Triangles culled:  {culled}");
    println!("Pool allocations:  {}", pool.allocations);
    println!("Pool reuses:       {}", pool.reuses);
    println!("Kernel calls:      {}", backend.kernel_calls);
    if let Some(path) = output_path {
        println!("Frames written to: {path}");
    }
    Ok(())
}

/// Print mesh statistics.
pub fn inspect(path: &str) -> CommandResult {
    println!("Frustum Mesh Inspector");
    println!("──────────────────────");
    println!();

    let mesh = load_mesh(Some(path))?;
    println!("Vertices:   {}", mesh.vertex_count());
    println!("Triangles:  {}", mesh.triangle_count());
    if let Some((lo, hi)) = mesh.bounds() {
        println!("Min:        [{:.4}, {:.4}, {:.4}]", lo[0], lo[1], lo[2]);
        println!("Max:        [{:.4}, {:.4}, {:.4}]", hi[0], hi[1], hi[2]);
        println!(
            "Extent:     [{:.4}, {:.4}, {:.4}]",
            hi[0] - lo[0],
            hi[1] - lo[1],
            hi[2] - lo[2]
        );
    }
    Ok(())
}

/// Print the vertex matrix after every stage of the first frame.
pub fn dump(mesh_path: Option<&str>, config_path: Option<&str>) -> CommandResult {
    let config = load_config(config_path)?;
    let mesh = load_mesh(mesh_path)?;

    let ctx = DeviceContext::cpu();
    let mut camera = Camera::new(&ctx, &config)?;
    let projection = Projection::new(&ctx, &config)?;
    let object = Object3D::from_mesh(&ctx, &mesh)?;
    let mut camera_matrix = camera.camera_matrix()?;
    let mut projection_matrix = projection.projection_matrix().try_clone()?;
    let mut screen_matrix = projection.screen_matrix().try_clone()?;
    tracing::info!(
        vertices = object.vertex_count(),
        width = config.width,
        height = config.height,
        "dumping first frame"
    );

    let vertices = object.vertices().matrix();
    let mut target = ProjectionBuffer::zeros(&ctx, vertices.rows(), vertices.cols())?;
    let cols = target.cols();

    print_matrix("vertices", &vertices.to_host()?, cols);
    print_matrix("camera matrix", camera_matrix.to_host()?, 4);

    target.multiply_and_assign(vertices, &camera_matrix)?;
    print_matrix(target.stage().name(), target.to_host()?, cols);

    print_matrix("projection matrix", projection_matrix.to_host()?, 4);
    target.multiply(&projection_matrix)?;
    print_matrix(target.stage().name(), target.to_host()?, cols);

    target.normalize_and_cutoff()?;
    print_matrix(target.stage().name(), target.to_host()?, cols);

    print_matrix("screen matrix", screen_matrix.to_host()?, 4);
    target.multiply(&screen_matrix)?;
    print_matrix(target.stage().name(), target.to_host()?, cols);

    Ok(())
}

/// Validate a config or a mesh.
pub fn validate(path: &str) -> CommandResult {
    println!("Frustum Validator");
    println!("─────────────────");
    println!();

    match extension(path).as_deref() {
        Some("toml") => {
            println!("Validating config: {path}");
            match RendererConfig::load(path) {
                Ok(config) => println!(
                    "✅ Config is valid ({}x{}, near {}, far {}).",
                    config.width, config.height, config.near_plane, config.far_plane
                ),
                Err(e) => println!("❌ Config validation failed: {e}"),
            }
        }
        Some("obj") | Some("json") => {
            println!("Validating mesh: {path}");
            match load_mesh(Some(path)) {
                Ok(mesh) => println!(
                    "✅ Mesh is valid ({} verts, {} tris).",
                    mesh.vertex_count(),
                    mesh.triangle_count()
                ),
                Err(e) => println!("❌ Mesh validation failed: {e}"),
            }
        }
        _ => println!("Unsupported file format. Use .toml (config) or .obj/.json (mesh)."),
    }
    Ok(())
}

fn load_config(path: Option<&str>) -> FrustumResult<RendererConfig> {
    match path {
        Some(path) => RendererConfig::load(path),
        None => Ok(RendererConfig::default()),
    }
}

fn load_mesh(path: Option<&str>) -> FrustumResult<Mesh> {
    let Some(path) = path else {
        tracing::debug!("no mesh given, using the unit cube");
        return Ok(unit_cube());
    };
    match extension(path).as_deref() {
        Some("obj") => load_obj(path),
        Some("json") => {
            let content = std::fs::read_to_string(path)?;
            let mesh: Mesh = serde_json::from_str(&content)
                .map_err(|e| FrustumError::Serialization(format!("mesh JSON: {e}")))?;
            mesh.validate()?;
            Ok(mesh)
        }
        _ => Err(FrustumError::InvalidMesh(format!(
            "unsupported mesh format: {path} (expected .obj or .json)"
        ))),
    }
}

fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

fn print_matrix(label: &str, values: &[f64], cols: usize) {
    println!("{label}:");
    print!("{}", format_rows(values, cols));
    println!();
}
