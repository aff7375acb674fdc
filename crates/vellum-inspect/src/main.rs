use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use image::{ImageBuffer, RgbaImage};

use vellum_engine::assets::{decode_bitmap, parse_font_atlas, FontAtlas};
use vellum_engine::coords::{ClipRect, Vec2, Viewport};
use vellum_engine::device::gpu::{headless_gpu, GpuInit, RenderTarget, WgpuDevice, WgpuDeviceInit};
use vellum_engine::device::RecordingDevice;
use vellum_engine::logging::{init_logging, LoggingConfig};
use vellum_engine::render::{push_text, render_draw_lists, DrawCallList, RenderStats};

const DEFAULT_FONT_HEIGHT: &str = "16";
const DEFAULT_WIDTH: &str = "640";
const DEFAULT_HEIGHT: &str = "480";
const TEXT_COLOR: [u8; 4] = [255, 255, 255, 255];

fn cli() -> Command {
    Command::new("vellum-inspect")
        .about("Inspects bitmap and font-atlas assets and replays draw lists")
        .subcommand_required(true)
        .arg(
            Arg::new("log")
                .long("log")
                .value_name("FILTER")
                .global(true)
                .help("env_logger filter, e.g. \"vellum_engine=debug\" (defaults to RUST_LOG, then warn)"),
        )
        .subcommand(
            Command::new("image")
                .about("Decodes a bitmap and prints its size")
                .arg(Arg::new("path").required(true).value_parser(clap::value_parser!(PathBuf)))
                .arg(
                    Arg::new("png")
                        .long("png")
                        .value_name("OUT")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Also write the decoded pixels as PNG"),
                ),
        )
        .subcommand(
            Command::new("atlas")
                .about("Decodes a font atlas and prints its header and glyphs")
                .arg(Arg::new("path").required(true).value_parser(clap::value_parser!(PathBuf)))
                .arg(
                    Arg::new("height")
                        .long("height")
                        .value_name("PX")
                        .value_parser(clap::value_parser!(f32))
                        .default_value(DEFAULT_FONT_HEIGHT),
                )
                .arg(
                    Arg::new("glyph")
                        .long("glyph")
                        .value_name("CHAR")
                        .value_parser(clap::value_parser!(char))
                        .action(ArgAction::Append)
                        .help("Print metrics for this character (repeatable)"),
                ),
        )
        .subcommand(
            Command::new("replay")
                .about("Lays out text with a font atlas and renders it")
                .arg(Arg::new("atlas").required(true).value_parser(clap::value_parser!(PathBuf)))
                .arg(Arg::new("text").required(true))
                .arg(
                    Arg::new("width")
                        .long("width")
                        .value_parser(clap::value_parser!(u32))
                        .default_value(DEFAULT_WIDTH),
                )
                .arg(
                    Arg::new("height")
                        .long("height")
                        .value_parser(clap::value_parser!(u32))
                        .default_value(DEFAULT_HEIGHT),
                )
                .arg(
                    Arg::new("size")
                        .long("size")
                        .value_name("PX")
                        .value_parser(clap::value_parser!(f32))
                        .default_value(DEFAULT_FONT_HEIGHT),
                )
                .arg(
                    Arg::new("gpu")
                        .long("gpu")
                        .action(ArgAction::SetTrue)
                        .help("Render on a headless GPU instead of the recording device"),
                )
                .arg(
                    Arg::new("png")
                        .long("png")
                        .value_name("OUT")
                        .value_parser(clap::value_parser!(PathBuf))
                        .requires("gpu")
                        .help("Read the GPU render back and write it as PNG"),
                ),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    init_logging(LoggingConfig {
        env_filter: matches.get_one::<String>("log").cloned(),
        ..LoggingConfig::default()
    });

    match matches.subcommand() {
        Some(("image", m)) => inspect_image(m),
        Some(("atlas", m)) => inspect_atlas(m),
        Some(("replay", m)) => replay(m),
        _ => unreachable!("subcommand_required"),
    }
}

fn path_arg<'a>(m: &'a ArgMatches, name: &str) -> Result<&'a Path> {
    m.get_one::<PathBuf>(name)
        .map(PathBuf::as_path)
        .with_context(|| format!("missing <{name}>"))
}

/// Value of an argument that carries a `default_value`.
fn value_arg<T: Copy + Send + Sync + 'static>(m: &ArgMatches, name: &str) -> Result<T> {
    m.get_one::<T>(name)
        .copied()
        .with_context(|| format!("missing --{name}"))
}

fn inspect_image(m: &ArgMatches) -> Result<()> {
    let path = path_arg(m, "path")?;
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let pixels = decode_bitmap(&bytes).with_context(|| format!("failed to decode {}", path.display()))?;

    println!("{}: {}x{} RGBA8", path.display(), pixels.width(), pixels.height());

    if let Some(out) = m.get_one::<PathBuf>("png") {
        let (w, h) = (pixels.width(), pixels.height());
        let img: RgbaImage = ImageBuffer::from_raw(w, h, pixels.into_bytes())
            .context("pixel buffer does not match its dimensions")?;
        img.save(out)
            .with_context(|| format!("failed to write {}", out.display()))?;
        println!("wrote {}", out.display());
    }
    Ok(())
}

fn inspect_atlas(m: &ArgMatches) -> Result<()> {
    let path = path_arg(m, "path")?;
    let height = value_arg::<f32>(m, "height")?;
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let parsed = parse_font_atlas(&bytes).with_context(|| format!("failed to decode {}", path.display()))?;

    let h = parsed.header;
    println!(
        "{}: {} glyph records, max index {}, atlas {}x{}",
        path.display(),
        h.glyph_count,
        h.max_index,
        h.width,
        h.height
    );

    let mut device = RecordingDevice::new();
    let font = FontAtlas::from_parsed(&mut device, parsed, height)
        .with_context(|| format!("failed to load {}", path.display()))?;
    println!(
        "present glyphs: {}, tallest: {}px, scale at {height}px: {}",
        font.glyphs().present_count(),
        font.glyphs().max_height(),
        font.scale()
    );
    let fb = font.glyphs().fallback();
    println!("fallback: {:?} advance {}", char::from_u32(fb.code).unwrap_or('?'), fb.x_advance);

    for c in m.get_many::<char>("glyph").into_iter().flatten() {
        match font.glyph(*c as u32) {
            Some(g) => println!(
                "{c:?}: {}x{} offset ({}, {}) advance {} uv ({}, {})..({}, {})",
                g.width, g.height, g.x_offset, g.y_offset, g.x_advance, g.uv_min.x, g.uv_min.y, g.uv_max.x, g.uv_max.y
            ),
            None => println!("{c:?}: absent (renders as fallback)"),
        }
    }

    font.release(&mut device);
    Ok(())
}

fn build_text_list(font: &FontAtlas, viewport: Viewport, text: &str) -> DrawCallList {
    let clip = ClipRect::new(0.0, 0.0, viewport.width as f32, viewport.height as f32);
    let mut list = DrawCallList::new();
    push_text(&mut list, font, clip, Vec2::zero(), text, TEXT_COLOR);
    list
}

fn replay(m: &ArgMatches) -> Result<()> {
    let atlas_path = path_arg(m, "atlas")?;
    let text = m
        .get_one::<String>("text")
        .map(String::as_str)
        .context("missing <text>")?;
    let width = value_arg::<u32>(m, "width")?;
    let height = value_arg::<u32>(m, "height")?;
    let size = value_arg::<f32>(m, "size")?;
    let viewport = Viewport::new(width, height);
    anyhow::ensure!(!viewport.is_empty(), "viewport has zero size");

    log::debug!("replaying {:?} at {size}px into {width}x{height}", text);

    let bytes =
        std::fs::read(atlas_path).with_context(|| format!("failed to read {}", atlas_path.display()))?;

    if m.get_flag("gpu") {
        let png = m.get_one::<PathBuf>("png").map(PathBuf::as_path);
        return replay_gpu(&bytes, viewport, text, size, png);
    }

    let mut device = RecordingDevice::new();
    let font = FontAtlas::load(&mut device, &bytes, size)
        .with_context(|| format!("failed to decode {}", atlas_path.display()))?;
    let list = build_text_list(&font, viewport, text);

    device.clear_log();
    let stats = render_draw_lists(&mut device, viewport, &[&list]);
    for call in device.calls() {
        println!("{call:?}");
    }
    print_stats(stats, font.text_width(text));

    font.release(&mut device);
    Ok(())
}

fn replay_gpu(bytes: &[u8], viewport: Viewport, text: &str, size: f32, png: Option<&Path>) -> Result<()> {
    let (device, queue) = headless_gpu(&GpuInit::default())?;
    let mut gpu = WgpuDevice::new(device, queue, WgpuDeviceInit::default());

    let font = FontAtlas::load(&mut gpu, bytes, size).context("failed to decode font atlas")?;
    let list = build_text_list(&font, viewport, text);
    let stats = render_draw_lists(&mut gpu, viewport, &[&list]);

    let format = wgpu::TextureFormat::Rgba8Unorm;
    let size3d = wgpu::Extent3d {
        width: viewport.width,
        height: viewport.height,
        depth_or_array_layers: 1,
    };
    let target = gpu.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("vellum-inspect target"),
        size: size3d,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = gpu
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("vellum-inspect encoder"),
        });

    clear(&mut encoder, &view);
    let batches = gpu.pending().len();
    gpu.encode(&mut RenderTarget::new(
        &mut encoder,
        &view,
        format,
        (viewport.width, viewport.height),
    ));

    let readback = png.map(|_| Readback::new(gpu.device(), &mut encoder, &target, size3d));
    gpu.queue().submit(std::iter::once(encoder.finish()));
    println!("submitted {batches} batches to the GPU");

    if let (Some(out), Some(readback)) = (png, readback) {
        let pixels = readback.read(gpu.device())?;
        let img: RgbaImage = ImageBuffer::from_raw(viewport.width, viewport.height, pixels)
            .context("readback does not match the target size")?;
        img.save(out)
            .with_context(|| format!("failed to write {}", out.display()))?;
        println!("wrote {}", out.display());
    }
    print_stats(stats, font.text_width(text));

    font.release(&mut gpu);
    Ok(())
}

/// Copy of an RGBA8 render target in a mappable buffer.
///
/// Rows in the buffer are padded to `COPY_BYTES_PER_ROW_ALIGNMENT`.
struct Readback {
    buffer: wgpu::Buffer,
    row_bytes: u32,
    padded_row_bytes: u32,
    height: u32,
}

impl Readback {
    fn new(
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        texture: &wgpu::Texture,
        size: wgpu::Extent3d,
    ) -> Self {
        let row_bytes = size.width * 4;
        let padded_row_bytes = padded_row_bytes(row_bytes);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vellum-inspect readback"),
            size: u64::from(padded_row_bytes) * u64::from(size.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row_bytes),
                    rows_per_image: Some(size.height),
                },
            },
            size,
        );

        Self { buffer, row_bytes, padded_row_bytes, height: size.height }
    }

    /// Waits for the copy and returns tightly packed rows.
    fn read(self, device: &wgpu::Device) -> Result<Vec<u8>> {
        let slice = self.buffer.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| anyhow::anyhow!("device poll failed: {e}"))?;
        rx.recv()
            .context("readback callback never ran")?
            .map_err(|e| anyhow::anyhow!("failed to map readback buffer: {e}"))?;

        let pixels = {
            let mapped = slice.get_mapped_range();
            unpad_rows(&mapped, self.row_bytes, self.padded_row_bytes, self.height)
        };
        self.buffer.unmap();
        Ok(pixels)
    }
}

fn padded_row_bytes(row_bytes: u32) -> u32 {
    row_bytes.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
}

fn unpad_rows(padded: &[u8], row_bytes: u32, padded_row_bytes: u32, height: u32) -> Vec<u8> {
    padded
        .chunks(padded_row_bytes as usize)
        .take(height as usize)
        .flat_map(|row| &row[..row_bytes as usize])
        .copied()
        .collect()
}

fn clear(encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
    let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("vellum-inspect clear"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });
}

fn print_stats(stats: RenderStats, advance: f32) {
    println!(
        "{} list(s), {} command(s), {} vertices; text advance {advance}px",
        stats.lists, stats.commands, stats.vertices
    );
}
