use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use layerset::{AlphaCompression, ChunkManifest, LayerSet, LayerSetConfig, OpacityMap};

#[derive(Parser, Debug)]
#[command(name = "layerset", version)]
struct Cli {
    /// Engine configuration JSON: chunk geometry, load layout and write options.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a chunk's layer table and coverage.
    Inspect(InspectArgs),
    /// Render a chunk's alpha as a PNG.
    Preview(PreviewArgs),
    /// Run-length encode a raw 4096-byte opacity map.
    Encode(CodecArgs),
    /// Decode a run-length encoded opacity map.
    Decode(DecodeArgs),
    /// Re-serialize a chunk's alpha payload with other write options.
    Convert(ConvertArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Chunk manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Chunk manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Render one layer's visible weight instead of the RGB overview.
    #[arg(long)]
    layer: Option<usize>,
}

#[derive(Parser, Debug)]
struct CodecArgs {
    /// Input file.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output file.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct DecodeArgs {
    #[command(flatten)]
    io: CodecArgs,

    /// Write a grayscale PNG instead of raw bytes.
    #[arg(long)]
    png: bool,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Chunk manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory for the new manifest and alpha payload.
    #[arg(long)]
    out_dir: PathBuf,

    /// Write cascading alpha for old readers.
    #[arg(long)]
    legacy: bool,

    /// Write raw maps instead of run-length streams.
    #[arg(long)]
    uncompressed: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args, &cfg),
        Command::Preview(args) => cmd_preview(args, &cfg),
        Command::Encode(args) => cmd_encode(args),
        Command::Decode(args) => cmd_decode(args),
        Command::Convert(args) => cmd_convert(args, &cfg),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<LayerSetConfig> {
    let Some(path) = path else {
        return Ok(LayerSetConfig::default());
    };
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    LayerSetConfig::from_json_str(&s)
        .with_context(|| format!("parse config '{}'", path.display()))
}

fn load_chunk(
    path: &Path,
    cfg: &LayerSetConfig,
) -> anyhow::Result<(ChunkManifest, LayerSet<String>)> {
    let manifest = ChunkManifest::load(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let set = manifest
        .load_layer_set_with(base_dir, cfg)
        .with_context(|| format!("load chunk '{}'", path.display()))?;
    Ok((manifest, set))
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs, cfg: &LayerSetConfig) -> anyhow::Result<()> {
    let (manifest, set) = load_chunk(&args.in_path, cfg)?;
    println!("chunk {}: {} layer(s)", manifest.chunk, set.layer_count());

    let mut covered = [0usize; layerset::MAX_LAYERS];
    let mut total = [0u64; layerset::MAX_LAYERS];
    for texel in 0..layerset::ALPHA_MAP_TEXELS {
        let w = set.layer_weights(texel);
        for k in 0..set.layer_count() {
            covered[k] += usize::from(w[k] > 0);
            total[k] += u64::from(w[k]);
        }
    }

    for (i, texture) in set.textures().enumerate() {
        let flags = set.flags(i).unwrap_or_default();
        println!(
            "  [{i}] {texture} flags=0x{:03x} effect={} covered={}/{} mean={:.1}",
            flags.bits(),
            set.effect_id(i).unwrap_or(0),
            covered[i],
            layerset::ALPHA_MAP_TEXELS,
            total[i] as f64 / layerset::ALPHA_MAP_TEXELS as f64,
        );
    }
    Ok(())
}

fn cmd_preview(args: PreviewArgs, cfg: &LayerSetConfig) -> anyhow::Result<()> {
    let (_, set) = load_chunk(&args.in_path, cfg)?;
    ensure_parent(&args.out)?;

    let saved = match args.layer {
        Some(layer) => {
            let img = set
                .layer_image(layer)
                .with_context(|| format!("chunk has no layer {layer}"))?;
            img.save_with_format(&args.out, image::ImageFormat::Png)
        }
        None => set
            .overview_image()
            .save_with_format(&args.out, image::ImageFormat::Png),
    };
    saved.with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_encode(args: CodecArgs) -> anyhow::Result<()> {
    let raw = std::fs::read(&args.in_path)
        .with_context(|| format!("read '{}'", args.in_path.display()))?;
    let map = OpacityMap::from_bytes(&raw)?;
    let stream = layerset::encode_rle(&map);

    ensure_parent(&args.out)?;
    std::fs::write(&args.out, &stream)
        .with_context(|| format!("write '{}'", args.out.display()))?;
    eprintln!("encoded {} -> {} bytes", raw.len(), stream.len());
    Ok(())
}

fn cmd_decode(args: DecodeArgs) -> anyhow::Result<()> {
    let CodecArgs { in_path, out } = args.io;
    let stream =
        std::fs::read(&in_path).with_context(|| format!("read '{}'", in_path.display()))?;
    let (map, used) = layerset::decode_rle(&stream)?;
    if used != stream.len() {
        eprintln!("ignoring {} trailing bytes", stream.len() - used);
    }

    ensure_parent(&out)?;
    if args.png {
        let dim = layerset::ALPHA_MAP_DIM as u32;
        image::save_buffer_with_format(
            &out,
            map.as_bytes(),
            dim,
            dim,
            image::ColorType::L8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", out.display()))?;
    } else {
        std::fs::write(&out, map.as_bytes())
            .with_context(|| format!("write '{}'", out.display()))?;
    }
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_convert(args: ConvertArgs, cfg: &LayerSetConfig) -> anyhow::Result<()> {
    let (manifest, set) = load_chunk(&args.in_path, cfg)?;

    let mut opts = cfg.write;
    opts.legacy_cascading |= args.legacy;
    if args.uncompressed {
        opts.compression = AlphaCompression::Uncompressed;
    }

    let payload = set.serialize_alpha(&opts)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    let alpha_file = PathBuf::from(format!("chunk_{}_{}.alpha", manifest.chunk.x, manifest.chunk.z));
    let alpha_path = args.out_dir.join(&alpha_file);
    std::fs::write(&alpha_path, &payload.bytes)
        .with_context(|| format!("write '{}'", alpha_path.display()))?;

    let out_manifest = ChunkManifest::describe(manifest.chunk, &set, &payload, &opts, alpha_file)?;
    let manifest_path = args.out_dir.join("manifest.json");
    out_manifest.save(&manifest_path)?;

    eprintln!(
        "wrote {} ({} bytes) and {}",
        alpha_path.display(),
        payload.bytes.len(),
        manifest_path.display()
    );
    Ok(())
}
