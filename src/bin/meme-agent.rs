use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "meme-agent", version, about = "Zero-click meme generator service")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API.
    Serve(meme_agent::ServeArgs),
    /// Run the hello-world stub server.
    Hello(HelloArgs),
    /// Render an animated meme GIF from a local image.
    Render(RenderArgs),
    /// Print the built-in caption list (after the safety filter) as JSON.
    Captions,
}

#[derive(Parser, Debug)]
struct HelloArgs {
    /// Listen host.
    #[arg(long, env = "MEME_AGENT_HOST", default_value = "127.0.0.1")]
    host: std::net::IpAddr,

    /// Listen port.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Source image (PNG, JPEG, GIF, ...).
    #[arg(long)]
    image: PathBuf,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,

    /// Top caption; typed in over the first part of the animation.
    #[arg(long, requires = "bottom", conflicts_with = "caption_index")]
    top: Option<String>,

    /// Bottom caption; shakes every frame.
    #[arg(long, requires = "top", conflicts_with = "caption_index")]
    bottom: Option<String>,

    /// Use entry N (0-based) of the built-in caption list instead of --top/--bottom.
    #[arg(long, default_value_t = 0)]
    caption_index: usize,

    /// Number of frames.
    #[arg(long, default_value_t = meme_agent::config::DEFAULT_FRAME_COUNT)]
    frames: u32,

    /// Per-frame delay in milliseconds.
    #[arg(long, default_value_t = meme_agent::config::DEFAULT_FRAME_DELAY_MS)]
    delay_ms: u32,

    /// Caption font file; defaults to a system Impact or bold sans-serif.
    #[arg(long, env = "MEME_FONT_PATH")]
    font: Option<PathBuf>,

    /// Print the resolved caption font family to stderr.
    #[arg(long)]
    dump_font: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve(args) => {
            let config = args.into_config()?;
            meme_agent::serve(config).await?;
        }
        Command::Hello(args) => {
            let addr = std::net::SocketAddr::new(args.host, args.port);
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("bind {addr}"))?;
            meme_agent::serve_hello(listener).await?;
        }
        Command::Render(args) => {
            tokio::task::spawn_blocking(move || cmd_render(args))
                .await
                .context("render task")??;
        }
        Command::Captions => cmd_captions()?,
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let caption = match (args.top, args.bottom) {
        (Some(top), Some(bottom)) => {
            meme_agent::CaptionRecord::new(meme_agent::CaptionStyle::TopBottom, top, bottom, "")
        }
        _ => {
            let mut list = meme_agent::mock_captions();
            anyhow::ensure!(
                args.caption_index < list.len(),
                "caption index {} out of range (0..{})",
                args.caption_index,
                list.len()
            );
            list.swap_remove(args.caption_index)
        }
    };
    let caption = meme_agent::SafetyFilter::default().sanitize_record(&caption);

    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("read image '{}'", args.image.display()))?;
    let source = meme_agent::SourceImage::decode(&bytes)?;

    let font = meme_agent::CaptionFont::resolve(args.font.as_deref())?;
    if args.dump_font {
        match &font {
            Some(f) => eprintln!("caption font: {}", f.family()),
            None => eprintln!("caption font: <none>"),
        }
    }

    let req = meme_agent::AnimationRequest::new(source, caption).with_timing(args.frames, args.delay_ms);
    let mut sink = meme_agent::GifSink::default();
    meme_agent::Compositor::new(font).render_into(&req, &mut sink)?;
    let gif = sink.into_bytes()?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &gif)
        .with_context(|| format!("write gif '{}'", args.out.display()))?;

    eprintln!("wrote {} ({} frames)", args.out.display(), args.frames);
    Ok(())
}

fn cmd_captions() -> anyhow::Result<()> {
    let safe = meme_agent::SafetyFilter::default().sanitize_all(&meme_agent::mock_captions());
    println!(
        "{}",
        serde_json::to_string_pretty(&safe).context("serialize captions")?
    );
    Ok(())
}
