use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};
use sketch_canvas::export::{encode_png, png_file_to_data_url};
use sketch_canvas::input::Canvas;
use sketch_canvas::palette::PaletteColor;
use sketch_canvas::script::StrokeScript;
use sketch_guess::board::RelayClient;
use sketch_guess::config::{DEFAULT_BASE_URL, DEFAULT_MAX_BODY_BYTES, RelayConfig, parse_duration};
use sketch_guess::profiles;
use tracing_subscriber::EnvFilter;

/// Draw something, let a vision model guess what it is.
#[derive(Parser, Debug)]
#[command(name = "sketch-guess")]
#[command(about = "🎨 Relay sketches to a vision-language model and show its guesses")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the analyze-drawing relay server
    Serve(ServeArgs),
    /// Send a PNG or a stroke script to a running relay
    Guess(GuessArgs),
    /// List the built-in model profiles
    Models,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Inference API key
    #[arg(long, env = "DASHSCOPE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Inference API root (OpenAI-compatible)
    #[arg(long, env = "DASHSCOPE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Profile used when a request names none
    #[arg(long, env = "SKETCH_GUESS_MODEL")]
    default_model: Option<String>,

    /// Listen address
    #[arg(long, env = "SKETCH_GUESS_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Bound on each inference call: 30s, 2m or plain seconds
    #[arg(long, env = "SKETCH_GUESS_TIMEOUT", default_value = "30s")]
    timeout: String,

    /// Largest accepted request body in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    max_body: usize,
}

#[derive(Args, Debug)]
struct GuessArgs {
    /// Relay root URL
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server: String,

    /// PNG file to send
    #[arg(long, conflicts_with = "strokes", required_unless_present = "strokes")]
    image: Option<PathBuf>,

    /// Stroke script (JSON) to draw and send
    #[arg(long)]
    strokes: Option<PathBuf>,

    /// Starting brush color for the stroke script
    #[arg(long, value_enum, default_value = "black")]
    color: PaletteColor,

    /// Starting brush width for the stroke script (1-20)
    #[arg(long, default_value_t = 5)]
    width: u32,

    /// Write the rendered stroke script to this PNG before sending
    #[arg(long)]
    save: Option<PathBuf>,

    /// Model profile to ask
    #[arg(short, long)]
    model: Option<String>,

    /// Client-side request timeout
    #[arg(long, default_value = "60s")]
    timeout: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Guess(args) => guess(args).await,
        Command::Models => {
            print_models();
            Ok(())
        }
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let config = RelayConfig::new(
        args.api_key,
        args.base_url,
        args.default_model,
        args.bind,
        parse_duration(&args.timeout)?,
        args.max_body,
    );
    sketch_guess::run_relay(config).await
}

async fn guess(args: GuessArgs) -> Result<()> {
    let image_data = match (&args.image, &args.strokes) {
        (Some(path), _) => png_file_to_data_url(path)?,
        (None, Some(path)) => render_strokes(path, &args)?,
        (None, None) => return Err(anyhow!("Pass --image or --strokes")),
    };

    let client = RelayClient::new(&args.server, parse_duration(&args.timeout)?)?;
    let model = args.model.as_deref().unwrap_or(profiles::DEFAULT_PROFILE);
    let reply = client.analyze(&image_data, Some(model)).await?;
    println!("Guess: {}", reply.guess);
    println!("Model: {}", reply.model);
    Ok(())
}

fn render_strokes(path: &Path, args: &GuessArgs) -> Result<String> {
    let script = StrokeScript::load(path)?;
    let mut canvas = Canvas::default();
    canvas.set_color(args.color.rgba());
    canvas.set_width(args.width);
    script.replay(&mut canvas)?;

    if let Some(save) = &args.save {
        std::fs::write(save, encode_png(canvas.surface().raster())?)?;
        println!("Saved rendering to {}", save.display());
    }
    canvas.export()
}

fn print_models() {
    println!(
        "{:<22} {:<26} {:>5} {:>8} {:>4}  {}",
        "NAME", "DISPLAY NAME", "SPEED", "ACCURACY", "COST", "FEATURES"
    );
    for profile in profiles::all() {
        let marker = if profile.name == profiles::DEFAULT_PROFILE { "*" } else { " " };
        println!(
            "{:<22} {:<26} {:>5} {:>8} {:>4}  {}",
            format!("{}{}", profile.name, marker),
            profile.display_name,
            profile.comparison.speed,
            profile.comparison.accuracy,
            profile.comparison.cost,
            profile.comparison.features.join(", ")
        );
    }
    println!("\n* default. temperature / max tokens:");
    for profile in profiles::all() {
        println!("  {:<22} {:.1} / {}", profile.name, profile.temperature, profile.max_tokens);
    }
}
