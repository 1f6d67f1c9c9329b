use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use spriteplay::{
    Affine, ContentMode, DisplaySurface, FrameIndex, JsonVideoParser, LayerHandle,
    LayerOverrides, MaskDescriptor, Player, PlayerConfig, Renderer, SharedTicker, Size,
    SpriteDescriptor, TargetFrame,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "spriteplay", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the transform that fits content into a target frame.
    Fit(FitArgs),
    /// Play a JSON video item headlessly against a virtual 60 Hz clock.
    Play(PlayArgs),
}

#[derive(Parser, Debug)]
struct FitArgs {
    /// Content size as `WxH`.
    #[arg(long, value_parser = parse_size)]
    content: Size,

    /// Target frame as `X,Y,W,H`.
    #[arg(long, value_parser = parse_frame)]
    frame: TargetFrame,

    /// Content mode.
    #[arg(long, value_enum, default_value_t = ModeChoice::AspectFit)]
    mode: ModeChoice,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Input video item JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Player config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Loop limit (overrides the config file).
    #[arg(long)]
    loops: Option<u32>,

    /// Number of host ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Fill,
    AspectFit,
    AspectFill,
}

impl From<ModeChoice> for ContentMode {
    fn from(v: ModeChoice) -> Self {
        match v {
            ModeChoice::Fill => ContentMode::Fill,
            ModeChoice::AspectFit => ContentMode::AspectFit,
            ModeChoice::AspectFill => ContentMode::AspectFill,
        }
    }
}

fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let w = w.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let h = h.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok(Size::new(w, h))
}

fn parse_frame(s: &str) -> Result<TargetFrame, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| e.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [x, y, w, h] => Ok(TargetFrame::new(*x, *y, *w, *h)),
        _ => Err(format!("expected X,Y,W,H, got '{s}'")),
    }
}

/// Renderer that only logs what it would draw.
#[derive(Default)]
struct TraceRenderer {
    next_layer: u64,
}

impl Renderer for TraceRenderer {
    fn request_layer(
        &mut self,
        sprite: &SpriteDescriptor,
        overrides: LayerOverrides<'_>,
    ) -> LayerHandle {
        self.next_layer += 1;
        tracing::debug!(
            layer = self.next_layer,
            key = %sprite.image_key,
            overridden = !overrides.is_empty(),
            "layer"
        );
        LayerHandle(self.next_layer)
    }

    fn draw_frame(&mut self, frame: FrameIndex) {
        tracing::trace!(frame = frame.0, "draw");
    }
}

/// Surface that remembers its state and logs changes.
#[derive(Default)]
struct TraceSurface {
    visible: bool,
    layers: usize,
}

impl DisplaySurface for TraceSurface {
    fn remove_all_layers(&mut self) {
        self.layers = 0;
    }

    fn add_layer(&mut self, _layer: LayerHandle) {
        self.layers += 1;
    }

    fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            tracing::debug!(visible, "surface visibility");
        }
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_transform(&mut self, transform: Affine) {
        tracing::trace!(coeffs = ?transform.as_coeffs(), "surface transform");
    }

    fn set_mask(&mut self, mask: Option<MaskDescriptor>) {
        tracing::debug!(?mask, "surface mask");
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Fit(args) => cmd_fit(args),
        Command::Play(args) => cmd_play(args),
    }
}

fn cmd_fit(args: FitArgs) -> anyhow::Result<()> {
    let t = spriteplay::fit(args.content, args.frame, args.mode.into())?;
    println!("{}", serde_json::to_string(&t)?);
    Ok(())
}

fn read_config(path: &Path) -> anyhow::Result<PlayerConfig> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    Ok(PlayerConfig::from_json(&s)?)
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(p) => read_config(p)?,
        None => PlayerConfig::default(),
    };
    if let Some(loops) = args.loops {
        config.loops = loops;
    }

    let ticker = Rc::new(SharedTicker::new());
    let mut player = Player::with_config(
        TraceRenderer::default(),
        TraceSurface::default(),
        ticker.clone(),
        config,
    );

    let failure = Rc::new(RefCell::new(None::<String>));
    let finished = Rc::new(RefCell::new(false));
    {
        let failure = failure.clone();
        player.on_error(move |e| *failure.borrow_mut() = Some(e.to_string()));
    }
    {
        let finished = finished.clone();
        player.on_finished(move || {
            *finished.borrow_mut() = true;
            println!("finished");
        });
    }
    player.on_frame(|f| println!("frame {f}"));
    player.on_percentage(|p| println!("percentage {p:.4}"));

    player.load(&JsonVideoParser::new(), args.in_path.clone(), true);
    player.poll_loads();
    if let Some(msg) = failure.borrow().as_ref() {
        anyhow::bail!("load '{}': {msg}", args.in_path.display());
    }

    let interval = ticker.tick_interval_ms();
    for i in 0..args.ticks {
        player.on_tick(f64::from(i) * interval);
        if *finished.borrow() {
            break;
        }
    }

    tracing::info!(
        frame = player.current_frame().0,
        loops = player.loop_count(),
        "simulation done"
    );
    Ok(())
}
