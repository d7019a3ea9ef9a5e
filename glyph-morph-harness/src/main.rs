use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use crossterm::event::{
    self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEventKind, KeyModifiers,
};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use glyph_morph::config::{PROJECT_WORDS, PUBLICATION_WORDS};
use glyph_morph::easing;
use glyph_morph::view::{self, ACCENT, PRIMARY};
use glyph_morph::{
    BitmapFont, Bounds, Camera, Error, FrameScheduler, GlyphSampler, MorphConfig, MorphEngine, Palette,
    ParticleView, Sequencer, SequencerConfig, SystemClock,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Variant {
    /// Lockstep quadratic morph over research areas.
    Projects,
    /// Staggered floating morph over publication topics.
    Publications,
}

impl Variant {
    fn morph(self) -> MorphConfig {
        match self {
            Self::Projects => MorphConfig::PROJECTS,
            Self::Publications => MorphConfig::PUBLICATIONS,
        }
    }

    fn sequencer(self) -> SequencerConfig {
        match self {
            Self::Projects => SequencerConfig::PROJECTS,
            Self::Publications => SequencerConfig::PUBLICATIONS,
        }
    }

    fn words(self) -> &'static [&'static str] {
        match self {
            Self::Projects => PROJECT_WORDS,
            Self::Publications => PUBLICATION_WORDS,
        }
    }

    fn palette(self, levels: u8) -> Palette {
        match self {
            Self::Projects => Palette::jittered(PRIMARY, levels, 0.03),
            Self::Publications => Palette::gradient(PRIMARY, ACCENT, levels),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Easing {
    Linear,
    In,
    Out,
    InOut,
    InOutCubic,
}

impl Easing {
    fn curve(self) -> fn(f32) -> f32 {
        match self {
            Self::Linear => easing::linear,
            Self::In => easing::ease_in,
            Self::Out => easing::ease_out,
            Self::InOut => easing::ease_in_out,
            Self::InOutCubic => easing::ease_in_out_cubic,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "glyph-morph", version, about = "Particle text morph in the terminal")]
struct Cli {
    #[arg(long, value_enum, default_value_t = Variant::Publications)]
    variant: Variant,

    /// Comma-separated words to cycle through instead of the variant's list.
    #[arg(long, value_delimiter = ',')]
    words: Vec<String>,

    /// Particle pool size.
    #[arg(long)]
    particles: Option<usize>,

    /// Progress curve; defaults to the variant's own.
    #[arg(long, value_enum)]
    easing: Option<Easing>,

    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Pause between a morph settling and the next word, in milliseconds.
    #[arg(long)]
    hold_ms: Option<u64>,

    /// Write logs here; the terminal itself is taken over by the animation.
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Box height the presets' spatial constants are tuned for.
const PRESET_BOX_HEIGHT: f32 = 10.0;

const CAMERA_DISTANCE_PER_HEIGHT: f32 = 2.8;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    enable_raw_mode().map_err(Error::HostUnavailable)?;

    if let Err(e) = crossterm::execute!(io::stdout(), EnterAlternateScreen, EnableFocusChange) {
        let _ = disable_raw_mode();
        return Err(Error::HostUnavailable(e).into());
    }

    let result = run(&cli);

    disable_raw_mode()?;
    crossterm::execute!(io::stdout(), DisableFocusChange, LeaveAlternateScreen)?;

    if let Err(e) = &result {
        log::error!("{e:#}");
    }

    result
}

fn init_logging(cli: &Cli) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));

            if cli.verbose > 0 {
                builder.filter_level(match cli.verbose {
                    1 => log::LevelFilter::Info,
                    2 => log::LevelFilter::Debug,
                    _ => log::LevelFilter::Trace,
                });
            }
        }

        // stderr shares the alternate screen; keep it quiet.
        None => {
            builder.filter_level(log::LevelFilter::Error);
        }
    }

    builder.init();
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).map_err(Error::HostUnavailable)?;
    let size = terminal.size().map_err(Error::HostUnavailable)?;

    if size.width == 0 || size.height < 2 {
        return Err(Error::HostUnavailable(io::Error::other("terminal has no drawable area")).into());
    }

    let bounds = view::canvas_extent(canvas_area(Rect::new(0, 0, size.width, size.height)));
    let mut config = cli.variant.morph().scaled(bounds.height / PRESET_BOX_HEIGHT);

    if let Some(n) = cli.particles {
        config.pool_size = n;
    }

    if let Some(curve) = cli.easing {
        config.easing = curve.curve();
    }

    let mut seq_config = cli.variant.sequencer();

    if let Some(ms) = cli.hold_ms {
        seq_config.hold = Duration::from_millis(ms);
    }

    let words: Vec<String> = if cli.words.is_empty() {
        cli.variant.words().iter().map(|w| w.to_string()).collect()
    } else {
        cli.words.clone()
    };

    let engine = MorphEngine::new(config)?;
    let mut seq = Sequencer::new(words, GlyphSampler::new(BitmapFont), engine, bounds, seq_config)?;
    let mut scheduler = FrameScheduler::new(SystemClock::new(), cli.fps)?;
    let palette = cli.variant.palette(config.tint_levels);
    let mut camera = camera_for(cli.variant, bounds);

    terminal.clear()?;
    scheduler.start(&mut seq);

    while scheduler.is_running() {
        if scheduler.frame(&mut seq) {
            camera.orbit(scheduler.now());
            terminal.draw(|f| draw(f, &seq, &palette, camera))?;
        }

        if !event::poll(scheduler.until_next_frame())? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => scheduler.stop(),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    scheduler.stop();
                }
                _ => {}
            },

            Event::Resize(width, height) => {
                let refit = view::canvas_extent(canvas_area(Rect::new(0, 0, width, height)));
                seq.resize(refit.width, refit.height, scheduler.now());
                camera = camera_for(cli.variant, refit);
            }

            Event::FocusLost => scheduler.set_visible(false, &mut seq),
            Event::FocusGained => scheduler.set_visible(true, &mut seq),

            _ => {}
        }
    }

    Ok(())
}

fn camera_for(variant: Variant, bounds: Bounds) -> Camera {
    let mut camera = Camera::new(bounds.height * CAMERA_DISTANCE_PER_HEIGHT);

    if variant == Variant::Projects {
        camera.yaw_rate = 0.0;
    }

    camera
}

fn canvas_area(area: Rect) -> Rect {
    split_main(area)[1]
}

fn split_main(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(area)
}

fn draw(f: &mut Frame, seq: &Sequencer<BitmapFont>, palette: &Palette, camera: Camera) {
    let chunks = split_main(f.area());

    f.render_widget(
        Paragraph::new(format!("glyph-morph  [{}]  [q quit]", seq.current_word()))
            .style(Style::new().fg(Color::DarkGray)),
        chunks[0],
    );

    f.render_widget(ParticleView::new(seq.engine(), palette, camera), chunks[1]);
}
