//! Command-line interface for wordlens.
//!
//! Drives the reading core from a terminal: the open article is laid out on
//! a character grid, so clicks and drags can be given as coordinates or
//! found by text.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::adapters::{
    LlmTranslator, PlayerCommand, QuickTranslator, RemoteSpeech, SystemSpeech, TieredTranslator,
    TranslationProvider,
};
use crate::audio::PlaybackController;
use crate::config::{self, ResolvedConfig};
use crate::core::{History, LookupSequencer, LookupSettings, Presentation, Reader};
use crate::domain::{LookupState, Point};
use crate::popover::{RenderPosition, Side};
use crate::resolver::{caret_at_offset, text_content, Document, LayoutMetrics, MonospaceLayout, SelectionRange};
use crate::session::{Article, Bookmark, JsonFileStore, KeyValueStore, ReadingSettings, SessionState};

/// wordlens - click-to-translate reading assistant
#[derive(Parser, Debug)]
#[command(name = "wordlens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up a word or phrase in the open article
    Lookup(LookupArgs),

    /// Pronounce text
    Speak {
        /// Text to pronounce
        text: String,

        /// Language/locale of the text
        #[arg(short, long)]
        lang: Option<String>,

        /// Playback rate multiplier
        #[arg(short, long)]
        speed: Option<f32>,
    },

    /// Open an article for reading (reads stdin if no file is given)
    Open {
        /// Article text file
        file: Option<PathBuf>,

        /// Custom title (first paragraph if not specified)
        #[arg(long)]
        title: Option<String>,
    },

    /// Show or set the reading position
    Bookmark {
        /// Paragraph index to bookmark (0-based)
        paragraph: Option<usize>,
    },

    /// List recent lookups
    History {
        /// Maximum number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show or change reading settings
    Settings {
        /// Article language, or "auto"
        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        target: Option<String>,

        /// Pronunciations played after a word lookup
        #[arg(long)]
        auto_play: Option<u32>,

        #[arg(long)]
        speed: Option<f32>,

        /// Request detailed explanations
        #[arg(long)]
        detailed: Option<bool>,
    },

    /// Show resolved configuration (debug)
    Config,
}

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Click position "x,y" in layout units
    #[arg(long, value_parser = parse_point, conflicts_with_all = ["select", "find"])]
    pub point: Option<Point>,

    /// Drag selection "start..end" as character offsets into the article
    #[arg(long, value_parser = parse_range, conflicts_with = "find")]
    pub select: Option<(usize, usize)>,

    /// Click the first occurrence of a word, or drag over a phrase
    #[arg(long)]
    pub find: Option<String>,

    /// Override the article language
    #[arg(long)]
    pub source: Option<String>,

    /// Override the target language
    #[arg(long)]
    pub target: Option<String>,

    /// Request a detailed explanation
    #[arg(long)]
    pub detailed: bool,

    /// Pronounce the result
    #[arg(long)]
    pub speak: bool,

    /// Characters per line of the layout grid
    #[arg(long, env = "WORDLENS_COLUMNS", default_value = "60")]
    pub columns: usize,
}

fn parse_point(s: &str) -> std::result::Result<Point, String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected x,y but got '{}'", s))?;
    let x: f64 = x.trim().parse().map_err(|_| format!("invalid x '{}'", x))?;
    let y: f64 = y.trim().parse().map_err(|_| format!("invalid y '{}'", y))?;
    Ok(Point::new(x, y))
}

fn parse_range(s: &str) -> std::result::Result<(usize, usize), String> {
    let (a, b) = s.split_once("..").ok_or_else(|| format!("expected start..end but got '{}'", s))?;
    let a: usize = a.trim().parse().map_err(|_| format!("invalid start '{}'", a))?;
    let b: usize = b.trim().parse().map_err(|_| format!("invalid end '{}'", b))?;
    Ok((a, b))
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let cfg = config::config()?;
        let store = JsonFileStore::open(cfg.session_path());

        match self.command {
            Commands::Lookup(args) => lookup(cfg, &store, args).await,
            Commands::Speak { text, lang, speed } => speak(cfg, &store, &text, lang, speed).await,
            Commands::Open { file, title } => open_article(&store, file, title),
            Commands::Bookmark { paragraph } => bookmark(&store, paragraph),
            Commands::History { limit } => show_history(&store, limit),
            Commands::Settings {
                source,
                target,
                auto_play,
                speed,
                detailed,
            } => update_settings(&store, source, target, auto_play, speed, detailed),
            Commands::Config => show_config(cfg),
        }
    }
}

/// Translation stack from configuration
pub fn build_translator(cfg: &ResolvedConfig) -> Arc<dyn TranslationProvider> {
    let t = &cfg.translation;
    let rich: Arc<dyn TranslationProvider> =
        Arc::new(LlmTranslator::new(&t.endpoint, &t.model, t.api_key.clone()));
    let quick: Option<Arc<dyn TranslationProvider>> = if t.quick_first {
        Some(Arc::new(QuickTranslator::new(&t.quick_endpoint)))
    } else {
        None
    };
    Arc::new(TieredTranslator::new(quick, rich))
}

/// Playback controller from configuration
pub fn build_playback(cfg: &ResolvedConfig) -> Result<PlaybackController> {
    let s = &cfg.speech;
    let player = match &s.player {
        Some(line) => PlayerCommand::parse(line)
            .with_context(|| format!("Invalid player command: '{}'", line))?,
        None => PlayerCommand::default(),
    };
    Ok(PlaybackController::new(
        Arc::new(RemoteSpeech::new(&s.endpoint, player)),
        Arc::new(SystemSpeech::new(&s.espeak_binary)),
    )
    .with_max_chars(s.max_chars))
}

/// Look up a word or phrase in the open article
async fn lookup(cfg: &ResolvedConfig, store: &dyn KeyValueStore, args: LookupArgs) -> Result<()> {
    let session = SessionState::load(store);
    let article = session
        .article
        .context("No article is open. Use 'wordlens open <file>' first")?;

    let mut settings = session.settings.clone();
    if let Some(source) = args.source {
        settings.source_language = source;
    }
    if let Some(target) = args.target {
        settings.target_language = target;
    }
    settings.detailed |= args.detailed;
    // Audio is played explicitly below so the process outlives it
    settings.auto_play_count = 0;

    let history = History::new(cfg.lookup.history_capacity, cfg.lookup.dedupe_window)
        .with_entries(session.history.clone());
    let presentation = Arc::new(Presentation::new(history));
    let sequencer = Arc::new(LookupSequencer::new(
        build_translator(cfg),
        Arc::new(build_playback(cfg)?),
        Arc::clone(&presentation),
        LookupSettings {
            request_timeout: cfg.translation.timeout,
            auto_play_pause: cfg.lookup.auto_play_pause,
            ..LookupSettings::default()
        },
    ));

    let document = Document::from_article(&article.text);
    let metrics = LayoutMetrics {
        columns: args.columns.max(1),
        ..LayoutMetrics::default()
    };
    let layout = MonospaceLayout::new(&document, document.root(), metrics);
    let mut reader = Reader::new(document, layout, sequencer, settings, cfg.popover.clone());

    let handle = if let Some(point) = args.point {
        reader.click(point)
    } else if let Some((start, end)) = args.select {
        let range = selection(reader.document(), start, end)?;
        reader.select(range)
    } else if let Some(needle) = args.find {
        find_and_submit(&mut reader, &needle)?
    } else {
        anyhow::bail!("Nothing to look up. Use --point, --select or --find");
    };

    let Some(handle) = handle else {
        println!("Nothing there to look up");
        return Ok(());
    };

    let state = handle.await.context("Lookup task panicked")?;
    let snapshot = reader.snapshot();
    info!(state = state.as_str(), generation = snapshot.generation, "Lookup finished");

    if let Some(resolution) = reader.current() {
        println!("Span:    {}", resolution.span.text);
        println!("Context: {}", resolution.context.text);
    }

    match state {
        LookupState::Resolved => {
            if let Some(def) = &snapshot.definition {
                println!();
                println!("{}  [{}]  {}", def.word, def.pronunciation, def.part_of_speech);
                println!("  {}", def.translation);
                if let Some(detail) = &def.detailed_explanation {
                    println!();
                    println!("{}", detail);
                }
            }
            if let Some(position) = reader.popover_position() {
                println!();
                print_position(&position);
            }

            SessionState::save_history(store, &presentation.history());

            if args.speak {
                reader.play_current().await?;
            }
        }
        LookupState::Failed => {
            anyhow::bail!(
                "{}",
                snapshot.error.unwrap_or_else(|| "Lookup failed".to_string())
            );
        }
        LookupState::Superseded | LookupState::Issued => {}
    }

    Ok(())
}

/// Selection between two article offsets
fn selection(document: &Document, start: usize, end: usize) -> Result<SelectionRange> {
    let root = document.root();
    let anchor = caret_at_offset(document, root, start)
        .with_context(|| format!("Offset {} is outside the article", start))?;
    let focus = caret_at_offset(document, root, end)
        .with_context(|| format!("Offset {} is outside the article", end))?;
    Ok(SelectionRange::new(anchor, focus))
}

fn find_and_submit(
    reader: &mut Reader,
    needle: &str,
) -> Result<Option<tokio::task::JoinHandle<LookupState>>> {
    let document = reader.document();
    let text = text_content(document, document.root());
    let byte_start = text
        .find(needle)
        .with_context(|| format!("'{}' does not occur in the article", needle))?;
    let start = text[..byte_start].chars().count();
    let end = start + needle.chars().count();

    if needle.trim().contains(char::is_whitespace) {
        let range = selection(document, start, end)?;
        return Ok(reader.select(range));
    }

    let caret = caret_at_offset(document, document.root(), start)
        .with_context(|| format!("Offset {} is outside the article", start))?;
    let point = reader
        .layout()
        .caret_center(caret)
        .context("Word is not laid out")?;
    Ok(reader.click(point))
}

fn print_position(position: &RenderPosition) {
    let side = match position.side {
        Side::Above => "above",
        Side::Below => "below",
    };
    println!(
        "Popover: {} the span, edge y={:.0}, center x={:.0}, indicator {:+.0}{}",
        side,
        position.edge_y,
        position.center_x,
        position.indicator_offset,
        if position.show_indicator { "" } else { " (hidden)" }
    );
}

/// Pronounce arbitrary text
async fn speak(
    cfg: &ResolvedConfig,
    store: &dyn KeyValueStore,
    text: &str,
    lang: Option<String>,
    speed: Option<f32>,
) -> Result<()> {
    let settings = SessionState::load(store).settings;
    let playback = build_playback(cfg)?;
    let lang = lang.unwrap_or(settings.source_language);
    let speed = speed.unwrap_or(settings.playback_speed);

    playback.play(text, &lang, speed).await?;
    Ok(())
}

/// Store a new article as the open one
fn open_article(store: &dyn KeyValueStore, file: Option<PathBuf>, title: Option<String>) -> Result<()> {
    let text = if let Some(path) = file {
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read article: {}", path.display()))?
    } else if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        anyhow::bail!("No article provided. Pass a file or pipe text to stdin");
    };

    if text.trim().is_empty() {
        anyhow::bail!("Article is empty");
    }

    let article = Article::new(title, text);
    SessionState::save_article(store, &article);

    println!("Opened: {}", article.title);
    println!("  ID:         {}", article.id);
    println!("  Paragraphs: {}", article.paragraph_count());
    Ok(())
}

/// Show or set the bookmark
fn bookmark(store: &dyn KeyValueStore, paragraph: Option<usize>) -> Result<()> {
    let session = SessionState::load(store);
    let article = session
        .article
        .context("No article is open. Use 'wordlens open <file>' first")?;

    let mark = match paragraph {
        Some(p) => {
            let mark = Bookmark::new(&article, p);
            SessionState::save_bookmark(store, &mark);
            mark
        }
        None => session.bookmark.unwrap_or_else(|| Bookmark::new(&article, 0)),
    };

    let paragraphs = article.paragraphs();
    println!("{} ({}/{})", article.title, mark.paragraph + 1, paragraphs.len().max(1));
    if let Some(text) = paragraphs.get(mark.paragraph) {
        println!();
        println!("{}", text);
    }
    Ok(())
}

/// List recent lookups, newest first
fn show_history(store: &dyn KeyValueStore, limit: usize) -> Result<()> {
    let history = SessionState::load(store).history;
    if history.is_empty() {
        println!("No lookups yet");
        return Ok(());
    }

    println!("{:<20} {:<24} {:<30}", "WHEN", "WORD", "TRANSLATION");
    println!("{}", "-".repeat(74));
    for entry in history.iter().take(limit) {
        println!(
            "{:<20} {:<24} {:<30}",
            entry.looked_up_at.format("%Y-%m-%d %H:%M"),
            entry.definition.word,
            entry.definition.translation
        );
    }
    Ok(())
}

fn update_settings(
    store: &dyn KeyValueStore,
    source: Option<String>,
    target: Option<String>,
    auto_play: Option<u32>,
    speed: Option<f32>,
    detailed: Option<bool>,
) -> Result<()> {
    let mut settings: ReadingSettings = SessionState::load(store).settings;
    let changed = source.is_some()
        || target.is_some()
        || auto_play.is_some()
        || speed.is_some()
        || detailed.is_some();

    if let Some(source) = source {
        settings.source_language = source;
    }
    if let Some(target) = target {
        settings.target_language = target;
    }
    if let Some(count) = auto_play {
        settings.auto_play_count = count;
    }
    if let Some(speed) = speed {
        if !(0.25..=4.0).contains(&speed) {
            anyhow::bail!("Speed must be between 0.25 and 4.0");
        }
        settings.playback_speed = speed;
    }
    if let Some(detailed) = detailed {
        settings.detailed = detailed;
    }

    if changed {
        SessionState::save_settings(store, &settings);
    }

    println!("Source language: {}", settings.source_language);
    println!("Target language: {}", settings.target_language);
    println!("Auto-play:       {}", settings.auto_play_count);
    println!("Speed:           {:.2}", settings.playback_speed);
    println!("Detailed:        {}", settings.detailed);
    Ok(())
}

/// Show resolved configuration
fn show_config(cfg: &ResolvedConfig) -> Result<()> {
    println!("wordlens configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:    {}", cfg.home.display());
    println!("  Session: {}", cfg.session_path().display());
    println!();
    println!("Translation:");
    println!("  Endpoint:    {}", cfg.translation.endpoint);
    println!("  Model:       {}", cfg.translation.model);
    println!(
        "  API key:     {}",
        if cfg.translation.api_key.is_some() { "(set)" } else { "(not set)" }
    );
    println!("  Quick first: {}", cfg.translation.quick_first);
    println!("  Timeout:     {}s", cfg.translation.timeout.as_secs());
    println!();
    println!("Speech:");
    println!("  Endpoint:  {}", cfg.speech.endpoint);
    println!(
        "  Player:    {}",
        cfg.speech.player.as_deref().unwrap_or("(default mpv)")
    );
    println!("  Fallback:  {}", cfg.speech.espeak_binary);
    println!("  Max chars: {}", cfg.speech.max_chars);
    println!();
    println!("Popover:");
    println!("  Flip threshold: {}", cfg.popover.flip_threshold);
    println!("  Gap / margin:   {} / {}", cfg.popover.gap, cfg.popover.margin);
    println!();
    println!("Lookup:");
    println!("  Auto-play pause:  {}ms", cfg.lookup.auto_play_pause.as_millis());
    println!("  History capacity: {}", cfg.lookup.history_capacity);
    println!("  Dedupe window:    {}s", cfg.lookup.dedupe_window.as_secs());

    Ok(())
}
