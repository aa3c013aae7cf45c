//! Command-line interface for subgloss
//!
//! Usage:
//!   subgloss cues payload.json --color-by freq
//!   subgloss vocab payload.json --json
//!   cat payload.json | subgloss at - 12.5
//!
//! Payload files may hold either a full service response or the bare
//! source data object. `-` reads from stdin.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use subgloss::config::Config;
use subgloss::error::{Error, Result};
use subgloss::playback::{ManualClock, PlaybackClock};
use subgloss::poll::CuePoller;
use subgloss::store::{
    preferred_lang, JsonFileStore, SavedWord, WatchHistory, WordBook, WordFilter, WordStatus, ALL,
};
use subgloss::timefmt::format_timestamp_ms;
use subgloss::timeline::track_width_px;
use subgloss::tracker::find_examples;
use subgloss::view::{ColorBy, ColorMode};
use subgloss::{parse_subs_response, ParsedSubs, SourceSubsData, SubtitleView, Translations};

#[derive(Parser)]
#[command(name = "subgloss", version, about = "Annotate language-learning subtitles")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(short, long, global = true)]
    json: bool,

    /// Key/value store for history and word lists
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorArg {
    None,
    Pos,
    Freq,
}

impl From<ColorArg> for ColorBy {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::None => ColorBy::None,
            ColorArg::Pos => ColorBy::Pos,
            ColorArg::Freq => ColorBy::Freq,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Known,
    Learning,
}

impl From<StatusArg> for WordStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Known => WordStatus::Known,
            StatusArg::Learning => WordStatus::Learning,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Print annotated cues
    Cues {
        payload: PathBuf,
        #[arg(long, value_enum)]
        color_by: Option<ColorArg>,
        #[arg(long)]
        underline: bool,
        /// Translations JSON to show under each cue
        #[arg(long)]
        translations: Option<PathBuf>,
        #[arg(long)]
        no_translit: bool,
    },
    /// Print the vocabulary grouped by frequency bucket
    Vocab { payload: PathBuf },
    /// Print timeline segments
    Timeline {
        payload: PathBuf,
        /// Video duration in seconds
        #[arg(long)]
        duration: f64,
    },
    /// Find cues containing a word
    Examples {
        payload: PathBuf,
        word: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the cue active at a playback position
    At { payload: PathBuf, seconds: f64 },
    /// Simulate playback and print each change of active cue
    Play {
        payload: PathBuf,
        /// Playback speed multiplier
        #[arg(long, default_value_t = 10.0, value_parser = parse_speed)]
        speed: f64,
        /// Start position in seconds
        #[arg(long, default_value_t = 0.0, value_parser = parse_position)]
        from: f64,
    },
    /// List or update saved words
    Words {
        /// Mark WORD (with --pos and --lang) as known or learning
        #[arg(long, value_enum)]
        mark: Option<StatusArg>,
        word: Option<String>,
        #[arg(long, default_value = ALL)]
        pos: String,
        #[arg(long, default_value = ALL)]
        lang: String,
    },
    /// List watch history for a language
    History {
        #[arg(long)]
        lang: Option<String>,
    },
    /// Download a subtitle payload
    #[cfg(feature = "fetch")]
    Fetch {
        video_id: String,
        /// Also download translations to this file
        #[arg(long)]
        translations: Option<PathBuf>,
    },
}

fn parse_speed(arg: &str) -> std::result::Result<f64, String> {
    match arg.trim().parse::<f64>() {
        Ok(speed) if speed.is_finite() && speed > 0.0 => Ok(speed),
        _ => Err(format!("expected a positive number, got `{}`", arg)),
    }
}

fn parse_position(arg: &str) -> std::result::Result<f64, String> {
    match arg.trim().parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Ok(secs),
        _ => Err(format!("expected seconds >= 0, got `{}`", arg)),
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        return Ok(text);
    }
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_payload(path: &Path) -> Result<SourceSubsData> {
    let value: Value = serde_json::from_str(&read_input(path)?)?;
    if value.get("status").is_some() {
        Ok(parse_subs_response(&value))
    } else {
        Ok(serde_json::from_value(value)?)
    }
}

fn load_parsed(path: &Path) -> Result<ParsedSubs> {
    let parsed = ParsedSubs::from_source(&load_payload(path)?);
    if parsed.is_empty() {
        tracing::warn!(path = %path.display(), "payload has no cues");
    }
    Ok(parsed)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_store(path: Option<&Path>) -> Result<JsonFileStore> {
    match path {
        Some(p) => JsonFileStore::open(p),
        None => JsonFileStore::open_default(),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match cli.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Cues {
            payload,
            color_by,
            underline,
            translations,
            no_translit,
        } => {
            let parsed = load_parsed(&payload)?;
            let mut options = config.display.clone();
            if let Some(c) = color_by {
                options.color_by = c.into();
            }
            if underline {
                options.color_mode = ColorMode::Underline;
            }
            if no_translit {
                options.show_transliteration = false;
            }
            let translations = match translations {
                Some(ref path) => {
                    options.show_translation = true;
                    let value: Value = serde_json::from_str(&read_input(path)?)?;
                    Some(Translations::from_json(&value))
                }
                None => None,
            };

            let mut view = SubtitleView::new(&parsed, options);
            if let Some(ref t) = translations {
                view = view.with_translations(t);
            }
            let rows = view.render_cues(None);
            if cli.json {
                print_json(&rows)?;
            } else {
                for row in &rows {
                    let words: Vec<String> = row
                        .tokens
                        .iter()
                        .map(|t| match t.transliteration {
                            Some(ref tr) if !tr.is_empty() => format!("{}({})", t.text, tr),
                            _ => t.text.clone(),
                        })
                        .collect();
                    println!("[{}] {}", row.timestamp, words.join(" "));
                    if let Some(ref tr) = row.translation {
                        println!("           {}", tr);
                    }
                }
            }
            if view.unstyled_lookups() > 0 {
                tracing::debug!(count = view.unstyled_lookups(), "tokens without a style class");
            }
        }

        Command::Vocab { payload } => {
            let parsed = load_parsed(&payload)?;
            if cli.json {
                print_json(&parsed.vocabulary)?;
            } else {
                for (label, tokens) in parsed.vocabulary.by_rank() {
                    let words: Vec<&str> = tokens.iter().map(|t| t.text()).collect();
                    println!("{:>10} ({:>3}): {}", label, tokens.len(), words.join(" "));
                }
            }
        }

        Command::Timeline { payload, duration } => {
            let parsed = load_parsed(&payload)?;
            let segments = parsed.timeline(duration);
            if cli.json {
                print_json(&segments)?;
            } else {
                println!("track width: {}px", track_width_px(duration));
                for s in &segments {
                    println!(
                        "{} {:>10.0}ms - {:>10.0}ms  left={:.1}px width={:.1}px",
                        if s.ghost { "gap" } else { "cue" },
                        s.begin,
                        s.end,
                        s.left_px(),
                        s.width_px()
                    );
                }
            }
        }

        Command::Examples { payload, word, limit } => {
            let parsed = load_parsed(&payload)?;
            let limit = limit.unwrap_or(config.tracking.example_limit);
            let examples = find_examples(&parsed.subtitles, &word, limit);
            if cli.json {
                print_json(&examples)?;
            } else {
                for ex in &examples {
                    let text: String = ex
                        .chunks
                        .iter()
                        .map(|c| {
                            if c.is_match {
                                format!("[{}]", c.text)
                            } else {
                                c.text.clone()
                            }
                        })
                        .collect();
                    println!("#{} {}", ex.index, text);
                    let translit = ex.transliteration();
                    if !translit.is_empty() {
                        println!("   {}", translit);
                    }
                }
            }
        }

        Command::At { payload, seconds } => {
            let parsed = load_parsed(&payload)?;
            let tracker = parsed.tracker(config.tracking.lookahead_secs);
            let active = tracker.active_index(seconds);
            if cli.json {
                print_json(&active)?;
            } else {
                match active.and_then(|i| parsed.subtitles.get(i).map(|c| (i, c))) {
                    Some((i, cue)) => println!("#{} [{}] {}", i, format_timestamp_ms(cue.begin()), cue.text()),
                    None => println!("no active cue"),
                }
            }
        }

        Command::Play { payload, speed, from } => {
            let parsed = load_parsed(&payload)?;
            play(&parsed, &config, speed, from)?;
        }

        Command::Words { mark, word, pos, lang } => {
            let store = open_store(cli.store.as_deref())?;
            let book = WordBook::new(&store);
            match (mark, word) {
                (Some(status), Some(word)) => {
                    book.set_status(SavedWord::new(word, pos, lang), status.into())?;
                }
                (Some(_), None) => {
                    tracing::error!("--mark needs a word");
                    std::process::exit(2);
                }
                (None, _) => {
                    let filter = WordFilter { pos, lang };
                    let known = book.filtered(WordStatus::Known, &filter)?;
                    let learning = book.filtered(WordStatus::Learning, &filter)?;
                    if cli.json {
                        print_json(&serde_json::json!({ "known": known, "learning": learning }))?;
                    } else {
                        for (heading, words) in [("Known", known), ("Learning", learning)] {
                            println!("{} ({})", heading, words.len());
                            for w in words {
                                println!("  {} [{}] {}", w.word, w.pos, w.lang);
                            }
                        }
                    }
                }
            }
        }

        Command::History { lang } => {
            let store = open_store(cli.store.as_deref())?;
            let lang = match lang {
                Some(l) => l,
                None => preferred_lang(&store)?,
            };
            let records = WatchHistory::new(&store).for_lang(&lang)?;
            if cli.json {
                print_json(&records)?;
            } else {
                for r in &records {
                    println!(
                        "{} {:<40} {:>3.0}% {} left",
                        r.video_id,
                        r.title,
                        r.progress() * 100.0,
                        r.remaining()
                    );
                }
            }
        }

        #[cfg(feature = "fetch")]
        Command::Fetch { video_id, translations } => {
            let client = subgloss::client::ServiceClient::new(config.services.clone())?;
            let raw = client.subs_data_raw(&video_id)?;
            print_json(&raw)?;
            if let Some(path) = translations {
                let lines = client.subs_translations(&video_id)?;
                let text = serde_json::to_string_pretty(&lines)?;
                fs::write(&path, text).map_err(|source| Error::Io { path: path.clone(), source })?;
            }
        }
    }

    Ok(())
}

/// Drive a simulated clock through the cue sequence and print every change
/// the poller publishes.
fn play(parsed: &ParsedSubs, config: &Config, speed: f64, from: f64) -> Result<()> {
    let duration = parsed
        .subtitles
        .iter()
        .map(|c| c.end_secs())
        .filter(|end| end.is_finite())
        .fold(0.0, f64::max);
    if duration <= 0.0 || !(speed.is_finite() && speed > 0.0) {
        return Ok(());
    }
    let from = if from.is_finite() { from.clamp(0.0, duration) } else { 0.0 };
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|source| Error::Io {
            path: PathBuf::from("<runtime>"),
            source,
        })?;

    runtime.block_on(async {
        let clock = ManualClock::new(duration);
        clock.seek_to(from);
        clock.play();

        let interval = config.tracking.poll_interval();
        let handle = CuePoller::spawn(
            parsed.tracker(config.tracking.lookahead_secs),
            Arc::new(clock.clone()) as Arc<dyn PlaybackClock>,
            interval,
        );
        let mut rx = handle.subscribe();

        let step = Duration::from_millis(10);
        let mut ticker = tokio::time::interval(step);
        while clock.current_time_secs().unwrap_or(0.0) < duration {
            tokio::select! {
                _ = ticker.tick() => clock.advance(step.as_secs_f64() * speed),
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let active = *rx.borrow_and_update();
                    if let Some(cue) = active.and_then(|i| parsed.subtitles.get(i)) {
                        println!("[{}] {}", format_timestamp_ms(cue.begin()), cue.text());
                    }
                }
            }
        }
        handle.stop().await;
    });
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_must_be_positive() {
        assert_eq!(parse_speed("2.5"), Ok(2.5));
        assert!(parse_speed("0").is_err());
        assert!(parse_speed("-1").is_err());
        assert!(parse_speed("NaN").is_err());
        assert!(parse_speed("inf").is_err());
        assert!(parse_speed("fast").is_err());
    }

    #[test]
    fn test_start_position() {
        assert_eq!(parse_position("0"), Ok(0.0));
        assert_eq!(parse_position("12.5"), Ok(12.5));
        assert!(parse_position("-3").is_err());
        assert!(parse_position("NaN").is_err());
    }

    #[test]
    fn test_cli_rejects_zero_speed() {
        let parsed = Cli::try_parse_from(["subgloss", "play", "payload.json", "--speed", "0"]);
        assert!(parsed.is_err());
        let parsed = Cli::try_parse_from(["subgloss", "play", "payload.json", "--speed", "4"]);
        assert!(parsed.is_ok());
    }

    #[test]
    fn test_play_finishes() {
        let data = SourceSubsData {
            subs: vec![
                subgloss::SubtitleCue::new(0.0, 100.0, "a"),
                subgloss::SubtitleCue::new(100.0, 200.0, "b"),
            ],
            ..Default::default()
        };
        let parsed = ParsedSubs::from_source(&data);
        let config = Config::default();

        play(&parsed, &config, 50.0, 500.0).unwrap();
        play(&parsed, &config, 0.0, 0.0).unwrap();
        play(&parsed, &config, f64::NAN, f64::NAN).unwrap();
        play(&ParsedSubs::default(), &config, 10.0, 0.0).unwrap();
    }
}
