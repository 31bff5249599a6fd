use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use cafemap::config::Settings;
use cafemap::render::{render_cafes, render_suggestions};
use cafemap::{PointerTarget, Widget};

/// Find a place on OpenStreetMap and list the cafés around it
///
/// Examples:
///   # Search for a place and list nearby cafés
///   cafemap "Koregaon Park"
///
///   # Show autocomplete suggestions, then search around the second one
///   cafemap --suggest "pun" --pick 2
///
///   # Cafés around coordinates, 1.5km radius
///   cafemap --lat 18.5204 --lon 73.8567 -r 1500
///
///   # Interactive session (type to autocomplete, /help for commands)
///   cafemap
#[derive(Parser, Debug)]
#[command(name = "cafemap")]
#[command(version, about, long_about = None)]
struct Args {
    /// Place to search for
    query: Option<String>,

    /// Path to config file (optional, auto-searches cafemap.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show autocomplete suggestions for this text
    #[arg(short = 's', long, conflicts_with = "query")]
    suggest: Option<String>,

    /// Pick the N-th suggestion (1-based) and list the cafés around it
    #[arg(long, requires = "suggest", value_parser = clap::value_parser!(u32).range(1..))]
    pick: Option<u32>,

    /// Latitude to search around (use with --lon)
    #[arg(long, requires = "lon", conflicts_with_all = ["query", "suggest"], allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude to search around (use with --lat)
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Café search radius in meters
    #[arg(short = 'r', long)]
    radius: Option<u32>,

    /// Country code preferred by autocomplete (e.g. "in", "de")
    #[arg(short = 'C', long)]
    country: Option<String>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut settings =
        Settings::resolve(args.config.as_deref()).context("Failed to load config file")?;
    if let Some(radius) = args.radius {
        settings.radius = radius;
    }
    if let Some(ref country) = args.country {
        settings.country_code = country.to_lowercase();
    }

    let widget = Widget::new(settings).context("Failed to create HTTP client")?;

    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        let spinner = create_spinner("Loading cafés...");
        let start = Instant::now();
        widget.focus_and_search((lat, lon)).await;
        spinner.finish_with_message(format!("Done [{:.1}s]", start.elapsed().as_secs_f32()));
        print_session(&widget);
    } else if let Some(ref query) = args.query {
        widget.session().input = query.clone();
        let spinner = create_spinner("Searching...");
        let start = Instant::now();
        widget.submit().await;
        spinner.finish_with_message(format!("Done [{:.1}s]", start.elapsed().as_secs_f32()));
        print_session(&widget);
    } else if let Some(ref text) = args.suggest {
        widget.autocomplete(text).await;
        let suggestions = render_suggestions(&widget.snapshot());
        if suggestions.is_empty() {
            println!("No suggestions.");
            return Ok(());
        }
        print!("{suggestions}");

        if let Some(n) = args.pick {
            let spinner = create_spinner("Loading cafés...");
            if !widget.select_suggestion(n as usize - 1).await {
                spinner.finish_and_clear();
                bail!("No suggestion number {}", n);
            }
            spinner.finish_and_clear();
            println!();
            print_session(&widget);
        }
    } else {
        interactive(widget).await?;
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "cafemap=debug,info" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// A line typed in interactive mode
#[derive(Debug, PartialEq)]
enum Command {
    /// Plain text: the search field changed
    Input(String),
    /// Click the N-th suggestion (1-based)
    Pick(usize),
    /// Click the N-th café (1-based)
    Cafe(usize),
    /// Submit the search form, optionally replacing the input first
    Search(Option<String>),
    Dismiss,
    Show,
    Help,
    Quit,
    Invalid(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Input(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        let index = |arg: &str| arg.parse::<usize>().ok().filter(|n| *n >= 1);

        match name {
            "pick" | "p" => match index(arg) {
                Some(n) => Command::Pick(n),
                None => Command::Invalid(format!("/pick needs a number, got \"{arg}\"")),
            },
            "cafe" | "c" => match index(arg) {
                Some(n) => Command::Cafe(n),
                None => Command::Invalid(format!("/cafe needs a number, got \"{arg}\"")),
            },
            "search" | "s" => Command::Search((!arg.is_empty()).then(|| arg.to_string())),
            "dismiss" | "d" => Command::Dismiss,
            "show" => Command::Show,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => Command::Invalid(format!("unknown command /{other}")),
        }
    }
}

const HELP: &str = "\
Type a place name to see suggestions. Commands:
  /pick N      search around suggestion N
  /cafe N      zoom to café N and open its popup
  /search [T]  search for the current text (or T)
  /dismiss     hide the suggestions
  /show        print the map state
  /quit        exit";

async fn interactive(widget: Arc<Widget>) -> Result<()> {
    println!("cafemap - type a place name, /help for commands");
    println!();

    let mut changes = widget.subscribe();
    {
        let widget = Arc::clone(&widget);
        tokio::spawn(async move { widget.open().await });
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                match Command::parse(&line) {
                    Command::Input(text) => widget.on_input(&text),
                    Command::Pick(n) => {
                        let widget = Arc::clone(&widget);
                        tokio::spawn(async move {
                            if !widget.select_suggestion(n - 1).await {
                                println!("No suggestion number {n}");
                            }
                        });
                    }
                    Command::Cafe(n) => {
                        if !widget.select_cafe(n - 1) {
                            println!("No café number {n}");
                        }
                    }
                    Command::Search(text) => {
                        if let Some(text) = text {
                            widget.session().input = text;
                        }
                        widget.on_pointer(PointerTarget::Elsewhere);
                        let widget = Arc::clone(&widget);
                        tokio::spawn(async move { widget.submit().await });
                    }
                    Command::Dismiss => widget.on_pointer(PointerTarget::Elsewhere),
                    Command::Show => print_session(&widget),
                    Command::Help => println!("{HELP}"),
                    Command::Quit => break,
                    Command::Invalid(message) => println!("{message}"),
                }
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                print_session(&widget);
            }
        }
    }

    Ok(())
}

fn print_session(widget: &Widget) {
    let notices = widget.session().take_notices();
    let session = widget.snapshot();

    for notice in notices {
        println!("! {notice}");
    }

    let suggestions = render_suggestions(&session);
    if !suggestions.is_empty() {
        println!("Suggestions for \"{}\":", session.input.trim());
        print!("{suggestions}");
    }
    print!("{}", render_cafes(&session));
    println!();
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
