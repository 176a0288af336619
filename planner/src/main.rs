//! Command-line board planner: prints the word grid and header for one board.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use phonoladder::bank::{Dialect, PositionFilter, ShapeGroup, Sound};
use phonoladder::icons::{ColorMode, IconFetchError, IconSource};
use phonoladder::template::ConnectorTemplate;
use phonoladder::topology::BoardTopology;
use phonoladder::{BoardSettings, Generator, Session};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "planner")]
#[command(about = "Plan a speech-sound snakes and ladders board")]
struct Cli {
    /// Target sound id, e.g. b or sh (repeat for up to three)
    #[arg(long = "sound", required = true)]
    sounds: Vec<String>,

    /// Sound position: any, initial, medial or final
    #[arg(long, default_value = "any")]
    position: String,

    /// Word structure: CV+CVV, CVC+CVVC, CCVC+CCVVC, CVCC+CVVCC or any
    #[arg(long, default_value = "CVC+CVVC")]
    shape: String,

    /// English variety: uk or us
    #[arg(long, default_value = "uk")]
    dialect: String,

    /// Icon theme: color or bw
    #[arg(long, default_value = "color")]
    theme: String,

    /// Board seed (default: random)
    #[arg(long)]
    seed: Option<u32>,

    /// Connector template JSON replacing the classic board
    #[arg(long)]
    template: Option<PathBuf>,

    /// Print the whole plan as JSON instead
    #[arg(long)]
    json: bool,
}

/// Resolves every icon to its preferred URL without touching the network.
struct OfflineUrls;

impl IconSource for OfflineUrls {
    type Icon = String;

    fn fetch(&self, url: &str) -> Result<Self::Icon, IconFetchError> {
        Ok(url.to_string())
    }
}

fn parse<T>(what: &str, value: &str) -> Result<T, String>
where
    T: FromStr,
{
    T::from_str(value).map_err(|_| format!("unknown {what}: {value}"))
}

fn settings(cli: &Cli) -> Result<BoardSettings, String> {
    Ok(BoardSettings {
        dialect: parse::<Dialect>("dialect", &cli.dialect)?,
        sounds: cli.sounds.iter().map(|s| parse::<Sound>("sound", s)).collect::<Result<_, _>>()?,
        position: parse::<PositionFilter>("position", &cli.position)?,
        shape_group: parse::<ShapeGroup>("shape group", &cli.shape)?,
        theme: parse::<ColorMode>("theme", &cli.theme)?,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = settings(&cli)?;
    let seed = cli.seed.unwrap_or_else(rand::random);

    let mut generator = Generator::builtin()?;
    if let Some(path) = &cli.template {
        let template = ConnectorTemplate::from_json(&std::fs::read_to_string(path)?)?;
        generator = generator.with_template(template)?;
    }

    let mut session = Session::new(generator, OfflineUrls);
    let board = match session.generate(&settings, seed) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return Err(e.into());
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&board.plan)?);
        return Ok(());
    }

    let meta = &board.plan.meta;
    println!(
        "Speech Sound Snakes & Ladders | {} | {} | {} | {} | {}",
        meta.dialect_label, meta.sound_label, meta.position_label, meta.shape_label, meta.theme_label,
    );
    println!("seed {seed}");
    for group in &board.targets {
        println!("{} {}", group.ipa, group.words.join(", "));
    }
    println!();

    let topology = BoardTopology::classic();
    println!("{}", topology.render(|square| {
        board.plan.item_at(square).map(|item| item.orth.clone()).unwrap_or_else(|| "-".to_string())
    }));

    if let Some(note) = &board.plan.note {
        println!("\nbest effort after {} attempts: {note}", board.plan.attempts);
    }

    let skipped: Vec<String> = board.plan.skipped().map(|c| c.square.to_string()).collect();
    if !skipped.is_empty() {
        println!("\nno icon on squares {}", skipped.join(" "));
    }

    if let Some(first) = board.icons.first() {
        println!("\n{} icons, e.g. {} at {}", board.icons.len(), first.orth, first.icon);
    }

    Ok(())
}
