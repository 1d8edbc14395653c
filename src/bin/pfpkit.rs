use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use pfpkit::{
    Category, CatalogConfig, CompositorOpts, FsFetcher, LoaderOpts, PfpStudio, StudioOpts,
    UnlockOutcome,
};

#[derive(Parser, Debug)]
#[command(name = "pfpkit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a profile picture from a catalog and write it as a PNG.
    Compose(ComposeArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Input catalog JSON.
    #[arg(long = "catalog")]
    catalog: PathBuf,

    /// Output PNG path (defaults to the fixed export file name).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Square output resolution in pixels.
    #[arg(long, default_value_t = pfpkit::DEFAULT_CANVAS_SIZE)]
    size: u32,

    /// Randomize all categories before rendering.
    #[arg(long, default_value_t = false)]
    randomize: bool,

    /// Seed for deterministic randomization.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Selection overrides as `category=index` (repeatable).
    #[arg(long = "set")]
    set: Vec<String>,

    /// Hide a toggleable category (repeatable).
    #[arg(long = "hide")]
    hide: Vec<String>,

    /// Unlock code to apply before rendering (repeatable).
    #[arg(long = "unlock")]
    unlock: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
    }
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let config = CatalogConfig::from_path(&args.catalog)?;
    let assets_root = args
        .catalog
        .parent()
        .unwrap_or_else(|| std::path::Path::new("."));

    let opts = StudioOpts {
        compositor: CompositorOpts::default().with_canvas_size(args.size),
        loader: LoaderOpts::default(),
        seed: args.seed,
        randomize_on_ready: false,
    };
    let fetcher = Arc::new(FsFetcher::new(assets_root));
    let mut studio = PfpStudio::start(&config, fetcher, opts);
    studio.wait_loaded();

    for code in &args.unlock {
        match studio.unlock(code) {
            UnlockOutcome::Unlocked { category, .. } => {
                eprintln!("unlocked {category} asset for code '{code}'");
            }
            UnlockOutcome::UnknownCode => {
                eprintln!("code '{code}' did not match");
            }
        }
    }
    // Unlocked assets fetch in the background; settle them before rendering.
    studio.wait_loaded();

    if args.randomize {
        studio.randomize();
    }

    for spec in &args.set {
        let (category, index) = parse_set(spec)?;
        studio.set_index(category, index);
    }

    for name in &args.hide {
        let category: Category = name
            .parse()
            .with_context(|| format!("--hide '{name}'"))?;
        studio.set_equipped(category, false);
    }

    let bytes = studio.export_png()?;
    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(pfpkit::EXPORT_FILE_NAME));
    pfpkit::ensure_parent_dir(&out)?;
    std::fs::write(&out, &bytes).with_context(|| format!("write png '{}'", out.display()))?;

    eprintln!("wrote {}", out.display());
    Ok(())
}

fn parse_set(spec: &str) -> anyhow::Result<(Category, usize)> {
    let (category, index) = spec
        .split_once('=')
        .with_context(|| format!("--set '{spec}' is not category=index"))?;
    let category: Category = category
        .parse()
        .with_context(|| format!("--set '{spec}'"))?;
    let index: usize = index
        .trim()
        .parse()
        .with_context(|| format!("--set '{spec}' has a non-numeric index"))?;
    Ok((category, index))
}
