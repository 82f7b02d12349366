//! charnet CLI application
//!
//! Command-line interface for the charnet library.

use charnet::config::{BackendKind, Config};
use charnet::ml::DeviceType;
use charnet::storage::CacheDatabase;
use charnet::{CharacterNetworkGenerator, WindowPolicy};
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "charnet")]
#[command(about = "Build character co-occurrence networks from episode scripts")]
#[command(version)]
struct Cli {
    /// JSON configuration file; flags override its values
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract per-sentence character names and cache them
    Extract {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        backend: BackendArgs,
    },

    /// Build and render the character network
    Network {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        backend: BackendArgs,

        /// Sentences per co-occurrence window
        #[arg(short, long)]
        window: Option<usize>,

        /// Number of heaviest edges to keep
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// How windows advance through an episode
        #[arg(long, value_enum)]
        window_policy: Option<PolicyChoice>,

        /// Output HTML page
        #[arg(short, long, default_value = "character_network.html")]
        output: PathBuf,

        /// Also write the graph payload as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Show the contents of an extraction cache
    Inspect {
        /// Cache file (SQLite database)
        #[arg(long)]
        cache: PathBuf,

        /// List every episode
        #[arg(long)]
        episodes: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Subtitle directory, .ass file, .json or .jsonl dataset
    #[arg(short, long)]
    dataset: PathBuf,

    /// Cache file (SQLite database); reused without extraction when it exists
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Only process the first N episodes
    #[arg(long)]
    max_episodes: Option<usize>,
}

#[derive(Args)]
struct BackendArgs {
    /// Recognition backend
    #[arg(long, value_enum)]
    backend: Option<BackendChoice>,

    /// Names file for the gazetteer backend, one name per line
    #[arg(long)]
    names: Option<PathBuf>,

    /// HuggingFace model id for the bert backend
    #[arg(long)]
    model: Option<String>,

    /// Local model directory for the bert backend
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Compute device: cpu, cuda, cuda:N or metal
    #[arg(long)]
    device: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendChoice {
    Bert,
    Gazetteer,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyChoice {
    Sliding,
    Tumbling,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Extract { input, backend } => {
            apply_backend_args(&mut config, backend)?;
            extract_command(config, input)?;
        }
        Commands::Network {
            input,
            backend,
            window,
            top_k,
            window_policy,
            output,
            json,
        } => {
            apply_backend_args(&mut config, backend)?;
            if let Some(window) = window {
                config.network.window_size = window;
            }
            if let Some(top_k) = top_k {
                config.network.top_k = top_k;
            }
            if let Some(policy) = window_policy {
                config.network.window_policy = match policy {
                    PolicyChoice::Sliding => WindowPolicy::Sliding,
                    PolicyChoice::Tumbling => WindowPolicy::Tumbling,
                };
            }
            network_command(config, input, output, json)?;
        }
        Commands::Inspect { cache, episodes } => {
            inspect_command(&cache, episodes)?;
        }
    }

    Ok(())
}

fn apply_backend_args(config: &mut Config, args: BackendArgs) -> Result<()> {
    if let Some(choice) = args.backend {
        config.ner.backend = match choice {
            BackendChoice::Bert => BackendKind::Bert,
            BackendChoice::Gazetteer => BackendKind::Gazetteer,
        };
    }
    if let Some(names) = args.names {
        if args.backend.is_none() {
            config.ner.backend = BackendKind::Gazetteer;
        }
        config.ner.gazetteer_path = Some(names);
    }
    if let Some(model) = args.model {
        config.ner.model_name = model;
    }
    if let Some(dir) = args.model_dir {
        config.ner.model_dir = Some(dir);
    }
    if let Some(device) = args.device {
        config.ner.device = device
            .parse::<DeviceType>()
            .with_context(|| format!("Invalid --device value {:?}", device))?;
    }
    Ok(())
}

fn build_generator(config: Config, input: &InputArgs) -> Result<CharacterNetworkGenerator> {
    println!("🧠 Loading {:?} recognition backend...", config.ner.backend);
    let mut generator = CharacterNetworkGenerator::new(config)?;

    if let Some(limit) = input.max_episodes {
        generator = generator.with_max_episodes(limit);
    }

    let cached = input.cache.as_deref().is_some_and(Path::exists);
    if !cached {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} episodes ({eta})")?
                .progress_chars("=> "),
        );
        generator = generator.with_progress(bar);
    }

    Ok(generator)
}

fn extract_command(config: Config, input: InputArgs) -> Result<()> {
    if let Some(cache) = &input.cache {
        if cache.exists() {
            println!("📋 Cache already exists at {}, nothing to extract", cache.display());
            println!("   Delete it to recompute");
            return Ok(());
        }
    }

    println!("🎬 Extracting characters from {}", input.dataset.display());
    let generator = build_generator(config, &input)?;
    let table = generator
        .get_entities(&input.dataset, input.cache.as_deref())
        .with_context(|| format!("Failed to extract entities from {}", input.dataset.display()))?;

    println!("✅ Extraction complete!");
    println!("   📺 Episodes: {}", table.len());
    println!("   📝 Sentences: {}", table.sentence_count());
    if let Some(cache) = &input.cache {
        println!("   📋 Cache: {}", cache.display());
    }

    Ok(())
}

fn network_command(
    config: Config,
    input: InputArgs,
    output: PathBuf,
    json: Option<PathBuf>,
) -> Result<()> {
    println!("🎬 Building character network from {}", input.dataset.display());

    let generator = build_generator(config, &input)?;
    let table = generator
        .get_entities(&input.dataset, input.cache.as_deref())
        .with_context(|| format!("Failed to extract entities from {}", input.dataset.display()))?;
    let graph = generator.build_network(&table)?;

    if graph.is_empty() {
        println!("❌ No character co-occurrences found; writing an empty network");
    }

    let html = generator.render(&graph)?;
    charnet::utils::ensure_parent_directory(&output)?;
    std::fs::write(&output, html)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if let Some(json_path) = &json {
        charnet::utils::ensure_parent_directory(json_path)?;
        std::fs::write(json_path, generator.payload(&graph).to_json_pretty()?)?;
    }

    println!("✅ Network complete!");
    println!("   👥 Characters: {}", graph.nodes().len());
    println!("   🔗 Edges: {}", graph.edges().len());
    for edge in graph.edges().iter().take(5) {
        println!("      {} and {}: {}", edge.source, edge.target, edge.weight);
    }
    println!("   🌐 Page: {}", output.display());
    if let Some(json_path) = json {
        println!("   📊 Payload: {}", json_path.display());
    }

    Ok(())
}

fn inspect_command(cache: &Path, list_episodes: bool) -> Result<()> {
    if !cache.exists() {
        bail!("❌ Cache not found: {}", cache.display());
    }

    let db = CacheDatabase::open_existing(cache)
        .with_context(|| format!("Failed to open cache {}", cache.display()))?;
    let stats = db.stats()?;
    let table = db.read_table()?;

    println!("📋 Cache: {}", cache.display());
    println!("   📺 Episodes: {}", stats.episode_count);
    println!("   📝 Sentences: {}", table.sentence_count());
    if let Some(version) = stats.schema_version {
        println!("   🔖 Schema version: {}", version);
    }
    if let Some(created) = stats.created_at {
        println!("   🕒 Created: {}", created.to_rfc3339());
    }
    println!("   💾 Size: {} bytes", stats.file_size_bytes);

    if list_episodes {
        println!();
        for episode in &table {
            println!(
                "{}: {} sentences, {} with characters, {} characters",
                episode.episode_id,
                episode.ners.len(),
                episode.sentences_with_entities(),
                episode.characters().len()
            );
        }
    }

    Ok(())
}
