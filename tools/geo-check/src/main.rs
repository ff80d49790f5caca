use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use treekin_geo::{
    extract_gps_from_path, haversine_distance, GeoPoint, StaticTreeProvider, TreeIdentifier,
    ValidationConfig, ValidationOutcome, ValidationPolicy,
};

mod output;
mod trees;

use output::{print_candidates, print_outcome, print_point, write_candidates_geojson};
use trees::read_trees;

/// Exit status for a check that ran and rejected
const EXIT_REJECTED: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "geo-check",
    author,
    version,
    about = "Location checks for tree plantings and growth photos",
    long_about = "Runs the planting and photo location checks against a set of existing trees.\n\n\
                  Points are written as LAT,LNG in decimal degrees. Existing trees are read \
                  from a GeoJSON FeatureCollection of Point features whose id is the tree id. \
                  A check that rejects exits with status 2."
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// TOML file overriding the validation thresholds
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (show debug messages)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Great-circle distance between two points, in meters
    Distance {
        #[arg(value_parser = parse_point, allow_hyphen_values = true)]
        from: GeoPoint,

        #[arg(value_parser = parse_point, allow_hyphen_values = true)]
        to: GeoPoint,
    },

    /// GPS position recorded in a photo's EXIF metadata
    Exif {
        photo: PathBuf,
    },

    /// Trees within a radius of a point, nearest first
    Nearby {
        #[command(flatten)]
        trees: TreesArg,

        /// Center of the search
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        at: GeoPoint,

        /// Search radius in meters
        #[arg(long)]
        radius: f64,

        /// Also write the hits to this GeoJSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that a new tree is not planted on top of an existing one
    CheckPlant {
        #[command(flatten)]
        trees: TreesArg,

        /// Where the new tree is being planted
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        at: GeoPoint,
    },

    /// Check that a growth photo was taken near its tree
    CheckPhoto {
        /// Photo to read the GPS position from
        #[arg(long)]
        photo: Option<PathBuf>,

        /// Device location at capture time; takes precedence over the photo
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        at: Option<GeoPoint>,

        /// Location of the tree
        #[arg(
            long,
            value_parser = parse_point,
            allow_hyphen_values = true,
            required_unless_present = "tree_id",
            conflicts_with = "tree_id"
        )]
        tree: Option<GeoPoint>,

        /// Id of the tree, looked up in --trees
        #[arg(long, requires = "trees")]
        tree_id: Option<String>,

        /// GeoJSON file of existing trees
        #[arg(long)]
        trees: Option<PathBuf>,
    },
}

#[derive(ClapArgs, Debug)]
struct TreesArg {
    /// GeoJSON file of existing trees
    #[arg(long = "trees")]
    path: PathBuf,
}

/// Parse a `LAT,LNG` pair into a validated point
fn parse_point(s: &str) -> std::result::Result<GeoPoint, String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG, got '{}'", s))?;

    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude '{}': {}", lat.trim(), e))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude '{}': {}", lng.trim(), e))?;

    GeoPoint::new(lat, lng).map_err(|e| e.to_string())
}

fn load_config(path: Option<&Path>) -> Result<ValidationConfig> {
    let Some(path) = path else {
        return Ok(ValidationConfig::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: ValidationConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    debug!(?config, "loaded validation config");
    Ok(config)
}

fn load_provider(path: &Path) -> Result<StaticTreeProvider> {
    let trees = read_trees(path).context("Failed to load existing trees")?;
    info!("Loaded {} trees from {}", trees.len(), path.display());
    Ok(StaticTreeProvider::from_data(trees))
}

/// Read a photo unless it is larger than `max_bytes`
fn read_photo(path: &Path, max_bytes: u64) -> Result<Option<Vec<u8>>> {
    let size = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat photo: {}", path.display()))?
        .len();

    if size > max_bytes {
        warn!(
            "Photo {} is {} bytes, over the {} byte limit; ignoring its metadata",
            path.display(),
            size,
            max_bytes
        );
        return Ok(None);
    }

    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read photo: {}", path.display()))?;
    Ok(Some(bytes))
}

fn exit_for(outcome: &ValidationOutcome) -> ExitCode {
    if outcome.allowed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_REJECTED)
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Logs go to stderr so --json output stays clean
    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let config = load_config(args.config.as_deref())?;
    let policy = ValidationPolicy::new(config).context("Invalid validation config")?;

    match args.command {
        Command::Distance { from, to } => {
            let distance_m = haversine_distance(from, to);
            if args.json {
                println!("{}", serde_json::json!({ "distance_m": distance_m }));
            } else {
                println!("{:.1} m", distance_m);
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Exif { photo } => {
            if !photo.exists() {
                bail!("Photo does not exist: {}", photo.display());
            }

            let point = extract_gps_from_path(&photo, policy.config().max_photo_bytes);
            print_point(point, args.json)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Nearby {
            trees,
            at,
            radius,
            output,
        } => {
            let provider = load_provider(&trees.path)?;
            let hits = policy
                .search()
                .find_nearby(at, radius, &provider)
                .context("Proximity search failed")?;

            if let Some(output_path) = &output {
                write_candidates_geojson(&hits, output_path)
                    .context("Failed to write nearby trees GeoJSON")?;
                info!("Wrote {} trees to {}", hits.len(), output_path.display());
            }

            print_candidates(&hits, args.json)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::CheckPlant { trees, at } => {
            let provider = load_provider(&trees.path)?;
            let outcome = policy
                .check_duplicate_planting(at, &provider)
                .context("Duplicate planting check failed")?;

            print_outcome(&outcome, args.json)?;
            Ok(exit_for(&outcome))
        }

        Command::CheckPhoto {
            photo,
            at,
            tree,
            tree_id,
            trees,
        } => {
            let photo_bytes = match (&at, &photo) {
                (None, Some(path)) => read_photo(path, policy.config().max_photo_bytes)?,
                _ => None,
            };

            let photo_point = policy.resolve_photo_point(at, photo_bytes.as_deref());
            debug!(?photo_point, "resolved photo location");

            let outcome = match (tree, tree_id, trees) {
                (Some(tree_point), _, _) => policy.check_photo_provenance(photo_point, Some(tree_point)),
                (None, Some(id), Some(path)) => {
                    let provider = load_provider(&path)?;
                    let id = TreeIdentifier::new(id);
                    let Some(tree) = provider.get_tree(&id) else {
                        bail!("Tree {} not found in {}", id, path.display());
                    };
                    policy.check_photo_for_tree(photo_point, tree.as_ref())
                }
                _ => bail!("Either --tree or --tree-id with --trees is required"),
            };

            print_outcome(&outcome, args.json)?;
            Ok(exit_for(&outcome))
        }
    }
}
