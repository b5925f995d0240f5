use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

use plenka_core::{
    self as pc, AnnotationDelta, PhotoGateway as _,
    plenka_state::{self as ps, Annotation, api},
};

mod config;
use config::Config;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(long, default_value = Config::FILENAME)]
    config: PathBuf,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the annotations for one viewport and print them
    Browse {
        #[command(flatten)]
        viewport: ViewportArgs,

        /// Use the span of this zoom level instead of --span
        #[arg(long)]
        zoom: Option<i32>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Move the viewport step by step, printing what changes each time
    Pan {
        #[command(flatten)]
        viewport: ViewportArgs,

        /// Number of steps to take
        #[arg(long, default_value_t = 4)]
        steps: u32,

        /// Latitude moved per step
        #[arg(long, default_value_t = 0.0)]
        step_lat: f64,

        /// Longitude moved per step; a quarter of the span if not given
        #[arg(long)]
        step_lon: Option<f64>,

        /// Send every step at once, as a fast drag would
        #[arg(long)]
        burst: bool,
    },
    /// Show the full metadata of a photo
    Details {
        cid: u64,

        /// Download the image to this path
        #[arg(long)]
        save_image: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Quality::Medium)]
        quality: Quality,
    },
    /// Manage favourite photos
    Favourites {
        #[command(subcommand)]
        action: FavouritesAction,
    },
    /// Write a config file with the default settings
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(clap::Args)]
struct ViewportArgs {
    /// Latitude of the viewport center
    #[arg(long)]
    lat: Option<f64>,

    /// Longitude of the viewport center
    #[arg(long)]
    lon: Option<f64>,

    /// Extent of the viewport in degrees
    #[arg(long)]
    span: Option<f64>,

    /// First year to include
    #[arg(long)]
    from: Option<i32>,

    /// Last year to include
    #[arg(long)]
    to: Option<i32>,
}
impl ViewportArgs {
    fn region(&self, map: &config::Map) -> ps::Region {
        let center = map.center();
        ps::Region::new(
            ps::Coordinate::new(
                self.lat.unwrap_or(center.latitude),
                self.lon.unwrap_or(center.longitude),
            ),
            ps::Span::square(self.span.unwrap_or(map.span)),
        )
    }

    fn years(&self, map: &config::Map) -> ps::YearRange {
        let years = map.years();
        ps::YearRange::new(
            self.from.unwrap_or(years.start()),
            self.to.unwrap_or(years.end()),
        )
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Quality {
    Preview,
    Medium,
    High,
}
impl From<Quality> for ps::ImageQuality {
    fn from(quality: Quality) -> Self {
        match quality {
            Quality::Preview => ps::ImageQuality::Preview,
            Quality::Medium => ps::ImageQuality::Medium,
            Quality::High => ps::ImageQuality::High,
        }
    }
}

#[derive(Subcommand)]
enum FavouritesAction {
    /// List every favourite
    List,
    /// Add a photo by ID
    Add { cid: u64 },
    /// Remove a photo by ID
    Remove { cid: u64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    if let Command::InitConfig { force } = args.command {
        if args.config.exists() && !force {
            anyhow::bail!(
                "{} already exists; pass --force to overwrite it",
                args.config.display()
            );
        }
        return Config::default().save(&args.config);
    }

    let config = Config::load(&args.config)?;
    let client = Arc::new(api::Client::new(config.server.base_url.clone()));

    match args.command {
        Command::Browse {
            viewport,
            zoom,
            json,
        } => {
            let mut region = viewport.region(&config.map);
            if let Some(zoom) = zoom {
                region.span = ps::Zoom::from_level(zoom).span();
            }
            let options = config.map.session_options(viewport.years(&config.map));
            let mut session = pc::MapSession::new(client, options);
            let delta = session
                .viewport_changed(region)
                .await
                .context("failed to load annotations")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&delta)?);
            } else {
                if let Some(zoom) = session.zoom() {
                    println!("Zoom level {}, years {}", zoom.z(), session.years());
                }
                print_delta(&delta);
            }
        }
        Command::Pan {
            viewport,
            steps,
            step_lat,
            step_lon,
            burst,
        } => {
            let start = viewport.region(&config.map);
            let regions = pan_regions(start, steps, step_lat, step_lon);
            if regions.is_empty() {
                println!("No steps to take");
                return Ok(());
            }

            let thread = pc::SessionThread::new(
                client,
                config.map.session_options(viewport.years(&config.map)),
                Duration::from_millis(config.map.debounce_ms),
            )?;
            let mut events = thread.subscribe();

            if burst {
                for region in &regions {
                    thread.send(pc::ViewportRequest::Viewport(*region));
                }
                print_event(0, events.recv().await?);
            } else {
                for (step, region) in regions.iter().enumerate() {
                    thread.send(pc::ViewportRequest::Viewport(*region));
                    print_event(step, events.recv().await?);
                }
            }
        }
        Command::Details {
            cid,
            save_image,
            quality,
        } => {
            let photo = client
                .fetch_details(ps::PhotoId(cid))
                .await
                .with_context(|| format!("failed to fetch photo {cid}"))?;

            println!("{}", photo.share_description());
            println!("  page: {}", photo.page_url(client.base_url()));
            println!(
                "  location: {:.6}, {:.6}",
                photo.coordinate.latitude, photo.coordinate.longitude
            );
            if let Some(direction) = photo.direction {
                println!("  facing: {direction}");
            }
            if let Some(address) = &photo.address {
                println!("  address: {address}");
            }
            if let Some(author) = &photo.author {
                println!("  author: {author}");
            }
            println!("  uploaded by: {}", photo.username);
            if let Some(source) = &photo.source {
                match source.url() {
                    Some(url) => println!("  source: {url}"),
                    None => println!("  source: {}", source.as_str()),
                }
            }
            if let Some(description) = &photo.description {
                println!("\n{description}");
            }

            if let Some(path) = save_image {
                let fetcher = pc::ImageFetcher::new(client.clone(), config.images.max_cached);
                let data = fetcher
                    .fetch_highest_quality(&photo.file, quality.into())
                    .await
                    .context("failed to download image")?;
                std::fs::write(&path, &*data)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Saved {} bytes to {}", data.len(), path.display());
            }
        }
        Command::Favourites { action } => {
            let mut favourites = pc::Favourites::load(config.favourites.path.clone())?;
            match action {
                FavouritesAction::List => {
                    if favourites.all().is_empty() {
                        println!("No favourites yet");
                    }
                    for photo in favourites.all() {
                        println!("{} {} ({})", photo.id, photo.name, photo.years());
                    }
                }
                FavouritesAction::Add { cid } => {
                    let id = ps::PhotoId(cid);
                    if favourites.is_favourite(id) {
                        println!("{id} is already a favourite");
                    } else {
                        let photo = client
                            .fetch_details(id)
                            .await
                            .with_context(|| format!("failed to fetch photo {cid}"))?
                            .photo();
                        println!("{}", update_favourite(&mut favourites, photo, true)?);
                    }
                }
                FavouritesAction::Remove { cid } => {
                    match favourites.get(ps::PhotoId(cid)).cloned() {
                        Some(photo) => {
                            println!("{}", update_favourite(&mut favourites, photo, false)?);
                        }
                        None => println!("{cid} is not a favourite"),
                    }
                }
            }
        }
        Command::InitConfig { .. } => unreachable!("handled before loading the config"),
    }

    Ok(())
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("plenka=info")),
        )
        .init();
    Ok(())
}

/// The regions visited by `pan`: `steps` of them, starting at `start`.
/// Longitude moves a quarter of the span per step unless `step_lon` is given.
fn pan_regions(
    start: ps::Region,
    steps: u32,
    step_lat: f64,
    step_lon: Option<f64>,
) -> Vec<ps::Region> {
    let step_lon = step_lon.unwrap_or(start.span.longitude_delta / 4.0);
    (0..steps)
        .map(|i| {
            let mut region = start;
            region.center.latitude += step_lat * i as f64;
            region.center.longitude += step_lon * i as f64;
            region
        })
        .collect()
}

/// Add or remove a favourite, returning the line to report once it is saved.
fn update_favourite(
    favourites: &mut pc::Favourites,
    photo: ps::Photo,
    is_favourite: bool,
) -> anyhow::Result<String> {
    let verb = if is_favourite { "Added" } else { "Removed" };
    let line = format!("{verb} {} {}", photo.id, photo.name);
    favourites
        .set(photo, is_favourite)
        .context("failed to save favourites")?;
    Ok(line)
}

fn print_event(step: usize, event: pc::MapEvent) {
    match event {
        pc::MapEvent::Annotations(delta) => {
            println!(
                "step {step}: +{} -{}{}",
                delta.added.len(),
                delta.removed.len(),
                if delta.reset { " (reset)" } else { "" }
            );
            print_delta(&delta);
        }
        pc::MapEvent::LoadFailed { kind, message } => {
            println!("step {step}: {kind} error: {message}");
        }
        pc::MapEvent::MoveTo(_) | pc::MapEvent::Cleared => {}
    }
}

fn print_delta(delta: &AnnotationDelta) {
    for annotation in &delta.removed {
        println!("  - {}", describe(annotation));
    }
    for annotation in &delta.added {
        println!("  + {}", describe(annotation));
    }
}

fn describe(annotation: &Annotation) -> String {
    let at = annotation.coordinate();
    let at = format!("{:.5}, {:.5}", at.latitude, at.longitude);
    match annotation {
        Annotation::Photo(photo) => {
            format!("photo {} \"{}\" ({}) at {at}", photo.id, photo.name, photo.years())
        }
        Annotation::Cluster(cluster) => format!(
            "cluster of {} at {at}, shown as {}",
            cluster.count, cluster.photo.id
        ),
        Annotation::Group(group) => {
            let ids: Vec<String> = group.photos().iter().map(|p| p.id.to_string()).collect();
            format!("group of {} at {at}: {}", group.len(), ids.join(", "))
        }
    }
}
