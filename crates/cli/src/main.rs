use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use catalog_core::{
    AssetRef, CoreConfig, JsonFileStore, Movie, MoviePatch, MovieStore, NewMovie, NewOpinion,
    Rating, DEFAULT_DATA_DIR, DEFAULT_UPLOADS_DIR,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Movie catalog CLI")]
struct Cli {
    /// Directory holding movies.json
    #[arg(long, env = "CATALOG_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
    /// Directory holding uploaded images
    #[arg(long, env = "CATALOG_UPLOADS_DIR", default_value = DEFAULT_UPLOADS_DIR)]
    uploads_dir: PathBuf,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all movies
    List,
    /// Show one movie with its opinions
    Show {
        /// Movie id
        id: String,
    },
    /// Create a movie
    Create {
        /// Title
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Release date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Score; non-numeric input is stored as an invalid rating
        #[arg(long, default_value = "")]
        rating: String,
        /// Path of a JPEG, PNG or GIF poster
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Update a movie; omitted options keep their stored values
    Update {
        /// Movie id
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Release date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        rating: Option<String>,
        /// Path of a replacement poster
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Delete a movie and its poster
    Delete {
        /// Movie id
        id: String,
    },
    /// Add an opinion (at most three per movie)
    AddOpinion {
        /// Movie id
        id: String,
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "")]
        rating: String,
        #[arg(long, default_value = "")]
        comment: String,
    },
}

fn parse_date(value: Option<String>) -> Result<Option<NaiveDate>, Box<dyn std::error::Error>> {
    match value.filter(|v| !v.trim().is_empty()) {
        None => Ok(None),
        Some(v) => Ok(Some(
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d")
                .map_err(|e| format!("date must be YYYY-MM-DD ('{}'): {}", v, e))?,
        )),
    }
}

fn store_image(
    store: &JsonFileStore,
    path: Option<PathBuf>,
) -> Result<Option<AssetRef>, Box<dyn std::error::Error>> {
    match path {
        None => Ok(None),
        Some(path) => Ok(Some(store.assets().store_file(&path)?.reference)),
    }
}

fn discard_image(store: &JsonFileStore, image: Option<AssetRef>) {
    if let Some(image) = image {
        if let Err(e) = store.assets().remove(&image) {
            eprintln!("Could not remove {}: {}", image, e);
        }
    }
}

/// Creates a movie, removing the stored poster again if the record is not saved.
fn create_movie(
    store: &JsonFileStore,
    fields: NewMovie,
    image_path: Option<PathBuf>,
) -> Result<Movie, Box<dyn std::error::Error>> {
    let image = store_image(store, image_path)?;
    store.create(fields, image.clone()).map_err(|e| {
        discard_image(store, image);
        e.into()
    })
}

/// Updates a movie, removing the stored poster again if the record is not saved.
fn update_movie(
    store: &JsonFileStore,
    id: &str,
    patch: MoviePatch,
    image_path: Option<PathBuf>,
) -> Result<Movie, Box<dyn std::error::Error>> {
    let image = store_image(store, image_path)?;
    store.update(id, patch, image.clone()).map_err(|e| {
        discard_image(store, image);
        e.into()
    })
}

fn print_movie(movie: &Movie) {
    let date = movie
        .date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".into());
    println!(
        "ID: {}, Name: {}, Date: {}, Rating: {}",
        movie.id, movie.name, date, movie.rating
    );
}

fn print_details(movie: &Movie) {
    print_movie(movie);
    if !movie.description.is_empty() {
        println!("  {}", movie.description);
    }
    if let Some(image) = &movie.image {
        println!("  Image: {}", image);
    }
    for opinion in &movie.opinions {
        println!(
            "  [{}] {} ({}): {}",
            opinion.id, opinion.user, opinion.rating, opinion.comment
        );
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = cli.command else {
        println!("No command given. Try `catalog --help`.");
        return Ok(());
    };

    let cfg = CoreConfig::new(cli.data_dir, cli.uploads_dir)?;
    let store = JsonFileStore::open(Arc::new(cfg))?;

    match command {
        Commands::List => {
            let movies = store.list()?;
            if movies.is_empty() {
                println!("No movies found.");
            } else {
                for movie in &movies {
                    print_movie(movie);
                }
            }
        }
        Commands::Show { id } => print_details(&store.get(&id)?),
        Commands::Create {
            name,
            description,
            date,
            rating,
            image,
        } => {
            let fields = NewMovie {
                name,
                description,
                date: parse_date(date)?,
                rating: Rating::parse_lenient(&rating),
            };
            let movie = create_movie(&store, fields, image)?;
            println!("Created movie with ID: {}", movie.id);
        }
        Commands::Update {
            id,
            name,
            description,
            date,
            rating,
            image,
        } => {
            let patch = MoviePatch {
                name,
                description,
                date: parse_date(date)?,
                rating: rating.map(|r| Rating::parse_lenient(&r)),
            };
            print_details(&update_movie(&store, &id, patch, image)?);
        }
        Commands::Delete { id } => {
            let movie = store.delete(&id)?;
            println!("Deleted movie {} ({})", movie.id, movie.name);
        }
        Commands::AddOpinion {
            id,
            user,
            rating,
            comment,
        } => {
            let opinion = NewOpinion {
                user,
                rating: Rating::parse_lenient(&rating),
                comment,
            };
            let opinion = store.add_opinion(&id, opinion)?;
            println!("Added opinion with ID: {}", opinion.id);
        }
    }

    Ok(())
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
