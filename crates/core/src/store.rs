//! The movie catalog store.
//!
//! [`MovieStore`] is the contract the HTTP and CLI layers program against.
//! [`JsonFileStore`] implements it over a single JSON document holding the whole
//! collection:
//!
//! ```text
//! data/
//!   movies.json    # array of movies, rewritten in full on every mutation
//! uploads/
//!   <timestamp-id>.<ext>
//! ```
//!
//! Every operation re-reads the document, so external edits (such as reordering entries)
//! are honoured. Mutations run read → modify → write inside one mutex, so overlapping
//! requests within a process cannot lose each other's updates. Separate processes sharing
//! the document are not coordinated; the last write wins.
//!
//! Snapshots are written to a sibling temporary file and renamed into place, so the
//! document is never observed half-written.
//!
//! Replaced or orphaned image assets are removed only after the new snapshot is on disk,
//! and removal is best-effort: failures are logged, not returned.

use crate::config::CoreConfig;
use crate::constants::MAX_OPINIONS_PER_MOVIE;
use crate::movie::{Movie, MoviePatch, NewMovie, NewOpinion, Opinion};
use crate::{CatalogError, CatalogResult};
use catalog_files::{AssetRef, AssetService};
use catalog_uuid::TimestampIdGenerator;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Operations on the movie collection.
///
/// Movie ids are opaque strings compared exactly. New records get a timestamp id, but
/// records written by hand or by older versions may carry any id.
pub trait MovieStore: Send + Sync {
    /// All movies in document order.
    fn list(&self) -> CatalogResult<Vec<Movie>>;

    /// The movie with `id`.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NotFound`] if no movie has that id.
    fn get(&self, id: &str) -> CatalogResult<Movie>;

    /// Appends a new movie with a fresh id and no opinions.
    fn create(&self, fields: NewMovie, image: Option<AssetRef>) -> CatalogResult<Movie>;

    /// Applies `patch` and, when `image` is supplied, swaps the image reference.
    ///
    /// The previously referenced asset is removed if it was a managed upload.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NotFound`] if no movie has that id.
    fn update(&self, id: &str, patch: MoviePatch, image: Option<AssetRef>)
        -> CatalogResult<Movie>;

    /// Removes the movie and its managed image asset. Returns the removed movie.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NotFound`] if no movie has that id.
    fn delete(&self, id: &str) -> CatalogResult<Movie>;

    /// Appends an opinion with a fresh id.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::NotFound`] if no movie has that id
    /// - [`CatalogError::CapacityExceeded`] if the movie already holds
    ///   [`MAX_OPINIONS_PER_MOVIE`] opinions; the movie is left unchanged
    fn add_opinion(&self, movie_id: &str, fields: NewOpinion) -> CatalogResult<Opinion>;
}

/// [`MovieStore`] backed by one JSON document plus a managed uploads directory.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    assets: Arc<AssetService>,
    ids: TimestampIdGenerator,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens the store described by `cfg`.
    ///
    /// Creates the data directory, an empty `[]` document and the uploads directory when
    /// they do not exist yet. An existing document is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if:
    /// - the data directory cannot be created
    /// - the initial document cannot be written
    /// - the uploads directory is unusable
    pub fn open(cfg: Arc<CoreConfig>) -> CatalogResult<Self> {
        fs::create_dir_all(cfg.data_dir()).map_err(CatalogError::StorageDirCreation)?;

        let path = cfg.movies_file();
        if !path.exists() {
            write_snapshot(&path, &[])?;
            tracing::info!(path = %path.display(), "created empty catalog document");
        }

        let assets = AssetService::new(cfg.uploads_dir(), cfg.uploads_url_prefix())?;

        Ok(Self {
            path,
            assets: Arc::new(assets),
            ids: TimestampIdGenerator::new(),
            write_lock: Mutex::new(()),
        })
    }

    /// Asset storage used for the images referenced by this catalog.
    pub fn assets(&self) -> &Arc<AssetService> {
        &self.assets
    }

    /// Path of the catalog document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_locked(&self) -> CatalogResult<Vec<Movie>> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        read_snapshot(&self.path)
    }

    /// Runs `mutate` against the current collection and persists the result.
    ///
    /// Nothing is written when `mutate` fails.
    fn modify<T>(
        &self,
        mutate: impl FnOnce(&mut Vec<Movie>) -> CatalogResult<T>,
    ) -> CatalogResult<T> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut movies = read_snapshot(&self.path)?;
        let outcome = mutate(&mut movies)?;
        write_snapshot(&self.path, &movies)?;
        Ok(outcome)
    }

    fn discard_asset(&self, asset: &AssetRef) {
        match self.assets.remove(asset) {
            Ok(true) => tracing::debug!(asset = %asset, "removed image asset"),
            Ok(false) => tracing::debug!(asset = %asset, "image asset not managed or already gone"),
            Err(e) => tracing::warn!(asset = %asset, error = %e, "failed to remove image asset"),
        }
    }
}

impl MovieStore for JsonFileStore {
    fn list(&self) -> CatalogResult<Vec<Movie>> {
        self.read_locked()
    }

    fn get(&self, id: &str) -> CatalogResult<Movie> {
        let movies = self.read_locked()?;
        let index = position_of(&movies, id)?;
        Ok(movies[index].clone())
    }

    fn create(&self, fields: NewMovie, image: Option<AssetRef>) -> CatalogResult<Movie> {
        let movie = self.modify(|movies| {
            let movie = Movie {
                id: self.ids.next_id().to_string(),
                name: fields.name,
                description: fields.description,
                date: fields.date,
                rating: fields.rating,
                image,
                opinions: Vec::new(),
            };
            movies.push(movie.clone());
            Ok(movie)
        })?;

        tracing::info!(movie_id = %movie.id, "movie created");
        Ok(movie)
    }

    fn update(
        &self,
        id: &str,
        patch: MoviePatch,
        image: Option<AssetRef>,
    ) -> CatalogResult<Movie> {
        if patch.is_empty() && image.is_none() {
            return self.get(id);
        }

        let (movie, replaced) = self.modify(|movies| {
            let index = position_of(movies, id)?;
            let movie = &mut movies[index];

            patch.apply(movie);
            let replaced = match image {
                Some(new_image) => movie.image.replace(new_image),
                None => None,
            };

            Ok((movie.clone(), replaced))
        })?;

        if let Some(old_image) = replaced {
            if movie.image.as_ref() != Some(&old_image) {
                self.discard_asset(&old_image);
            }
        }

        tracing::info!(movie_id = %movie.id, "movie updated");
        Ok(movie)
    }

    fn delete(&self, id: &str) -> CatalogResult<Movie> {
        let removed = self.modify(|movies| {
            let index = position_of(movies, id)?;
            Ok(movies.remove(index))
        })?;

        if let Some(image) = &removed.image {
            self.discard_asset(image);
        }

        tracing::info!(movie_id = %removed.id, "movie deleted");
        Ok(removed)
    }

    fn add_opinion(&self, movie_id: &str, fields: NewOpinion) -> CatalogResult<Opinion> {
        let opinion = self.modify(|movies| {
            let index = position_of(movies, movie_id)?;
            let movie = &mut movies[index];

            if !movie.accepts_opinions() {
                return Err(CatalogError::CapacityExceeded {
                    movie_id: movie_id.to_string(),
                    limit: MAX_OPINIONS_PER_MOVIE,
                });
            }

            let opinion = Opinion {
                id: self.ids.next_id().to_string(),
                user: fields.user,
                rating: fields.rating,
                comment: fields.comment,
            };
            movie.opinions.push(opinion.clone());
            Ok(opinion)
        })?;

        tracing::info!(movie_id, opinion_id = %opinion.id, "opinion added");
        Ok(opinion)
    }
}

fn position_of(movies: &[Movie], id: &str) -> CatalogResult<usize> {
    movies
        .iter()
        .position(|m| m.id == id)
        .ok_or_else(|| CatalogError::NotFound { id: id.to_string() })
}

fn read_snapshot(path: &Path) -> CatalogResult<Vec<Movie>> {
    let contents = fs::read_to_string(path).map_err(CatalogError::FileRead)?;
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&contents).map_err(CatalogError::Deserialization)
}

fn write_snapshot(path: &Path, movies: &[Movie]) -> CatalogResult<()> {
    let json = serde_json::to_string_pretty(movies).map_err(CatalogError::Serialization)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json).map_err(CatalogError::FileWrite)?;
    fs::rename(&tmp_path, path).map_err(CatalogError::FileWrite)
}
