use std::path::{Path, PathBuf};

use plenka_state::{Photo, PhotoId};

#[derive(Debug)]
pub enum FavouritesError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
}
impl std::fmt::Display for FavouritesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FavouritesError::Io(e) => write!(f, "favourites file error: {e}"),
            FavouritesError::Serialization(e) => write!(f, "favourites format error: {e}"),
        }
    }
}
impl std::error::Error for FavouritesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FavouritesError::Io(e) => Some(e),
            FavouritesError::Serialization(e) => Some(e),
        }
    }
}
impl From<std::io::Error> for FavouritesError {
    fn from(e: std::io::Error) -> Self {
        FavouritesError::Io(e)
    }
}
impl From<serde_json::Error> for FavouritesError {
    fn from(e: serde_json::Error) -> Self {
        FavouritesError::Serialization(e)
    }
}

pub type FavouritesResult<T> = Result<T, FavouritesError>;

/// The photos the user has marked, stored as a JSON file.
///
/// Every change is written out immediately.
#[derive(Debug)]
pub struct Favourites {
    path: PathBuf,
    photos: Vec<Photo>,
}
impl Favourites {
    /// Read the favourites at `path`; a missing file is an empty set.
    pub fn load(path: impl Into<PathBuf>) -> FavouritesResult<Self> {
        let path = path.into();
        let photos = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no favourites at {}, starting empty", path.display());
                vec![]
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            photos: dedup(photos),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn all(&self) -> &[Photo] {
        &self.photos
    }

    pub fn get(&self, id: PhotoId) -> Option<&Photo> {
        self.photos.iter().find(|p| p.id == id)
    }

    pub fn is_favourite(&self, id: PhotoId) -> bool {
        self.get(id).is_some()
    }

    /// Replace every favourite.
    pub fn set_all(&mut self, photos: Vec<Photo>) -> FavouritesResult<()> {
        self.replace(dedup(photos))
    }

    /// Add or remove one photo. Returns whether anything changed.
    pub fn set(&mut self, photo: Photo, is_favourite: bool) -> FavouritesResult<bool> {
        let present = self.is_favourite(photo.id);
        let photos = match (present, is_favourite) {
            (false, true) => self.photos.iter().cloned().chain([photo]).collect(),
            (true, false) => self
                .photos
                .iter()
                .filter(|p| p.id != photo.id)
                .cloned()
                .collect(),
            _ => return Ok(false),
        };
        self.replace(photos)?;
        Ok(true)
    }

    // The in-memory set only changes once the file has been written.
    fn replace(&mut self, photos: Vec<Photo>) -> FavouritesResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&photos)?)?;
        tracing::info!(
            "saved {} favourites to {}",
            photos.len(),
            self.path.display()
        );
        self.photos = photos;
        Ok(())
    }
}

fn dedup(photos: Vec<Photo>) -> Vec<Photo> {
    let mut seen = std::collections::HashSet::new();
    photos.into_iter().filter(|p| seen.insert(p.id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::fake::photo;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let favourites = Favourites::load(dir.path().join("favourites.json")).unwrap();
        assert!(favourites.all().is_empty());
        assert!(!favourites.is_favourite(PhotoId(1)));
    }

    #[test]
    fn test_set_persists_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("favourites.json");

        let mut favourites = Favourites::load(&path).unwrap();
        assert!(favourites.set(photo(1, 56.3, 44.0), true).unwrap());
        assert!(favourites.set(photo(2, 56.4, 44.1), true).unwrap());
        assert!(!favourites.set(photo(1, 56.3, 44.0), true).unwrap());

        let reloaded = Favourites::load(&path).unwrap();
        assert_eq!(reloaded.all().len(), 2);
        assert!(reloaded.is_favourite(PhotoId(1)));
        assert_eq!(reloaded.get(PhotoId(2)).unwrap().coordinate.latitude, 56.4);

        let mut favourites = reloaded;
        assert!(favourites.set(photo(1, 0.0, 0.0), false).unwrap());
        assert!(!favourites.set(photo(1, 0.0, 0.0), false).unwrap());
        let reloaded = Favourites::load(&path).unwrap();
        assert_eq!(reloaded.all(), &[photo(2, 56.4, 44.1)]);
    }

    #[test]
    fn test_set_all_replaces_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favourites.json");

        let mut favourites = Favourites::load(&path).unwrap();
        favourites.set(photo(1, 0.0, 0.0), true).unwrap();
        favourites
            .set_all(vec![photo(3, 0.0, 0.0), photo(4, 0.0, 0.0), photo(3, 1.0, 1.0)])
            .unwrap();

        let reloaded = Favourites::load(&path).unwrap();
        let ids: Vec<u64> = reloaded.all().iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![3, 4]);
    }

    #[test]
    fn test_failed_save_leaves_set_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        let mut favourites = Favourites::load(blocker.join("favourites.json")).unwrap();
        std::fs::write(&blocker, "not a directory").unwrap();

        assert!(matches!(
            favourites.set(photo(1, 0.0, 0.0), true),
            Err(FavouritesError::Io(_))
        ));
        assert!(!favourites.is_favourite(PhotoId(1)));

        assert!(
            favourites
                .set_all(vec![photo(2, 0.0, 0.0), photo(3, 0.0, 0.0)])
                .is_err()
        );
        assert!(favourites.all().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favourites.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            Favourites::load(&path),
            Err(FavouritesError::Serialization(_))
        ));
    }
}
