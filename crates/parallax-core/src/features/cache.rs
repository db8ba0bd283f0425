//! Tiered cache of interest points and correspondences for an image pair.
//!
//! Lookup order for a pair:
//! 1. a stored correspondence set;
//! 2. stored interest points for both images, matched and then stored;
//! 3. fresh detection and description, stored, then tier 2.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::error::{ParallaxError, Result};
use crate::frame::Frame;
use crate::io::artifacts::{decode_matches, decode_points, encode_matches, encode_points};

use super::{match_points, points_file_name, CorrespondenceSet, FeatureDetector, ImagePairKey, InterestPoint};

/// Identifies one cached artifact.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactKey {
    /// Interest points of a single image, by [`image_id`](super::image_id).
    Points(String),
    /// Correspondences of an image pair.
    Matches(ImagePairKey),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Artifact {
    Points(Vec<InterestPoint>),
    Matches(CorrespondenceSet),
}

/// Storage behind the alignment cache.
///
/// Checks and writes are not atomic across processes; two runs on the same
/// pair may both compute and store an artifact.
pub trait ArtifactStore: Send + Sync {
    fn lookup(&self, key: &ArtifactKey) -> Result<Option<Artifact>>;
    fn store(&self, key: &ArtifactKey, artifact: &Artifact) -> Result<()>;
}

/// Directory-backed store: `<id>.vwip` and `<id1>__<id2>.match`, ids
/// escaped into single file names.
#[derive(Clone, Debug)]
pub struct FileArtifactStore {
    dir: PathBuf,
}

impl FileArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &ArtifactKey) -> PathBuf {
        match key {
            ArtifactKey::Points(id) => self.dir.join(points_file_name(id)),
            ArtifactKey::Matches(pair) => self.dir.join(pair.match_file_name()),
        }
    }
}

impl ArtifactStore for FileArtifactStore {
    fn lookup(&self, key: &ArtifactKey) -> Result<Option<Artifact>> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Ok(None);
        }
        debug!(path = %path.display(), "Loading cached artifact");
        let mut reader = BufReader::new(File::open(&path)?);
        let artifact = match key {
            ArtifactKey::Points(_) => Artifact::Points(decode_points(&mut reader)?),
            ArtifactKey::Matches(_) => Artifact::Matches(decode_matches(&mut reader)?),
        };
        Ok(Some(artifact))
    }

    fn store(&self, key: &ArtifactKey, artifact: &Artifact) -> Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(&path)?);
        match artifact {
            Artifact::Points(points) => encode_points(points, &mut writer)?,
            Artifact::Matches(set) => encode_matches(set, &mut writer)?,
        }
        writer.flush()?;
        debug!(path = %path.display(), "Stored artifact");
        Ok(())
    }
}

/// In-memory store. Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryArtifactStore {
    entries: Arc<Mutex<HashMap<ArtifactKey, Artifact>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, key: &ArtifactKey) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ArtifactKey, Artifact>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn lookup(&self, key: &ArtifactKey) -> Result<Option<Artifact>> {
        Ok(self.lock().get(key).cloned())
    }

    fn store(&self, key: &ArtifactKey, artifact: &Artifact) -> Result<()> {
        self.lock().insert(key.clone(), artifact.clone());
        Ok(())
    }
}

/// Resolves the correspondence set of an image pair through an
/// [`ArtifactStore`], running detection and matching only on a miss.
pub struct AlignmentCache<'a> {
    store: &'a dyn ArtifactStore,
    detector: &'a dyn FeatureDetector,
    point_budget: usize,
    match_ratio: f32,
}

impl<'a> AlignmentCache<'a> {
    pub fn new(
        store: &'a dyn ArtifactStore,
        detector: &'a dyn FeatureDetector,
        point_budget: usize,
        match_ratio: f32,
    ) -> Self {
        Self {
            store,
            detector,
            point_budget,
            match_ratio,
        }
    }

    /// Correspondences for `key`, whose images are `left` and `right`.
    ///
    /// Once artifacts exist, repeated calls only read them back.
    pub fn fetch(&self, key: &ImagePairKey, left: &Frame, right: &Frame) -> Result<CorrespondenceSet> {
        let match_key = ArtifactKey::Matches(key.clone());
        if let Some(artifact) = self.store.lookup(&match_key)? {
            let set = expect_matches(artifact)?;
            info!(pair = %key, matches = set.len(), "Using cached correspondences");
            return Ok(set);
        }

        let left_points = self.points_for(&key.left, left)?;
        let right_points = self.points_for(&key.right, right)?;

        let set = match_points(&left_points, &right_points, self.match_ratio);
        info!(pair = %key, matches = set.len(), "Matched interest points");
        self.store.store(&match_key, &Artifact::Matches(set.clone()))?;
        Ok(set)
    }

    /// Tier 2 for a single image: stored points, else detect, describe and
    /// store.
    fn points_for(&self, id: &str, frame: &Frame) -> Result<Vec<InterestPoint>> {
        let key = ArtifactKey::Points(id.to_string());
        if let Some(artifact) = self.store.lookup(&key)? {
            return expect_points(artifact);
        }

        let detected = self.detector.detect(frame, self.point_budget)?;
        let described = self.detector.describe(frame, detected)?;
        info!(image = id, points = described.len(), "Detected interest points");
        self.store.store(&key, &Artifact::Points(described.clone()))?;
        Ok(described)
    }
}

fn expect_matches(artifact: Artifact) -> Result<CorrespondenceSet> {
    match artifact {
        Artifact::Matches(set) => Ok(set),
        Artifact::Points(_) => Err(ParallaxError::InvalidArtifact(
            "expected correspondences, found interest points".into(),
        )),
    }
}

fn expect_points(artifact: Artifact) -> Result<Vec<InterestPoint>> {
    match artifact {
        Artifact::Points(points) => Ok(points),
        Artifact::Matches(_) => Err(ParallaxError::InvalidArtifact(
            "expected interest points, found correspondences".into(),
        )),
    }
}
