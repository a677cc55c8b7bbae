//! MeshError: unified error type for multiblock-mesh public APIs
//!
//! Every fallible operation in the crate returns `Result<_, MeshError>`.
//! Variants fall into three fatal categories (see [`ErrorCategory`]):
//! configuration problems detected before any block is expanded, geometric
//! problems detected while merging or stitching, and I/O failures while
//! reading a description or writing an artifact. Poor cell quality is never
//! an error; it is reported through
//! [`QualityWarning`](crate::geometry::quality::QualityWarning).

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`MeshError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed block, grading or patch definitions.
    Config,
    /// Ambiguous point clusters or non-coincident merge patches.
    Geometry,
    /// Reading or writing failed.
    Io,
}

/// Unified error type for mesh generation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// Generic malformed description entry.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// A grading specification is inconsistent.
    #[error("Invalid grading: {0}")]
    InvalidGrading(String),
    /// A block definition cannot be expanded.
    #[error("Invalid block {block}: {reason}")]
    InvalidBlock { block: usize, reason: String },
    /// A patch name referenced by a merge pair or block face is not declared.
    #[error("Unknown patch `{0}`")]
    UnknownPatch(String),
    /// Two patches share a name.
    #[error("Patch `{0}` declared more than once")]
    DuplicatePatch(String),
    /// A block face is assigned to more than one patch.
    #[error("Face {face} of block {block} claimed by both `{first}` and `{second}`")]
    FaceClaimedTwice {
        block: usize,
        face: usize,
        first: String,
        second: String,
    },
    /// More than one existing global point lies within tolerance of a new
    /// point and those candidates are themselves farther apart than tolerance.
    #[error(
        "Ambiguous point merge at {location:?}: candidates {candidates:?} within tolerance {tolerance} are not mutually coincident"
    )]
    AmbiguousMerge {
        location: [f64; 3],
        candidates: Vec<usize>,
        tolerance: f64,
    },
    /// Merge-pair patches do not cover the same surface.
    #[error("Cannot stitch `{master}` with `{slave}`: {reason}")]
    PatchMismatch {
        master: String,
        slave: String,
        reason: String,
    },
    /// A face declared on a boundary patch is shared by two cells.
    #[error("Face {face} of block {block} in patch `{patch}` is interior to the mesh")]
    InteriorPatchFace {
        block: usize,
        face: usize,
        patch: String,
    },
    /// Other geometric inconsistency.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    /// Underlying I/O error while reading.
    #[error("I/O error: {0}")]
    Io(String),
    /// Failure writing an output artifact.
    #[error("Failed writing {path}: {message}")]
    Write { path: PathBuf, message: String },
    /// Parse failure while reading a mesh or description.
    #[error("Mesh I/O parse error: {0}")]
    MeshIoParse(String),
}

impl MeshError {
    /// Returns the taxonomy bucket of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            MeshError::InvalidConfig(_)
            | MeshError::InvalidGrading(_)
            | MeshError::InvalidBlock { .. }
            | MeshError::UnknownPatch(_)
            | MeshError::DuplicatePatch(_)
            | MeshError::FaceClaimedTwice { .. } => ErrorCategory::Config,
            MeshError::AmbiguousMerge { .. }
            | MeshError::PatchMismatch { .. }
            | MeshError::InteriorPatchFace { .. }
            | MeshError::InvalidGeometry(_) => ErrorCategory::Geometry,
            MeshError::Io(_) | MeshError::Write { .. } | MeshError::MeshIoParse(_) => {
                ErrorCategory::Io
            }
        }
    }

    /// Attach a target path to an I/O error raised while writing.
    pub fn writing(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        MeshError::Write {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for MeshError {
    fn from(err: std::io::Error) -> Self {
        MeshError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MeshError {
    fn from(err: serde_json::Error) -> Self {
        MeshError::MeshIoParse(err.to_string())
    }
}
