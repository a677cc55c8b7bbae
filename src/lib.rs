#![cfg_attr(docsrs, feature(doc_cfg))]
//! # multiblock-mesh
//!
//! multiblock-mesh builds conformal hexahedral meshes from a description of
//! hexahedral blocks: each block is expanded into a graded structured lattice,
//! lattices are merged at coincident points, block faces are grouped into named
//! boundary patches, declared merge pairs are stitched into internal faces and
//! cells are tagged with zones.
//!
//! ## Features
//! - Uniform and piecewise-geometric edge grading
//! - Tolerance-based point merging with ambiguity detection
//! - Scaled-Jacobian cell quality diagnostics
//! - Conformal and non-conformal patch stitching through a pluggable
//!   [`FaceCutter`](crate::stitch::FaceCutter)
//! - JSON input, JSON and ASCII polyMesh output, OBJ block topology dump
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! multiblock-mesh = "0.1"
//! # Optional features:
//! # features = ["rayon"]
//! ```
//!
//! ```
//! use multiblock_mesh::prelude::*;
//!
//! let vertices = vec![
//!     [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0],
//!     [0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0],
//! ];
//! let block = BlockDefinition::new([0, 1, 2, 3, 4, 5, 6, 7], [2, 2, 2]);
//! let desc = BlockMeshDescription::new(vertices, vec![block]);
//! let out = generate(&MeshContext::default(), &desc)?;
//! assert_eq!(out.mesh.points().len(), 27);
//! assert_eq!(out.mesh.cells().len(), 8);
//! # Ok::<(), MeshError>(())
//! ```
//!
//! ## Logging
//! Progress is reported through the `log` facade; no logger is installed by
//! the library.
//!
//! ## Determinism
//! Output depends only on the description and the context. With the `rayon`
//! feature blocks are expanded concurrently into block-indexed slots, so the
//! result is identical to a sequential run.

pub mod block;
pub mod config;
pub mod geometry;
pub mod grading;
pub mod io;
pub mod merge;
pub mod mesh_error;
pub mod mesh_generation;
pub mod stitch;
pub mod topology;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::block::{BlockDefinition, BlockFace};
    pub use crate::config::{
        BlockMeshDescription, FaceRef, MergePair, MeshContext, PatchDefinition,
    };
    pub use crate::geometry::quality::{QualityReport, QualityWarning};
    pub use crate::grading::{Distribution, EdgeGrading, GradingSection, PiecewiseGrading};
    pub use crate::io::{MeshReader, MeshWriter};
    pub use crate::mesh_error::{ErrorCategory, MeshError};
    pub use crate::mesh_generation::{
        Diagnostics, GeneratedMesh, Mesh, RunMode, RunOutput, TopologyDump, generate, run,
        topology,
    };
    pub use crate::stitch::{FaceCutter, PolygonClipCutter};
    pub use crate::topology::{BoundaryPatch, CellZone, PatchKind};
}
