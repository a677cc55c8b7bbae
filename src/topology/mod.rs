//! Mesh topology: face derivation, boundary patches and cell zones.
//!
//! - [`faces`]: turns merged block lattices into owner/neighbour faces and
//!   per-patch boundary faces.
//! - [`patch`]: patch kinds and the final patch table.
//! - [`zones`]: insertion-ordered cell zones.

pub mod faces;
pub mod patch;
pub mod zones;

pub use faces::{FaceRecord, FaceTopology, PatchFace, PatchFaces};
pub use patch::{BoundaryPatch, PatchKind, ResolvedPatch};
pub use zones::{CellZone, ZoneTagger};
