//! Geometry utilities for multiblock-mesh.
//!
//! Small fixed-size vector helpers shared by the expander, merger and stitcher,
//! plus the scaled-Jacobian cell quality evaluator.

pub mod quality;
pub mod vector;
