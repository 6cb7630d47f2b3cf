//! Column-major and packed-upper index maps shared by the eigen-core and
//! GMRES bookkeeping.
//!
//! All indices here are 1-based, matching the numerical literature (and the
//! original implementation) these routines are lifted from. Preserving the
//! 1-based convention keeps the arithmetic below identical to the formulas
//! in the design notes; callers at the crate boundary work with ordinary
//! 0-based Rust slices and only cross into 1-based indexing through these
//! three functions.

/// Column-major offset of `(i, j)` in an `m`-row dense matrix.
pub fn ijtok(i: usize, j: usize, m: usize) -> usize {
    (j - 1) * m + (i - 1)
}

/// Offset of `(i, j)`, `i <= j`, in packed upper-triangular storage.
pub fn ijtokp(i: usize, j: usize) -> usize {
    (j - 1) * j / 2 + (i - 1)
}

/// Offset of element `i` in a plain vector.
pub fn itok(i: usize) -> usize {
    i - 1
}
