//! Per-axis numeric container used throughout the generator.
//!
//! The engine never assumes a concrete collection. Anything that offers
//! fixed-length indexed access, construction from a list, a size query and
//! elementwise equality can carry positions, velocities and limits. Fixed axis
//! counts use `[f64; N]`, runtime axis counts use `Vec<f64>`; both go through
//! the same generic code.

use std::fmt::{Debug, Write};
use std::ops::{Index, IndexMut};

/// Capability required from a per-axis vector.
pub trait AxisVector:
    Clone + PartialEq + Debug + Index<usize, Output = f64> + IndexMut<usize, Output = f64>
{
    /// Number of axes held by this vector.
    fn dofs(&self) -> usize;

    /// Vector of `dofs` entries all set to `value`.
    ///
    /// Fixed-size implementations ignore `dofs`.
    fn filled(dofs: usize, value: f64) -> Self;

    /// Builds a vector from an ordered list of values.
    fn from_slice(values: &[f64]) -> Self;

    fn zeros(dofs: usize) -> Self {
        Self::filled(dofs, 0.0)
    }
}

impl<const N: usize> AxisVector for [f64; N] {
    fn dofs(&self) -> usize {
        N
    }

    fn filled(_dofs: usize, value: f64) -> Self {
        [value; N]
    }

    fn from_slice(values: &[f64]) -> Self {
        let mut out = [0.0; N];
        for (dst, src) in out.iter_mut().zip(values) {
            *dst = *src;
        }
        out
    }
}

impl AxisVector for Vec<f64> {
    fn dofs(&self) -> usize {
        self.len()
    }

    fn filled(dofs: usize, value: f64) -> Self {
        vec![value; dofs]
    }

    fn from_slice(values: &[f64]) -> Self {
        values.to_vec()
    }
}

/// Formats the entries of a vector as `a, b, c`.
pub fn join<V: AxisVector>(values: &V) -> String {
    let mut out = String::new();
    for dof in 0..values.dofs() {
        if dof > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{}", values[dof]);
    }
    out
}

/// Copies every entry of `src` into `dst` without reallocating.
pub(crate) fn assign<V: AxisVector>(dst: &mut V, src: &V) {
    for dof in 0..src.dofs() {
        dst[dof] = src[dof];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_and_dynamic_share_behaviour() {
        let a = <[f64; 3]>::from_slice(&[1.0, -2.5, 0.0]);
        let b = <Vec<f64>>::from_slice(&[1.0, -2.5, 0.0]);
        assert_eq!(a.dofs(), 3);
        assert_eq!(b.dofs(), 3);
        assert_eq!(join(&a), join(&b));
        assert_eq!(join(&a), "1, -2.5, 0");
    }

    #[test]
    fn short_list_pads_fixed_vector() {
        let a = <[f64; 3]>::from_slice(&[4.0]);
        assert_eq!(a, [4.0, 0.0, 0.0]);
        assert_eq!(<Vec<f64>>::zeros(2), vec![0.0, 0.0]);
    }
}
