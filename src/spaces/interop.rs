//! Numeric backends interop.
//! Optional conversions between observation payloads / BoxSpace elements and
//! ndarray/nalgebra types.
//!
//! Fully gated behind feature flags to avoid hard dependencies; the core
//! crate keeps using plain `f32` slices and `[T; N]` arrays.

#[allow(unused_imports)]
use crate::spaces::BoxSpace;
#[allow(unused_imports)]
use crate::world::Vec2;

// ndarray interop
#[cfg(feature = "ndarray")]
pub mod ndarray_impl {
    use super::*;
    use ndarray::{Array1, Array2};

    /// Error type for conversions whose shapes do not line up.
    #[derive(Debug, Clone)]
    pub struct NdarrayShapeError;

    /// Convert one agent's flat observation into an `Array1<f32>`.
    pub fn obs_to_array(obs: &[f32]) -> Array1<f32> {
        Array1::from_vec(obs.to_vec())
    }

    /// Convert one agent's batched observations (replica-major) into a
    /// `(batch_dim, obs_dim)` `Array2<f32>`. Fails on ragged rows.
    pub fn batch_to_array(batch: &[Vec<f32>]) -> Result<Array2<f32>, NdarrayShapeError> {
        let rows = batch.len();
        let cols = batch.first().map_or(0, |r| r.len());
        if batch.iter().any(|r| r.len() != cols) {
            return Err(NdarrayShapeError);
        }
        let flat: Vec<f32> = batch.iter().flatten().copied().collect();
        Array2::from_shape_vec((rows, cols), flat).map_err(|_| NdarrayShapeError)
    }

    impl<T: Copy + PartialOrd, const N: usize> BoxSpace<T, N> {
        /// Convert a BoxSpace element `[T; N]` into an `ndarray::Array1<T>`.
        pub fn to_ndarray(elem: [T; N]) -> Array1<T> {
            Array1::from_vec(elem.to_vec())
        }

        /// Attempt to convert an `ndarray::Array1<T>` back into `[T; N]`.
        pub fn from_ndarray(arr: &Array1<T>) -> Result<[T; N], NdarrayShapeError> {
            if arr.len() != N { return Err(NdarrayShapeError); }
            let vec = arr.to_vec();
            vec.try_into().map_err(|_| NdarrayShapeError)
        }
    }
}

// nalgebra interop
#[cfg(feature = "nalgebra")]
pub mod nalgebra_impl {
    use super::*;
    use nalgebra::{DVector, SVector, Vector2};

    /// Convert one agent's flat observation into a `DVector<f32>`.
    pub fn obs_to_vector(obs: &[f32]) -> DVector<f32> {
        DVector::from_row_slice(obs)
    }

    impl Vec2 {
        /// Convert into an `nalgebra::Vector2<f32>`.
        pub fn to_nalgebra(self) -> Vector2<f32> {
            Vector2::new(self.x, self.y)
        }

        /// Convert from an `nalgebra::Vector2<f32>`.
        pub fn from_nalgebra(v: &Vector2<f32>) -> Self {
            Vec2::new(v.x, v.y)
        }
    }

    impl<T: nalgebra::Scalar + Copy + PartialOrd, const N: usize> BoxSpace<T, N> {
        /// Convert a BoxSpace element `[T; N]` into an `nalgebra::SVector<T, N>`.
        pub fn to_nalgebra(elem: [T; N]) -> SVector<T, N> {
            SVector::<T, N>::from_row_slice(&elem)
        }

        /// Convert an `nalgebra::SVector<T, N>` into a BoxSpace element `[T; N]`.
        pub fn from_nalgebra(v: &SVector<T, N>) -> [T; N] {
            let mut out: [T; N] = [v[0]; N];
            for i in 0..N { out[i] = v[i]; }
            out
        }
    }
}
