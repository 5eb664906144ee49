//! Inner-product kernel for similarity scoring.
//!
//! With the `simd` feature (default) the hot loop runs on `wide::f32x8`
//! lanes; without it the scalar path is used. Both paths produce the same
//! result up to floating-point association order.

/// Inner product of two equal-length vectors.
///
/// Callers guarantee equal lengths; the index validates dimensions before
/// scoring.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    #[cfg(feature = "simd")]
    {
        simd_dot(a, b)
    }
    #[cfg(not(feature = "simd"))]
    {
        scalar_dot(a, b)
    }
}

#[allow(dead_code)]
#[inline]
fn scalar_dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(feature = "simd")]
#[inline]
fn simd_dot(a: &[f32], b: &[f32]) -> f32 {
    use wide::f32x8;

    let a_lanes = a.chunks_exact(8);
    let b_lanes = b.chunks_exact(8);
    let a_rest = a_lanes.remainder();
    let b_rest = b_lanes.remainder();

    let mut acc = f32x8::splat(0.0);
    for (lane_a, lane_b) in a_lanes.zip(b_lanes) {
        let mut buf_a = [0.0f32; 8];
        buf_a.copy_from_slice(lane_a);
        let mut buf_b = [0.0f32; 8];
        buf_b.copy_from_slice(lane_b);
        acc += f32x8::from(buf_a) * f32x8::from(buf_b);
    }

    let mut total = acc.reduce_add();
    for (x, y) in a_rest.iter().zip(b_rest) {
        total += x * y;
    }
    total
}
