//! Four-lane single precision arithmetic for the vectorized kernel
//!
//! [`F32x4`] wraps an SSE register on x86_64, a NEON register on aarch64 and
//! a plain array elsewhere. [`LaneBatch`] buffers matched value pairs until
//! four are available and multiplies them in one step.

/// Number of lanes in [`F32x4`]
pub const LANES: usize = 4;

#[cfg(target_arch = "x86_64")]
mod imp {
    use std::arch::x86_64::*;

    /// Four `f32` lanes in an SSE register
    #[derive(Clone, Copy)]
    pub struct F32x4(__m128);

    impl F32x4 {
        // newer toolchains treat baseline SSE intrinsics as safe
        #[inline]
        #[allow(unused_unsafe)]
        pub fn zero() -> Self {
            // SAFETY: SSE is always available on x86_64
            unsafe { F32x4(_mm_setzero_ps()) }
        }

        #[inline]
        pub fn load(lanes: &[f32; 4]) -> Self {
            // SAFETY: `lanes` is valid for reading four f32 values
            unsafe { F32x4(_mm_loadu_ps(lanes.as_ptr())) }
        }

        /// `self + a * b`, lane by lane
        #[inline]
        #[allow(unused_unsafe)]
        pub fn mul_add(self, a: Self, b: Self) -> Self {
            // SAFETY: SSE is always available on x86_64; operands are registers
            unsafe { F32x4(_mm_add_ps(self.0, _mm_mul_ps(a.0, b.0))) }
        }

        /// `(l0 + l1) + (l2 + l3)`
        #[inline]
        #[allow(unused_unsafe)]
        pub fn horizontal_sum(self) -> f32 {
            // SAFETY: SSE is always available on x86_64; no memory is accessed
            unsafe {
                let v = self.0; //                              [ l3 l2 | l1 l0 ]
                let shuf = _mm_shuffle_ps::<0b1011_0001>(v, v); // [ l2 l3 | l0 l1 ]
                let sums = _mm_add_ps(v, shuf);
                let high = _mm_movehl_ps(shuf, sums); //          lane 0 = l2 + l3
                _mm_cvtss_f32(_mm_add_ss(sums, high))
            }
        }
    }
}

#[cfg(target_arch = "aarch64")]
mod imp {
    use std::arch::aarch64::*;

    /// Four `f32` lanes in a NEON register
    #[derive(Clone, Copy)]
    pub struct F32x4(float32x4_t);

    impl F32x4 {
        #[inline]
        #[allow(unused_unsafe)]
        pub fn zero() -> Self {
            // SAFETY: NEON is always available on aarch64
            unsafe { F32x4(vdupq_n_f32(0.0)) }
        }

        #[inline]
        pub fn load(lanes: &[f32; 4]) -> Self {
            // SAFETY: `lanes` is valid for reading four f32 values
            unsafe { F32x4(vld1q_f32(lanes.as_ptr())) }
        }

        /// `self + a * b`, lane by lane
        #[inline]
        #[allow(unused_unsafe)]
        pub fn mul_add(self, a: Self, b: Self) -> Self {
            // SAFETY: NEON is always available on aarch64; operands are registers
            unsafe { F32x4(vaddq_f32(self.0, vmulq_f32(a.0, b.0))) }
        }

        #[inline]
        #[allow(unused_unsafe)]
        pub fn horizontal_sum(self) -> f32 {
            // SAFETY: NEON is always available on aarch64; no memory is accessed
            unsafe { vaddvq_f32(self.0) }
        }
    }
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
mod imp {
    /// Four `f32` lanes in a plain array
    #[derive(Clone, Copy)]
    pub struct F32x4([f32; 4]);

    impl F32x4 {
        #[inline]
        pub fn zero() -> Self {
            F32x4([0.0; 4])
        }

        #[inline]
        pub fn load(lanes: &[f32; 4]) -> Self {
            F32x4(*lanes)
        }

        /// `self + a * b`, lane by lane
        #[inline]
        pub fn mul_add(self, a: Self, b: Self) -> Self {
            let mut out = self.0;
            for k in 0..4 {
                out[k] += a.0[k] * b.0[k];
            }
            F32x4(out)
        }

        /// `(l0 + l1) + (l2 + l3)`
        #[inline]
        pub fn horizontal_sum(self) -> f32 {
            (self.0[0] + self.0[1]) + (self.0[2] + self.0[3])
        }
    }
}

pub use imp::F32x4;

/// Buffers matched pairs and accumulates their products four at a time
pub struct LaneBatch {
    lhs: [f32; LANES],
    rhs: [f32; LANES],
    len: usize,
    acc: F32x4,
}

impl LaneBatch {
    pub fn new() -> Self {
        Self {
            lhs: [0.0; LANES],
            rhs: [0.0; LANES],
            len: 0,
            acc: F32x4::zero(),
        }
    }

    /// Queue the product `x * y`
    #[inline]
    pub fn push(&mut self, x: f32, y: f32) {
        self.lhs[self.len] = x;
        self.rhs[self.len] = y;
        self.len += 1;
        if self.len == LANES {
            self.acc = self
                .acc
                .mul_add(F32x4::load(&self.lhs), F32x4::load(&self.rhs));
            self.len = 0;
        }
    }

    /// Reduce the lanes and add the 0-3 products still queued
    #[inline]
    pub fn finish(self) -> f32 {
        let mut sum = self.acc.horizontal_sum();
        for k in 0..self.len {
            sum += self.lhs[k] * self.rhs[k];
        }
        sum
    }
}

impl Default for LaneBatch {
    fn default() -> Self {
        Self::new()
    }
}
