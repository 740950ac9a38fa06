//! Word-level kernels used by the dense block encodings.
//!
//! The word-wise AND of two bitmaps is the one hot loop that benefits from
//! vector instructions. The kernel is picked by an explicit capability probe
//! ([`WordKernels::detect`]); the resulting handle is immutable and every
//! kernel it can hold produces exactly the same words as the scalar loop.

use std::sync::OnceLock;

/// Signature of a word-wise AND kernel: `dst[i] = a[i] & b[i]`.
pub type AndWordsFn = fn(&[u64], &[u64], &mut [u64]);

/// Identifies the implementation selected for a [`WordKernels`] handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordKernelKind {
    /// Portable loop over `u64` words.
    Scalar,
    /// 256-bit AVX2 loads and stores (x86_64 only).
    Avx2,
}

/// An immutable table of word kernels, chosen once.
#[derive(Clone, Copy)]
pub struct WordKernels {
    kind: WordKernelKind,
    and_words: AndWordsFn,
}

impl WordKernels {
    /// The portable fallback.
    pub fn scalar() -> WordKernels {
        WordKernels {
            kind: WordKernelKind::Scalar,
            and_words: and_words_scalar,
        }
    }

    /// Probes the running CPU and returns the fastest available kernels.
    pub fn detect() -> WordKernels {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("avx2") {
                return WordKernels {
                    kind: WordKernelKind::Avx2,
                    and_words: avx2::and_words,
                };
            }
        }
        WordKernels::scalar()
    }

    /// Process-wide kernels, detected on first use.
    pub fn global() -> &'static WordKernels {
        static KERNELS: OnceLock<WordKernels> = OnceLock::new();
        KERNELS.get_or_init(|| {
            let kernels = WordKernels::detect();
            log::info!("selected {:?} word kernels", kernels.kind);
            kernels
        })
    }

    pub fn kind(&self) -> WordKernelKind {
        self.kind
    }

    /// Computes `dst[i] = a[i] & b[i]`.
    ///
    /// Panics if the three slices differ in length.
    pub fn and_words(&self, a: &[u64], b: &[u64], dst: &mut [u64]) {
        assert_eq!(a.len(), b.len());
        assert_eq!(a.len(), dst.len());
        (self.and_words)(a, b, dst)
    }
}

impl std::fmt::Debug for WordKernels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordKernels")
            .field("kind", &self.kind)
            .finish()
    }
}

pub fn and_words_scalar(a: &[u64], b: &[u64], dst: &mut [u64]) {
    for ((d, &x), &y) in dst.iter_mut().zip(a).zip(b) {
        *d = x & y;
    }
}

#[cfg(target_arch = "x86_64")]
mod avx2 {
    use std::arch::x86_64::*;

    /// Only reachable through a handle built after a successful AVX2 probe.
    pub(super) fn and_words(a: &[u64], b: &[u64], dst: &mut [u64]) {
        // SAFETY: `WordKernels::detect` selects this function only when the
        // CPU reports AVX2 support.
        unsafe { and_words_avx2(a, b, dst) }
    }

    #[target_feature(enable = "avx2")]
    unsafe fn and_words_avx2(a: &[u64], b: &[u64], dst: &mut [u64]) {
        const LANES: usize = 4;
        let len = dst.len().min(a.len()).min(b.len());
        let vectorized = len - len % LANES;
        let mut i = 0;
        while i < vectorized {
            // SAFETY: `i + LANES <= len` for every slice; unaligned loads/stores.
            unsafe {
                let va = _mm256_loadu_si256(a.as_ptr().add(i) as *const __m256i);
                let vb = _mm256_loadu_si256(b.as_ptr().add(i) as *const __m256i);
                _mm256_storeu_si256(
                    dst.as_mut_ptr().add(i) as *mut __m256i,
                    _mm256_and_si256(va, vb),
                );
            }
            i += LANES;
        }
        for j in vectorized..len {
            dst[j] = a[j] & b[j];
        }
    }
}
