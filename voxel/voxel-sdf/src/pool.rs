//! Scratch-buffer pool.
//!
//! The 3-D transforms and SDF builders need several full-volume scratch
//! buffers per call. A small shared free list amortizes those
//! allocations across repeated calls; buffers return to the pool on drop,
//! including along error paths.

use std::sync::Mutex;

/// At most this many buffers are retained per element type.
const MAX_POOLED: usize = 8;

static POOL_I64: Mutex<Vec<Vec<i64>>> = Mutex::new(Vec::new());
static POOL_F64: Mutex<Vec<Vec<f64>>> = Mutex::new(Vec::new());

macro_rules! pooled {
    ($name:ident, $elem:ty, $pool:ident, $rent:ident) => {
        /// A pooled scratch buffer; returns to the pool on drop.
        pub(crate) struct $name {
            buf: Vec<$elem>,
        }

        /// Rents a zero-filled buffer of length `len` from the pool.
        pub(crate) fn $rent(len: usize) -> $name {
            let mut buf = $pool
                .lock()
                .map(|mut pool| pool.pop().unwrap_or_default())
                .unwrap_or_default();
            buf.clear();
            buf.resize(len, 0 as $elem);
            $name { buf }
        }

        impl std::ops::Deref for $name {
            type Target = [$elem];
            fn deref(&self) -> &[$elem] {
                &self.buf
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut [$elem] {
                &mut self.buf
            }
        }

        impl Drop for $name {
            fn drop(&mut self) {
                if let Ok(mut pool) = $pool.lock() {
                    if pool.len() < MAX_POOLED {
                        pool.push(std::mem::take(&mut self.buf));
                    }
                }
            }
        }
    };
}

pooled!(PooledI64, i64, POOL_I64, rent_i64);
pooled!(PooledF64, f64, POOL_F64, rent_f64);
