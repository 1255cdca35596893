//! Result storage produced by executing a call frame

use std::marker::PhantomData;
use std::ptr::NonNull;

/// Address of the native result words for one executed call frame.
///
/// The handle borrows the sequencer that produced it, so no new frame can be
/// opened while it is alive. That is exactly the validity window the native
/// convention guarantees.
#[derive(Clone, Copy)]
pub struct ResultHandle<'frame> {
    ptr: NonNull<u64>,
    _frame: PhantomData<&'frame mut ()>,
}

impl<'frame> ResultHandle<'frame> {
    /// Wrap a raw result address. Returns `None` for null.
    ///
    /// # Safety
    /// `ptr` must be readable for at least one aligned word for as long as the
    /// returned handle lives.
    #[inline]
    pub unsafe fn from_raw(ptr: *const u64) -> Option<Self> {
        NonNull::new(ptr as *mut u64).map(|ptr| ResultHandle {
            ptr,
            _frame: PhantomData,
        })
    }

    /// Read the first result word
    #[inline]
    pub fn word(&self) -> u64 {
        // SAFETY: guaranteed readable by the `from_raw` contract
        unsafe { self.ptr.as_ptr().read() }
    }

    /// Read result word `index` of a multi-word result.
    ///
    /// # Safety
    /// The routine must actually produce more than `index` words.
    #[inline]
    pub unsafe fn word_at(&self, index: usize) -> u64 {
        self.ptr.as_ptr().add(index).read()
    }

    /// Raw address of the result storage
    #[inline]
    pub fn address(&self) -> usize {
        self.ptr.as_ptr() as usize
    }
}

impl std::fmt::Debug for ResultHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ResultHandle({:#x})", self.address())
    }
}
