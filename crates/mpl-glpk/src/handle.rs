//! Owned native pointer with an explicit released state.

use mpl_solver::{MplError, ObjectKind};
use std::ffi::CString;
use std::fmt;
use std::path::Path;
use std::ptr::NonNull;

/// Sole owner of one native object.
///
/// The handle does not know how to free its object; the wrapper that owns
/// it takes the pointer out with [`NativeHandle::take`] and hands it to the
/// engine's matching free call. After that every [`NativeHandle::get`]
/// fails with `UseAfterRelease`.
pub(crate) struct NativeHandle<T> {
    ptr: Option<NonNull<T>>,
    kind: ObjectKind,
}

impl<T> NativeHandle<T> {
    /// Wrap a pointer returned by a native allocation call.
    pub(crate) fn from_raw(ptr: *mut T, kind: ObjectKind) -> Result<Self, MplError> {
        let ptr = NonNull::new(ptr).ok_or(MplError::Construction { object: kind })?;
        Ok(NativeHandle {
            ptr: Some(ptr),
            kind,
        })
    }

    /// Live pointer, or `UseAfterRelease` once released.
    pub(crate) fn get(&self) -> Result<*mut T, MplError> {
        self.ptr
            .map(NonNull::as_ptr)
            .ok_or(MplError::UseAfterRelease { object: self.kind })
    }

    /// Move the pointer out, leaving the handle void. Returns `None` if it
    /// was already void.
    pub(crate) fn take(&mut self) -> Option<NonNull<T>> {
        self.ptr.take()
    }

    pub(crate) fn is_live(&self) -> bool {
        self.ptr.is_some()
    }
}

impl<T> fmt::Debug for NativeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeHandle")
            .field("kind", &self.kind)
            .field("ptr", &self.ptr)
            .finish()
    }
}

/// Convert a path into the NUL-terminated name the engine expects.
pub(crate) fn path_to_cstring(path: &Path) -> Result<CString, MplError> {
    CString::new(path.as_os_str().as_encoded_bytes()).map_err(|_| MplError::InvalidPath {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_pointer_is_construction_error() {
        let result = NativeHandle::<u8>::from_raw(std::ptr::null_mut(), ObjectKind::Problem);
        assert_eq!(
            result.unwrap_err(),
            MplError::Construction {
                object: ObjectKind::Problem
            }
        );
    }

    #[test]
    fn test_take_voids_handle() {
        let raw = Box::into_raw(Box::new(7u32));
        let mut handle = NativeHandle::from_raw(raw, ObjectKind::Workspace).unwrap();
        assert!(handle.is_live());
        assert_eq!(handle.get().unwrap(), raw);

        let taken = handle.take().expect("first take yields the pointer");
        // SAFETY: the pointer came from Box::into_raw above and is taken once.
        drop(unsafe { Box::from_raw(taken.as_ptr()) });

        assert!(!handle.is_live());
        assert!(handle.take().is_none());
        assert_eq!(
            handle.get().unwrap_err(),
            MplError::UseAfterRelease {
                object: ObjectKind::Workspace
            }
        );
    }

    #[test]
    fn test_path_with_nul_is_rejected() {
        let err = path_to_cstring(Path::new("bad\0name.mod")).unwrap_err();
        assert_eq!(err.code(), "PATH_INVALID");
        assert!(path_to_cstring(Path::new("models/diet.mod")).is_ok());
    }
}
