use crate::error::Result;

/// Host-side capture and apply of session state.
///
/// The blob format belongs entirely to the host; [`crate::SessionManager`]
/// only stores and returns the bytes.
pub trait SessionHost {
    /// Serialize the host's current open-file/window state.
    fn capture(&self) -> Result<Vec<u8>>;

    /// Reinstate state previously produced by [`SessionHost::capture`].
    fn apply(&self, blob: &[u8]) -> Result<()>;
}
