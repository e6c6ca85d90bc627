use rustix::io::Errno;

use crate::device::PlaneId;

/// Errors thrown by [`Display`](crate::Display) construction and
/// [`Display::apply`](crate::Display::apply).
///
/// All variants are fatal for the operation that returned them. The two
/// expected, recoverable outcomes of allocation — a plane rejecting a staged
/// configuration and a layer ending up without a plane — are not errors and
/// never surface here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The device returned an unexpected error for a request.
    #[error("Device access error: {0}")]
    Access(#[from] AccessError),
    /// A plane is missing a property required to drive it at all.
    ///
    /// `FB_ID` and `CRTC_ID` exist on every atomic driver; hitting this means
    /// discovery produced a plane this crate cannot manage.
    #[error("Plane {plane:?} is missing the required property '{name}'")]
    UnknownProperty {
        /// Plane whose property table was incomplete.
        plane: PlaneId,
        /// Name of the missing property.
        name: &'static str,
    },
    /// The device reported the same plane id twice during discovery.
    #[error("Plane {0:?} was reported twice during discovery")]
    DuplicatePlane(PlaneId),
}

/// An underlying device error, with context on the failed operation.
#[derive(Debug, thiserror::Error)]
#[error("{errmsg} ({source})")]
pub struct AccessError {
    /// Short description of the operation that failed.
    pub errmsg: &'static str,
    /// Errno reported by the device.
    pub source: Errno,
}
