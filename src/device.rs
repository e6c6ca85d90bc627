//! The boundary to the display controller.
//!
//! Everything this crate knows about the hardware flows through
//! [`ScanoutDevice`]: plane enumeration, per-object property tables and the
//! atomic commit ioctl. Implementations wrap a real DRM node (e.g. via the
//! `drm` crate) or a test double; the allocator is written purely against
//! this trait.

use rustix::io::Errno;

/// Identifier of a hardware plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaneId(pub u32);

/// Identifier of a CRTC.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CrtcId(pub u32);

/// Identifier of a mutable property, scoped to the device.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(pub u32);

/// Identifier of any KMS object a property write can target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawObjectId(pub u32);

impl From<PlaneId> for RawObjectId {
    fn from(id: PlaneId) -> Self {
        RawObjectId(id.0)
    }
}

impl From<CrtcId> for RawObjectId {
    fn from(id: CrtcId) -> Self {
        RawObjectId(id.0)
    }
}

/// Static description of one plane, as reported by the device.
#[derive(Clone, Debug)]
pub struct PlaneInfo {
    /// The plane's id.
    pub id: PlaneId,
    /// Bitmask of CRTC indices this plane may be driven by.
    pub possible_crtcs: u32,
}

/// One mutable property exposed by a KMS object.
///
/// The name vocabulary is hardware-defined (`"FB_ID"`, `"CRTC_ID"`, …); the
/// id is only meaningful on the device that reported it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyInfo {
    /// Device-assigned property id.
    pub id: PropertyId,
    /// Property name.
    pub name: String,
}

bitflags::bitflags! {
    /// Flags for [`ScanoutDevice::atomic_commit`].
    ///
    /// The values match the `DRM_MODE_ATOMIC_*` ABI constants.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct AtomicCommitFlags: u32 {
        /// Validate the staged configuration without applying it.
        const TEST_ONLY = 0x0100;
        /// Do not block until the commit completes.
        const NONBLOCK = 0x0200;
        /// Allow changes that require a full modeset.
        const ALLOW_MODESET = 0x0400;
    }
}

/// A single staged property write.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PropertyWrite {
    /// Object the write targets.
    pub object: RawObjectId,
    /// Property to write.
    pub property: PropertyId,
    /// Raw 64-bit property value.
    pub value: u64,
}

/// A position in an [`AtomicRequest`]'s staged writes.
///
/// Taken with [`AtomicRequest::cursor`] before a speculative group of writes
/// and handed back to [`AtomicRequest::set_cursor`] to undo exactly that
/// group. A plain value type; dropping it undoes nothing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RequestCursor(usize);

/// An atomic commit request under construction.
///
/// An ordered batch of property writes, submitted to the device as a single
/// all-or-nothing operation. Mirrors the libdrm atomic request object,
/// including its cursor-based rewind used for speculative staging.
#[derive(Clone, Debug, Default)]
pub struct AtomicRequest {
    writes: Vec<PropertyWrite>,
}

impl AtomicRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        Default::default()
    }

    /// Stages one property write at the end of the request.
    pub fn add_property(&mut self, object: impl Into<RawObjectId>, property: PropertyId, value: u64) {
        self.writes.push(PropertyWrite {
            object: object.into(),
            property,
            value,
        });
    }

    /// Marks the current end of the staged writes.
    pub fn cursor(&self) -> RequestCursor {
        RequestCursor(self.writes.len())
    }

    /// Drops every write staged after `cursor` was taken.
    ///
    /// Writes staged before the mark are untouched, so unrelated parts of the
    /// same request survive a speculative group being undone.
    pub fn set_cursor(&mut self, cursor: RequestCursor) {
        self.writes.truncate(cursor.0);
    }

    /// The staged writes, in staging order.
    pub fn writes(&self) -> &[PropertyWrite] {
        &self.writes
    }
}

/// Interface to the display controller.
///
/// All methods take `&self`; the device object may use interior mutability,
/// but callers serialize access (see the crate-level concurrency notes on
/// [`Display`](crate::Display)). Errors are reported as raw [`Errno`] values,
/// the way the kernel reports them; the crate maps them into its own error
/// taxonomy.
pub trait ScanoutDevice {
    /// Lists every plane id exposed by the device.
    fn plane_ids(&self) -> Result<Vec<PlaneId>, Errno>;

    /// Fetches the static description of one plane.
    fn plane_info(&self, plane: PlaneId) -> Result<PlaneInfo, Errno>;

    /// Lists the mutable properties of a KMS object.
    fn object_properties(&self, object: RawObjectId) -> Result<Vec<PropertyInfo>, Errno>;

    /// Submits `req` as one atomic operation.
    ///
    /// With [`AtomicCommitFlags::TEST_ONLY`] the device only validates the
    /// staged configuration. `EINVAL` and `ERANGE` mean the configuration is
    /// not satisfiable as staged (the allocator's retry signal); any other
    /// errno is a transport or driver failure.
    fn atomic_commit(&self, flags: AtomicCommitFlags, req: &AtomicRequest) -> Result<(), Errno>;
}
