//! Commit building and validate-only testing.

use rustix::io::Errno;
use tracing::trace;

use crate::device::{
    AtomicCommitFlags, AtomicRequest, PropertyId, RawObjectId, RequestCursor, ScanoutDevice,
};
use crate::error::{AccessError, Error};

/// Outcome of a validate-only commit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum TestResult {
    /// The hardware accepted the staged configuration.
    Accepted,
    /// The staged configuration is not satisfiable as-is. Expected and
    /// retriable; the caller rewinds and tries the next plane.
    Rejected,
}

/// Stages property writes into an atomic request and asks the device to
/// validate them, distinguishing "the hardware turned this configuration
/// down" from "the request mechanism itself failed".
#[derive(Debug)]
pub(crate) struct CommitBuilder<'a, D> {
    device: &'a D,
    req: &'a mut AtomicRequest,
}

impl<'a, D: ScanoutDevice> CommitBuilder<'a, D> {
    pub(crate) fn new(device: &'a D, req: &'a mut AtomicRequest) -> Self {
        CommitBuilder { device, req }
    }

    pub(crate) fn stage(&mut self, object: impl Into<RawObjectId>, property: PropertyId, value: u64) {
        let object = object.into();
        trace!("Staging {:?} {:?} = {}", object, property, value);
        self.req.add_property(object, property, value);
    }

    pub(crate) fn cursor(&self) -> RequestCursor {
        self.req.cursor()
    }

    pub(crate) fn rewind(&mut self, cursor: RequestCursor) {
        self.req.set_cursor(cursor);
    }

    /// Validate-only commit of everything staged so far.
    pub(crate) fn test(&self) -> Result<TestResult, Error> {
        match self.device.atomic_commit(AtomicCommitFlags::TEST_ONLY, self.req) {
            Ok(()) => Ok(TestResult::Accepted),
            Err(err) if err == Errno::INVAL || err == Errno::RANGE => Ok(TestResult::Rejected),
            Err(source) => Err(AccessError {
                errmsg: "Atomic test commit failed",
                source,
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDevice;

    #[test]
    fn rejection_errnos_are_not_errors() {
        let mut device = MockDevice::new();
        let plane = device.add_plane(10, &["FB_ID", "CRTC_ID"]);
        device.reject_plane(plane);
        let fb = device.prop_id(plane, "FB_ID");

        let mut req = AtomicRequest::new();
        let mut builder = CommitBuilder::new(&device, &mut req);
        builder.stage(plane, fb, 42);

        assert_eq!(builder.test().unwrap(), TestResult::Rejected);
    }

    #[test]
    fn transport_errnos_are_fatal() {
        let mut device = MockDevice::new();
        let plane = device.add_plane(10, &["FB_ID", "CRTC_ID"]);
        let fb = device.prop_id(plane, "FB_ID");
        device.fail_next_commit(Errno::NODEV);

        let mut req = AtomicRequest::new();
        let mut builder = CommitBuilder::new(&device, &mut req);
        builder.stage(plane, fb, 42);

        assert!(matches!(builder.test(), Err(Error::Access(_))));
    }
}
