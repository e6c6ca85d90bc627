//! In-memory stand-in for a scanout device.
//!
//! Lets the unit tests script plane tables, per-plane rejections and
//! transport failures without any hardware, and records every commit the
//! allocator issues for later inspection.

use std::cell::RefCell;

use rustix::io::Errno;

use crate::device::{
    AtomicCommitFlags, AtomicRequest, PlaneId, PlaneInfo, PropertyId, PropertyInfo, PropertyWrite,
    RawObjectId, ScanoutDevice,
};

#[derive(Debug)]
struct MockPlane {
    id: PlaneId,
    props: Vec<PropertyInfo>,
}

#[derive(Debug, Default)]
pub(crate) struct MockDevice {
    planes: Vec<MockPlane>,
    next_prop_id: u32,
    rejected_planes: Vec<PlaneId>,
    fail_properties_for: Option<PlaneId>,
    fail_next_commit: RefCell<Option<Errno>>,
    commits: RefCell<Vec<(AtomicCommitFlags, Vec<PropertyWrite>)>>,
}

impl MockDevice {
    pub(crate) fn new() -> Self {
        MockDevice {
            next_prop_id: 100,
            ..Default::default()
        }
    }

    /// Registers a plane with the given property names. Property ids are
    /// assigned sequentially across the whole device, as real drivers do.
    pub(crate) fn add_plane(&mut self, id: u32, props: &[&str]) -> PlaneId {
        let props = props
            .iter()
            .map(|name| {
                let id = PropertyId(self.next_prop_id);
                self.next_prop_id += 1;
                PropertyInfo {
                    id,
                    name: (*name).to_owned(),
                }
            })
            .collect();
        self.planes.push(MockPlane {
            id: PlaneId(id),
            props,
        });
        PlaneId(id)
    }

    /// The id the device assigned to `name` on `plane`. Panics if absent.
    pub(crate) fn prop_id(&self, plane: PlaneId, name: &str) -> PropertyId {
        self.planes
            .iter()
            .find(|p| p.id == plane)
            .and_then(|p| p.props.iter().find(|prop| prop.name == name))
            .unwrap_or_else(|| panic!("no property {name} on {plane:?}"))
            .id
    }

    /// Makes every test commit that enables `plane` fail with `EINVAL`.
    pub(crate) fn reject_plane(&mut self, plane: PlaneId) {
        self.rejected_planes.push(plane);
    }

    /// Makes property discovery fail for `plane`.
    pub(crate) fn fail_properties_for(&mut self, plane: PlaneId) {
        self.fail_properties_for = Some(plane);
    }

    /// Makes the next atomic commit fail with `errno`, whatever its flags.
    pub(crate) fn fail_next_commit(&self, errno: Errno) {
        *self.fail_next_commit.borrow_mut() = Some(errno);
    }

    /// Every commit issued so far, with its flags and a snapshot of the
    /// staged writes.
    pub(crate) fn commits(&self) -> Vec<(AtomicCommitFlags, Vec<PropertyWrite>)> {
        self.commits.borrow().clone()
    }

    fn enables_rejected_plane(&self, req: &AtomicRequest) -> bool {
        req.writes().iter().any(|write| {
            write.value != 0
                && self
                    .rejected_planes
                    .iter()
                    .any(|plane| RawObjectId::from(*plane) == write.object)
        })
    }
}

impl ScanoutDevice for MockDevice {
    fn plane_ids(&self) -> Result<Vec<PlaneId>, Errno> {
        Ok(self.planes.iter().map(|plane| plane.id).collect())
    }

    fn plane_info(&self, plane: PlaneId) -> Result<PlaneInfo, Errno> {
        self.planes
            .iter()
            .find(|p| p.id == plane)
            .map(|p| PlaneInfo {
                id: p.id,
                possible_crtcs: 0x1,
            })
            .ok_or(Errno::NOENT)
    }

    fn object_properties(&self, object: RawObjectId) -> Result<Vec<PropertyInfo>, Errno> {
        if self.fail_properties_for == Some(PlaneId(object.0)) {
            return Err(Errno::IO);
        }
        self.planes
            .iter()
            .find(|p| RawObjectId::from(p.id) == object)
            .map(|p| p.props.clone())
            .ok_or(Errno::NOENT)
    }

    fn atomic_commit(&self, flags: AtomicCommitFlags, req: &AtomicRequest) -> Result<(), Errno> {
        self.commits
            .borrow_mut()
            .push((flags, req.writes().to_vec()));

        if let Some(errno) = self.fail_next_commit.borrow_mut().take() {
            return Err(errno);
        }
        if self.enables_rejected_plane(req) {
            return Err(Errno::INVAL);
        }
        Ok(())
    }
}
