//! Plane registry and discovery.

use tracing::{debug, trace};

use crate::device::{PlaneId, ScanoutDevice};
use crate::error::{AccessError, Error};
use crate::property::PropTable;

/// Position of a layer within the outputs passed to
/// [`Display::apply`](crate::Display::apply): indices into the output slice
/// and into that output's layer list.
///
/// Bindings are recorded as index pairs rather than references, so neither
/// side of a plane/layer binding can dangle when the other is dropped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LayerSlot {
    /// Index of the output in the slice passed to `apply`.
    pub output: usize,
    /// Index of the layer within that output.
    pub layer: usize,
}

/// One hardware scanout resource.
///
/// A plane can display one buffer at a time. It is owned by its [`Planes`]
/// registry; the layer binding is bookkeeping for the current apply cycle and
/// is cleared at the start of the next one.
#[derive(Debug)]
pub struct Plane {
    id: PlaneId,
    possible_crtcs: u32,
    props: PropTable,
    layer: Option<LayerSlot>,
}

impl Plane {
    /// The plane's id.
    pub fn id(&self) -> PlaneId {
        self.id
    }

    /// Bitmask of CRTC indices this plane may be driven by.
    pub fn possible_crtcs(&self) -> u32 {
        self.possible_crtcs
    }

    /// The plane's mutable properties.
    pub fn props(&self) -> &PropTable {
        &self.props
    }

    /// The layer bound to this plane by the last apply cycle, if any.
    pub fn layer(&self) -> Option<LayerSlot> {
        self.layer
    }

    pub(crate) fn set_layer(&mut self, layer: Option<LayerSlot>) {
        self.layer = layer;
    }
}

/// Every plane of a device, in discovery order.
///
/// Discovery order is the device's enumeration order and stays stable for the
/// lifetime of the registry; the allocator's first-fit search and
/// [`Planes::free`] both iterate in it.
#[derive(Debug)]
pub struct Planes {
    planes: Vec<Plane>,
}

impl Planes {
    /// Discovers every plane on `device`, with its property table.
    ///
    /// All-or-nothing: if any single plane's metadata cannot be fetched the
    /// whole discovery fails, since a partially populated registry cannot
    /// safely drive allocation.
    pub fn discover<D: ScanoutDevice>(device: &D) -> Result<Self, Error> {
        let ids = device.plane_ids().map_err(|source| AccessError {
            errmsg: "Error loading planes",
            source,
        })?;

        let mut planes: Vec<Plane> = Vec::with_capacity(ids.len());
        for id in ids {
            if planes.iter().any(|plane| plane.id == id) {
                return Err(Error::DuplicatePlane(id));
            }

            let info = device.plane_info(id).map_err(|source| AccessError {
                errmsg: "Error loading plane info",
                source,
            })?;
            let props = device
                .object_properties(id.into())
                .map_err(|source| AccessError {
                    errmsg: "Error loading plane properties",
                    source,
                })?;

            trace!("Discovered plane {:?} with {} properties", id, props.len());
            planes.push(Plane {
                id: info.id,
                possible_crtcs: info.possible_crtcs,
                props: PropTable::new(props),
                layer: None,
            });
        }

        debug!("Discovered {} planes", planes.len());
        Ok(Planes { planes })
    }

    /// Number of planes in the registry.
    pub fn len(&self) -> usize {
        self.planes.len()
    }

    /// `true` if the device exposed no planes.
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    /// Iterates over all planes in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Plane> {
        self.planes.iter()
    }

    /// Iterates over the planes with no layer bound, in discovery order.
    pub fn free(&self) -> impl Iterator<Item = &Plane> {
        self.planes.iter().filter(|plane| plane.layer.is_none())
    }

    /// Looks up a plane by id.
    pub fn by_id(&self, id: PlaneId) -> Option<&Plane> {
        self.planes.iter().find(|plane| plane.id == id)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Plane> {
        self.planes.iter_mut()
    }

    pub(crate) fn index(&self, idx: usize) -> &Plane {
        &self.planes[idx]
    }

    pub(crate) fn index_mut(&mut self, idx: usize) -> &mut Plane {
        &mut self.planes[idx]
    }
}
