//! Display sessions and the first-fit plane allocator.

use tracing::{debug, info_span, trace};

use crate::commit::{CommitBuilder, TestResult};
use crate::device::{AtomicRequest, CrtcId, PlaneId, ScanoutDevice};
use crate::error::Error;
use crate::layer::{Layer, Output};
use crate::plane::{LayerSlot, Plane, Planes};

/// Soft signals from a completed apply cycle.
///
/// An apply cycle that ran to completion is a success even when some layers
/// found no plane; a display showing fewer layers than requested is degraded,
/// not broken. The caller decides how to react, e.g. by compositing the
/// unplaced layers in software.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Layers no free plane would accept, in allocation order.
    pub unplaced: Vec<LayerSlot>,
}

impl ApplyReport {
    /// `true` if every layer was bound to a plane.
    pub fn all_placed(&self) -> bool {
        self.unplaced.is_empty()
    }
}

/// A session on one scanout device.
///
/// Owns the device handle and the [`Planes`] discovered on it; both live
/// exactly as long as the session (planes are dropped before the handle).
///
/// Sessions are single-threaded: an [`apply`](Display::apply) call runs to
/// completion before the next one may be issued, and the [`AtomicRequest`]
/// it builds into is exclusively its own for the duration of the call.
#[derive(Debug)]
pub struct Display<D: ScanoutDevice> {
    planes: Planes,
    device: D,
    span: tracing::Span,
}

impl<D: ScanoutDevice> Display<D> {
    /// Opens a session on `device`, discovering every plane it exposes.
    pub fn new(device: D) -> Result<Self, Error> {
        let span = info_span!("drm_scanout");
        let _guard = span.enter();

        let planes = Planes::discover(&device)?;

        drop(_guard);
        Ok(Display {
            planes,
            device,
            span,
        })
    }

    /// The planes discovered on this device.
    pub fn planes(&self) -> &Planes {
        &self.planes
    }

    /// The underlying device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Ends the session, releasing all planes and handing back the device.
    pub fn release(self) -> D {
        self.device
    }

    /// Runs one allocation cycle, staging the result into `req`.
    ///
    /// Every plane is first disabled (framebuffer and CRTC cleared), then the
    /// layers of each output are bound to planes first-fit, in output order
    /// and layer z-order, with each candidate validated by a test-only
    /// commit. On success `req` holds the full staged configuration, ready
    /// for the caller to submit as a real commit; nothing has been applied to
    /// the hardware yet.
    ///
    /// Layers left without a plane are reported in
    /// [`ApplyReport::unplaced`]. An `Err` means a device failure; the
    /// request is left partially staged and must be discarded.
    pub fn apply(&mut self, outputs: &mut [Output], req: &mut AtomicRequest) -> Result<ApplyReport, Error> {
        let Display {
            planes,
            device,
            span,
        } = self;
        let _guard = span.enter();

        // Clear all bindings from the previous cycle. Bookkeeping only; the
        // hardware follows via the disable pass below.
        // TODO: incremental updates keeping the old configuration when possible
        for plane in planes.iter_mut() {
            plane.set_layer(None);
        }
        for output in outputs.iter_mut() {
            for layer in output.layers_mut() {
                layer.set_plane(None);
            }
        }

        let mut builder = CommitBuilder::new(&*device, req);

        // Disable every plane before building new mappings, so the states
        // explored during allocation never exceed the device's plane and
        // bandwidth budget on top of a stale configuration.
        for plane in planes.iter() {
            debug!("Disabling plane {:?}", plane.id());
            disable_plane(&mut builder, plane)?;
        }

        let mut report = ApplyReport::default();
        for (output_idx, output) in outputs.iter_mut().enumerate() {
            let crtc = output.crtc();
            for (layer_idx, layer) in output.layers_mut().iter_mut().enumerate() {
                let slot = LayerSlot {
                    output: output_idx,
                    layer: layer_idx,
                };
                match choose_plane(&mut builder, planes, crtc, layer, slot)? {
                    Some(plane) => layer.set_plane(Some(plane)),
                    None => {
                        debug!("No plane found for layer {:?}", slot);
                        report.unplaced.push(slot);
                    }
                }
            }
        }

        Ok(report)
    }
}

/// Stages the writes that take `plane` off screen.
fn disable_plane<D: ScanoutDevice>(builder: &mut CommitBuilder<'_, D>, plane: &Plane) -> Result<(), Error> {
    // FB_ID and CRTC_ID exist on every atomic driver; their absence is a
    // discovery failure, not a runtime condition.
    for name in ["FB_ID", "CRTC_ID"] {
        let prop = plane.props().lookup(name).ok_or(Error::UnknownProperty {
            plane: plane.id(),
            name,
        })?;
        builder.stage(plane.id(), prop.id, 0);
    }
    Ok(())
}

/// Stages `layer`'s CRTC binding and required properties onto `plane`.
///
/// Returns `false` if the plane lacks one of the required properties, which
/// disqualifies the candidate without consulting the hardware.
fn stage_layer<D: ScanoutDevice>(
    builder: &mut CommitBuilder<'_, D>,
    plane: &Plane,
    crtc: CrtcId,
    layer: &Layer,
) -> bool {
    let Some(crtc_prop) = plane.props().lookup("CRTC_ID") else {
        return false;
    };
    builder.stage(plane.id(), crtc_prop.id, u64::from(crtc.0));

    for prop in layer.properties() {
        let Some(plane_prop) = plane.props().lookup(&prop.name) else {
            trace!("Plane {:?} is missing the {} property", plane.id(), prop.name);
            return false;
        };
        builder.stage(plane.id(), plane_prop.id, prop.value);
    }
    true
}

/// First-fit search over the free planes for one layer.
///
/// Tries each free plane in discovery order: stage, test, and either bind or
/// rewind to the pre-candidate cursor. Returns the bound plane, `None` if no
/// plane accepted the layer, or the fatal error that aborted the search.
fn choose_plane<D: ScanoutDevice>(
    builder: &mut CommitBuilder<'_, D>,
    planes: &mut Planes,
    crtc: CrtcId,
    layer: &Layer,
    slot: LayerSlot,
) -> Result<Option<PlaneId>, Error> {
    let cursor = builder.cursor();

    for idx in 0..planes.len() {
        let plane = planes.index(idx);
        if plane.layer().is_some() {
            continue;
        }
        let plane_id = plane.id();

        trace!("Trying layer {:?} on plane {:?}", slot, plane_id);
        if !stage_layer(builder, plane, crtc, layer) {
            // The plane structurally lacks a capability the layer needs;
            // same outcome as a hardware rejection.
            builder.rewind(cursor);
            continue;
        }

        match builder.test() {
            Ok(TestResult::Accepted) => {
                debug!("Bound layer {:?} to plane {:?}", slot, plane_id);
                planes.index_mut(idx).set_layer(Some(slot));
                return Ok(Some(plane_id));
            }
            Ok(TestResult::Rejected) => {
                trace!("Plane {:?} rejected layer {:?}", plane_id, slot);
                builder.rewind(cursor);
            }
            Err(err) => {
                // Drop this candidate's speculative writes before unwinding,
                // so the request holds no state from a plane that was never
                // bound.
                builder.rewind(cursor);
                return Err(err);
            }
        }
    }

    Ok(None)
}
