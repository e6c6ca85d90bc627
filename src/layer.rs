//! Caller-side description of what to put on screen.

use crate::device::{CrtcId, PlaneId};

/// One property value a layer needs applied to whichever plane serves it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerProperty {
    /// Property name, looked up on the candidate plane during allocation.
    pub name: String,
    /// Raw 64-bit property value.
    pub value: u64,
}

/// A request to display one piece of content, independent of which hardware
/// plane ends up serving it.
///
/// A layer is a list of the properties it needs (`"FB_ID"`, `"CRTC_W"`, …)
/// plus, after a successful [`apply`](crate::Display::apply), the plane it
/// was bound to. Layers are owned by their [`Output`]; the crate only reads
/// the property list and annotates the binding.
#[derive(Clone, Debug, Default)]
pub struct Layer {
    props: Vec<LayerProperty>,
    plane: Option<PlaneId>,
}

impl Layer {
    /// Creates a layer with no properties.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets a property, replacing any previous value set under `name`.
    pub fn set_property(&mut self, name: &str, value: u64) {
        match self.props.iter_mut().find(|prop| prop.name == name) {
            Some(prop) => prop.value = value,
            None => self.props.push(LayerProperty {
                name: name.to_owned(),
                value,
            }),
        }
    }

    /// The layer's required properties, in the order they were first set.
    pub fn properties(&self) -> &[LayerProperty] {
        &self.props
    }

    /// The plane this layer was bound to by the last apply cycle, if any.
    pub fn plane(&self) -> Option<PlaneId> {
        self.plane
    }

    pub(crate) fn set_plane(&mut self, plane: Option<PlaneId>) {
        self.plane = plane;
    }
}

/// One CRTC and the layers to show on it, bottom to top.
///
/// Layer order is paint order, and doubles as allocation priority: earlier
/// layers get first pick of the free planes.
#[derive(Clone, Debug)]
pub struct Output {
    crtc: CrtcId,
    layers: Vec<Layer>,
}

impl Output {
    /// Creates an output driving `crtc`, with no layers.
    pub fn new(crtc: CrtcId) -> Self {
        Output {
            crtc,
            layers: Vec::new(),
        }
    }

    /// The CRTC this output drives.
    pub fn crtc(&self) -> CrtcId {
        self.crtc
    }

    /// Appends a layer on top of the existing ones.
    pub fn push_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// The output's layers, bottom to top.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Mutable access to the output's layers.
    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_property_replaces_by_name_and_keeps_order() {
        let mut layer = Layer::new();
        layer.set_property("FB_ID", 42);
        layer.set_property("CRTC_W", 1920);
        layer.set_property("FB_ID", 43);

        assert_eq!(
            layer.properties(),
            &[
                LayerProperty {
                    name: "FB_ID".into(),
                    value: 43,
                },
                LayerProperty {
                    name: "CRTC_W".into(),
                    value: 1920,
                },
            ]
        );
    }
}
