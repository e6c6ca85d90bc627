//! Name-indexed property tables.

use tracing::debug;

use crate::device::PropertyInfo;

/// The mutable properties of one KMS object, in population order.
///
/// Property names are unique within one object; lookups are total and return
/// `None` instead of guessing when a name is absent. The table keeps the
/// order the device reported the properties in, so iteration is stable across
/// runs on the same device.
#[derive(Clone, Debug, Default)]
pub struct PropTable {
    props: Vec<PropertyInfo>,
}

impl PropTable {
    pub(crate) fn new(props: Vec<PropertyInfo>) -> Self {
        let mut table = PropTable {
            props: Vec::with_capacity(props.len()),
        };
        for prop in props {
            // Names are unique per object; keep the first occurrence if a
            // misbehaving driver reports one twice.
            if table.lookup(&prop.name).is_some() {
                debug!("Ignoring duplicate property '{}'", prop.name);
                continue;
            }
            table.props.push(prop);
        }
        table
    }

    /// Looks up a property by name.
    ///
    /// Returns `None` if the object does not expose `name`.
    pub fn lookup(&self, name: &str) -> Option<&PropertyInfo> {
        self.props.iter().find(|prop| prop.name == name)
    }

    /// Number of properties in the table.
    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// `true` if the object exposes no mutable properties.
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Iterates over the properties in population order.
    pub fn iter(&self) -> impl Iterator<Item = &PropertyInfo> {
        self.props.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::PropertyId;

    fn prop(id: u32, name: &str) -> PropertyInfo {
        PropertyInfo {
            id: PropertyId(id),
            name: name.into(),
        }
    }

    #[test]
    fn lookup_is_total() {
        let table = PropTable::new(vec![prop(1, "FB_ID"), prop(2, "CRTC_ID")]);
        assert_eq!(table.lookup("CRTC_ID").map(|p| p.id), Some(PropertyId(2)));
        assert_eq!(table.lookup("SRC_W"), None);
    }

    #[test]
    fn duplicate_names_keep_the_first_entry() {
        let table = PropTable::new(vec![prop(1, "FB_ID"), prop(2, "FB_ID")]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("FB_ID").map(|p| p.id), Some(PropertyId(1)));
    }
}
