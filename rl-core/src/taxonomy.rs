//! Device-type taxonomy
//!
//! Maps a device-type tag to its ordered category groups. Tables are built on
//! first use and never mutated afterwards. Families without a table of their own,
//! and tags that are not recognized at all, get the controller taxonomy.

use std::sync::OnceLock;

use rl_protocol::DeviceTypeTag;
use tracing::warn;

use crate::catalog::{self, CategoryGroup, SensorDescriptor};

/// Ordered category groups for one device family
#[derive(Debug, PartialEq)]
pub struct Taxonomy {
    family: DeviceTypeTag,
    groups: Vec<CategoryGroup>,
}

impl Taxonomy {
    fn build(family: DeviceTypeTag) -> Self {
        Self {
            family,
            groups: catalog::groups_for(family).unwrap_or_default(),
        }
    }

    /// Family whose table this is (controller for fallbacks)
    pub fn family(&self) -> DeviceTypeTag {
        self.family
    }

    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    /// Every descriptor, in category order
    pub fn descriptors(&self) -> impl Iterator<Item = &SensorDescriptor> {
        self.groups.iter().flat_map(|g| g.descriptors.iter())
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.descriptors.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct Tables {
    controller: Taxonomy,
    dcc: Taxonomy,
    battery: Taxonomy,
}

static TABLES: OnceLock<Tables> = OnceLock::new();

fn tables() -> &'static Tables {
    TABLES.get_or_init(|| Tables {
        controller: Taxonomy::build(DeviceTypeTag::Controller),
        dcc: Taxonomy::build(DeviceTypeTag::Dcc),
        battery: Taxonomy::build(DeviceTypeTag::Battery),
    })
}

/// Taxonomy for a parsed device type
pub fn resolve_tag(device_type: DeviceTypeTag) -> &'static Taxonomy {
    let tables = tables();
    match device_type {
        DeviceTypeTag::Dcc => &tables.dcc,
        DeviceTypeTag::Battery => &tables.battery,
        DeviceTypeTag::Controller | DeviceTypeTag::Inverter => &tables.controller,
    }
}

/// Taxonomy for a configured device-type string. Never fails.
pub fn resolve(device_type: &str) -> &'static Taxonomy {
    match device_type.parse::<DeviceTypeTag>() {
        Ok(tag) => resolve_tag(tag),
        Err(e) => {
            warn!(device_type, error = %e, "Unknown device type, using controller sensors");
            resolve_tag(DeviceTypeTag::Controller)
        }
    }
}
