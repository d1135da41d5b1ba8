use serde::{Deserialize, Serialize};

use crate::geometry::Point3;
use crate::vertex::VertexKey;

/// Index of a site in the diagram's registry.
///
/// Sites are never removed, so an id stays valid for the whole life of the diagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SiteId(pub u32);

impl SiteId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Opaque reference to the solid-model entity a site was sampled from.
///
/// The diagram never interprets it; it is stored and dumped as is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerTag {
    /// Identifier of the owning set.
    pub set: u64,
    /// Identifier of the owning model.
    pub model: u64,
}

/// Housekeeping bits of a site.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteFlags(u8);

impl SiteFlags {
    /// The site is a corner of the convex hull of all linked sites.
    pub const HULL: SiteFlags = SiteFlags(1);
    /// The site is registered but not yet part of the triangulation.
    pub const PENDING: SiteFlags = SiteFlags(1 << 1);

    pub const fn empty() -> Self {
        SiteFlags(0)
    }

    #[inline]
    pub fn contains(self, other: SiteFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: SiteFlags) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: SiteFlags) {
        self.0 &= !other.0;
    }

    #[inline]
    pub fn set(&mut self, other: SiteFlags, on: bool) {
        if on {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

/// A Delaunay point of the diagram.
#[derive(Clone, Debug, PartialEq)]
pub struct Site {
    pub position: Point3,
    pub owner: OwnerTag,
    pub flags: SiteFlags,
    /// One vertex that has this site as a corner, refreshed on every insertion
    /// that touches the site. `None` while the site is pending.
    pub(crate) vertex: Option<VertexKey>,
}

impl Site {
    pub(crate) fn new(position: Point3, owner: OwnerTag) -> Self {
        Self {
            position,
            owner,
            flags: SiteFlags::empty(),
            vertex: None,
        }
    }

    pub fn is_on_hull(&self) -> bool {
        self.flags.contains(SiteFlags::HULL)
    }

    pub fn is_pending(&self) -> bool {
        self.flags.contains(SiteFlags::PENDING)
    }

    /// Entry vertex into this site's territory.
    pub fn vertex(&self) -> Option<VertexKey> {
        self.vertex
    }
}
