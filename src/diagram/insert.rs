//! Site insertion: cavity discovery and rebuild.

use rustc_hash::FxHashSet;

use super::locate::Location;
use super::{Diagram, match_faces};
use crate::error::DiagramError;
use crate::geometry::{self, Point3};
use crate::site::{OwnerTag, SiteFlags, SiteId};
use crate::traversal::{Marks, flood};
use crate::vertex::{Corners, Vertex, VertexKey, VertexKind};

/// New vertices for one insertion, computed before anything is mutated.
struct Rebuild {
    cells: Vec<Vertex>,
    /// Live vertex across each new vertex's face opposite the new site, and the
    /// slot of that face on the live vertex.
    outside: Vec<(VertexKey, usize)>,
    /// Face index opposite the new site on each new vertex.
    apex: Vec<usize>,
    links: Vec<[Option<(usize, usize)>; 4]>,
}

impl Diagram {
    /// Inserts a site at `point` and returns its id.
    ///
    /// A point within tolerance of an existing site is not inserted again; the
    /// existing id is returned and the diagram is left untouched.
    ///
    /// # Errors
    ///
    /// Fails with [`DiagramError::OutsideBounds`] or [`DiagramError::NonFinitePoint`] for
    /// unusable points and with [`DiagramError::DegenerateTetrahedron`] or
    /// [`DiagramError::InconsistentCavity`] when tolerance makes the cavity unusable.
    /// A failed insertion leaves the diagram exactly as it was.
    ///
    /// The last two are not expected for well-separated input. A site on the plane
    /// of a cavity face also lies on the circumsphere of the vertex behind that
    /// face, and the face then falls inside the cavity; sites in the plane of a hull
    /// triangle are handled the same way. Only rounding beyond the tolerance can
    /// leave a new site flat against the cavity boundary.
    pub fn insert(&mut self, point: Point3) -> Result<SiteId, DiagramError> {
        self.insert_with_owner(point, OwnerTag::default())
    }

    pub fn insert_with_owner(&mut self, point: Point3, owner: OwnerTag) -> Result<SiteId, DiagramError> {
        self.check_point(&point)?;

        if let Some(existing) = self.pending_coincident(&point) {
            tracing::debug!(site = ?existing, "coincident with a pending site");
            return Ok(existing);
        }

        if !self.exists() {
            return Ok(self.insert_pending(point, owner));
        }

        let location = self.locate(&point)?;
        if let Some(existing) = self.coincident_site(location.vertex, &point) {
            tracing::debug!(site = ?existing, ?point, "coincident re-insertion ignored");
            return Ok(existing);
        }

        let id = self.register(point, owner);
        if let Err(err) = self.link_at(id, location) {
            self.sites.pop();
            tracing::debug!(?point, %err, "insertion rejected");
            return Err(err);
        }

        if !self.pending.is_empty() {
            self.retry_pending();
        }
        Ok(id)
    }

    fn pending_coincident(&self, point: &Point3) -> Option<SiteId> {
        self.pending
            .iter()
            .copied()
            .find(|&id| self.coincident(self.pos(id), point))
    }

    fn coincident_site(&self, start: VertexKey, point: &Point3) -> Option<SiteId> {
        let nearest = self.descend_to_nearest(start, point)?;
        self.coincident(self.pos(nearest), point).then_some(nearest)
    }

    /// Registers a site before the first tetrahedron exists and builds that
    /// tetrahedron as soon as four pending sites span a volume.
    fn insert_pending(&mut self, point: Point3, owner: OwnerTag) -> SiteId {
        let id = self.register(point, owner);
        self.sites[id.index()].flags.insert(SiteFlags::PENDING);
        self.pending.push(id);

        if let Some(quad) = self.spanning_quad() {
            match self.build_initial(quad) {
                Ok(()) => self.retry_pending(),
                Err(err) => tracing::warn!(%err, "failed to build the first tetrahedron"),
            }
        }
        id
    }

    fn spanning_quad(&self) -> Option<[SiteId; 4]> {
        let eps = self.eps();
        let &a = self.pending.first()?;
        let pa = *self.pos(a);
        let &b = self.pending.iter().find(|&&s| geometry::dist_sq(&pa, self.pos(s)) > eps * eps)?;
        let pb = *self.pos(b);
        let &c = self
            .pending
            .iter()
            .find(|&&s| geometry::line_distance(&pa, &pb, self.pos(s)) > eps)?;
        let pc = *self.pos(c);
        let &d = self
            .pending
            .iter()
            .find(|&&s| self.spans_volume(&[pa, pb, pc, *self.pos(s)]))?;
        Some([a, b, c, d])
    }

    /// Links every pending site it can; the rest stay pending for the next round.
    fn retry_pending(&mut self) {
        let queue = std::mem::take(&mut self.pending);
        for id in queue {
            let point = *self.pos(id);
            let result = self.locate(&point).and_then(|location| self.link_at(id, location));
            if let Err(err) = result {
                tracing::warn!(site = ?id, %err, "pending site left unlinked");
                self.pending.push(id);
            }
        }
    }

    /// Links a registered site into the triangulation, starting the cavity search
    /// at `location`.
    fn link_at(&mut self, id: SiteId, location: Location) -> Result<(), DiagramError> {
        let point = *self.pos(id);
        let cavity = self.find_cavity(location.vertex, &point)?;
        self.rebuild(id, &cavity)
    }

    /// True if `point` violates the vertex: strictly inside the circumsphere of a
    /// tetrahedron, or beyond the hull triangle of a sentinel.
    ///
    /// Points within tolerance of a sphere count as outside. A point in the plane
    /// of a hull triangle conflicts with the sentinel exactly when it conflicts
    /// with the tetrahedron behind that triangle.
    pub(crate) fn in_conflict(&self, key: VertexKey, point: &Point3) -> bool {
        let Some(vertex) = self.vertices.get(key) else {
            return false;
        };
        match &vertex.kind {
            VertexKind::Interior { centre, radius_sq, .. } => {
                geometry::power(centre, *radius_sq, point) > self.sphere_margin(*radius_sq)
            }
            VertexKind::Boundary { .. } => match self.beyond_hull_face(key, point) {
                Some(h) if h < -self.eps() => true,
                Some(h) if h <= self.eps() => self.in_conflict(vertex.neighbours[0], point),
                _ => false,
            },
        }
    }

    /// Flood-fills the set of vertices in conflict with `point`.
    pub(crate) fn find_cavity(&self, located: VertexKey, point: &Point3) -> Result<Vec<VertexKey>, DiagramError> {
        let seed = if self.in_conflict(located, point) {
            Some(located)
        } else {
            self.vertices
                .get(located)
                .and_then(|v| v.neighbours.iter().copied().find(|&n| self.in_conflict(n, point)))
        };

        let seed = match seed {
            Some(seed) => seed,
            None => {
                tracing::warn!(?point, "located vertex is not in conflict, scanning for a cavity seed");
                self.vertices
                    .keys()
                    .find(|&k| self.in_conflict(k, point))
                    .ok_or_else(|| DiagramError::InconsistentCavity {
                        reason: "no vertex conflicts with the new site".into(),
                    })?
            }
        };

        let mut marks = Marks::new();
        Ok(flood(
            seed,
            &mut marks,
            |k| self.vertex_neighbours(k),
            |k| self.in_conflict(k, point),
        ))
    }

    /// Replaces the vertices of `cavity` by a star of new vertices around site `id`.
    ///
    /// Nothing is mutated unless every new vertex is valid.
    pub(crate) fn rebuild(&mut self, id: SiteId, cavity: &[VertexKey]) -> Result<(), DiagramError> {
        let plan = self.plan_rebuild(id, cavity)?;
        self.commit(id, cavity, plan);
        Ok(())
    }

    fn plan_rebuild(&self, id: SiteId, cavity: &[VertexKey]) -> Result<Rebuild, DiagramError> {
        let dead: FxHashSet<VertexKey> = cavity.iter().copied().collect();
        let point = *self.pos(id);

        let mut cells = Vec::new();
        let mut outside = Vec::new();
        let mut apex = Vec::new();

        for &key in cavity {
            let vertex = &self.vertices[key];
            for f in 0..4 {
                let n = vertex.neighbours[f];
                if dead.contains(&n) {
                    continue;
                }
                let n_slot = self
                    .vertices
                    .get(n)
                    .and_then(|nv| nv.slot_of(key))
                    .ok_or(DiagramError::BrokenLink {
                        vertex: key,
                        neighbour: n,
                        face: f,
                    })?;
                let (cell, apex_slot) = self.cavity_cell(id, &point, key, f, n, n_slot)?;
                cells.push(cell);
                outside.push((n, n_slot));
                apex.push(apex_slot);
            }
        }

        if cells.is_empty() {
            return Err(DiagramError::InconsistentCavity {
                reason: "cavity has no boundary".into(),
            });
        }

        // every site of a deleted vertex has to survive on the cavity boundary
        let kept: FxHashSet<SiteId> = cells.iter().flat_map(|c| c.sites().iter().copied()).collect();
        for &key in cavity {
            if let Some(lost) = self.vertices[key].sites().iter().find(|&&s| !kept.contains(&s)) {
                return Err(DiagramError::InconsistentCavity {
                    reason: format!("site {lost:?} would be swallowed by the cavity"),
                });
            }
        }

        let corners: Vec<Corners> = cells.iter().map(|c| c.corners()).collect();
        let external: Vec<Option<usize>> = apex.iter().map(|&a| Some(a)).collect();
        let links = match_faces(&corners, &external)?;

        Ok(Rebuild {
            cells,
            outside,
            apex,
            links,
        })
    }

    /// Builds the new vertex joining site `id` to face `f` of the dead vertex `dead`,
    /// whose live neighbour across that face is `live` (at slot `live_slot`).
    fn cavity_cell(
        &self,
        id: SiteId,
        point: &Point3,
        dead: VertexKey,
        f: usize,
        live: VertexKey,
        live_slot: usize,
    ) -> Result<(Vertex, usize), DiagramError> {
        let face = self.vertices[dead].face(f);
        let degenerate = || DiagramError::DegenerateTetrahedron { face };
        let real: Vec<SiteId> = face.iter().flatten().copied().collect();

        match real.as_slice() {
            &[a, b, c] => {
                let (pa, pb, pc) = (*self.pos(a), *self.pos(b), *self.pos(c));
                let h = geometry::face_height(&pa, &pb, &pc, point).ok_or_else(degenerate)?;
                if h.abs() <= self.eps() {
                    return Err(degenerate());
                }

                // the new site must sit on the cavity side of the face
                let (reference, same_side) = match &self.vertices[dead].kind {
                    VertexKind::Interior { sites, .. } => (sites[f], true),
                    VertexKind::Boundary { .. } => match &self.vertices[live].kind {
                        VertexKind::Interior { sites, .. } => (sites[live_slot], false),
                        VertexKind::Boundary { .. } => return Err(degenerate()),
                    },
                };
                let h_ref = geometry::face_height(&pa, &pb, &pc, self.pos(reference)).ok_or_else(degenerate)?;
                if (h.signum() == h_ref.signum()) != same_side {
                    return Err(degenerate());
                }

                let (centre, radius_sq) =
                    geometry::circumsphere(point, &pa, &pb, &pc).ok_or_else(degenerate)?;
                Ok((Vertex::interior([id, a, b, c], centre, radius_sq), 0))
            }
            &[a, b] => {
                if geometry::line_distance(self.pos(a), self.pos(b), point) <= self.eps() {
                    return Err(degenerate());
                }
                Ok((Vertex::boundary([id, a, b]), 1))
            }
            _ => Err(degenerate()),
        }
    }

    fn commit(&mut self, id: SiteId, cavity: &[VertexKey], plan: Rebuild) {
        let Rebuild {
            cells,
            outside,
            apex,
            links,
        } = plan;

        let keys: Vec<VertexKey> = cells.into_iter().map(|c| self.vertices.insert(c)).collect();
        for (i, &key) in keys.iter().enumerate() {
            let (n, n_slot) = outside[i];
            self.vertices[key].neighbours[apex[i]] = n;
            self.vertices[n].neighbours[n_slot] = key;
            for f in 0..4 {
                if let Some((j, _)) = links[i][f] {
                    self.vertices[key].neighbours[f] = keys[j];
                }
            }
        }

        let mut hull_candidates = Vec::new();
        for &key in cavity {
            match self.vertices.remove(key) {
                Some(v) if v.is_sentinel() => hull_candidates.extend_from_slice(v.sites()),
                _ => {}
            }
        }

        let mut on_hull = FxHashSet::default();
        for &key in &keys {
            let vertex = &self.vertices[key];
            let sentinel = vertex.is_sentinel();
            for &s in vertex.sites() {
                let site = &mut self.sites[s.index()];
                site.vertex = Some(key);
                if sentinel {
                    site.flags.insert(SiteFlags::HULL);
                    on_hull.insert(s);
                }
            }
        }

        for s in hull_candidates {
            if !on_hull.contains(&s) {
                let still_on_hull = self.star(s).iter().any(|&k| self.vertices[k].is_sentinel());
                self.sites[s.index()].flags.set(SiteFlags::HULL, still_on_hull);
            }
        }

        self.sites[id.index()].flags.remove(SiteFlags::PENDING);
        self.last = keys
            .iter()
            .copied()
            .find(|&k| !self.vertices[k].is_sentinel())
            .or_else(|| keys.first().copied());

        tracing::debug!(
            site = ?id,
            removed = cavity.len(),
            created = keys.len(),
            "linked site"
        );
    }
}
