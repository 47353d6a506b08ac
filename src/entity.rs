/// WEIRD Project
/// `File` entity.rs
/// `Description` Entity colliders, as seen by physics queries
/// `Author` TioT2
/// `Last changed` 16.10.2026

use std::collections::HashMap;

use crate::map::SectorId;
use crate::math::Vec3;

/// Entity identifier, owned by entity storage
#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct EntityId(pub u32);

bitflags::bitflags! {
    /// Entity kind mask
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EntityMask: u32 {
        const PLAYER = 1 << 0;
        const ACTOR = 1 << 1;
        const PROJECTILE = 1 << 2;
        const PICKUP = 1 << 3;
        const TRIGGER = 1 << 4;
    }
}

/// Vertical cylinder entity collider
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EntityCollider {
    pub id: EntityId,
    /// Single kind bit
    pub kind: EntityMask,
    /// Bottom center, in frame of the sector collider is listed in
    pub position: Vec3,
    pub radius: f32,
    pub height: f32,
} // struct EntityCollider

/// Sector to entities mapping, implemented by entity storage
pub trait SectorEntities {
    /// Colliders overlapping sector
    fn entities_in(&self, sector: SectorId) -> &[EntityCollider];
} // trait SectorEntities

/// World without entities
#[derive(Copy, Clone, Debug, Default)]
pub struct NoEntities;

impl SectorEntities for NoEntities {
    fn entities_in(&self, _sector: SectorId) -> &[EntityCollider] {
        &[]
    }
}

/// Plain sector to collider list map
#[derive(Clone, Debug, Default)]
pub struct SectorEntityMap {
    sectors: HashMap<SectorId, Vec<EntityCollider>>,
} // struct SectorEntityMap

impl SectorEntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collider adding function. Colliders spanning several sectors are added to each of them.
    pub fn insert(&mut self, sector: SectorId, collider: EntityCollider) {
        self.sectors.entry(sector).or_default().push(collider);
    }

    /// Entity from all sectors removing function
    pub fn remove(&mut self, entity: EntityId) {
        for colliders in self.sectors.values_mut() {
            colliders.retain(|collider| collider.id != entity);
        }
    }

    pub fn clear(&mut self) {
        self.sectors.clear();
    }
} // impl SectorEntityMap

impl SectorEntities for SectorEntityMap {
    fn entities_in(&self, sector: SectorId) -> &[EntityCollider] {
        self.sectors.get(&sector).map(Vec::as_slice).unwrap_or(&[])
    }
} // impl SectorEntities for SectorEntityMap

/// Entity part of cast filtering
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CastFilter {
    /// Entities that stop the cast
    pub colliders: EntityMask,
    /// Entities that are reported, but do not stop the cast
    pub report_only: EntityMask,
    /// Entity to skip (usually the caster itself)
    pub ignore: Option<EntityId>,
} // struct CastFilter

impl CastFilter {
    /// Map geometry only
    pub fn world() -> Self {
        Self::default()
    }

    pub fn solid(colliders: EntityMask) -> Self {
        Self { colliders, ..Self::default() }
    }

    pub fn ignoring(self, entity: EntityId) -> Self {
        Self { ignore: Some(entity), ..self }
    }

    pub(crate) fn accepts(&self, collider: &EntityCollider) -> bool {
        Some(collider.id) != self.ignore && (self.colliders | self.report_only).intersects(collider.kind)
    }
} // impl CastFilter

#[cfg(test)]
mod tests {
    use super::*;

    fn collider(id: u32, kind: EntityMask) -> EntityCollider {
        EntityCollider { id: EntityId(id), kind, position: Vec3::ZERO, radius: 0.5, height: 1.0 }
    }

    #[test]
    fn map_lists_by_sector() {
        let mut map = SectorEntityMap::new();
        map.insert(SectorId::new(0), collider(1, EntityMask::ACTOR));
        map.insert(SectorId::new(0), collider(2, EntityMask::PICKUP));
        map.insert(SectorId::new(1), collider(2, EntityMask::PICKUP));

        assert_eq!(map.entities_in(SectorId::new(0)).len(), 2);
        assert_eq!(map.entities_in(SectorId::new(7)).len(), 0);

        map.remove(EntityId(2));
        assert_eq!(map.entities_in(SectorId::new(0)).len(), 1);
        assert!(map.entities_in(SectorId::new(1)).is_empty());
    }

    #[test]
    fn filter_masks() {
        let filter = CastFilter {
            colliders: EntityMask::ACTOR,
            report_only: EntityMask::TRIGGER,
            ignore: Some(EntityId(1)),
        };

        assert!(!filter.accepts(&collider(1, EntityMask::ACTOR)));
        assert!(filter.accepts(&collider(2, EntityMask::ACTOR)));
        assert!(filter.accepts(&collider(3, EntityMask::TRIGGER)));
        assert!(!filter.accepts(&collider(4, EntityMask::PICKUP)));
        assert!(!CastFilter::world().accepts(&collider(5, EntityMask::all())));
    }
}

// file entity.rs
