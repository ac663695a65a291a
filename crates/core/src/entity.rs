use std::fmt;

use serde::{Deserialize, Serialize};

use crate::FacilityLevel;

/// Every record type the console manages.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Branch,
    Building,
    Floor,
    Hall,
    Row,
    Machine,
    Device,
    Order,
    Article,
    Operator,
    Bundle,
}

impl EntityKind {
    pub const ALL: [EntityKind; 11] = [
        EntityKind::Branch,
        EntityKind::Building,
        EntityKind::Floor,
        EntityKind::Hall,
        EntityKind::Row,
        EntityKind::Machine,
        EntityKind::Device,
        EntityKind::Order,
        EntityKind::Article,
        EntityKind::Operator,
        EntityKind::Bundle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Branch => "branch",
            EntityKind::Building => "building",
            EntityKind::Floor => "floor",
            EntityKind::Hall => "hall",
            EntityKind::Row => "row",
            EntityKind::Machine => "machine",
            EntityKind::Device => "device",
            EntityKind::Order => "order",
            EntityKind::Article => "article",
            EntityKind::Operator => "operator",
            EntityKind::Bundle => "bundle",
        }
    }

    /// Human label used in notices ("Failed to add Branch").
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Branch => "Branch",
            EntityKind::Building => "Building",
            EntityKind::Floor => "Floor",
            EntityKind::Hall => "Hall",
            EntityKind::Row => "Row",
            EntityKind::Machine => "Machine",
            EntityKind::Device => "Device",
            EntityKind::Order => "Order",
            EntityKind::Article => "Article",
            EntityKind::Operator => "Operator",
            EntityKind::Bundle => "Bundle",
        }
    }

    /// REST collection segment for this entity.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Branch => "branches",
            EntityKind::Building => "buildings",
            EntityKind::Floor => "floors",
            EntityKind::Hall => "halls",
            EntityKind::Row => "rows",
            EntityKind::Machine => "machines",
            EntityKind::Device => "devices",
            EntityKind::Order => "orders",
            EntityKind::Article => "articles",
            EntityKind::Operator => "operators",
            EntityKind::Bundle => "bundles",
        }
    }

    /// Facility levels this entity can be filtered by, ancestors first.
    ///
    /// A kind may skip levels but never lists a descendant before its
    /// ancestor.
    pub fn parent_levels(self) -> &'static [FacilityLevel] {
        use FacilityLevel::*;
        match self {
            EntityKind::Branch => &[Company],
            EntityKind::Building => &[Company, Branch],
            EntityKind::Floor => &[Company, Branch, Building],
            EntityKind::Hall => &[Company, Branch, Building, Floor],
            EntityKind::Row => &[Company, Branch, Building, Floor, Hall],
            EntityKind::Machine | EntityKind::Device => {
                &[Company, Branch, Building, Floor, Hall, Row]
            }
            EntityKind::Order => &[Company, Branch],
            EntityKind::Article => &[Company],
            EntityKind::Operator => &[Company, Branch],
            EntityKind::Bundle => &[Company, Branch],
        }
    }

    /// The tree level this entity IS, when it is part of the facility tree.
    pub fn facility_level(self) -> Option<FacilityLevel> {
        match self {
            EntityKind::Branch => Some(FacilityLevel::Branch),
            EntityKind::Building => Some(FacilityLevel::Building),
            EntityKind::Floor => Some(FacilityLevel::Floor),
            EntityKind::Hall => Some(FacilityLevel::Hall),
            EntityKind::Row => Some(FacilityLevel::Row),
            _ => None,
        }
    }

    /// Entities whose cached lists become stale when a record of `self`
    /// changes: the kind itself, plus every deeper tree kind and the leaf
    /// kinds for facility entities.
    pub fn affected_kinds(self) -> Vec<EntityKind> {
        let mut kinds = vec![self];
        if let Some(level) = self.facility_level() {
            for kind in EntityKind::ALL {
                if kind == self {
                    continue;
                }
                let deeper_tree_kind = kind
                    .facility_level()
                    .is_some_and(|other| level.strict_descendants().contains(&other));
                let leaf_kind = matches!(kind, EntityKind::Machine | EntityKind::Device);
                if deeper_tree_kind || leaf_kind {
                    kinds.push(kind);
                }
            }
        }
        kinds
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::EntityKind;
    use crate::FacilityLevel;

    #[test]
    fn parent_levels_are_in_tree_order() {
        for kind in EntityKind::ALL {
            let levels = kind.parent_levels();
            let positions: Vec<usize> = levels
                .iter()
                .map(|level| {
                    FacilityLevel::ORDER
                        .iter()
                        .position(|l| l == level)
                        .expect("known level")
                })
                .collect();
            assert!(
                positions.windows(2).all(|pair| pair[0] < pair[1]),
                "{kind} lists a descendant before its ancestor"
            );
        }
    }

    #[test]
    fn collections_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for kind in EntityKind::ALL {
            assert!(seen.insert(kind.collection()), "duplicate collection");
        }
    }

    #[test]
    fn branch_changes_reach_every_deeper_list() {
        let affected = EntityKind::Branch.affected_kinds();
        assert!(affected.contains(&EntityKind::Building));
        assert!(affected.contains(&EntityKind::Row));
        assert!(affected.contains(&EntityKind::Machine));
        assert!(affected.contains(&EntityKind::Device));
        assert!(!affected.contains(&EntityKind::Order));
    }

    #[test]
    fn non_tree_changes_stay_in_their_namespace() {
        assert_eq!(EntityKind::Order.affected_kinds(), vec![EntityKind::Order]);
    }
}
