use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{FacilityError, FacilityResult, RecordId};

/// The fixed ancestor ordering used to scope every resource in the console.
///
/// Machines and devices are leaf entities addressed by the full chain; they
/// are not levels of their own.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilityLevel {
    Company,
    Branch,
    Building,
    Floor,
    Hall,
    Row,
}

impl FacilityLevel {
    /// Tree order, ancestors first.
    pub const ORDER: [FacilityLevel; 6] = [
        FacilityLevel::Company,
        FacilityLevel::Branch,
        FacilityLevel::Building,
        FacilityLevel::Floor,
        FacilityLevel::Hall,
        FacilityLevel::Row,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FacilityLevel::Company => "company",
            FacilityLevel::Branch => "branch",
            FacilityLevel::Building => "building",
            FacilityLevel::Floor => "floor",
            FacilityLevel::Hall => "hall",
            FacilityLevel::Row => "row",
        }
    }

    /// Query-string parameter carrying this level's id.
    pub fn query_param(self) -> &'static str {
        match self {
            FacilityLevel::Company => "companyId",
            FacilityLevel::Branch => "branchId",
            FacilityLevel::Building => "buildingId",
            FacilityLevel::Floor => "floorId",
            FacilityLevel::Hall => "hallId",
            FacilityLevel::Row => "rowId",
        }
    }

    fn index(self) -> usize {
        Self::ORDER
            .iter()
            .position(|level| *level == self)
            .unwrap_or(0)
    }

    pub fn parent(self) -> Option<FacilityLevel> {
        let idx = self.index();
        if idx == 0 {
            None
        } else {
            Some(Self::ORDER[idx - 1])
        }
    }

    /// Every level strictly below `self` in tree order.
    pub fn strict_descendants(self) -> &'static [FacilityLevel] {
        &Self::ORDER[self.index() + 1..]
    }
}

impl fmt::Display for FacilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered ancestor chain attached to a leaf resource (machine, device).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityPath {
    pub branch_id: Option<RecordId>,
    pub building_id: Option<RecordId>,
    pub floor_id: Option<RecordId>,
    pub hall_id: Option<RecordId>,
    pub row_id: Option<RecordId>,
}

impl FacilityPath {
    pub fn level(&self, level: FacilityLevel) -> Option<RecordId> {
        match level {
            FacilityLevel::Company => None,
            FacilityLevel::Branch => self.branch_id,
            FacilityLevel::Building => self.building_id,
            FacilityLevel::Floor => self.floor_id,
            FacilityLevel::Hall => self.hall_id,
            FacilityLevel::Row => self.row_id,
        }
    }

    /// A path is valid only if every non-empty level's parent is non-empty.
    pub fn validate(&self) -> FacilityResult<()> {
        for level in &FacilityLevel::ORDER[2..] {
            let parent = level.parent().expect("non-root level has a parent");
            if self.level(*level).is_some() && self.level(parent).is_none() {
                return Err(FacilityError::PathGap {
                    level: *level,
                    missing: parent,
                });
            }
        }
        Ok(())
    }
}

/// Live per-level selections of one screen's filters.
///
/// The cascade rule lives here: assigning a level clears every strictly
/// lower level, so a descendant can never point under a stale ancestor.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FacilitySelection {
    pub company: Option<RecordId>,
    pub branch: Option<RecordId>,
    pub building: Option<RecordId>,
    pub floor: Option<RecordId>,
    pub hall: Option<RecordId>,
    pub row: Option<RecordId>,
}

impl FacilitySelection {
    pub fn get(&self, level: FacilityLevel) -> Option<RecordId> {
        match level {
            FacilityLevel::Company => self.company,
            FacilityLevel::Branch => self.branch,
            FacilityLevel::Building => self.building,
            FacilityLevel::Floor => self.floor,
            FacilityLevel::Hall => self.hall,
            FacilityLevel::Row => self.row,
        }
    }

    fn slot_mut(&mut self, level: FacilityLevel) -> &mut Option<RecordId> {
        match level {
            FacilityLevel::Company => &mut self.company,
            FacilityLevel::Branch => &mut self.branch,
            FacilityLevel::Building => &mut self.building,
            FacilityLevel::Floor => &mut self.floor,
            FacilityLevel::Hall => &mut self.hall,
            FacilityLevel::Row => &mut self.row,
        }
    }

    /// Assign one level and clear every strictly lower level.
    pub fn assign(&mut self, level: FacilityLevel, value: Option<RecordId>) {
        *self.slot_mut(level) = value;
        for below in level.strict_descendants() {
            *self.slot_mut(*below) = None;
        }
    }

    /// Build the full chain from a stored resource path in one value, for
    /// edit-mode seeding. The path is validated first so a gapped chain is
    /// rejected instead of silently producing an inconsistent selection.
    pub fn from_path(
        company: Option<RecordId>,
        path: &FacilityPath,
    ) -> FacilityResult<Self> {
        path.validate()?;
        Ok(Self {
            company,
            branch: path.branch_id,
            building: path.building_id,
            floor: path.floor_id,
            hall: path.hall_id,
            row: path.row_id,
        })
    }
}
