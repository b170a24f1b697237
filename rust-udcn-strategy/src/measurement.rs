//! Per-prefix measurement record (§3), pinned by the measurement accessor
//! under [`crate::collaborators::MEASUREMENT_TYPE_ID`].

use rust_udcn_common::types::FaceId;

use crate::requirements::RequirementSet;

/// The record a strategy attaches to a FIB-prefix scratch slot: the current
/// working face plus the parsed per-prefix requirement bounds.
///
/// The original's per-prefix `faceInfoMap` is dead code in the source
/// strategies (populated, never read) and is intentionally not carried
/// forward; per-face estimators live on the strategy's own
/// `faceInfoTable` instead (§3), not here.
#[derive(Debug, Clone)]
pub struct PrefixMeasurement {
    current_working_face: Option<FaceId>,
    requirements: RequirementSet,
}

impl PrefixMeasurement {
    pub fn new(requirements: RequirementSet) -> Self {
        Self {
            current_working_face: None,
            requirements,
        }
    }

    pub fn working_face(&self) -> Option<FaceId> {
        self.current_working_face
    }

    pub fn set_working_face(&mut self, face: FaceId) {
        self.current_working_face = Some(face);
    }

    pub fn requirements(&self) -> &RequirementSet {
        &self.requirements
    }

    pub fn requirements_mut(&mut self) -> &mut RequirementSet {
        &mut self.requirements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_no_working_face() {
        let m = PrefixMeasurement::new(RequirementSet::all_supported());
        assert_eq!(m.working_face(), None);
    }

    #[test]
    fn working_face_updates() {
        let mut m = PrefixMeasurement::new(RequirementSet::all_supported());
        m.set_working_face(FaceId(7));
        assert_eq!(m.working_face(), Some(FaceId(7)));
    }
}
