//! Class mapping files.
//!
//! A mapping file is a JSON object keyed by the old class id (as a string):
//!
//! ```json
//! { "0": 5, "1": "pedestrian", "2": { "id": 7, "name": "truck" } }
//! ```
//!
//! YOLO rewriting only accepts plain ids; COCO remapping accepts all three.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::KwtoolsError;
use crate::labels::ClassId;

/// What an old class id becomes.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MappingTarget {
    /// New numeric id.
    Id(u64),
    /// Rename only; the id stays.
    Name(String),
    /// New id, and optionally a new name.
    IdAndName {
        id: u64,
        #[serde(default)]
        name: Option<String>,
    },
}

impl MappingTarget {
    /// The new id, if this target changes it.
    pub fn new_id(&self) -> Option<u64> {
        match self {
            MappingTarget::Id(id) | MappingTarget::IdAndName { id, .. } => Some(*id),
            MappingTarget::Name(_) => None,
        }
    }

    /// The new name, if this target changes it.
    pub fn new_name(&self) -> Option<&str> {
        match self {
            MappingTarget::Name(name) => Some(name),
            MappingTarget::IdAndName { name, .. } => name.as_deref(),
            MappingTarget::Id(_) => None,
        }
    }
}

/// Old class id to [`MappingTarget`], built once and applied read-only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassMapping {
    source: Option<PathBuf>,
    entries: BTreeMap<u64, MappingTarget>,
}

/// Plain id-to-id mapping for YOLO label files.
pub type YoloClassMap = BTreeMap<ClassId, ClassId>;

impl ClassMapping {
    pub fn new(entries: BTreeMap<u64, MappingTarget>) -> Self {
        Self {
            source: None,
            entries,
        }
    }

    /// Load a mapping file.
    pub fn load(path: &Path) -> Result<Self, KwtoolsError> {
        let text = fs::read_to_string(path).map_err(|source| KwtoolsError::MappingRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text, path)
    }

    /// Parse mapping JSON; `origin` is only used in error messages.
    pub fn from_json_str(json: &str, origin: &Path) -> Result<Self, KwtoolsError> {
        let raw: BTreeMap<String, MappingTarget> =
            serde_json::from_str(json).map_err(|source| KwtoolsError::MappingParse {
                path: origin.to_path_buf(),
                source,
            })?;

        let mut entries = BTreeMap::new();
        for (key, target) in raw {
            let old_id = key
                .trim()
                .parse::<u64>()
                .map_err(|_| KwtoolsError::MappingInvalid {
                    path: origin.to_path_buf(),
                    message: format!("key '{}' is not a non-negative integer class id", key),
                })?;
            if entries.insert(old_id, target).is_some() {
                return Err(KwtoolsError::MappingInvalid {
                    path: origin.to_path_buf(),
                    message: format!("class id {} is mapped more than once", old_id),
                });
            }
        }

        Ok(Self {
            source: Some(origin.to_path_buf()),
            entries,
        })
    }

    pub fn get(&self, old_id: u64) -> Option<&MappingTarget> {
        self.entries.get(&old_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &MappingTarget)> {
        self.entries.iter().map(|(id, target)| (*id, target))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Narrow to an id-only mapping for YOLO files.
    ///
    /// Fails if any target renames a class or does not fit a YOLO class id.
    pub fn to_yolo(&self) -> Result<YoloClassMap, KwtoolsError> {
        let origin = self.source.clone().unwrap_or_default();
        let mut map = YoloClassMap::new();

        for (old_id, target) in &self.entries {
            let new_id = match target {
                MappingTarget::Id(id) => *id,
                MappingTarget::Name(_) | MappingTarget::IdAndName { .. } => {
                    return Err(KwtoolsError::MappingInvalid {
                        path: origin.clone(),
                        message: format!(
                            "class {} maps to a name; YOLO labels only support integer ids",
                            old_id
                        ),
                    });
                }
            };

            let to_class = |id: u64| {
                u32::try_from(id)
                    .map(ClassId::new)
                    .map_err(|_| KwtoolsError::MappingInvalid {
                        path: origin.clone(),
                        message: format!("class id {} is out of range", id),
                    })
            };

            map.insert(to_class(*old_id)?, to_class(new_id)?);
        }

        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<ClassMapping, KwtoolsError> {
        ClassMapping::from_json_str(json, Path::new("mapping.json"))
    }

    #[test]
    fn all_three_target_shapes_parse() {
        let mapping =
            parse(r#"{"1": 2, "2": {"id": 3, "name": "new_name"}, "3": "renamed"}"#).unwrap();

        assert_eq!(mapping.get(1), Some(&MappingTarget::Id(2)));
        assert_eq!(
            mapping.get(2),
            Some(&MappingTarget::IdAndName {
                id: 3,
                name: Some("new_name".to_string())
            })
        );
        assert_eq!(mapping.get(3), Some(&MappingTarget::Name("renamed".to_string())));
    }

    #[test]
    fn object_target_name_is_optional() {
        let mapping = parse(r#"{"4": {"id": 9}}"#).unwrap();
        let target = mapping.get(4).unwrap();
        assert_eq!(target.new_id(), Some(9));
        assert_eq!(target.new_name(), None);
    }

    #[test]
    fn non_integer_keys_are_rejected() {
        let err = parse(r#"{"person": 1}"#).unwrap_err();
        assert!(matches!(err, KwtoolsError::MappingInvalid { .. }));
    }

    #[test]
    fn equivalent_keys_are_rejected() {
        let err = parse(r#"{"1": 2, " 1": 3}"#).unwrap_err();
        assert!(matches!(err, KwtoolsError::MappingInvalid { .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = parse("[1, 2]").unwrap_err();
        assert!(matches!(err, KwtoolsError::MappingParse { .. }));
    }

    #[test]
    fn yolo_mapping_requires_plain_ids() {
        let yolo = parse(r#"{"0": 5, "2": 7}"#).unwrap().to_yolo().unwrap();
        assert_eq!(yolo.get(&ClassId::new(0)), Some(&ClassId::new(5)));
        assert_eq!(yolo.get(&ClassId::new(2)), Some(&ClassId::new(7)));

        let err = parse(r#"{"0": "cat"}"#).unwrap().to_yolo().unwrap_err();
        assert!(matches!(err, KwtoolsError::MappingInvalid { .. }));
    }

    #[test]
    fn missing_mapping_file_is_a_read_error() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let err = ClassMapping::load(&temp.path().join("none.json")).unwrap_err();
        assert!(matches!(err, KwtoolsError::MappingRead { .. }));
    }
}
