//! Category remapping for COCO documents.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use log::{debug, info};
use serde::Serialize;

use super::{read_coco_json, write_coco_json, CocoDocument};
use crate::error::KwtoolsError;
use crate::mapping::{ClassMapping, MappingTarget};

/// What a remap changed.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RemapReport {
    /// Categories whose id changed.
    pub renumbered: usize,
    /// Categories whose name changed.
    pub renamed: usize,
    /// Annotations whose `category_id` was rewritten.
    pub annotations_updated: usize,
    /// Mapping keys that matched no category.
    pub unmatched: Vec<u64>,
}

impl fmt::Display for RemapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Categories renumbered: {}", self.renumbered)?;
        writeln!(f, "Categories renamed: {}", self.renamed)?;
        writeln!(f, "Annotations updated: {}", self.annotations_updated)?;
        if !self.unmatched.is_empty() {
            let ids: Vec<String> = self.unmatched.iter().map(u64::to_string).collect();
            writeln!(f, "Unmatched mapping keys: {}", ids.join(", "))?;
        }
        Ok(())
    }
}

impl CocoDocument {
    /// Apply `mapping` to categories, then carry id changes to annotations.
    ///
    /// The document is left untouched if the result would contain two
    /// categories with the same id.
    pub fn remap_categories(&mut self, mapping: &ClassMapping) -> Result<RemapReport, KwtoolsError> {
        let mut final_ids = BTreeSet::new();
        for category in &self.categories {
            let id = mapping
                .get(category.id)
                .and_then(MappingTarget::new_id)
                .unwrap_or(category.id);
            if !final_ids.insert(id) {
                return Err(KwtoolsError::CocoDuplicateCategoryId { id });
            }
        }

        let mut report = RemapReport::default();
        let mut id_changes: BTreeMap<u64, u64> = BTreeMap::new();
        let mut matched = BTreeSet::new();

        for category in &mut self.categories {
            let old_id = category.id;
            let Some(target) = mapping.get(old_id) else {
                continue;
            };
            matched.insert(old_id);

            if let Some(new_id) = target.new_id() {
                id_changes.insert(old_id, new_id);
                category.id = new_id;
                report.renumbered += 1;
                debug!("category {} -> id {}", old_id, new_id);
            }
            if let Some(name) = target.new_name() {
                debug!("category {} '{}' -> '{}'", old_id, category.name, name);
                category.name = name.to_string();
                report.renamed += 1;
            }
        }

        if !id_changes.is_empty() {
            for annotation in &mut self.annotations {
                if let Some(new_id) = id_changes.get(&annotation.category_id) {
                    annotation.category_id = *new_id;
                    report.annotations_updated += 1;
                }
            }
        }

        report.unmatched = mapping
            .iter()
            .map(|(old_id, _)| old_id)
            .filter(|old_id| !matched.contains(old_id))
            .collect();

        Ok(report)
    }
}

/// Remap the categories of a COCO file.
///
/// Writes to `output`, or back over `input` when no output is given.
/// Callers are expected to confirm that overwrite with the user.
pub fn remap_coco_file(
    input: &Path,
    mapping: &ClassMapping,
    output: Option<&Path>,
) -> Result<RemapReport, KwtoolsError> {
    let mut doc = read_coco_json(input)?;
    let report = doc.remap_categories(mapping)?;

    let target = output.unwrap_or(input);
    write_coco_json(target, &doc)?;
    info!("wrote remapped COCO document to {}", target.display());

    Ok(report)
}
