use std::fs;
use std::path::Path;

use super::ClassId;
use crate::error::KwtoolsError;

/// Class names indexed by class id, one per line of a names file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassNames {
    names: Vec<String>,
}

impl ClassNames {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Load a names file. Line `n` (0-based, trimmed) names class `n`.
    pub fn load(path: &Path) -> Result<Self, KwtoolsError> {
        let text = fs::read_to_string(path).map_err(|source| KwtoolsError::ClassFileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_text(&text))
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            names: text.lines().map(|line| line.trim().to_string()).collect(),
        }
    }

    pub fn get(&self, id: ClassId) -> Option<&str> {
        self.names.get(id.as_u32() as usize).map(String::as_str)
    }

    /// Display label for `id`, falling back to a generic one.
    pub fn label(&self, id: ClassId) -> String {
        match self.get(id) {
            Some(name) => name.to_string(),
            None => format!("(class {})", id),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(idx, name)| (ClassId::new(idx as u32), name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ids_get_generic_labels() {
        let names = ClassNames::from_text("person\n  car \n");
        assert_eq!(names.len(), 2);
        assert_eq!(names.label(ClassId::new(1)), "car");
        assert_eq!(names.label(ClassId::new(7)), "(class 7)");
    }

    #[test]
    fn missing_file_is_a_class_file_error() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let err = ClassNames::load(&temp.path().join("classes.txt")).unwrap_err();
        assert!(matches!(err, KwtoolsError::ClassFileRead { .. }));
    }
}
