use super::DiagramSource;
use crate::diagram::DiagramTree;
use crate::error::SourceError;
use ahash::AHashMap;
use itertools::Itertools;
use std::cell::RefCell;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use std::rc::Rc;
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

/// File name of a diagram document inside the archive.
pub const DIAGRAM_ENTRY: &str = "ic_diagram.xml";

/// A packaged diagram archive (JAR). Each diagram lives at `<name>/ic_diagram.xml`;
/// single-diagram archives may carry one `ic_diagram.xml` at the root instead.
///
/// Parsed documents are cached per diagram name for the lifetime of the archive.
pub struct DiagramArchive<R = File> {
    label: String,
    archive: RefCell<ZipArchive<R>>,
    cache: RefCell<AHashMap<String, Rc<DiagramTree>>>,
}

impl DiagramArchive<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let file = File::open(path).map_err(|e| SourceError::Archive {
            path: label.clone(),
            message: e.to_string(),
        })?;
        Self::from_reader(label, file)
    }
}

impl<R: Read + Seek> DiagramArchive<R> {
    pub fn from_reader(label: impl Into<String>, reader: R) -> Result<Self, SourceError> {
        let label = label.into();
        let archive = ZipArchive::new(reader).map_err(|e| SourceError::Archive {
            path: label.clone(),
            message: e.to_string(),
        })?;
        debug!(archive = %label, entries = archive.len(), "opened diagram archive");
        Ok(Self {
            label,
            archive: RefCell::new(archive),
            cache: RefCell::new(AHashMap::new()),
        })
    }

    fn read_entry(&self, diagram: &str) -> Result<String, SourceError> {
        let mut archive = self.archive.borrow_mut();
        let nested = format!("{}/{}", diagram, DIAGRAM_ENTRY);
        for entry_name in [nested.as_str(), DIAGRAM_ENTRY] {
            match archive.by_name(entry_name) {
                Ok(mut entry) => {
                    let mut xml = String::new();
                    entry
                        .read_to_string(&mut xml)
                        .map_err(|e| SourceError::Archive {
                            path: self.label.clone(),
                            message: format!("failed to read '{}': {}", entry_name, e),
                        })?;
                    debug!(diagram, entry = entry_name, "loaded diagram document");
                    return Ok(xml);
                }
                Err(ZipError::FileNotFound) => continue,
                Err(e) => {
                    return Err(SourceError::Archive {
                        path: self.label.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }
        Err(SourceError::DiagramNotFound(diagram.to_string()))
    }
}

impl<R: Read + Seek> DiagramSource for DiagramArchive<R> {
    fn diagram(&self, name: &str) -> Result<Rc<DiagramTree>, SourceError> {
        if let Some(tree) = self.cache.borrow().get(name) {
            return Ok(Rc::clone(tree));
        }
        let xml = self.read_entry(name)?;
        let tree = Rc::new(DiagramTree::parse(&xml).map_err(|source| SourceError::Document {
            diagram: name.to_string(),
            source,
        })?);
        self.cache
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&tree));
        Ok(tree)
    }

    fn diagram_names(&self) -> Result<Vec<String>, SourceError> {
        let suffix = format!("/{}", DIAGRAM_ENTRY);
        let archive = self.archive.borrow();
        Ok(archive
            .file_names()
            .filter(|entry| entry.ends_with(&suffix))
            .filter_map(|entry| entry.split('/').next())
            .map(str::to_string)
            .sorted()
            .dedup()
            .collect())
    }
}
