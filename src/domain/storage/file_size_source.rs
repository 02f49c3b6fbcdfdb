use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::Read;
use std::path::Path;

use crate::api::size_manifest_dto::FileSizeRecordDto;
use crate::domain::utils::id::Lfn;
use crate::domain::workflow::job::FileRef;
use crate::error::{Error, Result};
use crate::loader::parser::{parse_csv_file, parse_csv_reader};

/// Resolves the byte length of a file.
pub trait FileSizeLookup {
    fn size_of(&self, file: &FileRef) -> Result<u64>;
}

/// Where a `FileSizeSource` takes its sizes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSourceMode {
    /// Sizes come from a loaded manifest; files missing from it are errors.
    Manifest,
    /// Each file's declared size is used.
    Intrinsic,
}

/// File sizes for one planning session.
///
/// Constructed once and read-only afterwards, so it can be shared across
/// threads by reference.
#[derive(Debug, Clone)]
pub struct FileSizeSource {
    /// `None` in intrinsic mode.
    sizes: Option<HashMap<Lfn, u64>>,
}

impl FileSizeSource {
    /// A source that uses the sizes declared on each file.
    pub fn intrinsic() -> Self {
        Self { sizes: None }
    }

    /// Builds a manifest-backed source.
    ///
    /// A filename may repeat (one row per producing and consuming job) but
    /// must always carry the same length.
    pub fn from_records(records: impl IntoIterator<Item = FileSizeRecordDto>) -> Result<Self> {
        let mut sizes: HashMap<Lfn, u64> = HashMap::new();

        for record in records {
            match sizes.entry(Lfn::new(record.filename.clone())) {
                Entry::Occupied(existing) => {
                    if *existing.get() != record.length {
                        return Err(Error::SizeInconsistency { filename: record.filename, first: *existing.get(), second: record.length });
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(record.length);
                }
            }
        }

        log::info!("Size manifest loaded with {} distinct files.", sizes.len());

        Ok(Self { sizes: Some(sizes) })
    }

    /// Reads a headed CSV manifest (`transformation,id,type,filename,length`).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let records: Vec<FileSizeRecordDto> = parse_csv_reader(reader)?;
        Self::from_records(records)
    }

    pub fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading size manifest from '{}'.", path.display());

        let records: Vec<FileSizeRecordDto> = parse_csv_file(path)?;
        Self::from_records(records)
    }

    /// Loads the manifest at `path`, or falls back to declared sizes.
    ///
    /// The fallback is never silent: a missing path is logged as a warning
    /// and a failed load as an error. Check `mode()` for the outcome.
    pub fn load_or_fallback(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::warn!("No size manifest given; falling back to declared file sizes.");
            return Self::intrinsic();
        };

        match Self::from_manifest_path(path) {
            Ok(source) => source,
            Err(e) => {
                log::error!("Could not load size manifest '{}': {}. Falling back to declared file sizes.", path.display(), e);
                Self::intrinsic()
            }
        }
    }

    pub fn mode(&self) -> SizeSourceMode {
        match self.sizes {
            Some(_) => SizeSourceMode::Manifest,
            None => SizeSourceMode::Intrinsic,
        }
    }

    pub fn is_manifest_loaded(&self) -> bool {
        self.sizes.is_some()
    }

    /// Manifest entry for `lfn`. Always `None` in intrinsic mode.
    pub fn manifest_size(&self, lfn: &Lfn) -> Option<u64> {
        self.sizes.as_ref().and_then(|sizes| sizes.get(lfn).copied())
    }
}

impl FileSizeLookup for FileSizeSource {
    fn size_of(&self, file: &FileRef) -> Result<u64> {
        match &self.sizes {
            None => Ok(file.declared_size),
            Some(sizes) => sizes.get(&file.lfn).copied().ok_or_else(|| Error::UnknownFile(file.lfn.to_string())),
        }
    }
}
