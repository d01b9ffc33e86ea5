//! Time series store
//!
//! Holds at most one recording. Imports parse into a fresh [`Dataset`] and
//! replace the current one only on success.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::files::FileAccess;
use crate::storage::format::{parse_text, write_text};
use crate::storage::types::{
    AnnotationId, AnnotationRecord, Dataset, PressureTable, StoreSummary, MAX_SENSORS,
};
use serde::Deserialize;
use std::path::Path;

/// Import rules for the store
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Reject files declaring fewer sensor columns than this
    pub required_sensors: Option<usize>,
}

impl StoreConfig {
    /// Require every channel of a full catheter
    pub fn full_catheter() -> Self {
        Self {
            required_sensors: Some(MAX_SENSORS),
        }
    }
}

/// Owner of the loaded pressure table and annotation table
#[derive(Debug, Default)]
pub struct TimeSeriesStore {
    config: StoreConfig,
    data: Option<Dataset>,
}

impl TimeSeriesStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config, data: None }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.data.as_ref()
    }

    pub fn pressures(&self) -> Option<&PressureTable> {
        self.data.as_ref().map(|d| &d.pressures)
    }

    /// Annotations in file order
    pub fn annotations(&self) -> Option<&[AnnotationRecord]> {
        self.data.as_ref().map(|d| d.annotations.as_slice())
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&AnnotationRecord> {
        self.data.as_ref()?.annotations.get(id.0)
    }

    /// Replace the loaded recording with the parsed text
    ///
    /// On failure the previous recording stays loaded.
    pub fn import_text(&mut self, raw: &str) -> StorageResult<StoreSummary> {
        let dataset = match parse_text(raw, self.config.required_sensors) {
            Ok(dataset) => dataset,
            Err(e) => {
                tracing::warn!(error = %e, "Import rejected");
                return Err(e.into());
            }
        };

        let summary = dataset.summary();
        self.data = Some(dataset);

        tracing::info!(
            rows = summary.rows,
            sensors = summary.sensors,
            annotations = summary.annotations,
            "Imported recording"
        );
        Ok(summary)
    }

    /// Write the loaded recording as capture text
    pub fn export_text(&self) -> StorageResult<String> {
        let dataset = self.data.as_ref().ok_or(StorageError::NoData)?;
        Ok(write_text(dataset))
    }

    /// Read a capture file and import it
    pub fn load(&mut self, files: &dyn FileAccess, path: &Path) -> StorageResult<StoreSummary> {
        let raw = files.read_all(path).map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = raw.len(), "Read capture file");
        self.import_text(&raw)
    }

    /// Export and write to a capture file
    pub fn save(&self, files: &dyn FileAccess, path: &Path) -> StorageResult<()> {
        let text = self.export_text()?;
        files
            .write_all(path, &text)
            .map_err(|source| StorageError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::info!(path = %path.display(), bytes = text.len(), "Saved recording");
        Ok(())
    }

    pub fn summary(&self) -> Option<StoreSummary> {
        self.data.as_ref().map(Dataset::summary)
    }

    /// Commit a new time for one annotation
    pub fn retime_annotation(&mut self, id: AnnotationId, time: f64) -> StorageResult<()> {
        if !time.is_finite() {
            return Err(StorageError::InvalidTime(time));
        }
        let dataset = self.data.as_mut().ok_or(StorageError::NoData)?;
        let record = dataset
            .annotations
            .get_mut(id.0)
            .ok_or(StorageError::AnnotationNotFound(id))?;

        tracing::debug!(annotation = %id, from = record.time, to = time, "Retimed annotation");
        record.time = time;
        Ok(())
    }

    /// Drop the loaded recording
    pub fn clear(&mut self) {
        self.data = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::error::ImportError;
    use crate::storage::files::LocalFiles;
    use crate::storage::types::SensorId;
    use std::io;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const SAMPLE: &str = "Time\t1\t2\t3
1.0\t10\t20\t30
2.0\t11\t21\t31
Annotations:
1.5\tBolus start
";

    struct FailingFiles;

    impl FileAccess for FailingFiles {
        fn read_all(&self, _path: &Path) -> io::Result<String> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }

        fn write_all(&self, _path: &Path, _text: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
    }

    #[test]
    fn test_import_sample() {
        let mut store = TimeSeriesStore::default();
        let summary = store.import_text(SAMPLE).unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.sensors, 3);
        assert_eq!(summary.annotations, 1);
        assert_eq!(
            store.annotation(AnnotationId(0)),
            Some(&AnnotationRecord::new(1.5, "Bolus start"))
        );
        assert_eq!(
            store
                .pressures()
                .unwrap()
                .value_at(2.0, SensorId::new(3).unwrap()),
            Some(31.0)
        );
    }

    #[test]
    fn test_failed_import_keeps_previous_data() {
        let mut store = TimeSeriesStore::default();
        store.import_text(SAMPLE).unwrap();

        let err = store.import_text("Time\t1\n0\t1\n").unwrap_err();
        assert!(matches!(
            err,
            StorageError::Import(ImportError::MissingSentinel)
        ));
        assert_eq!(store.summary().unwrap().rows, 2);
        assert_eq!(store.annotations().unwrap().len(), 1);
    }

    #[test]
    fn test_full_catheter_config() {
        let mut store = TimeSeriesStore::new(StoreConfig::full_catheter());
        assert!(matches!(
            store.import_text(SAMPLE),
            Err(StorageError::Import(ImportError::TooFewSensors { found: 3, .. }))
        ));
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_export_requires_data() {
        let store = TimeSeriesStore::default();
        assert!(matches!(store.export_text(), Err(StorageError::NoData)));
        assert!(store.summary().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("capture.txt");

        let mut store = TimeSeriesStore::default();
        store.import_text(SAMPLE).unwrap();
        store.save(&LocalFiles, &path).unwrap();

        let mut other = TimeSeriesStore::default();
        other.load(&LocalFiles, &path).unwrap();
        assert_eq!(other.dataset(), store.dataset());
    }

    #[test]
    fn test_io_failures_leave_store_intact() {
        let mut store = TimeSeriesStore::default();
        store.import_text(SAMPLE).unwrap();

        let path = PathBuf::from("capture.txt");
        assert!(matches!(
            store.load(&FailingFiles, &path),
            Err(StorageError::Io { .. })
        ));
        assert!(matches!(
            store.save(&FailingFiles, &path),
            Err(StorageError::Io { .. })
        ));
        assert_eq!(store.summary().unwrap().rows, 2);
    }

    #[test]
    fn test_retime_annotation() {
        let mut store = TimeSeriesStore::default();
        assert!(matches!(
            store.retime_annotation(AnnotationId(0), 1.0),
            Err(StorageError::NoData)
        ));

        store.import_text(SAMPLE).unwrap();
        store.retime_annotation(AnnotationId(0), 1.75).unwrap();
        assert_eq!(store.annotation(AnnotationId(0)).unwrap().time, 1.75);

        assert!(matches!(
            store.retime_annotation(AnnotationId(5), 1.0),
            Err(StorageError::AnnotationNotFound(AnnotationId(5)))
        ));
        assert!(matches!(
            store.retime_annotation(AnnotationId(0), f64::NAN),
            Err(StorageError::InvalidTime(_))
        ));

        let text = store.export_text().unwrap();
        assert!(text.ends_with("Annotations:\n1.75\tBolus start\n"));
    }

    #[test]
    fn test_clear() {
        let mut store = TimeSeriesStore::default();
        store.import_text(SAMPLE).unwrap();
        store.clear();
        assert!(!store.is_loaded());
        assert!(store.pressures().is_none());
    }
}
