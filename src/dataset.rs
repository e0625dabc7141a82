use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::CrankError;

#[derive(Debug)]
enum FileType {
    JSON,
}

#[derive(Debug)]
pub struct FileInfo {
    path: PathBuf,
    file_size: u64,
    file_type: FileType,
}

/// One college listing. Fields missing in the input coerce to their
/// type defaults instead of propagating holes into the table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct College {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub ranking: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub fees: u32,
    #[serde(default)]
    pub user_rating: f32,
}

#[derive(Debug, Default, Deserialize)]
pub struct Dataset {
    pub colleges: Vec<College>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.colleges.len()
    }
}

/// The dataset bundled with the binary, used when no path is given.
pub fn sample() -> Dataset {
    serde_json::from_str(include_str!("../data/colleges.json"))
        .expect("bundled dataset is valid")
}

pub fn load_dataset(path: &str) -> Result<Dataset, CrankError> {
    let expanded = shellexpand::full(path)
        .map_err(|_| CrankError::FileNotFound)?
        .into_owned();
    let file_info = get_file_info(PathBuf::from(expanded))?;

    let start_time = Instant::now();
    let raw = fs::read_to_string(&file_info.path)?;
    let dataset: Dataset = match file_info.file_type {
        FileType::JSON => serde_json::from_str(&raw)?,
    };
    info!(
        "Loaded {} colleges ({} bytes) in {}ms",
        dataset.len(),
        file_info.file_size,
        start_time.elapsed().as_millis()
    );
    for college in dataset.colleges.iter() {
        debug!("College: {:?}", college);
    }

    Ok(dataset)
}

fn detect_file_type(path: &Path) -> Result<FileType, CrankError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("JSON") => Ok(FileType::JSON),
        _ => Err(CrankError::UnknownFileType),
    }
}

fn get_file_info(path: PathBuf) -> Result<FileInfo, CrankError> {
    let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CrankError::FileNotFound,
        ErrorKind::PermissionDenied => CrankError::PermissionDenied,
        _ => CrankError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(CrankError::FileNotFound);
    }

    let file_size = metadata.len();
    let file_type = detect_file_type(&path)?;

    Ok(FileInfo {
        path,
        file_size,
        file_type,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_dataset(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn bundled_sample_has_45_colleges() {
        let dataset = sample();
        assert_eq!(dataset.len(), 45);
        assert!(dataset.colleges.iter().all(|c| c.id != 0));
    }

    #[test]
    fn loads_a_valid_dataset_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_dataset(
            &dir,
            "colleges.json",
            r#"{ "colleges": [
                { "id": 1, "ranking": 2, "name": "A", "course": "CS", "fees": 1000, "user_rating": 8.1 },
                { "id": 2, "ranking": 1, "name": "B", "course": "ME", "fees": 2000, "user_rating": 7.4 }
            ] }"#,
        );

        let dataset = load_dataset(&path).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.colleges[0].name, "A");
        assert_eq!(dataset.colleges[1].fees, 2000);
    }

    #[test]
    fn missing_record_fields_coerce_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_dataset(&dir, "sparse.json", r#"{ "colleges": [ { "id": 7 } ] }"#);

        let dataset = load_dataset(&path).unwrap();
        assert_eq!(dataset.colleges[0].id, 7);
        assert_eq!(dataset.colleges[0].ranking, 0);
        assert_eq!(dataset.colleges[0].name, "");
        assert_eq!(dataset.colleges[0].user_rating, 0.0);
    }

    #[test]
    fn malformed_document_is_an_invalid_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_dataset(&dir, "broken.json", r#"{ "colleges": 42 }"#);

        assert!(matches!(
            load_dataset(&path),
            Err(CrankError::InvalidDataset(_))
        ));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_dataset(&dir, "colleges.csv", "id,ranking\n1,1\n");

        assert!(matches!(
            load_dataset(&path),
            Err(CrankError::UnknownFileType)
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(matches!(
            load_dataset("/nonexistent/colleges.json"),
            Err(CrankError::FileNotFound)
        ));
    }
}
