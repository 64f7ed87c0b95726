use std::fs::read_to_string;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::exception;
use crate::exception::Exception;

pub fn load_file<T>(path: &Path) -> Result<T, Exception>
where
    T: DeserializeOwned,
{
    let json = read_to_string(path).map_err(|err| {
        exception!(
            message = format!("failed to read file, path={}", path.to_string_lossy()),
            source = err
        )
    })?;
    from_json(&json)
}

pub fn from_json<T>(json: &str) -> Result<T, Exception>
where
    T: DeserializeOwned,
{
    serde_json::from_str(json).map_err(|err| exception!(message = format!("failed to deserialize, json={json}"), source = err))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde::Deserialize;
    use tempfile::NamedTempFile;

    use super::*;

    #[derive(Deserialize, Debug)]
    struct Sample {
        name: String,
    }

    #[test]
    fn load_file_reads_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "sample"}}"#).unwrap();

        let sample: Sample = load_file(file.path()).unwrap();
        assert_eq!(sample.name, "sample");
    }

    #[test]
    fn load_file_reports_missing_path() {
        let result: Result<Sample, Exception> = load_file(Path::new("/nonexistent/conf.json"));
        let error = result.unwrap_err();
        assert!(error.message.contains("/nonexistent/conf.json"));
        assert!(error.source.is_some());
    }

    #[test]
    fn from_json_rejects_invalid_json() {
        let result: Result<Sample, Exception> = from_json("{");
        assert!(result.is_err());
    }
}
