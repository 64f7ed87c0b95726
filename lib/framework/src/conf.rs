use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::info;

use crate::exception::Exception;
use crate::json::load_file;

/// Loads the conf from the json file given as the first command line argument,
/// or falls back to `T::default()` when no argument is passed.
pub fn load_conf<T>() -> Result<T, Exception>
where
    T: DeserializeOwned + Default,
{
    let path = std::env::args().nth(1);
    load_conf_from(path.as_deref().map(Path::new))
}

pub fn load_conf_from<T>(path: Option<&Path>) -> Result<T, Exception>
where
    T: DeserializeOwned + Default,
{
    if let Some(path) = path {
        info!(path = %path.to_string_lossy(), "load conf");
        load_file(path)
    } else {
        info!("no conf path, using default value");
        Ok(T::default())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde::Deserialize;
    use tempfile::NamedTempFile;

    use super::*;

    #[derive(Deserialize, Debug)]
    #[serde(default)]
    struct TestConf {
        uri: String,
        retries: u32,
    }

    impl Default for TestConf {
        fn default() -> Self {
            TestConf {
                uri: "localhost:9092".to_owned(),
                retries: 3,
            }
        }
    }

    #[test]
    fn default_without_path() {
        let conf: TestConf = load_conf_from(None).unwrap();
        assert_eq!(conf.uri, "localhost:9092");
        assert_eq!(conf.retries, 3);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"uri": "kafka:9092"}}"#).unwrap();

        let conf: TestConf = load_conf_from(Some(file.path())).unwrap();
        assert_eq!(conf.uri, "kafka:9092");
        assert_eq!(conf.retries, 3);
    }
}
