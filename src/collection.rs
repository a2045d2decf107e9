// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::env::current_dir;
use std::path::PathBuf;

use crate::config::Config;
use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;

pub const DATABASE_FILE_NAME: &str = "cards.db";

/// A collection directory: the card database plus its configuration.
pub struct Collection {
    pub directory: PathBuf,
    pub config: Config,
    pub db: Database,
}

impl Collection {
    pub fn new(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        let directory = if directory.exists() {
            directory.canonicalize()?
        } else {
            return Err(ErrorReport::validation(format!(
                "directory does not exist: {}",
                directory.display()
            )));
        };

        let config = Config::load(&directory)?;

        let db_path: PathBuf = directory.join(DATABASE_FILE_NAME);
        let db_path: &str = db_path
            .to_str()
            .ok_or_else(|| ErrorReport::new("invalid path"))?;
        let db: Database = Database::new(db_path)?;

        Ok(Self {
            directory,
            config,
            db,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_non_existent_directory() {
        let result = Collection::new(Some("./derpherp".to_string()));
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::Validation));
    }

    #[test]
    fn test_creates_database() -> Fallible<()> {
        let dir = tempdir()?;
        let coll = Collection::new(Some(dir.path().display().to_string()))?;
        assert!(coll.directory.join(DATABASE_FILE_NAME).exists());
        assert_eq!(coll.config, Config::default());
        Ok(())
    }

    #[test]
    fn test_reads_config() -> Fallible<()> {
        let dir = tempdir()?;
        write(dir.path().join("config.toml"), "[session]\nlimit = 5\n")?;
        let coll = Collection::new(Some(dir.path().display().to_string()))?;
        assert_eq!(coll.config.session_limit(), Some(5));
        Ok(())
    }

    #[test]
    fn test_bad_config_is_an_error() -> Fallible<()> {
        let dir = tempdir()?;
        write(dir.path().join("config.toml"), "[session]\nlimit = \"many\"\n")?;
        assert!(Collection::new(Some(dir.path().display().to_string())).is_err());
        Ok(())
    }
}
