//! RC-003: Persisted recipe file — CSV load and atomic save.
//!
//! Header row of the three required columns, one row per recipe. Extra
//! columns are tolerated on load and dropped on the next save.

use super::types::{Recipe, REQUIRED_COLUMNS};
use std::path::{Path, PathBuf};

/// Why a persisted file could not be used as the recipe table.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{} does not exist", .0.display())]
    Missing(PathBuf),

    #[error("{} is empty", .0.display())]
    Empty(PathBuf),

    #[error("{} is missing required columns: {}", .path.display(), .columns.join(", "))]
    MissingColumns {
        path: PathBuf,
        columns: Vec<&'static str>,
    },

    #[error("{} has a header but no recipes", .0.display())]
    NoRows(PathBuf),

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed {}: {source}", .path.display())]
    Parse { path: PathBuf, source: csv::Error },
}

/// Why the table could not be written back.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot encode {}: {source}", .path.display())]
    Encode { path: PathBuf, source: csv::Error },
}

/// Load the recipe table from a CSV file.
pub fn load_table(path: &Path) -> Result<Vec<Recipe>, LoadError> {
    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LoadError::Missing(path.to_path_buf()))
        }
        Err(e) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    if meta.len() == 0 {
        return Err(LoadError::Empty(path.to_path_buf()));
    }

    let parse_err = |source: csv::Error| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(parse_err)?;

    let headers = reader.headers().map_err(parse_err)?.clone();
    let missing: Vec<&'static str> = REQUIRED_COLUMNS
        .into_iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        });
    }

    let mut table = Vec::new();
    for row in reader.deserialize::<Recipe>() {
        table.push(row.map_err(parse_err)?);
    }
    if table.is_empty() {
        return Err(LoadError::NoRows(path.to_path_buf()));
    }
    Ok(table)
}

/// Save the recipe table atomically (write to temp, then rename).
pub fn save_table(path: &Path, table: &[Recipe]) -> Result<(), PersistError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PersistError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let tmp_path = temp_path(path);
    let encode_err = |source: csv::Error| PersistError::Encode {
        path: tmp_path.clone(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&tmp_path)
        .map_err(encode_err)?;
    writer.write_record(REQUIRED_COLUMNS).map_err(encode_err)?;
    for recipe in table {
        writer.serialize(recipe).map_err(encode_err)?;
    }
    writer.flush().map_err(|e| PersistError::Io {
        path: tmp_path.clone(),
        source: e,
    })?;
    drop(writer);

    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        PersistError::Io {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

/// Sibling temp file: `recipes.csv` → `recipes.csv.tmp`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::defaults::default_recipes;
    use proptest::prelude::*;

    #[test]
    fn test_rc003_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.csv");
        let table = default_recipes();
        save_table(&path, &table).unwrap();
        assert_eq!(load_table(&path).unwrap(), table);
    }

    #[test]
    fn test_rc003_header_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.csv");
        save_table(&path, &default_recipes()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.lines().next().unwrap(),
            "Nosaukums,Sastāvdaļas,Pagatavošana"
        );
        assert_eq!(content.lines().count(), 4);
    }

    #[test]
    fn test_rc003_atomic_write_cleans_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.csv");
        save_table(&path, &default_recipes()).unwrap();
        assert!(!dir.path().join("recipes.csv.tmp").exists());
        assert!(path.exists());
    }

    #[test]
    fn test_rc003_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/nested/recipes.csv");
        save_table(&path, &default_recipes()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_rc003_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table(&dir.path().join("ghost.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Missing(_)));
    }

    #[test]
    fn test_rc003_load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(load_table(&path).unwrap_err(), LoadError::Empty(_)));
    }

    #[test]
    fn test_rc003_load_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "Nosaukums,Foo\nA,B\n").unwrap();
        match load_table(&path).unwrap_err() {
            LoadError::MissingColumns { columns, .. } => {
                assert_eq!(columns, vec!["Sastāvdaļas", "Pagatavošana"]);
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn test_rc003_load_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hdr.csv");
        std::fs::write(&path, "Nosaukums,Sastāvdaļas,Pagatavošana\n").unwrap();
        assert!(matches!(load_table(&path).unwrap_err(), LoadError::NoRows(_)));
    }

    #[test]
    fn test_rc003_load_ragged_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        std::fs::write(&path, "Nosaukums,Sastāvdaļas,Pagatavošana\nA,B\n").unwrap();
        assert!(matches!(
            load_table(&path).unwrap_err(),
            LoadError::Parse { .. }
        ));
    }

    #[test]
    fn test_rc003_load_reordered_and_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.csv");
        std::fs::write(
            &path,
            "Pagatavošana,Id,Nosaukums,Sastāvdaļas\nCep.,7,Pankūkas,\"Milti, Piens\"\n",
        )
        .unwrap();
        let table = load_table(&path).unwrap();
        assert_eq!(table, vec![Recipe::new("Pankūkas", "Milti, Piens", "Cep.")]);
    }

    #[test]
    fn test_rc003_quoted_fields_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.csv");
        let table = vec![Recipe::new(
            "Sacepums \"Lielais\"",
            "Biezpiens, Olas",
            "1. Samaisa.\n2. Cep 40 min.",
        )];
        save_table(&path, &table).unwrap();
        assert_eq!(load_table(&path).unwrap(), table);
    }

    fn recipe_strategy() -> impl Strategy<Value = Recipe> {
        let text = "[a-zA-Zāčēģīķļņšūž0-9 ,.\"\n]{0,24}";
        (text, text, text).prop_map(|(n, i, p)| Recipe::new(n, i, p))
    }

    proptest! {
        #[test]
        fn test_rc003_roundtrip_any_table(table in prop::collection::vec(recipe_strategy(), 1..8)) {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("recipes.csv");
            save_table(&path, &table).unwrap();
            prop_assert_eq!(load_table(&path).unwrap(), table);
        }
    }
}
