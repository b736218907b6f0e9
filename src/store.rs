use std::{fs, io, path::Path};

use crate::error::StoreError;
use crate::models::Db;

pub const DEFAULT_DB_PATH: &str = "data/db.json";

// A missing file is an empty planner, not an error
pub fn load_db(path: &Path) -> Result<Db, StoreError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Db::default()),
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_str(&text)?)
}

// Write to a sibling .tmp file, then rename over the real one
pub fn save_db(path: &Path, db: &Db) -> Result<(), StoreError> {
    let tmp_path = path.with_extension("json.tmp");
    let text = serde_json::to_string_pretty(db)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&tmp_path, text)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
