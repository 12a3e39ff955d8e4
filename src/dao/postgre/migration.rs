use std::{fs, path::PathBuf};

use crate::error::Error;

pub fn get_path(dir: &str, file: &str) -> PathBuf {
    let mut buf = PathBuf::new();

    for chunk in [dir, "migration", "postgresql", file] {
        buf.push(chunk);
    }

    buf
}

/// All `.sql` files of the migration directory, in file name order.
pub fn migration_files(dir: &str) -> Result<Vec<PathBuf>, Error> {
    let root = get_path(dir, "");
    let mut files = vec![];

    for entry in fs::read_dir(&root)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
