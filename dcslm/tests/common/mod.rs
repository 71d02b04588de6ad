//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;

use dcslm::manager::ManagerConfig;

/// A game folder inside a temporary directory, plus a place for archives.
pub struct Fixture {
    pub temp: TempDir,
    pub root: PathBuf,
    pub downloads: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("Saved Games/DCS");
        let downloads = temp.path().join("Downloads");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&downloads).unwrap();
        Self {
            temp,
            root,
            downloads,
        }
    }

    pub fn config(&self) -> ManagerConfig {
        ManagerConfig::new(&self.root)
    }

    /// Write a zip archive into the downloads folder.
    pub fn archive(&self, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        let path = self.downloads.join(name);
        write_zip(&path, entries);
        path
    }

    /// Write a file below the game root.
    pub fn write(&self, relative: &str, bytes: &[u8]) {
        let path = self.root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root.join(relative)).unwrap()
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.root.join(relative).exists()
    }

    /// Every file below the root outside the work directory, with contents.
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        let work = self.root.join("DCSLM");
        WalkDir::new(&self.root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file() && !e.path().starts_with(&work))
            .map(|e| {
                let rel = e.path().strip_prefix(&self.root).unwrap();
                (
                    rel.to_string_lossy().replace('\\', "/"),
                    fs::read(e.path()).unwrap(),
                )
            })
            .collect()
    }
}

pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    for (name, data) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}

/// A configuration with one internal texture statement.
pub fn description(texture: &str) -> Vec<u8> {
    format!(
        "livery = {{\n\t{{\"f14_main\", 0, \"{}\", false}}; -- fuselage\n\t{{\"pilot_helmet\", 0, \"pilot_default\", true}};\n}}\nname = \"Pack\"\n",
        texture
    )
    .into_bytes()
}
