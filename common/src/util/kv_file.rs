//
//  Copyright 2024 Google, Inc.
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at:
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! # KvFile class

use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::PathBuf;

/// An ordered `key=value` file, the line format hostapd uses for its
/// configuration and for vendor overlays.
///
/// Entries keep the order in which a key was first seen. Inserting an
/// existing key replaces its value in place, so every key appears once.
pub struct KvFile {
    /// The entries stored in the file, in first-seen order.
    entries: Vec<(String, String)>,
    /// The path to the backing file.
    filepath: PathBuf,
}

impl KvFile {
    /// Creates a new, empty KvFile backed by `filepath`.
    pub fn new(filepath: PathBuf) -> KvFile {
        KvFile { entries: Vec::new(), filepath }
    }

    /// Reads entries from the backing file, overwriting any existing data.
    pub fn read(&mut self) -> anyhow::Result<()> {
        let f = File::open(&self.filepath)?;
        let mut contents = String::new();
        BufReader::new(f).read_to_string(&mut contents)?;
        self.parse(&contents);
        Ok(())
    }

    /// Replaces the entries with the ones parsed from `contents`.
    ///
    /// Lines without a `=` are skipped. Keys and values are trimmed of
    /// surrounding whitespace; a key that trims to nothing is skipped.
    pub fn parse(&mut self, contents: &str) {
        self.entries.clear();
        for line in contents.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            self.insert(key, value.trim());
        }
    }

    /// Writes the entries to the backing file, one `key=value` per line.
    pub fn write(&self) -> anyhow::Result<()> {
        let mut f = File::create(&self.filepath)?;
        f.write_all(self.to_string().as_bytes())?;
        f.flush()?;
        Ok(())
    }

    /// Checks if a certain key exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Gets the value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Inserts a key-value pair, replacing the value of an existing key.
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_owned(),
            None => self.entries.push((key.to_owned(), value.to_owned())),
        }
    }

    /// Keeps only the entries whose key satisfies `f`.
    pub fn retain<F: FnMut(&str) -> bool>(&mut self, mut f: F) {
        self.entries.retain(|(k, _)| f(k));
    }

    /// Iterates over the entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Display for KvFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (key, value) in &self.entries {
            writeln!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}
