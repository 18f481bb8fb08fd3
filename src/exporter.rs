/* Copyright (C) 2022 Antmicro
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Batch output of per-board artifacts, filtered by a user-supplied selection
//! (`:all` selects everything).

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::log::*;

pub const EXPORT_ALL: &str = ":all";

pub trait AsBytes {
    fn as_bytes<'s>(&'s self) -> &'s [u8];
}

impl AsBytes for String {
    fn as_bytes<'s>(&'s self) -> &'s [u8] {
        String::as_bytes(self)
    }
}

#[derive(Default, Debug)]
pub struct ExportChecker {
    export: HashSet<String>,
    export_all: bool,
}

impl ExportChecker {
    pub fn new(arg_list: &Option<Vec<String>>) -> Self {
        let mut checker = Self::default();
        for arg in arg_list.iter().flatten() {
            if arg == EXPORT_ALL {
                checker.export_all = true;
            } else {
                checker.export.insert(arg.clone());
            }
        }
        checker
    }

    pub fn should_export(&self, name: &str) -> bool {
        self.export_all || self.export.contains(name)
    }

    /// Explicitly selected names that are not among `known`.
    pub fn unknown<'s>(&'s self, known: &[&str]) -> Vec<&'s str> {
        let mut unknown: Vec<&str> = self.export.iter()
            .map(|n| n.as_str())
            .filter(|n| !known.contains(n))
            .collect();
        unknown.sort_unstable();
        unknown
    }
}

pub trait Exporter<D> {
    fn ignore_or_export<'s, F>(&'s mut self, name: &str, exporter: F)
        -> std::io::Result<()>
    where
        F: FnOnce() -> D + 's;

    fn flush(&mut self) -> std::io::Result<()>;
}

/// Writes every selected item to `<prefix>/<name><suffix>`.
pub struct MultiFileExporter {
    prefix: PathBuf,
    suffix: String,
    checker: ExportChecker,
    written: Vec<PathBuf>,
}

impl MultiFileExporter {
    pub fn new(arg_list: &Option<Vec<String>>, prefix: &Path, suffix: &str) -> Self {
        Self {
            prefix: prefix.to_path_buf(),
            suffix: suffix.to_string(),
            checker: ExportChecker::new(arg_list),
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl<D> Exporter<D> for MultiFileExporter where D: AsBytes {
    fn ignore_or_export<'s, F>(&'s mut self, name: &str, exporter: F)
        -> std::io::Result<()>
    where
        F: FnOnce() -> D + 's
    {
        if !self.checker.should_export(name) {
            return Ok(());
        }
        let data = exporter();
        let path = self.prefix.join(name.to_string() + &self.suffix);
        dbg_log!(DBG_INFO, "Exporting {} to {}", name, path.display());
        let mut file = File::create(&path)?;
        file.write_all(data.as_bytes())?;
        self.written.push(path);
        Ok(())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Collects every selected item into one JSON object keyed by name, written
/// out on [`Exporter::flush`].
pub struct CompoundJsonExporter<D> where D: Serialize {
    filename: PathBuf,
    data: BTreeMap<String, D>,
    checker: ExportChecker,
}

impl<D> CompoundJsonExporter<D> where D: Serialize {
    pub fn new(arg_list: &Option<Vec<String>>, filename: PathBuf) -> Self {
        Self {
            filename,
            data: BTreeMap::new(),
            checker: ExportChecker::new(arg_list),
        }
    }
}

impl<D> Exporter<D> for CompoundJsonExporter<D> where D: Serialize {
    fn ignore_or_export<'s, F>(&'s mut self, name: &str, exporter: F)
        -> std::io::Result<()>
    where
        F: FnOnce() -> D + 's
    {
        if self.checker.should_export(name) {
            let data = exporter();
            self.data.insert(name.into(), data);
        }
        Ok(())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let data = serde_json::to_string_pretty(&self.data)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut file = File::create(&self.filename)?;
        file.write_all(data.as_bytes())?;
        file.write_all(b"\n")
    }
}
