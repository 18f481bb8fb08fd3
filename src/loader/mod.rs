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

//! Board files: a [`BoardDescription`] stored as JSON or YAML, gzip-compressed
//! unless opened/written in raw mode.

#[cfg(test)]
mod tests;

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use memmap2::Mmap;

use crate::log::*;
use crate::platform::BoardDescription;

#[derive(Debug, Clone, PartialEq)]
pub enum OpenWriteError {
    CantOpenFile(String),
    ParseError(String),
    SerializeError(String),
}

impl fmt::Display for OpenWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CantOpenFile(e) => write!(f, "can't open board file: {}", e),
            Self::ParseError(e) => write!(f, "malformed board file: {}", e),
            Self::SerializeError(e) => write!(f, "can't serialize board: {}", e),
        }
    }
}

impl std::error::Error for OpenWriteError {}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Encoding {
    Json,
    Yaml,
}

impl Encoding {
    /// Picks the encoding from the file name, looking through a `.gz` suffix.
    pub fn from_path(path: &Path) -> Self {
        let name = path.file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let name = name.strip_suffix(".gz").unwrap_or(&name);
        if name.ends_with(".json") {
            Self::Json
        } else {
            Self::Yaml
        }
    }
}

pub struct OpenOpts {
    pub raw: bool,
}

pub struct WriteOpts {
    pub raw: bool,
    pub compresion_level: u32,
}

impl Default for OpenOpts {
    fn default() -> Self {
        Self {
            raw: false
        }
    }
}

impl Default for WriteOpts {
    fn default() -> Self {
        Self { raw: false, compresion_level: 6 }
    }
}

pub fn decode(bytes: &[u8], encoding: Encoding) -> Result<BoardDescription, OpenWriteError> {
    match encoding {
        Encoding::Json => serde_json::from_slice(bytes)
            .map_err(|e| OpenWriteError::ParseError(format!("{}", e))),
        Encoding::Yaml => serde_yaml::from_slice(bytes)
            .map_err(|e| OpenWriteError::ParseError(format!("{}", e))),
    }
}

pub fn encode(board: &BoardDescription, encoding: Encoding) -> Result<String, OpenWriteError> {
    match encoding {
        Encoding::Json => serde_json::to_string_pretty(board)
            .map_err(|e| OpenWriteError::SerializeError(format!("{}", e))),
        Encoding::Yaml => serde_yaml::to_string(board)
            .map_err(|e| OpenWriteError::SerializeError(format!("{}", e))),
    }
}

pub fn open<P>(path: P, opts: OpenOpts) -> Result<BoardDescription, OpenWriteError> where
    P: AsRef<Path>
{
    let path = path.as_ref();
    let encoding = Encoding::from_path(path);
    let board_file = File::open(path)
        .map_err(|e| OpenWriteError::CantOpenFile(format!("{}: {}", path.display(), e)))?;

    dbg_log!(DBG_INFO, "Loading board file {} ({:?}, raw: {})", path.display(), encoding, opts.raw);

    /* Raw files are mapped straight into memory. Compressed ones have to go
     * through the decoder anyway. */
    if opts.raw {
        /* UNSAFE: UB if the file gets modified while mapped */
        let mmapped = unsafe { Mmap::map(&board_file) }
            .map_err(|e| OpenWriteError::CantOpenFile(format!("mmap failed: {}", e)))?;
        decode(&mmapped, encoding)
    } else {
        let mut bytes = Vec::new();
        BufReader::new(GzDecoder::new(board_file))
            .read_to_end(&mut bytes)
            .map_err(|e| OpenWriteError::CantOpenFile(format!("gzip: {}", e)))?;
        decode(&bytes, encoding)
    }
}

pub fn write<P>(path: P, board: &BoardDescription, opts: WriteOpts)
    -> Result<(), OpenWriteError> where P: AsRef<Path>
{
    let path = path.as_ref();
    let data = encode(board, Encoding::from_path(path))?;
    let board_file = File::create(path)
        .map_err(|e| OpenWriteError::CantOpenFile(format!("{}: {}", path.display(), e)))?;

    let io_err = |e: std::io::Error| OpenWriteError::CantOpenFile(format!("{}", e));
    if opts.raw {
        let mut w = BufWriter::new(board_file);
        w.write_all(data.as_bytes()).map_err(io_err)?;
        w.flush().map_err(io_err)?;
    } else {
        let mut e = GzEncoder::new(board_file, Compression::new(opts.compresion_level));
        e.write_all(data.as_bytes()).map_err(io_err)?;
        e.finish().map_err(io_err)?;
    }

    Ok(())
}
