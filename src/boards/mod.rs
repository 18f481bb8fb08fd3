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

//! Built-in board catalog.

pub mod colorlight_5a_75b;
pub mod ecpix5;
pub mod xcu1525;
#[cfg(test)]
mod tests;

use crate::common::period_ns_from_hz;
use crate::platform::*;
use crate::programmer::Programmer;

/// Revision name of boards that only ever had one.
pub const DEFAULT_REVISION: &str = "default";

lazy_static! {
    static ref CATALOG: Vec<BoardDescription> = vec![
        colorlight_5a_75b::board(),
        ecpix5::board(),
        xcu1525::board(),
    ];
}

pub fn all() -> &'static [BoardDescription] {
    &CATALOG
}

pub fn names() -> Vec<&'static str> {
    CATALOG.iter().map(|b| b.name.as_str()).collect()
}

pub fn get(name: &str) -> Option<&'static BoardDescription> {
    CATALOG.iter().find(|b| b.name == name)
}
