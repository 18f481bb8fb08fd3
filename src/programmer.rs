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

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Utility used to load a bitstream onto the board. Only the invocation is
/// produced here, running it is left to the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Programmer {
    /// OpenOCD over JTAG, playing an SVF file with the given adapter config.
    OpenocdJtag { config: String },
    /// Vivado hardware manager in batch mode.
    Vivado,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Script the program expects next to the bitstream, if any.
    pub script: Option<Script>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Script {
    pub filename: String,
    pub contents: String,
}

pub const VIVADO_PROGRAM_SCRIPT: &str = "program.tcl";

impl Programmer {
    pub fn invocation(&self, bitstream: &Path) -> Invocation {
        let bitstream = bitstream.display().to_string();
        match self {
            Self::OpenocdJtag { config } => Invocation {
                program: "openocd".into(),
                args: vec![
                    "-f".into(),
                    config.clone(),
                    "-c".into(),
                    format!("transport select jtag; init; svf quiet progress {}; exit", bitstream),
                ],
                script: None,
            },
            Self::Vivado => {
                let device = "[lindex [get_hw_devices] 0]";
                let contents = [
                    "open_hw".to_string(),
                    "connect_hw_server".to_string(),
                    "open_hw_target".to_string(),
                    format!("set_property PROGRAM.FILE {{{}}} {}", bitstream, device),
                    format!("program_hw_devices {}", device),
                    format!("refresh_hw_device {}", device),
                    "quit".to_string(),
                ].join("\n") + "\n";
                Invocation {
                    program: "vivado".into(),
                    args: vec![
                        "-mode".into(),
                        "batch".into(),
                        "-source".into(),
                        VIVADO_PROGRAM_SCRIPT.into(),
                    ],
                    script: Some(Script { filename: VIVADO_PROGRAM_SCRIPT.into(), contents }),
                }
            }
        }
    }
}

impl fmt::Display for Programmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenocdJtag { config } => write!(f, "OpenOCD JTAG ({})", config),
            Self::Vivado => write!(f, "Vivado hardware manager"),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}
