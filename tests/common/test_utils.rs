use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use instancing_viewer::{
    Frontend,
    libretro::sys::{
        RETRO_DEVICE_ID_MOUSE_X, RETRO_DEVICE_ID_MOUSE_Y, RETRO_DEVICE_JOYPAD, RETRO_DEVICE_MOUSE,
    },
};

/// Everything the core asked the host to do, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostCall {
    Message(String, u32),
    SetLibretroPath(PathBuf),
    ExecEscape(PathBuf),
}

/// A host driven by the test: options, held buttons and mouse motion are set
/// directly and every request the core makes is recorded.
pub struct ScriptedHost {
    pub variables: HashMap<String, String>,
    pub declared: Vec<(String, String)>,
    pub updated: bool,
    pub libretro_path: Option<PathBuf>,
    pub accept_core: bool,
    pub accept_exec: bool,
    pub buttons: Vec<u32>,
    pub mouse: (i16, i16),
    pub calls: Vec<HostCall>,
    polls: u32,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self {
            variables: HashMap::new(),
            declared: Vec::new(),
            updated: false,
            libretro_path: Some(PathBuf::from("/cores/instancing_viewer_libretro.so")),
            accept_core: true,
            accept_exec: true,
            buttons: Vec::new(),
            mouse: (0, 0),
            calls: Vec::new(),
            polls: 0,
        }
    }

    /// Change an option the way a user would from the host's menu.
    pub fn set_option(&mut self, key: &str, value: &str) {
        self.variables.insert(key.to_string(), value.to_string());
        self.updated = true;
    }

    pub fn hold(&mut self, button: u32) {
        if !self.buttons.contains(&button) {
            self.buttons.push(button);
        }
    }

    pub fn release(&mut self, button: u32) {
        self.buttons.retain(|&b| b != button);
    }

    pub fn messages(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Message(text, _) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn launch_calls(&self) -> Vec<&HostCall> {
        self.calls
            .iter()
            .filter(|call| !matches!(call, HostCall::Message(..)))
            .collect()
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }
}

impl Default for ScriptedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for ScriptedHost {
    fn set_variables(&mut self, variables: &[(&str, String)]) -> bool {
        self.declared = variables
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        true
    }

    fn variable(&mut self, key: &str) -> Option<String> {
        self.variables.get(key).cloned()
    }

    fn variables_updated(&mut self) -> bool {
        std::mem::take(&mut self.updated)
    }

    fn show_message(&mut self, message: &str, frames: u32) -> bool {
        self.calls.push(HostCall::Message(message.to_string(), frames));
        true
    }

    fn libretro_path(&mut self) -> Option<PathBuf> {
        self.libretro_path.clone()
    }

    fn set_libretro_path(&mut self, core: &Path) -> bool {
        self.calls.push(HostCall::SetLibretroPath(core.to_path_buf()));
        self.accept_core
    }

    fn exec_escape(&mut self, content: &Path) -> bool {
        self.calls.push(HostCall::ExecEscape(content.to_path_buf()));
        self.accept_exec
    }

    fn poll_input(&mut self) {
        self.polls += 1;
    }

    fn input_state(&mut self, port: u32, device: u32, _index: u32, id: u32) -> i16 {
        if port != 0 {
            return 0;
        }
        match device {
            RETRO_DEVICE_JOYPAD => self.buttons.contains(&id) as i16,
            RETRO_DEVICE_MOUSE if id == RETRO_DEVICE_ID_MOUSE_X => self.mouse.0,
            RETRO_DEVICE_MOUSE if id == RETRO_DEVICE_ID_MOUSE_Y => self.mouse.1,
            _ => 0,
        }
    }
}

pub const EPSILON: f32 = 1e-4;

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}
