//! The host seam.
//!
//! Everything the viewer needs from the host process goes through the
//! [`Frontend`] trait, so the scene logic can be driven by a scripted host in
//! tests. [`RetroFrontend`] is the real implementation backed by the callbacks
//! the host registers through `retro_set_*`.

use std::{
    ffi::{CStr, CString},
    os::raw::c_char,
    path::{Path, PathBuf},
    ptr,
};

use super::sys::{self, *};

/// Operations the host process offers to a running core.
pub trait Frontend {
    /// Declare the core options as `(key, "Description; a|b|c")` pairs.
    fn set_variables(&mut self, variables: &[(&str, String)]) -> bool;

    /// Current value of a core option, `None` if the host doesn't know it.
    fn variable(&mut self, key: &str) -> Option<String>;

    /// Whether any core option changed since the last query.
    fn variables_updated(&mut self) -> bool;

    /// Show an on-screen message for `frames` frames.
    fn show_message(&mut self, message: &str, frames: u32) -> bool;

    /// Full path of the currently loaded core, if the host reports it.
    fn libretro_path(&mut self) -> Option<PathBuf>;

    /// Select the core the host should switch to.
    fn set_libretro_path(&mut self, core: &Path) -> bool;

    /// Ask the host to leave this core and run `content` with the core picked
    /// by [`set_libretro_path`](Self::set_libretro_path).
    fn exec_escape(&mut self, content: &Path) -> bool;

    fn poll_input(&mut self);

    fn input_state(&mut self, port: u32, device: u32, index: u32, id: u32) -> i16;
}

/// Callback-backed [`Frontend`]. Every callback is optional because the host
/// registers them one at a time; a missing callback behaves like a host that
/// rejects the request.
#[derive(Default, Clone, Copy)]
pub struct RetroFrontend {
    pub environment: Option<retro_environment_t>,
    pub video_refresh: Option<retro_video_refresh_t>,
    pub audio_sample: Option<retro_audio_sample_t>,
    pub audio_sample_batch: Option<retro_audio_sample_batch_t>,
    pub input_poll: Option<retro_input_poll_t>,
    pub input_state: Option<retro_input_state_t>,
}

impl RetroFrontend {
    fn environment(&self, cmd: u32, data: *mut std::os::raw::c_void) -> bool {
        match self.environment {
            // SAFETY: the host guarantees the callback accepts any command and
            // `data` points to the structure the command documents.
            Some(cb) => unsafe { cb(cmd, data) },
            None => false,
        }
    }

    fn send_path(&self, cmd: u32, path: &Path) -> bool {
        let Ok(path) = CString::new(path.to_string_lossy().as_bytes()) else {
            log::warn!("Path {} contains a NUL byte", path.display());
            return false;
        };
        self.environment(cmd, path.as_ptr() as *mut _)
    }

    pub fn set_pixel_format_xrgb8888(&self) -> bool {
        let mut format = RETRO_PIXEL_FORMAT_XRGB8888;
        self.environment(
            RETRO_ENVIRONMENT_SET_PIXEL_FORMAT,
            &mut format as *mut u32 as *mut _,
        )
    }

    /// Request a hardware context. The host fills in `get_current_framebuffer`
    /// and `get_proc_address` during the call.
    pub fn set_hw_render(&self, callback: &mut sys::retro_hw_render_callback) -> bool {
        self.environment(
            RETRO_ENVIRONMENT_SET_HW_RENDER,
            callback as *mut sys::retro_hw_render_callback as *mut _,
        )
    }

    /// Report a frame that was rendered straight into the host framebuffer.
    pub fn present(&self, width: u32, height: u32) {
        if let Some(cb) = self.video_refresh {
            // SAFETY: the sentinel pointer is how the ABI marks hardware frames.
            unsafe { cb(RETRO_HW_FRAME_BUFFER_VALID, width, height, 0) };
        }
    }
}

impl Frontend for RetroFrontend {
    fn set_variables(&mut self, variables: &[(&str, String)]) -> bool {
        let mut owned = Vec::with_capacity(variables.len());
        for (key, value) in variables {
            match (CString::new(*key), CString::new(value.as_str())) {
                (Ok(key), Ok(value)) => owned.push((key, value)),
                _ => log::warn!("Skipping core option {key} with an embedded NUL byte"),
            }
        }
        let mut raw: Vec<retro_variable> = owned
            .iter()
            .map(|(key, value)| retro_variable {
                key: key.as_ptr(),
                value: value.as_ptr(),
            })
            .collect();
        raw.push(retro_variable {
            key: ptr::null(),
            value: ptr::null(),
        });
        self.environment(RETRO_ENVIRONMENT_SET_VARIABLES, raw.as_mut_ptr() as *mut _)
    }

    fn variable(&mut self, key: &str) -> Option<String> {
        let key = CString::new(key).ok()?;
        let mut var = retro_variable {
            key: key.as_ptr(),
            value: ptr::null(),
        };
        if !self.environment(
            RETRO_ENVIRONMENT_GET_VARIABLE,
            &mut var as *mut retro_variable as *mut _,
        ) || var.value.is_null()
        {
            return None;
        }
        // SAFETY: the host returned a NUL-terminated string it keeps alive
        // until the next environment call.
        let value = unsafe { CStr::from_ptr(var.value) };
        Some(value.to_string_lossy().into_owned())
    }

    fn variables_updated(&mut self) -> bool {
        let mut updated = false;
        self.environment(
            RETRO_ENVIRONMENT_GET_VARIABLE_UPDATE,
            &mut updated as *mut bool as *mut _,
        ) && updated
    }

    fn show_message(&mut self, message: &str, frames: u32) -> bool {
        let Ok(text) = CString::new(message) else {
            return false;
        };
        let mut msg = retro_message {
            msg: text.as_ptr(),
            frames,
        };
        self.environment(
            RETRO_ENVIRONMENT_SET_MESSAGE,
            &mut msg as *mut retro_message as *mut _,
        )
    }

    fn libretro_path(&mut self) -> Option<PathBuf> {
        let mut path: *const c_char = ptr::null();
        if !self.environment(
            RETRO_ENVIRONMENT_GET_LIBRETRO_PATH,
            &mut path as *mut *const c_char as *mut _,
        ) || path.is_null()
        {
            return None;
        }
        // SAFETY: non-null path strings from the host are NUL-terminated.
        let path = unsafe { CStr::from_ptr(path) };
        Some(PathBuf::from(path.to_string_lossy().into_owned()))
    }

    fn set_libretro_path(&mut self, core: &Path) -> bool {
        self.send_path(RETRO_ENVIRONMENT_SET_LIBRETRO_PATH, core)
    }

    fn exec_escape(&mut self, content: &Path) -> bool {
        self.send_path(RETRO_ENVIRONMENT_EXEC_ESCAPE, content)
    }

    fn poll_input(&mut self) {
        if let Some(cb) = self.input_poll {
            // SAFETY: plain host callback without arguments.
            unsafe { cb() };
        }
    }

    fn input_state(&mut self, port: u32, device: u32, index: u32, id: u32) -> i16 {
        match self.input_state {
            // SAFETY: plain host callback taking integers only.
            Some(cb) => unsafe { cb(port, device, index, id) },
            None => 0,
        }
    }
}
