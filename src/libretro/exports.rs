//! The `retro_*` entry points.
//!
//! The host drives the core from a single thread, so all state lives in one
//! thread-local [`Core`]. Each export borrows it for the duration of the call
//! and never calls back into another export.

use std::{
    cell::RefCell,
    ffi::CStr,
    os::raw::{c_char, c_uint, c_void},
    path::PathBuf,
    ptr,
    sync::Arc,
};

use super::{frontend::RetroFrontend, sys::*};
use crate::{
    config::{BASE_HEIGHT, BASE_WIDTH, CoreOptions, MAX_HEIGHT, MAX_WIDTH},
    context::GlContext,
    render::Frame,
    viewer::{LoadedContent, Viewer},
};

pub const LIBRARY_NAME: &CStr = c"InstancingViewer GL";
pub const LIBRARY_VERSION: &CStr = c"v2";
pub const VALID_EXTENSIONS: &CStr = c"png";

pub const FPS: f64 = 60.0;
pub const SAMPLE_RATE: f64 = 30000.0;

/// Callbacks the host fills in while accepting the hardware render request.
#[derive(Default, Clone, Copy)]
struct HwCallbacks {
    get_current_framebuffer: Option<retro_hw_get_current_framebuffer_t>,
    get_proc_address: Option<retro_hw_get_proc_address_t>,
}

impl HwCallbacks {
    fn current_framebuffer(&self) -> usize {
        match self.get_current_framebuffer {
            // SAFETY: only called from retro_run, while the context is current.
            Some(cb) => unsafe { cb() },
            None => 0,
        }
    }
}

#[derive(Default)]
struct Core {
    frontend: RetroFrontend,
    hw: HwCallbacks,
    viewer: Option<Viewer>,
    gl: Option<GlContext>,
}

thread_local! {
    static CORE: RefCell<Core> = RefCell::new(Core::default());
}

fn hw_context_type() -> c_uint {
    if cfg!(feature = "gles") {
        RETRO_HW_CONTEXT_OPENGLES2
    } else {
        RETRO_HW_CONTEXT_OPENGL
    }
}

/// Copy what the host passed to `retro_load_game` out of its buffers.
///
/// # Safety
///
/// `path` must be null or NUL-terminated, `data` null or valid for `size` bytes.
unsafe fn loaded_content(info: &retro_game_info) -> LoadedContent {
    let path = (!info.path.is_null()).then(|| {
        let path = unsafe { CStr::from_ptr(info.path) };
        PathBuf::from(path.to_string_lossy().into_owned())
    });
    let data = (!info.data.is_null() && info.size > 0).then(|| {
        let bytes = unsafe { std::slice::from_raw_parts(info.data as *const u8, info.size) };
        Arc::<[u8]>::from(bytes)
    });
    LoadedContent { path, data }
}

extern "C" fn context_reset() {
    log::info!("Context reset!");
    CORE.with_borrow_mut(|core| {
        // Objects of a lost context are gone with it.
        core.gl = None;
        let Some(get_proc_address) = core.hw.get_proc_address else {
            log::error!("Host did not provide get_proc_address");
            return;
        };
        // SAFETY: the host makes its context current before calling context_reset.
        match unsafe { GlContext::from_loader(get_proc_address) } {
            Ok(gl) => core.gl = Some(gl),
            Err(e) => log::error!("Failed to set up GL resources: {e:#}"),
        }
    });
}

extern "C" fn context_destroy() {
    log::info!("Context destroy!");
    CORE.with_borrow_mut(|core| {
        if let Some(gl) = core.gl.take() {
            // SAFETY: the context is still current during context_destroy.
            unsafe { gl.destroy() };
        }
    });
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_init() {
    let env = env_logger::Env::default().default_filter_or("info");
    if let Err(e) = env_logger::Builder::from_env(env).try_init() {
        eprintln!("Warning: Could not initialize logger: {}", e);
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_deinit() {
    CORE.with_borrow_mut(|core| {
        core.viewer = None;
        core.gl = None;
    });
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_api_version() -> c_uint {
    RETRO_API_VERSION
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_set_controller_port_device(port: c_uint, device: c_uint) {
    log::info!("Plugging device {device} into port {port}.");
}

/// # Safety
///
/// `info` must be null or point to a writable `retro_system_info`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_get_system_info(info: *mut retro_system_info) {
    let Some(info) = (unsafe { info.as_mut() }) else {
        return;
    };
    *info = retro_system_info {
        library_name: LIBRARY_NAME.as_ptr(),
        library_version: LIBRARY_VERSION.as_ptr(),
        valid_extensions: VALID_EXTENSIONS.as_ptr(),
        need_fullpath: false,
        block_extract: false,
    };
}

pub fn system_av_info() -> retro_system_av_info {
    retro_system_av_info {
        geometry: retro_game_geometry {
            base_width: BASE_WIDTH,
            base_height: BASE_HEIGHT,
            max_width: MAX_WIDTH,
            max_height: MAX_HEIGHT,
            aspect_ratio: 4.0 / 3.0,
        },
        timing: retro_system_timing {
            fps: FPS,
            sample_rate: SAMPLE_RATE,
        },
    }
}

/// # Safety
///
/// `info` must be null or point to a writable `retro_system_av_info`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_get_system_av_info(info: *mut retro_system_av_info) {
    if let Some(info) = unsafe { info.as_mut() } {
        *info = system_av_info();
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_set_environment(cb: retro_environment_t) {
    CORE.with_borrow_mut(|core| {
        core.frontend.environment = Some(cb);
        CoreOptions::declare(&mut core.frontend);
    });
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_set_video_refresh(cb: retro_video_refresh_t) {
    CORE.with_borrow_mut(|core| core.frontend.video_refresh = Some(cb));
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_set_audio_sample(cb: retro_audio_sample_t) {
    CORE.with_borrow_mut(|core| core.frontend.audio_sample = Some(cb));
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_set_audio_sample_batch(cb: retro_audio_sample_batch_t) {
    CORE.with_borrow_mut(|core| core.frontend.audio_sample_batch = Some(cb));
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_set_input_poll(cb: retro_input_poll_t) {
    CORE.with_borrow_mut(|core| core.frontend.input_poll = Some(cb));
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_set_input_state(cb: retro_input_state_t) {
    CORE.with_borrow_mut(|core| core.frontend.input_state = Some(cb));
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_reset() {
    CORE.with_borrow_mut(|core| {
        if let Some(viewer) = core.viewer.as_mut() {
            viewer.reset();
        }
    });
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_run() {
    CORE.with_borrow_mut(|core| {
        let Core {
            frontend,
            hw,
            viewer,
            gl,
        } = core;
        let Some(viewer) = viewer.as_mut() else {
            return;
        };
        let update = viewer.update(frontend);
        let Some(gl) = gl.as_mut() else {
            return;
        };
        let frame = Frame {
            framebuffer: hw.current_framebuffer(),
            resolution: update.resolution,
            camera: update.camera,
        };
        // SAFETY: the host keeps its context current for the whole of retro_run.
        unsafe {
            gl.sync_grid(update.grid);
            gl.sync_texture(viewer.texture());
            gl.draw(&frame);
        }
        frontend.present(update.resolution.width, update.resolution.height);
    });
}

/// # Safety
///
/// `info` must be null or point to a `retro_game_info` whose buffers stay
/// valid for the duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn retro_load_game(info: *const retro_game_info) -> bool {
    let content = match unsafe { info.as_ref() } {
        Some(info) => unsafe { loaded_content(info) },
        None => LoadedContent::default(),
    };

    CORE.with_borrow_mut(|core| {
        if !core.frontend.set_pixel_format_xrgb8888() {
            log::error!("XRGB8888 is not supported.");
            return false;
        }

        let mut hw_render = retro_hw_render_callback {
            context_type: hw_context_type(),
            context_reset: Some(context_reset),
            get_current_framebuffer: None,
            get_proc_address: None,
            depth: true,
            stencil: false,
            bottom_left_origin: false,
            version_major: 0,
            version_minor: 0,
            cache_context: false,
            context_destroy: Some(context_destroy),
            debug_context: false,
        };
        if !core.frontend.set_hw_render(&mut hw_render) {
            log::error!("HW Context could not be initialized, exiting...");
            return false;
        }
        core.hw = HwCallbacks {
            get_current_framebuffer: hw_render.get_current_framebuffer,
            get_proc_address: hw_render.get_proc_address,
        };

        core.viewer = Some(Viewer::load(&mut core.frontend, content));
        log::info!("Loaded game!");
        true
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_load_game_special(
    _game_type: c_uint,
    _info: *const retro_game_info,
    _num_info: usize,
) -> bool {
    false
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_unload_game() {
    CORE.with_borrow_mut(|core| core.viewer = None);
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_get_region() -> c_uint {
    RETRO_REGION_NTSC
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_serialize_size() -> usize {
    0
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_serialize(_data: *mut c_void, _size: usize) -> bool {
    false
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_unserialize(_data: *const c_void, _size: usize) -> bool {
    false
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_get_memory_data(_id: c_uint) -> *mut c_void {
    ptr::null_mut()
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_get_memory_size(_id: c_uint) -> usize {
    0
}

#[unsafe(no_mangle)]
pub extern "C" fn retro_cheat_reset() {}

#[unsafe(no_mangle)]
pub extern "C" fn retro_cheat_set(_index: c_uint, _enabled: bool, _code: *const c_char) {}
