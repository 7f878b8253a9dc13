//! Frame-by-frame scene logic.
//!
//! The [`Viewer`] owns everything that survives a GL context loss: options,
//! camera, launch category and which texture the grid should show. Each
//! frame it reads input through a [`Frontend`], moves the camera, reacts to
//! SELECT and to the player reaching the grid's centre, and hands back a
//! [`FrameUpdate`] describing what should be drawn. It never touches GL, so
//! the whole lifecycle can be exercised without a host.
//!
//! # Lifecycle
//!
//! 1. [`Viewer::load`] when the host loads content
//! 2. [`Viewer::update`] once per `retro_run`
//! 3. [`Viewer::reset`] on `retro_reset`

use std::{path::PathBuf, sync::Arc};

use crate::{
    camera::{Camera, CameraController, CameraInput, CameraUniform, Projection},
    config::{CoreOptions, OptionChanges, Resolution},
    context::SceneTexture,
    data_structures::block::GridParams,
    launch::{self, LaunchCategory, LaunchPaths, MESSAGE_FRAMES},
    libretro::{frontend::Frontend, sys::*},
    resources::texture::TextureSource,
};

/// Frames SELECT is ignored for after it switched the category.
pub const SELECT_DEBOUNCE_FRAMES: u32 = 30;

/// What the host handed to `retro_load_game`.
#[derive(Clone, Debug, Default)]
pub struct LoadedContent {
    pub path: Option<PathBuf>,
    pub data: Option<Arc<[u8]>>,
}

/// Player-one input for a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PadInput {
    pub camera: CameraInput,
    pub select: bool,
}

impl PadInput {
    pub fn poll(frontend: &mut dyn Frontend) -> Self {
        frontend.poll_input();
        let mut pressed = |id| frontend.input_state(0, RETRO_DEVICE_JOYPAD, 0, id) != 0;
        let forward = pressed(RETRO_DEVICE_ID_JOYPAD_UP);
        let backward = pressed(RETRO_DEVICE_ID_JOYPAD_DOWN);
        let left = pressed(RETRO_DEVICE_ID_JOYPAD_LEFT);
        let right = pressed(RETRO_DEVICE_ID_JOYPAD_RIGHT);
        let select = pressed(RETRO_DEVICE_ID_JOYPAD_SELECT);
        let mouse_dx = frontend.input_state(0, RETRO_DEVICE_MOUSE, 0, RETRO_DEVICE_ID_MOUSE_X);
        let mouse_dy = frontend.input_state(0, RETRO_DEVICE_MOUSE, 0, RETRO_DEVICE_ID_MOUSE_Y);
        Self {
            camera: CameraInput {
                mouse_dx: mouse_dx.into(),
                mouse_dy: mouse_dy.into(),
                forward,
                backward,
                left,
                right,
            },
            select,
        }
    }
}

/// Everything the renderer needs for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameUpdate {
    pub camera: CameraUniform,
    pub resolution: Resolution,
    pub grid: GridParams,
    /// The host accepted a launch request this frame.
    pub launched: bool,
}

pub struct Viewer {
    pub options: CoreOptions,
    pub camera: Camera,
    controller: CameraController,
    projection: Projection,
    paths: LaunchPaths,
    texture: SceneTexture,
    select_timeout: u32,
    in_hit_radius: bool,
}

impl Viewer {
    /// Read the options, work out where cores and content live and pick the
    /// initial texture: the loaded content itself if the host passed any,
    /// otherwise the current category's image.
    pub fn load(frontend: &mut dyn Frontend, content: LoadedContent) -> Self {
        let mut options = CoreOptions::default();
        options.refresh(frontend);
        let paths = LaunchPaths::resolve(frontend, content.path.as_deref());
        log::info!(
            "Cores from {}, content from {}",
            paths.core_dir.display(),
            paths.content_dir.display()
        );

        let source = match (content.data, content.path) {
            (Some(data), _) if !data.is_empty() => TextureSource::Memory(data),
            (_, Some(path)) => TextureSource::Path(path),
            _ => TextureSource::Path(paths.texture(options.category)),
        };

        Self {
            options,
            camera: Camera::default(),
            controller: CameraController::default(),
            projection: Projection::default(),
            paths,
            texture: SceneTexture {
                source,
                revision: 0,
            },
            select_timeout: 0,
            in_hit_radius: false,
        }
    }

    pub fn texture(&self) -> &SceneTexture {
        &self.texture
    }

    pub fn category(&self) -> LaunchCategory {
        self.options.category
    }

    pub fn paths(&self) -> &LaunchPaths {
        &self.paths
    }

    /// Put the player back at the start.
    pub fn reset(&mut self) {
        self.camera = Camera::default();
        self.select_timeout = 0;
        self.in_hit_radius = false;
    }

    fn show_category_texture(&mut self) {
        self.texture = SceneTexture {
            source: TextureSource::Path(self.paths.texture(self.options.category)),
            revision: self.texture.revision + 1,
        };
    }

    /// Apply host-side option changes. Grid and resolution are read fresh
    /// every frame; only a category switch needs extra work.
    pub fn apply_options(&mut self, changes: OptionChanges) {
        if changes.category {
            log::info!("Launch category set to {}", self.options.category);
            self.show_category_texture();
        }
    }

    fn cycle_category(&mut self, frontend: &mut dyn Frontend) {
        self.options.category = self.options.category.next();
        self.show_category_texture();
        let message = self.options.category.message();
        log::info!("{message}");
        frontend.show_message(message, MESSAGE_FRAMES);
    }

    pub fn update(&mut self, frontend: &mut dyn Frontend) -> FrameUpdate {
        if frontend.variables_updated() {
            let changes = self.options.refresh(frontend);
            self.apply_options(changes);
        }

        let input = PadInput::poll(frontend);
        self.controller.update_camera(&mut self.camera, &input.camera);

        if input.select && self.select_timeout == 0 {
            self.select_timeout = SELECT_DEBOUNCE_FRAMES;
            self.cycle_category(frontend);
        } else if self.select_timeout > 0 {
            self.select_timeout -= 1;
        }

        let hit = launch::check_collision(self.camera.position);
        let launched = hit
            && !self.in_hit_radius
            && launch::launch(frontend, &self.paths, self.options.category);
        self.in_hit_radius = hit;

        let mut camera = CameraUniform::new();
        camera.update_view_proj(&self.camera, &self.projection);
        FrameUpdate {
            camera,
            resolution: self.options.resolution,
            grid: self.options.grid,
            launched,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use cgmath::Point3;

    use super::*;

    #[derive(Default)]
    struct Host {
        select: bool,
        up: bool,
        messages: Vec<String>,
        launches: Vec<PathBuf>,
    }

    impl Frontend for Host {
        fn set_variables(&mut self, _: &[(&str, String)]) -> bool {
            true
        }
        fn variable(&mut self, _: &str) -> Option<String> {
            None
        }
        fn variables_updated(&mut self) -> bool {
            false
        }
        fn show_message(&mut self, message: &str, _: u32) -> bool {
            self.messages.push(message.to_string());
            true
        }
        fn libretro_path(&mut self) -> Option<PathBuf> {
            Some(PathBuf::from("/cores/instancing_viewer_libretro.so"))
        }
        fn set_libretro_path(&mut self, core: &Path) -> bool {
            self.launches.push(core.to_path_buf());
            true
        }
        fn exec_escape(&mut self, content: &Path) -> bool {
            self.launches.push(content.to_path_buf());
            true
        }
        fn poll_input(&mut self) {}
        fn input_state(&mut self, _: u32, device: u32, _: u32, id: u32) -> i16 {
            let held = match (device, id) {
                (RETRO_DEVICE_JOYPAD, RETRO_DEVICE_ID_JOYPAD_SELECT) => self.select,
                (RETRO_DEVICE_JOYPAD, RETRO_DEVICE_ID_JOYPAD_UP) => self.up,
                _ => false,
            };
            held as i16
        }
    }

    fn content(path: &str) -> LoadedContent {
        LoadedContent {
            path: Some(PathBuf::from(path)),
            data: None,
        }
    }

    #[test]
    fn loaded_content_is_the_first_texture() {
        let mut host = Host::default();
        let viewer = Viewer::load(&mut host, content("/roms/cover.png"));
        assert_eq!(
            viewer.texture().source,
            TextureSource::Path(PathBuf::from("/roms/cover.png"))
        );
        assert_eq!(viewer.paths().core_dir, PathBuf::from("/cores"));
    }

    #[test]
    fn in_memory_content_wins_over_its_path() {
        let mut host = Host::default();
        let data: Arc<[u8]> = Arc::from(&[1u8, 2, 3][..]);
        let viewer = Viewer::load(
            &mut host,
            LoadedContent {
                path: Some(PathBuf::from("/roms/cover.png")),
                data: Some(data.clone()),
            },
        );
        assert_eq!(viewer.texture().source, TextureSource::Memory(data));
    }

    #[test]
    fn without_content_the_category_image_is_used() {
        let mut host = Host::default();
        let viewer = Viewer::load(&mut host, LoadedContent::default());
        match &viewer.texture().source {
            TextureSource::Path(path) => assert!(path.ends_with("tombraider.png")),
            other => panic!("unexpected texture source {other:?}"),
        }
    }

    #[test]
    fn select_is_debounced() {
        let mut host = Host {
            select: true,
            ..Default::default()
        };
        let mut viewer = Viewer::load(&mut host, content("/roms/cover.png"));
        for _ in 0..=SELECT_DEBOUNCE_FRAMES {
            viewer.update(&mut host);
        }
        assert_eq!(host.messages.len(), 1);
        assert_eq!(viewer.category(), LaunchCategory::Games.next());
        assert_eq!(viewer.texture().revision, 1);

        viewer.update(&mut host);
        assert_eq!(host.messages.len(), 2);
        assert_eq!(viewer.category(), LaunchCategory::Games.next().next());
    }

    #[test]
    fn walking_into_the_grid_launches_once() {
        let mut host = Host::default();
        let mut viewer = Viewer::load(&mut host, content("/roms/cover.png"));
        viewer.camera.position = Point3::new(0.0, 0.0, -94.0);
        host.up = true;

        let mut launched = 0;
        for _ in 0..16 {
            if viewer.update(&mut host).launched {
                launched += 1;
            }
        }
        assert_eq!(launched, 1);
        assert_eq!(
            host.launches,
            [
                PathBuf::from("/cores/pcsx_rearmed_libretro.so"),
                PathBuf::from("/roms/tombraider.bin")
            ]
        );
    }

    #[test]
    fn reset_returns_to_the_start() {
        let mut host = Host {
            up: true,
            ..Default::default()
        };
        let mut viewer = Viewer::load(&mut host, content("/roms/cover.png"));
        viewer.update(&mut host);
        assert_ne!(viewer.camera, Camera::default());
        viewer.reset();
        assert_eq!(viewer.camera, Camera::default());
    }
}
