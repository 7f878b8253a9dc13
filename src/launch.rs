//! Launching other cores from inside the scene.
//!
//! Every [`LaunchCategory`] pairs a texture for the cube grid with a core and
//! a content file. Walking into the grid's centre cube asks the host to swap
//! this core out for the category's target.

use std::{
    env, fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::anyhow;
use cgmath::{InnerSpace, Point3, Vector3};

use crate::{data_structures::block::GRID_DEPTH, libretro::frontend::Frontend};

pub const CORE_DIR_ENV: &str = "INSTANCING_VIEWER_CORE_DIR";
pub const CONTENT_DIR_ENV: &str = "INSTANCING_VIEWER_CONTENT_DIR";

/// How long the "Category: ..." notification stays on screen.
pub const MESSAGE_FRAMES: u32 = 180;

/// A hit is registered inside this radius around the grid's centre.
pub const HIT_RADIUS: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LaunchCategory {
    Games,
    #[cfg(not(any(target_os = "android", target_os = "ios")))]
    Movies,
    Scene1,
    Scene2,
    Model1,
    Model2,
}

/// A core plus the content it should be started with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaunchTarget {
    pub core: &'static str,
    pub content: &'static str,
}

impl LaunchCategory {
    /// Every category in SELECT cycling order.
    pub const ALL: &'static [LaunchCategory] = &[
        LaunchCategory::Games,
        #[cfg(not(any(target_os = "android", target_os = "ios")))]
        LaunchCategory::Movies,
        LaunchCategory::Scene1,
        LaunchCategory::Scene2,
        LaunchCategory::Model1,
        LaunchCategory::Model2,
    ];

    /// Value used for the `launch_category` core option.
    pub fn key(self) -> &'static str {
        match self {
            LaunchCategory::Games => "games",
            #[cfg(not(any(target_os = "android", target_os = "ios")))]
            LaunchCategory::Movies => "movies",
            LaunchCategory::Scene1 => "scene1",
            LaunchCategory::Scene2 => "scene2",
            LaunchCategory::Model1 => "model1",
            LaunchCategory::Model2 => "model2",
        }
    }

    pub fn next(self) -> Self {
        let all = Self::ALL;
        let index = all.iter().position(|&c| c == self).unwrap_or(0);
        all[(index + 1) % all.len()]
    }

    /// Image shown on the cubes, relative to the content directory.
    pub fn texture(self) -> &'static str {
        match self {
            LaunchCategory::Games => "tombraider.png",
            #[cfg(not(any(target_os = "android", target_os = "ios")))]
            LaunchCategory::Movies => "lionking.png",
            LaunchCategory::Scene1 => "scene1.png",
            LaunchCategory::Scene2 => "scene2.png",
            LaunchCategory::Model1 => "model1.png",
            LaunchCategory::Model2 => "model2.png",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            LaunchCategory::Games => "Category: Games",
            #[cfg(not(any(target_os = "android", target_os = "ios")))]
            LaunchCategory::Movies => "Category: Movies",
            LaunchCategory::Scene1 => "Category: Scene 1",
            LaunchCategory::Scene2 => "Category: Scene 2",
            LaunchCategory::Model1 => "Category: Cars",
            LaunchCategory::Model2 => "Category: Models",
        }
    }

    pub fn target(self) -> LaunchTarget {
        let (core, content) = match self {
            LaunchCategory::Games => ("pcsx_rearmed", "tombraider.bin"),
            #[cfg(not(any(target_os = "android", target_os = "ios")))]
            LaunchCategory::Movies => ("ffmpeg", "lionking.mp4"),
            LaunchCategory::Scene1 => ("scenewalker", "models/silenthill3_chapel/model.obj"),
            LaunchCategory::Scene2 => (
                "scenewalker",
                "models/Onechanbara - Hospital - by fullmoon/hospital.obj",
            ),
            LaunchCategory::Model1 => ("modelviewer", "models/mazda-3-mps/mazda 3.obj"),
            LaunchCategory::Model2 => ("modelviewer", "models/Vanille-working/vanille_obj.obj"),
        };
        LaunchTarget { core, content }
    }
}

impl fmt::Display for LaunchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for LaunchCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.key() == s)
            .ok_or_else(|| anyhow!("unknown launch category {s:?}"))
    }
}

/// File name of a core on the current platform.
pub fn core_file_name(core: &str) -> String {
    if cfg!(target_os = "android") {
        format!("libretro_{core}.so")
    } else {
        format!("{core}_libretro.so")
    }
}

/// Where cores and content live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchPaths {
    pub core_dir: PathBuf,
    pub content_dir: PathBuf,
}

impl Default for LaunchPaths {
    fn default() -> Self {
        if cfg!(target_os = "android") {
            Self {
                core_dir: PathBuf::from("/data/app-lib/org.retroarch-1"),
                content_dir: PathBuf::from("/storage/sdcard1/roms"),
            }
        } else {
            Self {
                core_dir: PathBuf::from("."),
                content_dir: PathBuf::from("."),
            }
        }
    }
}

impl LaunchPaths {
    /// Environment variables win, then the host's view (this core's own
    /// directory and the loaded content's directory), then the platform
    /// defaults.
    pub fn resolve(frontend: &mut dyn Frontend, content: Option<&Path>) -> Self {
        let defaults = Self::default();
        let parent = |p: &Path| {
            p.parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Path::to_path_buf)
        };

        let core_dir = env::var_os(CORE_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| frontend.libretro_path().as_deref().and_then(parent))
            .unwrap_or(defaults.core_dir);
        let content_dir = env::var_os(CONTENT_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| content.and_then(parent))
            .unwrap_or(defaults.content_dir);

        Self {
            core_dir,
            content_dir,
        }
    }

    pub fn texture(&self, category: LaunchCategory) -> PathBuf {
        self.content_dir.join(category.texture())
    }

    pub fn core(&self, target: &LaunchTarget) -> PathBuf {
        self.core_dir.join(core_file_name(target.core))
    }

    pub fn content(&self, target: &LaunchTarget) -> PathBuf {
        self.content_dir.join(target.content)
    }
}

/// Centre of the cube grid in world space.
pub fn grid_origin() -> Point3<f32> {
    Point3::new(0.0, 0.0, GRID_DEPTH)
}

/// Whether the player stands close enough to the grid's centre to launch.
pub fn check_collision(player: Point3<f32>) -> bool {
    let distance: Vector3<f32> = player - grid_origin();
    log::debug!(
        "player {:?}, distance to grid centre {:?}",
        player,
        distance
    );
    distance.magnitude2() < HIT_RADIUS * HIT_RADIUS
}

/// Ask the host to switch to the category's core. The content is only
/// sent once the host accepted the core.
pub fn launch(frontend: &mut dyn Frontend, paths: &LaunchPaths, category: LaunchCategory) -> bool {
    let target = category.target();
    let core = paths.core(&target);
    if !frontend.set_libretro_path(&core) {
        log::warn!("Host refused to switch to core {}", core.display());
        return false;
    }
    let content = paths.content(&target);
    log::info!("Launching {} with {}", core.display(), content.display());
    frontend.exec_escape(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycling_visits_every_category_once() {
        let mut category = LaunchCategory::Games;
        let mut seen = Vec::new();
        for _ in 0..LaunchCategory::ALL.len() {
            seen.push(category);
            category = category.next();
        }
        assert_eq!(seen, LaunchCategory::ALL);
        assert_eq!(category, LaunchCategory::Games);
    }

    #[test]
    fn keys_parse_back() {
        for &category in LaunchCategory::ALL {
            assert_eq!(category.key().parse::<LaunchCategory>().unwrap(), category);
        }
        assert!("Games".parse::<LaunchCategory>().is_err());
    }

    #[test]
    fn model_categories_are_cars_and_models() {
        assert_eq!(LaunchCategory::Model1.message(), "Category: Cars");
        assert_eq!(LaunchCategory::Model2.message(), "Category: Models");
        assert_eq!(LaunchCategory::Model2.next(), LaunchCategory::Games);
    }

    #[test]
    fn collision_needs_to_be_near_the_grid_centre() {
        assert!(!check_collision(Point3::new(0.0, 0.0, 0.0)));
        assert!(check_collision(Point3::new(0.0, 0.0, -100.0)));
        assert!(check_collision(Point3::new(3.0, 0.0, -96.1)));
        assert!(!check_collision(Point3::new(3.0, 4.0, -100.0)));
        assert!(!check_collision(Point3::new(0.0, 0.0, -95.0)));
    }

    #[test]
    fn paths_join_core_and_content() {
        let paths = LaunchPaths {
            core_dir: PathBuf::from("/cores"),
            content_dir: PathBuf::from("/roms"),
        };
        let target = LaunchCategory::Scene1.target();
        let core = paths.core(&target);
        assert!(core.starts_with("/cores"));
        assert!(core.to_string_lossy().contains("scenewalker"));
        assert_eq!(
            paths.content(&target),
            PathBuf::from("/roms/models/silenthill3_chapel/model.obj")
        );
        assert_eq!(
            paths.texture(LaunchCategory::Scene2),
            PathBuf::from("/roms/scene2.png")
        );
    }

    #[cfg(not(target_os = "android"))]
    #[test]
    fn desktop_cores_use_the_libretro_suffix() {
        assert_eq!(core_file_name("ffmpeg"), "ffmpeg_libretro.so");
    }
}
