//! Core options exposed to the host.
//!
//! The host shows these in its options menu and hands back the chosen value
//! as a string. [`CoreOptions`] owns the parsed values and knows how to
//! declare and refresh them through a [`Frontend`].

use std::fmt;

use anyhow::{Context as _, bail};

use crate::{
    data_structures::block::GridParams, launch::LaunchCategory, libretro::frontend::Frontend,
};

pub const RESOLUTION_KEY: &str = "resolution";
pub const CUBE_SIZE_KEY: &str = "cube_size";
pub const CUBE_STRIDE_KEY: &str = "cube_stride";
pub const LAUNCH_CATEGORY_KEY: &str = "launch_category";

#[cfg(feature = "gles")]
pub const RESOLUTIONS: &[(u32, u32)] = &[
    (320, 240),
    (360, 480),
    (480, 272),
    (512, 384),
    (512, 512),
    (640, 240),
    (640, 448),
    (640, 480),
    (720, 576),
    (800, 600),
    (960, 720),
    (1024, 768),
];
#[cfg(not(feature = "gles"))]
pub const RESOLUTIONS: &[(u32, u32)] = &[
    (320, 240),
    (360, 480),
    (480, 272),
    (512, 384),
    (512, 512),
    (640, 240),
    (640, 448),
    (640, 480),
    (720, 576),
    (800, 600),
    (960, 720),
    (1024, 768),
    (1024, 1024),
    (1280, 720),
    (1280, 960),
    (1600, 1200),
    (1920, 1080),
    (1920, 1440),
    (1920, 1600),
];

pub const CUBE_SIZES: &[u32] = &[1, 2, 4, 8, 16, 32, 64, 128];
pub const CUBE_STRIDES: &[f32] = &[2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];

pub const BASE_WIDTH: u32 = 320;
pub const BASE_HEIGHT: u32 = 240;
#[cfg(feature = "gles")]
pub const MAX_WIDTH: u32 = 1024;
#[cfg(feature = "gles")]
pub const MAX_HEIGHT: u32 = 1024;
#[cfg(not(feature = "gles"))]
pub const MAX_WIDTH: u32 = 1920;
#[cfg(not(feature = "gles"))]
pub const MAX_HEIGHT: u32 = 1600;

/// Output size of the rendered frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: BASE_WIDTH,
            height: BASE_HEIGHT,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Resolution {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = s
            .split_once('x')
            .with_context(|| format!("resolution {s:?} is not of the form <w>x<h>"))?;
        let width: u32 = width
            .trim()
            .parse()
            .with_context(|| format!("bad width in resolution {s:?}"))?;
        let height: u32 = height
            .trim()
            .parse()
            .with_context(|| format!("bad height in resolution {s:?}"))?;
        if width == 0 || height == 0 || width > MAX_WIDTH || height > MAX_HEIGHT {
            bail!("resolution {s:?} is outside 1x1..{MAX_WIDTH}x{MAX_HEIGHT}");
        }
        Ok(Self { width, height })
    }
}

fn parse_cube_size(s: &str) -> anyhow::Result<u32> {
    let size: u32 = s
        .trim()
        .parse()
        .with_context(|| format!("cube size {s:?} is not an integer"))?;
    if !CUBE_SIZES.contains(&size) {
        bail!("cube size {size} is not one of {CUBE_SIZES:?}");
    }
    Ok(size)
}

fn parse_cube_stride(s: &str) -> anyhow::Result<f32> {
    let stride: f32 = s
        .trim()
        .parse()
        .with_context(|| format!("cube stride {s:?} is not a number"))?;
    if !CUBE_STRIDES.contains(&stride) {
        bail!("cube stride {s:?} is not one of {CUBE_STRIDES:?}");
    }
    Ok(stride)
}

/// Which groups of options changed on the last [`CoreOptions::refresh`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OptionChanges {
    pub resolution: bool,
    pub grid: bool,
    pub category: bool,
}

impl OptionChanges {
    pub fn any(&self) -> bool {
        self.resolution || self.grid || self.category
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CoreOptions {
    pub resolution: Resolution,
    pub grid: GridParams,
    pub category: LaunchCategory,
}

impl Default for CoreOptions {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            grid: GridParams::default(),
            category: LaunchCategory::Games,
        }
    }
}

impl CoreOptions {
    /// `(key, "Description; v1|v2|...")` pairs in the format the host expects.
    pub fn declarations() -> Vec<(&'static str, String)> {
        let join = |values: Vec<String>| values.join("|");
        vec![
            (
                RESOLUTION_KEY,
                format!(
                    "Internal resolution; {}",
                    join(RESOLUTIONS.iter().map(|(w, h)| format!("{w}x{h}")).collect())
                ),
            ),
            (
                CUBE_SIZE_KEY,
                format!(
                    "Cube size; {}",
                    join(CUBE_SIZES.iter().map(u32::to_string).collect())
                ),
            ),
            (
                CUBE_STRIDE_KEY,
                format!(
                    "Cube stride; {}",
                    join(CUBE_STRIDES.iter().map(|s| format!("{s:.1}")).collect())
                ),
            ),
            (
                LAUNCH_CATEGORY_KEY,
                format!(
                    "Launch category; {}",
                    join(
                        LaunchCategory::ALL
                            .iter()
                            .map(|c| c.key().to_string())
                            .collect()
                    )
                ),
            ),
        ]
    }

    pub fn declare(frontend: &mut dyn Frontend) -> bool {
        let declarations = Self::declarations();
        let ok = frontend.set_variables(&declarations);
        if !ok {
            log::warn!("Host rejected the core option declarations");
        }
        ok
    }

    /// Re-read every option from the host. Values the host doesn't report or
    /// that fail to parse leave the current setting untouched.
    pub fn refresh(&mut self, frontend: &mut dyn Frontend) -> OptionChanges {
        let mut changes = OptionChanges::default();

        if let Some(value) = frontend.variable(RESOLUTION_KEY) {
            match value.parse::<Resolution>() {
                Ok(resolution) => {
                    log::info!("Got size: {resolution}");
                    changes.resolution = resolution != self.resolution;
                    self.resolution = resolution;
                }
                Err(e) => log::warn!("Ignoring {RESOLUTION_KEY}: {e:#}"),
            }
        }

        if let Some(value) = frontend.variable(CUBE_SIZE_KEY) {
            match parse_cube_size(&value) {
                Ok(size) => {
                    changes.grid |= size != self.grid.size;
                    self.grid.size = size;
                }
                Err(e) => log::warn!("Ignoring {CUBE_SIZE_KEY}: {e:#}"),
            }
        }

        if let Some(value) = frontend.variable(CUBE_STRIDE_KEY) {
            match parse_cube_stride(&value) {
                Ok(stride) => {
                    changes.grid |= stride != self.grid.stride;
                    self.grid.stride = stride;
                }
                Err(e) => log::warn!("Ignoring {CUBE_STRIDE_KEY}: {e:#}"),
            }
        }

        if let Some(value) = frontend.variable(LAUNCH_CATEGORY_KEY) {
            match value.parse::<LaunchCategory>() {
                Ok(category) => {
                    changes.category = category != self.category;
                    self.category = category;
                }
                Err(e) => log::warn!("Ignoring {LAUNCH_CATEGORY_KEY}: {e:#}"),
            }
        }

        changes
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        path::{Path, PathBuf},
    };

    use proptest::prelude::*;

    use super::*;

    #[derive(Default)]
    struct Options(HashMap<&'static str, &'static str>);

    impl Frontend for Options {
        fn set_variables(&mut self, _: &[(&str, String)]) -> bool {
            true
        }
        fn variable(&mut self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
        fn variables_updated(&mut self) -> bool {
            false
        }
        fn show_message(&mut self, _: &str, _: u32) -> bool {
            true
        }
        fn libretro_path(&mut self) -> Option<PathBuf> {
            None
        }
        fn set_libretro_path(&mut self, _: &Path) -> bool {
            false
        }
        fn exec_escape(&mut self, _: &Path) -> bool {
            false
        }
        fn poll_input(&mut self) {}
        fn input_state(&mut self, _: u32, _: u32, _: u32, _: u32) -> i16 {
            0
        }
    }

    #[test]
    fn declares_every_option_with_values() {
        let declarations = CoreOptions::declarations();
        let keys: Vec<_> = declarations.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            [RESOLUTION_KEY, CUBE_SIZE_KEY, CUBE_STRIDE_KEY, LAUNCH_CATEGORY_KEY]
        );
        assert_eq!(declarations[1].1, "Cube size; 1|2|4|8|16|32|64|128");
        assert_eq!(declarations[2].1, "Cube stride; 2.0|3.0|4.0|5.0|6.0|7.0|8.0");
        assert!(declarations[0].1.starts_with("Internal resolution; 320x240|360x480|"));
    }

    #[test]
    fn every_declared_value_parses() {
        for (key, declaration) in CoreOptions::declarations() {
            let (_, values) = declaration.split_once("; ").unwrap();
            for value in values.split('|') {
                let ok = match key {
                    RESOLUTION_KEY => value.parse::<Resolution>().is_ok(),
                    CUBE_SIZE_KEY => parse_cube_size(value).is_ok(),
                    CUBE_STRIDE_KEY => parse_cube_stride(value).is_ok(),
                    LAUNCH_CATEGORY_KEY => value.parse::<LaunchCategory>().is_ok(),
                    _ => unreachable!(),
                };
                assert!(ok, "{key}={value} should parse");
            }
        }
    }

    #[test]
    fn rejects_malformed_resolutions() {
        assert!("640".parse::<Resolution>().is_err());
        assert!("x480".parse::<Resolution>().is_err());
        assert!("0x480".parse::<Resolution>().is_err());
        assert!("99999x480".parse::<Resolution>().is_err());
        assert_eq!(
            "800x600".parse::<Resolution>().unwrap(),
            Resolution {
                width: 800,
                height: 600
            }
        );
    }

    #[test]
    fn refresh_reports_changed_groups() {
        let mut options = CoreOptions::default();
        let mut frontend = Options::default();
        frontend.0.insert(RESOLUTION_KEY, "640x480");
        frontend.0.insert(CUBE_SIZE_KEY, "1");
        frontend.0.insert(CUBE_STRIDE_KEY, "4.0");
        frontend.0.insert(LAUNCH_CATEGORY_KEY, "games");

        let changes = options.refresh(&mut frontend);
        assert_eq!(
            changes,
            OptionChanges {
                resolution: true,
                grid: false,
                category: false
            }
        );

        frontend.0.insert(CUBE_STRIDE_KEY, "7.0");
        frontend.0.insert(LAUNCH_CATEGORY_KEY, "scene2");
        let changes = options.refresh(&mut frontend);
        assert!(changes.grid && changes.category && !changes.resolution);
        assert_eq!(options.grid.stride, 7.0);
        assert_eq!(options.category, LaunchCategory::Scene2);
    }

    #[test]
    fn refresh_keeps_previous_value_on_garbage() {
        let mut options = CoreOptions::default();
        let mut frontend = Options::default();
        frontend.0.insert(CUBE_SIZE_KEY, "lots");
        frontend.0.insert(LAUNCH_CATEGORY_KEY, "podcasts");

        assert!(!options.refresh(&mut frontend).any());
        assert_eq!(options, CoreOptions::default());
    }

    #[test]
    fn only_declared_grid_values_are_accepted() {
        assert_eq!(parse_cube_size("16").unwrap(), 16);
        assert!(parse_cube_size("3").is_err());
        assert!(parse_cube_size("4096").is_err());
        assert!(parse_cube_size("1000000").is_err());
        assert_eq!(parse_cube_stride("5.0").unwrap(), 5.0);
        assert!(parse_cube_stride("2.5").is_err());
        assert!(parse_cube_stride("1e9").is_err());
    }

    #[test]
    fn oversized_grid_keeps_the_previous_one() {
        let mut options = CoreOptions::default();
        let mut frontend = Options::default();
        frontend.0.insert(CUBE_SIZE_KEY, "8");
        options.refresh(&mut frontend);
        assert_eq!(options.grid.size, 8);

        frontend.0.insert(CUBE_SIZE_KEY, "4096");
        frontend.0.insert(CUBE_STRIDE_KEY, "0.5");
        assert!(!options.refresh(&mut frontend).grid);
        assert_eq!(
            options.grid,
            GridParams {
                size: 8,
                stride: 4.0
            }
        );
    }

    proptest! {
        #[test]
        fn resolution_display_parses_back(w in 1u32..=MAX_WIDTH, h in 1u32..=MAX_HEIGHT) {
            let resolution = Resolution { width: w, height: h };
            prop_assert_eq!(resolution.to_string().parse::<Resolution>().unwrap(), resolution);
        }
    }
}
