// SPDX-License-Identifier: MPL-2.0
//! Session messages, their effects and the command-line flags.

use crate::domain::collage::{Color, FrameWidth, ItemId, KindTag, Point, Resolution};
use crate::domain::media::RawImage;
use crate::error::Error;
use crate::media::{ExportFormat, ExportedImage};
use std::ffi::OsString;
use std::path::PathBuf;

/// Everything the user (or a finished upload) can ask of a session.
#[derive(Debug, Clone)]
pub enum Message {
    /// Switch the nominal output size. Items stay where they are.
    SetResolution(Resolution),
    /// Mouse wheel over the workspace: positive zooms in.
    ZoomWheel(f32),
    ZoomIn,
    ZoomOut,
    ResetZoom,
    /// Move the view, in screen units.
    Pan { dx: f64, dy: f64 },
    /// Pointer press at a screen position.
    Click(Point),
    /// Drag the selected item by a screen-space delta. Pan cancels out of
    /// a delta and zoom is already part of item transforms, so the delta
    /// applies unchanged in workspace units.
    MoveSelected { dx: f64, dy: f64 },
    /// Resize the selected item about its centre by `scale` and turn it
    /// by `rotation_deg` (clockwise).
    TransformSelected { scale: f64, rotation_deg: f64 },
    DeleteSelected,
    SetFrameColor(Color),
    SetFrameWidth(FrameWidth),
    ToggleShadow,
    SetBackground(Color),
    Arrange,
    /// A decoded (and, for objects, cut-out) image is ready to place.
    ImageLoaded { image: RawImage, kind: KindTag },
    Export(ExportFormat),
}

/// What happened as a result of a [`Message`].
#[derive(Debug, Clone)]
pub enum Effect {
    /// Nothing observable beyond a state change.
    None,
    Placed(ItemId),
    /// Selection after a click; `None` means the canvas was clicked.
    Selected(Option<ItemId>),
    Moved(ItemId),
    Transformed(ItemId),
    Deleted(ItemId),
    /// Number of photos whose frame changed.
    Restyled(usize),
    Exported(ExportedImage),
    Failed(Error),
}

/// Runtime flags parsed from the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flags {
    /// Photos to place with a frame.
    pub photos: Vec<PathBuf>,
    /// Images to place as cut-out objects (background removed).
    pub objects: Vec<PathBuf>,
    /// Open a file dialog to add more photos.
    pub pick: bool,
    pub resolution: Option<Resolution>,
    pub zoom: Option<f32>,
    pub background: Option<Color>,
    pub frame_color: Option<Color>,
    pub frame_width: Option<f64>,
    pub no_shadow: bool,
    pub format: Option<ExportFormat>,
    pub quality: Option<u8>,
    /// Output file; a timestamped name is generated when absent.
    pub output: Option<PathBuf>,
    /// Fetch the background removal model before doing anything else.
    pub download_model: bool,
    /// Takes precedence over `COLLAGE_LENS_DATA_DIR`.
    pub data_dir: Option<PathBuf>,
    /// Takes precedence over `COLLAGE_LENS_CONFIG_DIR`.
    pub config_dir: Option<PathBuf>,
}

impl Flags {
    /// Parses flags from arguments that exclude the program name.
    ///
    /// Returns `Ok(None)` when `--help` was requested.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for malformed values or unknown options.
    pub fn parse(args: Vec<OsString>) -> Result<Option<Self>, Error> {
        let mut args = pico_args::Arguments::from_vec(args);

        if args.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let invalid = |e: pico_args::Error| Error::Config(format!("invalid arguments: {e}"));

        let mut flags = Flags {
            objects: args.values_from_str("--object").map_err(invalid)?,
            pick: args.contains("--pick"),
            resolution: args.opt_value_from_str("--resolution").map_err(invalid)?,
            zoom: args.opt_value_from_str("--zoom").map_err(invalid)?,
            background: args.opt_value_from_str("--background").map_err(invalid)?,
            frame_color: args.opt_value_from_str("--frame-color").map_err(invalid)?,
            frame_width: args.opt_value_from_str("--frame-width").map_err(invalid)?,
            no_shadow: args.contains("--no-shadow"),
            format: args.opt_value_from_str("--format").map_err(invalid)?,
            quality: args.opt_value_from_str("--quality").map_err(invalid)?,
            output: args
                .opt_value_from_str(["-o", "--output"])
                .map_err(invalid)?,
            download_model: args.contains("--download-model"),
            data_dir: args.opt_value_from_str("--data-dir").map_err(invalid)?,
            config_dir: args.opt_value_from_str("--config-dir").map_err(invalid)?,
            ..Flags::default()
        };

        for arg in args.finish() {
            if arg.to_string_lossy().starts_with('-') {
                return Err(Error::Config(format!(
                    "unknown option: {}",
                    arg.to_string_lossy()
                )));
            }
            flags.photos.push(PathBuf::from(arg));
        }

        Ok(Some(flags))
    }
}
