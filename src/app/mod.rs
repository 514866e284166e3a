// SPDX-License-Identifier: MPL-2.0
//! Editor session state and the settings that seed it.
//!
//! The [`Session`] owns the workspace configuration and the scene, and is
//! mutated only through [`Session::update`]. Each message yields an
//! [`Effect`] describing what changed, so a front end (the CLI today) can
//! react without reaching into the state.

pub mod config;
mod message;
pub mod paths;
mod update;

pub use message::{Effect, Flags, Message};

use crate::application::scene::Scene;
use crate::domain::collage::{JpegQuality, WorkspaceConfig};

/// Single-owner editor state.
#[derive(Debug, Clone)]
pub struct Session {
    workspace: WorkspaceConfig,
    scene: Scene,
    /// Image pixels to canvas units for newly placed items.
    placement_scale: f64,
    jpeg_quality: JpegQuality,
}

impl Default for Session {
    fn default() -> Self {
        Self::from_config(&config::Config::default())
    }
}

impl Session {
    #[must_use]
    pub fn new(workspace: WorkspaceConfig, placement_scale: f64, jpeg_quality: JpegQuality) -> Self {
        Self {
            workspace,
            scene: Scene::new(),
            placement_scale,
            jpeg_quality,
        }
    }

    /// Builds an empty session from persisted settings.
    #[must_use]
    pub fn from_config(config: &config::Config) -> Self {
        Self::new(
            config.workspace_config(),
            config.placement_scale(),
            config.jpeg_quality(),
        )
    }

    #[must_use]
    pub fn workspace(&self) -> &WorkspaceConfig {
        &self.workspace
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn placement_scale(&self) -> f64 {
        self.placement_scale
    }

    #[must_use]
    pub fn jpeg_quality(&self) -> JpegQuality {
        self.jpeg_quality
    }

    /// Applies one message and reports its effect.
    pub fn update(&mut self, message: Message) -> Effect {
        update::update(self, message)
    }
}

/// Overlays command-line flags on loaded settings.
pub fn apply_flags(config: &mut config::Config, flags: &Flags) {
    if let Some(resolution) = flags.resolution {
        config.workspace.resolution = resolution.to_string();
    }
    if let Some(zoom) = flags.zoom {
        config.workspace.zoom_percent = zoom;
    }
    if let Some(background) = flags.background {
        config.workspace.background = background.to_string();
    }
    if let Some(color) = flags.frame_color {
        config.frame.color = color.to_string();
    }
    if let Some(width) = flags.frame_width {
        config.frame.width = width;
    }
    if flags.no_shadow {
        config.frame.shadow = false;
    }
    if let Some(format) = flags.format {
        config.export.format = format;
    }
    if let Some(quality) = flags.quality {
        config.export.jpeg_quality = quality;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collage::{
        Color, FrameWidth, ItemId, ItemKind, KindTag, Point, Resolution, ZoomPercent,
    };
    use crate::domain::media::RawImage;
    use crate::media::ExportFormat;
    use crate::test_utils::{assert_abs_diff_eq, LAYOUT_EPSILON};

    fn place(session: &mut Session, width: u32, height: u32, kind: KindTag) -> ItemId {
        let effect = session.update(Message::ImageLoaded {
            image: RawImage::filled(width, height, [10, 20, 30, 255]),
            kind,
        });
        match effect {
            Effect::Placed(id) => id,
            other => panic!("expected Placed, got {other:?}"),
        }
    }

    #[test]
    fn loaded_photo_takes_current_frame() {
        let mut session = Session::default();
        session.update(Message::SetFrameColor(Color::BLACK));
        let id = place(&mut session, 1000, 500, KindTag::Photo);

        let item = session.scene().get(id).unwrap();
        match item.kind() {
            ItemKind::Photo { frame } => assert_eq!(frame.color, Color::BLACK),
            ItemKind::Object => panic!("expected a photo"),
        }
        assert_abs_diff_eq!(item.content_size().width, 100.0, epsilon = LAYOUT_EPSILON);
    }

    #[test]
    fn zoom_rescales_items_proportionally() {
        let mut session = Session::default();
        let id = place(&mut session, 100, 100, KindTag::Object);
        {
            let item = session.scene.get_mut(id).unwrap();
            item.transform.x = 100.0;
            item.transform.y = 50.0;
        }

        session.update(Message::ZoomIn);
        assert_eq!(session.workspace().zoom, ZoomPercent::new(110.0));

        let transform = session.scene().get(id).unwrap().transform;
        assert_abs_diff_eq!(transform.x, 110.0, epsilon = LAYOUT_EPSILON);
        assert_abs_diff_eq!(transform.y, 55.0, epsilon = LAYOUT_EPSILON);
        assert_abs_diff_eq!(transform.scale_x, 1.1, epsilon = LAYOUT_EPSILON);

        session.update(Message::ResetZoom);
        let transform = session.scene().get(id).unwrap().transform;
        assert_abs_diff_eq!(transform.x, 100.0, epsilon = LAYOUT_EPSILON);
        assert_abs_diff_eq!(transform.scale_y, 1.0, epsilon = LAYOUT_EPSILON);
    }

    #[test]
    fn wheel_without_delta_changes_nothing() {
        let mut session = Session::default();
        session.update(Message::ZoomWheel(0.0));
        assert_eq!(session.workspace().zoom, ZoomPercent::default());

        session.update(Message::ZoomWheel(-3.0));
        assert_eq!(session.workspace().zoom, ZoomPercent::new(90.0));
    }

    #[test]
    fn resolution_change_leaves_items_in_place() {
        let mut session = Session::default();
        let id = place(&mut session, 100, 100, KindTag::Object);
        session.scene.get_mut(id).unwrap().transform.x = 42.0;

        session.update(Message::SetResolution(Resolution::FullHd));

        assert_eq!(session.workspace().resolution, Resolution::FullHd);
        assert_abs_diff_eq!(
            session.scene().get(id).unwrap().transform.x,
            42.0,
            epsilon = LAYOUT_EPSILON
        );
    }

    #[test]
    fn click_accounts_for_pan() {
        let mut session = Session::default();
        let id = place(&mut session, 1000, 500, KindTag::Photo);
        session.update(Message::Pan { dx: 10.0, dy: 10.0 });

        assert!(matches!(
            session.update(Message::Click(Point::new(15.0, 15.0))),
            Effect::Selected(Some(hit)) if hit == id
        ));
        assert!(matches!(
            session.update(Message::Click(Point::new(5.0, 5.0))),
            Effect::Selected(None)
        ));
        assert_eq!(session.scene().selected(), None);
    }

    #[test]
    fn delete_removes_only_selected_item() {
        let mut session = Session::default();
        let first = place(&mut session, 1000, 500, KindTag::Photo);
        let second = place(&mut session, 100, 100, KindTag::Object);

        assert!(matches!(session.update(Message::DeleteSelected), Effect::None));

        session.update(Message::Click(Point::new(5.0, 5.0)));
        assert!(matches!(
            session.update(Message::DeleteSelected),
            Effect::Deleted(id) if id == second
        ));
        assert_eq!(session.scene().len(), 1);
        assert!(session.scene().get(first).is_some());
    }

    #[test]
    fn drag_moves_only_selected_item() {
        let mut session = Session::default();
        let first = place(&mut session, 1000, 500, KindTag::Photo);
        let second = place(&mut session, 100, 100, KindTag::Object);
        session.update(Message::Pan { dx: 10.0, dy: 10.0 });

        assert!(matches!(
            session.update(Message::MoveSelected { dx: 5.0, dy: 5.0 }),
            Effect::None
        ));

        session.update(Message::Click(Point::new(15.0, 15.0)));
        assert!(matches!(
            session.update(Message::MoveSelected { dx: 200.0, dy: 100.0 }),
            Effect::Moved(id) if id == second
        ));

        let moved = session.scene().get(second).unwrap().transform;
        assert_abs_diff_eq!(moved.x, 200.0, epsilon = LAYOUT_EPSILON);
        assert_abs_diff_eq!(moved.y, 100.0, epsilon = LAYOUT_EPSILON);
        let untouched = session.scene().get(first).unwrap().transform;
        assert_abs_diff_eq!(untouched.x, 0.0, epsilon = LAYOUT_EPSILON);

        // The object's 10x10 box now sits at (200, 100) in the workspace.
        assert!(matches!(
            session.update(Message::Click(Point::new(215.0, 115.0))),
            Effect::Selected(Some(hit)) if hit == second
        ));
        assert!(matches!(
            session.update(Message::Click(Point::new(15.0, 15.0))),
            Effect::Selected(Some(hit)) if hit == first
        ));
    }

    #[test]
    fn transform_resizes_and_turns_selected_item() {
        let mut session = Session::default();
        // 100x10 object at scale 0.1 -> 10x1 box.
        let id = place(&mut session, 100, 10, KindTag::Object);
        session.update(Message::Click(Point::new(9.0, 0.5)));

        assert!(matches!(
            session.update(Message::TransformSelected {
                scale: 10.0,
                rotation_deg: 90.0,
            }),
            Effect::Transformed(hit) if hit == id
        ));

        let item = session.scene().get(id).unwrap();
        let bounds = item.bounding_box();
        assert_abs_diff_eq!(bounds.width, 100.0, epsilon = LAYOUT_EPSILON);
        assert_abs_diff_eq!(bounds.center().x, 5.0, epsilon = LAYOUT_EPSILON);
        assert_abs_diff_eq!(item.transform.rotation_deg, 90.0, epsilon = LAYOUT_EPSILON);

        // Upright after a quarter turn: 10 wide, 100 tall around (5, 0.5).
        assert_eq!(session.scene().hit_test(Point::new(5.0, 40.0)), Some(id));
        assert_eq!(session.scene().hit_test(Point::new(40.0, 0.5)), None);

        assert!(matches!(
            session.update(Message::TransformSelected {
                scale: -1.0,
                rotation_deg: 0.0,
            }),
            Effect::None
        ));
    }

    #[test]
    fn frame_changes_restyle_photos_only() {
        let mut session = Session::default();
        place(&mut session, 100, 100, KindTag::Photo);
        place(&mut session, 100, 100, KindTag::Photo);
        place(&mut session, 100, 100, KindTag::Object);

        assert!(matches!(
            session.update(Message::SetFrameWidth(FrameWidth::new(5.0))),
            Effect::Restyled(2)
        ));
        assert!(matches!(
            session.update(Message::ToggleShadow),
            Effect::Restyled(2)
        ));
        assert!(!session.workspace().frame.shadow);
    }

    #[test]
    fn arrange_fits_items_in_workspace() {
        let mut session = Session::default();
        for _ in 0..4 {
            place(&mut session, 400, 300, KindTag::Object);
        }
        session.update(Message::Arrange);

        let area = session.workspace().area();
        let cell_height = (area.height / 2.0).round();
        for item in session.scene().items() {
            assert_abs_diff_eq!(
                item.bounding_box().height,
                cell_height,
                epsilon = 1e-6
            );
            assert!(item.transform.rotation_deg.abs() <= 2.0);
        }
    }

    #[test]
    fn export_reaches_nominal_resolution_at_any_zoom() {
        let mut session = Session::default();
        session.update(Message::SetResolution(Resolution::Square));
        place(&mut session, 200, 100, KindTag::Photo);
        session.update(Message::Arrange);
        session.update(Message::ZoomOut);
        session.update(Message::SetBackground(Color::BLACK));

        match session.update(Message::Export(ExportFormat::Png)) {
            Effect::Exported(image) => {
                assert_eq!((image.width, image.height), (1080, 1080));
                assert_eq!(image.format, ExportFormat::Png);
            }
            other => panic!("expected Exported, got {other:?}"),
        }
    }

    #[test]
    fn flags_override_config() {
        let mut config = config::Config::default();
        let flags = Flags {
            resolution: Some(Resolution::Hd),
            zoom: Some(50.0),
            background: Some(Color::BLACK),
            frame_width: Some(4.0),
            no_shadow: true,
            format: Some(ExportFormat::Jpeg),
            quality: Some(70),
            ..Flags::default()
        };
        apply_flags(&mut config, &flags);

        let session = Session::from_config(&config);
        let workspace = session.workspace();
        assert_eq!(workspace.resolution, Resolution::Hd);
        assert_eq!(workspace.zoom, ZoomPercent::new(50.0));
        assert_eq!(workspace.background, Color::BLACK);
        assert_eq!(workspace.frame.width, FrameWidth::new(4.0));
        assert!(!workspace.frame.shadow);
        assert_eq!(session.jpeg_quality(), JpegQuality::new(70));
        assert_eq!(config.export.format, ExportFormat::Jpeg);
    }
}
