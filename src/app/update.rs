// SPDX-License-Identifier: MPL-2.0
//! Update logic and message handlers for the session.
//!
//! This module contains the main `update` function and one handler per
//! family of messages. Handlers mutate the session in place and describe
//! what happened through an [`Effect`].

use super::{Effect, Message, Session};
use crate::domain::collage::{
    CanvasItem, Color, FrameStyle, FrameWidth, ItemKind, KindTag, Point, Resolution,
    WorkspaceConfig, ZoomPercent,
};
use crate::domain::media::RawImage;
use crate::media::{self, ExportFormat};

/// Routes a message to its handler.
pub(super) fn update(session: &mut Session, message: Message) -> Effect {
    match message {
        Message::SetResolution(resolution) => handle_resolution(session, resolution),
        Message::ZoomWheel(delta) => handle_zoom(session, |ws| ws.zoom_by_wheel(delta)),
        Message::ZoomIn => handle_zoom(session, |ws| ws.zoom = ws.zoom.zoom_in(ws.zoom_step)),
        Message::ZoomOut => handle_zoom(session, |ws| ws.zoom = ws.zoom.zoom_out(ws.zoom_step)),
        Message::ResetZoom => handle_zoom(session, |ws| ws.zoom = ZoomPercent::default()),
        Message::Pan { dx, dy } => {
            session.workspace.pan_by(dx, dy);
            Effect::None
        }
        Message::Click(screen) => handle_click(session, screen),
        Message::MoveSelected { dx, dy } => handle_move(session, dx, dy),
        Message::TransformSelected {
            scale,
            rotation_deg,
        } => handle_transform(session, scale, rotation_deg),
        Message::DeleteSelected => handle_delete(session),
        Message::SetFrameColor(color) => handle_frame(session, |frame| frame.color = color),
        Message::SetFrameWidth(width) => handle_frame_width(session, width),
        Message::ToggleShadow => handle_frame(session, |frame| frame.shadow = !frame.shadow),
        Message::SetBackground(color) => handle_background(session, color),
        Message::Arrange => {
            let area = session.workspace.area();
            session.scene.arrange(area);
            log::debug!("arranged {} items in {:?}", session.scene.len(), area);
            Effect::None
        }
        Message::ImageLoaded { image, kind } => handle_image_loaded(session, image, kind),
        Message::Export(format) => handle_export(session, format),
    }
}

fn handle_resolution(session: &mut Session, resolution: Resolution) -> Effect {
    session.workspace.resolution = resolution;
    log::info!("resolution set to {resolution}");
    Effect::None
}

/// Applies a zoom edit and rescales the scene by the factor change, so the
/// composition keeps its proportions inside the resized workspace.
fn handle_zoom(session: &mut Session, edit: impl FnOnce(&mut WorkspaceConfig)) -> Effect {
    let old = session.workspace.zoom;
    edit(&mut session.workspace);
    let new = session.workspace.zoom;
    if new == old {
        return Effect::None;
    }

    session.scene.rescale(new.as_factor() / old.as_factor());
    log::debug!("zoom {}% -> {}%", old.value(), new.value());
    Effect::None
}

fn handle_click(session: &mut Session, screen: Point) -> Effect {
    let point = session.workspace.screen_to_workspace(screen);
    Effect::Selected(session.scene.click(point))
}

fn handle_move(session: &mut Session, dx: f64, dy: f64) -> Effect {
    let Some(item) = selected_item(session) else {
        return Effect::None;
    };
    item.translate(dx, dy);
    Effect::Moved(item.id())
}

fn handle_transform(session: &mut Session, scale: f64, rotation_deg: f64) -> Effect {
    let Some(item) = selected_item(session) else {
        return Effect::None;
    };
    if !item.scale_about_center(scale) {
        log::warn!("ignoring invalid scale factor {scale}");
        return Effect::None;
    }
    item.rotate(rotation_deg);
    Effect::Transformed(item.id())
}

fn selected_item(session: &mut Session) -> Option<&mut CanvasItem> {
    let id = session.scene.selected()?;
    session.scene.get_mut(id)
}

fn handle_delete(session: &mut Session) -> Effect {
    match session.scene.delete_selected() {
        Some(item) => {
            log::debug!("deleted {:?}", item.id());
            Effect::Deleted(item.id())
        }
        None => Effect::None,
    }
}

/// Edits the current frame style and applies it to every photo.
fn handle_frame(session: &mut Session, edit: impl FnOnce(&mut FrameStyle)) -> Effect {
    edit(&mut session.workspace.frame);
    let changed = session.scene.restyle_photos(session.workspace.frame);
    Effect::Restyled(changed)
}

fn handle_frame_width(session: &mut Session, width: FrameWidth) -> Effect {
    handle_frame(session, |frame| frame.width = width)
}

fn handle_background(session: &mut Session, color: Color) -> Effect {
    session.workspace.background = color;
    Effect::None
}

fn handle_image_loaded(session: &mut Session, image: RawImage, kind: KindTag) -> Effect {
    let kind = match kind {
        KindTag::Photo => ItemKind::Photo {
            frame: session.workspace.frame,
        },
        KindTag::Object => ItemKind::Object,
    };
    let id = session.scene.add(image, kind, session.placement_scale);
    Effect::Placed(id)
}

fn handle_export(session: &mut Session, format: ExportFormat) -> Effect {
    match media::export::export(
        session.scene.items(),
        &session.workspace,
        format,
        session.jpeg_quality,
    ) {
        Ok(exported) => {
            log::info!(
                "exported {}x{} {} ({} bytes)",
                exported.width,
                exported.height,
                format,
                exported.bytes.len()
            );
            Effect::Exported(exported)
        }
        Err(e) => {
            log::warn!("export failed: {e}");
            Effect::Failed(e)
        }
    }
}
