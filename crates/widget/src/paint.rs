//! Paints a widget view with egui and reports taps on its controls
use crate::intent::WidgetIntent;
use crate::view::{ControlId, WidgetView};
use egui::{Color32, ColorImage, RichText, Sense, TextureHandle, TextureOptions, Vec2};
use nowplaying_core::artwork::DecodedArtwork;

const THUMBNAIL_SIZE: f32 = 72.0;

/// Per-widget painter; keeps the thumbnail texture alive between frames
#[derive(Default)]
pub struct WidgetPainter {
    texture: Option<(DecodedArtwork, TextureHandle)>,
}

impl WidgetPainter {
    /// Paint `view`; returns the intent of the control tapped this frame
    pub fn show(&mut self, ui: &mut egui::Ui, view: &WidgetView) -> Option<WidgetIntent> {
        let mut tapped = None;
        let texture = self.thumbnail_texture(ui.ctx(), view);

        ui.horizontal(|ui| {
            let size = Vec2::splat(THUMBNAIL_SIZE);
            match texture {
                Some(texture) => {
                    ui.add(
                        egui::Image::from_texture(egui::load::SizedTexture::from_handle(&texture))
                            .fit_to_exact_size(size)
                            .rounding(6.0),
                    );
                }
                None => {
                    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
                    ui.painter().rect_filled(rect, 6.0, Color32::from_gray(48));
                    ui.painter().text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        "♪",
                        egui::FontId::proportional(28.0),
                        Color32::from_gray(160),
                    );
                }
            }

            ui.vertical(|ui| {
                ui.label(RichText::new(&view.track_title).strong().size(16.0));
                ui.label(RichText::new(&view.artist_name).weak());
                ui.add_space(4.0);

                ui.horizontal(|ui| {
                    for control in ControlId::ALL {
                        let glyph = match control {
                            ControlId::PlayPause => view.play_pause_icon.glyph(),
                            _ => control.glyph(),
                        };
                        if ui.button(RichText::new(glyph).size(18.0)).clicked() {
                            tapped = view.intent_for(control).cloned();
                        }
                    }
                });
            });
        });

        tapped
    }

    /// Upload the view's thumbnail, reusing the texture while it is unchanged
    fn thumbnail_texture(&mut self, ctx: &egui::Context, view: &WidgetView) -> Option<TextureHandle> {
        let artwork = match &view.thumbnail {
            Some(artwork) => artwork,
            None => {
                self.texture = None;
                return None;
            }
        };

        if let Some((current, handle)) = &self.texture {
            if current == artwork {
                return Some(handle.clone());
            }
        }

        let image = ColorImage::from_rgba_unmultiplied(
            [artwork.width as usize, artwork.height as usize],
            &artwork.rgba,
        );
        let handle = ctx.load_texture(
            format!("widget-{}-thumbnail", view.widget_id),
            image,
            TextureOptions::LINEAR,
        );
        self.texture = Some((artwork.clone(), handle.clone()));
        Some(handle)
    }
}
