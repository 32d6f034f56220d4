//! Floating chat widget drawn over the page.

use crate::chat_session::{ChatSession, Presentation};
use crate::simple_md::{render, show_segments};
use eframe::egui;
use shared::chat::Message;
use std::time::Duration;

const PANEL_WIDTH: f32 = 380.0;
const PANEL_HEIGHT: f32 = 560.0;
const MIN_PANEL_HEIGHT: f32 = 240.0;
const CORNER_OFFSET: [f32; 2] = [-24.0, -24.0];

const ACCENT: egui::Color32 = egui::Color32::from_rgb(94, 76, 224);
const USER_BUBBLE: egui::Color32 = egui::Color32::from_rgb(94, 76, 224);
const ASSISTANT_BUBBLE: egui::Color32 = egui::Color32::from_rgb(238, 238, 244);
const ASSISTANT_TEXT: egui::Color32 = egui::Color32::from_rgb(35, 35, 45);
const MUTED: egui::Color32 = egui::Color32::from_rgb(130, 130, 145);
const CODE_BG: egui::Color32 = egui::Color32::from_rgb(220, 222, 232);
const USER_CODE_BG: egui::Color32 = egui::Color32::from_rgb(70, 55, 190);

pub struct ChatWidget {
    session: ChatSession,
}

impl ChatWidget {
    pub fn new(session: ChatSession) -> Self {
        Self { session }
    }

    /// Draw the widget for this frame. Call once per frame after the page.
    pub fn show(&mut self, ctx: &egui::Context) {
        self.session.poll_replies();
        let screen = ctx.screen_rect();
        self.session.set_viewport(screen.width(), screen.height());

        if !self.session.is_open() {
            self.show_launcher(ctx);
        } else if self.session.is_minimized() {
            self.show_minimized(ctx);
        } else {
            self.show_panel(ctx);
        }

        // Keep polling while replies are outstanding
        if self.session.pending_replies() > 0 {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    fn show_launcher(&mut self, ctx: &egui::Context) {
        egui::Area::new(egui::Id::new("walletx_chat_launcher"))
            .anchor(egui::Align2::RIGHT_BOTTOM, CORNER_OFFSET)
            .show(ctx, |ui| {
                let label = match self.session.unread_count() {
                    0 => "💬 Ask WalletX".to_string(),
                    n => format!("💬 Ask WalletX ({})", n),
                };
                let btn = egui::Button::new(
                    egui::RichText::new(label)
                        .size(15.0)
                        .color(egui::Color32::WHITE),
                )
                .fill(ACCENT)
                .rounding(egui::Rounding::same(22.0));
                if ui.add_sized([180.0, 44.0], btn).clicked() {
                    self.session.toggle();
                }
            });
    }

    fn show_minimized(&mut self, ctx: &egui::Context) {
        egui::Area::new(egui::Id::new("walletx_chat_minimized"))
            .anchor(egui::Align2::RIGHT_BOTTOM, CORNER_OFFSET)
            .show(ctx, |ui| {
                egui::Frame::none()
                    .fill(ACCENT)
                    .rounding(egui::Rounding::same(12.0))
                    .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            let mut title = "WalletX Assistant".to_string();
                            if self.session.unread_count() > 0 {
                                title = format!("{} ({} new)", title, self.session.unread_count());
                            }
                            ui.label(
                                egui::RichText::new(title)
                                    .strong()
                                    .color(egui::Color32::WHITE),
                            );
                            if ui.small_button("▲").on_hover_text("Expand").clicked() {
                                self.session.maximize();
                            }
                            if ui.small_button("✕").on_hover_text("Close").clicked() {
                                self.session.close();
                            }
                        });
                    });
            });
    }

    fn show_panel(&mut self, ctx: &egui::Context) {
        let window = egui::Window::new("WalletX Assistant")
            .id(egui::Id::new("walletx_chat_panel"))
            .title_bar(false)
            .collapsible(false)
            .resizable(false);
        let window = match self.session.presentation() {
            Presentation::Compact => {
                // Short windows get a shorter panel so the header stays visible
                let height = self.session.viewport().map_or(PANEL_HEIGHT, |v| {
                    (v.height - 48.0).clamp(MIN_PANEL_HEIGHT, PANEL_HEIGHT)
                });
                window
                    .anchor(egui::Align2::RIGHT_BOTTOM, CORNER_OFFSET)
                    .fixed_size([PANEL_WIDTH, height])
            }
            Presentation::FullScreen => window.fixed_rect(ctx.screen_rect()),
        };

        window.show(ctx, |ui| {
            self.header(ui);
            ui.separator();

            let chat_height = (ui.available_height() - 56.0).max(120.0);
            egui::ScrollArea::vertical()
                .max_height(chat_height)
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for msg in self.session.messages() {
                        ui.add_space(4.0);
                        render_message(ui, msg);
                    }
                    if self.session.is_typing() {
                        ui.add_space(4.0);
                        typing_indicator(ui);
                    }
                });

            ui.add_space(8.0);
            self.input_row(ui);
        });
    }

    fn header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new("WalletX Assistant")
                    .strong()
                    .size(16.0)
                    .color(ACCENT),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("✕").on_hover_text("Close").clicked() {
                    self.session.close();
                }
                if ui.button("–").on_hover_text("Minimize").clicked() {
                    self.session.minimize();
                }
            });
        });
    }

    fn input_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let response = ui.add_sized(
                [ui.available_width() - 70.0, 36.0],
                egui::TextEdit::singleline(self.session.draft_mut())
                    .hint_text("Ask about fees, security, staking...")
                    .font(egui::FontId::new(14.0, egui::FontFamily::Proportional)),
            );
            let mut send = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            let btn = egui::Button::new(egui::RichText::new("Send").color(egui::Color32::WHITE))
                .fill(ACCENT);
            if ui.add_sized([60.0, 36.0], btn).clicked() {
                send = true;
            }
            if send && self.session.submit_draft() {
                response.request_focus();
            }
        });
    }
}

fn render_message(ui: &mut egui::Ui, msg: &Message) {
    let (fill, text_color, code_bg, who) = if msg.is_user() {
        (USER_BUBBLE, egui::Color32::WHITE, USER_CODE_BG, "You")
    } else {
        (ASSISTANT_BUBBLE, ASSISTANT_TEXT, CODE_BG, "WalletX")
    };

    ui.label(
        egui::RichText::new(format!("{} · {}", who, msg.formatted_time()))
            .size(11.0)
            .color(MUTED),
    );
    egui::Frame::none()
        .fill(fill)
        .rounding(egui::Rounding::same(12.0))
        .inner_margin(egui::Margin::same(10.0))
        .show(ui, |ui| {
            ui.set_max_width(ui.available_width() * 0.85);
            show_segments(ui, &render(&msg.text), text_color, code_bg);
        });
}

fn typing_indicator(ui: &mut egui::Ui) {
    let time = ui.input(|i| i.time);
    let dots = match ((time * 2.0) as i32) % 4 {
        0 => "   ",
        1 => ".  ",
        2 => ".. ",
        _ => "...",
    };
    egui::Frame::none()
        .fill(ASSISTANT_BUBBLE)
        .rounding(egui::Rounding::same(12.0))
        .inner_margin(egui::Margin::same(10.0))
        .show(ui, |ui| {
            ui.label(
                egui::RichText::new(format!("Typing{}", dots))
                    .italics()
                    .color(MUTED),
            );
        });
    ui.ctx().request_repaint();
}
