use anyhow::Context as _;
use eframe::egui;
use providers::AssistantClient;
use std::sync::Arc;

mod chat_session;
mod config;
mod scroll_lock;
mod simple_md;
mod widget;

use chat_session::ChatSession;
use scroll_lock::PageScrollLock;
use widget::ChatWidget;

const FEATURES: [(&str, &str); 3] = [
    (
        "Self-custody",
        "Your keys never leave your device. WalletX only signs what you approve.",
    ),
    (
        "Low fees",
        "Network fees are shown up front, with a cheaper option when the chain allows it.",
    ),
    (
        "Staking",
        "Put idle assets to work and track rewards from the same dashboard.",
    ),
];

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = config::load_settings();
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let assistant = AssistantClient::from_settings(&settings.assistant)?;

    let scroll_lock = PageScrollLock::new();
    let session = ChatSession::new(Arc::new(assistant), runtime.handle().clone())
        .with_scroll_lock(Box::new(scroll_lock.clone()))
        .with_widget_settings(&settings.widget);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([360.0, 480.0]),
        vsync: true,
        ..Default::default()
    };
    eframe::run_native(
        "WalletX",
        options,
        Box::new(move |_cc| {
            Box::new(WalletXShell {
                _runtime: runtime,
                scroll_lock,
                widget: ChatWidget::new(session),
            })
        }),
    )
    .map_err(|e| anyhow::anyhow!("window error: {}", e))
}

struct WalletXShell {
    // Owns the worker threads that run assistant requests
    _runtime: tokio::runtime::Runtime,
    scroll_lock: PageScrollLock,
    widget: ChatWidget,
}

impl eframe::App for WalletXShell {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("navbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(egui::RichText::new("WalletX").strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    for item in ["Support", "Security", "Features"] {
                        let _ = ui.link(item);
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.label(
                egui::RichText::new("© WalletX. Crypto assets are volatile; only invest what you can afford to lose.")
                    .small()
                    .weak(),
            );
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .enable_scrolling(!self.scroll_lock.is_locked())
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.add_space(32.0);
                    ui.vertical_centered(|ui| {
                        ui.heading(egui::RichText::new("One wallet for every chain").size(32.0));
                        ui.add_space(8.0);
                        ui.label("Send, receive and stake from a single self-custody wallet.");
                    });
                    ui.add_space(24.0);
                    for (title, body) in FEATURES {
                        egui::Frame::group(ui.style()).show(ui, |ui| {
                            ui.set_width(ui.available_width());
                            ui.label(egui::RichText::new(title).strong().size(18.0));
                            ui.label(body);
                        });
                        ui.add_space(12.0);
                    }
                });
        });

        self.widget.show(ctx);
    }
}
