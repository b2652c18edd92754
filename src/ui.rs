// ui.rs - egui 界面：菜单栏、翻页/旁白按钮、跑马灯文字、状态栏

use std::path::{Path, PathBuf};
use storybook::camera::Orientation;
use storybook::i18n::{tr, tr_with, LANGUAGES};
use storybook::marquee::marquee_offset;
use storybook::{Direction, PageKind};

/// Requests from the UI, applied by the event loop after the frame.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Navigate(Direction),
    ToggleNarration,
    ResetView,
    ToggleFullscreen,
    OpenStory(PathBuf),
    SetLanguage(String),
    SetVsync(bool),
    Exit,
}

/// UI toggles that persist across pages.
#[derive(Debug, Clone)]
pub struct UiState {
    pub show_fps: bool,
    pub vsync: bool,
    pub lang: String,
    pub is_fullscreen: bool,
}

/// Read-only snapshot of the current page for one frame.
pub struct PageView<'a> {
    pub index: Option<usize>,
    pub total_pages: usize,
    pub kind: Option<PageKind>,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub text: &'a str,
    pub narration_playing: Option<bool>,
    pub orientation: Option<Orientation>,
    pub loading: bool,
    pub fps: f32,
    /// Seconds since the page opened, drives the marquee.
    pub elapsed: f32,
    pub story_dir: &'a Path,
}

const MARQUEE_FONT_SIZE: f32 = 18.0;

pub fn draw_ui(ctx: &egui::Context, state: &mut UiState, view: &PageView<'_>) -> Vec<UiAction> {
    let mut actions = Vec::new();

    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button(tr("menu.file"), |ui| {
                if ui.button(tr("menu.open_story")).clicked() {
                    ui.close_menu();
                    if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                        actions.push(UiAction::OpenStory(dir));
                    }
                }
                if ui.button(tr("menu.exit")).clicked() {
                    actions.push(UiAction::Exit);
                }
            });

            ui.menu_button(tr("menu.view"), |ui| {
                let has_camera = view.kind == Some(PageKind::Panoramic);
                if ui.add_enabled(has_camera, egui::Button::new(tr("view.reset"))).clicked() {
                    actions.push(UiAction::ResetView);
                    ui.close_menu();
                }

                let label = if state.is_fullscreen {
                    tr("view.fullscreen.exit")
                } else {
                    tr("view.fullscreen.enter")
                };
                if ui.button(label).clicked() {
                    actions.push(UiAction::ToggleFullscreen);
                    ui.close_menu();
                }

                ui.separator();
                if ui.checkbox(&mut state.show_fps, tr("view.show_fps")).clicked() {
                    ui.close_menu();
                }
                if ui.checkbox(&mut state.vsync, tr("view.enable_vsync")).clicked() {
                    actions.push(UiAction::SetVsync(state.vsync));
                }
            });

            ui.menu_button(tr("menu.language"), |ui| {
                for (code, name) in LANGUAGES {
                    if ui.radio(state.lang == code, name).clicked() {
                        state.lang = code.to_string();
                        actions.push(UiAction::SetLanguage(code.to_string()));
                        ui.close_menu();
                    }
                }
            });
        });
    });

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if view.loading {
                ui.label(
                    egui::RichText::new(tr("status.loading_image")).color(egui::Color32::YELLOW),
                );
                ui.label("|");
            }

            match view.index {
                None => {
                    ui.label(tr_with(
                        "status.empty_story",
                        &[("dir", view.story_dir.display().to_string())],
                    ));
                }
                Some(0) => {
                    ui.label(tr("status.cover"));
                }
                Some(i) => {
                    ui.label(tr_with(
                        "status.page",
                        &[("n", i.to_string()), ("total", (view.total_pages - 1).to_string())],
                    ));
                }
            }

            if let Some(o) = view.orientation {
                ui.label("|");
                ui.label(format!("FOV: {:.1}°", o.fov));
                ui.label("|");
                ui.label(format!("Yaw: {:.1}°", o.yaw.to_degrees()));
                ui.label("|");
                ui.label(format!("Pitch: {:.1}°", o.pitch.to_degrees()));
            }

            if state.show_fps {
                ui.label("|");
                let fps = format!("FPS: {:.1}", view.fps);
                ui.label(egui::RichText::new(fps).color(egui::Color32::GREEN));
            }
        });
    });

    // 翻页与旁白按钮，悬浮在画面底部中央
    egui::Area::new("page_controls")
        .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -40.0))
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(view.can_go_back, egui::Button::new(tr("nav.previous")))
                    .clicked()
                {
                    actions.push(UiAction::Navigate(Direction::Previous));
                }

                if let Some(playing) = view.narration_playing {
                    let icon = if playing { tr("audio.playing") } else { tr("audio.paused") };
                    let button = egui::Button::new(egui::RichText::new(icon).size(24.0))
                        .fill(egui::Color32::from_black_alpha(128))
                        .rounding(22.0);
                    if ui.add(button).clicked() {
                        actions.push(UiAction::ToggleNarration);
                    }
                }

                if ui
                    .add_enabled(view.can_go_forward, egui::Button::new(tr("nav.next")))
                    .clicked()
                {
                    actions.push(UiAction::Navigate(Direction::Next));
                }
            });
        });

    if !view.text.is_empty() {
        draw_marquee(ctx, view.text, view.elapsed);
    }

    actions
}

fn draw_marquee(ctx: &egui::Context, text: &str, elapsed: f32) {
    let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let galley = ctx.fonts(|f| {
        f.layout_no_wrap(
            line,
            egui::FontId::proportional(MARQUEE_FONT_SIZE),
            egui::Color32::WHITE,
        )
    });

    let screen = ctx.available_rect();
    let x = marquee_offset(elapsed, galley.size().x, screen.width());
    let y = screen.bottom() - 90.0;

    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("marquee"),
    ));
    painter.galley(egui::pos2(screen.left() + x, y), galley);
    // 跑马灯需要持续重绘
    ctx.request_repaint();
}
