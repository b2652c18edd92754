// main.rs - 全景绘本查看器：窗口、事件循环、手势转发与翻页

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // Release 下隐藏控制台窗口

mod renderer;
mod ui;

use renderer::{Renderer, SceneMode};
use ui::{PageView, UiAction, UiState};

use anyhow::Context as _;
use clap::Parser;
use rodio::{OutputStream, OutputStreamHandle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use storybook::assets::{find_default_story_dir, StoryDir};
use storybook::audio::{open_output, transport_factory};
use storybook::config::Config;
use storybook::frame::{FixedStepClock, FpsCounter, FrameClock, DEFAULT_TICK_RATE_HZ};
use storybook::input::{to_points, PanTracker, ZoomGesture};
use storybook::loader::{ImageLoader, LoadEvent};
use storybook::{Direction, GestureEvent, PageHost, PageKind, PageSequence};
use winit::{
    dpi::{LogicalSize, PhysicalPosition},
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowBuilder},
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn open_story(dir: &Path, config: &Config, audio: Option<&OutputStreamHandle>) -> PageHost {
    let story = StoryDir::new(dir);
    let options = config.page_options();
    let sequence = match config.pages {
        Some(n) => PageSequence::from_manifest(n),
        None => PageSequence::probe(&story, &options.image_ext),
    };
    log::info!("story {} ({} pages)", dir.display(), sequence.total_pages());

    let mut host = PageHost::new(
        Box::new(story),
        sequence,
        options,
        transport_factory(audio.cloned()),
    );
    if config.start_page > 0 {
        if let Err(e) = host.jump_to(config.start_page) {
            log::warn!("--start-page: {}", e);
        }
    }
    host
}

struct Viewer {
    config: Config,
    story_dir: PathBuf,
    host: PageHost,
    pan: PanTracker,
    zoom: ZoomGesture,
    clock: FixedStepClock,
    fps: FpsCounter,
    cursor: Option<PhysicalPosition<f64>>,
    touch_id: Option<u64>,
    page_opened: Instant,
    images: ImageLoader,
    ui: UiState,
    audio: Option<OutputStreamHandle>,
    _audio_stream: Option<OutputStream>,
}

impl Viewer {
    fn scene_mode(&self) -> SceneMode {
        match self.host.current().map(|p| p.kind()) {
            Some(PageKind::Panoramic) => SceneMode::Panorama,
            _ => SceneMode::Cover,
        }
    }

    fn gesture(&mut self, event: GestureEvent) {
        if let Some(cam) = self.host.current_mut().and_then(|p| p.camera_mut()) {
            cam.apply(event);
        }
    }

    /// Reset per-page input state and start decoding the new page's image.
    fn page_changed(&mut self, renderer: &mut Renderer) {
        let now = Instant::now();
        self.pan = PanTracker::default();
        self.zoom = ZoomGesture::default();
        self.clock.reset(now);
        self.page_opened = now;
        renderer.clear_image();

        match self.host.current().and_then(|p| Some((p.index(), p.image()?))) {
            Some((index, path)) => self.images.request(index, path.to_path_buf()),
            None => self.images.cancel(),
        }
    }

    fn navigate(&mut self, direction: Direction, renderer: &mut Renderer) {
        // 边界处翻页失败对界面来说是无操作
        if self.host.go_to(direction).is_ok() {
            self.page_changed(renderer);
        }
    }

    fn toggle_narration(&mut self) {
        let narration = self.host.current_mut().and_then(|p| p.narration_mut());
        if let Some(n) = narration.filter(|n| n.is_audible()) {
            n.toggle();
        }
    }

    fn open_story_dir(&mut self, dir: PathBuf, renderer: &mut Renderer) {
        // 新目录从封面开始
        self.config.start_page = 0;
        self.host = open_story(&dir, &self.config, self.audio.as_ref());
        self.story_dir = dir;
        self.page_changed(renderer);
    }

    fn receive_images(&mut self, renderer: &mut Renderer) {
        // 过期请求的结果已在 loader 中丢弃
        while let Some(event) = self.images.try_recv() {
            if let LoadEvent::Loaded { image, .. } = event {
                renderer.load_image(image, self.scene_mode());
            }
        }
    }

    fn frame(&mut self, now: Instant) {
        self.fps.frame(now);
        let ticks = self.clock.ticks_due(now);
        if let Some(end) = self.zoom.poll(now) {
            self.gesture(end);
        }
        if let Some(cam) = self.host.current_mut().and_then(|p| p.camera_mut()) {
            cam.advance(ticks);
        }
    }

    fn page_view(&self, now: Instant) -> PageView<'_> {
        let page = self.host.current();
        PageView {
            index: page.map(|p| p.index()),
            total_pages: self.host.sequence().total_pages(),
            kind: page.map(|p| p.kind()),
            can_go_back: self.host.can_go_back(),
            can_go_forward: self.host.can_go_forward(),
            text: page.map_or("", |p| p.text()),
            narration_playing: page
                .and_then(|p| p.narration())
                .filter(|n| n.is_audible())
                .map(|n| n.is_playing()),
            orientation: page.and_then(|p| p.camera()).map(|c| c.orientation()),
            loading: self.images.is_loading(),
            fps: self.fps.fps(),
            elapsed: now.duration_since(self.page_opened).as_secs_f32(),
            story_dir: &self.story_dir,
        }
    }
}

fn run() -> anyhow::Result<()> {
    let config = Config::parse();
    storybook::i18n::init(&config.lang);

    let story_dir = config
        .story_dir
        .clone()
        .or_else(find_default_story_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let (audio_stream, audio) = open_output().unzip();
    let host = open_story(&story_dir, &config, audio.as_ref());

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(storybook::i18n::tr("app.title"))
        .with_inner_size(LogicalSize::new(1280, 720))
        .build(&event_loop)
        .context("create window")?;

    let mut renderer = pollster::block_on(Renderer::new(&window, config.vsync()))?;

    let now = Instant::now();
    let ui_state = UiState {
        show_fps: false,
        vsync: config.vsync(),
        lang: config.lang.clone(),
        is_fullscreen: false,
    };
    let mut viewer = Viewer {
        config,
        story_dir,
        host,
        pan: PanTracker::default(),
        zoom: ZoomGesture::default(),
        clock: FixedStepClock::new(DEFAULT_TICK_RATE_HZ, now),
        fps: FpsCounter::new(now),
        cursor: None,
        touch_id: None,
        page_opened: now,
        images: ImageLoader::new(),
        ui: ui_state,
        audio,
        _audio_stream: audio_stream,
    };
    viewer.page_changed(&mut renderer);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        viewer.receive_images(&mut renderer);

        match event {
            Event::WindowEvent { event, .. } => {
                let is_release = matches!(
                    event,
                    WindowEvent::MouseInput {
                        state: ElementState::Released,
                        ..
                    }
                );
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.consumed && !is_release {
                    return;
                }
                handle_window_event(event, &mut viewer, &mut renderer, &window, control_flow);
            }

            Event::RedrawRequested(_) => {
                let now = Instant::now();
                viewer.frame(now);

                let orientation = viewer
                    .host
                    .current()
                    .and_then(|p| p.camera())
                    .map(|c| c.orientation())
                    .unwrap_or_else(|| storybook::OrbitCamera::new().orientation());
                renderer.update_camera(viewer.scene_mode(), orientation);

                let mut actions = Vec::new();
                let mut ui_state = viewer.ui.clone();
                let render_result = {
                    let view = viewer.page_view(now);
                    renderer.render_with_ui(&window, |ctx| {
                        actions = ui::draw_ui(ctx, &mut ui_state, &view);
                    })
                };
                viewer.ui = ui_state;

                for action in actions {
                    apply_action(action, &mut viewer, &mut renderer, &window, control_flow);
                }

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("GPU out of memory");
                        *control_flow = ControlFlow::Exit;
                    }
                    Err(e) => log::warn!("render error: {:?}", e),
                }
            }

            Event::MainEventsCleared => {
                window.request_redraw();
            }

            _ => {}
        }
    })
}

fn handle_window_event(
    event: WindowEvent<'_>,
    viewer: &mut Viewer,
    renderer: &mut Renderer,
    window: &Window,
    control_flow: &mut ControlFlow,
) {
    let now = Instant::now();
    match event {
        WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,

        WindowEvent::Resized(new_size) => renderer.resize(new_size),

        WindowEvent::KeyboardInput { input, .. } if input.state == ElementState::Pressed => {
            match input.virtual_keycode {
                Some(VirtualKeyCode::Right) | Some(VirtualKeyCode::PageDown) => {
                    viewer.navigate(Direction::Next, renderer)
                }
                Some(VirtualKeyCode::Left) | Some(VirtualKeyCode::PageUp) => {
                    viewer.navigate(Direction::Previous, renderer)
                }
                Some(VirtualKeyCode::Space) => viewer.toggle_narration(),
                Some(VirtualKeyCode::Home) => {
                    apply_action(UiAction::ResetView, viewer, renderer, window, control_flow)
                }
                Some(VirtualKeyCode::F11) => {
                    apply_action(UiAction::ToggleFullscreen, viewer, renderer, window, control_flow)
                }
                Some(VirtualKeyCode::O) => {
                    if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                        viewer.open_story_dir(dir, renderer);
                    }
                }
                _ => {}
            }
        }

        WindowEvent::MouseInput {
            state,
            button: MouseButton::Left,
            ..
        } => match state {
            ElementState::Pressed => {
                if let Some(pos) = viewer.cursor {
                    let (x, y) = to_points(pos.x, pos.y, window.scale_factor());
                    viewer.pan.press(x, y, now);
                }
            }
            ElementState::Released => {
                if let Some(ended) = viewer.pan.release(now) {
                    viewer.gesture(ended);
                }
            }
        },

        WindowEvent::CursorMoved { position, .. } => {
            viewer.cursor = Some(position);
            if viewer.touch_id.is_none() {
                let (x, y) = to_points(position.x, position.y, window.scale_factor());
                if let Some(pan) = viewer.pan.moved(x, y, now) {
                    viewer.gesture(pan);
                }
            }
        }

        WindowEvent::CursorLeft { .. } => {
            viewer.cursor = None;
            if let Some(ended) = viewer.pan.release(now) {
                viewer.gesture(ended);
            }
        }

        WindowEvent::Touch(touch) => handle_touch(touch, window.scale_factor(), viewer, now),

        WindowEvent::MouseWheel { delta, .. } => {
            let lines = match delta {
                MouseScrollDelta::LineDelta(_, y) => y,
                MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 20.0,
            };
            for e in viewer.zoom.wheel(lines, now) {
                viewer.gesture(e);
            }
        }

        WindowEvent::TouchpadMagnify { delta, .. } => {
            for e in viewer.zoom.magnify(delta as f32, now) {
                viewer.gesture(e);
            }
        }

        WindowEvent::DroppedFile(path) => {
            let dir = if path.is_dir() {
                Some(path)
            } else {
                path.parent().map(Path::to_path_buf)
            };
            if let Some(dir) = dir {
                viewer.open_story_dir(dir, renderer);
            }
        }

        _ => {}
    }
}

/// Single-finger touch drives the pan gesture; other fingers are ignored.
fn handle_touch(touch: Touch, scale_factor: f64, viewer: &mut Viewer, now: Instant) {
    let (x, y) = to_points(touch.location.x, touch.location.y, scale_factor);
    match touch.phase {
        TouchPhase::Started if viewer.touch_id.is_none() => {
            viewer.touch_id = Some(touch.id);
            viewer.pan.press(x, y, now);
        }
        TouchPhase::Moved if viewer.touch_id == Some(touch.id) => {
            if let Some(pan) = viewer.pan.moved(x, y, now) {
                viewer.gesture(pan);
            }
        }
        TouchPhase::Ended | TouchPhase::Cancelled if viewer.touch_id == Some(touch.id) => {
            viewer.touch_id = None;
            if let Some(ended) = viewer.pan.release(now) {
                viewer.gesture(ended);
            }
        }
        _ => {}
    }
}

fn apply_action(
    action: UiAction,
    viewer: &mut Viewer,
    renderer: &mut Renderer,
    window: &Window,
    control_flow: &mut ControlFlow,
) {
    match action {
        UiAction::Navigate(direction) => viewer.navigate(direction, renderer),
        UiAction::ToggleNarration => viewer.toggle_narration(),
        UiAction::ResetView => {
            if let Some(cam) = viewer.host.current_mut().and_then(|p| p.camera_mut()) {
                cam.reset();
            }
        }
        UiAction::ToggleFullscreen => {
            viewer.ui.is_fullscreen = !viewer.ui.is_fullscreen;
            if viewer.ui.is_fullscreen {
                window.set_fullscreen(Some(Fullscreen::Borderless(None)));
            } else {
                window.set_fullscreen(None);
            }
        }
        UiAction::OpenStory(dir) => viewer.open_story_dir(dir, renderer),
        UiAction::SetLanguage(code) => {
            storybook::i18n::init(&code);
            window.set_title(&storybook::i18n::tr("app.title"));
        }
        UiAction::SetVsync(on) => renderer.set_vsync(on),
        UiAction::Exit => *control_flow = ControlFlow::Exit,
    }
}
