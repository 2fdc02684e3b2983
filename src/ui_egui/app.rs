use std::time::{Duration, Instant};

use chrono::{Local, TimeZone, Timelike};

use super::input::InputTranslator;
use super::painter::{EguiSurface, EguiTextMeasure};
use crate::models::settings::{Settings, DAY_VIEW_DAYS, WEEK_VIEW_DAYS};
use crate::services::calendar_view::{CalendarView, TextMetrics};
use crate::services::loader::{EventLoader, EventSource};
use crate::services::render::GridPalette;
use crate::services::selection::{InputEvent, ViewCommand};
use crate::utils::date::{format_day_header, julian_day_of};

const MIN_GRID_WIDTH: f32 = 240.0;
const MIN_GRID_HEIGHT: f32 = 200.0;
/// How often to look for loader results while a load is running.
const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Demo window hosting one calendar grid.
pub struct CalendarGridApp {
    settings: Settings,
    view: CalendarView<Local>,
    loader: EventLoader,
    input: InputTranslator,
    /// Last action requested by the grid, shown in the status bar
    status: String,
}

impl eframe::App for CalendarGridApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loader();
        self.handle_shortcuts(ctx);

        egui::TopBottomPanel::top("grid_header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let title = format!(
                    "{} .. {}",
                    format_day_header(self.view.first_day()),
                    format_day_header(self.view.last_day())
                );
                ui.heading(title);
                ui.separator();
                if ui
                    .selectable_label(self.view.num_days() == DAY_VIEW_DAYS, "Day")
                    .clicked()
                {
                    self.set_num_days(DAY_VIEW_DAYS);
                }
                if ui
                    .selectable_label(self.view.num_days() == WEEK_VIEW_DAYS, "Week")
                    .clicked()
                {
                    self.set_num_days(WEEK_VIEW_DAYS);
                }
            });
        });

        egui::TopBottomPanel::bottom("grid_status").show(ctx, |ui| {
            ui.label(&self.status);
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| self.show_grid(ui));

        self.schedule_repaint(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("Shutting down event loader");
        self.loader.shutdown();
    }
}

impl CalendarGridApp {
    pub fn new<S: EventSource>(cc: &eframe::CreationContext<'_>, settings: Settings, source: S) -> Self {
        let now = Local::now();
        let view = CalendarView::new(&settings, Local, julian_day_of(&now), now.hour() as i32);
        let loader = EventLoader::spawn(source);

        let palette = Self::palette_for(&cc.egui_ctx);
        log::info!(
            "Starting {}-day grid ({} theme)",
            view.num_days(),
            if palette.is_dark { "dark" } else { "light" }
        );

        let mut app = Self {
            settings,
            view,
            loader,
            input: InputTranslator::new(),
            status: String::new(),
        };
        if let Some(command) = app.view.reload_events() {
            app.handle_commands(vec![command]);
        }
        app
    }

    fn palette_for(ctx: &egui::Context) -> GridPalette {
        if ctx.style().visuals.dark_mode {
            GridPalette::dark()
        } else {
            GridPalette::light()
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (day, week) = ctx.input(|i| {
            let plain = !i.modifiers.any();
            (
                plain && i.key_pressed(egui::Key::D),
                plain && i.key_pressed(egui::Key::W),
            )
        });
        if day {
            self.set_num_days(DAY_VIEW_DAYS);
        }
        if week {
            self.set_num_days(WEEK_VIEW_DAYS);
        }
    }

    fn set_num_days(&mut self, num_days: u32) {
        if self.view.num_days() == num_days {
            return;
        }
        let day = self.view.selection().day;
        if let Some(command) = self.view.set_num_days(num_days, day) {
            self.handle_commands(vec![command]);
        }
    }

    fn show_grid(&mut self, ui: &mut egui::Ui) {
        let size = ui.available_size().max(egui::vec2(MIN_GRID_WIDTH, MIN_GRID_HEIGHT));
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());
        let ctx = ui.ctx().clone();

        let measure = EguiTextMeasure::new(&ctx, self.view.config().hours_font_size);
        self.view.set_text_metrics(TextMetrics::measure(
            self.view.config(),
            &measure,
            self.settings.use_24_hour_time,
        ));
        self.view.set_size(rect.width() as i32, rect.height() as i32);

        let now = Instant::now();
        let mut events = Vec::new();
        ctx.input(|i| {
            for event in &i.events {
                if let egui::Event::Key {
                    key,
                    pressed,
                    repeat,
                    ..
                } = event
                {
                    events.extend(self.input.key(*key, *pressed, *repeat, now));
                }
            }
        });
        let velocity = ctx.input(|i| i.pointer.velocity());
        events.extend(self.input.pointer(&response, rect.min, velocity));
        self.dispatch(events, now);

        if let Some(at) = self.view.next_tick_at() {
            if now >= at {
                self.view.tick(now);
            }
        }

        let palette = Self::palette_for(&ctx);
        let mut surface = EguiSurface::new(ui.painter().clone(), rect);
        self.view
            .render(&mut surface, &measure, &palette, &Local::now());
    }

    fn dispatch(&mut self, events: Vec<InputEvent>, now: Instant) {
        for event in events {
            let result = self.view.handle_input(event, now);
            if !result.commands.is_empty() {
                self.handle_commands(result.commands);
            }
        }
    }

    fn handle_commands(&mut self, commands: Vec<ViewCommand>) {
        for command in commands {
            match command {
                ViewCommand::ReloadEvents {
                    first_day,
                    num_days,
                } => {
                    log::debug!("Loading {} days from {}", num_days, first_day);
                    if let Err(err) = self.view.begin_load(&self.loader) {
                        log::error!("Could not request events: {}", err);
                        self.status = format!("Could not load events: {}", err);
                    }
                }
                ViewCommand::OpenDay { millis } => {
                    let Some(day) = Local
                        .timestamp_millis_opt(millis)
                        .single()
                        .map(|time| julian_day_of(&time))
                    else {
                        continue;
                    };
                    if let Some(reload) = self.view.set_num_days(DAY_VIEW_DAYS, day) {
                        self.handle_commands(vec![reload]);
                    }
                }
                ViewCommand::SwitchPage {
                    forward,
                    selection_day,
                } => {
                    log::debug!(
                        "Paged {} to day {}",
                        if forward { "forward" } else { "back" },
                        selection_day
                    );
                }
                other => {
                    log::info!("Grid requested {:?}", other);
                    self.status = describe(&other);
                }
            }
        }
    }

    fn poll_loader(&mut self) {
        while let Some(outcome) = self.loader.poll() {
            self.view.apply_load(outcome);
        }
    }

    fn schedule_repaint(&self, ctx: &egui::Context) {
        if let Some(at) = self.view.next_tick_at() {
            ctx.request_repaint_after(at.saturating_duration_since(Instant::now()));
        }
        if self.view.pending_load().is_some() {
            ctx.request_repaint_after(LOAD_POLL_INTERVAL);
        }
    }
}

fn describe(command: &ViewCommand) -> String {
    let time = |millis: i64| {
        Local
            .timestamp_millis_opt(millis)
            .single()
            .map(|time| time.format("%a %-d %b %H:%M").to_string())
            .unwrap_or_default()
    };
    match command {
        ViewCommand::OpenEvent {
            id, start_millis, ..
        } => format!("Open event {} at {}", id, time(*start_millis)),
        ViewCommand::CreateEvent {
            start_millis,
            all_day,
            ..
        } => {
            if *all_day {
                format!("New all-day event on {}", time(*start_millis))
            } else {
                format!("New event at {}", time(*start_millis))
            }
        }
        ViewCommand::DeleteEvent { id, .. } => format!("Delete event {}", id),
        ViewCommand::ShowContextMenu {
            millis,
            event: Some(id),
        } => format!("Actions for event {} at {}", id, time(*millis)),
        ViewCommand::ShowContextMenu { millis, event: None } => {
            format!("Actions for {}", time(*millis))
        }
        other => format!("{:?}", other),
    }
}
