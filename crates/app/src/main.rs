use eframe::egui;
use parking_lot::Mutex;
use shared::settings::AssistantSettings;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod state;
pub use state::AppState;

fn config_path() -> Option<PathBuf> {
    let proj = directories::ProjectDirs::from("com.local", "Deskmate", "Deskmate")?;
    let _ = fs::create_dir_all(proj.config_dir());
    Some(proj.config_dir().join("settings.json"))
}

fn load_settings_or_default() -> (AssistantSettings, bool) {
    if let Some(path) = config_path() {
        if path.exists() {
            if let Ok(bytes) = fs::read(&path) {
                if let Ok(settings) = serde_json::from_slice::<AssistantSettings>(&bytes) {
                    return (settings, false);
                }
            }
        }
    }
    (AssistantSettings::default(), true)
}

fn save_settings(settings: &AssistantSettings) -> anyhow::Result<()> {
    let path =
        config_path().ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;
    fs::write(&path, serde_json::to_vec_pretty(settings)?)?;
    Ok(())
}

struct DeskmateApp {
    state: Arc<Mutex<AppState>>,
}

impl eframe::App for DeskmateApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut state = self.state.lock();
        state.poll_jobs();

        // Keep painting while a worker is reporting progress.
        if state.runner.is_running() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.heading("Deskmate");
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                ui.label("Query / text:");
                ui.add(
                    egui::TextEdit::singleline(&mut state.input_text)
                        .desired_width(f32::INFINITY),
                );
            });

            let controls_enabled = !state.runner.is_running();
            ui.horizontal(|ui| {
                ui.add_enabled_ui(controls_enabled, |ui| {
                    if ui.button("Drive Search").clicked() {
                        state.start_drive_search();
                    }
                    if ui.button("Process Mail").clicked() {
                        state.start_mail_triage();
                    }
                    if ui.button("Add Tasks").clicked() {
                        state.start_task_capture();
                    }
                    if ui.button("Generate Report").clicked() {
                        state.start_report();
                    }
                    if !state.google_connected && ui.button("Connect Google").clicked() {
                        state.start_connect_google();
                    }
                });
            });

            ui.horizontal(|ui| {
                ui.add(
                    egui::ProgressBar::new(state.progress_percent as f32 / 100.0)
                        .desired_width(220.0),
                );
                ui.label(&state.status_text);
                if let Some(notice) = &state.notice {
                    ui.colored_label(egui::Color32::YELLOW, notice);
                }
            });
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label("Result:");
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut state.result_text.as_str())
                            .desired_width(f32::INFINITY)
                            .desired_rows(24),
                    );
                });
        });
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let (settings, first_run) = load_settings_or_default();
    if first_run {
        if let Err(e) = save_settings(&settings) {
            tracing::warn!("could not write default settings: {}", e);
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_min_inner_size([640.0, 480.0]),
        vsync: true,
        ..Default::default()
    };
    eframe::run_native(
        "Deskmate",
        options,
        Box::new(|_cc| {
            Box::new(DeskmateApp {
                state: Arc::new(Mutex::new(AppState::new(settings))),
            })
        }),
    )
}
