use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use crate::action::{Action, Direction};
use crate::config::{Config, KeybindsConfig, parse_key};
use crate::monitor::{CpuView, MonitorView};
use crate::sampler::{SampleReport, Sampler};
use crate::system::device::DeviceInfo;
use crate::tweaks::definition::{FieldDisplay, FieldSpec, value_of};
use crate::tweaks::TweakStore;
use crate::ui::theme::Theme;

const STATUS_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Monitor,
    Tweaks,
}

impl Tab {
    pub fn next(self) -> Self {
        match self {
            Tab::Monitor => Tab::Tweaks,
            Tab::Tweaks => Tab::Monitor,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Monitor => "Monitor",
            Tab::Tweaks => "Tweaks",
        }
    }

    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "tweaks" => Tab::Tweaks,
            _ => Tab::Monitor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Edit,
    Help,
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub help: KeyCode,
    pub next_tab: KeyCode,
    pub toggle_cpu_view: KeyCode,
    pub save: KeyCode,
    pub apply: KeyCode,
    pub save_apply: KeyCode,
    pub reload: KeyCode,
    pub edit: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
            next_tab: parse_key(&kb.next_tab).unwrap_or(KeyCode::Tab),
            toggle_cpu_view: parse_key(&kb.toggle_cpu_view).unwrap_or(KeyCode::Char('c')),
            save: parse_key(&kb.save).unwrap_or(KeyCode::Char('s')),
            apply: parse_key(&kb.apply).unwrap_or(KeyCode::Char('a')),
            save_apply: parse_key(&kb.save_apply).unwrap_or(KeyCode::Char('A')),
            reload: parse_key(&kb.reload).unwrap_or(KeyCode::Char('r')),
            edit: parse_key(&kb.edit).unwrap_or(KeyCode::Enter),
        }
    }

    /// Keybinds grouped by the tab they act on.
    pub fn help_sections(&self) -> Vec<HelpSection> {
        vec![
            HelpSection {
                title: "Global",
                entries: vec![
                    (key_label(self.quit), "Quit"),
                    ("Ctrl+C".to_string(), "Quit (always)"),
                    (key_label(self.help), "Toggle help"),
                    (key_label(self.next_tab), "Switch tab"),
                ],
            },
            HelpSection {
                title: "Monitor",
                entries: vec![(key_label(self.toggle_cpu_view), "Clusters / cores")],
            },
            HelpSection {
                title: "Tweaks",
                entries: vec![
                    ("\u{2191}\u{2193}".to_string(), "Select field"),
                    ("\u{2190}\u{2192}".to_string(), "Cycle value"),
                    (key_label(self.edit), "Edit value"),
                    (key_label(self.save), "Save tweak"),
                    (key_label(self.apply), "Apply tweak"),
                    (key_label(self.save_apply), "Save and apply"),
                    (key_label(self.reload), "Reload tweak"),
                ],
            },
        ]
    }
}

/// One titled group in the help overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpSection {
    pub title: &'static str,
    pub entries: Vec<(String, &'static str)>,
}

pub fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        _ => "?".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub created: Instant,
}

/// One editable line on the tweaks tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRow {
    pub tweak: &'static str,
    pub field: &'static FieldSpec,
}

fn is_typed(field: &FieldSpec) -> bool {
    field.is_free() || matches!(field.display, FieldDisplay::Mebibytes { .. })
}

pub struct App {
    pub running: bool,
    pub tab: Tab,
    pub input_mode: InputMode,
    pub monitor: MonitorView,
    pub tweaks: TweakStore,
    pub sampler: Sampler,
    pub device: DeviceInfo,
    pub theme: Theme,
    pub keybinds: ResolvedKeybinds,
    pub selected: usize,
    pub edit_buffer: String,
    pub status_message: Option<StatusMessage>,
}

impl App {
    /// Builds the app and starts sampling when it opens on the monitor tab.
    pub fn new(config: &Config, sampler: Sampler, tweaks: TweakStore, device: DeviceInfo) -> Self {
        let mut app = App {
            running: true,
            tab: Tab::from_str_config(&config.general.start_tab),
            input_mode: InputMode::Normal,
            monitor: MonitorView::new(
                config.general.history_length,
                CpuView::from_str_config(&config.general.cpu_view),
            ),
            tweaks,
            sampler,
            device,
            theme: Theme::from_config(&config.general.theme),
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
            selected: 0,
            edit_buffer: String::new(),
            status_message: None,
        };
        app.sampler.set_view_active(app.tab == Tab::Monitor);
        app
    }

    pub async fn load_tweaks(&mut self) {
        let failures = self.tweaks.load_all().await;
        if let Some((id, err)) = failures.first() {
            self.set_status(format!("{id}: {err}"), true);
        }
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits (hardwired safety)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key),
            InputMode::Edit => self.map_key_edit(key),
            InputMode::Help => self.map_key_help(key),
        }
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        match code {
            KeyCode::Up => return Action::Navigate(Direction::Up),
            KeyCode::Down => return Action::Navigate(Direction::Down),
            KeyCode::Left => return Action::Navigate(Direction::Left),
            KeyCode::Right => return Action::Navigate(Direction::Right),
            _ => {}
        }

        if code == kb.quit {
            return Action::Quit;
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }
        if code == kb.next_tab {
            return Action::NextTab;
        }

        match self.tab {
            Tab::Monitor if code == kb.toggle_cpu_view => Action::ToggleCpuView,
            Tab::Tweaks if code == kb.save => Action::Save,
            Tab::Tweaks if code == kb.apply => Action::Apply,
            Tab::Tweaks if code == kb.save_apply => Action::SaveApply,
            Tab::Tweaks if code == kb.reload => Action::Reload,
            Tab::Tweaks if code == kb.edit => Action::BeginEdit,
            _ => Action::None,
        }
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        let code = key.code;
        if code == self.keybinds.help || code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    fn map_key_edit(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => Action::CancelEdit,
            KeyCode::Enter => Action::CommitEdit,
            KeyCode::Backspace => {
                let mut text = self.edit_buffer.clone();
                text.pop();
                Action::UpdateEdit(text)
            }
            KeyCode::Char(c) => {
                let mut text = self.edit_buffer.clone();
                text.push(c);
                Action::UpdateEdit(text)
            }
            _ => Action::None,
        }
    }

    pub async fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.sampler.stop();
                self.running = false;
            }
            Action::NextTab => self.set_tab(self.tab.next()),
            Action::ToggleHelp => {
                self.input_mode = if self.input_mode == InputMode::Help {
                    InputMode::Normal
                } else {
                    InputMode::Help
                };
            }
            Action::ToggleCpuView => self.monitor.toggle_cpu_view(),
            Action::Navigate(dir) => self.navigate(dir),
            Action::BeginEdit => self.begin_edit(),
            Action::UpdateEdit(text) => self.edit_buffer = text,
            Action::CommitEdit => self.commit_edit(),
            Action::CancelEdit => {
                self.edit_buffer.clear();
                self.input_mode = InputMode::Normal;
            }
            Action::Save => self.run_tweak_action("saved", TweakOp::Save).await,
            Action::Apply => self.run_tweak_action("applied", TweakOp::Apply).await,
            Action::SaveApply => {
                self.run_tweak_action("saved and applied", TweakOp::SaveApply)
                    .await
            }
            Action::Reload => self.run_tweak_action("reloaded", TweakOp::Reload).await,
            Action::None => {}
        }
    }

    pub fn set_tab(&mut self, tab: Tab) {
        if tab == self.tab {
            return;
        }
        self.tab = tab;
        self.input_mode = InputMode::Normal;
        // History is kept across tab switches; only the sampler pauses.
        self.sampler.set_view_active(tab == Tab::Monitor);
        debug!(tab = tab.label(), "tab changed");
    }

    /// Terminal focus drives page visibility.
    pub fn on_focus(&mut self, visible: bool) {
        self.sampler.set_page_visible(visible);
    }

    /// Ingests a report if the sampler still wants it. Returns whether it was
    /// accepted.
    pub fn on_sample(&mut self, report: SampleReport) -> bool {
        if !self.sampler.accepts(&report) {
            debug!(
                generation = report.generation,
                current = self.sampler.generation(),
                "dropping stale sample"
            );
            return false;
        }
        self.monitor.ingest(report.snapshot);
        true
    }

    /// Returns true when something changed on screen.
    pub fn on_tick(&mut self) -> bool {
        if let Some(status) = &self.status_message
            && status.created.elapsed() >= STATUS_TTL
        {
            self.status_message = None;
            return true;
        }
        false
    }

    pub fn rows(&self) -> Vec<FieldRow> {
        self.tweaks
            .available()
            .flat_map(|tweak| {
                let pending = tweak.state().pending();
                tweak
                    .definition()
                    .fields
                    .iter()
                    .filter(move |field| field.is_visible(pending))
                    .map(move |field| FieldRow {
                        tweak: tweak.id(),
                        field,
                    })
            })
            .collect()
    }

    pub fn selected_row(&self) -> Option<FieldRow> {
        self.rows().get(self.selected).copied()
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    pub fn help_sections(&self) -> Vec<HelpSection> {
        self.keybinds.help_sections()
    }

    fn set_status(&mut self, text: String, is_error: bool) {
        self.status_message = Some(StatusMessage {
            text,
            is_error,
            created: Instant::now(),
        });
    }

    fn navigate(&mut self, direction: Direction) {
        if self.tab != Tab::Tweaks {
            return;
        }
        let count = self.rows().len();
        if count == 0 {
            self.selected = 0;
            return;
        }
        match direction {
            Direction::Up => self.selected = self.selected.saturating_sub(1),
            Direction::Down => self.selected = (self.selected + 1).min(count - 1),
            Direction::Left | Direction::Right => {
                if let Some(row) = self.selected_row()
                    && let Some(tweak) = self.tweaks.get_mut(row.tweak)
                {
                    tweak.cycle_field(row.field.key, direction == Direction::Right);
                }
            }
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let count = self.rows().len();
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
        }
    }

    fn begin_edit(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if !is_typed(row.field) {
            return;
        }
        self.edit_buffer = match (row.field.is_free(), self.tweaks.get(row.tweak)) {
            (true, Some(tweak)) => value_of(tweak.state().pending(), row.field.key).to_string(),
            _ => String::new(),
        };
        self.input_mode = InputMode::Edit;
    }

    fn commit_edit(&mut self) {
        self.input_mode = InputMode::Normal;
        let input = std::mem::take(&mut self.edit_buffer);
        let Some(row) = self.selected_row() else {
            return;
        };
        match row.field.parse_input(&input) {
            Some(value) => {
                if let Some(tweak) = self.tweaks.get_mut(row.tweak) {
                    tweak.set_field(row.field.key, value);
                }
            }
            None => self.set_status(format!("Invalid value for {}", row.field.label), true),
        }
        self.clamp_selection();
    }

    async fn run_tweak_action(&mut self, verb: &str, op: TweakOp) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let result = match op {
            TweakOp::Save => self.tweaks.save(row.tweak).await,
            TweakOp::Apply => self.tweaks.apply(row.tweak).await,
            TweakOp::SaveApply => self.tweaks.save_and_apply(row.tweak).await,
            TweakOp::Reload => self.tweaks.reload(row.tweak).await,
        };
        match result {
            Ok(()) => self.set_status(format!("{} {verb}", row.tweak), false),
            Err(err) => {
                warn!(tweak = row.tweak, error = %err, "tweak action failed");
                self.set_status(err.to_string(), true);
            }
        }
        self.clamp_selection();
    }
}

#[derive(Debug, Clone, Copy)]
enum TweakOp {
    Save,
    Apply,
    SaveApply,
    Reload,
}
