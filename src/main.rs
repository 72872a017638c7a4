use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::event::{DisableFocusChange, EnableFocusChange, KeyEventKind};
use crossterm::execute;
use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use fctop::app::App;
use fctop::channel::{SharedChannel, ShellChannel};
use fctop::config::{self, Config, load_config, load_config_from_path};
use fctop::event::{Event, EventHandler};
use fctop::logging::{LogTarget, init_logging};
use fctop::sampler::{SampleReport, Sampler};
use fctop::system::collector::Collector;
use fctop::system::device::DeviceInfo;
use fctop::tweaks::TweakStore;
use fctop::tweaks::presets::{Preset, preset_path, presets_dir};
use fctop::ui;

const UI_TICK: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(
    name = "fctop",
    about = "Terminal monitor and tweak manager for Floppy kernels"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Refresh rate in milliseconds
    #[arg(long)]
    refresh_rate: Option<u64>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Sample memory, CPU and GPU once and print JSON
    Snapshot {
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Load every tweak and print current, saved and pending values as JSON
    Tweaks,
    /// Capture or apply named presets
    Preset {
        #[command(subcommand)]
        action: PresetCommand,
    },
}

#[derive(Subcommand)]
enum PresetCommand {
    /// Store the pending state of every available tweak
    Capture { name: String },
    /// Load a preset into pending state, optionally saving and applying it
    Apply {
        name: String,
        #[arg(long, default_value_t = false)]
        save: bool,
        #[arg(long, default_value_t = false)]
        apply: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);

    let target = LogTarget::for_mode(cli.command.is_none(), &config.logging);
    init_logging(&config.logging, &target)?;

    let channel: SharedChannel = Arc::new(ShellChannel::from_config(&config.backend));

    match cli.command {
        Some(Command::Snapshot { pretty }) => run_snapshot(&config, channel, pretty).await,
        Some(Command::Tweaks) => run_tweaks(&config, channel).await,
        Some(Command::Preset { action }) => run_preset(&config, channel, action).await,
        None => run_interactive(config, channel).await,
    }
}

async fn run_interactive(config: Config, channel: SharedChannel) -> Result<()> {
    let device = DeviceInfo::detect(channel.as_ref()).await;
    let collector = Arc::new(Collector::new(
        channel.clone(),
        config.gpu.probe(device.is_trinket()),
    ));
    let (sampler, samples) = Sampler::new(
        collector,
        Duration::from_millis(config.general.refresh_rate_ms),
    );
    let tweaks = TweakStore::builtin(channel, &config.backend.data_dir);

    let mut terminal = ratatui::init();
    execute!(stdout(), EnableFocusChange)?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = execute!(std::io::stdout(), DisableFocusChange);
        ratatui::restore();
        original_hook(panic_info);
    }));

    let app = App::new(&config, sampler, tweaks, device);
    let result = run(&mut terminal, app, samples).await;

    execute!(stdout(), DisableFocusChange)?;
    ratatui::restore();

    result
}

async fn run(
    terminal: &mut ratatui::DefaultTerminal,
    mut app: App,
    mut samples: UnboundedReceiver<SampleReport>,
) -> Result<()> {
    let mut events = EventHandler::new(UI_TICK);

    app.load_tweaks().await;
    terminal.draw(|frame| ui::draw(frame, &app))?;

    while app.running {
        let should_draw = tokio::select! {
            Some(event) = events.next() => handle_event(&mut app, event).await,
            Some(report) = samples.recv() => app.on_sample(report),
            else => break,
        };
        if should_draw {
            terminal.draw(|frame| ui::draw(frame, &app))?;
        }
    }

    Ok(())
}

async fn handle_event(app: &mut App, event: Event) -> bool {
    match event {
        Event::Key(key) => {
            if key.kind != KeyEventKind::Press {
                return false;
            }
            let action = app.map_key(key);
            app.dispatch(action).await;
            true
        }
        Event::Resize => true,
        Event::FocusGained => {
            app.on_focus(true);
            false
        }
        Event::FocusLost => {
            app.on_focus(false);
            false
        }
        Event::Tick => app.on_tick(),
    }
}

async fn run_snapshot(config: &Config, channel: SharedChannel, pretty: bool) -> Result<()> {
    let device = DeviceInfo::detect(channel.as_ref()).await;
    let collector = Collector::new(channel, config.gpu.probe(device.is_trinket()));
    let snapshot = collector.sample().await;

    let value = json!({ "device": device, "snapshot": snapshot });
    let text = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{text}");
    Ok(())
}

async fn run_tweaks(config: &Config, channel: SharedChannel) -> Result<()> {
    let mut store = TweakStore::builtin(channel, &config.backend.data_dir);
    let failures = store.load_all().await;

    let tweaks: Vec<_> = store
        .iter()
        .map(|tweak| {
            let state = tweak.state();
            let error = failures
                .iter()
                .find(|(id, _)| *id == tweak.id())
                .map(|(_, err)| err.to_string());
            json!({
                "id": tweak.id(),
                "available": tweak.is_available(),
                "loaded": tweak.is_loaded(),
                "dirty": tweak.is_dirty(),
                "dirty_fields": state.dirty_fields(),
                "current": state.current(),
                "saved": state.saved(),
                "pending": state.pending(),
                "error": error,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&tweaks)?);
    Ok(())
}

async fn run_preset(config: &Config, channel: SharedChannel, action: PresetCommand) -> Result<()> {
    let dir = presets_dir().ok_or_else(|| eyre!("no config directory for presets"))?;
    let mut store = TweakStore::builtin(channel, &config.backend.data_dir);
    for (id, err) in store.load_all().await {
        eprintln!("warning: {id}: {err}");
    }

    match action {
        PresetCommand::Capture { name } => {
            let path = preset_path(&dir, &name);
            Preset::capture(&name, &store).save(&path)?;
            info!(preset = %name, path = %path.display(), "preset captured");
            println!("Saved preset {name} to {}", path.display());
        }
        PresetCommand::Apply { name, save, apply } => {
            let preset = Preset::load(&preset_path(&dir, &name))?;
            let updated = preset.apply_to(&mut store);
            let failures = store.commit(&updated, save, apply).await;
            for (id, err) in &failures {
                eprintln!("error: {id}: {err}");
            }
            if !failures.is_empty() {
                return Err(eyre!(
                    "{} of {} tweak(s) failed",
                    failures.len(),
                    updated.len()
                ));
            }
            println!("Preset {name} loaded into {} tweak(s)", updated.len());
        }
    }
    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> config::Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(rate) = cli.refresh_rate {
        config.general.refresh_rate_ms = rate;
    }
    if let Some(ref path) = cli.log_file {
        config.logging.file = Some(path.clone());
    }

    config
}
