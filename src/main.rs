//! deeplaunch - streaming-content hand-off to native apps or the web
//!
//! Binary entry point. Resolution, execution and the HTTP endpoint live in
//! the workspace crates; this file only parses arguments and prints.

mod output;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use deeplaunch_app::{
    init_config, load_settings, resolve_config_path, serve, DeepLinkService, LaunchService,
    ResolveRequest, Settings,
};
use deeplaunch_core::{
    ContentRecord, ContentType, DeviceProfile, DeviceSession, EnvironmentSignals, LaunchPlan,
    PlatformRegistry,
};
use deeplaunch_launcher::{pump_lines, DryRunNavigator, Navigator, SystemNavigator};

use output::CliEvent;

/// Resolve and perform streaming-content hand-offs
#[derive(Parser, Debug)]
#[command(name = "deeplaunch", version)]
#[command(about = "Open streaming titles in the native app when possible, the web otherwise", long_about = None)]
struct Cli {
    /// Config file (default: $DEEPLAUNCH_CONFIG or <config_dir>/deeplaunch/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP launch endpoint
    Serve {
        /// Override `server.bind`
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Print the launch plan for a title
    Resolve {
        #[command(flatten)]
        target: TargetArgs,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Resolve a title and open it on this machine
    Launch {
        #[command(flatten)]
        target: TargetArgs,

        /// Log navigations instead of performing them
        #[arg(long)]
        dry_run: bool,

        /// Race the app against the website, reading `hidden`/`visible`
        /// foreground reports from stdin. Without it only the app is asked
        /// to open.
        #[arg(long)]
        visibility_stdin: bool,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the device profile for a set of environment signals
    Classify {
        #[command(flatten)]
        signals: SignalArgs,
    },

    /// List known platforms, including any from the config file
    Platforms {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Write a commented default config file
    InitConfig,
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// Platform id or alias, e.g. netflix, prime, disney
    #[arg(long)]
    platform: String,

    /// Platform-specific content id
    #[arg(long)]
    id: String,

    /// movie or tv
    #[arg(long = "type", value_name = "TYPE", default_value = "movie")]
    content_type: ContentType,

    /// Display title, used for messages and search fallbacks
    #[arg(long)]
    title: String,

    #[command(flatten)]
    signals: SignalArgs,
}

impl TargetArgs {
    fn request(&self) -> ResolveRequest {
        ResolveRequest {
            platform: self.platform.clone(),
            content: ContentRecord::new(&self.id, self.content_type, &self.title),
            device_info: None,
        }
    }
}

#[derive(Args, Debug, Default)]
struct SignalArgs {
    /// User-Agent string of the requesting device
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// navigator.platform style hint, e.g. iPhone, MacIntel, Win32
    #[arg(long, value_name = "HINT")]
    platform_hint: Option<String>,

    /// Viewport width in CSS pixels
    #[arg(long, value_name = "PX")]
    viewport: Option<u32>,

    /// The device has a touch screen
    #[arg(long)]
    touch: bool,
}

impl SignalArgs {
    fn signals(&self) -> EnvironmentSignals {
        EnvironmentSignals {
            user_agent: self.user_agent.clone(),
            platform_hint: self.platform_hint.clone(),
            viewport_width: self.viewport,
            touch_capable: self.touch,
        }
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    deeplaunch_core::logging::init(matches!(cli.command, Command::Serve { .. }))?;

    let config_path = resolve_config_path(cli.config.as_deref());
    let settings = config_path
        .as_deref()
        .map(load_settings)
        .unwrap_or_default();

    let result = run(cli.command, settings, config_path).await;
    if let Err(ref e) = result {
        error!("deeplaunch failed: {:?}", e);
    }
    result
}

async fn run(
    command: Command,
    settings: Settings,
    config_path: Option<PathBuf>,
) -> color_eyre::Result<()> {
    match command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.server.bind.clone());
            let service = DeepLinkService::from_settings(&settings, SystemNavigator)?;
            serve(Arc::new(service), &bind).await?;
        }

        Command::Resolve { target, json } => {
            let service = DeepLinkService::from_settings(&settings, DryRunNavigator)?;
            let device = DeviceSession::new().profile(&target.signals.signals());
            let plan = service.plan(&target.request(), &device);
            print_plan(&plan, &device, json);
        }

        Command::Launch {
            target,
            dry_run,
            visibility_stdin,
            json,
        } => {
            let options = LaunchOptions {
                visibility_stdin,
                json,
            };
            if dry_run {
                launch(&settings, DryRunNavigator, &target, options).await?;
            } else {
                launch(&settings, SystemNavigator, &target, options).await?;
            }
        }

        Command::Classify { signals } => {
            let profile = signals.signals().classify();
            CliEvent::profile(&profile).emit();
        }

        Command::Platforms { json } => {
            let registry = PlatformRegistry::with_overrides(settings.platforms)?;
            for platform in registry.iter() {
                if json {
                    CliEvent::platform(platform).emit();
                } else {
                    println!(
                        "{:<12} {:<22} {}",
                        platform.id, platform.display_name, platform.web_base_url
                    );
                }
            }
        }

        Command::InitConfig => {
            let path = config_path.ok_or_else(|| {
                color_eyre::eyre::eyre!("No config directory on this platform; pass --config")
            })?;
            if init_config(&path)? {
                println!("Wrote {}", path.display());
            } else {
                println!("{} already exists, leaving it untouched", path.display());
            }
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct LaunchOptions {
    visibility_stdin: bool,
    json: bool,
}

async fn launch<N: Navigator>(
    settings: &Settings,
    navigator: N,
    target: &TargetArgs,
    options: LaunchOptions,
) -> color_eyre::Result<()> {
    let json = options.json;
    let service = DeepLinkService::from_settings(settings, navigator)?;
    let device = DeviceSession::new().profile(&target.signals.signals());
    let plan = service.plan(&target.request(), &device);
    print_plan(&plan, &device, json);

    info!("Launching {} via {} plan", target.platform, plan.method);
    let outcome = if options.visibility_stdin {
        // Blocking reader on its own thread; process exit ends it
        let hub = service.visibility().clone();
        std::thread::spawn(move || pump_lines(std::io::stdin().lock(), &hub));
        service.launch(&plan).await
    } else {
        service.hand_off(&plan).await
    };

    if json {
        CliEvent::outcome(&outcome, &plan).emit();
    } else {
        println!("{}", outcome.status_message(&plan));
    }
    Ok(())
}

fn print_plan(plan: &LaunchPlan, device: &DeviceProfile, json: bool) {
    if json {
        CliEvent::plan(plan, device).emit();
        return;
    }

    println!("{} ({} / {})", plan.platform_display_name, device.device_class, device.os);
    println!("  method:   {}", plan.method);
    println!("  primary:  {}", plan.primary_url);
    if plan.requires_race {
        println!("  fallback: {}", plan.fallback_url);
    }
    println!("  {}", plan.user_message);
}
