//! Admin console CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use admin_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use admin_cli::commands::{
    connect, run_action, run_config, run_create, run_delete, run_edit, run_list, run_objects,
    run_show,
};
use admin_cli::config::{Overrides, Settings};
use admin_cli::logging::{LogConfig, LogFormat, init_logging};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli).await {
        Ok(()) => 0,
        Err(error) => {
            tracing::error!(error = %format!("{error:#}"), "command failed");
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let path = cli.config.clone().unwrap_or_else(Settings::config_path);
    let mut settings = Settings::load_from(&path)?;
    settings.apply(&Overrides {
        base_url: cli.base_url.clone(),
        timeout_secs: cli.timeout,
    });

    if let Command::Config(args) = &cli.command {
        return run_config(&settings, &path, args.init);
    }

    let mut console = connect(&settings).await?;
    let download_dir = settings.download_dir();
    match &cli.command {
        Command::Objects => {
            run_objects(&console);
            Ok(())
        }
        Command::List(args) => run_list(&mut console, args).await,
        Command::Show(args) => run_show(&mut console, args).await,
        Command::Create(args) => run_create(&mut console, args).await,
        Command::Edit(args) => run_edit(&mut console, args).await,
        Command::Action(args) => run_action(&mut console, args, &download_dir).await,
        Command::Delete(args) => run_delete(&mut console, args, &download_dir).await,
        Command::Config(_) => Ok(()),
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
