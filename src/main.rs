use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use xmlview::parser::MAX_DEPTH_LIMIT;
use xmlview::{
    Config, DocumentPipeline, Fetcher, Method, OutputFormat, PanelKind, Presenter,
    ReqwestTransport, Viewer,
};

fn cli() -> Command {
    Command::new("xmlview")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fetch an XML document and show it as a highlighted tree with its errors and warnings")
        .arg(
            Arg::new("target")
                .help("URL, path relative to the base URL, local file, or - for stdin")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("method")
                .short('X')
                .long("method")
                .help("Request method: GET or POST")
                .value_parser(|s: &str| s.parse::<Method>()),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .help(format!("Output format: {}", OutputFormat::NAMES.join(", ")))
                .value_parser(|s: &str| s.parse::<OutputFormat>()),
        )
        .arg(
            Arg::new("panel")
                .short('p')
                .long("panel")
                .help("Toggle a panel (xml, errors, warnings); may be repeated")
                .action(ArgAction::Append)
                .value_parser(|s: &str| s.parse::<PanelKind>()),
        )
        .arg(
            Arg::new("all")
                .long("all")
                .help("Show every panel that has content")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .help("Base URL that relative targets are resolved against"),
        )
        .arg(
            Arg::new("max-depth")
                .long("max-depth")
                .help(format!("Deepest element nesting accepted (1 to {})", MAX_DEPTH_LIMIT))
                .value_parser(value_parser!(u64).range(1..=MAX_DEPTH_LIMIT as u64)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Config file (defaults to <config dir>/xmlview/config.json)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log more (-v info, -vv debug)")
                .action(ArgAction::Count),
        )
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    // Logs go to stderr so stdout only carries the rendered view
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let matches = cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    if let Err(e) = run(&matches) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let mut config = Config::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    // Command-line flags win over the config file
    if let Some(method) = matches.get_one::<Method>("method") {
        config.method = *method;
    }
    if let Some(format) = matches.get_one::<OutputFormat>("format") {
        config.format = *format;
    }
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.base_url = Some(base_url.clone());
    }
    if let Some(max_depth) = matches.get_one::<u64>("max-depth") {
        config.max_depth = usize::try_from(*max_depth).context("Invalid --max-depth")?;
    }
    debug!(?config, "effective configuration");

    let panels: Vec<PanelKind> = match matches.get_many::<PanelKind>("panel") {
        Some(values) => values.copied().collect(),
        None => config.panel.into_iter().collect(),
    };

    let target = matches
        .get_one::<String>("target")
        .context("No target given")?;

    if config.format == OutputFormat::Ansi {
        colored::control::set_override(true);
    }

    let transport = ReqwestTransport::new(&config.user_agent)?;
    let fetcher = Fetcher::new(transport, config.base_url()?);
    let pipeline = DocumentPipeline::new(config.format, config.parse_options());
    let mut viewer = Viewer::new(fetcher, pipeline);

    viewer.request(config.method, target);
    for kind in panels {
        viewer.toggle(kind);
    }

    let output = Presenter::new(config.format)
        .show_all(matches.get_flag("all"))
        .present(viewer.state())?;
    print!("{}", output);

    Ok(())
}
