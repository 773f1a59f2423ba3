use encwatch_app::platform::logging;
use encwatch_app::{
    config_path, load_config, parse_args, run_download, run_upload, run_watch, AppConfig, Command,
    USAGE,
};
use engine_logging::{engine_info, engine_warn};

fn main() -> anyhow::Result<()> {
    let command = parse_args(std::env::args().skip(1))?;
    if command == Command::Help {
        println!("{USAGE}");
        return Ok(());
    }

    let path = config_path();
    let loaded = load_config(&path);
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => AppConfig::default(),
    };
    logging::initialize(config.log_destination);
    match loaded {
        Ok(Some(_)) => engine_info!("Loaded config from {:?}", path),
        Ok(None) => engine_info!("No config at {:?}, using defaults", path),
        Err(err) => engine_warn!("Ignoring config: {}", err),
    }

    match command {
        Command::Watch => run_watch(&config)?,
        Command::Upload { path } => run_upload(&config, &path)?,
        Command::Download { name } => run_download(&config, &name)?,
        Command::Help => {}
    }
    Ok(())
}
