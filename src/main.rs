use log::LevelFilter;

fn fatal(err: anyhow::Error) -> ! {
    eprintln!("iconbake: {:#}", err);
    std::process::exit(1);
}

fn main() {
    dotenv::dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = iconbake::load_config().unwrap_or_else(|e| fatal(e));
    log::info!(
        "generating icons from {} into {}",
        config.source_dir.display(),
        config.output_dir.display()
    );
    if let Err(e) = iconbake::run(&config) {
        fatal(e);
    }
}
