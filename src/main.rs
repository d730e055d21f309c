use backdrop::SceneConfig;

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match SceneConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Could not load {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => SceneConfig::default(),
    };

    if let Err(e) = backdrop::run(config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
