use env_logger::{Builder, Env};

fn main() {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(error) = segcorrect::run_cli() {
        eprintln!("{error}");
        std::process::exit(1);
    }
}
