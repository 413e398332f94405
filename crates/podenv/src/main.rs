use podenv_core::init_logging;

mod app;
mod commands;

fn main() {
    let matches = app::build_cli().get_matches();

    let verbose = matches.get_flag("verbose");
    init_logging(!verbose);

    match commands::run(&matches) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("podenv: {e}");
            std::process::exit(1);
        }
    }
}
