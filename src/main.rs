use hm_dtu::prelude::*;

fn main() {
    let options = Options::new();

    if let Err(e) = hm_dtu::app(options) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
