use eqcheck::{Config, Console, JsonStore};
use std::io;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = JsonStore::open(config.data_file)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(stdin.lock(), stdout.lock(), store);

    console.run()
}
