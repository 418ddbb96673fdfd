use std::{env, process};

use quick_money::{cli, init};

fn main() {
    init();

    let args: Vec<String> = env::args().skip(1).collect();
    match cli::run_cli(args) {
        Ok(code) => process::exit(code),
        Err(err) => {
            cli::output::error(err);
            process::exit(1);
        }
    }
}
