use clap::Parser;
use sbmlmath_runner::{execute, init_logging, Cli, Session};

fn main() {
    let cli = Cli::parse();
    let args = cli.command.args();
    let result = Session::open(args).and_then(|session| {
        init_logging(session.log_level(args.verbose));
        execute(&cli.command, &session)
    });

    match result {
        Ok(output) => {
            println!("{output}");
        }
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
