use clap::Parser;
use env_logger::Env;

mod args;
mod form;

fn main() {
    let args = args::Args::parse();

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    let res = form::run(&args);
    if let Err(e) = res {
        form::print_error(&e);
        std::process::exit(1);
    }
}
