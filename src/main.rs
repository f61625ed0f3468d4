use bamvar::{
    cli::{init_verbose, Cli, Command, FULL_VERSION},
    commands::{cigarmd, snps, variants},
    utils::{handle_error_and_exit, Result},
};
use clap::Parser;

fn runner() -> Result<()> {
    let cli = Cli::parse();
    init_verbose(&cli);
    let subcommand_name = match cli.command {
        Command::Variants(_) => "variants",
        Command::Snps(_) => "snps",
        Command::Cigarmd(_) => "cigarmd",
    };

    log::info!(
        "Running {}-{} [{}]",
        env!("CARGO_PKG_NAME"),
        *FULL_VERSION,
        subcommand_name
    );
    match cli.command {
        Command::Variants(args) => variants::variants(args)?,
        Command::Snps(args) => snps::snps(args)?,
        Command::Cigarmd(args) => cigarmd::cigarmd(args)?,
    }
    log::info!("{} end", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        handle_error_and_exit(e);
    }
}
