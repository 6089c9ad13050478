// Entry point of the ledger CLI. Library code reports every failure as a
// Result; this is the only place that turns one into a non-zero exit.
use boltledger::{Blockchain, Command, Opt, Transaction, GLOBAL_CONFIG};
use clap::Parser;
use log::{error, LevelFilter};
use std::io;
use std::process;

fn main() {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    // Missing flags or an unknown subcommand print usage and exit non-zero here
    let opt = Opt::parse();

    if let Some(path) = opt.db_path {
        GLOBAL_CONFIG.set_db_path(path);
    }
    if let Some(address) = opt.genesis_address {
        GLOBAL_CONFIG.set_genesis_address(address);
    }

    if let Err(e) = run_command(opt.command) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn open_blockchain() -> boltledger::Result<Blockchain> {
    Blockchain::open_with_settings(
        GLOBAL_CONFIG.get_db_path(),
        &GLOBAL_CONFIG.get_genesis_address(),
        GLOBAL_CONFIG.chain_settings()?,
    )
}

fn run_command(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    let blockchain = open_blockchain()?;

    match command {
        Command::Send { from, to, amount } => {
            let transaction = Transaction::new_utxo_transaction(&from, &to, amount, &blockchain)?;
            blockchain.add_block(transaction)?;
            println!("Success!");
        }
        Command::Print => {
            let stdout = io::stdout();
            blockchain.print_chain(&mut stdout.lock())?;
        }
        Command::GetBalance { address } => {
            let balance = blockchain.get_balance(&address)?;
            println!("Balance of '{address}': {balance}");
        }
    }

    blockchain.close()?;
    Ok(())
}
