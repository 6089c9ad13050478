use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "boltledger", about = "Append-only UTXO ledger")]
pub struct Opt {
    #[arg(
        long = "db-path",
        global = true,
        help = "Directory of the block store (defaults to LEDGER_DB_PATH or ./blocks.db)"
    )]
    pub db_path: Option<String>,
    #[arg(
        long = "genesis-address",
        global = true,
        help = "Address paid by the genesis block when a new ledger is created"
    )]
    pub genesis_address: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    #[command(name = "send", about = "Send an amount from one address to another")]
    Send {
        #[arg(long, help = "Sender of coins")]
        from: String,
        #[arg(long, help = "Receiver of coins")]
        to: String,
        #[arg(long, help = "Amount to send")]
        amount: u64,
    },
    #[command(name = "print", about = "Print all blocks from tip to genesis")]
    Print,
    #[command(name = "getbalance", about = "Get the balance of an address")]
    GetBalance {
        #[arg(long, help = "The address to query")]
        address: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_parse_send() {
        let opt = Opt::try_parse_from([
            "boltledger", "send", "--from", "Alice", "--to", "Bob", "--amount", "40",
        ])
        .unwrap();
        assert_eq!(
            opt.command,
            Command::Send {
                from: "Alice".to_string(),
                to: "Bob".to_string(),
                amount: 40,
            }
        );
        assert!(opt.db_path.is_none());
    }

    #[test]
    fn test_parse_global_overrides() {
        let opt = Opt::try_parse_from([
            "boltledger",
            "getbalance",
            "--address",
            "Alice",
            "--db-path",
            "/tmp/ledger",
            "--genesis-address",
            "Alice",
        ])
        .unwrap();
        assert_eq!(opt.db_path.as_deref(), Some("/tmp/ledger"));
        assert_eq!(opt.genesis_address.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_missing_flag_is_usage_error() {
        let err = Opt::try_parse_from(["boltledger", "send", "--from", "Alice", "--to", "Bob"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_ne!(err.exit_code(), 0);

        let err = Opt::try_parse_from(["boltledger", "getbalance"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_unknown_subcommand_is_usage_error() {
        let err = Opt::try_parse_from(["boltledger", "mint"]).unwrap_err();
        assert_ne!(err.kind(), ErrorKind::DisplayHelp);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn test_non_numeric_amount_rejected() {
        let result = Opt::try_parse_from([
            "boltledger", "send", "--from", "Alice", "--to", "Bob", "--amount", "lots",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_print_takes_no_arguments() {
        let opt = Opt::try_parse_from(["boltledger", "print"]).unwrap();
        assert_eq!(opt.command, Command::Print);
    }
}
