//! Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use cloudns_core::{Record, RecordType};
use tracing::Level;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this JSON file instead of the environment
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (logs go to stderr)
    #[arg(
        value_enum,
        short = 'l',
        long,
        default_value_t = Loglevel::Info,
        value_name = "LEVEL",
        env = "CLOUDNS_LOG_LEVEL",
        global = true
    )]
    pub log_level: Loglevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a record and wait until the zone lists it
    Create(RecordArgs),
    /// Print a record by id, or `null` if it is no longer listed
    Read(LocateArgs),
    /// Replace an existing record
    Update {
        /// Id of the record to replace
        #[arg(long)]
        id: String,
        #[command(flatten)]
        record: RecordArgs,
    },
    /// Delete a record and verify it is gone
    Delete(LocateArgs),
    /// Print an existing record given as `<zone>/<record-id>`
    Import {
        /// Composite identifier, e.g. `example.com/123456`
        identifier: String,
    },
}

/// Zone and id of an existing record
#[derive(Debug, Args)]
pub struct LocateArgs {
    /// Zone (domain) holding the record
    #[arg(short = 'z', long)]
    pub zone: String,
    /// Provider-assigned record id
    #[arg(long)]
    pub id: String,
}

/// Full content of a record
#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Zone (domain) holding the record
    #[arg(short = 'z', long)]
    pub zone: String,

    /// Host label relative to the zone; empty for the apex
    #[arg(long, default_value = "")]
    pub host: String,

    /// Record type (A, AAAA, CNAME, MX, NS, PTR, SRV, TXT, CAA, ALIAS)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub record_type: RecordType,

    /// Record value
    #[arg(long)]
    pub value: String,

    /// Time to live in seconds
    #[arg(long, default_value_t = 3600)]
    pub ttl: u32,

    /// MX and SRV priority
    #[arg(long)]
    pub priority: Option<u16>,

    /// SRV weight
    #[arg(long)]
    pub weight: Option<u16>,

    /// SRV port
    #[arg(long)]
    pub port: Option<u16>,
}

impl RecordArgs {
    pub fn to_record(&self) -> Record {
        let mut record = Record::new(
            self.zone.clone(),
            self.host.clone(),
            self.record_type,
            self.value.clone(),
            self.ttl,
        );
        record.priority = self.priority;
        record.weight = self.weight;
        record.port = self.port;
        record
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Loglevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<Loglevel> for Level {
    fn from(level: Loglevel) -> Self {
        match level {
            Loglevel::Trace => Level::TRACE,
            Loglevel::Debug => Level::DEBUG,
            Loglevel::Info => Level::INFO,
            Loglevel::Warn => Level::WARN,
            Loglevel::Error => Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_srv_create() {
        let cli = Cli::try_parse_from([
            "cloudnsctl", "create", "--zone", "example.com", "--host", "_sip._tcp", "--type",
            "srv", "--value", "sip.example.com", "--ttl", "600", "--priority", "10", "--weight",
            "60", "--port", "5060",
        ])
        .unwrap();

        let Command::Create(args) = cli.command else {
            panic!("expected create");
        };
        let record = args.to_record();
        assert_eq!(record.record_type, RecordType::Srv);
        assert_eq!(record.ttl, 600);
        assert_eq!((record.priority, record.weight, record.port), (Some(10), Some(60), Some(5060)));
        assert_eq!(record.id, None);
    }

    #[test]
    fn parses_update_with_id_and_global_config() {
        let cli = Cli::try_parse_from([
            "cloudnsctl", "update", "--id", "42", "--zone", "example.com", "--type", "A",
            "--value", "1.2.3.4", "--config", "/etc/cloudns.json",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/etc/cloudns.json")));
        match cli.command {
            Command::Update { id, record } => {
                assert_eq!(id, "42");
                assert_eq!(record.host, "");
                assert_eq!(record.ttl, 3600);
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn unknown_record_type_is_rejected() {
        let parsed = Cli::try_parse_from([
            "cloudnsctl", "create", "--zone", "example.com", "--type", "SOA", "--value", "x",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn import_takes_positional_identifier() {
        let cli = Cli::try_parse_from(["cloudnsctl", "import", "example.com/77"]).unwrap();
        assert!(matches!(cli.command, Command::Import { ref identifier } if identifier == "example.com/77"));
    }
}
