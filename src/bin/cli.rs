//! nvrecord CLI
//!
//! Inspect and edit an EEPROM image file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nvrecord::{Config, FieldWidth, FileMedium, RecordStore, StorageMedium, FULL_MASK};
use tracing_subscriber::{fmt, EnvFilter};

/// nvrecord CLI
#[derive(Parser, Debug)]
#[command(name = "nvrecord-cli")]
#[command(about = "Inspect and edit nvrecord EEPROM images")]
#[command(version)]
struct Args {
    /// Image file (created erased if missing)
    #[arg(short, long)]
    image: PathBuf,

    /// Image size in bytes
    #[arg(short, long, default_value = "1024")]
    size: usize,

    /// Key field width in bytes (1 or 2)
    #[arg(short, long, default_value = "1")]
    key_width: usize,

    /// Length field width in bytes (1 or 2)
    #[arg(short, long, default_value = "1")]
    length_width: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show region usage
    Info,

    /// Print the payload of a record as hex
    Get {
        /// Record key
        key: u16,
    },

    /// Write a record from a hex string
    Set {
        /// Record key
        key: u16,

        /// Payload as hex, e.g. "0a0b0c"
        hex: String,
    },

    /// List every live record
    Dump,

    /// Add an id to a list
    ListAdd {
        /// List key
        listkey: u16,

        /// Id to add
        id: u32,
    },

    /// Check whether a list holds an id
    ListQuery {
        /// List key
        listkey: u16,

        /// Id to look for
        id: u32,

        /// Comparison mask
        #[arg(short, long, default_value_t = FULL_MASK)]
        mask: u32,
    },

    /// Remove matching ids from a list
    ListDel {
        /// List key
        listkey: u16,

        /// Id to remove
        id: u32,

        /// Comparison mask
        #[arg(short, long, default_value_t = FULL_MASK)]
        mask: u32,
    },

    /// Print every id of a list
    ListShow {
        /// List key
        listkey: u16,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> nvrecord::Result<()> {
    let config = Config::builder()
        .key_width(FieldWidth::from_bytes(args.key_width)?)
        .length_width(FieldWidth::from_bytes(args.length_width)?)
        .build();

    let medium = FileMedium::open_or_create(&args.image, args.size)?;
    let mut store = RecordStore::new(medium, config);
    store.begin()?;

    match args.command {
        Commands::Info => {
            println!("image:        {}", store.medium().path().display());
            println!("size:         {}", store.medium().len());
            println!("used bytes:   {}", store.used_bytes()?);
            println!("free bytes:   {}", store.free_bytes()?);
            println!("max payload:  {}", store.config().max_payload());
        }
        Commands::Get { key } => match store.read_raw(key)? {
            Some(data) => println!("{}", to_hex(&data)),
            None => println!("(not found)"),
        },
        Commands::Set { key, hex } => {
            let data = from_hex(&hex)?;
            store.set_raw(key, &data)?;
            println!("OK");
        }
        Commands::Dump => {
            for record in store.records()? {
                let record = record?;
                let data = store.medium().read_bytes(record.data_address, record.size)?;
                println!(
                    "@{:>5}  key={:<5}  size={:<5}  {}",
                    record.address,
                    record.key,
                    record.size,
                    to_hex(&data)
                );
            }
        }
        Commands::ListAdd { listkey, id } => {
            store.list_add(id, listkey)?;
            println!("OK");
        }
        Commands::ListQuery { listkey, id, mask } => {
            println!("{}", store.list_query(id, listkey, mask)?);
        }
        Commands::ListDel { listkey, id, mask } => {
            println!("{}", store.list_delete(id, listkey, mask)?);
        }
        Commands::ListShow { listkey } => {
            store.list_enumerate(listkey, |id| println!("{}", id))?;
        }
    }

    let mut medium = store.into_medium();
    medium.sync()
}

fn to_hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02x}", b)).collect()
}

fn from_hex(hex: &str) -> nvrecord::Result<Vec<u8>> {
    if !hex.is_ascii() || hex.len() % 2 != 0 {
        return Err(nvrecord::RecordError::InvalidArgument(
            "Hex payload must be an even number of hex digits".to_string(),
        ));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| {
                nvrecord::RecordError::InvalidArgument(format!("Bad hex '{}': {}", hex, e))
            })
        })
        .collect()
}
