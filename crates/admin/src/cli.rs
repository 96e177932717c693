use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use bloodbank_core::BloodType;
use bloodbank_inventory::InventoryStatus;
use bloodbank_requests::RequestKind;

#[derive(Debug, Parser)]
#[command(name = "bloodbank-admin")]
#[command(about = "Operator console for blood inventory and donation requests")]
#[command(version)]
pub struct Cli {
    /// Emit JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Human-readable logs instead of JSON
    #[arg(long, global = true)]
    pub pretty_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current blood availability
    Inventory {
        /// Only show one status (critical, low, adequate, high)
        #[arg(long)]
        status: Option<InventoryStatus>,

        /// Case-insensitive blood type search (e.g. "ab")
        #[arg(long)]
        search: Option<String>,
    },

    /// Correct the unit count for a blood type (remote store only)
    SetUnits {
        blood_type: BloodType,

        #[arg(allow_negative_numbers = true)]
        units: i64,
    },

    /// List donation/receive requests
    Requests {
        /// Only one kind (donate, receive)
        #[arg(long)]
        kind: Option<RequestKind>,

        /// Read from the remote store instead of the local log
        #[arg(long)]
        remote: bool,
    },

    /// Submit a donation or receive request
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        blood_type: BloodType,
        #[arg(long)]
        address: String,
        /// Preferred date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        kind: RequestKind,
    },

    /// Delete every request in the local log
    ClearLocal {
        /// Confirm the deletion; nothing is removed without it
        #[arg(long)]
        yes: bool,
    },

    /// Create the remote schema and seed inventory
    Migrate,
}
