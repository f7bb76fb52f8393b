use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use salon_core::{Collection, ListFilter, LoadMode, SortSpec};

use crate::config::DEFAULT_CONFIG_FILENAME;

#[derive(Debug, Parser)]
#[command(name = "salon_admin")]
#[command(about = "List salon admin collections from the booking API")]
#[command(version)]
pub struct Cli {
    /// Path to the RON config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILENAME)]
    pub config: PathBuf,
    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List salon clients.
    Clients(ListArgs),
    /// List staff users.
    Users(ListArgs),
    /// List broadcasts.
    Broadcasts(ListArgs),
    /// List promotions.
    Promotions(ListArgs),
    /// List the recipients of one broadcast.
    Recipients {
        broadcast_id: i64,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Write a config file with default values.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Load every page instead of a single one.
    #[arg(long, conflicts_with = "page")]
    pub all: bool,
    /// Page to show (1-based).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,
    /// Free-text search.
    #[arg(long)]
    pub search: Option<String>,
    /// Status filter, e.g. `active` or `scheduled`.
    #[arg(long)]
    pub status: Option<String>,
    /// Sort as `field` or `field:asc|desc`.
    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<SortSpec>,
    /// Write the listed records as JSON to this file.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// A validated list invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
    pub collection: Collection,
    pub mode: LoadMode,
    pub filter: Option<ListFilter>,
    pub sort: Option<SortSpec>,
    pub export: Option<PathBuf>,
}

impl ListArgs {
    pub fn into_request(self, collection: Collection) -> Result<ListRequest> {
        let filter = ListFilter::from_input(self.search.as_deref(), self.status.as_deref())?;
        let mode = if self.all {
            LoadMode::All
        } else {
            LoadMode::Paged { page: self.page }
        };
        Ok(ListRequest {
            collection,
            mode,
            filter,
            sort: self.sort,
            export: self.export,
        })
    }
}

fn parse_sort(raw: &str) -> Result<SortSpec, String> {
    SortSpec::parse(raw).map_err(|err| err.to_string())
}
