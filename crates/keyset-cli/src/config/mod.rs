//! CLI configuration management.
//!
//! ```text
//! Cli
//! └── page: PageArgs
//!     ├── input, fields, sort, direction, size, token, filters
//!     └── pagination: PaginationConfig   # secret, allow-list, sizes, timeout
//! ```
//!
//! Every [`PaginationConfig`] option can also be provided through its
//! `KEYSET_*` environment variable.
//!
//! # Example
//!
//! ```bash
//! KEYSET_TOKEN_SECRET="..." keyset page \
//!     --input people.json --id id:int --field age:int \
//!     --sortable-fields age --sort age --direction asc --size 10 --all
//! ```

mod field;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use keyset_core::Direction;
use keyset_engine::PaginationConfig;

pub use self::field::{FieldSpec, WhereSpec};
use crate::TRACING_TARGET_CONFIG;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "keyset")]
#[command(about = "Keyset pagination over JSON documents")]
#[command(version)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Prints pages of a JSON document array as result slices.
    Page(PageArgs),
}

/// Arguments of the `page` command.
#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    /// JSON file holding an array of objects
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    /// Unique id property as `name:kind`
    #[arg(long, default_value = "id:int")]
    pub id: FieldSpec,

    /// Additional property as `name:kind` (repeatable)
    #[arg(long = "field", short = 'f')]
    pub fields: Vec<FieldSpec>,

    /// Property to sort by (must be a sortable field)
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort direction
    #[arg(long, default_value = "DESC")]
    pub direction: Direction,

    /// Requested page size
    #[arg(long, default_value = "20", allow_negative_numbers = true)]
    pub size: i64,

    /// Continuation token returned with a previous page
    #[arg(long)]
    pub token: Option<String>,

    /// Equality filter as `field=value` (repeatable)
    #[arg(long = "where", short = 'w')]
    pub filters: Vec<WhereSpec>,

    /// Follow continuation tokens until the last page
    #[arg(long)]
    pub all: bool,

    /// Pagination engine configuration.
    #[clap(flatten)]
    pub pagination: PaginationConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}
}

/// Logs the page command configuration.
pub fn log_page_config(args: &PageArgs) {
    tracing::info!(
        target: TRACING_TARGET_CONFIG,
        input = %args.input.display(),
        id = %args.id,
        fields = args.fields.len(),
        sort = args.sort.as_deref(),
        direction = %args.direction,
        size = args.size,
        filters = args.filters.len(),
        follow = args.all,
        "page configuration"
    );

    tracing::debug!(
        target: TRACING_TARGET_CONFIG,
        pagination = %args.pagination,
        "engine configuration"
    );
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_page_command() {
        let cli = Cli::try_parse_from([
            "keyset",
            "page",
            "--input",
            "people.json",
            "--id",
            "id:uuid",
            "--field",
            "age:int",
            "--field",
            "name:string",
            "--sort",
            "age",
            "--direction",
            "asc",
            "--size",
            "0",
            "--where",
            "name=alice",
            "--token-secret",
            "0123456789abcdef",
            "--sortable-fields",
            "age,name",
        ])
        .unwrap();

        let Command::Page(args) = cli.command;
        assert_eq!(args.id.name, "id");
        assert_eq!(args.fields.len(), 2);
        assert_eq!(args.direction, Direction::Asc);
        assert_eq!(args.size, 0);
        assert_eq!(args.filters[0].field, "name");
        assert_eq!(
            args.pagination.sortable_fields().collect::<Vec<_>>(),
            ["age", "name"]
        );
        assert_eq!(args.pagination.default_page_size, 20);
        assert!(!args.all);
    }
}
