pub mod create;
pub mod list;
pub mod mint;
pub mod update_metadata;
pub mod upload_image;
pub mod view;

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use crate::{config::Settings, metadata::MetadataField};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List tokens recorded in the token output directory
    List {
        #[arg(short, long)]
        verbose: bool,

        /// Case-insensitive match on name or symbol
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Show one token by mint address or by its number in `list`
    View {
        mint_or_index: String,

        /// Use the local record only, without querying the network
        #[arg(short, long)]
        simulate: bool,
    },

    /// Mint additional supply to the wallet's associated token account
    Mint {
        mint: String,

        /// Amount in whole tokens, fractions allowed up to the mint's decimals
        amount: String,

        #[arg(short, long)]
        wallet: Option<PathBuf>,
    },

    /// Upload an image and record the hosted URL
    UploadImage { path: PathBuf },

    /// Point the token's metadata at a new URI
    UpdateUri {
        mint: String,

        #[arg(required = true, num_args = 1..)]
        value: Vec<String>,

        #[arg(short, long)]
        wallet: Option<PathBuf>,
    },

    /// Rename the token in its on-chain metadata
    UpdateName {
        mint: String,

        #[arg(required = true, num_args = 1..)]
        value: Vec<String>,

        #[arg(short, long)]
        wallet: Option<PathBuf>,
    },

    /// Change the token's on-chain symbol
    UpdateSymbol {
        mint: String,

        #[arg(required = true, num_args = 1..)]
        value: Vec<String>,

        #[arg(short, long)]
        wallet: Option<PathBuf>,
    },
}

pub async fn handle_command(command: Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::List { verbose, filter } => list::execute(verbose, filter.as_deref(), settings),
        Commands::View {
            mint_or_index,
            simulate,
        } => view::execute(&mint_or_index, simulate, settings).await,
        Commands::Mint {
            mint,
            amount,
            wallet,
        } => mint::execute(&mint, &amount, wallet, settings).await,
        Commands::UploadImage { path } => upload_image::execute(&path, settings).await,
        Commands::UpdateUri {
            mint,
            value,
            wallet,
        } => update_metadata::execute(MetadataField::Uri, &mint, &value, wallet, settings).await,
        Commands::UpdateName {
            mint,
            value,
            wallet,
        } => update_metadata::execute(MetadataField::Name, &mint, &value, wallet, settings).await,
        Commands::UpdateSymbol {
            mint,
            value,
            wallet,
        } => {
            update_metadata::execute(MetadataField::Symbol, &mint, &value, wallet, settings).await
        }
    }
}
