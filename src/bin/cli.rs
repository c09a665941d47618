use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use krishi_portal::{
    cli::{
        db::{db_generate, db_list, db_migrate, db_revert},
        profile::{save_profile, show_profile, upload_avatar},
    },
    init_app_state,
    settings::get_config,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database related command
    Db(DbArgs),
    /// Profile of the configured session user
    Profile(ProfileArgs),
    /// Avatar of the configured session user
    Avatar(AvatarArgs),
}

#[derive(Debug, Args)]
struct DbArgs {
    #[command(subcommand)]
    command: DbCommands,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Generate new migration file
    Generate { migration_name: String },
    /// List all migration
    List,
    /// Run all pending migration
    Migrate,
    /// Revert latest migration
    Revert,
}

#[derive(Debug, Args)]
struct ProfileArgs {
    #[command(subcommand)]
    command: ProfileCommands,
}

#[derive(Debug, Subcommand)]
enum ProfileCommands {
    /// Print the stored profile
    Show,
    /// Update profile fields, leaving the others as stored
    Save {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        phone_number: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
}

#[derive(Debug, Args)]
struct AvatarArgs {
    #[command(subcommand)]
    command: AvatarCommands,
}

#[derive(Debug, Subcommand)]
enum AvatarCommands {
    /// Upload an image and link it to the profile
    Upload {
        file: PathBuf,
        #[arg(long)]
        content_type: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();
    match &cli.command {
        Commands::Db(db_args) => match &db_args.command {
            DbCommands::Generate { migration_name } => {
                println!("generate migration: {migration_name:?}");
                db_generate(migration_name).await?;
            }
            DbCommands::List => {
                println!("list migration");
                let config = get_config()?;
                db_list(&config).await?;
            }
            DbCommands::Migrate => {
                println!("run all pending migration");
                let config = get_config()?;
                db_migrate(&config).await?;
            }
            DbCommands::Revert => {
                println!("revert latest migration");
                let config = get_config()?;
                db_revert(&config).await?;
            }
        },
        Commands::Profile(profile_args) => {
            let config = get_config()?;
            let app_state = init_app_state(&config).await?;
            match &profile_args.command {
                ProfileCommands::Show => {
                    println!("{}", show_profile(&app_state.page).await?);
                }
                ProfileCommands::Save {
                    full_name,
                    phone_number,
                    location,
                } => {
                    let out = save_profile(
                        &app_state.page,
                        full_name.clone(),
                        phone_number.clone(),
                        location.clone(),
                    )
                    .await?;
                    println!("{out}");
                }
            }
        }
        Commands::Avatar(avatar_args) => match &avatar_args.command {
            AvatarCommands::Upload { file, content_type } => {
                let config = get_config()?;
                let app_state = init_app_state(&config).await?;
                println!(
                    "{}",
                    upload_avatar(&app_state.page, file, content_type.clone()).await?
                );
            }
        },
    }
    Ok(())
}
