//! Tag management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, EntryRow, OutputFormat, TagRow};
use tagspace_core::error::AppError;
use tagspace_service::ServiceContext;

/// Arguments for tag commands
#[derive(Debug, Args)]
pub struct TagArgs {
    /// Tag subcommand
    #[command(subcommand)]
    pub command: TagCommand,
}

/// Tag subcommands
#[derive(Debug, Subcommand)]
pub enum TagCommand {
    /// Create a tag
    Add {
        /// Tag name
        name: String,
        /// Category name
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List tags
    Ls {
        /// Only tags of this category
        #[arg(short, long, conflicts_with = "uncategorised")]
        category: Option<String>,
        /// Only tags without a category
        #[arg(long)]
        uncategorised: bool,
    },
    /// Rename a tag
    Rename {
        /// Current name
        name: String,
        /// New name
        new_name: String,
    },
    /// Move a tag to another category (out of any when omitted)
    Move {
        /// Tag name
        name: String,
        /// Target category
        category: Option<String>,
    },
    /// Set display colours
    Color {
        /// Tag name
        name: String,
        /// Foreground colour
        #[arg(long)]
        fg: Option<String>,
        /// Background colour
        #[arg(long)]
        bg: Option<String>,
    },
    /// Set the description (clears it when omitted)
    Describe {
        /// Tag name
        name: String,
        /// Description text
        text: Option<String>,
    },
    /// List entries carrying a tag
    Entries {
        /// Tag name
        name: String,
    },
    /// Delete a tag and its associations
    Rm {
        /// Tag name
        name: String,
    },
}

/// Execute tag commands
pub async fn execute(args: &TagArgs, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let (db, ctx) = super::open_context(&config).await?;
    let result = run(args, &ctx, format).await;
    db.close().await;
    result
}

async fn run(args: &TagArgs, ctx: &ServiceContext, format: OutputFormat) -> Result<(), AppError> {
    let tags = &ctx.tag_service;

    match &args.command {
        TagCommand::Add { name, category } => {
            let tag = tags.create_tag(name, category.as_deref()).await?;
            output::print_success(&format!("Tag '{}' created (id: {})", tag.name, tag.id));
        }
        TagCommand::Ls {
            category,
            uncategorised,
        } => {
            let list = if *uncategorised {
                tags.list_tags_in(None).await?
            } else if let Some(category) = category {
                tags.list_tags_in(Some(category)).await?
            } else {
                tags.list_tags().await?
            };
            let rows: Vec<TagRow> = list.iter().map(TagRow::from).collect();
            output::print_list(&rows, format);
        }
        TagCommand::Rename { name, new_name } => {
            tags.rename_tag(name, new_name).await?;
            output::print_success(&format!("Tag '{name}' renamed to '{new_name}'"));
        }
        TagCommand::Move { name, category } => {
            tags.move_tag(name, category.as_deref()).await?;
            match category {
                Some(category) => output::print_success(&format!("Tag '{name}' moved to '{category}'")),
                None => output::print_success(&format!("Tag '{name}' is now uncategorised")),
            }
        }
        TagCommand::Color { name, fg, bg } => {
            tags.set_tag_colors(name, fg.as_deref(), bg.as_deref()).await?;
            output::print_success(&format!("Colours of '{name}' updated"));
        }
        TagCommand::Describe { name, text } => {
            tags.describe_tag(name, text.as_deref()).await?;
            output::print_success(&format!("Description of '{name}' updated"));
        }
        TagCommand::Entries { name } => {
            let entries = tags.tagged_entries(name).await?;
            let rows: Vec<EntryRow> = entries.iter().map(EntryRow::from).collect();
            output::print_list(&rows, format);
        }
        TagCommand::Rm { name } => {
            tags.delete_tag(name).await?;
            output::print_success(&format!("Tag '{name}' deleted"));
        }
    }

    Ok(())
}
