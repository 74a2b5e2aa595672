//! Category management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, CategoryRow, OutputFormat};
use tagspace_core::error::AppError;
use tagspace_service::ServiceContext;

/// Arguments for category commands
#[derive(Debug, Args)]
pub struct CategoryArgs {
    /// Category subcommand
    #[command(subcommand)]
    pub command: CategoryCommand,
}

/// Category subcommands
#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    /// Create a category
    Add {
        /// Category name
        name: String,
    },
    /// List categories
    Ls,
    /// Rename a category
    Rename {
        /// Current name
        name: String,
        /// New name
        new_name: String,
    },
    /// Set display colours
    Color {
        /// Category name
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
        /// Category name
        name: String,
        /// Description text
        text: Option<String>,
    },
    /// Delete a category together with its tags
    Rm {
        /// Category name
        name: String,
    },
}

/// Execute category commands
pub async fn execute(
    args: &CategoryArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let (db, ctx) = super::open_context(&config).await?;
    let result = run(args, &ctx, format).await;
    db.close().await;
    result
}

async fn run(
    args: &CategoryArgs,
    ctx: &ServiceContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let tags = &ctx.tag_service;

    match &args.command {
        CategoryCommand::Add { name } => {
            let category = tags.create_category(name).await?;
            output::print_success(&format!(
                "Category '{}' created (id: {})",
                category.name, category.id
            ));
        }
        CategoryCommand::Ls => {
            let categories = tags.list_categories().await?;
            let rows: Vec<CategoryRow> = categories.iter().map(CategoryRow::from).collect();
            output::print_list(&rows, format);
        }
        CategoryCommand::Rename { name, new_name } => {
            tags.rename_category(name, new_name).await?;
            output::print_success(&format!("Category '{name}' renamed to '{new_name}'"));
        }
        CategoryCommand::Color { name, fg, bg } => {
            tags.set_category_colors(name, fg.as_deref(), bg.as_deref())
                .await?;
            output::print_success(&format!("Colours of '{name}' updated"));
        }
        CategoryCommand::Describe { name, text } => {
            tags.describe_category(name, text.as_deref()).await?;
            output::print_success(&format!("Description of '{name}' updated"));
        }
        CategoryCommand::Rm { name } => {
            tags.delete_category(name).await?;
            output::print_success(&format!("Category '{name}' deleted with its tags"));
        }
    }

    Ok(())
}
