//! Tree entry CLI commands.
//!
//! Entries are addressed either by UUID or by virtual path such as
//! `pics/2024/a.jpg`.

use clap::{Args, Subcommand};

use crate::output::{self, EntryRow, OutputFormat, TagRow};
use tagspace_core::error::AppError;
use tagspace_service::ServiceContext;

/// Arguments for entry commands
#[derive(Debug, Args)]
pub struct EntryArgs {
    /// Entry subcommand
    #[command(subcommand)]
    pub command: EntryCommand,
}

/// Entry subcommands
#[derive(Debug, Subcommand)]
pub enum EntryCommand {
    /// List the children of a directory (top level when omitted)
    Ls {
        /// Directory UUID or virtual path
        dir: Option<String>,
    },
    /// Show a subtree
    Tree {
        /// Entry UUID or virtual path
        entry: String,
        /// Max depth
        #[arg(short, long)]
        depth: Option<usize>,
    },
    /// Show an entry with its path and tags
    Show {
        /// Entry UUID or virtual path
        entry: String,
    },
    /// Set the description (clears it when omitted)
    Describe {
        /// Entry UUID or virtual path
        entry: String,
        /// Description text
        text: Option<String>,
    },
    /// Move and/or rename an entry
    Mv {
        /// Entry UUID or virtual path
        entry: String,
        /// Target directory ("/" for the top level); keeps the parent when omitted
        #[arg(long)]
        to: Option<String>,
        /// New name
        #[arg(long)]
        name: Option<String>,
    },
    /// Permanently delete an entry and its subtree
    Rm {
        /// Entry UUID or virtual path
        entry: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Move an entry out of the recycle bin
    Restore {
        /// Recycled entry UUID or virtual path
        entry: String,
        /// Target directory ("/" for the top level)
        #[arg(long)]
        to: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
    },
    /// Tags attached to an entry
    Tag(EntryTagArgs),
}

/// Arguments for entry tag commands
#[derive(Debug, Args)]
pub struct EntryTagArgs {
    /// Entry tag subcommand
    #[command(subcommand)]
    pub command: EntryTagCommand,
}

/// Entry tag subcommands
#[derive(Debug, Subcommand)]
pub enum EntryTagCommand {
    /// Attach tags
    Add {
        /// Entry UUID or virtual path
        entry: String,
        /// Tag names
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// Detach a tag
    Rm {
        /// Entry UUID or virtual path
        entry: String,
        /// Tag name
        tag: String,
    },
    /// List attached tags
    Ls {
        /// Entry UUID or virtual path
        entry: String,
    },
    /// Detach every tag
    Clear {
        /// Entry UUID or virtual path
        entry: String,
    },
}

/// Execute entry commands
pub async fn execute(
    args: &EntryArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let (db, ctx) = super::open_context(&config).await?;
    let result = run(args, &ctx, format).await;
    db.close().await;
    result
}

async fn run(args: &EntryArgs, ctx: &ServiceContext, format: OutputFormat) -> Result<(), AppError> {
    let entries = &ctx.entry_service;

    match &args.command {
        EntryCommand::Ls { dir } => {
            let parent = super::resolve_parent(ctx, dir.as_deref()).await?;
            let children = entries.list(parent).await?;
            let rows: Vec<EntryRow> = children.iter().map(EntryRow::from).collect();
            output::print_list(&rows, format);
        }
        EntryCommand::Tree { entry, depth } => {
            let id = super::resolve_entry(ctx, entry).await?;
            let tree = entries.tree(id, *depth).await?;
            match format {
                OutputFormat::Table => output::print_tree(&tree),
                OutputFormat::Json => output::print_json(&tree),
            }
        }
        EntryCommand::Show { entry } => {
            let id = super::resolve_entry(ctx, entry).await?;
            let detail = entries.show(id).await?;
            match format {
                OutputFormat::Json => output::print_json(&detail),
                OutputFormat::Table => {
                    let e = &detail.entry;
                    output::print_kv("ID", &e.id.to_string());
                    output::print_kv("Path", &detail.virtual_path);
                    output::print_kv("Kind", if e.is_dir { "directory" } else { "file" });
                    output::print_kv("Size", &e.size.map(|s| s.to_string()).unwrap_or_default());
                    output::print_kv(
                        "Device/inode",
                        &match (e.dev, e.ino) {
                            (Some(dev), Some(ino)) => format!("{dev}/{ino}"),
                            _ => String::new(),
                        },
                    );
                    output::print_kv("Description", e.description.as_deref().unwrap_or(""));
                    let tags: Vec<&str> = detail.tags.iter().map(|t| t.name.as_str()).collect();
                    output::print_kv("Tags", &tags.join(", "));
                    output::print_kv("Touched", &e.ctime.to_rfc3339());
                    if detail.recycled {
                        output::print_warning("This entry is in the recycle bin");
                    }
                }
            }
        }
        EntryCommand::Describe { entry, text } => {
            let id = super::resolve_entry(ctx, entry).await?;
            let updated = entries.describe(id, text.as_deref()).await?;
            output::print_success(&format!("Description of '{}' updated", updated.name));
        }
        EntryCommand::Mv { entry, to, name } => {
            let id = super::resolve_entry(ctx, entry).await?;
            let parent = match to {
                Some(target) => super::resolve_parent(ctx, Some(target)).await?,
                None => entries.get(id).await?.parent_id,
            };
            let moved = entries.move_entry(id, parent, name.as_deref()).await?;
            output::print_success(&format!("Moved to '{}'", moved.name));
        }
        EntryCommand::Rm { entry, force } => {
            let id = super::resolve_entry(ctx, entry).await?;
            let target = entries.get(id).await?;
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Permanently delete '{}' with its subtree, tags and description?",
                        target.name
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            entries.delete(id).await?;
            output::print_success(&format!("Deleted '{}'", target.name));
        }
        EntryCommand::Restore { entry, to, name } => {
            let id = super::resolve_entry(ctx, entry).await?;
            let parent = super::resolve_parent(ctx, Some(to)).await?;
            let restored = entries.restore(id, parent, name.as_deref()).await?;
            output::print_success(&format!("Restored '{}'", restored.name));
        }
        EntryCommand::Tag(tag_args) => run_tag(tag_args, ctx, format).await?,
    }

    Ok(())
}

async fn run_tag(
    args: &EntryTagArgs,
    ctx: &ServiceContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let tags = &ctx.tag_service;

    match &args.command {
        EntryTagCommand::Add { entry, tags: names } => {
            let id = super::resolve_entry(ctx, entry).await?;
            for name in names {
                tags.tag_entry(id, name).await?;
            }
            output::print_success(&format!("Attached {} tag(s)", names.len()));
        }
        EntryTagCommand::Rm { entry, tag } => {
            let id = super::resolve_entry(ctx, entry).await?;
            if tags.untag_entry(id, tag).await? {
                output::print_success(&format!("Detached '{tag}'"));
            } else {
                output::print_warning(&format!("'{tag}' was not attached"));
            }
        }
        EntryTagCommand::Ls { entry } => {
            let id = super::resolve_entry(ctx, entry).await?;
            let attached = tags.entry_tags(id).await?;
            let rows: Vec<TagRow> = attached.iter().map(TagRow::from).collect();
            output::print_list(&rows, format);
        }
        EntryTagCommand::Clear { entry } => {
            let id = super::resolve_entry(ctx, entry).await?;
            let removed = tags.clear_entry_tags(id).await?;
            output::print_success(&format!("Detached {removed} tag(s)"));
        }
    }

    Ok(())
}
