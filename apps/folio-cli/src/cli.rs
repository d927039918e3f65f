use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use folio_core::domain::{PostStatus, Role, StatusFilter};

/// Top-level CLI parser for the `folio` binary.
#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Folio - manage blog posts, images and accounts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in and print the bearer token to export as FOLIO_TOKEN
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in as it
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        role: Option<Role>,
    },
    /// Show the signed-in account
    Whoami,
    /// Create, edit and browse posts
    Posts {
        #[command(subcommand)]
        action: PostCommand,
    },
    /// Manage the images of a post
    Images {
        #[command(subcommand)]
        action: ImageCommand,
    },
    /// Administer accounts
    Users {
        #[command(subcommand)]
        action: UserCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum PostCommand {
    /// List posts, newest first
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Page size (defaults to FOLIO_PAGE_SIZE)
        #[arg(long)]
        limit: Option<u32>,
        /// all, draft or published
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one post with its images
    Show { id: String },
    /// Create a draft, optionally with images
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        content: String,
        /// Image file to attach (repeatable)
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },
    /// Change some fields of a post
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        status: Option<PostStatus>,
    },
    Publish { id: String },
    Unpublish { id: String },
    /// Delete a post permanently (admin only)
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the revision history of a post
    History {
        id: String,
        #[arg(long)]
        newest_first: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ImageCommand {
    /// Upload image files to a post in one batch
    Add {
        post_id: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Display name for each file, in order (defaults to the file name)
        #[arg(long = "name")]
        names: Vec<String>,
    },
    Rename {
        post_id: String,
        image_id: String,
        name: String,
    },
    /// Remove an image from a post permanently
    Remove {
        post_id: String,
        image_id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    List,
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "employee")]
        role: Role,
    },
    Update {
        id: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<Role>,
    },
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Change the signed-in account's password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
}
