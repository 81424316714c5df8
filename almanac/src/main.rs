//! almanac - Terminal calendar
//!
//! Renders month calendars with appointment highlighting next to a panel of
//! upcoming appointments, and manages the appointments and tags behind them.

mod commands;
mod parse;

use almanac_core::{Color, Config, Database};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "almanac")]
#[command(about = "Terminal calendar with appointment highlighting")]
#[command(version)]
struct Cli {
    /// Use this instant as "now" instead of the system clock (YYYY-MM-DDTHH:MM)
    #[arg(long, global = true, value_parser = parse::parse_datetime)]
    now: Option<NaiveDateTime>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the calendar with upcoming appointments (default)
    Show {
        /// Month name or number (defaults to the current month)
        #[arg(value_parser = parse::parse_month)]
        month: Option<u32>,

        /// Year (defaults to the current year)
        year: Option<i32>,

        /// Number of consecutive months to show
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        months: Option<u32>,
    },

    /// List the next appointments that have not ended yet
    Upcoming {
        /// Maximum number of appointments
        #[arg(short, long, default_value_t = 5)]
        limit: usize,

        /// Only appointments carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Add an appointment
    Add {
        #[arg(long)]
        title: String,

        #[arg(long, value_parser = parse::parse_datetime)]
        start: NaiveDateTime,

        #[arg(long, value_parser = parse::parse_datetime)]
        end: NaiveDateTime,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Tag name; repeat for several tags, the first decides the color
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Change an existing appointment
    Edit {
        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, value_parser = parse::parse_datetime)]
        start: Option<NaiveDateTime>,

        #[arg(long, value_parser = parse::parse_datetime)]
        end: Option<NaiveDateTime>,

        #[arg(short, long)]
        description: Option<String>,

        /// Replace the tag list; repeat for several tags
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Remove all tags
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },

    /// Remove an appointment
    Remove { id: i64 },

    /// List stored appointments
    List {
        /// Only appointments ending at or after this instant
        #[arg(long, value_parser = parse::parse_datetime)]
        from: Option<NaiveDateTime>,

        /// Only appointments starting at or before this instant
        #[arg(long, value_parser = parse::parse_datetime)]
        to: Option<NaiveDateTime>,

        /// Only titles containing this text (case-insensitive)
        #[arg(long)]
        title: Option<String>,

        /// Only appointments carrying this tag
        #[arg(long)]
        tag: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Manage tags
    Tag {
        #[command(subcommand)]
        command: TagCommand,
    },
}

#[derive(Subcommand)]
enum TagCommand {
    /// Create a tag
    Add {
        name: String,

        #[arg(value_parser = parse::parse_color)]
        color: Color,

        /// Replace the color if the tag already exists
        #[arg(long)]
        overwrite: bool,
    },

    /// Rename or recolor a tag
    Edit {
        name: String,

        #[arg(long)]
        rename: Option<String>,

        #[arg(long, value_parser = parse::parse_color)]
        color: Option<Color>,
    },

    /// List all tags
    List,

    /// Remove a tag (appointments keep their other tags)
    Remove { name: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging (to file, stdout carries the calendar)
    let _log_guard =
        almanac_core::logging::init(&config.logging).context("failed to initialize logging")?;

    // Open database
    let db_path = Config::database_path();
    tracing::info!(path = %db_path.display(), "Opening database");
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    let now = cli
        .now
        .unwrap_or_else(|| chrono::Local::now().naive_local());

    match cli.command.unwrap_or(Command::Show {
        month: None,
        year: None,
        months: None,
    }) {
        Command::Show {
            month,
            year,
            months,
        } => commands::show(&db, &config, now, month, year, months),
        Command::Upcoming { limit, tag } => {
            commands::upcoming(&db, &config, now, limit, tag.as_deref())
        }
        Command::Add {
            title,
            start,
            end,
            description,
            tags,
        } => commands::add(&db, title, start, end, description, &tags),
        Command::Edit {
            id,
            title,
            start,
            end,
            description,
            tags,
            clear_tags,
        } => {
            let tags = if clear_tags {
                Some(Vec::new())
            } else if tags.is_empty() {
                None
            } else {
                Some(tags)
            };
            commands::edit(
                &db,
                id,
                commands::AppointmentChanges {
                    title,
                    start,
                    end,
                    description,
                    tags,
                },
            )
        }
        Command::Remove { id } => commands::remove(&db, id),
        Command::List {
            from,
            to,
            title,
            tag,
            json,
        } => commands::list(
            &db,
            almanac_core::AppointmentFilter {
                from,
                to,
                title,
                tag,
                ..Default::default()
            },
            json,
        ),
        Command::Tag { command } => match command {
            TagCommand::Add {
                name,
                color,
                overwrite,
            } => commands::tag_add(&db, &name, color, overwrite),
            TagCommand::Edit {
                name,
                rename,
                color,
            } => commands::tag_edit(&db, &name, rename, color),
            TagCommand::List => commands::tag_list(&db),
            TagCommand::Remove { name } => commands::tag_remove(&db, &name),
        },
    }
}
