//! Rendering of command results as JSON or aligned text tables.

use serde::Serialize;

use folio_core::domain::{Post, PostImage, User};
use folio_core::services::{HistoryTimeline, Revision};

use crate::cli::OutputFormat;

const MAX_CELL: usize = 48;

/// Rows of plain text under fixed headers.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
    footer: Option<String>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
            footer: None,
        }
    }

    /// Two-column key/value table for a single record.
    pub fn record(fields: Vec<(&'static str, String)>) -> Self {
        let mut table = Self::new(&["field", "value"]);
        for (key, value) in fields {
            table.push(vec![key.to_string(), value]);
        }
        table
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Line printed under the rows.
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn render(&self) -> String {
        let body = self.render_rows();
        match &self.footer {
            Some(footer) => format!("{body}\n\n{footer}"),
            None => body,
        }
    }

    fn render_rows(&self) -> String {
        if self.rows.is_empty() {
            return "(no results)".to_string();
        }

        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(index))
                    .map(|cell| cell.chars().count().min(MAX_CELL))
                    .max()
                    .unwrap_or(0)
                    .max(header.len())
            })
            .collect();

        let line = |cells: Vec<String>| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", truncate(cell), width = *width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let header = line(self.headers.iter().map(|h| h.to_uppercase()).collect());
        let divider = "-".repeat(header.chars().count());
        let mut out = vec![header, divider];
        out.extend(self.rows.iter().map(|row| line(row.clone())));
        out.join("\n")
    }
}

fn truncate(cell: &str) -> String {
    let single_line = cell.replace('\n', " ");
    if single_line.chars().count() <= MAX_CELL {
        return single_line;
    }
    let mut short: String = single_line.chars().take(MAX_CELL - 3).collect();
    short.push_str("...");
    short
}

/// Print `value` as JSON, or the table built by `table`.
pub fn print<T: Serialize>(
    value: &T,
    format: OutputFormat,
    table: impl FnOnce() -> Table,
) -> anyhow::Result<()> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Table => table().render(),
    };
    println!("{rendered}");
    Ok(())
}

pub fn posts_table(posts: &[Post]) -> Table {
    let mut table = Table::new(&["id", "title", "status", "images", "author", "updated"]);
    for post in posts {
        table.push(vec![
            post.id.to_string(),
            post.title.clone(),
            post.status.as_str().to_string(),
            post.images.len().to_string(),
            post.author.display_name().to_string(),
            post.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    table
}

pub fn post_record(post: &Post) -> Table {
    let mut fields = vec![
        ("id", post.id.to_string()),
        ("title", post.title.clone()),
        ("status", post.status.as_str().to_string()),
        ("author", post.author.display_name().to_string()),
        ("description", post.description.clone()),
        ("content", post.content.clone()),
        ("created", post.created_at.to_rfc3339()),
        ("updated", post.updated_at.to_rfc3339()),
    ];
    for image in &post.images {
        fields.push(("image", format!("{} {} ({})", image.id, image.name, image.url)));
    }
    Table::record(fields)
}

pub fn images_table(images: &[PostImage]) -> Table {
    let mut table = Table::new(&["id", "name", "size", "url"]);
    for image in images {
        table.push(vec![
            image.id.to_string(),
            image.name.clone(),
            format!("{}x{}", image.width, image.height),
            image.url.clone(),
        ]);
    }
    table
}

pub fn history_table(timeline: &HistoryTimeline, newest_first: bool) -> Table {
    let mut revisions: Vec<(usize, Revision<'_>)> =
        timeline.revisions().into_iter().enumerate().collect();
    if newest_first {
        revisions.reverse();
    }

    let mut table = Table::new(&["#", "change", "when", "by", "title", "fields"]);
    for (index, revision) in revisions {
        let entry = revision.entry;
        let fields = revision
            .changed
            .iter()
            .map(|field| field.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        table.push(vec![
            (index + 1).to_string(),
            entry.change_type.as_str().to_string(),
            entry.changed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.changed_by.display_name().to_string(),
            entry.title.clone(),
            fields,
        ]);
    }
    table
}

pub fn users_table(users: &[User]) -> Table {
    let mut table = Table::new(&["id", "username", "email", "role"]);
    for user in users {
        table.push(vec![
            user.id.to_string(),
            user.username.clone(),
            user.email.clone(),
            user.role.as_str().to_string(),
        ]);
    }
    table
}

pub fn user_record(user: &User) -> Table {
    Table::record(vec![
        ("id", user.id.to_string()),
        ("username", user.username.clone()),
        ("email", user.email.clone()),
        ("role", user.role.as_str().to_string()),
    ])
}
