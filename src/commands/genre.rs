//! `goodreader genre <keyword>`: resolve a genre and browse its books.

use super::App;
use crate::matcher::{Resolution, resolve_genre};
use crate::pager::{LineSource, Paginator};
use crate::scrapers::BookRecord;
use crate::utils::slug_to_title;
use anyhow::{Context, Result};
use std::io::Write;
use tracing::info;

/// Resolves `keyword` to a genre, fetches its books and shows them.
///
/// Returns the books, or `None` when no genres are known or the user backed
/// out of the suggestion list.
pub async fn genre_command<I: LineSource, W: Write>(
    app: &App,
    keyword: &str,
    pager: &mut Paginator<I, W>,
) -> Result<Option<Vec<BookRecord>>> {
    let genres = app
        .client
        .genres(&app.harvester)
        .await
        .context("Failed to fetch genres")?;
    if genres.is_empty() {
        app.console.warning("No genres available.");
        return Ok(None);
    }

    let resolution = resolve_genre(keyword, &genres, pager)?;
    info!(keyword, ?resolution, "genre resolved");

    let (slug, auto) = match resolution {
        Resolution::Exact(slug) | Resolution::Chosen(slug) => (slug, false),
        Resolution::AutoPicked(slug) => (slug, true),
        Resolution::Cancelled => return Ok(None),
    };

    let title = slug_to_title(&slug);
    if auto {
        app.console.info(&format!("Selected genre (auto): {title}"));
    } else {
        app.console.info(&format!("Selected genre: {title}"));
    }

    let books = app
        .client
        .books_for_genre(&app.harvester, &slug)
        .await
        .with_context(|| format!("Failed to fetch books for genre '{title}'"))?;
    app.console.success(&format!(
        "Found {} books in genre '{}'.",
        app.console.count(books.len()),
        title
    ));

    let header = format!("Books in {title}:");
    pager.paginate(&books, app.page_size, Some(&header), false)?;

    Ok(Some(books))
}

/// CLI entry point.
pub async fn execute(app: &App, keyword: &str) -> Result<()> {
    let mut pager = Paginator::stdio();
    genre_command(app, keyword, &mut pager).await?;
    Ok(())
}
