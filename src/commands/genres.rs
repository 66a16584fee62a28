//! `goodreader genres`: browse every genre.

use super::App;
use crate::pager::{LineSource, Paginator};
use crate::utils::slug_to_title;
use anyhow::{Context, Result};
use std::io::Write;

/// Fetches all genres and shows their titles in the pager.
///
/// Returns the number of genres listed.
pub async fn list_genres<I: LineSource, W: Write>(
    app: &App,
    pager: &mut Paginator<I, W>,
) -> Result<usize> {
    let genres = app
        .client
        .genres(&app.harvester)
        .await
        .context("Failed to fetch genres")?;
    let titles: Vec<String> = genres.iter().map(|slug| slug_to_title(slug)).collect();

    pager.paginate(&titles, app.page_size, Some("Available Genres:"), false)?;
    Ok(titles.len())
}

/// CLI entry point.
pub async fn execute(app: &App) -> Result<()> {
    let mut pager = Paginator::stdio();
    list_genres(app, &mut pager).await?;
    Ok(())
}
