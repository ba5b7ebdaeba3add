use rusqlite::{params, OptionalExtension, Row};

use crate::db::models::{ContentSection, ContentUpdate, SectionKey};
use crate::error::AppResult;
use crate::state::DbPool;

const SELECT_COLUMNS: &str =
    "SELECT id, section, title, subtitle, body, highlight, image, extra_info FROM site_content";

fn map_row(row: &Row<'_>) -> rusqlite::Result<ContentSection> {
    Ok(ContentSection {
        id: row.get(0)?,
        section: row.get(1)?,
        title: row.get(2)?,
        subtitle: row.get(3)?,
        body: row.get(4)?,
        highlight: row.get(5)?,
        image: row.get(6)?,
        extra_info: row.get(7)?,
    })
}

/// Look up a section by key. Unknown keys are a miss, not an error.
pub fn get_content_section(pool: &DbPool, section: &str) -> AppResult<Option<ContentSection>> {
    let conn = pool.get()?;
    let content = conn
        .query_row(
            &format!("{} WHERE section = ?1", SELECT_COLUMNS),
            params![section],
            map_row,
        )
        .optional()?;
    Ok(content)
}

/// Replace all six editable fields of a section.
pub fn update_content_section(
    pool: &DbPool,
    section: SectionKey,
    update: &ContentUpdate,
) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute(
        "UPDATE site_content
         SET title = ?1, subtitle = ?2, body = ?3, highlight = ?4, image = ?5, extra_info = ?6
         WHERE section = ?7",
        params![
            update.title,
            update.subtitle,
            update.body,
            update.highlight,
            update.image,
            update.extra_info,
            section.as_str(),
        ],
    )?;
    Ok(())
}

pub fn list_content_sections(pool: &DbPool) -> AppResult<Vec<ContentSection>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(&format!("{} ORDER BY section", SELECT_COLUMNS))?;
    let sections = stmt
        .query_map([], map_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sections)
}
