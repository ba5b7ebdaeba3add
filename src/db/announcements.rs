use rusqlite::{params, Row};

use crate::db::models::{Announcement, NewAnnouncement};
use crate::db::utc_timestamp;
use crate::error::AppResult;
use crate::state::DbPool;

fn map_row(row: &Row<'_>) -> rusqlite::Result<Announcement> {
    Ok(Announcement {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        published_at: row.get(3)?,
    })
}

/// Newest first.
pub fn list_announcements(pool: &DbPool) -> AppResult<Vec<Announcement>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT id, title, content, published_at FROM announcements
         ORDER BY published_at DESC, id DESC",
    )?;
    let announcements = stmt
        .query_map([], map_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(announcements)
}

/// Publish an announcement now. Returns `false` without writing when
/// either field is blank.
pub fn add_announcement(
    pool: &DbPool,
    title: Option<&str>,
    content: Option<&str>,
) -> AppResult<bool> {
    let Some(announcement) = NewAnnouncement::from_parts(title, content) else {
        return Ok(false);
    };
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO announcements (title, content, published_at) VALUES (?1, ?2, ?3)",
        params![announcement.title, announcement.content, utc_timestamp()],
    )?;
    Ok(true)
}

pub fn delete_announcement(pool: &DbPool, id: Option<i64>) -> AppResult<()> {
    let Some(id) = id else {
        return Ok(());
    };
    let conn = pool.get()?;
    conn.execute("DELETE FROM announcements WHERE id = ?1", params![id])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn insert_at(pool: &DbPool, title: &str, published_at: &str) {
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO announcements (title, content, published_at) VALUES (?1, 'body', ?2)",
            params![title, published_at],
        )
        .unwrap();
    }

    #[test]
    fn announcements_are_newest_first() {
        let pool = test_pool();
        insert_at(&pool, "old", "2023-05-01T09:00:00.000000");
        insert_at(&pool, "new", "2024-05-01T09:00:00.000000");
        insert_at(&pool, "middle", "2023-12-24T18:30:00.000000");

        let titles: Vec<String> = list_announcements(&pool)
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, vec!["new", "middle", "old"]);
    }

    #[test]
    fn blank_fields_skip_the_insert() {
        let pool = test_pool();
        assert!(!add_announcement(&pool, Some("Title"), Some("   ")).unwrap());
        assert!(!add_announcement(&pool, None, Some("Body")).unwrap());
        assert!(list_announcements(&pool).unwrap().is_empty());

        assert!(add_announcement(&pool, Some("Title"), Some("Body")).unwrap());
        assert_eq!(list_announcements(&pool).unwrap().len(), 1);
    }

    #[test]
    fn deleting_missing_announcement_is_a_no_op() {
        let pool = test_pool();
        add_announcement(&pool, Some("Title"), Some("Body")).unwrap();
        delete_announcement(&pool, Some(777)).unwrap();
        delete_announcement(&pool, None).unwrap();
        assert_eq!(list_announcements(&pool).unwrap().len(), 1);

        let id = list_announcements(&pool).unwrap()[0].id;
        delete_announcement(&pool, Some(id)).unwrap();
        assert!(list_announcements(&pool).unwrap().is_empty());
    }
}
