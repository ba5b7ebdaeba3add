use rusqlite::{params, Row};

use crate::db::models::GalleryImage;
use crate::db::utc_timestamp;
use crate::error::AppResult;
use crate::state::DbPool;

const LIST_QUERY: &str = "SELECT id, file_path, caption, display_order, created_at
     FROM gallery_images
     ORDER BY display_order ASC, created_at DESC, id DESC";

fn map_row(row: &Row<'_>) -> rusqlite::Result<GalleryImage> {
    Ok(GalleryImage {
        id: row.get(0)?,
        file_path: row.get(1)?,
        caption: row.get(2)?,
        display_order: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Images by display order, newest first within the same order.
/// A positive `limit` truncates the result in SQL; zero means no limit.
pub fn list_gallery_images(pool: &DbPool, limit: Option<u32>) -> AppResult<Vec<GalleryImage>> {
    let conn = pool.get()?;
    let images = match limit.filter(|n| *n > 0) {
        Some(limit) => {
            let mut stmt = conn.prepare(&format!("{} LIMIT ?1", LIST_QUERY))?;
            let rows = stmt
                .query_map(params![limit], map_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let mut stmt = conn.prepare(LIST_QUERY)?;
            let rows = stmt
                .query_map([], map_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
    };
    Ok(images)
}

/// Record an uploaded image. New images always get display order 0.
pub fn add_gallery_image(pool: &DbPool, file_path: &str, caption: Option<&str>) -> AppResult<i64> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO gallery_images (file_path, caption, created_at) VALUES (?1, ?2, ?3)",
        params![file_path, caption, utc_timestamp()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn delete_gallery_image(pool: &DbPool, id: Option<i64>) -> AppResult<()> {
    let Some(id) = id else {
        return Ok(());
    };
    let conn = pool.get()?;
    conn.execute("DELETE FROM gallery_images WHERE id = ?1", params![id])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn insert_with_order(pool: &DbPool, path: &str, order: i64, created_at: &str) {
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO gallery_images (file_path, display_order, created_at) VALUES (?1, ?2, ?3)",
            params![path, order, created_at],
        )
        .unwrap();
    }

    #[test]
    fn ordering_is_display_order_then_newest_first() {
        let pool = test_pool();
        insert_with_order(&pool, "/a.png", 2, "2024-01-01T00:00:00.000000");
        insert_with_order(&pool, "/b.png", 1, "2024-01-01T00:00:00.000000");
        insert_with_order(&pool, "/c.png", 1, "2024-03-01T00:00:00.000000");
        insert_with_order(&pool, "/d.png", 0, "2023-01-01T00:00:00.000000");

        let paths: Vec<String> = list_gallery_images(&pool, None)
            .unwrap()
            .into_iter()
            .map(|img| img.file_path)
            .collect();
        assert_eq!(paths, vec!["/d.png", "/c.png", "/b.png", "/a.png"]);
    }

    #[test]
    fn limit_truncates_and_zero_means_unlimited() {
        let pool = test_pool();
        for i in 0..5 {
            add_gallery_image(&pool, &format!("/img{}.png", i), None).unwrap();
        }
        assert_eq!(list_gallery_images(&pool, Some(2)).unwrap().len(), 2);
        assert_eq!(list_gallery_images(&pool, Some(0)).unwrap().len(), 5);
        assert_eq!(list_gallery_images(&pool, None).unwrap().len(), 5);
    }

    #[test]
    fn added_images_get_default_order_and_timestamp() {
        let pool = test_pool();
        let id = add_gallery_image(&pool, "/static/uploads/cup.png", Some("A cup")).unwrap();
        let images = list_gallery_images(&pool, None).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].id, id);
        assert_eq!(images[0].display_order, 0);
        assert_eq!(images[0].caption.as_deref(), Some("A cup"));
        assert!(!images[0].created_at.is_empty());
    }

    #[test]
    fn caption_is_optional() {
        let pool = test_pool();
        add_gallery_image(&pool, "/static/uploads/cup.png", None).unwrap();
        let images = list_gallery_images(&pool, None).unwrap();
        assert!(images[0].caption.is_none());
    }

    #[test]
    fn deleting_missing_ids_is_a_no_op() {
        let pool = test_pool();
        add_gallery_image(&pool, "/x.png", None).unwrap();

        delete_gallery_image(&pool, None).unwrap();
        delete_gallery_image(&pool, Some(9999)).unwrap();
        assert_eq!(list_gallery_images(&pool, None).unwrap().len(), 1);
    }

    #[test]
    fn delete_removes_the_row() {
        let pool = test_pool();
        let id = add_gallery_image(&pool, "/x.png", None).unwrap();
        delete_gallery_image(&pool, Some(id)).unwrap();
        assert!(list_gallery_images(&pool, None).unwrap().is_empty());
    }
}
