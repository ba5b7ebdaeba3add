use rusqlite::{params, Row};

use crate::db::models::{Feature, NewFeature};
use crate::error::AppResult;
use crate::state::DbPool;

fn map_row(row: &Row<'_>) -> rusqlite::Result<Feature> {
    Ok(Feature {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        icon: row.get(3)?,
    })
}

pub fn list_features(pool: &DbPool) -> AppResult<Vec<Feature>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare("SELECT id, title, description, icon FROM features ORDER BY id")?;
    let features = stmt
        .query_map([], map_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(features)
}

/// Insert a feature card. Returns `false` without writing anything when
/// the title or description is blank.
pub fn add_feature(
    pool: &DbPool,
    title: Option<&str>,
    description: Option<&str>,
    icon: Option<&str>,
) -> AppResult<bool> {
    match NewFeature::from_parts(title, description, icon) {
        Some(feature) => {
            insert_feature(pool, &feature)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

pub fn insert_feature(pool: &DbPool, feature: &NewFeature) -> AppResult<i64> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO features (title, description, icon) VALUES (?1, ?2, ?3)",
        params![feature.title, feature.description, feature.icon],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn delete_feature(pool: &DbPool, id: Option<i64>) -> AppResult<()> {
    let Some(id) = id else {
        return Ok(());
    };
    let conn = pool.get()?;
    conn.execute("DELETE FROM features WHERE id = ?1", params![id])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::DEFAULT_FEATURE_ICON;
    use crate::db::test_pool;

    #[test]
    fn empty_title_performs_no_insert() {
        let pool = test_pool();
        assert!(!add_feature(&pool, Some(""), Some("desc"), None).unwrap());
        assert!(!add_feature(&pool, None, Some("desc"), None).unwrap());
        assert!(!add_feature(&pool, Some("Title"), None, None).unwrap());
        assert!(list_features(&pool).unwrap().is_empty());
    }

    #[test]
    fn features_are_listed_in_insertion_order() {
        let pool = test_pool();
        assert!(add_feature(&pool, Some("First"), Some("one"), Some("fa-leaf")).unwrap());
        assert!(add_feature(&pool, Some("Second"), Some("two"), None).unwrap());

        let features = list_features(&pool).unwrap();
        let titles: Vec<&str> = features.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
        assert_eq!(features[0].icon, "fa-leaf");
        assert_eq!(features[1].icon, DEFAULT_FEATURE_ICON);
    }

    #[test]
    fn delete_missing_feature_is_a_no_op() {
        let pool = test_pool();
        add_feature(&pool, Some("Keep"), Some("me"), None).unwrap();
        delete_feature(&pool, Some(4242)).unwrap();
        delete_feature(&pool, None).unwrap();
        assert_eq!(list_features(&pool).unwrap().len(), 1);
    }

    #[test]
    fn delete_removes_feature() {
        let pool = test_pool();
        let id = insert_feature(
            &pool,
            &NewFeature {
                title: "Gone".to_string(),
                description: "soon".to_string(),
                icon: DEFAULT_FEATURE_ICON.to_string(),
            },
        )
        .unwrap();
        delete_feature(&pool, Some(id)).unwrap();
        assert!(list_features(&pool).unwrap().is_empty());
    }
}
