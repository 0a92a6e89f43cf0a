//! Database operations for owners, media items and lists.

use shelf_engine::{ItemFields, ListFields, MediaItem, MediaList, MediaType, Owner, WriteOp};
use sqlx::types::Json;
use sqlx::{PgConnection, Row};

/// An owner and everything they own, as stored.
#[derive(Debug)]
pub struct StoredLibrary {
    pub owner: Owner,
    pub items: Vec<MediaItem>,
    pub lists: Vec<MediaList>,
}

/// A stored media item row from the database.
#[derive(Debug)]
pub struct StoredItem {
    pub id: String,
    pub fields: ItemFields,
    pub lists: Vec<String>,
    pub created_at: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoredItem {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        let Json(fields) = row.try_get::<Json<ItemFields>, _>("fields")?;
        Ok(StoredItem {
            id: row.try_get("id")?,
            fields,
            lists: row.try_get("lists")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl StoredItem {
    /// Convert database row to a shelf-engine MediaItem.
    pub fn into_item(self) -> MediaItem {
        let mut item = MediaItem::new(self.id, self.fields, self.created_at.max(0) as u64);
        item.lists = self.lists;
        item
    }
}

/// A stored list row from the database.
#[derive(Debug)]
pub struct StoredList {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub color: String,
    pub media_type: String,
    pub items: Vec<String>,
    pub created_at: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoredList {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(StoredList {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            title: row.try_get("title")?,
            color: row.try_get("color")?,
            media_type: row.try_get("media_type")?,
            items: row.try_get("items")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl StoredList {
    /// Convert database row to a shelf-engine MediaList.
    pub fn into_list(self) -> Result<MediaList, sqlx::Error> {
        let media_type = MediaType::from_name(&self.media_type).ok_or_else(|| {
            sqlx::Error::Decode(
                format!("list {} has unknown media type {}", self.id, self.media_type).into(),
            )
        })?;
        let mut list = MediaList::new(
            self.id,
            self.owner_id,
            ListFields::new(self.title, self.color, media_type),
            self.created_at.max(0) as u64,
        );
        list.items = self.items;
        Ok(list)
    }
}

/// Load an owner's whole library.
///
/// With `for_update` the owner row stays locked until the surrounding
/// transaction ends, so concurrent imports for the same owner serialize
/// across server instances too.
pub async fn load_library(
    conn: &mut PgConnection,
    owner_id: &str,
    for_update: bool,
) -> Result<Option<StoredLibrary>, sqlx::Error> {
    let query = if for_update {
        "SELECT id, item_ids, list_ids FROM owners WHERE id = $1 FOR UPDATE"
    } else {
        "SELECT id, item_ids, list_ids FROM owners WHERE id = $1"
    };

    let Some(row) = sqlx::query(query)
        .bind(owner_id)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(None);
    };

    let mut owner = Owner::new(row.try_get::<String, _>("id")?);
    owner.items = row.try_get("item_ids")?;
    owner.lists = row.try_get("list_ids")?;

    let items = sqlx::query_as::<_, StoredItem>(
        r#"
        SELECT id, fields, lists, created_at
        FROM media_items
        WHERE id = ANY($1)
        "#,
    )
    .bind(&owner.items)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(StoredItem::into_item)
    .collect();

    let lists = sqlx::query_as::<_, StoredList>(
        r#"
        SELECT id, owner_id, title, color, media_type, items, created_at
        FROM media_lists
        WHERE id = ANY($1)
        "#,
    )
    .bind(&owner.lists)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(StoredList::into_list)
    .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(StoredLibrary {
        owner,
        items,
        lists,
    }))
}

/// Write a compacted journal. Callers run this inside a transaction.
pub async fn apply_journal(conn: &mut PgConnection, ops: &[WriteOp]) -> Result<(), sqlx::Error> {
    for op in ops {
        match op {
            WriteOp::CreateItem { item } => insert_item(conn, item).await?,
            WriteOp::UpdateItem { item } => update_item(conn, item).await?,
            WriteOp::CreateList { list } => insert_list(conn, list).await?,
            WriteOp::UpdateList { list } => update_list(conn, list).await?,
            WriteOp::SaveOwner { owner } => save_owner(conn, owner).await?,
        }
    }

    tracing::debug!(ops = ops.len(), "journal applied");
    Ok(())
}

async fn insert_item(conn: &mut PgConnection, item: &MediaItem) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO media_items (id, title, media_type, fields, lists, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(&item.id)
    .bind(item.title())
    .bind(item.media_type().to_string())
    .bind(Json(&item.fields))
    .bind(&item.lists)
    .bind(item.created_at as i64)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn update_item(conn: &mut PgConnection, item: &MediaItem) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE media_items
        SET title = $2, media_type = $3, fields = $4, lists = $5
        WHERE id = $1
        "#,
    )
    .bind(&item.id)
    .bind(item.title())
    .bind(item.media_type().to_string())
    .bind(Json(&item.fields))
    .bind(&item.lists)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn insert_list(conn: &mut PgConnection, list: &MediaList) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO media_lists (id, owner_id, title, color, media_type, items, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(&list.id)
    .bind(&list.owner)
    .bind(list.title())
    .bind(&list.fields.color)
    .bind(list.media_type().to_string())
    .bind(&list.items)
    .bind(list.created_at as i64)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn update_list(conn: &mut PgConnection, list: &MediaList) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE media_lists
        SET title = $2, color = $3, media_type = $4, items = $5
        WHERE id = $1
        "#,
    )
    .bind(&list.id)
    .bind(list.title())
    .bind(&list.fields.color)
    .bind(list.media_type().to_string())
    .bind(&list.items)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn save_owner(conn: &mut PgConnection, owner: &Owner) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE owners SET item_ids = $2, list_ids = $3 WHERE id = $1")
        .bind(&owner.id)
        .bind(&owner.items)
        .bind(&owner.lists)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
