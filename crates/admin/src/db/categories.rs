//! Category repository: curation of the storefront's groupings.

use sqlx::PgPool;

use nightbloom_core::Category;

use super::RepositoryError;

/// Fields for creating or editing a category.
#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub position: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    slug: String,
    name: String,
    description: String,
    image: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            slug: row.slug,
            name: row.name,
            description: row.description,
            image: row.image,
        }
    }
}

/// Repository for category write operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories in curation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT slug, name, description, image
            FROM store.categories
            ORDER BY position, slug
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, input: &CategoryInput) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO store.categories (slug, name, description, image, position)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING slug, name, description, image
            ",
        )
        .bind(&input.slug)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.image.as_deref())
        .bind(input.position)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!("slug {} already exists", input.slug));
            }
            RepositoryError::Database(e)
        })?;

        Ok(Category::from(row))
    }

    /// Edit a category. The slug is the identifier and cannot change;
    /// products reference categories by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    pub async fn update(
        &self,
        slug: &str,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            UPDATE store.categories
            SET name = $2, description = $3, image = $4, position = $5
            WHERE slug = $1
            RETURNING slug, name, description, image
            ",
        )
        .bind(slug)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.image.as_deref())
        .bind(input.position)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("category {slug}")))?;

        Ok(Category::from(row))
    }

    /// Delete a category. Products keep the slug in their `categories`
    /// array; a dangling slug just stops matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    pub async fn delete(&self, slug: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM store.categories WHERE slug = $1")
            .bind(slug)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("category {slug}")));
        }
        Ok(())
    }
}
