use std::sync::Arc;

use common::{CategoryDto, CategoryRequest};
use tracing::{debug, info, instrument, warn};

use crate::convert::category_dto;
use crate::error::{LedgerError, Result};
use crate::store::CategoryStore;

/// Categories created on a fresh database.
pub const DEFAULT_CATEGORIES: [&str; 9] = [
    "Food",
    "Transport",
    "Rent",
    "Utilities",
    "Marketing",
    "Salary",
    "Office Rent",
    "HR Development",
    "Entertainment",
];

/// Rules around category names and their lifecycle.
#[derive(Clone)]
pub struct CategoryPolicy {
    store: Arc<dyn CategoryStore>,
}

impl CategoryPolicy {
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, active_only: bool) -> Result<Vec<CategoryDto>> {
        let rows = self.store.list_categories(active_only).await?;
        Ok(rows.into_iter().map(category_dto).collect())
    }

    pub async fn get(&self, id: i32) -> Result<CategoryDto> {
        self.store
            .get_category(id)
            .await?
            .map(category_dto)
            .ok_or_else(|| LedgerError::not_found("Category", id))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, request: CategoryRequest) -> Result<CategoryDto> {
        let name = clean_name(&request.name)?;
        if self.store.category_name_taken(name, None).await? {
            warn!("Category name already in use: {}", name);
            return Err(duplicate(name));
        }
        let created = self
            .store
            .insert_category(name, request.is_active.unwrap_or(true))
            .await?;
        info!("Created category {} ({})", created.name, created.id);
        Ok(category_dto(created))
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: i32, request: CategoryRequest) -> Result<CategoryDto> {
        let name = clean_name(&request.name)?;
        let existing = self
            .store
            .get_category(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Category", id))?;
        if self.store.category_name_taken(name, Some(id)).await? {
            warn!("Category name already in use: {}", name);
            return Err(duplicate(name));
        }
        let is_active = request.is_active.unwrap_or(existing.is_active);
        self.store
            .update_category(id, name, is_active)
            .await?
            .map(category_dto)
            .ok_or_else(|| LedgerError::not_found("Category", id))
    }

    #[instrument(skip(self))]
    pub async fn toggle_status(&self, id: i32) -> Result<CategoryDto> {
        let toggled = self
            .store
            .toggle_category(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Category", id))?;
        info!("Category {} is now active={}", toggled.id, toggled.is_active);
        Ok(category_dto(toggled))
    }

    /// Inserts every default category that does not exist yet.
    /// Returns how many were added.
    #[instrument(skip(self))]
    pub async fn seed_defaults(&self) -> Result<usize> {
        let mut added = 0;
        for name in DEFAULT_CATEGORIES {
            if self.store.category_name_taken(name, None).await? {
                continue;
            }
            self.store.insert_category(name, true).await?;
            added += 1;
        }
        debug!("Seeded {} default categories", added);
        Ok(added)
    }
}

fn clean_name(raw: &str) -> Result<&str> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(LedgerError::validation("category name is required"));
    }
    Ok(name)
}

fn duplicate(name: &str) -> LedgerError {
    LedgerError::Conflict(format!("category '{}' already exists", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn policy() -> CategoryPolicy {
        CategoryPolicy::new(Arc::new(MemoryStore::new()))
    }

    fn request(name: &str) -> CategoryRequest {
        CategoryRequest {
            name: name.to_string(),
            is_active: None,
        }
    }

    #[tokio::test]
    async fn test_create_trims_and_defaults_active() {
        let categories = policy();
        let created = categories.create(request("  Travel  ")).await.unwrap();
        assert_eq!(created.name, "Travel");
        assert!(created.is_active);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let categories = policy();
        let err = categories.create(request("   ")).await.unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_duplicate_name_differs_only_in_case() {
        let categories = policy();
        let food = categories.create(request("Food")).await.unwrap();
        categories.toggle_status(food.id).await.unwrap();

        // Inactive categories still reserve their name.
        let err = categories.create(request("fOOD")).await.unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_duplicate_non_ascii_name_against_database() {
        use crate::store::DbStore;
        use migration::{Migrator, MigratorTrait};
        use sea_orm::Database;

        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let categories = CategoryPolicy::new(Arc::new(DbStore::new(db)));

        categories.create(request("ÉCOLE")).await.unwrap();
        let err = categories.create(request("école")).await.unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_excludes_self_from_duplicate_check() {
        let categories = policy();
        let food = categories.create(request("Food")).await.unwrap();
        categories.create(request("Rent")).await.unwrap();

        let renamed = categories.update(food.id, request("FOOD")).await.unwrap();
        assert_eq!(renamed.name, "FOOD");
        assert!(renamed.is_active);

        let err = categories.update(food.id, request("rent")).await.unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));

        let err = categories.update(999, request("Other")).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_toggle_status_flips_flag() {
        let categories = policy();
        let food = categories.create(request("Food")).await.unwrap();

        let off = categories.toggle_status(food.id).await.unwrap();
        assert!(!off.is_active);
        let on = categories.toggle_status(food.id).await.unwrap();
        assert!(on.is_active);

        assert!(matches!(
            categories.toggle_status(404).await,
            Err(LedgerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_seed_defaults_is_idempotent() {
        let categories = policy();
        categories.create(request("food")).await.unwrap();

        let added = categories.seed_defaults().await.unwrap();
        assert_eq!(added, DEFAULT_CATEGORIES.len() - 1);
        assert_eq!(categories.seed_defaults().await.unwrap(), 0);

        let all = categories.list(true).await.unwrap();
        assert_eq!(all.len(), DEFAULT_CATEGORIES.len());
    }
}
