//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_profiles_table;
mod m20250601_000002_create_posts_table;
mod m20250601_000003_create_likes_table;
mod m20250601_000004_create_dislikes_table;
mod m20250601_000005_create_comments_table;
mod m20250601_000006_create_follows_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_profiles_table::Migration),
            Box::new(m20250601_000002_create_posts_table::Migration),
            Box::new(m20250601_000003_create_likes_table::Migration),
            Box::new(m20250601_000004_create_dislikes_table::Migration),
            Box::new(m20250601_000005_create_comments_table::Migration),
            Box::new(m20250601_000006_create_follows_table::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_ordered() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();

        assert_eq!(names.len(), 6);
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names[0].ends_with("create_profiles_table"));
    }
}
