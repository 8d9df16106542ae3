use sea_orm::{EntityTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::entity::{
    AuditLogs, Coupons, FlashSales, Invoices, Notifications, Orders, Products, Reviews, Users,
    Wishlists, reviews, wishlists,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        // Parents first so foreign keys resolve.
        create_table(manager, &schema, Users).await?;
        create_table(manager, &schema, Products).await?;
        create_table(manager, &schema, FlashSales).await?;
        create_table(manager, &schema, Coupons).await?;
        create_table(manager, &schema, Orders).await?;
        create_table(manager, &schema, Invoices).await?;
        create_table(manager, &schema, Notifications).await?;
        create_table(manager, &schema, Wishlists).await?;
        create_table(manager, &schema, Reviews).await?;
        create_table(manager, &schema, AuditLogs).await?;

        for mut index in schema.create_index_from_entity(Notifications) {
            manager.create_index(index.if_not_exists().to_owned()).await?;
        }

        manager
            .create_index(
                Index::create()
                    .name("idx_wishlists_user_product")
                    .table(Wishlists)
                    .col(wishlists::Column::UserUid)
                    .col(wishlists::Column::ProductId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Lookup index only; one review per user is checked at write time.
        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_product_user")
                    .table(Reviews)
                    .col(reviews::Column::ProductId)
                    .col(reviews::Column::UserUid)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table(manager, AuditLogs).await?;
        drop_table(manager, Reviews).await?;
        drop_table(manager, Wishlists).await?;
        drop_table(manager, Notifications).await?;
        drop_table(manager, Invoices).await?;
        drop_table(manager, Orders).await?;
        drop_table(manager, Coupons).await?;
        drop_table(manager, FlashSales).await?;
        drop_table(manager, Products).await?;
        drop_table(manager, Users).await?;
        Ok(())
    }
}

async fn create_table<E>(manager: &SchemaManager<'_>, schema: &Schema, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    manager
        .create_table(
            schema
                .create_table_from_entity(entity)
                .if_not_exists()
                .to_owned(),
        )
        .await
}

async fn drop_table<E>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    manager
        .drop_table(Table::drop().table(entity).if_exists().to_owned())
        .await
}
