use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TableStoreTables::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TableStoreTables::Name)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TableStoreTables::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TableStoreEntities::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TableStoreEntities::TableName).text().not_null())
                    .col(ColumnDef::new(TableStoreEntities::PartitionKey).text().not_null())
                    .col(ColumnDef::new(TableStoreEntities::RowKey).text().not_null())
                    .col(ColumnDef::new(TableStoreEntities::Properties).blob().not_null())
                    .col(
                        ColumnDef::new(TableStoreEntities::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(TableStoreEntities::TableName)
                            .col(TableStoreEntities::PartitionKey)
                            .col(TableStoreEntities::RowKey),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TableStoreEntities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TableStoreTables::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TableStoreTables {
    Table,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TableStoreEntities {
    Table,
    TableName,
    PartitionKey,
    RowKey,
    Properties,
    Timestamp,
}
