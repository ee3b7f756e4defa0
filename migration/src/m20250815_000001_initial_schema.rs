use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create files table: registered files and the category they belong to
        manager
            .create_table(
                Table::create()
                    .table(Files::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Files::Filepath)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(big_integer(Files::Categoryid))
                    .to_owned(),
            )
            .await?;

        // Create index on files.categoryid for per-category administration
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_files_categoryid")
                    .table(Files::Table)
                    .col(Files::Categoryid)
                    .to_owned(),
            )
            .await?;

        // Create categories table with the per-category default
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Categoryid)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(big_integer(Categories::Enabled))
                    .to_owned(),
            )
            .await?;

        // Create downloadprefs table: explicit per-account overrides
        manager
            .create_table(
                Table::create()
                    .table(Downloadprefs::Table)
                    .if_not_exists()
                    .col(big_integer(Downloadprefs::Sid3))
                    .col(big_integer(Downloadprefs::Categoryid))
                    .col(big_integer(Downloadprefs::Enabled))
                    .primary_key(
                        Index::create()
                            .col(Downloadprefs::Sid3)
                            .col(Downloadprefs::Categoryid),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Downloadprefs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Files::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Files {
    Table,
    Filepath,
    Categoryid,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Categoryid,
    Enabled,
}

#[derive(DeriveIden)]
enum Downloadprefs {
    Table,
    Sid3,
    Categoryid,
    Enabled,
}
