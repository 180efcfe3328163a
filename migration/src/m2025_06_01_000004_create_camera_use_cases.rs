//! Migration to create the camera_use_cases table.
//!
//! Each row assigns one detection use case to a camera; a camera can hold a
//! given use case at most once.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CameraUseCases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CameraUseCases::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CameraUseCases::CameraId)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CameraUseCases::UseCase)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CameraUseCases::IsPrimary)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CameraUseCases::IsEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(CameraUseCases::Configuration)
                            .json_binary()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CameraUseCases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CameraUseCases::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_camera_use_cases_camera_id")
                            .from(CameraUseCases::Table, CameraUseCases::CameraId)
                            .to(Cameras::Table, Cameras::CameraId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_camera_use_cases_camera_use_case")
                    .table(CameraUseCases::Table)
                    .col(CameraUseCases::CameraId)
                    .col(CameraUseCases::UseCase)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_camera_use_cases_camera_use_case")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(CameraUseCases::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CameraUseCases {
    Table,
    Id,
    CameraId,
    UseCase,
    IsPrimary,
    IsEnabled,
    Configuration,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Cameras {
    Table,
    CameraId,
}
