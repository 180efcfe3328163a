//! Migration to create the cameras table.
//!
//! Cameras belong to a project and carry their stream address, zone and rule
//! configuration, and connection/lifecycle status.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cameras::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cameras::CameraId)
                            .string_len(50)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cameras::ProjectId).string_len(50).not_null())
                    .col(ColumnDef::new(Cameras::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Cameras::StreamUrl).string_len(500).not_null())
                    .col(ColumnDef::new(Cameras::Location).string_len(255).null())
                    .col(
                        ColumnDef::new(Cameras::PrimaryUseCase)
                            .string_len(100)
                            .not_null()
                            .default("people_counting"),
                    )
                    .col(ColumnDef::new(Cameras::ZoneConfiguration).json_binary().null())
                    .col(ColumnDef::new(Cameras::ProcessingRules).json_binary().null())
                    .col(
                        ColumnDef::new(Cameras::ConnectionStatus)
                            .string_len(20)
                            .not_null()
                            .default("disconnected")
                            .check(
                                Expr::col(Cameras::ConnectionStatus)
                                    .is_in(["connected", "disconnected", "error"]),
                            ),
                    )
                    .col(
                        ColumnDef::new(Cameras::LastSeen)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Cameras::Status)
                            .string_len(20)
                            .not_null()
                            .default("active")
                            .check(
                                Expr::col(Cameras::Status)
                                    .is_in(["active", "inactive", "maintenance"]),
                            ),
                    )
                    .col(ColumnDef::new(Cameras::Metadata).json_binary().null())
                    .col(
                        ColumnDef::new(Cameras::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Cameras::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cameras_project_id")
                            .from(Cameras::Table, Cameras::ProjectId)
                            .to(Projects::Table, Projects::ProjectId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cameras_project_id")
                    .table(Cameras::Table)
                    .col(Cameras::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cameras_status")
                    .table(Cameras::Table)
                    .col(Cameras::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_cameras_status").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_cameras_project_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Cameras::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Cameras {
    Table,
    CameraId,
    ProjectId,
    Name,
    StreamUrl,
    Location,
    PrimaryUseCase,
    ZoneConfiguration,
    ProcessingRules,
    ConnectionStatus,
    LastSeen,
    Status,
    Metadata,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    ProjectId,
}
