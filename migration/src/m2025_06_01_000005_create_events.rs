//! Migration to create the events table.
//!
//! Events reference both their camera and (redundantly) their project, and
//! are removed when either parent is deleted.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Events::EventId)
                            .string_len(50)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Events::CameraId).string_len(50).not_null())
                    .col(ColumnDef::new(Events::ProjectId).string_len(50).not_null())
                    .col(ColumnDef::new(Events::EventType).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Events::Severity)
                            .string_len(20)
                            .not_null()
                            .default("info")
                            .check(
                                Expr::col(Events::Severity).is_in(["info", "warning", "critical"]),
                            ),
                    )
                    .col(ColumnDef::new(Events::DetectionData).json_binary().null())
                    .col(ColumnDef::new(Events::LocalImagePath).string_len(500).null())
                    .col(ColumnDef::new(Events::GcpImagePath).string_len(500).null())
                    .col(ColumnDef::new(Events::ConfidenceScore).double().null())
                    .col(
                        ColumnDef::new(Events::Status)
                            .string_len(20)
                            .not_null()
                            .default("new")
                            .check(
                                Expr::col(Events::Status).is_in(["new", "acknowledged", "resolved"]),
                            ),
                    )
                    .col(ColumnDef::new(Events::CameraName).string_len(255).null())
                    .col(ColumnDef::new(Events::ProcessingTimeMs).integer().null())
                    .col(ColumnDef::new(Events::ModelVersion).string_len(50).null())
                    .col(
                        ColumnDef::new(Events::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Events::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Events::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_camera_id")
                            .from(Events::Table, Events::CameraId)
                            .to(Cameras::Table, Cameras::CameraId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_project_id")
                            .from(Events::Table, Events::ProjectId)
                            .to(Projects::Table, Projects::ProjectId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_events_camera_id", Events::CameraId),
            ("idx_events_event_type", Events::EventType),
            ("idx_events_timestamp", Events::Timestamp),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Events::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_events_timestamp",
            "idx_events_event_type",
            "idx_events_camera_id",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }

        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Events {
    Table,
    EventId,
    CameraId,
    ProjectId,
    EventType,
    Severity,
    DetectionData,
    LocalImagePath,
    GcpImagePath,
    ConfidenceScore,
    Status,
    CameraName,
    ProcessingTimeMs,
    ModelVersion,
    Timestamp,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Cameras {
    Table,
    CameraId,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    ProjectId,
}
