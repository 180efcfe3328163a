//! Migration to create the processing_stats table.
//!
//! Append-only per-camera counters reported by the processing workers.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create();
        table
            .table(ProcessingStats::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(ProcessingStats::StatId)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(ProcessingStats::CameraId)
                    .string_len(50)
                    .not_null(),
            )
            .col(
                ColumnDef::new(ProcessingStats::Timestamp)
                    .timestamp_with_time_zone()
                    .not_null()
                    .default(Expr::current_timestamp()),
            );

        for counter in [
            ProcessingStats::FramesProcessed,
            ProcessingStats::TotalDetections,
            ProcessingStats::PeopleCountingEvents,
            ProcessingStats::PpeDetectionEvents,
            ProcessingStats::TailgatingEvents,
            ProcessingStats::IntrusionEvents,
            ProcessingStats::LoiteringEvents,
        ] {
            table.col(ColumnDef::new(counter).integer().not_null().default(0));
        }

        table
            .col(
                ColumnDef::new(ProcessingStats::ProcessingTimeMs)
                    .big_integer()
                    .not_null()
                    .default(0),
            )
            .col(
                ColumnDef::new(ProcessingStats::FpsAverage)
                    .double()
                    .not_null()
                    .default(0.0),
            )
            .col(
                ColumnDef::new(ProcessingStats::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null()
                    .default(Expr::current_timestamp()),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_processing_stats_camera_id")
                    .from(ProcessingStats::Table, ProcessingStats::CameraId)
                    .to(Cameras::Table, Cameras::CameraId)
                    .on_delete(ForeignKeyAction::Cascade),
            );

        manager.create_table(table.to_owned()).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_processing_stats_camera_timestamp")
                    .table(ProcessingStats::Table)
                    .col(ProcessingStats::CameraId)
                    .col(ProcessingStats::Timestamp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_processing_stats_camera_timestamp")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ProcessingStats::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ProcessingStats {
    Table,
    StatId,
    CameraId,
    Timestamp,
    FramesProcessed,
    TotalDetections,
    PeopleCountingEvents,
    PpeDetectionEvents,
    TailgatingEvents,
    IntrusionEvents,
    LoiteringEvents,
    ProcessingTimeMs,
    FpsAverage,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Cameras {
    Table,
    CameraId,
}
