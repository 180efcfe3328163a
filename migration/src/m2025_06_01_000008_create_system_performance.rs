//! Migration to create the system_performance table.
//!
//! Global (not per camera) performance samples.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SystemPerformance::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SystemPerformance::PerfId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SystemPerformance::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SystemPerformance::TotalCameras)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SystemPerformance::ActiveCameras)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SystemPerformance::TotalFps)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(SystemPerformance::TotalEventsPerMinute)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SystemPerformance::CpuUsagePercent)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(SystemPerformance::MemoryUsagePercent)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(SystemPerformance::DiskUsagePercent)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(SystemPerformance::GpuUsagePercent)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(SystemPerformance::PendingUploads)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_system_performance_timestamp")
                    .table(SystemPerformance::Table)
                    .col(SystemPerformance::Timestamp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_system_performance_timestamp")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(SystemPerformance::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SystemPerformance {
    Table,
    PerfId,
    Timestamp,
    TotalCameras,
    ActiveCameras,
    TotalFps,
    TotalEventsPerMinute,
    CpuUsagePercent,
    MemoryUsagePercent,
    DiskUsagePercent,
    GpuUsagePercent,
    PendingUploads,
}
