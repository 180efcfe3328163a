//! Migration to create the camera_health table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CameraHealth::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CameraHealth::HealthId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CameraHealth::CameraId).string_len(50).not_null())
                    .col(
                        ColumnDef::new(CameraHealth::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CameraHealth::ConnectionStatus)
                            .string_len(20)
                            .not_null()
                            .check(
                                Expr::col(CameraHealth::ConnectionStatus)
                                    .is_in(["connected", "disconnected", "error"]),
                            ),
                    )
                    .col(ColumnDef::new(CameraHealth::Fps).double().not_null().default(0.0))
                    .col(
                        ColumnDef::new(CameraHealth::FramesProcessed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CameraHealth::EventsDetected)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CameraHealth::CpuUsage)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(CameraHealth::MemoryUsage)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(CameraHealth::ErrorMessage).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_camera_health_camera_id")
                            .from(CameraHealth::Table, CameraHealth::CameraId)
                            .to(Cameras::Table, Cameras::CameraId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_camera_health_camera_timestamp")
                    .table(CameraHealth::Table)
                    .col(CameraHealth::CameraId)
                    .col(CameraHealth::Timestamp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_camera_health_camera_timestamp")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(CameraHealth::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CameraHealth {
    Table,
    HealthId,
    CameraId,
    Timestamp,
    ConnectionStatus,
    Fps,
    FramesProcessed,
    EventsDetected,
    CpuUsage,
    MemoryUsage,
    ErrorMessage,
}

#[derive(DeriveIden)]
enum Cameras {
    Table,
    CameraId,
}
