use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240901_000001_create_users_table::Migration),
            Box::new(m20240901_000002_create_vehicles_tables::Migration),
            Box::new(m20240901_000003_create_places_table::Migration),
            Box::new(m20240901_000004_create_door_table::Migration),
        ]
    }
}

mod m20240901_000001_create_users_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240901_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(
                            ColumnDef::new(Users::Tuition)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::Major).string().not_null())
                        .col(ColumnDef::new(Users::AccessType).string().not_null())
                        .col(ColumnDef::new(Users::Password).string().not_null())
                        .col(
                            ColumnDef::new(Users::Building)
                                .string()
                                .not_null()
                                .default("Unknown"),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(crate) enum Users {
        #[sea_orm(iden = "Users")]
        Table,
        Id,
        Name,
        Tuition,
        Major,
        AccessType,
        Password,
        Building,
    }
}

mod m20240901_000002_create_vehicles_tables {

    use super::m20240901_000001_create_users_table::Users;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240901_000002_create_vehicles_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Vehicles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Vehicles::VehicleId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Vehicles::Brand).string().null())
                        .col(ColumnDef::new(Vehicles::Model).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(JoinUsersVehicles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(JoinUsersVehicles::UserId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(JoinUsersVehicles::VehicleId)
                                .integer()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(JoinUsersVehicles::UserId)
                                .col(JoinUsersVehicles::VehicleId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_join_users_vehicles_user_id")
                                .from(JoinUsersVehicles::Table, JoinUsersVehicles::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_join_users_vehicles_vehicle_id")
                                .from(JoinUsersVehicles::Table, JoinUsersVehicles::VehicleId)
                                .to(Vehicles::Table, Vehicles::VehicleId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(JoinUsersVehicles::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Vehicles::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Vehicles {
        #[sea_orm(iden = "Vehicles")]
        Table,
        VehicleId,
        Brand,
        Model,
    }

    #[derive(DeriveIden)]
    enum JoinUsersVehicles {
        #[sea_orm(iden = "Join_Users_Vehicles")]
        Table,
        UserId,
        VehicleId,
    }
}

mod m20240901_000003_create_places_table {

    use super::m20240901_000001_create_users_table::Users;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240901_000003_create_places_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // `taken` is inverted: true marks a free place
            manager
                .create_table(
                    Table::create()
                        .table(Places::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Places::PlaceId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Places::Zone).string().not_null())
                        .col(
                            ColumnDef::new(Places::Status)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Places::Taken)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Places::UserId).integer().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_places_user_id")
                                .from(Places::Table, Places::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_places_zone_availability")
                        .table(Places::Table)
                        .col(Places::Zone)
                        .col(Places::Status)
                        .col(Places::Taken)
                        .to_owned(),
                )
                .await?;

            // A user holds at most one place; NULLs are not compared
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_places_user_id")
                        .table(Places::Table)
                        .col(Places::UserId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Places::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Places {
        #[sea_orm(iden = "Places")]
        Table,
        PlaceId,
        Zone,
        Status,
        Taken,
        UserId,
    }
}

mod m20240901_000004_create_door_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240901_000004_create_door_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Door::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Door::DoorId)
                                .integer()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Door::Requested)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Door::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Door {
        #[sea_orm(iden = "Door")]
        Table,
        DoorId,
        Requested,
    }
}
