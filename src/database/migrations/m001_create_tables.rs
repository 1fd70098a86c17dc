use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create samples table
        manager
            .create_table(
                Table::create()
                    .table(Samples::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Samples::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Samples::Names).text())
                    .col(ColumnDef::new(Samples::SampleType).string().not_null())
                    .col(ColumnDef::new(Samples::Date).date())
                    .col(ColumnDef::new(Samples::DateResolution).string())
                    .col(ColumnDef::new(Samples::Details).text())
                    .col(ColumnDef::new(Samples::Permission).string().not_null())
                    .col(ColumnDef::new(Samples::Geom).text())
                    .col(ColumnDef::new(Samples::LocationType).string())
                    .col(ColumnDef::new(Samples::LocationSupport).text())
                    .to_owned(),
            )
            .await?;

        // Create sample_adjacency table
        manager
            .create_table(
                Table::create()
                    .table(SampleAdjacency::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SampleAdjacency::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SampleAdjacency::ChildId).string().not_null())
                    .col(ColumnDef::new(SampleAdjacency::ParentId).string().not_null())
                    .col(ColumnDef::new(SampleAdjacency::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sample_adjacency_child_id")
                            .from(SampleAdjacency::Table, SampleAdjacency::ChildId)
                            .to(Samples::Table, Samples::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sample_adjacency_parent_id")
                            .from(SampleAdjacency::Table, SampleAdjacency::ParentId)
                            .to(Samples::Table, Samples::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create taxa table
        manager
            .create_table(
                Table::create()
                    .table(Taxa::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Taxa::Taxid).big_integer().not_null().primary_key())
                    .col(ColumnDef::new(Taxa::Name).string().not_null())
                    .col(ColumnDef::new(Taxa::Rank).string())
                    .col(ColumnDef::new(Taxa::AltNames).text())
                    .col(ColumnDef::new(Taxa::ParentTaxid).big_integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_taxa_parent_taxid")
                            .from(Taxa::Table, Taxa::ParentTaxid)
                            .to(Taxa::Table, Taxa::Taxid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create sample_taxa table
        manager
            .create_table(
                Table::create()
                    .table(SampleTaxa::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SampleTaxa::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SampleTaxa::SampleId).string().not_null())
                    .col(ColumnDef::new(SampleTaxa::Taxid).big_integer().not_null())
                    .col(ColumnDef::new(SampleTaxa::TaxonType).string().not_null())
                    .col(ColumnDef::new(SampleTaxa::Evidence).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sample_taxa_sample_id")
                            .from(SampleTaxa::Table, SampleTaxa::SampleId)
                            .to(Samples::Table, Samples::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sample_taxa_taxid")
                            .from(SampleTaxa::Table, SampleTaxa::Taxid)
                            .to(Taxa::Table, Taxa::Taxid)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create pesticides table
        manager
            .create_table(
                Table::create()
                    .table(Pesticides::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pesticides::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pesticides::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Pesticides::PesticideType).text())
                    .col(ColumnDef::new(Pesticides::ProductType).string().not_null())
                    .col(ColumnDef::new(Pesticides::GroupTags).text())
                    .col(ColumnDef::new(Pesticides::Notes).text())
                    .to_owned(),
            )
            .await?;

        // Create pesticide_adjacency table
        manager
            .create_table(
                Table::create()
                    .table(PesticideAdjacency::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PesticideAdjacency::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PesticideAdjacency::ChildId).integer().not_null())
                    .col(ColumnDef::new(PesticideAdjacency::ParentId).integer().not_null())
                    .col(ColumnDef::new(PesticideAdjacency::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pesticide_adjacency_child_id")
                            .from(PesticideAdjacency::Table, PesticideAdjacency::ChildId)
                            .to(Pesticides::Table, Pesticides::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pesticide_adjacency_parent_id")
                            .from(PesticideAdjacency::Table, PesticideAdjacency::ParentId)
                            .to(Pesticides::Table, Pesticides::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create sample_pesticides table
        manager
            .create_table(
                Table::create()
                    .table(SamplePesticides::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SamplePesticides::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SamplePesticides::SampleId).string().not_null())
                    .col(ColumnDef::new(SamplePesticides::PesticideId).integer().not_null())
                    .col(ColumnDef::new(SamplePesticides::Date).date())
                    .col(ColumnDef::new(SamplePesticides::DateResolution).string())
                    .col(ColumnDef::new(SamplePesticides::Rate).double())
                    .col(ColumnDef::new(SamplePesticides::Units).string())
                    .col(ColumnDef::new(SamplePesticides::ApplicationStyle).string())
                    .col(ColumnDef::new(SamplePesticides::StageApplied).string())
                    .col(ColumnDef::new(SamplePesticides::Notes).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sample_pesticides_sample_id")
                            .from(SamplePesticides::Table, SamplePesticides::SampleId)
                            .to(Samples::Table, Samples::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sample_pesticides_pesticide_id")
                            .from(SamplePesticides::Table, SamplePesticides::PesticideId)
                            .to(Pesticides::Table, Pesticides::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create contributors table
        manager
            .create_table(
                Table::create()
                    .table(Contributors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contributors::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contributors::Name).string().not_null())
                    .col(ColumnDef::new(Contributors::ContributorType).string().not_null())
                    .col(ColumnDef::new(Contributors::Contact).text())
                    .to_owned(),
            )
            .await?;

        // Create sample_contributions table
        manager
            .create_table(
                Table::create()
                    .table(SampleContributions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SampleContributions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SampleContributions::SampleId).string().not_null())
                    .col(ColumnDef::new(SampleContributions::ContributorId).integer().not_null())
                    .col(ColumnDef::new(SampleContributions::Predicate).string().not_null())
                    .col(ColumnDef::new(SampleContributions::Datetime).date_time())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sample_contributions_sample_id")
                            .from(SampleContributions::Table, SampleContributions::SampleId)
                            .to(Samples::Table, Samples::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sample_contributions_contributor_id")
                            .from(SampleContributions::Table, SampleContributions::ContributorId)
                            .to(Contributors::Table, Contributors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create locations table
        manager
            .create_table(
                Table::create()
                    .table(Locations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Locations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Locations::Name).string())
                    .col(ColumnDef::new(Locations::LocationType).string().not_null())
                    .col(ColumnDef::new(Locations::Geom).text())
                    .col(ColumnDef::new(Locations::Support).text())
                    .to_owned(),
            )
            .await?;

        // Create location_histories table
        manager
            .create_table(
                Table::create()
                    .table(LocationHistories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LocationHistories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LocationHistories::LocationId).integer().not_null())
                    .col(ColumnDef::new(LocationHistories::HistoryType).string().not_null())
                    .col(ColumnDef::new(LocationHistories::Date).date())
                    .col(ColumnDef::new(LocationHistories::DateResolution).string())
                    .col(ColumnDef::new(LocationHistories::Details).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_location_histories_location_id")
                            .from(LocationHistories::Table, LocationHistories::LocationId)
                            .to(Locations::Table, Locations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create phenotypes table
        manager
            .create_table(
                Table::create()
                    .table(Phenotypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Phenotypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Phenotypes::SampleId).string().not_null())
                    .col(ColumnDef::new(Phenotypes::PhenotypeType).string().not_null())
                    .col(ColumnDef::new(Phenotypes::Date).date())
                    .col(ColumnDef::new(Phenotypes::Details).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_phenotypes_sample_id")
                            .from(Phenotypes::Table, Phenotypes::SampleId)
                            .to(Samples::Table, Samples::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create indexes for natural key lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_contributors_name")
                    .table(Contributors::Table)
                    .col(Contributors::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_locations_name")
                    .table(Locations::Table)
                    .col(Locations::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_taxa_parent_taxid")
                    .table(Taxa::Table)
                    .col(Taxa::ParentTaxid)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Phenotypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LocationHistories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Locations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SampleContributions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Contributors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SamplePesticides::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PesticideAdjacency::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pesticides::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SampleTaxa::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Taxa::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SampleAdjacency::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Samples::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Samples {
    Table,
    Id,
    Names,
    SampleType,
    Date,
    DateResolution,
    Details,
    Permission,
    Geom,
    LocationType,
    LocationSupport,
}

#[derive(Iden)]
enum SampleAdjacency {
    Table,
    Id,
    ChildId,
    ParentId,
    Position,
}

#[derive(Iden)]
enum Taxa {
    Table,
    Taxid,
    Name,
    Rank,
    AltNames,
    ParentTaxid,
}

#[derive(Iden)]
enum SampleTaxa {
    Table,
    Id,
    SampleId,
    Taxid,
    TaxonType,
    Evidence,
}

#[derive(Iden)]
enum Pesticides {
    Table,
    Id,
    Name,
    PesticideType,
    ProductType,
    GroupTags,
    Notes,
}

#[derive(Iden)]
enum PesticideAdjacency {
    Table,
    Id,
    ChildId,
    ParentId,
    Position,
}

#[derive(Iden)]
enum SamplePesticides {
    Table,
    Id,
    SampleId,
    PesticideId,
    Date,
    DateResolution,
    Rate,
    Units,
    ApplicationStyle,
    StageApplied,
    Notes,
}

#[derive(Iden)]
enum Contributors {
    Table,
    Id,
    Name,
    ContributorType,
    Contact,
}

#[derive(Iden)]
enum SampleContributions {
    Table,
    Id,
    SampleId,
    ContributorId,
    Predicate,
    Datetime,
}

#[derive(Iden)]
enum Locations {
    Table,
    Id,
    Name,
    LocationType,
    Geom,
    Support,
}

#[derive(Iden)]
enum LocationHistories {
    Table,
    Id,
    LocationId,
    HistoryType,
    Date,
    DateResolution,
    Details,
}

#[derive(Iden)]
enum Phenotypes {
    Table,
    Id,
    SampleId,
    PhenotypeType,
    Date,
    Details,
}
