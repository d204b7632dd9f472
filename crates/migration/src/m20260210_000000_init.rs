//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for Cagnotte:
//!
//! - `users`: ownership anchor (identity comes from the upstream proxy)
//! - `comptes`: bank accounts (balance + reporting exclusion flag)
//! - `recettes`: income pools, spent down over time
//! - `transferts`: settled pool-to-pool transfers
//! - `fonds_partages`: sub-allocations of a single bank credit
//! - `mouvements_fonds`: append-only debit/credit log per shared fund

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    CreatedAt,
}

#[derive(Iden)]
enum Comptes {
    Table,
    Id,
    UserId,
    Libelle,
    Solde,
    ExcludeFromTotal,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Recettes {
    Table,
    Id,
    UserId,
    Libelle,
    Montant,
    SoldeDisponible,
    ValidationBancaire,
    DateValidationBancaire,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Transferts {
    Table,
    Id,
    UserId,
    RecetteSourceId,
    RecetteDestinationId,
    Montant,
    Description,
    DateTransfert,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum FondsPartages {
    Table,
    Id,
    UserId,
    SourceCompteId,
    PrimaryCompteId,
    TransactionSourceId,
    Libelle,
    Description,
    MontantInitial,
    MontantRestant,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum MouvementsFonds {
    Table,
    Id,
    FondsPartageId,
    UserId,
    CompteId,
    Kind,
    Montant,
    TransactionId,
    Libelle,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Comptes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Comptes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Comptes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Comptes::UserId).string().not_null())
                    .col(ColumnDef::new(Comptes::Libelle).string().not_null())
                    .col(ColumnDef::new(Comptes::Solde).big_integer().not_null())
                    .col(
                        ColumnDef::new(Comptes::ExcludeFromTotal)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Comptes::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Comptes::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-comptes-user_id")
                            .from(Comptes::Table, Comptes::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-comptes-user_id")
                    .table(Comptes::Table)
                    .col(Comptes::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Recettes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Recettes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Recettes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Recettes::UserId).string().not_null())
                    .col(ColumnDef::new(Recettes::Libelle).string().not_null())
                    .col(ColumnDef::new(Recettes::Montant).big_integer().not_null())
                    .col(
                        ColumnDef::new(Recettes::SoldeDisponible)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Recettes::ValidationBancaire)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Recettes::DateValidationBancaire).timestamp())
                    .col(ColumnDef::new(Recettes::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Recettes::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recettes-user_id")
                            .from(Recettes::Table, Recettes::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-recettes-user_id")
                    .table(Recettes::Table)
                    .col(Recettes::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Transferts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transferts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transferts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transferts::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Transferts::RecetteSourceId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transferts::RecetteDestinationId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transferts::Montant).big_integer().not_null())
                    .col(ColumnDef::new(Transferts::Description).string())
                    .col(
                        ColumnDef::new(Transferts::DateTransfert)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transferts::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Transferts::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transferts-user_id")
                            .from(Transferts::Table, Transferts::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transferts-recette_source_id")
                            .from(Transferts::Table, Transferts::RecetteSourceId)
                            .to(Recettes::Table, Recettes::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transferts-recette_destination_id")
                            .from(Transferts::Table, Transferts::RecetteDestinationId)
                            .to(Recettes::Table, Recettes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transferts-user_id-date_transfert")
                    .table(Transferts::Table)
                    .col(Transferts::UserId)
                    .col(Transferts::DateTransfert)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transferts-recette_source_id")
                    .table(Transferts::Table)
                    .col(Transferts::RecetteSourceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transferts-recette_destination_id")
                    .table(Transferts::Table)
                    .col(Transferts::RecetteDestinationId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Fonds partagés
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(FondsPartages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FondsPartages::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FondsPartages::UserId).string().not_null())
                    .col(
                        ColumnDef::new(FondsPartages::SourceCompteId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FondsPartages::PrimaryCompteId).string())
                    .col(
                        ColumnDef::new(FondsPartages::TransactionSourceId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FondsPartages::Libelle).string().not_null())
                    .col(ColumnDef::new(FondsPartages::Description).string())
                    .col(
                        ColumnDef::new(FondsPartages::MontantInitial)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FondsPartages::MontantRestant)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FondsPartages::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FondsPartages::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-fonds_partages-user_id")
                            .from(FondsPartages::Table, FondsPartages::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-fonds_partages-source_compte_id")
                            .from(FondsPartages::Table, FondsPartages::SourceCompteId)
                            .to(Comptes::Table, Comptes::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-fonds_partages-primary_compte_id")
                            .from(FondsPartages::Table, FondsPartages::PrimaryCompteId)
                            .to(Comptes::Table, Comptes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-fonds_partages-source_compte_id")
                    .table(FondsPartages::Table)
                    .col(FondsPartages::SourceCompteId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-fonds_partages-primary_compte_id")
                    .table(FondsPartages::Table)
                    .col(FondsPartages::PrimaryCompteId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-fonds_partages-user_id")
                    .table(FondsPartages::Table)
                    .col(FondsPartages::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Mouvements de fonds
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(MouvementsFonds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MouvementsFonds::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MouvementsFonds::FondsPartageId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MouvementsFonds::UserId).string().not_null())
                    .col(ColumnDef::new(MouvementsFonds::CompteId).string().not_null())
                    .col(ColumnDef::new(MouvementsFonds::Kind).string().not_null())
                    .col(
                        ColumnDef::new(MouvementsFonds::Montant)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MouvementsFonds::TransactionId).string())
                    .col(ColumnDef::new(MouvementsFonds::Libelle).string())
                    .col(
                        ColumnDef::new(MouvementsFonds::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-mouvements_fonds-fonds_partage_id")
                            .from(MouvementsFonds::Table, MouvementsFonds::FondsPartageId)
                            .to(FondsPartages::Table, FondsPartages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-mouvements_fonds-user_id")
                            .from(MouvementsFonds::Table, MouvementsFonds::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-mouvements_fonds-compte_id")
                            .from(MouvementsFonds::Table, MouvementsFonds::CompteId)
                            .to(Comptes::Table, Comptes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-mouvements_fonds-fonds_partage_id")
                    .table(MouvementsFonds::Table)
                    .col(MouvementsFonds::FondsPartageId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-mouvements_fonds-compte_id")
                    .table(MouvementsFonds::Table)
                    .col(MouvementsFonds::CompteId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(MouvementsFonds::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FondsPartages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transferts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Recettes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comptes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
