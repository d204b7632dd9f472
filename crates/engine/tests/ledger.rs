use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AllocateCmd, Compte, Engine, EngineError, Event, FondsPartage, MovementCmd, MovementKind,
    NewCompteCmd, NewRecetteCmd, Recette, TransferCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for username in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, created_at) VALUES (?, ?)",
            vec![username.into(), Utc::now().into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    (engine, db)
}

async fn new_recette(engine: &Engine, libelle: &str, montant: i64) -> Recette {
    engine
        .new_recette(NewRecetteCmd::new("alice", libelle, montant))
        .await
        .unwrap()
}

async fn new_compte(engine: &Engine, libelle: &str, solde: i64, excluded: bool) -> Compte {
    engine
        .new_compte(NewCompteCmd::new("alice", libelle, solde).exclude_from_total(excluded))
        .await
        .unwrap()
}

async fn allocate_fonds(
    engine: &Engine,
    compte: &Compte,
    libelle: &str,
    montant: i64,
) -> FondsPartage {
    engine
        .allocate(AllocateCmd::new(
            "alice",
            format!("tx-{libelle}"),
            compte.id,
            montant,
            libelle,
        ))
        .await
        .unwrap()
}

async fn count_transferts(db: &DatabaseConnection) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT COUNT(*) AS n FROM transferts",
            vec![],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "n").unwrap()
}

#[tokio::test]
async fn transfer_moves_funds_between_pools() {
    let (engine, _db) = engine_with_db().await;
    let source = new_recette(&engine, "Salaire", 500_000).await;
    let destination = new_recette(&engine, "Reserve", 0).await;

    let transfert = engine
        .transfer(
            TransferCmd::new("alice", source.id, destination.id, 120_000, Utc::now())
                .description("avance"),
        )
        .await
        .unwrap();
    assert_eq!(transfert.montant, 120_000);
    assert_eq!(transfert.description.as_deref(), Some("avance"));

    let source = engine.recette(source.id, "alice").await.unwrap();
    let destination = engine.recette(destination.id, "alice").await.unwrap();
    assert_eq!(source.solde_disponible, 380_000);
    assert_eq!(destination.solde_disponible, 120_000);
    // Conservation: the two-pool sum is unchanged.
    assert_eq!(source.solde_disponible + destination.solde_disponible, 500_000);
}

#[tokio::test]
async fn insufficient_transfer_leaves_no_trace() {
    let (engine, db) = engine_with_db().await;
    let source = new_recette(&engine, "Salaire", 40_000).await;
    let destination = new_recette(&engine, "Reserve", 0).await;

    let err = engine
        .transfer(TransferCmd::new(
            "alice",
            source.id,
            destination.id,
            50_000,
            Utc::now(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    let source = engine.recette(source.id, "alice").await.unwrap();
    let destination = engine.recette(destination.id, "alice").await.unwrap();
    assert_eq!(source.solde_disponible, 40_000);
    assert_eq!(destination.solde_disponible, 0);
    assert_eq!(count_transferts(&db).await, 0);
}

#[tokio::test]
async fn transfer_rejects_same_pool_and_non_positive_amount() {
    let (engine, _db) = engine_with_db().await;
    let source = new_recette(&engine, "Salaire", 10_000).await;
    let destination = new_recette(&engine, "Reserve", 0).await;

    let err = engine
        .transfer(TransferCmd::new(
            "alice",
            source.id,
            source.id,
            1_000,
            Utc::now(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));

    let err = engine
        .transfer(TransferCmd::new(
            "alice",
            source.id,
            destination.id,
            0,
            Utc::now(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));
}

#[tokio::test]
async fn transfer_into_bounded_pool_respects_original_receipt() {
    let (engine, _db) = engine_with_db().await;
    let source = new_recette(&engine, "Prime", 100_000).await;
    let destination = new_recette(&engine, "Salaire", 50_000).await;
    engine
        .debit_recette(destination.id, "alice", 30_000)
        .await
        .unwrap();

    // 20_000 available, original 50_000: refilling by 40_000 would exceed
    // the original receipt.
    let err = engine
        .transfer(TransferCmd::new(
            "alice",
            source.id,
            destination.id,
            40_000,
            Utc::now(),
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::MaxBalanceReached("Salaire".to_string()));

    engine
        .transfer(TransferCmd::new(
            "alice",
            source.id,
            destination.id,
            30_000,
            Utc::now(),
        ))
        .await
        .unwrap();
    let destination = engine.recette(destination.id, "alice").await.unwrap();
    assert_eq!(destination.solde_disponible, 50_000);
}

#[tokio::test]
async fn reverse_transfer_restores_both_pools() {
    let (engine, db) = engine_with_db().await;
    let source = new_recette(&engine, "Salaire", 500_000).await;
    let destination = new_recette(&engine, "Reserve", 0).await;

    let transfert = engine
        .transfer(TransferCmd::new(
            "alice",
            source.id,
            destination.id,
            120_000,
            Utc::now(),
        ))
        .await
        .unwrap();
    engine.reverse_transfer(transfert.id, "alice").await.unwrap();

    let source = engine.recette(source.id, "alice").await.unwrap();
    let destination = engine.recette(destination.id, "alice").await.unwrap();
    assert_eq!(source.solde_disponible, 500_000);
    assert_eq!(destination.solde_disponible, 0);
    assert_eq!(count_transferts(&db).await, 0);

    let err = engine.transfert(transfert.id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn reverse_transfer_fails_closed_when_destination_spent() {
    let (engine, db) = engine_with_db().await;
    let source = new_recette(&engine, "Salaire", 500_000).await;
    let destination = new_recette(&engine, "Reserve", 0).await;

    let transfert = engine
        .transfer(TransferCmd::new(
            "alice",
            source.id,
            destination.id,
            120_000,
            Utc::now(),
        ))
        .await
        .unwrap();
    engine
        .debit_recette(destination.id, "alice", 100_000)
        .await
        .unwrap();

    // Funds already spent downstream cannot be clawed back.
    let err = engine
        .reverse_transfer(transfert.id, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    let source = engine.recette(source.id, "alice").await.unwrap();
    let destination = engine.recette(destination.id, "alice").await.unwrap();
    assert_eq!(source.solde_disponible, 380_000);
    assert_eq!(destination.solde_disponible, 20_000);
    assert_eq!(count_transferts(&db).await, 1);
}

#[tokio::test]
async fn debit_recette_spends_down_and_never_overdraws() {
    let (engine, _db) = engine_with_db().await;
    let recette = new_recette(&engine, "Salaire", 500_000).await;

    engine.debit_recette(recette.id, "alice", 120_000).await.unwrap();
    let read = engine.recette(recette.id, "alice").await.unwrap();
    assert_eq!(read.solde_disponible, 380_000);

    let err = engine
        .debit_recette(recette.id, "alice", 400_000)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    let err = engine.debit_recette(recette.id, "alice", 0).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));

    let read = engine.recette(recette.id, "alice").await.unwrap();
    assert_eq!(read.solde_disponible, 380_000);
}

#[tokio::test]
async fn ownership_scopes_every_lookup() {
    let (engine, _db) = engine_with_db().await;
    let recette = new_recette(&engine, "Salaire", 10_000).await;

    let err = engine.recette(recette.id, "bob").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .debit_recette(recette.id, "bob", 1_000)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn delete_recette_blocked_while_referenced() {
    let (engine, _db) = engine_with_db().await;
    let source = new_recette(&engine, "Salaire", 100_000).await;
    let destination = new_recette(&engine, "Reserve", 0).await;

    let transfert = engine
        .transfer(TransferCmd::new(
            "alice",
            source.id,
            destination.id,
            10_000,
            Utc::now(),
        ))
        .await
        .unwrap();

    let err = engine.delete_recette(source.id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));

    engine.reverse_transfer(transfert.id, "alice").await.unwrap();
    engine.delete_recette(source.id, "alice").await.unwrap();

    let err = engine.recette(source.id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn fonds_debit_sequence_rejects_overdraw() {
    let (engine, _db) = engine_with_db().await;
    let compte = new_compte(&engine, "Courant", 250_000, false).await;
    let fonds = allocate_fonds(&engine, &compte, "Courses", 100_000).await;

    engine
        .apply_movement(MovementCmd::new(
            "alice",
            fonds.id,
            compte.id,
            MovementKind::Debit,
            30_000,
        ))
        .await
        .unwrap();
    let read = engine.fonds(fonds.id, "alice").await.unwrap();
    assert_eq!(read.montant_restant, 70_000);

    let err = engine
        .apply_movement(MovementCmd::new(
            "alice",
            fonds.id,
            compte.id,
            MovementKind::Debit,
            80_000,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    let read = engine.fonds(fonds.id, "alice").await.unwrap();
    assert_eq!(read.montant_restant, 70_000);
    assert_eq!(engine.list_movements(fonds.id, "alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn fonds_credit_cannot_exceed_initial() {
    let (engine, _db) = engine_with_db().await;
    let compte = new_compte(&engine, "Courant", 0, false).await;
    let fonds = allocate_fonds(&engine, &compte, "Cadeaux", 50_000).await;

    engine
        .apply_movement(MovementCmd::new(
            "alice",
            fonds.id,
            compte.id,
            MovementKind::Debit,
            20_000,
        ))
        .await
        .unwrap();

    let err = engine
        .apply_movement(MovementCmd::new(
            "alice",
            fonds.id,
            compte.id,
            MovementKind::Credit,
            30_001,
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::MaxBalanceReached("Cadeaux".to_string()));

    engine
        .apply_movement(MovementCmd::new(
            "alice",
            fonds.id,
            compte.id,
            MovementKind::Credit,
            20_000,
        ))
        .await
        .unwrap();
    let read = engine.fonds(fonds.id, "alice").await.unwrap();
    assert_eq!(read.montant_restant, 50_000);
}

#[tokio::test]
async fn replaying_movements_reproduces_restant() {
    let (engine, _db) = engine_with_db().await;
    let compte = new_compte(&engine, "Courant", 0, false).await;
    let fonds = allocate_fonds(&engine, &compte, "Courses", 100_000).await;

    for (kind, montant) in [
        (MovementKind::Debit, 30_000),
        (MovementKind::Credit, 10_000),
        (MovementKind::Debit, 5_000),
    ] {
        engine
            .apply_movement(
                MovementCmd::new("alice", fonds.id, compte.id, kind, montant)
                    .libelle("replay fixture"),
            )
            .await
            .unwrap();
    }

    let read = engine.fonds(fonds.id, "alice").await.unwrap();
    let mouvements = engine.list_movements(fonds.id, "alice").await.unwrap();
    assert_eq!(mouvements.len(), 3);

    let replayed = mouvements
        .iter()
        .fold(read.montant_initial, |restant, m| {
            restant + m.kind.signed(m.montant)
        });
    assert_eq!(replayed, read.montant_restant);
    assert_eq!(read.montant_restant, 75_000);
}

#[tokio::test]
async fn recompute_repairs_corrupted_restant() {
    let (engine, db) = engine_with_db().await;
    let compte = new_compte(&engine, "Courant", 0, false).await;
    let fonds = allocate_fonds(&engine, &compte, "Courses", 100_000).await;

    engine
        .apply_movement(MovementCmd::new(
            "alice",
            fonds.id,
            compte.id,
            MovementKind::Debit,
            25_000,
        ))
        .await
        .unwrap();

    // Corrupt the materialised total directly in the DB.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE fonds_partages SET montant_restant = ? WHERE id = ?;",
        vec![999i64.into(), fonds.id.to_string().into()],
    ))
    .await
    .unwrap();

    let restant = engine.recompute_fonds(fonds.id, "alice").await.unwrap();
    assert_eq!(restant, 75_000);

    let read = engine.fonds(fonds.id, "alice").await.unwrap();
    assert_eq!(read.montant_restant, 75_000);
}

#[tokio::test]
async fn list_available_fonds_filters_exhausted_and_orders_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let compte_a = new_compte(&engine, "Courant", 0, false).await;
    let compte_b = new_compte(&engine, "Livret", 0, false).await;

    let oldest = allocate_fonds(&engine, &compte_a, "Courses", 10_000).await;
    let exhausted = allocate_fonds(&engine, &compte_a, "Essence", 5_000).await;
    engine
        .apply_movement(MovementCmd::new(
            "alice",
            exhausted.id,
            compte_a.id,
            MovementKind::Debit,
            5_000,
        ))
        .await
        .unwrap();

    // Drawable from compte_a through the primary link as well.
    let shared = engine
        .allocate(
            AllocateCmd::new("alice", "tx-partage", compte_b.id, 20_000, "Vacances")
                .primary_compte_id(compte_a.id),
        )
        .await
        .unwrap();

    let fonds_a = engine.list_available_fonds(compte_a.id, "alice").await.unwrap();
    let ids: Vec<_> = fonds_a.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![shared.id, oldest.id]);

    let fonds_b = engine.list_available_fonds(compte_b.id, "alice").await.unwrap();
    assert_eq!(fonds_b.len(), 1);
    assert_eq!(fonds_b[0].id, shared.id);
}

#[tokio::test]
async fn certification_stamps_and_clears_validation_date() {
    let (engine, _db) = engine_with_db().await;
    let recette = new_recette(&engine, "Salaire", 100_000).await;

    engine.set_certified(recette.id, "alice", true).await.unwrap();
    let read = engine.recette(recette.id, "alice").await.unwrap();
    assert!(read.validation_bancaire);
    assert!(read.date_validation_bancaire.is_some());
    // The balance is untouched by certification.
    assert_eq!(read.solde_disponible, 100_000);

    engine.set_certified(recette.id, "alice", false).await.unwrap();
    let read = engine.recette(recette.id, "alice").await.unwrap();
    assert!(!read.validation_bancaire);
    assert!(read.date_validation_bancaire.is_none());
}

#[tokio::test]
async fn totals_report_gross_and_certified_figures() {
    let (engine, _db) = engine_with_db().await;
    let first = new_recette(&engine, "Salaire", 100_000).await;
    let second = new_recette(&engine, "Prime", 200_000).await;
    let _third = new_recette(&engine, "Loyer percu", 300_000).await;

    engine.set_certified(first.id, "alice", true).await.unwrap();
    engine.set_certified(second.id, "alice", true).await.unwrap();

    let totaux = engine.totaux("alice").await.unwrap();
    assert_eq!(totaux.disponible, 600_000);
    assert_eq!(totaux.certifie, 300_000);
}

#[tokio::test]
async fn net_of_exclusions_agrees_with_filtered_sum() {
    let (engine, _db) = engine_with_db().await;
    let kept = new_compte(&engine, "Courant", 50_000, false).await;
    let overdrawn = new_compte(&engine, "Decouvert", -12_500, false).await;
    let excluded = new_compte(&engine, "Epargne bloquee", 80_000, true).await;

    let totaux = engine.totaux("alice").await.unwrap();
    let filtered: i64 = [&kept, &overdrawn, &excluded]
        .iter()
        .filter(|c| !c.exclude_from_total)
        .map(|c| c.solde)
        .sum();
    assert_eq!(totaux.net_hors_exclusions, filtered);
    assert_eq!(totaux.net_hors_exclusions, 37_500);

    // Flipping the flag moves the account between the two sides.
    engine
        .set_compte_exclusion(excluded.id, "alice", false)
        .await
        .unwrap();
    let totaux = engine.totaux("alice").await.unwrap();
    assert_eq!(totaux.net_hors_exclusions, 117_500);
}

#[tokio::test]
async fn allocate_validates_inputs() {
    let (engine, _db) = engine_with_db().await;
    let compte = new_compte(&engine, "Courant", 0, false).await;

    let err = engine
        .allocate(AllocateCmd::new(
            "alice",
            "tx-0",
            uuid::Uuid::new_v4(),
            10_000,
            "Courses",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .allocate(AllocateCmd::new("alice", "tx-0", compte.id, 0, "Courses"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));
}

#[tokio::test]
async fn transfer_events_are_published_after_commit() {
    let (engine, _db) = engine_with_db().await;
    let source = new_recette(&engine, "Salaire", 500_000).await;
    let destination = new_recette(&engine, "Reserve", 0).await;
    let mut events = engine.subscribe();

    let transfert = engine
        .transfer(TransferCmd::new(
            "alice",
            source.id,
            destination.id,
            120_000,
            Utc::now(),
        ))
        .await
        .unwrap();

    let event = events.recv().await.unwrap();
    assert_eq!(
        event,
        Event::TransferSettled {
            transfert_id: transfert.id,
            source_id: source.id,
            destination_id: destination.id,
            montant: 120_000,
        }
    );

    engine.reverse_transfer(transfert.id, "alice").await.unwrap();
    let event = events.recv().await.unwrap();
    assert_eq!(
        event,
        Event::TransferReversed {
            transfert_id: transfert.id,
            source_id: source.id,
            destination_id: destination.id,
            montant: 120_000,
        }
    );
}

#[tokio::test]
async fn movement_events_carry_the_movement_id() {
    let (engine, _db) = engine_with_db().await;
    let compte = new_compte(&engine, "Courant", 0, false).await;
    let fonds = allocate_fonds(&engine, &compte, "Courses", 100_000).await;
    let mut events = engine.subscribe();

    let mouvement_id = engine
        .apply_movement(MovementCmd::new(
            "alice",
            fonds.id,
            compte.id,
            MovementKind::Debit,
            30_000,
        ))
        .await
        .unwrap();

    let event = events.recv().await.unwrap();
    assert_eq!(
        event,
        Event::MovementApplied {
            fonds_id: fonds.id,
            mouvement_id,
            kind: MovementKind::Debit,
            montant: 30_000,
        }
    );
}
