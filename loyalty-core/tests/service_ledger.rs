//! Service facade + ledger invariants over the in-memory store.

mod support;

use std::sync::Arc;

use rust_decimal::Decimal;

use loyalty_core::auth::AuthConfig;
use loyalty_core::entities::OrderStatus;
use loyalty_core::service::{Service, ServiceError, SubmitOutcome};
use loyalty_core::storage::{Ledger, LedgerError, MemoryLedger};

use support::order_number;

fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret".to_owned(),
        token_ttl: std::time::Duration::from_secs(3600),
    }
}

fn service(ledger: Arc<dyn Ledger>) -> Service {
    Service::new(ledger, auth_config())
}

async fn register_user(svc: &Service, ledger: &Arc<dyn Ledger>, login: &str) -> i64 {
    svc.register(login, "pw").await.unwrap();
    ledger.select_user(login).await.unwrap().id
}

#[tokio::test]
async fn duplicate_login_is_rejected() {
    let ledger: Arc<dyn Ledger> = Arc::new(MemoryLedger::new());
    let svc = service(ledger.clone());

    svc.register("alice", "pw").await.unwrap();
    let err = svc.register("alice", "other").await.unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateLogin));
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() {
    let ledger: Arc<dyn Ledger> = Arc::new(MemoryLedger::new());
    let svc = service(ledger.clone());

    svc.register("alice", "pw").await.unwrap();
    let err = svc.authenticate("alice", "other").await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidCredentials));

    let err = svc.authenticate("nobody", "pw").await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidCredentials));
}

#[tokio::test]
async fn submit_rejects_invalid_numbers() {
    let ledger: Arc<dyn Ledger> = Arc::new(MemoryLedger::new());
    let svc = service(ledger.clone());
    let alice = register_user(&svc, &ledger, "alice").await;

    for bad in ["", "12345", "7992739871x"] {
        let err = svc.submit_order(alice, bad).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOrderNumber), "{bad:?}");
    }
}

/// Property 2: once accepted, ownership never changes, and resubmissions
/// report the right side of the conflict.
#[tokio::test]
async fn order_ownership_is_immutable() {
    let ledger: Arc<dyn Ledger> = Arc::new(MemoryLedger::new());
    let svc = service(ledger.clone());
    let alice = register_user(&svc, &ledger, "alice").await;
    let bob = register_user(&svc, &ledger, "bob").await;
    let number = order_number("4539");

    assert_eq!(
        svc.submit_order(alice, &number).await.unwrap(),
        SubmitOutcome::Accepted
    );

    for _ in 0..5 {
        assert_eq!(
            svc.submit_order(alice, &number).await.unwrap(),
            SubmitOutcome::AlreadyAccepted
        );
        assert_eq!(
            svc.submit_order(bob, &number).await.unwrap(),
            SubmitOutcome::OwnedByOther
        );
    }

    let orders = ledger.get_user_orders(alice).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].user_id, alice);
    assert!(ledger.get_user_orders(bob).await.unwrap().is_empty());
}

/// Property 3: K parallel submissions of the same number yield exactly one
/// `Accepted` and a single stored row.
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_submission_accepts_exactly_once() {
    let ledger: Arc<dyn Ledger> = Arc::new(MemoryLedger::new());
    let svc = Arc::new(service(ledger.clone()));
    let alice = register_user(&svc, &ledger, "alice").await;
    let number = order_number("6011");

    let mut tasks = Vec::new();
    for _ in 0..32 {
        let svc = svc.clone();
        let number = number.clone();
        tasks.push(tokio::spawn(
            async move { svc.submit_order(alice, &number).await },
        ));
    }

    let mut accepted = 0;
    let mut already = 0;
    for task in tasks {
        match task.await.unwrap().unwrap() {
            SubmitOutcome::Accepted => accepted += 1,
            SubmitOutcome::AlreadyAccepted => already += 1,
            SubmitOutcome::OwnedByOther => panic!("ownership leaked to another user"),
        }
    }
    assert_eq!(accepted, 1);
    assert_eq!(already, 31);
    assert_eq!(ledger.get_user_orders(alice).await.unwrap().len(), 1);
}

/// Property 4: no interleaving of credits and withdrawals drives the
/// balance negative; rejected withdrawals leave no trace.
#[tokio::test(flavor = "multi_thread")]
async fn balance_never_goes_negative() {
    let ledger: Arc<dyn Ledger> = Arc::new(MemoryLedger::new());
    let svc = Arc::new(service(ledger.clone()));
    let alice = register_user(&svc, &ledger, "alice").await;

    // Seed a little headroom so some withdrawals succeed.
    let seed = order_number("100");
    svc.submit_order(alice, &seed).await.unwrap();
    ledger
        .apply_accrual(&seed, OrderStatus::Processed, Decimal::new(50, 0))
        .await
        .unwrap();

    let mut tasks = Vec::new();
    for i in 0..10 {
        let ledger = ledger.clone();
        let svc1 = svc.clone();
        let number = order_number(&format!("77{i}"));
        tasks.push(tokio::spawn(async move {
            svc1.submit_order(alice, &number).await.unwrap();
            ledger
                .apply_accrual(&number, OrderStatus::Processed, Decimal::new(10, 0))
                .await
                .unwrap();
        }));
        let svc = svc.clone();
        let spend = order_number(&format!("88{i}"));
        tasks.push(tokio::spawn(async move {
            // Either outcome is fine; the store decides.
            let _ = svc.withdraw(alice, &spend, Decimal::new(30, 0)).await;
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let balance = ledger.get_balance(alice).await.unwrap();
    assert!(balance.current >= Decimal::ZERO);

    // Property 5: the ledger identity holds at rest.
    let processed: Decimal = ledger
        .get_user_orders(alice)
        .await
        .unwrap()
        .iter()
        .filter(|o| o.status == OrderStatus::Processed)
        .map(|o| o.accrual)
        .sum();
    let withdrawn: Decimal = ledger
        .get_user_withdrawals(alice)
        .await
        .unwrap()
        .iter()
        .map(|w| w.sum)
        .sum();
    assert_eq!(balance.current, processed - withdrawn);
    assert_eq!(balance.withdrawn, withdrawn);
}

#[tokio::test]
async fn withdraw_validates_input() {
    let ledger: Arc<dyn Ledger> = Arc::new(MemoryLedger::new());
    let svc = service(ledger.clone());
    let alice = register_user(&svc, &ledger, "alice").await;

    let err = svc
        .withdraw(alice, "12345", Decimal::new(10, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOrderNumber));

    let number = order_number("4539");
    let err = svc.withdraw(alice, &number, Decimal::ZERO).await.unwrap_err();
    assert!(matches!(err, ServiceError::NonPositiveSum));

    let err = svc
        .withdraw(alice, &number, Decimal::new(100, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientFunds));

    assert!(ledger.get_user_withdrawals(alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_lists_surface_as_absence() {
    let ledger: Arc<dyn Ledger> = Arc::new(MemoryLedger::new());
    let svc = service(ledger.clone());
    let alice = register_user(&svc, &ledger, "alice").await;

    assert!(matches!(
        svc.orders(alice).await.unwrap_err(),
        ServiceError::NoOrders
    ));
    assert!(matches!(
        svc.withdrawals(alice).await.unwrap_err(),
        ServiceError::NoWithdrawals
    ));
}

#[tokio::test]
async fn withdrawal_not_required_to_match_a_stored_order() {
    let ledger: Arc<dyn Ledger> = Arc::new(MemoryLedger::new());
    let svc = service(ledger.clone());
    let alice = register_user(&svc, &ledger, "alice").await;

    let earn = order_number("4539");
    svc.submit_order(alice, &earn).await.unwrap();
    ledger
        .apply_accrual(&earn, OrderStatus::Processed, Decimal::new(20, 0))
        .await
        .unwrap();

    // Spend against a number that was never submitted as an order.
    let spend = order_number("6011");
    svc.withdraw(alice, &spend, Decimal::new(5, 0)).await.unwrap();

    let balance = ledger.get_balance(alice).await.unwrap();
    assert_eq!(balance.current, Decimal::new(15, 0));
    assert_eq!(balance.withdrawn, Decimal::new(5, 0));

    let err = ledger
        .apply_accrual(&order_number("9999"), OrderStatus::Processed, Decimal::ONE)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::OrderNotFound(_)));
}
