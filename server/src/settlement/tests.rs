use super::*;
use crate::db::DbService;
use crate::db::models::{TransactionStatus, User};
use crate::db::repository::NotificationRepository;
use crate::message::MessageBus;
use chrono::Duration;

struct Fixture {
    engine: SettlementEngine,
    users: UserRepository,
    products: ProductRepository,
    transactions: TransactionRepository,
}

async fn setup() -> Fixture {
    let db = DbService::open_in_memory().await.unwrap();
    let users = UserRepository::new(db.db.clone());
    let products = ProductRepository::new(db.db.clone());
    let transactions = TransactionRepository::new(db.db.clone());
    let deals = DealRepository::new(db.db.clone());
    let bus = MessageBus::new();
    let notifier = Notifier::new(NotificationRepository::new(db.db.clone()), bus);
    let engine = SettlementEngine::new(
        db.db.clone(),
        users.clone(),
        products.clone(),
        transactions.clone(),
        deals,
        notifier,
    );
    Fixture {
        engine,
        users,
        products,
        transactions,
    }
}

async fn seed_user(f: &Fixture, uid: &str, balance: i64) {
    f.users
        .create(User::new(uid, "Test", "User").with_balance(balance))
        .await
        .unwrap();
}

async fn seed_physical(f: &Fixture, pid: &str, seller: &str, price: i64, stock: i64) {
    f.products
        .create(Product::new(pid, seller, format!("{pid} title"), price).with_stock(stock))
        .await
        .unwrap();
}

async fn seed_digital(f: &Fixture, pid: &str, seller: &str, price: i64) {
    f.products
        .create(
            Product::new(pid, seller, format!("{pid} title"), price)
                .as_digital(format!("https://cdn.example/{pid}.zip")),
        )
        .await
        .unwrap();
}

async fn balance(f: &Fixture, uid: &str) -> i64 {
    f.users.get_by_uid(uid).await.unwrap().points_balance
}

fn item(pid: &str, qty: i64) -> CheckoutItem {
    CheckoutItem::new(pid, qty)
}

#[tokio::test]
async fn test_digital_checkout_settles_immediately() {
    let f = setup().await;
    seed_user(&f, "buyer", 500).await;
    seed_user(&f, "seller", 0).await;
    seed_digital(&f, "ebook", "seller", 120).await;

    let receipt = f
        .engine
        .checkout("buyer", &[item("ebook", 1)])
        .await
        .unwrap();

    assert_eq!(receipt.total_points_spent, 120);
    assert_eq!(receipt.digital_downloads.len(), 1);
    assert!(receipt.digital_downloads[0].file_url.ends_with("ebook.zip"));
    assert!(receipt.pending_transaction_ids.is_empty());

    assert_eq!(balance(&f, "buyer").await, 380);
    assert_eq!(balance(&f, "seller").await, 120);

    let buyer = f.users.get_by_uid("buyer").await.unwrap();
    assert_eq!(buyer.purchase_history.len(), 1);
    assert_eq!(buyer.purchase_history[0].status, PurchaseStatus::Approved);
}

#[tokio::test]
async fn test_physical_checkout_defers_seller_credit() {
    let f = setup().await;
    seed_user(&f, "buyer", 500).await;
    seed_user(&f, "seller", 0).await;
    seed_physical(&f, "mug", "seller", 60, 10).await;

    let receipt = f
        .engine
        .checkout("buyer", &[item("mug", 2)])
        .await
        .unwrap();

    assert_eq!(receipt.total_points_spent, 120);
    assert_eq!(receipt.pending_transaction_ids.len(), 1);

    // Buyer debited, seller untouched until confirmation
    assert_eq!(balance(&f, "buyer").await, 380);
    assert_eq!(balance(&f, "seller").await, 0);

    let tx = f
        .transactions
        .find_by_transaction_id(&receipt.pending_transaction_ids[0])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tx.price_in_points, 120);
    assert_eq!(tx.product_ids, vec!["mug".to_string(), "mug".to_string()]);
    assert_eq!(tx.status, TransactionStatus::Pending);

    let product = f.products.find_by_product_id("mug").await.unwrap().unwrap();
    assert_eq!(product.quantity, 8);
    assert_eq!(product.download_count, 2);

    let buyer = f.users.get_by_uid("buyer").await.unwrap();
    assert_eq!(buyer.purchase_history[0].status, PurchaseStatus::Pending);
}

#[tokio::test]
async fn test_insufficient_balance_changes_nothing() {
    let f = setup().await;
    seed_user(&f, "buyer", 50).await;
    seed_user(&f, "seller", 10).await;
    seed_digital(&f, "ebook", "seller", 120).await;
    seed_physical(&f, "mug", "seller", 60, 5).await;

    let err = f
        .engine
        .checkout("buyer", &[item("ebook", 1), item("mug", 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientBalance(_)));

    assert_eq!(balance(&f, "buyer").await, 50);
    assert_eq!(balance(&f, "seller").await, 10);
    assert!(f.transactions.list_pending_for_seller("seller").await.unwrap().is_empty());
    let product = f.products.find_by_product_id("mug").await.unwrap().unwrap();
    assert_eq!(product.quantity, 5);
}

#[tokio::test]
async fn test_mixed_cart_groups_by_seller() {
    let f = setup().await;
    seed_user(&f, "buyer", 1000).await;
    seed_user(&f, "alice", 0).await;
    seed_user(&f, "bob", 0).await;
    seed_digital(&f, "song", "alice", 30).await;
    seed_physical(&f, "shirt", "alice", 100, 3).await;
    seed_physical(&f, "poster", "bob", 40, 3).await;

    let receipt = f
        .engine
        .checkout(
            "buyer",
            &[item("song", 1), item("shirt", 1), item("poster", 1)],
        )
        .await
        .unwrap();

    assert_eq!(receipt.total_points_spent, 170);
    assert_eq!(balance(&f, "buyer").await, 830);
    // Digital credit lands immediately, physical waits
    assert_eq!(balance(&f, "alice").await, 30);
    assert_eq!(balance(&f, "bob").await, 0);

    // One pending row per seller with physical items
    assert_eq!(receipt.pending_transaction_ids.len(), 2);
    let alice_pending = f.transactions.list_pending_for_seller("alice").await.unwrap();
    assert_eq!(alice_pending.len(), 1);
    assert_eq!(alice_pending[0].price_in_points, 100);
    let bob_pending = f.transactions.list_pending_for_seller("bob").await.unwrap();
    assert_eq!(bob_pending.len(), 1);
    assert_eq!(bob_pending[0].price_in_points, 40);
}

#[tokio::test]
async fn test_confirm_credits_seller_exactly_once() {
    let f = setup().await;
    seed_user(&f, "buyer", 300).await;
    seed_user(&f, "seller", 0).await;
    seed_physical(&f, "mug", "seller", 60, 5).await;

    let receipt = f.engine.checkout("buyer", &[item("mug", 1)]).await.unwrap();
    let tid = receipt.pending_transaction_ids[0].clone();

    let outcome = f.engine.confirm(&tid, "seller").await.unwrap();
    assert_eq!(outcome.transactions_total_price_in_points, 60);
    assert_eq!(outcome.product_id_arrays, vec!["mug".to_string()]);

    assert_eq!(balance(&f, "seller").await, 60);

    // Deal written and linked on both sides
    let seller = f.users.get_by_uid("seller").await.unwrap();
    let buyer = f.users.get_by_uid("buyer").await.unwrap();
    assert_eq!(seller.deals, vec![outcome.deal_id.clone()]);
    assert_eq!(buyer.deals, vec![outcome.deal_id.clone()]);
    let deals = f.engine.list_deals("seller").await.unwrap();
    assert_eq!(deals.len(), 1);
    assert_eq!(deals[0].items[0].product_title, "mug title");

    // Second confirmation finds nothing
    let err = f.engine.confirm(&tid, "seller").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(balance(&f, "seller").await, 60);
}

#[tokio::test]
async fn test_confirm_rejects_wrong_seller() {
    let f = setup().await;
    seed_user(&f, "buyer", 300).await;
    seed_user(&f, "seller", 0).await;
    seed_user(&f, "impostor", 0).await;
    seed_physical(&f, "mug", "seller", 60, 5).await;

    let receipt = f.engine.checkout("buyer", &[item("mug", 1)]).await.unwrap();
    let tid = receipt.pending_transaction_ids[0].clone();

    let err = f.engine.confirm(&tid, "impostor").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(balance(&f, "impostor").await, 0);

    // The rightful seller can still confirm
    f.engine.confirm(&tid, "seller").await.unwrap();
}

#[tokio::test]
async fn test_expired_transaction_rejects_without_credit() {
    let f = setup().await;
    seed_user(&f, "buyer", 300).await;
    seed_user(&f, "seller", 0).await;

    let mut tx = PendingTransaction::new("t-old", "seller", "buyer", 80, vec!["mug".into()]);
    tx.created_at = Utc::now() - Duration::hours(97);
    f.transactions.create(tx).await.unwrap();

    let err = f.engine.confirm("t-old", "seller").await.unwrap_err();
    assert!(matches!(err, AppError::Expired(_)));
    assert_eq!(balance(&f, "seller").await, 0);

    let stored = f
        .transactions
        .find_by_transaction_id("t-old")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, TransactionStatus::Rejected);

    // Terminal: a later confirm attempt is not-found, still no credit
    let err = f.engine.confirm("t-old", "seller").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_points_are_conserved_across_full_cycle() {
    let f = setup().await;
    seed_user(&f, "buyer", 400).await;
    seed_user(&f, "seller", 100).await;
    seed_digital(&f, "ebook", "seller", 50).await;
    seed_physical(&f, "mug", "seller", 70, 2).await;

    let before = balance(&f, "buyer").await + balance(&f, "seller").await;

    let receipt = f
        .engine
        .checkout("buyer", &[item("ebook", 1), item("mug", 1)])
        .await
        .unwrap();
    // Mid-flight the pending amount is held out of both balances
    let mid = balance(&f, "buyer").await + balance(&f, "seller").await;
    assert_eq!(mid, before - 70);

    f.engine
        .confirm(&receipt.pending_transaction_ids[0], "seller")
        .await
        .unwrap();
    let after = balance(&f, "buyer").await + balance(&f, "seller").await;
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_checkout_validation() {
    let f = setup().await;
    seed_user(&f, "buyer", 500).await;
    seed_user(&f, "seller", 0).await;
    seed_physical(&f, "rare", "seller", 10, 1).await;

    let err = f.engine.checkout("buyer", &[]).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = f
        .engine
        .checkout("buyer", &[item("ghost", 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Requesting more than the remaining stock
    let err = f
        .engine
        .checkout("buyer", &[item("rare", 2)])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = f
        .engine
        .checkout("nobody", &[item("rare", 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_sold_out_physical_product_becomes_unavailable() {
    let f = setup().await;
    seed_user(&f, "buyer", 500).await;
    seed_user(&f, "seller", 0).await;
    seed_physical(&f, "last-one", "seller", 10, 1).await;

    f.engine
        .checkout("buyer", &[item("last-one", 1)])
        .await
        .unwrap();

    let product = f
        .products
        .find_by_product_id("last-one")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.quantity, 0);
    assert!(!product.is_available);
}
