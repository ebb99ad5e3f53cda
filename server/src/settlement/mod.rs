//! 积分结算引擎
//!
//! # 两段式结算
//!
//! ```text
//! checkout ──┬─ 数字商品: 买家扣分 + 卖家即时入账（同一事务）
//!            └─ 实体商品: 买家扣分 + 按卖家建 pending_transaction
//!                              │
//!                              ▼ (96 小时内)
//!                        confirm ── 卖家入账 + 写 Deal + 删除 pending 行
//!                              │
//!                              ▼ (超时后 confirm)
//!                        rejected（终态，卖家不入账）
//! ```
//!
//! 余额校验、扣分、入账、建行全部在一个数据库事务里；守卫条件用
//! `THROW` 在事务内表达，杜绝检查与扣款之间的竞态。过期惰性判定：
//! 只在确认时检查，没有后台清扫任务。

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{
    Deal, DealItem, Notification, PendingTransaction, Product, PurchaseItem, PurchaseRecord,
    PurchaseStatus,
};
use crate::db::repository::{DealRepository, ProductRepository, TransactionRepository, UserRepository};
use crate::notify::Notifier;
use crate::utils::{AppError, AppResult, short_id};

#[cfg(test)]
mod tests;

// In-transaction guard tokens, matched back out of the database error
const THROW_BUYER_NOT_FOUND: &str = "buyer_not_found";
const THROW_SELLER_NOT_FOUND: &str = "seller_not_found";
const THROW_INSUFFICIENT_BALANCE: &str = "insufficient_balance";
const THROW_TX_NOT_FOUND: &str = "transaction_not_found";

/// One line of a checkout request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
}

fn default_quantity() -> i64 {
    1
}

impl CheckoutItem {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            selected_size: None,
            selected_color: None,
        }
    }
}

/// Checkout result returned to the buyer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub purchase_id: String,
    pub total_points_spent: i64,
    pub items: Vec<PurchaseItem>,
    /// Digital goods are usable immediately
    pub digital_downloads: Vec<DigitalDownload>,
    /// Physical goods await seller confirmation
    pub pending_transaction_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigitalDownload {
    pub product_id: String,
    pub title: String,
    pub file_url: String,
}

/// Confirmation result returned to the seller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationOutcome {
    pub deal_id: String,
    pub transactions_total_price_in_points: i64,
    pub product_id_arrays: Vec<String>,
}

#[derive(Clone)]
pub struct SettlementEngine {
    db: Surreal<Db>,
    users: UserRepository,
    products: ProductRepository,
    transactions: TransactionRepository,
    deals: DealRepository,
    notifier: Notifier,
}

impl SettlementEngine {
    pub fn new(
        db: Surreal<Db>,
        users: UserRepository,
        products: ProductRepository,
        transactions: TransactionRepository,
        deals: DealRepository,
        notifier: Notifier,
    ) -> Self {
        Self {
            db,
            users,
            products,
            transactions,
            deals,
            notifier,
        }
    }

    /// Settle a checkout
    ///
    /// The total is derived from current product prices, never taken from
    /// the client. Balance guard, debit, digital credits, pending rows
    /// and stock updates all commit in one database transaction, so a
    /// failure anywhere leaves every balance untouched.
    pub async fn checkout(
        &self,
        buyer_uid: &str,
        lines: &[CheckoutItem],
    ) -> AppResult<CheckoutReceipt> {
        if lines.is_empty() {
            return Err(AppError::validation("Checkout requires at least one product"));
        }
        if lines.iter().any(|l| l.quantity < 1) {
            return Err(AppError::validation("Item quantity must be at least 1"));
        }

        // BTreeMap keeps seller/product iteration deterministic
        let mut quantities: BTreeMap<String, i64> = BTreeMap::new();
        for line in lines {
            *quantities.entry(line.product_id.clone()).or_default() += line.quantity;
        }

        let unique_ids: Vec<String> = quantities.keys().cloned().collect();
        let products = self.products.find_many(&unique_ids).await?;
        let by_id: BTreeMap<&str, &Product> =
            products.iter().map(|p| (p.product_id.as_str(), p)).collect();

        for pid in &unique_ids {
            let Some(product) = by_id.get(pid.as_str()) else {
                return Err(AppError::not_found(format!("Product {pid} not found")));
            };
            if !product.is_available {
                return Err(AppError::validation(format!(
                    "Product {pid} is not available"
                )));
            }
            if !product.is_digital() && product.quantity < quantities[pid] {
                return Err(AppError::validation(format!(
                    "Product {pid} has insufficient stock"
                )));
            }
        }

        let mut total: i64 = 0;
        let mut items: Vec<PurchaseItem> = Vec::new();
        let mut digital_downloads: Vec<DigitalDownload> = Vec::new();
        // seller uid -> immediate credit (digital goods)
        let mut digital_credits: BTreeMap<String, i64> = BTreeMap::new();
        // seller uid -> (aggregate price, expanded product ids)
        let mut physical_groups: BTreeMap<String, (i64, Vec<String>)> = BTreeMap::new();

        for line in lines {
            let product = by_id[line.product_id.as_str()];
            let line_total = product.price_in_points * line.quantity;
            total += line_total;
            items.push(PurchaseItem {
                product_id: product.product_id.clone(),
                title: product.title.clone(),
                quantity: line.quantity,
                price_in_points: product.price_in_points,
                selected_size: line.selected_size.clone(),
                selected_color: line.selected_color.clone(),
                file_url: product.file_url.clone(),
            });

            if product.is_digital() {
                *digital_credits.entry(product.seller_id.clone()).or_default() += line_total;
            } else {
                let group = physical_groups.entry(product.seller_id.clone()).or_default();
                group.0 += line_total;
                for _ in 0..line.quantity {
                    group.1.push(product.product_id.clone());
                }
            }
        }

        // One download link per distinct digital product
        for pid in quantities.keys() {
            let product = by_id[pid.as_str()];
            if product.is_digital() {
                digital_downloads.push(DigitalDownload {
                    product_id: product.product_id.clone(),
                    title: product.title.clone(),
                    file_url: product.file_url.clone().unwrap_or_default(),
                });
            }
        }

        let purchase_id = short_id();
        let status = if physical_groups.is_empty() {
            PurchaseStatus::Approved
        } else {
            PurchaseStatus::Pending
        };
        let purchase = PurchaseRecord {
            id: purchase_id.clone(),
            date: Utc::now(),
            total_products_purchased: quantities.values().sum(),
            total_points_spent: total,
            items: items.clone(),
            status,
        };

        let pending: Vec<PendingTransaction> = physical_groups
            .iter()
            .map(|(seller, (price, pids))| {
                PendingTransaction::new(short_id(), seller, buyer_uid, *price, pids.clone())
            })
            .collect();

        self.run_checkout_transaction(buyer_uid, total, &purchase, &digital_credits, &pending, &quantities)
            .await?;

        self.send_checkout_notifications(buyer_uid, &purchase_id, total, &digital_credits, &pending)
            .await;

        Ok(CheckoutReceipt {
            purchase_id,
            total_points_spent: total,
            items,
            digital_downloads,
            pending_transaction_ids: pending.iter().map(|t| t.transaction_id.clone()).collect(),
        })
    }

    /// One transaction: guard, debit, credit digital sellers, create
    /// pending rows, adjust stock and counters
    async fn run_checkout_transaction(
        &self,
        buyer_uid: &str,
        total: i64,
        purchase: &PurchaseRecord,
        digital_credits: &BTreeMap<String, i64>,
        pending: &[PendingTransaction],
        quantities: &BTreeMap<String, i64>,
    ) -> AppResult<()> {
        let mut query = String::from(
            "BEGIN TRANSACTION;
             LET $buyer = (SELECT * FROM user WHERE uid = $buyer_uid)[0];
             IF $buyer = NONE { THROW \"buyer_not_found\" };
             IF $buyer.points_balance < $total { THROW \"insufficient_balance\" };
             UPDATE user SET points_balance -= $total, purchase_history += $purchase
                 WHERE uid = $buyer_uid;\n",
        );
        for i in 0..digital_credits.len() {
            query.push_str(&format!(
                "LET $ds{i} = (SELECT * FROM user WHERE uid = $dseller{i})[0];
                 IF $ds{i} = NONE {{ THROW \"seller_not_found\" }};
                 UPDATE user SET points_balance += $dcredit{i} WHERE uid = $dseller{i};\n"
            ));
        }
        for i in 0..pending.len() {
            query.push_str(&format!("CREATE pending_transaction CONTENT $ptx{i};\n"));
        }
        for i in 0..quantities.len() {
            query.push_str(&format!(
                "UPDATE product SET quantity = math::max([quantity - $qty{i}, 0]),
                     download_count += $qty{i},
                     is_available = is_file OR quantity > 0
                 WHERE product_id = $pid{i};\n"
            ));
        }
        query.push_str("COMMIT TRANSACTION;");

        let mut request = self
            .db
            .query(query)
            .bind(("buyer_uid", buyer_uid.to_string()))
            .bind(("total", total))
            .bind(("purchase", purchase.clone()));
        for (i, (seller, credit)) in digital_credits.iter().enumerate() {
            request = request
                .bind((format!("dseller{i}"), seller.clone()))
                .bind((format!("dcredit{i}"), *credit));
        }
        for (i, tx) in pending.iter().enumerate() {
            request = request.bind((format!("ptx{i}"), tx.clone()));
        }
        for (i, (pid, qty)) in quantities.iter().enumerate() {
            request = request
                .bind((format!("pid{i}"), pid.clone()))
                .bind((format!("qty{i}"), *qty));
        }

        let mut response = request.await.map_err(map_throw)?;
        response.take_errors().into_values().next().map_or(Ok(()), |e| Err(map_throw(e)))
    }

    async fn send_checkout_notifications(
        &self,
        buyer_uid: &str,
        purchase_id: &str,
        total: i64,
        digital_credits: &BTreeMap<String, i64>,
        pending: &[PendingTransaction],
    ) {
        self.notifier
            .send(
                Notification::new(
                    short_id(),
                    buyer_uid,
                    "purchase",
                    "Purchase complete",
                    format!("You spent {total} points"),
                )
                .with_purchase(purchase_id),
            )
            .await;
        for (seller, credit) in digital_credits {
            self.notifier
                .send(Notification::new(
                    short_id(),
                    seller,
                    "payment_received",
                    "Points received",
                    format!("You received {credit} points from a digital sale"),
                ))
                .await;
        }
        for tx in pending {
            self.notifier
                .send(
                    Notification::new(
                        short_id(),
                        &tx.seller_id,
                        "confirmation_required",
                        "Confirm your sale",
                        format!(
                            "Confirm delivery within 96 hours to receive {} points",
                            tx.price_in_points
                        ),
                    )
                    .with_transaction(&tx.transaction_id),
                )
                .await;
        }
    }

    /// Seller confirms a pending transaction
    ///
    /// Exactly-once: the pending row is deleted in the same transaction
    /// that credits the seller, so a second confirmation finds nothing
    /// and fails with not-found. Expiry is evaluated here, lazily; an
    /// expired transaction flips to rejected and never credits.
    pub async fn confirm(
        &self,
        transaction_id: &str,
        seller_uid: &str,
    ) -> AppResult<ConfirmationOutcome> {
        let tx = self
            .transactions
            .find_pending_for_seller(transaction_id, seller_uid)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Pending transaction {transaction_id} not found for seller {seller_uid}"
                ))
            })?;

        if tx.is_expired(Utc::now()) {
            self.transactions.mark_rejected(transaction_id).await?;
            self.notifier
                .send(
                    Notification::new(
                        short_id(),
                        seller_uid,
                        "transaction_expired",
                        "Confirmation window closed",
                        "The 96 hour confirmation window has passed; no points were transferred",
                    )
                    .with_transaction(transaction_id),
                )
                .await;
            return Err(AppError::expired(format!(
                "Transaction {transaction_id} passed the confirmation window"
            )));
        }

        let deal = self.build_deal(&tx).await?;
        self.run_confirm_transaction(&tx, &deal).await?;

        self.notifier
            .send(
                Notification::new(
                    short_id(),
                    seller_uid,
                    "payment_received",
                    "Points received",
                    format!("You received {} points", tx.price_in_points),
                )
                .with_transaction(transaction_id),
            )
            .await;
        self.notifier
            .send(
                Notification::new(
                    short_id(),
                    &tx.buyer_id,
                    "deal_completed",
                    "Order confirmed",
                    "The seller confirmed your order",
                )
                .with_transaction(transaction_id),
            )
            .await;

        Ok(ConfirmationOutcome {
            deal_id: deal.deal_id,
            transactions_total_price_in_points: tx.price_in_points,
            product_id_arrays: tx.product_ids,
        })
    }

    /// Durable deal record; product titles are resolved best-effort
    /// (a product deleted after checkout falls back to its id)
    async fn build_deal(&self, tx: &PendingTransaction) -> AppResult<Deal> {
        let products = self.products.find_many(&tx.product_ids).await?;
        let by_id: BTreeMap<&str, &Product> =
            products.iter().map(|p| (p.product_id.as_str(), p)).collect();

        let items = tx
            .product_ids
            .iter()
            .map(|pid| match by_id.get(pid.as_str()) {
                Some(p) => DealItem {
                    product_id: pid.clone(),
                    product_title: p.title.clone(),
                    price_in_points: p.price_in_points,
                },
                None => DealItem {
                    product_id: pid.clone(),
                    product_title: pid.clone(),
                    price_in_points: 0,
                },
            })
            .collect();

        Ok(Deal {
            id: None,
            deal_id: short_id(),
            seller_id: tx.seller_id.clone(),
            buyer_id: tx.buyer_id.clone(),
            total_price_in_points: tx.price_in_points,
            items,
            deal_date: Utc::now(),
        })
    }

    /// One transaction: re-check the row is still pending, credit the
    /// seller, write the deal, link it on both users, delete the row
    async fn run_confirm_transaction(&self, tx: &PendingTransaction, deal: &Deal) -> AppResult<()> {
        let mut response = self
            .db
            .query(
                "BEGIN TRANSACTION;
                 LET $tx = (SELECT * FROM pending_transaction
                     WHERE transaction_id = $tid AND seller_id = $seller
                       AND status = 'pending')[0];
                 IF $tx = NONE { THROW \"transaction_not_found\" };
                 UPDATE user SET points_balance += $amount, deals += $deal_id
                     WHERE uid = $seller;
                 UPDATE user SET deals += $deal_id WHERE uid = $buyer;
                 CREATE deal CONTENT $deal;
                 DELETE pending_transaction WHERE transaction_id = $tid;
                 COMMIT TRANSACTION;",
            )
            .bind(("tid", tx.transaction_id.clone()))
            .bind(("seller", tx.seller_id.clone()))
            .bind(("buyer", tx.buyer_id.clone()))
            .bind(("amount", tx.price_in_points))
            .bind(("deal_id", deal.deal_id.clone()))
            .bind(("deal", deal.clone()))
            .await
            .map_err(map_throw)?;
        response.take_errors().into_values().next().map_or(Ok(()), |e| Err(map_throw(e)))
    }

    /// Pending transactions awaiting a seller's confirmation
    pub async fn list_pending(&self, seller_uid: &str) -> AppResult<Vec<PendingTransaction>> {
        self.users.get_by_uid(seller_uid).await?;
        Ok(self.transactions.list_pending_for_seller(seller_uid).await?)
    }

    /// Deals a user participated in, either side
    pub async fn list_deals(&self, uid: &str) -> AppResult<Vec<Deal>> {
        Ok(self.deals.list_for_user(uid).await?)
    }
}

/// Map in-transaction THROW tokens back to domain errors
fn map_throw(err: surrealdb::Error) -> AppError {
    let msg = err.to_string();
    if msg.contains(THROW_INSUFFICIENT_BALANCE) {
        AppError::insufficient_balance("Not enough points for this checkout")
    } else if msg.contains(THROW_BUYER_NOT_FOUND) {
        AppError::not_found("Buyer not found")
    } else if msg.contains(THROW_SELLER_NOT_FOUND) {
        AppError::not_found("Seller not found")
    } else if msg.contains(THROW_TX_NOT_FOUND) {
        AppError::not_found("Pending transaction not found")
    } else {
        AppError::database(msg)
    }
}
