//! Support store: persistence and queries for users, operators, customers,
//! and tickets.
//!
//! Every operation is a single SQL statement, so per-statement atomicity is
//! all the store needs: uniqueness checks (phone, channel message) happen in
//! the same statement as the write, never as a separate round trip. Public
//! methods run through [`crate::with_backoff`] so transient failures are
//! retried and definitive outcomes (`NotFound`, `Duplicate*`) return at once.

use crate::error::StorageError;
use crate::models::{CustomerRecord, TgUserRecord, TicketRecord};
use crate::retry::with_backoff;
use crate::sqlite_pool::SqlitePoolManager;
use chrono::Utc;
use tracing::info;

#[derive(Clone)]
pub struct SupportStore {
    pool_manager: SqlitePoolManager,
}

impl SupportStore {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        let store = Self { pool_manager };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<(), sqlx::Error> {
        info!("Creating database tables if not exist");

        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tg_user (
                tg_id INTEGER PRIMARY KEY,
                tg_username TEXT,
                is_banned INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS operator (
                operator_id INTEGER PRIMARY KEY AUTOINCREMENT,
                tg_id INTEGER NOT NULL UNIQUE
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS customer (
                customer_id INTEGER PRIMARY KEY AUTOINCREMENT,
                tg_id INTEGER NOT NULL UNIQUE,
                phone TEXT NOT NULL UNIQUE,
                first_name TEXT,
                last_name TEXT
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ticket (
                ticket_id INTEGER PRIMARY KEY AUTOINCREMENT,
                customer_tg_id INTEGER NOT NULL,
                support_chat_message_id INTEGER NOT NULL UNIQUE,
                answered INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        info!("Database tables created successfully");
        Ok(())
    }

    /// Insert-or-update a chat user by id. Idempotent; always succeeds.
    pub async fn upsert_tg_user(
        &self,
        tg_id: i64,
        tg_username: Option<&str>,
    ) -> Result<(), StorageError> {
        with_backoff("upsert_tg_user", || self.upsert_tg_user_once(tg_id, tg_username)).await
    }

    async fn upsert_tg_user_once(
        &self,
        tg_id: i64,
        tg_username: Option<&str>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO tg_user (tg_id, tg_username) VALUES (?, ?)
            ON CONFLICT(tg_id) DO UPDATE SET tg_username = excluded.tg_username
            "#,
        )
        .bind(tg_id)
        .bind(tg_username)
        .execute(self.pool_manager.pool())
        .await
        .map_err(StorageError::from_sqlx)?;
        Ok(())
    }

    pub async fn get_tg_user(&self, tg_id: i64) -> Result<Option<TgUserRecord>, StorageError> {
        with_backoff("get_tg_user", || self.get_tg_user_once(tg_id)).await
    }

    async fn get_tg_user_once(&self, tg_id: i64) -> Result<Option<TgUserRecord>, StorageError> {
        sqlx::query_as::<_, TgUserRecord>("SELECT * FROM tg_user WHERE tg_id = ?")
            .bind(tg_id)
            .fetch_optional(self.pool_manager.pool())
            .await
            .map_err(StorageError::from_sqlx)
    }

    /// Grants operator capability to a chat user. Administrative; idempotent.
    pub async fn add_operator(&self, tg_id: i64) -> Result<(), StorageError> {
        with_backoff("add_operator", || self.add_operator_once(tg_id)).await
    }

    async fn add_operator_once(&self, tg_id: i64) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO operator (tg_id) VALUES (?) ON CONFLICT(tg_id) DO NOTHING")
            .bind(tg_id)
            .execute(self.pool_manager.pool())
            .await
            .map_err(StorageError::from_sqlx)?;
        Ok(())
    }

    /// Capability check: does this chat user hold an operator row.
    pub async fn is_operator(&self, tg_id: i64) -> Result<bool, StorageError> {
        with_backoff("is_operator", || self.is_operator_once(tg_id)).await
    }

    async fn is_operator_once(&self, tg_id: i64) -> Result<bool, StorageError> {
        let exists: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM operator WHERE tg_id = ?)")
                .bind(tg_id)
                .fetch_one(self.pool_manager.pool())
                .await
                .map_err(StorageError::from_sqlx)?;
        Ok(exists != 0)
    }

    /// Registers (or re-registers) `tg_id` as a customer with `phone` and
    /// returns the customer id. Fails with `DuplicatePhone` when the phone is
    /// already on file for a different customer. One statement: the
    /// uniqueness check and the write cannot race.
    pub async fn register_customer(&self, tg_id: i64, phone: &str) -> Result<i64, StorageError> {
        with_backoff("register_customer", || {
            self.register_customer_once(tg_id, phone)
        })
        .await
    }

    async fn register_customer_once(&self, tg_id: i64, phone: &str) -> Result<i64, StorageError> {
        let customer_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO customer (tg_id, phone) VALUES (?, ?)
            ON CONFLICT(tg_id) DO UPDATE SET phone = excluded.phone
            RETURNING customer_id
            "#,
        )
        .bind(tg_id)
        .bind(phone)
        .fetch_one(self.pool_manager.pool())
        .await
        .map_err(StorageError::from_sqlx)?;

        info!(tg_id, customer_id, "Registered customer");
        Ok(customer_id)
    }

    pub async fn get_customer_by_tg_id(
        &self,
        tg_id: i64,
    ) -> Result<Option<CustomerRecord>, StorageError> {
        with_backoff("get_customer_by_tg_id", || {
            self.get_customer_by_tg_id_once(tg_id)
        })
        .await
    }

    async fn get_customer_by_tg_id_once(
        &self,
        tg_id: i64,
    ) -> Result<Option<CustomerRecord>, StorageError> {
        sqlx::query_as::<_, CustomerRecord>("SELECT * FROM customer WHERE tg_id = ?")
            .bind(tg_id)
            .fetch_optional(self.pool_manager.pool())
            .await
            .map_err(StorageError::from_sqlx)
    }

    pub async fn get_customer_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<CustomerRecord>, StorageError> {
        with_backoff("get_customer_by_phone", || {
            self.get_customer_by_phone_once(phone)
        })
        .await
    }

    async fn get_customer_by_phone_once(
        &self,
        phone: &str,
    ) -> Result<Option<CustomerRecord>, StorageError> {
        sqlx::query_as::<_, CustomerRecord>("SELECT * FROM customer WHERE phone = ?")
            .bind(phone)
            .fetch_optional(self.pool_manager.pool())
            .await
            .map_err(StorageError::from_sqlx)
    }

    pub async fn set_customer_first_name(
        &self,
        customer_id: i64,
        first_name: &str,
    ) -> Result<(), StorageError> {
        with_backoff("set_customer_first_name", || {
            self.update_customer_field_once("first_name", customer_id, first_name)
        })
        .await
    }

    pub async fn set_customer_last_name(
        &self,
        customer_id: i64,
        last_name: &str,
    ) -> Result<(), StorageError> {
        with_backoff("set_customer_last_name", || {
            self.update_customer_field_once("last_name", customer_id, last_name)
        })
        .await
    }

    async fn update_customer_field_once(
        &self,
        column: &'static str,
        customer_id: i64,
        value: &str,
    ) -> Result<(), StorageError> {
        // column is a compile-time constant, never user input
        let sql = format!("UPDATE customer SET {column} = ? WHERE customer_id = ?");
        let result = sqlx::query(&sql)
            .bind(value)
            .bind(customer_id)
            .execute(self.pool_manager.pool())
            .await
            .map_err(StorageError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("customer {customer_id}")));
        }
        Ok(())
    }

    /// Creates a ticket bound to a review-channel message. Fails with
    /// `DuplicateTicket` if that message already has one.
    pub async fn create_ticket(
        &self,
        customer_tg_id: i64,
        support_chat_message_id: i64,
    ) -> Result<i64, StorageError> {
        with_backoff("create_ticket", || {
            self.create_ticket_once(customer_tg_id, support_chat_message_id)
        })
        .await
    }

    async fn create_ticket_once(
        &self,
        customer_tg_id: i64,
        support_chat_message_id: i64,
    ) -> Result<i64, StorageError> {
        let ticket_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO ticket (customer_tg_id, support_chat_message_id, created_at)
            VALUES (?, ?, ?)
            RETURNING ticket_id
            "#,
        )
        .bind(customer_tg_id)
        .bind(support_chat_message_id)
        .bind(Utc::now())
        .fetch_one(self.pool_manager.pool())
        .await
        .map_err(StorageError::from_sqlx)?;

        info!(ticket_id, customer_tg_id, support_chat_message_id, "Created ticket");
        Ok(ticket_id)
    }

    /// Point lookup by the channel message a ticket was forwarded as.
    pub async fn get_ticket_by_channel_message(
        &self,
        support_chat_message_id: i64,
    ) -> Result<TicketRecord, StorageError> {
        with_backoff("get_ticket_by_channel_message", || {
            self.get_ticket_by_channel_message_once(support_chat_message_id)
        })
        .await
    }

    async fn get_ticket_by_channel_message_once(
        &self,
        support_chat_message_id: i64,
    ) -> Result<TicketRecord, StorageError> {
        sqlx::query_as::<_, TicketRecord>(
            "SELECT * FROM ticket WHERE support_chat_message_id = ?",
        )
        .bind(support_chat_message_id)
        .fetch_optional(self.pool_manager.pool())
        .await
        .map_err(StorageError::from_sqlx)?
        .ok_or_else(|| {
            StorageError::NotFound(format!(
                "ticket for channel message {support_chat_message_id}"
            ))
        })
    }

    /// Unconditional overwrite of a user's ban flag; last writer wins.
    pub async fn set_banned(&self, tg_id: i64, banned: bool) -> Result<(), StorageError> {
        with_backoff("set_banned", || self.set_banned_once(tg_id, banned)).await
    }

    async fn set_banned_once(&self, tg_id: i64, banned: bool) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE tg_user SET is_banned = ? WHERE tg_id = ?")
            .bind(banned)
            .bind(tg_id)
            .execute(self.pool_manager.pool())
            .await
            .map_err(StorageError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("tg_user {tg_id}")));
        }
        info!(tg_id, banned, "Updated ban flag");
        Ok(())
    }

    /// Unconditional overwrite of a ticket's answered flag; last writer wins.
    pub async fn set_answered(&self, ticket_id: i64, answered: bool) -> Result<(), StorageError> {
        with_backoff("set_answered", || self.set_answered_once(ticket_id, answered)).await
    }

    async fn set_answered_once(
        &self,
        ticket_id: i64,
        answered: bool,
    ) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE ticket SET answered = ? WHERE ticket_id = ?")
            .bind(answered)
            .bind(ticket_id)
            .execute(self.pool_manager.pool())
            .await
            .map_err(StorageError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("ticket {ticket_id}")));
        }
        info!(ticket_id, answered, "Updated answered flag");
        Ok(())
    }

    /// Ids of registered customers that are not banned.
    pub async fn list_active_customers(&self) -> Result<Vec<i64>, StorageError> {
        with_backoff("list_active_customers", || {
            self.list_ids_once(
                r#"
                SELECT tg_user.tg_id FROM tg_user
                INNER JOIN customer ON tg_user.tg_id = customer.tg_id
                WHERE tg_user.is_banned = 0
                "#,
            )
        })
        .await
    }

    /// Ids of unbanned users that never registered as customers.
    pub async fn list_non_customer_users(&self) -> Result<Vec<i64>, StorageError> {
        with_backoff("list_non_customer_users", || {
            self.list_ids_once(
                r#"
                SELECT tg_id FROM tg_user WHERE is_banned = 0
                EXCEPT SELECT tg_id FROM customer
                "#,
            )
        })
        .await
    }

    /// Ids of banned users.
    pub async fn list_banned_users(&self) -> Result<Vec<i64>, StorageError> {
        with_backoff("list_banned_users", || {
            self.list_ids_once("SELECT tg_id FROM tg_user WHERE is_banned = 1")
        })
        .await
    }

    async fn list_ids_once(&self, sql: &'static str) -> Result<Vec<i64>, StorageError> {
        sqlx::query_scalar::<_, i64>(sql)
            .fetch_all(self.pool_manager.pool())
            .await
            .map_err(StorageError::from_sqlx)
    }
}
