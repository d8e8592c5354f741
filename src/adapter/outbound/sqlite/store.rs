//! SQLite watch store implementation.
//!
//! Diesel calls are blocking, so every operation runs on the blocking pool
//! and never stalls the scheduler loop.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use super::database::connection::DbPool;
use super::database::model::{
    NewPriceSampleRow, PriceSampleRow, ReservationRow, WatchChangeset, WatchRow,
};
use super::database::schema::{price_samples, reservations, watches};
use crate::domain::{
    PriceSample, ReservationCode, ReservationRecord, Watch, WatchId, WatchPatch,
};
use crate::error::StorageError;
use crate::port::outbound::store::{CheckClaim, WatchStore};

/// SQLite-backed watch store.
#[derive(Clone)]
pub struct SqliteWatchStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteWatchStore {
    /// Create a new SQLite watch store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, StorageError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| StorageError::Unreachable(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StorageError::Unreachable(e.to_string()))?
    }

    fn to_row(watch: &Watch) -> Result<WatchRow, StorageError> {
        Ok(WatchRow {
            id: watch.id.to_string(),
            owner: watch.owner.to_string(),
            provider: watch.provider().as_str().to_string(),
            itinerary: encode(&watch.itinerary)?,
            check_interval_secs: i64::try_from(watch.check_interval_secs)
                .map_err(|e| StorageError::Corrupt(e.to_string()))?,
            active: watch.active,
            auto_hold: watch.auto_hold,
            last_checked_at: watch.last_checked_at.map(|t| t.to_rfc3339()),
            current_price: watch.current_price,
            bookable_refs: encode(&watch.bookable_refs)?,
            prior_reservation: watch.prior_reservation.as_ref().map(ToString::to_string),
            manifest: encode(&watch.manifest)?,
            created_at: watch.created_at.to_rfc3339(),
        })
    }

    fn from_row(row: WatchRow) -> Result<Watch, StorageError> {
        Ok(Watch {
            id: WatchId::from(row.id),
            owner: row.owner.as_str().into(),
            itinerary: decode(&row.itinerary)?,
            check_interval_secs: u64::try_from(row.check_interval_secs)
                .map_err(|e| StorageError::Corrupt(e.to_string()))?,
            active: row.active,
            auto_hold: row.auto_hold,
            last_checked_at: row.last_checked_at.as_deref().map(parse_time).transpose()?,
            current_price: row.current_price,
            bookable_refs: decode(&row.bookable_refs)?,
            prior_reservation: row.prior_reservation.map(ReservationCode::from),
            manifest: decode(&row.manifest)?,
            created_at: parse_time(&row.created_at)?,
        })
    }

    fn to_changeset(patch: &WatchPatch) -> Result<WatchChangeset, StorageError> {
        Ok(WatchChangeset {
            last_checked_at: patch.last_checked_at.map(|t| t.to_rfc3339()),
            current_price: patch.current_price,
            bookable_refs: patch.bookable_refs.as_ref().map(encode).transpose()?,
            active: patch.active,
        })
    }

    fn reservation_to_row(record: &ReservationRecord) -> Result<ReservationRow, StorageError> {
        Ok(ReservationRow {
            code: record.code.to_string(),
            watch_id: record.watch_id.to_string(),
            owner: record.owner.to_string(),
            provider: record.itinerary.provider.as_str().to_string(),
            itinerary: encode(&record.itinerary)?,
            manifest: encode(&record.manifest)?,
            bookable_refs: encode(&record.bookable_refs)?,
            price: record.price,
            expires_at: record.expires_at.map(|t| t.to_rfc3339()),
            created_at: record.created_at.to_rfc3339(),
            superseded_by: record.superseded_by.as_ref().map(ToString::to_string),
        })
    }

    fn reservation_from_row(row: ReservationRow) -> Result<ReservationRecord, StorageError> {
        Ok(ReservationRecord {
            code: ReservationCode::from(row.code),
            watch_id: WatchId::from(row.watch_id),
            owner: row.owner.as_str().into(),
            itinerary: decode(&row.itinerary)?,
            manifest: decode(&row.manifest)?,
            bookable_refs: decode(&row.bookable_refs)?,
            price: row.price,
            expires_at: row.expires_at.as_deref().map(parse_time).transpose()?,
            created_at: parse_time(&row.created_at)?,
            superseded_by: row.superseded_by.map(ReservationCode::from),
        })
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|e| StorageError::Corrupt(e.to_string()))
}

fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::Corrupt(e.to_string()))
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StorageError::Corrupt(format!("timestamp {raw:?}: {e}")))
}

/// Fixed-width UTC stamp; claim cutoffs compare these as text.
fn lease_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn watch_exists(conn: &mut SqliteConnection, id: &str) -> Result<bool, StorageError> {
    let count: i64 = watches::table
        .filter(watches::id.eq(id))
        .count()
        .get_result(conn)
        .map_err(db_error)?;
    Ok(count > 0)
}

fn db_error(err: DieselError) -> StorageError {
    match err {
        DieselError::NotFound => StorageError::NotFound,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => StorageError::Conflict,
        other => StorageError::Unreachable(other.to_string()),
    }
}

#[async_trait]
impl WatchStore for SqliteWatchStore {
    async fn list_active_watches(&self) -> Result<Vec<Watch>, StorageError> {
        let rows: Vec<WatchRow> = self
            .with_conn(|conn| {
                watches::table
                    .filter(watches::active.eq(true))
                    .order(watches::created_at.asc())
                    .select(WatchRow::as_select())
                    .load(conn)
                    .map_err(db_error)
            })
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                Self::from_row(row)
                    .map_err(|e| warn!(watch_id = %id, error = %e, "Skipping unreadable watch"))
                    .ok()
            })
            .collect())
    }

    async fn get_watch(&self, id: &WatchId) -> Result<Option<Watch>, StorageError> {
        let id = id.to_string();
        let row: Option<WatchRow> = self
            .with_conn(move |conn| {
                watches::table
                    .find(id)
                    .select(WatchRow::as_select())
                    .first(conn)
                    .optional()
                    .map_err(db_error)
            })
            .await?;

        row.map(Self::from_row).transpose()
    }

    async fn insert_watch(&self, watch: &Watch) -> Result<(), StorageError> {
        let row = Self::to_row(watch)?;
        self.with_conn(move |conn| {
            conn.transaction::<_, DieselError, _>(|conn| {
                let exists: i64 = watches::table
                    .filter(watches::id.eq(&row.id))
                    .count()
                    .get_result(conn)?;
                if exists > 0 {
                    return Ok(Err(StorageError::Conflict));
                }
                diesel::insert_into(watches::table)
                    .values(&row)
                    .execute(conn)?;
                Ok(Ok(()))
            })
            .map_err(db_error)?
        })
        .await
    }

    async fn update_watch(&self, id: &WatchId, patch: &WatchPatch) -> Result<(), StorageError> {
        let id = id.to_string();
        let changes = Self::to_changeset(patch)?;
        let empty = patch.is_empty();
        self.with_conn(move |conn| {
            let matched = if empty {
                watches::table
                    .filter(watches::id.eq(&id))
                    .count()
                    .get_result::<i64>(conn)
                    .map_err(db_error)? as usize
            } else {
                diesel::update(watches::table.find(&id))
                    .set(&changes)
                    .execute(conn)
                    .map_err(db_error)?
            };
            if matched == 0 {
                return Err(StorageError::NotFound);
            }
            Ok(())
        })
        .await
    }

    async fn delete_watch(&self, id: &WatchId) -> Result<(), StorageError> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let deleted = diesel::delete(watches::table.find(id))
                .execute(conn)
                .map_err(db_error)?;
            if deleted == 0 {
                return Err(StorageError::NotFound);
            }
            Ok(())
        })
        .await
    }

    async fn claim_check(
        &self,
        id: &WatchId,
        claim: &CheckClaim,
        stale_before: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let id = id.to_string();
        let token = claim.token.clone();
        let claimed_at = lease_time(claim.claimed_at);
        let stale_before = lease_time(stale_before);
        self.with_conn(move |conn| {
            let claimed = diesel::update(
                watches::table.filter(watches::id.eq(&id)).filter(
                    watches::check_claimed_at
                        .is_null()
                        .or(watches::check_claimed_at.lt(stale_before)),
                ),
            )
            .set((
                watches::check_token.eq(Some(token)),
                watches::check_claimed_at.eq(Some(claimed_at)),
            ))
            .execute(conn)
            .map_err(db_error)?;
            if claimed > 0 {
                return Ok(true);
            }
            if watch_exists(conn, &id)? {
                Ok(false)
            } else {
                Err(StorageError::NotFound)
            }
        })
        .await
    }

    async fn release_check(&self, id: &WatchId, claim: &CheckClaim) -> Result<(), StorageError> {
        let id = id.to_string();
        let token = claim.token.clone();
        self.with_conn(move |conn| {
            let released = diesel::update(
                watches::table
                    .filter(watches::id.eq(&id))
                    .filter(watches::check_token.eq(token)),
            )
            .set((
                watches::check_token.eq(None::<String>),
                watches::check_claimed_at.eq(None::<String>),
            ))
            .execute(conn)
            .map_err(db_error)?;
            if released == 0 && !watch_exists(conn, &id)? {
                return Err(StorageError::NotFound);
            }
            Ok(())
        })
        .await
    }

    async fn append_price_sample(&self, sample: &PriceSample) -> Result<(), StorageError> {
        let row = NewPriceSampleRow {
            watch_id: sample.watch_id.to_string(),
            observed_at: sample.observed_at.to_rfc3339(),
            price: sample.price,
            persisted: sample.persisted,
        };
        self.with_conn(move |conn| {
            diesel::insert_into(price_samples::table)
                .values(&row)
                .execute(conn)
                .map_err(db_error)?;
            Ok(())
        })
        .await
    }

    async fn price_samples(&self, id: &WatchId) -> Result<Vec<PriceSample>, StorageError> {
        let id = id.to_string();
        let rows: Vec<PriceSampleRow> = self
            .with_conn(move |conn| {
                price_samples::table
                    .filter(price_samples::watch_id.eq(id))
                    .order(price_samples::id.asc())
                    .select(PriceSampleRow::as_select())
                    .load(conn)
                    .map_err(db_error)
            })
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(PriceSample {
                    watch_id: WatchId::from(row.watch_id),
                    observed_at: parse_time(&row.observed_at)?,
                    price: row.price,
                    persisted: row.persisted,
                })
            })
            .collect()
    }

    async fn insert_reservation(&self, record: &ReservationRecord) -> Result<(), StorageError> {
        let row = Self::reservation_to_row(record)?;
        self.with_conn(move |conn| {
            conn.transaction::<_, DieselError, _>(|conn| {
                let exists: i64 = reservations::table
                    .filter(reservations::code.eq(&row.code))
                    .count()
                    .get_result(conn)?;
                if exists > 0 {
                    return Ok(Err(StorageError::Conflict));
                }
                diesel::insert_into(reservations::table)
                    .values(&row)
                    .execute(conn)?;
                Ok(Ok(()))
            })
            .map_err(db_error)?
        })
        .await
    }

    async fn get_reservation(
        &self,
        code: &ReservationCode,
    ) -> Result<Option<ReservationRecord>, StorageError> {
        let code = code.to_string();
        let row: Option<ReservationRow> = self
            .with_conn(move |conn| {
                reservations::table
                    .find(code)
                    .select(ReservationRow::as_select())
                    .first(conn)
                    .optional()
                    .map_err(db_error)
            })
            .await?;

        row.map(Self::reservation_from_row).transpose()
    }

    async fn supersede_reservation(
        &self,
        code: &ReservationCode,
        by: &ReservationCode,
    ) -> Result<(), StorageError> {
        let code = code.to_string();
        let by = by.to_string();
        self.with_conn(move |conn| {
            let updated = diesel::update(reservations::table.find(code))
                .set(reservations::superseded_by.eq(Some(by)))
                .execute(conn)
                .map_err(db_error)?;
            if updated == 0 {
                return Err(StorageError::NotFound);
            }
            Ok(())
        })
        .await
    }
}
