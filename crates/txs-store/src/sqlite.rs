//! SQLite store backend.
//!
//! One `movements` table, WAL journaling, cached prepared statements.  Path
//! geometry is stored as a JSON coordinate array in the `geometry` column.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::Connection;

use txs_core::geo::GeoPoint;
use txs_core::ids::{MovementId, VehicleId};
use txs_core::movement::{Fare, Movement, VehicleStatus};
use txs_core::path::TrackPath;
use txs_core::time::Timestamp;

use crate::error::{StoreError, StoreResult};
use crate::store::{RouteStore, StoredMovement};

const SELECT_COLUMNS: &str = "id, vehicle, pickup_time_ms, dropoff_time_ms, status, \
     passenger_count, pickup_lon, pickup_lat, dropoff_lon, dropoff_lat, \
     distance_m, duration_secs, fare_amount, extra, mta_tax, tip_amount, \
     tolls_amount, surcharge, total_amount, payment_type, trip_type, geometry";

/// A `RouteStore` persisting movements to an SQLite database file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and initialise the schema.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// An in-memory database, handy for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS movements (
                 id              INTEGER PRIMARY KEY AUTOINCREMENT,
                 vehicle         INTEGER NOT NULL,
                 pickup_time_ms  INTEGER NOT NULL,
                 dropoff_time_ms INTEGER NOT NULL,
                 status          INTEGER NOT NULL,
                 passenger_count INTEGER NOT NULL,
                 pickup_lon      REAL    NOT NULL,
                 pickup_lat      REAL    NOT NULL,
                 dropoff_lon     REAL    NOT NULL,
                 dropoff_lat     REAL    NOT NULL,
                 distance_m      REAL    NOT NULL,
                 duration_secs   REAL    NOT NULL,
                 fare_amount     REAL    NOT NULL,
                 extra           REAL    NOT NULL,
                 mta_tax         REAL    NOT NULL,
                 tip_amount      REAL    NOT NULL,
                 tolls_amount    REAL    NOT NULL,
                 surcharge       REAL    NOT NULL,
                 total_amount    REAL    NOT NULL,
                 payment_type    INTEGER NOT NULL,
                 trip_type       INTEGER NOT NULL,
                 geometry        TEXT    NOT NULL
             );
             CREATE INDEX IF NOT EXISTS movements_window
                 ON movements (dropoff_time_ms, pickup_time_ms);",
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

impl RouteStore for SqliteStore {
    fn insert(&self, movement: &Movement) -> StoreResult<MovementId> {
        let geometry = movement.path.to_json()?;
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "INSERT INTO movements \
             (vehicle, pickup_time_ms, dropoff_time_ms, status, passenger_count, \
              pickup_lon, pickup_lat, dropoff_lon, dropoff_lat, distance_m, \
              duration_secs, fare_amount, extra, mta_tax, tip_amount, \
              tolls_amount, surcharge, total_amount, payment_type, trip_type, \
              geometry) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, \
                     ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
        )?;
        stmt.execute(rusqlite::params![
            movement.vehicle.0 as i64,
            movement.pickup_time.as_millis(),
            movement.dropoff_time.as_millis(),
            movement.status.as_u8() as i64,
            movement.passenger_count as i64,
            movement.pickup_pos.lon,
            movement.pickup_pos.lat,
            movement.dropoff_pos.lon,
            movement.dropoff_pos.lat,
            movement.distance_m,
            movement.duration_secs,
            movement.fare.fare_amount,
            movement.fare.extra,
            movement.fare.mta_tax,
            movement.fare.tip_amount,
            movement.fare.tolls_amount,
            movement.fare.surcharge,
            movement.fare.total_amount,
            movement.fare.payment_type,
            movement.fare.trip_type,
            geometry,
        ])?;
        Ok(MovementId(conn.last_insert_rowid() as u64))
    }

    fn query_window(
        &self,
        start: Timestamp,
        end: Timestamp,
        exclude: &[MovementId],
    ) -> StoreResult<Vec<StoredMovement>> {
        // `NOT IN` over a dynamic placeholder list; the statement cache keys
        // on the SQL text, so each distinct exclusion count caches separately.
        let mut sql = format!(
            "SELECT {SELECT_COLUMNS} FROM movements \
             WHERE dropoff_time_ms > ?1 AND pickup_time_ms < ?2"
        );
        if !exclude.is_empty() {
            sql.push_str(" AND id NOT IN (");
            for i in 0..exclude.len() {
                if i > 0 {
                    sql.push(',');
                }
                sql.push_str(&format!("?{}", i + 3));
            }
            sql.push(')');
        }
        sql.push_str(" ORDER BY pickup_time_ms, id");

        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&sql)?;
        let params = rusqlite::params_from_iter(
            [start.as_millis(), end.as_millis()]
                .into_iter()
                .chain(exclude.iter().map(|id| id.0 as i64)),
        );

        let raw_rows = stmt
            .query_map(params, RawRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        raw_rows.into_iter().map(RawRow::into_stored).collect()
    }

    fn count(&self) -> StoreResult<u64> {
        let conn = self.conn.lock();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM movements", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}

/// Column-typed row image, decoded into a [`StoredMovement`] in a second step
/// so decode failures surface as [`StoreError::Corrupt`] rather than being
/// shoehorned into `rusqlite::Error`.
struct RawRow {
    id:              i64,
    vehicle:         i64,
    pickup_time_ms:  i64,
    dropoff_time_ms: i64,
    status:          i64,
    passenger_count: i64,
    pickup_lon:      f64,
    pickup_lat:      f64,
    dropoff_lon:     f64,
    dropoff_lat:     f64,
    distance_m:      f64,
    duration_secs:   f64,
    fare_amount:     f64,
    extra:           f64,
    mta_tax:         f64,
    tip_amount:      f64,
    tolls_amount:    f64,
    surcharge:       f64,
    total_amount:    f64,
    payment_type:    i32,
    trip_type:       i32,
    geometry:        String,
}

impl RawRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id:              row.get(0)?,
            vehicle:         row.get(1)?,
            pickup_time_ms:  row.get(2)?,
            dropoff_time_ms: row.get(3)?,
            status:          row.get(4)?,
            passenger_count: row.get(5)?,
            pickup_lon:      row.get(6)?,
            pickup_lat:      row.get(7)?,
            dropoff_lon:     row.get(8)?,
            dropoff_lat:     row.get(9)?,
            distance_m:      row.get(10)?,
            duration_secs:   row.get(11)?,
            fare_amount:     row.get(12)?,
            extra:           row.get(13)?,
            mta_tax:         row.get(14)?,
            tip_amount:      row.get(15)?,
            tolls_amount:    row.get(16)?,
            surcharge:       row.get(17)?,
            total_amount:    row.get(18)?,
            payment_type:    row.get(19)?,
            trip_type:       row.get(20)?,
            geometry:        row.get(21)?,
        })
    }

    fn into_stored(self) -> StoreResult<StoredMovement> {
        let id = MovementId(self.id as u64);

        let status = VehicleStatus::from_u8(self.status as u8)
            .ok_or_else(|| StoreError::Corrupt(id, format!("unknown status {}", self.status)))?;
        let path = TrackPath::from_json(&self.geometry)
            .map_err(|e| StoreError::Corrupt(id, format!("geometry: {e}")))?;

        Ok(StoredMovement {
            id,
            movement: Movement {
                vehicle:         VehicleId(self.vehicle as u32),
                pickup_time:     Timestamp::from_millis(self.pickup_time_ms),
                dropoff_time:    Timestamp::from_millis(self.dropoff_time_ms),
                status,
                passenger_count: self.passenger_count as u32,
                pickup_pos:      GeoPoint::new(self.pickup_lon, self.pickup_lat),
                dropoff_pos:     GeoPoint::new(self.dropoff_lon, self.dropoff_lat),
                distance_m:      self.distance_m,
                duration_secs:   self.duration_secs,
                fare: Fare {
                    fare_amount:  self.fare_amount,
                    extra:        self.extra,
                    mta_tax:      self.mta_tax,
                    tip_amount:   self.tip_amount,
                    tolls_amount: self.tolls_amount,
                    surcharge:    self.surcharge,
                    total_amount: self.total_amount,
                    payment_type: self.payment_type,
                    trip_type:    self.trip_type,
                },
                path,
            },
        })
    }
}
