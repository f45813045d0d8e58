//! Device repository for async database operations.
//!
//! Provides the read interface the push layer consumes ([`DeviceStore`]) and
//! the registration-side operations on the `push_devices` table.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::AsyncPgConnection;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Device, NewDevice};

/// Read-only view of the device registry used when selecting push targets
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Every registered device, in registration order
    async fn list_all(&self) -> AppResult<Vec<Device>>;

    /// Devices owned by the given user, in registration order
    async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<Device>>;
}

/// Device repository
#[derive(Clone)]
pub struct DeviceRepository {
    pool: AsyncDbPool,
}

impl DeviceRepository {
    /// Creates a new DeviceRepository with the given connection pool.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> AppResult<PooledConnection<'_, AsyncPgConnection>> {
        self.pool
            .get()
            .await
            .map_err(|e| AppError::ConnectionPool {
                source: anyhow::Error::from(e),
            })
    }

    /// Registers a device
    ///
    /// # Errors
    /// `AppError::Duplicate` if the token is already registered
    pub async fn create(&self, new_device: NewDevice) -> AppResult<Device> {
        use crate::schema::push_devices::dsl::*;
        let mut conn = self.connection().await?;

        diesel::insert_into(push_devices)
            .values(&new_device)
            .returning(Device::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Finds a device by its push token
    pub async fn find_by_token(&self, device_token: &str) -> AppResult<Option<Device>> {
        use crate::schema::push_devices::dsl::*;
        let mut conn = self.connection().await?;

        push_devices
            .filter(token.eq(device_token))
            .select(Device::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Removes a device by its push token
    ///
    /// # Returns
    /// Number of rows affected (1 if deleted, 0 if not found)
    pub async fn delete_by_token(&self, device_token: &str) -> AppResult<usize> {
        use crate::schema::push_devices::dsl::*;
        let mut conn = self.connection().await?;

        diesel::delete(push_devices.filter(token.eq(device_token)))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)
    }
}

#[async_trait]
impl DeviceStore for DeviceRepository {
    async fn list_all(&self) -> AppResult<Vec<Device>> {
        use crate::schema::push_devices::dsl::*;
        let mut conn = self.connection().await?;

        push_devices
            .order(id.asc())
            .select(Device::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn list_by_user(&self, uid: i32) -> AppResult<Vec<Device>> {
        use crate::schema::push_devices::dsl::*;
        let mut conn = self.connection().await?;

        push_devices
            .filter(user_id.eq(uid))
            .order(id.asc())
            .select(Device::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }
}
