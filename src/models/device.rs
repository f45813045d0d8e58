//! Device registration models.
//!
//! A device is one registered mobile endpoint: the opaque token the OS push
//! service issued for it, its platform and the user that owns it, if any.

use diesel::AsExpression;
use diesel::FromSqlRow;
use diesel::deserialize::{self, FromSql};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use std::io::Write;

// ============================================================================
// Enums
// ============================================================================

/// Mobile platform of a registered device
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Ios,
    Android,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }
}

impl diesel::query_builder::QueryId for Platform {
    type QueryId = Platform;
    const HAS_STATIC_QUERY_ID: bool = false;
}

impl ToSql<Text, Pg> for Platform {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<Text, Pg> for Platform {
    fn from_sql(
        bytes: <Pg as diesel::backend::Backend>::RawValue<'_>,
    ) -> deserialize::Result<Self> {
        let s = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        match s.as_str() {
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            _ => Err(format!("Unrecognized platform: {}", s).into()),
        }
    }
}

// ============================================================================
// Device Models (Query/Insert)
// ============================================================================

/// Device query model for SELECT operations
///
/// Only the columns the push layer needs are selected; `created_at` stays in
/// the table for bookkeeping.
#[derive(Debug, Queryable, Selectable, Serialize, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::push_devices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Device {
    pub id: i32,
    pub user_id: Option<i32>,
    pub token: String,
    pub platform: Platform,
}

impl Device {
    /// Builds an unsaved device around a token, mostly useful for callers that
    /// keep tokens outside the registry.
    pub fn from_token<S: Into<String>>(token: S) -> Self {
        Self {
            id: 0,
            user_id: None,
            token: token.into(),
            platform: Platform::default(),
        }
    }
}

/// NewDevice insert model used by the registration flow
#[derive(Debug, Insertable, Deserialize, Clone)]
#[diesel(table_name = crate::schema::push_devices)]
pub struct NewDevice {
    pub user_id: Option<i32>,
    pub token: String,
    pub platform: Platform,
}
