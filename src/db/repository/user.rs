use rusqlite::{params, Connection};

use super::{get_record, list_for_user, select_one_where, select_where};
use crate::db::DatabaseError;
use crate::models::*;

pub fn list_users(conn: &Connection) -> Result<Vec<User>, DatabaseError> {
    select_where(conn, "1 = 1 ORDER BY id", [])
}

pub fn get_user_by_national_id(conn: &Connection, national_id: &str) -> Result<Option<User>, DatabaseError> {
    select_one_where(conn, "national_id = ?1", params![national_id])
}

/// A patient with visits and prescriptions (newest first) and every
/// medical-history list attached.
pub fn load_user_profile(conn: &Connection, user_id: i64) -> Result<Option<UserProfile>, DatabaseError> {
    let Some(user) = get_record::<User>(conn, user_id)? else {
        return Ok(None);
    };

    Ok(Some(UserProfile {
        visits: super::visits_for_user(conn, user_id)?,
        prescriptions: super::prescriptions_for_user(conn, user_id)?,
        appointments: select_where(conn, "user_id = ?1 ORDER BY date, id", params![user_id])?,
        hereditary_diseases: list_for_user(conn, user_id)?,
        disabilities: list_for_user(conn, user_id)?,
        medical_images: list_for_user(conn, user_id)?,
        surgeries: list_for_user(conn, user_id)?,
        allergies: list_for_user(conn, user_id)?,
        chronic_conditions: list_for_user(conn, user_id)?,
        user,
    }))
}
