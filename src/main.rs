//! Clinic API server binary.
//!
//! Configuration comes from the environment (or a `.env` file):
//! `CLINIC_BIND_ADDR`, `CLINIC_DB_PATH`, `AUTO_CREATE_VISITS`,
//! `CORS_MAX_AGE_SECS`, and `RUST_LOG` for log filtering.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    clinic_api::run().await
}
