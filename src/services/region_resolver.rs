use sqlx::SqliteConnection;
use tracing::{debug, instrument};

use crate::db::{Region, RegionRef, RegionRepository};
use crate::services::StatError;

/// Maps region names to registry codes and back
#[derive(Clone)]
pub struct RegionResolver {
    region_repo: RegionRepository,
    verify_codes: bool,
}

impl RegionResolver {
    /// With `verify_codes` off, caller-supplied codes pass through unchecked
    pub fn new(region_repo: RegionRepository, verify_codes: bool) -> Self {
        Self {
            region_repo,
            verify_codes,
        }
    }

    /// Resolve `region` to its code on an already acquired connection
    #[instrument(skip(self, conn))]
    pub async fn resolve_on(
        &self,
        conn: &mut SqliteConnection,
        region: &RegionRef,
    ) -> Result<i64, StatError> {
        match region {
            RegionRef::Code(code) => {
                if self.verify_codes
                    && self
                        .region_repo
                        .find_name_by_code(conn, *code)
                        .await?
                        .is_none()
                {
                    return Err(StatError::RegionCodeNotFound { code: *code });
                }
                Ok(*code)
            }
            RegionRef::Name(name) => {
                // Registry names are stored trimmed
                let code = self
                    .region_repo
                    .find_code_by_name(conn, name.trim())
                    .await?
                    .ok_or_else(|| StatError::RegionNotFound { name: name.clone() })?;
                debug!("Resolved region '{}' to code {}", name, code);
                Ok(code)
            }
        }
    }

    /// Resolve `region` to its code using its own scoped connection
    pub async fn resolve(&self, region: &RegionRef) -> Result<i64, StatError> {
        let mut conn = self.region_repo.acquire().await?;
        self.resolve_on(&mut conn, region).await
    }

    /// Inverse registry lookup: code to display name
    #[instrument(skip(self))]
    pub async fn resolve_region_name(&self, code: i64) -> Result<String, StatError> {
        let mut conn = self.region_repo.acquire().await?;
        self.region_repo
            .find_name_by_code(&mut conn, code)
            .await?
            .ok_or(StatError::RegionCodeNotFound { code })
    }

    pub async fn regions(&self) -> Result<Vec<Region>, StatError> {
        Ok(self.region_repo.find_all().await?)
    }
}
