use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use farewatch_dispatch::{PlanTier, Recipient, RecipientDirectory, RecipientStatus};

/// Read-only view over the subscription collaborator's recipient table.
pub struct PgRecipientDirectory {
    pool: PgPool,
}

impl PgRecipientDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RecipientRow {
    id: Uuid,
    home_locale: String,
    plan: String,
    status: String,
}

impl RecipientRow {
    fn into_domain(self) -> Result<Recipient, Box<dyn std::error::Error + Send + Sync>> {
        let plan: PlanTier = self.plan.parse()?;
        let status: RecipientStatus = self.status.parse()?;
        Ok(Recipient {
            id: self.id,
            home_locale: self.home_locale,
            plan,
            status,
        })
    }
}

#[async_trait]
impl RecipientDirectory for PgRecipientDirectory {
    async fn active_locales(
        &self,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT home_locale
            FROM recipients
            WHERE status IN ('trial', 'active')
            ORDER BY home_locale
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.get::<String, _>(0))
            .collect())
    }

    async fn active_recipients(
        &self,
        locale: &str,
    ) -> Result<Vec<Recipient>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT id, home_locale, plan, status
            FROM recipients
            WHERE home_locale = $1 AND status IN ('trial', 'active')
            "#,
        )
        .bind(locale)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RecipientRow::into_domain).collect()
    }
}
