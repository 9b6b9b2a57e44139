use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set};
use std::collections::BTreeSet;

use crate::domain::{BrandId, UserId};
use crate::entities::{consent_subject_requirements, consents, prelude::*};

pub struct ConsentRepository {
    conn: DatabaseConnection,
}

impl ConsentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_subject_ids_required_for_brand(
        &self,
        brand_id: &BrandId,
    ) -> Result<BTreeSet<String>> {
        let subject_ids: Vec<String> = ConsentSubjectRequirements::find()
            .select_only()
            .column(consent_subject_requirements::Column::SubjectId)
            .filter(consent_subject_requirements::Column::BrandId.eq(brand_id.as_str()))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query required consent subjects")?;

        Ok(subject_ids.into_iter().collect())
    }

    /// True if the user consented to every given subject. An empty set is
    /// always satisfied.
    pub async fn has_user_consented_to_all_subjects(
        &self,
        user_id: UserId,
        subject_ids: &BTreeSet<String>,
    ) -> Result<bool> {
        if subject_ids.is_empty() {
            return Ok(true);
        }

        let consented: Vec<String> = Consents::find()
            .select_only()
            .column(consents::Column::SubjectId)
            .filter(consents::Column::UserId.eq(user_id.value()))
            .filter(consents::Column::SubjectId.is_in(subject_ids.iter().cloned()))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query consents")?;

        let consented: BTreeSet<String> = consented.into_iter().collect();
        Ok(subject_ids.is_subset(&consented))
    }

    pub async fn require_subject_for_brand(&self, subject_id: &str, brand_id: &BrandId) -> Result<()> {
        let active_model = consent_subject_requirements::ActiveModel {
            brand_id: Set(brand_id.as_str().to_string()),
            subject_id: Set(subject_id.to_string()),
        };

        ConsentSubjectRequirements::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    consent_subject_requirements::Column::BrandId,
                    consent_subject_requirements::Column::SubjectId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to require consent subject")?;

        Ok(())
    }

    pub async fn consent_to_subject(
        &self,
        user_id: UserId,
        subject_id: &str,
        expressed_at: DateTime<Utc>,
    ) -> Result<()> {
        let active_model = consents::ActiveModel {
            user_id: Set(user_id.value()),
            subject_id: Set(subject_id.to_string()),
            expressed_at: Set(expressed_at),
        };

        Consents::insert(active_model)
            .on_conflict(
                OnConflict::columns([consents::Column::UserId, consents::Column::SubjectId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to store consent")?;

        Ok(())
    }
}
