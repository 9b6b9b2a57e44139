use anyhow::Result;
use chrono::Utc;
use std::collections::BTreeSet;

use crate::db::Store;
use crate::domain::{BrandId, UserId};

/// Consent subjects required per brand, and the consents users expressed.
#[derive(Clone)]
pub struct ConsentService {
    store: Store,
}

impl ConsentService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn get_subject_ids_required_for_brand(
        &self,
        brand_id: &BrandId,
    ) -> Result<BTreeSet<String>> {
        self.store
            .consent_repo()
            .get_subject_ids_required_for_brand(brand_id)
            .await
    }

    pub async fn has_user_consented_to_all_subjects(
        &self,
        user_id: UserId,
        subject_ids: &BTreeSet<String>,
    ) -> Result<bool> {
        self.store
            .consent_repo()
            .has_user_consented_to_all_subjects(user_id, subject_ids)
            .await
    }

    pub async fn require_subject_for_brand(&self, subject_id: &str, brand_id: &BrandId) -> Result<()> {
        self.store
            .consent_repo()
            .require_subject_for_brand(subject_id, brand_id)
            .await
    }

    pub async fn consent_to_subject(&self, user_id: UserId, subject_id: &str) -> Result<()> {
        self.store
            .consent_repo()
            .consent_to_subject(user_id, subject_id, Utc::now())
            .await
    }
}
