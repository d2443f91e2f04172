use crate::domain::model::{SchemeScope, SchemeTier};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Master-data repository of declared tiers.
///
/// An empty list is a legitimate answer: the product has no active scheme for that scope.
#[async_trait]
pub trait SlabStore: Send + Sync {
    async fn declared_tiers(&self, scope: &SchemeScope) -> Result<Vec<SchemeTier>>;
}

#[async_trait]
impl<T: SlabStore + ?Sized> SlabStore for std::sync::Arc<T> {
    async fn declared_tiers(&self, scope: &SchemeScope) -> Result<Vec<SchemeTier>> {
        (**self).declared_tiers(scope).await
    }
}

/// Settings every front end must provide to locate master data.
pub trait ConfigProvider: Send + Sync {
    fn master_data_path(&self) -> &str;
    fn as_of(&self) -> Option<NaiveDate>;
}
