use std::boxed::Box;

use bazaar_common::api::dto::ListWindowDto;

use crate::adapter::repository::{AbstractDiscountRepo, AppRepoError};
use crate::model::{DiscountCodeModel, MemberPromotionModel};

pub enum DiscountUcError {
    ValidationFailure(Vec<String>),
    DuplicateCode(String),
    NotFound,
    DataStoreError(AppRepoError),
}

impl From<AppRepoError> for DiscountUcError {
    fn from(value: AppRepoError) -> Self {
        Self::DataStoreError(value)
    }
}

pub struct DiscountEditUseCase {
    pub repo: Box<dyn AbstractDiscountRepo>,
}

impl DiscountEditUseCase {
    pub async fn create_discount(
        &self,
        discount: DiscountCodeModel,
    ) -> Result<DiscountCodeModel, DiscountUcError> {
        Self::check_valid(discount.validate())?;
        let existing = self.repo.fetch_discount(discount.code.as_str()).await?;
        if existing.is_some() {
            return Err(DiscountUcError::DuplicateCode(discount.code));
        }
        self.repo.save_discount(&discount).await?;
        Ok(discount)
    }

    pub async fn update_discount(
        &self,
        code: &str,
        mut edited: DiscountCodeModel,
    ) -> Result<DiscountCodeModel, DiscountUcError> {
        let existing = self
            .repo
            .fetch_discount(code)
            .await?
            .ok_or(DiscountUcError::NotFound)?;
        // redemption counting belongs to checkout, an admin edit never
        // rewrites it
        edited.code = existing.code;
        edited.times_used = existing.times_used;
        Self::check_valid(edited.validate())?;
        self.repo.save_discount(&edited).await?;
        Ok(edited)
    }

    pub async fn list_discounts(
        &self,
        window: ListWindowDto,
    ) -> Result<Vec<DiscountCodeModel>, DiscountUcError> {
        let out = self.repo.list_discounts(window).await?;
        Ok(out)
    }

    pub async fn save_member_promotion(
        &self,
        promo: MemberPromotionModel,
    ) -> Result<(), DiscountUcError> {
        Self::check_valid(promo.validate())?;
        self.repo.save_member_promotion(&promo).await?;
        Ok(())
    }

    fn check_valid(
        reasons: Vec<crate::model::DiscountInvalidReason>,
    ) -> Result<(), DiscountUcError> {
        if reasons.is_empty() {
            Ok(())
        } else {
            let msgs = reasons.iter().map(|r| r.describe()).collect();
            Err(DiscountUcError::ValidationFailure(msgs))
        }
    }
} // end of impl DiscountEditUseCase
