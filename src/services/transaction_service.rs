use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::category_service::parse_type;
use super::error::{parse_uuid, ServiceError, ServiceResult};
use crate::database::models::transaction::{parse_date, NewTransaction, TransactionUpdate};
use crate::database::models::{Transaction, TransactionType};
use crate::database::TransactionRepository;
use crate::validator::{self, supplied, Evaluator, Validate, ValidationContext};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateTransactionRequest {
    pub description: String,
    pub amount: Option<f64>,
    /// `YYYY-MM-DD`
    pub date: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub account_id: String,
    pub category_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransactionPatch {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    pub account_id: Option<String>,
    pub category_id: Option<String>,
}

/// Query-string filters for listing. Blank values are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransactionFilters {
    pub account_id: Option<String>,
    pub category_id: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFilters {
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub transaction_type: Option<TransactionType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

fn date_arg(field: &str, value: &str) -> ServiceResult<NaiveDate> {
    parse_date(value)
        .map_err(|_| ServiceError::BadInput(format!("invalid {}, expected YYYY-MM-DD", field)))
}

impl TransactionFilters {
    pub fn parse(&self) -> ServiceResult<ParsedFilters> {
        Ok(ParsedFilters {
            account_id: supplied(&self.account_id)
                .map(|v| parse_uuid("account_id", v))
                .transpose()?,
            category_id: supplied(&self.category_id)
                .map(|v| parse_uuid("category_id", v))
                .transpose()?,
            transaction_type: supplied(&self.transaction_type)
                .map(parse_type)
                .transpose()?,
            start_date: supplied(&self.start_date)
                .map(|v| date_arg("start_date", v))
                .transpose()?,
            end_date: supplied(&self.end_date)
                .map(|v| date_arg("end_date", v))
                .transpose()?,
        })
    }
}

impl ParsedFilters {
    /// Both date bounds are inclusive.
    pub fn matches(&self, t: &Transaction) -> bool {
        self.account_id.map_or(true, |id| t.account_id == id)
            && self.category_id.map_or(true, |id| t.category_id == id)
            && self.transaction_type.map_or(true, |ty| t.transaction_type == ty)
            && self.start_date.map_or(true, |start| t.date >= start)
            && self.end_date.map_or(true, |end| t.date <= end)
    }
}

impl Validate for CreateTransactionRequest {
    fn validate(&self, _ctx: &ValidationContext) -> Evaluator {
        let mut eval = Evaluator::new();
        eval.check_field(
            validator::not_blank(&self.description),
            "description",
            "description is required",
        );
        match self.amount {
            Some(amount) => eval.check_field(
                validator::positive(amount),
                "amount",
                "amount must be greater than zero",
            ),
            None => eval.add_field_error("amount", "amount is required"),
        }
        eval.check_field(validator::not_blank(&self.date), "date", "date is required");
        eval.check_field(
            validator::not_blank(&self.transaction_type),
            "type",
            "type is required",
        );
        eval.check_field(
            validator::transaction_type(self.transaction_type.trim()),
            "type",
            "type must be income or expense",
        );
        eval.check_field(
            validator::not_blank(&self.account_id),
            "account_id",
            "account_id is required",
        );
        eval.check_field(
            validator::not_blank(&self.category_id),
            "category_id",
            "category_id is required",
        );
        eval
    }
}

impl Validate for TransactionPatch {
    fn validate(&self, _ctx: &ValidationContext) -> Evaluator {
        let mut eval = Evaluator::new();
        let transaction_type = supplied(&self.transaction_type);

        let any = supplied(&self.description).is_some()
            || self.amount.is_some()
            || supplied(&self.date).is_some()
            || transaction_type.is_some()
            || supplied(&self.account_id).is_some()
            || supplied(&self.category_id).is_some();
        if !any {
            eval.add_field_error("fields", "at least one field is required");
            return eval;
        }

        if let Some(amount) = self.amount {
            eval.check_field(
                validator::positive(amount),
                "amount",
                "amount must be greater than zero",
            );
        }
        if let Some(value) = transaction_type {
            eval.check_field(
                validator::transaction_type(value.trim()),
                "type",
                "type must be income or expense",
            );
        }
        eval
    }
}

impl CreateTransactionRequest {
    pub fn into_new(self, user_id: Uuid) -> ServiceResult<NewTransaction> {
        Ok(NewTransaction {
            date: date_arg("date", &self.date)?,
            transaction_type: parse_type(&self.transaction_type)?,
            account_id: parse_uuid("account_id", &self.account_id)?,
            category_id: parse_uuid("category_id", &self.category_id)?,
            amount: self
                .amount
                .ok_or_else(|| ServiceError::BadInput("amount is required".to_string()))?,
            description: self.description,
            user_id,
        })
    }
}

impl TransactionPatch {
    /// Every supplied value is parsed before anything is applied, so a bad
    /// date or id rejects the whole patch.
    pub fn merge(&self, existing: &Transaction) -> ServiceResult<TransactionUpdate> {
        let date = match supplied(&self.date) {
            Some(v) => date_arg("date", v)?,
            None => existing.date,
        };
        let transaction_type = match supplied(&self.transaction_type) {
            Some(v) => parse_type(v)?,
            None => existing.transaction_type,
        };
        let account_id = match supplied(&self.account_id) {
            Some(v) => parse_uuid("account_id", v)?,
            None => existing.account_id,
        };
        let category_id = match supplied(&self.category_id) {
            Some(v) => parse_uuid("category_id", v)?,
            None => existing.category_id,
        };

        Ok(TransactionUpdate {
            id: existing.id,
            user_id: existing.user_id,
            description: supplied(&self.description)
                .unwrap_or(&existing.description)
                .to_string(),
            amount: self.amount.unwrap_or(existing.amount),
            date,
            transaction_type,
            account_id,
            category_id,
            expected_updated_at: existing.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct TransactionService {
    repo: Arc<dyn TransactionRepository>,
}

impl TransactionService {
    pub fn new(repo: Arc<dyn TransactionRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateTransactionRequest,
    ) -> ServiceResult<Transaction> {
        let new = request.into_new(user_id)?;
        Ok(self.repo.create(new).await?)
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> ServiceResult<Transaction> {
        Ok(self.repo.get(user_id, id).await?)
    }

    /// Narrows by account first, then category, then falls back to everything
    /// the user owns; the remaining filters run in process.
    pub async fn list(
        &self,
        user_id: Uuid,
        filters: &TransactionFilters,
    ) -> ServiceResult<Vec<Transaction>> {
        let filters = filters.parse()?;

        let mut transactions = if let Some(account_id) = filters.account_id {
            self.repo.list_by_account(user_id, account_id).await?
        } else if let Some(category_id) = filters.category_id {
            self.repo.list_by_category(user_id, category_id).await?
        } else {
            self.repo.list_by_user(user_id).await?
        };

        transactions.retain(|t| filters.matches(t));
        Ok(transactions)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: TransactionPatch,
    ) -> ServiceResult<Transaction> {
        let existing = self.repo.get(user_id, id).await?;
        Ok(self.repo.update(patch.merge(&existing)?).await?)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> ServiceResult<()> {
        Ok(self.repo.delete(user_id, id).await?)
    }
}
