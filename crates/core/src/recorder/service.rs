//! Transaction recorder: orchestrates store, ledger and notifier.

use backoffice_shared::types::{PageRequest, PageResponse};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::details::TransactionDetails;
use super::error::RecorderError;
use super::plan::{Amounts, LoadedFloats, MovementPlanner};
use super::ports::{LedgerPort, TransactionStore};
use super::status::{FloatEffect, GlEffect, StatusService, TransitionAction};
use super::types::{
    DomainTransaction, NewTransaction, NotificationOutcome, PlannedMovement, PostingOutcome,
    RecordOutcome, RecordPlan, RecordRequest, TransactionFilter, TransactionModule,
    TransactionPatch, TransactionStatus,
};
use crate::float::FloatError;
use crate::ledger::{PostingContext, PostingRules};
use crate::notify::{NotificationEvent, Notifier, NotifyError, build_notifications};

/// Parsed details plus loaded floats for one transaction.
struct Prepared {
    details: TransactionDetails,
    floats: LoadedFloats,
}

/// Records domain transactions and drives their lifecycle.
pub struct TransactionRecorder<S, L, N> {
    store: S,
    ledger: L,
    notifier: N,
}

impl<S, L, N> TransactionRecorder<S, L, N>
where
    S: TransactionStore,
    L: LedgerPort,
    N: Notifier,
{
    /// Creates a recorder over the given ports.
    pub const fn new(store: S, ledger: L, notifier: N) -> Self {
        Self {
            store,
            ledger,
            notifier,
        }
    }

    /// Validates and records a new transaction.
    ///
    /// With `settle` the transaction completes immediately: floats move,
    /// the journal is posted and the customer is notified. Without it the
    /// row is stored as `pending` and nothing else happens.
    ///
    /// # Errors
    ///
    /// Returns validation, float or store errors. Ledger and notification
    /// failures are not errors; see [`RecordOutcome`].
    pub async fn record(&self, request: RecordRequest) -> Result<RecordOutcome, RecorderError> {
        let module = request.module;
        let amounts = Amounts {
            amount: request.amount,
            fee: request.fee,
        };
        MovementPlanner::validate_amounts(module, amounts)?;
        let details = TransactionDetails::parse(module, &request.details)?;

        let payment_id = request.payment_float_id.filter(|_| module.uses_payment_float());
        let service_id = module.service_float_type().and(request.service_float_id);
        let floats = self.load_floats(payment_id, service_id).await?;
        MovementPlanner::validate_floats(module, request.branch_id, &floats)?;

        let transition = StatusService::initial(request.settle);
        let movements = if transition.floats == FloatEffect::Apply {
            let plan = MovementPlanner::plan(&details, amounts, &floats);
            MovementPlanner::check_funds(&plan, &floats)?;
            plan
        } else {
            Vec::new()
        };

        let plan = RecordPlan {
            transaction: NewTransaction {
                id: Uuid::now_v7(),
                branch_id: request.branch_id,
                module,
                status: transition.to,
                amount: request.amount,
                fee: request.fee,
                reference: request.reference,
                payment_float_id: payment_id,
                service_float_id: service_id,
                details: request.details,
                notes: request.notes,
                created_by: request.created_by,
            },
            movements,
            consume_card_from: details.card_batch(),
        };

        let (mut transaction, balances) = self.store.insert(plan).await?;
        info!(
            transaction_id = %transaction.id,
            branch_id = %transaction.branch_id,
            module = %module,
            status = %transaction.status,
            "transaction recorded"
        );

        let prepared = Prepared { details, floats };
        let ledger = self
            .apply_ledger(
                transition.ledger,
                &mut transaction,
                Some(&prepared),
                request.created_by,
            )
            .await;
        let notification = self.notify_for(&transaction, transition.to, FloatEffect::None).await;

        Ok(RecordOutcome {
            transaction,
            balances,
            ledger,
            notification,
        })
    }

    /// Completes a pending transaction.
    ///
    /// # Errors
    ///
    /// See [`Self::record`]; also `InvalidTransition` and `Conflict`.
    pub async fn complete(&self, id: Uuid, actor: Uuid) -> Result<RecordOutcome, RecorderError> {
        self.run(id, actor, TransitionAction::Complete).await
    }

    /// Marks a pending transaction as failed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the transaction is pending.
    pub async fn fail(&self, id: Uuid, actor: Uuid) -> Result<RecordOutcome, RecorderError> {
        self.run(id, actor, TransitionAction::Fail).await
    }

    /// Reverses a completed transaction: inverse float movements and a
    /// mirror journal.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the transaction is completed, or
    /// a float error if a float can no longer absorb the inverse movement.
    pub async fn reverse(&self, id: Uuid, actor: Uuid) -> Result<RecordOutcome, RecorderError> {
        self.run(id, actor, TransitionAction::Reverse).await
    }

    /// Soft-deletes a transaction, undoing its money if it was completed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` for an already deleted transaction.
    pub async fn delete(&self, id: Uuid, actor: Uuid) -> Result<RecordOutcome, RecorderError> {
        self.run(id, actor, TransitionAction::Delete).await
    }

    /// Edits a transaction within what its status allows.
    ///
    /// # Errors
    ///
    /// Returns `Immutable`, `FieldLocked`, validation errors or `Conflict`.
    pub async fn update(
        &self,
        id: Uuid,
        patch: TransactionPatch,
    ) -> Result<DomainTransaction, RecorderError> {
        let current = self.get(id).await?;
        StatusService::check_edit(current.status, &patch)?;

        if !patch.money_fields().is_empty() {
            let amounts = Amounts {
                amount: patch.amount.unwrap_or(current.amount),
                fee: patch.fee.unwrap_or(current.fee),
            };
            MovementPlanner::validate_amounts(current.module, amounts)?;

            if let Some(details) = &patch.details {
                let parsed = TransactionDetails::parse(current.module, details)?;
                let before = TransactionDetails::parse(current.module, &current.details)
                    .ok()
                    .and_then(|d| d.card_batch());
                if current.module == TransactionModule::EZwich && parsed.card_batch() != before {
                    return Err(RecorderError::Validation(
                        "batch_id cannot be changed after a card is issued".to_string(),
                    ));
                }
            }
        }

        let updated = self.store.update(current.revision(), &patch).await?;
        info!(transaction_id = %id, status = %updated.status, "transaction updated");
        Ok(updated)
    }

    /// Fetches one transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist.
    pub async fn get(&self, id: Uuid) -> Result<DomainTransaction, RecorderError> {
        self.store
            .find(id)
            .await?
            .ok_or(RecorderError::NotFound(id))
    }

    /// Lists transactions.
    ///
    /// # Errors
    ///
    /// Returns store errors.
    pub async fn list(
        &self,
        filter: &TransactionFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<DomainTransaction>, RecorderError> {
        if let (Some(from), Some(to)) = (filter.from, filter.to)
            && from > to
        {
            return Err(RecorderError::Validation(format!(
                "Invalid date range: {from} is after {to}"
            )));
        }
        let (items, total) = self.store.list(filter, page).await?;
        Ok(PageResponse::new(items, page.page, page.per_page, total))
    }

    async fn run(
        &self,
        id: Uuid,
        actor: Uuid,
        action: TransitionAction,
    ) -> Result<RecordOutcome, RecorderError> {
        let current = self.get(id).await?;
        let transition = StatusService::transition(current.status, action)?;

        let prepared = if transition.floats == FloatEffect::None && transition.ledger != GlEffect::Post
        {
            None
        } else {
            Some(self.prepare(&current).await?)
        };

        let movements: Vec<PlannedMovement> = match (&prepared, transition.floats) {
            (Some(p), FloatEffect::Apply) => {
                MovementPlanner::plan(&p.details, amounts_of(&current), &p.floats)
            }
            (Some(p), FloatEffect::Inverse) => MovementPlanner::inverse(&MovementPlanner::plan(
                &p.details,
                amounts_of(&current),
                &p.floats,
            )),
            _ => Vec::new(),
        };
        if let Some(p) = &prepared {
            MovementPlanner::check_funds(&movements, &p.floats)?;
        }

        let (mut transaction, balances) = self
            .store
            .transition(current.revision(), transition.to, &movements)
            .await?;
        info!(
            transaction_id = %id,
            from = %current.status,
            to = %transaction.status,
            actor = %actor,
            action = %action,
            "transaction status changed"
        );

        let ledger = self
            .apply_ledger(transition.ledger, &mut transaction, prepared.as_ref(), actor)
            .await;
        let notification = self
            .notify_for(&transaction, transition.to, transition.floats)
            .await;

        Ok(RecordOutcome {
            transaction,
            balances,
            ledger,
            notification,
        })
    }

    async fn prepare(&self, transaction: &DomainTransaction) -> Result<Prepared, RecorderError> {
        let details = TransactionDetails::parse(transaction.module, &transaction.details)?;
        let floats = self
            .load_floats(transaction.payment_float_id, transaction.service_float_id)
            .await?;
        MovementPlanner::validate_floats(transaction.module, transaction.branch_id, &floats)?;
        Ok(Prepared { details, floats })
    }

    async fn load_floats(
        &self,
        payment: Option<Uuid>,
        service: Option<Uuid>,
    ) -> Result<LoadedFloats, RecorderError> {
        let mut floats = LoadedFloats::default();
        if let Some(id) = payment {
            floats.payment = Some(
                self.store
                    .load_float(id)
                    .await?
                    .ok_or(FloatError::NotFound(id))?,
            );
        }
        if let Some(id) = service {
            floats.service = Some(
                self.store
                    .load_float(id)
                    .await?
                    .ok_or(FloatError::NotFound(id))?,
            );
        }
        Ok(floats)
    }

    /// Ledger step. Never fails the caller.
    async fn apply_ledger(
        &self,
        effect: GlEffect,
        transaction: &mut DomainTransaction,
        prepared: Option<&Prepared>,
        actor: Uuid,
    ) -> PostingOutcome {
        match effect {
            GlEffect::None => PostingOutcome::Skipped {
                reason: format!("no ledger effect for {} transaction", transaction.status),
            },
            GlEffect::Post => {
                let Some(p) = prepared else {
                    return skipped("transaction details unavailable");
                };
                let Some(event) =
                    MovementPlanner::ledger_event(&p.details, amounts_of(transaction), &p.floats)
                else {
                    return skipped("no payment float to post against");
                };

                let context = posting_context(transaction, event.kind(), actor);
                let draft = PostingRules::draft(&event, context);
                if draft.is_empty() {
                    return skipped("nothing to post");
                }

                match self.ledger.post(draft).await {
                    Ok(gl_transaction_id) => {
                        if let Err(e) = self
                            .store
                            .link_journal(transaction.id, gl_transaction_id)
                            .await
                        {
                            warn!(
                                transaction_id = %transaction.id,
                                gl_transaction_id = %gl_transaction_id,
                                error = %e,
                                "failed to link journal to transaction"
                            );
                        } else {
                            transaction.gl_transaction_id = Some(gl_transaction_id);
                        }
                        PostingOutcome::Posted { gl_transaction_id }
                    }
                    Err(e) => {
                        warn!(
                            transaction_id = %transaction.id,
                            error = %e,
                            "GL posting failed, transaction kept"
                        );
                        PostingOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            }
            GlEffect::Reverse => {
                let Some(original) = transaction.gl_transaction_id else {
                    return skipped("transaction has no posted journal to reverse");
                };
                let mut context = posting_context(transaction, "reversal", actor);
                context.description = format!("Reversal of {}", context.description);
                context.metadata["reverses"] = json!(original);

                match self.ledger.reverse(original, context).await {
                    Ok(gl_transaction_id) => PostingOutcome::Posted { gl_transaction_id },
                    Err(e) => {
                        warn!(
                            transaction_id = %transaction.id,
                            gl_transaction_id = %original,
                            error = %e,
                            "GL reversal failed, transaction kept"
                        );
                        PostingOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            }
        }
    }

    /// Notification step. Never fails the caller.
    async fn notify_for(
        &self,
        transaction: &DomainTransaction,
        to: TransactionStatus,
        floats: FloatEffect,
    ) -> NotificationOutcome {
        let event = match (to, floats) {
            (_, FloatEffect::Inverse) => NotificationEvent::Reversed,
            (TransactionStatus::Completed, _) => NotificationEvent::Completed,
            _ => return NotificationOutcome::Skipped,
        };

        let messages = build_notifications(transaction, event);
        let mut sent = 0;
        let mut first_error = None;
        for message in &messages {
            match self.notifier.send(message).await {
                Ok(()) => sent += 1,
                Err(NotifyError::Disabled(channel)) => {
                    debug!(transaction_id = %transaction.id, ?channel, "notification channel disabled");
                }
                Err(e) => {
                    warn!(
                        transaction_id = %transaction.id,
                        channel = ?message.channel,
                        error = %e,
                        "notification failed"
                    );
                    if first_error.is_none() {
                        first_error = Some(e.to_string());
                    }
                }
            }
        }

        match first_error {
            Some(error) => NotificationOutcome::Failed { error },
            None if sent > 0 => NotificationOutcome::Sent { count: sent },
            None => NotificationOutcome::Skipped,
        }
    }
}

const fn amounts_of(transaction: &DomainTransaction) -> Amounts {
    Amounts {
        amount: transaction.amount,
        fee: transaction.fee,
    }
}

fn skipped(reason: &str) -> PostingOutcome {
    PostingOutcome::Skipped {
        reason: reason.to_string(),
    }
}

fn posting_context(transaction: &DomainTransaction, kind: &str, actor: Uuid) -> PostingContext {
    let reference = transaction
        .reference
        .clone()
        .unwrap_or_else(|| transaction.id.to_string());
    PostingContext {
        source_module: transaction.module.as_str().to_string(),
        source_transaction_id: Some(transaction.id),
        source_transaction_type: kind.to_string(),
        description: format!("{} {kind} {reference}", transaction.module),
        date: Utc::now().date_naive(),
        branch_id: transaction.branch_id,
        created_by: actor,
        metadata: json!({
            "amount": transaction.amount,
            "fee": transaction.fee,
            "reference": transaction.reference,
        }),
    }
}
