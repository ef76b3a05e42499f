//! Fetch/mutate/refresh cycle of one CRUD list screen.
//!
//! # Invariants
//! - Entering `Loading` clears the displayed collection.
//! - Only the response for the newest load generation is applied; older
//!   responses are discarded as stale.
//! - A second `begin_load` while loading is refused; `begin_refresh` always
//!   starts a new generation.
//! - Every failed load or mutation produces exactly one error notification.
//! - Validation failures never reach the transport.
//! - A mutation's outcome is merged into the refreshed list, so a list read
//!   that does not yet reflect the write still shows it.

use crate::api::client::{FetchedList, RecordClient};
use crate::api::envelope::ApiError;
use crate::api::transport::ApiTransport;
use crate::model::record::{AdminRecord, RecordId};
use crate::notify::store::NotificationStore;
use crate::reconcile::{reconcile_with_report, ListFilter, ReconcileReport};
use log::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Create/edit form visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    Creating,
    Editing(RecordId),
}

/// Proof that a load was started; must be handed back on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    pub fn generation(self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { count: usize },
    Failed,
    /// A newer load superseded this response.
    Stale,
    /// Refused by the already-loading guard.
    Skipped,
}

/// Local effect of a successful mutation, merged after the refresh.
enum Settle<R> {
    Upsert(R),
    Remove(RecordId),
    Nothing,
}

pub struct ListScreen<R: AdminRecord> {
    state: LoadState,
    records: Vec<R>,
    visible: Vec<R>,
    filter: ListFilter,
    modal: ModalState,
    generation: u64,
    last_report: ReconcileReport,
}

impl<R: AdminRecord> Default for ListScreen<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: AdminRecord> ListScreen<R> {
    pub fn new() -> Self {
        Self {
            state: LoadState::Idle,
            records: Vec::new(),
            visible: Vec::new(),
            filter: ListFilter::default(),
            modal: ModalState::Closed,
            generation: 0,
            last_report: ReconcileReport::default(),
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// Reconciled collection, ignoring the filter.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Collection as displayed, filter applied.
    pub fn visible(&self) -> &[R] {
        &self.visible
    }

    /// Inline "no data" placeholder condition.
    pub fn shows_empty_placeholder(&self) -> bool {
        !self.is_loading() && self.visible.is_empty()
    }

    /// What the last applied load discarded.
    pub fn last_report(&self) -> ReconcileReport {
        self.last_report
    }

    pub fn filter(&self) -> &ListFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: ListFilter) {
        self.filter = filter;
        self.visible = self.filter.apply(&self.records);
    }

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    pub fn open_create(&mut self) {
        self.modal = ModalState::Creating;
    }

    pub fn open_edit(&mut self, id: RecordId) {
        self.modal = ModalState::Editing(id);
    }

    pub fn close_modal(&mut self) {
        self.modal = ModalState::Closed;
    }

    /// Starts a load unless one is already running.
    pub fn begin_load(&mut self) -> Option<FetchTicket> {
        if self.is_loading() {
            debug!(
                "event=list_load module=screen status=skipped kind={} generation={}",
                R::KIND.plural(),
                self.generation
            );
            return None;
        }
        Some(self.enter_loading())
    }

    /// Starts a load that supersedes any in-flight one.
    pub fn begin_refresh(&mut self) -> FetchTicket {
        self.enter_loading()
    }

    /// Applies the result of the load identified by `ticket`.
    pub fn complete_load(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<R>, ApiError>,
        notifications: &mut NotificationStore,
    ) -> LoadOutcome {
        self.complete_fetch(ticket, result.map(FetchedList::from), notifications)
    }

    /// `complete_load` for payloads that carry a count of unreadable rows.
    ///
    /// Unreadable rows raise one warning notification.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<FetchedList<R>, ApiError>,
        notifications: &mut NotificationStore,
    ) -> LoadOutcome {
        if ticket.generation != self.generation || !self.is_loading() {
            info!(
                "event=list_load module=screen status=stale kind={} generation={} current={}",
                R::KIND.plural(),
                ticket.generation,
                self.generation
            );
            return LoadOutcome::Stale;
        }

        match result {
            Ok(fetched) => {
                let (records, mut report) = reconcile_with_report(fetched.records);
                report.malformed = fetched.malformed;
                self.records = records;
                self.visible = self.filter.apply(&self.records);
                self.state = LoadState::Loaded;
                self.last_report = report;
                info!(
                    "event=list_load module=screen status=ok kind={} generation={} count={} duplicates={} missing_id={} malformed={}",
                    R::KIND.plural(),
                    ticket.generation,
                    report.kept,
                    report.duplicates,
                    report.missing_id,
                    report.malformed
                );
                if report.malformed > 0 {
                    notifications.warning(format!(
                        "{} {} could not be displayed.",
                        report.malformed,
                        R::KIND.plural()
                    ));
                }
                LoadOutcome::Applied { count: report.kept }
            }
            Err(err) => {
                self.clear_collection();
                self.state = LoadState::Failed;
                warn!(
                    "event=list_load module=screen status=error kind={} generation={} error_code={}",
                    R::KIND.plural(),
                    ticket.generation,
                    err.code()
                );
                notifications.error(format!(
                    "Could not load {}: {}",
                    R::KIND.plural(),
                    err.user_message()
                ));
                LoadOutcome::Failed
            }
        }
    }

    /// Loads through `client`, honoring the already-loading guard.
    pub fn load<T: ApiTransport>(
        &mut self,
        client: &RecordClient<T>,
        notifications: &mut NotificationStore,
    ) -> LoadOutcome {
        let Some(ticket) = self.begin_load() else {
            return LoadOutcome::Skipped;
        };
        let result = client.fetch::<R>();
        self.complete_fetch(ticket, result, notifications)
    }

    /// Reloads through `client`, superseding any in-flight load.
    pub fn refresh<T: ApiTransport>(
        &mut self,
        client: &RecordClient<T>,
        notifications: &mut NotificationStore,
    ) -> LoadOutcome {
        let ticket = self.begin_refresh();
        let result = client.fetch::<R>();
        self.complete_fetch(ticket, result, notifications)
    }

    /// Validates and creates `draft`, then refreshes the list.
    pub fn create<T: ApiTransport>(
        &mut self,
        client: &RecordClient<T>,
        draft: &R,
        notifications: &mut NotificationStore,
    ) -> Result<Option<R>, ApiError> {
        self.check_draft(draft, "create", notifications)?;
        let created = self.mutation("create", client.create(draft), notifications)?;
        let settle = created.clone().map_or(Settle::Nothing, Settle::Upsert);
        self.finish_mutation(client, notifications, "created", settle);
        Ok(created)
    }

    /// Validates and updates the record `id`, then refreshes the list.
    pub fn update<T: ApiTransport>(
        &mut self,
        client: &RecordClient<T>,
        id: &RecordId,
        draft: &R,
        notifications: &mut NotificationStore,
    ) -> Result<Option<R>, ApiError> {
        self.check_draft(draft, "update", notifications)?;
        let updated = self.mutation("update", client.update(id, draft), notifications)?;
        let settle = updated.clone().map_or(Settle::Nothing, Settle::Upsert);
        self.finish_mutation(client, notifications, "updated", settle);
        Ok(updated)
    }

    /// Deletes the record `id`, then refreshes the list.
    pub fn delete<T: ApiTransport>(
        &mut self,
        client: &RecordClient<T>,
        id: &RecordId,
        notifications: &mut NotificationStore,
    ) -> Result<(), ApiError> {
        self.mutation("delete", client.delete(R::KIND, id), notifications)?;
        self.finish_mutation(client, notifications, "deleted", Settle::Remove(id.clone()));
        Ok(())
    }

    /// Replaces (or appends) the record carrying the same id as `record`.
    ///
    /// Records without an id are ignored.
    pub fn apply_authoritative(&mut self, record: R) {
        let Some(id) = record.record_id().cloned() else {
            return;
        };
        match self
            .records
            .iter()
            .position(|existing| existing.record_id() == Some(&id))
        {
            Some(index) => self.records[index] = record,
            None => {
                debug!(
                    "event=list_merge module=screen status=ok kind={} reason=record_not_listed",
                    R::KIND.plural()
                );
                self.records.push(record);
            }
        }
        self.visible = self.filter.apply(&self.records);
    }

    fn check_draft(
        &self,
        draft: &R,
        action: &str,
        notifications: &mut NotificationStore,
    ) -> Result<(), ApiError> {
        draft.validate().map_err(|err| {
            debug!(
                "event=record_{action} module=screen status=rejected kind={} reason=validation",
                R::KIND.plural()
            );
            notifications.error(err.to_string());
            ApiError::Validation(err)
        })
    }

    fn mutation<V>(
        &self,
        action: &str,
        result: Result<V, ApiError>,
        notifications: &mut NotificationStore,
    ) -> Result<V, ApiError> {
        result.map_err(|err| {
            warn!(
                "event=record_{action} module=screen status=error kind={} error_code={}",
                R::KIND.plural(),
                err.code()
            );
            notifications.error(format!(
                "Could not {action} {}: {}",
                R::KIND.singular(),
                err.user_message()
            ));
            err
        })
    }

    fn finish_mutation<T: ApiTransport>(
        &mut self,
        client: &RecordClient<T>,
        notifications: &mut NotificationStore,
        past_tense: &str,
        settle: Settle<R>,
    ) {
        info!(
            "event=record_mutation module=screen status=ok kind={} action={past_tense}",
            R::KIND.plural()
        );
        notifications.success(format!("{} {past_tense}.", capitalize(R::KIND.singular())));
        self.close_modal();
        if let LoadOutcome::Applied { .. } = self.refresh(client, notifications) {
            self.settle(settle);
        }
    }

    fn settle(&mut self, settle: Settle<R>) {
        match settle {
            Settle::Upsert(record) => self.apply_authoritative(record),
            Settle::Remove(id) => {
                let before = self.records.len();
                self.records.retain(|record| record.record_id() != Some(&id));
                if self.records.len() != before {
                    debug!(
                        "event=list_merge module=screen status=ok kind={} reason=deleted_row_still_listed",
                        R::KIND.plural()
                    );
                    self.visible = self.filter.apply(&self.records);
                }
            }
            Settle::Nothing => {}
        }
    }

    fn enter_loading(&mut self) -> FetchTicket {
        self.generation += 1;
        self.state = LoadState::Loading;
        self.clear_collection();
        FetchTicket {
            generation: self.generation,
        }
    }

    fn clear_collection(&mut self) {
        self.records.clear();
        self.visible.clear();
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{capitalize, ListScreen, LoadOutcome, LoadState};
    use crate::api::envelope::{ApiError, TransportError};
    use crate::clock::ManualClock;
    use crate::model::customer::Customer;
    use crate::model::record::RecordId;
    use crate::notify::store::NotificationStore;
    use std::sync::Arc;

    fn notifications() -> NotificationStore {
        NotificationStore::new(Arc::new(ManualClock::new(0)))
    }

    fn customer(id: &str, name: &str) -> Customer {
        let mut customer = Customer::draft(name);
        customer.id = RecordId::parse(id);
        customer
    }

    #[test]
    fn guard_refuses_second_load_while_loading() {
        let mut screen = ListScreen::<Customer>::new();
        assert!(screen.begin_load().is_some());
        assert!(screen.begin_load().is_none());
        assert_eq!(screen.state(), LoadState::Loading);
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut screen = ListScreen::<Customer>::new();
        let mut toasts = notifications();
        let first = screen.begin_load().expect("first load");
        let second = screen.begin_refresh();

        let fresh = screen.complete_load(second, Ok(vec![customer("1", "Fresh")]), &mut toasts);
        assert_eq!(fresh, LoadOutcome::Applied { count: 1 });

        let stale = screen.complete_load(first, Ok(vec![customer("2", "Stale")]), &mut toasts);
        assert_eq!(stale, LoadOutcome::Stale);
        assert_eq!(screen.records()[0].name, "Fresh");
    }

    #[test]
    fn entering_loading_clears_previous_rows() {
        let mut screen = ListScreen::<Customer>::new();
        let mut toasts = notifications();
        let ticket = screen.begin_load().expect("load");
        screen.complete_load(ticket, Ok(vec![customer("1", "Ana")]), &mut toasts);
        assert_eq!(screen.visible().len(), 1);

        screen.begin_refresh();
        assert!(screen.records().is_empty());
        assert!(screen.visible().is_empty());
        assert!(!screen.shows_empty_placeholder());
    }

    #[test]
    fn failure_clears_and_notifies_once() {
        let mut screen = ListScreen::<Customer>::new();
        let mut toasts = notifications();
        let ticket = screen.begin_load().expect("load");
        let outcome = screen.complete_load(
            ticket,
            Err(ApiError::from(TransportError::new("Network Error"))),
            &mut toasts,
        );
        assert_eq!(outcome, LoadOutcome::Failed);
        assert_eq!(screen.state(), LoadState::Failed);
        assert!(screen.shows_empty_placeholder());
        assert_eq!(toasts.len(), 1);
        assert!(toasts.visible()[0].message.contains("Network Error"));
    }

    #[test]
    fn authoritative_echo_replaces_matching_row() {
        let mut screen = ListScreen::<Customer>::new();
        let mut toasts = notifications();
        let ticket = screen.begin_load().expect("load");
        screen.complete_load(
            ticket,
            Ok(vec![customer("1", "Ana"), customer("2", "Beto")]),
            &mut toasts,
        );

        screen.apply_authoritative(customer("2", "Beto Ruiz"));
        screen.apply_authoritative(customer("3", "Caro"));
        screen.apply_authoritative(Customer::draft("No id"));

        let names: Vec<&str> = screen.visible().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Ana", "Beto Ruiz", "Caro"]);
    }

    #[test]
    fn capitalize_handles_empty() {
        assert_eq!(capitalize("customer"), "Customer");
        assert_eq!(capitalize(""), "");
    }
}
