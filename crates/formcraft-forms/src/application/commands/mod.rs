//! Command handlers
//!
//! Application services that orchestrate use cases.

use std::sync::Arc;
use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::application::dto::*;
use crate::domain::aggregates::{Form, ResponseRecord};
use crate::domain::services::{self, FormSummary, RawAnswers};
use crate::domain::value_objects::{FormId, OwnerId};
use crate::ports::inbound::{FormUseCases, FormsError, ResponseUseCases};
use crate::ports::outbound::{FormRepository, ResponseRepository};

/// Attempts made at deleting a deleted form's responses before giving up
pub const DEFAULT_CASCADE_ATTEMPTS: u32 = 3;

/// Forms listed on the dashboard
pub const RECENT_FORMS_LIMIT: usize = 5;

/// Load a form only if `owner` created it. Both misses look the same to the caller.
async fn load_owned(
    forms: &dyn FormRepository,
    owner: &OwnerId,
    id: &FormId,
) -> Result<Form, FormsError> {
    forms
        .find_by_id(id)
        .await?
        .filter(|form| form.is_owned_by(owner))
        .ok_or(FormsError::FormNotFound)
}

/// Form application service
pub struct FormService {
    forms: Arc<dyn FormRepository>,
    responses: Arc<dyn ResponseRepository>,
    cascade_attempts: u32,
}

impl FormService {
    pub fn new(forms: Arc<dyn FormRepository>, responses: Arc<dyn ResponseRepository>) -> Self {
        Self {
            forms,
            responses,
            cascade_attempts: DEFAULT_CASCADE_ATTEMPTS,
        }
    }

    pub fn with_cascade_attempts(mut self, attempts: u32) -> Self {
        self.cascade_attempts = attempts.max(1);
        self
    }

    /// Remove every response of a form that is already gone, retrying on store failure.
    async fn cascade_responses(&self, id: &FormId) -> Result<u64, FormsError> {
        let mut attempt = 1;
        loop {
            match self.responses.delete_by_form(id).await {
                Ok(removed) => return Ok(removed),
                Err(e) if attempt < self.cascade_attempts => {
                    warn!(form_id = %id, attempt, error = %e, "response cascade failed, retrying");
                    attempt += 1;
                }
                Err(e) => {
                    error!(form_id = %id, attempts = attempt, error = %e, "response cascade abandoned");
                    return Err(e.into());
                }
            }
        }
    }
}

#[async_trait]
impl FormUseCases for FormService {
    async fn create_form(&self, owner: &OwnerId, command: CreateFormCommand) -> Result<Form, FormsError> {
        let form = Form::create(owner.clone(), command.title, command.template, command.fields)?;
        self.forms.insert(&form).await?;

        info!(form_id = %form.id(), owner = %owner, fields = form.fields().len(), "form created");
        Ok(form)
    }

    async fn update_form(
        &self,
        owner: &OwnerId,
        id: &FormId,
        command: UpdateFormCommand,
    ) -> Result<Form, FormsError> {
        let mut form = load_owned(self.forms.as_ref(), owner, id).await?;
        form.update(command.title, command.template, command.fields)?;
        // deleted since it was loaded
        if !self.forms.save(&form).await? {
            return Err(FormsError::FormNotFound);
        }

        info!(form_id = %id, "form updated");
        Ok(form)
    }

    async fn get_form(&self, id: &FormId) -> Result<Form, FormsError> {
        self.forms.find_by_id(id).await?.ok_or(FormsError::FormNotFound)
    }

    async fn list_forms(&self, owner: &OwnerId) -> Result<Vec<Form>, FormsError> {
        Ok(self.forms.find_by_owner(owner).await?)
    }

    async fn delete_form(&self, owner: &OwnerId, id: &FormId) -> Result<DeletedForm, FormsError> {
        load_owned(self.forms.as_ref(), owner, id).await?;

        // a concurrent delete may have won; its responses still need clearing
        if !self.forms.delete(id).await? {
            warn!(form_id = %id, "form already removed");
        }
        let responses_deleted = self.cascade_responses(id).await?;

        info!(form_id = %id, responses_deleted, "form deleted");
        Ok(DeletedForm {
            form_id: id.clone(),
            responses_deleted,
        })
    }

    async fn dashboard_stats(&self, owner: &OwnerId) -> Result<DashboardStats, FormsError> {
        let forms = self.forms.find_by_owner(owner).await?;

        let mut overviews = Vec::with_capacity(forms.len());
        for form in &forms {
            overviews.push(FormOverview {
                id: form.id().clone(),
                title: form.title().to_string(),
                created_at: form.created_at(),
                response_count: self.responses.count_by_form(form.id()).await?,
            });
        }

        let total_responses = overviews.iter().map(|o| o.response_count).sum();
        overviews.truncate(RECENT_FORMS_LIMIT);

        Ok(DashboardStats {
            total_forms: forms.len() as u64,
            total_responses,
            recent_forms: overviews,
        })
    }
}

/// Response application service
pub struct ResponseService {
    forms: Arc<dyn FormRepository>,
    responses: Arc<dyn ResponseRepository>,
}

impl ResponseService {
    pub fn new(forms: Arc<dyn FormRepository>, responses: Arc<dyn ResponseRepository>) -> Self {
        Self { forms, responses }
    }

    async fn owned_with_responses(
        &self,
        owner: &OwnerId,
        form_id: &FormId,
    ) -> Result<(Form, Vec<ResponseRecord>), FormsError> {
        let form = load_owned(self.forms.as_ref(), owner, form_id).await?;
        let responses = self.responses.find_by_form(form_id).await?;
        Ok((form, responses))
    }
}

#[async_trait]
impl ResponseUseCases for ResponseService {
    async fn submit_response(&self, form_id: &FormId, answers: RawAnswers) -> Result<ResponseRecord, FormsError> {
        let form = self.forms.find_by_id(form_id).await?.ok_or(FormsError::FormNotFound)?;
        let answers = services::validate_answers(&form, &answers)?;

        let response = ResponseRecord::create(form_id.clone(), answers);
        self.responses.insert(&response).await?;

        // a delete that cascaded between the load and the insert leaves this record orphaned
        if self.forms.find_by_id(form_id).await?.is_none() {
            warn!(form_id = %form_id, response_id = %response.id(), "form deleted during submit");
            self.responses.delete_by_form(form_id).await?;
            return Err(FormsError::FormNotFound);
        }

        info!(form_id = %form_id, response_id = %response.id(), "response submitted");
        Ok(response)
    }

    async fn list_responses(&self, owner: &OwnerId, form_id: &FormId) -> Result<Vec<ResponseRecord>, FormsError> {
        let (_, responses) = self.owned_with_responses(owner, form_id).await?;
        Ok(responses)
    }

    async fn form_analytics(&self, owner: &OwnerId, form_id: &FormId) -> Result<FormSummary, FormsError> {
        let (form, responses) = self.owned_with_responses(owner, form_id).await?;
        Ok(services::summarize(&form, &responses))
    }

    async fn export_csv(&self, owner: &OwnerId, form_id: &FormId) -> Result<CsvExport, FormsError> {
        let (form, responses) = self.owned_with_responses(owner, form_id).await?;
        let content = services::to_flat_table(&form, &responses).to_csv()?;

        Ok(CsvExport {
            filename: export_filename(form.title()),
            content,
        })
    }
}

/// `<title>-responses.csv`, with characters unsafe in a header or path replaced.
fn export_filename(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_') { c } else { '_' })
        .collect();
    format!("{}-responses.csv", stem.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::FieldDefinition;
    use crate::domain::value_objects::{Answer, FieldType, Template};
    use crate::infrastructure::persistence::{InMemoryFormRepository, InMemoryResponseRepository};
    use crate::ports::outbound::RepositoryError;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    struct Fixture {
        forms: FormService,
        responses: ResponseService,
        response_repo: Arc<InMemoryResponseRepository>,
    }

    fn fixture() -> Fixture {
        let form_repo = Arc::new(InMemoryFormRepository::new());
        let response_repo = Arc::new(InMemoryResponseRepository::new());
        Fixture {
            forms: FormService::new(form_repo.clone(), response_repo.clone()),
            responses: ResponseService::new(form_repo, response_repo.clone()),
            response_repo,
        }
    }

    fn owner() -> OwnerId {
        OwnerId::new("alice")
    }

    fn survey() -> CreateFormCommand {
        CreateFormCommand {
            title: "Feedback".into(),
            template: None,
            fields: vec![
                FieldDefinition::new("name", FieldType::Text, "Name").required(),
                FieldDefinition::new("score", FieldType::Rating, "Score"),
                FieldDefinition::new("color", FieldType::Radio, "Color").with_options(["Red", "Blue"]),
            ],
        }
    }

    fn raw(value: serde_json::Value) -> RawAnswers {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_form() {
        let f = fixture();
        let form = f.forms.create_form(&owner(), survey()).await.unwrap();
        assert_eq!(form.template(), Template::Minimal);

        let loaded = f.forms.get_form(form.id()).await.unwrap();
        assert_eq!(loaded, form);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_title() {
        let f = fixture();
        let command = CreateFormCommand { title: String::new(), ..survey() };
        let err = f.forms.create_form(&owner(), command).await.unwrap_err();
        assert!(err.is_validation());
        assert!(f.forms.list_forms(&owner()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_requires_owner() {
        let f = fixture();
        let form = f.forms.create_form(&owner(), survey()).await.unwrap();

        let command = UpdateFormCommand { title: Some("Hijacked".into()), ..Default::default() };
        let err = f
            .forms
            .update_form(&OwnerId::new("mallory"), form.id(), command.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, FormsError::FormNotFound));

        let updated = f.forms.update_form(&owner(), form.id(), command).await.unwrap();
        assert_eq!(updated.title(), "Hijacked");
        assert_eq!(updated.fields(), form.fields());
        assert_eq!(f.forms.get_form(form.id()).await.unwrap().title(), "Hijacked");
    }

    #[tokio::test]
    async fn test_update_unknown_form() {
        let f = fixture();
        let err = f
            .forms
            .update_form(&owner(), &FormId::new(), UpdateFormCommand::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FormsError::FormNotFound));
    }

    #[tokio::test]
    async fn test_submit_and_list_responses() {
        let f = fixture();
        let form = f.forms.create_form(&owner(), survey()).await.unwrap();

        let response = f
            .responses
            .submit_response(form.id(), raw(json!({ "name": "Ann", "score": 5, "color": "Red" })))
            .await
            .unwrap();
        assert_eq!(response.answer("score"), Some(&Answer::Rating(5)));

        let listed = f.responses.list_responses(&owner(), form.id()).await.unwrap();
        assert_eq!(listed, vec![response]);

        let err = f
            .responses
            .list_responses(&OwnerId::new("mallory"), form.id())
            .await
            .unwrap_err();
        assert!(matches!(err, FormsError::FormNotFound));
    }

    #[tokio::test]
    async fn test_submit_rejects_missing_required() {
        let f = fixture();
        let form = f.forms.create_form(&owner(), survey()).await.unwrap();

        let err = f.responses.submit_response(form.id(), RawAnswers::new()).await.unwrap_err();
        match err {
            FormsError::InvalidAnswers(rejection) => assert_eq!(rejection.field_ids(), vec!["name"]),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(f.response_repo.count_by_form(form.id()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_submit_to_unknown_form() {
        let f = fixture();
        let err = f
            .responses
            .submit_response(&FormId::new(), raw(json!({ "name": "Ann" })))
            .await
            .unwrap_err();
        assert!(matches!(err, FormsError::FormNotFound));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_responses() {
        let f = fixture();
        let form = f.forms.create_form(&owner(), survey()).await.unwrap();
        let other = f.forms.create_form(&owner(), survey()).await.unwrap();
        for target in [&form, &form, &other] {
            f.responses
                .submit_response(target.id(), raw(json!({ "name": "Ann" })))
                .await
                .unwrap();
        }

        let deleted = f.forms.delete_form(&owner(), form.id()).await.unwrap();
        assert_eq!(deleted.responses_deleted, 2);
        assert!(f.response_repo.find_by_form(form.id()).await.unwrap().is_empty());
        assert_eq!(f.response_repo.count_by_form(other.id()).await.unwrap(), 1);
        assert!(matches!(
            f.forms.get_form(form.id()).await.unwrap_err(),
            FormsError::FormNotFound
        ));
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let f = fixture();
        let form = f.forms.create_form(&owner(), survey()).await.unwrap();
        let err = f.forms.delete_form(&OwnerId::new("mallory"), form.id()).await.unwrap_err();
        assert!(matches!(err, FormsError::FormNotFound));
        assert!(f.forms.get_form(form.id()).await.is_ok());
    }

    /// Fails `delete_by_form` a fixed number of times before delegating.
    struct FlakyResponses {
        inner: InMemoryResponseRepository,
        failures_left: AtomicU32,
    }

    #[async_trait]
    impl ResponseRepository for FlakyResponses {
        async fn insert(&self, response: &ResponseRecord) -> Result<(), RepositoryError> {
            self.inner.insert(response).await
        }

        async fn find_by_form(&self, form_id: &FormId) -> Result<Vec<ResponseRecord>, RepositoryError> {
            self.inner.find_by_form(form_id).await
        }

        async fn count_by_form(&self, form_id: &FormId) -> Result<u64, RepositoryError> {
            self.inner.count_by_form(form_id).await
        }

        async fn delete_by_form(&self, form_id: &FormId) -> Result<u64, RepositoryError> {
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(RepositoryError::ConnectionError("connection reset".into()));
            }
            self.inner.delete_by_form(form_id).await
        }
    }

    async fn flaky_fixture(failures: u32) -> (FormService, ResponseService, Arc<FlakyResponses>) {
        let form_repo = Arc::new(InMemoryFormRepository::new());
        let response_repo = Arc::new(FlakyResponses {
            inner: InMemoryResponseRepository::new(),
            failures_left: AtomicU32::new(failures),
        });
        (
            FormService::new(form_repo.clone(), response_repo.clone()).with_cascade_attempts(3),
            ResponseService::new(form_repo, response_repo.clone()),
            response_repo,
        )
    }

    #[tokio::test]
    async fn test_cascade_retries_until_success() {
        let (forms, responses, repo) = flaky_fixture(2).await;
        let form = forms.create_form(&owner(), survey()).await.unwrap();
        responses
            .submit_response(form.id(), raw(json!({ "name": "Ann" })))
            .await
            .unwrap();

        let deleted = forms.delete_form(&owner(), form.id()).await.unwrap();
        assert_eq!(deleted.responses_deleted, 1);
        assert_eq!(repo.count_by_form(form.id()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cascade_gives_up_after_attempts() {
        let (forms, _, _) = flaky_fixture(5).await;
        let form = forms.create_form(&owner(), survey()).await.unwrap();

        let err = forms.delete_form(&owner(), form.id()).await.unwrap_err();
        assert!(matches!(err, FormsError::Storage(RepositoryError::ConnectionError(_))));
    }

    /// Deletes a form right after handing it out once armed.
    #[derive(Default)]
    struct RacingForms {
        inner: InMemoryFormRepository,
        armed: AtomicBool,
    }

    #[async_trait]
    impl FormRepository for RacingForms {
        async fn insert(&self, form: &Form) -> Result<(), RepositoryError> {
            self.inner.insert(form).await
        }

        async fn find_by_id(&self, id: &FormId) -> Result<Option<Form>, RepositoryError> {
            let found = self.inner.find_by_id(id).await?;
            if found.is_some() && self.armed.swap(false, Ordering::SeqCst) {
                self.inner.delete(id).await?;
            }
            Ok(found)
        }

        async fn find_by_owner(&self, owner: &OwnerId) -> Result<Vec<Form>, RepositoryError> {
            self.inner.find_by_owner(owner).await
        }

        async fn save(&self, form: &Form) -> Result<bool, RepositoryError> {
            self.inner.save(form).await
        }

        async fn delete(&self, id: &FormId) -> Result<bool, RepositoryError> {
            self.inner.delete(id).await
        }
    }

    fn racing_fixture() -> (FormService, ResponseService, Arc<RacingForms>, Arc<InMemoryResponseRepository>) {
        let form_repo = Arc::new(RacingForms::default());
        let response_repo = Arc::new(InMemoryResponseRepository::new());
        (
            FormService::new(form_repo.clone(), response_repo.clone()),
            ResponseService::new(form_repo.clone(), response_repo.clone()),
            form_repo,
            response_repo,
        )
    }

    #[tokio::test]
    async fn test_update_after_concurrent_delete_is_not_found() {
        let (forms, _, repo, _) = racing_fixture();
        let form = forms.create_form(&owner(), survey()).await.unwrap();
        repo.armed.store(true, Ordering::SeqCst);

        let command = UpdateFormCommand {
            title: Some("Renamed".into()),
            ..Default::default()
        };
        let err = forms.update_form(&owner(), form.id(), command).await.unwrap_err();
        assert!(matches!(err, FormsError::FormNotFound));
        assert_eq!(repo.find_by_id(form.id()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_submit_after_concurrent_delete_leaves_no_orphan() {
        let (forms, responses, repo, response_repo) = racing_fixture();
        let form = forms.create_form(&owner(), survey()).await.unwrap();
        repo.armed.store(true, Ordering::SeqCst);

        let err = responses
            .submit_response(form.id(), raw(json!({ "name": "Ann" })))
            .await
            .unwrap_err();
        assert!(matches!(err, FormsError::FormNotFound));
        assert_eq!(response_repo.count_by_form(form.id()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_analytics_and_export() {
        let f = fixture();
        let form = f.forms.create_form(&owner(), survey()).await.unwrap();
        for answers in [
            json!({ "name": "Ann", "score": 5, "color": "Red" }),
            json!({ "name": "Bob", "score": 3 }),
        ] {
            f.responses.submit_response(form.id(), raw(answers)).await.unwrap();
        }

        let summary = f.responses.form_analytics(&owner(), form.id()).await.unwrap();
        assert_eq!(summary.total_responses, 2);
        let ids: Vec<_> = summary.fields.iter().map(|a| a.field_id.as_str()).collect();
        assert_eq!(ids, vec!["score", "color"]);

        let export = f.responses.export_csv(&owner(), form.id()).await.unwrap();
        assert_eq!(export.filename, "Feedback-responses.csv");
        let mut lines = export.content.lines();
        assert_eq!(lines.next(), Some("Submission Date,Name,Score,Color"));
        assert_eq!(lines.count(), 2);
    }

    #[tokio::test]
    async fn test_dashboard_stats() {
        let f = fixture();
        let mut ids = Vec::new();
        for _ in 0..7 {
            ids.push(f.forms.create_form(&owner(), survey()).await.unwrap().id().clone());
        }
        f.forms.create_form(&OwnerId::new("bob"), survey()).await.unwrap();
        f.responses
            .submit_response(&ids[0], raw(json!({ "name": "Ann" })))
            .await
            .unwrap();

        let stats = f.forms.dashboard_stats(&owner()).await.unwrap();
        assert_eq!(stats.total_forms, 7);
        assert_eq!(stats.total_responses, 1);
        assert_eq!(stats.recent_forms.len(), RECENT_FORMS_LIMIT);
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename("Q3/Q4 \"survey\""), "Q3_Q4 _survey_-responses.csv");
    }
}
