use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use workbench_client::{
    ApiError, CsvUpload, InteractionsView, PendingLoad, QueryState, Transport,
};
use workbench_core::time::now_utc;
use workbench_core::{decode_interactions, NewInteraction, QueryPatch};

use crate::app::App;

#[derive(Debug, Clone)]
pub enum Action {
    Search(QueryPatch),
    SetPage(u32),
    Refresh,
    Create(NewInteraction),
    UploadCsv(PathBuf),
    ImportJson(PathBuf),
}

/// Runs one queued action. `redraw` is called once the view shows
/// progress, before any blocking request goes out.
pub fn execute_action<T, R>(
    app: &mut App,
    view: &mut InteractionsView<T>,
    action: Action,
    redraw: &mut R,
) -> Result<()>
where
    T: Transport,
    R: FnMut(&App, &QueryState) -> Result<()>,
{
    match action {
        Action::Search(patch) => {
            let pending = view.begin_search(&patch);
            finish_load(app, view, pending, redraw)?;
        }
        Action::SetPage(page) => {
            let pending = view.begin_page(page);
            finish_load(app, view, pending, redraw)?;
        }
        Action::Refresh => {
            let pending = view.begin_refresh();
            finish_load(app, view, pending, redraw)?;
        }
        Action::Create(record) => {
            app.set_status("Saving interaction...");
            redraw(app, view.state())?;
            let saved = view.client().create_interaction(&record)?;
            match saved.id {
                Some(id) => app.set_status(format!("Created interaction {}", id)),
                None => app.set_status("Created interaction"),
            }
            app.clear_error();
            app.enqueue(Action::Refresh);
        }
        Action::UploadCsv(path) => {
            let upload = CsvUpload::from_path(&path)
                .with_context(|| format!("read {}", path.display()))?;
            app.set_status(format!("Uploading {}...", upload.file_name));
            redraw(app, view.state())?;
            let receipt = view.client().upload_csv(upload)?;
            app.set_status(format!("Ingested {} interactions", receipt.ingested));
            app.clear_error();
            app.enqueue(Action::Refresh);
        }
        Action::ImportJson(path) => {
            let records = read_records(&path)?;
            app.set_status(format!("Importing {} interactions...", records.len()));
            redraw(app, view.state())?;
            for (index, record) in records.iter().enumerate() {
                if let Err(err) = view.client().create_interaction(record) {
                    if index > 0 {
                        app.enqueue(Action::Refresh);
                    }
                    return Err(anyhow::Error::new(err).context(format!(
                        "import stopped after {} of {}",
                        index,
                        records.len()
                    )));
                }
            }
            app.set_status(format!("Imported {} interactions", records.len()));
            app.clear_error();
            app.enqueue(Action::Refresh);
        }
    }
    Ok(())
}

fn finish_load<T, R>(
    app: &mut App,
    view: &mut InteractionsView<T>,
    pending: PendingLoad,
    redraw: &mut R,
) -> Result<()>
where
    T: Transport,
    R: FnMut(&App, &QueryState) -> Result<()>,
{
    let drawn = redraw(app, view.state());
    let result = view.fetch(&pending);
    view.settle(pending, result);
    app.sync(view.state());
    drawn
}

fn read_records(path: &Path) -> Result<Vec<NewInteraction>> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let records = decode_interactions(&text, now_utc())?;
    Ok(records)
}

/// The server's own message when it sent one, else the whole chain.
pub fn describe_error(err: &anyhow::Error) -> String {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ApiError>())
        .and_then(ApiError::server_message)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{:#}", err))
}

#[cfg(test)]
mod tests {
    use super::{describe_error, execute_action, Action};
    use crate::app::App;
    use anyhow::Result;
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use tempfile::TempDir;
    use workbench_client::{
        ApiError, ApiRequest, ApiResponse, InteractionsClient, InteractionsView, Method,
        QueryState, Transport,
    };
    use workbench_core::{CustomerId, InteractionQuery, QueryPatch};

    #[derive(Default)]
    struct Replay {
        responses: RefCell<VecDeque<(u16, Value)>>,
        requests: RefCell<Vec<ApiRequest>>,
    }

    impl Replay {
        fn with(responses: Vec<(u16, Value)>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                requests: RefCell::default(),
            }
        }
    }

    impl Transport for Replay {
        fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
            self.requests.borrow_mut().push(request.clone());
            let (status, body) = self
                .responses
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| ApiError::Transport("connection refused".to_string()))?;
            ApiResponse::new(status, body.to_string()).into_result()
        }
    }

    fn page(number: u32, total: u64) -> Value {
        json!({
            "content": [{
                "id": 1,
                "productId": 1001,
                "customerId": 42,
                "interactionType": "EMAIL",
                "interactionDate": "2025-01-02T10:00:00"
            }],
            "totalElements": total,
            "totalPages": (total + 9) / 10,
            "number": number,
            "size": 10,
            "first": number == 0,
            "last": u64::from(number + 1) * 10 >= total,
            "empty": false
        })
    }

    fn setup(responses: Vec<(u16, Value)>) -> (App, InteractionsView<Replay>) {
        let view = InteractionsView::new(
            InteractionsClient::new(Replay::with(responses)),
            &InteractionQuery::default(),
            10,
        );
        let app = App::new(view.query().clone());
        (app, view)
    }

    fn drain(app: &mut App, view: &mut InteractionsView<Replay>) -> Vec<Result<()>> {
        let mut redraw = |_: &App, _: &QueryState| -> Result<()> { Ok(()) };
        let mut outcomes = Vec::new();
        while let Some(action) = app.next_action() {
            outcomes.push(execute_action(app, view, action, &mut redraw));
        }
        outcomes
    }

    fn params(request: &ApiRequest) -> Vec<(&str, &str)> {
        request
            .params
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect()
    }

    #[test]
    fn initial_load_fills_the_view() {
        let (mut app, mut view) = setup(vec![(200, page(0, 11))]);
        let outcomes = drain(&mut app, &mut view);
        assert!(outcomes.iter().all(|outcome| outcome.is_ok()));
        assert!(!view.loading());
        assert_eq!(view.data().total_elements, 11);
        assert_eq!(app.page.rows, 1);
        assert_eq!(app.page.next, Some(1));
    }

    #[test]
    fn redraw_sees_the_loading_state() {
        let (mut app, mut view) = setup(vec![(200, page(0, 1))]);
        let mut seen = Vec::new();
        while let Some(action) = app.next_action() {
            let mut redraw = |_: &App, state: &QueryState| -> Result<()> {
                seen.push(state.loading);
                Ok(())
            };
            execute_action(&mut app, &mut view, action, &mut redraw).expect("action");
        }
        assert_eq!(seen, vec![true]);
        assert!(!view.loading());
    }

    #[test]
    fn search_then_page_keeps_filters() {
        let (mut app, mut view) = setup(vec![
            (200, page(0, 1)),
            (200, page(0, 11)),
            (200, page(1, 11)),
        ]);
        drain(&mut app, &mut view);

        app.enqueue(Action::Search(QueryPatch {
            customer_id: workbench_core::Field::Set(CustomerId(42)),
            ..QueryPatch::default()
        }));
        app.enqueue(Action::SetPage(1));
        drain(&mut app, &mut view);

        let requests = view.client().transport().requests.borrow().clone();
        assert_eq!(requests.len(), 3);
        assert_eq!(
            params(&requests[2]),
            vec![("customerId", "42"), ("page", "1"), ("size", "10")]
        );
        assert_eq!(app.page.number, 1);
    }

    #[test]
    fn failed_load_keeps_previous_page() {
        let (mut app, mut view) = setup(vec![
            (200, page(0, 1)),
            (500, json!({"error": "database unavailable"})),
        ]);
        drain(&mut app, &mut view);
        app.enqueue(Action::Refresh);
        drain(&mut app, &mut view);

        assert_eq!(view.data().content.len(), 1);
        assert_eq!(view.error(), Some("database unavailable"));
        assert!(!view.loading());
    }

    #[test]
    fn create_reports_and_refreshes() {
        let created = json!({
            "id": 77,
            "productId": 1001,
            "customerId": 42,
            "interactionType": "CHAT",
            "interactionDate": "2025-01-02T10:00:00"
        });
        let (mut app, mut view) = setup(vec![
            (200, page(0, 1)),
            (201, created),
            (200, page(0, 2)),
        ]);
        drain(&mut app, &mut view);

        let record = workbench_core::InteractionForm {
            product_id: "1001".to_string(),
            customer_id: "42".to_string(),
            interaction_type: "CHAT".to_string(),
            ..Default::default()
        }
        .to_new_interaction(workbench_core::time::now_utc())
        .expect("record");
        app.enqueue(Action::Create(record));
        let outcomes = drain(&mut app, &mut view);

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|outcome| outcome.is_ok()));
        assert_eq!(app.status.as_deref(), Some("Created interaction 77"));
        assert_eq!(view.data().total_elements, 2);
    }

    #[test]
    fn rejected_create_surfaces_server_message() {
        let (mut app, mut view) = setup(vec![
            (200, page(0, 1)),
            (400, json!({"error": "productId 1 does not exist"})),
        ]);
        drain(&mut app, &mut view);

        let record = workbench_core::InteractionForm {
            product_id: "1".to_string(),
            customer_id: "42".to_string(),
            interaction_type: "FORM".to_string(),
            ..Default::default()
        }
        .to_new_interaction(workbench_core::time::now_utc())
        .expect("record");
        app.enqueue(Action::Create(record));
        let outcomes = drain(&mut app, &mut view);

        let err = outcomes
            .into_iter()
            .find_map(|outcome| outcome.err())
            .expect("create fails");
        assert_eq!(describe_error(&err), "productId 1 does not exist");
        assert!(app.next_action().is_none());
    }

    #[test]
    fn json_import_creates_each_record() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("batch.json");
        std::fs::write(
            &path,
            r#"[{"productId":1,"customerId":2,"interactionType":"CHAT"},{"productId":3,"customerId":4,"interactionType":"TICKET"}]"#,
        )
        .expect("write json");
        let echo = json!({
            "id": 5,
            "productId": 1,
            "customerId": 2,
            "interactionType": "CHAT",
            "interactionDate": "2025-01-02T10:00:00"
        });
        let (mut app, mut view) = setup(vec![
            (200, page(0, 1)),
            (201, echo.clone()),
            (201, echo),
            (200, page(0, 3)),
        ]);
        drain(&mut app, &mut view);

        app.enqueue(Action::ImportJson(path));
        let outcomes = drain(&mut app, &mut view);
        assert!(outcomes.iter().all(|outcome| outcome.is_ok()));
        assert_eq!(app.status.as_deref(), Some("Imported 2 interactions"));
        assert_eq!(view.client().transport().requests.borrow().len(), 4);
    }

    #[test]
    fn partial_json_import_still_refreshes() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("batch.json");
        std::fs::write(
            &path,
            r#"[{"productId":1,"customerId":2,"interactionType":"CHAT"},{"productId":999,"customerId":4,"interactionType":"FORM"}]"#,
        )
        .expect("write json");
        let echo = json!({
            "id": 5,
            "productId": 1,
            "customerId": 2,
            "interactionType": "CHAT",
            "interactionDate": "2025-01-02T10:00:00"
        });
        let (mut app, mut view) = setup(vec![
            (200, page(0, 1)),
            (201, echo),
            (400, json!({"error": "productId 999 does not exist"})),
            (200, page(0, 2)),
        ]);
        drain(&mut app, &mut view);

        app.enqueue(Action::ImportJson(path));
        let outcomes = drain(&mut app, &mut view);

        assert_eq!(outcomes.len(), 2);
        let err = outcomes[0].as_ref().expect_err("second record rejected");
        assert_eq!(describe_error(err), "productId 999 does not exist");
        assert!(outcomes[1].is_ok());
        assert_eq!(view.data().total_elements, 2);
        let requests = view.client().transport().requests.borrow().clone();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[3].method, Method::Get);
    }

    #[test]
    fn failed_first_import_record_skips_refresh() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("one.json");
        std::fs::write(&path, r#"{"productId":1,"customerId":2,"interactionType":"CHAT"}"#)
            .expect("write json");
        let (mut app, mut view) = setup(vec![
            (200, page(0, 1)),
            (400, json!({"error": "rejected"})),
        ]);
        drain(&mut app, &mut view);

        app.enqueue(Action::ImportJson(path));
        let outcomes = drain(&mut app, &mut view);
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_err());
    }

    #[test]
    fn missing_upload_file_names_the_path() {
        let (mut app, mut view) = setup(vec![(200, page(0, 1))]);
        drain(&mut app, &mut view);

        app.enqueue(Action::UploadCsv("/nonexistent/batch.csv".into()));
        let err = drain(&mut app, &mut view)
            .into_iter()
            .find_map(|outcome| outcome.err())
            .expect("upload fails");
        assert!(describe_error(&err).starts_with("read /nonexistent/batch.csv: "));
    }
}
