use rivet::{
    Accessor, Consistency, ExecutionOptions, MappingManager, MethodDeclaration, Session,
};
use std::sync::Arc;

pub async fn options(session: Arc<dyn Session>) {
    let defaults = ExecutionOptions::from_url("rivet://?consistency=quorum&fetch_size=100")
        .expect("Failed to read the default options");
    let accessor = Accessor::builder(session, MappingManager::new())
        .default_options(defaults)
        .method(
            MethodDeclaration::parse(
                "fn log_event(&self, id: i64, kind: &str)",
                "INSERT INTO events (id, kind) VALUES (?, ?)",
            )
            .expect("Failed to declare log_event"),
        )
        .method(
            MethodDeclaration::parse(
                "fn traced_events(&self, kind: &str) -> ResultSet",
                "SELECT id FROM events WHERE kind = ?",
            )
            .expect("Failed to declare traced_events")
            .options(
                ExecutionOptions::new()
                    .consistency(Consistency::One)
                    .tracing(true),
            ),
        )
        .method(
            MethodDeclaration::parse(
                "fn events(&self, kind: &str) -> ResultSet",
                "SELECT id FROM events WHERE kind = ?",
            )
            .expect("Failed to declare events"),
        )
        .build()
        .await
        .expect("Failed to build the events accessor");
    accessor
        .invoke("log_event", rivet::args![1i64, "login"])
        .expect("Failed to log the event");

    let traced = accessor
        .invoke("traced_events", rivet::args!["login"])
        .expect("Failed to query the traced events")
        .into_result_set()
        .expect("traced_events must return a result set");
    assert!(traced.info().tracing_id.is_some());
    assert_eq!(traced.info().consistency, Some(Consistency::One));
    assert_eq!(traced.info().fetch_size, Some(100));

    let plain = accessor
        .invoke("events", rivet::args!["login"])
        .expect("Failed to query the events")
        .into_result_set()
        .expect("events must return a result set");
    assert!(plain.info().tracing_id.is_none());
    assert_eq!(plain.info().consistency, Some(Consistency::Quorum));
    assert_eq!(plain.len(), 1);
}
