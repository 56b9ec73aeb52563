use crate::users_accessor;
use rivet::{Consistency, Session, Value};
use std::sync::Arc;

pub async fn statement(session: Arc<dyn Session>) {
    let accessor = users_accessor(session.clone()).await;
    accessor
        .invoke("delete_user", rivet::args![20i64])
        .expect("Failed to clear user 20");
    accessor
        .invoke("insert_user", rivet::args![20i64, "Erin", "active", None::<String>])
        .expect("Failed to insert Erin");

    // Returned unexecuted
    let mut statement = accessor
        .invoke("rename", rivet::args!["Erika", 20i64])
        .expect("Failed to bind rename")
        .into_statement()
        .expect("rename must return a statement");
    assert!(statement.is_fully_bound());
    assert_eq!(statement.value(0), Some(&Value::Varchar(Some("Erika".into()))));
    assert_eq!(statement.value(1), Some(&Value::Int64(Some(20))));
    assert_eq!(statement.idempotent(), Some(true));
    let erin = accessor
        .invoke("find_user", rivet::args![20i64])
        .expect("Failed to find Erin")
        .into_one::<crate::User>()
        .expect("find_user must return one user");
    assert_eq!(erin.name, "Erin", "A returned statement must not be executed");

    // The caller executes it
    statement.set_consistency(Consistency::LocalQuorum);
    let result = session
        .execute(statement)
        .expect("Failed to execute the rename statement");
    assert_eq!(result.info().consistency, Some(Consistency::LocalQuorum));
    assert_eq!(result.info().idempotent, Some(true));
    let erika = accessor
        .invoke("find_user", rivet::args![20i64])
        .expect("Failed to find Erika")
        .into_one::<crate::User>()
        .expect("find_user must return one user");
    assert_eq!(erika.name, "Erika");

    // Bind failures surface before execution
    assert!(
        accessor
            .invoke("rename", rivet::args!["Erika", "not a number"])
            .is_err()
    );
    accessor
        .invoke("delete_user", rivet::args![20i64])
        .expect("Failed to delete Erika");
}
