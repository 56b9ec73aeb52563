#[cfg(test)]
mod tests {
    use rivet_core::{
        Accessor, MappingManager, MethodDeclaration, ResultSet, Session, Value, args,
    };
    use rivet_memory::MemorySession;
    use rivet_tests::{execute_tests, init_logs, silent_logs};
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[tokio::test]
    async fn memory() {
        init_logs();
        execute_tests(Arc::new(MemorySession::new())).await;
    }

    #[tokio::test]
    async fn prepares_once() {
        init_logs();
        let session = MemorySession::new();
        let accessor = Accessor::builder(Arc::new(session.clone()), MappingManager::new())
            .method(
                MethodDeclaration::parse(
                    "fn touch(&self, id: i64)",
                    "INSERT INTO touched (id) VALUES (?)",
                )
                .expect("Failed to declare touch"),
            )
            .build()
            .await
            .expect("Failed to build the accessor");
        for id in 0..5i64 {
            accessor
                .invoke("touch", args![id])
                .expect("Failed to invoke touch");
        }
        assert_eq!(session.prepared_count().unwrap(), 1);
        assert_eq!(session.executed().unwrap().len(), 5);
        assert_eq!(session.rows("touched").unwrap().len(), 5);
    }

    #[tokio::test]
    async fn handler() {
        init_logs();
        let session = MemorySession::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        session
            .on("CALL refresh_stats(?, :scope)", move |statement| {
                counter.fetch_add(1, Ordering::Relaxed);
                assert_eq!(statement.value(0), Some(&Value::Int32(Some(7))));
                assert_eq!(
                    statement.value_of("scope"),
                    Some(&Value::Varchar(Some("global".into())))
                );
                Ok(ResultSet::empty())
            })
            .unwrap();
        let prepared = session
            .prepare("CALL refresh_stats(?, :scope)")
            .await
            .expect("Failed to prepare the call");
        assert_eq!(prepared.variables().len(), 2);
        assert_eq!(prepared.variables().get(0).unwrap().name, "0");
        let mut statement = prepared.bind();
        statement
            .bind_index(0, Value::Int32(Some(7)), &Value::Int32(None))
            .unwrap()
            .bind_name("scope", "global".into(), &Value::Varchar(None))
            .unwrap();
        session.execute(statement).expect("Failed to run the call");
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn unknown_statement() {
        init_logs();
        let session = MemorySession::new();
        let prepared = session
            .prepare("MERGE INTO users USING staged ON users.id = staged.id")
            .await
            .expect("Unknown statements can still be prepared");
        assert!(prepared.variables().is_empty());
        silent_logs! {
            assert!(session.execute(prepared.bind()).is_err());
        }
    }

    #[tokio::test]
    async fn unknown_table() {
        init_logs();
        let session = MemorySession::new();
        let prepared = session
            .prepare("SELECT * FROM missing WHERE id = ?")
            .await
            .unwrap();
        let mut statement = prepared.bind();
        statement
            .bind_index(0, Value::Int64(Some(1)), &Value::Int64(None))
            .unwrap();
        silent_logs! {
            assert!(session.execute(statement).is_err());
        }
        let prepared = session
            .prepare("DELETE FROM missing")
            .await
            .unwrap();
        assert!(session.execute(prepared.bind()).is_ok());
    }

    #[tokio::test]
    async fn unbound_variable() {
        init_logs();
        let session = MemorySession::new();
        let insert = session
            .prepare("INSERT INTO items (id, label) VALUES (1, 'first')")
            .await
            .unwrap();
        session.execute(insert.bind()).unwrap();
        let select = session
            .prepare("SELECT label FROM items WHERE id = ?")
            .await
            .unwrap();
        silent_logs! {
            assert!(session.execute(select.bind()).is_err());
        }
        let mut statement = select.bind();
        statement
            .bind_name("id", Value::Int32(Some(1)), &Value::Int32(None))
            .unwrap();
        let result = session.execute(statement).unwrap();
        let row = result.rows().next().expect("Expected one row");
        assert_eq!(row.get::<String>("label").unwrap(), "first");
    }

    #[tokio::test]
    async fn async_execution() {
        init_logs();
        let session = MemorySession::new();
        let insert = session
            .prepare("INSERT INTO flags (name, enabled) VALUES (:name, TRUE)")
            .await
            .unwrap();
        let mut statement = insert.bind();
        statement
            .bind_name("name", "dark_mode".into(), &Value::Varchar(None))
            .unwrap();
        let future = session.execute_async(statement);
        assert!(session.rows("flags").unwrap().is_empty());
        future.await.expect("Failed to insert the flag");
        let rows = session.rows("flags").unwrap();
        assert_eq!(
            rows[0].as_ref(),
            [
                Value::Varchar(Some("dark_mode".into())),
                Value::Boolean(Some(true))
            ]
        );
    }
}
