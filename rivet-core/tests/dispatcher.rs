#[cfg(test)]
mod tests {
    use rivet_core::{
        BindingCompiler, BoundStatement, Consistency, Entity, Error, ExecutionOptions,
        MappingManager, MethodDescriptor, ParameterSpec, PreparedStatement, Result,
        ResultSet, RowLabeled, Session, Value, VariableDef, args,
        future::{self, BoxFuture, FutureExt},
    };
    use std::sync::{Arc, Mutex};
    use tokio::sync::oneshot;

    #[derive(Debug, PartialEq)]
    struct User {
        id: i32,
        name: String,
    }

    impl Entity for User {
        fn from_row(row: RowLabeled) -> Result<Self> {
            Ok(User {
                id: row.get("id")?,
                name: row.get("name")?,
            })
        }
    }

    /// Answers every execution with the same rows, or with an error when `failure` is set.
    #[derive(Default)]
    struct CannedSession {
        rows: Vec<(i32, &'static str)>,
        failure: Option<&'static str>,
        executed: Mutex<Vec<BoundStatement>>,
        gate: Mutex<Option<oneshot::Receiver<()>>>,
    }

    impl CannedSession {
        fn with_rows(rows: &[(i32, &'static str)]) -> Self {
            Self {
                rows: rows.to_vec(),
                ..Default::default()
            }
        }
        fn result(&self) -> Result<ResultSet> {
            if let Some(failure) = self.failure {
                return Err(Error::msg(failure));
            }
            Ok(ResultSet::new(
                ["id".to_string(), "name".to_string()].into(),
                self.rows.iter().map(|(id, name)| {
                    vec![Value::Int32(Some(*id)), Value::Varchar(Some(name.to_string()))].into_boxed_slice()
                }),
            ))
        }
        fn executed(&self) -> usize {
            self.executed.lock().unwrap().len()
        }
    }

    impl Session for CannedSession {
        fn prepare<'s>(&'s self, query: &'s str) -> BoxFuture<'s, Result<PreparedStatement>> {
            let variables = query
                .split_whitespace()
                .filter_map(|v| v.strip_prefix(':'))
                .map(|v| VariableDef::new(v, Value::Null));
            future::ready(Ok(PreparedStatement::new(query, variables.collect()))).boxed()
        }
        fn execute(&self, statement: BoundStatement) -> Result<ResultSet> {
            self.executed.lock().unwrap().push(statement);
            self.result()
        }
        fn execute_async(&self, statement: BoundStatement) -> BoxFuture<'static, Result<ResultSet>> {
            let result = self.execute(statement);
            let gate = self.gate.lock().unwrap().take();
            async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                result
            }
            .boxed()
        }
    }

    async fn binding(
        session: Arc<CannedSession>,
        signature: &str,
        query: &str,
        parameters: &[ParameterSpec],
    ) -> rivet_core::CompiledBinding {
        let mut mapping = MappingManager::new();
        mapping.register::<User>();
        let prepared = session.prepare(query).await.unwrap();
        BindingCompiler::new(session, Arc::new(mapping))
            .compile(
                &MethodDescriptor::parse(signature).unwrap(),
                prepared,
                parameters,
                ExecutionOptions::new(),
            )
            .unwrap()
    }

    #[tokio::test]
    async fn find_user() {
        let session = Arc::new(CannedSession::with_rows(&[(42, "Ann")]));
        let binding = binding(
            session.clone(),
            "fn find_user(&self, id: i32) -> User",
            "SELECT * FROM users WHERE id = :id",
            &[],
        )
        .await;
        let user: User = binding
            .invoke(args![42])
            .unwrap()
            .into_one()
            .unwrap();
        assert_eq!(
            user,
            User {
                id: 42,
                name: "Ann".into()
            }
        );
        let executed = session.executed.lock().unwrap();
        assert_eq!(executed.len(), 1);
        assert_eq!(executed[0].value(0), Some(&Value::Int32(Some(42))));
    }

    #[tokio::test]
    async fn find_user_cardinality() {
        let session = Arc::new(CannedSession::with_rows(&[]));
        let binding = binding(
            session.clone(),
            "fn find_user(&self, id: i32) -> User",
            "SELECT * FROM users WHERE id = :id",
            &[],
        )
        .await;
        assert!(binding.invoke(args![1]).is_err());
        let session = Arc::new(CannedSession::with_rows(&[(1, "Ann"), (1, "Bea")]));
        let binding = self::binding(
            session,
            "fn find_user(&self, id: i32) -> User",
            "SELECT * FROM users WHERE id = :id",
            &[],
        )
        .await;
        assert!(binding.invoke(args![1]).is_err());
    }

    #[tokio::test]
    async fn find_all_in_order() {
        let session = Arc::new(CannedSession::with_rows(&[(3, "Cy"), (1, "Ann"), (2, "Bea")]));
        let binding = binding(
            session,
            "fn by_status(&self, status: &str) -> Vec<User>",
            "SELECT * FROM users WHERE status = :status",
            &[ParameterSpec::named("status")],
        )
        .await;
        let users: Vec<User> = binding
            .invoke(args!["active"])
            .unwrap()
            .into_all()
            .unwrap();
        assert_eq!(users.iter().map(|v| v.id).collect::<Vec<_>>(), [3, 1, 2]);
    }

    #[tokio::test]
    async fn raw_shapes() {
        let session = Arc::new(CannedSession::with_rows(&[(1, "Ann")]));
        let raw = binding(
            session.clone(),
            "fn raw(&self, id: i32) -> ResultSet",
            "SELECT * FROM users WHERE id = :id",
            &[],
        )
        .await;
        assert_eq!(raw.invoke(args![1]).unwrap().into_result_set().unwrap().len(), 1);
        let void = binding(
            session.clone(),
            "fn touch(&self, id: i32)",
            "UPDATE users SET touched = TRUE WHERE id = :id",
            &[],
        )
        .await;
        void.invoke(args![1]).unwrap().into_unit().unwrap();
        assert_eq!(session.executed(), 2);
        let statement = binding(
            session.clone(),
            "fn prepare_touch(&self, id: i32) -> BoundStatement",
            "UPDATE users SET touched = TRUE WHERE id = :id",
            &[],
        )
        .await;
        let statement = statement.invoke(args![1]).unwrap().into_statement().unwrap();
        assert!(statement.is_fully_bound());
        assert_eq!(session.executed(), 2, "Statements are returned unexecuted");
        assert!(raw.invoke(args![1]).unwrap().into_statement().is_err());
    }

    #[tokio::test]
    async fn pending_does_not_block() {
        let (sender, receiver) = oneshot::channel();
        let session = Arc::new(CannedSession {
            rows: vec![(1, "Ann"), (2, "Bea")],
            gate: Mutex::new(Some(receiver)),
            ..Default::default()
        });
        let binding = binding(
            session,
            "async fn by_status(&self, status: &str) -> Vec<User>",
            "SELECT * FROM users WHERE status = :status",
            &[],
        )
        .await;
        let mut pending = binding
            .invoke(args!["active"])
            .unwrap()
            .into_pending()
            .unwrap();
        assert!((&mut pending).now_or_never().is_none());
        sender.send(()).unwrap();
        let users: Vec<User> = pending.await.unwrap().into_all().unwrap();
        assert_eq!(users.len(), 2);
    }

    #[tokio::test]
    async fn runtime_errors() {
        let session = Arc::new(CannedSession {
            failure: Some("Connection reset"),
            ..Default::default()
        });
        let sync = binding(
            session.clone(),
            "fn find_user(&self, id: i32) -> User",
            "SELECT * FROM users WHERE id = :id",
            &[],
        )
        .await;
        let error = sync.invoke(args![1]).unwrap_err();
        assert!(format!("{:#}", error).contains("Connection reset"));
        let pending = binding(
            session,
            "fn find_user(&self, id: i32) -> Pending<User>",
            "SELECT * FROM users WHERE id = :id",
            &[],
        )
        .await;
        let error = pending
            .invoke(args![1])
            .unwrap()
            .into_pending()
            .unwrap()
            .await
            .unwrap_err();
        assert!(format!("{:#}", error).contains("Connection reset"));
    }

    #[tokio::test]
    async fn arguments() {
        let session = Arc::new(CannedSession::with_rows(&[(1, "Ann")]));
        let binding = binding(
            session.clone(),
            "fn find_user(&self, id: i32) -> User",
            "SELECT * FROM users WHERE id = :id",
            &[],
        )
        .await;
        assert!(binding.invoke(args![]).is_err());
        assert!(binding.invoke(args![1, 2]).is_err());
        assert!(binding.invoke(args!["one"]).is_err());
        assert!(binding.invoke(args![5_000_000_000i64]).is_err());
        assert_eq!(session.executed(), 0);
        let statement = binding.bind(args![7i64]).unwrap();
        assert_eq!(statement.value(0), Some(&Value::Int32(Some(7))));
    }

    #[tokio::test]
    async fn duplicated_names() {
        let session = Arc::new(CannedSession::with_rows(&[]));
        let binding = binding(
            session,
            "fn between(&self, bound: i32) -> BoundStatement",
            "SELECT * FROM t WHERE a > :bound AND b < :bound",
            &[ParameterSpec::named("bound")],
        )
        .await;
        let statement = binding.bind(args![10]).unwrap();
        assert_eq!(statement.values(), [Some(Value::Int32(Some(10))), Some(Value::Int32(Some(10)))]);
    }

    #[tokio::test]
    async fn options() {
        let session = Arc::new(CannedSession::with_rows(&[]));
        let mut mapping = MappingManager::new();
        mapping.register::<User>();
        let method = MethodDescriptor::parse("fn all(&self) -> BoundStatement").unwrap();
        let prepared = session.prepare("SELECT * FROM users").await.unwrap();
        let binding = BindingCompiler::new(session, Arc::new(mapping))
            .compile(
                &method,
                prepared,
                &[],
                ExecutionOptions::new()
                    .consistency(Consistency::LocalQuorum)
                    .fetch_size(250)
                    .tracing(true),
            )
            .unwrap();
        let statement = binding.invoke(args![]).unwrap().into_statement().unwrap();
        assert_eq!(statement.consistency(), Some(Consistency::LocalQuorum));
        assert_eq!(statement.fetch_size(), Some(250));
        assert!(statement.is_tracing());
        assert_eq!(statement.idempotent(), None);
    }

    #[tokio::test]
    async fn sync_and_pending_bind_alike() {
        let session = Arc::new(CannedSession::with_rows(&[(1, "Ann")]));
        let mut mapping = MappingManager::new();
        mapping.register::<User>();
        let compiler = BindingCompiler::new(session.clone(), Arc::new(mapping));
        let options = ExecutionOptions::new()
            .consistency(Consistency::Quorum)
            .fetch_size(64)
            .tracing(true);
        let query = "SELECT * FROM users WHERE status = :status AND age > :age";
        let mut bindings = Vec::new();
        for signature in [
            "fn by_status(&self, age: i64, status: &str) -> Vec<User>",
            "fn by_status(&self, age: i64, status: &str) -> Pending<Vec<User>>",
        ] {
            let prepared = session.prepare(query).await.unwrap();
            bindings.push(
                compiler
                    .compile(
                        &MethodDescriptor::parse(signature).unwrap(),
                        prepared,
                        &[ParameterSpec::named("age"), ParameterSpec::named("status")],
                        options,
                    )
                    .unwrap(),
            );
        }
        let (sync, pending) = (&bindings[0], &bindings[1]);
        let users: Vec<User> = sync.invoke(args![30, "active"]).unwrap().into_all().unwrap();
        assert_eq!(users.len(), 1);
        let users: Vec<User> = pending
            .invoke(args![30, "active"])
            .unwrap()
            .into_pending()
            .unwrap()
            .await
            .unwrap()
            .into_all()
            .unwrap();
        assert_eq!(users.len(), 1);
        let executed = session.executed.lock().unwrap();
        assert_eq!(executed.len(), 2);
        let (a, b) = (&executed[0], &executed[1]);
        assert_eq!(a.query(), b.query());
        assert_eq!(
            a.values(),
            [
                Some(Value::Varchar(Some("active".into()))),
                Some(Value::Int64(Some(30))),
            ]
        );
        assert_eq!(a.values(), b.values());
        assert_eq!(a.consistency(), Some(Consistency::Quorum));
        assert_eq!(a.consistency(), b.consistency());
        assert_eq!(a.fetch_size(), Some(64));
        assert_eq!(a.fetch_size(), b.fetch_size());
        assert!(a.is_tracing() && b.is_tracing());
        assert_eq!(a.idempotent(), b.idempotent());
    }

    #[test]
    fn short_row_is_an_error() {
        let row = ResultSet::new(
            ["id".to_string(), "name".to_string()].into(),
            [vec![Value::Int32(Some(1))].into_boxed_slice()],
        )
        .one()
        .unwrap();
        assert_eq!(row.get::<i32>("id").unwrap(), 1);
        assert!(row.get_column("name").is_none());
        assert!(row.get::<String>("name").is_err());
        assert!(User::from_row(row).is_err());
    }

    #[tokio::test]
    async fn concurrent_invocations() {
        let session = Arc::new(CannedSession::with_rows(&[(1, "Ann")]));
        let binding = Arc::new(
            binding(
                session.clone(),
                "fn find_user(&self, id: i32) -> User",
                "SELECT * FROM users WHERE id = :id",
                &[],
            )
            .await,
        );
        let tasks = (0..8)
            .map(|i| {
                let binding = binding.clone();
                tokio::spawn(async move { binding.invoke(args![i]).map(|v| v.is_pending()) })
            })
            .collect::<Vec<_>>();
        for task in tasks {
            assert!(!task.await.unwrap().unwrap());
        }
        assert_eq!(session.executed(), 8);
    }
}
