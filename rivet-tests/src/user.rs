use crate::silent_logs;
use indoc::indoc;
use rivet::{
    Accessor, Entity, ExecutionOptions, MappingManager, MethodDeclaration, ParameterSpec, Result,
    RowLabeled, Session,
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub email: Option<String>,
}

impl Entity for User {
    fn from_row(row: RowLabeled) -> Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            status: row.get("status")?,
            email: row.get("email")?,
        })
    }
}

/// The accessor every user scenario runs against.
pub async fn users_accessor(session: Arc<dyn Session>) -> Accessor {
    let mut mapping = MappingManager::new();
    mapping.register::<User>();
    Accessor::builder(session, mapping)
        .method(
            MethodDeclaration::parse(
                "fn insert_user(&self, id: i64, name: &str, status: &str, email: Option<&str>)",
                "INSERT INTO users (id, name, status, email) VALUES (?, ?, ?, ?)",
            )
            .expect("Failed to declare insert_user"),
        )
        .method(
            MethodDeclaration::parse(
                "fn find_user(&self, id: i64) -> User",
                "SELECT * FROM users WHERE id = ?",
            )
            .expect("Failed to declare find_user"),
        )
        .method(
            MethodDeclaration::parse(
                "fn find_by_status(&self, status: &str) -> Vec<User>",
                "SELECT * FROM users WHERE status = :status",
            )
            .expect("Failed to declare find_by_status")
            .parameters([ParameterSpec::named("status")]),
        )
        .method(
            MethodDeclaration::parse(
                "async fn find_user_async(&self, id: i64) -> User",
                "SELECT * FROM users WHERE id = ?",
            )
            .expect("Failed to declare find_user_async"),
        )
        .method(
            MethodDeclaration::parse(
                "fn find_users_async(&self, status: &str) -> Pending<Vec<User>>",
                "SELECT * FROM users WHERE status = :status",
            )
            .expect("Failed to declare find_users_async")
            .parameters([ParameterSpec::named("status")]),
        )
        .method(
            MethodDeclaration::parse(
                "fn names(&self, status: &str, limit: i32) -> ResultSet",
                "SELECT name FROM users WHERE status = ? LIMIT ?",
            )
            .expect("Failed to declare names"),
        )
        .method(
            MethodDeclaration::parse(
                "fn names_async(&self, status: &str) -> ResultSetFuture",
                "SELECT name FROM users WHERE status = ?",
            )
            .expect("Failed to declare names_async"),
        )
        .method(
            MethodDeclaration::parse(
                "fn rename(&self, name: &str, id: i64) -> BoundStatement",
                "UPDATE users SET name = ? WHERE id = ?",
            )
            .expect("Failed to declare rename")
            .options(ExecutionOptions::new().idempotent(true)),
        )
        .method(
            MethodDeclaration::parse(
                "fn set_status(&self, status: &str, id: i64)",
                indoc! {"
                    UPDATE users
                    SET status = :status
                    WHERE id = :id
                "},
            )
            .expect("Failed to declare set_status")
            .parameters([ParameterSpec::named("status"), ParameterSpec::named("id")]),
        )
        .method(
            MethodDeclaration::parse(
                "fn delete_user(&self, id: i64)",
                "DELETE FROM users WHERE id = ?",
            )
            .expect("Failed to declare delete_user"),
        )
        .build()
        .await
        .expect("Failed to build the users accessor")
}

pub async fn users(session: Arc<dyn Session>) {
    let accessor = users_accessor(session).await;

    // Setup
    for id in 1..=3 {
        accessor
            .invoke("delete_user", rivet::args![id as i64])
            .expect("Failed to clear the users table");
    }
    accessor
        .invoke(
            "insert_user",
            rivet::args![1i64, "Alice", "active", Some("alice@example.com".to_string())],
        )
        .expect("Failed to insert Alice")
        .into_unit()
        .expect("insert_user must return unit");
    accessor
        .invoke("insert_user", rivet::args![2i64, "Bob", "inactive", None::<String>])
        .expect("Failed to insert Bob");
    accessor
        .invoke("insert_user", rivet::args![3i64, "Carol", "active", None::<String>])
        .expect("Failed to insert Carol");

    // Single entity
    let alice: User = accessor
        .invoke("find_user", rivet::args![1i64])
        .expect("Failed to find Alice")
        .into_one()
        .expect("find_user must return one user");
    assert_eq!(
        alice,
        User {
            id: 1,
            name: "Alice".into(),
            status: "active".into(),
            email: Some("alice@example.com".into()),
        }
    );
    let bob: User = accessor
        .invoke("find_user", rivet::args![2])
        .expect("Failed to find Bob with an i32 argument")
        .into_one()
        .expect("find_user must return one user");
    assert_eq!(bob.email, None);
    silent_logs! {
        assert!(
            accessor.invoke("find_user", rivet::args![42i64]).is_err(),
            "A missing user must fail instead of returning a placeholder"
        );
    }

    // Collection, in row order
    let active: Vec<User> = accessor
        .invoke("find_by_status", rivet::args!["active"])
        .expect("Failed to find the active users")
        .into_all()
        .expect("find_by_status must return users");
    assert_eq!(
        active.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
        ["Alice", "Carol"]
    );
    let nobody: Vec<User> = accessor
        .invoke("find_by_status", rivet::args!["banned"])
        .expect("Failed to query the banned users")
        .into_all()
        .expect("find_by_status must return users");
    assert!(nobody.is_empty());

    // Raw result set
    let names = accessor
        .invoke("names", rivet::args!["active", 1])
        .expect("Failed to query the names")
        .into_result_set()
        .expect("names must return a result set");
    assert_eq!(names.labels().as_ref(), ["name".to_string()]);
    assert_eq!(names.len(), 1);

    // Void with named parameters
    accessor
        .invoke("set_status", rivet::args!["inactive", 3i64])
        .expect("Failed to update Carol");
    let carol: User = accessor
        .invoke("find_user", rivet::args![3i64])
        .expect("Failed to find Carol")
        .into_one()
        .expect("find_user must return one user");
    assert_eq!(carol.status, "inactive");

    // Argument count
    silent_logs! {
        assert!(accessor.invoke("find_user", rivet::args![]).is_err());
        assert!(accessor.invoke("find_user", rivet::args![1i64, 2i64]).is_err());
        assert!(accessor.invoke("no_such_method", rivet::args![]).is_err());
    }
}
