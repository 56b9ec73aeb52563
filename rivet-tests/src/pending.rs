use crate::{User, users_accessor};
use rivet::{ResultSet, Session};
use std::sync::Arc;

pub async fn pending(session: Arc<dyn Session>) {
    let accessor = users_accessor(session).await;
    for id in 30..33 {
        accessor
            .invoke("delete_user", rivet::args![id as i64])
            .expect("Failed to clear the users");
    }
    for (id, name) in [(30i64, "Frank"), (31, "Grace"), (32, "Heidi")] {
        accessor
            .invoke("insert_user", rivet::args![id, name, "queued", None::<String>])
            .expect("Failed to insert the queued users");
    }

    // Every asynchronous shape returns before the result is available
    let one = accessor
        .invoke("find_user_async", rivet::args![31i64])
        .expect("find_user_async must not fail synchronously");
    let all = accessor
        .invoke("find_users_async", rivet::args!["queued"])
        .expect("find_users_async must not fail synchronously");
    let raw = accessor
        .invoke("names_async", rivet::args!["queued"])
        .expect("names_async must not fail synchronously");
    assert!(one.is_pending());
    assert!(all.is_pending());
    assert!(raw.is_pending());

    let grace: User = one
        .into_pending()
        .expect("Expected a pending result")
        .await
        .expect("find_user_async failed")
        .into_one()
        .expect("find_user_async must resolve to one user");
    assert_eq!(grace.name, "Grace");
    let queued: Vec<User> = all
        .into_pending()
        .expect("Expected a pending result")
        .await
        .expect("find_users_async failed")
        .into_all()
        .expect("find_users_async must resolve to users");
    assert_eq!(
        queued.iter().map(|v| v.id).collect::<Vec<_>>(),
        [30, 31, 32]
    );
    let names: ResultSet = raw
        .into_pending()
        .expect("Expected a pending result")
        .await
        .expect("names_async failed")
        .into_result_set()
        .expect("names_async must resolve to a result set");
    assert_eq!(
        names
            .rows()
            .map(|v| v.get::<String>("name").expect("Missing name"))
            .collect::<Vec<_>>(),
        ["Frank", "Grace", "Heidi"]
    );

    // Failures are delivered through the handle
    let missing = accessor
        .invoke("find_user_async", rivet::args![99i64])
        .expect("find_user_async must not fail synchronously")
        .into_pending()
        .expect("Expected a pending result");
    assert!(missing.await.is_err());
    let wrong = accessor
        .invoke("find_user_async", rivet::args![])
        .expect("Argument errors of asynchronous methods arrive through the handle")
        .into_pending()
        .expect("Expected a pending result");
    assert!(wrong.await.is_err());

    // Concurrent invocations of the same binding
    let handles = (30..33)
        .map(|id| {
            accessor
                .invoke("find_user_async", rivet::args![id as i64])
                .and_then(|v| v.into_pending())
                .expect("Failed to start find_user_async")
        })
        .map(tokio::spawn)
        .collect::<Vec<_>>();
    let mut found = Vec::new();
    for handle in handles {
        let user: User = handle
            .await
            .expect("The task panicked")
            .expect("find_user_async failed")
            .into_one()
            .expect("find_user_async must resolve to one user");
        found.push(user.name);
    }
    assert_eq!(found, ["Frank", "Grace", "Heidi"]);

    for id in 30..33 {
        accessor
            .invoke("delete_user", rivet::args![id as i64])
            .expect("Failed to clear the users");
    }
}
