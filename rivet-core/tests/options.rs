#[cfg(test)]
mod tests {
    use rivet_core::{Consistency, ExecutionOptions, PreparedStatement, QuerySchema};

    #[test]
    fn from_url() {
        let options = ExecutionOptions::from_url(
            "rivet://?consistency=local_quorum&fetch_size=500&tracing=true&idempotent=false",
        )
        .expect("Failed to read the options");
        assert_eq!(options.consistency, Some(Consistency::LocalQuorum));
        assert_eq!(options.fetch_size.map(|v| v.get()), Some(500));
        assert_eq!(options.tracing, Some(true));
        assert_eq!(options.idempotent, Some(false));

        let options = ExecutionOptions::from_url("rivet://?tracing&fetch_size=0").unwrap();
        assert_eq!(options.tracing, Some(true));
        assert_eq!(options.fetch_size, None);
        assert!(ExecutionOptions::from_url("rivet://").unwrap().is_empty());
    }

    #[test]
    fn from_url_failures() {
        assert!(ExecutionOptions::from_url("rivet://?consistency=most").is_err());
        assert!(ExecutionOptions::from_url("rivet://?fetch_size=-1").is_err());
        assert!(ExecutionOptions::from_url("rivet://?tracing=maybe").is_err());
        assert!(ExecutionOptions::from_url("rivet://?timeout=5").is_err());
        assert!(ExecutionOptions::from_url("not a url").is_err());
    }

    #[test]
    fn consistency() {
        assert_eq!("each_quorum".parse::<Consistency>().unwrap(), Consistency::EachQuorum);
        assert_eq!("ONE".parse::<Consistency>().unwrap(), Consistency::One);
        assert_eq!(Consistency::LocalSerial.to_string(), "LOCAL_SERIAL");
        assert!("".parse::<Consistency>().is_err());
    }

    #[test]
    fn fallback() {
        let defaults = ExecutionOptions::new()
            .consistency(Consistency::Quorum)
            .fetch_size(100)
            .idempotent(true);
        let options = ExecutionOptions::new()
            .consistency(Consistency::One)
            .tracing(false)
            .or(defaults);
        assert_eq!(options.consistency, Some(Consistency::One));
        assert_eq!(options.fetch_size.map(|v| v.get()), Some(100));
        assert_eq!(options.tracing, Some(false));
        assert_eq!(options.idempotent, Some(true));
    }

    #[test]
    fn apply() {
        let prepared = PreparedStatement::new("SELECT 1", QuerySchema::default());
        let mut statement = prepared.bind();
        ExecutionOptions::new().tracing(false).apply(&mut statement);
        assert!(!statement.is_tracing());
        assert_eq!(statement.consistency(), None);
        ExecutionOptions::new()
            .consistency(Consistency::All)
            .fetch_size(0)
            .tracing(true)
            .apply(&mut statement);
        assert!(statement.is_tracing());
        assert_eq!(statement.consistency(), Some(Consistency::All));
        assert_eq!(statement.fetch_size(), None);
    }
}
