#[cfg(test)]
mod tests {
    use rivet_core::{MethodDescriptor, ParameterSpec, TypeDescriptor, Value};

    #[test]
    fn parse_parameters() {
        let method = MethodDescriptor::parse(
            "fn save(&mut self, id: i64, tags: &[String], avatar: Option<Vec<u8>>, note: Cow<'_, str>)",
        )
        .expect("Failed to parse save");
        assert_eq!(method.name(), "save");
        assert_eq!(method.return_type(), &TypeDescriptor::Unit);
        let parameters = method.parameters();
        assert_eq!(
            parameters.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
            ["id", "tags", "avatar", "note"]
        );
        assert_eq!(parameters[0].ty, Value::Int64(None));
        assert!(!parameters[0].nullable);
        assert_eq!(
            parameters[1].ty,
            Value::List(None, Box::new(Value::Varchar(None)))
        );
        assert_eq!(parameters[2].ty, Value::Blob(None));
        assert!(parameters[2].nullable);
        assert_eq!(parameters[3].ty, Value::Varchar(None));
        assert!(!method.is_variadic());
    }

    #[test]
    fn parse_async() {
        let method = MethodDescriptor::parse("async fn find_user(&self, id: i32) -> User").unwrap();
        assert_eq!(
            method.return_type(),
            &TypeDescriptor::Future(TypeDescriptor::Named("User".into()).into())
        );
        let method = MethodDescriptor::parse("async fn touch(&self, id: i32)").unwrap();
        assert_eq!(
            method.return_type(),
            &TypeDescriptor::Future(TypeDescriptor::Unit.into())
        );
    }

    #[test]
    fn parse_variadic() {
        let method = MethodDescriptor::parse("fn log_all(&self, format: &str, ...)").unwrap();
        assert!(method.is_variadic());
        assert_eq!(method.parameters().len(), 1);
    }

    #[test]
    fn parse_failures() {
        assert!(MethodDescriptor::parse("find_user(id: i32)").is_err());
        assert!(MethodDescriptor::parse("fn find_user(id: HashMap<i32, i32>) -> User").is_err());
        assert!(MethodDescriptor::parse("fn find_user(id: (i32, i32)) -> User").is_err());
    }

    #[test]
    fn build() {
        let method = MethodDescriptor::new("find_by_status")
            .parameter("status", Value::Varchar(None))
            .returns(TypeDescriptor::parse("Vec<User>").unwrap());
        assert_eq!(
            method,
            MethodDescriptor::parse("fn find_by_status(status: String) -> Vec<User>").unwrap()
        );
        assert!(MethodDescriptor::new("log").variadic(true).is_variadic());
    }

    #[test]
    fn parameter_spec() {
        assert_eq!(ParameterSpec::positional(), ParameterSpec::default());
        let spec = ParameterSpec::named("created").codec("epoch_millis");
        assert_eq!(spec.name.as_deref(), Some("created"));
        assert_eq!(spec.codec.as_deref(), Some("epoch_millis"));
    }
}
