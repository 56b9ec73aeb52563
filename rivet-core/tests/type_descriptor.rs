#[cfg(test)]
mod tests {
    use rivet_core::{Classification, Mode, ResultShape, TypeDescriptor, classify};

    fn shape(ty: &str) -> ResultShape {
        classify(&TypeDescriptor::parse(ty).expect("Failed to parse the type"))
            .expect("Failed to classify the type")
            .shape
    }

    #[test]
    fn parse() {
        assert_eq!(TypeDescriptor::parse("()").unwrap(), TypeDescriptor::Unit);
        assert_eq!(
            TypeDescriptor::parse("rivet::ResultSet").unwrap(),
            TypeDescriptor::ResultSet
        );
        assert_eq!(
            TypeDescriptor::parse("Statement").unwrap(),
            TypeDescriptor::Statement
        );
        assert_eq!(
            TypeDescriptor::parse("BoxFuture<'static, ResultSet>").unwrap(),
            TypeDescriptor::Future(TypeDescriptor::ResultSet.into())
        );
        assert_eq!(
            TypeDescriptor::parse("HashMap<String, User>").unwrap(),
            TypeDescriptor::Generic {
                name: "HashMap".into(),
                arguments: vec![
                    TypeDescriptor::Named("String".into()),
                    TypeDescriptor::Named("User".into())
                ],
            }
        );
        assert!(matches!(
            TypeDescriptor::parse("&User").unwrap(),
            TypeDescriptor::Unsupported(..)
        ));
        assert!(matches!(
            TypeDescriptor::parse("(User, User)").unwrap(),
            TypeDescriptor::Unsupported(..)
        ));
        assert!(TypeDescriptor::parse("Vec<").is_err());
    }

    #[test]
    fn display() {
        let ty = TypeDescriptor::parse("Pending<Vec<models::User>>").unwrap();
        assert_eq!(ty.to_string(), "impl Future<Output = Vec<User>>");
    }

    #[test]
    fn classify_raw() {
        assert_eq!(shape("()"), ResultShape::Void);
        assert_eq!(shape("ResultSet"), ResultShape::RawResultSync);
        assert_eq!(shape("BoundStatement"), ResultShape::RawStatement);
        assert_eq!(shape("ResultSetFuture"), ResultShape::RawResultAsync);
        assert_eq!(shape("impl Future<Output = ResultSet>"), ResultShape::RawResultAsync);
        assert_eq!(shape("Pending<ResultSet>"), ResultShape::RawResultAsync);
    }

    #[test]
    fn classify_mapped() {
        assert_eq!(shape("User"), ResultShape::MappedOne(Mode::Sync));
        assert_eq!(shape("Vec<User>"), ResultShape::MappedAll(Mode::Sync));
        assert_eq!(shape("MappedResult<User>"), ResultShape::MappedAll(Mode::Sync));
        assert_eq!(shape("Pending<User>"), ResultShape::MappedOne(Mode::Async));
        assert_eq!(
            shape("impl Future<Output = Vec<User>> + Send"),
            ResultShape::MappedAll(Mode::Async)
        );
        let classification =
            classify(&TypeDescriptor::parse("BoxFuture<'_, std::vec::Vec<app::User>>").unwrap())
                .unwrap();
        assert_eq!(
            classification,
            Classification {
                shape: ResultShape::MappedAll(Mode::Async),
                entity: Some("User".into()),
            }
        );
    }

    #[test]
    fn classify_unmappable() {
        for ty in [
            "Vec<Vec<User>>",
            "Pending<()>",
            "Pending<BoundStatement>",
            "Pending<Pending<User>>",
            "&User",
            "Option<User>",
        ] {
            let ty = TypeDescriptor::parse(ty).unwrap();
            assert!(classify(&ty).is_err(), "`{}` should not be mappable", ty);
        }
    }

    #[test]
    fn classify_is_deterministic() {
        for ty in ["()", "User", "Vec<User>", "Pending<Vec<User>>", "ResultSetFuture"] {
            let ty = TypeDescriptor::parse(ty).unwrap();
            let first = classify(&ty).unwrap();
            for _ in 0..3 {
                assert_eq!(classify(&ty).unwrap(), first);
            }
        }
    }

    #[test]
    fn is_async() {
        assert!(ResultShape::RawResultAsync.is_async());
        assert!(ResultShape::MappedOne(Mode::Async).is_async());
        assert!(!ResultShape::MappedAll(Mode::Sync).is_async());
        assert!(!ResultShape::RawStatement.is_async());
        assert!(!ResultShape::Void.is_async());
    }
}
