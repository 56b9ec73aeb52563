use rivet::{
    Accessor, CodecRegistry, Entity, MappingManager, MethodDeclaration, ParameterSpec, Result,
    RowLabeled, Session,
};
use std::sync::Arc;
use time::macros::datetime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
struct Order {
    id: Uuid,
    customer: String,
    total: f64,
    /// Milliseconds since the unix epoch, written through the `epoch_millis` codec.
    placed_at: i64,
    /// Written through the `text` codec.
    quantity: String,
}

impl Entity for Order {
    fn from_row(row: RowLabeled) -> Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            customer: row.get("customer")?,
            total: row.get("total")?,
            placed_at: row.get("placed_at")?,
            quantity: row.get("quantity")?,
        })
    }
}

pub async fn orders(session: Arc<dyn Session>) {
    let mut mapping = MappingManager::new();
    mapping.register::<Order>();
    let accessor = Accessor::builder(session, mapping)
        .codecs(CodecRegistry::default())
        .method(
            MethodDeclaration::parse(
                "fn place(&self, id: Uuid, customer: &str, total: f64, placed_at: OffsetDateTime, quantity: i32)",
                "INSERT INTO orders (id, customer, total, placed_at, quantity) VALUES (?, ?, ?, ?, ?)",
            )
            .expect("Failed to declare place")
            .parameters([
                ParameterSpec::positional(),
                ParameterSpec::positional(),
                ParameterSpec::positional(),
                ParameterSpec::positional().codec("epoch_millis"),
                ParameterSpec::positional().codec("text"),
            ]),
        )
        .method(
            MethodDeclaration::parse(
                "fn by_customer(&self, customer: String) -> MappedResult<Order>",
                "SELECT * FROM orders WHERE customer = :customer",
            )
            .expect("Failed to declare by_customer")
            .parameters([ParameterSpec::named("customer")]),
        )
        .method(
            MethodDeclaration::parse(
                "fn order(&self, id: Uuid) -> Order",
                "SELECT * FROM orders WHERE id = ?",
            )
            .expect("Failed to declare order"),
        )
        .method(
            MethodDeclaration::parse(
                "fn cancel(&self, id: Uuid)",
                "DELETE FROM orders WHERE id = ?",
            )
            .expect("Failed to declare cancel"),
        )
        .build()
        .await
        .expect("Failed to build the orders accessor");

    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    accessor
        .invoke(
            "place",
            rivet::args![
                first,
                "Dana",
                19.5,
                datetime!(2024-03-01 12:00:00 UTC),
                3
            ],
        )
        .expect("Failed to place the first order");
    accessor
        .invoke(
            "place",
            rivet::args![
                second,
                "Dana",
                5.25,
                datetime!(2024-03-02 08:30:00 UTC),
                1
            ],
        )
        .expect("Failed to place the second order");

    let order: Order = accessor
        .invoke("order", rivet::args![first])
        .expect("Failed to find the first order")
        .into_one()
        .expect("order must return one order");
    assert_eq!(order.customer, "Dana");
    assert_eq!(order.total, 19.5);
    assert_eq!(order.placed_at, 1_709_294_400_000);
    assert_eq!(order.quantity, "3");

    let placed = accessor
        .invoke("by_customer", rivet::args!["Dana"])
        .expect("Failed to find the orders of Dana")
        .into_mapped()
        .expect("by_customer must return mapped orders");
    assert_eq!(placed.entity_name(), "Order");
    assert_eq!(placed.len(), 2);
    let placed = placed
        .into_vec::<Order>()
        .expect("by_customer must return orders");
    assert_eq!(
        placed.iter().map(|v| v.id).collect::<Vec<_>>(),
        [first, second]
    );

    accessor
        .invoke("cancel", rivet::args![first])
        .expect("Failed to cancel the first order");
    let remaining: Vec<Order> = accessor
        .invoke("by_customer", rivet::args!["Dana"])
        .expect("Failed to find the orders of Dana")
        .into_all()
        .expect("by_customer must return orders");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].placed_at, 1_709_368_200_000);
    accessor
        .invoke("cancel", rivet::args![second])
        .expect("Failed to cancel the second order");
}
